//! Logic Module - pipeline stages & engines
//!
//! - `event_log/` - append-only CSV system of record
//! - `features/` - fixed feature layout + encoder
//! - `model/` - classifier loading and inference
//! - `retrieval/` - knowledge corpus + historical statistics
//! - `explain/` - prompt, language model, decision write-back
//! - `dataflow/` - continuous feature derivation from the log

pub mod dataflow;
pub mod decision_log;
pub mod event_log;
pub mod explain;
pub mod features;
pub mod model;
pub mod openai;
pub mod pipeline;
pub mod retrieval;
pub mod transaction;
