//! HTTP handlers

pub mod health;
pub mod auth;
pub mod transactions;
pub mod live_feed;
pub mod pathway;
