use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use super::history::{self, summarize};
use super::*;
use crate::constants::{
    no_account_history, CSV_COLUMNS, DECISION_LOG_SOURCE, NO_HISTORY_AVAILABLE,
    NO_SIMILAR_AVAILABLE, NO_SIMILAR_FOUND,
};
use crate::logic::event_log::parse_log;
use crate::logic::explain::{ExplanationGenerator, PromptTemplate};
use crate::logic::model::{ScoreMode, Verdict};
use crate::logic::transaction::TransactionType;
use crate::testing::{failing_corpus, memory_corpus, sample_transaction, ScriptedChat};

fn verdict() -> Verdict {
    Verdict { is_fraud: true, score: 0.92, mode: ScoreMode::Probability }
}

fn log_of(lines: &[&str]) -> String {
    let mut content = CSV_COLUMNS.join(",");
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content.push('\n');
    content
}

fn payment(amount: f64) -> crate::logic::transaction::Transaction {
    let mut tx = sample_transaction();
    tx.tx_type = TransactionType::Payment;
    tx.amount = amount;
    tx
}

// ============================================================================
// CONTEXT
// ============================================================================

#[test]
fn test_blocks_order() {
    let ctx = GroundingContext {
        semantic: vec!["doc a".to_string(), "doc b".to_string()],
        history: HistoricalSummary { behavior: "B".to_string(), similar: "S".to_string() },
    };

    assert_eq!(
        ctx.blocks(),
        vec!["doc a", "doc b", "Historical user behavior: B", "Similar past cases: S"]
    );
    assert_eq!(
        ctx.render(),
        "doc a\n\ndoc b\n\nHistorical user behavior: B\n\nSimilar past cases: S"
    );
}

#[test]
fn test_query_text_format() {
    assert_eq!(
        query_text(&sample_transaction(), &verdict()),
        "Transaction amount 250000, type TRANSFER, sender C1, receiver M1, \
         fraud_prediction=true, fraud_score=0.9200."
    );
}

// ============================================================================
// HISTORY
// ============================================================================

#[test]
fn test_similar_window_is_inclusive() {
    assert!(is_similar_amount(100.0, 80.0));
    assert!(is_similar_amount(100.0, 120.0));
    assert!(is_similar_amount(100.0, 100.0));
    assert!(!is_similar_amount(100.0, 79.99));
    assert!(!is_similar_amount(100.0, 120.01));
}

#[test]
fn test_nothing_similar_to_zero_amount() {
    assert!(!is_similar_amount(0.0, 0.0));
    assert!(!is_similar_amount(0.0, 10.0));

    let rows = parse_log(&log_of(&["1,PAYMENT,0,C9,0,0,M1,0,0,1,0"]));
    let summary = summarize(&rows, &payment(0.0));
    assert_eq!(summary.similar, NO_SIMILAR_FOUND);
}

#[test]
fn test_similar_rows_counted_with_fraud_rate() {
    let rows = parse_log(&log_of(&[
        "1,PAYMENT,80,C7,0,0,M1,0,0,1,0",
        "1,PAYMENT,120,C8,0,0,M1,0,0,0,0",
        "1,PAYMENT,100,C9,0,0,M1,0,0,0,0",
        "1,PAYMENT,121,C9,0,0,M1,0,0,1,0",
        "1,TRANSFER,100,C9,0,0,M1,0,0,1,0",
    ]));

    let summary = summarize(&rows, &payment(100.0));
    assert_eq!(
        summary.similar,
        "Across 3 historical PAYMENT transactions with a similar amount, \
         approximately 33.3% were labeled as fraudulent in past data."
    );
}

#[test]
fn test_sender_behavior_summary() {
    let rows = parse_log(&log_of(&[
        "1,PAYMENT,100,C1,0,0,M1,0,0,0,0",
        "2,TRANSFER,300,C1,0,0,M1,0,0,0,0",
        "3,PAYMENT,200,C1,0,0,M1,0,0,0,0",
        "4,CASH_OUT,400,C1,0,0,M1,0,0,0,0",
        "5,PAYMENT,999,C2,0,0,M1,0,0,0,0",
    ]));

    let summary = summarize(&rows, &sample_transaction());
    assert_eq!(
        summary.behavior,
        "Sender account C1 has 4 historical transactions with an average amount of 250.00. \
         Most common type is PAYMENT. Rarely used types for this account: TRANSFER, CASH_OUT."
    );
}

#[test]
fn test_most_common_tie_goes_to_first_seen() {
    let rows = parse_log(&log_of(&[
        "1,CASH_IN,10,C1,0,0,M1,0,0,0,0",
        "2,DEBIT,10,C1,0,0,M1,0,0,0,0",
    ]));

    let summary = summarize(&rows, &sample_transaction());
    assert_eq!(
        summary.behavior,
        "Sender account C1 has 2 historical transactions with an average amount of 10.00. \
         Most common type is CASH_IN. Rarely used types for this account: DEBIT."
    );
}

#[test]
fn test_unparseable_amount_skipped_empty_amount_is_zero() {
    let rows = parse_log(&log_of(&[
        "1,TRANSFER,abc,C1,0,0,M1,0,0,1,0",
        "1,TRANSFER,,C1,0,0,M1,0,0,0,0",
        "1,TRANSFER,50,C1,0,0,M1,0,0,0,0",
    ]));

    let summary = summarize(&rows, &sample_transaction());
    assert!(summary.behavior.starts_with(
        "Sender account C1 has 2 historical transactions with an average amount of 25.00."
    ));
}

#[test]
fn test_unknown_sender_sentinel() {
    let rows = parse_log(&log_of(&["1,PAYMENT,10,C2,0,0,M1,0,0,0,0"]));
    let summary = summarize(&rows, &sample_transaction());

    assert_eq!(summary.behavior, no_account_history("C1"));
    assert_eq!(summary.behavior, "No historical data found for sender account C1.");
}

#[tokio::test]
async fn test_absent_log_uses_unavailable_sentinels() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("missing.csv"));

    let summary = history::analyze(&log, &sample_transaction()).await;
    assert_eq!(summary.behavior, NO_HISTORY_AVAILABLE);
    assert_eq!(summary.similar, NO_SIMILAR_AVAILABLE);
}

#[tokio::test]
async fn test_empty_log_is_not_an_error() {
    let dir = tempdir().unwrap();

    for content in ["", "step,type,amount,nameOrig,oldbalanceOrg,newbalanceOrig,nameDest,oldbalanceDest,newbalanceDest,isFraud,isFlaggedFraud\n"] {
        let path = dir.path().join("transactions.csv");
        fs::write(&path, content).unwrap();

        let summary = history::analyze(&EventLog::new(&path), &sample_transaction()).await;
        assert_eq!(summary.behavior, no_account_history("C1"));
        assert_eq!(summary.similar, NO_SIMILAR_FOUND);
    }
}

// ============================================================================
// RETRIEVER
// ============================================================================

#[tokio::test]
async fn test_semantic_failure_degrades_to_empty() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("transactions.csv"));
    let mut tx = sample_transaction();
    tx.is_fraud = Some(true);
    tx.is_flagged_fraud = Some(true);
    log.append_transaction(&tx).await.unwrap();

    let retriever = GroundingRetriever::new(failing_corpus(), log, 6);
    let ctx = retriever.retrieve(&sample_transaction(), &verdict()).await;

    assert!(ctx.semantic.is_empty());
    assert!(ctx.history.behavior.starts_with("Sender account C1 has 1 historical transactions"));
    assert_eq!(
        ctx.history.similar,
        "Across 1 historical TRANSFER transactions with a similar amount, \
         approximately 100.0% were labeled as fraudulent in past data."
    );
}

#[tokio::test]
async fn test_retrieves_curated_documents() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("documents");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("transfer_rules.txt"), "A TRANSFER that empties the sender balance is high risk.").unwrap();
    fs::write(docs.join("notes.md"), "ignored").unwrap();

    let (store, corpus) = memory_corpus();
    assert_eq!(corpus.ingest_directory(&docs).await.unwrap(), 1);
    assert_eq!(store.count_by_source("transfer_rules.txt"), 1);

    let retriever = GroundingRetriever::new(corpus, EventLog::new(dir.path().join("none.csv")), 6);
    let ctx = retriever.retrieve(&sample_transaction(), &verdict()).await;

    assert_eq!(ctx.semantic, vec!["A TRANSFER that empties the sender balance is high risk."]);
    assert_eq!(ctx.history, HistoricalSummary::unavailable());
}

/// Decision logs are written with the same vocabulary as the query text,
/// so repeating one kind of decision pushes curated documents out of top-K.
#[tokio::test]
async fn test_repeated_decisions_dominate_top_k() {
    let dir = tempdir().unwrap();
    let (store, corpus) = memory_corpus();

    for (i, text) in [
        "Mule accounts receive many small deposits and forward them quickly.",
        "Card testing shows bursts of tiny payments at unrelated merchants.",
        "Dormant accounts that suddenly move funds deserve manual review.",
    ]
    .into_iter()
    .enumerate()
    {
        corpus.index(text.to_string(), &format!("pattern_{}.txt", i)).await.unwrap();
    }

    let top_k = 3;
    let retriever = GroundingRetriever::new(
        corpus.clone(),
        EventLog::new(dir.path().join("transactions.csv")),
        top_k,
    );
    let generator = ExplanationGenerator::new(
        Arc::new(ScriptedChat::replying("- Balance drained")),
        corpus.clone(),
        PromptTemplate::default(),
        0.2,
    );

    let tx = sample_transaction();
    for _ in 0..top_k {
        let ctx = retriever.retrieve(&tx, &verdict()).await;
        generator.explain(&tx, &verdict(), &ctx).await.unwrap();
    }
    assert_eq!(store.count_by_source(DECISION_LOG_SOURCE), top_k);

    let hits = corpus.search_matches(&query_text(&tx, &verdict()), top_k).await.unwrap();
    assert_eq!(hits.len(), top_k);
    assert!(hits.iter().all(|h| h.source.as_deref() == Some(DECISION_LOG_SOURCE)));
}

#[tokio::test]
async fn test_corpus_adjusts_dimension() {
    let store = Arc::new(InMemoryVectorStore::new(8));
    let corpus = KnowledgeBase::connect(
        Arc::new(crate::testing::HashEmbedder::new(32)),
        store.clone(),
        None,
    )
    .await;

    assert_eq!(corpus.dimension(), Some(8));
    corpus.index("some text".to_string(), "a.txt").await.unwrap();
    assert_eq!(store.documents()[0].embedding.len(), 8);
}
