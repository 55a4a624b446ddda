use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use super::*;
use crate::constants::CSV_COLUMNS;
use crate::logic::transaction::TransactionType;

fn sample_tx(name_orig: &str, amount: f64) -> Transaction {
    Transaction {
        step: 1,
        tx_type: TransactionType::Transfer,
        amount,
        name_orig: name_orig.to_string(),
        oldbalance_org: amount,
        newbalance_orig: 0.0,
        name_dest: "M1".to_string(),
        oldbalance_dest: 0.0,
        newbalance_dest: amount,
        is_fraud: Some(true),
        is_flagged_fraud: Some(false),
    }
}

#[tokio::test]
async fn test_header_written_once() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("transactions.csv"));

    log.append_transaction(&sample_tx("C1", 10.0)).await.unwrap();
    log.append_transaction(&sample_tx("C2", 20.0)).await.unwrap();

    let content = fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_COLUMNS.join(","));
    assert_eq!(content.matches(&header_line()).count(), 1);
    assert_eq!(lines[1], "1,TRANSFER,10,C1,10,0,M1,0,10,1,0");
}

#[tokio::test]
async fn test_append_never_truncates_existing_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transactions.csv");
    fs::write(&path, format!("{}\n1,PAYMENT,5,C9,5,0,M9,0,5,0,0\n", header_line())).unwrap();

    let log = EventLog::new(&path);
    log.append_transaction(&sample_tx("C1", 10.0)).await.unwrap();

    let rows = log.read_rows().await.unwrap().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("nameOrig"), Some("C9"));
    assert_eq!(rows[1].get("nameOrig"), Some("C1"));
}

#[tokio::test]
async fn test_missing_columns_written_empty() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("nested").join("log.csv"));

    let mut row = LogRow::new();
    row.set("step", "3");
    row.set("type", "PAYMENT");
    row.set("amount", "12.5");
    log.append(&row).await.unwrap();

    let content = fs::read_to_string(log.path()).unwrap();
    assert_eq!(content.lines().nth(1), Some("3,PAYMENT,12.5,,,,,,,,"));
}

#[tokio::test]
async fn test_empty_file_gets_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(&path, "").unwrap();

    let log = EventLog::new(&path);
    log.append_transaction(&sample_tx("C1", 1.0)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(&header_line()));
}

#[tokio::test]
async fn test_partial_last_line_is_terminated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transactions.csv");
    fs::write(&path, format!("{}\n1,PAYMENT,5,C9", header_line())).unwrap();

    let log = EventLog::new(&path);
    log.append_transaction(&sample_tx("C1", 10.0)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "1,PAYMENT,5,C9");
    assert_eq!(lines[2], "1,TRANSFER,10,C1,10,0,M1,0,10,1,0");
    assert!(content.starts_with(&header_line()));
}

#[tokio::test]
async fn test_separator_in_value_is_refused() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("transactions.csv"));

    let result = log.append_transaction(&sample_tx("C1,evil", 10.0)).await;
    assert!(matches!(result, Err(DurabilityError(e)) if e.kind() == io::ErrorKind::InvalidInput));

    let mut row = LogRow::new();
    row.set("nameDest", "M1\nM2");
    assert!(log.append(&row).await.is_err());
    assert!(!log.path().exists());
}

#[tokio::test]
async fn test_read_rows_on_missing_log() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("absent.csv"));
    assert!(log.read_rows().await.unwrap().is_none());
}

#[tokio::test]
async fn test_append_to_directory_path_is_durability_error() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path());

    let result = log.append_transaction(&sample_tx("C1", 1.0)).await;
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_do_not_interleave() {
    let dir = tempdir().unwrap();
    let log = Arc::new(EventLog::new(dir.path().join("transactions.csv")));

    let mut handles = Vec::new();
    for i in 0..50 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            log.append_transaction(&sample_tx(&format!("C{}", i), i as f64)).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let content = fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 51);
    assert_eq!(lines.iter().filter(|l| **l == header_line()).count(), 1);
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), CSV_COLUMNS.len(), "corrupted line: {}", line);
    }
}

#[tokio::test]
async fn test_recent_marks_flagged_rows() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("transactions.csv"));

    let mut clean = sample_tx("C1", 10.0);
    clean.is_fraud = Some(false);
    clean.is_flagged_fraud = Some(false);
    log.append_transaction(&clean).await.unwrap();
    log.append_transaction(&sample_tx("C2", 20.0)).await.unwrap();
    log.append_transaction(&clean).await.unwrap();

    let feed = log.recent(2).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].name_orig, "C1");
    assert_eq!(feed[0].status, FeedStatus::Processed);
    assert_eq!(feed[1].name_orig, "C2");
    assert_eq!(feed[1].status, FeedStatus::Flagged);
    assert_eq!(feed[1].amount, Some(20.0));
}

#[test]
fn test_parse_short_line_leaves_columns_absent() {
    let header = parse_header(&header_line());
    let row = LogRow::parse(&header, "1,PAYMENT,9.5");
    assert_eq!(row.number("amount"), Some(9.5));
    assert_eq!(row.get("nameOrig"), None);
    assert!(!row.flag("isFraud"));
}
