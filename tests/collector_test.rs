use rust_rtsp_grabber::brute::result_collector::{
    RUN_DIR_FORMAT, latest_run_dir, list_images, run_label_now,
};
use rust_rtsp_grabber::brute::{CancelToken, ResultCollector};
use rust_rtsp_grabber::iterator::Host;
use std::time::Duration;

#[tokio::test]
async fn test_persist_writes_host_named_image() {
    let dir = tempfile::tempdir().unwrap();
    let collector = ResultCollector::new(dir.path(), "run");
    let host = Host::new("10.0.0.1:8554").unwrap();

    let path = collector.persist(&host, b"first").await.unwrap();
    assert_eq!(path, dir.path().join("run").join("10.0.0.1_8554.jpg"));
    assert_eq!(std::fs::read(&path).unwrap(), b"first");

    // 同一主机再次写入时覆盖
    collector.persist(&host, b"second").await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");
    assert_eq!(collector.list().await.unwrap(), vec![path]);
}

#[tokio::test]
async fn test_list_skips_hidden_files_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
    std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
    std::fs::write(dir.path().join(".partial-123"), b"x").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let images = list_images(dir.path()).await.unwrap();
    assert_eq!(images, vec![dir.path().join("a.jpg"), dir.path().join("b.jpg")]);
}

#[tokio::test]
async fn test_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    assert!(list_images(&missing).await.unwrap().is_empty());
    assert_eq!(latest_run_dir(&missing).await.unwrap(), None);
}

#[tokio::test]
async fn test_latest_run_dir() {
    let dir = tempfile::tempdir().unwrap();
    for label in ["2024-05-01_10-00-00", "2024-05-02_09-00-00", "2024-04-30_23-59-59"] {
        std::fs::create_dir(dir.path().join(label)).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

    assert_eq!(
        latest_run_dir(dir.path()).await.unwrap(),
        Some(dir.path().join("2024-05-02_09-00-00"))
    );
}

#[test]
fn test_run_label_format() {
    let label = run_label_now();
    assert!(chrono::NaiveDateTime::parse_from_str(&label, RUN_DIR_FORMAT).is_ok());
}

#[tokio::test]
async fn test_cancel_token_wakes_waiters() {
    let cancel = CancelToken::new();
    assert!(!cancel.is_cancelled());

    let waiter = {
        let cancel = cancel.clone();
        tokio::spawn(async move { cancel.cancelled().await })
    };
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(cancel.is_cancelled());
    // 已取消后等待立即返回
    cancel.cancelled().await;
}
