use std::time::Duration;

use super::*;

fn fast_log() -> InputLog {
    InputLog::with_tick_interval(Duration::from_millis(2))
}

#[tokio::test]
async fn publish_completes_line_on_newline() {
    let log = fast_log();
    log.publish(b"hello\n");
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn publish_without_newline_does_not_complete_a_line() {
    let log = fast_log();
    log.publish(b"partial");
    assert_eq!(log.len(), 0);
}

#[tokio::test]
async fn flush_incomplete_tail_completes_pending_bytes() {
    let log = fast_log();
    log.publish(b"partial");
    assert_eq!(log.len(), 0);
    log.flush_incomplete_tail();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn subscriber_receives_lines_published_before_listen() {
    let log = fast_log();
    log.publish(b"a\n");
    log.publish(b"b\n");

    let (mut rx, _cancel) = log.listen();
    let batch = rx.recv().await.expect("batch delivered");
    let joined: Vec<u8> = batch.iter().flat_map(|l| l.as_bytes().to_vec()).collect();
    assert_eq!(joined, b"a\nb\n");
}

#[tokio::test]
async fn subscriber_watermark_is_monotonic_and_contiguous() {
    let log = fast_log();
    let (mut rx, _cancel) = log.listen();

    log.publish(b"a\n");
    let batch1 = rx.recv().await.expect("first batch");
    assert_eq!(batch1.len(), 1);

    log.publish(b"b\n");
    log.publish(b"c\n");
    let batch2 = rx.recv().await.expect("second batch");
    let joined: Vec<u8> = batch2.iter().flat_map(|l| l.as_bytes().to_vec()).collect();
    assert_eq!(joined, b"b\nc\n");
}

#[tokio::test]
async fn cancelled_subscription_closes_channel() {
    let log = fast_log();
    let (mut rx, cancel) = log.listen();
    cancel.cancel();

    // Give the drop a moment; no further ticks should deliver to this id.
    tokio::time::sleep(Duration::from_millis(10)).await;
    log.publish(b"a\n");
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn two_subscribers_each_get_full_contiguous_prefix() {
    let log = fast_log();
    log.publish(b"a\n");

    let (mut rx1, _c1) = log.listen();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let batch1 = rx1.recv().await.expect("late subscriber catches up");
    assert_eq!(batch1.len(), 1);

    let (mut rx2, _c2) = log.listen();
    log.publish(b"b\n");
    let batch2a = rx1.recv().await.expect("rx1 sees new line");
    let batch2b = rx2.recv().await.expect("rx2 sees both lines");
    assert_eq!(batch2a.len(), 1);
    assert_eq!(batch2b.len(), 2);
}
