//! Integration tests for the lagged-value timer: event delivery and
//! progress reporting driven end to end over real time.

use std::time::Duration;

use lagnum_core::{Event, LagConfig, LagTimer};

#[tokio::test(flavor = "multi_thread")]
async fn chained_runs_report_both_directions() {
    let mut timer = LagTimer::new(LagConfig::new(60.0)).unwrap();
    let mut up = Vec::new();
    let mut down = Vec::new();

    // 0 -> 100, then back. Awaiting the first run before starting the
    // second is the sequencing contract: the second set supersedes the
    // settled first transition.
    timer
        .run_with_progress(0.0, 100.0, Some(Duration::from_millis(10)), |v| up.push(v))
        .await
        .unwrap();
    timer
        .run_with_progress(100.0, 0.0, Some(Duration::from_millis(10)), |v| down.push(v))
        .await
        .unwrap();

    assert_eq!(up.first(), Some(&0.0));
    assert_eq!(up.last(), Some(&100.0));
    assert_eq!(down.first(), Some(&100.0));
    assert_eq!(down.last(), Some(&0.0));
    assert!(up.iter().chain(&down).all(|v| (0.0..=100.0).contains(v)));
}

#[tokio::test(flavor = "multi_thread")]
async fn fixed_bounds_run_completes_early() {
    // 0 -> 100 covers under half the 0..280 range, so the run settles well
    // before the nominal lag.
    let mut timer = LagTimer::new(LagConfig::new(200.0).with_bounds(0.0, 280.0)).unwrap();
    assert_eq!(timer.get(None), None);

    let started = std::time::Instant::now();
    let mut seen = Vec::new();
    timer
        .run_with_progress(0.0, 100.0, Some(Duration::from_millis(10)), |v| seen.push(v))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(seen.last(), Some(&100.0));
}

#[tokio::test(flavor = "multi_thread")]
async fn every_subscriber_sees_the_completion() {
    let mut timer = LagTimer::new(LagConfig::new(30.0)).unwrap();
    let mut rx_a = timer.subscribe();
    let mut rx_b = timer.subscribe();
    timer.set(1.0, 2.0, None).unwrap();

    for rx in [&mut rx_a, &mut rx_b] {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no event in time")
            .expect("channel closed");
        let Event::TargetReached { stop_value, .. } = event;
        assert_eq!(stop_value, 2.0);
    }
}
