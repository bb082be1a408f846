use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use cybershield::resilience::{ExecuteError, RateLimiter, ResilientExecutor, RetryPolicy};
use tokio::time::Instant;

fn executor(max_retries: u32, base_delay_ms: u64, min_interval_ms: u64) -> ResilientExecutor {
    ResilientExecutor::new(
        Arc::new(RateLimiter::new(Duration::from_millis(min_interval_ms))),
        RetryPolicy::new(max_retries, Duration::from_millis(base_delay_ms)).unwrap(),
    )
}

#[tokio::test(start_paused = true)]
async fn fail_fail_succeed() {
    let executor = executor(3, 1000, 0);
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result = executor
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(anyhow::anyhow!("attempt {call} failed"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3000));
    assert!(elapsed < Duration::from_millis(3010));
}

#[tokio::test(start_paused = true)]
async fn always_failing_surfaces_final_error() {
    let executor = executor(2, 1000, 0);
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result = executor
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<(), _>(anyhow::anyhow!("E{call}")) }
        })
        .await;

    match result {
        Err(ExecuteError::Operation(err)) => assert_eq!(err.to_string(), "E2"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1010));
}

#[tokio::test(start_paused = true)]
async fn three_back_to_back_permits() {
    let limiter = RateLimiter::new(Duration::from_millis(1000));
    let started = Instant::now();

    for _ in 0..3 {
        limiter.wait_for_next_request().await;
    }

    assert!(started.elapsed() >= Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_share_one_limiter() {
    let executor = Arc::new(executor(1, 1000, 1000));
    let started = Instant::now();

    let handles = (0..4)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(|| async move { Ok::<_, anyhow::Error>((i, Instant::now())) })
                    .await
                    .unwrap()
            })
        })
        .collect::<Vec<_>>();

    let mut releases = Vec::new();
    for handle in handles {
        releases.push(handle.await.unwrap().1);
    }
    releases.sort();

    for pair in releases.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(1000));
    }
    assert!(started.elapsed() >= Duration::from_millis(3000));
}
