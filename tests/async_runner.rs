#![cfg(feature = "tokio")]

use std::cell::Cell;
use std::time::Duration;

use robustvisor::{RunError, Supervisor, SupervisorConfig};
use tokio::time::{Instant, sleep};

fn limits() -> Supervisor {
    let cfg = SupervisorConfig {
        rate_limit: 1.0,
        grace: Duration::from_secs(1),
        ..SupervisorConfig::default()
    };
    Supervisor::new(cfg).unwrap()
}

/// Sleeps `interval` on the tokio timer, then panics for the first `iters` calls.
async fn panic_after(interval: Duration, iters: u32, count: &Cell<u32>) {
    sleep(interval).await;
    count.set(count.get() + 1);
    if count.get() <= iters {
        panic!("async failure #{}", count.get());
    }
}

#[tokio::test(start_paused = true)]
async fn test_one_failure_per_second_is_tolerated() {
    let sup = limits();
    let tries = Cell::new(0);

    let failures = sup
        .run_async(|| {
            let tries = &tries;
            async move { panic_after(Duration::from_secs(1), 5, tries).await }
        })
        .await
        .unwrap();

    assert_eq!(failures, 5);
    assert_eq!(tries.get(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_sustained_overload_gives_up() {
    let sup = limits();
    let tries = Cell::new(0);

    let err = sup
        .run_async(|| {
            let tries = &tries;
            async move { panic_after(Duration::from_millis(300), 500, tries).await }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::GaveUp { failures: 5, .. }), "{err:?}");
    assert_eq!(tries.get(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_short_breach_is_tolerated() {
    let sup = limits();
    let tries = Cell::new(0);

    let failures = sup
        .run_async(|| {
            let tries = &tries;
            async move { panic_after(Duration::from_millis(300), 2, tries).await }
        })
        .await
        .unwrap();

    assert_eq!(failures, 2);
}

#[tokio::test(start_paused = true)]
async fn test_panic_while_building_the_future_is_caught() {
    let sup = limits();
    let mut calls = 0;

    let failures = sup
        .run_async(|| {
            calls += 1;
            if calls == 1 {
                panic!("could not build the future");
            }
            async {}
        })
        .await
        .unwrap();

    assert_eq!(failures, 1);
    assert_eq!(calls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_retry_delay_uses_the_tokio_timer() {
    let cfg = SupervisorConfig {
        retry_delay: Duration::from_secs(1),
        ..SupervisorConfig::default()
    };
    let sup = Supervisor::new(cfg).unwrap();
    let tries = Cell::new(0);
    let start = Instant::now();

    let failures = sup
        .run_async(|| {
            let tries = &tries;
            async move { panic_after(Duration::ZERO, 3, tries).await }
        })
        .await
        .unwrap();

    assert_eq!(failures, 3);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runs_on_a_spawned_task() {
    let handle = tokio::spawn(async {
        let sup = Supervisor::default();
        let mut calls = 0u32;
        sup.run_async(move || {
            calls += 1;
            let fail = calls == 1;
            async move {
                if fail {
                    sleep(Duration::from_millis(1100)).await;
                    panic!("first call fails");
                }
            }
        })
        .await
    });

    assert_eq!(handle.await.unwrap().unwrap(), 1);
}
