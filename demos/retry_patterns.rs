//! Retry Patterns Example
//!
//! Demonstrates the retry engine on a flaky operation:
//! - Basic retry with exponential backoff
//! - Aborting on errors that retrying cannot fix
//! - Previewing the backoff schedule
//! - Cancelling an unbounded retry from another thread
//! - Loading settings from plain data

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use persevere::prelude::*;
use persevere::{Backoff, Cancelled, Never};

// ==================== Basic Retry ====================

/// Example 1: an operation that fails twice before succeeding.
fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    let retry = Retry::builder(5)
        .wait(Duration::from_millis(100))
        .expect("positive wait")
        .build();

    let result = retry.run_with_hooks(
        &Never,
        |attempt| {
            println!("  Attempt {}", attempt + 1);
            if attempt < 2 {
                Outcome::Transient("connection reset")
            } else {
                Outcome::Success
            }
        },
        |event| {
            println!(
                "  failed ({}), sleeping {:?} (elapsed {:?})",
                event.error, event.wait, event.elapsed
            );
        },
    );

    println!("Result: {:?}", result);
}

// ==================== Abort ====================

/// Example 2: permanent errors stop the loop immediately.
fn example_abort() {
    println!("\n=== Example 2: Abort ===");

    let result = Retry::new(0).run(|_| {
        let write: Result<(), &str> = Err("disk full");
        write.abort_when(|e| *e == "disk full")
    });

    match result {
        Err(RetryError::Aborted(cause)) => println!("Aborted: {}", cause),
        other => println!("Unexpected: {:?}", other),
    }
}

// ==================== Backoff Schedule ====================

/// Example 3: the waits a default engine would use, without jitter.
fn example_schedule() {
    println!("\n=== Example 3: Backoff Schedule ===");

    let retry = Retry::new(10);
    for (i, wait) in retry.start_backoff().waits(9).enumerate() {
        println!("  after attempt {}: {:?}", i + 1, wait);
    }

    let capped = Backoff::new(Duration::from_millis(100), Duration::from_millis(500));
    println!("  capped: {:?}", capped.waits(6).collect::<Vec<_>>());
}

// ==================== Cancellation ====================

/// Example 4: stop an unbounded retry from another thread.
fn example_cancellation() {
    println!("\n=== Example 4: Cancellation ===");

    let token = CancelToken::new();
    let attempts = AtomicU32::new(0);

    let result = std::thread::scope(|s| {
        let worker = s.spawn(|| {
            Retry::builder(0)
                .wait(Duration::from_millis(50))
                .expect("positive wait")
                .no_jitter()
                .build()
                .run_with_cancel(&token, |_| {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Outcome::Transient("still down")
                })
        });

        std::thread::sleep(Duration::from_millis(300));
        token.cancel();
        worker.join()
    });

    match result {
        Ok(Err(RetryError::Cancelled(Cancelled::Requested))) => println!(
            "Cancelled after {} attempts",
            attempts.load(Ordering::SeqCst)
        ),
        other => println!("Unexpected: {:?}", other),
    }
}

// ==================== Configuration ====================

/// Example 5: settings as plain data, validated on use.
fn example_config() {
    println!("\n=== Example 5: Configuration ===");

    let config = RetryConfig {
        limit: 3,
        wait: Duration::from_millis(10),
        max_jitter: Some(Duration::ZERO),
        ..RetryConfig::default()
    };
    match Retry::from_config(&config) {
        Ok(retry) => println!("Built: {:?}", retry),
        Err(err) => println!("Rejected: {}", err),
    }

    let broken = RetryConfig {
        wait: Duration::ZERO,
        ..config
    };
    match Retry::from_config(&broken) {
        Ok(retry) => println!("Built: {:?}", retry),
        Err(err) => println!("Rejected: {}", err),
    }
}

fn main() {
    println!("Retry Patterns");
    println!("==============");

    example_basic_retry();
    example_abort();
    example_schedule();
    example_cancellation();
    example_config();

    println!("\n=== All examples completed ===");
}
