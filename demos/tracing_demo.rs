//! Tracing Demo
//!
//! Shows the events the retry loop emits. Run with:
//!
//! ```sh
//! cargo run --example tracing_demo --features async
//! ```

use std::time::Duration;

use persevere::{Outcome, Retry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let retry = Retry::builder(4)
        .wait(Duration::from_millis(50))
        .expect("positive wait")
        .backoff(Duration::from_millis(200))
        .expect("positive backoff")
        .build();

    let result = retry
        .run_async(|attempt| async move {
            tracing::info!(attempt, "calling flaky service");
            Outcome::Transient("503 service unavailable")
        })
        .await;

    tracing::info!(?result, "done");
}
