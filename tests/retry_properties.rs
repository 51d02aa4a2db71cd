//! Property-based tests for the retry loop and backoff growth

use persevere::jitter::FixedJitter;
use persevere::{Backoff, Never, Outcome, Retry, RetryError};
use proptest::prelude::*;
use std::time::Duration;

/// Nanosecond waits so properties can run many loops quickly.
fn tiny(limit: u32) -> Retry {
    Retry::builder(limit)
        .wait(Duration::from_nanos(1))
        .unwrap()
        .backoff(Duration::from_micros(1))
        .unwrap()
        .no_jitter()
        .build()
}

proptest! {
    #[test]
    fn prop_always_transient_calls_exactly_limit(limit in 2u32..30) {
        let mut calls = 0u32;
        let result = tiny(limit).run(|_| {
            calls += 1;
            Outcome::Transient(())
        });

        prop_assert_eq!(result, Err(RetryError::AttemptsExhausted { attempts: limit }));
        prop_assert_eq!(calls, limit);
    }

    #[test]
    fn prop_unbounded_succeeds_on_nth_call(n in 1u32..60) {
        let mut calls = 0u32;
        let result = tiny(0).run(|attempt| {
            calls += 1;
            if attempt + 1 == n { Outcome::Success } else { Outcome::Transient(attempt) }
        });

        prop_assert_eq!(result, Ok(()));
        prop_assert_eq!(calls, n);
    }

    #[test]
    fn prop_first_abort_is_final(limit in 0u32..50, cause in "[a-z ]{1,20}") {
        let mut calls = 0u32;
        let result = tiny(limit).run(|_| {
            calls += 1;
            Outcome::Abort(cause.clone())
        });

        prop_assert_eq!(calls, 1);
        prop_assert_eq!(result.unwrap_err().into_cause(), Some(cause));
    }

    #[test]
    fn prop_noop_matches_success(limit in 0u32..10, fail_first in 0u32..5) {
        let run = |done: Outcome<()>| {
            let mut calls = 0u32;
            let result = tiny(limit).run(|attempt| {
                calls += 1;
                if attempt < fail_first { Outcome::Transient(()) } else { done.clone() }
            });
            (result, calls)
        };

        prop_assert_eq!(run(Outcome::Success), run(Outcome::NoOp));
    }

    #[test]
    fn prop_single_attempt_never_sleeps(fails in any::<bool>()) {
        let mut calls = 0u32;
        let mut sleeps = 0u32;
        let _ = tiny(1).run_with_hooks(
            &Never,
            |_| {
                calls += 1;
                if fails { Outcome::Transient(()) } else { Outcome::Success }
            },
            |_| sleeps += 1,
        );

        prop_assert_eq!(calls, 1);
        prop_assert_eq!(sleeps, 0);
    }

    #[test]
    fn prop_backoff_doubles_then_holds(base_ms in 1u64..1000, steps in 1u32..12, extra in 0u32..10) {
        let base = Duration::from_millis(base_ms);
        let ceiling = base * 2u32.pow(steps);
        let waits: Vec<_> = Backoff::new(base, ceiling).waits(steps + extra + 1).collect();

        for (k, wait) in waits.iter().enumerate().take(steps as usize + 1) {
            prop_assert_eq!(*wait, base * 2u32.pow(k as u32));
        }
        for wait in &waits[steps as usize..] {
            prop_assert_eq!(*wait, ceiling);
        }
        prop_assert!(waits.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_jitter_never_shrinks_wait(base_ms in 1u64..100, jitter_ms in 0u64..50, attempts in 1u32..20) {
        let base = Duration::from_millis(base_ms);
        let ceiling = base * 16;
        let jitter = FixedJitter(Duration::from_millis(jitter_ms));

        let mut plain = Backoff::new(base, ceiling);
        let mut jittered = Backoff::new(base, ceiling);
        for attempt in 1..=attempts {
            plain.grow(attempt, None);
            jittered.grow(attempt, Some(&jitter));
            prop_assert!(jittered.current() >= plain.current());
            prop_assert!(jittered.current() <= plain.current() + jitter.0);
        }
    }
}
