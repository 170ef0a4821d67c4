//! Retry backoff helpers.
//!
//! Overlap retries back off along the Fibonacci sequence: aggressive while a
//! same-day overlap is likely transient, slower once it is not.

use std::time::Duration;

/// nth Fibonacci number, `fibonacci(0) = 0`, `fibonacci(1) = 1`.
pub fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a + b);
    }
    a
}

/// Delay after failed attempt `attempt` (1-indexed):
/// `fibonacci(attempt + 1)` minutes, i.e. 1, 2, 3, 5, 8... minutes.
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(fibonacci(attempt + 1) * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_sequence() {
        let seq: Vec<u64> = (0..10).map(fibonacci).collect();
        assert_eq!(seq, vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
    }

    #[test]
    fn retry_delays_grow_along_fibonacci_minutes() {
        let minutes: Vec<u64> = (1..=5)
            .map(|attempt| retry_delay(attempt).as_secs() / 60)
            .collect();
        assert_eq!(minutes, vec![1, 2, 3, 5, 8]);
    }
}
