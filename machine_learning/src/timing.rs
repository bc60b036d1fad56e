use std::time::{Duration, Instant};

/// Runs `f` and measures how long it took.
///
/// # Returns
/// The value returned by `f` and the elapsed wall time.
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_closure_output() {
        let (out, elapsed) = timed(|| 2 + 2);
        assert_eq!(out, 4);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn measures_at_least_the_sleep() {
        let (_, elapsed) = timed(|| std::thread::sleep(Duration::from_millis(5)));
        assert!(elapsed >= Duration::from_millis(5));
    }
}
