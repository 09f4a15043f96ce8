use std::time::{SystemTime, UNIX_EPOCH};

/// Source of snapshot timestamps, injected so tests can run deterministically.
pub trait TimeSource {
    /// Milliseconds since Unix epoch; successive calls never go backwards.
    fn now_ms(&mut self) -> i64;
}

/// Wall-clock time source with a monotonic guard: if the system clock stalls
/// or steps backwards, ticks keep strictly increasing.
pub struct MsClock {
    last_ms: i64,
}

impl MsClock {
    pub fn new() -> Self {
        Self { last_ms: 0 }
    }
}

impl Default for MsClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MsClock {
    fn now_ms(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        self.last_ms = if now > self.last_ms {
            now
        } else {
            self.last_ms + 1
        };
        self.last_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_strictly_increasing() {
        let mut clock = MsClock::new();
        let mut prev = clock.now_ms();
        for _ in 0..100 {
            let next = clock.now_ms();
            assert!(next > prev, "expected {next} > {prev}");
            prev = next;
        }
    }
}
