//! Configuration access port trait.

use std::time::Duration;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Millisecond value as a `Duration`. Zero, negative or missing is `None`.
    fn get_duration_ms(&self, section: &str, key: &str) -> Option<Duration> {
        match self.get_int(section, key, 0) {
            ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        }
    }
}
