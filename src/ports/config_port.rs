//! Run configuration port.
//!
//! Keys are addressed as `[section] key`. Typed getters fall back to
//! `default` when the key is missing or does not parse; validation that must
//! tell those cases apart reads the raw string.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Trimmed value, or `default` when missing.
    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    }
}
