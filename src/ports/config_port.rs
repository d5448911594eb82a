//! Configuration access port trait.

/// Read-only key/value access by section. Implementations decide how
/// sections and keys are matched (the INI adapter is case-insensitive).
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
