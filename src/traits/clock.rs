//! Wall-clock abstraction.

/// Source of the current time in seconds.
///
/// The pair truncates the value modulo 2^32 and only ever uses differences
/// between two readings.
pub trait Clock: Send + Sync {
    /// Current time in whole seconds.
    fn now(&self) -> u64;
}
