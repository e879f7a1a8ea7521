//! Testability port for injecting randomness.

/// Source of randomness for every roll the engine makes.
pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    /// Uniform float in `0.0..1.0`.
    fn gen_unit(&self) -> f32;
}
