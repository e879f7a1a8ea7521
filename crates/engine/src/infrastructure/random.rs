//! Random implementations and the small roll helpers built on them.

use crate::infrastructure::ports::RandomPort;

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_unit(&self) -> f32 {
        use rand::Rng;
        rand::thread_rng().gen::<f32>()
    }
}

/// Uniform value in `0..bound`. A zero bound yields 0.
pub fn below(random: &dyn RandomPort, bound: u32) -> u32 {
    if bound <= 1 {
        return 0;
    }
    let max = i32::try_from(bound - 1).unwrap_or(i32::MAX);
    u32::try_from(random.gen_range(0, max)).unwrap_or(0)
}

/// `true` with probability `1 / divisor`.
pub fn one_in(random: &dyn RandomPort, divisor: u32) -> bool {
    divisor > 0 && below(random, divisor) == 0
}

pub fn coin_flip(random: &dyn RandomPort) -> bool {
    random.gen_range(0, 1) == 1
}

/// Signed offset in `-distance..=distance`.
pub fn offset(random: &dyn RandomPort, distance: i32) -> i32 {
    random.gen_range(-distance, distance)
}

pub fn pick<'a, T>(random: &dyn RandomPort, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = below(random, u32::try_from(items.len()).unwrap_or(u32::MAX));
    items.get(index as usize)
}

/// A pitch around `base`, varied by up to `spread`.
pub fn jitter(random: &dyn RandomPort, base: f32, spread: f32) -> f32 {
    base + random.gen_unit() * spread
}

/// Fisher-Yates shuffle driven by the port.
pub fn shuffle<T>(random: &dyn RandomPort, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = below(random, u32::try_from(i + 1).unwrap_or(u32::MAX)) as usize;
        items.swap(i, j);
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max.max(min))
    }

    fn gen_unit(&self) -> f32 {
        0.0
    }
}

/// Replays a script of rolls, then repeats the last one.
#[cfg(test)]
pub struct ScriptedRandom {
    rolls: std::sync::Mutex<std::collections::VecDeque<i32>>,
    last: std::sync::atomic::AtomicI32,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: std::sync::Mutex::new(rolls.into_iter().collect()),
            last: std::sync::atomic::AtomicI32::new(0),
        }
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use std::sync::atomic::Ordering;
        let next = self
            .rolls
            .lock()
            .ok()
            .and_then(|mut rolls| rolls.pop_front());
        let value = match next {
            Some(value) => {
                self.last.store(value, Ordering::SeqCst);
                value
            }
            None => self.last.load(Ordering::SeqCst),
        };
        value.clamp(min, max.max(min))
    }

    fn gen_unit(&self) -> f32 {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_stays_in_bounds() {
        let random = SystemRandom::new();
        for _ in 0..500 {
            assert!(below(&random, 7) < 7);
        }
        assert_eq!(below(&random, 0), 0);
    }

    #[test]
    fn shuffle_keeps_every_item() {
        let random = SystemRandom::new();
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&random, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn fixed_random_is_clamped_into_range() {
        let random = FixedRandom(100);
        assert_eq!(random.gen_range(0, 5), 5);
        assert!(one_in(&FixedRandom(0), 600));
        assert!(!one_in(&FixedRandom(3), 600));
    }

    #[test]
    fn scripted_random_replays_then_repeats() {
        let random = ScriptedRandom::new([2, 4]);
        assert_eq!(random.gen_range(0, 9), 2);
        assert_eq!(random.gen_range(0, 9), 4);
        assert_eq!(random.gen_range(0, 9), 4);
    }
}
