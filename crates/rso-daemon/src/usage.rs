//! Exogenous usage dynamics for autonomous training

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TrainingConfig;

/// Source of the next usage value during a training step
pub trait UsageModel: Send {
    fn next_usage(&mut self, current: u64) -> u64;
}

/// Random walk: with some probability, shift usage by a uniform delta,
/// never going below zero.
pub struct RandomWalk {
    rng: StdRng,
    change_probability: f64,
    min_delta: i64,
    max_delta: i64,
}

impl RandomWalk {
    pub fn new(change_probability: f64, min_delta: i64, max_delta: i64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            change_probability,
            min_delta,
            max_delta,
        }
    }

    pub fn from_config(config: &TrainingConfig, seed: Option<u64>) -> Self {
        Self::new(
            config.change_probability,
            config.min_delta,
            config.max_delta,
            seed,
        )
    }
}

impl UsageModel for RandomWalk {
    fn next_usage(&mut self, current: u64) -> u64 {
        if self.rng.gen::<f64>() >= self.change_probability {
            return current;
        }
        let delta = self.rng.gen_range(self.min_delta..=self.max_delta);
        current.saturating_add_signed(delta)
    }
}

/// Usage never changes
#[derive(Debug, Default, Clone, Copy)]
pub struct Fixed;

impl UsageModel for Fixed {
    fn next_usage(&mut self, current: u64) -> u64 {
        current
    }
}

/// Replays a fixed sequence of usage values, then holds the last one
#[derive(Debug, Clone)]
pub struct Scripted {
    values: std::collections::VecDeque<u64>,
}

impl Scripted {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl UsageModel for Scripted {
    fn next_usage(&mut self, current: u64) -> u64 {
        self.values.pop_front().unwrap_or(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_bounds() {
        let mut walk = RandomWalk::new(0.5, -5, 14, Some(3));
        let mut usage = 20u64;
        for _ in 0..10_000 {
            let next = walk.next_usage(usage);
            let delta = next as i64 - usage as i64;
            assert!((-5..=14).contains(&delta));
            usage = next;
        }
    }

    #[test]
    fn test_random_walk_clamps_at_zero() {
        let mut walk = RandomWalk::new(1.0, -5, -5, Some(1));
        assert_eq!(walk.next_usage(3), 0);
        assert_eq!(walk.next_usage(0), 0);
    }

    #[test]
    fn test_random_walk_change_rate() {
        let mut walk = RandomWalk::new(0.5, 1, 1, Some(9));
        let changed = (0..10_000).filter(|_| walk.next_usage(100) != 100).count();
        assert!((4_500..5_500).contains(&changed), "changed {changed} times");
    }

    #[test]
    fn test_zero_probability_never_changes() {
        let mut walk = RandomWalk::new(0.0, -5, 14, Some(4));
        for _ in 0..1_000 {
            assert_eq!(walk.next_usage(42), 42);
        }
    }

    #[test]
    fn test_fixed_and_scripted() {
        assert_eq!(Fixed.next_usage(7), 7);

        let mut scripted = Scripted::new([10, 20]);
        assert_eq!(scripted.next_usage(0), 10);
        assert_eq!(scripted.next_usage(10), 20);
        assert_eq!(scripted.next_usage(20), 20);
    }
}
