//! Integration tests for the RL engine
//!
//! These tests verify the learner, the exploration schedule and the bounded
//! log work correctly together.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

use rso_rl::{
    decay_epsilon, Action, BoundedLog, EpsilonSchedule, Experience, QLearning, RLAlgorithm,
    RLEngine, StateKey,
};

fn seeded(seed: u64) -> QLearning {
    QLearning::with_seed(0.1, 0.95, seed)
}

/// A fixed self-looping transition converges to r / (1 - gamma)
#[test]
fn test_q_learning_convergence() {
    let mut q = seeded(1);
    let s = StateKey::new(75, 25);
    let reward = 10.0;
    let target = reward / (1.0 - 0.95);

    for _ in 0..2_000 {
        q.update(&Experience::new(s, Action::NoOp, reward, s));
    }

    let value = q.value(&s, Action::NoOp);
    assert!(
        (value - target).abs() < 0.5,
        "value {value:.4} should approach {target:.4}"
    );
    // approaches from below, never overshoots
    assert!(value <= target);
}

/// With a distinct absorbing next state the fixed point is plain r / (1 - gamma)
/// once the next state's value has itself converged.
#[test]
fn test_q_learning_convergence_two_states() {
    let mut q = seeded(2);
    let s = StateKey::new(40, 60);
    let terminal = StateKey::new(90, 10);
    let reward = -4.0;

    for _ in 0..3_000 {
        q.update(&Experience::new(terminal, Action::Grow, reward, terminal));
        q.update(&Experience::new(s, Action::Grow, reward, terminal));
    }

    let target = reward / (1.0 - 0.95);
    assert!((q.value(&terminal, Action::Grow) - target).abs() < 0.1);
    assert!((q.value(&s, Action::Grow) - target).abs() < 0.1);
}

#[test]
fn test_learned_policy_prefers_rewarded_action() {
    let mut engine = RLEngine::with_algorithm(Box::new(seeded(3)), EpsilonSchedule::default());
    let s = StateKey::new(65, 35);

    for _ in 0..500 {
        let action = engine.select_action(&s);
        let reward = match action {
            Action::Shrink => 5.0,
            Action::NoOp => 0.0,
            Action::Grow => -2.0,
        };
        engine.learn(&Experience::new(s, action, reward, s));
    }

    assert_eq!(engine.best_action(&s), Action::Shrink);
    assert_eq!(engine.stats().episodes, 500);
}

#[test]
fn test_epsilon_monotonic_decay() {
    let schedule = EpsilonSchedule::default();
    let mut epsilon = schedule.initial;

    for _ in 0..5_000 {
        let next = schedule.decay(epsilon);
        assert!(next <= epsilon, "epsilon must never increase");
        assert!(next >= 0.01, "epsilon must respect the floor");
        epsilon = next;
    }

    assert_eq!(epsilon, 0.01);
}

#[test]
fn test_epsilon_floor_with_aggressive_decay() {
    let mut epsilon = 1.0;
    for _ in 0..100 {
        epsilon = decay_epsilon(epsilon, 0.1, 0.05);
        assert!(epsilon >= 0.05);
    }
    assert_eq!(epsilon, 0.05);
}

#[test]
fn test_engine_epsilon_tracks_schedule() {
    let mut engine = RLEngine::with_algorithm(Box::new(seeded(4)), EpsilonSchedule::default());
    let s = StateKey::new(50, 50);
    let mut expected = 0.3;

    for _ in 0..50 {
        engine.learn(&Experience::new(s, Action::NoOp, 0.0, s));
        expected = decay_epsilon(expected, 0.995, 0.01);
        assert!((engine.epsilon() - expected).abs() < 1e-12);
    }
}

#[test]
fn test_reset_restores_initial_state() {
    let mut engine = RLEngine::with_algorithm(Box::new(seeded(5)), EpsilonSchedule::default());
    let s = StateKey::new(10, 90);
    for _ in 0..20 {
        engine.learn(&Experience::new(s, Action::Grow, -15.0, s));
    }
    assert!(engine.value(&s, Action::Grow) < 0.0);

    engine.reset();

    assert_eq!(engine.value(&s, Action::Grow), 0.0);
    assert_eq!(engine.epsilon(), 0.3);
    assert_eq!(engine.stats().table_size, 0);
    assert_eq!(engine.total_rewards(), 0.0);
}

#[test]
fn test_same_seed_same_choices() {
    let mut a = seeded(99);
    let mut b = seeded(99);
    let s = StateKey::new(30, 70);

    let picks_a: Vec<Action> = (0..64).map(|_| a.select_action(&s, 0.5)).collect();
    let picks_b: Vec<Action> = (0..64).map(|_| b.select_action(&s, 0.5)).collect();
    assert_eq!(picks_a, picks_b);
}

#[test]
fn test_exploration_rate_roughly_matches_epsilon() {
    let mut q = seeded(11);
    let s = StateKey::new(80, 20);
    // Grow is strictly best, so anything else must come from exploration
    q.update(&Experience::new(s, Action::Grow, 100.0, s));

    let trials = 10_000;
    let non_greedy = (0..trials)
        .filter(|_| q.select_action(&s, 0.3) != Action::Grow)
        .count();

    // expected 0.3 * 2/3 = 0.2
    let ratio = non_greedy as f64 / trials as f64;
    assert!((ratio - 0.2).abs() < 0.03, "non-greedy ratio {ratio:.3}");
}

#[test]
fn test_bounded_log_fifo() {
    let mut log = BoundedLog::new(50);
    for i in 0..120 {
        log.push(i);
        assert!(log.len() <= 50);
    }

    let entries = log.to_vec();
    assert_eq!(entries.first(), Some(&70));
    assert_eq!(entries.last(), Some(&119));
    assert_eq!(log.iter_recent().next(), Some(&119));
}
