//! Property tests for the invaders step function

use arcade_sim::consts::FRAME_MS;
use arcade_sim::sim::{Bullet, GamePhase, GameState, TickInput, tick};
use glam::Vec2;
use proptest::prelude::*;

fn input_strategy() -> impl Strategy<Value = (bool, bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>(), prop::bool::weighted(0.02))
}

fn to_input((left, right, fire, pause): (bool, bool, bool, bool), frame: usize) -> TickInput {
    TickInput {
        left,
        right,
        fire,
        pause,
        now_ms: frame as f64 * FRAME_MS,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn player_stays_inside_the_playfield(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..400),
    ) {
        let mut state = GameState::with_seed(seed);
        let max_x = state.tuning.playfield_width - state.player.size.x;

        for (frame, sampled) in inputs.into_iter().enumerate() {
            tick(&mut state, &to_input(sampled, frame));
            prop_assert!(state.player.pos.x >= 0.0);
            prop_assert!(state.player.pos.x <= max_x);
        }
    }

    #[test]
    fn lives_only_fall_and_zero_means_game_over(
        seed in any::<u64>(),
        hits in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let mut state = GameState::with_seed(seed);
        let mut lives = state.lives;

        for (frame, hit) in hits.into_iter().enumerate() {
            if hit {
                let bullet = Bullet {
                    pos: Vec2::new(state.player.center_x() - 2.0, state.player.pos.y),
                    size: Vec2::new(4.0, 10.0),
                    vel_y: state.tuning.enemy_bullet_speed,
                };
                state.enemy_bullets.push(bullet);
            }
            tick(&mut state, &to_input((false, false, false, false), frame));

            prop_assert!(state.lives <= lives);
            prop_assert!(lives - state.lives <= 1, "at most one life per tick");
            lives = state.lives;
            if state.lives == 0 {
                prop_assert_eq!(state.phase, GamePhase::GameOver);
            }
        }
    }

    #[test]
    fn restart_always_yields_the_same_round(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 0..150),
    ) {
        let mut state = GameState::with_seed(seed);
        for (frame, sampled) in inputs.into_iter().enumerate() {
            tick(&mut state, &to_input(sampled, frame));
        }

        state.restart();
        let first = serde_json::to_string(&state).unwrap();
        state.restart();
        let second = serde_json::to_string(&state).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(state.phase, GamePhase::Running);
        prop_assert_eq!(state.score, 0);
        prop_assert_eq!(state.alive_count(), state.invaders.len());
    }

    #[test]
    fn overlapping_bullet_kills_exactly_one(
        seed in any::<u64>(),
        target in 0usize..55,
        dx in 0.0f32..26.0,
        dy in -5.0f32..15.0,
    ) {
        let mut state = GameState::with_seed(seed);
        let invader = state.invaders[target].clone();
        let speed = state.tuning.player_bullet_speed;
        state.player_bullets.push(Bullet {
            pos: Vec2::new(invader.pos.x + dx, invader.pos.y + dy + speed),
            size: Vec2::new(4.0, 10.0),
            vel_y: -speed,
        });

        tick(&mut state, &to_input((false, false, false, false), 0));

        prop_assert!(!state.invaders[target].alive);
        prop_assert_eq!(state.alive_count(), 54);
        prop_assert_eq!(state.score, u64::from(invader.points));
        prop_assert!(state.player_bullets.is_empty());
    }

    #[test]
    fn same_seed_same_inputs_same_outcome(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..200),
    ) {
        let mut a = GameState::with_seed(seed);
        let mut b = GameState::with_seed(seed);
        for (frame, sampled) in inputs.into_iter().enumerate() {
            let input = to_input(sampled, frame);
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
