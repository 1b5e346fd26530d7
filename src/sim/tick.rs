//! Discrete simulation tick
//!
//! Advances the invaders round by one step. The order of operations is fixed:
//! player movement, player fire, formation, enemy fire, bullets, collisions,
//! terminal check.

use rand::Rng;

use super::collision::resolve_collisions;
use super::state::{Bullet, GameEvent, GamePhase, GameState};

/// Input for a single tick, sampled from held-key state
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move left held
    pub left: bool,
    /// Move right held
    pub right: bool,
    /// Fire held
    pub fire: bool,
    /// Pause toggle pressed since the previous sample
    pub pause: bool,
    /// Host wall-clock time in milliseconds
    pub now_ms: f64,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                log::info!("Paused at tick {}", state.time_ticks);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                state.events.push(GameEvent::Resumed);
                log::info!("Resumed at tick {}", state.time_ticks);
            }
            GamePhase::GameOver | GamePhase::Victory => {}
        }
    }

    // Don't tick unless running
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;

    move_player(state, input);
    player_fire(state, input);
    advance_formation(state);
    enemy_fire(state, input.now_ms);
    advance_bullets(state);
    apply_collisions(state);
    check_terminal(state);
}

/// Horizontal movement, clamped to the playfield
fn move_player(state: &mut GameState, input: &TickInput) {
    let max_x = state.tuning.playfield_width - state.player.size.x;
    let player = &mut state.player;

    if input.left {
        player.pos.x = (player.pos.x - player.speed).max(0.0);
    }
    if input.right {
        player.pos.x = (player.pos.x + player.speed).min(max_x);
    }
}

/// Spawn a player bullet when fire is held and the cooldown has run out
///
/// The cooldown is decremented in the same tick it is armed, so shots are
/// exactly `shoot_cooldown_ticks` ticks apart while fire is held.
fn player_fire(state: &mut GameState, input: &TickInput) {
    if input.fire && state.player.shoot_cooldown == 0 {
        let bullet = Bullet::from_player(&state.player, &state.tuning);
        state.player_bullets.push(bullet);
        state.player.shoot_cooldown = state.tuning.shoot_cooldown_ticks;
        state.events.push(GameEvent::PlayerFired);
    }

    state.player.shoot_cooldown = state.player.shoot_cooldown.saturating_sub(1);
}

/// Edge check, optional reversal and descent, then horizontal translation
fn advance_formation(state: &mut GameState) {
    let width = state.tuning.playfield_width;
    let at_edge = state
        .invaders
        .iter()
        .filter(|i| i.alive)
        .any(|i| i.pos.x <= 0.0 || i.pos.x + i.size.x >= width);

    // One reversal per edge contact, not per touching invader
    if at_edge {
        state.formation.direction = -state.formation.direction;
        state.formation.speed += state.tuning.formation_speed_increment;
        let descent = state.tuning.formation_descent;
        for invader in state.invaders.iter_mut().filter(|i| i.alive) {
            invader.pos.y += descent;
        }
        state.events.push(GameEvent::FormationReversed);
        log::debug!(
            "Formation reversed: direction={}, speed={:.2}",
            state.formation.direction,
            state.formation.speed
        );
    }

    // Uses the direction and speed updated above
    let dx = state.formation.step();
    for invader in state.invaders.iter_mut().filter(|i| i.alive) {
        invader.pos.x += dx;
    }
}

/// At most one enemy shot per wall-clock interval, from a random alive invader
fn enemy_fire(state: &mut GameState, now_ms: f64) {
    let due = match state.last_enemy_shot_ms {
        None => true,
        Some(last) => now_ms - last > state.tuning.enemy_shoot_interval_ms,
    };
    if !due {
        return;
    }

    let alive: Vec<usize> = state
        .invaders
        .iter()
        .enumerate()
        .filter(|(_, i)| i.alive)
        .map(|(idx, _)| idx)
        .collect();
    if alive.is_empty() {
        return;
    }

    let shooter = alive[state.rng.random_range(0..alive.len())];
    let bullet = Bullet::from_invader(&state.invaders[shooter], &state.tuning);
    state.enemy_bullets.push(bullet);
    state.last_enemy_shot_ms = Some(now_ms);
    state.events.push(GameEvent::EnemyFired);
}

/// Move both pools and drop bullets that left the playfield
fn advance_bullets(state: &mut GameState) {
    let height = state.tuning.playfield_height;

    for bullet in state
        .player_bullets
        .iter_mut()
        .chain(state.enemy_bullets.iter_mut())
    {
        bullet.advance();
    }

    state.player_bullets.retain(|b| !b.is_out_of_bounds(height));
    state.enemy_bullets.retain(|b| !b.is_out_of_bounds(height));
}

/// Run the collision pass and apply score and lives
fn apply_collisions(state: &mut GameState) {
    let report = resolve_collisions(
        &state.player,
        &mut state.invaders,
        &mut state.player_bullets,
        &mut state.enemy_bullets,
    );

    for hit in &report.invader_hits {
        state.score += u64::from(hit.points);
        state.events.push(GameEvent::InvaderDestroyed {
            kind: hit.kind,
            points: hit.points,
        });
    }

    if report.player_hit {
        state.lives = state.lives.saturating_sub(1);
        state.events.push(GameEvent::PlayerHit {
            lives_left: state.lives,
        });
        log::info!("Player hit, {} lives left", state.lives);
    }

    // Instant loss regardless of remaining lives
    if report.ground_invasion {
        state.lives = 0;
        state.events.push(GameEvent::GroundInvasion);
        log::info!("Invaders reached the ground");
    }
}

/// Lives exhausted ends the round; otherwise an empty grid wins it
fn check_terminal(state: &mut GameState) {
    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over: score {}", state.score);
    } else if state.alive_count() == 0 {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
        log::info!("Victory: score {}", state.score);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::state::InvaderKind;

    /// No keys held, clock frozen at t=0
    fn quiet() -> TickInput {
        TickInput::default()
    }

    /// A round whose enemy fire timer is already armed at t=0
    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::with_seed(seed);
        state.last_enemy_shot_ms = Some(0.0);
        state
    }

    #[test]
    fn test_player_clamped_left() {
        let mut state = quiet_state(1);
        let input = TickInput {
            left: true,
            ..quiet()
        };
        for _ in 0..200 {
            tick(&mut state, &input);
            assert!(state.player.pos.x >= 0.0);
        }
        assert_eq!(state.player.pos.x, 0.0);
    }

    #[test]
    fn test_player_clamped_right() {
        let mut state = quiet_state(1);
        let input = TickInput {
            right: true,
            ..quiet()
        };
        for _ in 0..200 {
            tick(&mut state, &input);
        }
        assert_eq!(state.player.pos.x, 760.0);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = quiet_state(1);
        let input = TickInput {
            fire: true,
            ..quiet()
        };

        tick(&mut state, &input);
        assert_eq!(state.player_bullets.len(), 1);
        assert!(state.events.contains(&GameEvent::PlayerFired));

        for _ in 0..14 {
            tick(&mut state, &input);
        }
        assert_eq!(state.player_bullets.len(), 1);

        // 16th tick: cooldown of 15 has elapsed
        tick(&mut state, &input);
        assert_eq!(state.player_bullets.len(), 2);
    }

    #[test]
    fn test_first_enemy_shot_is_immediate_then_interval_bound() {
        let mut state = GameState::with_seed(42);
        let mut input = TickInput::default();

        tick(&mut state, &input);
        assert_eq!(state.enemy_bullets.len(), 1);

        input.now_ms = 1000.0;
        tick(&mut state, &input);
        assert_eq!(state.enemy_bullets.len(), 1, "interval must be exceeded");

        input.now_ms = 1000.5;
        tick(&mut state, &input);
        assert_eq!(state.enemy_bullets.len(), 2);
    }

    #[test]
    fn test_enemy_shooter_is_alive() {
        let mut state = GameState::with_seed(9);
        for invader in state.invaders.iter_mut().skip(1) {
            invader.alive = false;
        }
        tick(&mut state, &TickInput::default());
        let bullet = &state.enemy_bullets[0];
        let shooter = &state.invaders[0];
        assert_eq!(bullet.pos.x, shooter.pos.x + shooter.size.x / 2.0 - 2.0);
    }

    #[test]
    fn test_formation_moves_right_then_reverses_once() {
        let mut state = quiet_state(1);
        let start_y = state.invaders[0].pos.y;

        tick(&mut state, &quiet());
        assert_eq!(state.invaders[0].pos.x, 100.5);

        // Push the grid's right column onto the right edge
        let shift = 800.0 - state.invaders[10].pos.x - state.invaders[10].size.x;
        for invader in state.invaders.iter_mut() {
            invader.pos.x += shift;
        }
        let x_before = state.invaders[0].pos.x;

        tick(&mut state, &quiet());

        assert_eq!(state.formation.direction, -1.0);
        assert!((state.formation.speed - 0.6).abs() < 1e-6);
        assert_eq!(state.invaders[0].pos.y, start_y + 20.0);
        assert!((state.invaders[0].pos.x - (x_before - 0.6)).abs() < 1e-4);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| **e == GameEvent::FormationReversed)
                .count(),
            1
        );
    }

    #[test]
    fn test_formation_reverses_at_left_edge() {
        let mut state = quiet_state(1);
        state.formation.direction = -1.0;
        let start_y = state.invaders[0].pos.y;

        // Left column flush with the left edge
        let shift = state.invaders[0].pos.x;
        for invader in state.invaders.iter_mut() {
            invader.pos.x -= shift;
        }
        assert_eq!(state.invaders[0].pos.x, 0.0);

        tick(&mut state, &quiet());

        assert_eq!(state.formation.direction, 1.0);
        assert!((state.formation.speed - 0.6).abs() < 1e-6);
        assert_eq!(state.invaders[0].pos.y, start_y + 20.0);
        assert!((state.invaders[0].pos.x - 0.6).abs() < 1e-4);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| **e == GameEvent::FormationReversed)
                .count(),
            1
        );

        // No second reversal once the grid is back in bounds
        tick(&mut state, &quiet());
        assert_eq!(state.formation.direction, 1.0);
        assert!((state.invaders[0].pos.x - 1.2).abs() < 1e-4);
        assert!(!state.events.contains(&GameEvent::FormationReversed));
    }

    #[test]
    fn test_dead_invaders_do_not_move() {
        let mut state = quiet_state(1);
        state.invaders[3].alive = false;
        let frozen = state.invaders[3].pos;
        for _ in 0..10 {
            tick(&mut state, &quiet());
        }
        assert_eq!(state.invaders[3].pos, frozen);
    }

    #[test]
    fn test_bullet_leaves_pool_at_top() {
        let mut state = quiet_state(1);
        // Only the far-right column survives, well clear of the shot
        for invader in state.invaders.iter_mut() {
            invader.alive = invader.pos.x >= 500.0;
        }
        let fire = TickInput {
            fire: true,
            ..quiet()
        };
        tick(&mut state, &fire);
        assert_eq!(state.player_bullets.len(), 1);

        let mut ticks = 0;
        while !state.player_bullets.is_empty() {
            tick(&mut state, &quiet());
            ticks += 1;
            assert!(ticks < 200);
        }
        assert_eq!(state.player_bullets.len(), 0);
    }

    #[test]
    fn test_kill_scores_points() {
        let mut state = quiet_state(1);
        let target = state.invaders[0].clone();
        state.player_bullets.push(Bullet {
            pos: Vec2::new(target.pos.x + 10.5, target.pos.y + 12.0),
            size: Vec2::new(4.0, 10.0),
            vel_y: -7.0,
        });

        tick(&mut state, &quiet());

        assert!(!state.invaders[0].alive);
        assert_eq!(state.score, 20);
        assert!(state.events.contains(&GameEvent::InvaderDestroyed {
            kind: InvaderKind::Strong,
            points: 20,
        }));
    }

    #[test]
    fn test_last_kill_is_victory_same_tick() {
        let mut state = quiet_state(1);
        for invader in state.invaders.iter_mut().skip(1) {
            invader.alive = false;
        }
        let target = state.invaders[0].clone();
        state.player_bullets.push(Bullet {
            pos: Vec2::new(target.pos.x + 10.5, target.pos.y + 12.0),
            size: Vec2::new(4.0, 10.0),
            vel_y: -7.0,
        });

        tick(&mut state, &quiet());

        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.is_victory());
        let frozen = state.invaders[0].pos;
        tick(&mut state, &quiet());
        assert_eq!(state.invaders[0].pos, frozen);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_ground_invasion_is_instant_loss() {
        let mut state = quiet_state(1);
        let player_y = state.player.pos.y;
        for invader in state.invaders.iter_mut() {
            invader.pos.y += player_y - 190.0 - 1.0;
        }

        // Bottom edge one pixel above the player's line
        tick(&mut state, &quiet());
        assert_eq!(state.phase, GamePhase::Running);

        for invader in state.invaders.iter_mut() {
            invader.pos.y += 1.0;
        }
        tick(&mut state, &quiet());
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GroundInvasion));
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut state = quiet_state(1);
        let pause = TickInput {
            pause: true,
            ..quiet()
        };

        tick(&mut state, &quiet());
        let x = state.invaders[0].pos.x;

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.invaders[0].pos.x, x);

        for _ in 0..5 {
            tick(&mut state, &quiet());
        }
        assert_eq!(state.invaders[0].pos.x, x);
        assert_eq!(state.time_ticks, 1);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time_ticks, 2);
        assert!(state.events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut state = quiet_state(1);
        state.phase = GamePhase::GameOver;
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..quiet()
            },
        );
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::with_seed(99999);
        let mut state2 = GameState::with_seed(99999);

        for i in 0..600 {
            let input = TickInput {
                left: i % 90 < 40,
                right: i % 90 >= 50,
                fire: i % 3 == 0,
                pause: false,
                now_ms: i as f64 * 16.0,
            };
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }

        assert_eq!(
            serde_json::to_string(&state1).unwrap(),
            serde_json::to_string(&state2).unwrap()
        );
    }
}
