//! Idle/demo mode - the computer plays the invaders round
//!
//! Produces the same [`TickInput`] a keyboard would, so the step function
//! cannot tell the difference.

use super::state::GameState;
use super::tick::TickInput;

/// How far above the ship an enemy bullet is considered a threat
const DODGE_LOOKAHEAD: f32 = 120.0;
/// Dead zone around the target column to avoid jitter
const AIM_TOLERANCE: f32 = 2.0;

/// Build input that dodges incoming fire, tracks the lowest invader and shoots
pub fn autopilot_input(state: &GameState, now_ms: f64) -> TickInput {
    let player = &state.player;
    let ship_left = player.pos.x;
    let ship_right = player.pos.x + player.size.x;
    let mut input = TickInput {
        fire: true,
        now_ms,
        ..Default::default()
    };

    // Dodge: nearest enemy bullet falling onto the ship
    let threat = state
        .enemy_bullets
        .iter()
        .filter(|b| {
            let bottom = b.pos.y + b.size.y;
            bottom <= player.pos.y + player.size.y
                && player.pos.y - bottom < DODGE_LOOKAHEAD
                && b.pos.x + b.size.x > ship_left
                && b.pos.x < ship_right
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(bullet) = threat {
        let bullet_center = bullet.pos.x + bullet.size.x / 2.0;
        let room_right = state.tuning.playfield_width - ship_right;
        // Step away from the bullet, unless pinned against a wall
        if bullet_center < player.center_x() && room_right > player.speed {
            input.right = true;
        } else if ship_left > player.speed {
            input.left = true;
        } else {
            input.right = true;
        }
        return input;
    }

    // Track: the lowest alive invader, nearest to the ship on ties
    let target = state.alive_invaders().max_by(|a, b| {
        a.pos
            .y
            .total_cmp(&b.pos.y)
            .then_with(|| {
                let da = (a.pos.x + a.size.x / 2.0 - player.center_x()).abs();
                let db = (b.pos.x + b.size.x / 2.0 - player.center_x()).abs();
                db.total_cmp(&da)
            })
    });

    if let Some(invader) = target {
        let aim = invader.pos.x + invader.size.x / 2.0;
        let delta = aim - player.center_x();
        if delta > AIM_TOLERANCE {
            input.right = true;
        } else if delta < -AIM_TOLERANCE {
            input.left = true;
        }
    }

    input
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::state::Bullet;

    #[test]
    fn test_always_fires() {
        let state = GameState::with_seed(1);
        assert!(autopilot_input(&state, 0.0).fire);
    }

    #[test]
    fn test_tracks_lowest_nearest_invader() {
        let mut state = GameState::with_seed(1);
        // Ship centre at 400; nearest bottom-row invader centre is 395 (column 7)
        let input = autopilot_input(&state, 0.0);
        assert!(input.left);
        assert!(!input.right);

        state.player.pos.x = 0.0;
        let input = autopilot_input(&state, 0.0);
        assert!(input.right);
    }

    #[test]
    fn test_dodges_falling_bullet() {
        let mut state = GameState::with_seed(1);
        let ship_center = state.player.center_x();
        state.enemy_bullets.push(Bullet {
            pos: Vec2::new(ship_center - 6.0, state.player.pos.y - 40.0),
            size: Vec2::new(4.0, 10.0),
            vel_y: 3.0,
        });
        let input = autopilot_input(&state, 0.0);
        assert!(input.right);
        assert!(!input.left);
    }

    #[test]
    fn test_ignores_distant_bullets() {
        let mut state = GameState::with_seed(1);
        state.enemy_bullets.push(Bullet {
            pos: Vec2::new(state.player.center_x(), 100.0),
            size: Vec2::new(4.0, 10.0),
            vel_y: 3.0,
        });
        let input = autopilot_input(&state, 0.0);
        assert!(input.left, "should keep tracking instead of dodging");
    }
}
