//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per call, driven by sampled input
//! - Seeded RNG only
//! - Stable iteration order (grid index, pool order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod snake;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_input;
pub use collision::{Aabb, CollisionReport, InvaderHit, resolve_collisions};
pub use snake::{Direction, SnakeEvent, SnakeState};
pub use state::{
    Bullet, BulletOwner, Formation, GameEvent, GamePhase, GameState, Invader, InvaderKind, Player,
    spawn_invader_grid,
};
pub use tick::{TickInput, tick};
