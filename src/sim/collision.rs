//! Collision detection and resolution
//!
//! Everything here is axis-aligned rectangles. Resolution only marks and
//! removes; score and lives are applied by the tick that called it.

use glam::Vec2;

use super::state::{Bullet, Invader, InvaderKind, Player};

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap on both axes; touching edges do not collide
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

/// An invader killed by a player bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvaderHit {
    /// Index into the invader grid
    pub index: usize,
    pub kind: InvaderKind,
    pub points: u32,
}

/// Outcome of one collision pass
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub invader_hits: Vec<InvaderHit>,
    /// An enemy bullet struck the ship
    pub player_hit: bool,
    /// An alive invader reached the player's line
    pub ground_invasion: bool,
}

/// Match player bullets against alive invaders
///
/// Bullets are checked in pool order, oldest first, so when two bullets
/// overlap the same invader the older one takes the kill and the newer one
/// stays in flight. Each bullet scans the grid from the last index
/// (bottom-right) backwards and stops at the first alive invader it overlaps,
/// so one bullet kills at most one invader per pass.
pub fn resolve_player_bullets(
    bullets: &mut Vec<Bullet>,
    invaders: &mut [Invader],
) -> Vec<InvaderHit> {
    let mut hits = Vec::new();

    bullets.retain(|bullet| {
        let bullet_box = bullet.aabb();
        let target = invaders
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, invader)| invader.alive && bullet_box.intersects(&invader.aabb()));

        match target {
            Some((index, invader)) => {
                invader.alive = false;
                hits.push(InvaderHit {
                    index,
                    kind: invader.kind,
                    points: invader.points,
                });
                false
            }
            None => true,
        }
    });

    hits
}

/// Match enemy bullets against the ship
///
/// The first overlapping bullet is consumed and reported; at most one life
/// is lost per pass. Other overlapping bullets stay in flight.
pub fn resolve_enemy_bullets(bullets: &mut Vec<Bullet>, player: &Player) -> bool {
    let player_box = player.aabb();
    match bullets
        .iter()
        .position(|bullet| bullet.aabb().intersects(&player_box))
    {
        Some(index) => {
            bullets.remove(index);
            true
        }
        None => false,
    }
}

/// True if any alive invader's bottom edge has reached the player's top edge
pub fn invaders_reached_player(invaders: &[Invader], player: &Player) -> bool {
    invaders
        .iter()
        .any(|invader| invader.alive && invader.bottom() >= player.pos.y)
}

/// Run every collision check in order: player bullets, enemy bullets, ground
pub fn resolve_collisions(
    player: &Player,
    invaders: &mut [Invader],
    player_bullets: &mut Vec<Bullet>,
    enemy_bullets: &mut Vec<Bullet>,
) -> CollisionReport {
    CollisionReport {
        invader_hits: resolve_player_bullets(player_bullets, invaders),
        player_hit: resolve_enemy_bullets(enemy_bullets, player),
        ground_invasion: invaders_reached_player(invaders, player),
    }
}
