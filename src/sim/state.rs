//! Game state and core simulation types
//!
//! Everything the invaders step function reads or writes lives here. The
//! whole round is (re)built by [`GameState::reset`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Current phase of a round
///
/// A single enum instead of independent flags: a round cannot be paused and
/// over at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advances every tick
    Running,
    /// Frozen until the pause key is pressed again
    Paused,
    /// Lives exhausted or ground invaded
    GameOver,
    /// No invader left alive
    Victory,
}

impl GamePhase {
    /// GameOver and Victory stop the simulation until a restart
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal pixels per tick
    pub speed: f32,
    /// Ticks left before the next shot is allowed
    pub shoot_cooldown: u32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                tuning.playfield_width / 2.0 - tuning.player_width / 2.0,
                tuning.player_y(),
            ),
            size: Vec2::new(tuning.player_width, tuning.player_height),
            speed: tuning.player_speed,
            shoot_cooldown: 0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

/// Invader variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvaderKind {
    /// Top rows, worth more
    Strong,
    Normal,
}

/// One cell of the invader grid
///
/// Killed invaders stay in the grid with `alive = false` so indices and
/// geometry remain stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invader {
    pub pos: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub kind: InvaderKind,
    pub points: u32,
}

impl Invader {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Which pool a bullet belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick; negative travels up
    pub vel_y: f32,
}

impl Bullet {
    /// Player bullet centred above the ship's nose
    pub fn from_player(player: &Player, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                player.center_x() - tuning.bullet_width / 2.0,
                player.pos.y - tuning.bullet_height,
            ),
            size: Vec2::new(tuning.bullet_width, tuning.bullet_height),
            vel_y: -tuning.player_bullet_speed,
        }
    }

    /// Enemy bullet dropped from the bottom centre of an invader
    pub fn from_invader(invader: &Invader, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                invader.pos.x + invader.size.x / 2.0 - tuning.bullet_width / 2.0,
                invader.bottom(),
            ),
            size: Vec2::new(tuning.bullet_width, tuning.bullet_height),
            vel_y: tuning.enemy_bullet_speed,
        }
    }

    pub fn owner(&self) -> BulletOwner {
        if self.vel_y < 0.0 {
            BulletOwner::Player
        } else {
            BulletOwner::Enemy
        }
    }

    pub fn advance(&mut self) {
        self.pos.y += self.vel_y;
    }

    /// True once the bullet has left the playfield in its travel direction
    pub fn is_out_of_bounds(&self, playfield_height: f32) -> bool {
        match self.owner() {
            BulletOwner::Player => self.pos.y <= 0.0,
            BulletOwner::Enemy => self.pos.y >= playfield_height,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Shared movement of the invader grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    /// +1.0 moves right, -1.0 moves left
    pub direction: f32,
    /// Horizontal pixels per tick
    pub speed: f32,
}

impl Formation {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            direction: 1.0,
            speed: tuning.formation_start_speed,
        }
    }

    /// Horizontal displacement applied to every alive invader this tick
    pub fn step(&self) -> f32 {
        self.speed * self.direction
    }
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PlayerFired,
    EnemyFired,
    InvaderDestroyed { kind: InvaderKind, points: u32 },
    PlayerHit { lives_left: u8 },
    FormationReversed,
    GroundInvasion,
    Paused,
    Resumed,
    GameOver,
    Victory,
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete invaders round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG is rebuilt from on every reset
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Simulated ticks since the last reset
    pub time_ticks: u64,
    pub player: Player,
    /// Row-major grid, top-left first
    pub invaders: Vec<Invader>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub formation: Formation,
    /// Wall-clock time of the last enemy shot; `None` until the first one
    pub last_enemy_shot_ms: Option<f64>,
    /// Events produced by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Shooter selection source
    #[serde(skip, default = "unseeded_rng")]
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a running round with the given seed and balance
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            player: Player::new(&tuning),
            invaders: Vec::new(),
            formation: Formation::new(&tuning),
            lives: tuning.start_lives,
            tuning,
            phase: GamePhase::Running,
            score: 0,
            time_ticks: 0,
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            last_enemy_shot_ms: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset();
        state
    }

    /// Create a running round with default balance
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default())
    }

    /// Reinitialize every entity, counter and the RNG to round-start values
    pub fn reset(&mut self) {
        self.phase = GamePhase::Running;
        self.score = 0;
        self.lives = self.tuning.start_lives;
        self.time_ticks = 0;
        self.player = Player::new(&self.tuning);
        self.invaders = spawn_invader_grid(&self.tuning);
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.formation = Formation::new(&self.tuning);
        self.last_enemy_shot_ms = None;
        self.events.clear();
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    /// Start over with the same seed (always available, from any phase)
    pub fn restart(&mut self) {
        self.reset();
        log::info!("Invaders restarted (seed {})", self.seed);
    }

    /// Start over with a fresh seed
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.restart();
    }

    pub fn alive_count(&self) -> usize {
        self.invaders.iter().filter(|i| i.alive).count()
    }

    pub fn alive_invaders(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter().filter(|i| i.alive)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_victory(&self) -> bool {
        self.phase == GamePhase::Victory
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }
}

/// Build the full rows × columns grid, all alive
pub fn spawn_invader_grid(tuning: &Tuning) -> Vec<Invader> {
    let size = Vec2::new(tuning.invader_width, tuning.invader_height);
    let mut invaders = Vec::with_capacity((tuning.invader_rows * tuning.invader_cols) as usize);

    for row in 0..tuning.invader_rows {
        let (kind, points) = if row < tuning.strong_rows {
            (InvaderKind::Strong, tuning.strong_points)
        } else {
            (InvaderKind::Normal, tuning.normal_points)
        };

        for col in 0..tuning.invader_cols {
            invaders.push(Invader {
                pos: Vec2::new(
                    tuning.invader_start_x + col as f32 * tuning.column_step(),
                    tuning.invader_start_y + row as f32 * tuning.row_step(),
                ),
                size,
                alive: true,
                kind,
                points,
            });
        }
    }

    invaders
}
