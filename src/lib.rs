//! Arcade Sim - deterministic 2D arcade simulations
//!
//! Core modules:
//! - `sim`: Deterministic simulation (invader formation, bullets, collisions, snake grid)
//! - `renderer`: Vertex generation and WebGPU pipeline
//! - `platform`: Input sampling and loop scheduling
//! - `persistence`: Key/value storage for durable values
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ArcadeError;
pub use highscores::HighScore;
pub use settings::{KeyBindings, Settings};
pub use tuning::Tuning;

/// Game configuration constants (reference instance)
pub mod consts {
    /// Playfield dimensions in pixels
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Distance from the ship's top edge to the bottom of the playfield
    pub const PLAYER_BOTTOM_OFFSET: f32 = 60.0;
    /// Ticks between two player shots
    pub const PLAYER_SHOOT_COOLDOWN: u32 = 15;
    pub const START_LIVES: u8 = 3;

    /// Bullets (shared by both pools)
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const PLAYER_BULLET_SPEED: f32 = 7.0;
    pub const ENEMY_BULLET_SPEED: f32 = 3.0;

    /// Invader grid
    pub const INVADER_ROWS: u32 = 5;
    pub const INVADER_COLS: u32 = 11;
    pub const INVADER_WIDTH: f32 = 30.0;
    pub const INVADER_HEIGHT: f32 = 20.0;
    pub const INVADER_PADDING: f32 = 10.0;
    pub const INVADER_START_X: f32 = 100.0;
    pub const INVADER_START_Y: f32 = 50.0;
    /// Top rows filled with strong invaders
    pub const STRONG_ROWS: u32 = 2;
    pub const STRONG_POINTS: u32 = 20;
    pub const NORMAL_POINTS: u32 = 10;

    /// Formation movement
    pub const FORMATION_START_SPEED: f32 = 0.5;
    pub const FORMATION_SPEED_INCREMENT: f32 = 0.1;
    pub const FORMATION_DESCENT: f32 = 20.0;

    /// Wall-clock gap between enemy shots (ms), independent of tick rate
    pub const ENEMY_SHOOT_INTERVAL_MS: f64 = 1000.0;

    /// Nominal frame rate used by headless runs
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum ticks processed per host frame
    pub const MAX_SUBSTEPS: u32 = 8;
}
