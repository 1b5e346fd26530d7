//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A JSON
//! document may override any subset; missing keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ArcadeError;

/// Balance values for the invaders simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub player_bottom_offset: f32,
    pub shoot_cooldown_ticks: u32,
    pub start_lives: u8,

    // === Bullets ===
    pub bullet_width: f32,
    pub bullet_height: f32,
    pub player_bullet_speed: f32,
    pub enemy_bullet_speed: f32,
    /// Minimum wall-clock gap between enemy shots (ms)
    pub enemy_shoot_interval_ms: f64,

    // === Invader grid ===
    pub invader_rows: u32,
    pub invader_cols: u32,
    pub invader_width: f32,
    pub invader_height: f32,
    pub invader_padding: f32,
    pub invader_start_x: f32,
    pub invader_start_y: f32,
    pub strong_rows: u32,
    pub strong_points: u32,
    pub normal_points: u32,

    // === Formation ===
    pub formation_start_speed: f32,
    pub formation_speed_increment: f32,
    pub formation_descent: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_speed: PLAYER_SPEED,
            player_bottom_offset: PLAYER_BOTTOM_OFFSET,
            shoot_cooldown_ticks: PLAYER_SHOOT_COOLDOWN,
            start_lives: START_LIVES,

            bullet_width: BULLET_WIDTH,
            bullet_height: BULLET_HEIGHT,
            player_bullet_speed: PLAYER_BULLET_SPEED,
            enemy_bullet_speed: ENEMY_BULLET_SPEED,
            enemy_shoot_interval_ms: ENEMY_SHOOT_INTERVAL_MS,

            invader_rows: INVADER_ROWS,
            invader_cols: INVADER_COLS,
            invader_width: INVADER_WIDTH,
            invader_height: INVADER_HEIGHT,
            invader_padding: INVADER_PADDING,
            invader_start_x: INVADER_START_X,
            invader_start_y: INVADER_START_Y,
            strong_rows: STRONG_ROWS,
            strong_points: STRONG_POINTS,
            normal_points: NORMAL_POINTS,

            formation_start_speed: FORMATION_START_SPEED,
            formation_speed_increment: FORMATION_SPEED_INCREMENT,
            formation_descent: FORMATION_DESCENT,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate the result
    pub fn from_json(json: &str) -> Result<Self, ArcadeError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse a JSON override, falling back to defaults on any problem
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Ignoring tuning override: {}", err);
                Self::default()
            }
        }
    }

    /// Check that the simulation can run with these values
    pub fn validate(&self) -> Result<(), ArcadeError> {
        let positive = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("bullet_width", self.bullet_width),
            ("bullet_height", self.bullet_height),
            ("player_bullet_speed", self.player_bullet_speed),
            ("enemy_bullet_speed", self.enemy_bullet_speed),
            ("invader_width", self.invader_width),
            ("invader_height", self.invader_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        if self.invader_rows == 0 {
            return Err(invalid("invader_rows", "must be at least 1".to_string()));
        }
        if self.invader_cols == 0 {
            return Err(invalid("invader_cols", "must be at least 1".to_string()));
        }
        if self.start_lives == 0 {
            return Err(invalid("start_lives", "must be at least 1".to_string()));
        }
        if self.enemy_shoot_interval_ms < 0.0 {
            return Err(invalid(
                "enemy_shoot_interval_ms",
                "must not be negative".to_string(),
            ));
        }
        if self.player_width > self.playfield_width {
            return Err(invalid(
                "player_width",
                "ship is wider than the playfield".to_string(),
            ));
        }
        if self.grid_right() > self.playfield_width {
            return Err(invalid(
                "invader_cols",
                format!(
                    "grid ends at x={} beyond playfield width {}",
                    self.grid_right(),
                    self.playfield_width
                ),
            ));
        }
        if self.grid_bottom() >= self.player_y() {
            return Err(invalid(
                "invader_rows",
                "grid starts on or below the player's line".to_string(),
            ));
        }
        Ok(())
    }

    /// Vertical position of the player's top edge
    pub fn player_y(&self) -> f32 {
        self.playfield_height - self.player_bottom_offset
    }

    /// Horizontal distance between two neighbouring invader origins
    pub fn column_step(&self) -> f32 {
        self.invader_width + self.invader_padding
    }

    /// Vertical distance between two neighbouring invader rows
    pub fn row_step(&self) -> f32 {
        self.invader_height + self.invader_padding
    }

    /// Right edge of the freshly spawned grid
    pub fn grid_right(&self) -> f32 {
        self.invader_start_x + (self.invader_cols - 1) as f32 * self.column_step()
            + self.invader_width
    }

    /// Bottom edge of the freshly spawned grid
    pub fn grid_bottom(&self) -> f32 {
        self.invader_start_y + (self.invader_rows - 1) as f32 * self.row_step()
            + self.invader_height
    }
}

fn invalid(field: &'static str, reason: String) -> ArcadeError {
    ArcadeError::InvalidTuning { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.player_y(), 540.0);
        assert_eq!(tuning.grid_right(), 530.0);
        assert_eq!(tuning.grid_bottom(), 190.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "invader_rows": 2, "start_lives": 5 }"#).unwrap();
        assert_eq!(tuning.invader_rows, 2);
        assert_eq!(tuning.start_lives, 5);
        assert_eq!(tuning.invader_cols, INVADER_COLS);
        assert_eq!(tuning.playfield_width, PLAYFIELD_WIDTH);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let err = Tuning::from_json(r#"{ "invader_cols": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ArcadeError::InvalidTuning {
                field: "invader_cols",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_grid_wider_than_playfield() {
        let err = Tuning::from_json(r#"{ "invader_cols": 30 }"#).unwrap_err();
        assert!(matches!(err, ArcadeError::InvalidTuning { .. }));
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let tuning = Tuning::from_json_or_default("{ nope");
        assert_eq!(tuning, Tuning::default());
    }
}
