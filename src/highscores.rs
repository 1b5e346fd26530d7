//! High score slot
//!
//! One durable integer per game, read at startup and written whenever the
//! running score beats it.

use crate::error::ArcadeError;
use crate::persistence::KeyValueStore;

/// Storage key for the invaders game
pub const INVADERS_KEY: &str = "arcade_sim_invaders_high_score";
/// Storage key for the snake game
pub const SNAKE_KEY: &str = "arcade_sim_snake_high_score";

/// Best score seen for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    key: &'static str,
    best: u64,
}

impl HighScore {
    /// Empty slot, nothing read yet
    pub fn new(key: &'static str) -> Self {
        Self { key, best: 0 }
    }

    /// Read the slot; a missing, unreadable or corrupt value counts as 0
    pub fn load(store: &dyn KeyValueStore, key: &'static str) -> Self {
        let best = match store.get_item(key) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(best) => {
                    log::info!("Loaded high score {} ({})", best, key);
                    best
                }
                Err(_) => {
                    log::warn!("Ignoring corrupt high score {:?} ({})", raw, key);
                    0
                }
            },
            Ok(None) => {
                log::info!("No high score found, starting fresh ({})", key);
                0
            }
            Err(err) => {
                log::warn!("High score unavailable ({}): {}", key, err);
                0
            }
        };
        Self { key, best }
    }

    /// Record a score; returns true when it is a new best
    pub fn observe(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Write the current best to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), ArcadeError> {
        store.set_item(self.key, &self.best.to_string())?;
        log::info!("High score saved: {} ({})", self.best, self.key);
        Ok(())
    }

    /// `observe` followed by `save` when the score is a new best
    pub fn submit(
        &mut self,
        score: u64,
        store: &mut dyn KeyValueStore,
    ) -> Result<bool, ArcadeError> {
        if !self.observe(score) {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_load_missing_is_zero() {
        let store = MemoryStore::new();
        let high = HighScore::load(&store, INVADERS_KEY);
        assert_eq!(high.best(), 0);
    }

    #[test]
    fn test_load_corrupt_is_zero() {
        let mut store = MemoryStore::new();
        store.set_item(INVADERS_KEY, "lots").unwrap();
        assert_eq!(HighScore::load(&store, INVADERS_KEY).best(), 0);

        store.set_item(INVADERS_KEY, "-20").unwrap();
        assert_eq!(HighScore::load(&store, INVADERS_KEY).best(), 0);
    }

    #[test]
    fn test_observe_only_raises() {
        let mut high = HighScore::new(INVADERS_KEY);
        assert!(high.observe(30));
        assert!(!high.observe(30));
        assert!(!high.observe(10));
        assert!(high.observe(40));
        assert_eq!(high.best(), 40);
    }

    #[test]
    fn test_save_and_reload() {
        let mut store = MemoryStore::new();
        let mut high = HighScore::load(&store, INVADERS_KEY);
        assert!(high.submit(770, &mut store).unwrap());
        assert!(!high.submit(500, &mut store).unwrap());

        let reloaded = HighScore::load(&store, INVADERS_KEY);
        assert_eq!(reloaded.best(), 770);
    }

    #[test]
    fn test_games_have_separate_slots() {
        let mut store = MemoryStore::new();
        let mut invaders = HighScore::new(INVADERS_KEY);
        invaders.submit(120, &mut store).unwrap();

        let snake = HighScore::load(&store, SNAKE_KEY);
        assert_eq!(snake.best(), 0);
        assert_eq!(snake.key(), SNAKE_KEY);
    }
}
