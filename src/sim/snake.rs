//! Grid-based variant: snake on a fixed-interval tick
//!
//! The host calls [`SnakeState::tick`] once per elapsed interval (see
//! [`crate::platform::FixedInterval`]); key presses arrive as discrete
//! `steer` / `toggle_pause` / `confirm` calls between ticks.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// Board size in cells
pub const GRID_WIDTH: i32 = 20;
pub const GRID_HEIGHT: i32 = 20;
/// Pixel size of one cell
pub const CELL_SIZE: f32 = 20.0;
/// Starting tick period
pub const START_INTERVAL_MS: u32 = 150;
/// Fastest tick period
pub const MIN_INTERVAL_MS: u32 = 50;
/// Period reduction per speed-up
pub const INTERVAL_STEP_MS: u32 = 10;
pub const FOOD_POINTS: u64 = 10;
/// Speed up whenever the score reaches a multiple of this
pub const SPEEDUP_EVERY: u64 = 50;

/// Heading on the grid (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    Ate { score: u64 },
    SpeedUp { interval_ms: u32 },
    Crashed,
    BoardFilled,
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete snake round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeState {
    pub seed: u64,
    /// Board size in cells
    pub size: IVec2,
    /// Head first
    pub body: VecDeque<IVec2>,
    /// Heading applied on the last tick
    pub heading: Direction,
    /// Heading to apply on the next tick
    pub queued: Direction,
    /// `None` only once the body fills the board
    pub food: Option<IVec2>,
    pub score: u64,
    pub interval_ms: u32,
    pub phase: GamePhase,
    #[serde(skip)]
    pub events: Vec<SnakeEvent>,
    #[serde(skip, default = "unseeded_rng")]
    rng: Pcg32,
}

impl SnakeState {
    /// New round on the standard board, waiting for the first input
    pub fn new(seed: u64) -> Self {
        Self::with_grid(seed, IVec2::new(GRID_WIDTH, GRID_HEIGHT))
    }

    /// New round on a custom board (at least 6×1 so the start body fits)
    pub fn with_grid(seed: u64, size: IVec2) -> Self {
        let mut state = Self {
            seed,
            size,
            body: VecDeque::new(),
            heading: Direction::Right,
            queued: Direction::Right,
            food: None,
            score: 0,
            interval_ms: START_INTERVAL_MS,
            phase: GamePhase::Paused,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset();
        state.phase = GamePhase::Paused;
        state
    }

    /// Reinitialize body, heading, score, speed, food and RNG; starts running
    pub fn reset(&mut self) {
        let row = self.size.y / 2;
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.body = VecDeque::from(vec![
            IVec2::new(5, row),
            IVec2::new(4, row),
            IVec2::new(3, row),
        ]);
        self.heading = Direction::Right;
        self.queued = Direction::Right;
        self.score = 0;
        self.interval_ms = START_INTERVAL_MS;
        self.events.clear();
        self.phase = GamePhase::Running;
        self.food = self.spawn_food();
    }

    /// Full restart (always available)
    pub fn restart(&mut self) {
        self.reset();
        log::info!("Snake restarted (seed {})", self.seed);
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    /// Current tick period in milliseconds
    pub fn tick_interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Queue a heading change; reversing onto the body is ignored
    pub fn steer(&mut self, dir: Direction) {
        if dir != self.heading.opposite() {
            self.queued = dir;
        }
    }

    /// Running ↔ Paused; from a finished round, start a new one
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                log::info!("Snake paused");
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                log::info!("Snake resumed");
            }
            GamePhase::GameOver | GamePhase::Victory => self.restart(),
        }
    }

    /// Start from the waiting screen, or restart a finished round
    pub fn confirm(&mut self) {
        match self.phase {
            GamePhase::Paused => self.phase = GamePhase::Running,
            GamePhase::GameOver | GamePhase::Victory => self.restart(),
            GamePhase::Running => {}
        }
    }

    /// Advance one grid step
    pub fn tick(&mut self) {
        self.events.clear();
        if self.phase != GamePhase::Running {
            return;
        }

        self.heading = self.queued;
        let head = self.head() + self.heading.delta();

        let outside = head.x < 0 || head.y < 0 || head.x >= self.size.x || head.y >= self.size.y;
        // The tail still occupies its cell during this check
        if outside || self.body.contains(&head) {
            self.phase = GamePhase::GameOver;
            self.events.push(SnakeEvent::Crashed);
            log::info!("Snake crashed: score {}", self.score);
            return;
        }

        self.body.push_front(head);

        if self.food == Some(head) {
            self.score += FOOD_POINTS;
            self.events.push(SnakeEvent::Ate { score: self.score });

            if self.score % SPEEDUP_EVERY == 0 && self.interval_ms > MIN_INTERVAL_MS {
                self.interval_ms = self
                    .interval_ms
                    .saturating_sub(INTERVAL_STEP_MS)
                    .max(MIN_INTERVAL_MS);
                self.events.push(SnakeEvent::SpeedUp {
                    interval_ms: self.interval_ms,
                });
                log::debug!("Snake speed up: {} ms", self.interval_ms);
            }

            self.food = self.spawn_food();
            if self.food.is_none() {
                self.phase = GamePhase::Victory;
                self.events.push(SnakeEvent::BoardFilled);
                log::info!("Snake filled the board: score {}", self.score);
            }
        } else {
            self.body.pop_back();
        }
    }

    /// Pick a free cell uniformly at random
    fn spawn_food(&mut self) -> Option<IVec2> {
        let free: Vec<IVec2> = (0..self.size.y)
            .flat_map(|y| (0..self.size.x).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();

        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.random_range(0..free.len())])
    }
}
