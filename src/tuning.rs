//! Data-driven game balance
//!
//! Every number the scheduler, collision rules and session read lives here so
//! a balance pass never has to touch simulation code. Loaded from JSON or
//! taken from `Tuning::default()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected balance data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("minimum spawn interval {minimum} exceeds starting interval {start}")]
    IntervalFloor { minimum: f32, start: f32 },
    #[error("spawn y range {min}..{max} is empty")]
    EmptySpawnRange { min: i32, max: i32 },
    #[error("repair fraction {0} is outside 0..=1")]
    RepairFraction(f32),
}

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawn schedule ===
    /// Seconds between enemy waves at the start of a run
    pub spawn_interval: f32,
    /// Interval reduction applied each time the level wraps
    pub spawn_interval_decrease_step: f32,
    /// Floor for the enemy spawn interval
    pub spawn_interval_minimum: f32,
    /// Seconds between obstacles during an obstacle phase
    pub spawn_interval_obstacles: f32,
    /// Seconds between item drops
    pub spawn_interval_items: f32,
    /// Length of an enemy phase
    pub level_duration_enemies: f32,
    /// Length of the first obstacle phase
    pub level_duration_obstacles: f32,
    /// Added to the obstacle phase length every time one begins
    pub level_duration_obstacles_increase_step: f32,
    /// Spawn level wraps to 0 once it passes this value
    pub spawn_level_max: u8,

    // === Spawn placement ===
    /// Distance beyond the right edge where enemies and items appear
    pub spawn_offset_x: f32,
    /// Distance beyond the right edge where obstacles appear
    pub obstacle_offset_x: f32,
    pub obstacle_lane_up_y: f32,
    pub obstacle_lane_down_y: f32,
    /// Random spawn heights are drawn from `spawn_y_min..spawn_y_max`
    pub spawn_y_min: i32,
    pub spawn_y_max: i32,

    // === Session ===
    /// Length of the dying sequence before game over
    pub gameover_delay: f32,
    /// Background scroll speed (px/s, negative scrolls left)
    pub background_speed: f32,

    // === Player & items ===
    pub player_max_health: f32,
    /// Damage applied on body contact with an enemy or obstacle
    pub lethal_damage: f32,
    /// Fraction of max health restored by a repair item
    pub repair_fraction: f32,
    /// Extra health granted by a shield item
    pub shield_amount: f32,
    pub boost_factor: f32,
    pub boost_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval: 1.3,
            spawn_interval_decrease_step: 0.2,
            spawn_interval_minimum: 0.5,
            spawn_interval_obstacles: 1.2,
            spawn_interval_items: 12.0,
            level_duration_enemies: 22.0,
            level_duration_obstacles: 10.0,
            level_duration_obstacles_increase_step: 3.0,
            spawn_level_max: crate::consts::ENEMY_TIER_MAX,

            spawn_offset_x: 150.0,
            obstacle_offset_x: 300.0,
            obstacle_lane_up_y: 450.0,
            obstacle_lane_down_y: 180.0,
            spawn_y_min: 20,
            spawn_y_max: 620,

            gameover_delay: 1.5,
            background_speed: -400.0,

            player_max_health: 1000.0,
            lethal_damage: 100_000.0,
            repair_fraction: 0.25,
            shield_amount: 10.0,
            boost_factor: 4.0,
            boost_duration: 5.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("spawn_interval", self.spawn_interval),
            ("spawn_interval_minimum", self.spawn_interval_minimum),
            ("spawn_interval_obstacles", self.spawn_interval_obstacles),
            ("spawn_interval_items", self.spawn_interval_items),
            ("level_duration_enemies", self.level_duration_enemies),
            ("level_duration_obstacles", self.level_duration_obstacles),
            ("gameover_delay", self.gameover_delay),
            ("player_max_health", self.player_max_health),
            ("lethal_damage", self.lethal_damage),
            ("boost_factor", self.boost_factor),
            ("boost_duration", self.boost_duration),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        // Steps may be zero (no escalation) but never negative
        for (field, value) in [
            ("spawn_interval_decrease_step", self.spawn_interval_decrease_step),
            (
                "level_duration_obstacles_increase_step",
                self.level_duration_obstacles_increase_step,
            ),
            ("shield_amount", self.shield_amount),
        ] {
            if value < 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.spawn_interval_minimum > self.spawn_interval {
            return Err(TuningError::IntervalFloor {
                minimum: self.spawn_interval_minimum,
                start: self.spawn_interval,
            });
        }
        if self.spawn_y_min >= self.spawn_y_max {
            return Err(TuningError::EmptySpawnRange {
                min: self.spawn_y_min,
                max: self.spawn_y_max,
            });
        }
        if !(0.0..=1.0).contains(&self.repair_fraction) {
            return Err(TuningError::RepairFraction(self.repair_fraction));
        }
        Ok(())
    }
}
