//! Obstacle spawning driven by the pattern pools
//!
//! The spawner places at most one obstacle per `gap` meters, a fixed lead
//! ahead of the avatar. Seeded, so a stage attempt replays identically.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::patterns::{
    LaneSet, PatternPool, get_jump_frequency, get_obstacle_gap, get_pattern_pool,
    select_random_pattern, should_spawn_jump,
};
use crate::stages::StageDefinition;

/// How far ahead of the avatar obstacles appear (meters)
pub const SPAWN_LEAD: f64 = 60.0;

/// An obstacle the scene should build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    /// Full-width barrier, cleared by jumping
    Jump,
    /// Blocks the listed lanes
    Lanes(LaneSet),
}

/// An obstacle and where to put it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub distance: f64,
    pub obstacle: Obstacle,
}

#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    pool: PatternPool,
    /// Obstacles are not placed at or beyond this distance
    limit: Option<f64>,
    next_spawn_at: f64,
    rng: Pcg32,
}

impl ObstacleSpawner {
    pub fn new(stage: Option<&StageDefinition>, seed: u64) -> Self {
        // Free Run keeps the default layouts but uses its own jump rate and gap
        let pool = PatternPool {
            jump_frequency: get_jump_frequency(stage),
            gap: get_obstacle_gap(stage),
            ..*get_pattern_pool(stage)
        };
        Self {
            pool,
            limit: stage.map(|s| s.distance),
            next_spawn_at: pool.gap,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn pool(&self) -> &PatternPool {
        &self.pool
    }

    /// Spawn the next obstacle once the avatar has covered another gap
    pub fn update(&mut self, distance_traveled: f64) -> Option<Spawn> {
        if distance_traveled < self.next_spawn_at {
            return None;
        }
        self.next_spawn_at = distance_traveled + self.pool.gap;

        let distance = distance_traveled + SPAWN_LEAD;
        if self.limit.is_some_and(|limit| distance >= limit) {
            return None;
        }

        let obstacle = if should_spawn_jump(&self.pool, &mut self.rng) {
            Obstacle::Jump
        } else {
            Obstacle::Lanes(select_random_pattern(&self.pool, &mut self.rng))
        };
        log::debug!("Spawn {:?} at {:.1}m", obstacle, distance);
        Some(Spawn { distance, obstacle })
    }
}
