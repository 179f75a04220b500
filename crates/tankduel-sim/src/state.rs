//! Non-ECS simulation resources, passed explicitly to every system.

use glam::Vec2;
use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tankduel_core::config::ArenaConfig;
use tankduel_core::constants::*;
use tankduel_core::enums::{GameMode, Team};
use tankduel_core::events::FxEvent;
use tankduel_core::types::SimClock;
use tankduel_geometry::Rect;

use crate::components::FireRequest;
use crate::obstacles::ObstacleField;
use crate::scheduler::Scheduler;
use crate::systems::ballistics::Impact;
use crate::systems::hazards::HazardField;
use crate::systems::pickups::Pickup;

/// Everything the systems share besides the world itself.
pub struct SimulationState {
    pub config: ArenaConfig,
    pub clock: SimClock,
    pub rng: ChaCha8Rng,
    pub bounds: Rect,
    pub round: u32,
    pub obstacles: ObstacleField,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<HazardField>,
    pub scheduler: Scheduler,
    pub fire_requests: Vec<FireRequest>,
    /// Wall contacts from ballistics, settled by the damage pass.
    pub wall_impacts: Vec<(Entity, Impact)>,
    pub next_pickup_at_ms: f64,
    /// Visual requests drained into the next snapshot.
    pub fx: Vec<FxEvent>,
}

impl SimulationState {
    pub fn new(config: ArenaConfig) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.width, config.height);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            clock: SimClock::default(),
            rng,
            bounds,
            round: 0,
            obstacles: ObstacleField::default(),
            pickups: Vec::new(),
            hazards: Vec::new(),
            scheduler: Scheduler::default(),
            fire_requests: Vec::new(),
            wall_impacts: Vec::new(),
            next_pickup_at_ms: 0.0,
            fx: Vec::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms
    }

    /// Whether `attacker` may damage `target` in the current mode.
    pub fn hostile(&self, attacker: Team, target: Team) -> bool {
        hostile(self.config.mode, attacker, target)
    }

    /// Player spawn points for this arena.
    pub fn player_spawns(&self) -> [Vec2; 2] {
        PLAYER_SPAWNS.map(|(fx, fy)| Vec2::new(self.bounds.w * fx, self.bounds.h * fy))
    }

    pub fn boss_spawn(&self) -> Vec2 {
        Vec2::new(self.bounds.w * BOSS_SPAWN.0, self.bounds.h * BOSS_SPAWN.1)
    }

    /// Pull a point inside the arena, `radius + ARENA_MARGIN` from each edge.
    pub fn clamp_to_arena(&self, pos: Vec2, radius: f32) -> Vec2 {
        let inset = radius + ARENA_MARGIN;
        let min = Vec2::new(self.bounds.left() + inset, self.bounds.top() + inset);
        let max = Vec2::new(self.bounds.right() - inset, self.bounds.bottom() - inset);
        pos.clamp(min, max.max(min))
    }
}

/// Faction rules: bosses never hurt bosses; players hurt each other only in
/// PvP.
pub fn hostile(mode: GameMode, attacker: Team, target: Team) -> bool {
    match (attacker, target) {
        (Team::Boss, Team::Boss) => false,
        (Team::Player(a), Team::Player(b)) => mode == GameMode::Pvp && a != b,
        _ => true,
    }
}
