//! Combat engine: the match orchestrator.
//!
//! `CombatEngine` owns the hecs world and the `SimulationState`, processes
//! queued commands at the tick boundary, runs every system in a fixed order
//! and produces `ArenaSnapshot`s. Headless, so whole matches can be driven
//! from tests.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::Rng;

use tankduel_core::commands::{FrameInput, PlayerCommand};
use tankduel_core::components::Combatant;
use tankduel_core::config::ArenaConfig;
use tankduel_core::constants::ROUND_OVER_DELAY_MS;
use tankduel_core::enums::*;
use tankduel_core::state::ArenaSnapshot;
use tankduel_core::types::{Color, SimClock};

use crate::components::{Behavior, Controls};
use crate::effects::EffectPayload;
use crate::state::SimulationState;
use crate::systems;
use crate::systems::snapshot::MatchView;
use crate::world_setup;

/// The combat engine. Owns the ECS world and all match state.
pub struct CombatEngine {
    world: World,
    sim: SimulationState,
    phase: GamePhase,
    scores: [u32; 2],
    winner: Option<PlayerSlot>,
    bosses_defeated: u32,
    /// Boss fought in the current (or next) boss-mode round.
    current_boss: BossArchetype,
    /// Boss buffs earned per slot, reapplied after every round reset.
    retained_buffs: [Vec<BossBuff>; 2],
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
}

impl CombatEngine {
    /// Create an engine in the lobby. Out-of-range config values fall back
    /// to their defaults.
    pub fn new(config: ArenaConfig) -> Self {
        let config = config.sanitized();
        let current_boss = config.boss_archetype;
        Self {
            world: World::new(),
            sim: SimulationState::new(config),
            phase: GamePhase::Lobby,
            scores: [0; 2],
            winner: None,
            bosses_defeated: 0,
            current_boss,
            retained_buffs: [Vec::new(), Vec::new()],
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Advance by `dt_ms` of real frame time and return the resulting
    /// snapshot. The clock only runs while a round is live or winding down.
    pub fn tick(&mut self, dt_ms: f64, input: &FrameInput) -> ArenaSnapshot {
        self.process_commands();

        match self.phase {
            GamePhase::Active => {
                self.sim.clock.advance(dt_ms);
                self.run_systems(input);
            }
            GamePhase::RoundOver { until_ms } => {
                self.sim.clock.advance(dt_ms);
                if self.sim.clock.now_ms >= until_ms {
                    self.next_round();
                }
            }
            GamePhase::Lobby | GamePhase::Paused | GamePhase::MatchOver => {}
        }

        let view = MatchView {
            phase: self.phase,
            scores: self.scores,
            winner: self.winner,
            bosses_defeated: self.bosses_defeated,
        };
        systems::snapshot::build_snapshot(&self.world, &mut self.sim, view)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.sim.round
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        self.winner
    }

    pub fn bosses_defeated(&self) -> u32 {
        self.bosses_defeated
    }

    pub fn clock(&self) -> SimClock {
        self.sim.clock
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.sim.config
    }

    /// Boss buffs a slot has earned so far.
    pub fn retained_buffs(&self, slot: PlayerSlot) -> &[BossBuff] {
        &self.retained_buffs[slot.index()]
    }

    /// Read-only view of the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The tank entity of a seat, once a match has started.
    pub fn player_entity(&self, slot: PlayerSlot) -> Option<Entity> {
        self.world
            .query::<&Behavior>()
            .iter()
            .find(|(_, b)| **b == Behavior::PlayerControlled { slot })
            .map(|(e, _)| e)
    }

    /// The live boss entity, if any.
    pub fn boss_entity(&self) -> Option<Entity> {
        self.world
            .query::<(&Behavior, &Combatant)>()
            .iter()
            .find(|(_, (b, c))| **b == Behavior::BossAi && c.alive)
            .map(|(e, _)| e)
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn sim(&self) -> &SimulationState {
        &self.sim
    }

    #[cfg(test)]
    pub fn sim_mut(&mut self) -> &mut SimulationState {
        &mut self.sim
    }

    #[cfg(test)]
    pub fn world_and_sim(&mut self) -> (&mut World, &mut SimulationState) {
        (&mut self.world, &mut self.sim)
    }

    /// Force the post-round reset immediately.
    #[cfg(test)]
    pub fn force_reset(&mut self) {
        self.next_round();
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMatch => {
                if matches!(self.phase, GamePhase::Lobby | GamePhase::MatchOver) {
                    self.start_match();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetControlScheme { slot, scheme } => {
                self.sim.config.control_schemes[slot.index()] = scheme;
                for (_e, (behavior, controls)) in self.world.query_mut::<(&Behavior, &mut Controls)>() {
                    if *behavior == (Behavior::PlayerControlled { slot }) {
                        controls.scheme = scheme;
                    }
                }
            }
            PlayerCommand::GrantBossBuff { slot, buff } => self.grant_buff(slot, buff),
        }
    }

    fn start_match(&mut self) {
        if self.phase == GamePhase::MatchOver {
            self.retained_buffs = [Vec::new(), Vec::new()];
        }
        self.scores = [0; 2];
        self.winner = None;
        self.bosses_defeated = 0;
        self.current_boss = self.sim.config.boss_archetype;
        self.sim.clock = SimClock::default();
        world_setup::setup_match(&mut self.world, &mut self.sim, Some(self.current_boss));
        if self.sim.mode() == GameMode::VsBoss {
            let now = self.sim.clock.now_ms;
            for slot in PlayerSlot::ALL {
                if let Some(entity) = self.player_entity(slot) {
                    world_setup::reapply_blessings(&mut self.world, entity, &self.retained_buffs[slot.index()], now);
                }
            }
        }
        self.phase = GamePhase::Active;
    }

    /// Record a boss buff for `slot` and, mid-round, apply it right away
    /// with the new stack count.
    fn grant_buff(&mut self, slot: PlayerSlot, buff: BossBuff) {
        let retained = &mut self.retained_buffs[slot.index()];
        retained.push(buff);
        let stacks = retained.iter().filter(|b| **b == buff).count() as u32;
        let live = matches!(
            self.phase,
            GamePhase::Active | GamePhase::Paused | GamePhase::RoundOver { .. }
        );
        if !live || self.sim.mode() != GameMode::VsBoss {
            return;
        }
        if let Some(entity) = self.player_entity(slot) {
            systems::status::apply_effect(
                &mut self.world,
                entity,
                EffectKind::Blessing(buff),
                self.sim.clock.now_ms,
                None,
                EffectPayload::Blessing { stacks },
            );
            systems::status::show_status(&mut self.sim, entity, &format!("{buff:?}"), Color::YELLOW);
        }
        log::info!("{:?} granted {:?} (x{})", slot, buff, stacks);
    }

    fn next_round(&mut self) {
        let boss = (self.sim.mode() == GameMode::VsBoss).then_some(self.current_boss);
        world_setup::reset_after_kill(&mut self.world, &mut self.sim, &self.retained_buffs, boss);
        self.phase = GamePhase::Active;
    }

    /// Run all systems in order.
    fn run_systems(&mut self, input: &FrameInput) {
        let world = &mut self.world;
        let sim = &mut self.sim;

        // 1. Moving walls
        systems::obstacles::run(world, sim);
        // 2. Pickup spawning and magnet pull
        systems::pickups::run(world, sim);
        // 3. Player movement
        systems::tank_physics::run(world, sim, input);
        // 4. Charge state machine, queues fire requests
        systems::charge::run(world, sim, input);
        // 5. Boss AI and minions
        systems::boss::run(world, sim);
        systems::minions::run(world, sim);
        // 6. Body-body separation
        systems::tank_physics::separate(world, sim);
        // 7. Fire requests -> bullets
        systems::firing::run(world, sim);
        // 8. Bullet integration, homing, wall contact
        systems::ballistics::run(world, sim);
        // 9. Bullet hits
        systems::damage::run(world, sim);
        // 10. Effects, damage over time, reload
        systems::status::run(world, sim);
        // 11. Hazard fields
        systems::hazards::run(world, sim);
        // 12. Due scheduled events
        systems::scheduled::run(world, sim);
        // 13. Deaths
        systems::damage::settle_deaths(world, sim);
        // 14. Pickup collection
        systems::pickups::collect(world, sim);
        // 15. Boss phases and defeat
        let defeated = systems::boss::bookkeeping(world, sim);
        // 16. Round end
        self.check_round_end(&defeated);
        // 17. Compaction
        systems::cleanup::run(&mut self.world, &mut self.sim, &mut self.despawn_buffer);
    }

    /// Living state of both seats.
    fn players_alive(&self) -> [bool; 2] {
        let mut alive = [false; 2];
        for (_e, (behavior, combatant)) in self.world.query::<(&Behavior, &Combatant)>().iter() {
            if let Behavior::PlayerControlled { slot } = *behavior {
                alive[slot.index()] = combatant.alive;
            }
        }
        alive
    }

    fn check_round_end(&mut self, defeated_bosses: &[Entity]) {
        let alive = self.players_alive();
        let now = self.sim.clock.now_ms;
        let round_over = GamePhase::RoundOver {
            until_ms: now + ROUND_OVER_DELAY_MS,
        };

        match self.sim.mode() {
            GameMode::Pvp => match alive {
                [true, true] => {}
                [false, false] => {
                    log::info!("round {} drawn", self.sim.round);
                    self.phase = round_over;
                }
                _ => {
                    let slot = if alive[0] { PlayerSlot::One } else { PlayerSlot::Two };
                    self.scores[slot.index()] += 1;
                    log::info!(
                        "round {} to {:?}, score {}-{}",
                        self.sim.round,
                        slot,
                        self.scores[0],
                        self.scores[1]
                    );
                    if self.scores[slot.index()] >= self.sim.config.rounds_to_win {
                        self.winner = Some(slot);
                        self.phase = GamePhase::MatchOver;
                        log::info!("match won by {:?}", slot);
                    } else {
                        self.phase = round_over;
                    }
                }
            },
            GameMode::VsBoss => {
                if !defeated_bosses.is_empty() {
                    let buff = BossBuff::ALL[self.sim.rng.gen_range(0..BossBuff::ALL.len())];
                    for slot in PlayerSlot::ALL {
                        if alive[slot.index()] {
                            self.retained_buffs[slot.index()].push(buff);
                        }
                    }
                    self.bosses_defeated += defeated_bosses.len() as u32;
                    log::info!(
                        "boss {:?} down ({} total), survivors gain {:?}",
                        self.current_boss,
                        self.bosses_defeated,
                        buff
                    );
                    self.current_boss = self.current_boss.next();
                    self.phase = round_over;
                } else if alive == [false, false] {
                    log::info!("party wiped by {:?}, retrying", self.current_boss);
                    self.phase = round_over;
                }
            }
        }
    }
}
