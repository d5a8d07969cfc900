//! Two-faction "Jewel War" ruleset.
//!
//! A [`Duel`] is a smaller sibling of [`World`](crate::game::World): one
//! agent per team, a fixed mirrored arena, and a personal economy where
//! harvested resources are crafted into weapon upgrades at home. Killed
//! agents respawn immediately but lose a weapon level.

mod layout;
mod observation;

pub use layout::{bases, mirrored_walls, scatter_resources, spawns};
pub use observation::{DUEL_OBS_LEN, observe};

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DuelConfig;
use crate::error::ConfigError;
use crate::game::{
    ActionCommand, ActionMap, ActionTable, CaptureTracker, Jewel, PICKUP_RADIUS, ResourceNode,
    StepResult, TeamId, UnitId, UnitSlot, nearest_alive, strike,
};
use crate::geometry::{Cell, Vec2};

/// Reach of the gather action.
pub const DUEL_GATHER_RADIUS: f64 = 1.0;

/// Distance from home within which agents craft and deliver.
pub const HOME_RADIUS: f64 = 1.5;

/// Highest weapon level.
pub const MAX_WEAPON_LEVEL: u8 = 3;

/// Speed bonus per weapon level.
const SPEED_PER_LEVEL: f64 = 0.25;

/// Damage bonus per weapon level.
const DAMAGE_PER_LEVEL: u32 = 10;

const MIN_MOVE_LENGTH: f64 = 1e-3;

/// The two teams.
pub const DUEL_TEAMS: [TeamId; 2] = [0, 1];

/// One team's only agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Owning team; doubles as the carrier id on jewels.
    pub team: TeamId,
    /// Position.
    pub pos: Vec2,
    /// Hit points.
    pub hp: u32,
    /// Harvested resources on hand.
    pub resources: u32,
    /// Carrying the enemy jewel.
    pub has_jewel: bool,
    /// Crafted upgrades, `0..=MAX_WEAPON_LEVEL`.
    pub weapon_level: u8,
    /// Attack cooldown.
    pub cooldown: f64,
    /// Action lock.
    pub busy: f64,
}

impl Agent {
    fn new(team: TeamId, pos: Vec2, max_hp: u32) -> Self {
        Self {
            team,
            pos,
            hp: max_hp,
            resources: 0,
            has_jewel: false,
            weapon_level: 0,
            cooldown: 0.0,
            busy: 0.0,
        }
    }

    /// Carrier id used on jewels.
    #[must_use]
    pub fn id(&self) -> UnitId {
        UnitId::from(self.team)
    }

    /// Whether the agent may start an action.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.hp > 0 && self.busy <= 0.0
    }
}

/// Complete duel state.
#[derive(Debug, Clone, PartialEq)]
pub struct Duel {
    /// Rules in effect.
    pub config: DuelConfig,
    /// Seconds elapsed.
    pub time: f64,
    /// Match decided.
    pub done: bool,
    /// Winner once decided.
    pub winner: Option<TeamId>,
    /// Wall cells.
    pub walls: BTreeSet<Cell>,
    /// Home bases by team.
    pub bases: [Vec2; 2],
    /// Respawn points by team.
    pub spawns: [Vec2; 2],
    /// Resource nodes.
    pub resources: Vec<ResourceNode>,
    /// Agents by team.
    pub agents: [Agent; 2],
    /// Jewels by home team.
    pub jewels: [Jewel; 2],
    /// Capture-hold timers.
    pub capture: CaptureTracker,
}

impl Duel {
    /// Set up a duel.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: DuelConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let walls = mirrored_walls(config.width, config.height);
        let bases = bases(config.width, config.height);
        let spawns = spawns(config.width, config.height);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let resources = scatter_resources(&config, &walls, &bases, &mut rng);

        let agents = [
            Agent::new(0, spawns[0], config.max_hp),
            Agent::new(1, spawns[1], config.max_hp),
        ];
        let jewels = [Jewel::new(0, bases[0]), Jewel::new(1, bases[1])];

        debug!(seed, resources = resources.len(), "duel created");
        Ok(Self {
            config,
            time: 0.0,
            done: false,
            winner: None,
            walls,
            bases,
            spawns,
            resources,
            agents,
            jewels,
            capture: CaptureTracker::new(2),
        })
    }

    /// The current result without advancing.
    #[must_use]
    pub const fn result(&self) -> StepResult {
        StepResult {
            done: self.done,
            winner: self.winner,
            time: self.time,
        }
    }

    /// Advance by `dt` seconds using each team's slot-0 command.
    ///
    /// Other slots are ignored, as are invalid `dt` values and calls after
    /// the match is decided.
    pub fn step(&mut self, actions: &ActionMap, dt: f64) -> StepResult {
        if self.done || !dt.is_finite() || dt <= 0.0 {
            return self.result();
        }

        self.time += dt;
        for agent in &mut self.agents {
            agent.cooldown = (agent.cooldown - dt).max(0.0);
            agent.busy = (agent.busy - dt).max(0.0);
        }
        for node in &mut self.resources {
            node.tick(dt);
        }
        self.sync_jewels();

        for team in DUEL_TEAMS {
            if self.done {
                break;
            }
            let command = actions
                .get(&UnitSlot::new(team, 0))
                .copied()
                .unwrap_or_default();
            self.apply(team, command, dt);
        }

        self.sync_jewels();
        if !self.done {
            self.expire_capture_holds();
        }
        if !self.done && self.time >= self.config.max_time_s {
            self.done = true;
            self.winner = Some(self.time_out_winner());
            debug!(winner = ?self.winner, "duel decided on time");
        }

        trace!(time = self.time, "duel tick");
        self.result()
    }

    /// Advance using raw ordinals decoded through [`ActionTable::JewelWarV1`].
    pub fn step_ordinals(&mut self, team0: u32, team1: u32, dt: f64) -> StepResult {
        let mut actions = ActionMap::new();
        actions.insert(UnitSlot::new(0, 0), ActionTable::JewelWarV1.decode(team0));
        actions.insert(UnitSlot::new(1, 0), ActionTable::JewelWarV1.decode(team1));
        self.step(&actions, dt)
    }

    /// Whether an agent may stand at `pos`.
    #[must_use]
    pub fn is_blocked(&self, pos: Vec2) -> bool {
        let max_x = f64::from(self.config.width) - 1.5;
        let max_y = f64::from(self.config.height) - 1.5;
        if pos.x < 0.5 || pos.y < 0.5 || pos.x > max_x || pos.y > max_y {
            return true;
        }
        self.walls.contains(&pos.cell())
    }

    /// Index and distance of the nearest alive resource node.
    #[must_use]
    pub fn nearest_resource(&self, pos: Vec2) -> Option<(usize, f64)> {
        nearest_alive(&self.resources, pos)
    }

    /// The agent of the opposing team.
    #[must_use]
    pub const fn opponent(&self, team: TeamId) -> &Agent {
        &self.agents[opponent_of(team)]
    }

    /// Observation vector for `team`.
    #[must_use]
    pub fn observe(&self, team: TeamId) -> [f32; DUEL_OBS_LEN] {
        observe(self, team)
    }

    fn apply(&mut self, team: TeamId, command: ActionCommand, dt: f64) {
        let t = usize::from(team);
        if !self.agents[t].is_idle() {
            return;
        }
        match command {
            ActionCommand::Move { dx, dy } => self.move_agent(t, Vec2::new(dx, dy), dt),
            ActionCommand::Gather => self.gather(t),
            ActionCommand::Craft => self.craft(t),
            ActionCommand::Attack => self.attack(t),
            ActionCommand::Interact => self.interact(t, dt),
            ActionCommand::Noop
            | ActionCommand::Build(_)
            | ActionCommand::PlantExplosive
            | ActionCommand::Repair => {}
        }
    }

    fn move_agent(&mut self, t: usize, direction: Vec2, dt: f64) {
        let Some(direction) = direction.normalized(MIN_MOVE_LENGTH) else {
            return;
        };
        let agent = &self.agents[t];
        let speed = self.config.move_speed * (1.0 + SPEED_PER_LEVEL * f64::from(agent.weapon_level));
        let delta = direction * (speed * dt);

        let mut pos = agent.pos;
        let along_x = Vec2::new(pos.x + delta.x, pos.y);
        if !self.is_blocked(along_x) {
            pos = along_x;
        }
        let along_y = Vec2::new(pos.x, pos.y + delta.y);
        if !self.is_blocked(along_y) {
            pos = along_y;
        }
        self.agents[t].pos = pos;
    }

    fn gather(&mut self, t: usize) {
        let pos = self.agents[t].pos;
        let Some((node, _)) = self.nearest_resource(pos) else {
            return;
        };
        if !pos.within(self.resources[node].pos, DUEL_GATHER_RADIUS) {
            return;
        }
        if self.resources[node].harvest(self.config.resource_respawn_s).is_none() {
            return;
        }
        let agent = &mut self.agents[t];
        agent.busy = self.config.gather_time_s;
        agent.resources += 1;
    }

    fn craft(&mut self, t: usize) {
        let cost = self.config.craft_cost;
        let agent = &mut self.agents[t];
        if !agent.pos.within(self.bases[t], HOME_RADIUS) || agent.resources < cost {
            return;
        }
        agent.resources -= cost;
        agent.weapon_level = (agent.weapon_level + 1).min(MAX_WEAPON_LEVEL);
        agent.busy = self.config.craft_time_s;
        debug!(team = agent.team, level = agent.weapon_level, "weapon crafted");
    }

    fn attack(&mut self, t: usize) {
        let enemy = 1 - t;
        let attacker = &self.agents[t];
        let target = &self.agents[enemy];
        if attacker.cooldown > 0.0 || target.hp == 0 {
            return;
        }
        if !attacker.pos.within(target.pos, self.config.attack_range) {
            return;
        }
        let damage = self.config.attack_damage + DAMAGE_PER_LEVEL * u32::from(attacker.weapon_level);
        self.agents[t].cooldown = self.config.attack_cooldown_s;
        if strike(&mut self.agents[enemy].hp, damage) {
            self.on_agent_killed(enemy);
        }
    }

    fn on_agent_killed(&mut self, t: usize) {
        let victim = &mut self.agents[t];
        let (id, at) = (victim.id(), victim.pos);
        for jewel in &mut self.jewels {
            if jewel.carried_by == Some(id) {
                jewel.drop_at(at);
                debug!(jewel = jewel.home_team, x = at.x, y = at.y, "jewel dropped");
            }
        }
        victim.pos = self.spawns[t];
        victim.hp = self.config.max_hp;
        victim.has_jewel = false;
        victim.weapon_level = victim.weapon_level.saturating_sub(1);
        self.capture.reset(victim.team);
        debug!(team = victim.team, "agent killed and respawned");
    }

    fn interact(&mut self, t: usize, dt: f64) {
        let agent = &self.agents[t];
        let (id, team, pos) = (agent.id(), agent.team, agent.pos);

        if agent.has_jewel {
            if pos.within(self.bases[t], HOME_RADIUS) {
                if self.capture.advance(team, dt, self.config.capture_hold_s) {
                    self.done = true;
                    self.winner = Some(team);
                    debug!(team, time = self.time, "jewel delivered");
                }
            } else {
                self.capture.reset(team);
            }
            return;
        }

        let jewel = &mut self.jewels[opponent_of(team)];
        if !jewel.is_carried() && pos.within(jewel.pos, PICKUP_RADIUS) {
            jewel.pick_up(id);
            jewel.pos = pos;
            self.agents[t].has_jewel = true;
            debug!(team, "jewel picked up");
        }
    }

    fn sync_jewels(&mut self) {
        for jewel in &mut self.jewels {
            if let Some(agent) = jewel.carried_by.and_then(|c| self.agents.get(c as usize)) {
                jewel.pos = agent.pos;
            }
        }
    }

    fn expire_capture_holds(&mut self) {
        for (t, agent) in self.agents.iter().enumerate() {
            if !(agent.has_jewel && agent.pos.within(self.bases[t], HOME_RADIUS)) {
                self.capture.reset(agent.team);
            }
        }
    }

    /// Sole jewel holder wins; otherwise more resources, team 0 on equality.
    fn time_out_winner(&self) -> TeamId {
        let [a, b] = &self.agents;
        match (a.has_jewel, b.has_jewel) {
            (true, false) => 0,
            (false, true) => 1,
            _ if a.resources >= b.resources => 0,
            _ => 1,
        }
    }
}

const fn opponent_of(team: TeamId) -> usize {
    if team == 0 { 1 } else { 0 }
}
