//! The multi-faction world and its tick function.
//!
//! A [`World`] owns every entity. [`World::step`] advances it by one tick in a
//! fixed order:
//!
//! 1. advance the clock
//! 2. tick unit timers and revive eligible dead units
//! 3. tick resource respawns
//! 4. tick construction (with engineer assistance) and weapon cooldowns
//! 5. pin carried jewels to their carriers
//! 6. let turrets fire
//! 7. apply actions in [`ActionMap`] order
//! 8. pin carried jewels again
//! 9. expire stale capture holds, then check domination and the time limit
//!
//! Illegal actions are ignored. Once the match is decided every further call
//! returns the stored result without touching state.

// Team indices are bounded by MAX_TEAMS and entity ids by list length
#![allow(clippy::cast_possible_truncation)]

use std::collections::{BTreeMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{BuildingKind, DEFAULT_LOADOUT, GameTuning, TEAM_PROFILES, UnitClass};
use crate::error::ConfigError;
use crate::game::action::{ActionCommand, ActionMap, ActionTable, UnitSlot};
use crate::game::capture::{CAPTURE_RADIUS, CaptureTracker, PICKUP_RADIUS};
use crate::game::combat::{
    EXPLOSIVE_MULTIPLIER, EXPLOSIVE_REACH_BONUS, nearest_damaged_building, nearest_enemy_building,
    nearest_enemy_unit, strike, turret_ready,
};
use crate::game::construction::{
    REPAIR_AMOUNT, REPAIR_LOCK_S, REPAIR_RADIUS, assist_factor, build_lock, build_site,
    site_occupied,
};
use crate::game::observation::{Snapshot, feature_vector, snapshot};
use crate::game::resource::nearest_alive;
use crate::game::{Building, BuildingId, Jewel, ResourceNode, Team, TeamId, Unit, UnitId};
use crate::geometry::{Cell, Vec2};
use crate::mapgen::{MapLayout, generate_map};

/// Reach of the gather action.
pub const GATHER_RADIUS: f64 = 1.1;

/// Lower bound on the gather-speed divisor.
const MIN_GATHER_SPEED: f64 = 0.3;

/// Direction vectors shorter than this are treated as "stand still".
const MIN_MOVE_LENGTH: f64 = 1e-3;

/// Half-width of the random offset applied to spawn positions.
const SPAWN_JITTER: f64 = 0.4;

/// Chebyshev radius searched for a free spawn cell.
const SPAWN_SEARCH_RADIUS: i32 = 4;

/// The world draws from its own stream so it never shares draws with mapgen.
const WORLD_RNG_STREAM: u64 = 1;

/// Per-team class lists. Missing or empty entries use [`DEFAULT_LOADOUT`].
pub type Loadout = BTreeMap<TeamId, Vec<UnitClass>>;

/// Summary returned by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// The match is over.
    pub done: bool,
    /// Winning team once decided.
    pub winner: Option<TeamId>,
    /// Simulation clock in seconds.
    pub time: f64,
}

/// Complete multi-faction game state.
#[derive(Debug, Clone)]
pub struct World {
    /// Rules in effect.
    pub tuning: GameTuning,
    /// Generated terrain.
    pub layout: MapLayout,
    /// Seconds elapsed.
    pub time: f64,
    /// Match decided.
    pub done: bool,
    /// Winner once decided.
    pub winner: Option<TeamId>,
    /// Teams indexed by id.
    pub teams: Vec<Team>,
    /// Units indexed by id.
    pub units: Vec<Unit>,
    /// Buildings indexed by id.
    pub buildings: Vec<Building>,
    /// Resource nodes.
    pub resources: Vec<ResourceNode>,
    /// Jewels, one per team, indexed by home team.
    pub jewels: Vec<Jewel>,
    /// Capture-hold timers.
    pub capture: CaptureTracker,
    rng: ChaCha8Rng,
}

impl World {
    /// Build a world from tuning and seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the tuning is invalid or the map cannot be laid out.
    pub fn new(
        tuning: GameTuning,
        seed: u64,
        loadout: Option<&Loadout>,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let layout = generate_map(&tuning, tuning.team_count, seed)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(WORLD_RNG_STREAM);

        let resources = layout
            .resource_spots
            .iter()
            .enumerate()
            .map(|(i, spot)| ResourceNode::new(i as u32, spot.kind, spot.pos))
            .collect();

        let team_count = tuning.team_count;
        let squad_size = tuning.squad_size;
        let mut world = Self {
            tuning,
            layout,
            time: 0.0,
            done: false,
            winner: None,
            teams: Vec::with_capacity(team_count),
            units: Vec::with_capacity(team_count * squad_size),
            buildings: Vec::with_capacity(team_count),
            resources,
            jewels: Vec::with_capacity(team_count),
            capture: CaptureTracker::new(team_count),
            rng,
        };

        // Cores go down first so spawn searches see them
        for t in 0..team_count {
            let id = t as TeamId;
            let base = world.layout.bases[t];
            let core_id = world.buildings.len() as BuildingId;
            world
                .buildings
                .push(Building::complete(core_id, id, BuildingKind::Core, base));
            world.jewels.push(Jewel::new(id, base));

            let mut team = Team::new(id, TEAM_PROFILES[t % TEAM_PROFILES.len()]);
            team.buildings.push(core_id);
            world.teams.push(team);
        }

        for t in 0..team_count {
            let id = t as TeamId;
            let classes = loadout
                .and_then(|l| l.get(&id))
                .filter(|c| !c.is_empty())
                .map_or(&DEFAULT_LOADOUT[..], Vec::as_slice);
            for slot in 0..squad_size {
                let class = classes[slot % classes.len()];
                let pos = world.spawn_position(t);
                let unit_id = world.units.len() as UnitId;
                world.units.push(Unit::new(unit_id, id, class, pos));
                world.teams[t].units.push(unit_id);
            }
        }

        debug!(
            seed,
            teams = team_count,
            units = world.units.len(),
            resources = world.resources.len(),
            "world created"
        );
        Ok(world)
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

    /// Advance the world by `dt` seconds.
    ///
    /// A finished world, or a `dt` that is not a positive finite number,
    /// leaves state untouched and returns the current result.
    pub fn step(&mut self, actions: &ActionMap, dt: f64) -> StepResult {
        if self.done || !dt.is_finite() || dt <= 0.0 {
            return self.result();
        }

        self.time += dt;
        self.tick_units(dt);
        self.tick_resources(dt);
        self.tick_buildings(dt);
        self.sync_jewels();
        self.fire_turrets();

        for (&slot, &command) in actions {
            if self.done {
                break;
            }
            self.apply(slot, command, dt);
        }

        self.sync_jewels();
        if !self.done {
            self.expire_capture_holds();
            self.check_domination();
        }
        if !self.done && self.time >= self.tuning.max_time_s {
            let winner = self.best_scoring_team();
            self.finish(winner, "time limit");
        }

        trace!(time = self.time, actions = actions.len(), "tick");
        self.result()
    }

    /// Advance using raw ordinals decoded through [`ActionTable::WorldWarV2`].
    pub fn step_ordinals(&mut self, ordinals: &BTreeMap<UnitSlot, u32>, dt: f64) -> StepResult {
        let actions: ActionMap = ordinals
            .iter()
            .map(|(&slot, &ordinal)| (slot, ActionTable::WorldWarV2.decode(ordinal)))
            .collect();
        self.step(&actions, dt)
    }

    /// The team's units in squad-slot order.
    #[must_use]
    pub fn team_units(&self, team: TeamId) -> Vec<&Unit> {
        self.teams
            .get(usize::from(team))
            .map(|t| {
                t.units
                    .iter()
                    .filter_map(|&id| self.units.get(id as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The unit addressed by a slot.
    #[must_use]
    pub fn unit_at(&self, slot: UnitSlot) -> Option<&Unit> {
        let id = self.teams.get(usize::from(slot.team))?.unit_at(slot.index)?;
        self.units.get(id as usize)
    }

    /// Base position of `team`.
    #[must_use]
    pub fn base(&self, team: TeamId) -> Option<Vec2> {
        self.layout.bases.get(usize::from(team)).copied()
    }

    /// Whether `team` still has a standing core.
    #[must_use]
    pub fn core_alive(&self, team: TeamId) -> bool {
        self.buildings
            .iter()
            .any(|b| b.team == team && b.kind == BuildingKind::Core && b.is_alive())
    }

    /// Whether a unit may stand at `pos`.
    ///
    /// Blocked are the outer half-cell margin, wall cells, and the square
    /// around any standing building that blocks movement.
    #[must_use]
    pub fn is_blocked(&self, pos: Vec2) -> bool {
        let max_x = f64::from(self.layout.width) - 1.5;
        let max_y = f64::from(self.layout.height) - 1.5;
        if pos.x < 0.5 || pos.y < 0.5 || pos.x > max_x || pos.y > max_y {
            return true;
        }
        self.layout.is_wall(pos.cell()) || self.buildings.iter().any(|b| b.blocks(pos))
    }

    /// Wall cells plus the cells under standing blocking buildings.
    #[must_use]
    pub fn blocked_cells(&self) -> HashSet<Cell> {
        let mut blocked: HashSet<Cell> = self.layout.walls.iter().copied().collect();
        blocked.extend(
            self.buildings
                .iter()
                .filter(|b| b.is_alive() && b.stats().blocks_movement)
                .map(|b| b.pos.cell()),
        );
        blocked
    }

    /// Index and distance of the nearest alive resource node.
    #[must_use]
    pub fn nearest_resource(&self, pos: Vec2) -> Option<(usize, f64)> {
        nearest_alive(&self.resources, pos)
    }

    /// Whether a new building could go down at `site` right now.
    #[must_use]
    pub fn can_build_at(&self, site: Vec2) -> bool {
        !self.is_blocked(site) && !site_occupied(&self.units, site)
    }

    /// Plain-data copy of the state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        snapshot(self)
    }

    /// Policy features from `team`'s perspective.
    #[must_use]
    pub fn feature_vector(&self, team: TeamId) -> Vec<f32> {
        feature_vector(self, team)
    }

    // ------------------------------------------------------------------ ticks

    fn tick_units(&mut self, dt: f64) {
        for i in 0..self.units.len() {
            let unit = &mut self.units[i];
            if unit.is_alive() {
                unit.tick_timers(dt);
                continue;
            }
            unit.respawn_timer = (unit.respawn_timer - dt).max(0.0);
            if unit.respawn_timer > 0.0 {
                continue;
            }
            let team = unit.team;
            if !self.core_alive(team) {
                continue;
            }
            let pos = self.spawn_position(usize::from(team));
            let unit = &mut self.units[i];
            unit.revive(pos);
            debug!(unit = unit.id, team, x = pos.x, y = pos.y, "unit respawned");
        }
    }

    fn tick_resources(&mut self, dt: f64) {
        for node in &mut self.resources {
            node.tick(dt);
        }
    }

    fn tick_buildings(&mut self, dt: f64) {
        for i in 0..self.buildings.len() {
            if !self.buildings[i].is_alive() {
                continue;
            }
            let assist = if self.buildings[i].constructing {
                assist_factor(&self.buildings[i], &self.units)
            } else {
                1.0
            };
            let building = &mut self.buildings[i];
            if building.tick(dt, assist) {
                debug!(building = building.id, team = building.team, kind = ?building.kind, "construction complete");
            }
        }
    }

    /// Keep carried jewels on their carriers; release any whose carrier is gone.
    fn sync_jewels(&mut self) {
        for jewel in &mut self.jewels {
            let Some(carrier) = jewel.carried_by else {
                continue;
            };
            match self.units.get(carrier as usize) {
                Some(unit) if unit.is_alive() && unit.has_jewel => jewel.pos = unit.pos,
                _ => {
                    let pos = jewel.pos;
                    jewel.drop_at(pos);
                    debug!(jewel = jewel.home_team, carrier, "jewel released");
                }
            }
        }
    }

    fn fire_turrets(&mut self) {
        for i in 0..self.buildings.len() {
            let turret = &self.buildings[i];
            if !turret_ready(turret) {
                continue;
            }
            let Some(attack) = turret.stats().attack else {
                continue;
            };
            let Some(target) = nearest_enemy_unit(&self.units, turret.team, turret.pos, attack.range)
            else {
                continue;
            };
            self.buildings[i].cooldown = attack.cooldown;
            if strike(&mut self.units[target].hp, attack.damage) {
                self.on_unit_killed(target);
            }
        }
    }

    // ---------------------------------------------------------------- actions

    fn apply(&mut self, slot: UnitSlot, command: ActionCommand, dt: f64) {
        let Some(team) = self.teams.get(usize::from(slot.team)) else {
            return;
        };
        if team.eliminated {
            return;
        }
        let Some(unit_id) = team.unit_at(slot.index) else {
            return;
        };
        let idx = unit_id as usize;
        if !self.units[idx].is_idle() {
            return;
        }

        match command {
            ActionCommand::Noop | ActionCommand::Craft => {}
            ActionCommand::Move { dx, dy } => self.move_unit(idx, Vec2::new(dx, dy), dt),
            ActionCommand::Gather => self.gather(idx),
            ActionCommand::Build(kind) => self.start_build(idx, kind),
            ActionCommand::Attack => self.attack(idx),
            ActionCommand::PlantExplosive => self.plant_explosive(idx),
            ActionCommand::Interact => self.interact(idx, dt),
            ActionCommand::Repair => self.repair(idx),
        }
    }

    fn move_unit(&mut self, idx: usize, direction: Vec2, dt: f64) {
        let Some(direction) = direction.normalized(MIN_MOVE_LENGTH) else {
            return;
        };
        let unit = &self.units[idx];
        let stats = unit.stats();
        let mut speed = stats.move_speed;
        if unit.has_jewel {
            speed *= self.tuning.jewel_carry_slow * stats.carry_slow;
        }
        let delta = direction * (speed * dt);

        // Axes resolve separately so units slide along walls
        let mut pos = unit.pos;
        let along_x = Vec2::new(pos.x + delta.x, pos.y);
        if !self.is_blocked(along_x) {
            pos = along_x;
        }
        let along_y = Vec2::new(pos.x, pos.y + delta.y);
        if !self.is_blocked(along_y) {
            pos = along_y;
        }
        self.units[idx].pos = pos;
    }

    fn gather(&mut self, idx: usize) {
        let pos = self.units[idx].pos;
        let Some((node, _)) = self.nearest_resource(pos) else {
            return;
        };
        if !pos.within(self.resources[node].pos, GATHER_RADIUS) {
            return;
        }
        let Some(kind) = self.resources[node].harvest(self.tuning.resource_respawn_s) else {
            return;
        };
        let unit = &mut self.units[idx];
        unit.busy = self.tuning.gather_time_s / unit.stats().gather_speed.max(MIN_GATHER_SPEED);
        let team = usize::from(unit.team);
        self.teams[team].ledger.add(kind, 1);
        trace!(unit = unit.id, ?kind, "gathered");
    }

    fn start_build(&mut self, idx: usize, kind: BuildingKind) {
        if kind == BuildingKind::Core {
            return;
        }
        let unit = &self.units[idx];
        if !unit.class.can_build() {
            return;
        }
        let site = build_site(unit.pos);
        if !self.can_build_at(site) {
            return;
        }
        let team = unit.team;
        let stats = kind.stats();
        if !self.teams[usize::from(team)].ledger.try_spend(stats.cost) {
            return;
        }

        let id = self.buildings.len() as BuildingId;
        self.buildings.push(Building::foundation(id, team, kind, site));
        self.teams[usize::from(team)].buildings.push(id);
        let lock = build_lock(&self.units[idx], stats.build_time);
        self.units[idx].busy = lock;
        debug!(building = id, team, ?kind, x = site.x, y = site.y, "construction started");
    }

    fn repair(&mut self, idx: usize) {
        let unit = &self.units[idx];
        if !unit.class.can_build() {
            return;
        }
        let Some(target) = nearest_damaged_building(&self.buildings, unit.team, unit.pos, REPAIR_RADIUS)
        else {
            return;
        };
        let building = &mut self.buildings[target];
        building.hp = (building.hp + REPAIR_AMOUNT).min(building.stats().max_hp);
        self.units[idx].busy = REPAIR_LOCK_S;
    }

    fn attack(&mut self, idx: usize) {
        let unit = &self.units[idx];
        if unit.cooldown > 0.0 {
            return;
        }
        let stats = unit.stats();
        let Some(target) = nearest_enemy_unit(&self.units, unit.team, unit.pos, stats.attack_range)
        else {
            return;
        };
        self.units[idx].cooldown = stats.attack_cooldown;
        if strike(&mut self.units[target].hp, stats.damage) {
            self.on_unit_killed(target);
        }
    }

    fn plant_explosive(&mut self, idx: usize) {
        let unit = &self.units[idx];
        if unit.cooldown > 0.0 {
            return;
        }
        let stats = unit.stats();
        let reach = stats.attack_range + EXPLOSIVE_REACH_BONUS;
        let Some(target) = nearest_enemy_building(&self.buildings, unit.team, unit.pos, reach) else {
            return;
        };
        self.units[idx].cooldown = stats.attack_cooldown;
        if strike(&mut self.buildings[target].hp, stats.damage * EXPLOSIVE_MULTIPLIER) {
            self.on_building_destroyed(target);
        }
    }

    fn interact(&mut self, idx: usize, dt: f64) {
        let unit = &self.units[idx];
        let (id, team, pos) = (unit.id, unit.team, unit.pos);

        if unit.has_jewel {
            let holding = self.jewels.iter().any(|j| j.carried_by == Some(id));
            let at_base = self.base(team).is_some_and(|b| pos.within(b, CAPTURE_RADIUS));
            if holding && at_base {
                if self.capture.advance(team, dt, self.tuning.capture_hold_s) {
                    self.finish(Some(team), "jewel captured");
                }
            } else {
                self.capture.reset(team);
            }
            return;
        }

        let mut best: Option<(usize, f64)> = None;
        for (j, jewel) in self.jewels.iter().enumerate() {
            if jewel.home_team == team || jewel.is_carried() || !pos.within(jewel.pos, PICKUP_RADIUS) {
                continue;
            }
            let d = pos.distance(jewel.pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        if let Some((j, _)) = best {
            self.jewels[j].pick_up(id);
            self.jewels[j].pos = pos;
            self.units[idx].has_jewel = true;
            debug!(unit = id, team, jewel = self.jewels[j].home_team, "jewel picked up");
        }
    }

    // ------------------------------------------------------------------ rules

    fn on_unit_killed(&mut self, idx: usize) {
        let respawn = self.tuning.respawn_time_s;
        let unit = &mut self.units[idx];
        let (id, pos) = (unit.id, unit.pos);
        unit.has_jewel = false;
        unit.busy = 0.0;
        unit.cooldown = 0.0;
        unit.respawn_timer = unit.respawn_timer.max(respawn);
        for jewel in &mut self.jewels {
            if jewel.carried_by == Some(id) {
                jewel.drop_at(pos);
                debug!(jewel = jewel.home_team, x = pos.x, y = pos.y, "jewel dropped");
            }
        }
        debug!(unit = id, team = unit.team, "unit killed");
    }

    fn on_building_destroyed(&mut self, idx: usize) {
        let building = &self.buildings[idx];
        let (id, team, kind, pos) = (building.id, building.team, building.kind, building.pos);
        debug!(building = id, team, ?kind, "building destroyed");
        if kind != BuildingKind::Core {
            return;
        }

        if self.teams[usize::from(team)].eliminate() {
            debug!(team, "team eliminated");
        }
        for jewel in &mut self.jewels {
            if jewel.home_team == team && jewel.at_home {
                jewel.drop_at(pos);
            }
        }
        // Eliminated units can no longer act, so they let go of what they carry
        for i in 0..self.units.len() {
            if self.units[i].team == team && self.units[i].has_jewel {
                let (carrier, at) = (self.units[i].id, self.units[i].pos);
                self.units[i].has_jewel = false;
                for jewel in &mut self.jewels {
                    if jewel.carried_by == Some(carrier) {
                        jewel.drop_at(at);
                    }
                }
            }
        }
        self.capture.reset(team);
    }

    /// Reset holds for teams with no carrier left inside their capture radius.
    fn expire_capture_holds(&mut self) {
        for t in 0..self.teams.len() {
            let team = t as TeamId;
            if self.capture.held(team) <= 0.0 {
                continue;
            }
            let base = self.layout.bases[t];
            let holding = self.units.iter().any(|u| {
                u.team == team && u.is_alive() && u.has_jewel && u.pos.within(base, CAPTURE_RADIUS)
            });
            if !holding {
                self.capture.reset(team);
            }
        }
    }

    fn check_domination(&mut self) {
        let mut standing = Vec::with_capacity(self.teams.len());
        for t in 0..self.teams.len() {
            let team = t as TeamId;
            if self.core_alive(team) {
                standing.push(team);
            } else if self.teams[t].eliminate() {
                debug!(team, "team eliminated");
            }
        }

        if standing.is_empty() {
            let winner = self.best_scoring_team();
            self.finish(winner, "all cores destroyed");
        } else if self.tuning.domination_enabled && standing.len() == 1 {
            self.finish(Some(standing[0]), "domination");
        }
    }

    /// Time-out tiebreak: `wood + 1.4 metal + 1.6 fuel - jewel distance`.
    ///
    /// A team carrying an enemy jewel pays no distance penalty; otherwise it
    /// pays the summed distance of every enemy jewel to its base.
    #[must_use]
    pub fn time_out_score(&self, team: TeamId) -> f64 {
        let t = usize::from(team);
        let (Some(state), Some(base)) = (self.teams.get(t), self.layout.bases.get(t)) else {
            return f64::NEG_INFINITY;
        };
        let carrying = self.jewels.iter().any(|j| {
            j.home_team != team
                && j.carried_by
                    .and_then(|id| self.units.get(id as usize))
                    .is_some_and(|u| u.team == team)
        });
        let penalty = if carrying {
            0.0
        } else {
            self.jewels
                .iter()
                .filter(|j| j.home_team != team)
                .map(|j| j.pos.distance(*base))
                .sum()
        };
        state.ledger.weighted_value() - penalty
    }

    /// Highest time-out score among surviving teams (all teams if none
    /// survive). Equal scores go to the lower team id.
    fn best_scoring_team(&self) -> Option<TeamId> {
        let mut contenders: Vec<TeamId> = self
            .teams
            .iter()
            .filter(|t| !t.eliminated)
            .map(|t| t.id)
            .collect();
        if contenders.is_empty() {
            contenders = self.teams.iter().map(|t| t.id).collect();
        }

        let mut best: Option<(TeamId, f64)> = None;
        for team in contenders {
            let score = self.time_out_score(team);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((team, score));
            }
        }
        best.map(|(team, _)| team)
    }

    fn finish(&mut self, winner: Option<TeamId>, reason: &'static str) {
        self.done = true;
        self.winner = winner;
        debug!(?winner, time = self.time, reason, "match decided");
    }

    // ---------------------------------------------------------------- spawning

    /// Centre of the free cell nearest to `pos`, or `pos` itself if the
    /// neighbourhood is fully blocked.
    fn find_open_near(&self, pos: Vec2) -> Vec2 {
        let (width, height) = self.layout.bounds();
        let origin = pos.cell();
        let mut best: Option<(Vec2, f64)> = None;
        for dy in -SPAWN_SEARCH_RADIUS..=SPAWN_SEARCH_RADIUS {
            for dx in -SPAWN_SEARCH_RADIUS..=SPAWN_SEARCH_RADIUS {
                let cell = Cell::new(origin.x + dx, origin.y + dy);
                if cell.x < 1 || cell.y < 1 || cell.x >= width - 1 || cell.y >= height - 1 {
                    continue;
                }
                let center = cell.center();
                if self.is_blocked(center) {
                    continue;
                }
                let d = center.distance(pos);
                if best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((center, d));
                }
            }
        }
        best.map_or(pos, |(center, _)| center)
    }

    /// A free, slightly jittered position near the team's spawn.
    fn spawn_position(&mut self, team: usize) -> Vec2 {
        let spawn = self.layout.spawns[team];
        let anchor = self.find_open_near(spawn);
        let jitter = Vec2::new(
            self.rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
            self.rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
        );
        let pos = anchor + jitter;
        if self.is_blocked(pos) { anchor } else { pos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceKind;
    use crate::game::{ResourceLedger, check_invariants};

    const DT: f64 = 1.0 / 30.0;

    /// A three-team world with walls and resources cleared.
    fn open_world() -> World {
        open_world_with(GameTuning::default())
    }

    fn open_world_with(tuning: GameTuning) -> World {
        let mut world = World::new(tuning, 1, None).unwrap();
        world.layout.walls.clear();
        world.resources.clear();
        world
    }

    fn order(team: TeamId, index: usize, command: ActionCommand) -> ActionMap {
        let mut actions = ActionMap::new();
        actions.insert(UnitSlot::new(team, index), command);
        actions
    }

    #[test]
    fn test_construction_rejects_bad_tuning() {
        let tuning = GameTuning {
            team_count: 9,
            ..GameTuning::default()
        };
        assert!(matches!(
            World::new(tuning, 0, None),
            Err(ConfigError::TeamCount { requested: 9, .. })
        ));

        let wide = GameTuning {
            width: 3_000_000_000,
            ..GameTuning::default()
        };
        assert!(matches!(World::new(wide, 0, None), Err(ConfigError::MapTooLarge { .. })));

        let crowded = GameTuning {
            squad_size: usize::MAX / 2,
            ..GameTuning::default()
        };
        assert!(matches!(
            World::new(crowded, 0, None),
            Err(ConfigError::SquadTooLarge { .. })
        ));
    }

    #[test]
    fn test_initial_population() {
        let world = World::new(GameTuning::default(), 5, None).unwrap();
        assert_eq!(world.teams.len(), 3);
        assert_eq!(world.units.len(), 9);
        assert_eq!(world.jewels.len(), 3);
        assert_eq!(world.buildings.len(), 3);
        for team in &world.teams {
            let classes: Vec<_> = world.team_units(team.id).iter().map(|u| u.class).collect();
            assert_eq!(classes, DEFAULT_LOADOUT.to_vec());
        }
        for unit in &world.units {
            assert!(!world.is_blocked(unit.pos), "unit {} spawned blocked", unit.id);
        }
        for (t, jewel) in world.jewels.iter().enumerate() {
            assert!(jewel.at_home);
            assert_eq!(jewel.pos, world.layout.bases[t]);
        }
    }

    #[test]
    fn test_loadout_fills_squad() {
        let tuning = GameTuning {
            team_count: 2,
            squad_size: 5,
            ..GameTuning::default()
        };
        let mut loadout = Loadout::new();
        loadout.insert(1, vec![UnitClass::Scout, UnitClass::Assault]);
        let world = World::new(tuning, 2, Some(&loadout)).unwrap();
        let classes: Vec<_> = world.team_units(1).iter().map(|u| u.class).collect();
        assert_eq!(
            classes,
            vec![
                UnitClass::Scout,
                UnitClass::Assault,
                UnitClass::Scout,
                UnitClass::Assault,
                UnitClass::Scout
            ]
        );
        assert_eq!(world.team_units(0)[0].class, UnitClass::Engineer);
    }

    #[test]
    fn test_pickup_at_exact_radius() {
        let mut world = open_world();
        let jewel_pos = world.jewels[1].pos;
        // Team 0 scout stands exactly PICKUP_RADIUS from team 1's jewel
        world.units[2].pos = Vec2::new(jewel_pos.x - PICKUP_RADIUS, jewel_pos.y);

        world.step(&order(0, 2, ActionCommand::Interact), DT);

        assert_eq!(world.jewels[1].carried_by, Some(2));
        assert!(!world.jewels[1].at_home);
        assert!(world.units[2].has_jewel);
        assert_eq!(world.jewels[1].pos, world.units[2].pos);
    }

    #[test]
    fn test_cannot_pick_up_own_jewel() {
        let mut world = open_world();
        let own = world.jewels[0].pos;
        world.units[2].pos = Vec2::new(own.x + 1.0, own.y);
        world.step(&order(0, 2, ActionCommand::Interact), DT);
        assert!(world.jewels[0].carried_by.is_none());
        assert!(!world.units[2].has_jewel);
    }

    #[test]
    fn test_unaffordable_build_changes_nothing() {
        let mut world = open_world();
        world.teams[0].ledger = ResourceLedger::default();
        world.units[0].pos = Vec2::new(20.3, 20.3);
        let buildings_before = world.buildings.len();

        world.step(&order(0, 0, ActionCommand::Build(BuildingKind::Wall)), DT);

        assert_eq!(world.buildings.len(), buildings_before);
        assert_eq!(world.teams[0].ledger, ResourceLedger::default());
        assert!(world.units[0].busy.abs() < f64::EPSILON);
    }

    #[test]
    fn test_build_spends_and_locks() {
        let mut world = open_world();
        world.units[0].pos = Vec2::new(20.3, 20.3);

        world.step(&order(0, 0, ActionCommand::Build(BuildingKind::Wall)), DT);

        let wall = world.buildings.last().unwrap();
        assert_eq!(wall.kind, BuildingKind::Wall);
        assert_eq!(wall.team, 0);
        assert!(wall.constructing);
        assert_eq!(wall.hp, 40);
        assert_eq!(wall.pos, Vec2::new(22.0, 20.0));
        assert_eq!(world.teams[0].ledger, ResourceLedger::new(2, 3, 2));
        assert!((world.units[0].busy - 2.0 / 1.35).abs() < 1e-9);
        assert!(world.teams[0].buildings.contains(&wall.id));
    }

    #[test]
    fn test_only_engineers_build() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(20.3, 20.3);
        let before = world.buildings.len();
        world.step(&order(0, 1, ActionCommand::Build(BuildingKind::Wall)), DT);
        world.step(&order(0, 1, ActionCommand::Build(BuildingKind::Core)), DT);
        assert_eq!(world.buildings.len(), before);
        assert_eq!(world.teams[0].ledger, ResourceLedger::starting());
    }

    #[test]
    fn test_construction_finishes_with_assist() {
        let mut world = open_world();
        world.units[0].pos = Vec2::new(20.3, 20.3);
        world.step(&order(0, 0, ActionCommand::Build(BuildingKind::Wall)), DT);
        let id = world.buildings.len() - 1;
        // Engineer stays within assist range: 2.0 s at 1.35x finishes in ~1.5 s
        for _ in 0..50 {
            world.step(&ActionMap::new(), DT);
        }
        assert!(!world.buildings[id].constructing);
        assert!((world.buildings[id].progress - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capture_hold_resets_when_leaving_radius() {
        let tuning = GameTuning {
            capture_hold_s: 2.5,
            ..GameTuning::default()
        };
        let mut world = open_world_with(tuning);
        let base = world.layout.bases[0];
        let step = 0.5;

        world.jewels[1].pick_up(2);
        world.units[2].has_jewel = true;
        world.units[2].pos = Vec2::new(base.x + 1.0, base.y);

        world.step(&order(0, 2, ActionCommand::Interact), step);
        world.step(&order(0, 2, ActionCommand::Interact), step);
        assert!((world.capture.held(0) - 1.0).abs() < 1e-12);

        world.units[2].pos = Vec2::new(base.x + 6.0, base.y);
        world.step(&ActionMap::new(), step);
        assert!(world.capture.held(0).abs() < f64::EPSILON);

        world.units[2].pos = Vec2::new(base.x + 1.0, base.y);
        for _ in 0..4 {
            let result = world.step(&order(0, 2, ActionCommand::Interact), step);
            assert!(!result.done, "hold carried over from before leaving");
        }
        let result = world.step(&order(0, 2, ActionCommand::Interact), step);
        assert!(result.done);
        assert_eq!(result.winner, Some(0));
    }

    #[test]
    fn test_interact_outside_radius_resets_hold() {
        let mut world = open_world();
        let base = world.layout.bases[0];
        world.jewels[1].pick_up(2);
        world.units[2].has_jewel = true;
        world.units[2].pos = Vec2::new(base.x + 1.0, base.y);
        world.step(&order(0, 2, ActionCommand::Interact), 0.5);
        assert!(world.capture.held(0) > 0.0);
        world.units[2].pos = Vec2::new(base.x + 3.0, base.y);
        world.step(&order(0, 2, ActionCommand::Interact), 0.5);
        assert!(world.capture.held(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_finished_world_is_frozen() {
        let tuning = GameTuning {
            capture_hold_s: 0.0,
            ..GameTuning::default()
        };
        let mut world = open_world_with(tuning);
        let base = world.layout.bases[0];
        world.jewels[1].pick_up(2);
        world.units[2].has_jewel = true;
        world.units[2].pos = Vec2::new(base.x + 1.0, base.y);

        let done = world.step(&order(0, 2, ActionCommand::Interact), DT);
        assert!(done.done);
        let frozen = world.snapshot();
        for _ in 0..10 {
            let again = world.step(&order(1, 1, ActionCommand::Attack), DT);
            assert_eq!(again, done);
        }
        assert_eq!(world.snapshot(), frozen);
    }

    #[test]
    fn test_attack_tie_breaks_by_lowest_id() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(30.0, 20.0);
        world.units[3].pos = Vec2::new(31.0, 20.0);
        world.units[6].pos = Vec2::new(29.0, 20.0);

        world.step(&order(0, 1, ActionCommand::Attack), DT);

        assert_eq!(world.units[3].hp, 120 - 18);
        assert_eq!(world.units[6].hp, 120);
        assert!((world.units[1].cooldown - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_attack_respects_cooldown_and_range() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(30.0, 20.0);
        world.units[4].pos = Vec2::new(31.0, 20.0);
        world.step(&order(0, 1, ActionCommand::Attack), DT);
        world.step(&order(0, 1, ActionCommand::Attack), DT);
        assert_eq!(world.units[4].hp, 150 - 18);

        world.units[4].pos = Vec2::new(33.0, 20.0);
        world.units[1].cooldown = 0.0;
        world.step(&order(0, 1, ActionCommand::Attack), DT);
        assert_eq!(world.units[4].hp, 150 - 18);
    }

    #[test]
    fn test_kill_drops_jewel_and_schedules_respawn() {
        let mut world = open_world();
        let carrier = 5;
        world.jewels[0].pick_up(carrier as UnitId);
        world.units[carrier].has_jewel = true;
        world.units[carrier].hp = 10;
        world.units[carrier].pos = Vec2::new(30.0, 20.0);
        world.units[1].pos = Vec2::new(31.0, 20.0);

        world.step(&order(0, 1, ActionCommand::Attack), DT);

        assert_eq!(world.units[carrier].hp, 0);
        assert!(!world.units[carrier].has_jewel);
        assert!(world.jewels[0].carried_by.is_none());
        assert!(!world.jewels[0].at_home);
        assert_eq!(world.jewels[0].pos, Vec2::new(30.0, 20.0));
        assert!((world.units[carrier].respawn_timer - 4.0).abs() < f64::EPSILON);

        // Dead units ignore orders
        world.step(&order(1, 2, ActionCommand::RIGHT), DT);
        assert_eq!(world.units[carrier].pos, Vec2::new(30.0, 20.0));

        for _ in 0..5 {
            world.step(&ActionMap::new(), 1.0);
        }
        assert!(world.units[carrier].is_alive());
        assert_eq!(world.units[carrier].hp, 90);
        let spawn = world.layout.spawns[1];
        assert!(world.units[carrier].pos.distance(spawn) < 6.0);
    }

    #[test]
    fn test_no_respawn_without_core() {
        let mut world = open_world();
        let victim = 5;
        world.units[victim].hp = 10;
        world.units[victim].pos = Vec2::new(30.0, 20.0);
        world.units[1].pos = Vec2::new(31.0, 20.0);
        world.step(&order(0, 1, ActionCommand::Attack), DT);
        assert_eq!(world.units[victim].hp, 0);

        world.buildings[1].hp = 0;
        for _ in 0..60 {
            world.step(&ActionMap::new(), 0.1);
        }

        assert!(world.teams[1].eliminated);
        assert!(!world.done);
        assert!(world.time > world.tuning.respawn_time_s);
        assert_eq!(world.units[victim].hp, 0);
        assert!(!world.units[victim].is_alive());
        assert!(check_invariants(&world).is_empty());
    }

    #[test]
    fn test_turret_fires_at_nearest_enemy() {
        let mut world = open_world();
        let id = world.buildings.len() as BuildingId;
        world
            .buildings
            .push(Building::complete(id, 0, BuildingKind::Turret, Vec2::new(30.0, 20.0)));
        world.teams[0].buildings.push(id);
        world.units[4].pos = Vec2::new(34.0, 20.0);
        world.units[7].pos = Vec2::new(33.0, 20.0);

        world.step(&ActionMap::new(), DT);

        assert_eq!(world.units[7].hp, 150 - 10);
        assert_eq!(world.units[4].hp, 150);
        assert!((world.buildings[id as usize].cooldown - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_turret_under_construction_holds_fire() {
        let mut world = open_world();
        let id = world.buildings.len() as BuildingId;
        world
            .buildings
            .push(Building::foundation(id, 0, BuildingKind::Turret, Vec2::new(30.0, 20.0)));
        world.teams[0].buildings.push(id);
        world.units[4].pos = Vec2::new(33.0, 20.0);
        world.step(&ActionMap::new(), DT);
        assert_eq!(world.units[4].hp, 150);
    }

    #[test]
    fn test_core_destruction_eliminates_and_dominates() {
        let tuning = GameTuning {
            team_count: 2,
            ..GameTuning::default()
        };
        let mut world = open_world_with(tuning);
        let core = world.buildings[1].pos;
        world.buildings[1].hp = 5;
        world.units[1].pos = Vec2::new(core.x - 1.5, core.y);

        let result = world.step(&order(0, 1, ActionCommand::PlantExplosive), DT);

        assert_eq!(world.buildings[1].hp, 0);
        assert!(world.teams[1].eliminated);
        assert!(!world.jewels[1].at_home);
        assert_eq!(world.jewels[1].pos, core);
        assert!(result.done);
        assert_eq!(result.winner, Some(0));
    }

    #[test]
    fn test_explosive_deals_double_damage() {
        let mut world = open_world();
        let core = world.buildings[1].pos;
        world.units[1].pos = Vec2::new(core.x - 1.8, core.y);
        world.step(&order(0, 1, ActionCommand::PlantExplosive), DT);
        assert_eq!(world.buildings[1].hp, 550 - 36);
        assert!(!world.done);
    }

    #[test]
    fn test_eliminated_team_is_ignored() {
        let mut world = open_world();
        world.buildings[2].hp = 0;
        world.step(&ActionMap::new(), DT);
        assert!(world.teams[2].eliminated);
        assert!(!world.done);

        let before = world.units[6].pos;
        world.step(&order(2, 0, ActionCommand::RIGHT), DT);
        assert_eq!(world.units[6].pos, before);
    }

    #[test]
    fn test_time_limit_uses_score() {
        let tuning = GameTuning {
            team_count: 2,
            max_time_s: 1.0,
            ..GameTuning::default()
        };
        let mut world = open_world_with(tuning);
        world.teams[1].ledger.add(ResourceKind::Fuel, 100);

        let result = world.step(&ActionMap::new(), 1.0);

        assert!(result.done);
        assert_eq!(result.winner, Some(1));
        assert!(world.time_out_score(1) > world.time_out_score(0));
    }

    #[test]
    fn test_carrying_removes_distance_penalty() {
        let tuning = GameTuning {
            team_count: 2,
            ..GameTuning::default()
        };
        let mut world = open_world_with(tuning);
        let penalised = world.time_out_score(0);
        world.jewels[1].pick_up(2);
        world.units[2].has_jewel = true;
        assert!(world.time_out_score(0) > penalised);
        assert!((world.time_out_score(0) - world.teams[0].ledger.weighted_value()).abs() < 1e-12);
    }

    #[test]
    fn test_movement_and_wall_sliding() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(20.5, 20.5);
        world.step(&order(0, 1, ActionCommand::RIGHT), 0.1);
        assert!((world.units[1].pos.x - 21.0).abs() < 1e-9);

        // Wall to the right: diagonal move slides along y only
        world.layout.walls.insert(Cell::new(22, 20));
        world.layout.walls.insert(Cell::new(22, 21));
        world.units[1].pos = Vec2::new(21.9, 20.5);
        world.step(&order(0, 1, ActionCommand::toward(1.0, 1.0)), 0.1);
        assert!((world.units[1].pos.x - 21.9).abs() < 1e-9);
        assert!(world.units[1].pos.y > 20.5);
    }

    #[test]
    fn test_carrier_moves_slower() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(20.5, 20.5);
        world.units[1].has_jewel = true;
        world.step(&order(0, 1, ActionCommand::RIGHT), 0.1);
        let expected = 20.5 + 5.0 * 0.75 * 0.85 * 0.1;
        assert!((world.units[1].pos.x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_gather_credits_team_once() {
        let mut world = open_world();
        world
            .resources
            .push(ResourceNode::new(0, ResourceKind::Metal, Vec2::new(20.0, 20.0)));
        world.units[0].pos = Vec2::new(21.0, 20.0);
        world.units[1].pos = Vec2::new(19.0, 20.0);

        let mut actions = order(0, 0, ActionCommand::Gather);
        actions.insert(UnitSlot::new(0, 1), ActionCommand::Gather);
        world.step(&actions, DT);

        assert_eq!(world.teams[0].ledger.get(ResourceKind::Metal), 5);
        assert!(!world.resources[0].alive);
        assert!((world.units[0].busy - 1.1 / 1.15).abs() < 1e-9);
        assert!(world.units[1].busy.abs() < f64::EPSILON);
    }

    #[test]
    fn test_busy_unit_ignores_orders() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(20.5, 20.5);
        world.units[1].busy = 1.0;
        world.step(&order(0, 1, ActionCommand::RIGHT), DT);
        assert_eq!(world.units[1].pos, Vec2::new(20.5, 20.5));
    }

    #[test]
    fn test_repair_heals_damaged_building() {
        let mut world = open_world();
        let core = world.buildings[0].pos;
        world.buildings[0].hp = 500;
        world.units[0].pos = Vec2::new(core.x + 1.0, core.y);
        world.step(&order(0, 0, ActionCommand::Repair), DT);
        assert_eq!(world.buildings[0].hp, 512);
        assert!((world.units[0].busy - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut world = open_world();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = world.step(&ActionMap::new(), dt);
            assert!(result.time.abs() < f64::EPSILON);
            assert!(!result.done);
        }
    }

    #[test]
    fn test_unknown_slots_are_ignored() {
        let mut world = open_world();
        let mut actions = order(7, 0, ActionCommand::Attack);
        actions.insert(UnitSlot::new(0, 99), ActionCommand::Attack);
        let result = world.step(&actions, DT);
        assert!(!result.done);
    }

    #[test]
    fn test_step_ordinals_decode_world_table() {
        let mut world = open_world();
        world.units[1].pos = Vec2::new(20.5, 20.5);
        let mut ordinals = BTreeMap::new();
        ordinals.insert(UnitSlot::new(0, 1), 4);
        world.step_ordinals(&ordinals, 0.1);
        assert!(world.units[1].pos.x > 20.5);
    }

    #[test]
    fn test_feature_vector_shape() {
        let world = World::new(GameTuning::default(), 3, None).unwrap();
        let features = world.feature_vector(0);
        assert_eq!(features.len(), 27);
        assert!(features.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_blocked_cells_include_buildings() {
        let world = open_world();
        let blocked = world.blocked_cells();
        for b in &world.buildings {
            assert!(blocked.contains(&b.pos.cell()));
        }
    }
}
