//! Heuristic squad control for the multi-faction world.
//!
//! Every idle unit gets one command per tick. A unit carrying a jewel always
//! runs home first; otherwise its class decides the [`Behavior`], and any
//! behaviour with nothing to do falls back to fighting.

use crate::config::{BuildingKind, UnitClass};
use crate::game::{
    ActionCommand, ActionMap, Building, EXPLOSIVE_REACH_BONUS, GATHER_RADIUS, PICKUP_RADIUS,
    REPAIR_RADIUS, TeamId, Unit, UnitSlot, World, build_site, nearest_damaged_building,
    nearest_enemy_building, nearest_enemy_unit,
};
use crate::geometry::Vec2;
use crate::planner::Navigator;

/// Builders stop adding walls once the team owns this many.
pub const MAX_PLANNED_WALLS: usize = 4;

/// Carriers interact once this close to their base.
const DELIVERY_RADIUS: f64 = 1.5;

/// Builders only construct this close to their base.
const BUILD_RADIUS: f64 = 3.0;

/// Enemies inside this radius are chased instead of the nearest core.
const CHASE_RADIUS: f64 = 8.0;

/// Role a unit plays when it is not carrying a jewel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Defensive construction, repair, then gathering.
    Builder,
    /// Steals uncarried enemy jewels.
    Raider,
    /// Fights units, then buildings, then marches on cores.
    Striker,
}

impl Behavior {
    /// Role for a unit class.
    #[must_use]
    pub const fn for_class(class: UnitClass) -> Self {
        match class {
            UnitClass::Engineer => Self::Builder,
            UnitClass::Scout => Self::Raider,
            UnitClass::Assault => Self::Striker,
        }
    }

    /// Command for `unit` under this role.
    #[must_use]
    pub fn decide(self, world: &World, unit: &Unit, nav: &Navigator) -> ActionCommand {
        let chosen = match self {
            Self::Builder => build(world, unit, nav),
            Self::Raider => raid(world, unit, nav),
            Self::Striker => None,
        };
        chosen.unwrap_or_else(|| strike(world, unit, nav))
    }
}

/// Scripted controller for one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadPlanner {
    /// Team being controlled.
    pub team: TeamId,
}

impl SquadPlanner {
    /// Planner for `team`.
    #[must_use]
    pub const fn new(team: TeamId) -> Self {
        Self { team }
    }

    /// Commands for every idle unit of the team, keyed by squad slot.
    ///
    /// Empty once the world is decided or the team is eliminated.
    #[must_use]
    pub fn plan(&self, world: &World) -> ActionMap {
        let mut actions = ActionMap::new();
        let active = world
            .teams
            .get(usize::from(self.team))
            .is_some_and(|t| !t.eliminated);
        if world.done || !active {
            return actions;
        }

        let nav = Navigator::for_world(world);
        for (index, unit) in world.team_units(self.team).into_iter().enumerate() {
            if unit.is_idle() {
                actions.insert(UnitSlot::new(self.team, index), self.decide(world, unit, &nav));
            }
        }
        actions
    }

    /// Command for a single unit.
    #[must_use]
    pub fn decide(&self, world: &World, unit: &Unit, nav: &Navigator) -> ActionCommand {
        if unit.has_jewel {
            if let Some(home) = world.base(self.team) {
                if unit.pos.within(home, DELIVERY_RADIUS) {
                    return ActionCommand::Interact;
                }
                return move_to(nav, unit.pos, home);
            }
        }
        Behavior::for_class(unit.class).decide(world, unit, nav)
    }
}

fn move_to(nav: &Navigator, from: Vec2, target: Vec2) -> ActionCommand {
    let dir = nav.steer(from, target);
    ActionCommand::toward(dir.x, dir.y)
}

fn owned_alive<'a>(world: &'a World, team: TeamId, kind: BuildingKind) -> impl Iterator<Item = &'a Building> {
    world
        .buildings
        .iter()
        .filter(move |b| b.team == team && b.kind == kind && b.is_alive())
}

/// Next structure the team wants and can pay for.
fn wanted_building(world: &World, team: TeamId) -> Option<BuildingKind> {
    let ledger = &world.teams.get(usize::from(team))?.ledger;
    let has_turret = owned_alive(world, team, BuildingKind::Turret).next().is_some();
    if !has_turret && ledger.can_afford(BuildingKind::Turret.stats().cost) {
        return Some(BuildingKind::Turret);
    }
    let walls = owned_alive(world, team, BuildingKind::Wall).count();
    if walls < MAX_PLANNED_WALLS && ledger.can_afford(BuildingKind::Wall.stats().cost) {
        return Some(BuildingKind::Wall);
    }
    None
}

fn build(world: &World, unit: &Unit, nav: &Navigator) -> Option<ActionCommand> {
    if let (Some(kind), Some(base)) = (wanted_building(world, unit.team), world.base(unit.team)) {
        if !unit.pos.within(base, BUILD_RADIUS) {
            return Some(move_to(nav, unit.pos, base));
        }
        if world.can_build_at(build_site(unit.pos)) {
            return Some(ActionCommand::Build(kind));
        }
    }

    if nearest_damaged_building(&world.buildings, unit.team, unit.pos, REPAIR_RADIUS).is_some() {
        return Some(ActionCommand::Repair);
    }

    let (node, distance) = world.nearest_resource(unit.pos)?;
    if distance <= GATHER_RADIUS {
        return Some(ActionCommand::Gather);
    }
    Some(move_to(nav, unit.pos, world.resources[node].pos))
}

fn raid(world: &World, unit: &Unit, nav: &Navigator) -> Option<ActionCommand> {
    let mut best: Option<(Vec2, f64)> = None;
    for jewel in &world.jewels {
        let rival = world
            .teams
            .get(usize::from(jewel.home_team))
            .is_some_and(|t| !t.eliminated);
        if jewel.home_team == unit.team || jewel.is_carried() || !rival {
            continue;
        }
        let d = unit.pos.distance(jewel.pos);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((jewel.pos, d));
        }
    }

    let (target, _) = best?;
    if unit.pos.within(target, PICKUP_RADIUS) {
        return Some(ActionCommand::Interact);
    }
    Some(move_to(nav, unit.pos, target))
}

fn strike(world: &World, unit: &Unit, nav: &Navigator) -> ActionCommand {
    let stats = unit.stats();
    if unit.cooldown <= 0.0 {
        if nearest_enemy_unit(&world.units, unit.team, unit.pos, stats.attack_range).is_some() {
            return ActionCommand::Attack;
        }
        let reach = stats.attack_range + EXPLOSIVE_REACH_BONUS;
        if nearest_enemy_building(&world.buildings, unit.team, unit.pos, reach).is_some() {
            return ActionCommand::PlantExplosive;
        }
    }

    if let Some(target) = nearest_enemy_unit(&world.units, unit.team, unit.pos, CHASE_RADIUS) {
        return move_to(nav, unit.pos, world.units[target].pos);
    }

    let core = world
        .buildings
        .iter()
        .filter(|b| b.team != unit.team && b.kind == BuildingKind::Core && b.is_alive())
        .map(|b| (b.pos, unit.pos.distance(b.pos)))
        .fold(None, |best: Option<(Vec2, f64)>, (pos, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((pos, d)),
        });
    match core {
        Some((pos, _)) => move_to(nav, unit.pos, pos),
        None => ActionCommand::Noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameTuning, ResourceKind};

    fn open_world() -> World {
        let mut world = World::new(GameTuning::default(), 1, None).unwrap();
        world.layout.walls.clear();
        world.resources.clear();
        world
    }

    /// Park every unit far apart in the map's lower band.
    fn scatter_units(world: &mut World) {
        for (unit, i) in world.units.iter_mut().zip(0u32..) {
            unit.pos = Vec2::new(3.0 + 4.0 * f64::from(i), 36.0);
        }
    }

    fn engineer_of(world: &World, team: TeamId) -> usize {
        world
            .units
            .iter()
            .position(|u| u.team == team && u.class == UnitClass::Engineer)
            .unwrap()
    }

    #[test]
    fn test_behavior_per_class() {
        assert_eq!(Behavior::for_class(UnitClass::Engineer), Behavior::Builder);
        assert_eq!(Behavior::for_class(UnitClass::Scout), Behavior::Raider);
        assert_eq!(Behavior::for_class(UnitClass::Assault), Behavior::Striker);
    }

    #[test]
    fn test_plan_covers_idle_units_only() {
        let mut world = World::new(GameTuning::default(), 2, None).unwrap();
        world.units[1].busy = 1.0;
        let actions = SquadPlanner::new(0).plan(&world);
        assert_eq!(actions.len(), 2);
        assert!(actions.contains_key(&UnitSlot::new(0, 0)));
        assert!(!actions.contains_key(&UnitSlot::new(0, 1)));
        assert!(actions.keys().all(|slot| slot.team == 0));
    }

    #[test]
    fn test_plan_empty_when_eliminated_or_done() {
        let mut world = World::new(GameTuning::default(), 2, None).unwrap();
        world.teams[1].eliminated = true;
        assert!(SquadPlanner::new(1).plan(&world).is_empty());
        assert!(SquadPlanner::new(9).plan(&world).is_empty());

        world.done = true;
        assert!(SquadPlanner::new(0).plan(&world).is_empty());
    }

    #[test]
    fn test_carrier_runs_home_and_interacts() {
        let mut world = open_world();
        scatter_units(&mut world);
        let planner = SquadPlanner::new(0);
        let home = world.base(0).unwrap();
        let idx = engineer_of(&world, 0);

        world.units[idx].has_jewel = true;
        world.units[idx].pos = home + Vec2::new(10.0, 0.0);
        let nav = Navigator::for_world(&world);
        match planner.decide(&world, &world.units[idx], &nav) {
            ActionCommand::Move { dx, .. } => assert!(dx < 0.0),
            other => panic!("expected a move home, got {other:?}"),
        }

        world.units[idx].pos = home + Vec2::new(1.0, 0.0);
        assert_eq!(planner.decide(&world, &world.units[idx], &nav), ActionCommand::Interact);
    }

    #[test]
    fn test_builder_prefers_turret_then_walls() {
        let mut world = open_world();
        scatter_units(&mut world);
        let idx = engineer_of(&world, 0);
        let home = world.base(0).unwrap();
        world.units[idx].pos = home + Vec2::new(0.0, 2.0);
        let nav = Navigator::for_world(&world);
        let unit = world.units[idx];

        // Starting ledger covers a wall but not a turret
        assert_eq!(
            Behavior::Builder.decide(&world, &unit, &nav),
            ActionCommand::Build(BuildingKind::Wall)
        );

        world.teams[0].ledger.add(ResourceKind::Metal, 10);
        world.teams[0].ledger.add(ResourceKind::Fuel, 10);
        assert_eq!(
            Behavior::Builder.decide(&world, &unit, &nav),
            ActionCommand::Build(BuildingKind::Turret)
        );
    }

    #[test]
    fn test_builder_walks_home_to_build() {
        let mut world = open_world();
        scatter_units(&mut world);
        let idx = engineer_of(&world, 0);
        let home = world.base(0).unwrap();
        world.units[idx].pos = home + Vec2::new(12.0, 0.0);
        let nav = Navigator::for_world(&world);
        match Behavior::Builder.decide(&world, &world.units[idx], &nav) {
            ActionCommand::Move { dx, .. } => assert!(dx < 0.0),
            other => panic!("expected a move home, got {other:?}"),
        }
    }

    #[test]
    fn test_broke_builder_gathers() {
        let mut world = World::new(GameTuning::default(), 1, None).unwrap();
        world.teams[0].ledger = crate::game::ResourceLedger::new(0, 0, 0);
        let idx = engineer_of(&world, 0);
        let node = world.resources[0].pos;
        world.units[idx].pos = node;
        let nav = Navigator::for_world(&world);
        assert_eq!(
            Behavior::Builder.decide(&world, &world.units[idx], &nav),
            ActionCommand::Gather
        );
    }

    #[test]
    fn test_raider_goes_for_jewel() {
        let mut world = open_world();
        scatter_units(&mut world);
        let scout = world
            .units
            .iter()
            .position(|u| u.team == 0 && u.class == UnitClass::Scout)
            .unwrap();
        let target = world.jewels[1].pos;
        world.units[scout].pos = target + Vec2::new(-1.0, 0.0);
        let nav = Navigator::for_world(&world);
        assert_eq!(
            Behavior::Raider.decide(&world, &world.units[scout], &nav),
            ActionCommand::Interact
        );
    }

    #[test]
    fn test_striker_attacks_then_marches() {
        let mut world = open_world();
        scatter_units(&mut world);
        let me = world.units.iter().position(|u| u.team == 0).unwrap();
        let foe = world.units.iter().position(|u| u.team == 1).unwrap();
        world.units[foe].pos = world.units[me].pos + Vec2::new(1.0, 0.0);
        let nav = Navigator::for_world(&world);
        assert_eq!(
            Behavior::Striker.decide(&world, &world.units[me], &nav),
            ActionCommand::Attack
        );

        world.units[me].cooldown = 0.5;
        match Behavior::Striker.decide(&world, &world.units[me], &nav) {
            ActionCommand::Move { dx, .. } => assert!(dx > 0.0),
            other => panic!("expected a chase, got {other:?}"),
        }
    }
}
