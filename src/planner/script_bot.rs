//! Baseline duel bot: farm, craft, steal, return, and fight when close.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::duel::{DUEL_GATHER_RADIUS, Duel, HOME_RADIUS};
use crate::game::{ActionCommand, PICKUP_RADIUS, TeamId};
use crate::geometry::Vec2;
use crate::planner::{Navigator, cardinal};

/// Chance per decision that an unarmed bot rushes the enemy jewel anyway.
const RUSH_CHANCE: f64 = 0.15;

/// Weapon level the bot keeps crafting towards before it stops returning home.
const TARGET_WEAPON_LEVEL: u8 = 2;

/// Scripted single-agent controller for a [`Duel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptBot {
    /// Probability of attacking when the enemy is in reach, clamped to `[0, 1]`.
    pub aggressiveness: f64,
}

impl Default for ScriptBot {
    fn default() -> Self {
        Self { aggressiveness: 0.6 }
    }
}

impl ScriptBot {
    /// Bot with the given attack probability.
    #[must_use]
    pub const fn new(aggressiveness: f64) -> Self {
        Self { aggressiveness }
    }

    /// Choose `team`'s next command.
    ///
    /// Random draws happen only at the two coin flips, so the same duel
    /// state and RNG state always yield the same command.
    pub fn decide<R: Rng + ?Sized>(&self, duel: &Duel, team: TeamId, rng: &mut R) -> ActionCommand {
        let me = usize::from(team.min(1));
        let agent = &duel.agents[me];
        let enemy = duel.opponent(team);
        let home = duel.bases[me];

        if agent.pos.within(enemy.pos, duel.config.attack_range)
            && agent.cooldown <= 0.0
            && agent.busy <= 0.0
            && rng.random_bool(self.attack_chance())
        {
            return ActionCommand::Attack;
        }

        if agent.has_jewel {
            if agent.pos.within(home, HOME_RADIUS) {
                return ActionCommand::Interact;
            }
            return self.move_towards(duel, agent.pos, home);
        }

        let enemy_jewel = &duel.jewels[1 - me];
        if !enemy_jewel.is_carried() {
            if agent.pos.within(enemy_jewel.pos, PICKUP_RADIUS) {
                return ActionCommand::Interact;
            }
            if agent.weapon_level >= 1 || rng.random_bool(RUSH_CHANCE) {
                return self.move_towards(duel, agent.pos, enemy_jewel.pos);
            }
        }

        let can_craft = agent.resources >= duel.config.craft_cost;
        if can_craft && agent.busy <= 0.0 && agent.pos.within(home, HOME_RADIUS) {
            return ActionCommand::Craft;
        }
        if can_craft && agent.weapon_level < TARGET_WEAPON_LEVEL {
            return self.move_towards(duel, agent.pos, home);
        }

        if agent.busy <= 0.0 {
            if let Some((node, distance)) = duel.nearest_resource(agent.pos) {
                if distance <= DUEL_GATHER_RADIUS {
                    return ActionCommand::Gather;
                }
                return self.move_towards(duel, agent.pos, duel.resources[node].pos);
            }
        }
        ActionCommand::Noop
    }

    fn attack_chance(&self) -> f64 {
        if self.aggressiveness.is_nan() {
            0.0
        } else {
            self.aggressiveness.clamp(0.0, 1.0)
        }
    }

    #[allow(clippy::unused_self)]
    fn move_towards(&self, duel: &Duel, from: Vec2, target: Vec2) -> ActionCommand {
        cardinal(Navigator::for_duel(duel).steer(from, target))
    }
}
