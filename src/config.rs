//! Tuning tables and stat catalogs.
//!
//! Two rule sets share this module: [`GameTuning`] drives the multi-faction
//! world and [`DuelConfig`] drives the two-faction duel. Both deserialize from
//! partial JSON documents; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, require_positive};

/// Smallest supported number of teams.
pub const MIN_TEAMS: usize = 2;

/// Largest supported number of teams.
pub const MAX_TEAMS: usize = 8;

/// Minimum multi-faction map size (cells).
pub const MIN_WORLD_SIZE: (u32, u32) = (16, 12);

/// Minimum duel map size (cells).
pub const MIN_DUEL_SIZE: (u32, u32) = (12, 8);

/// Largest map side (cells) for either ruleset.
pub const MAX_MAP_SIDE: u32 = 1024;

/// Largest supported squad.
pub const MAX_SQUAD_SIZE: usize = 64;

/// Largest supported resource node target.
pub const MAX_RESOURCES: usize = 4096;

/// Reject maps below `min` or above [`MAX_MAP_SIDE`] on either side.
pub(crate) fn check_map_size(width: u32, height: u32, min: (u32, u32)) -> Result<(), ConfigError> {
    let (min_width, min_height) = min;
    if width < min_width || height < min_height {
        return Err(ConfigError::MapTooSmall {
            width,
            height,
            min_width,
            min_height,
        });
    }
    if width > MAX_MAP_SIDE || height > MAX_MAP_SIDE {
        return Err(ConfigError::MapTooLarge {
            width,
            height,
            max: MAX_MAP_SIDE,
        });
    }
    Ok(())
}

/// Reject resource targets above [`MAX_RESOURCES`].
pub(crate) const fn check_resource_target(requested: usize) -> Result<(), ConfigError> {
    if requested > MAX_RESOURCES {
        return Err(ConfigError::TooManyResources {
            requested,
            max: MAX_RESOURCES,
        });
    }
    Ok(())
}

/// Gatherable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Basic building material.
    Wood,
    /// Structural material.
    Metal,
    /// Explosive fuel.
    Fuel,
}

impl ResourceKind {
    /// All kinds in ledger order.
    pub const ALL: [Self; 3] = [Self::Wood, Self::Metal, Self::Fuel];

    /// Slot in a ledger array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Wood => 0,
            Self::Metal => 1,
            Self::Fuel => 2,
        }
    }
}

/// Unit classes available to a squad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    /// Builder and repairer.
    Engineer,
    /// Front-line fighter.
    Assault,
    /// Fast jewel thief.
    Scout,
}

/// Fixed stat bundle for a unit class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    /// Hit points at full health.
    pub max_hp: u32,
    /// Cells per second.
    pub move_speed: f64,
    /// Damage per hit.
    pub damage: u32,
    /// Weapon reach.
    pub attack_range: f64,
    /// Seconds between attacks.
    pub attack_cooldown: f64,
    /// Harvest speed multiplier.
    pub gather_speed: f64,
    /// Construction speed multiplier.
    pub build_speed: f64,
    /// Class-specific speed factor while carrying a jewel.
    pub carry_slow: f64,
}

const ENGINEER: ClassStats = ClassStats {
    max_hp: 120,
    move_speed: 5.5,
    damage: 12,
    attack_range: 1.5,
    attack_cooldown: 0.6,
    gather_speed: 1.15,
    build_speed: 1.35,
    carry_slow: 0.85,
};

const ASSAULT: ClassStats = ClassStats {
    max_hp: 150,
    move_speed: 5.0,
    damage: 18,
    attack_range: 1.7,
    attack_cooldown: 0.55,
    gather_speed: 1.0,
    build_speed: 0.9,
    carry_slow: 0.85,
};

const SCOUT: ClassStats = ClassStats {
    max_hp: 90,
    move_speed: 7.5,
    damage: 10,
    attack_range: 1.4,
    attack_cooldown: 0.5,
    gather_speed: 0.95,
    build_speed: 0.8,
    carry_slow: 1.0,
};

impl UnitClass {
    /// Stats for this class.
    #[must_use]
    pub const fn stats(self) -> &'static ClassStats {
        match self {
            Self::Engineer => &ENGINEER,
            Self::Assault => &ASSAULT,
            Self::Scout => &SCOUT,
        }
    }

    /// Only engineers may construct and repair.
    #[must_use]
    pub const fn can_build(self) -> bool {
        matches!(self, Self::Engineer)
    }
}

/// Default squad composition, repeated to fill the squad.
pub const DEFAULT_LOADOUT: [UnitClass; 3] = [UnitClass::Engineer, UnitClass::Assault, UnitClass::Scout];

/// Building kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Team headquarters; losing it eliminates the team.
    Core,
    /// Storage building.
    Depot,
    /// Production building.
    Workshop,
    /// Automatic defence.
    Turret,
    /// Blocking wall segment.
    Wall,
}

/// Turret-style attack parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingAttack {
    /// Damage per shot.
    pub damage: u32,
    /// Reach.
    pub range: f64,
    /// Seconds between shots.
    pub cooldown: f64,
}

/// Fixed stat bundle for a building kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingStats {
    /// Hit points when complete.
    pub max_hp: u32,
    /// Seconds of construction.
    pub build_time: f64,
    /// Resource bill, spent all-or-nothing.
    pub cost: &'static [(ResourceKind, u32)],
    /// Present for buildings that shoot.
    pub attack: Option<BuildingAttack>,
    /// Whether units collide with it.
    pub blocks_movement: bool,
}

const CORE: BuildingStats = BuildingStats {
    max_hp: 550,
    build_time: 0.0,
    cost: &[],
    attack: None,
    blocks_movement: true,
};

const DEPOT: BuildingStats = BuildingStats {
    max_hp: 220,
    build_time: 6.0,
    cost: &[(ResourceKind::Wood, 8), (ResourceKind::Metal, 6)],
    attack: None,
    blocks_movement: true,
};

const WORKSHOP: BuildingStats = BuildingStats {
    max_hp: 240,
    build_time: 7.5,
    cost: &[(ResourceKind::Wood, 6), (ResourceKind::Metal, 9)],
    attack: None,
    blocks_movement: true,
};

const TURRET: BuildingStats = BuildingStats {
    max_hp: 180,
    build_time: 4.0,
    cost: &[(ResourceKind::Metal, 7), (ResourceKind::Fuel, 3)],
    attack: Some(BuildingAttack {
        damage: 10,
        range: 7.0,
        cooldown: 0.9,
    }),
    blocks_movement: true,
};

const WALL: BuildingStats = BuildingStats {
    max_hp: 120,
    build_time: 2.0,
    cost: &[(ResourceKind::Wood, 4), (ResourceKind::Metal, 1)],
    attack: None,
    blocks_movement: true,
};

impl BuildingKind {
    /// Stats for this kind.
    #[must_use]
    pub const fn stats(self) -> &'static BuildingStats {
        match self {
            Self::Core => &CORE,
            Self::Depot => &DEPOT,
            Self::Workshop => &WORKSHOP,
            Self::Turret => &TURRET,
            Self::Wall => &WALL,
        }
    }
}

/// Display identity of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamProfile {
    /// Human-readable name.
    pub name: &'static str,
    /// RGB colour.
    pub color: (u8, u8, u8),
}

/// Palette indexed by team id.
pub const TEAM_PROFILES: [TeamProfile; MAX_TEAMS] = [
    TeamProfile { name: "Blue", color: (70, 130, 255) },
    TeamProfile { name: "Red", color: (230, 80, 90) },
    TeamProfile { name: "Green", color: (90, 200, 140) },
    TeamProfile { name: "Gold", color: (235, 190, 60) },
    TeamProfile { name: "Violet", color: (160, 100, 220) },
    TeamProfile { name: "Teal", color: (60, 190, 200) },
    TeamProfile { name: "Orange", color: (240, 140, 50) },
    TeamProfile { name: "Grey", color: (150, 150, 160) },
];

/// Multi-faction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Simulation ticks per second used by match runners.
    pub fps: u32,
    /// Match length in seconds.
    pub max_time_s: f64,
    /// Number of factions.
    pub team_count: usize,
    /// Units per faction.
    pub squad_size: usize,
    /// Resource kinds scattered on the map.
    pub resource_types: Vec<ResourceKind>,
    /// Target number of resource nodes.
    pub resources_on_map: usize,
    /// Seconds until a harvested node returns.
    pub resource_respawn_s: f64,
    /// Base harvest lock.
    pub gather_time_s: f64,
    /// Seconds a carrier must hold at home to capture.
    pub capture_hold_s: f64,
    /// Global speed factor while carrying a jewel.
    pub jewel_carry_slow: f64,
    /// End the match when a single core remains.
    pub domination_enabled: bool,
    /// Seconds a dead unit waits before reviving.
    pub respawn_time_s: f64,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            width: 64,
            height: 40,
            fps: 30,
            max_time_s: 600.0,
            team_count: 3,
            squad_size: 3,
            resource_types: ResourceKind::ALL.to_vec(),
            resources_on_map: 45,
            resource_respawn_s: 22.0,
            gather_time_s: 1.1,
            capture_hold_s: 2.5,
            jewel_carry_slow: 0.75,
            domination_enabled: true,
            respawn_time_s: 4.0,
        }
    }
}

impl GameTuning {
    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Seconds per tick at the configured frame rate.
    #[must_use]
    pub fn tick_dt(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }

    /// Ticks in a full-length match.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn max_ticks(&self) -> u64 {
        (self.max_time_s * f64::from(self.fps.max(1))).ceil() as u64
    }

    /// Check the tuning for values the world cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TEAMS..=MAX_TEAMS).contains(&self.team_count) {
            return Err(ConfigError::TeamCount {
                requested: self.team_count,
                min: MIN_TEAMS,
                max: MAX_TEAMS,
            });
        }
        check_map_size(self.width, self.height, MIN_WORLD_SIZE)?;
        if self.squad_size == 0 {
            return Err(ConfigError::EmptySquad);
        }
        if self.squad_size > MAX_SQUAD_SIZE {
            return Err(ConfigError::SquadTooLarge {
                requested: self.squad_size,
                max: MAX_SQUAD_SIZE,
            });
        }
        check_resource_target(self.resources_on_map)?;
        if self.resource_types.is_empty() {
            return Err(ConfigError::NoResourceTypes);
        }
        require_positive("fps", f64::from(self.fps))?;
        require_positive("max_time_s", self.max_time_s)?;
        require_positive("resource_respawn_s", self.resource_respawn_s)?;
        require_positive("gather_time_s", self.gather_time_s)?;
        require_positive("jewel_carry_slow", self.jewel_carry_slow)?;
        require_positive("respawn_time_s", self.respawn_time_s)?;
        if !self.capture_hold_s.is_finite() || self.capture_hold_s < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "capture_hold_s",
                value: self.capture_hold_s,
            });
        }
        Ok(())
    }
}

/// Two-faction duel tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Ticks per second.
    pub fps: u32,
    /// Match length in seconds.
    pub max_time_s: f64,
    /// Base movement speed.
    pub move_speed: f64,
    /// Harvest lock.
    pub gather_time_s: f64,
    /// Crafting lock.
    pub craft_time_s: f64,
    /// Target number of resource nodes.
    pub resources_on_map: usize,
    /// Seconds until a harvested node returns.
    pub resource_respawn_s: f64,
    /// Resources consumed per weapon upgrade.
    pub craft_cost: u32,
    /// Seconds between attacks.
    pub attack_cooldown_s: f64,
    /// Weapon reach.
    pub attack_range: f64,
    /// Damage at weapon level zero.
    pub attack_damage: u32,
    /// Agent hit points.
    pub max_hp: u32,
    /// Seconds a carrier must hold at home; zero captures instantly.
    pub capture_hold_s: f64,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 18,
            fps: 30,
            max_time_s: 300.0,
            move_speed: 6.0,
            gather_time_s: 1.0,
            craft_time_s: 2.0,
            resources_on_map: 20,
            resource_respawn_s: 12.0,
            craft_cost: 3,
            attack_cooldown_s: 0.6,
            attack_range: 1.2,
            attack_damage: 20,
            max_hp: 100,
            capture_hold_s: 0.0,
        }
    }
}

impl DuelConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Seconds per tick.
    #[must_use]
    pub fn tick_dt(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }

    /// Ticks in a full-length match.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn max_ticks(&self) -> u64 {
        (self.max_time_s * f64::from(self.fps.max(1))).ceil() as u64
    }

    /// Check the config for values the duel cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_map_size(self.width, self.height, MIN_DUEL_SIZE)?;
        check_resource_target(self.resources_on_map)?;
        require_positive("fps", f64::from(self.fps))?;
        require_positive("max_time_s", self.max_time_s)?;
        require_positive("move_speed", self.move_speed)?;
        require_positive("gather_time_s", self.gather_time_s)?;
        require_positive("craft_time_s", self.craft_time_s)?;
        require_positive("resource_respawn_s", self.resource_respawn_s)?;
        require_positive("attack_range", self.attack_range)?;
        require_positive("max_hp", f64::from(self.max_hp))?;
        if !self.capture_hold_s.is_finite() || self.capture_hold_s < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "capture_hold_s",
                value: self.capture_hold_s,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(GameTuning::default().validate().is_ok());
        assert!(DuelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_team_count_rejected() {
        let tuning = GameTuning {
            team_count: 1,
            ..GameTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::TeamCount { requested: 1, .. })
        ));

        let tuning = GameTuning {
            team_count: MAX_TEAMS + 1,
            ..GameTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_degenerate_map_rejected() {
        let tuning = GameTuning {
            width: 8,
            ..GameTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::MapTooSmall { .. })));
    }

    #[test]
    fn test_oversized_map_rejected() {
        let tuning = GameTuning {
            width: 3_000_000_000,
            ..GameTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::MapTooLarge { width: 3_000_000_000, .. })
        ));

        let duel = DuelConfig {
            height: MAX_MAP_SIDE + 1,
            ..DuelConfig::default()
        };
        assert!(matches!(duel.validate(), Err(ConfigError::MapTooLarge { .. })));

        let edge = GameTuning {
            width: MAX_MAP_SIDE,
            height: MAX_MAP_SIDE,
            ..GameTuning::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_oversized_squad_and_resources_rejected() {
        let tuning = GameTuning {
            squad_size: usize::MAX / 2,
            ..GameTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::SquadTooLarge { max: MAX_SQUAD_SIZE, .. })
        ));

        let tuning = GameTuning {
            resources_on_map: usize::MAX,
            ..GameTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::TooManyResources { .. })));

        let duel = DuelConfig {
            resources_on_map: MAX_RESOURCES + 1,
            ..DuelConfig::default()
        };
        assert!(matches!(duel.validate(), Err(ConfigError::TooManyResources { .. })));
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let tuning = GameTuning::from_json_str(r#"{"team_count": 2, "squad_size": 5}"#).unwrap();
        assert_eq!(tuning.team_count, 2);
        assert_eq!(tuning.squad_size, 5);
        assert_eq!(tuning.width, 64);

        let duel = DuelConfig::from_json_str(r#"{"capture_hold_s": 1.5}"#).unwrap();
        assert!((duel.capture_hold_s - 1.5).abs() < f64::EPSILON);
        assert_eq!(duel.craft_cost, 3);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            GameTuning::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_catalogs() {
        assert_eq!(UnitClass::Scout.stats().max_hp, 90);
        assert!(UnitClass::Engineer.can_build());
        assert!(!UnitClass::Assault.can_build());
        assert!(BuildingKind::Turret.stats().attack.is_some());
        assert!(BuildingKind::Wall.stats().attack.is_none());
        assert!(BuildingKind::Core.stats().cost.is_empty());
    }

    #[test]
    fn test_max_ticks() {
        let duel = DuelConfig::default();
        assert_eq!(duel.max_ticks(), 9000);
        assert!((duel.tick_dt() - 1.0 / 30.0).abs() < 1e-12);
    }
}
