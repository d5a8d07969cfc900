//! Fixed-length duel observation.

#![allow(clippy::cast_possible_truncation)]

use crate::duel::{Duel, MAX_WEAPON_LEVEL, opponent_of};
use crate::game::TeamId;
use crate::geometry::Vec2;

/// Length of [`observe`]'s output.
pub const DUEL_OBS_LEN: usize = 25;

/// Resource counts are scaled by this and capped at 1.
const RESOURCE_SCALE: f64 = 10.0;

/// Timers are scaled by this and capped at 1.
const TIMER_SCALE: f64 = 2.0;

/// `team`'s view of the duel, every value in `[0, 1]`.
///
/// Order: own and enemy position, own and enemy jewel, own and enemy base,
/// nearest resource `(x, y, distance)`, both hp fractions, both resource
/// fractions, both jewel flags, both weapon levels, own cooldown, own busy.
#[must_use]
pub fn observe(duel: &Duel, team: TeamId) -> [f32; DUEL_OBS_LEN] {
    let me = usize::from(team.min(1));
    let enemy = opponent_of(team);
    let width = f64::from(duel.config.width);
    let height = f64::from(duel.config.height);
    let norm = |p: Vec2| [(p.x / width) as f32, (p.y / height) as f32];

    let own = &duel.agents[me];
    let other = &duel.agents[enemy];

    let (resource_pos, resource_dist) = match duel.nearest_resource(own.pos) {
        Some((i, d)) => (norm(duel.resources[i].pos), (d / width.max(height)).min(1.0)),
        None => ([0.0, 0.0], 1.0),
    };
    let max_hp = f64::from(duel.config.max_hp);
    let level = |l: u8| (f64::from(l) / f64::from(MAX_WEAPON_LEVEL)) as f32;
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let capped = |v: f64, scale: f64| (v / scale).min(1.0) as f32;

    let [ax, ay] = norm(own.pos);
    let [ex, ey] = norm(other.pos);
    let [mjx, mjy] = norm(duel.jewels[me].pos);
    let [ejx, ejy] = norm(duel.jewels[enemy].pos);
    let [mbx, mby] = norm(duel.bases[me]);
    let [ebx, eby] = norm(duel.bases[enemy]);
    let [rx, ry] = resource_pos;

    [
        ax,
        ay,
        ex,
        ey,
        mjx,
        mjy,
        ejx,
        ejy,
        mbx,
        mby,
        ebx,
        eby,
        rx,
        ry,
        resource_dist as f32,
        (f64::from(own.hp) / max_hp) as f32,
        (f64::from(other.hp) / max_hp) as f32,
        capped(f64::from(own.resources), RESOURCE_SCALE),
        capped(f64::from(other.resources), RESOURCE_SCALE),
        flag(own.has_jewel),
        flag(other.has_jewel),
        level(own.weapon_level),
        level(other.weapon_level),
        capped(own.cooldown, TIMER_SCALE),
        capped(own.busy, TIMER_SCALE),
    ]
}
