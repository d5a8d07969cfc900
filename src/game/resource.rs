//! Harvestable resource nodes.

use crate::config::ResourceKind;
use crate::geometry::Vec2;

/// A node that yields one unit of its kind, then respawns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceNode {
    /// Index in the owning collection.
    pub id: u32,
    /// What the node yields.
    pub kind: ResourceKind,
    /// Position in world units.
    pub pos: Vec2,
    /// Whether the node can be harvested.
    pub alive: bool,
    /// Seconds until a harvested node returns.
    pub respawn: f64,
}

impl ResourceNode {
    /// A fresh, harvestable node.
    #[must_use]
    pub const fn new(id: u32, kind: ResourceKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            alive: true,
            respawn: 0.0,
        }
    }

    /// Count down the respawn timer and reactivate when it runs out.
    pub fn tick(&mut self, dt: f64) {
        if self.alive {
            return;
        }
        self.respawn -= dt;
        if self.respawn <= 0.0 {
            self.alive = true;
            self.respawn = 0.0;
        }
    }

    /// Deactivate the node and return what it yielded.
    ///
    /// Returns `None` if the node is already depleted.
    pub fn harvest(&mut self, respawn_s: f64) -> Option<ResourceKind> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        self.respawn = respawn_s;
        Some(self.kind)
    }
}

/// Index and distance of the nearest alive node to `pos`.
///
/// Equal distances resolve to the lower index.
#[must_use]
pub fn nearest_alive(nodes: &[ResourceNode], pos: Vec2) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, node) in nodes.iter().enumerate() {
        if !node.alive {
            continue;
        }
        let d = node.pos.distance(pos);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}
