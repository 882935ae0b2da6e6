use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{petri_net::petri_net_struct::Position, supply_chain::tables::Tier};

///
/// Constants of the layered layout (in editor drawing units)
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// x of the leftmost tier ([`Tier::Tier3`])
    pub tier_x_start: i64,
    /// Horizontal distance between neighbouring tiers
    pub tier_spacing: i64,
    /// y of the first node of each tier
    pub y_start: i64,
    /// Vertical distance between consecutive nodes of a tier
    pub y_step: i64,
    /// Horizontal distance of demand transitions to the [`Tier::User`] column
    pub demand_offset: i64,
    /// x assumed for transport endpoints missing from the node table
    pub default_x: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tier_x_start: 100,
            tier_spacing: 300,
            y_start: 100,
            y_step: 120,
            demand_offset: 300,
            default_x: 100,
        }
    }
}

impl LayoutConfig {
    /// Fixed x coordinate of a tier
    pub fn tier_x(&self, tier: Tier) -> i64 {
        self.tier_x_start + tier.index() as i64 * self.tier_spacing
    }

    /// Fixed x coordinate of demand transitions
    pub fn demand_x(&self) -> i64 {
        self.tier_x(Tier::User) + self.demand_offset
    }
}

///
/// Positions assigned so far, by node id
///
/// Built incrementally during one conversion: warehouses first, so that transitions can
/// be placed relative to them.
#[derive(Debug, Clone, Default)]
pub struct PositionMap {
    positions: HashMap<String, Position>,
}

impl PositionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }
    /// Record the position of a node
    pub fn insert(&mut self, id: impl Into<String>, position: Position) {
        self.positions.insert(id.into(), position);
    }
    /// Position of a node, if assigned
    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }
}

///
/// Assigns fixed positions to places and transitions
///
/// Places are stacked per tier in the order they are laid out; nothing is moved once placed.
#[derive(Debug)]
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    next_row: [i64; 4],
}

impl<'a> LayoutEngine<'a> {
    /// Create a layout engine with empty tiers
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            next_row: [0; 4],
        }
    }

    /// Position of the next place of `tier`
    pub fn place_warehouse(&mut self, tier: Tier) -> Position {
        let row = &mut self.next_row[tier.index()];
        let position = Position::new(
            self.config.tier_x(tier),
            self.config.y_start + *row * self.config.y_step,
        );
        *row += 1;
        position
    }

    /// Position of a transport transition between `source` and `target`
    ///
    /// Horizontally halfway between both places (rounded down), vertically level with
    /// `source`. Unknown endpoints count as `x = default_x`, `y = y_start`.
    pub fn transport_position(&self, positions: &PositionMap, source: &str, target: &str) -> Position {
        let from = positions.get(source);
        let x_from = from.map_or(self.config.default_x, |p| p.x);
        let x_to = positions.get(target).map_or(self.config.default_x, |p| p.x);
        Position::new(
            (x_from + x_to).div_euclid(2),
            from.map_or(self.config.y_start, |p| p.y),
        )
    }

    /// Position of a demand transition feeding `user`
    ///
    /// Right of the user tier, level with the user place (`y_start` if unknown).
    pub fn demand_position(&self, positions: &PositionMap, user: &str) -> Position {
        let y = positions.get(user).map_or(self.config.y_start, |p| p.y);
        Position::new(self.config.demand_x(), y)
    }
}
