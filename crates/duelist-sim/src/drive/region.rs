//! The permitted movement area, inset from the arena walls.

use duelist_core::types::{Arena, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveRegion {
    arena: Arena,
    bounds: Rect,
    hard_limit: f64,
}

impl DriveRegion {
    /// Region inset by `inset` from every wall; positions closer than
    /// `hard_limit` to a wall count as beyond the wall limit.
    pub fn new(arena: Arena, inset: f64, hard_limit: f64) -> Self {
        Self {
            arena,
            bounds: arena.bounds().inset(inset),
            hard_limit,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.bounds.contains(p)
    }

    /// True when `p` is closer to a wall than the hard limit.
    pub fn beyond_wall_limit(&self, p: &Point) -> bool {
        !self.arena.bounds().inset(self.hard_limit).contains(p)
    }
}
