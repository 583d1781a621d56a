//! Attack range patterns
//!
//! A pattern is the set of relative offsets a unit threatens from the tile it
//! stands on. Patterns never include the unit's own tile.

use serde::{Deserialize, Serialize};

/// Side length of the window a custom bitmask describes (5x5, unit in the middle)
const CUSTOM_WINDOW: i32 = 5;
const CUSTOM_CENTER: i32 = CUSTOM_WINDOW / 2;

/// Named attack range pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackRangePattern {
    /// The four orthogonal neighbours
    #[default]
    Cross,
    /// The four diagonal neighbours
    Diagonal,
    /// Every tile within a euclidean radius
    Circle(u8),
    /// Every tile within a chebyshev radius (radius 1 is the 8 neighbours)
    Square(u8),
    /// A straight line forward (+y) of the given length
    Line(u8),
    /// Two tiles forward and two tiles to the right
    LShape,
    /// Bitmask over a 5x5 window, bit `y * 5 + x`, unit at the centre (2, 2)
    Custom(u32),
}

impl AttackRangePattern {
    /// Relative offsets threatened by this pattern, in a stable order
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        match *self {
            AttackRangePattern::Cross => vec![(0, 1), (0, -1), (1, 0), (-1, 0)],
            AttackRangePattern::Diagonal => vec![(1, 1), (1, -1), (-1, 1), (-1, -1)],
            AttackRangePattern::Circle(radius) => {
                let r = radius as i32;
                let mut offsets = Vec::new();
                for dy in -r..=r {
                    for dx in -r..=r {
                        if (dx, dy) != (0, 0) && dx * dx + dy * dy <= r * r {
                            offsets.push((dx, dy));
                        }
                    }
                }
                offsets
            }
            AttackRangePattern::Square(radius) => {
                let r = radius as i32;
                let mut offsets = Vec::new();
                for dy in -r..=r {
                    for dx in -r..=r {
                        if (dx, dy) != (0, 0) {
                            offsets.push((dx, dy));
                        }
                    }
                }
                offsets
            }
            AttackRangePattern::Line(length) => (1..=length as i32).map(|dy| (0, dy)).collect(),
            AttackRangePattern::LShape => vec![(0, 1), (0, 2), (1, 0), (2, 0)],
            AttackRangePattern::Custom(mask) => {
                let mut offsets = Vec::new();
                for y in 0..CUSTOM_WINDOW {
                    for x in 0..CUSTOM_WINDOW {
                        let bit = y * CUSTOM_WINDOW + x;
                        let offset = (x - CUSTOM_CENTER, y - CUSTOM_CENTER);
                        if offset != (0, 0) && mask & (1 << bit) != 0 {
                            offsets.push(offset);
                        }
                    }
                }
                offsets
            }
        }
    }

    /// Number of tiles the pattern covers
    pub fn size(&self) -> usize {
        self.offsets().len()
    }

    /// Whether `offset` is part of this pattern
    pub fn covers(&self, offset: (i32, i32)) -> bool {
        self.offsets().contains(&offset)
    }

    /// Fixed bonus used when ranking candidates during selection
    ///
    /// Area patterns are rarer and more flexible than the basic shapes.
    pub fn uniqueness_score(&self) -> f64 {
        match self {
            AttackRangePattern::Square(_) | AttackRangePattern::Circle(_) => 15.0,
            AttackRangePattern::Line(_) => 12.0,
            AttackRangePattern::LShape => 10.0,
            AttackRangePattern::Cross | AttackRangePattern::Diagonal => 8.0,
            AttackRangePattern::Custom(_) => 5.0,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            AttackRangePattern::Cross => "cross",
            AttackRangePattern::Diagonal => "diagonal",
            AttackRangePattern::Circle(_) => "circle",
            AttackRangePattern::Square(_) => "square",
            AttackRangePattern::Line(_) => "line",
            AttackRangePattern::LShape => "l-shape",
            AttackRangePattern::Custom(_) => "custom",
        }
    }
}
