use serde::{Deserialize, Serialize};

/// Per-frame displacement applied by [`crate::Entity::step`].
///
/// Components are compared exactly; there is no epsilon anywhere in this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Bounce off a horizontal surface: vertical travel is inverted.
    pub fn reflect_horizontally(self) -> Velocity {
        Velocity {
            x: self.x,
            y: -self.y,
        }
    }

    /// Bounce off a vertical surface: horizontal travel is inverted.
    pub fn reflect_vertically(self) -> Velocity {
        Velocity {
            x: -self.x,
            y: self.y,
        }
    }
}
