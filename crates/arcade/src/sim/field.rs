use serde::{Deserialize, Serialize};

use super::entity::{Entity, Kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Play-field extents supplied by the window backend. The field spans `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl PlayField {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// First edge crossed in `Top > Bottom > Left > Right` order; a single edge at most.
    pub fn edge_hit<K: Kind>(&self, entity: &Entity<K>) -> Option<Edge> {
        if entity.top() < 0.0 {
            Some(Edge::Top)
        } else if entity.bottom() > self.height {
            Some(Edge::Bottom)
        } else if entity.left() < 0.0 {
            Some(Edge::Left)
        } else if entity.right() > self.width {
            Some(Edge::Right)
        } else {
            None
        }
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, width: f32, height: f32) -> Entity<()> {
        Entity::builder(())
            .name("probe")
            .position(x, y)
            .size(width, height)
            .build()
            .expect("probe")
    }

    #[test]
    fn inside_field_reports_no_edge() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(10.0, 10.0, 5.0, 5.0)), None);
    }

    #[test]
    fn flush_with_boundary_is_not_a_hit() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(0.0, 0.0, 100.0, 100.0)), None);
    }

    #[test]
    fn each_edge_is_detected() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(10.0, -1.0, 5.0, 5.0)), Some(Edge::Top));
        assert_eq!(field.edge_hit(&at(10.0, 96.0, 5.0, 5.0)), Some(Edge::Bottom));
        assert_eq!(field.edge_hit(&at(-1.0, 10.0, 5.0, 5.0)), Some(Edge::Left));
        assert_eq!(field.edge_hit(&at(96.0, 10.0, 5.0, 5.0)), Some(Edge::Right));
    }

    #[test]
    fn top_wins_over_left() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(-5.0, -5.0, 2.0, 2.0)), Some(Edge::Top));
    }

    #[test]
    fn bottom_wins_over_right() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(99.0, 99.0, 5.0, 5.0)), Some(Edge::Bottom));
    }

    #[test]
    fn left_wins_over_right_for_oversized_entity() {
        let field = PlayField::new(100.0, 100.0);
        assert_eq!(field.edge_hit(&at(-1.0, 0.0, 200.0, 10.0)), Some(Edge::Left));
    }
}
