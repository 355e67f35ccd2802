use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::model::tree::{NodeId, Split, WindowTree};
use crate::model::vspace::SpaceMode;
use crate::sys::bridge::WindowId;
use crate::sys::geometry::{Point, Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// The split orientation a spawn in this direction produces.
    pub fn split(self) -> Split {
        match self {
            Direction::East | Direction::West => Split::Vertical,
            Direction::North | Direction::South => Split::Horizontal,
        }
    }

    /// Whether a spawn in this direction lands in the first child slot.
    pub fn spawn_left(self) -> bool {
        matches!(self, Direction::West | Direction::North)
    }
}

/// Navigation argument accepted by focus/swap/warp/ratio commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    North,
    East,
    South,
    West,
    Prev,
    Next,
    Biggest,
}

impl Selector {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Selector::North => Some(Direction::North),
            Selector::East => Some(Direction::East),
            Selector::South => Some(Direction::South),
            Selector::West => Some(Direction::West),
            _ => None,
        }
    }

    /// True for the selectors that walk toward the head of the layout.
    pub fn is_backward(self) -> bool {
        matches!(self, Selector::West | Selector::Prev)
    }

    /// True for the selectors that walk toward the tail.
    pub fn is_forward(self) -> bool {
        matches!(self, Selector::East | Selector::Next)
    }
}

/// Axis-overlap predicate: `b` lies in `direction` of `a` only if their
/// extents overlap on the perpendicular axis.
pub fn window_is_in_direction(direction: Direction, a: Rect, b: Rect) -> bool {
    match direction {
        Direction::North | Direction::South => {
            a.y != b.y && a.x.max(b.x) < (b.x + b.width).min(a.x + a.width)
        }
        Direction::East | Direction::West => {
            a.x != b.x && a.y.max(b.y) < (b.y + b.height).min(a.y + a.height)
        }
    }
}

fn wrap_monitor_edge(direction: Direction, display: Size, a: Point, b: &mut Point) {
    match direction {
        Direction::North => {
            if a.y < b.y {
                b.y -= display.height;
            }
        }
        Direction::East => {
            if a.x > b.x {
                b.x += display.width;
            }
        }
        Direction::South => {
            if a.y > b.y {
                b.y += display.height;
            }
        }
        Direction::West => {
            if a.x < b.x {
                b.x -= display.width;
            }
        }
    }
}

/// Directional distance between window centers. Off-axis candidates are
/// penalized by the half-angle cosine; candidates behind the direction's
/// sign test are unreachable.
pub fn window_distance(
    direction: Direction,
    a: Point,
    mut b: Point,
    wrap: Option<Size>,
) -> f32 {
    if let Some(display) = wrap {
        wrap_monitor_edge(direction, display, a, &mut b);
    }

    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let angle = dy.atan2(dx);
    let distance = dx.hypot(dy);

    let delta = match direction {
        Direction::North => {
            if dy >= 0.0 {
                return f32::INFINITY;
            }
            -FRAC_PI_2 - angle
        }
        Direction::East => {
            if dx <= 0.0 {
                return f32::INFINITY;
            }
            0.0 - angle
        }
        Direction::South => {
            if dy <= 0.0 {
                return f32::INFINITY;
            }
            FRAC_PI_2 - angle
        }
        Direction::West => {
            if dx >= 0.0 {
                return f32::INFINITY;
            }
            PI - angle.abs()
        }
    };

    distance / (delta / 2.0).cos()
}

/// Nearest tiled window in `direction` of `from`, by node regions.
pub fn closest_leaf(
    tree: &WindowTree,
    mode: SpaceMode,
    from: NodeId,
    direction: Direction,
    wrap: Option<Size>,
) -> Option<NodeId> {
    let a = tree.node(from).region;
    let mut best: Option<(NodeId, f32)> = None;
    for leaf in tree.leaves(mode) {
        if leaf == from || tree.node(leaf).window.is_none() {
            continue;
        }
        let b = tree.node(leaf).region;
        if !window_is_in_direction(direction, a, b) {
            continue;
        }
        let distance = window_distance(direction, a.center(), b.center(), wrap);
        if distance.is_finite() && best.map_or(true, |(_, min)| distance < min) {
            best = Some((leaf, distance));
        }
    }
    best.map(|(leaf, _)| leaf)
}

/// Nearest window in `direction` over raw frames; used on fullscreen spaces
/// where no tree exists.
pub fn closest_frame(
    candidates: &[(WindowId, Rect)],
    from: (WindowId, Rect),
    direction: Direction,
    wrap: Option<Size>,
) -> Option<WindowId> {
    let mut best: Option<(WindowId, f32)> = None;
    for &(id, frame) in candidates {
        if id == from.0 {
            continue;
        }
        if !window_is_in_direction(direction, from.1, frame) {
            continue;
        }
        let distance = window_distance(direction, from.1.center(), frame.center(), wrap);
        if distance.is_finite() && best.map_or(true, |(_, min)| distance < min) {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Undirected navigation over the leaf order: `prev`, `next` (optionally
/// wrapping at the ends) and `biggest`.
pub fn undirected(
    tree: &WindowTree,
    mode: SpaceMode,
    from: NodeId,
    selector: Selector,
    wrap: bool,
) -> Option<NodeId> {
    match selector {
        Selector::Prev => tree
            .prev_leaf(from, mode)
            .or_else(|| if wrap { tree.last_leaf() } else { None }),
        Selector::Next => tree
            .next_leaf(from, mode)
            .or_else(|| if wrap { tree.first_leaf() } else { None }),
        Selector::Biggest => tree.biggest_leaf(mode),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_predicate_requires_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let beside = Rect::new(110.0, 0.0, 100.0, 100.0);
        let diagonal = Rect::new(110.0, 110.0, 100.0, 100.0);

        assert!(window_is_in_direction(Direction::East, a, beside));
        assert!(!window_is_in_direction(Direction::East, a, diagonal));
        assert!(!window_is_in_direction(Direction::South, a, beside));
    }

    #[test]
    fn same_edge_is_not_in_direction() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let level = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!window_is_in_direction(Direction::East, a, level));
        assert!(!window_is_in_direction(Direction::North, a, level));
    }

    #[test]
    fn distance_rejects_wrong_half_plane() {
        let origin = Point::new(0.0, 0.0);
        assert!(window_distance(Direction::East, origin, Point::new(-10.0, 0.0), None)
            .is_infinite());
        assert!(window_distance(Direction::North, origin, Point::new(0.0, 10.0), None)
            .is_infinite());
    }

    #[test]
    fn distance_penalizes_off_axis_candidates() {
        let origin = Point::new(0.0, 0.0);
        let straight = window_distance(Direction::East, origin, Point::new(100.0, 0.0), None);
        let slanted = window_distance(Direction::East, origin, Point::new(100.0, 60.0), None);
        assert!(straight < slanted);
        assert!((straight - 100.0).abs() < 1e-3);
    }

    #[test]
    fn wrap_brings_the_far_edge_into_reach() {
        let display = Size::new(1000.0, 500.0);
        let left = Point::new(100.0, 250.0);
        let right = Point::new(900.0, 250.0);

        // Without wrapping, nothing lies west of the leftmost window.
        assert!(window_distance(Direction::West, left, right, None).is_infinite());
        let wrapped = window_distance(Direction::West, left, right, Some(display));
        assert!(wrapped.is_finite());
        assert!((wrapped - 200.0).abs() < 1e-3);
    }

    mod tree_search {
        use super::*;
        use crate::model::tree::Split;
        use crate::sys::bridge::WindowId;

        fn grid() -> (WindowTree, Vec<NodeId>) {
            // 1 | 2 over 3 | 4 on a 1000x1000 display.
            let mut tree = WindowTree::default();
            let root = tree.create_root(Some(WindowId(1)));
            let lower = tree.split_leaf(root, WindowId(3), Split::Horizontal, 0.5, false);
            let upper = tree.node(root).left.unwrap();
            tree.split_leaf(upper, WindowId(2), Split::Vertical, 0.5, false);
            tree.split_leaf(lower, WindowId(4), Split::Vertical, 0.5, false);

            let leaves = tree.leaves(SpaceMode::Bsp);
            let frames = [
                Rect::new(0.0, 0.0, 500.0, 500.0),
                Rect::new(500.0, 0.0, 500.0, 500.0),
                Rect::new(0.0, 500.0, 500.0, 500.0),
                Rect::new(500.0, 500.0, 500.0, 500.0),
            ];
            for (leaf, frame) in leaves.iter().zip(frames) {
                tree.node_mut(*leaf).region = frame;
            }
            (tree, leaves)
        }

        #[test]
        fn closest_prefers_straight_neighbors() {
            let (tree, leaves) = grid();
            assert_eq!(
                closest_leaf(&tree, SpaceMode::Bsp, leaves[0], Direction::East, None),
                Some(leaves[1])
            );
            assert_eq!(
                closest_leaf(&tree, SpaceMode::Bsp, leaves[0], Direction::South, None),
                Some(leaves[2])
            );
            assert_eq!(
                closest_leaf(&tree, SpaceMode::Bsp, leaves[3], Direction::North, None),
                Some(leaves[1])
            );
            assert_eq!(
                closest_leaf(&tree, SpaceMode::Bsp, leaves[0], Direction::West, None),
                None
            );
        }

        #[test]
        fn closest_wraps_at_the_display_edge() {
            let (tree, leaves) = grid();
            let wrap = Some(Size::new(1000.0, 1000.0));
            assert_eq!(
                closest_leaf(&tree, SpaceMode::Bsp, leaves[0], Direction::West, wrap),
                Some(leaves[1])
            );
        }

        #[test]
        fn undirected_walks_leaf_order() {
            let (tree, leaves) = grid();
            assert_eq!(
                undirected(&tree, SpaceMode::Bsp, leaves[0], Selector::Next, false),
                Some(leaves[1])
            );
            assert_eq!(
                undirected(&tree, SpaceMode::Bsp, leaves[0], Selector::Prev, false),
                None
            );
            assert_eq!(
                undirected(&tree, SpaceMode::Bsp, leaves[0], Selector::Prev, true),
                Some(leaves[3])
            );
            assert_eq!(
                undirected(&tree, SpaceMode::Bsp, leaves[2], Selector::Biggest, false),
                Some(leaves[0])
            );
        }
    }
}
