use tracing::debug;

use crate::layout_engine::regions::{self, RegionKind};
use crate::model::tree::{NodeId, Split};
use crate::model::vspace::{SpaceMode, VirtualSpace};
use crate::sys::bridge::{BorderHandle, WindowId};
use crate::sys::geometry::{pad, Rect};

/// Aspect threshold for the automatic split orientation.
const OPTIMAL_RATIO: f32 = 1.618;

fn optimal_split(region: Rect) -> Split {
    if region.width / region.height >= OPTIMAL_RATIO {
        Split::Vertical
    } else {
        Split::Horizontal
    }
}

/// Result of tiling a window: the subtree whose regions changed, and the
/// pre-select border that was consumed, if one was pending.
pub struct TilePlacement {
    pub apply_under: NodeId,
    pub consumed_border: Option<BorderHandle>,
}

/// Result of untiling a window: the surviving subtree to re-apply (absent
/// when the tree emptied or in monocle mode) and the border of a pre-select
/// that died with the node.
pub struct Untiled {
    pub apply_under: Option<NodeId>,
    pub orphaned_border: Option<BorderHandle>,
}

/// Inserts a window into the layout. The insertion target is the preselected
/// leaf if one is pending, else the insertion-point window's node, else the
/// first minimum-depth leaf. Returns `None` when the window is already tiled
/// or the space floats.
pub fn tile_window(
    vs: &mut VirtualSpace,
    window: WindowId,
    bounds: Rect,
    split_ratio: f32,
    insertion_point: Option<WindowId>,
) -> Option<TilePlacement> {
    match vs.mode {
        SpaceMode::Float => None,
        SpaceMode::Monocle => {
            if vs.tree.find_window(window, SpaceMode::Monocle).is_some() {
                return None;
            }
            let node = vs.tree.append_monocle(window);
            vs.tree.node_mut(node).region = pad(bounds, vs.offset());
            Some(TilePlacement { apply_under: node, consumed_border: None })
        }
        SpaceMode::Bsp => {
            if vs.tree.find_window(window, SpaceMode::Bsp).is_some() {
                return None;
            }
            if vs.tree.is_empty() {
                let root = vs.tree.create_root(Some(window));
                regions::assign_root_region(vs, bounds, RegionKind::Full);
                return Some(TilePlacement { apply_under: root, consumed_border: None });
            }

            let target = insertion_point
                .and_then(|w| vs.tree.find_window(w, SpaceMode::Bsp))
                .or_else(|| vs.tree.min_depth_leaf())?;

            let placement = match vs.tree.node(target).preselect.clone() {
                Some(presel) => {
                    debug!("consuming preselect {:?} for window {window}", presel.direction);
                    vs.tree.split_leaf(target, window, presel.split, presel.ratio, presel.spawn_left);
                    TilePlacement { apply_under: target, consumed_border: presel.border }
                }
                None => {
                    let split = optimal_split(vs.tree.node(target).region);
                    vs.tree.split_leaf(target, window, split, split_ratio, false);
                    TilePlacement { apply_under: target, consumed_border: None }
                }
            };

            let gap = vs.offset().gap;
            regions::assign_regions_recursive(&mut vs.tree, target, gap);
            Some(placement)
        }
    }
}

/// Removes a window from the layout and recomputes the regions the removal
/// freed up. Returns `None` when the window was not tiled here.
pub fn untile_window(vs: &mut VirtualSpace, window: WindowId, bounds: Rect) -> Option<Untiled> {
    match vs.mode {
        SpaceMode::Float => None,
        SpaceMode::Monocle => {
            let node = vs.tree.find_window(window, SpaceMode::Monocle)?;
            vs.tree.remove_monocle(node);
            Some(Untiled { apply_under: None, orphaned_border: None })
        }
        SpaceMode::Bsp => {
            let node = vs.tree.find_window(window, SpaceMode::Bsp)?;
            let border = vs
                .tree
                .node(node)
                .preselect
                .as_ref()
                .and_then(|presel| presel.border);
            match vs.tree.remove_leaf(node) {
                Some(survivor) => {
                    regions::resize_node_region(vs, survivor, bounds);
                    Some(Untiled { apply_under: Some(survivor), orphaned_border: border })
                }
                None => Some(Untiled { apply_under: None, orphaned_border: border }),
            }
        }
    }
}

/// Builds a fresh layout from the space's visible windows.
pub fn build_tree(vs: &mut VirtualSpace, windows: &[WindowId], bounds: Rect, split_ratio: f32) {
    for &window in windows {
        tile_window(vs, window, bounds, split_ratio, None);
    }
}

/// Binds windows to the unbound leaves of a deserialized tree in leaf order.
/// Surplus leaves collapse; surplus windows tile normally.
pub fn bind_deserialized_tree(
    vs: &mut VirtualSpace,
    windows: &[WindowId],
    bounds: Rect,
    split_ratio: f32,
) {
    let leaves = vs.tree.leaves(SpaceMode::Bsp);
    let mut remaining = windows.iter().copied();
    for leaf in leaves {
        vs.tree.node_mut(leaf).window = remaining.next();
    }

    loop {
        let unbound = vs
            .tree
            .leaves(SpaceMode::Bsp)
            .into_iter()
            .find(|&leaf| vs.tree.node(leaf).window.is_none());
        match unbound {
            Some(leaf) => {
                vs.tree.remove_leaf(leaf);
            }
            None => break,
        }
    }

    if let Some(root) = vs.tree.root {
        regions::resize_node_region(vs, root, bounds);
    }

    for window in remaining {
        tile_window(vs, window, bounds, split_ratio, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::Settings;
    use crate::layout_engine::search::Direction;
    use crate::model::persist;
    use crate::model::tree::Preselect;
    use crate::model::vspace::VirtualSpaceRegistry;
    use crate::sys::screen::SpaceId;

    const BOUNDS: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1600.0,
        height: 900.0,
    };

    fn with_space(f: impl FnOnce(&mut VirtualSpace)) {
        let settings = Settings::default();
        let mut registry = VirtualSpaceRegistry::new();
        let mut vs = registry.acquire(SpaceId::new(1), &settings);
        f(&mut vs);
    }

    #[test]
    fn first_window_fills_the_root_region() {
        with_space(|vs| {
            let placement = tile_window(vs, WindowId(1), BOUNDS, 0.5, None).unwrap();
            assert_eq!(Some(placement.apply_under), vs.tree.root);
            assert_eq!(vs.tree.node(placement.apply_under).region, BOUNDS);
        });
    }

    #[test]
    fn second_window_splits_by_aspect() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);

            // 1600x900 is wider than the golden ratio, so the split is
            // vertical and the new window lands on the right.
            let root = vs.tree.root.unwrap();
            assert_eq!(vs.tree.node(root).split, Split::Vertical);
            let windows: Vec<_> = vs
                .tree
                .leaves(SpaceMode::Bsp)
                .into_iter()
                .map(|leaf| vs.tree.node(leaf).window.unwrap())
                .collect();
            assert_eq!(windows, vec![WindowId(1), WindowId(2)]);
        });
    }

    #[test]
    fn tiling_twice_is_a_no_op() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            assert!(tile_window(vs, WindowId(1), BOUNDS, 0.5, None).is_none());
            assert_eq!(vs.tree.leaves(SpaceMode::Bsp).len(), 1);
        });
    }

    #[test]
    fn preselect_chooses_side_and_ratio() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            let leaf = vs.tree.first_leaf().unwrap();
            vs.tree.node_mut(leaf).preselect = Some(Preselect {
                direction: Direction::West,
                spawn_left: true,
                split: Split::Vertical,
                ratio: 0.3,
                region: Rect::default(),
                border: Some(BorderHandle(9)),
            });

            let placement =
                tile_window(vs, WindowId(2), BOUNDS, 0.5, Some(WindowId(1))).unwrap();
            assert_eq!(placement.consumed_border, Some(BorderHandle(9)));

            let root = vs.tree.root.unwrap();
            assert_eq!(vs.tree.node(root).ratio, 0.3);
            let windows: Vec<_> = vs
                .tree
                .leaves(SpaceMode::Bsp)
                .into_iter()
                .map(|leaf| vs.tree.node(leaf).window.unwrap())
                .collect();
            assert_eq!(windows, vec![WindowId(2), WindowId(1)]);
            assert!(vs.tree.node(vs.tree.first_leaf().unwrap()).preselect.is_none());
        });
    }

    #[test]
    fn untile_returns_regions_to_the_sibling() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);

            let untiled = untile_window(vs, WindowId(2), BOUNDS).unwrap();
            let survivor = untiled.apply_under.unwrap();
            assert_eq!(Some(survivor), vs.tree.root);
            assert_eq!(vs.tree.node(survivor).window, Some(WindowId(1)));
            assert_eq!(vs.tree.node(survivor).region, BOUNDS);
        });
    }

    #[test]
    fn untile_last_window_empties_the_tree() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            let untiled = untile_window(vs, WindowId(1), BOUNDS).unwrap();
            assert!(untiled.apply_under.is_none());
            assert!(vs.tree.is_empty());
        });
    }

    #[test]
    fn monocle_tiles_append_at_the_tail() {
        with_space(|vs| {
            vs.mode = SpaceMode::Monocle;
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);

            let order: Vec<_> = vs
                .tree
                .leaves(SpaceMode::Monocle)
                .into_iter()
                .map(|node| vs.tree.node(node).window.unwrap())
                .collect();
            assert_eq!(order, vec![WindowId(1), WindowId(2)]);
            for node in vs.tree.leaves(SpaceMode::Monocle) {
                assert_eq!(vs.tree.node(node).region, BOUNDS);
            }

            untile_window(vs, WindowId(1), BOUNDS).unwrap();
            assert_eq!(vs.tree.leaves(SpaceMode::Monocle).len(), 1);
        });
    }

    #[test]
    fn float_mode_never_tiles() {
        with_space(|vs| {
            vs.mode = SpaceMode::Float;
            assert!(tile_window(vs, WindowId(1), BOUNDS, 0.5, None).is_none());
            assert!(untile_window(vs, WindowId(1), BOUNDS).is_none());
        });
    }

    #[test]
    fn deserialized_tree_binds_windows_in_leaf_order() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(3), BOUNDS, 0.5, None);
            let buffer = persist::serialize_tree(&vs.tree).unwrap();

            vs.tree = persist::deserialize_tree(&buffer).unwrap();
            bind_deserialized_tree(vs, &[WindowId(7), WindowId(8), WindowId(9)], BOUNDS, 0.5);

            let windows: Vec<_> = vs
                .tree
                .leaves(SpaceMode::Bsp)
                .into_iter()
                .map(|leaf| vs.tree.node(leaf).window.unwrap())
                .collect();
            assert_eq!(windows, vec![WindowId(7), WindowId(8), WindowId(9)]);
        });
    }

    #[test]
    fn deserialized_tree_collapses_surplus_leaves() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(3), BOUNDS, 0.5, None);
            let buffer = persist::serialize_tree(&vs.tree).unwrap();

            vs.tree = persist::deserialize_tree(&buffer).unwrap();
            bind_deserialized_tree(vs, &[WindowId(7)], BOUNDS, 0.5);

            let leaves = vs.tree.leaves(SpaceMode::Bsp);
            assert_eq!(leaves.len(), 1);
            assert_eq!(vs.tree.node(leaves[0]).window, Some(WindowId(7)));
            assert_eq!(vs.tree.node(leaves[0]).region, BOUNDS);
        });
    }

    #[test]
    fn deserialized_tree_tiles_surplus_windows() {
        with_space(|vs| {
            tile_window(vs, WindowId(1), BOUNDS, 0.5, None);
            tile_window(vs, WindowId(2), BOUNDS, 0.5, None);
            let buffer = persist::serialize_tree(&vs.tree).unwrap();

            vs.tree = persist::deserialize_tree(&buffer).unwrap();
            bind_deserialized_tree(
                vs,
                &[WindowId(7), WindowId(8), WindowId(9)],
                BOUNDS,
                0.5,
            );
            assert_eq!(vs.tree.leaves(SpaceMode::Bsp).len(), 3);
        });
    }
}
