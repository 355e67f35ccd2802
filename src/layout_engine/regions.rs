use crate::model::tree::{NodeId, Split, WindowTree};
use crate::model::vspace::{SpaceMode, SpaceOffset, VirtualSpace};
use crate::sys::bridge::{WindowId, WindowServer};
use crate::sys::geometry::{pad, split_horizontal, split_vertical, Rect};

/// Which slice of the padded display a region covers. `Full` is the root
/// region; the half kinds place a single node on half the display and back
/// the pre-select overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    Full,
    Left,
    Right,
    Upper,
    Lower,
}

/// Computes a region of the given kind over the padded display bounds.
pub fn region_of_kind(kind: RegionKind, bounds: Rect, offset: SpaceOffset, ratio: f32) -> Rect {
    let full = pad(bounds, offset);
    match kind {
        RegionKind::Full => full,
        RegionKind::Left => split_vertical(full, ratio, offset.gap).0,
        RegionKind::Right => split_vertical(full, ratio, offset.gap).1,
        RegionKind::Upper => split_horizontal(full, ratio, offset.gap).0,
        RegionKind::Lower => split_horizontal(full, ratio, offset.gap).1,
    }
}

/// Sets the root region from the display bounds and the workspace offset.
pub fn assign_root_region(vs: &mut VirtualSpace, bounds: Rect, kind: RegionKind) {
    if let Some(root) = vs.tree.root {
        let ratio = vs.tree.node(root).ratio;
        let region = region_of_kind(kind, bounds, vs.offset(), ratio);
        vs.tree.node_mut(root).region = region;
    }
}

/// Recomputes children regions below `node` from each node's region, split
/// and ratio.
pub fn assign_regions_recursive(tree: &mut WindowTree, node: NodeId, gap: f32) {
    let (left, right, region, ratio, split) = {
        let n = tree.node(node);
        (n.left, n.right, n.region, n.ratio, n.split)
    };
    let (Some(left), Some(right)) = (left, right) else {
        return;
    };
    let (first, second) = match split {
        Split::Vertical => split_vertical(region, ratio, gap),
        Split::Horizontal => split_horizontal(region, ratio, gap),
        // Internal nodes always carry a split; nothing sane to do otherwise.
        Split::None => return,
    };
    tree.node_mut(left).region = first;
    tree.node_mut(right).region = second;
    assign_regions_recursive(tree, left, gap);
    assign_regions_recursive(tree, right, gap);
}

/// Recomputes regions under `node`, refreshing the root region first when
/// `node` is the root.
pub fn resize_node_region(vs: &mut VirtualSpace, node: NodeId, bounds: Rect) {
    if vs.tree.root == Some(node) {
        assign_root_region(vs, bounds, RegionKind::Full);
    }
    let gap = vs.offset().gap;
    assign_regions_recursive(&mut vs.tree, node, gap);
}

/// Monocle layout: every node covers the padded display.
pub fn assign_monocle_regions(vs: &mut VirtualSpace, bounds: Rect) {
    let region = pad(bounds, vs.offset());
    for node in vs.tree.leaves(SpaceMode::Monocle) {
        vs.tree.node_mut(node).region = region;
    }
}

/// Rounds a region and hands it to the window server. The only place frames
/// leave single precision.
pub fn apply_window_frame(windows: &mut dyn WindowServer, id: WindowId, region: Rect) {
    let frame = region.round();
    windows.set_window_origin(id, frame.origin());
    windows.set_window_size(id, frame.size());
}

/// Reverts a window to its own node region.
pub fn resize_window_to_region(tree: &WindowTree, node: NodeId, windows: &mut dyn WindowServer) {
    let n = tree.node(node);
    if let Some(window) = n.window {
        apply_window_frame(windows, window, n.region);
    }
}

/// Sizes a window to an arbitrary region, leaving its tree slot untouched.
pub fn resize_window_to_rect(
    tree: &WindowTree,
    node: NodeId,
    region: Rect,
    windows: &mut dyn WindowServer,
) {
    if let Some(window) = tree.node(node).window {
        apply_window_frame(windows, window, region);
    }
}

/// Realizes the computed regions below `node`. Zoomed nodes are instead
/// sized to the root or parent region when `include_zoom` is set; fullscreen
/// zoom wins when both are marked.
pub fn apply_node_region(
    vs: &VirtualSpace,
    node: NodeId,
    windows: &mut dyn WindowServer,
    include_zoom: bool,
) {
    match vs.mode {
        SpaceMode::Float => {}
        SpaceMode::Monocle => {
            let mut cursor = Some(node);
            while let Some(current) = cursor {
                resize_window_to_region(&vs.tree, current, windows);
                cursor = vs.tree.next_leaf(current, SpaceMode::Monocle);
            }
        }
        SpaceMode::Bsp => apply_bsp_subtree(vs, node, windows, include_zoom),
    }
}

fn apply_bsp_subtree(
    vs: &VirtualSpace,
    node: NodeId,
    windows: &mut dyn WindowServer,
    include_zoom: bool,
) {
    let n = vs.tree.node(node);
    if let (Some(left), Some(right)) = (n.left, n.right) {
        apply_bsp_subtree(vs, left, windows, include_zoom);
        apply_bsp_subtree(vs, right, windows, include_zoom);
        return;
    }

    let Some(window) = n.window else {
        return;
    };
    let region = if include_zoom {
        match vs.tree.zoom_target(node) {
            Some(target) => vs.tree.node(target).region,
            None => n.region,
        }
    } else {
        n.region
    };
    apply_window_frame(windows, window, region);
}
