use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::layout_engine::search::Direction;
use crate::model::vspace::SpaceMode;
use crate::sys::bridge::{BorderHandle, WindowId};
use crate::sys::geometry::Rect;

slotmap::new_key_type! { pub struct NodeId; }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    None,
    Vertical,
    Horizontal,
}

impl Split {
    pub fn toggled(self) -> Split {
        match self {
            Split::None => Split::None,
            Split::Vertical => Split::Horizontal,
            Split::Horizontal => Split::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

/// A pending split recorded on a leaf, consumed by the next window spawned
/// while that leaf is the insertion point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preselect {
    pub direction: Direction,
    pub spawn_left: bool,
    pub split: Split,
    pub ratio: f32,
    pub region: Rect,
    #[serde(skip)]
    pub border: Option<BorderHandle>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub window: Option<WindowId>,
    pub split: Split,
    pub ratio: f32,
    pub region: Rect,
    pub preselect: Option<Preselect>,
    /// On the root: the fullscreen-zoomed node. On an internal node: its
    /// parent-zoomed child.
    pub zoom: Option<NodeId>,
}

impl Node {
    fn leaf(window: Option<WindowId>) -> Node {
        Node {
            parent: None,
            left: None,
            right: None,
            window,
            split: Split::None,
            ratio: 0.5,
            region: Rect::default(),
            preselect: None,
            zoom: None,
        }
    }

    pub fn is_leaf(&self) -> bool { self.left.is_none() && self.right.is_none() }
}

/// Layout structure of one virtual space. In BSP mode this is a binary tree
/// whose leaves hold windows; in monocle mode the same arena holds a doubly
/// linked list where `left`/`right` are predecessor/successor and `parent` is
/// always `None`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WindowTree {
    nodes: SlotMap<NodeId, Node>,
    pub root: Option<NodeId>,
}

impl WindowTree {
    pub fn is_empty(&self) -> bool { self.root.is_none() }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn node(&self, id: NodeId) -> &Node { &self.nodes[id] }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node { &mut self.nodes[id] }

    pub fn get(&self, id: NodeId) -> Option<&Node> { self.nodes.get(id) }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn create_root(&mut self, window: Option<WindowId>) -> NodeId {
        let id = self.nodes.insert(Node::leaf(window));
        self.root = Some(id);
        id
    }

    pub fn first_leaf(&self) -> Option<NodeId> {
        let mut node = self.root?;
        while let Some(left) = self.nodes[node].left {
            node = left;
        }
        Some(node)
    }

    pub fn last_leaf(&self) -> Option<NodeId> {
        let mut node = self.root?;
        while let Some(right) = self.nodes[node].right {
            node = right;
        }
        Some(node)
    }

    pub fn next_leaf(&self, node: NodeId, mode: SpaceMode) -> Option<NodeId> {
        match mode {
            SpaceMode::Monocle => self.nodes[node].right,
            _ => self.in_order_successor(node),
        }
    }

    pub fn prev_leaf(&self, node: NodeId, mode: SpaceMode) -> Option<NodeId> {
        match mode {
            SpaceMode::Monocle => self.nodes[node].left,
            _ => self.in_order_predecessor(node),
        }
    }

    fn in_order_successor(&self, mut node: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.nodes[node].parent?;
            if self.nodes[parent].right != Some(node) {
                let mut next = self.nodes[parent].right?;
                while let Some(left) = self.nodes[next].left {
                    next = left;
                }
                return Some(next);
            }
            node = parent;
        }
    }

    fn in_order_predecessor(&self, mut node: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.nodes[node].parent?;
            if self.nodes[parent].left != Some(node) {
                let mut prev = self.nodes[parent].left?;
                while let Some(right) = self.nodes[prev].right {
                    prev = right;
                }
                return Some(prev);
            }
            node = parent;
        }
    }

    /// Leaves in traversal order (in-order for BSP, head to tail for
    /// monocle).
    pub fn leaves(&self, mode: SpaceMode) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.first_leaf();
        while let Some(node) = cursor {
            out.push(node);
            cursor = self.next_leaf(node, mode);
        }
        out
    }

    /// Largest leaf by region area; earlier in-order leaves win ties.
    pub fn biggest_leaf(&self, mode: SpaceMode) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for leaf in self.leaves(mode) {
            let area = self.nodes[leaf].region.area();
            if best.map_or(true, |(_, max)| area > max) {
                best = Some((leaf, area));
            }
        }
        best.map(|(id, _)| id)
    }

    /// First leaf at the shallowest depth; the preferred insertion target
    /// when no insertion point resolves.
    pub fn min_depth_leaf(&self) -> Option<NodeId> {
        let mut queue = VecDeque::new();
        queue.push_back(self.root?);
        while let Some(node) = queue.pop_front() {
            let n = &self.nodes[node];
            if n.is_leaf() {
                return Some(node);
            }
            if let Some(left) = n.left {
                queue.push_back(left);
            }
            if let Some(right) = n.right {
                queue.push_back(right);
            }
        }
        None
    }

    pub fn find_window(&self, window: WindowId, mode: SpaceMode) -> Option<NodeId> {
        self.leaves(mode)
            .into_iter()
            .find(|&leaf| self.nodes[leaf].window == Some(window))
    }

    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut ancestors = Vec::new();
        let mut cursor = Some(a);
        while let Some(node) = cursor {
            ancestors.push(node);
            cursor = self.nodes[node].parent;
        }
        let mut cursor = Some(b);
        while let Some(node) = cursor {
            if ancestors.contains(&node) {
                return Some(node);
            }
            cursor = self.nodes[node].parent;
        }
        None
    }

    pub fn is_in_subtree(&self, root: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.nodes[current].parent;
        }
        false
    }

    /// Exchanges the bound windows of two leaves without touching the tree
    /// shape.
    pub fn swap_window_ids(&mut self, a: NodeId, b: NodeId) {
        let wa = self.nodes[a].window;
        let wb = self.nodes[b].window;
        self.nodes[a].window = wb;
        self.nodes[b].window = wa;
    }

    pub fn leaf_count(&self, node: NodeId) -> usize {
        let n = &self.nodes[node];
        match (n.left, n.right) {
            (Some(left), Some(right)) => self.leaf_count(left) + self.leaf_count(right),
            _ => 1,
        }
    }

    /// Recomputes every internal ratio so siblings are weighted by leaf
    /// count, clamped into the legal ratio range.
    pub fn equalize(&mut self) {
        if let Some(root) = self.root {
            self.equalize_node(root);
        }
    }

    fn equalize_node(&mut self, node: NodeId) -> usize {
        let (left, right) = {
            let n = &self.nodes[node];
            (n.left, n.right)
        };
        match (left, right) {
            (Some(left), Some(right)) => {
                let left_count = self.equalize_node(left);
                let total = left_count + self.equalize_node(right);
                self.nodes[node].ratio =
                    (left_count as f32 / total as f32).clamp(0.1, 0.9);
                total
            }
            _ => 1,
        }
    }

    /// Single-pass rotation: 90 swaps children of vertical splits, 270 of
    /// horizontal ones, 180 of every node; split orientation toggles for
    /// 90/270 and is preserved for 180. A swap always flips the ratio.
    pub fn rotate(&mut self, rotation: Rotation) {
        if let Some(root) = self.root {
            self.rotate_node(root, rotation);
        }
    }

    fn rotate_node(&mut self, node: NodeId, rotation: Rotation) {
        let n = &mut self.nodes[node];
        let swap = matches!(
            (rotation, n.split),
            (Rotation::Deg90, Split::Vertical)
                | (Rotation::Deg270, Split::Horizontal)
                | (Rotation::Deg180, _)
        );
        if swap {
            std::mem::swap(&mut n.left, &mut n.right);
            n.ratio = 1.0 - n.ratio;
        }
        if rotation != Rotation::Deg180 {
            n.split = n.split.toggled();
        }
        let (left, right) = (n.left, n.right);
        if let (Some(left), Some(right)) = (left, right) {
            self.rotate_node(left, rotation);
            self.rotate_node(right, rotation);
        }
    }

    /// Swaps children on every node split along `axis`.
    pub fn mirror(&mut self, axis: Split) {
        if let Some(root) = self.root {
            self.mirror_node(root, axis);
        }
    }

    fn mirror_node(&mut self, node: NodeId, axis: Split) {
        let (left, right) = {
            let n = &self.nodes[node];
            (n.left, n.right)
        };
        if let (Some(left), Some(right)) = (left, right) {
            self.mirror_node(left, axis);
            self.mirror_node(right, axis);
            let n = &mut self.nodes[node];
            if n.split == axis {
                std::mem::swap(&mut n.left, &mut n.right);
            }
        }
    }

    /// Turns `leaf` into an internal node with two fresh leaves and returns
    /// the one bound to `new_window`. The existing window moves to the other
    /// side; any pending preselect and zoom marks on `leaf` are dropped.
    pub fn split_leaf(
        &mut self,
        leaf: NodeId,
        new_window: WindowId,
        split: Split,
        ratio: f32,
        spawn_left: bool,
    ) -> NodeId {
        let existing = self.nodes[leaf].window.take();
        let (first_window, second_window) = if spawn_left {
            (Some(new_window), existing)
        } else {
            (existing, Some(new_window))
        };

        let mut first = Node::leaf(first_window);
        first.parent = Some(leaf);
        let first = self.nodes.insert(first);
        let mut second = Node::leaf(second_window);
        second.parent = Some(leaf);
        let second = self.nodes.insert(second);

        let n = &mut self.nodes[leaf];
        n.split = split;
        n.ratio = ratio;
        n.left = Some(first);
        n.right = Some(second);
        n.preselect = None;
        self.drop_zoom_references(leaf, None);

        if spawn_left { first } else { second }
    }

    /// Removes a BSP leaf and grafts its sibling into the parent slot.
    /// Returns the surviving subtree root whose regions must be recomputed,
    /// or `None` when the tree became empty.
    pub fn remove_leaf(&mut self, leaf: NodeId) -> Option<NodeId> {
        let Some(parent) = self.nodes[leaf].parent else {
            self.nodes.remove(leaf);
            self.root = None;
            return None;
        };

        let sibling = if self.nodes[parent].left == Some(leaf) {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        }
        .expect("internal node is missing a child");

        let grafted = self.nodes.remove(sibling).expect("sibling vanished from arena");
        let children = (grafted.left, grafted.right);

        let p = &mut self.nodes[parent];
        p.window = grafted.window;
        p.split = grafted.split;
        p.ratio = grafted.ratio;
        p.left = grafted.left;
        p.right = grafted.right;
        p.preselect = grafted.preselect;
        p.zoom = grafted.zoom;

        for child in [children.0, children.1].into_iter().flatten() {
            self.nodes[child].parent = Some(parent);
        }

        self.nodes.remove(leaf);
        self.drop_zoom_references(leaf, None);
        self.drop_zoom_references(sibling, Some(parent));
        Some(parent)
    }

    /// Appends a monocle node at the tail of the list.
    pub fn append_monocle(&mut self, window: WindowId) -> NodeId {
        let id = self.nodes.insert(Node::leaf(Some(window)));
        match self.last_leaf() {
            Some(tail) => {
                self.nodes[tail].right = Some(id);
                self.nodes[id].left = Some(tail);
            }
            None => self.root = Some(id),
        }
        id
    }

    /// Unlinks a monocle node from the list.
    pub fn remove_monocle(&mut self, node: NodeId) {
        let (left, right) = {
            let n = &self.nodes[node];
            (n.left, n.right)
        };
        if let Some(left) = left {
            self.nodes[left].right = right;
        }
        if let Some(right) = right {
            self.nodes[right].left = left;
        }
        if self.root == Some(node) {
            self.root = right.or(left);
        }
        self.nodes.remove(node);
    }

    /// The fullscreen-zoomed node of this tree, if any.
    pub fn fullscreen_zoom(&self) -> Option<NodeId> {
        self.root.and_then(|root| self.nodes[root].zoom)
    }

    pub fn set_fullscreen_zoom(&mut self, node: Option<NodeId>) {
        if let Some(root) = self.root {
            self.nodes[root].zoom = node;
        }
    }

    /// The node `node` is rendered at while zoomed, if it is zoomed.
    pub fn zoom_target(&self, node: NodeId) -> Option<NodeId> {
        if self.fullscreen_zoom() == Some(node) {
            return self.root;
        }
        let parent = self.nodes[node].parent?;
        (self.nodes[parent].zoom == Some(node)).then_some(parent)
    }

    fn drop_zoom_references(&mut self, stale: NodeId, replacement: Option<NodeId>) {
        for (_, node) in self.nodes.iter_mut() {
            if node.zoom == Some(stale) {
                node.zoom = replacement;
            }
        }
    }
}
