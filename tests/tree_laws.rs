//! Structural laws of the layout tree, checked over generated shapes.

use proptest::prelude::*;

use trellis_wm::model::persist;
use trellis_wm::model::tree::{NodeId, Rotation, Split, WindowTree};
use trellis_wm::model::vspace::SpaceMode;
use trellis_wm::sys::bridge::WindowId;

#[derive(Debug, Clone)]
enum Shape {
    Leaf,
    Split {
        split: Split,
        ratio: f32,
        left: Box<Shape>,
        right: Box<Shape>,
    },
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = Just(Shape::Leaf);
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            prop_oneof![Just(Split::Vertical), Just(Split::Horizontal)],
            // Dyadic ratios keep `1 - (1 - r) == r` exact in single
            // precision, which the rotation laws rely on.
            4u32..=28,
            inner.clone(),
            inner,
        )
            .prop_map(|(split, numerator, left, right)| Shape::Split {
                split,
                ratio: numerator as f32 / 32.0,
                left: Box::new(left),
                right: Box::new(right),
            })
    })
}

fn grow(tree: &mut WindowTree, node: NodeId, shape: &Shape) {
    if let Shape::Split { split, ratio, left, right } = shape {
        tree.split_leaf(node, WindowId(0), *split, *ratio, false);
        let first = tree.node(node).left.unwrap();
        let second = tree.node(node).right.unwrap();
        tree.node_mut(first).window = None;
        tree.node_mut(second).window = None;
        grow(tree, first, left);
        grow(tree, second, right);
    }
}

fn tree_of(shape: &Shape) -> WindowTree {
    let mut tree = WindowTree::default();
    let root = tree.create_root(None);
    grow(&mut tree, root, shape);
    for (index, leaf) in tree.leaves(SpaceMode::Bsp).into_iter().enumerate() {
        tree.node_mut(leaf).window = Some(WindowId(index as u32 + 1));
    }
    tree
}

/// Shape, splits and ratios via the textual form, plus the leaf bindings.
fn fingerprint(tree: &WindowTree) -> (String, Vec<Option<WindowId>>) {
    let image = persist::serialize_tree(tree).expect("generated trees are never empty");
    let windows = tree
        .leaves(SpaceMode::Bsp)
        .into_iter()
        .map(|leaf| tree.node(leaf).window)
        .collect();
    (image, windows)
}

fn internal_ratios(tree: &WindowTree) -> Vec<f32> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.root.into_iter().collect();
    while let Some(node) = stack.pop() {
        let n = tree.node(node);
        if let (Some(left), Some(right)) = (n.left, n.right) {
            out.push(n.ratio);
            stack.push(left);
            stack.push(right);
        }
    }
    out
}

proptest! {
    #[test]
    fn rotate_180_is_an_involution(shape in arb_shape()) {
        let mut tree = tree_of(&shape);
        let before = fingerprint(&tree);
        tree.rotate(Rotation::Deg180);
        tree.rotate(Rotation::Deg180);
        prop_assert_eq!(fingerprint(&tree), before);
    }

    #[test]
    fn mirror_is_an_involution(shape in arb_shape()) {
        for axis in [Split::Vertical, Split::Horizontal] {
            let mut tree = tree_of(&shape);
            let before = fingerprint(&tree);
            tree.mirror(axis);
            tree.mirror(axis);
            prop_assert_eq!(fingerprint(&tree), before);
        }
    }

    #[test]
    fn rotate_90_twice_equals_rotate_180(shape in arb_shape()) {
        let mut quarter = tree_of(&shape);
        quarter.rotate(Rotation::Deg90);
        quarter.rotate(Rotation::Deg90);

        let mut half = tree_of(&shape);
        half.rotate(Rotation::Deg180);

        prop_assert_eq!(fingerprint(&quarter), fingerprint(&half));
    }

    #[test]
    fn rotate_90_then_270_restores_orientations_and_ratio_bounds(shape in arb_shape()) {
        let tree = tree_of(&shape);
        let leaf_count = tree.leaves(SpaceMode::Bsp).len();
        let root_split = tree.root.map(|root| tree.node(root).split);

        let mut rotated = tree_of(&shape);
        rotated.rotate(Rotation::Deg90);
        rotated.rotate(Rotation::Deg270);

        prop_assert_eq!(rotated.leaves(SpaceMode::Bsp).len(), leaf_count);
        prop_assert_eq!(rotated.root.map(|root| rotated.node(root).split), root_split);
        for ratio in internal_ratios(&rotated) {
            prop_assert!((0.1..=0.9).contains(&ratio));
        }
    }

    #[test]
    fn serialization_round_trips(shape in arb_shape()) {
        let tree = tree_of(&shape);
        let image = persist::serialize_tree(&tree).unwrap();
        let restored = persist::deserialize_tree(&image).unwrap();
        prop_assert_eq!(persist::serialize_tree(&restored).unwrap(), image);
        prop_assert_eq!(
            restored.leaves(SpaceMode::Bsp).len(),
            tree.leaves(SpaceMode::Bsp).len()
        );
    }

    #[test]
    fn equalize_is_idempotent_and_bounded(shape in arb_shape()) {
        let mut tree = tree_of(&shape);
        tree.equalize();
        let once = fingerprint(&tree);
        for ratio in internal_ratios(&tree) {
            prop_assert!((0.1..=0.9).contains(&ratio));
        }
        tree.equalize();
        prop_assert_eq!(fingerprint(&tree), once);
    }

    #[test]
    fn rotations_preserve_ratio_bounds(shape in arb_shape()) {
        let mut tree = tree_of(&shape);
        for rotation in [Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            tree.rotate(rotation);
            for ratio in internal_ratios(&tree) {
                prop_assert!((0.1..=0.9).contains(&ratio));
            }
        }
    }

    #[test]
    fn swap_window_ids_is_an_involution(shape in arb_shape()) {
        let mut tree = tree_of(&shape);
        let leaves = tree.leaves(SpaceMode::Bsp);
        prop_assume!(leaves.len() >= 2);
        let before = fingerprint(&tree);
        tree.swap_window_ids(leaves[0], leaves[leaves.len() - 1]);
        tree.swap_window_ids(leaves[0], leaves[leaves.len() - 1]);
        prop_assert_eq!(fingerprint(&tree), before);
    }
}
