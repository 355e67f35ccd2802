use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::tree::{NodeId, Split, WindowTree};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("tree is empty")]
    EmptyTree,
    #[error(transparent)]
    Encode(#[from] ron::Error),
    #[error(transparent)]
    Decode(#[from] ron::error::SpannedError),
}

/// Shape-only image of a BSP tree. Windows are bound to leaves by the caller
/// after deserialization, so leaves carry no identity here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeImage {
    Leaf,
    Split {
        split: Split,
        ratio: f32,
        left: Box<TreeImage>,
        right: Box<TreeImage>,
    },
}

impl TreeImage {
    fn of_node(tree: &WindowTree, node: NodeId) -> TreeImage {
        let n = tree.node(node);
        match (n.left, n.right) {
            (Some(left), Some(right)) => TreeImage::Split {
                split: n.split,
                ratio: n.ratio,
                left: Box::new(TreeImage::of_node(tree, left)),
                right: Box::new(TreeImage::of_node(tree, right)),
            },
            _ => TreeImage::Leaf,
        }
    }

    fn grow(&self, tree: &mut WindowTree, node: NodeId) {
        if let TreeImage::Split { split, ratio, left, right } = self {
            // Window identity is irrelevant here; the placeholder is replaced
            // when the caller binds real windows to the leaves.
            let second = tree.split_leaf(node, crate::sys::bridge::WindowId(0), *split, *ratio, false);
            let first = tree.node(node).left.expect("split produced no left child");
            tree.node_mut(first).window = None;
            tree.node_mut(second).window = None;
            left.grow(tree, first);
            right.grow(tree, second);
        }
    }
}

/// Renders the tree shape to its textual form.
pub fn serialize_tree(tree: &WindowTree) -> Result<String, PersistError> {
    let root = tree.root.ok_or(PersistError::EmptyTree)?;
    let image = TreeImage::of_node(tree, root);
    Ok(ron::ser::to_string_pretty(&image, ron::ser::PrettyConfig::default())?)
}

/// Rebuilds an unbound tree from its textual form.
pub fn deserialize_tree(buffer: &str) -> Result<WindowTree, PersistError> {
    let image: TreeImage = ron::from_str(buffer)?;
    let mut tree = WindowTree::default();
    let root = tree.create_root(None);
    image.grow(&mut tree, root);
    Ok(tree)
}
