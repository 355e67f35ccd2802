pub mod persist;
pub mod tree;
pub mod vspace;

pub use tree::{Node, NodeId, Preselect, Rotation, Split, WindowTree};
pub use vspace::{SpaceMode, SpaceOffset, VirtualSpace, VirtualSpaceRegistry};
