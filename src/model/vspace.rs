use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::collections::HashMap;
use crate::common::config::Settings;
use crate::model::tree::WindowTree;
use crate::sys::screen::SpaceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceMode {
    Bsp,
    Monocle,
    Float,
}

impl SpaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceMode::Bsp => "bsp",
            SpaceMode::Monocle => "monocle",
            SpaceMode::Float => "float",
        }
    }
}

/// Per-space padding and inter-sibling gap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceOffset {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub gap: f32,
}

impl SpaceOffset {
    pub const ZERO: SpaceOffset = SpaceOffset {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
        gap: 0.0,
    };
}

/// Layout state of one compositor space: the tree, the active mode and the
/// padding offsets. Owned exclusively by the registry.
#[derive(Debug)]
pub struct VirtualSpace {
    pub id: SpaceId,
    pub mode: SpaceMode,
    pub tree: WindowTree,
    stored_offset: SpaceOffset,
    offset_enabled: bool,
    /// Serialized layout to restore from on first use, if configured.
    pub tree_file: Option<PathBuf>,
    acquisitions: u32,
}

impl VirtualSpace {
    fn new(id: SpaceId, settings: &Settings) -> VirtualSpace {
        VirtualSpace {
            id,
            mode: SpaceMode::Bsp,
            tree: WindowTree::default(),
            stored_offset: SpaceOffset {
                top: settings.padding.top,
                bottom: settings.padding.bottom,
                left: settings.padding.left,
                right: settings.padding.right,
                gap: settings.padding.gap,
            },
            offset_enabled: true,
            tree_file: None,
            acquisitions: 0,
        }
    }

    /// The offset commands should lay out with. Toggled-off offsets read as
    /// zero without losing the stored values.
    pub fn offset(&self) -> SpaceOffset {
        if self.offset_enabled {
            self.stored_offset
        } else {
            SpaceOffset::ZERO
        }
    }

    /// The stored offset, regardless of the toggle.
    pub fn stored_offset(&self) -> SpaceOffset { self.stored_offset }

    pub fn stored_offset_mut(&mut self) -> &mut SpaceOffset { &mut self.stored_offset }

    pub fn toggle_offset(&mut self) { self.offset_enabled = !self.offset_enabled; }

    pub fn offset_enabled(&self) -> bool { self.offset_enabled }

    /// True when a stored layout should be reloaded from disk before the
    /// first tree is built.
    pub fn should_deserialize(&self) -> bool {
        self.mode == SpaceMode::Bsp && self.tree.is_empty() && self.tree_file.is_some()
    }

    pub fn acquisitions(&self) -> u32 { self.acquisitions }
}

/// Process-wide registry of virtual spaces. Acquisition is idempotent and
/// reference counted; the guard releases on every exit path.
#[derive(Debug, Default)]
pub struct VirtualSpaceRegistry {
    spaces: HashMap<SpaceId, VirtualSpace>,
}

impl VirtualSpaceRegistry {
    pub fn new() -> VirtualSpaceRegistry { VirtualSpaceRegistry::default() }

    pub fn acquire(&mut self, space: SpaceId, settings: &Settings) -> SpaceHandle<'_> {
        let entry = self
            .spaces
            .entry(space)
            .or_insert_with(|| VirtualSpace::new(space, settings));
        entry.acquisitions += 1;
        SpaceHandle { registry: self, space }
    }

    fn release(&mut self, space: SpaceId) {
        let entry = self
            .spaces
            .get_mut(&space)
            .expect("released a space that was never acquired");
        entry.acquisitions = entry.acquisitions.saturating_sub(1);
    }

    pub fn get(&self, space: SpaceId) -> Option<&VirtualSpace> { self.spaces.get(&space) }
}

/// Scoped acquisition of a virtual space. Dropping the handle releases it, so
/// no command path can skip the release.
pub struct SpaceHandle<'a> {
    registry: &'a mut VirtualSpaceRegistry,
    space: SpaceId,
}

impl Deref for SpaceHandle<'_> {
    type Target = VirtualSpace;

    fn deref(&self) -> &VirtualSpace {
        self.registry.spaces.get(&self.space).expect("acquired space vanished")
    }
}

impl DerefMut for SpaceHandle<'_> {
    fn deref_mut(&mut self) -> &mut VirtualSpace {
        self.registry.spaces.get_mut(&self.space).expect("acquired space vanished")
    }
}

impl Drop for SpaceHandle<'_> {
    fn drop(&mut self) { self.registry.release(self.space); }
}
