use std::path::Path;

use tracing::{error, warn};

use crate::command::error::WmError;
use crate::command::manager::WindowManager;
use crate::command::parse::Step;
use crate::layout_engine::regions::{self, RegionKind};
use crate::layout_engine::tiling;
use crate::model::persist;
use crate::model::tree::{Rotation, Split};
use crate::model::vspace::SpaceMode;

impl WindowManager {
    pub(super) fn rotate_window_tree(&mut self, rotation: Rotation) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }

        vs.tree.rotate(rotation);
        let root = vs.tree.root.expect("non-empty tree has a root");
        let gap = vs.offset().gap;
        regions::assign_regions_recursive(&mut vs.tree, root, gap);
        regions::apply_node_region(&vs, root, &mut *self.windows, true);
        Ok(())
    }

    pub(super) fn mirror_window_tree(&mut self, axis: Split) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }

        vs.tree.mirror(axis);
        let root = vs.tree.root.expect("non-empty tree has a root");
        let gap = vs.offset().gap;
        regions::assign_regions_recursive(&mut vs.tree, root, gap);
        regions::apply_node_region(&vs, root, &mut *self.windows, true);
        Ok(())
    }

    pub(super) fn equalize_window_tree(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }

        vs.tree.equalize();
        let root = vs.tree.root.expect("non-empty tree has a root");
        regions::resize_node_region(&mut vs, root, bounds);
        regions::apply_node_region(&vs, root, &mut *self.windows, true);
        Ok(())
    }

    pub(super) fn activate_space_layout(&mut self, mode: SpaceMode) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;
        let visible = self.windows.visible_windows(space.id);

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.mode == mode {
            return Ok(());
        }

        vs.tree.clear();
        vs.mode = mode;

        if vs.should_deserialize() {
            let path = vs.tree_file.clone().expect("should_deserialize implies a tree file");
            drop(vs);
            return self.prepare_space_from_file(space, &path);
        }

        tiling::build_tree(&mut vs, &visible, bounds, cfg.bsp_split_ratio);
        if let Some(root) = vs.tree.root {
            regions::apply_node_region(&vs, root, &mut *self.windows, true);
        }
        Ok(())
    }

    /// Rebuild-from-file path of `activate_space_layout`; shares the restore
    /// logic used on first acquisition.
    fn prepare_space_from_file(
        &mut self,
        space: crate::sys::screen::Space,
        path: &Path,
    ) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let bounds = self.usable_bounds_for(space.id)?;
        let visible = self.windows.visible_windows(space.id);

        let buffer = match std::fs::read_to_string(path) {
            Ok(buffer) => buffer,
            Err(err) => {
                error!("failed to open '{}' for reading: {err}", path.display());
                return Ok(());
            }
        };
        let tree = match persist::deserialize_tree(&buffer) {
            Ok(tree) => tree,
            Err(err) => {
                error!("failed to restore layout from '{}': {err}", path.display());
                return Ok(());
            }
        };

        let mut vs = self.registry.acquire(space.id, &cfg);
        vs.tree = tree;
        tiling::bind_deserialized_tree(&mut vs, &visible, bounds, cfg.bsp_split_ratio);
        if let Some(root) = vs.tree.root {
            regions::apply_node_region(&vs, root, &mut *self.windows, true);
        }
        Ok(())
    }

    pub(super) fn toggle_space_offset(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }

        vs.toggle_offset();
        drop(vs);
        self.relayout_space(space.id, bounds)
    }

    pub(super) fn adjust_space_padding(&mut self, step: Step) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }

        let delta = match step {
            Step::Inc => cfg.padding_step_size,
            Step::Dec => -cfg.padding_step_size,
        };
        let offset = vs.stored_offset();
        let top = offset.top + delta;
        let bottom = offset.bottom + delta;
        let left = offset.left + delta;
        let right = offset.right + delta;
        if top >= 0.0 && bottom >= 0.0 && left >= 0.0 && right >= 0.0 {
            let stored = vs.stored_offset_mut();
            stored.top = top;
            stored.bottom = bottom;
            stored.left = left;
            stored.right = right;
        }

        drop(vs);
        self.relayout_space(space.id, bounds)
    }

    pub(super) fn adjust_space_gap(&mut self, step: Step) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }

        let delta = match step {
            Step::Inc => cfg.gap_step_size,
            Step::Dec => -cfg.gap_step_size,
        };
        let gap = vs.stored_offset().gap + delta;
        if gap >= 0.0 {
            vs.stored_offset_mut().gap = gap;
        }

        drop(vs);
        self.relayout_space(space.id, bounds)
    }

    /// Full recompute-and-apply after an offset change. Zoomed windows keep
    /// their zoomed frames.
    fn relayout_space(
        &mut self,
        space: crate::sys::screen::SpaceId,
        bounds: crate::sys::geometry::Rect,
    ) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let mut vs = self.registry.acquire(space, &cfg);
        if vs.tree.is_empty() {
            return Ok(());
        }
        match vs.mode {
            SpaceMode::Monocle => {
                regions::assign_monocle_regions(&mut vs, bounds);
            }
            _ => {
                regions::assign_root_region(&mut vs, bounds, RegionKind::Full);
                let root = vs.tree.root.expect("non-empty tree has a root");
                let gap = vs.offset().gap;
                regions::assign_regions_recursive(&mut vs.tree, root, gap);
            }
        }
        let root = vs.tree.root.expect("non-empty tree has a root");
        regions::apply_node_region(&vs, root, &mut *self.windows, false);
        Ok(())
    }

    pub(super) fn serialize_desktop(&mut self, path: &Path) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        let vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }

        let buffer = persist::serialize_tree(&vs.tree)?;
        drop(vs);
        if let Err(err) = std::fs::write(path, buffer) {
            error!("failed to open '{}' for writing: {err}", path.display());
        }
        Ok(())
    }

    pub(super) fn deserialize_desktop(&mut self, path: &Path) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        {
            let vs = self.registry.acquire(space.id, &cfg);
            if vs.mode != SpaceMode::Bsp {
                return Ok(());
            }
        }

        if !path.exists() {
            error!("failed to open '{}' for reading", path.display());
            return Ok(());
        }
        let outcome = self.prepare_space_from_file(space, path);
        if outcome.is_err() {
            warn!("could not rebuild desktop from '{}'", path.display());
        }
        outcome
    }
}
