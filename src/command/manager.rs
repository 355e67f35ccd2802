use std::io::Write;

use tracing::{debug, warn};

use crate::command::error::WmError;
use crate::command::parse::{self, Command, RatioOp};
use crate::common::config::Settings;
use crate::layout_engine::{regions, tiling};
use crate::model::persist;
use crate::model::vspace::VirtualSpaceRegistry;
use crate::sys::bridge::{DisplayServer, DockHelper, PreselOverlay, WindowId, WindowServer};
use crate::sys::geometry::{Rect, Size};
use crate::sys::screen::{Space, SpaceId};

/// The command interpreter. Owns the workspace registry and reaches every
/// real window through the injected bridges, so the whole surface runs
/// against in-memory fakes in tests.
pub struct WindowManager {
    pub(super) windows: Box<dyn WindowServer>,
    pub(super) displays: Box<dyn DisplayServer>,
    pub(super) overlay: Box<dyn PreselOverlay>,
    pub(super) dock: Box<dyn DockHelper>,
    pub(super) registry: VirtualSpaceRegistry,
    pub(super) settings: Settings,
    pub(super) insertion_point: Option<WindowId>,
}

impl WindowManager {
    pub fn new(
        windows: Box<dyn WindowServer>,
        displays: Box<dyn DisplayServer>,
        overlay: Box<dyn PreselOverlay>,
        dock: Box<dyn DockHelper>,
        settings: Settings,
    ) -> WindowManager {
        WindowManager {
            windows,
            displays,
            overlay,
            dock,
            registry: VirtualSpaceRegistry::new(),
            settings,
            insertion_point: None,
        }
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn reload_settings(&mut self, settings: Settings) { self.settings = settings; }

    /// The navigation origin, normally kept in sync with the focused window
    /// by the key/IPC front end.
    pub fn set_insertion_point(&mut self, window: Option<WindowId>) {
        self.insertion_point = window;
    }

    pub fn insertion_point(&self) -> Option<WindowId> { self.insertion_point }

    pub fn registry(&self) -> &VirtualSpaceRegistry { &self.registry }

    /// Parses and runs one command line, reporting failures to the log.
    /// This is the whole error boundary: nothing propagates past it.
    pub fn handle_message(&mut self, line: &str, out: &mut dyn Write) {
        match parse::parse(line) {
            Ok(command) => {
                debug!("dispatching '{line}'");
                if let Err(err) = self.dispatch(command, out) {
                    warn!("'{line}' failed: {err}");
                }
            }
            Err(err) => warn!("could not parse '{line}': {err}"),
        }
    }

    pub fn dispatch(&mut self, command: Command, out: &mut dyn Write) -> Result<(), WmError> {
        match command {
            Command::WindowFocus(selector) => self.focus_window(selector),
            Command::WindowSwap(selector) => self.swap_window(selector),
            Command::WindowWarp(selector) => self.warp_window(selector),
            Command::WindowRatio(RatioOp::Absolute(ratio)) => {
                if (0.1..=0.9).contains(&ratio) {
                    self.settings.bsp_split_ratio = ratio;
                }
                Ok(())
            }
            Command::WindowRatio(RatioOp::Toward(selector)) => self.adjust_window_ratio(selector),
            Command::WindowToggle(op) => self.toggle_window(op),
            Command::WindowInsertionPoint(op) => self.use_insertion_point(op),
            Command::WindowClose => {
                if let Some(window) = self.windows.focused_window() {
                    self.windows.close_window(window);
                }
                Ok(())
            }
            Command::WindowToDesktop(target) => self.send_window_to_desktop(target),
            Command::WindowToMonitor(target) => self.send_window_to_monitor(target),
            Command::WindowGrid(spec) => self.grid_layout(spec),
            Command::DesktopLayout(mode) => self.activate_space_layout(mode),
            Command::DesktopRotate(rotation) => self.rotate_window_tree(rotation),
            Command::DesktopMirror(axis) => self.mirror_window_tree(axis),
            Command::DesktopEqualize => self.equalize_window_tree(),
            Command::DesktopPadding(step) => self.adjust_space_padding(step),
            Command::DesktopGap(step) => self.adjust_space_gap(step),
            Command::DesktopToggleOffset => self.toggle_space_offset(),
            Command::DesktopSerialize(path) => self.serialize_desktop(&path),
            Command::DesktopDeserialize(path) => self.deserialize_desktop(&path),
            Command::MonitorFocus(target) => self.focus_monitor(target),
            Command::Query(query) => self.query(query, out),
        }
    }

    /// Tiles a newly observed window on the active space. Floating and
    /// invalid windows stay out of the tree.
    pub fn window_created(&mut self, window: WindowId) -> Result<(), WmError> {
        let Some(info) = self.windows.window(window) else {
            return Ok(());
        };
        if info.floating || !self.windows.is_window_valid(window) {
            return Ok(());
        }
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        self.tile_on_space(space, window)
    }

    /// Drops a closed window out of whatever space holds it.
    pub fn window_destroyed(&mut self, window: WindowId) -> Result<(), WmError> {
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        self.untile_from_space(space, window)
    }

    // Command prologue helpers. These never hold registry borrows, so
    // handlers stay free to take the workspace afterwards.

    pub(super) fn active_space(&self) -> Result<Space, WmError> {
        self.displays.active_space().ok_or(WmError::NoActiveSpace)
    }

    pub(super) fn usable_bounds_for(&self, space: SpaceId) -> Result<Rect, WmError> {
        let display = self
            .displays
            .display_for_space(space)
            .ok_or(WmError::UnknownDisplay(space))?;
        self.displays.usable_bounds(display).ok_or(WmError::UnknownDisplay(space))
    }

    /// Raw display extent of a space, for monitor-edge wrapping.
    pub(super) fn display_size_for(&self, space: SpaceId) -> Result<Size, WmError> {
        let display = self
            .displays
            .display_for_space(space)
            .ok_or(WmError::UnknownDisplay(space))?;
        self.displays
            .display_bounds(display)
            .map(|bounds| bounds.size())
            .ok_or(WmError::UnknownDisplay(space))
    }

    /// Restores a serialized layout the first time a configured space is
    /// touched. Runs before the calling command takes the workspace.
    pub(super) fn prepare_space(&mut self, space: Space, cfg: &Settings) -> Result<(), WmError> {
        let bounds = self.usable_bounds_for(space.id)?;
        let tree_file = self
            .displays
            .desktop_for_space(space.id)
            .and_then(|(_, desktop)| cfg.layout_file_for(desktop));
        let visible = self.windows.visible_windows(space.id);

        let mut vs = self.registry.acquire(space.id, cfg);
        if vs.tree_file.is_none() {
            vs.tree_file = tree_file;
        }
        if !vs.should_deserialize() {
            return Ok(());
        }

        let path = vs.tree_file.clone().expect("should_deserialize implies a tree file");
        let buffer = match std::fs::read_to_string(&path) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("failed to open '{}' for reading: {err}", path.display());
                return Ok(());
            }
        };
        match persist::deserialize_tree(&buffer) {
            Ok(tree) => {
                vs.tree = tree;
                tiling::bind_deserialized_tree(&mut vs, &visible, bounds, cfg.bsp_split_ratio);
                if let Some(root) = vs.tree.root {
                    regions::apply_node_region(&vs, root, &mut *self.windows, true);
                }
            }
            Err(err) => warn!("failed to restore layout from '{}': {err}", path.display()),
        }
        Ok(())
    }

    /// Tiles a window on a user space and realizes the new regions.
    pub(super) fn tile_on_space(&mut self, space: Space, window: WindowId) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        self.prepare_space(space, &cfg)?;
        let bounds = self.usable_bounds_for(space.id)?;
        let insertion = self.insertion_point;

        let mut vs = self.registry.acquire(space.id, &cfg);
        let placement = tiling::tile_window(&mut vs, window, bounds, cfg.bsp_split_ratio, insertion);
        if let Some(placement) = placement {
            regions::apply_node_region(&vs, placement.apply_under, &mut *self.windows, true);
            drop(vs);
            if let Some(border) = placement.consumed_border {
                self.overlay.remove_border(border);
            }
        }
        Ok(())
    }

    /// Untiles a window from a user space and realizes the freed regions.
    pub(super) fn untile_from_space(
        &mut self,
        space: Space,
        window: WindowId,
    ) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        let untiled = tiling::untile_window(&mut vs, window, bounds);
        if let Some(untiled) = untiled {
            if let Some(survivor) = untiled.apply_under {
                regions::apply_node_region(&vs, survivor, &mut *self.windows, true);
            }
            drop(vs);
            if let Some(border) = untiled.orphaned_border {
                self.overlay.remove_border(border);
            }
        }
        Ok(())
    }
}
