use tracing::debug;

use crate::command::error::WmError;
use crate::command::manager::WindowManager;
use crate::command::parse::{GridSpec, PreselOp, TargetSel, ToggleOp};
use crate::common::config::{FocusCycle, Settings};
use crate::layout_engine::regions::{self, RegionKind};
use crate::layout_engine::search::{self, Direction, Selector};
use crate::layout_engine::tiling;
use crate::model::tree::{Preselect, Split};
use crate::model::vspace::SpaceMode;
use crate::sys::bridge::{WindowId, WindowServer};
use crate::sys::dock::{FLOATING_WINDOW_LEVEL_KEY, NORMAL_WINDOW_LEVEL_KEY};
use crate::sys::geometry::{normalize_to_display, Point, Rect, Size};
use crate::sys::screen::{Space, SpaceKind};

enum Found {
    Window(WindowId),
    Monitor(TargetSel),
    Nothing,
}

fn center_mouse_in_region(windows: &mut dyn WindowServer, region: Rect) {
    if !region.contains(windows.cursor_position()) {
        windows.warp_cursor(region.center());
    }
}

impl WindowManager {
    pub(super) fn focus_window(&mut self, selector: Selector) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            if space.kind == SpaceKind::Fullscreen {
                self.focus_in_fullscreen_space(space, selector, &cfg);
            }
            return Ok(());
        }

        self.prepare_space(space, &cfg)?;
        let display_size = self.display_size_for(space.id)?;
        let insertion = self
            .insertion_point
            .filter(|&window| self.windows.window(window).is_some());

        let vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode == SpaceMode::Float {
            return Ok(());
        }

        let single_display = self.displays.display_count() == 1;
        let found = match insertion {
            None => {
                // No insertion point resolves: land on one end of the layout.
                let node = if selector.is_backward() || selector == Selector::North {
                    vs.tree.last_leaf()
                } else if selector.is_forward() || selector == Selector::South {
                    vs.tree.first_leaf()
                } else {
                    None
                };
                match node.and_then(|node| vs.tree.node(node).window) {
                    Some(window) => Found::Window(window),
                    None => Found::Nothing,
                }
            }
            Some(window) => match vs.mode {
                SpaceMode::Bsp => {
                    let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
                        return Ok(());
                    };
                    let wrap = match cfg.window_focus_cycle {
                        FocusCycle::All => single_display,
                        FocusCycle::Monitor => true,
                        FocusCycle::None => false,
                    };
                    let target = match selector.direction() {
                        Some(direction) => search::closest_leaf(
                            &vs.tree,
                            SpaceMode::Bsp,
                            node,
                            direction,
                            wrap.then_some(display_size),
                        ),
                        None => search::undirected(&vs.tree, SpaceMode::Bsp, node, selector, wrap),
                    };
                    match target.and_then(|t| vs.tree.node(t).window) {
                        Some(window) => Found::Window(window),
                        None if cfg.window_focus_cycle == FocusCycle::All
                            && selector.is_forward() =>
                        {
                            Found::Monitor(TargetSel::Next)
                        }
                        None if cfg.window_focus_cycle == FocusCycle::All
                            && selector.is_backward() =>
                        {
                            Found::Monitor(TargetSel::Prev)
                        }
                        None => Found::Nothing,
                    }
                }
                SpaceMode::Monocle => {
                    let Some(node) = vs.tree.find_window(window, SpaceMode::Monocle) else {
                        return Ok(());
                    };
                    let neighbor = if selector.is_backward() {
                        vs.tree.prev_leaf(node, SpaceMode::Monocle)
                    } else if selector.is_forward() {
                        vs.tree.next_leaf(node, SpaceMode::Monocle)
                    } else {
                        return Ok(());
                    };
                    match neighbor {
                        Some(target) => match vs.tree.node(target).window {
                            Some(window) => Found::Window(window),
                            None => Found::Nothing,
                        },
                        None => match cfg.window_focus_cycle {
                            FocusCycle::All if single_display => {
                                let end = if selector.is_backward() {
                                    vs.tree.last_leaf()
                                } else {
                                    vs.tree.first_leaf()
                                };
                                match end.and_then(|node| vs.tree.node(node).window) {
                                    Some(window) => Found::Window(window),
                                    None => Found::Nothing,
                                }
                            }
                            FocusCycle::All => Found::Monitor(if selector.is_backward() {
                                TargetSel::Prev
                            } else {
                                TargetSel::Next
                            }),
                            FocusCycle::Monitor => {
                                let end = if selector.is_backward() {
                                    vs.tree.last_leaf()
                                } else {
                                    vs.tree.first_leaf()
                                };
                                match end.and_then(|node| vs.tree.node(node).window) {
                                    Some(window) => Found::Window(window),
                                    None => Found::Nothing,
                                }
                            }
                            FocusCycle::None => Found::Nothing,
                        },
                    }
                }
                SpaceMode::Float => Found::Nothing,
            },
        };
        drop(vs);

        match found {
            Found::Window(window) => {
                self.windows.focus_window(window);
                Ok(())
            }
            Found::Monitor(target) => self.focus_monitor(target),
            Found::Nothing => Ok(()),
        }
    }

    fn focus_in_fullscreen_space(&mut self, space: Space, selector: Selector, cfg: &Settings) {
        let Some(focused) = self.windows.focused_window() else {
            return;
        };
        let Some(from) = self.windows.window(focused) else {
            return;
        };
        // Ordinal selectors degrade to the matching cardinal on spaces
        // without a tree.
        let direction = match selector {
            Selector::Prev => Direction::West,
            Selector::Next => Direction::East,
            other => match other.direction() {
                Some(direction) => direction,
                None => return,
            },
        };
        let wrap = match cfg.window_focus_cycle {
            FocusCycle::All => self.displays.display_count() == 1,
            FocusCycle::Monitor => true,
            FocusCycle::None => false,
        };
        let display_size = match self.display_size_for(space.id) {
            Ok(size) => size,
            Err(_) => return,
        };

        let candidates: Vec<(WindowId, Rect)> = self
            .windows
            .visible_windows_filtered(space.id, true, false)
            .into_iter()
            .filter_map(|id| self.windows.window(id).map(|info| (id, info.frame)))
            .collect();
        let target = search::closest_frame(
            &candidates,
            (from.id, from.frame),
            direction,
            wrap.then_some(display_size),
        );
        if let Some(window) = target {
            self.windows.focus_window(window);
        }
    }

    pub(super) fn swap_window(&mut self, selector: Selector) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.insertion_point else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        self.prepare_space(space, &cfg)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode == SpaceMode::Float {
            return Ok(());
        }

        match vs.mode {
            SpaceMode::Bsp => {
                let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
                    return Ok(());
                };
                let target = match selector.direction() {
                    Some(direction) => {
                        search::closest_leaf(&vs.tree, SpaceMode::Bsp, node, direction, None)
                    }
                    None => search::undirected(&vs.tree, SpaceMode::Bsp, node, selector, false),
                };
                let Some(target) = target else {
                    return Ok(());
                };

                vs.tree.swap_window_ids(node, target);
                regions::resize_window_to_region(&vs.tree, node, &mut *self.windows);
                regions::resize_window_to_region(&vs.tree, target, &mut *self.windows);

                if cfg.mouse_follows_focus {
                    let region = vs.tree.node(target).region;
                    drop(vs);
                    center_mouse_in_region(&mut *self.windows, region);
                }
            }
            SpaceMode::Monocle => {
                let Some(node) = vs.tree.find_window(window, SpaceMode::Monocle) else {
                    return Ok(());
                };
                let target = if selector.is_backward() {
                    vs.tree.prev_leaf(node, SpaceMode::Monocle).or_else(|| vs.tree.last_leaf())
                } else if selector.is_forward() {
                    vs.tree.next_leaf(node, SpaceMode::Monocle).or_else(|| vs.tree.first_leaf())
                } else {
                    None
                };
                // Swapping in monocle never moves the mouse; the regions are
                // identical anyway.
                if let Some(target) = target.filter(|&target| target != node) {
                    vs.tree.swap_window_ids(node, target);
                }
            }
            SpaceMode::Float => {}
        }
        Ok(())
    }

    pub(super) fn warp_window(&mut self, selector: Selector) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.insertion_point else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        self.prepare_space(space, &cfg)?;
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode == SpaceMode::Float {
            return Ok(());
        }

        match vs.mode {
            SpaceMode::Bsp => {
                let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
                    return Ok(());
                };
                let target = match selector.direction() {
                    Some(direction) => {
                        search::closest_leaf(&vs.tree, SpaceMode::Bsp, node, direction, None)
                    }
                    None => search::undirected(&vs.tree, SpaceMode::Bsp, node, selector, false),
                };
                let Some(target) = target else {
                    return Ok(());
                };

                if vs.tree.node(node).parent == vs.tree.node(target).parent {
                    // Same parent: a warp degenerates to a swap.
                    vs.tree.swap_window_ids(node, target);
                    regions::resize_window_to_region(&vs.tree, node, &mut *self.windows);
                    regions::resize_window_to_region(&vs.tree, target, &mut *self.windows);
                    if cfg.mouse_follows_focus {
                        let region = vs.tree.node(target).region;
                        drop(vs);
                        center_mouse_in_region(&mut *self.windows, region);
                    }
                    return Ok(());
                }

                let Some(target_window) = vs.tree.node(target).window else {
                    return Ok(());
                };

                if let Some(untiled) = tiling::untile_window(&mut vs, window, bounds) {
                    if let Some(survivor) = untiled.apply_under {
                        regions::apply_node_region(&vs, survivor, &mut *self.windows, true);
                    }
                }
                let placement = tiling::tile_window(
                    &mut vs,
                    window,
                    bounds,
                    cfg.bsp_split_ratio,
                    Some(target_window),
                );
                if let Some(placement) = placement {
                    regions::apply_node_region(&vs, placement.apply_under, &mut *self.windows, true);
                    if let Some(border) = placement.consumed_border {
                        self.overlay.remove_border(border);
                    }
                }

                if cfg.mouse_follows_focus {
                    if let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) {
                        let region = vs.tree.node(node).region;
                        drop(vs);
                        center_mouse_in_region(&mut *self.windows, region);
                    }
                }
            }
            SpaceMode::Monocle => {
                let Some(node) = vs.tree.find_window(window, SpaceMode::Monocle) else {
                    return Ok(());
                };
                let target = if selector.is_backward() {
                    vs.tree.prev_leaf(node, SpaceMode::Monocle).or_else(|| vs.tree.last_leaf())
                } else if selector.is_forward() {
                    vs.tree.next_leaf(node, SpaceMode::Monocle).or_else(|| vs.tree.first_leaf())
                } else {
                    None
                };
                if let Some(target) = target.filter(|&target| target != node) {
                    vs.tree.swap_window_ids(node, target);
                }
            }
            SpaceMode::Float => {}
        }
        Ok(())
    }

    pub(super) fn adjust_window_ratio(&mut self, selector: Selector) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.insertion_point else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(root) = vs.tree.root else {
            return Ok(());
        };
        if vs.tree.node(root).is_leaf() {
            return Ok(());
        }
        let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
            return Ok(());
        };

        let target = match selector.direction() {
            Some(direction) => search::closest_leaf(&vs.tree, SpaceMode::Bsp, node, direction, None),
            None => search::undirected(&vs.tree, SpaceMode::Bsp, node, selector, false),
        };
        let Some(target) = target else {
            return Ok(());
        };
        let Some(ancestor) = vs.tree.lowest_common_ancestor(node, target) else {
            return Ok(());
        };
        let left = vs
            .tree
            .node(ancestor)
            .left
            .expect("common ancestor of two distinct leaves is internal");

        // Growing the source's side of the ancestor means adding when the
        // source sits in the left subtree.
        let step = cfg.bsp_split_ratio;
        let offset = if node == left || vs.tree.is_in_subtree(left, node) {
            step
        } else {
            -step
        };
        let ratio = vs.tree.node(ancestor).ratio + offset;
        if (0.1..=0.9).contains(&ratio) {
            vs.tree.node_mut(ancestor).ratio = ratio;
            regions::resize_node_region(&mut vs, ancestor, bounds);
            regions::apply_node_region(&vs, ancestor, &mut *self.windows, true);
        }
        Ok(())
    }

    pub(super) fn toggle_window(&mut self, op: ToggleOp) -> Result<(), WmError> {
        match op {
            ToggleOp::Float => self.toggle_window_float(),
            ToggleOp::Sticky => self.toggle_window_sticky(),
            ToggleOp::NativeFullscreen => self.toggle_window_native_fullscreen(),
            ToggleOp::FullscreenZoom => self.toggle_fullscreen_zoom(),
            ToggleOp::ParentZoom => self.toggle_parent_zoom(),
            ToggleOp::Split => self.toggle_split_mode(),
        }
    }

    fn float_window(&mut self, window: WindowId, cfg: &Settings) {
        self.windows.set_floating(window, true);
        if cfg.window_float_topmost {
            self.dock.window_level(window, FLOATING_WINDOW_LEVEL_KEY);
        }
    }

    fn unfloat_window(&mut self, window: WindowId, cfg: &Settings) {
        self.windows.set_floating(window, false);
        if cfg.window_float_topmost {
            self.dock.window_level(window, NORMAL_WINDOW_LEVEL_KEY);
        }
    }

    fn toggle_window_float(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let Some(info) = self.windows.window(window) else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        if info.floating {
            self.unfloat_window(window, &cfg);
            self.tile_on_space(space, window)
        } else {
            self.untile_from_space(space, window)?;
            self.float_window(window, &cfg);
            Ok(())
        }
    }

    fn toggle_window_sticky(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let Some(info) = self.windows.window(window) else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        if info.sticky {
            self.dock.window_sticky(window, false);
            self.windows.set_sticky(window, false);
            if info.floating {
                self.unfloat_window(window, &cfg);
                self.tile_on_space(space, window)?;
            }
        } else {
            self.dock.window_sticky(window, true);
            self.windows.set_sticky(window, true);
            // Sticky implies float.
            if !info.floating {
                self.untile_from_space(space, window)?;
                self.float_window(window, &cfg);
            }
        }
        Ok(())
    }

    fn toggle_window_native_fullscreen(&mut self) -> Result<(), WmError> {
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        if self.windows.is_native_fullscreen(window) {
            self.windows.set_native_fullscreen(window, false);
            self.tile_on_space(space, window)
        } else {
            self.untile_from_space(space, window)?;
            self.windows.set_native_fullscreen(window, true);
            Ok(())
        }
    }

    fn toggle_fullscreen_zoom(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
            return Ok(());
        };

        if vs.tree.fullscreen_zoom() == Some(node) {
            regions::resize_window_to_region(&vs.tree, node, &mut *self.windows);
            vs.tree.set_fullscreen_zoom(None);
        } else {
            // The two zoom states are mutually exclusive on a node.
            if let Some(parent) = vs.tree.node(node).parent {
                if vs.tree.node(parent).zoom == Some(node) {
                    vs.tree.node_mut(parent).zoom = None;
                }
            }
            if let Some(previous) = vs.tree.fullscreen_zoom() {
                regions::resize_window_to_region(&vs.tree, previous, &mut *self.windows);
            }
            vs.tree.set_fullscreen_zoom(Some(node));
            let root = vs.tree.root.expect("non-empty tree has a root");
            let region = vs.tree.node(root).region;
            regions::resize_window_to_rect(&vs.tree, node, region, &mut *self.windows);
        }
        Ok(())
    }

    fn toggle_parent_zoom(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
            return Ok(());
        };
        let Some(parent) = vs.tree.node(node).parent else {
            return Ok(());
        };

        if vs.tree.node(parent).zoom == Some(node) {
            regions::resize_window_to_region(&vs.tree, node, &mut *self.windows);
            vs.tree.node_mut(parent).zoom = None;
        } else {
            if vs.tree.fullscreen_zoom() == Some(node) {
                vs.tree.set_fullscreen_zoom(None);
            }
            if let Some(previous) = vs.tree.node(parent).zoom {
                regions::resize_window_to_region(&vs.tree, previous, &mut *self.windows);
            }
            vs.tree.node_mut(parent).zoom = Some(node);
            let region = vs.tree.node(parent).region;
            regions::resize_window_to_rect(&vs.tree, node, region, &mut *self.windows);
        }
        Ok(())
    }

    fn toggle_split_mode(&mut self) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let Some(window) = self.insertion_point else {
            return Ok(());
        };

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
            return Ok(());
        };
        let Some(parent) = vs.tree.node(node).parent else {
            return Ok(());
        };

        let split = vs.tree.node(parent).split;
        if split == Split::None {
            return Ok(());
        }
        vs.tree.node_mut(parent).split = split.toggled();

        let gap = vs.offset().gap;
        regions::assign_regions_recursive(&mut vs.tree, parent, gap);
        regions::apply_node_region(&vs, parent, &mut *self.windows, true);
        Ok(())
    }

    pub(super) fn use_insertion_point(&mut self, op: PreselOp) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }
        let bounds = self.usable_bounds_for(space.id)?;

        let mut vs = self.registry.acquire(space.id, &cfg);
        if vs.tree.is_empty() || vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(node) = vs.tree.find_window(window, SpaceMode::Bsp) else {
            return Ok(());
        };

        if let Some(previous) = vs.tree.node(node).preselect.clone() {
            vs.tree.node_mut(node).preselect = None;
            if let Some(border) = previous.border {
                self.overlay.remove_border(border);
            }
            // Re-invoking the pending direction just clears it.
            if matches!(op, PreselOp::Direction(direction) if direction == previous.direction) {
                return Ok(());
            }
        }

        let PreselOp::Direction(direction) = op else {
            return Ok(());
        };

        let spawn_left = direction.spawn_left();
        let ratio = if spawn_left {
            cfg.bsp_split_ratio
        } else {
            1.0 - cfg.bsp_split_ratio
        };
        let kind = match direction {
            Direction::West => RegionKind::Left,
            Direction::East => RegionKind::Right,
            Direction::North => RegionKind::Upper,
            Direction::South => RegionKind::Lower,
        };
        let region = regions::region_of_kind(kind, bounds, vs.offset(), ratio);
        let border = self.overlay.show_border(
            direction,
            region,
            cfg.preselect_border_width,
            cfg.preselect_border_color,
        );
        debug!("preselect {direction:?} on window {window}");
        vs.tree.node_mut(node).preselect = Some(Preselect {
            direction,
            spawn_left,
            split: direction.split(),
            ratio,
            region,
            border: Some(border),
        });
        Ok(())
    }

    pub(super) fn send_window_to_desktop(&mut self, target: TargetSel) -> Result<(), WmError> {
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        self.send_window_to_desktop_inner(window, target)
    }

    fn send_window_to_desktop_inner(
        &mut self,
        window: WindowId,
        target: TargetSel,
    ) -> Result<(), WmError> {
        // Relative targets resolve against the desktop the window actually
        // sits on; absolute targets trust the active desktop to hold it.
        let space = match target {
            TargetSel::Prev | TargetSel::Next => {
                let space_id = self
                    .displays
                    .spaces_for_window(window)
                    .first()
                    .copied()
                    .ok_or(WmError::NoActiveSpace)?;
                self.displays.space_info(space_id).ok_or(WmError::NoActiveSpace)?
            }
            TargetSel::Index(_) => self.active_space()?,
        };
        if !space.is_user() {
            return Ok(());
        }

        let (source_monitor, source_desktop) = self
            .displays
            .desktop_for_space(space.id)
            .ok_or(WmError::UnknownDisplay(space.id))?;
        let destination_desktop = match target {
            TargetSel::Prev => source_desktop.saturating_sub(1),
            TargetSel::Next => source_desktop + 1,
            TargetSel::Index(index) => index,
        };
        if destination_desktop == source_desktop {
            return Err(WmError::SameDesktop(destination_desktop));
        }
        let (destination_monitor, destination_space) = self
            .displays
            .space_for_desktop(destination_desktop)
            .ok_or(WmError::UnknownDesktop(destination_desktop))?;

        let info = self.windows.window(window);
        let valid = info
            .as_ref()
            .map(|info| !info.floating && self.windows.is_window_valid(window))
            .unwrap_or(false);
        if valid {
            self.untile_from_space(space, window)?;
        }

        self.displays.move_window_to_space(destination_space, window);

        // The compositor does not move focus along; park it on some window
        // still visible on the source space to avoid a focus desync.
        for remaining in self.windows.visible_windows_filtered(space.id, false, true) {
            if remaining != window {
                self.windows.focus_window(remaining);
                break;
            }
        }

        if destination_monitor == source_monitor {
            return Ok(());
        }

        let source_bounds = self
            .displays
            .display_bounds(source_monitor)
            .ok_or(WmError::UnknownMonitor(source_monitor.0 + 1))?;
        let destination_bounds = self
            .displays
            .display_bounds(destination_monitor)
            .ok_or(WmError::UnknownMonitor(destination_monitor.0 + 1))?;
        if let Some(info) = self.windows.window(window) {
            let frame = normalize_to_display(info.frame, source_bounds, destination_bounds);
            regions::apply_window_frame(&mut *self.windows, window, frame);
        }

        if !valid {
            return Ok(());
        }

        // Tile on the destination only when that desktop is what its monitor
        // currently shows.
        let active = self.displays.active_space_for_display(destination_monitor);
        if let Some(active) = active.filter(|active| active.id == destination_space) {
            self.tile_on_space(active, window)?;
        }
        Ok(())
    }

    pub(super) fn send_window_to_monitor(&mut self, target: TargetSel) -> Result<(), WmError> {
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if !space.is_user() {
            return Ok(());
        }

        let (source_monitor, _) = self
            .displays
            .desktop_for_space(space.id)
            .ok_or(WmError::UnknownDisplay(space.id))?;
        let destination = match target {
            TargetSel::Prev => source_monitor.0 as i64 - 1,
            TargetSel::Next => source_monitor.0 as i64 + 1,
            // 1-indexed on the command channel.
            TargetSel::Index(index) => index as i64 - 1,
        };
        if destination < 0 || destination as usize >= self.displays.display_count() {
            return Err(WmError::UnknownMonitor((destination + 1) as u32));
        }
        let destination_monitor = crate::sys::screen::DisplayId(destination as u32);
        if destination_monitor == source_monitor {
            return Err(WmError::SameMonitor(destination_monitor.0 + 1));
        }

        let destination_space = self
            .displays
            .active_space_for_display(destination_monitor)
            .ok_or(WmError::UnknownMonitor(destination_monitor.0 + 1))?;
        if !destination_space.is_user() {
            return Ok(());
        }

        let info = self.windows.window(window);
        let valid = info
            .as_ref()
            .map(|info| !info.floating && self.windows.is_window_valid(window))
            .unwrap_or(false);
        if valid {
            self.untile_from_space(space, window)?;
        }

        self.displays.move_window_to_space(destination_space.id, window);

        for remaining in self.windows.visible_windows_filtered(space.id, false, true) {
            if remaining != window {
                self.windows.focus_window(remaining);
                break;
            }
        }

        let source_bounds = self
            .displays
            .display_bounds(source_monitor)
            .ok_or(WmError::UnknownMonitor(source_monitor.0 + 1))?;
        let destination_bounds = self
            .displays
            .display_bounds(destination_monitor)
            .ok_or(WmError::UnknownMonitor(destination_monitor.0 + 1))?;
        if let Some(info) = self.windows.window(window) {
            let frame = normalize_to_display(info.frame, source_bounds, destination_bounds);
            regions::apply_window_frame(&mut *self.windows, window, frame);
        }

        if valid {
            self.tile_on_space(destination_space, window)?;
        }
        Ok(())
    }

    pub(super) fn grid_layout(&mut self, spec: GridSpec) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let Some(window) = self.windows.focused_window() else {
            return Ok(());
        };
        let Some(info) = self.windows.window(window) else {
            return Ok(());
        };
        let display = self
            .displays
            .display_containing(info.frame)
            .ok_or(WmError::DisplayNotFound)?;
        let space = self
            .displays
            .active_space_for_display(display)
            .ok_or(WmError::NoActiveSpace)?;

        {
            let vs = self.registry.acquire(space.id, &cfg);
            // Only floating windows and float workspaces place by grid.
            if !(info.floating || vs.mode == SpaceMode::Float) {
                return Ok(());
            }
        }

        let region = self
            .displays
            .usable_bounds(display)
            .ok_or(WmError::UnknownDisplay(space.id))?;

        let GridSpec { rows, cols, x, y, width, height } = spec;
        let x = x.min(cols - 1);
        let y = y.min(rows - 1);
        let width = width.max(1).min(cols - x);
        let height = height.max(1).min(rows - y);

        let cell_width = region.width / cols as f32;
        let cell_height = region.height / rows as f32;
        let origin = Point::new(
            (region.x + region.width) - cell_width * (cols - x) as f32,
            (region.y + region.height) - cell_height * (rows - y) as f32,
        );
        let frame = Rect::from_parts(
            origin,
            Size::new(cell_width * width as f32, cell_height * height as f32),
        );
        regions::apply_window_frame(&mut *self.windows, window, frame);
        Ok(())
    }
}
