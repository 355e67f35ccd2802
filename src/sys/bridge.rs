use serde::{Deserialize, Serialize};

use crate::layout_engine::search::Direction;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{DisplayId, Space, SpaceId};

/// Opaque window identity minted by the accessibility bridge. The core never
/// forges these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a pre-select border drawn by the overlay module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BorderHandle(pub u32);

/// Snapshot of a window as the accessibility bridge last saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub owner: String,
    pub title: String,
    pub role: String,
    pub subrole: String,
    pub level: i32,
    pub frame: Rect,
    pub floating: bool,
    pub sticky: bool,
    pub movable: bool,
    pub resizable: bool,
}

/// Accessibility bridge: the only way the core observes or moves real
/// windows. Frames handed to `set_window_origin`/`set_window_size` are
/// already rounded.
pub trait WindowServer {
    fn window(&self, id: WindowId) -> Option<WindowInfo>;
    fn focused_window(&self) -> Option<WindowId>;
    /// Valid, non-floating windows on a space; the tiling candidate set.
    fn visible_windows(&self, space: SpaceId) -> Vec<WindowId>;
    fn visible_windows_filtered(
        &self,
        space: SpaceId,
        include_invalid: bool,
        include_floating: bool,
    ) -> Vec<WindowId>;
    fn set_window_origin(&mut self, id: WindowId, origin: Point);
    fn set_window_size(&mut self, id: WindowId, size: Size);
    fn focus_window(&mut self, id: WindowId);
    fn close_window(&mut self, id: WindowId);
    fn is_window_valid(&self, id: WindowId) -> bool;
    fn set_floating(&mut self, id: WindowId, floating: bool);
    fn set_sticky(&mut self, id: WindowId, sticky: bool);
    fn is_native_fullscreen(&self, id: WindowId) -> bool;
    fn set_native_fullscreen(&mut self, id: WindowId, fullscreen: bool);
    fn cursor_position(&self) -> Point;
    fn warp_cursor(&mut self, position: Point);
}

/// Compositor-private display and space enumeration.
pub trait DisplayServer {
    /// Active space of the focused display.
    fn active_space(&self) -> Option<Space>;
    fn active_space_for_display(&self, display: DisplayId) -> Option<Space>;
    fn space_info(&self, space: SpaceId) -> Option<Space>;
    fn display_count(&self) -> usize;
    /// Raw display bounds, used for edge wrapping and cross-display
    /// normalization.
    fn display_bounds(&self, display: DisplayId) -> Option<Rect>;
    /// Bounds with system chrome subtracted; the root region source.
    fn usable_bounds(&self, display: DisplayId) -> Option<Rect>;
    fn display_for_space(&self, space: SpaceId) -> Option<DisplayId>;
    fn display_containing(&self, frame: Rect) -> Option<DisplayId>;
    /// Monitor arrangement and 1-based desktop id of a space.
    fn desktop_for_space(&self, space: SpaceId) -> Option<(DisplayId, u32)>;
    fn space_for_desktop(&self, desktop: u32) -> Option<(DisplayId, SpaceId)>;
    fn desktops_for_display(&self, display: DisplayId) -> Vec<u32>;
    fn spaces_for_window(&self, window: WindowId) -> Vec<SpaceId>;
    fn move_window_to_space(&mut self, space: SpaceId, window: WindowId);
}

/// Pre-select border overlay.
pub trait PreselOverlay {
    fn show_border(
        &mut self,
        direction: Direction,
        region: Rect,
        width: u32,
        color: u32,
    ) -> BorderHandle;
    fn remove_border(&mut self, border: BorderHandle);
}

/// Auxiliary dock helper reached over a local socket. Best effort: every
/// operation may silently do nothing if the helper is not running.
pub trait DockHelper {
    fn window_move(&mut self, window: WindowId, x: i32, y: i32);
    fn window_level(&mut self, window: WindowId, level_key: i32);
    fn window_sticky(&mut self, window: WindowId, sticky: bool);
}
