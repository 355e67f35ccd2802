//! In-memory stand-ins for the accessibility bridge, the display server,
//! the pre-select overlay and the dock helper, so command tests run against
//! a fully scripted desktop.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_wm::command::WindowManager;
use trellis_wm::common::config::Settings;
use trellis_wm::layout_engine::Direction;
use trellis_wm::sys::bridge::{
    BorderHandle, DisplayServer, DockHelper, PreselOverlay, WindowId, WindowInfo, WindowServer,
};
use trellis_wm::sys::geometry::{Point, Rect, Size};
use trellis_wm::sys::screen::{DisplayId, Space, SpaceId, SpaceKind};

#[derive(Clone)]
pub struct DisplayConfig {
    pub bounds: Rect,
    pub usable: Rect,
    pub spaces: Vec<(SpaceId, SpaceKind)>,
    pub active: usize,
}

#[derive(Default)]
pub struct FakeState {
    pub windows: Vec<WindowInfo>,
    pub window_spaces: Vec<(WindowId, SpaceId)>,
    pub invalid: Vec<WindowId>,
    pub native_fullscreen: Vec<WindowId>,
    pub focused: Option<WindowId>,
    pub focus_history: Vec<WindowId>,
    pub closed: Vec<WindowId>,
    pub cursor: Point,
    pub displays: Vec<DisplayConfig>,
    pub active_display: usize,
    pub borders: Vec<(BorderHandle, Direction, Rect)>,
    pub removed_borders: Vec<BorderHandle>,
    pub next_border: u32,
    pub dock_messages: Vec<String>,
}

impl FakeState {
    fn info(&self, id: WindowId) -> Option<&WindowInfo> {
        self.windows.iter().find(|info| info.id == id)
    }

    pub fn set_floating(&mut self, id: WindowId) {
        if let Some(info) = self.info_mut(id) {
            info.floating = true;
        }
    }

    pub fn info_is_floating(&self, id: WindowId) -> bool {
        self.info(id).map(|info| info.floating).unwrap_or(false)
    }

    fn info_mut(&mut self, id: WindowId) -> Option<&mut WindowInfo> {
        self.windows.iter_mut().find(|info| info.id == id)
    }

    fn windows_on(&self, space: SpaceId) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self
            .window_spaces
            .iter()
            .filter(|(_, s)| *s == space)
            .map(|(w, _)| *w)
            .collect();
        ids.sort();
        ids
    }
}

#[derive(Clone)]
pub struct World(pub Rc<RefCell<FakeState>>);

impl World {
    /// One display, one user space (desktop 1).
    pub fn single_display(width: f32, height: f32) -> World {
        let bounds = Rect::new(0.0, 0.0, width, height);
        World(Rc::new(RefCell::new(FakeState {
            displays: vec![DisplayConfig {
                bounds,
                usable: bounds,
                spaces: vec![(SpaceId::new(1), SpaceKind::User)],
                active: 0,
            }],
            next_border: 1,
            ..FakeState::default()
        })))
    }

    pub fn push_display(&self, bounds: Rect, space: u64) {
        self.0.borrow_mut().displays.push(DisplayConfig {
            bounds,
            usable: bounds,
            spaces: vec![(SpaceId::new(space), SpaceKind::User)],
            active: 0,
        });
    }

    pub fn add_window(&self, id: u32, frame: Rect) -> WindowId {
        self.add_window_on(id, frame, 1)
    }

    pub fn add_window_on(&self, id: u32, frame: Rect, space: u64) -> WindowId {
        let window = WindowId(id);
        let mut state = self.0.borrow_mut();
        state.windows.push(WindowInfo {
            id: window,
            owner: format!("App{id}"),
            title: format!("Window{id}"),
            role: "AXWindow".to_string(),
            subrole: "AXStandardWindow".to_string(),
            level: 0,
            frame,
            floating: false,
            sticky: false,
            movable: true,
            resizable: true,
        });
        state.window_spaces.push((window, SpaceId::new(space)));
        window
    }

    pub fn focus(&self, id: WindowId) {
        self.0.borrow_mut().focused = Some(id);
    }

    pub fn frame_of(&self, id: WindowId) -> Rect {
        self.0.borrow().info(id).expect("unknown window").frame
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.0.borrow().focused
    }

    pub fn manager(&self) -> WindowManager {
        self.manager_with(Settings::default())
    }

    pub fn manager_with(&self, settings: Settings) -> WindowManager {
        WindowManager::new(
            Box::new(FakeWindows(self.0.clone())),
            Box::new(FakeDisplays(self.0.clone())),
            Box::new(FakeOverlay(self.0.clone())),
            Box::new(FakeDock(self.0.clone())),
            settings,
        )
    }
}

pub struct FakeWindows(Rc<RefCell<FakeState>>);

impl WindowServer for FakeWindows {
    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.0.borrow().info(id).cloned()
    }

    fn focused_window(&self) -> Option<WindowId> {
        self.0.borrow().focused
    }

    fn visible_windows(&self, space: SpaceId) -> Vec<WindowId> {
        self.visible_windows_filtered(space, false, false)
    }

    fn visible_windows_filtered(
        &self,
        space: SpaceId,
        include_invalid: bool,
        include_floating: bool,
    ) -> Vec<WindowId> {
        let state = self.0.borrow();
        state
            .windows_on(space)
            .into_iter()
            .filter(|id| include_invalid || !state.invalid.contains(id))
            .filter(|id| {
                include_floating || !state.info(*id).map(|info| info.floating).unwrap_or(false)
            })
            .collect()
    }

    fn set_window_origin(&mut self, id: WindowId, origin: Point) {
        if let Some(info) = self.0.borrow_mut().info_mut(id) {
            info.frame.x = origin.x;
            info.frame.y = origin.y;
        }
    }

    fn set_window_size(&mut self, id: WindowId, size: Size) {
        if let Some(info) = self.0.borrow_mut().info_mut(id) {
            info.frame.width = size.width;
            info.frame.height = size.height;
        }
    }

    fn focus_window(&mut self, id: WindowId) {
        let mut state = self.0.borrow_mut();
        state.focused = Some(id);
        state.focus_history.push(id);
    }

    fn close_window(&mut self, id: WindowId) {
        self.0.borrow_mut().closed.push(id);
    }

    fn is_window_valid(&self, id: WindowId) -> bool {
        !self.0.borrow().invalid.contains(&id)
    }

    fn set_floating(&mut self, id: WindowId, floating: bool) {
        if let Some(info) = self.0.borrow_mut().info_mut(id) {
            info.floating = floating;
        }
    }

    fn set_sticky(&mut self, id: WindowId, sticky: bool) {
        if let Some(info) = self.0.borrow_mut().info_mut(id) {
            info.sticky = sticky;
        }
    }

    fn is_native_fullscreen(&self, id: WindowId) -> bool {
        self.0.borrow().native_fullscreen.contains(&id)
    }

    fn set_native_fullscreen(&mut self, id: WindowId, fullscreen: bool) {
        let mut state = self.0.borrow_mut();
        if fullscreen {
            if !state.native_fullscreen.contains(&id) {
                state.native_fullscreen.push(id);
            }
        } else {
            state.native_fullscreen.retain(|&other| other != id);
        }
    }

    fn cursor_position(&self) -> Point {
        self.0.borrow().cursor
    }

    fn warp_cursor(&mut self, position: Point) {
        self.0.borrow_mut().cursor = position;
    }
}

pub struct FakeDisplays(Rc<RefCell<FakeState>>);

impl FakeDisplays {
    fn space_of(config: &DisplayConfig) -> Space {
        let (id, kind) = config.spaces[config.active];
        Space { id, kind }
    }
}

impl DisplayServer for FakeDisplays {
    fn active_space(&self) -> Option<Space> {
        let state = self.0.borrow();
        state.displays.get(state.active_display).map(Self::space_of)
    }

    fn active_space_for_display(&self, display: DisplayId) -> Option<Space> {
        self.0.borrow().displays.get(display.0 as usize).map(Self::space_of)
    }

    fn space_info(&self, space: SpaceId) -> Option<Space> {
        let state = self.0.borrow();
        for config in &state.displays {
            for &(id, kind) in &config.spaces {
                if id == space {
                    return Some(Space { id, kind });
                }
            }
        }
        None
    }

    fn display_count(&self) -> usize {
        self.0.borrow().displays.len()
    }

    fn display_bounds(&self, display: DisplayId) -> Option<Rect> {
        self.0.borrow().displays.get(display.0 as usize).map(|config| config.bounds)
    }

    fn usable_bounds(&self, display: DisplayId) -> Option<Rect> {
        self.0.borrow().displays.get(display.0 as usize).map(|config| config.usable)
    }

    fn display_for_space(&self, space: SpaceId) -> Option<DisplayId> {
        let state = self.0.borrow();
        for (index, config) in state.displays.iter().enumerate() {
            if config.spaces.iter().any(|&(id, _)| id == space) {
                return Some(DisplayId(index as u32));
            }
        }
        None
    }

    fn display_containing(&self, frame: Rect) -> Option<DisplayId> {
        let state = self.0.borrow();
        let center = frame.center();
        for (index, config) in state.displays.iter().enumerate() {
            if config.bounds.contains(center) {
                return Some(DisplayId(index as u32));
            }
        }
        None
    }

    fn desktop_for_space(&self, space: SpaceId) -> Option<(DisplayId, u32)> {
        let state = self.0.borrow();
        let mut desktop = 0;
        for (index, config) in state.displays.iter().enumerate() {
            for &(id, kind) in &config.spaces {
                if kind != SpaceKind::User {
                    continue;
                }
                desktop += 1;
                if id == space {
                    return Some((DisplayId(index as u32), desktop));
                }
            }
        }
        None
    }

    fn space_for_desktop(&self, desktop: u32) -> Option<(DisplayId, SpaceId)> {
        let state = self.0.borrow();
        let mut current = 0;
        for (index, config) in state.displays.iter().enumerate() {
            for &(id, kind) in &config.spaces {
                if kind != SpaceKind::User {
                    continue;
                }
                current += 1;
                if current == desktop {
                    return Some((DisplayId(index as u32), id));
                }
            }
        }
        None
    }

    fn desktops_for_display(&self, display: DisplayId) -> Vec<u32> {
        let state = self.0.borrow();
        let mut desktop = 0;
        let mut out = Vec::new();
        for (index, config) in state.displays.iter().enumerate() {
            for &(_, kind) in &config.spaces {
                if kind != SpaceKind::User {
                    continue;
                }
                desktop += 1;
                if index == display.0 as usize {
                    out.push(desktop);
                }
            }
        }
        out
    }

    fn spaces_for_window(&self, window: WindowId) -> Vec<SpaceId> {
        self.0
            .borrow()
            .window_spaces
            .iter()
            .filter(|(w, _)| *w == window)
            .map(|(_, space)| *space)
            .collect()
    }

    fn move_window_to_space(&mut self, space: SpaceId, window: WindowId) {
        let mut state = self.0.borrow_mut();
        state.window_spaces.retain(|(w, _)| *w != window);
        state.window_spaces.push((window, space));
    }
}

pub struct FakeOverlay(Rc<RefCell<FakeState>>);

impl PreselOverlay for FakeOverlay {
    fn show_border(
        &mut self,
        direction: Direction,
        region: Rect,
        _width: u32,
        _color: u32,
    ) -> BorderHandle {
        let mut state = self.0.borrow_mut();
        let handle = BorderHandle(state.next_border);
        state.next_border += 1;
        state.borders.push((handle, direction, region));
        handle
    }

    fn remove_border(&mut self, border: BorderHandle) {
        let mut state = self.0.borrow_mut();
        state.borders.retain(|(handle, _, _)| *handle != border);
        state.removed_borders.push(border);
    }
}

pub struct FakeDock(Rc<RefCell<FakeState>>);

impl DockHelper for FakeDock {
    fn window_move(&mut self, window: WindowId, x: i32, y: i32) {
        self.0.borrow_mut().dock_messages.push(format!("window_move {window} {x} {y}"));
    }

    fn window_level(&mut self, window: WindowId, level_key: i32) {
        self.0.borrow_mut().dock_messages.push(format!("window_level {window} {level_key}"));
    }

    fn window_sticky(&mut self, window: WindowId, sticky: bool) {
        self.0
            .borrow_mut()
            .dock_messages
            .push(format!("window_sticky {window} {}", sticky as u8));
    }
}

/// Runs one command line, discarding query output.
pub fn run(wm: &mut WindowManager, line: &str) {
    let mut sink = Vec::new();
    wm.handle_message(line, &mut sink);
}

/// Runs one command line and returns what it wrote to the sink.
pub fn run_query(wm: &mut WindowManager, line: &str) -> String {
    let mut sink = Vec::new();
    wm.handle_message(line, &mut sink);
    String::from_utf8(sink).expect("query output is utf-8")
}
