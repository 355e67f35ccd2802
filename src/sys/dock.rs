use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::warn;

use crate::sys::bridge::{DockHelper, WindowId};

/// Window level key for the normal level.
pub const NORMAL_WINDOW_LEVEL_KEY: i32 = 4;
/// Window level key for the floating (topmost) level.
pub const FLOATING_WINDOW_LEVEL_KEY: i32 = 5;

pub const DEFAULT_DOCK_PORT: u16 = 5050;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Client for the dock helper's line protocol. Each operation opens a fresh
/// connection, writes a single ASCII line and hangs up; a helper that is not
/// listening only costs a warning.
#[derive(Debug, Clone)]
pub struct ExtendedDock {
    port: u16,
}

impl ExtendedDock {
    pub fn new(port: u16) -> ExtendedDock { ExtendedDock { port } }

    fn send(&self, message: &str) {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(mut stream) => {
                if let Err(err) = stream.write_all(message.as_bytes()) {
                    warn!("failed to write to dock helper: {err}");
                }
            }
            Err(err) => warn!("failed to connect to dock helper on port {}: {err}", self.port),
        }
    }
}

impl Default for ExtendedDock {
    fn default() -> ExtendedDock { ExtendedDock::new(DEFAULT_DOCK_PORT) }
}

impl DockHelper for ExtendedDock {
    fn window_move(&mut self, window: WindowId, x: i32, y: i32) {
        self.send(&format!("window_move {window} {x} {y}\n"));
    }

    fn window_level(&mut self, window: WindowId, level_key: i32) {
        self.send(&format!("window_level {window} {level_key}\n"));
    }

    fn window_sticky(&mut self, window: WindowId, sticky: bool) {
        self.send(&format!("window_sticky {window} {}\n", sticky as u8));
    }
}
