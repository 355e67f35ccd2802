use std::io::Write;

use crate::command::error::WmError;
use crate::command::manager::WindowManager;
use crate::command::parse::{DesktopQuery, MonitorQuery, Query, WindowQuery};
use crate::sys::bridge::WindowId;
use crate::sys::screen::DisplayId;

impl WindowManager {
    pub(super) fn query(&mut self, query: Query, out: &mut dyn Write) -> Result<(), WmError> {
        match query {
            Query::Window(op) => self.query_window(op, out),
            Query::Desktop(op) => self.query_desktop(op, out),
            Query::Monitor(op) => self.query_monitor(op, out),
            Query::DesktopsForMonitor(monitor) => self.query_desktops_for_monitor(monitor, out),
            Query::MonitorForDesktop(desktop) => self.query_monitor_for_desktop(desktop, out),
        }
    }

    fn query_window(&mut self, op: WindowQuery, out: &mut dyn Write) -> Result<(), WmError> {
        if let WindowQuery::Details(window) = op {
            return self.query_window_details(window, out);
        }

        let focused = self.windows.focused_window().and_then(|id| self.windows.window(id));
        match focused {
            Some(info) => match op {
                WindowQuery::Id => write!(out, "{}", info.id)?,
                WindowQuery::Owner => write!(out, "{}", info.owner)?,
                WindowQuery::Name => write!(out, "{}", info.title)?,
                WindowQuery::Tag => write!(out, "{} - {}", info.owner, info.title)?,
                WindowQuery::Float => write!(out, "{}", info.floating as u8)?,
                WindowQuery::Details(_) => unreachable!("handled above"),
            },
            None => write!(out, "?")?,
        }
        Ok(())
    }

    fn query_window_details(&mut self, window: WindowId, out: &mut dyn Write) -> Result<(), WmError> {
        match self.windows.window(window) {
            Some(info) => {
                write!(
                    out,
                    "id: {}\nlevel: {}\nname: {}\nowner: {}\nrole: {}\nsubrole: {}\nmovable: {}\nresizable: {}\n",
                    info.id,
                    info.level,
                    info.title,
                    info.owner,
                    info.role,
                    info.subrole,
                    info.movable as u8,
                    info.resizable as u8,
                )?;
            }
            None => write!(out, "window not found..\n")?,
        }
        Ok(())
    }

    fn query_desktop(&mut self, op: DesktopQuery, out: &mut dyn Write) -> Result<(), WmError> {
        let Some(space) = self.displays.active_space() else {
            write!(out, "?")?;
            return Ok(());
        };

        match op {
            DesktopQuery::Id => match self.displays.desktop_for_space(space.id) {
                Some((_, desktop)) => write!(out, "{desktop}")?,
                None => write!(out, "?")?,
            },
            DesktopQuery::Mode => {
                let cfg = self.settings.clone();
                let vs = self.registry.acquire(space.id, &cfg);
                let mode = vs.mode;
                drop(vs);
                write!(out, "{}", mode.as_str())?;
            }
            DesktopQuery::Windows => {
                let windows = self.windows.visible_windows_filtered(space.id, true, true);
                if windows.is_empty() {
                    write!(out, "desktop is empty..\n")?;
                    return Ok(());
                }
                for id in windows {
                    let Some(info) = self.windows.window(id) else {
                        continue;
                    };
                    if self.windows.is_window_valid(id) {
                        write!(out, "{}, {}, {}\n", info.id, info.owner, info.title)?;
                    } else {
                        write!(out, "{}, {}, {} (invalid)\n", info.id, info.owner, info.title)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn query_monitor(&mut self, op: MonitorQuery, out: &mut dyn Write) -> Result<(), WmError> {
        match op {
            MonitorQuery::Id => {
                let monitor = self
                    .displays
                    .active_space()
                    .and_then(|space| self.displays.desktop_for_space(space.id));
                match monitor {
                    Some((display, _)) => write!(out, "{}", display.0 + 1)?,
                    None => write!(out, "?")?,
                }
            }
            MonitorQuery::Count => write!(out, "{}", self.displays.display_count())?,
        }
        Ok(())
    }

    fn query_desktops_for_monitor(
        &mut self,
        monitor: u32,
        out: &mut dyn Write,
    ) -> Result<(), WmError> {
        if monitor == 0 || monitor as usize > self.displays.display_count() {
            return Ok(());
        }
        let desktops = self.displays.desktops_for_display(DisplayId(monitor - 1));
        let rendered: Vec<String> = desktops.iter().map(|desktop| desktop.to_string()).collect();
        write!(out, "{}", rendered.join(" "))?;
        Ok(())
    }

    fn query_monitor_for_desktop(
        &mut self,
        desktop: u32,
        out: &mut dyn Write,
    ) -> Result<(), WmError> {
        if let Some((display, _)) = self.displays.space_for_desktop(desktop) {
            write!(out, "{}", display.0 + 1)?;
        }
        Ok(())
    }
}
