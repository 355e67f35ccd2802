use tracing::warn;

use crate::command::error::WmError;
use crate::command::manager::WindowManager;
use crate::command::parse::TargetSel;
use crate::common::config::FocusCycle;
use crate::sys::screen::DisplayId;

impl WindowManager {
    pub(super) fn focus_monitor(&mut self, target: TargetSel) -> Result<(), WmError> {
        let cfg = self.settings.clone();
        let space = self.active_space()?;
        let (source, _) = self
            .displays
            .desktop_for_space(space.id)
            .ok_or(WmError::UnknownDisplay(space.id))?;

        let cycle = cfg.window_focus_cycle == FocusCycle::All || cfg.monitor_focus_cycle;
        match target {
            TargetSel::Prev => {
                let destination = source.0 as i64 - 1;
                if !self.focus_monitor_at(destination) && cycle {
                    let last = self.displays.display_count() as i64 - 1;
                    self.focus_monitor_at(last);
                }
            }
            TargetSel::Next => {
                let destination = source.0 as i64 + 1;
                if !self.focus_monitor_at(destination) && cycle {
                    self.focus_monitor_at(0);
                }
            }
            // 1-indexed on the command channel.
            TargetSel::Index(index) => {
                self.focus_monitor_at(index as i64 - 1);
            }
        }
        Ok(())
    }

    /// Focuses the first visible window on a monitor's active space. False
    /// when the monitor does not exist or nothing is focusable there.
    fn focus_monitor_at(&mut self, arrangement: i64) -> bool {
        if arrangement < 0 || arrangement as usize >= self.displays.display_count() {
            warn!(
                "invalid destination monitor specified, monitor '{}' does not exist!",
                arrangement + 1
            );
            return false;
        }
        let display = DisplayId(arrangement as u32);
        let Some(space) = self.displays.active_space_for_display(display) else {
            return false;
        };
        if !space.is_user() {
            return false;
        }

        let windows = self.windows.visible_windows_filtered(space.id, false, true);
        match windows.first() {
            Some(&window) => {
                self.windows.focus_window(window);
                true
            }
            None => false,
        }
    }
}
