use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".trellis") }
pub fn config_file() -> PathBuf { dirs::home_dir().unwrap().join(".trellis.toml") }

/// Policy for wrapping focus at the edge of a layout.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusCycle {
    All,
    Monitor,
    #[default]
    None,
}

/// Initial padding and gap applied to every new virtual space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PaddingSettings {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub gap: f32,
}

impl Default for PaddingSettings {
    fn default() -> Self {
        Self {
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            right: 0.0,
            gap: 0.0,
        }
    }
}

/// A desktop whose layout should be restored from a serialized tree file on
/// first use.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DesktopLayoutFile {
    pub desktop: u32,
    pub file: PathBuf,
}

/// Snapshot of every variable the core reads. Commands copy the snapshot at
/// entry so a reload mid-command cannot change behavior halfway through.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_split_ratio")]
    pub bsp_split_ratio: f32,
    #[serde(default)]
    pub window_focus_cycle: FocusCycle,
    #[serde(default)]
    pub monitor_focus_cycle: bool,
    #[serde(default)]
    pub mouse_follows_focus: bool,
    #[serde(default = "yes")]
    pub window_float_topmost: bool,
    #[serde(default = "default_padding_step")]
    pub padding_step_size: f32,
    #[serde(default = "default_gap_step")]
    pub gap_step_size: f32,
    #[serde(default = "default_border_color")]
    pub preselect_border_color: u32,
    #[serde(default = "default_border_width")]
    pub preselect_border_width: u32,
    #[serde(default)]
    pub padding: PaddingSettings,
    #[serde(default)]
    pub desktop_layouts: Vec<DesktopLayoutFile>,
}

fn yes() -> bool { true }
fn default_split_ratio() -> f32 { 0.5 }
fn default_padding_step() -> f32 { 10.0 }
fn default_gap_step() -> f32 { 5.0 }
fn default_border_color() -> u32 { 0xffd75f5f }
fn default_border_width() -> u32 { 4 }

impl Default for Settings {
    fn default() -> Self {
        Self {
            bsp_split_ratio: default_split_ratio(),
            window_focus_cycle: FocusCycle::default(),
            monitor_focus_cycle: false,
            mouse_follows_focus: false,
            window_float_topmost: true,
            padding_step_size: default_padding_step(),
            gap_step_size: default_gap_step(),
            preselect_border_color: default_border_color(),
            preselect_border_width: default_border_width(),
            padding: PaddingSettings::default(),
            desktop_layouts: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Settings> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut settings: Settings =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serialized layout file associated with a desktop, if any.
    pub fn layout_file_for(&self, desktop: u32) -> Option<PathBuf> {
        self.desktop_layouts
            .iter()
            .find(|entry| entry.desktop == desktop)
            .map(|entry| entry.file.clone())
    }

    /// Out-of-range values fall back to their defaults rather than failing
    /// the whole load.
    fn sanitize(&mut self) {
        if !(0.1..=0.9).contains(&self.bsp_split_ratio) {
            self.bsp_split_ratio = default_split_ratio();
        }
        if self.padding_step_size < 0.0 {
            self.padding_step_size = default_padding_step();
        }
        if self.gap_step_size < 0.0 {
            self.gap_step_size = default_gap_step();
        }
    }
}
