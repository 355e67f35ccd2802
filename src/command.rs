mod error;
mod manager;
mod monitor;
pub mod parse;
mod query;
mod space;
mod window;

pub use error::WmError;
pub use manager::WindowManager;
pub use parse::{
    Command, DesktopQuery, GridSpec, MonitorQuery, ParseError, PreselOp, Query, RatioOp, Step,
    TargetSel, ToggleOp, WindowQuery,
};
