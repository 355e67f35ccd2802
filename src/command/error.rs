use thiserror::Error;

use crate::model::persist::PersistError;
use crate::sys::screen::SpaceId;

/// Command failures that abort before any tree mutation. Everything else is
/// a silent no-op by design: the user recovers by typing another command.
#[derive(Debug, Error)]
pub enum WmError {
    #[error("no active space")]
    NoActiveSpace,
    #[error("unknown display for space {0}")]
    UnknownDisplay(SpaceId),
    #[error("no display contains the window frame")]
    DisplayNotFound,
    #[error("invalid destination desktop specified, desktop '{0}' does not exist")]
    UnknownDesktop(u32),
    #[error("invalid destination monitor specified, monitor '{0}' does not exist")]
    UnknownMonitor(u32),
    #[error("invalid destination desktop specified, source desktop and destination '{0}' are the same")]
    SameDesktop(u32),
    #[error("invalid destination monitor specified, source monitor and destination '{0}' are the same")]
    SameMonitor(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
