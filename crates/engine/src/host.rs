use std::path::Path;

use serde::Serialize;

use crate::{
    error::{EngineError, ErrorKind},
    record::RecordId,
    window::WindowId,
};

/// The window/view controller hosting browser windows.
///
/// The engine owns window state and records; the host owns everything on
/// screen. All methods except `create_window` are notifications and must
/// not fail. Population tasks call `set_title`, `request_redraw` and
/// `report` from background threads.
pub trait WindowHost: Send + Sync {
    /// Build the control for a new window showing `directory`.
    fn create_window(&self, window: WindowId, directory: &Path, shared: bool)
    -> Result<(), HostError>;

    fn set_title(&self, window: WindowId, title: &str);

    /// Repaint `record`, or the whole window when `None`. Hosts that do not
    /// display the record ignore the request.
    fn request_redraw(&self, window: WindowId, record: Option<RecordId>);

    fn destroy_window(&self, window: WindowId);

    /// The last browser window is gone.
    fn quit(&self) {}

    /// The user-visible notification channel.
    fn report(&self, window: Option<WindowId>, notice: &Notice);
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("window host failed: {0}")]
pub struct HostError(pub String);

/// One failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&EngineError> for Notice {
    fn from(err: &EngineError) -> Self {
        Notice {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
