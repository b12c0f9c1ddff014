use std::{io, path::PathBuf};

use serde::Serialize;

use crate::{host::HostError, record::RecordId, store::NodeId, store::StoreId, window::WindowId};

/// How a failure should be treated by whoever reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Allocation or thread creation failed; the operation stopped early.
    ResourceExhausted,
    /// An enumeration or rename failed; only the affected path is impacted.
    FilesystemAccess,
    /// A window, record or store that should exist does not.
    InconsistentState,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("out of memory while {0}")]
    OutOfMemory(&'static str),

    #[error("cannot start population task: {0}")]
    Spawn(#[source] io::Error),

    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("cannot use directory {}: {source}", path.display())]
    Directory { path: PathBuf, source: io::Error },

    #[error("cannot rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("invalid file name {0:?}")]
    InvalidName(String),

    #[error("window {0} not found")]
    WindowNotFound(WindowId),

    #[error("node {0} not found in store")]
    NodeNotFound(NodeId),

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("store {0} does not own its records")]
    NotOwner(StoreId),

    #[error("store {target} does not share records with store {origin}")]
    ForeignStore { target: StoreId, origin: StoreId },

    #[error("window {0} is already populated")]
    AlreadyPopulated(WindowId),

    #[error("{0:?} is not a directory that can be opened")]
    NotNavigable(String),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("population task panicked")]
    TaskPanicked,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::OutOfMemory(_) | EngineError::Spawn(_) => ErrorKind::ResourceExhausted,
            EngineError::ReadDir { .. }
            | EngineError::Directory { .. }
            | EngineError::Rename { .. }
            | EngineError::InvalidName(_) => ErrorKind::FilesystemAccess,
            EngineError::WindowNotFound(_)
            | EngineError::NodeNotFound(_)
            | EngineError::RecordNotFound(_)
            | EngineError::NotOwner(_)
            | EngineError::ForeignStore { .. }
            | EngineError::AlreadyPopulated(_)
            | EngineError::NotNavigable(_)
            | EngineError::Host(_)
            | EngineError::TaskPanicked => ErrorKind::InconsistentState,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
