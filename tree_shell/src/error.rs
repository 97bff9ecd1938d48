//! Error types for the interactive shell.

use std::path::PathBuf;

use memory_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    /// The preview window could not be created.
    #[error("window error: {0}")]
    Window(String),

    /// Config file could not be read.
    #[error("cannot read config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::config::ShellConfig`].
    #[error("invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    /// A slot-store operation failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
