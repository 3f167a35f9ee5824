use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bookmark JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Bookmark JSON nests deeper than the parser's limit of 128 levels \
         (about 63 folders) at line {line}, column {column}"
    )]
    TooDeep { line: usize, column: usize },

    #[error("Bookmark document root must be a list, found {0}")]
    RootNotList(&'static str),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No insertion point for '{0}' found (no declaration, <script> or </body>)")]
    SlotNotFound(String),

    #[error("Declaration of '{slot}' at byte {offset} is not a terminated object literal")]
    Unterminated { slot: String, offset: usize },

    #[error("Failed to serialize navigation data: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PinnavError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PinnavError>;
