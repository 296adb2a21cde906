use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{theme}: malformed color for `{attribute}` ({value}): {reason}")]
    MalformedColor {
        theme: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("{theme}: unreadable theme record: {reason}")]
    MalformedTheme { theme: String, reason: String },

    #[error(
        "{theme}: hover too close to background and brightened fixup still too close \
         (dist={raw_distance}, fixed_dist={fixed_distance})"
    )]
    ContrastInadequate {
        theme: String,
        raw_distance: u32,
        fixed_distance: u32,
    },

    #[error("{file} missing {label}")]
    MissingMarker { label: String, file: String },

    #[error("stylesheet on menu bar at {path}:{line_number}: {line}")]
    ForbiddenPattern {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("invalid marker pattern for {label}: {message}")]
    InvalidPattern { label: String, message: String },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("no theme files found in {path}")]
    NoThemesFound { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl CheckError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
