use std::fmt;

use cells::CellSetError;
use projection::UnknownProjection;

/// TypeError / RangeError split of input validation failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputErrorKind {
    Type,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Json(String),
    ViewboxHeight(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "invalid configuration: {msg}"),
            ConfigError::ViewboxHeight(h) => {
                write!(f, "viewbox height must be a positive number, got {h}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Rejected input. Raised at assignment; the previous value stays in effect.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    Cells(CellSetError),
    Projection(UnknownProjection),
    Config(ConfigError),
}

impl InputError {
    pub fn kind(&self) -> InputErrorKind {
        match self {
            InputError::Cells(_) => InputErrorKind::Type,
            InputError::Projection(_) => InputErrorKind::Range,
            InputError::Config(ConfigError::Json(_)) => InputErrorKind::Type,
            InputError::Config(ConfigError::ViewboxHeight(_)) => InputErrorKind::Range,
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Cells(e) => write!(f, "{e}"),
            InputError::Projection(e) => write!(f, "{e}"),
            InputError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Cells(e) => Some(e),
            InputError::Projection(e) => Some(e),
            InputError::Config(e) => Some(e),
        }
    }
}

impl From<CellSetError> for InputError {
    fn from(e: CellSetError) -> Self {
        InputError::Cells(e)
    }
}

impl From<UnknownProjection> for InputError {
    fn from(e: UnknownProjection) -> Self {
        InputError::Projection(e)
    }
}

impl From<ConfigError> for InputError {
    fn from(e: ConfigError) -> Self {
        InputError::Config(e)
    }
}
