use std::fmt;

/// Result type for pivotsync-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// A backend command failed (transport or backend-side error)
    Backend {
        command: String,
        source: anyhow::Error,
    },

    /// A backend response did not have the expected shape
    Decode {
        command: String,
        source: serde_json::Error,
    },

    /// The operation has no backend command for this table kind
    UnsupportedCommand(String),

    /// Configuration error
    Config(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend { command, source } => {
                write!(f, "Backend error in '{}': {}", command, source)
            }
            Error::Decode { command, source } => {
                write!(f, "Malformed response from '{}': {}", command, source)
            }
            Error::UnsupportedCommand(msg) => write!(f, "Unsupported command: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend { source, .. } => Some(source.as_ref()),
            Error::Decode { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            Error::UnsupportedCommand(_) | Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
