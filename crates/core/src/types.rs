use thiserror::Error;

/// Exit code reserved for configuration problems, as opposed to failing scripts
pub const CONFIG_ERROR_EXIT_CODE: i32 = 78;
/// Exit code used when a step's shell could not be started
pub const SPAWN_ERROR_EXIT_CODE: i32 = 127;
/// Exit code used when a run is interrupted before a step starts
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The main error type for yake operations
#[derive(Debug, Error)]
pub enum YakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error in '{path}': {message}")]
    Config { path: String, message: String },

    #[error("Unknown target '{path}'{}", .referenced_by.as_ref().map(|r| format!(" (referenced by {})", r)).unwrap_or_default())]
    Resolution {
        path: String,
        referenced_by: Option<String>,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("Template error in '{target}' at '{placeholder}': {reason}")]
    Template {
        target: String,
        placeholder: String,
        reason: String,
    },

    #[error("'{target}' exec[{step}] failed with exit code {code}")]
    Execution {
        target: String,
        step: usize,
        code: i32,
    },

    #[error("Failed to start '{target}' exec[{step}]: {source}")]
    Spawn {
        target: String,
        step: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted before '{target}' exec[{step}]")]
    Interrupted { target: String, step: usize },
}

impl YakeError {
    pub(crate) fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The process exit code a caller should report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Execution { code, .. } => *code,
            Self::Spawn { .. } => SPAWN_ERROR_EXIT_CODE,
            Self::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            Self::Io(_)
            | Self::Yaml(_)
            | Self::Config { .. }
            | Self::Resolution { .. }
            | Self::Cycle { .. }
            | Self::Template { .. } => CONFIG_ERROR_EXIT_CODE,
        }
    }

    /// Whether this error describes an invalid document rather than a failed run
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Self::Execution { .. } | Self::Spawn { .. } | Self::Interrupted { .. }
        )
    }
}

/// Result type alias for yake operations
pub type YakeResult<T> = Result<T, YakeError>;
