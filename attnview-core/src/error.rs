//! Error types for the attnview core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering parameter validation, selection, instance registry, and
//! configuration domains.

use std::path::PathBuf;

/// Top-level error type for the attnview core library.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Parameter error: {0}")]
    Params(#[from] ParamsError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from validating the viewer parameters supplied by the data producer.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Unknown filter: {key}")]
    UnknownFilter { key: String },

    #[error("No attention data supplied")]
    NoFilters,

    #[error("total_heads must be at least 1")]
    ZeroTotalHeads,

    #[error("Filter '{filter}' has {found} heads in layer {layer}, expected {expected}")]
    RaggedHeads {
        filter: String,
        layer: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Filter '{filter}' layer {layer} head {head} has {found} source rows, expected {expected}"
    )]
    SourceMismatch {
        filter: String,
        layer: usize,
        head: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Filter '{filter}' layer {layer} head {head} source {source_index} has {found} targets, expected {expected}"
    )]
    TargetMismatch {
        filter: String,
        layer: usize,
        head: usize,
        source_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Filter '{filter}' has {found} heads but total_heads is {total_heads}")]
    TooManyHeads {
        filter: String,
        found: usize,
        total_heads: usize,
    },
}

/// Errors from interaction events that address something not on the canvas.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("No thumbnail at layer {layer}, head {head} (grid is {num_layers}x{num_heads})")]
    OutOfRange {
        layer: usize,
        head: usize,
        num_layers: usize,
        num_heads: usize,
    },

    #[error("No thumbnail at canvas position ({x}, {y})")]
    NoThumbnailAt { x: f64, y: f64 },

    #[error("Token row {index} out of range ({len} source tokens)")]
    TokenOutOfRange { index: usize, len: usize },

    #[error("Viewer '{root_div_id}' has not been rendered yet")]
    NotRendered { root_div_id: String },
}

/// Errors from the multi-instance registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("A viewer is already attached to container '{root_div_id}'")]
    DuplicateInstance { root_div_id: String },

    #[error("No viewer attached to container '{root_div_id}'")]
    UnknownInstance { root_div_id: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {message}")]
    Serialize { message: String },
}

/// A type alias for results using the top-level `ViewerError`.
pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_params() {
        let err = ViewerError::Params(ParamsError::UnknownFilter {
            key: "sentence_b".into(),
        });
        assert_eq!(
            err.to_string(),
            "Parameter error: Unknown filter: sentence_b"
        );
    }

    #[test]
    fn test_error_display_selection() {
        let err = ViewerError::Selection(SelectionError::OutOfRange {
            layer: 4,
            head: 1,
            num_layers: 2,
            num_heads: 12,
        });
        assert_eq!(
            err.to_string(),
            "Selection error: No thumbnail at layer 4, head 1 (grid is 2x12)"
        );
    }

    #[test]
    fn test_error_display_registry() {
        let err = ViewerError::Registry(RegistryError::DuplicateInstance {
            root_div_id: "bertviz-1".into(),
        });
        assert!(err.to_string().contains("bertviz-1"));
    }

    #[test]
    fn test_error_display_target_mismatch() {
        let err = ParamsError::TargetMismatch {
            filter: "all".into(),
            layer: 0,
            head: 2,
            source_index: 3,
            expected: 5,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "Filter 'all' layer 0 head 2 source 3 has 4 targets, expected 5"
        );
    }

    #[test]
    fn test_error_display_not_rendered() {
        let err = ViewerError::Selection(SelectionError::NotRendered {
            root_div_id: "cell-3".into(),
        });
        assert_eq!(
            err.to_string(),
            "Selection error: Viewer 'cell-3' has not been rendered yet"
        );
    }

    #[test]
    fn test_config_io_error_keeps_source() {
        use std::error::Error;
        let err = ConfigError::Io {
            path: PathBuf::from("/ws/.attnview"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to access /ws/.attnview: denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "params.json");
        let err: ViewerError = io.into();
        assert!(matches!(err, ViewerError::Io(_)));
    }
}
