//! Error types for the backdrop core.

use thiserror::Error;

/// Errors produced by backdrop operations.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// Width or height overflowed when sizing a surface.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was out of its allowed range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A persisted or requested theme name was not recognized.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// A snapshot format name was not recognized.
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// A configuration key existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// Writing a snapshot or other output failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_includes_both_sides() {
        let msg = BackdropError::InvalidDimensions {
            width: 70000,
            height: 3,
        }
        .to_string();
        assert!(msg.contains("70000"), "missing width in: {msg}");
        assert!(msg.contains('3'), "missing height in: {msg}");
    }

    #[test]
    fn invalid_color_includes_message() {
        let msg = BackdropError::InvalidColor("not-a-color".into()).to_string();
        assert!(msg.contains("not-a-color"), "missing input in: {msg}");
    }

    #[test]
    fn invalid_config_includes_message() {
        let msg = BackdropError::InvalidConfig("size_min >= size_max".into()).to_string();
        assert!(msg.contains("size_min"), "missing detail in: {msg}");
    }

    #[test]
    fn unknown_theme_includes_name() {
        let msg = BackdropError::UnknownTheme("sepia".into()).to_string();
        assert!(msg.contains("sepia"), "missing theme in: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = BackdropError::ParamTypeMismatch {
            name: "repulsion_radius".into(),
            expected: "number".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("repulsion_radius"), "missing name in: {msg}");
        assert!(msg.contains("number"), "missing expected in: {msg}");
        assert!(msg.contains("string"), "missing got in: {msg}");
    }

    #[test]
    fn backdrop_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackdropError>();
    }

    #[test]
    fn backdrop_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<BackdropError>();
    }
}
