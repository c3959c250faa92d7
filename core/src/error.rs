use std::path::PathBuf;

use thiserror::Error;

/// User-facing rejection raised when a report cannot be collected for saving.
///
/// The message is shown to the inspector as-is, so it stays in Portuguese.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor, preencha a TAG do equipamento (Página 1) antes de salvar.")]
    MissingTag,
}

/// Error type for the report store and its key-value backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value under '{key}' is not valid: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no report at index {0}")]
    NoSuchReport(usize),
}

/// Error type for operations on an open report session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("report is open in view-only mode")]
    ReadOnly,

    #[error("report was already saved or discarded")]
    Closed,

    #[error("no measurement row with id {0}")]
    UnknownRow(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error type for environment-driven configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Flat error surfaced across the foreign-language boundary.
#[derive(Error, Debug)]
pub enum LaudoError {
    #[error("{0}")]
    Validation(String),

    #[error("report is open in view-only mode")]
    ReadOnly,

    #[error("report was already saved or discarded")]
    Closed,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown checkbox group: {0}")]
    UnknownGroup(String),

    #[error("unknown image target: {0}")]
    UnknownTarget(String),

    #[error("unknown measurement row: {0}")]
    UnknownRow(u32),

    #[error("storage error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<SessionError> for LaudoError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(v) => LaudoError::Validation(v.to_string()),
            SessionError::ReadOnly => LaudoError::ReadOnly,
            SessionError::Closed => LaudoError::Closed,
            SessionError::UnknownRow(id) => LaudoError::UnknownRow(id),
            SessionError::Store(s) => LaudoError::Store(s.to_string()),
        }
    }
}

impl From<StoreError> for LaudoError {
    fn from(err: StoreError) -> Self {
        LaudoError::Store(err.to_string())
    }
}

impl From<ConfigError> for LaudoError {
    fn from(err: ConfigError) -> Self {
        LaudoError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingTag;
        assert_eq!(
            err.to_string(),
            "Por favor, preencha a TAG do equipamento (Página 1) antes de salvar."
        );
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::from(ValidationError::MissingTag);
        assert_eq!(err.to_string(), ValidationError::MissingTag.to_string());

        let err = SessionError::UnknownRow(7);
        assert_eq!(err.to_string(), "no measurement row with id 7");

        let err = SessionError::from(StoreError::NoSuchReport(3));
        assert_eq!(err.to_string(), "no report at index 3");
    }

    #[test]
    fn test_laudo_error_from_session_error() {
        let err = LaudoError::from(SessionError::ReadOnly);
        assert!(matches!(err, LaudoError::ReadOnly));

        let err = LaudoError::from(SessionError::Validation(ValidationError::MissingTag));
        match err {
            LaudoError::Validation(message) => assert!(message.contains("TAG")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_closed_session_maps_across_boundary() {
        let err = LaudoError::from(SessionError::Closed);
        assert!(matches!(err, LaudoError::Closed));
        assert_eq!(err.to_string(), "report was already saved or discarded");

        let err = LaudoError::from(StoreError::NoSuchReport(4));
        assert_eq!(err.to_string(), "storage error: no report at index 4");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            name: "LAUDO_INSPECTION_INTERVAL_YEARS",
            value: "zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for LAUDO_INSPECTION_INTERVAL_YEARS: 'zero'"
        );

        let err = LaudoError::from(err);
        assert!(matches!(err, LaudoError::Config(_)));
        assert!(err.to_string().starts_with("configuration error: invalid value"));
    }
}
