use thiserror::Error;

/// Failures raised by the compiler and the materializer.
///
/// They travel inside [`crate::Error`] (an `anyhow::Error`), use `downcast_ref::<QuillError>()` to
/// inspect the category.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("`{declaring}::{name}` is not supported: {construct}")]
    Unsupported {
        construct: String,
        declaring: String,
        name: String,
    },

    #[error("Type mapping failed for `{declaring}::{member}`: {message}")]
    TypeMapping {
        declaring: String,
        member: String,
        message: String,
    },

    #[error("Cannot convert {value} from {from} to {to}")]
    Conversion {
        from: String,
        to: String,
        value: String,
    },

    #[error("Schema mismatch, expected {expected} but found {found}: {message}")]
    SchemaMismatch {
        expected: String,
        found: String,
        message: String,
    },

    #[error("Paging is not possible in {dialect}: {message}")]
    Paging {
        dialect: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl QuillError {
    pub fn unsupported(
        construct: impl Into<String>,
        declaring: impl ToString,
        name: impl Into<String>,
    ) -> Self {
        QuillError::Unsupported {
            construct: construct.into(),
            declaring: declaring.to_string(),
            name: name.into(),
        }
    }
}
