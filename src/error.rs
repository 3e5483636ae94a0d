//! Invocation errors
//!
//! Descriptor loading and validation errors live in
//! [`crate::template::descriptor`]; these cover the invocation path, after
//! a tool has been registered.

use thiserror::Error;

use crate::document::DocumentError;

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("unknown template: {name}")]
    UnknownTemplate { name: String },

    #[error("template '{template}': missing required argument '{arg}'")]
    MissingArgument { template: String, arg: String },

    #[error("template '{template}': argument '{arg}' must be a {expected}")]
    InvalidArgumentType {
        template: String,
        arg: String,
        expected: &'static str,
    },

    #[error("template '{template}': unknown argument '{arg}'")]
    UnknownArgument { template: String, arg: String },

    #[error("template '{template}': failed to read backing document: {source}")]
    Backing {
        template: String,
        #[source]
        source: DocumentError,
    },

    #[error("template '{template}': failed to encode rendered document: {source}")]
    Encode {
        template: String,
        #[source]
        source: DocumentError,
    },
}
