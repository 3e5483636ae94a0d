//! Declarative template descriptors
//!
//! Descriptors are TOML files, each holding one or more `[[templates]]`
//! entries naming a backing container document and a typed argument list:
//!
//! ```toml
//! [[templates]]
//! name = "offer-letter"
//! description = "Offer letter with candidate details"
//! file = "offer_letter.json"
//!
//! [[templates.args]]
//! name = "candidate"
//! type = "string"
//! description = "Candidate full name"
//! required = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::document::DocumentError;

/// Errors loading or validating a descriptor. Isolated per descriptor:
/// one bad entry never blocks the rest of the registry.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate template name: {name}")]
    Duplicate { name: String },

    #[error("duplicate argument '{arg}' in template '{template}'")]
    DuplicateArg { template: String, arg: String },

    #[error("required argument '{arg}' in template '{template}' must not declare a default")]
    RequiredWithDefault { template: String, arg: String },

    #[error("argument '{arg}' in template '{template}' has an unsupported default value")]
    InvalidDefault { template: String, arg: String },

    #[error("backing file for template '{template}' not found: {file}")]
    BackingNotFound { template: String, file: String },

    #[error("backing file for template '{template}' is not a valid document: {source}")]
    BackingInvalid {
        template: String,
        #[source]
        source: DocumentError,
    },
}

/// Declared argument type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    #[default]
    String,
    Number,
    Boolean,
}

impl ArgType {
    /// JSON-Schema type name
    pub fn json_name(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Number => "number",
            ArgType::Boolean => "boolean",
        }
    }

    /// Whether a JSON value matches this declared type
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        matches!(
            (self, value),
            (ArgType::String, serde_json::Value::String(_))
                | (ArgType::Number, serde_json::Value::Number(_))
                | (ArgType::Boolean, serde_json::Value::Bool(_))
        )
    }
}

/// One argument of a template's schema
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub arg_type: ArgType,
    pub description: String,
    pub required: bool,
    /// Substitution value when the argument is omitted; required arguments
    /// never carry one
    pub default: Option<String>,
}

/// A validated template descriptor
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    pub name: String,
    pub description: String,
    /// Backing container document, resolved against the descriptor's own
    /// directory first, then the remaining search paths
    pub file: String,
    /// Free-form metadata annotations
    pub annotations: toml::Table,
    pub args: Vec<ArgSpec>,
}

impl TemplateDescriptor {
    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

#[derive(Deserialize)]
struct TomlDescriptorFile {
    #[serde(default)]
    templates: Vec<TomlTemplate>,
}

#[derive(Deserialize)]
struct TomlTemplate {
    name: String,
    #[serde(default)]
    description: String,
    file: String,
    #[serde(default)]
    annotations: toml::Table,
    #[serde(default)]
    args: Vec<TomlArg>,
}

#[derive(Deserialize)]
struct TomlArg {
    name: String,
    #[serde(rename = "type", default)]
    arg_type: ArgType,
    #[serde(default)]
    description: String,
    #[serde(default)]
    required: bool,
    default: Option<toml::Value>,
}

/// Parse a descriptor file's content into validated descriptors
pub fn parse_descriptors(
    content: &str,
    path: &Path,
) -> Result<Vec<TemplateDescriptor>, DescriptorError> {
    let parsed: TomlDescriptorFile =
        toml::from_str(content).map_err(|source| DescriptorError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

    parsed.templates.into_iter().map(validate_template).collect()
}

fn validate_template(entry: TomlTemplate) -> Result<TemplateDescriptor, DescriptorError> {
    let mut args = Vec::with_capacity(entry.args.len());
    for arg in entry.args {
        if args.iter().any(|a: &ArgSpec| a.name == arg.name) {
            return Err(DescriptorError::DuplicateArg {
                template: entry.name.clone(),
                arg: arg.name,
            });
        }
        if arg.required && arg.default.is_some() {
            return Err(DescriptorError::RequiredWithDefault {
                template: entry.name.clone(),
                arg: arg.name,
            });
        }
        let default = match arg.default {
            None => None,
            Some(value) => Some(default_to_string(value).ok_or_else(|| {
                DescriptorError::InvalidDefault {
                    template: entry.name.clone(),
                    arg: arg.name.clone(),
                }
            })?),
        };
        args.push(ArgSpec {
            name: arg.name,
            arg_type: arg.arg_type,
            description: arg.description,
            required: arg.required,
            default,
        });
    }

    Ok(TemplateDescriptor {
        name: entry.name,
        description: entry.description,
        file: entry.file,
        annotations: entry.annotations,
        args,
    })
}

fn default_to_string(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}
