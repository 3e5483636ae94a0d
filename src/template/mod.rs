//! Declarative template tooling
//!
//! Descriptors are TOML files pairing a backing container document with a
//! typed argument schema. The registry turns each descriptor into an
//! invocable tool that validates arguments, substitutes placeholders in
//! the backing document, and returns the rendered bytes.

pub mod descriptor;
pub mod registry;

pub use descriptor::{parse_descriptors, ArgSpec, ArgType, DescriptorError, TemplateDescriptor};
pub use registry::{Rendered, RenderedTool, TemplateRegistry};
