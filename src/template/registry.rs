//! Template registry: one invocable tool per descriptor
//!
//! Loaded once at process start and immutable afterwards. Registration
//! failures are isolated per descriptor: the bad entry is logged and
//! skipped, every other template still registers. Invocations are
//! stateless — each one reads the backing document fresh and returns owned
//! bytes, so a shared `&TemplateRegistry` needs no locking.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::document::Document;
use crate::error::InvokeError;
use crate::placeholder::{bindings_from_strings, scan_document, substitute};
use crate::styles::StyleMap;

use super::descriptor::{parse_descriptors, DescriptorError, TemplateDescriptor};

/// A rendered invocation result handed to the output collaborator
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// An invocable tool built from one template descriptor
#[derive(Debug, Clone)]
pub struct RenderedTool {
    descriptor: TemplateDescriptor,
    backing: PathBuf,
}

impl RenderedTool {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn descriptor(&self) -> &TemplateDescriptor {
        &self.descriptor
    }

    pub fn backing_path(&self) -> &Path {
        &self.backing
    }

    /// JSON tool definition synthesized from the descriptor's argument
    /// schema
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in &self.descriptor.args {
            properties.insert(
                arg.name.clone(),
                json!({
                    "type": arg.arg_type.json_name(),
                    "description": arg.description,
                }),
            );
            if arg.required {
                required.push(Value::String(arg.name.clone()));
            }
        }
        json!({
            "name": self.descriptor.name,
            "description": self.descriptor.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }

    /// Placeholder tokens present in the backing document, in document
    /// order, deduplicated
    pub fn placeholders(&self) -> Result<Vec<String>, InvokeError> {
        let doc = self.read_backing()?;
        let mut tokens = Vec::new();
        for located in scan_document(&doc) {
            if !tokens.contains(&located.token) {
                tokens.push(located.token);
            }
        }
        Ok(tokens)
    }

    /// Validate arguments against the descriptor's schema, render the
    /// backing document with substitutions applied, and return the bytes.
    pub fn invoke(&self, args: &Map<String, Value>) -> Result<Rendered, InvokeError> {
        // Unknown extra arguments are rejected to surface caller mistakes
        for key in args.keys() {
            if self.descriptor.arg(key).is_none() {
                return Err(InvokeError::UnknownArgument {
                    template: self.name().to_string(),
                    arg: key.clone(),
                });
            }
        }

        let mut values: Vec<(String, String)> = Vec::with_capacity(self.descriptor.args.len());
        for spec in &self.descriptor.args {
            let value = match args.get(&spec.name) {
                Some(value) => {
                    if !spec.arg_type.matches(value) {
                        return Err(InvokeError::InvalidArgumentType {
                            template: self.name().to_string(),
                            arg: spec.name.clone(),
                            expected: spec.arg_type.json_name(),
                        });
                    }
                    json_to_string(value)
                }
                None if spec.required => {
                    return Err(InvokeError::MissingArgument {
                        template: self.name().to_string(),
                        arg: spec.name.clone(),
                    });
                }
                // missing optional: declared default, or empty string
                None => spec.default.clone().unwrap_or_default(),
            };
            values.push((spec.name.clone(), value));
        }

        let mut doc = self.read_backing()?;
        let bindings =
            bindings_from_strings(values.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        substitute(&mut doc, &bindings, &StyleMap::new());

        let bytes = doc.to_json().map_err(|source| InvokeError::Encode {
            template: self.name().to_string(),
            source,
        })?;
        Ok(Rendered {
            bytes,
            filename: format!("{}.json", self.name()),
            content_type: "application/json",
        })
    }

    fn read_backing(&self) -> Result<Document, InvokeError> {
        Document::from_file(&self.backing).map_err(|source| InvokeError::Backing {
            template: self.name().to_string(),
            source,
        })
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Registry of rendered tools, keyed by template name
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    tools: HashMap<String, RenderedTool>,
    /// Registration order, for stable listings
    order: Vec<String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.toml` descriptor under the search directories, in
    /// order (user-provided directories first, built-in defaults last).
    /// Never fails wholesale: bad descriptor files and entries are logged
    /// and skipped.
    pub fn load(search_paths: &[PathBuf]) -> Self {
        let mut registry = Self::new();
        for dir in search_paths {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("skipping template directory {}: {}", dir.display(), e);
                    continue;
                }
            };
            let mut files: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
                .collect();
            files.sort();

            for file in files {
                registry.load_descriptor_file(&file, search_paths);
            }
        }
        log::debug!("registered {} template tool(s)", registry.len());
        registry
    }

    fn load_descriptor_file(&mut self, path: &Path, search_paths: &[PathBuf]) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("skipping descriptor {}: {}", path.display(), e);
                return;
            }
        };
        let descriptors = match parse_descriptors(&content, path) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                log::warn!("skipping descriptor {}: {}", path.display(), e);
                return;
            }
        };
        let base = path.parent().unwrap_or(Path::new("."));
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            if let Err(e) = self.register(descriptor, base, search_paths) {
                log::warn!("skipping template '{}': {}", name, e);
            }
        }
    }

    /// Register one descriptor: enforce name uniqueness, resolve the
    /// backing file, and validate that it loads as a document.
    pub fn register(
        &mut self,
        descriptor: TemplateDescriptor,
        base: &Path,
        search_paths: &[PathBuf],
    ) -> Result<(), DescriptorError> {
        if self.tools.contains_key(&descriptor.name) {
            return Err(DescriptorError::Duplicate {
                name: descriptor.name,
            });
        }

        let backing = resolve_backing(&descriptor.file, base, search_paths).ok_or_else(|| {
            DescriptorError::BackingNotFound {
                template: descriptor.name.clone(),
                file: descriptor.file.clone(),
            }
        })?;
        Document::from_file(&backing).map_err(|source| DescriptorError::BackingInvalid {
            template: descriptor.name.clone(),
            source,
        })?;

        self.order.push(descriptor.name.clone());
        self.tools.insert(
            descriptor.name.clone(),
            RenderedTool {
                descriptor,
                backing,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RenderedTool> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tools in registration order
    pub fn tools(&self) -> impl Iterator<Item = &RenderedTool> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    pub fn invoke(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<Rendered, InvokeError> {
        let tool = self.get(name).ok_or_else(|| InvokeError::UnknownTemplate {
            name: name.to_string(),
        })?;
        tool.invoke(args)
    }
}

fn resolve_backing(file: &str, base: &Path, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let direct = base.join(file);
    if direct.is_file() {
        return Some(direct);
    }
    search_paths
        .iter()
        .map(|dir| dir.join(file))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, Paragraph, Run};
    use crate::template::descriptor::{ArgSpec, ArgType};

    fn write_backing(dir: &Path, name: &str, body_text: &str) {
        let mut doc = Document::new();
        doc.body.push(Element::Paragraph(Paragraph::new(
            None,
            vec![Run::plain(body_text)],
        )));
        doc.save(&dir.join(name)).unwrap();
    }

    fn descriptor(name: &str, file: &str, args: Vec<ArgSpec>) -> TemplateDescriptor {
        TemplateDescriptor {
            name: name.to_string(),
            description: String::new(),
            file: file.to_string(),
            annotations: toml::Table::new(),
            args,
        }
    }

    fn string_arg(name: &str, required: bool, default: Option<&str>) -> ArgSpec {
        ArgSpec {
            name: name.to_string(),
            arg_type: ArgType::String,
            description: String::new(),
            required,
            default: default.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_register_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        write_backing(dir.path(), "t.json", "hi");
        let mut registry = TemplateRegistry::new();
        registry
            .register(descriptor("t", "t.json", vec![]), dir.path(), &[])
            .expect("first register should succeed");
        let result = registry.register(descriptor("t", "t.json", vec![]), dir.path(), &[]);
        assert!(matches!(result, Err(DescriptorError::Duplicate { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_backing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TemplateRegistry::new();
        let result =
            registry.register(descriptor("t", "absent.json", vec![]), dir.path(), &[]);
        assert!(matches!(
            result,
            Err(DescriptorError::BackingNotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_backing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), b"not json").unwrap();
        let mut registry = TemplateRegistry::new();
        let result = registry.register(descriptor("t", "bad.json", vec![]), dir.path(), &[]);
        assert!(matches!(
            result,
            Err(DescriptorError::BackingInvalid { .. })
        ));
    }

    #[test]
    fn test_invoke_validates_arguments() {
        let dir = tempfile::tempdir().unwrap();
        write_backing(dir.path(), "t.json", "Hello {{name}}");
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                descriptor("t", "t.json", vec![string_arg("name", true, None)]),
                dir.path(),
                &[],
            )
            .unwrap();

        // missing required argument names the argument
        let err = registry.invoke("t", &Map::new()).unwrap_err();
        match err {
            InvokeError::MissingArgument { arg, .. } => assert_eq!(arg, "name"),
            other => panic!("unexpected error: {other}"),
        }

        // wrong type
        let mut args = Map::new();
        args.insert("name".to_string(), serde_json::json!(7));
        assert!(matches!(
            registry.invoke("t", &args).unwrap_err(),
            InvokeError::InvalidArgumentType { .. }
        ));

        // unknown extra argument is rejected
        let mut args = Map::new();
        args.insert("name".to_string(), serde_json::json!("Ana"));
        args.insert("extra".to_string(), serde_json::json!("x"));
        assert!(matches!(
            registry.invoke("t", &args).unwrap_err(),
            InvokeError::UnknownArgument { .. }
        ));
    }

    #[test]
    fn test_invoke_renders_substituted_document() {
        let dir = tempfile::tempdir().unwrap();
        write_backing(dir.path(), "t.json", "Hello {{name}}, total: {{amount}}");
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                descriptor(
                    "t",
                    "t.json",
                    vec![
                        string_arg("name", true, None),
                        string_arg("amount", true, None),
                    ],
                ),
                dir.path(),
                &[],
            )
            .unwrap();

        let mut args = Map::new();
        args.insert("name".to_string(), serde_json::json!("Ana"));
        args.insert("amount".to_string(), serde_json::json!("42"));
        let rendered = registry.invoke("t", &args).unwrap();
        assert_eq!(rendered.filename, "t.json");
        assert_eq!(rendered.content_type, "application/json");
        let doc = Document::from_json(&rendered.bytes).unwrap();
        assert_eq!(doc.visible_text(), "Hello Ana, total: 42");
    }

    #[test]
    fn test_optional_argument_default_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_backing(dir.path(), "t.json", "[{{a}}] [{{b}}]");
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                descriptor(
                    "t",
                    "t.json",
                    vec![
                        string_arg("a", false, Some("fallback")),
                        string_arg("b", false, None),
                    ],
                ),
                dir.path(),
                &[],
            )
            .unwrap();
        let rendered = registry.invoke("t", &Map::new()).unwrap();
        let doc = Document::from_json(&rendered.bytes).unwrap();
        assert_eq!(doc.visible_text(), "[fallback] []");
    }

    #[test]
    fn test_unknown_template() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.invoke("ghost", &Map::new()).unwrap_err(),
            InvokeError::UnknownTemplate { .. }
        ));
    }

    #[test]
    fn test_schema_shape() {
        let dir = tempfile::tempdir().unwrap();
        write_backing(dir.path(), "t.json", "x");
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                descriptor(
                    "t",
                    "t.json",
                    vec![
                        string_arg("name", true, None),
                        string_arg("note", false, None),
                    ],
                ),
                dir.path(),
                &[],
            )
            .unwrap();
        let schema = registry.get("t").unwrap().schema();
        assert_eq!(schema["name"], "t");
        assert_eq!(schema["input_schema"]["properties"]["name"]["type"], "string");
        assert_eq!(schema["input_schema"]["required"][0], "name");
    }
}
