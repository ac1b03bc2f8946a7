//! Template set and structural placeholder rendering.
//!
//! Templates are parsed into documents first; only string leaves are rendered,
//! each exactly once, so a substituted value is never re-scanned and a token
//! can never match across document structure.

use std::collections::BTreeMap;

use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};

use crate::domain::{AppError, ImageSource, InstallMode};

pub const COMPOSE_BUILD: &str = "docker-compose.build.yml";
pub const COMPOSE_PREBUILT: &str = "docker-compose.prebuilt.yml";
pub const COMPOSE_PANEL_BUILD: &str = "docker-compose.panel.build.yml";
pub const COMPOSE_PANEL_PREBUILT: &str = "docker-compose.panel.prebuilt.yml";
pub const PROXY_CONFIG: &str = "telemt.toml";
pub const ROUTER_RULE: &str = "traefik-tcp.yml";

/// Every template an operation may need.
pub const REQUIRED_TEMPLATES: &[&str] = &[
    COMPOSE_BUILD,
    COMPOSE_PREBUILT,
    COMPOSE_PANEL_BUILD,
    COMPOSE_PANEL_PREBUILT,
    PROXY_CONFIG,
    ROUTER_RULE,
];

/// Compose template matching `(image_source, mode)`.
pub fn compose_variant(image_source: ImageSource, mode: InstallMode) -> &'static str {
    match (image_source, mode) {
        (ImageSource::Build, InstallMode::ProxyOnly) => COMPOSE_BUILD,
        (ImageSource::Prebuilt, InstallMode::ProxyOnly) => COMPOSE_PREBUILT,
        (ImageSource::Build, InstallMode::ProxyPanel) => COMPOSE_PANEL_BUILD,
        (ImageSource::Prebuilt, InstallMode::ProxyPanel) => COMPOSE_PANEL_PREBUILT,
    }
}

/// Where a template set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    LocalCheckout(std::path::PathBuf),
    /// Cache directory, filled from the remote source as needed.
    Cache(std::path::PathBuf),
}

impl std::fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateOrigin::LocalCheckout(dir) => write!(f, "local checkout {}", dir.display()),
            TemplateOrigin::Cache(dir) => write!(f, "cache {}", dir.display()),
        }
    }
}

/// A resolved, read-only collection of template files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    files: BTreeMap<String, String>,
    origin: TemplateOrigin,
}

impl TemplateSet {
    pub fn new(files: BTreeMap<String, String>, origin: TemplateOrigin) -> Self {
        Self { files, origin }
    }

    pub fn get(&self, name: &str) -> Result<&str, AppError> {
        self.files
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::TemplatesUnavailable { missing: vec![name.to_string()] })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    /// Names from `required` not present in this set.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required.iter().copied().filter(|name| !self.files.contains_key(*name)).collect()
    }
}

/// A typed placeholder value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderValue {
    Text(String),
    Integer(i64),
}

/// The fixed placeholder vocabulary bound to concrete values.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: BTreeMap<&'static str, PlaceholderValue>,
}

impl Placeholders {
    pub const VOCABULARY: &'static [&'static str] = &[
        "tls_domain",
        "internal_port",
        "listen_port",
        "secret",
        "telemt_image",
        "panel_image",
        "panel_port",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        debug_assert!(Self::VOCABULARY.contains(&name), "unknown placeholder {}", name);
        self.values.insert(name, PlaceholderValue::Text(value.into()));
        self
    }

    pub fn integer(mut self, name: &'static str, value: impl Into<i64>) -> Self {
        debug_assert!(Self::VOCABULARY.contains(&name), "unknown placeholder {}", name);
        self.values.insert(name, PlaceholderValue::Integer(value.into()));
        self
    }

    fn context(&self) -> BTreeMap<&'static str, Value> {
        self.values
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    PlaceholderValue::Text(text) => Value::from(text.clone()),
                    PlaceholderValue::Integer(number) => Value::from(*number),
                };
                (*name, value)
            })
            .collect()
    }

    /// When `leaf` is exactly one placeholder, its typed value.
    fn whole_leaf(&self, leaf: &str) -> Option<&PlaceholderValue> {
        let inner = leaf.trim().strip_prefix("{{")?.strip_suffix("}}")?.trim();
        self.values.get(inner)
    }
}

/// Rendered string leaf.
enum Rendered {
    Text(String),
    Integer(i64),
}

struct LeafRenderer<'a> {
    env: Environment<'static>,
    placeholders: &'a Placeholders,
    context: BTreeMap<&'static str, Value>,
    template: &'a str,
}

impl<'a> LeafRenderer<'a> {
    fn new(template: &'a str, placeholders: &'a Placeholders) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env, placeholders, context: placeholders.context(), template }
    }

    fn render(&self, leaf: &str) -> Result<Rendered, AppError> {
        if !leaf.contains("{{") && !leaf.contains("{%") {
            return Ok(Rendered::Text(leaf.to_string()));
        }
        if let Some(PlaceholderValue::Integer(number)) = self.placeholders.whole_leaf(leaf) {
            return Ok(Rendered::Integer(*number));
        }
        self.env.render_str(leaf, &self.context).map(Rendered::Text).map_err(|e| {
            if e.kind() == ErrorKind::UndefinedError {
                AppError::PlaceholderMissing {
                    template: self.template.to_string(),
                    details: format!("'{}' ({})", leaf, e),
                }
            } else {
                AppError::TemplateInvalid { name: self.template.to_string(), details: e.to_string() }
            }
        })
    }
}

/// Parse a YAML template and render its string leaves.
pub fn render_yaml(
    name: &str,
    source: &str,
    placeholders: &Placeholders,
) -> Result<serde_yaml::Value, AppError> {
    let mut document: serde_yaml::Value = serde_yaml::from_str(source)
        .map_err(|e| AppError::TemplateInvalid { name: name.to_string(), details: e.to_string() })?;
    let renderer = LeafRenderer::new(name, placeholders);
    render_yaml_node(&mut document, &renderer)?;
    Ok(document)
}

fn render_yaml_node(node: &mut serde_yaml::Value, renderer: &LeafRenderer<'_>) -> Result<(), AppError> {
    match node {
        serde_yaml::Value::String(text) => {
            *node = match renderer.render(text)? {
                Rendered::Text(rendered) => serde_yaml::Value::String(rendered),
                Rendered::Integer(number) => serde_yaml::Value::Number(number.into()),
            };
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                render_yaml_node(item, renderer)?;
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, value) in map.iter_mut() {
                render_yaml_node(value, renderer)?;
            }
        }
        serde_yaml::Value::Tagged(tagged) => render_yaml_node(&mut tagged.value, renderer)?,
        serde_yaml::Value::Null | serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_) => {}
    }
    Ok(())
}

/// Parse a TOML template and render its string leaves.
pub fn render_toml(
    name: &str,
    source: &str,
    placeholders: &Placeholders,
) -> Result<toml::Table, AppError> {
    let mut document: toml::Table = toml::from_str(source)
        .map_err(|e| AppError::TemplateInvalid { name: name.to_string(), details: e.to_string() })?;
    let renderer = LeafRenderer::new(name, placeholders);
    for (_, value) in document.iter_mut() {
        render_toml_node(value, &renderer)?;
    }
    Ok(document)
}

fn render_toml_node(node: &mut toml::Value, renderer: &LeafRenderer<'_>) -> Result<(), AppError> {
    match node {
        toml::Value::String(text) => {
            *node = match renderer.render(text)? {
                Rendered::Text(rendered) => toml::Value::String(rendered),
                Rendered::Integer(number) => toml::Value::Integer(number),
            };
        }
        toml::Value::Array(items) => {
            for item in items {
                render_toml_node(item, renderer)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, value) in table.iter_mut() {
                render_toml_node(value, renderer)?;
            }
        }
        toml::Value::Integer(_)
        | toml::Value::Float(_)
        | toml::Value::Boolean(_)
        | toml::Value::Datetime(_) => {}
    }
    Ok(())
}
