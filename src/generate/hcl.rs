//! Block IR and HCL serialization.
//!
//! Values are encoded through `hcl-rs` so that string escaping follows the
//! language grammar. Block layout (attribute order, `=` alignment, blank
//! lines) is written here so the output is stable across runs.

use crate::error::Result;
use hcl::{Expression, Identifier, Number};
use std::collections::BTreeMap;
use std::fmt;

/// Indentation unit used for nested bodies.
const INDENT: &str = "  ";

/// Attributes hoisted to the top of a block, in this order.
const PRIORITY_KEYS: [&str; 2] = ["source", "version"];

/// Attribute set handed to the block builder.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Quoted string literal
    String(String),
    /// Decimal integer literal
    Integer(i64),
    /// `true` / `false`
    Bool(bool),
    /// Object literal, keys sorted
    Map(BTreeMap<String, AttributeValue>),
    /// Bare dotted path such as `module.aws_config.iam_role_name`
    Reference(Reference),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Reference> for AttributeValue {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(value: BTreeMap<String, AttributeValue>) -> Self {
        Self::Map(value)
    }
}

/// A symbolic reference to another block's value.
///
/// Built from path segments in order: `["a", "b", "c"]` renders as `a.b.c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    segments: Vec<String>,
}

impl Reference {
    /// Create a reference from its path segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the dotted path, checking every segment is an identifier.
    fn encode(&self) -> Result<String> {
        if self.segments.is_empty() {
            return Err(crate::err!(Internal {
                message: "reference has no path segments".to_string(),
            }));
        }
        for segment in &self.segments {
            Identifier::new(segment.as_str()).map_err(|e| {
                crate::err!(Internal {
                    message: format!("invalid reference segment '{segment}' in '{self}': {e}"),
                })
            })?;
        }
        Ok(self.to_string())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Provider overrides for a module block, alias key to raw reference.
///
/// `hcl-rs` has no way to write an object whose values are bare references
/// through the normal value path, so this is the one place raw reference
/// text goes straight into the output. Entries render sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDetails(BTreeMap<String, String>);

impl ProviderDetails {
    /// Create an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, reference: impl Into<String>) -> Self {
        self.0.insert(key.into(), reference.into());
        self
    }

    /// Look up the reference for an alias key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether no alias is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the `providers = { ... }` attribute at the given depth.
    fn render(&self, depth: usize) -> String {
        let indent = INDENT.repeat(depth);
        let mut out = format!("{indent}providers = {{\n");
        let lines: Vec<(String, String)> = self
            .0
            .iter()
            .map(|(key, reference)| (key.clone(), reference.clone()))
            .collect();
        write_aligned(&mut out, &lines, depth + 1);
        out.push_str(&indent);
        out.push_str("}\n");
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProviderDetails {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A structured configuration statement such as `module "x" { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: String,
    labels: Vec<String>,
    attributes: Vec<(String, AttributeValue)>,
    blocks: Vec<Block>,
    providers: Option<ProviderDetails>,
}

impl Block {
    /// Build a block from a kind, labels and an attribute set.
    ///
    /// `source` and `version` come first (in that order) when present; the
    /// remaining attributes follow sorted by key.
    pub fn generic<K, L, S>(kind: K, labels: L, attributes: Attributes) -> Self
    where
        K: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attributes = attributes;
        let mut ordered = Vec::with_capacity(attributes.len());
        for key in PRIORITY_KEYS {
            if let Some(value) = attributes.remove(key) {
                ordered.push((key.to_string(), value));
            }
        }
        // BTreeMap iteration is already sorted
        ordered.extend(attributes);

        Self {
            kind: kind.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            attributes: ordered,
            blocks: Vec::new(),
            providers: None,
        }
    }

    /// Append a nested block.
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Attach a `providers` override, written last after a blank line.
    #[must_use]
    pub fn with_providers(mut self, providers: ProviderDetails) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Block type, e.g. `module`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Block labels in order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Attributes in the order they will be written.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a single attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Nested blocks.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The `providers` override, if any.
    #[must_use]
    pub fn providers(&self) -> Option<&ProviderDetails> {
        self.providers.as_ref()
    }

    /// Render one attribute as `name = value`, without alignment padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    pub fn render_attribute(&self, name: &str) -> Result<Option<String>> {
        self.attribute(name)
            .map(|value| Ok(format!("{name} = {}", encode(value, 0)?)))
            .transpose()
    }

    /// Render the block at the top level.
    ///
    /// # Errors
    ///
    /// Returns an error if any attribute value cannot be encoded.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write(&mut out, 0)?;
        Ok(out)
    }

    fn write(&self, out: &mut String, depth: usize) -> Result<()> {
        let indent = INDENT.repeat(depth);
        out.push_str(&indent);
        out.push_str(&self.kind);
        for label in &self.labels {
            out.push(' ');
            out.push_str(&encode_string(label)?);
        }
        out.push_str(" {\n");

        let lines = self
            .attributes
            .iter()
            .map(|(key, value)| Ok((key.clone(), encode(value, depth + 1)?)))
            .collect::<Result<Vec<_>>>()?;
        write_aligned(out, &lines, depth + 1);

        for block in &self.blocks {
            block.write(out, depth + 1)?;
        }

        if let Some(providers) = self.providers.as_ref().filter(|p| !p.is_empty()) {
            if !self.attributes.is_empty() || !self.blocks.is_empty() {
                out.push('\n');
            }
            out.push_str(&providers.render(depth + 1));
        }

        out.push_str(&indent);
        out.push_str("}\n");
        Ok(())
    }
}

/// Encode a value as HCL at the given nesting depth.
///
/// Multi-line values (objects) indent their inner lines relative to
/// `depth`; the first line carries no indentation.
///
/// # Errors
///
/// Returns an `Internal` error for malformed references and an `HclRender`
/// error if the formatter rejects a literal.
pub fn encode(value: &AttributeValue, depth: usize) -> Result<String> {
    match value {
        AttributeValue::String(s) => encode_string(s),
        AttributeValue::Integer(n) => format_expression(&Expression::Number(Number::from(*n))),
        AttributeValue::Bool(b) => format_expression(&Expression::Bool(*b)),
        AttributeValue::Reference(reference) => reference.encode(),
        AttributeValue::Map(map) => {
            if map.is_empty() {
                return Ok("{}".to_string());
            }
            let lines = map
                .iter()
                .map(|(key, value)| Ok((encode_key(key)?, encode(value, depth + 1)?)))
                .collect::<Result<Vec<_>>>()?;
            let mut out = String::from("{\n");
            write_aligned(&mut out, &lines, depth + 1);
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            Ok(out)
        }
    }
}

fn encode_string(value: &str) -> Result<String> {
    format_expression(&Expression::String(value.to_string()))
}

/// Object keys stay bare when they are identifiers and are quoted otherwise.
fn encode_key(key: &str) -> Result<String> {
    if Identifier::new(key).is_ok() {
        Ok(key.to_string())
    } else {
        encode_string(key)
    }
}

fn format_expression(expr: &Expression) -> Result<String> {
    hcl::format::to_string(expr).map_err(|e| {
        crate::err!(HclRender {
            message: format!("failed to format {expr:?}: {e}"),
        })
    })
}

/// Write `key = value` lines, aligning `=` across each run of attributes.
///
/// A multi-line value closes the run it belongs to.
fn write_aligned(out: &mut String, lines: &[(String, String)], depth: usize) {
    let indent = INDENT.repeat(depth);
    let mut start = 0;
    while start < lines.len() {
        let end = lines[start..]
            .iter()
            .position(|(_, value)| value.contains('\n'))
            .map_or(lines.len(), |offset| start + offset + 1);
        let width = lines[start..end]
            .iter()
            .map(|(key, _)| key.chars().count())
            .max()
            .unwrap_or(0);
        for (key, value) in &lines[start..end] {
            out.push_str(&format!("{indent}{key:<width$} = {value}\n"));
        }
        start = end;
    }
}
