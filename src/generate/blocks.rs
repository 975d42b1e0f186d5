//! Generic module, provider and required-providers blocks.

use super::hcl::{AttributeValue, Attributes, Block, ProviderDetails};
use std::collections::BTreeMap;

/// An entry in `terraform { required_providers { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredProvider {
    /// Local provider name
    pub name: String,
    /// Registry source, e.g. `lacework/lacework`
    pub source: Option<String>,
    /// Version constraint, e.g. `~> 0.3`
    pub version: Option<String>,
}

impl RequiredProvider {
    /// Entry with only a local name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the registry source.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the version constraint.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A `provider "<name>" { ... }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provider {
    /// Provider label, e.g. `aws`
    pub name: String,
    /// Provider settings
    pub attributes: Attributes,
}

impl Provider {
    /// Provider with no settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add or replace a setting.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the `provider` block.
    #[must_use]
    pub fn into_block(self) -> Block {
        Block::generic("provider", [self.name], self.attributes)
    }
}

/// A `module "<name>" { ... }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    /// Module label
    pub name: String,
    /// Module source; omitted when empty
    pub source: String,
    /// Version constraint; omitted when empty
    pub version: String,
    /// Module inputs
    pub attributes: Attributes,
    /// Optional `providers` override
    pub providers: Option<ProviderDetails>,
}

impl Module {
    /// Module without inputs.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Add or replace an input.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Pass providers to the module explicitly.
    #[must_use]
    pub fn providers(mut self, providers: ProviderDetails) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Build the block; source and version are hoisted above the inputs.
    #[must_use]
    pub fn into_block(self) -> Block {
        let mut attributes = self.attributes;
        if !self.source.is_empty() {
            attributes.insert("source".to_string(), self.source.into());
        }
        if !self.version.is_empty() {
            attributes.insert("version".to_string(), self.version.into());
        }

        let block = Block::generic("module", [self.name], attributes);
        match self.providers {
            Some(providers) => block.with_providers(providers),
            None => block,
        }
    }
}

/// Build `terraform { required_providers { ... } }`.
///
/// Each provider becomes an object carrying only the fields that are set.
#[must_use]
pub fn required_providers(providers: &[RequiredProvider]) -> Block {
    let details: Attributes = providers
        .iter()
        .map(|provider| {
            let mut entry = BTreeMap::new();
            if let Some(source) = &provider.source {
                entry.insert("source".to_string(), AttributeValue::from(source));
            }
            if let Some(version) = &provider.version {
                entry.insert("version".to_string(), AttributeValue::from(version));
            }
            (provider.name.clone(), AttributeValue::Map(entry))
        })
        .collect();

    Block::generic("terraform", Vec::<String>::new(), Attributes::new())
        .with_block(Block::generic("required_providers", Vec::<String>::new(), details))
}
