//! Tool catalog: upstream descriptors and the frozen public lookup.
//!
//! The exposed catalog is built once at startup and never mutated afterwards,
//! so it is shared across concurrent calls without locking.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Upstream name reserved for the synthetic health tool.
pub const HEALTH_UPSTREAM_NAME: &str = "__health__";

// =============================================================================
// Descriptors
// =============================================================================

/// Tool metadata as reported by the upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default = "empty_object")]
    pub input_schema: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Public view of an exposed tool, as published to clients.
///
/// Same shape as [`ToolDescriptor`]; nothing about filtered-out tools leaks
/// through it.
pub type PublicTool = ToolDescriptor;

/// A tool published by the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposedTool {
    pub public_name: String,
    pub upstream_name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ExposedTool {
    /// Whether this entry is handled locally instead of forwarded.
    pub fn is_synthetic(&self) -> bool {
        self.upstream_name == HEALTH_UPSTREAM_NAME
    }

    /// The `{name, description, inputSchema}` document clients see.
    pub fn to_public(&self) -> PublicTool {
        ToolDescriptor {
            name: self.public_name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

// =============================================================================
// Exposed catalog
// =============================================================================

/// Frozen exposed catalog with public-name lookup.
///
/// Preserves publication order (upstream order, health last).
#[derive(Debug, Clone, Default)]
pub struct ExposedCatalog {
    tools: Vec<ExposedTool>,
    by_public_name: HashMap<String, usize>,
}

impl ExposedCatalog {
    /// Freeze a list of exposed tools. Public names are unique by
    /// construction (the rule engine and health registration reject
    /// duplicates); a repeated name here keeps the first entry.
    pub fn new(tools: Vec<ExposedTool>) -> Self {
        let mut by_public_name = HashMap::with_capacity(tools.len());
        for (idx, tool) in tools.iter().enumerate() {
            by_public_name.entry(tool.public_name.clone()).or_insert(idx);
        }
        Self {
            tools,
            by_public_name,
        }
    }

    /// Get an exposed tool by public name.
    pub fn get(&self, public_name: &str) -> Option<&ExposedTool> {
        self.by_public_name
            .get(public_name)
            .map(|&idx| &self.tools[idx])
    }

    /// Check if a public name is exposed.
    pub fn contains(&self, public_name: &str) -> bool {
        self.by_public_name.contains_key(public_name)
    }

    /// All exposed tools in publication order.
    pub fn tools(&self) -> &[ExposedTool] {
        &self.tools
    }

    /// Public views in publication order.
    pub fn public_tools(&self) -> Vec<PublicTool> {
        self.tools.iter().map(ExposedTool::to_public).collect()
    }

    /// Public names in publication order.
    pub fn public_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.public_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
