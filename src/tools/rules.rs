//! Rule engine: allow/deny selection and renaming of upstream tools.
//!
//! Pure: no I/O, no state. Selection precedence is exact names, then allow
//! patterns, then allow-all; deny patterns always run afterwards.

use crate::tools::catalog::{ExposedTool, ToolDescriptor};
use crate::types::{Error, Result, RuleConfig};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Compiled, immutable rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    allow_exact: HashSet<String>,
    allow_patterns: Vec<Regex>,
    deny_patterns: Vec<Regex>,
    rename_prefix: String,
}

impl RuleSet {
    /// Compile configured rules. Every pattern is compiled before any
    /// filtering can happen; the first invalid one is reported.
    pub fn compile(config: &RuleConfig) -> Result<Self> {
        Ok(Self {
            allow_exact: config.allow_tools.iter().cloned().collect(),
            allow_patterns: compile_patterns(&config.allow_patterns)?,
            deny_patterns: compile_patterns(&config.deny_patterns)?,
            rename_prefix: config.rename_prefix.clone(),
        })
    }

    pub fn rename_prefix(&self) -> &str {
        &self.rename_prefix
    }

    /// Public name for an upstream name.
    pub fn public_name(&self, upstream_name: &str) -> String {
        format!("{}{}", self.rename_prefix, upstream_name)
    }

    /// Whether the allow step selects `name`.
    pub fn is_allowed(&self, name: &str) -> bool {
        if !self.allow_exact.is_empty() {
            self.allow_exact.contains(name)
        } else if !self.allow_patterns.is_empty() {
            matches_any(name, &self.allow_patterns)
        } else {
            true
        }
    }

    /// Whether any deny pattern matches `name`.
    pub fn is_denied(&self, name: &str) -> bool {
        matches_any(name, &self.deny_patterns)
    }

    /// Whether `name` survives both steps.
    pub fn is_selected(&self, name: &str) -> bool {
        self.is_allowed(name) && !self.is_denied(name)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::invalid_pattern(p.as_str(), e)))
        .collect()
}

/// Unanchored search semantics: any match inside the name counts.
fn matches_any(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

/// Filter and rename an upstream catalog.
///
/// Iterates in catalog order; the first public name seen twice fails with
/// [`Error::NameCollision`]. An empty result fails with
/// [`Error::NoToolsRemaining`].
pub fn filter_tools(catalog: &[ToolDescriptor], rules: &RuleSet) -> Result<Vec<ExposedTool>> {
    let selected: Vec<&ToolDescriptor> = catalog
        .iter()
        .filter(|tool| rules.is_selected(&tool.name))
        .collect();

    if selected.is_empty() {
        return Err(Error::NoToolsRemaining);
    }

    let mut seen: HashMap<String, &str> = HashMap::with_capacity(selected.len());
    let mut exposed = Vec::with_capacity(selected.len());

    for tool in selected {
        let public_name = rules.public_name(&tool.name);
        if let Some(first) = seen.get(public_name.as_str()) {
            return Err(Error::NameCollision {
                public_name,
                first: first.to_string(),
                second: tool.name.clone(),
            });
        }
        seen.insert(public_name.clone(), tool.name.as_str());
        exposed.push(ExposedTool {
            public_name,
            upstream_name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        });
    }

    Ok(exposed)
}

// =============================================================================
// Tests
// =============================================================================
