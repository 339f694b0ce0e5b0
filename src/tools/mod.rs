//! Tool infrastructure: the exposed catalog and how it is derived.
//!
//! Decides which upstream tools are published and under which names, and
//! reports on the result through the synthetic health tool.

pub mod catalog;
pub mod health;
pub mod rules;

pub use catalog::{ExposedCatalog, ExposedTool, PublicTool, ToolDescriptor, HEALTH_UPSTREAM_NAME};
pub use health::{estimate_tokens, HealthReport, HealthReporter, HEALTH_TOOL_NAME};
pub use rules::{filter_tools, RuleSet};
