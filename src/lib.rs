//! # mcp-filter - Filtering proxy for MCP tool servers
//!
//! Sits between an MCP client and one upstream MCP server and publishes a
//! restricted, optionally renamed subset of the upstream's tools:
//! - Allow rules by exact name or regex, deny regexes applied last
//! - Uniform name prefixing with collision detection
//! - Local argument checks before anything is forwarded
//! - Optional synthetic health tool with a metadata token estimate
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────┐
//!   MCP client  →  │        FilterApplication             │  →  upstream
//!   (stdio)        │  ┌──────────┐ ┌──────────────────┐   │     (stdio | http)
//!                  │  │ RuleSet  │ │ ExposedCatalog   │   │
//!                  │  └──────────┘ └──────────────────┘   │
//!                  │  ┌──────────┐ ┌──────────────────┐   │
//!                  │  │Validation│ │ HealthReporter   │   │
//!                  │  └──────────┘ └──────────────────┘   │
//!                  └──────────────────────────────────────┘
//! ```
//! The catalog is built once at startup and is read-only afterwards.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod app;
pub mod mcp;
pub mod tools;
pub mod types;
pub mod upstream;
pub mod validation;

// Internal utilities
pub mod observability;

pub use app::FilterApplication;
pub use types::{Config, Error, Result};
