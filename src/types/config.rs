//! Configuration structures.
//!
//! Configuration is assembled from defaults, `MF_*` environment variables and
//! CLI overrides (highest precedence), then validated once. Everything
//! downstream trusts a validated [`Config`].

use crate::tools::RuleSet;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Global filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server display name (reported to clients as `serverInfo.name`).
    #[serde(default = "default_name")]
    pub name: String,

    /// Tracing log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON log formatting.
    #[serde(default)]
    pub json_logs: bool,

    /// Register the synthetic health tool.
    #[serde(default)]
    pub include_health_tool: bool,

    /// Compute and log the token estimate for the exposed catalog.
    #[serde(default)]
    pub show_token_estimates: bool,

    /// How to reach the upstream server.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Tool allow/deny/rename rules.
    #[serde(default)]
    pub rules: RuleConfig,
}

fn default_name() -> String {
    "mcp-filter".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            json_logs: false,
            include_health_tool: false,
            show_token_estimates: false,
            upstream: UpstreamConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

/// Upstream connection settings, one variant per transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum UpstreamConfig {
    /// Spawn a subprocess and speak over its stdin/stdout.
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Connect to a streamable-HTTP endpoint.
    Http {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig::Stdio {
            command: String::new(),
            args: Vec::new(),
        }
    }
}

impl UpstreamConfig {
    /// Transport name as used in config and logs.
    pub fn transport_name(&self) -> &'static str {
        match self {
            UpstreamConfig::Stdio { .. } => "stdio",
            UpstreamConfig::Http { .. } => "http",
        }
    }
}

/// Raw allow/deny/rename rules as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Exact tool names to expose. Takes precedence over `allow_patterns`.
    #[serde(default)]
    pub allow_tools: Vec<String>,
    /// Regex patterns (unanchored search) for names to expose.
    #[serde(default)]
    pub allow_patterns: Vec<String>,
    /// Regex patterns (unanchored search) for names to hide.
    #[serde(default)]
    pub deny_patterns: Vec<String>,
    /// Prefix prepended to every exposed name. Empty means no renaming.
    #[serde(default)]
    pub rename_prefix: String,
}

/// Optional settings layered over the defaults.
///
/// Used for both the environment layer and CLI flags; `merge` lets the later
/// layer win field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
    pub include_health_tool: Option<bool>,
    pub show_token_estimates: Option<bool>,
    pub transport: Option<String>,
    pub stdio_command: Option<String>,
    pub stdio_args: Option<Vec<String>>,
    pub http_url: Option<String>,
    pub http_headers: Option<BTreeMap<String, String>>,
    pub allow_tools: Option<Vec<String>>,
    pub allow_patterns: Option<Vec<String>>,
    pub deny_patterns: Option<Vec<String>>,
    pub rename_prefix: Option<String>,
}

impl ConfigOverrides {
    /// Read `MF_*` variables through `lookup`.
    pub fn from_env_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut out = Self::default();

        out.name = get("MF_NAME");
        out.log_level = get("MF_LOG_LEVEL");
        if let Some(format) = get("MF_LOG_FORMAT") {
            out.json_logs = Some(format.eq_ignore_ascii_case("json"));
        }
        if let Some(v) = lookup("MF_INCLUDE_HEALTH_TOOL") {
            out.include_health_tool = Some(parse_bool(&v)?);
        }
        if let Some(v) = lookup("MF_NO_HEALTH") {
            out.include_health_tool = Some(!parse_bool(&v)?);
        }
        if let Some(v) = lookup("MF_SHOW_TOKEN_ESTIMATES") {
            out.show_token_estimates = Some(parse_bool(&v)?);
        }

        out.transport = get("MF_TRANSPORT").map(|t| t.to_lowercase());
        out.stdio_command = get("MF_STDIO_COMMAND");
        if let Some(args) = get("MF_STDIO_ARGS") {
            out.stdio_args = Some(split_shell_words(&args)?);
        }
        out.http_url = get("MF_HTTP_URL");
        if let Some(raw) = get("MF_HTTP_HEADERS") {
            out.http_headers = Some(parse_headers(raw.split(';'))?);
        }

        out.allow_tools = get("MF_ALLOW_TOOLS").map(|v| split_csv(&v));
        out.allow_patterns = get("MF_ALLOW_PATTERNS").map(|v| split_csv(&v));
        out.deny_patterns = get("MF_DENY_PATTERNS").map(|v| split_csv(&v));
        out.rename_prefix = get("MF_RENAME_PREFIX");

        Ok(out)
    }

    /// Read `MF_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_lookup(|key| std::env::var(key).ok())
    }

    /// Layer `top` over `self`; fields set in `top` win. Header maps merge.
    pub fn merge(self, top: ConfigOverrides) -> ConfigOverrides {
        let http_headers = match (self.http_headers, top.http_headers) {
            (Some(mut base), Some(extra)) => {
                base.extend(extra);
                Some(base)
            }
            (base, extra) => extra.or(base),
        };

        ConfigOverrides {
            name: top.name.or(self.name),
            log_level: top.log_level.or(self.log_level),
            json_logs: top.json_logs.or(self.json_logs),
            include_health_tool: top.include_health_tool.or(self.include_health_tool),
            show_token_estimates: top.show_token_estimates.or(self.show_token_estimates),
            transport: top.transport.or(self.transport),
            stdio_command: top.stdio_command.or(self.stdio_command),
            stdio_args: top.stdio_args.or(self.stdio_args),
            http_url: top.http_url.or(self.http_url),
            http_headers,
            allow_tools: top.allow_tools.or(self.allow_tools),
            allow_patterns: top.allow_patterns.or(self.allow_patterns),
            deny_patterns: top.deny_patterns.or(self.deny_patterns),
            rename_prefix: top.rename_prefix.or(self.rename_prefix),
        }
    }
}

impl Config {
    /// Load defaults + environment + `overrides`, then validate.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let env = ConfigOverrides::from_env()?;
        Self::from_overrides(env.merge(overrides))
    }

    /// Build a validated config from fully merged overrides.
    pub fn from_overrides(o: ConfigOverrides) -> Result<Self> {
        let defaults = Config::default();

        let transport = o.transport.unwrap_or_else(|| "stdio".to_string());
        let upstream = match transport.to_lowercase().as_str() {
            "stdio" => UpstreamConfig::Stdio {
                command: o.stdio_command.unwrap_or_default(),
                args: o.stdio_args.unwrap_or_default(),
            },
            "http" => UpstreamConfig::Http {
                url: o.http_url.unwrap_or_default(),
                headers: o.http_headers.unwrap_or_default(),
            },
            other => {
                return Err(Error::config(format!(
                    "unsupported transport '{}' (expected stdio or http)",
                    other
                )))
            }
        };

        let config = Config {
            name: o.name.unwrap_or(defaults.name),
            log_level: normalize_log_level(
                o.log_level.as_deref().unwrap_or(&defaults.log_level),
            )?,
            json_logs: o.json_logs.unwrap_or(defaults.json_logs),
            include_health_tool: o.include_health_tool.unwrap_or(defaults.include_health_tool),
            show_token_estimates: o
                .show_token_estimates
                .unwrap_or(defaults.show_token_estimates),
            upstream,
            rules: RuleConfig {
                allow_tools: flatten_csv(o.allow_tools.unwrap_or_default()),
                allow_patterns: flatten_csv(o.allow_patterns.unwrap_or_default()),
                deny_patterns: flatten_csv(o.deny_patterns.unwrap_or_default()),
                rename_prefix: o.rename_prefix.unwrap_or_default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check transport requirements. Rules are checked when compiled.
    pub fn validate(&self) -> Result<()> {
        match &self.upstream {
            UpstreamConfig::Stdio { command, .. } => {
                if command.trim().is_empty() {
                    return Err(Error::config(
                        "stdio transport requires --stdio-command or MF_STDIO_COMMAND",
                    ));
                }
            }
            UpstreamConfig::Http { url, .. } => {
                if url.trim().is_empty() {
                    return Err(Error::config(
                        "http transport requires --http-url or MF_HTTP_URL",
                    ));
                }
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| Error::config(format!("invalid http url '{}': {}", url, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(Error::config(format!(
                        "http url '{}' must use the http or https scheme",
                        url
                    )));
                }
            }
        }
        normalize_log_level(&self.log_level)?;
        Ok(())
    }

    /// Compile the configured rules.
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::compile(&self.rules)
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

/// Parse a boolean flag value.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(Error::config(format!(
            "cannot parse boolean value '{}'",
            value
        ))),
    }
}

/// Split a comma-separated list, trimming and dropping empty items.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flatten list entries that themselves contain commas.
fn flatten_csv(values: Vec<String>) -> Vec<String> {
    values.iter().flat_map(|v| split_csv(v)).collect()
}

/// Parse `key=value` header items.
pub fn parse_headers<'a, I>(items: I) -> Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut headers = BTreeMap::new();
    for item in items {
        if item.trim().is_empty() {
            continue;
        }
        let (key, value) = item.split_once('=').ok_or_else(|| {
            Error::config(format!("HTTP header '{}' must be in key=value form", item))
        })?;
        headers.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}

/// Split a command-line string into words with POSIX shell quoting rules.
pub fn split_shell_words(input: &str) -> Result<Vec<String>> {
    shell_words::split(input)
        .map_err(|err| Error::config(format!("cannot split arguments '{}': {}", input, err)))
}

/// Normalise a user-facing log level into an `EnvFilter` directive.
fn normalize_log_level(level: &str) -> Result<String> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok("trace".to_string()),
        "debug" => Ok("debug".to_string()),
        "info" => Ok("info".to_string()),
        "warn" | "warning" => Ok("warn".to_string()),
        "error" => Ok("error".to_string()),
        other => Err(Error::config(format!("unknown log level '{}'", other))),
    }
}
