//! Attempts to slip tool names past the allow/deny rules.

use mcp_filter::tools::RuleSet;
use mcp_filter::types::RuleConfig;

fn allow_patterns(patterns: &[&str]) -> RuleSet {
    RuleSet::compile(&RuleConfig {
        allow_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    })
    .unwrap()
}

fn allow_exact(names: &[&str]) -> RuleSet {
    RuleSet::compile(&RuleConfig {
        allow_tools: names.iter().map(|n| n.to_string()).collect(),
        ..Default::default()
    })
    .unwrap()
}

/// Exact names compare byte for byte
#[test]
fn test_exact_allow_rejects_case_and_whitespace_variants() {
    let rules = allow_exact(&["execute_sql"]);

    assert!(rules.is_selected("execute_sql"));
    assert!(!rules.is_selected("Execute_SQL"));
    assert!(!rules.is_selected(" execute_sql"));
    assert!(!rules.is_selected("execute_sql "));
    assert!(!rules.is_selected("execute_sql\n"));
    assert!(!rules.is_selected("execute_sql\u{200B}"));
    assert!(!rules.is_selected("execute%5Fsql"));
}

/// Exact names are not patterns
#[test]
fn test_exact_allow_does_not_interpret_metacharacters() {
    let rules = allow_exact(&["execute.sql"]);

    assert!(rules.is_selected("execute.sql"));
    assert!(!rules.is_selected("execute_sql"));
    assert!(!rules.is_selected("executeXsql"));
}

/// Unanchored patterns match anywhere; anchoring is up to the operator
#[test]
fn test_unanchored_pattern_matches_substrings() {
    let loose = allow_patterns(&["sql"]);
    assert!(loose.is_selected("execute_sql"));
    assert!(loose.is_selected("sql_admin_drop_everything"));

    let anchored = allow_patterns(&["^execute_sql$"]);
    assert!(anchored.is_selected("execute_sql"));
    assert!(!anchored.is_selected("execute_sql_unsafe"));
    assert!(!anchored.is_selected("my_execute_sql"));
}

#[test]
fn test_regex_metacharacters_in_names_do_not_widen_match() {
    let rules = allow_patterns(&["^execute_sql$"]);

    assert!(!rules.is_selected("execute_sql|delete_branch"));
    assert!(!rules.is_selected("(execute_sql)"));
    assert!(!rules.is_selected("execute_sql.*"));
}

#[test]
fn test_empty_name_never_matches_anchored_allow() {
    let rules = allow_patterns(&["^delete_.*"]);
    assert!(!rules.is_selected(""));
}

/// Deny is applied after every allow mode
#[test]
fn test_deny_overrides_every_allow_mode() {
    let deny = vec!["^delete_".to_string(), "_drop$".to_string()];

    let modes = [
        RuleConfig {
            deny_patterns: deny.clone(),
            ..Default::default()
        },
        RuleConfig {
            allow_patterns: vec![".*".into()],
            deny_patterns: deny.clone(),
            ..Default::default()
        },
        RuleConfig {
            allow_tools: vec!["delete_branch".into(), "table_drop".into()],
            deny_patterns: deny.clone(),
            ..Default::default()
        },
    ];

    for config in modes {
        let rules = RuleSet::compile(&config).unwrap();
        assert!(!rules.is_selected("delete_branch"), "{:?}", config);
        assert!(!rules.is_selected("table_drop"), "{:?}", config);
    }
}

#[test]
fn test_case_insensitive_deny_requires_explicit_flag() {
    let strict = RuleSet::compile(&RuleConfig {
        deny_patterns: vec!["^delete_".into()],
        ..Default::default()
    })
    .unwrap();
    assert!(strict.is_selected("DELETE_branch"));

    let folded = RuleSet::compile(&RuleConfig {
        deny_patterns: vec!["(?i)^delete_".into()],
        ..Default::default()
    })
    .unwrap();
    assert!(!folded.is_selected("DELETE_branch"));
}
