//! Rule engine benchmarks.
//!
//! Measures filter_tools over growing catalogs for each allow mode, and the
//! token estimate over a large exposed catalog.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mcp_filter::tools::{estimate_tokens, filter_tools, RuleSet, ToolDescriptor};
use mcp_filter::types::RuleConfig;
use serde_json::json;

fn catalog(size: usize) -> Vec<ToolDescriptor> {
    (0..size)
        .map(|i| {
            let verb = ["execute", "create", "delete", "list"][i % 4];
            ToolDescriptor::new(
                format!("{}_item_{}", verb, i),
                format!("Tool number {}", i),
                json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}),
            )
        })
        .collect()
}

fn rule_modes() -> Vec<(&'static str, RuleSet)> {
    let compile = |config: RuleConfig| RuleSet::compile(&config).unwrap();
    vec![
        ("allow_all", compile(RuleConfig::default())),
        (
            "exact",
            compile(RuleConfig {
                allow_tools: (0..50).map(|i| format!("execute_item_{}", i * 4)).collect(),
                rename_prefix: "p_".into(),
                ..Default::default()
            }),
        ),
        (
            "patterns_with_deny",
            compile(RuleConfig {
                allow_patterns: vec!["^(execute|list)_".into(), "item_1".into()],
                deny_patterns: vec!["^delete_".into(), "_9$".into()],
                ..Default::default()
            }),
        ),
    ]
}

fn bench_filter_tools(c: &mut Criterion) {
    let sizes: &[usize] = &[10, 100, 1000, 5000];

    for (mode, rules) in rule_modes() {
        let mut group = c.benchmark_group(format!("filter_tools/{}", mode));
        for &size in sizes {
            let tools = catalog(size);
            group.bench_with_input(BenchmarkId::from_parameter(size), &tools, |b, t| {
                b.iter(|| filter_tools(black_box(t), &rules).unwrap());
            });
        }
        group.finish();
    }
}

fn bench_token_estimate(c: &mut Criterion) {
    let exposed = filter_tools(&catalog(1000), &RuleSet::default()).unwrap();
    c.bench_function("estimate_tokens/1000", |b| {
        b.iter(|| estimate_tokens(black_box(&exposed)))
    });
}

criterion_group!(benches, bench_filter_tools, bench_token_estimate);
criterion_main!(benches);
