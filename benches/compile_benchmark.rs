extern crate criterion;
extern crate sparql_criteria;

use criterion::*;
use sparql_criteria::*;
use std::sync::Arc;

fn setup_compiler() -> SearchCompiler {
    SearchCompiler::with_defaults(
        SearchConfig::default(),
        Arc::new(PrefixNamespaceResolver::with_defaults()),
        Arc::new(SolrQueryPreparer::new()),
    )
}

// One OR branch per status, each with a date range, a title match and a size bound.
fn build_tree(branches: usize) -> Condition {
    let mut root = Condition::or(Vec::<Condition>::new());
    for i in 0..branches {
        root.push(Condition::and([
            Rule::new("emf:status", "set_to", "codelist", [format!("STATUS_{}", i)]),
            Rule::new("emf:createdOn", "between", "dateTime", ["2020-01-01".to_string(), "2020-12-31".to_string()]),
            Rule::new("dcterms:title", "contains", "string", [format!("report {}", i)]),
            Rule::new("emf:size", "greater_than", "numeric", [format!("{}", i * 10)]),
        ]));
    }
    root
}

fn compile_benchmark(c: &mut Criterion) {
    let compiler = setup_compiler();

    let rule = Rule::new("rdf:type", "equals", "object", ["emf:Case", "emf:Project", "GEN001"]);
    c.bench_function("compile_equals_rule", |b| b.iter(|| compiler.compile_rule(black_box(&rule))));

    let free_text = Rule::new("freeText", "contains", "fts", ["(budget or \"annual report\") and not draft"]);
    c.bench_function("compile_free_text_rule", |b| {
        b.iter(|| compiler.compile_rule(black_box(&free_text)))
    });

    let mut group = c.benchmark_group("compile_tree");
    for branches in [1usize, 10, 100] {
        let tree = build_tree(branches);
        group.bench_with_input(BenchmarkId::from_parameter(branches), &tree, |b, tree| {
            b.iter(|| compiler.compile(tree))
        });
    }
    group.finish();
}

criterion_group!(benches, compile_benchmark);
criterion_main!(benches);
