use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use trailmap_bench::code_graph;
use trailmap_query::{GraphFilterConductor, QueryTree, SubGraph};

const QUERIES: &[(&str, &str)] = &[
    ("type", "'method'"),
    ("has_or", "'class':('method'|'field')"),
    ("components", "('static'|'const').'public'"),
    ("relations", "!'class'.'caller'.'parent'"),
];

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_query_tree", |b| {
        b.iter(|| {
            for (_, query) in QUERIES {
                black_box(QueryTree::new(black_box(query)));
            }
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let graph = code_graph(200, 12);
    let input = SubGraph::of_graph(&graph);
    let conductor = GraphFilterConductor::new();
    let mut group = c.benchmark_group("filter_2600_nodes");

    for (label, query) in QUERIES {
        let tree = QueryTree::new(query);
        group.bench_function(*label, |b| {
            b.iter(|| black_box(conductor.filter(&tree, &graph, &input)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_filter);
criterion_main!(benches);
