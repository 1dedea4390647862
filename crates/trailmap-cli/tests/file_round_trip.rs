use std::fs;
use tempfile::tempdir;
use trailmap_cli::{LayoutJob, LayoutOutput, read_config, read_json, run_query};
use trailmap_core::{LayoutConfig, LayoutDirection, Vec2i};
use trailmap_graph::LayoutStrategy;

const CHAIN: &str = r#"{
    "nodes": [
        { "token_id": 1, "name": "main", "size": { "x": 80, "y": 30 }, "active": true },
        { "token_id": 2, "name": "parse", "size": { "x": 80, "y": 30 } },
        { "token_id": 3, "name": "emit", "size": { "x": 80, "y": 30 } }
    ],
    "edges": [
        { "id": 10, "owner_id": 1, "target_id": 2, "data": { "kind": "CALL" } },
        { "id": 11, "owner_id": 2, "target_id": 3, "data": { "kind": "CALL" } }
    ]
}"#;

fn trail_job() -> LayoutJob {
    LayoutJob {
        config: LayoutConfig::default(),
        strategy: LayoutStrategy::Trail(LayoutDirection::LeftRight),
        postprocess: false,
    }
}

#[test]
fn test_layout_file_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("chain.json");
    let output = dir.path().join("chain.layout.json");
    fs::write(&input, CHAIN).unwrap();

    let result = trail_job().run_file(&input, Some(&output)).unwrap();
    let written: LayoutOutput = read_json(&output).unwrap();

    assert_eq!(written.nodes.len(), 3);
    assert_eq!(written.bounding_size, result.bounding_size);
    let xs: Vec<i32> = written.nodes.iter().map(|node| node.position.x).collect();
    assert!(xs[0] < xs[1] && xs[1] < xs[2], "{xs:?}");
}

#[test]
fn test_negative_sizes_in_input_are_clamped() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("negative.json");
    fs::write(
        &input,
        r#"{
            "nodes": [
                { "token_id": 1, "name": "a", "size": { "x": -50, "y": -20 } },
                { "token_id": 2, "name": "b", "size": { "x": 40, "y": -5 } }
            ],
            "edges": []
        }"#,
    )
    .unwrap();

    let job = LayoutJob {
        strategy: LayoutStrategy::Column,
        ..trail_job()
    };
    let result = job.run_file(&input, None).unwrap();

    assert_eq!(result.nodes[0].size, Vec2i::new(0, 0));
    assert_eq!(result.nodes[1].size, Vec2i::new(40, 0));
    assert!(result.bounding_size.x >= 0 && result.bounding_size.y >= 0);
}

#[test]
fn test_batch_writes_one_file_per_input() {
    let dir = tempdir().unwrap();
    let inputs: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let path = dir.path().join(format!("{name}.json"));
            fs::write(&path, CHAIN).unwrap();
            path
        })
        .collect();
    let out_dir = dir.path().join("out");

    let job = LayoutJob {
        postprocess: true,
        ..trail_job()
    };
    let mut written = job.run_batch(&inputs, &out_dir).unwrap();
    written.sort();

    assert_eq!(
        written,
        vec![
            out_dir.join("a.layout.json"),
            out_dir.join("b.layout.json"),
            out_dir.join("c.layout.json"),
        ]
    );
    let output: LayoutOutput = read_json(&written[0]).unwrap();
    assert!(output.postprocess.is_some());
}

#[test]
fn test_partial_config_and_errors() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{ "view_size": { "x": 400, "y": 300 } }"#).unwrap();

    let config = read_config(Some(&config_path)).unwrap();
    assert_eq!(config.view_size.x, 400);
    assert_eq!(config.grid, LayoutConfig::default().grid);

    let missing = trail_job().run_file(&dir.path().join("missing.json"), None);
    let message = format!("{:#}", missing.unwrap_err());
    assert!(message.contains("Failed to read"), "{message}");

    fs::write(&config_path, "{ not json").unwrap();
    assert!(read_config(Some(&config_path)).is_err());
}

#[test]
fn test_query_file() {
    let dir = tempdir().unwrap();
    let graph = dir.path().join("graph.json");
    fs::write(
        &graph,
        r#"{
            "nodes": [
                { "id": 1, "kind": "CLASS", "full_name": "A" },
                { "id": 2, "kind": "METHOD", "full_name": "A::run" }
            ],
            "edges": [ { "id": 3, "kind": "MEMBER", "source": 1, "target": 2 } ]
        }"#,
    )
    .unwrap();

    let output = run_query(&graph, "'class':'method'").unwrap();
    assert!(output.valid);
    assert_eq!(output.result.node_ids().len(), 1);
    assert!(output.tree.starts_with("'class' : 'method'\n"));

    let invalid = run_query(&graph, "'class':").unwrap();
    assert!(!invalid.valid);
    assert!(invalid.result.is_empty());
}
