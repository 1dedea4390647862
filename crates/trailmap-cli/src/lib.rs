//! File based front end for the layout and query engines.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trailmap_core::{LayoutConfig, Vec2i};
use trailmap_graph::{DummyEdge, DummyNode, LayoutPipeline, LayoutStrategy, PostprocessReport};
use trailmap_query::{FilterGraph, FilterGraphInput, GraphFilterConductor, QueryTree, SubGraph};

/// Graph handed over by the caller for one layout pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutInput {
    pub nodes: Vec<DummyNode>,
    #[serde(default)]
    pub edges: Vec<DummyEdge>,
    /// Overrides the configured view size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_size: Option<Vec2i>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutOutput {
    pub nodes: Vec<DummyNode>,
    pub edges: Vec<DummyEdge>,
    pub bounding_size: Vec2i,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<PostprocessReport>,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutJob {
    pub config: LayoutConfig,
    pub strategy: LayoutStrategy,
    pub postprocess: bool,
}

impl LayoutJob {
    pub fn run(&self, input: LayoutInput) -> LayoutOutput {
        let mut config = self.config;
        if let Some(view_size) = input.view_size {
            config.view_size = view_size;
        }

        let LayoutInput {
            mut nodes,
            mut edges,
            ..
        } = input;
        let outcome = LayoutPipeline::new(config).run(
            self.strategy,
            &mut nodes,
            &mut edges,
            self.postprocess,
        );

        LayoutOutput {
            nodes,
            edges,
            bounding_size: outcome.bounding_size,
            postprocess: outcome.postprocess,
        }
    }

    pub fn run_file(&self, input: &Path, output: Option<&Path>) -> Result<LayoutOutput> {
        let layout_input: LayoutInput = read_json(input)?;
        let result = self.run(layout_input);
        if let Some(output) = output {
            write_json(output, &result)?;
        }
        Ok(result)
    }

    /// Lays out every input in parallel and writes `<stem>.layout.json` files into `out_dir`.
    pub fn run_batch(&self, inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

        inputs
            .par_iter()
            .map(|input| -> Result<PathBuf> {
                let stem = input
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or("graph");
                let output = out_dir.join(format!("{stem}.layout.json"));
                self.run_file(input, Some(output.as_path()))?;
                tracing::info!("Laid out {} -> {}", input.display(), output.display());
                Ok(output)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub query: String,
    pub valid: bool,
    pub tree: String,
    pub result: SubGraph,
}

pub fn run_query(graph_path: &Path, query: &str) -> Result<QueryOutput> {
    let input: FilterGraphInput = read_json(graph_path)?;
    let graph = FilterGraph::from(input);
    let tree = QueryTree::new(query);
    let result = GraphFilterConductor::new().filter(&tree, &graph, &SubGraph::of_graph(&graph));

    Ok(QueryOutput {
        query: query.to_string(),
        valid: tree.is_valid(),
        tree: tree.to_string(),
        result,
    })
}

pub fn read_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => read_json(path),
        None => Ok(LayoutConfig::default()),
    }
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
