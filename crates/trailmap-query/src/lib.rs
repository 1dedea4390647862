//! Query expressions over a typed code graph: tokenizing, parsing into a precedence tree
//! and evaluating the tree as set operations on sub graphs.

pub mod command;
pub mod filter;
pub mod graph;
mod parser;
pub mod query;
pub mod search_match;
pub mod sub_graph;
pub mod tokenizer;

pub use command::CommandKind;
pub use filter::GraphFilterConductor;
pub use graph::{EdgeIndex, FilterEdge, FilterGraph, FilterGraphInput, FilterNode, NodeIndex};
pub use query::{GroupState, OperatorKind, QueryNode, QueryNodeKind, QueryOperator, QueryTree};
pub use search_match::{QueryNodeType, SearchMatch};
pub use sub_graph::SubGraph;
pub use tokenizer::tokenize_query;

use trailmap_core::NodeId;

/// Parses `query`, runs it over the whole graph and returns the selected node ids.
pub fn token_ids_for_query(graph: &FilterGraph, query: &str) -> Vec<NodeId> {
    let tree = QueryTree::new(query);
    tracing::debug!("Query tree:\n{}", tree);

    let result = GraphFilterConductor::new().filter(&tree, graph, &SubGraph::of_graph(graph));
    tracing::debug!(
        "Query selected {} nodes and {} edges",
        result.nodes.len(),
        result.edges.len()
    );
    result.node_ids()
}
