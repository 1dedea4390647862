use crate::command::CommandKind;
use crate::graph::{FilterGraph, FilterNode, NodeIndex};
use crate::query::{OperatorKind, QueryNode, QueryNodeKind, QueryOperator, QueryTree};
use crate::sub_graph::SubGraph;
use trailmap_core::{EdgeKind, NodeId, NodeKind};

/// Evaluates a [`QueryTree`] against a set of nodes of a [`FilterGraph`].
///
/// Every command looks at one input node at a time, but relations (members, parents,
/// callers, ...) are followed through the whole graph, so results can contain nodes that
/// were not part of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFilterConductor;

impl GraphFilterConductor {
    pub fn new() -> Self {
        Self
    }

    pub fn filter(&self, tree: &QueryTree, graph: &FilterGraph, input: &SubGraph) -> SubGraph {
        let mut out = SubGraph::new();
        if !tree.is_valid() {
            return out;
        }

        if let Some(root) = tree.root() {
            self.filter_node(root, graph, input, &mut out);
        }
        out.edges.clear();
        out.add_connecting_edges(graph);
        out
    }

    fn filter_node(&self, node: &QueryNode, graph: &FilterGraph, input: &SubGraph, out: &mut SubGraph) {
        match &node.kind {
            QueryNodeKind::Operator(operator) => self.filter_operator(operator, graph, input, out),
            QueryNodeKind::Command { command, name } => {
                filter_command(*command, name, graph, input, out)
            }
            QueryNodeKind::Token { name, ids } => filter_token(name, ids, graph, input, out),
        }
    }

    fn filter_operator(
        &self,
        operator: &QueryOperator,
        graph: &FilterGraph,
        input: &SubGraph,
        out: &mut SubGraph,
    ) {
        let (Some(right), left) = (operator.right.as_deref(), operator.left.as_deref()) else {
            return;
        };

        match (operator.op, left) {
            (OperatorKind::Not, _) => {
                let mut excluded = SubGraph::new();
                self.filter_node(right, graph, input, &mut excluded);

                let mut rest = input.clone();
                rest.subtract(&excluded);
                out.add(&rest);
            }
            (OperatorKind::Sub | OperatorKind::And, Some(left)) => {
                let mut narrowed = SubGraph::new();
                self.filter_node(left, graph, input, &mut narrowed);
                self.filter_node(right, graph, &narrowed, out);
            }
            (OperatorKind::Has, Some(left)) => {
                let mut owners = SubGraph::new();
                self.filter_node(left, graph, input, &mut owners);

                let mut members = SubGraph::new();
                let member = CommandKind::Member;
                filter_command(member, member.name(), graph, &owners, &mut members);
                self.filter_node(right, graph, &members, out);
            }
            (OperatorKind::Or, Some(left)) => {
                self.filter_node(left, graph, input, out);
                self.filter_node(right, graph, input, out);
            }
            _ => {}
        }
    }
}

fn for_each_input_node<F>(graph: &FilterGraph, input: &SubGraph, mut visit: F)
where
    F: FnMut(NodeIndex, &FilterNode),
{
    for &id in &input.nodes {
        if let Some(index) = graph.node_index(id) {
            visit(index, &graph[index]);
        }
    }
}

fn filter_command(
    command: CommandKind,
    name: &str,
    graph: &FilterGraph,
    input: &SubGraph,
    out: &mut SubGraph,
) {
    let mut selected: Vec<NodeId> = Vec::new();

    match command {
        CommandKind::Member => for_each_input_node(graph, input, |index, _| {
            selected.extend(graph.children(index).map(|child| child.id));
        }),
        CommandKind::Parent => for_each_input_node(graph, input, |index, _| {
            selected.extend(graph.parent(index).map(|parent| parent.id));
        }),
        CommandKind::Function
        | CommandKind::GlobalVariable
        | CommandKind::Class
        | CommandKind::Method
        | CommandKind::Field
        | CommandKind::Namespace
        | CommandKind::Struct
        | CommandKind::Enum
        | CommandKind::Typedef => {
            let kind = command.node_kind();
            for_each_input_node(graph, input, |_, node| {
                if Some(node.kind) == kind {
                    selected.push(node.id);
                }
            });
        }
        CommandKind::Const => for_each_input_node(graph, input, |index, node| {
            let const_method = node.kind == NodeKind::METHOD && node.components.is_const;
            let const_type = graph
                .find_edge_of_kind(index, EdgeKind::TYPE_OF)
                .is_some_and(|edge| edge.components.is_const);
            if const_method || const_type {
                selected.push(node.id);
            }
        }),
        CommandKind::Static => for_each_input_node(graph, input, |_, node| {
            if node.components.is_static {
                selected.push(node.id);
            }
        }),
        CommandKind::Virtual | CommandKind::PureVirtual => {
            let abstraction = command.abstraction();
            for_each_input_node(graph, input, |_, node| {
                if Some(node.components.abstraction) == abstraction {
                    selected.push(node.id);
                }
            });
        }
        CommandKind::Public | CommandKind::Protected | CommandKind::Private => {
            let access = command.access();
            for_each_input_node(graph, input, |index, _| {
                if let Some(edge) = graph.member_edge(index)
                    && edge.components.access.is_some()
                    && edge.components.access == access
                {
                    selected.push(edge.target);
                }
            });
        }
        CommandKind::Caller | CommandKind::Callee => {
            let callers = command == CommandKind::Caller;
            for_each_input_node(graph, input, |index, node| {
                for edge in graph.edges_of(index).filter(|edge| edge.kind == EdgeKind::CALL) {
                    if callers && edge.target == node.id {
                        selected.push(edge.source);
                    } else if !callers && edge.source == node.id {
                        selected.push(edge.target);
                    }
                }
            });
        }
        CommandKind::Usage => for_each_input_node(graph, input, |index, _| {
            selected.extend(
                graph
                    .incoming_edges(index)
                    .filter(|edge| edge.kind.is_usage())
                    .map(|edge| edge.source),
            );
        }),
        CommandKind::SuperClass | CommandKind::SubClass => {
            let super_classes = command == CommandKind::SuperClass;
            for_each_input_node(graph, input, |index, node| {
                for edge in graph
                    .edges_of(index)
                    .filter(|edge| edge.kind == EdgeKind::INHERITANCE)
                {
                    if super_classes && edge.source == node.id {
                        selected.push(edge.target);
                    } else if !super_classes && edge.target == node.id {
                        selected.push(edge.source);
                    }
                }
            });
        }
        CommandKind::Unknown => {
            tracing::error!("Query command not supported: '{}'", name);
        }
    }

    for id in selected {
        out.add_node(id);
    }
}

fn filter_token(name: &str, ids: &[NodeId], graph: &FilterGraph, input: &SubGraph, out: &mut SubGraph) {
    if !ids.is_empty() {
        for &id in ids {
            if input.contains_node(id) && graph.node_by_id(id).is_some() {
                out.add_node(id);
            }
        }
        return;
    }

    for_each_input_node(graph, input, |_, node| {
        if node.full_name == name {
            out.add_node(node.id);
        }
    });
}
