use super::graph::TrailGraph;
use std::collections::BTreeMap;
use trailmap_core::{TrailLayoutConfig, Vec2i};

/// Reads and writes positions along the column axis or across it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axes {
    pub horizontal: bool,
}

impl Axes {
    pub fn along(self, v: Vec2i) -> i32 {
        if self.horizontal { v.x } else { v.y }
    }

    pub fn across(self, v: Vec2i) -> i32 {
        if self.horizontal { v.y } else { v.x }
    }

    fn set_along(self, v: &mut Vec2i, value: i32) {
        if self.horizontal {
            v.x = value;
        } else {
            v.y = value;
        }
    }

    fn set_across(self, v: &mut Vec2i, value: i32) {
        if self.horizontal {
            v.y = value;
        } else {
            v.x = value;
        }
    }

    fn point(self, along: i32, across: i32) -> Vec2i {
        if self.horizontal {
            Vec2i::new(along, across)
        } else {
            Vec2i::new(across, along)
        }
    }
}

pub(crate) fn build_columns(graph: &TrailGraph) -> Vec<Vec<usize>> {
    let mut columns: Vec<Vec<usize>> = Vec::new();
    for node in 0..graph.nodes.len() {
        let level = graph.level(node);
        if columns.len() <= level {
            columns.resize_with(level + 1, Vec::new);
        }
        columns[level].push(node);
    }
    columns
}

/// Barycenter ordering, one column at a time from left to right.
pub(crate) fn reduce_edge_crossings(graph: &TrailGraph, columns: &mut [Vec<usize>]) {
    for i in 1..columns.len() {
        let use_predecessors =
            !(columns[i - 1].len() == 1 && i + 1 < columns.len() && !columns[i + 1].is_empty());
        let neighbors = if use_predecessors {
            &columns[i - 1]
        } else {
            &columns[i + 1]
        };

        let neighbor_index = |node: usize| {
            neighbors
                .iter()
                .position(|&neighbor| neighbor == node)
                .unwrap_or(0)
        };

        let mut order: Vec<(f32, usize)> = columns[i]
            .iter()
            .enumerate()
            .map(|(index, &node)| {
                let trail_node = &graph.nodes[node];
                let positions: Vec<usize> = if use_predecessors {
                    trail_node
                        .incoming
                        .iter()
                        .map(|&edge| neighbor_index(graph.edges[edge].origin))
                        .collect()
                } else {
                    trail_node
                        .outgoing
                        .iter()
                        .map(|&edge| neighbor_index(graph.edges[edge].target))
                        .collect()
                };

                let value = if positions.is_empty() {
                    index as f32
                } else {
                    positions.iter().sum::<usize>() as f32 / positions.len() as f32
                };
                (value, node)
            })
            .collect();

        order.sort_by(|a, b| a.0.total_cmp(&b.0));
        columns[i] = order.into_iter().map(|(_, node)| node).collect();
    }
}

/// Stacks every column centered on the cross axis, then spreads the columns left and
/// right of the tallest one towards the average position of their neighbors.
pub(crate) fn place_columns(
    graph: &mut TrailGraph,
    columns: &[Vec<usize>],
    config: &TrailLayoutConfig,
    axes: Axes,
    inverted: bool,
) {
    let gap = config.node_gap;
    let mut widths = Vec::with_capacity(columns.len());
    let mut heights = Vec::with_capacity(columns.len());
    let mut max_height = 0;
    let mut max_height_index = 0;

    for (i, column) in columns.iter().enumerate() {
        let mut width = 0;
        let mut height = -gap;
        for &node in column {
            let size = graph.nodes[node].size;
            height += axes.across(size) + gap;
            width = width.max(axes.along(size));
        }

        widths.push(width);
        heights.push(height);
        if height > max_height {
            max_height = height;
            max_height_index = i;
        }
    }

    let mut along = 0;
    for (i, column) in columns.iter().enumerate() {
        let mut across = -heights[i] / 2;
        for &node in column {
            let trail_node = &mut graph.nodes[node];
            trail_node.position = axes.point(along, across);
            across += axes.across(trail_node.size) + gap;

            if trail_node.is_virtual() {
                axes.set_along(&mut trail_node.size, widths[i]);
            }
        }

        if i + 1 == columns.len() {
            continue;
        }
        if inverted {
            along -= widths[i + 1] + config.column_gap;
        } else {
            along += widths[i] + config.column_gap;
        }
    }

    for i in (0..max_height_index).rev() {
        move_nodes_to_average_position(graph, &columns[i], false, axes, gap);
    }
    for column in columns.iter().skip(max_height_index + 1) {
        move_nodes_to_average_position(graph, column, true, axes, gap);
    }
}

/// Groups the column's nodes by the average cross axis center of their already placed
/// neighbors and stacks the groups outwards from the overall average.
fn move_nodes_to_average_position(
    graph: &mut TrailGraph,
    column: &[usize],
    forward: bool,
    axes: Axes,
    gap: i32,
) {
    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for &node in column {
        let trail_node = &graph.nodes[node];
        let use_incoming = (forward && !trail_node.incoming.is_empty())
            || (!forward && trail_node.outgoing.is_empty());

        let neighbors: Vec<usize> = if use_incoming {
            trail_node
                .incoming
                .iter()
                .map(|&edge| graph.edges[edge].origin)
                .collect()
        } else {
            trail_node
                .outgoing
                .iter()
                .map(|&edge| graph.edges[edge].target)
                .collect()
        };
        if neighbors.is_empty() {
            continue;
        }

        let sum: i32 = neighbors
            .iter()
            .map(|&neighbor| {
                let neighbor = &graph.nodes[neighbor];
                axes.across(neighbor.position) + axes.across(neighbor.size) / 2
            })
            .sum();
        groups
            .entry(sum / neighbors.len() as i32)
            .or_default()
            .push(node);
    }

    if groups.is_empty() {
        return;
    }

    let average = groups.keys().sum::<i32>() / groups.len() as i32;
    let mut by_distance: Vec<i32> = groups.keys().copied().collect();
    by_distance.sort_by_key(|&center| (average - center).abs());

    let mut current_top = average;
    let mut current_bottom = average;

    for center in by_distance {
        let Some(group) = groups.get(&center) else {
            continue;
        };

        let size = group
            .iter()
            .map(|&node| axes.across(graph.nodes[node].size) + gap)
            .sum::<i32>()
            - gap;

        let mut top = center - size / 2;
        if current_top != current_bottom {
            if top < current_top {
                if top + size + gap > current_top {
                    top = current_top - gap - size;
                }
            } else if top > current_bottom {
                if top - gap < current_bottom {
                    top = current_bottom + gap;
                }
            } else if (current_top + current_bottom) / 2 > top + size / 2 {
                top = current_top - gap - size;
            } else {
                top = current_bottom + gap;
            }
        }

        let mut across = top;
        for &node in group {
            let trail_node = &mut graph.nodes[node];
            axes.set_across(&mut trail_node.position, across);
            across += axes.across(trail_node.size) + gap;
        }

        if current_top == current_bottom {
            current_top = top;
            current_bottom = top + size;
        } else if top < current_top {
            current_top = top;
        } else if top + size > current_bottom {
            current_bottom = top + size;
        }
    }
}
