use crate::dummy::DummyNode;
use trailmap_core::{GridConfig, ListConfig, Rect, Vec2i};

/// Packs sibling nodes into rows, columns and honeycomb patterns. Only nodes that
/// get layouted are moved; every function leaves the others untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListLayouter {
    pub grid: GridConfig,
    pub config: ListConfig,
}

impl ListLayouter {
    pub fn new(grid: GridConfig, config: ListConfig) -> Self {
        Self { grid, config }
    }

    pub(crate) fn list_gaps(&self) -> Vec2i {
        Vec2i::new(
            self.grid.cell_size + 2 * self.grid.cell_padding,
            self.grid.cell_padding,
        )
    }

    fn layouted_indices(nodes: &[DummyNode]) -> Vec<usize> {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.gets_layouted())
            .map(|(index, _)| index)
            .collect()
    }

    /// Left to right. Returns the bounding size.
    pub fn layout_row(nodes: &mut [DummyNode], gap: i32) -> Vec2i {
        Self::layout_simple(nodes, gap, 0, true);
        Self::bounding_rect(nodes).size()
    }

    /// Top to bottom. Returns the bounding size.
    pub fn layout_column(nodes: &mut [DummyNode], gap: i32) -> Vec2i {
        Self::layout_simple(nodes, 0, gap, false);
        Self::bounding_rect(nodes).size()
    }

    fn layout_simple(nodes: &mut [DummyNode], gap_x: i32, gap_y: i32, horizontal: bool) {
        let mut cursor = Vec2i::default();
        for node in nodes.iter_mut().filter(|node| node.gets_layouted()) {
            node.position = cursor;
            if horizontal {
                cursor.x += node.size.x + gap_x;
            } else {
                cursor.y += node.size.y + gap_y;
            }
        }
    }

    fn nodes_per_column(node_count: usize, columns: usize) -> usize {
        if columns <= 1 {
            node_count.max(1)
        } else {
            (node_count + columns - 1).div_ceil(columns).max(1)
        }
    }

    /// Spreads the nodes over as few columns as fit `view_size`. A text node heading a
    /// run of nodes is repeated at the top of every column the run continues in; the
    /// copies are appended to `nodes`.
    pub fn layout_multi_column(&self, view_size: Vec2i, nodes: &mut Vec<DummyNode>) -> Vec2i {
        let gap = self.list_gaps();
        let mut visible = Self::layouted_indices(nodes);
        let max_columns = self.config.max_columns.max(1);

        let mut columns_final = 1;
        let mut max_widths_final: Vec<i32> = Vec::new();

        for columns in 1..=max_columns {
            let mut max_widths = vec![0; columns];
            let per_column = Self::nodes_per_column(visible.len(), columns);

            let mut max_height = 0;
            let mut height = -gap.y;
            for (i, &index) in visible.iter().enumerate() {
                let column = (i / per_column).min(columns - 1);
                if i % per_column == 0 {
                    height = -gap.y;
                }
                height += nodes[index].size.y + gap.y;
                max_widths[column] = max_widths[column].max(nodes[index].size.x);
                max_height = max_height.max(height);
            }

            let width = max_widths.iter().map(|w| w + gap.x).sum::<i32>() - gap.x;
            if width > view_size.x {
                if max_widths_final.is_empty() {
                    columns_final = 1;
                    max_widths_final = max_widths;
                }
                break;
            }

            columns_final = columns;
            max_widths_final = max_widths;

            if max_height < view_size.y {
                break;
            }
        }

        let per_column = Self::nodes_per_column(visible.len(), columns_final);
        let mut cursor = Vec2i::default();
        let mut last_text_node: Option<usize> = None;

        let mut i = 0;
        while i < visible.len() {
            let column = i / per_column;
            if column != 0 && column < columns_final && i % per_column == 0 {
                if let Some(text_index) = last_text_node.take()
                    && !nodes[visible[i]].is_text_node()
                {
                    let mut header = nodes[text_index].clone();
                    if visible[i - 1] == text_index {
                        nodes[text_index].visible = false;
                    } else if header.name.chars().count() == 1 {
                        header.name.push_str("..");
                    }
                    nodes.push(header);
                    visible.insert(i, nodes.len() - 1);
                    continue;
                }

                cursor.y = 0;
                cursor.x += max_widths_final.get(column - 1).copied().unwrap_or(0) + gap.x;
            }

            let node = &mut nodes[visible[i]];
            node.position = cursor;
            cursor.y += node.size.y + gap.y;
            if node.is_text_node() {
                last_text_node = Some(visible[i]);
            }
            i += 1;
        }

        Self::bounding_rect(nodes).size()
    }

    /// Column wrapping that keeps the result close to a square, or as flat as possible
    /// when `max_width` is given.
    pub fn layout_square(&self, nodes: &mut [DummyNode], max_width: Option<i32>) -> Vec2i {
        let gap = self.list_gaps();
        let visible = Self::layouted_indices(nodes);
        let total_height: i32 = visible.iter().map(|&i| nodes[i].size.y + gap.y).sum();
        let attempts = self.config.square_attempts.max(2) as i32;
        let max_width = max_width.unwrap_or(-1);

        let mut best: Option<(i32, i32)> = None;
        for step in 1..attempts {
            let budget = Vec2i::new(max_width, total_height * step / attempts);
            if !Self::layout_square_internal(nodes, &visible, budget, gap) {
                continue;
            }

            let rect = Self::bounding_rect(nodes);
            let score = if max_width >= 0 {
                rect.bottom
            } else {
                let (w, h) = (rect.right, rect.bottom);
                w * h + (w - h) * (w - h) / 4
            };

            if best.is_none_or(|(best_score, _)| score <= best_score) {
                best = Some((score, step));
            }
        }

        let step = best.map_or(1, |(_, step)| step);
        let budget = Vec2i::new(max_width, total_height * step / attempts);
        Self::layout_square_internal(nodes, &visible, budget, gap);
        Self::bounding_rect(nodes).size()
    }

    fn layout_square_internal(
        nodes: &mut [DummyNode],
        visible: &[usize],
        max_size: Vec2i,
        gap: Vec2i,
    ) -> bool {
        let mut x = 0;
        let mut y = 0;
        let mut width = 0;

        for &index in visible {
            let node = &mut nodes[index];
            node.position = Vec2i::new(x, y);

            y += node.size.y + gap.y;
            width = width.max(node.size.x);

            if max_size.x > 0 && x + width > max_size.x {
                return false;
            }

            if y >= max_size.y {
                y = 0;
                x += width + gap.x;
                width = 0;
            }
        }

        true
    }

    /// Honeycomb packing: rows alternate between full and half offset slots, and the
    /// row capacity shrinks until the result is at least a third as high as wide. The
    /// result is moved so its bounding box starts at (`left`, `top`); returns its size.
    pub fn layout_skewed(
        nodes: &mut [DummyNode],
        top: i32,
        left: i32,
        gap_x: i32,
        gap_y: i32,
        max_width: i32,
    ) -> Vec2i {
        let visible = Self::layouted_indices(nodes);

        let mut widths: Vec<i32> = visible.iter().map(|&i| nodes[i].size.x).collect();
        widths.sort_unstable_by(|a, b| b.cmp(a));
        let node_width = match widths.as_slice() {
            [] => 0,
            [only] => *only,
            [widest, second, ..] => widest / 2 + second / 2,
        };

        let slot = (node_width + gap_x).max(1);
        let nodes_per_row_start = (max_width * 2 / slot).max(3);

        for nodes_per_row in (3..=nodes_per_row_start).rev() {
            let width = (node_width * nodes_per_row + gap_x * (nodes_per_row - 1)) / 2;
            let mut height = 0;
            let mut x = 0;
            let mut row_height = 0;
            let mut node_count = 0;
            let mut even_row = true;

            for &index in &visible {
                if node_count + 2 > nodes_per_row {
                    height += row_height + gap_y;
                    row_height = 0;

                    even_row = !even_row;
                    node_count = if even_row { 0 } else { 1 };
                    x = if even_row { 0 } else { (node_width + gap_x) / 2 };
                }

                let node = &mut nodes[index];
                node.position = Vec2i::new(x + (node_width - node.size.x) / 2, height);

                row_height = row_height.max(node.size.y);
                x += node_width + gap_x;
                node_count += 2;
            }

            height += row_height;
            if height * 3 >= width {
                break;
            }
        }

        Self::offset_nodes(nodes, top, left)
    }

    /// Bounds of every layouted node; empty when there is none.
    pub fn bounding_rect(nodes: &[DummyNode]) -> Rect {
        nodes
            .iter()
            .filter(|node| node.gets_layouted())
            .map(DummyNode::rect)
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_default()
    }

    /// Moves the layouted nodes so their bounding box starts at (`left`, `top`) and
    /// returns its size.
    pub fn offset_nodes(nodes: &mut [DummyNode], top: i32, left: i32) -> Vec2i {
        let rect = Self::bounding_rect(nodes);
        let offset = Vec2i::new(left - rect.left, top - rect.top);
        for node in nodes.iter_mut().filter(|node| node.gets_layouted()) {
            node.position += offset;
        }
        rect.size()
    }
}
