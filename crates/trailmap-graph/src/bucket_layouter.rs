use crate::dummy::{AggregationDirection, BucketCoord, DummyEdge, DummyNode};
use std::collections::{BTreeMap, HashMap};
use trailmap_core::{BucketConfig, GridConfig, NodeId, Vec2i};

/// One grid cell of the bucket layout holding indices of top level nodes.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub i: i32,
    pub j: i32,
    width: i32,
    height: i32,
    nodes: Vec<usize>,
}

impl Bucket {
    fn new(i: i32, j: i32) -> Self {
        Self {
            i,
            j,
            ..Self::default()
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    fn has_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    fn add_node(&mut self, index: usize, nodes: &mut [DummyNode], grid: &GridConfig) {
        let insert_at = self.nodes.partition_point(|&other| {
            DummyNode::bucket_order(&nodes[other], &nodes[index]) != std::cmp::Ordering::Greater
        });
        self.nodes.insert(insert_at, index);

        let node = &mut nodes[index];
        node.layout_bucket = Some(BucketCoord {
            i: self.i,
            j: self.j,
        });
        self.width = self.width.max(node.size.x);
        self.height += grid.to_grid_size(node.size.y) + grid.cell_padding;
    }

    /// Stacks the bucket's nodes in columns no taller than the view. With a vertical
    /// split every column is centered and opened up in the middle so edges can pass.
    fn pre_layout(
        &mut self,
        nodes: &mut [DummyNode],
        grid: &GridConfig,
        config: &BucketConfig,
        view_size: Vec2i,
        add_vertical_split: bool,
        force_vertical_split: bool,
    ) {
        let columns = if view_size.y > 0 {
            self.height / view_size.y
        } else {
            0
        } + 1;

        let padding = grid.cell_padding;
        let column_height = self.height / columns;
        let mut x = 0;
        let mut y = 0;
        let mut width = 0;
        self.height = 0;

        let mut column_widths = Vec::new();
        let mut column_heights = Vec::new();
        let mut nodes_in_column: Vec<Vec<usize>> = vec![Vec::new()];

        let mut height_diff = 0;
        for &index in &self.nodes {
            if y > column_height + height_diff {
                let current = nodes_in_column.last().map_or(0, Vec::len);
                // a lone node stays on top of the middle split
                if current == 1
                    && self.nodes.len() > 1
                    && (add_vertical_split || force_vertical_split)
                {
                    height_diff = y;
                } else {
                    column_heights.push(y - padding);
                    column_widths.push(width);

                    y = 0;
                    x += grid.to_grid_offset(width + config.inner_column_gap);
                    width = 0;

                    nodes_in_column.push(Vec::new());
                    height_diff = 0;
                }
            }

            let node = &mut nodes[index];
            node.position = Vec2i::new(x, y);
            if let Some(column) = nodes_in_column.last_mut() {
                column.push(index);
            }

            y += grid.to_grid_size(node.size.y) + padding;
            width = width.max(node.size.x);
            self.height = self.height.max(y);
        }

        column_heights.push(y - padding);
        column_widths.push(width);

        self.width = x + width;
        self.height -= padding;

        for (column, indices) in nodes_in_column.iter().enumerate() {
            for &index in indices {
                nodes[index].column_size = Vec2i::new(column_widths[column], column_heights[column]);
            }
        }

        if !(add_vertical_split && (nodes_in_column.len() > 1 || force_vertical_split)) {
            return;
        }

        // the bucket height is kept so buckets still line up with the active node
        let node_offset = grid.cell_padding + grid.cell_size;

        for (column, indices) in nodes_in_column.iter().enumerate() {
            let mut offset = 0;
            let mut has_offset = false;
            let mid = column_heights[column] / 2;

            let mut above = Vec::new();
            let mut below = Vec::new();
            let mut above_max_width = 0;
            let mut below_max_width = 0;

            for &index in indices {
                let node = &nodes[index];
                let top = node.position.y;
                let bottom = node.position.y + node.size.y;
                let mut is_above = true;

                if has_offset {
                    is_above = false;
                } else if indices.len() == 1 {
                    offset -= (node.size.y + padding) / 2;
                } else if top < mid && bottom > mid {
                    if mid - top < bottom - mid {
                        offset = mid - top + padding / 2;
                        is_above = false;
                    } else {
                        offset = mid - bottom - padding / 2;
                    }
                    has_offset = true;
                } else if bottom < mid && mid < bottom + padding {
                    offset = mid - (bottom + padding / 2);
                    has_offset = true;
                }

                if is_above {
                    above.push(index);
                    above_max_width = above_max_width.max(node.size.x);
                } else {
                    below.push(index);
                    below_max_width = below_max_width.max(node.size.x);
                }
            }

            offset += (self.height - column_heights[column]) / 2;
            for index in above {
                nodes[index].position.y += offset - node_offset;
                nodes[index].column_size.x = above_max_width;
            }
            for index in below {
                nodes[index].position.y += offset + node_offset;
                nodes[index].column_size.x = below_max_width;
            }
        }
    }

    /// Centers the pre-laid nodes inside the given area, keeping them on the raster.
    fn layout(&self, nodes: &mut [DummyNode], grid: &GridConfig, area_position: Vec2i, area_size: Vec2i) {
        let Some(&first) = self.nodes.first() else {
            return;
        };

        let offset = Vec2i::new(
            area_position.x + (area_size.x - self.width) / 2,
            area_position.y + (area_size.y - self.height) / 2,
        );
        let first_position = nodes[first].position;
        let offset = grid.align_on_raster(first_position + offset) - first_position;

        for &index in &self.nodes {
            nodes[index].position += offset;
        }
    }
}

/// Places the neighborhood of the active node on a grid of buckets: callers to the left,
/// callees to the right, vertically laid out bundles above and below.
#[derive(Debug, Clone)]
pub struct BucketLayouter {
    view_size: Vec2i,
    grid: GridConfig,
    config: BucketConfig,
    buckets: BTreeMap<(i32, i32), Bucket>,
    i1: i32,
    i2: i32,
    j1: i32,
    j2: i32,
    active_parent: Option<usize>,
}

impl BucketLayouter {
    pub fn new(view_size: Vec2i, grid: GridConfig, config: BucketConfig) -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert((0, 0), Bucket::new(0, 0));
        Self {
            view_size,
            grid,
            config,
            buckets,
            i1: 0,
            i2: 0,
            j1: 0,
            j2: 0,
            active_parent: None,
        }
    }

    pub fn bucket(&self, i: i32, j: i32) -> Option<&Bucket> {
        self.buckets.get(&(j, i))
    }

    /// Distributes the top level nodes over buckets following the edges and records on
    /// every edge whether it ended up horizontal.
    pub fn create_buckets(&mut self, nodes: &mut [DummyNode], edges: &mut [DummyEdge]) {
        if nodes.is_empty() {
            return;
        }

        let mut active_node_added = false;
        for index in 0..nodes.len() {
            if nodes[index].has_active_sub_node() || edges.is_empty() {
                self.add_to_center(index, nodes);
                nodes[index].bundle_info.layout_vertical = false;
                active_node_added = true;
                self.active_parent = Some(index);
            }
        }

        if edges.is_empty() {
            return;
        }

        if !active_node_added {
            self.add_to_center(0, nodes);
        }

        let top_level = Self::top_level_lookup(nodes);

        for edge in edges.iter_mut() {
            let owner = top_level.get(&edge.owner_id).copied();
            let target = top_level.get(&edge.target_id).copied();

            let mut horizontal = true;
            if let (Some(mut owner), Some(mut target)) = (owner, target)
                && owner != target
                && nodes[owner].gets_layouted()
                && nodes[target].gets_layouted()
            {
                let owner_info = nodes[owner].bundle_info;
                let target_info = nodes[target].bundle_info;
                horizontal = !owner_info.layout_vertical && !target_info.layout_vertical;

                if !horizontal {
                    if (owner_info.layout_vertical && owner_info.is_referenced)
                        || (target_info.layout_vertical && target_info.is_referencing)
                    {
                        std::mem::swap(&mut owner, &mut target);
                    }
                } else if edge.direction() == AggregationDirection::BACKWARD
                    // undirected edges put the unrelated side on the left
                    || (edge.direction() == AggregationDirection::NONE
                        && !target_info.is_referencing
                        && !target_info.is_referenced)
                {
                    std::mem::swap(&mut owner, &mut target);
                }

                horizontal = self.add_pair(owner, target, horizontal, nodes);
            }

            edge.layout_horizontal = horizontal;
        }
    }

    /// Maps every visible token id to the index of its top level node. The first top
    /// level node containing a token wins.
    fn top_level_lookup(nodes: &[DummyNode]) -> HashMap<NodeId, usize> {
        let mut lookup = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            Self::collect_visible_ids(node, index, &mut lookup);
        }
        lookup
    }

    fn collect_visible_ids(node: &DummyNode, top: usize, lookup: &mut HashMap<NodeId, usize>) {
        if node.visible {
            lookup.entry(node.token_id).or_insert(top);
        }
        for sub_node in &node.sub_nodes {
            Self::collect_visible_ids(sub_node, top, lookup);
        }
    }

    fn add_to_center(&mut self, index: usize, nodes: &mut [DummyNode]) {
        let grid = self.grid;
        if let Some(bucket) = self.buckets.get_mut(&(0, 0)) {
            bucket.add_node(index, nodes, &grid);
        }
    }

    fn bucket_of(&self, index: usize) -> Option<(i32, i32)> {
        self.buckets
            .values()
            .find(|bucket| bucket.has_node(index))
            .map(|bucket| (bucket.i, bucket.j))
    }

    /// Puts the unplaced side of an edge next to the placed one. Returns whether the
    /// pair ended up side by side.
    fn add_pair(
        &mut self,
        owner: usize,
        target: usize,
        horizontal: bool,
        nodes: &mut [DummyNode],
    ) -> bool {
        let owner_bucket = self.bucket_of(owner);
        let target_bucket = self.bucket_of(target);

        let (anchor, node, step) = match (owner_bucket, target_bucket) {
            (Some((_, owner_j)), Some((_, target_j))) => return owner_j == target_j,
            (None, None) => {
                self.add_to_center(owner, nodes);
                ((0, 0), target, 1)
            }
            (Some(anchor), None) => (anchor, target, 1),
            (None, Some(anchor)) => (anchor, owner, -1),
        };

        let (i, j) = if horizontal {
            (anchor.0 + step, anchor.1)
        } else {
            (anchor.0, anchor.1 - step)
        };

        let grid = self.grid;
        match self.grow_to(i, j) {
            Some(bucket) => bucket.add_node(node, nodes, &grid),
            None => tracing::debug!("No bucket at ({}, {}) for node {}", i, j, nodes[node].token_id),
        }

        horizontal
    }

    /// Bucket at (i, j), extending the grid by at most one column and one row.
    fn grow_to(&mut self, i: i32, j: i32) -> Option<&mut Bucket> {
        let mut new_column = false;
        if i == self.i1 - 1 {
            self.i1 = i;
            new_column = true;
        } else if i == self.i2 + 1 {
            self.i2 = i;
            new_column = true;
        }
        if new_column {
            for cj in self.j1..=self.j2 {
                self.buckets.insert((cj, i), Bucket::new(i, cj));
            }
        }

        let mut new_row = false;
        if j == self.j1 - 1 {
            self.j1 = j;
            new_row = true;
        } else if j == self.j2 + 1 {
            self.j2 = j;
            new_row = true;
        }
        if new_row {
            for ci in self.i1..=self.i2 {
                self.buckets.insert((j, ci), Bucket::new(ci, j));
            }
        }

        if (self.i1..=self.i2).contains(&i) && (self.j1..=self.j2).contains(&j) {
            self.buckets.get_mut(&(j, i))
        } else {
            None
        }
    }

    /// Pre-lays every bucket, then tiles them using the widest bucket per column and the
    /// tallest per row.
    pub fn layout_buckets(&mut self, nodes: &mut [DummyNode], add_vertical_split: bool) {
        let grid = self.grid;
        let config = self.config;
        let mut widths: HashMap<i32, i32> = HashMap::new();
        let mut heights: HashMap<i32, i32> = HashMap::new();

        for ((j, i), bucket) in self.buckets.iter_mut() {
            bucket.pre_layout(nodes, &grid, &config, self.view_size, *i != 0, add_vertical_split);

            let width = widths.entry(*i).or_insert(bucket.width());
            *width = (*width).max(bucket.width());
            let height = heights.entry(*j).or_insert(bucket.height());
            *height = (*height).max(bucket.height());
        }

        let vertical_offset = self
            .active_parent
            .and_then(|index| {
                let parent = &nodes[index];
                parent
                    .active_sub_node_rect(Vec2i::default())
                    .map(|rect| (rect.top + rect.bottom - parent.size.y) / 2)
            })
            .unwrap_or(0);

        let mid_height = self.buckets.get(&(0, 0)).map_or(0, Bucket::height);
        let column_gap = grid.to_grid_gap(config.column_gap);
        let row_gap = grid.to_grid_gap(config.row_gap);

        let mut y = 0;
        for j in self.j1..=self.j2 {
            let row_height = heights.get(&j).copied().unwrap_or(0);
            let mut x = 0;
            for i in self.i1..=self.i2 {
                let column_width = widths.get(&i).copied().unwrap_or(0);

                let y_offset = if i == 0 && (j == -1 || j == 1) {
                    // pull the buckets right above and below the center closer
                    (heights.get(&0).copied().unwrap_or(0) - mid_height) / 2 * -j
                } else if j == 0 && i != 0 {
                    vertical_offset
                } else {
                    0
                };

                if let Some(bucket) = self.buckets.get(&(j, i)) {
                    bucket.layout(
                        nodes,
                        &grid,
                        Vec2i::new(x, y + y_offset),
                        Vec2i::new(column_width, row_height),
                    );
                }
                x += column_width + column_gap;
            }
            y += row_height + row_gap;
        }
    }

    /// Node indices in bucket order, row by row.
    pub fn sorted_node_indices(&self) -> Vec<usize> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.nodes.iter().copied())
            .collect()
    }
}
