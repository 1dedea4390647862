use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use trailmap_core::{AccessKind, BundleInfo, EdgeId, EdgeKind, NodeId, NodeKind, Rect, Vec2i};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum GroupType {
    #[default]
    DEFAULT,
    FRAMELESS,
    FILE,
    NAMESPACE,
    INHERITANCE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum GroupLayout {
    #[default]
    LIST,
    SKEWED,
    BUCKET,
}

/// What a dummy node stands for. Variant specific data lives in the variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DummyNodeKind {
    #[default]
    Data,
    Access {
        access: AccessKind,
    },
    ExpandToggle {
        invisible_sub_node_count: usize,
    },
    Bundle {
        #[serde(default)]
        bundled_nodes: Vec<DummyNode>,
        #[serde(default)]
        bundled_node_count: usize,
        bundled_node_kind: NodeKind,
    },
    Qualifier,
    Text {
        #[serde(default)]
        font_size_diff: i32,
    },
    Group {
        group_type: GroupType,
        group_layout: GroupLayout,
    },
}

/// Grid cell a node was placed in by the bucket layouter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketCoord {
    pub i: i32,
    pub j: i32,
}

fn non_negative_size<'de, D>(deserializer: D) -> Result<Vec2i, D::Error>
where
    D: Deserializer<'de>,
{
    Vec2i::deserialize(deserializer).map(Vec2i::clamp_non_negative)
}

/// Layout record for one node of the visible graph.
///
/// `position` is the top-left corner, relative to the parent for sub nodes. `size` is
/// never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummyNode {
    pub kind: DummyNodeKind,
    pub token_id: NodeId,
    pub name: String,

    // Geometry
    pub position: Vec2i,
    #[serde(deserialize_with = "non_negative_size")]
    pub size: Vec2i,
    pub column_size: Vec2i,

    // State
    pub visible: bool,
    pub active: bool,
    pub connected: bool,
    pub expanded: bool,
    pub has_parent: bool,

    // Hierarchy
    pub sub_nodes: Vec<DummyNode>,

    // Bundling
    pub bundle_info: BundleInfo,
    pub bundle_id: i64,
    pub layout_bucket: Option<BucketCoord>,
}

impl Default for DummyNode {
    fn default() -> Self {
        Self {
            kind: DummyNodeKind::Data,
            token_id: NodeId::VIRTUAL,
            name: String::new(),
            position: Vec2i::default(),
            size: Vec2i::default(),
            column_size: Vec2i::default(),
            visible: true,
            active: false,
            connected: false,
            expanded: false,
            has_parent: false,
            sub_nodes: Vec::new(),
            bundle_info: BundleInfo::default(),
            bundle_id: 0,
            layout_bucket: None,
        }
    }
}

impl DummyNode {
    pub fn new(kind: DummyNodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// A node backed by a token of the code graph.
    pub fn data(token_id: NodeId, name: impl Into<String>, size: Vec2i) -> Self {
        Self {
            token_id,
            name: name.into(),
            size: size.clamp_non_negative(),
            ..Self::default()
        }
    }

    pub fn text(name: impl Into<String>, size: Vec2i) -> Self {
        Self {
            kind: DummyNodeKind::Text { font_size_diff: 0 },
            name: name.into(),
            size: size.clamp_non_negative(),
            ..Self::default()
        }
    }

    /// Group node around `members`. The group carries the bundle id of its active member
    /// (or of its first one) and the majority vote of the members' bundle infos. Members
    /// are sorted by name.
    pub fn group(
        token_id: NodeId,
        name: impl Into<String>,
        group_type: GroupType,
        members: Vec<DummyNode>,
    ) -> Self {
        let bundle_id = members
            .iter()
            .find(|member| member.has_active_sub_node())
            .or(members.first())
            .map_or(0, |member| member.bundle_id);

        let mut group = Self {
            kind: DummyNodeKind::Group {
                group_type,
                group_layout: GroupLayout::BUCKET,
            },
            token_id,
            name: name.into(),
            bundle_id,
            ..Self::default()
        }
        .with_sub_nodes(members);

        group.bundle_info = BundleInfo::average(&group.bundle_infos());
        group.sort_sub_nodes_by_name();
        group
    }

    pub fn with_position(mut self, position: Vec2i) -> Self {
        self.position = position;
        self
    }

    pub fn with_sub_nodes(mut self, sub_nodes: Vec<DummyNode>) -> Self {
        self.sub_nodes = sub_nodes;
        for sub_node in &mut self.sub_nodes {
            sub_node.has_parent = true;
        }
        self
    }

    pub fn set_size(&mut self, size: Vec2i) {
        self.size = size.clamp_non_negative();
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn is_expand_toggle_node(&self) -> bool {
        matches!(self.kind, DummyNodeKind::ExpandToggle { .. })
    }

    pub fn is_bundle_node(&self) -> bool {
        matches!(self.kind, DummyNodeKind::Bundle { .. })
    }

    pub fn is_qualifier_node(&self) -> bool {
        matches!(self.kind, DummyNodeKind::Qualifier)
    }

    pub fn is_text_node(&self) -> bool {
        matches!(self.kind, DummyNodeKind::Text { .. })
    }

    /// Visible nodes take part in list layouts unless they are expand toggles or
    /// qualifiers.
    pub fn gets_layouted(&self) -> bool {
        self.visible && !self.is_expand_toggle_node() && !self.is_qualifier_node()
    }

    pub fn has_active_sub_node(&self) -> bool {
        self.active || self.sub_nodes.iter().any(DummyNode::has_active_sub_node)
    }

    /// Absolute rect of the first active node in this subtree, given the absolute
    /// position of this node's parent.
    pub fn active_sub_node_rect(&self, parent_position: Vec2i) -> Option<Rect> {
        let position = parent_position + self.position;
        if self.active {
            return Some(Rect::from_pos_size(position, self.size));
        }

        self.sub_nodes
            .iter()
            .find_map(|node| node.active_sub_node_rect(position))
    }

    pub fn for_each_recursive<F>(&self, func: &mut F)
    where
        F: FnMut(&DummyNode),
    {
        func(self);
        for node in &self.sub_nodes {
            node.for_each_recursive(func);
        }
    }

    pub fn sort_sub_nodes_by_name(&mut self) {
        self.sub_nodes.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn bundle_infos(&self) -> Vec<BundleInfo> {
        self.sub_nodes.iter().map(|node| node.bundle_info).collect()
    }

    /// Token ids of every node in this subtree, this node included.
    pub fn token_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.for_each_recursive(&mut |node| {
            if !node.token_id.is_virtual() {
                ids.push(node.token_id);
            }
        });
        ids
    }

    /// Order used inside a bucket: higher bundle ids first, bundles before plain nodes,
    /// then case insensitive by name.
    pub fn bucket_order(a: &DummyNode, b: &DummyNode) -> Ordering {
        b.bundle_id
            .cmp(&a.bundle_id)
            .then_with(|| b.is_bundle_node().cmp(&a.is_bundle_node()))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum AggregationDirection {
    NONE,
    #[default]
    FORWARD,
    BACKWARD,
    BIDIRECTIONAL,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub count: usize,
    pub direction: AggregationDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub kind: EdgeKind,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
}

/// Layout record for one relation between two nodes of the visible graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummyEdge {
    pub id: EdgeId,
    pub owner_id: NodeId,
    pub target_id: NodeId,
    pub data: Option<EdgeData>,
    pub visible: bool,
    pub active: bool,
    pub layout_horizontal: bool,
    /// Waypoints through virtual nodes, written by the trail layouter.
    pub path: Vec<Rect>,
}

impl Default for DummyEdge {
    fn default() -> Self {
        Self {
            id: EdgeId::default(),
            owner_id: NodeId::VIRTUAL,
            target_id: NodeId::VIRTUAL,
            data: None,
            visible: true,
            active: false,
            layout_horizontal: true,
            path: Vec::new(),
        }
    }
}

impl DummyEdge {
    pub fn new(id: EdgeId, owner_id: NodeId, target_id: NodeId, kind: EdgeKind) -> Self {
        Self {
            id,
            owner_id,
            target_id,
            data: Some(EdgeData {
                kind,
                aggregation: None,
            }),
            ..Self::default()
        }
    }

    pub fn aggregation(
        id: EdgeId,
        owner_id: NodeId,
        target_id: NodeId,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            data: Some(EdgeData {
                kind: EdgeKind::AGGREGATION,
                aggregation: Some(aggregation),
            }),
            ..Self::new(id, owner_id, target_id, EdgeKind::AGGREGATION)
        }
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        self.data.map(|data| data.kind)
    }

    pub fn is_hierarchy(&self) -> bool {
        self.kind().is_some_and(EdgeKind::is_hierarchy)
    }

    /// Aggregations report their own direction; every other edge points forward.
    pub fn direction(&self) -> AggregationDirection {
        self.data
            .and_then(|data| data.aggregation)
            .map_or(AggregationDirection::FORWARD, |aggregation| {
                aggregation.direction
            })
    }

    pub fn weight(&self) -> usize {
        self.data
            .and_then(|data| data.aggregation)
            .map_or(1, |aggregation| aggregation.count.max(1))
    }
}
