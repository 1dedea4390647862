use crate::bucket_layouter::BucketLayouter;
use crate::dummy::{DummyEdge, DummyNode};
use crate::list_layouter::ListLayouter;
use crate::postprocessor::{GraphPostprocessor, PostprocessReport};
use crate::spectral;
use crate::trail::TrailLayouter;
use serde::{Deserialize, Serialize};
use trailmap_core::{LayoutConfig, LayoutDirection, SpectralConfig, Vec2i};

/// Result of one layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOutcome {
    /// Size of the box around every visible node.
    pub bounding_size: Vec2i,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<PostprocessReport>,
}

pub trait Layouter {
    fn layout(&self, nodes: &mut Vec<DummyNode>, edges: &mut [DummyEdge]) -> LayoutOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategy {
    Row,
    Column,
    MultiColumn,
    Square,
    Skewed,
    #[default]
    Bucket,
    Trail(LayoutDirection),
    Spectral,
    Ring,
}

impl LayoutStrategy {
    pub fn kind(&self) -> LayoutStrategyKind {
        match self {
            LayoutStrategy::Row => LayoutStrategyKind::Row,
            LayoutStrategy::Column => LayoutStrategyKind::Column,
            LayoutStrategy::MultiColumn => LayoutStrategyKind::MultiColumn,
            LayoutStrategy::Square => LayoutStrategyKind::Square,
            LayoutStrategy::Skewed => LayoutStrategyKind::Skewed,
            LayoutStrategy::Bucket => LayoutStrategyKind::Bucket,
            LayoutStrategy::Trail(_) => LayoutStrategyKind::Trail,
            LayoutStrategy::Spectral => LayoutStrategyKind::Spectral,
            LayoutStrategy::Ring => LayoutStrategyKind::Ring,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// `LayoutStrategy` without its payload, for picking a strategy by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategyKind {
    Row,
    Column,
    MultiColumn,
    Square,
    Skewed,
    #[default]
    Bucket,
    Trail,
    Spectral,
    Ring,
}

impl LayoutStrategyKind {
    pub const ALL: [LayoutStrategyKind; 9] = [
        LayoutStrategyKind::Row,
        LayoutStrategyKind::Column,
        LayoutStrategyKind::MultiColumn,
        LayoutStrategyKind::Square,
        LayoutStrategyKind::Skewed,
        LayoutStrategyKind::Bucket,
        LayoutStrategyKind::Trail,
        LayoutStrategyKind::Spectral,
        LayoutStrategyKind::Ring,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutStrategyKind::Row => "row",
            LayoutStrategyKind::Column => "column",
            LayoutStrategyKind::MultiColumn => "multi-column",
            LayoutStrategyKind::Square => "square",
            LayoutStrategyKind::Skewed => "skewed",
            LayoutStrategyKind::Bucket => "bucket",
            LayoutStrategyKind::Trail => "trail",
            LayoutStrategyKind::Spectral => "spectral",
            LayoutStrategyKind::Ring => "ring",
        }
    }

    /// Full strategy. `direction` is only used by the trail strategy.
    pub fn with_direction(self, direction: LayoutDirection) -> LayoutStrategy {
        match self {
            LayoutStrategyKind::Row => LayoutStrategy::Row,
            LayoutStrategyKind::Column => LayoutStrategy::Column,
            LayoutStrategyKind::MultiColumn => LayoutStrategy::MultiColumn,
            LayoutStrategyKind::Square => LayoutStrategy::Square,
            LayoutStrategyKind::Skewed => LayoutStrategy::Skewed,
            LayoutStrategyKind::Bucket => LayoutStrategy::Bucket,
            LayoutStrategyKind::Trail => LayoutStrategy::Trail(direction),
            LayoutStrategyKind::Spectral => LayoutStrategy::Spectral,
            LayoutStrategyKind::Ring => LayoutStrategy::Ring,
        }
    }
}

fn outcome(nodes: &[DummyNode]) -> LayoutOutcome {
    LayoutOutcome {
        bounding_size: ListLayouter::bounding_rect(nodes).size(),
        postprocess: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Row,
    Column,
    MultiColumn,
    Square,
    Skewed,
}

/// One of the list packings over the whole node list.
#[derive(Debug, Clone, Copy)]
pub struct ListLayout {
    pub layouter: ListLayouter,
    pub mode: ListMode,
    pub view_size: Vec2i,
}

impl Layouter for ListLayout {
    fn layout(&self, nodes: &mut Vec<DummyNode>, _edges: &mut [DummyEdge]) -> LayoutOutcome {
        let gap = self.layouter.list_gaps();
        let bounding_size = match self.mode {
            ListMode::Row => ListLayouter::layout_row(nodes, gap.x),
            ListMode::Column => ListLayouter::layout_column(nodes, gap.y),
            ListMode::MultiColumn => self.layouter.layout_multi_column(self.view_size, nodes),
            ListMode::Square => self.layouter.layout_square(nodes, None),
            ListMode::Skewed => {
                ListLayouter::layout_skewed(nodes, 0, 0, gap.x, gap.y, self.view_size.x)
            }
        };

        LayoutOutcome {
            bounding_size,
            postprocess: None,
        }
    }
}

/// Bucket grid around the active node.
#[derive(Debug, Clone, Copy)]
pub struct BucketLayout {
    pub config: LayoutConfig,
    pub add_vertical_split: bool,
}

impl Layouter for BucketLayout {
    fn layout(&self, nodes: &mut Vec<DummyNode>, edges: &mut [DummyEdge]) -> LayoutOutcome {
        let mut layouter =
            BucketLayouter::new(self.config.view_size, self.config.grid, self.config.bucket);
        layouter.create_buckets(nodes, edges);
        layouter.layout_buckets(nodes, self.add_vertical_split);
        outcome(nodes)
    }
}

impl Layouter for TrailLayouter {
    fn layout(&self, nodes: &mut Vec<DummyNode>, edges: &mut [DummyEdge]) -> LayoutOutcome {
        let columns = self.layout_graph(nodes, edges);
        tracing::debug!("Trail layout ({:?}) with {} columns", self.direction(), columns);
        outcome(nodes)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpectralLayout {
    pub config: SpectralConfig,
}

impl Layouter for SpectralLayout {
    fn layout(&self, nodes: &mut Vec<DummyNode>, edges: &mut [DummyEdge]) -> LayoutOutcome {
        spectral::layout_spectral(nodes, edges, &self.config);
        outcome(nodes)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RingLayout {
    pub radius: f32,
}

impl Layouter for RingLayout {
    fn layout(&self, nodes: &mut Vec<DummyNode>, _edges: &mut [DummyEdge]) -> LayoutOutcome {
        spectral::layout_simple_ring(nodes, self.radius);
        outcome(nodes)
    }
}

/// Runs a strategy over a node list and optionally cleans up overlap afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutPipeline {
    pub config: LayoutConfig,
}

impl LayoutPipeline {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn layouter(&self, strategy: LayoutStrategy) -> Box<dyn Layouter> {
        let config = self.config;
        let list = |mode: ListMode| {
            Box::new(ListLayout {
                layouter: ListLayouter::new(config.grid, config.list),
                mode,
                view_size: config.view_size,
            }) as Box<dyn Layouter>
        };

        match strategy {
            LayoutStrategy::Row => list(ListMode::Row),
            LayoutStrategy::Column => list(ListMode::Column),
            LayoutStrategy::MultiColumn => list(ListMode::MultiColumn),
            LayoutStrategy::Square => list(ListMode::Square),
            LayoutStrategy::Skewed => list(ListMode::Skewed),
            LayoutStrategy::Bucket => Box::new(BucketLayout {
                config,
                add_vertical_split: false,
            }),
            LayoutStrategy::Trail(direction) => {
                Box::new(TrailLayouter::new(direction, config.trail))
            }
            LayoutStrategy::Spectral => Box::new(SpectralLayout {
                config: config.spectral,
            }),
            LayoutStrategy::Ring => Box::new(RingLayout {
                radius: config.spectral.ring_radius,
            }),
        }
    }

    pub fn run(
        &self,
        strategy: LayoutStrategy,
        nodes: &mut Vec<DummyNode>,
        edges: &mut [DummyEdge],
        postprocess: bool,
    ) -> LayoutOutcome {
        tracing::debug!(
            "Running {} layout on {} nodes and {} edges",
            strategy.name(),
            nodes.len(),
            edges.len()
        );

        let mut outcome = self.layouter(strategy).layout(nodes, edges);
        if postprocess {
            let report = self.postprocess_visible(nodes);
            outcome.bounding_size = ListLayouter::bounding_rect(nodes).size();
            outcome.postprocess = Some(report);
        }
        outcome
    }

    /// Hidden nodes keep their positions and do not take up space in the heat map.
    fn postprocess_visible(&self, nodes: &mut [DummyNode]) -> PostprocessReport {
        let indices: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.visible)
            .map(|(index, _)| index)
            .collect();
        let mut visible: Vec<DummyNode> = indices
            .iter()
            .map(|&index| std::mem::take(&mut nodes[index]))
            .collect();

        let report = GraphPostprocessor::new(self.config.grid, self.config.postprocess)
            .do_postprocessing(&mut visible);

        for (index, node) in indices.into_iter().zip(visible) {
            nodes[index] = node;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmap_core::{EdgeId, EdgeKind, NodeId};

    fn graph() -> (Vec<DummyNode>, Vec<DummyEdge>) {
        let nodes = (1..=4)
            .map(|id| {
                let mut node = DummyNode::data(NodeId(id), format!("n{id}"), Vec2i::new(80, 30));
                node.active = id == 1;
                node
            })
            .collect();
        let edges = vec![
            DummyEdge::new(EdgeId(1), NodeId(1), NodeId(2), EdgeKind::CALL),
            DummyEdge::new(EdgeId(2), NodeId(1), NodeId(3), EdgeKind::CALL),
            DummyEdge::new(EdgeId(3), NodeId(4), NodeId(1), EdgeKind::USAGE),
        ];
        (nodes, edges)
    }

    fn overlaps(nodes: &[DummyNode]) -> bool {
        nodes.iter().enumerate().any(|(i, a)| {
            nodes[i + 1..]
                .iter()
                .any(|b| a.rect().intersects(&b.rect()))
        })
    }

    #[test]
    fn test_strategy_kinds_map_back_to_their_strategy() {
        for kind in LayoutStrategyKind::ALL {
            let strategy = kind.with_direction(LayoutDirection::BottomTop);
            assert_eq!(strategy.kind(), kind);
            assert_eq!(strategy.name(), kind.name());
        }
        assert_eq!(
            LayoutStrategyKind::Trail.with_direction(LayoutDirection::TopBottom),
            LayoutStrategy::Trail(LayoutDirection::TopBottom)
        );
        assert_eq!(
            LayoutStrategyKind::default().with_direction(LayoutDirection::LeftRight),
            LayoutStrategy::default()
        );
    }

    #[test]
    fn test_every_strategy_separates_nodes() {
        let strategies = [
            LayoutStrategy::Row,
            LayoutStrategy::Column,
            LayoutStrategy::MultiColumn,
            LayoutStrategy::Square,
            LayoutStrategy::Skewed,
            LayoutStrategy::Bucket,
            LayoutStrategy::Trail(LayoutDirection::LeftRight),
            LayoutStrategy::Trail(LayoutDirection::BottomTop),
            LayoutStrategy::Ring,
        ];

        let pipeline = LayoutPipeline::default();
        for strategy in strategies {
            let (mut nodes, mut edges) = graph();
            let outcome = pipeline.run(strategy, &mut nodes, &mut edges, false);
            assert!(!overlaps(&nodes), "{} overlaps", strategy.name());
            assert!(outcome.bounding_size.x > 0 && outcome.bounding_size.y > 0);
            assert!(outcome.postprocess.is_none());
        }
    }

    #[test]
    fn test_postprocessing_reports_and_skips_hidden_nodes() {
        let (mut nodes, mut edges) = graph();
        nodes[3].visible = false;
        nodes[3].position = Vec2i::new(1000, 1000);

        let outcome = LayoutPipeline::default().run(LayoutStrategy::Ring, &mut nodes, &mut edges, true);
        let report = outcome.postprocess.unwrap();
        assert!(report.iterations <= 10);
        assert_eq!(nodes[3].position, Vec2i::new(1000, 1000));
        assert_eq!(nodes[3].size, Vec2i::new(80, 30));
        assert_eq!(nodes[0].size, Vec2i::new(90, 30));
    }

    #[test]
    fn test_strategy_serde_names() {
        let strategy: LayoutStrategy = serde_json::from_str(r#""multi-column""#).unwrap();
        assert_eq!(strategy, LayoutStrategy::MultiColumn);

        let trail: LayoutStrategy = serde_json::from_str(r#"{ "trail": "top-bottom" }"#).unwrap();
        assert_eq!(trail, LayoutStrategy::Trail(LayoutDirection::TopBottom));
    }
}
