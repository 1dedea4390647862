pub mod bucket_layouter;
pub mod dummy;
pub mod layout;
pub mod list_layouter;
pub mod postprocessor;
pub mod spectral;
pub mod trail;

pub use bucket_layouter::{Bucket, BucketLayouter};
pub use dummy::{
    Aggregation, AggregationDirection, BucketCoord, DummyEdge, DummyNode, DummyNodeKind, EdgeData,
    GroupLayout, GroupType,
};
pub use layout::{
    BucketLayout, LayoutOutcome, LayoutPipeline, LayoutStrategy, LayoutStrategyKind, Layouter,
    ListLayout, ListMode, RingLayout, SpectralLayout,
};
pub use list_layouter::ListLayouter;
pub use postprocessor::{GraphPostprocessor, PostprocessReport};
pub use spectral::{layout_simple_ring, layout_spectral};
pub use trail::TrailLayouter;
