use thiserror::Error;

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid NodeKind value: {0}")]
    InvalidNodeKind(i32),
    #[error("Invalid EdgeKind value: {0}")]
    InvalidEdgeKind(i32),
    #[error("Invalid AccessKind value: {0}")]
    InvalidAccessKind(i32),
    #[error("Invalid LayoutDirection value: {0}")]
    InvalidLayoutDirection(i32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Matrix index ({column}, {row}) out of range for {columns}x{rows} matrix")]
    IndexOutOfRange {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },
}
