use serde::{Deserialize, Serialize};
use std::fmt;

pub mod access;
pub mod config;
pub mod error;
pub mod matrix;
pub mod node_type;
pub mod token_component;
pub mod vector;

pub use access::AccessKind;
pub use config::{
    BucketConfig, GridConfig, LayoutConfig, ListConfig, PostprocessConfig, SpectralConfig,
    TrailLayoutConfig,
};
pub use error::{EnumConversionError, MatrixError};
pub use matrix::Matrix;
pub use node_type::BundleInfo;
pub use token_component::{AbstractionKind, TokenComponents};
pub use vector::{Rect, Vec2f, Vec2i};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Id carried by synthetic nodes that have no counterpart in the code graph.
    pub const VIRTUAL: NodeId = NodeId(0);

    pub fn is_virtual(self) -> bool {
        self == Self::VIRTUAL
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum NodeKind {
    // Structural
    MODULE,
    NAMESPACE,
    PACKAGE,
    FILE,

    // Types
    STRUCT,
    CLASS,
    INTERFACE,
    UNION,
    ENUM,
    TYPEDEF,
    TYPE_PARAMETER,
    BUILTIN_TYPE,

    // Callable
    FUNCTION,
    METHOD,
    MACRO,

    // Variables
    GLOBAL_VARIABLE,
    FIELD,
    ENUM_CONSTANT,

    UNKNOWN,
}

impl TryFrom<i32> for NodeKind {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NodeKind::MODULE),
            1 => Ok(NodeKind::NAMESPACE),
            2 => Ok(NodeKind::PACKAGE),
            3 => Ok(NodeKind::FILE),
            4 => Ok(NodeKind::STRUCT),
            5 => Ok(NodeKind::CLASS),
            6 => Ok(NodeKind::INTERFACE),
            7 => Ok(NodeKind::UNION),
            8 => Ok(NodeKind::ENUM),
            9 => Ok(NodeKind::TYPEDEF),
            10 => Ok(NodeKind::TYPE_PARAMETER),
            11 => Ok(NodeKind::BUILTIN_TYPE),
            12 => Ok(NodeKind::FUNCTION),
            13 => Ok(NodeKind::METHOD),
            14 => Ok(NodeKind::MACRO),
            15 => Ok(NodeKind::GLOBAL_VARIABLE),
            16 => Ok(NodeKind::FIELD),
            17 => Ok(NodeKind::ENUM_CONSTANT),
            18 => Ok(NodeKind::UNKNOWN),
            _ => Err(EnumConversionError::InvalidNodeKind(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum EdgeKind {
    // Definition/Hierarchy
    MEMBER, // parent defines child

    // Usage
    TYPE_USAGE,
    USAGE,
    CALL,

    // OOP
    INHERITANCE,
    OVERRIDE,

    // Typing
    TYPE_OF,
    RETURN_TYPE_OF,
    PARAMETER_TYPE_OF,
    TYPEDEF_OF,
    TYPE_ARGUMENT,
    TEMPLATE_SPECIALIZATION,

    // Imports
    INCLUDE,
    IMPORT,

    MACRO_USAGE,

    // Several edges between two nodes collapsed into one
    AGGREGATION,

    UNKNOWN,
}

impl EdgeKind {
    /// Edges that are drawn along the vertical axis of a trail.
    pub fn is_hierarchy(self) -> bool {
        matches!(self, EdgeKind::INHERITANCE | EdgeKind::OVERRIDE)
    }

    /// Edges that count as a "usage" of their target.
    pub fn is_usage(self) -> bool {
        matches!(
            self,
            EdgeKind::TYPE_OF
                | EdgeKind::RETURN_TYPE_OF
                | EdgeKind::PARAMETER_TYPE_OF
                | EdgeKind::TYPE_USAGE
                | EdgeKind::USAGE
                | EdgeKind::TYPEDEF_OF
        )
    }
}

impl TryFrom<i32> for EdgeKind {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EdgeKind::MEMBER),
            1 => Ok(EdgeKind::TYPE_USAGE),
            2 => Ok(EdgeKind::USAGE),
            3 => Ok(EdgeKind::CALL),
            4 => Ok(EdgeKind::INHERITANCE),
            5 => Ok(EdgeKind::OVERRIDE),
            6 => Ok(EdgeKind::TYPE_OF),
            7 => Ok(EdgeKind::RETURN_TYPE_OF),
            8 => Ok(EdgeKind::PARAMETER_TYPE_OF),
            9 => Ok(EdgeKind::TYPEDEF_OF),
            10 => Ok(EdgeKind::TYPE_ARGUMENT),
            11 => Ok(EdgeKind::TEMPLATE_SPECIALIZATION),
            12 => Ok(EdgeKind::INCLUDE),
            13 => Ok(EdgeKind::IMPORT),
            14 => Ok(EdgeKind::MACRO_USAGE),
            15 => Ok(EdgeKind::AGGREGATION),
            16 => Ok(EdgeKind::UNKNOWN),
            _ => Err(EnumConversionError::InvalidEdgeKind(value)),
        }
    }
}

/// Flow direction of a trail layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    #[default]
    LeftRight,
    RightLeft,
    TopBottom,
    BottomTop,
}

impl LayoutDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, LayoutDirection::LeftRight | LayoutDirection::RightLeft)
    }

    pub fn is_inverted(self) -> bool {
        matches!(self, LayoutDirection::RightLeft | LayoutDirection::BottomTop)
    }
}

impl TryFrom<i32> for LayoutDirection {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LayoutDirection::LeftRight),
            1 => Ok(LayoutDirection::RightLeft),
            2 => Ok(LayoutDirection::TopBottom),
            3 => Ok(LayoutDirection::BottomTop),
            _ => Err(EnumConversionError::InvalidLayoutDirection(value)),
        }
    }
}
