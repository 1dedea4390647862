use crate::access::AccessKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AbstractionKind {
    #[default]
    None,
    Virtual,
    PureVirtual,
}

/// Qualifiers attached to a node or an edge of the code graph.
///
/// Nodes carry `is_static`, `is_const` and `abstraction`; member edges carry
/// `access`, and type-of edges set `is_const` when the used type is const qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TokenComponents {
    pub is_const: bool,
    pub is_static: bool,
    pub abstraction: AbstractionKind,
    pub access: Option<AccessKind>,
}

impl TokenComponents {
    pub fn with_access(access: AccessKind) -> Self {
        Self {
            access: Some(access),
            ..Self::default()
        }
    }
}
