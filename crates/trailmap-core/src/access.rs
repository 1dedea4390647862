use crate::error::EnumConversionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccessKind {
    #[default]
    Public,
    Protected,
    Private,
    Default,
}

impl AccessKind {
    pub fn label(self) -> &'static str {
        match self {
            AccessKind::Public => "public",
            AccessKind::Protected => "protected",
            AccessKind::Private => "private",
            AccessKind::Default => "default",
        }
    }
}

impl TryFrom<i32> for AccessKind {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccessKind::Public),
            1 => Ok(AccessKind::Protected),
            2 => Ok(AccessKind::Private),
            3 => Ok(AccessKind::Default),
            _ => Err(EnumConversionError::InvalidAccessKind(value)),
        }
    }
}
