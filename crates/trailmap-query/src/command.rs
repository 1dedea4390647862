use serde::{Deserialize, Serialize};
use trailmap_core::{AbstractionKind, AccessKind, NodeKind};

/// Named filter usable inside a query as `'name'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Member,
    Parent,

    Function,
    GlobalVariable,
    Class,
    Method,
    Field,
    Namespace,
    Struct,
    Enum,
    Typedef,

    Const,
    Static,

    Virtual,
    PureVirtual,

    Public,
    Protected,
    Private,

    Caller,
    Callee,
    Usage,

    SuperClass,
    SubClass,

    Unknown,
}

impl CommandKind {
    pub const ALL: [CommandKind; 23] = [
        CommandKind::Member,
        CommandKind::Parent,
        CommandKind::Function,
        CommandKind::GlobalVariable,
        CommandKind::Class,
        CommandKind::Method,
        CommandKind::Field,
        CommandKind::Namespace,
        CommandKind::Struct,
        CommandKind::Enum,
        CommandKind::Typedef,
        CommandKind::Const,
        CommandKind::Static,
        CommandKind::Virtual,
        CommandKind::PureVirtual,
        CommandKind::Public,
        CommandKind::Protected,
        CommandKind::Private,
        CommandKind::Caller,
        CommandKind::Callee,
        CommandKind::Usage,
        CommandKind::SuperClass,
        CommandKind::SubClass,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Member => "member",
            CommandKind::Parent => "parent",
            CommandKind::Function => "function",
            CommandKind::GlobalVariable => "global_variable",
            CommandKind::Class => "class",
            CommandKind::Method => "method",
            CommandKind::Field => "field",
            CommandKind::Namespace => "namespace",
            CommandKind::Struct => "struct",
            CommandKind::Enum => "enum",
            CommandKind::Typedef => "typedef",
            CommandKind::Const => "const",
            CommandKind::Static => "static",
            CommandKind::Virtual => "virtual",
            CommandKind::PureVirtual => "pure_virtual",
            CommandKind::Public => "public",
            CommandKind::Protected => "protected",
            CommandKind::Private => "private",
            CommandKind::Caller => "caller",
            CommandKind::Callee => "callee",
            CommandKind::Usage => "usage",
            CommandKind::SuperClass => "super_class",
            CommandKind::SubClass => "sub_class",
            CommandKind::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == name)
            .unwrap_or(CommandKind::Unknown)
    }

    /// Node kind selected by the type commands.
    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            CommandKind::Function => Some(NodeKind::FUNCTION),
            CommandKind::GlobalVariable => Some(NodeKind::GLOBAL_VARIABLE),
            CommandKind::Class => Some(NodeKind::CLASS),
            CommandKind::Method => Some(NodeKind::METHOD),
            CommandKind::Field => Some(NodeKind::FIELD),
            CommandKind::Namespace => Some(NodeKind::NAMESPACE),
            CommandKind::Struct => Some(NodeKind::STRUCT),
            CommandKind::Enum => Some(NodeKind::ENUM),
            CommandKind::Typedef => Some(NodeKind::TYPEDEF),
            _ => None,
        }
    }

    pub fn access(self) -> Option<AccessKind> {
        match self {
            CommandKind::Public => Some(AccessKind::Public),
            CommandKind::Protected => Some(AccessKind::Protected),
            CommandKind::Private => Some(AccessKind::Private),
            _ => None,
        }
    }

    pub fn abstraction(self) -> Option<AbstractionKind> {
        match self {
            CommandKind::Virtual => Some(AbstractionKind::Virtual),
            CommandKind::PureVirtual => Some(AbstractionKind::PureVirtual),
            _ => None,
        }
    }
}
