use crate::command::CommandKind;
use crate::parser::Parser;
use crate::tokenizer::{TOKEN_ID_DELIMITER, tokenize_query};
use std::fmt;
use trailmap_core::NodeId;

/// Binary and unary operators, ordered from tightest to loosest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorKind {
    Not,
    Sub,
    Has,
    And,
    Or,
}

impl OperatorKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '!' => Some(OperatorKind::Not),
            '.' => Some(OperatorKind::Sub),
            ':' => Some(OperatorKind::Has),
            '&' => Some(OperatorKind::And),
            '|' => Some(OperatorKind::Or),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OperatorKind::Not => '!',
            OperatorKind::Sub => '.',
            OperatorKind::Has => ':',
            OperatorKind::And => '&',
            OperatorKind::Or => '|',
        }
    }

    pub fn is_unary(self) -> bool {
        self == OperatorKind::Not
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupState {
    #[default]
    None,
    Closed,
    Unclosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOperator {
    pub op: OperatorKind,
    /// Inserted between two adjacent operands.
    pub implicit: bool,
    pub left: Option<Box<QueryNode>>,
    pub right: Option<Box<QueryNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNodeKind {
    Token { name: String, ids: Vec<NodeId> },
    Command { command: CommandKind, name: String },
    Operator(QueryOperator),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    pub kind: QueryNodeKind,
    pub group: GroupState,
}

impl QueryNode {
    pub fn token(name: impl Into<String>, ids: Vec<NodeId>) -> Self {
        Self {
            kind: QueryNodeKind::Token {
                name: name.into(),
                ids,
            },
            group: GroupState::None,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: QueryNodeKind::Command {
                command: CommandKind::from_name(&name),
                name,
            },
            group: GroupState::None,
        }
    }

    pub fn operator(operator: QueryOperator) -> Self {
        Self {
            kind: QueryNodeKind::Operator(operator),
            group: GroupState::None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.group != GroupState::None
    }

    /// Whether this node alone is well formed; children are not inspected.
    pub fn is_complete(&self) -> bool {
        if self.group == GroupState::Unclosed {
            return false;
        }

        match &self.kind {
            QueryNodeKind::Operator(operator) => {
                operator.right.is_some() && (operator.left.is_some() != operator.op.is_unary())
            }
            _ => true,
        }
    }

    pub fn is_complete_recursive(&self) -> bool {
        if !self.is_complete() {
            return false;
        }

        match &self.kind {
            QueryNodeKind::Operator(operator) => [&operator.left, &operator.right]
                .into_iter()
                .flatten()
                .all(|child| child.is_complete_recursive()),
            _ => true,
        }
    }

    fn label(&self) -> String {
        let label = match &self.kind {
            QueryNodeKind::Token { name, ids } => {
                let mut text = format!("\"{name}");
                for id in ids {
                    text.push(TOKEN_ID_DELIMITER);
                    text.push_str(&id.to_string());
                }
                text.push('"');
                text
            }
            QueryNodeKind::Command { name, .. } => format!("'{name}'"),
            QueryNodeKind::Operator(operator) => operator.op.as_char().to_string(),
        };

        if self.is_group() {
            format!("({label})")
        } else {
            label
        }
    }

    fn print(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let left = match &self.kind {
            QueryNodeKind::Operator(operator) => operator.left.as_deref(),
            _ => None,
        };
        if let Some(left) = left {
            left.print(f, depth + 1)?;
        }

        write!(f, "{}{}", "\t".repeat(depth), self.label())?;
        if let QueryNodeKind::Operator(operator) = &self.kind
            && operator.implicit
        {
            write!(f, " IMPLICIT")?;
        }
        if !self.is_complete() {
            write!(f, " INVALID")?;
        }
        writeln!(f)?;

        if let QueryNodeKind::Operator(operator) = &self.kind
            && let Some(right) = operator.right.as_deref()
        {
            right.print(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Parsed form of a query string.
///
/// `Display` prints the token list on the first line followed by an in-order dump of the
/// tree, one node per line and one tab of indentation per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTree {
    tokens: Vec<String>,
    root: Option<QueryNode>,
    valid: bool,
}

impl QueryTree {
    pub fn new(query: &str) -> Self {
        let tokens = tokenize_query(query);
        let (root, well_formed) = Parser::new(&tokens).parse_query();
        let valid = well_formed && root.as_ref().is_some_and(QueryNode::is_complete_recursive);

        Self {
            tokens,
            root,
            valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn root(&self) -> Option<&QueryNode> {
        self.root.as_ref()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))?;
        if !self.valid {
            write!(f, " INVALID")?;
        }
        writeln!(f)?;

        if let Some(root) = &self.root {
            root.print(f, 0)?;
        }
        Ok(())
    }
}
