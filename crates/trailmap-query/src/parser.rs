use crate::query::{GroupState, OperatorKind, QueryNode, QueryNodeKind, QueryOperator};
use crate::tokenizer::{
    COMMAND_BOUNDARY, GROUP_END, GROUP_START, TOKEN_BOUNDARY, TOKEN_ID_DELIMITER,
};
use trailmap_core::NodeId;

/// Recursive descent over a token list.
///
/// An operator takes everything parsed so far as its left operand and the rest of the
/// current group as its right operand; [`attach_right`] then rotates the result so that
/// loosely binding operators end up closer to the root.
pub(crate) struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
    well_formed: bool,
    aborted: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            pos: 0,
            well_formed: true,
            aborted: false,
        }
    }

    /// Returns the root and whether every literal and group was well formed.
    pub(crate) fn parse_query(mut self) -> (Option<QueryNode>, bool) {
        let root = self.parse(None, false);
        if self.aborted {
            return (None, false);
        }
        (root, self.well_formed)
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn parse(&mut self, mut node: Option<QueryNode>, in_group: bool) -> Option<QueryNode> {
        while let Some(token) = self.peek() {
            if self.aborted {
                return None;
            }

            if is_group_end(token) {
                if !in_group {
                    tracing::debug!("Unmatched '{}' in query", GROUP_END);
                    self.aborted = true;
                }
                return node;
            }

            if let Some(op) = single_char(token).and_then(OperatorKind::from_char) {
                self.pos += 1;
                let operator = QueryOperator {
                    op,
                    implicit: false,
                    left: node.take().map(Box::new),
                    right: None,
                };
                let right = self.parse(None, in_group);
                return Some(attach_right(operator, right));
            }

            let primary = self.parse_primary()?;
            match node.take() {
                None => node = Some(primary),
                Some(left) => {
                    let operator = QueryOperator {
                        op: OperatorKind::Sub,
                        implicit: true,
                        left: Some(Box::new(left)),
                        right: None,
                    };
                    let right = self.parse(Some(primary), in_group);
                    return Some(attach_right(operator, right));
                }
            }
        }
        node
    }

    fn parse_primary(&mut self) -> Option<QueryNode> {
        let token = self.peek()?;
        self.pos += 1;

        if single_char(token) != Some(GROUP_START) {
            let (node, valid) = parse_literal(token);
            self.well_formed &= valid;
            return Some(node);
        }

        let Some(mut inner) = self.parse(None, true) else {
            tracing::debug!("Empty group in query");
            self.aborted = true;
            return None;
        };

        if self.peek().is_some_and(is_group_end) {
            self.pos += 1;
            inner.group = GroupState::Closed;
        } else {
            inner.group = GroupState::Unclosed;
        }
        Some(inner)
    }
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn is_group_end(token: &str) -> bool {
    single_char(token) == Some(GROUP_END)
}

/// Makes `right` the right operand of `operator`, unless `right` is an ungrouped operator
/// that binds more loosely. In that case `operator` is pushed down into its left operand.
fn attach_right(mut operator: QueryOperator, right: Option<QueryNode>) -> QueryNode {
    match right {
        Some(QueryNode {
            kind: QueryNodeKind::Operator(mut outer),
            group: GroupState::None,
        }) if outer.op > operator.op => {
            let left = outer.left.take().map(|left| *left);
            outer.left = Some(Box::new(attach_right(operator, left)));
            QueryNode::operator(outer)
        }
        right => {
            operator.right = right.map(Box::new);
            QueryNode::operator(operator)
        }
    }
}

/// Builds a leaf from a literal token. Undelimited, unterminated and empty literals still
/// produce a leaf but are reported as not well formed.
pub(crate) fn parse_literal(token: &str) -> (QueryNode, bool) {
    let Some(boundary) = token.chars().next().filter(|&c| c == TOKEN_BOUNDARY || c == COMMAND_BOUNDARY)
    else {
        let (name, ids) = split_token_ids(token);
        return (QueryNode::token(name, ids), false);
    };

    let rest = &token[boundary.len_utf8()..];
    let (text, valid) = match rest.strip_suffix(boundary) {
        Some(text) => (text, !text.is_empty()),
        None => (rest, false),
    };

    let node = if boundary == COMMAND_BOUNDARY {
        QueryNode::command(text)
    } else {
        let (name, ids) = split_token_ids(text);
        QueryNode::token(name, ids)
    };
    (node, valid)
}

/// Splits trailing `,id` parts off a token text.
fn split_token_ids(text: &str) -> (String, Vec<NodeId>) {
    let mut name = text;
    let mut ids = Vec::new();
    while let Some((head, tail)) = name.rsplit_once(TOKEN_ID_DELIMITER)
        && let Ok(id) = tail.parse::<i64>()
    {
        ids.push(NodeId(id));
        name = head;
    }
    ids.reverse();
    (name.to_string(), ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_token_ids() {
        assert_eq!(split_token_ids("A"), ("A".to_string(), vec![]));
        assert_eq!(
            split_token_ids("A,1,2"),
            ("A".to_string(), vec![NodeId(1), NodeId(2)])
        );
        assert_eq!(
            split_token_ids("map<int,int>,7"),
            ("map<int,int>".to_string(), vec![NodeId(7)])
        );
    }

    #[test]
    fn test_parse_literal_validity() {
        let (node, valid) = parse_literal("'class'");
        assert!(valid);
        assert!(matches!(node.kind, QueryNodeKind::Command { .. }));

        assert!(!parse_literal("\"A").1);
        assert!(!parse_literal("\"\"").1);
        assert!(!parse_literal("banana").1);
        assert!(!parse_literal("'").1);
        assert!(parse_literal("\"A,1\"").1);
    }
}
