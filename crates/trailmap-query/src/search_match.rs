use crate::parser::parse_literal;
use crate::query::{OperatorKind, QueryNodeKind};
use crate::tokenizer::{
    COMMAND_BOUNDARY, GROUP_END, GROUP_START, TOKEN_BOUNDARY, TOKEN_ID_DELIMITER, tokenize_query,
};
use serde::{Deserialize, Serialize};
use trailmap_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryNodeType {
    Token,
    Command,
    Operator,
}

/// One element of a query as it appears in a search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub full_name: String,
    #[serde(default)]
    pub token_ids: Vec<NodeId>,
    pub query_node_type: QueryNodeType,
}

impl SearchMatch {
    pub fn token(full_name: impl Into<String>, token_ids: Vec<NodeId>) -> Self {
        Self {
            full_name: full_name.into(),
            token_ids,
            query_node_type: QueryNodeType::Token,
        }
    }

    pub fn command(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            token_ids: Vec::new(),
            query_node_type: QueryNodeType::Command,
        }
    }

    pub fn operator(op: char) -> Self {
        Self {
            full_name: op.to_string(),
            token_ids: Vec::new(),
            query_node_type: QueryNodeType::Operator,
        }
    }

    pub fn encode_for_query(&self) -> String {
        match self.query_node_type {
            QueryNodeType::Command => {
                format!("{COMMAND_BOUNDARY}{}{COMMAND_BOUNDARY}", self.full_name)
            }
            QueryNodeType::Operator => self.full_name.clone(),
            QueryNodeType::Token => {
                let mut text = String::new();
                text.push(TOKEN_BOUNDARY);
                text.push_str(&self.full_name);
                for id in &self.token_ids {
                    text.push(TOKEN_ID_DELIMITER);
                    text.push_str(&id.to_string());
                }
                text.push(TOKEN_BOUNDARY);
                text
            }
        }
    }

    pub fn encode_all(matches: &[SearchMatch]) -> String {
        matches.iter().map(SearchMatch::encode_for_query).collect()
    }

    /// Splits a query back into its matches. Whitespace between matches is not preserved.
    pub fn decode_from_query(query: &str) -> Vec<SearchMatch> {
        tokenize_query(query)
            .into_iter()
            .map(|token| {
                let mut chars = token.chars();
                if let (Some(c), None) = (chars.next(), chars.next())
                    && (OperatorKind::from_char(c).is_some() || c == GROUP_START || c == GROUP_END)
                {
                    return SearchMatch::operator(c);
                }

                match parse_literal(&token).0.kind {
                    QueryNodeKind::Command { name, .. } => SearchMatch::command(name),
                    QueryNodeKind::Token { name, ids } => SearchMatch::token(name, ids),
                    QueryNodeKind::Operator(_) => SearchMatch::token(token, Vec::new()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encoding_by_type() {
        assert_eq!(SearchMatch::command("class").encode_for_query(), "'class'");
        assert_eq!(
            SearchMatch::token("A::b", vec![NodeId(1), NodeId(2)]).encode_for_query(),
            "\"A::b,1,2\""
        );
        assert_eq!(SearchMatch::token("main", vec![]).encode_for_query(), "\"main\"");
        assert_eq!(SearchMatch::operator(':').encode_for_query(), ":");
    }

    #[test]
    fn test_decode_query() {
        let matches = SearchMatch::decode_from_query("'class' : \"A::b,4\" | (\"c\")");
        let types: Vec<QueryNodeType> = matches.iter().map(|m| m.query_node_type).collect();
        assert_eq!(
            types,
            vec![
                QueryNodeType::Command,
                QueryNodeType::Operator,
                QueryNodeType::Token,
                QueryNodeType::Operator,
                QueryNodeType::Operator,
                QueryNodeType::Token,
                QueryNodeType::Operator,
            ]
        );
        assert_eq!(matches[2], SearchMatch::token("A::b", vec![NodeId(4)]));
    }

    #[test]
    fn test_names_with_spaces_and_commas_survive_decoding() {
        for name in ["unsigned int", "operator new", "std::map<int, int>"] {
            let token = SearchMatch::token(name, vec![NodeId(12)]);
            assert_eq!(
                SearchMatch::decode_from_query(&token.encode_for_query()),
                vec![token]
            );

            let command = SearchMatch::command(name);
            assert_eq!(
                SearchMatch::decode_from_query(&command.encode_for_query()),
                vec![command]
            );
        }
    }

    proptest! {
        #[test]
        fn prop_encoded_matches_decode_to_themselves(
            name in "[A-Za-z_][A-Za-z0-9_:<> ,]{0,16}[A-Za-z_>]",
            ids in proptest::collection::vec(1i64..10_000, 0..4),
            command in any::<bool>(),
        ) {
            let original = if command {
                SearchMatch::command(name.clone())
            } else {
                SearchMatch::token(name.clone(), ids.into_iter().map(NodeId).collect())
            };

            let decoded = SearchMatch::decode_from_query(&original.encode_for_query());
            prop_assert_eq!(decoded, vec![original]);
        }
    }
}
