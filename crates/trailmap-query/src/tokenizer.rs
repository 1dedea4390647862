pub const TOKEN_BOUNDARY: char = '"';
pub const COMMAND_BOUNDARY: char = '\'';
pub const TOKEN_ID_DELIMITER: char = ',';

pub const GROUP_START: char = '(';
pub const GROUP_END: char = ')';

/// Characters that always form a token of their own outside of literals.
pub const OPERATOR_CHARS: [char; 7] = ['!', '.', ':', '&', '|', GROUP_START, GROUP_END];

pub fn is_boundary(c: char) -> bool {
    c == TOKEN_BOUNDARY || c == COMMAND_BOUNDARY
}

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

/// Splits a query into literals and operator tokens.
///
/// Whitespace outside of literals is dropped. A literal starts at `"` or `'` and runs to
/// the next occurrence of the same character or to the end of the query; its text keeps
/// inner whitespace and loses leading and trailing whitespace.
pub fn tokenize_query(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut literal: Option<(char, String)> = None;

    for c in query.chars() {
        if let Some((boundary, text)) = literal.as_mut() {
            if c == *boundary {
                tokens.push(format!("{boundary}{}{boundary}", text.trim()));
                literal = None;
            } else {
                text.push(c);
            }
            continue;
        }

        if c.is_whitespace() {
            continue;
        }

        if is_boundary(c) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            literal = Some((c, String::new()));
        } else if is_operator_char(c) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else {
            current.push(c);
        }
    }

    if let Some((boundary, text)) = literal {
        tokens.push(format!("{boundary}{}", text.trim()));
    } else if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_split_literals() {
        assert_eq!(
            tokenize_query("'class':'method'|\"A::b,4\""),
            vec!["'class'", ":", "'method'", "|", "\"A::b,4\""]
        );
        assert!(tokenize_query("").is_empty());
    }

    #[test]
    fn test_whitespace_is_stripped_outside_literals() {
        assert_eq!(
            tokenize_query("  \"Field  \" . ( 'a' ) "),
            vec!["\"Field\"", ".", "(", "'a'", ")"]
        );
        assert_eq!(tokenize_query("a b . c"), vec!["ab", ".", "c"]);
    }

    #[test]
    fn test_inner_literal_whitespace_is_kept() {
        assert_eq!(
            tokenize_query("\" unsigned int \" | \"operator new\""),
            vec!["\"unsigned int\"", "|", "\"operator new\""]
        );
        assert_eq!(
            tokenize_query("\"std::map<int, int>,7\""),
            vec!["\"std::map<int, int>,7\""]
        );
        assert_eq!(tokenize_query("'non  indexed'"), vec!["'non  indexed'"]);
        assert_eq!(tokenize_query("\"open text "), vec!["\"open text"]);
    }

    #[test]
    fn test_unterminated_and_undelimited_text() {
        assert_eq!(tokenize_query("A\""), vec!["A", "\""]);
        assert_eq!(tokenize_query("ab!cd"), vec!["ab", "!", "cd"]);
        assert_eq!(tokenize_query("'it\"s"), vec!["'it\"s"]);
        assert!(tokenize_query(" \t\n").is_empty());
    }
}
