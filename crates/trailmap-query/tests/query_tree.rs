use trailmap_query::QueryTree;

fn printed(query: &str) -> String {
    QueryTree::new(query).to_string()
}

#[test]
fn test_empty_query() {
    assert_eq!(printed(""), " INVALID\n");
}

#[test]
fn test_invalid_query() {
    assert_eq!(printed(" -"), "- INVALID\n\"-\"\n");
}

#[test]
fn test_command_query() {
    assert_eq!(printed("'class'"), "'class'\n'class'\n");
    assert!(QueryTree::new("'class'").is_valid());
}

#[test]
fn test_undelimited_text_is_invalid() {
    assert_eq!(printed("banana"), "banana INVALID\n\"banana\"\n");
}

#[test]
fn test_token_query() {
    assert_eq!(printed("\"A\""), "\"A\"\n\"A\"\n");
}

#[test]
fn test_invalid_token_query() {
    assert_eq!(printed("\"A"), "\"A INVALID\n\"A\"\n");
    assert_eq!(printed("\"\""), "\"\" INVALID\n\"\"\n");
    assert_eq!(
        printed("A\""),
        concat!("A \" INVALID\n", "\t\"A\"\n", ". IMPLICIT\n", "\t\"\"\n")
    );
}

#[test]
fn test_token_query_with_ids() {
    assert_eq!(printed("\"A,1\""), "\"A,1\"\n\"A,1\"\n");
    assert_eq!(printed("\"A,1,2\""), "\"A,1,2\"\n\"A,1,2\"\n");
}

#[test]
fn test_operator_not_query() {
    assert_eq!(printed("!'field'"), concat!("! 'field'\n", "!\n", "\t'field'\n"));
    assert_eq!(
        printed("!!'field'"),
        concat!("! ! 'field'\n", "!\n", "\t!\n", "\t\t'field'\n")
    );
}

#[test]
fn test_invalid_operator_not_query() {
    assert_eq!(printed("!"), "! INVALID\n! INVALID\n");
    assert_eq!(
        printed("'field'!"),
        concat!("'field' ! INVALID\n", "\t'field'\n", "! INVALID\n")
    );
}

#[test]
fn test_operator_sub_query() {
    assert_eq!(
        printed("\"A\".\"B\""),
        concat!("\"A\" . \"B\"\n", "\t\"A\"\n", ".\n", "\t\"B\"\n")
    );
}

#[test]
fn test_invalid_operator_sub_query() {
    assert_eq!(
        printed("\"A\"."),
        concat!("\"A\" . INVALID\n", "\t\"A\"\n", ". INVALID\n")
    );
    assert_eq!(printed("."), ". INVALID\n. INVALID\n");
    assert_eq!(
        printed(".\"A\""),
        concat!(". \"A\" INVALID\n", ". INVALID\n", "\t\"A\"\n")
    );
    assert_eq!(
        printed("\"A\"..\"B\""),
        concat!(
            "\"A\" . . \"B\" INVALID\n",
            "\t\"A\"\n",
            ".\n",
            "\t. INVALID\n",
            "\t\t\"B\"\n"
        )
    );
}

#[test]
fn test_binary_operator_queries() {
    assert_eq!(
        printed("\"A\":\"B\""),
        concat!("\"A\" : \"B\"\n", "\t\"A\"\n", ":\n", "\t\"B\"\n")
    );
    assert_eq!(
        printed("\"A\"&\"B\""),
        concat!("\"A\" & \"B\"\n", "\t\"A\"\n", "&\n", "\t\"B\"\n")
    );
    assert_eq!(
        printed("\"A\"|\"B\""),
        concat!("\"A\" | \"B\"\n", "\t\"A\"\n", "|\n", "\t\"B\"\n")
    );
}

#[test]
fn test_operator_group_query() {
    assert_eq!(printed("(\"A\")"), "( \"A\" )\n(\"A\")\n");
    assert_eq!(
        printed("(\"A\"|\"B\")"),
        concat!("( \"A\" | \"B\" )\n", "\t\"A\"\n", "(|)\n", "\t\"B\"\n")
    );
}

#[test]
fn test_invalid_operator_group_query() {
    assert_eq!(printed("()"), "( ) INVALID\n");
    assert_eq!(printed("(\"A\""), "( \"A\" INVALID\n(\"A\") INVALID\n");
    assert_eq!(printed("\"A\")"), "\"A\" ) INVALID\n");
    assert_eq!(printed(")("), ") ( INVALID\n");
    assert!(QueryTree::new(")(").root().is_none());
}

#[test]
fn test_implicit_operator_sub_query() {
    assert_eq!(
        printed("\"A\"(\"B\")"),
        concat!("\"A\" ( \"B\" )\n", "\t\"A\"\n", ". IMPLICIT\n", "\t(\"B\")\n")
    );
}

#[test]
fn test_operator_precedence_not_before_sub() {
    assert_eq!(
        printed("!'method'.!'const'"),
        concat!(
            "! 'method' . ! 'const'\n",
            "\t!\n",
            "\t\t'method'\n",
            ".\n",
            "\t!\n",
            "\t\t'const'\n"
        )
    );
}

#[test]
fn test_operator_precedence_sub_before_has() {
    assert_eq!(
        printed("'namespace'.'class':'method'"),
        concat!(
            "'namespace' . 'class' : 'method'\n",
            "\t\t'namespace'\n",
            "\t.\n",
            "\t\t'class'\n",
            ":\n",
            "\t'method'\n"
        )
    );
}

#[test]
fn test_operator_precedence_has_before_or() {
    assert_eq!(
        printed("'class':'method'|'field'"),
        concat!(
            "'class' : 'method' | 'field'\n",
            "\t\t'class'\n",
            "\t:\n",
            "\t\t'method'\n",
            "|\n",
            "\t'field'\n"
        )
    );
}

#[test]
fn test_operator_precedence_respects_groups() {
    assert_eq!(
        printed("'namespace'.('class':'method')"),
        concat!(
            "'namespace' . ( 'class' : 'method' )\n",
            "\t'namespace'\n",
            ".\n",
            "\t\t'class'\n",
            "\t(:)\n",
            "\t\t'method'\n"
        )
    );
    assert_eq!(
        printed("'class':('method'|'field')"),
        concat!(
            "'class' : ( 'method' | 'field' )\n",
            "\t'class'\n",
            ":\n",
            "\t\t'method'\n",
            "\t(|)\n",
            "\t\t'field'\n"
        )
    );
}

#[test]
fn test_spaces_get_stripped_out_of_query() {
    assert_eq!(
        printed("  \"Field  \":('method' | 'field')   .'const' |  'public' "),
        concat!(
            "\"Field\" : ( 'method' | 'field' ) . 'const' | 'public'\n",
            "\t\t\"Field\"\n",
            "\t:\n",
            "\t\t\t\t'method'\n",
            "\t\t\t(|)\n",
            "\t\t\t\t'field'\n",
            "\t\t.\n",
            "\t\t\t'const'\n",
            "|\n",
            "\t'public'\n"
        )
    );
}
