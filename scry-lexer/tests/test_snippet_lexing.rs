use scry_lexer::{scan, tokenize, Balance, Lexer, Token};

#[test]
fn test_multiline_call_becomes_balanced_as_lines_are_added() {
    let lines = ["v(", "    foo,", "    bar,", ")"];

    let mut snippet = String::new();
    let mut balanced_at = None;
    for (i, line) in lines.iter().enumerate() {
        if !snippet.is_empty() {
            snippet.push('\n');
        }
        snippet.push_str(line);
        let (tokens, errors) = tokenize(&snippet);
        if errors.is_empty() && scan(&tokens).is_balanced() {
            balanced_at = Some(i);
            break;
        }
    }

    assert_eq!(balanced_at, Some(3));
}

#[test]
fn test_string_spanning_lines_is_one_token() {
    let source = "f(\"first\nsecond\")";
    let (tokens, errors) = tokenize(source);
    assert!(errors.is_empty());
    let strings: Vec<_> = tokens.iter().filter(|t| t.token.is_string()).collect();
    assert_eq!(strings.len(), 1);
    assert_eq!(strings[0].text(source), "\"first\nsecond\"");
}

#[test]
fn test_snippet_cut_mid_string_is_incomplete() {
    let (_, errors) = tokenize("f(\"first");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_unterminated());
}

#[test]
fn test_semicolons_inside_strings_are_opaque() {
    let (tokens, errors) = tokenize(r#"g("a;b"); h(c)"#);
    assert!(errors.is_empty());
    let semis = tokens
        .iter()
        .filter(|t| t.token == Token::Semicolon)
        .count();
    assert_eq!(semis, 1);
}

#[test]
fn test_comment_tokens_are_flagged() {
    let source = "f(a) // trailing\n/* block */ g(b)";
    let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap()).collect();
    let comments: Vec<_> = tokens.iter().filter(|t| t.token.is_comment()).collect();
    assert_eq!(comments.len(), 2);
    assert_eq!(
        scan(&tokens),
        Balance::Balanced,
        "comments must not affect nesting"
    );
}
