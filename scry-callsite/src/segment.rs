//! Argument segmentation for a balanced call expression.
//!
//! A single left-to-right token scan with an explicit stack of expected
//! closers, seeded by the first `(`. Commas split arguments only while
//! the stack holds exactly that seed; everything nested deeper,
//! including quoted text, is opaque. The returned strings are verbatim
//! source substrings (recovered from token spans, so original spacing
//! survives), trimmed at the edges.

use scry_lexer::{tokenize, Token, TokenSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Paren,
    Bracket,
    Brace,
    Angle,
}

/// Segment a call expression given as text.
pub fn segment_args(call_text: &str) -> Vec<String> {
    let (tokens, _) = tokenize(call_text);
    segment_tokens(&tokens, call_text)
}

/// Segment a call expression given as tokens over `source`.
///
/// An argument whose root-level content is nothing but string literals
/// is reported as the empty string: a literal has no variable name
/// worth displaying.
pub fn segment_tokens(tokens: &[TokenSpan], source: &str) -> Vec<String> {
    let mut seed = None;
    for (i, ts) in tokens.iter().enumerate() {
        match ts.token {
            Token::Semicolon => return Vec::new(),
            Token::LParen => {
                seed = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(seed) = seed else {
        return Vec::new();
    };

    let mut stack = vec![Closer::Paren];
    let mut args: Vec<String> = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut all_strings = true;
    let mut prev_path_sep = false;

    let flush = |args: &mut Vec<String>, current: &mut Option<(usize, usize)>, all_strings: bool| {
        if let Some((start, end)) = current.take() {
            let text = source.get(start..end).unwrap_or("").trim().to_string();
            if all_strings {
                args.push(String::new());
            } else if !text.is_empty() {
                args.push(text);
            }
        }
    };

    for ts in tokens.iter().skip(seed + 1) {
        let tok = &ts.token;
        if tok.is_comment() {
            continue;
        }

        let at_root = stack.len() == 1;

        if at_root {
            match tok {
                Token::Comma => {
                    flush(&mut args, &mut current, all_strings);
                    all_strings = true;
                    prev_path_sep = false;
                    continue;
                }
                Token::Semicolon => break,
                _ => {}
            }
        }

        match tok {
            Token::LParen => stack.push(Closer::Paren),
            Token::LBracket => stack.push(Closer::Bracket),
            Token::LBrace => stack.push(Closer::Brace),
            // turbofish: `::<` opens an angle-bracket region so the
            // commas of `collect::<HashMap<K, V>>()` stay opaque
            Token::Lt if prev_path_sep => stack.push(Closer::Angle),
            Token::Gt if stack.last() == Some(&Closer::Angle) => {
                stack.pop();
            }
            Token::Shr if stack.last() == Some(&Closer::Angle) => {
                stack.pop();
                if stack.last() == Some(&Closer::Angle) {
                    stack.pop();
                }
            }
            Token::RParen | Token::RBracket | Token::RBrace => {
                while stack.last() == Some(&Closer::Angle) {
                    stack.pop();
                }
                let expected = match tok {
                    Token::RParen => Closer::Paren,
                    Token::RBracket => Closer::Bracket,
                    _ => Closer::Brace,
                };
                if stack.last() == Some(&expected) {
                    stack.pop();
                }
                if stack.is_empty() {
                    // the seed's matching close
                    break;
                }
            }
            _ => {}
        }

        current = match current {
            None => Some((ts.span.start, ts.span.end)),
            Some((start, _)) => Some((start, ts.span.end)),
        };
        if !tok.is_string() {
            all_strings = false;
        }
        prev_path_sep = matches!(tok, Token::PathSep);
    }

    flush(&mut args, &mut current, all_strings);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_arguments() {
        assert_eq!(segment_args("f(a, b, c)"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_literal_string_becomes_empty_name() {
        assert_eq!(segment_args(r#"f(1, "a,b", [2,3])"#), vec!["1", "", "[2,3]"]);
    }

    #[test]
    fn test_adjacent_string_literals_collapse() {
        assert_eq!(segment_args(r#"f("a" "b")"#), vec![""]);
    }

    #[test]
    fn test_string_inside_expression_keeps_text() {
        assert_eq!(segment_args(r#"f(g("a"))"#), vec![r#"g("a")"#]);
    }

    #[test]
    fn test_nested_brackets_do_not_split() {
        assert_eq!(
            segment_args("f([1, 2], (3, 4), {5})"),
            vec!["[1, 2]", "(3, 4)", "{5}"]
        );
    }

    #[test]
    fn test_whitespace_is_preserved_inside_arguments() {
        assert_eq!(segment_args("f(a  +  b, c)"), vec!["a  +  b", "c"]);
    }

    #[test]
    fn test_trailing_comma_adds_no_argument() {
        assert_eq!(segment_args("f(a, b,)"), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_call() {
        assert!(segment_args("f()").is_empty());
    }

    #[test]
    fn test_turbofish_commas_are_opaque() {
        assert_eq!(
            segment_args("f(xs.collect::<HashMap<K, V>>(), y)"),
            vec!["xs.collect::<HashMap<K, V>>()", "y"]
        );
    }

    #[test]
    fn test_comparison_is_not_a_bracket() {
        assert_eq!(segment_args("f(a < b, c > d)"), vec!["a < b", "c > d"]);
    }

    #[test]
    fn test_stops_at_statement_end() {
        assert_eq!(segment_args("f(a, b); g(c)"), vec!["a", "b"]);
    }

    #[test]
    fn test_semicolon_before_call_means_no_arguments() {
        assert!(segment_args("; f(a)").is_empty());
    }

    #[test]
    fn test_multiline_call_text() {
        assert_eq!(segment_args("v(\n    foo,\n    bar,\n)"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_closure_argument_survives() {
        assert_eq!(
            segment_args("f(|x| x + 1, ys.iter().map(|y| (y, 1)))"),
            vec!["|x| x + 1", "ys.iter().map(|y| (y, 1))"]
        );
    }
}
