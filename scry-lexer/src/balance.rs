//! Delimiter-nesting scan over a token stream.
//!
//! Used to decide whether a snippet of source text is syntactically
//! complete: every open paren/bracket/brace has its matching closer.
//! Stray closers are tolerated (a snippet may begin mid-block); only
//! unclosed openers make a snippet incomplete.

use crate::{Token, TokenSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    pub fn opened_by(token: &Token) -> Option<Delim> {
        match token {
            Token::LParen => Some(Delim::Paren),
            Token::LBracket => Some(Delim::Bracket),
            Token::LBrace => Some(Delim::Brace),
            _ => None,
        }
    }

    pub fn closed_by(token: &Token) -> Option<Delim> {
        match token {
            Token::RParen => Some(Delim::Paren),
            Token::RBracket => Some(Delim::Bracket),
            Token::RBrace => Some(Delim::Brace),
            _ => None,
        }
    }

    pub fn open_char(self) -> char {
        match self {
            Delim::Paren => '(',
            Delim::Bracket => '[',
            Delim::Brace => '{',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Delim::Paren => ')',
            Delim::Bracket => ']',
            Delim::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Balance {
    Balanced,
    /// The stack of delimiters still open at the end of the stream,
    /// outermost first.
    Unclosed(Vec<Delim>),
}

impl Balance {
    pub fn is_balanced(&self) -> bool {
        matches!(self, Balance::Balanced)
    }
}

/// Scan a token stream for unclosed delimiters. A closer that does not
/// match the innermost open delimiter is ignored rather than treated as
/// an error.
pub fn scan(tokens: &[TokenSpan]) -> Balance {
    let mut stack: Vec<Delim> = Vec::new();
    for ts in tokens {
        if let Some(delim) = Delim::opened_by(&ts.token) {
            stack.push(delim);
        } else if let Some(delim) = Delim::closed_by(&ts.token) {
            if stack.last() == Some(&delim) {
                stack.pop();
            }
        }
    }
    if stack.is_empty() {
        Balance::Balanced
    } else {
        Balance::Unclosed(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn scan_source(source: &str) -> Balance {
        let tokens: Vec<_> = Lexer::new(source).filter_map(|r| r.ok()).collect();
        scan(&tokens)
    }

    #[test]
    fn test_balanced_call() {
        assert!(scan_source("f(a, [1, 2], {3})").is_balanced());
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            scan_source("f(a, [1, 2]"),
            Balance::Unclosed(vec![Delim::Paren])
        );
    }

    #[test]
    fn test_nested_unclosed() {
        assert_eq!(
            scan_source("f([{"),
            Balance::Unclosed(vec![Delim::Paren, Delim::Bracket, Delim::Brace])
        );
    }

    #[test]
    fn test_stray_closer_tolerated() {
        // A snippet starting mid-block may open with closers.
        assert!(scan_source("}); g(x)").is_balanced());
    }

    #[test]
    fn test_bracket_inside_string_does_not_count() {
        assert!(scan_source(r#"f("([{")"#).is_balanced());
    }
}
