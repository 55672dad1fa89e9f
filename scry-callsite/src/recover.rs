//! Call-expression recovery.
//!
//! The caller location only names a file and the line the call starts
//! on. The call may span further physical lines, share its line with
//! other statements, or be spelled through an alias, so recovery works
//! in stages: grow a window of source lines until the snippet lexes
//! without unterminated constructs and balances its delimiters, split
//! it into candidate statements on top-level semicolons, and pick the
//! statement that starts with a known spelling of the entry point.
//! When that fails the whole file is retokenized and searched once
//! more; when even that fails the site is reported without argument
//! names rather than with wrong ones.

use std::collections::BTreeSet;
use std::ops::Range;

use scry_lexer::{balance, tokenize, Delim, LexError, Token, TokenSpan};

use crate::segment::segment_tokens;

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredCall {
    pub call: String,
    pub start_line: usize,
    pub stop_line: usize,
    pub args: Vec<String>,
}

impl RecoveredCall {
    fn raw(line_text: &str, line: usize) -> Self {
        Self {
            call: line_text.trim().to_string(),
            start_line: line,
            stop_line: line,
            args: Vec::new(),
        }
    }
}

/// Recover the call expression starting at 1-based `line` of `source`.
/// Returns `None` only when the line number is out of range.
pub fn recover(
    source: &str,
    line: usize,
    spellings: &BTreeSet<String>,
) -> Option<RecoveredCall> {
    let lines: Vec<&str> = source.lines().collect();
    if line == 0 || line > lines.len() {
        return None;
    }

    let mut stop = line;
    let (snippet, tokens) = loop {
        let snippet = lines.get(line - 1..stop)?.join("\n");
        let (tokens, errors) = tokenize(&snippet);
        let unterminated = errors.iter().any(LexError::is_unterminated);
        if !unterminated && balance::scan(&tokens).is_balanced() {
            break (snippet, tokens);
        }
        if stop >= lines.len() {
            log::debug!("call snippet at line {line} never balanced; keeping the raw line");
            return Some(RecoveredCall::raw(lines.get(line - 1)?, line));
        }
        stop += 1;
    };
    if stop > line {
        log::debug!("call at line {line} spans {} lines", stop - line + 1);
    }

    let candidates: Vec<Range<usize>> = split_statements(&tokens)
        .into_iter()
        .filter(|r| {
            tokens
                .get(r.clone())
                .is_some_and(|ts| ts.iter().any(|t| !t.token.is_comment()))
        })
        .collect();

    let chosen = match candidates.as_slice() {
        [] => None,
        [only] => {
            // a single statement needs no disambiguation; the spelling
            // just trims any `let x = ` style prefix when it is found
            let start = find_call_start(&tokens, only.clone(), spellings, false)
                .unwrap_or(only.start);
            Some((start, only.clone()))
        }
        many => many.iter().find_map(|r| {
            find_call_start(&tokens, r.clone(), spellings, true).map(|start| (start, r.clone()))
        }),
    };

    match chosen {
        Some((start, range)) => build_call(&tokens, start, range.end, &snippet, line),
        None => {
            log::debug!("statements at line {line} are ambiguous; retrying whole file");
            whole_file_pass(source, line, spellings).or_else(|| {
                Some(RecoveredCall {
                    call: snippet.trim().to_string(),
                    start_line: line,
                    stop_line: stop,
                    args: Vec::new(),
                })
            })
        }
    }
}

/// Split a token stream into statement ranges on top-level semicolons.
/// Separators nested inside any delimiter (or inside a string, which is
/// a single token by construction) never split.
fn split_statements(tokens: &[TokenSpan]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (i, ts) in tokens.iter().enumerate() {
        if Delim::opened_by(&ts.token).is_some() {
            depth += 1;
        } else if Delim::closed_by(&ts.token).is_some() {
            depth = depth.saturating_sub(1);
        } else if ts.token == Token::Semicolon && depth == 0 {
            if i > start {
                out.push(start..i);
            }
            start = i + 1;
        }
    }
    if start < tokens.len() {
        out.push(start..tokens.len());
    }
    out
}

/// Find the token index where a call to one of the spellings begins
/// within `range`. With `anchored` the spelling must be the statement's
/// first non-comment token (the starts-with rule used to pick between
/// sibling statements); without it the first occurrence anywhere wins.
fn find_call_start(
    tokens: &[TokenSpan],
    range: Range<usize>,
    spellings: &BTreeSet<String>,
    anchored: bool,
) -> Option<usize> {
    let parsed: Vec<Vec<&str>> = spellings.iter().map(|s| s.split("::").collect()).collect();
    let mut positions = range
        .clone()
        .filter(|&i| tokens.get(i).is_some_and(|t| !t.token.is_comment()));
    if anchored {
        let first = positions.next()?;
        return parsed
            .iter()
            .any(|segs| spelling_at(tokens, first, segs, range.end))
            .then_some(first);
    }
    positions.find(|&i| parsed.iter().any(|segs| spelling_at(tokens, i, segs, range.end)))
}

/// True when `segs` (a `::`-separated spelling), optionally followed by
/// `!`, and then an opening paren, sits at token index `i`.
fn spelling_at(tokens: &[TokenSpan], i: usize, segs: &[&str], limit: usize) -> bool {
    let mut j = i;
    for (k, seg) in segs.iter().enumerate() {
        if k > 0 {
            if j >= limit || tokens.get(j).map(|t| &t.token) != Some(&Token::PathSep) {
                return false;
            }
            j += 1;
        }
        match tokens.get(j).map(|t| &t.token) {
            Some(Token::Ident(name)) if name == seg && j < limit => j += 1,
            Some(Token::Crate) if *seg == "crate" && j < limit => j += 1,
            _ => return false,
        }
    }
    if tokens.get(j).map(|t| &t.token) == Some(&Token::Bang) {
        j += 1;
    }
    j < limit && tokens.get(j).map(|t| &t.token) == Some(&Token::LParen)
}

fn build_call(
    tokens: &[TokenSpan],
    start: usize,
    end: usize,
    snippet: &str,
    first_line: usize,
) -> Option<RecoveredCall> {
    let first = tokens.get(start)?;
    let last = tokens.get(end.checked_sub(1)?)?;
    let call = snippet
        .get(first.span.start..last.span.end)?
        .trim()
        .to_string();
    let args = segment_tokens(tokens.get(start..end)?, snippet);
    let lines_before = |offset: usize| {
        snippet
            .get(..offset)
            .map_or(0, |s| s.matches('\n').count())
    };
    Some(RecoveredCall {
        call,
        start_line: first_line + lines_before(first.span.start),
        stop_line: first_line + lines_before(last.span.end),
        args,
    })
}

/// Second pass: retokenize the whole file and look for a spelled call
/// starting on the reported line.
fn whole_file_pass(
    source: &str,
    line: usize,
    spellings: &BTreeSet<String>,
) -> Option<RecoveredCall> {
    let (tokens, _) = tokenize(source);
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(|l| l.len())
        .sum();
    let line_end = line_start + source.lines().nth(line - 1).map_or(0, |l| l.len());
    let parsed: Vec<Vec<&str>> = spellings.iter().map(|s| s.split("::").collect()).collect();

    for i in 0..tokens.len() {
        let ts = tokens.get(i)?;
        if ts.span.start < line_start {
            continue;
        }
        if ts.span.start > line_end {
            break;
        }
        if ts.token.is_comment() {
            continue;
        }
        if !parsed
            .iter()
            .any(|segs| spelling_at(&tokens, i, segs, tokens.len()))
        {
            continue;
        }

        // walk to the matching close of the call's first open paren
        let open = tokens
            .iter()
            .skip(i)
            .position(|t| t.token == Token::LParen)?
            + i;
        let mut depth: usize = 0;
        let mut close = None;
        for (j, t) in tokens.iter().enumerate().skip(open) {
            if Delim::opened_by(&t.token).is_some() {
                depth += 1;
            } else if Delim::closed_by(&t.token).is_some() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(j);
                    break;
                }
            }
        }
        let close = close?;
        let first = tokens.get(i)?;
        let last = tokens.get(close)?;
        let call = source
            .get(first.span.start..last.span.end)?
            .trim()
            .to_string();
        let args = segment_tokens(tokens.get(i..=close)?, source);
        let lines_before =
            |offset: usize| source.get(..offset).map_or(0, |s| s.matches('\n').count());
        return Some(RecoveredCall {
            call,
            start_line: 1 + lines_before(first.span.start),
            stop_line: 1 + lines_before(last.span.end),
            args,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spellings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_line_call() {
        let source = "fn main() {\n    scry!(a, b);\n}\n";
        let found = recover(source, 2, &spellings(&["scry"])).unwrap();
        assert_eq!(found.call, "scry!(a, b)");
        assert_eq!(found.args, vec!["a", "b"]);
        assert_eq!(found.start_line, 2);
        assert_eq!(found.stop_line, 2);
    }

    #[test]
    fn test_multiline_call_recovery() {
        let source = "v(\n    foo,\n    bar,\n)\n";
        let found = recover(source, 1, &spellings(&["v"])).unwrap();
        assert_eq!(found.call, "v(\n    foo,\n    bar,\n)");
        assert_eq!(found.args, vec!["foo", "bar"]);
        assert_eq!(found.start_line, 1);
        assert_eq!(found.stop_line, 4);
    }

    #[test]
    fn test_semicolon_separated_statements_disambiguate() {
        let source = "let a = 1; scry!(a); let b = 2;\n";
        let found = recover(source, 1, &spellings(&["scry"])).unwrap();
        assert_eq!(found.call, "scry!(a)");
        assert_eq!(found.args, vec!["a"]);
    }

    #[test]
    fn test_assignment_prefix_is_trimmed() {
        let source = "let out = scry_str!(x, y);\n";
        let found = recover(source, 1, &spellings(&["scry_str"])).unwrap();
        assert_eq!(found.call, "scry_str!(x, y)");
        assert_eq!(found.args, vec!["x", "y"]);
    }

    #[test]
    fn test_qualified_spelling() {
        let source = "scry_inspect::scry!(value);\n";
        let found = recover(source, 1, &spellings(&["scry", "scry_inspect::scry"])).unwrap();
        assert_eq!(found.call, "scry_inspect::scry!(value)");
        assert_eq!(found.args, vec!["value"]);
    }

    #[test]
    fn test_rebound_callable_degrades_to_no_names() {
        // two statements, neither starting with a known spelling
        let source = "let g = helper; g(1, 2); h(3);\n";
        let found = recover(source, 1, &spellings(&["scry"])).unwrap();
        assert!(found.args.is_empty());
    }

    #[test]
    fn test_string_with_semicolon_does_not_split() {
        let source = "scry!(\"a;b\", c);\n";
        let found = recover(source, 1, &spellings(&["scry"])).unwrap();
        assert_eq!(found.args, vec!["", "c"]);
    }

    #[test]
    fn test_unbalanced_to_end_of_file_keeps_raw_line() {
        let source = "scry!(a,\n";
        let found = recover(source, 1, &spellings(&["scry"])).unwrap();
        assert_eq!(found.call, "scry!(a,");
        assert!(found.args.is_empty());
    }

    #[test]
    fn test_line_out_of_range() {
        assert!(recover("scry!(a)\n", 9, &spellings(&["scry"])).is_none());
    }

    #[test]
    fn test_whole_file_pass_rescues_inner_call() {
        // the statement does not start with the spelling and shares its
        // line with another statement, so the first pass cannot choose
        let source = "let a = 1; let b = scry!(x);\n";
        let found = recover(source, 1, &spellings(&["scry"])).unwrap();
        assert_eq!(found.call, "scry!(x)");
        assert_eq!(found.args, vec!["x"]);
    }
}
