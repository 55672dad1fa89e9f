//! Import-alias discovery.
//!
//! Given a source file and the entry points of a [`CallTarget`], this
//! produces every spelling a call to one of those entry points can take
//! in that file: the bare name, the fully qualified path, and whatever
//! the file's `use` declarations rename things to. The rest of the
//! call-site machinery consumes only the returned set, so the scan can
//! be replaced wholesale for another surface syntax.

use std::collections::BTreeSet;

use scry_lexer::{tokenize, Token, TokenSpan};

use crate::CallTarget;

#[derive(Debug)]
struct UseLeaf {
    path: Vec<String>,
    alias: Option<String>,
    glob: bool,
}

/// Collect every spelling by which one of the target's entry points can
/// be invoked in `source`.
pub fn discover(source: &str, target: &CallTarget) -> BTreeSet<String> {
    let (tokens, _) = tokenize(source);
    let mut out = BTreeSet::new();

    for name in target.names {
        out.insert((*name).to_string());
        out.insert(format!("{}::{}", target.crate_name, name));
        out.insert(format!("crate::{}", name));
    }

    let mut leaves = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].token == Token::Use {
            i = parse_tree(&tokens, i + 1, &[], &mut leaves);
        } else {
            i += 1;
        }
    }

    for leaf in &leaves {
        apply(&mut out, leaf, target);
    }
    out
}

fn apply(out: &mut BTreeSet<String>, leaf: &UseLeaf, target: &CallTarget) {
    let Some(last) = leaf.path.last() else {
        return;
    };

    if leaf.glob {
        // `use scry_inspect::*;` makes every entry point visible bare.
        if last == target.crate_name {
            for name in target.names {
                out.insert((*name).to_string());
            }
        }
        return;
    }

    if target.names.contains(&last.as_str()) {
        out.insert(leaf.alias.clone().unwrap_or_else(|| last.clone()));
    }

    if last == target.crate_name {
        let module = leaf.alias.clone().unwrap_or_else(|| last.clone());
        for name in target.names {
            out.insert(format!("{}::{}", module, name));
        }
    }
}

/// Parse one use-tree starting at `i`, pushing every leaf it declares.
/// Returns the index just past the parsed tree. Unknown tokens end the
/// tree; the caller resumes its outer scan from the returned index.
fn parse_tree(
    tokens: &[TokenSpan],
    mut i: usize,
    prefix: &[String],
    leaves: &mut Vec<UseLeaf>,
) -> usize {
    let mut path: Vec<String> = prefix.to_vec();
    loop {
        match tokens.get(i).map(|t| &t.token) {
            Some(Token::Ident(name)) => {
                path.push(name.clone());
                i += 1;
            }
            Some(Token::Crate) => {
                path.push("crate".to_string());
                i += 1;
            }
            Some(Token::Super) => {
                path.push("super".to_string());
                i += 1;
            }
            Some(Token::SelfKw) => {
                // `use a::b::{self}` imports the module `b` itself.
                i += 1;
                let (alias, next) = parse_alias(tokens, i);
                leaves.push(UseLeaf {
                    path,
                    alias,
                    glob: false,
                });
                return next;
            }
            Some(Token::Star) => {
                leaves.push(UseLeaf {
                    path,
                    alias: None,
                    glob: true,
                });
                return i + 1;
            }
            Some(Token::LBrace) => {
                i += 1;
                loop {
                    match tokens.get(i).map(|t| &t.token) {
                        Some(Token::RBrace) => return i + 1,
                        Some(Token::Comma) => i += 1,
                        Some(_) => {
                            let next = parse_tree(tokens, i, &path, leaves);
                            if next == i {
                                // no progress; skip the stray token
                                i += 1;
                            } else {
                                i = next;
                            }
                        }
                        None => return i,
                    }
                }
            }
            _ => return i,
        }

        match tokens.get(i).map(|t| &t.token) {
            Some(Token::PathSep) => i += 1,
            Some(Token::As) => {
                let (alias, next) = parse_alias(tokens, i);
                leaves.push(UseLeaf {
                    path,
                    alias,
                    glob: false,
                });
                return next;
            }
            _ => {
                leaves.push(UseLeaf {
                    path,
                    alias: None,
                    glob: false,
                });
                return i;
            }
        }
    }
}

/// Parse an optional `as name` suffix at `i`.
fn parse_alias(tokens: &[TokenSpan], i: usize) -> (Option<String>, usize) {
    if tokens.get(i).map(|t| &t.token) != Some(&Token::As) {
        return (None, i);
    }
    match tokens.get(i + 1).map(|t| &t.token) {
        Some(Token::Ident(name)) => (Some(name.clone()), i + 2),
        // `as _` imports the trait anonymously; nothing to call by name
        Some(Token::Underscore) => (None, i + 2),
        _ => (None, i + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: CallTarget = CallTarget {
        crate_name: "scry_inspect",
        names: &["scry", "inspect"],
    };

    #[test]
    fn test_baseline_spellings_without_imports() {
        let found = discover("fn main() {}", &TARGET);
        assert!(found.contains("scry"));
        assert!(found.contains("scry_inspect::scry"));
        assert!(found.contains("crate::inspect"));
    }

    #[test]
    fn test_plain_import() {
        let found = discover("use scry_inspect::scry;\n", &TARGET);
        assert!(found.contains("scry"));
    }

    #[test]
    fn test_renamed_import() {
        let found = discover("use scry_inspect::scry as dbg;\n", &TARGET);
        assert!(found.contains("dbg"));
    }

    #[test]
    fn test_module_alias() {
        let found = discover("use scry_inspect as si;\n", &TARGET);
        assert!(found.contains("si::scry"));
        assert!(found.contains("si::inspect"));
    }

    #[test]
    fn test_brace_group_with_rename_and_self() {
        let found = discover("use scry_inspect::{self, scry as s2, inspect};\n", &TARGET);
        assert!(found.contains("s2"));
        assert!(found.contains("inspect"));
        assert!(found.contains("scry_inspect::scry"));
    }

    #[test]
    fn test_glob_import() {
        let found = discover("use scry_inspect::*;\n", &TARGET);
        assert!(found.contains("scry"));
        assert!(found.contains("inspect"));
    }

    #[test]
    fn test_unrelated_imports_add_nothing_odd() {
        let found = discover("use std::collections::HashMap;\n", &TARGET);
        assert!(!found.contains("HashMap"));
    }
}
