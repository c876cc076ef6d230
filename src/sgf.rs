//! Game record parsing.
//!
//! Records use the bracketed, recursively nested format of SGF:
//!
//! ```text
//! branch   := '(' ws? (command | branch)* ws? ')'
//! command  := ';'? ws? name ws? argument*
//! argument := '[' text-with-backslash-escapes ']'
//! ```
//!
//! The result is a plain tree of [`Node`]s, read-only once built.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::{
    first_of, literal, optional, regex_token, separated_repeat, sequence, terminated_string,
    Input, Pattern,
};

/// A property such as `B[dd]` or `SZ[19]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    /// Arguments with escapes resolved.
    pub args: Vec<String>,
}

impl Command {
    /// The first argument, which is the only one moves and sizes use.
    pub fn arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// One element of a record tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command(Command),
    /// A nested variation.
    Branch(Vec<Node>),
}

impl Drop for Node {
    // Flatten nested branches so dropping a deep tree does not recurse.
    fn drop(&mut self) {
        let Node::Branch(children) = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let Node::Branch(grandchildren) = &mut node {
                pending.append(grandchildren);
            }
        }
    }
}

/// The record did not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset where matching stopped.
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed game record at byte {}", self.position)
    }
}

impl std::error::Error for ParseError {}

fn whitespace_regex() -> Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s+").expect("whitespace pattern is valid"))
        .clone()
}

fn name_regex() -> Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+").expect("name pattern is valid"))
        .clone()
}

/// Resolve backslash escapes: `\x` becomes `x`.
fn unescape(raw: String) -> String {
    if !raw.contains('\\') {
        return raw;
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// One step of the record: a branch opening, a branch closing or a command.
enum Token {
    Open,
    Close,
    Command(Command),
}

/// Grammar for a single token, including the whitespace before it.
///
/// Nesting is handled by [`parse`] with an explicit stack, so arbitrarily
/// deep records never recurse.
fn token_grammar() -> Pattern<Token> {
    let ws = regex_token(whitespace_regex());

    let argument = sequence((literal("["), terminated_string(']', '\\'), literal("]")))
        .map(|(_, raw, _)| unescape(raw));

    let command = sequence((
        optional(literal(";")),
        optional(ws.clone()),
        regex_token(name_regex()),
        optional(ws.clone()),
        separated_repeat(argument, Some(optional(ws.clone()))),
    ))
    .map(|(_, _, name, _, args)| Token::Command(Command { name, args }));

    sequence((
        optional(ws),
        first_of(vec![
            literal("(").map(|_| Token::Open),
            literal(")").map(|_| Token::Close),
            command,
        ]),
    ))
    .map(|(_, token)| token)
}

/// Parse a record and return the children of its outermost branch.
///
/// Surrounding whitespace is allowed; anything else that does not belong to
/// the outermost branch makes the whole record fail. On failure the error
/// holds the furthest offset the grammar reached.
pub fn parse(text: &str) -> Result<Vec<Node>, ParseError> {
    let token = token_grammar();
    let input = Input::new(text);
    let stopped = |pos: usize| ParseError {
        position: input.furthest().max(pos),
    };

    let mut levels: Vec<Vec<Node>> = Vec::new();
    let mut pos = 0;
    let root = loop {
        let at = pos;
        let Some(m) = token.exec_in(&input, pos) else {
            return Err(stopped(pos));
        };
        pos = m.end;
        match m.value {
            Token::Open => levels.push(Vec::new()),
            Token::Close => {
                let Some(children) = levels.pop() else {
                    return Err(ParseError { position: at });
                };
                match levels.last_mut() {
                    Some(parent) => parent.push(Node::Branch(children)),
                    None => break children,
                }
            }
            Token::Command(command) => match levels.last_mut() {
                Some(level) => level.push(Node::Command(command)),
                None => return Err(ParseError { position: at }),
            },
        }
    };

    if text[pos..].trim().is_empty() {
        Ok(root)
    } else {
        Err(ParseError { position: pos })
    }
}

/// Shape of a parsed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub commands: usize,
    pub branches: usize,
    pub max_depth: usize,
}

/// Count commands and nested branches without recursing.
pub fn tree_stats(nodes: &[Node]) -> TreeStats {
    let mut stats = TreeStats::default();
    let mut stack = vec![(nodes, 0usize)];
    while let Some((level, depth)) = stack.pop() {
        stats.max_depth = stats.max_depth.max(depth);
        for node in level {
            match node {
                Node::Command(_) => stats.commands += 1,
                Node::Branch(children) => {
                    stats.branches += 1;
                    stack.push((children, depth + 1));
                }
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, args: &[&str]) -> Node {
        Node::Command(Command {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn test_single_move() {
        let nodes = parse("(;B[aa])").unwrap();
        assert_eq!(nodes, vec![command("B", &["aa"])]);
    }

    #[test]
    fn test_truncated_record_fails() {
        assert!(parse("(;B[aa").is_err());
        assert!(parse("(;B[aa]").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_nested_variations() {
        let nodes = parse("(;SZ[9];B[ee](;W[ge])(;W[cc];B[gc]))").unwrap();
        assert_eq!(
            nodes,
            vec![
                command("SZ", &["9"]),
                command("B", &["ee"]),
                Node::Branch(vec![command("W", &["ge"])]),
                Node::Branch(vec![command("W", &["cc"]), command("B", &["gc"])]),
            ]
        );
    }

    #[test]
    fn test_whitespace_and_multiple_arguments() {
        let text = "\n( ;GM[1] FF[4]\n  ;AB[aa] [bb]\n ( ;W[cc] )\n)\n";
        let nodes = parse(text).unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[2], command("AB", &["aa", "bb"]));
        assert_eq!(nodes[3], Node::Branch(vec![command("W", &["cc"])]));
    }

    #[test]
    fn test_escaped_argument() {
        let nodes = parse(r"(;C[a \] b \\])").unwrap();
        assert_eq!(nodes, vec![command("C", &[r"a ] b \"])]);
    }

    #[test]
    fn test_error_points_at_furthest_offset() {
        let text = "(;B[aa];W[bb];B[cc";
        let err = parse(text).unwrap_err();
        assert!(err.position > text.rfind('[').unwrap());
        assert_eq!(err.position, text.len());

        // The second branch is never closed.
        let err = parse("(;B[aa](;W[bb])(;W[cc]").unwrap_err();
        assert_eq!(err.position, 22);
    }

    #[test]
    fn test_unbalanced_close_fails() {
        assert_eq!(parse(")").unwrap_err().position, 0);
        assert_eq!(parse(";B[aa]").unwrap_err().position, 0);
    }

    #[test]
    fn test_deeply_nested_record() {
        let depth = 10_000;
        let text = format!("{}{}", "(;C[x]".repeat(depth), ")".repeat(depth));
        let nodes = parse(&text).unwrap();
        let stats = tree_stats(&nodes);
        assert_eq!(stats.commands, depth);
        assert_eq!(stats.branches, depth - 1);
        assert_eq!(stats.max_depth, depth - 1);
    }

    #[test]
    fn test_trailing_garbage_fails() {
        let err = parse("(;B[aa]) junk").unwrap_err();
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_empty_branch() {
        assert_eq!(parse("()").unwrap(), Vec::<Node>::new());
    }

    #[test]
    fn test_tree_stats() {
        let nodes = parse("(;B[aa](;W[bb](;B[cc]))(;W[dd]))").unwrap();
        let stats = tree_stats(&nodes);
        assert_eq!(stats.commands, 4);
        assert_eq!(stats.branches, 3);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn test_command_arg() {
        let nodes = parse("(;PB[]SZ[13])").unwrap();
        let Node::Command(pb) = &nodes[0] else {
            panic!("expected a command");
        };
        assert_eq!(pb.arg(), Some(""));
        let Node::Command(sz) = &nodes[1] else {
            panic!("expected a command");
        };
        assert_eq!(sz.arg(), Some("13"));
    }
}
