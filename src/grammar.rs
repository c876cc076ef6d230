//! Backtracking parser combinators.
//!
//! A [`Pattern`] is a function from `(input, offset)` to an optional
//! [`Match`]. Patterns never fail loudly: a mismatch is `None`, and the
//! caller is free to try something else at the same offset. Nothing here
//! knows about game records; [`crate::sgf`] assembles the record grammar
//! from these primitives.
//!
//! ## Primitives
//!
//! - [`literal`] - exact text
//! - [`terminated_string`] - everything up to an unescaped end character
//! - [`regex_token`] - a regular expression anchored at the offset
//! - [`optional`] - never fails, yields `None` on mismatch
//! - [`first_of`] - ordered choice, first success wins
//! - [`sequence`] - all parts in order, fails if any part fails
//! - [`separated_repeat`] - zero or more items with an optional separator
//!
//! Every primitive reports how far into the [`Input`] it looked, so a failed
//! parse can point at the furthest offset reached instead of where it began.

use std::cell::Cell;
use std::rc::Rc;

use regex::Regex;

/// A successful match: the produced value and the offset just past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    pub value: T,
    pub end: usize,
}

/// Text being matched, plus the furthest offset any primitive has examined.
///
/// Backtracking throws away failed attempts, so the furthest offset is what
/// locates a syntax error: it is where the longest attempt ran out.
#[derive(Debug)]
pub struct Input<'a> {
    text: &'a str,
    furthest: Cell<usize>,
}

impl<'a> Input<'a> {
    pub fn new(text: &'a str) -> Self {
        Input {
            text,
            furthest: Cell::new(0),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn furthest(&self) -> usize {
        self.furthest.get()
    }

    fn reach(&self, pos: usize) {
        if pos > self.furthest.get() {
            self.furthest.set(pos);
        }
    }

    fn rest(&self, pos: usize) -> Option<&'a str> {
        self.reach(pos);
        self.text.get(pos..)
    }
}

type ExecFn<T> = dyn Fn(&Input<'_>, usize) -> Option<Match<T>>;

/// A composable matcher producing values of type `T`.
pub struct Pattern<T> {
    exec: Rc<ExecFn<T>>,
}

impl<T> Clone for Pattern<T> {
    fn clone(&self) -> Self {
        Pattern {
            exec: Rc::clone(&self.exec),
        }
    }
}

impl<T: 'static> Pattern<T> {
    pub fn new(exec: impl Fn(&Input<'_>, usize) -> Option<Match<T>> + 'static) -> Self {
        Pattern {
            exec: Rc::new(exec),
        }
    }

    /// Try to match at byte offset `pos` of `text`.
    pub fn exec(&self, text: &str, pos: usize) -> Option<Match<T>> {
        self.exec_in(&Input::new(text), pos)
    }

    /// [`Pattern::exec`] against a shared [`Input`], so the caller can ask
    /// how far matching got after a failure.
    #[inline]
    pub fn exec_in(&self, input: &Input<'_>, pos: usize) -> Option<Match<T>> {
        (self.exec)(input, pos)
    }

    /// Transform the value of a successful match.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Pattern<U> {
        Pattern::new(move |input, pos| {
            self.exec_in(input, pos).map(|m| Match {
                value: f(m.value),
                end: m.end,
            })
        })
    }
}

/// Match `text` exactly.
pub fn literal(text: &'static str) -> Pattern<&'static str> {
    Pattern::new(move |input, pos| {
        let rest = input.rest(pos)?;
        rest.starts_with(text).then(|| {
            input.reach(pos + text.len());
            Match {
                value: text,
                end: pos + text.len(),
            }
        })
    })
}

/// Read up to (not including) the first `end` character that is not
/// preceded by `escape`.
///
/// The escape character protects exactly the character after it, so `\\`
/// followed by `end` terminates. The returned text is raw: escapes are left
/// in place. Fails if the input runs out before an unescaped `end`.
pub fn terminated_string(end: char, escape: char) -> Pattern<String> {
    Pattern::new(move |input, pos| {
        let rest = input.rest(pos)?;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            if escaped {
                escaped = false;
            } else if c == escape {
                escaped = true;
            } else if c == end {
                input.reach(pos + i);
                return Some(Match {
                    value: rest[..i].to_string(),
                    end: pos + i,
                });
            }
        }
        input.reach(input.text().len());
        None
    })
}

/// Match `re` starting exactly at the offset.
///
/// Expressions should be anchored with `^` so a mismatch is detected without
/// scanning the rest of the input.
pub fn regex_token(re: Regex) -> Pattern<String> {
    Pattern::new(move |input, pos| {
        let rest = input.rest(pos)?;
        let m = re.find(rest)?;
        (m.start() == 0 && !m.is_empty()).then(|| {
            input.reach(pos + m.end());
            Match {
                value: m.as_str().to_string(),
                end: pos + m.end(),
            }
        })
    })
}

/// Never fails; yields `None` without consuming input on mismatch.
pub fn optional<T: 'static>(pattern: Pattern<T>) -> Pattern<Option<T>> {
    Pattern::new(move |input, pos| {
        Some(match pattern.exec_in(input, pos) {
            Some(m) => Match {
                value: Some(m.value),
                end: m.end,
            },
            None => Match {
                value: None,
                end: pos,
            },
        })
    })
}

/// Ordered choice: the first alternative that matches wins.
pub fn first_of<T: 'static>(alternatives: Vec<Pattern<T>>) -> Pattern<T> {
    Pattern::new(move |input, pos| alternatives.iter().find_map(|p| p.exec_in(input, pos)))
}

/// A tuple of patterns matched one after another.
pub trait Sequence {
    type Output;

    fn exec_all(&self, input: &Input<'_>, pos: usize) -> Option<Match<Self::Output>>;
}

macro_rules! impl_sequence {
    ($($part:ident: $ty:ident),+) => {
        impl<$($ty: 'static),+> Sequence for ($(Pattern<$ty>,)+) {
            type Output = ($($ty,)+);

            fn exec_all(&self, input: &Input<'_>, pos: usize) -> Option<Match<Self::Output>> {
                let ($($part,)+) = self;
                let end = pos;
                $(let Match { value: $part, end } = $part.exec_in(input, end)?;)+
                Some(Match {
                    value: ($($part,)+),
                    end,
                })
            }
        }
    };
}

impl_sequence!(a: A, b: B);
impl_sequence!(a: A, b: B, c: C);
impl_sequence!(a: A, b: B, c: C, d: D);
impl_sequence!(a: A, b: B, c: C, d: D, e: E);

/// Match every part in order; fails if any part fails.
pub fn sequence<S>(parts: S) -> Pattern<S::Output>
where
    S: Sequence + 'static,
    S::Output: 'static,
{
    Pattern::new(move |input, pos| parts.exec_all(input, pos))
}

/// Zero or more `item`s, with `separator` between consecutive items.
///
/// Stops at the first item that fails or does not advance the offset, so a
/// pattern that can match empty text never loops. Never fails.
pub fn separated_repeat<T: 'static, S: 'static>(
    item: Pattern<T>,
    separator: Option<Pattern<S>>,
) -> Pattern<Vec<T>> {
    let next = match separator {
        Some(sep) => sequence((sep, item.clone())).map(|(_, value)| value),
        None => item.clone(),
    };
    Pattern::new(move |input, pos| {
        let mut values = Vec::new();
        let mut end = pos;
        let mut attempt = item.exec_in(input, end);
        while let Some(m) = attempt {
            if m.end <= end {
                break;
            }
            values.push(m.value);
            end = m.end;
            attempt = next.exec_in(input, end);
        }
        Some(Match { value: values, end })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> Pattern<String> {
        regex_token(Regex::new(r"^\d+").unwrap())
    }

    #[test]
    fn test_literal() {
        let p = literal("ab");
        assert_eq!(p.exec("xab", 1), Some(Match { value: "ab", end: 3 }));
        assert_eq!(p.exec("xab", 0), None);
        assert_eq!(p.exec("a", 0), None);
        assert_eq!(p.exec("ab", 5), None);
    }

    #[test]
    fn test_terminated_string_escapes() {
        let p = terminated_string(']', '\\');
        let m = p.exec(r"a\]b]rest", 0).unwrap();
        assert_eq!(m.value, r"a\]b");
        assert_eq!(m.end, 4);

        // An escaped escape does not protect the terminator.
        let m = p.exec(r"a\\]x", 0).unwrap();
        assert_eq!(m.value, r"a\\");

        assert_eq!(p.exec("unterminated", 0), None);
        assert_eq!(p.exec(r"trailing\]", 0), None);
    }

    #[test]
    fn test_regex_token_is_anchored() {
        let p = digits();
        assert_eq!(p.exec("12ab", 0).map(|m| m.end), Some(2));
        assert_eq!(p.exec("ab12", 0), None);
        assert_eq!(p.exec("ab12", 2).map(|m| m.value), Some("12".to_string()));
    }

    #[test]
    fn test_optional_never_fails() {
        let p = optional(literal("x"));
        assert_eq!(p.exec("y", 0), Some(Match { value: None, end: 0 }));
        assert_eq!(p.exec("x", 0), Some(Match { value: Some("x"), end: 1 }));
    }

    #[test]
    fn test_first_of_is_ordered() {
        let p = first_of(vec![literal("a"), literal("ab")]);
        assert_eq!(p.exec("ab", 0).map(|m| m.end), Some(1));
        let p = first_of(vec![literal("ab"), literal("a")]);
        assert_eq!(p.exec("ab", 0).map(|m| m.end), Some(2));
        assert!(p.exec("b", 0).is_none());
    }

    #[test]
    fn test_sequence_fails_if_any_part_fails() {
        let p = sequence((literal("("), digits(), literal(")")));
        let m = p.exec("(42)", 0).unwrap();
        assert_eq!(m.value.1, "42");
        assert_eq!(m.end, 4);
        assert!(p.exec("(42", 0).is_none());
        assert!(p.exec("()", 0).is_none());
    }

    #[test]
    fn test_separated_repeat() {
        let p = separated_repeat(digits(), Some(literal(",")));
        let m = p.exec("1,22,333;", 0).unwrap();
        assert_eq!(m.value, vec!["1", "22", "333"]);
        assert_eq!(m.end, 8);

        // A dangling separator is not consumed.
        let m = p.exec("1,", 0).unwrap();
        assert_eq!(m.end, 1);

        // Zero items is a success.
        let m = p.exec("x", 0).unwrap();
        assert!(m.value.is_empty());
        assert_eq!(m.end, 0);
    }

    #[test]
    fn test_separated_repeat_stops_on_empty_match() {
        let p = separated_repeat(optional(literal("a")), None::<Pattern<()>>);
        let m = p.exec("aab", 0).unwrap();
        assert_eq!(m.value.len(), 2);
        assert_eq!(m.end, 2);
    }

    #[test]
    fn test_furthest_offset_survives_backtracking() {
        // The argument runs to the end of the input before the choice falls
        // back to the bare name.
        let arg = sequence((literal("["), terminated_string(']', '\\'), literal("]")));
        let p = first_of(vec![
            sequence((literal("B"), arg)).map(|_| "move"),
            literal("B"),
        ]);
        let input = Input::new("B[unterminated");
        assert_eq!(p.exec_in(&input, 0).map(|m| m.end), Some(1));
        assert_eq!(input.furthest(), 14);
    }
}
