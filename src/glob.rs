//! Glob parsing (component B) and compilation (component C).
//!
//! A pattern is first lexed into a sequence of [`Token`]s, which
//! understand the recursive `**` forms but nothing about the target
//! filesystem. Those tokens are then compiled into a [`Glob`], which is
//! either a plain literal-string comparison or a regular expression built
//! by the translation table in this module's `to_regex` function.

use crate::cursor::Cursor;
use crate::error::GlobError;

/// A single inclusive character range `(start, end)` with `start <= end`.
pub type CharRange = (char, char);

/// One lexical unit of a glob pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(char),
    Any,
    ZeroOrMore,
    RecursivePrefix,
    RecursiveSuffix,
    RecursiveMiddle,
    Class { negated: bool, ranges: Vec<CharRange> },
}

/// Lex `pattern` into a token sequence. See the crate's top-level
/// documentation for the full control table.
pub fn parse(pattern: &str) -> Result<Vec<Token>, GlobError> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor::new(pattern);
    while let Some(c) = cursor.next() {
        match c {
            '?' => tokens.push(Token::Any),
            '*' => parse_star(&mut cursor, &mut tokens),
            '[' => tokens.push(parse_class(pattern, &mut cursor)?),
            '\\' => match cursor.next() {
                Some(x) => tokens.push(Token::Literal(x)),
                None => {
                    return Err(GlobError::IncompleteEscape { glob: pattern.to_string() })
                }
            },
            c => tokens.push(Token::Literal(c)),
        }
    }
    Ok(tokens)
}

fn parse_star(cursor: &mut Cursor, tokens: &mut Vec<Token>) {
    let preceding = cursor.peek_prev();
    if cursor.peek_next() != Some('*') {
        tokens.push(Token::ZeroOrMore);
        return;
    }
    cursor.next(); // consume the second '*'

    if tokens.is_empty() {
        match cursor.peek_next() {
            None | Some('/') => {
                if cursor.peek_next() == Some('/') {
                    cursor.next();
                }
                tokens.push(Token::RecursivePrefix);
            }
            _ => {
                tokens.push(Token::ZeroOrMore);
                tokens.push(Token::ZeroOrMore);
            }
        }
        return;
    }

    if preceding != Some('/') {
        tokens.push(Token::ZeroOrMore);
        tokens.push(Token::ZeroOrMore);
        return;
    }

    let mode_suffix = match cursor.peek_next() {
        None => true,
        Some('/') => {
            cursor.next();
            false
        }
        _ => {
            tokens.push(Token::ZeroOrMore);
            tokens.push(Token::ZeroOrMore);
            return;
        }
    };

    match tokens.last() {
        Some(Token::RecursivePrefix) | Some(Token::RecursiveSuffix) => {
            // A run of `**/` or `/**` collapses into the token already
            // there; nothing to do.
        }
        _ => {
            tokens.pop();
            tokens.push(if mode_suffix {
                Token::RecursiveSuffix
            } else {
                Token::RecursiveMiddle
            });
        }
    }
}

fn parse_class(pattern: &str, cursor: &mut Cursor) -> Result<Token, GlobError> {
    let mut negated = false;
    match cursor.peek_next() {
        Some('!') | Some('^') => {
            negated = true;
            cursor.next();
        }
        _ => {}
    }
    let mut ranges: Vec<CharRange> = Vec::new();
    let mut first = true;
    loop {
        let c = cursor.next().ok_or_else(|| GlobError::UnclosedClass {
            glob: pattern.to_string(),
        })?;
        if c == ']' && !first {
            break;
        }
        if c == '-' && !first {
            match cursor.peek_next() {
                Some(']') | None => ranges.push(('-', '-')),
                Some(hi) => {
                    let upgraded = match ranges.last_mut() {
                        Some(last) if last.0 == last.1 => {
                            cursor.next();
                            if hi < last.0 {
                                return Err(GlobError::InvalidRange {
                                    glob: pattern.to_string(),
                                    lo: last.0,
                                    hi,
                                });
                            }
                            last.1 = hi;
                            true
                        }
                        _ => false,
                    };
                    if !upgraded {
                        ranges.push(('-', '-'));
                    }
                }
            }
        } else {
            ranges.push((c, c));
        }
        first = false;
    }
    Ok(Token::Class { negated, ranges })
}

/// A single char's translation into a regex literal, honouring the
/// `\u{hhhh}` fallback for non-printable code points and the standard
/// regex metacharacter escapes.
fn escape_literal(c: char, out: &mut String) {
    if "^$.|?*+()[]{}".contains(c) {
        out.push('\\');
        out.push(c);
    } else if (c as u32) < 0x20 || (c as u32) > 0x7E {
        out.push_str(&format!("\\u{{{:04x}}}", c as u32));
    } else {
        out.push(c);
    }
}

/// Escape a char for use inside a `[...]` regex class.
fn escape_in_class(c: char, out: &mut String) {
    if c == '^' || c == '[' || c == ']' {
        out.push('\\');
        out.push(c);
    } else if (c as u32) < 0x20 || (c as u32) > 0x7E {
        out.push_str(&format!("\\u{{{:04x}}}", c as u32));
    } else {
        out.push(c);
    }
}

fn to_regex(tokens: &[Token], case_insensitive: bool) -> String {
    let mut re = String::from("(?-u)");
    if case_insensitive {
        re.push_str("(?i)");
    }
    re.push('^');
    if let [Token::RecursivePrefix] = tokens {
        re.push_str(".*");
    } else {
        for tok in tokens {
            match tok {
                Token::Literal(c) => escape_literal(*c, &mut re),
                Token::Any => re.push_str("[^/]"),
                Token::ZeroOrMore => re.push_str("[^/]*"),
                Token::RecursivePrefix => re.push_str("(?:/?|.*/)"),
                Token::RecursiveSuffix => re.push_str("/.*"),
                Token::RecursiveMiddle => re.push_str("(?:/|/.*/)"),
                Token::Class { negated, ranges } => {
                    re.push('[');
                    if *negated {
                        re.push('^');
                    }
                    for &(lo, hi) in ranges {
                        if lo == hi {
                            escape_in_class(lo, &mut re);
                        } else {
                            escape_in_class(lo, &mut re);
                            re.push('-');
                            escape_in_class(hi, &mut re);
                        }
                    }
                    re.push(']');
                }
            }
        }
    }
    re.push('$');
    re
}

/// The two matcher shapes a compiled glob can take.
#[derive(Clone, Debug)]
enum Matcher {
    Literal(String),
    Regex(Box<regex::bytes::Regex>),
}

/// A glob pattern compiled into an efficient matcher, immutable after
/// construction.
#[derive(Clone, Debug)]
pub struct Glob {
    original: String,
    matcher: Matcher,
}

impl Glob {
    /// Compile `pattern`. When `case_insensitive` is false and the
    /// pattern is composed entirely of literal characters, the literal
    /// fast path (component C) is used; otherwise a regex is built.
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Glob, GlobError> {
        let tokens = parse(pattern)?;
        let all_literal =
            !case_insensitive && !tokens.is_empty() && tokens.iter().all(|t| matches!(t, Token::Literal(_)));
        let matcher = if all_literal {
            let s: String = tokens
                .iter()
                .map(|t| match t {
                    Token::Literal(c) => *c,
                    _ => unreachable!(),
                })
                .collect();
            Matcher::Literal(s)
        } else {
            let re_src = to_regex(&tokens, case_insensitive);
            let re = regex::bytes::Regex::new(&re_src).map_err(|err| GlobError::Regex {
                glob: pattern.to_string(),
                err,
            })?;
            Matcher::Regex(Box::new(re))
        };
        Ok(Glob { original: pattern.to_string(), matcher })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// True iff `candidate` (already separator-normalized to `/`) matches
    /// this glob.
    pub fn is_match(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(lit) => lit == candidate,
            Matcher::Regex(re) => re.is_match(candidate.as_bytes()),
        }
    }

    /// True iff this is the literal fast-path variant (used by tests
    /// checking invariant 2 in the testable-properties list).
    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(pattern: &str) -> Vec<Token> {
        parse(pattern).unwrap()
    }

    #[test]
    fn recursive_prefix_collapses() {
        assert_eq!(toks("**/foo"), vec![Token::RecursivePrefix, Token::Literal('f'), Token::Literal('o'), Token::Literal('o')]);
        assert_eq!(toks("**/**/foo"), vec![Token::RecursivePrefix, Token::Literal('f'), Token::Literal('o'), Token::Literal('o')]);
    }

    #[test]
    fn recursive_suffix_collapses() {
        assert_eq!(toks("foo/**"), vec![Token::Literal('f'), Token::Literal('o'), Token::Literal('o'), Token::RecursiveSuffix]);
    }

    #[test]
    fn recursive_middle_collapses() {
        assert_eq!(
            toks("a/**/b"),
            vec![Token::Literal('a'), Token::RecursiveMiddle, Token::Literal('b')]
        );
        assert_eq!(
            toks("a/**/**/b"),
            vec![Token::Literal('a'), Token::RecursiveMiddle, Token::Literal('b')]
        );
    }

    #[test]
    fn middle_then_trailing_run_collapses_to_suffix() {
        // A `**/` run followed immediately by a trailing `/**` is a suffix,
        // not a middle: the last emitted recursive token must be replaced,
        // not kept, when it isn't itself a prefix/suffix already.
        assert_eq!(toks("a/**/**"), vec![Token::Literal('a'), Token::RecursiveSuffix]);
    }

    #[test]
    fn bare_double_star_is_two_zero_or_more_mid_pattern() {
        // "a**b" - preceding char of the stars is 'a', not '/'.
        assert_eq!(
            toks("a**b"),
            vec![Token::Literal('a'), Token::ZeroOrMore, Token::ZeroOrMore, Token::Literal('b')]
        );
    }

    #[test]
    fn class_bracket_then_range() {
        match &toks("[]-z]")[0] {
            Token::Class { negated, ranges } => {
                assert!(!negated);
                assert_eq!(ranges, &vec![(']', 'z')]);
            }
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn class_single_bracket() {
        match &toks("[]]")[0] {
            Token::Class { ranges, .. } => assert_eq!(ranges, &vec![(']', ']')]),
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn class_lone_dash() {
        match &toks("[-]")[0] {
            Token::Class { ranges, .. } => assert_eq!(ranges, &vec![('-', '-')]),
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn class_invalid_range_fails() {
        assert!(parse("[z-a]").is_err());
    }

    #[test]
    fn unclosed_class_fails() {
        assert!(parse("[abc").is_err());
    }

    #[test]
    fn incomplete_escape_fails() {
        assert!(parse("foo\\").is_err());
    }

    #[test]
    fn literal_fast_path_chosen_when_case_sensitive() {
        let g = Glob::new("file2d.cpp", false).unwrap();
        assert!(g.is_literal());
        assert!(g.is_match("file2d.cpp"));
        assert!(!g.is_match("FILE2D.CPP"));
    }

    #[test]
    fn regex_path_chosen_when_case_insensitive() {
        let g = Glob::new("file2d.cpp", true).unwrap();
        assert!(!g.is_literal());
        assert!(g.is_match("FILE2D.CPP"));
    }

    #[test]
    fn wildcards_match_single_path_segment() {
        let g = Glob::new("*.rs", false).unwrap();
        assert!(g.is_match("main.rs"));
        assert!(!g.is_match("src/main.rs"));
    }

    #[test]
    fn recursive_prefix_matches_any_depth() {
        let g = Glob::new("**/foo", false).unwrap();
        assert!(g.is_match("foo"));
        assert!(g.is_match("src/foo"));
        assert!(g.is_match("a/b/foo"));
    }

    #[test]
    fn recursive_suffix_matches_contents_only() {
        let g = Glob::new("abc/**", false).unwrap();
        assert!(g.is_match("abc/x"));
        assert!(g.is_match("abc/x/y"));
        assert!(!g.is_match("abc"));
    }

    #[test]
    fn character_class_matches_range() {
        let g = Glob::new("[a-c].rs", false).unwrap();
        assert!(g.is_match("a.rs"));
        assert!(g.is_match("c.rs"));
        assert!(!g.is_match("d.rs"));
    }

    #[test]
    fn negated_class() {
        let g = Glob::new("[!a-c].rs", false).unwrap();
        assert!(!g.is_match("a.rs"));
        assert!(g.is_match("d.rs"));
    }
}
