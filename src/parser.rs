//! Pattern spec parser
//!
//! Parses textual pattern specs into [`PatternSpec`] using pest grammar.
//! Labels are quoted strings, nesting uses brackets:
//!
//! ```text
//! ["VP", ["VB.*", "hit.*"], ["PP", ["IN", "with"]]]
//! ```
//!
//! Inside a label only the enclosing quote needs escaping; all other
//! backslashes reach the regex untouched.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::str::FromStr;

use crate::pattern::{PatternSpec, SpecError};

#[derive(Parser)]
#[grammar = "spec.pest"]
struct SpecParser;

/// Parse a textual spec into a PatternSpec
pub fn parse_spec(input: &str) -> Result<PatternSpec, SpecError> {
    let mut pairs = SpecParser::parse(Rule::spec, input).map_err(Box::new)?;

    let Some(element) = pairs.next().and_then(|p| p.into_inner().next()) else {
        return Err(SpecError::InvalidSpec {
            token: input.to_string(),
            offset: 0,
        });
    };

    parse_element(element)
}

impl FromStr for PatternSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_spec(s)
    }
}

fn parse_element(pair: Pair<'_, Rule>) -> Result<PatternSpec, SpecError> {
    match pair.as_rule() {
        Rule::list => pair
            .into_inner()
            .map(parse_element)
            .collect::<Result<Vec<_>, _>>()
            .map(PatternSpec::Chain),
        Rule::string => {
            let offset = pair.as_span().start();
            let Some(inner) = pair.into_inner().next() else {
                return Err(SpecError::InvalidSpec {
                    token: String::new(),
                    offset,
                });
            };
            let quote = match inner.as_rule() {
                Rule::sq_inner => '\'',
                _ => '"',
            };
            Ok(PatternSpec::Label(unescape_quote(inner.as_str(), quote)))
        }
        // Rule::invalid: numbers, bare words, anything unquoted
        _ => Err(SpecError::InvalidSpec {
            token: pair.as_str().to_string(),
            offset: pair.as_span().start(),
        }),
    }
}

/// Drop the backslash in front of `quote`; keep every other escape verbatim
fn unescape_quote(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == quote => out.push(quote),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_spec(r#""NP""#).unwrap(), PatternSpec::label("NP"));
        assert_eq!(parse_spec("'throw.*|threw'").unwrap(), PatternSpec::label("throw.*|threw"));
    }

    #[test]
    fn test_parse_nested_chain() {
        let spec: PatternSpec = r#"["VP", ["VB.*", ".*"], ["VP", "TO"]]"#.parse().unwrap();

        assert_eq!(
            spec,
            PatternSpec::chain([
                PatternSpec::label("VP"),
                PatternSpec::chain(["VB.*", ".*"]),
                PatternSpec::chain(["VP", "TO"]),
            ])
        );
        assert_eq!(spec.depth(), 2);
    }

    #[test]
    fn test_parse_whitespace_and_trailing_comma() {
        let spec = parse_spec("[\n  'NP',\n  'PP',\n]").unwrap();
        assert_eq!(spec, PatternSpec::chain(["NP", "PP"]));

        assert_eq!(parse_spec("[]").unwrap(), PatternSpec::Chain(Vec::new()));
    }

    #[test]
    fn test_escapes() {
        // Regex escapes pass through, the quote itself is unescaped
        let spec = parse_spec(r#"["\.", "say \"hi\"", "a\\"]"#).unwrap();
        assert_eq!(spec, PatternSpec::chain([r"\.", r#"say "hi""#, r"a\\"]));

        let spec = parse_spec(r"'it\'s'").unwrap();
        assert_eq!(spec, PatternSpec::label("it's"));
    }

    #[test]
    fn test_invalid_elements() {
        match parse_spec(r#"["NP", 42]"#) {
            Err(SpecError::InvalidSpec { token, offset }) => {
                assert_eq!(token, "42");
                assert_eq!(offset, 7);
            }
            other => panic!("Expected InvalidSpec, got {:?}", other),
        }

        assert!(matches!(
            parse_spec("[NP, [PP]]"),
            Err(SpecError::InvalidSpec { .. })
        ));
        assert!(matches!(parse_spec("null"), Err(SpecError::InvalidSpec { .. })));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse_spec(r#"["NP", "PP""#), Err(SpecError::Syntax(_))));
        assert!(matches!(parse_spec(""), Err(SpecError::Syntax(_))));
        assert!(matches!(parse_spec(r#""NP" "PP""#), Err(SpecError::Syntax(_))));
    }
}
