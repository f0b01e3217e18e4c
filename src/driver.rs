//! The top-level parse entry point: configuration, outcome, and the
//! furthest-failure line/column helper (§4.5, §6, §10.3).
//!
//! Generalizes the teacher's `runtime_parser.rs` driver loop (which wires
//! together `InputStream`, `ParseContext`, and a chosen entry rule) into a
//! generic one parameterized over `InputView`/`Symbol`/`Tag`.

use crate::combinator::{Combinator, Parser};
use crate::context::{Match, ParseContext};
use crate::input::{InputView, Position};

/// Driver-level knobs, separate from grammar construction (§10.3). There
/// is no environment or file-based configuration layer: a grammar is a
/// value built in Rust, and `DriverConfig` only controls the two things
/// the driver itself decides.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Fail the parse if the root rule matches a proper prefix rather than
    /// the entire input.
    pub require_full_input: bool,
    /// Capacity hint forwarded to `ParseContext::new` (§5).
    pub preallocate_log: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            require_full_input: true,
            preallocate_log: 64,
        }
    }
}

/// The result of a single top-level parse attempt.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub ok: bool,
    /// Position the root rule reached, success or not.
    pub end: Position,
    /// The furthest position any terminal failed at during the whole
    /// attempt, for error reporting (§4.1, §7).
    pub furthest_failure: Position,
    /// The match log, in append order. Empty when `ok` is false.
    pub matches: Vec<Match<T>>,
}

/// Run `root` against `input` under `config`.
pub fn parse<I, T>(root: &Combinator<I, T>, input: &I, config: DriverConfig) -> Outcome<T>
where
    I: InputView,
    T: Clone,
{
    let mut ctx: ParseContext<I, T> = ParseContext::new(input, config.preallocate_log);
    let matched = root.run(&mut ctx);
    let end = ctx.current();
    let furthest_failure = ctx.furthest_failure();

    let ok = matched && (!config.require_full_input || end == input.end());
    let matches = if ok { ctx.into_matches() } else { Vec::new() };

    Outcome {
        ok,
        end,
        furthest_failure,
        matches,
    }
}

/// `(line, column)` of an outcome's furthest failure, computed on demand
/// since most callers never need it (§9's resolved Open Question: line/col
/// is derived from `InputView::line_col` rather than tracked per-match).
pub fn furthest_failure_line_col<I: InputView, T>(input: &I, outcome: &Outcome<T>) -> (usize, usize) {
    input.line_col(outcome.furthest_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::{choice, lit, range, seq};
    use crate::input::CharInput;
    use crate::rule::Rule;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Digit,
        Add,
    }

    fn digits_rule() -> Rule<CharInput, Tag> {
        let r = Rule::new("digits");
        r.set_body(range('0', '9').plus().mark(Tag::Digit));
        r
    }

    #[test]
    fn successful_full_parse() {
        let root = digits_rule();
        let input = CharInput::new("12345");
        let outcome = parse(&root.as_combinator(), &input, DriverConfig::default());
        assert!(outcome.ok);
        assert_eq!(outcome.end, 5);
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn require_full_input_rejects_a_partial_match() {
        let root = digits_rule();
        let input = CharInput::new("123abc");
        let outcome = parse(&root.as_combinator(), &input, DriverConfig::default());
        assert!(!outcome.ok);
        assert_eq!(outcome.end, 3);
    }

    #[test]
    fn disabling_require_full_input_accepts_a_prefix_match() {
        let root = digits_rule();
        let input = CharInput::new("123abc");
        let config = DriverConfig {
            require_full_input: false,
            ..DriverConfig::default()
        };
        let outcome = parse(&root.as_combinator(), &input, config);
        assert!(outcome.ok);
        assert_eq!(outcome.end, 3);
    }

    #[test]
    fn failing_parse_reports_furthest_failure_with_line_col() {
        let root = digits_rule();
        let input = CharInput::new("ab\ncd");
        let outcome = parse(&root.as_combinator(), &input, DriverConfig::default());
        assert!(!outcome.ok);
        assert!(outcome.matches.is_empty());
        let (line, col) = furthest_failure_line_col(&input, &outcome);
        assert_eq!((line, col), (1, 1));
    }

    #[test]
    fn calculator_scenario_one_plus_two_plus_three() {
        let expr: Rule<CharInput, Tag> = Rule::new("expr");
        let digit = range('0', '9').mark(Tag::Digit);
        let recursive_case = seq(vec![expr.as_combinator(), lit("+"), digit.clone()]).mark(Tag::Add);
        expr.set_body(choice(vec![recursive_case, digit]));

        let input = CharInput::new("1+2+3");
        let outcome = parse(&expr.as_combinator(), &input, DriverConfig::default());
        assert!(outcome.ok);
        assert_eq!(outcome.end, 5);
    }
}
