//! The combinator algebra: terminals, sequence, choice, repetition,
//! predicates, and the match-tagging wrapper (§4.3, §4.4).
//!
//! Generalizes the teacher's per-construct dispatch functions in
//! `native_parser.rs` (`parse_terminal`, `parse_charclass`,
//! `parse_alternatives`, `parse_zero_or_more`, `parse_one_or_more`,
//! `parse_optional`) from iXML-AST-specific functions into symbol-generic
//! combinator values, each implementing `Parser`. `Rule` (§4.2) lives in
//! `rule.rs` since its contract is coupled to the left-recursion
//! dispatcher rather than to this pure combinator algebra.

use crate::charclass::{unicode_category_rangeset, RangeSet};
use crate::context::ParseContext;
use crate::input::{CharInput, InputView};
use std::rc::Rc;
use unicode_general_category::GeneralCategory;

/// A parser: given a `ParseContext`, attempts to match starting at the
/// current position, returning whether it succeeded. On success, position
/// and match log reflect the match; on failure, both are restored to
/// their pre-call values (§4.1), except `furthest_failure_pos`, which only
/// ever advances.
pub trait Parser<I: InputView, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool;
}

/// A cheaply-cloned, type-erased handle to a combinator. All of the
/// fluent builder methods in §9 live here so grammars can be composed by
/// value without the caller naming concrete combinator types — the
/// `Rule`-only dynamic dispatch the design notes call for is extended
/// uniformly to every combinator for this reason (see DESIGN.md).
pub struct Combinator<I: InputView, T>(Rc<dyn Parser<I, T>>);

impl<I: InputView, T> Clone for Combinator<I, T> {
    fn clone(&self) -> Self {
        Combinator(Rc::clone(&self.0))
    }
}

impl<I: InputView, T> Parser<I, T> for Combinator<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        self.0.run(ctx)
    }
}

impl<I: InputView + 'static, T: 'static> Combinator<I, T> {
    pub fn new(parser: impl Parser<I, T> + 'static) -> Self {
        Combinator(Rc::new(parser))
    }

    /// `self` followed by `other` (§4.3 Sequence).
    pub fn then(&self, other: &Combinator<I, T>) -> Combinator<I, T> {
        Combinator::new(Sequence(vec![self.clone(), other.clone()]))
    }

    /// `self`, or if that fails, `other` (§4.3 Choice).
    pub fn or(&self, other: &Combinator<I, T>) -> Combinator<I, T> {
        Combinator::new(Choice(vec![self.clone(), other.clone()]))
    }

    /// Zero or more repetitions of `self` (§4.3 ZeroOrMore).
    pub fn star(&self) -> Combinator<I, T> {
        Combinator::new(ZeroOrMore(self.clone()))
    }

    /// One or more repetitions of `self` (§4.3 OneOrMore).
    pub fn plus(&self) -> Combinator<I, T> {
        Combinator::new(OneOrMore(self.clone()))
    }

    /// `self`, or succeed anyway if it fails (§4.3 Optional).
    pub fn opt(&self) -> Combinator<I, T> {
        Combinator::new(Optional(self.clone()))
    }

    /// Lookahead: succeed iff `self` succeeds, consuming nothing and
    /// recording no matches (§4.3 And).
    pub fn and(&self) -> Combinator<I, T> {
        Combinator::new(And(self.clone()))
    }

    /// Negative lookahead: succeed iff `self` fails, consuming nothing
    /// and recording no matches (§4.3 Not).
    pub fn not(&self) -> Combinator<I, T> {
        Combinator::new(Not(self.clone()))
    }

    /// Tag a successful match of `self` with `id` (§4.3 Match, §4.5's
    /// "append a match" operator).
    pub fn mark(&self, id: T) -> Combinator<I, T>
    where
        T: Clone,
    {
        Combinator::new(Match {
            inner: self.clone(),
            id,
        })
    }
}

impl<I: InputView + 'static, T: 'static> std::ops::Shr for &Combinator<I, T> {
    type Output = Combinator<I, T>;
    /// Sugar for `then` (§11.4).
    fn shr(self, rhs: Self) -> Combinator<I, T> {
        self.then(rhs)
    }
}

impl<I: InputView + 'static, T: 'static> std::ops::BitOr for &Combinator<I, T> {
    type Output = Combinator<I, T>;
    /// Sugar for `or` (§11.4).
    fn bitor(self, rhs: Self) -> Combinator<I, T> {
        self.or(rhs)
    }
}

impl<I: InputView + 'static, T: 'static> std::ops::Neg for &Combinator<I, T> {
    type Output = Combinator<I, T>;
    /// Sugar for `not` (§11.4).
    fn neg(self) -> Combinator<I, T> {
        self.not()
    }
}

/// Build an n-ary sequence directly, for grammars more naturally written
/// as a flat list than as a chain of `.then()` calls.
pub fn seq<I: InputView + 'static, T: 'static>(children: Vec<Combinator<I, T>>) -> Combinator<I, T> {
    Combinator::new(Sequence(children))
}

/// Build an n-ary ordered choice directly.
pub fn choice<I: InputView + 'static, T: 'static>(children: Vec<Combinator<I, T>>) -> Combinator<I, T> {
    Combinator::new(Choice(children))
}

/// Match a single symbol equal to `expected` (§4.3 Terminal).
pub fn sym<I, T>(expected: I::Symbol) -> Combinator<I, T>
where
    I: InputView + 'static,
    I::Symbol: 'static,
    T: 'static,
{
    Combinator::new(Terminal(expected))
}

/// Match a single symbol within `lo..=hi` (§4.3 TerminalRange). Requires
/// the symbol type to be ordered.
pub fn range<I, T>(lo: I::Symbol, hi: I::Symbol) -> Combinator<I, T>
where
    I: InputView + 'static,
    I::Symbol: PartialOrd + 'static,
    T: 'static,
{
    Combinator::new(TerminalRange(lo, hi))
}

/// Match a single symbol that is a member of `set` (§4.3 TerminalSet).
pub fn set<I, T>(set: Vec<I::Symbol>) -> Combinator<I, T>
where
    I: InputView + 'static,
    I::Symbol: 'static,
    T: 'static,
{
    Combinator::new(TerminalSet(set))
}

/// Match a prefix equal to `literal`, consuming all of it or none (§4.3
/// TerminalString).
pub fn string<I, T>(literal: Vec<I::Symbol>) -> Combinator<I, T>
where
    I: InputView + 'static,
    I::Symbol: 'static,
    T: 'static,
{
    Combinator::new(TerminalString(literal))
}

/// Convenience constructor for `CharInput` grammars: turns a `&str`
/// literal into a `TerminalString` over `char`.
pub fn lit<T: 'static>(literal: &str) -> Combinator<CharInput, T> {
    string(literal.chars().collect())
}

/// Match any `char` covered by `set` (§11.2). Not a new core primitive:
/// one `TerminalRange` alternative per merged range in `set`, composed
/// with the generic `choice`.
pub fn char_class<T: 'static>(set: RangeSet) -> Combinator<CharInput, T> {
    let alternatives = set.ranges().iter().map(|&(lo, hi)| range(lo, hi)).collect();
    choice(alternatives)
}

/// Match any `char` whose Unicode general category is `cat` (§11.2), e.g.
/// `unicode_category(GeneralCategory::UppercaseLetter)` for `\p{Lu}`.
pub fn unicode_category<T: 'static>(cat: GeneralCategory) -> Combinator<CharInput, T> {
    char_class(unicode_category_rangeset(cat))
}

// ---------------------------------------------------------------------
// Terminal combinators
// ---------------------------------------------------------------------

struct Terminal<S>(S);

impl<I: InputView<Symbol = S>, S: PartialEq, T> Parser<I, T> for Terminal<S> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let pos = ctx.current();
        match ctx.current_symbol() {
            Some(sym) if sym == self.0 => {
                ctx.bump();
                true
            }
            _ => {
                ctx.record_failure(pos);
                false
            }
        }
    }
}

struct TerminalRange<S>(S, S);

impl<I: InputView<Symbol = S>, S: PartialOrd, T> Parser<I, T> for TerminalRange<S> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let pos = ctx.current();
        match ctx.current_symbol() {
            Some(sym) if sym >= self.0 && sym <= self.1 => {
                ctx.bump();
                true
            }
            _ => {
                ctx.record_failure(pos);
                false
            }
        }
    }
}

struct TerminalSet<S>(Vec<S>);

impl<I: InputView<Symbol = S>, S: PartialEq, T> Parser<I, T> for TerminalSet<S> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let pos = ctx.current();
        match ctx.current_symbol() {
            Some(sym) if self.0.iter().any(|s| *s == sym) => {
                ctx.bump();
                true
            }
            _ => {
                ctx.record_failure(pos);
                false
            }
        }
    }
}

struct TerminalString<S>(Vec<S>);

impl<I: InputView<Symbol = S>, S: PartialEq, T> Parser<I, T> for TerminalString<S> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let start = ctx.current();
        let mut pos = start;
        let input = ctx.input();
        for expected in &self.0 {
            match input.at(pos) {
                Some(sym) if sym == *expected => {
                    pos = input.advance(pos);
                }
                _ => {
                    ctx.record_failure(pos);
                    ctx.set_position(start);
                    return false;
                }
            }
        }
        ctx.set_position(pos);
        true
    }
}

// ---------------------------------------------------------------------
// Composite combinators
// ---------------------------------------------------------------------

struct Sequence<I: InputView, T>(Vec<Combinator<I, T>>);

impl<I: InputView, T> Parser<I, T> for Sequence<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        for child in &self.0 {
            if !child.run(ctx) {
                ctx.restore(cp);
                return false;
            }
        }
        true
    }
}

struct Choice<I: InputView, T>(Vec<Combinator<I, T>>);

impl<I: InputView, T> Parser<I, T> for Choice<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        for child in &self.0 {
            if child.run(ctx) {
                return true;
            }
            ctx.restore(cp);
        }
        false
    }
}

struct ZeroOrMore<I: InputView, T>(Combinator<I, T>);

impl<I: InputView, T> Parser<I, T> for ZeroOrMore<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        loop {
            let cp = ctx.checkpoint();
            if !self.0.run(ctx) {
                ctx.restore(cp);
                break;
            }
            if ctx.current() == cp_position(&cp) {
                // Matched but consumed nothing: this is the final
                // iteration, per §4.3's zero-advance loop guard. Its
                // match effects stay; we just stop looping.
                break;
            }
        }
        true
    }
}

struct OneOrMore<I: InputView, T>(Combinator<I, T>);

impl<I: InputView, T> Parser<I, T> for OneOrMore<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let mut matched_once = false;
        loop {
            let cp = ctx.checkpoint();
            if !self.0.run(ctx) {
                ctx.restore(cp);
                break;
            }
            matched_once = true;
            if ctx.current() == cp_position(&cp) {
                break;
            }
        }
        matched_once
    }
}

struct Optional<I: InputView, T>(Combinator<I, T>);

impl<I: InputView, T> Parser<I, T> for Optional<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        if !self.0.run(ctx) {
            ctx.restore(cp);
        }
        true
    }
}

struct And<I: InputView, T>(Combinator<I, T>);

impl<I: InputView, T> Parser<I, T> for And<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        let ok = self.0.run(ctx);
        ctx.restore(cp);
        ok
    }
}

struct Not<I: InputView, T>(Combinator<I, T>);

impl<I: InputView, T> Parser<I, T> for Not<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        let ok = self.0.run(ctx);
        ctx.restore(cp);
        !ok
    }
}

struct Match<I: InputView, T> {
    inner: Combinator<I, T>,
    id: T,
}

impl<I: InputView, T: Clone> Parser<I, T> for Match<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let cp = ctx.checkpoint();
        if self.inner.run(ctx) {
            let begin = cp_position(&cp);
            let end = ctx.current();
            let child_count = count_immediate_children(ctx.matches(), cp_match_len(&cp), ctx.match_len());
            ctx.append_match(self.id.clone(), begin, end, child_count);
            true
        } else {
            ctx.restore(cp);
            false
        }
    }
}

/// How many *direct* children the inner parser's run appended to the log
/// between `start` and `end`. A naive `end - start` counts every
/// transitive descendant too, which is the wrong number for
/// `tree::reconstruct`'s `child_count`-driven walk (§6, §11.3): it expects
/// to consume exactly one level of children, each of which recursively
/// accounts for its own descendants. Skip each top-level entry's whole
/// subtree via `tree::span` and count how many such entries there are.
fn count_immediate_children<T>(matches: &[crate::context::Match<T>], start: usize, end: usize) -> usize {
    let mut count = 0;
    let mut cursor = end;
    while cursor > start {
        cursor -= crate::tree::span(matches, cursor);
        count += 1;
    }
    count
}

// `Checkpoint`'s fields are private to `context`; these tiny accessors
// keep this module from needing to know its layout while still reading
// the two fields composite combinators need.
fn cp_position(cp: &crate::context::Checkpoint) -> crate::input::Position {
    cp.position()
}

fn cp_match_len(cp: &crate::context::Checkpoint) -> usize {
    cp.match_len()
}
