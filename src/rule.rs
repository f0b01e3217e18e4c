//! Named, self-referencing grammar rules and the left-recursion dispatcher
//! (§4.2). This is where Warth's seed/grow fixpoint lives.
//!
//! The teacher's grammar representation (`grammar.rs`, `grammar_v2.rs`)
//! builds a fixed rule graph ahead of time and walks it with a single
//! recursive-descent `native_parser.rs`, rejecting left recursion outright.
//! `Rule` keeps the teacher's two-phase idea — a rule exists before its
//! body does, so grammars can refer to themselves — but replaces the
//! reject-on-sight check with the grow loop, grounded on the left-recursion
//! memoization pattern in
//! `other_examples/f76354f7_Wybxc-parse-it__parse-it-src-memo.rs.rs` and
//! `other_examples/bb85981d_ekinimo-friss__src-packrat.rs.rs`, adapted to
//! this crate's flat match log instead of their value-returning parsers.

use crate::combinator::{Combinator, Parser};
use crate::context::{LeftRecursionEntry, LrState, ParseContext};
use crate::error::GrammarError;
use crate::input::InputView;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_RULE_ID: AtomicUsize = AtomicUsize::new(0);

/// A named, possibly self-referencing grammar rule.
///
/// Construction is two-phase (§3, §9's "Design Notes"): `Rule::new` gives
/// a rule its identity before its body exists, so a grammar can write
/// `expr.set_body(choice(vec![... expr.as_combinator() ...]))` — the
/// combinator captures `expr`'s handle, not its not-yet-built body.
/// Identity, not structural equality, is what the left-recursion memo
/// keys on, since two structurally identical rules must still be treated
/// as distinct call sites.
pub struct Rule<I: InputView, T> {
    id: usize,
    name: Rc<str>,
    body: Rc<RefCell<Option<Combinator<I, T>>>>,
}

impl<I: InputView, T> Clone for Rule<I, T> {
    fn clone(&self) -> Self {
        Rule {
            id: self.id,
            name: Rc::clone(&self.name),
            body: Rc::clone(&self.body),
        }
    }
}

impl<I: InputView + 'static, T: 'static> Rule<I, T> {
    /// Declare a rule with no body yet. `name` only appears in
    /// `GrammarError` messages.
    pub fn new(name: impl Into<String>) -> Self {
        Rule {
            id: NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed),
            name: Rc::from(name.into()),
            body: Rc::new(RefCell::new(None)),
        }
    }

    /// Assign (or replace) this rule's body. Grammars that forward-declare
    /// a rule before its definition is ready call this once construction
    /// completes.
    pub fn set_body(&self, body: Combinator<I, T>) {
        *self.body.borrow_mut() = Some(body);
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wrap this rule as an opaque `Combinator` handle so it can be used
    /// anywhere a combinator is expected (inside sequences, choices, or
    /// its own body).
    pub fn as_combinator(&self) -> Combinator<I, T>
    where
        T: Clone,
    {
        Combinator::new(self.clone())
    }
}

impl<I: InputView, T: Clone> Parser<I, T> for Rule<I, T> {
    fn run(&self, ctx: &mut ParseContext<I, T>) -> bool {
        let pos = ctx.current();

        // An entry already exists for (this rule, this position): either
        // we're seeding and got recursively re-entered, or we already
        // finished growing and are being asked for the memoized result.
        let lr_action = ctx.lr_lookup_mut(self.id, pos).map(|entry| match entry.state {
            LrState::Base => {
                entry.recursive = true;
                None
            }
            LrState::Continuation => Some((entry.best_end_pos, entry.best_matches.clone())),
        });

        if let Some(action) = lr_action {
            return match action {
                None => {
                    // This rule's own seed was reentered. If the call chain
                    // passed through a different rule's still-running frame
                    // to get back here, this is indirect left recursion
                    // (§9) — two rules depending on each other with neither
                    // resolvable on its own. A direct self-call never
                    // pushes an intervening frame, so this is `None` for
                    // ordinary direct recursion.
                    if let Some((_, interposed_name)) = ctx.active_conflict_after(self.id, pos) {
                        panic!(
                            "{}",
                            GrammarError::IndirectLeftRecursion {
                                seeding: self.name.to_string(),
                                reentered: interposed_name,
                            }
                        );
                    }
                    false
                }
                Some((end, matches)) => {
                    ctx.set_position(end);
                    ctx.extend_matches(&matches);
                    true
                }
            };
        }

        let body = self.body.borrow().clone().unwrap_or_else(|| {
            panic!(
                "{}",
                GrammarError::UnassignedRule {
                    name: self.name.to_string(),
                }
            )
        });

        ctx.active_push(self.id, pos, self.name.to_string());
        let log_start = ctx.match_len();
        ctx.lr_insert(
            self.id,
            pos,
            LeftRecursionEntry {
                state: LrState::Base,
                start_pos: pos,
                start_match_count: log_start,
                continuation_resolved: false,
                best_end_pos: pos,
                best_matches: Vec::new(),
                recursive: false,
                seeding_rule: self.id,
            },
        );

        let seed_ok = body.run(ctx);
        let was_recursive = ctx.lr_lookup(self.id, pos).map(|e| e.recursive).unwrap_or(false);

        if !seed_ok {
            ctx.lr_remove(self.id, pos);
            ctx.active_pop();
            return false;
        }

        if !was_recursive {
            ctx.lr_remove(self.id, pos);
            ctx.active_pop();
            return true;
        }

        // Grow: re-run the body from `pos` with the seed's result on offer
        // as the answer a recursive self-call should get back, keeping
        // whichever iteration reaches furthest. Stop as soon as an
        // iteration fails to advance past the current best (§4.2).
        let mut best_end = ctx.current();
        let mut best_matches = ctx.matches_since(log_start);

        loop {
            ctx.truncate_matches(log_start);
            ctx.set_position(pos);

            if let Some(entry) = ctx.lr_lookup_mut(self.id, pos) {
                entry.state = LrState::Continuation;
                entry.best_end_pos = best_end;
                entry.best_matches = best_matches.clone();
            }

            let grow_ok = body.run(ctx);
            if grow_ok && ctx.current() > best_end {
                best_end = ctx.current();
                best_matches = ctx.matches_since(log_start);
            } else {
                break;
            }
        }

        ctx.truncate_matches(log_start);
        ctx.set_position(best_end);
        ctx.extend_matches(&best_matches);
        ctx.lr_remove(self.id, pos);
        ctx.active_pop();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::{choice, lit, range, seq};
    use crate::input::CharInput;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Digit,
        Add,
    }

    fn run(root: &Rule<CharInput, Tag>, input: &str) -> (bool, usize) {
        let view = CharInput::new(input);
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&view, 0);
        let ok = root.as_combinator().run(&mut ctx);
        (ok, ctx.current())
    }

    #[test]
    fn non_recursive_rule_behaves_like_its_body() {
        let digit: Rule<CharInput, Tag> = Rule::new("digit");
        digit.set_body(range('0', '9').mark(Tag::Digit));
        let (ok, pos) = run(&digit, "7");
        assert!(ok);
        assert_eq!(pos, 1);
    }

    #[test]
    fn unassigned_rule_panics() {
        let phantom: Rule<CharInput, Tag> = Rule::new("phantom");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(&phantom, "x")));
        assert!(result.is_err());
    }

    // expr <- expr '+' digit | digit, on "1+2+3" must consume all of it,
    // left-associating through direct left recursion (§8 scenario).
    #[test]
    fn direct_left_recursion_grows_across_whole_input() {
        let expr: Rule<CharInput, Tag> = Rule::new("expr");
        let digit = range('0', '9').mark(Tag::Digit);
        let recursive_case = seq(vec![expr.as_combinator(), lit("+"), digit.clone()]).mark(Tag::Add);
        expr.set_body(choice(vec![recursive_case, digit]));

        let (ok, pos) = run(&expr, "1+2+3");
        assert!(ok);
        assert_eq!(pos, 5, "left recursion must grow across the entire input");
    }

    #[test]
    fn direct_left_recursion_stops_growing_at_furthest_valid_prefix() {
        let expr: Rule<CharInput, Tag> = Rule::new("expr");
        let digit = range('0', '9').mark(Tag::Digit);
        let recursive_case = seq(vec![expr.as_combinator(), lit("+"), digit.clone()]).mark(Tag::Add);
        expr.set_body(choice(vec![recursive_case, digit]));

        let (ok, pos) = run(&expr, "1+2+");
        assert!(ok, "the longest valid prefix \"1+2\" must still succeed");
        assert_eq!(pos, 3);
    }

    #[test]
    fn left_recursive_match_nests_left_associatively() {
        let expr: Rule<CharInput, Tag> = Rule::new("expr");
        let digit = range('0', '9').mark(Tag::Digit);
        let recursive_case = seq(vec![expr.as_combinator(), lit("+"), digit.clone()]).mark(Tag::Add);
        expr.set_body(choice(vec![recursive_case, digit]));

        let view = CharInput::new("1+2+3");
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&view, 0);
        assert!(expr.as_combinator().run(&mut ctx));

        let matches = ctx.matches();
        // Two Add matches (for "1+2" then "1+2+3") plus three Digit matches.
        let add_count = matches.iter().filter(|m| m.id == Tag::Add).count();
        let digit_count = matches.iter().filter(|m| m.id == Tag::Digit).count();
        assert_eq!(add_count, 2);
        assert_eq!(digit_count, 3);
        let outermost = matches.last().unwrap();
        assert_eq!(outermost.id, Tag::Add);
        assert_eq!((outermost.begin, outermost.end), (0, 5));
    }

    // An ancestor rule simply delegating to a left-recursive rule at the
    // same position (e.g. `expr <- term` where `term` itself recurses)
    // must not be mistaken for indirect recursion — `term`'s own grow loop
    // never passes back through `expr`.
    #[test]
    fn delegating_to_a_left_recursive_rule_does_not_panic() {
        let expr: Rule<CharInput, Tag> = Rule::new("expr");
        let term: Rule<CharInput, Tag> = Rule::new("term");
        let digit = range('0', '9').mark(Tag::Digit);
        let mul = seq(vec![term.as_combinator(), lit("*"), digit.clone()]).mark(Tag::Add);
        term.set_body(choice(vec![mul, digit]));
        expr.set_body(term.as_combinator());

        let (ok, pos) = run(&expr, "2*3*4");
        assert!(ok);
        assert_eq!(pos, 5);
    }

    // Two distinct rules left-recursing into each other with no direct
    // self-reference in either one (`a <- b`, `b <- a`) must panic rather
    // than silently fail the grammar.
    #[test]
    fn indirect_left_recursion_between_distinct_rules_panics() {
        let a: Rule<CharInput, Tag> = Rule::new("a");
        let b: Rule<CharInput, Tag> = Rule::new("b");
        a.set_body(b.as_combinator());
        b.set_body(a.as_combinator());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(&a, "x")));
        assert!(
            result.is_err(),
            "mutual left recursion between distinct rules must panic, not silently fail"
        );
    }
}
