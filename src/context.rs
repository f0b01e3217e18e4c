//! The parse context: backtrackable position, append-only match log,
//! furthest-failure tracking, and the left-recursion memo (§3, §4.1).
//!
//! This is the generalization of the teacher's `parse_context.rs`
//! (`ParseContext` holding a `rule_name`/`depth`/`left_recursion` call
//! stack) into the full `(rule identity, position)`-keyed memo the
//! left-recursion fixpoint in `rule.rs` needs.

use crate::input::{InputView, Position};
use std::collections::HashMap;

/// A tagged span recorded by a `Match` combinator (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    pub id: T,
    pub begin: Position,
    pub end: Position,
    pub child_count: usize,
}

/// An opaque snapshot used to restore `ParseContext` on backtrack.
/// `furthest_failure_pos` is deliberately not part of the snapshot: it
/// only ever advances (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: Position,
    match_len: usize,
}

impl Checkpoint {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn match_len(&self) -> usize {
        self.match_len
    }
}

/// Which phase of Warth's seed/grow algorithm a rule activation is in at a
/// given `(rule, position)` (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LrState {
    /// Evaluating the non-recursive seed; any re-entry must fail.
    Base,
    /// Growing: re-entries succeed immediately with the current best result.
    Continuation,
}

/// Per-rule, per-position left-recursion bookkeeping (§3).
///
/// `best_matches` holds a copy of the match records produced by the best
/// grow iteration so far. This is the log-based engine's analogue of
/// Warth's algorithm memoizing the whole "answer" per `(rule, position)`:
/// each grow iteration truncates the live log back to `start_match_count`
/// and re-evaluates the rule body from scratch, so when a recursive
/// reference to the same rule at the same position resolves via
/// `LrState::Continuation`, the matches its previous best iteration
/// produced have to be replayed back into the live log rather than merely
/// counted.
#[derive(Debug, Clone)]
pub struct LeftRecursionEntry<T> {
    pub state: LrState,
    pub start_pos: Position,
    pub start_match_count: usize,
    pub continuation_resolved: bool,
    /// The best (furthest) position reached so far by the grow loop.
    pub best_end_pos: Position,
    /// Matches produced by the best grow iteration, in log order.
    pub best_matches: Vec<Match<T>>,
    /// Set when a recursive call re-enters this entry while it is still
    /// `Base`: the seed actually recursed, so the grow loop is worth
    /// running. Rules that never recurse skip straight from seed to result.
    pub recursive: bool,
    /// Identity of the rule that is seeding at this position — used to
    /// detect indirect left recursion (§9).
    pub seeding_rule: usize,
}

/// The mutable state threaded through every combinator during one parse
/// (§2, §4.1). Owns nothing about the grammar; it only knows about
/// position, matches, and left-recursion state.
pub struct ParseContext<'i, I: InputView, T> {
    input: &'i I,
    position: Position,
    matches: Vec<Match<T>>,
    furthest_failure: Position,
    lr_memo: HashMap<(usize, Position), LeftRecursionEntry<T>>,
    /// Stack of rules currently seeding, `(rule id, start position, name)`.
    /// Used only to detect indirect left recursion (§9): two distinct
    /// rules both mid-seed at the exact same unconsumed position can only
    /// arise from a left-recursive cycle that doesn't loop directly back
    /// to either rule on its own.
    active_seeds: Vec<(usize, Position, String)>,
}

impl<'i, I: InputView, T> ParseContext<'i, I, T> {
    /// Build a context over `input`. `preallocate_log` is a capacity hint
    /// for the match log (§5: "implementations should preallocate the log
    /// with a capacity hint").
    pub fn new(input: &'i I, preallocate_log: usize) -> Self {
        let begin = input.begin();
        ParseContext {
            input,
            position: begin,
            matches: Vec::with_capacity(preallocate_log),
            furthest_failure: begin,
            lr_memo: HashMap::new(),
            active_seeds: Vec::new(),
        }
    }

    pub fn input(&self) -> &'i I {
        self.input
    }

    pub fn current(&self) -> Position {
        self.position
    }

    /// The symbol under the cursor, or `None` at end of input.
    pub fn current_symbol(&self) -> Option<I::Symbol> {
        self.input.at(self.position)
    }

    /// Consume the current symbol and move the cursor forward by one.
    /// Callers must have already checked `current_symbol()` succeeds.
    pub fn bump(&mut self) -> Position {
        self.position = self.input.advance(self.position);
        self.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            match_len: self.matches.len(),
        }
    }

    /// Restore position and match log to a prior checkpoint. Does not
    /// rewind `furthest_failure_pos`, which only ever advances.
    pub fn restore(&mut self, cp: Checkpoint) {
        self.position = cp.position;
        self.matches.truncate(cp.match_len);
    }

    pub fn append_match(&mut self, id: T, begin: Position, end: Position, child_count: usize) -> usize {
        self.matches.push(Match {
            id,
            begin,
            end,
            child_count,
        });
        self.matches.len()
    }

    pub fn truncate_matches(&mut self, len: usize) {
        self.matches.truncate(len);
    }

    pub fn match_len(&self) -> usize {
        self.matches.len()
    }

    pub fn matches(&self) -> &[Match<T>] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<Match<T>> {
        self.matches
    }

    /// Record that a combinator failed at `pos`. `furthest_failure_pos`
    /// only ever moves forward.
    pub fn record_failure(&mut self, pos: Position) {
        if pos > self.furthest_failure {
            self.furthest_failure = pos;
        }
    }

    pub fn furthest_failure(&self) -> Position {
        self.furthest_failure
    }

    pub fn lr_lookup(&self, rule_id: usize, pos: Position) -> Option<&LeftRecursionEntry<T>> {
        self.lr_memo.get(&(rule_id, pos))
    }

    pub fn lr_lookup_mut(&mut self, rule_id: usize, pos: Position) -> Option<&mut LeftRecursionEntry<T>> {
        self.lr_memo.get_mut(&(rule_id, pos))
    }

    pub fn lr_insert(&mut self, rule_id: usize, pos: Position, entry: LeftRecursionEntry<T>) {
        self.lr_memo.insert((rule_id, pos), entry);
    }

    pub fn lr_remove(&mut self, rule_id: usize, pos: Position) -> Option<LeftRecursionEntry<T>> {
        self.lr_memo.remove(&(rule_id, pos))
    }

    /// Re-append a previously captured slice of matches (used by the
    /// Continuation path of the left-recursion dispatcher to replay the
    /// best grow iteration's matches into a freshly truncated log).
    pub fn extend_matches(&mut self, extra: &[Match<T>])
    where
        T: Clone,
    {
        self.matches.extend_from_slice(extra);
    }

    /// Copy out the matches appended since `from` (used to snapshot the
    /// best grow iteration so it can be replayed later).
    pub fn matches_since(&self, from: usize) -> Vec<Match<T>>
    where
        T: Clone,
    {
        self.matches[from..].to_vec()
    }

    pub fn active_push(&mut self, rule_id: usize, pos: Position, name: String) {
        self.active_seeds.push((rule_id, pos, name));
    }

    pub fn active_pop(&mut self) {
        self.active_seeds.pop();
    }

    /// Called when `rule_id` is reentered at `pos` while its own seed is
    /// still running (an ordinary direct-left-recursion signal). Looks for
    /// a different rule's frame pushed *after* `rule_id`'s own frame at
    /// this exact position — i.e. one that was invoked, without consuming
    /// any input, while this seed was in progress and hasn't returned yet.
    ///
    /// A plain self-call never pushes anything in between, so this is
    /// `None` for ordinary direct recursion. It is only `Some` when the
    /// call chain actually left `rule_id` for a distinct rule and came
    /// back — the signature of indirect left recursion (§9). This must
    /// not be checked merely because some other rule happens to be active
    /// at `pos`: an ancestor rule that is simply delegating to `rule_id`
    /// (e.g. `expr <- add | sub | term` falling through to `term`) is
    /// always on the stack *before* `rule_id`'s own frame, never after it,
    /// so it is correctly excluded by only scanning what follows.
    pub fn active_conflict_after(&self, rule_id: usize, pos: Position) -> Option<(usize, String)> {
        let start = self
            .active_seeds
            .iter()
            .position(|(id, p, _)| *id == rule_id && *p == pos)?;
        self.active_seeds[start + 1..]
            .iter()
            .find(|(_, p, _)| *p == pos)
            .map(|(id, _, name)| (*id, name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CharInput;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
    }

    #[test]
    fn checkpoint_restore_round_trips_position_and_matches() {
        let input = CharInput::new("abc");
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&input, 0);
        let cp = ctx.checkpoint();
        ctx.bump();
        ctx.append_match(Tag::A, 0, 1, 0);
        assert_eq!(ctx.current(), 1);
        assert_eq!(ctx.match_len(), 1);

        ctx.restore(cp);
        assert_eq!(ctx.current(), 0);
        assert_eq!(ctx.match_len(), 0);
    }

    #[test]
    fn furthest_failure_is_monotonic() {
        let input = CharInput::new("abc");
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&input, 0);
        ctx.record_failure(2);
        assert_eq!(ctx.furthest_failure(), 2);
        ctx.record_failure(1);
        assert_eq!(ctx.furthest_failure(), 2, "failure position must not move backward");
        ctx.record_failure(3);
        assert_eq!(ctx.furthest_failure(), 3);
    }

    #[test]
    fn restore_does_not_rewind_furthest_failure() {
        let input = CharInput::new("abc");
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&input, 0);
        let cp = ctx.checkpoint();
        ctx.record_failure(2);
        ctx.restore(cp);
        assert_eq!(ctx.furthest_failure(), 2);
    }

    #[test]
    fn lr_memo_insert_lookup_remove() {
        let input = CharInput::new("abc");
        let mut ctx: ParseContext<CharInput, Tag> = ParseContext::new(&input, 0);
        let entry: LeftRecursionEntry<Tag> = LeftRecursionEntry {
            state: LrState::Base,
            start_pos: 0,
            start_match_count: 0,
            continuation_resolved: false,
            best_end_pos: 0,
            best_matches: Vec::new(),
            recursive: false,
            seeding_rule: 7,
        };
        ctx.lr_insert(7, 0, entry);
        assert!(ctx.lr_lookup(7, 0).is_some());
        assert!(ctx.lr_lookup(7, 1).is_none());
        let removed = ctx.lr_remove(7, 0);
        assert!(removed.is_some());
        assert!(ctx.lr_lookup(7, 0).is_none());
    }
}
