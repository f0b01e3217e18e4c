//! Reference parse-tree reconstruction from a flat match log (§6, §11.3).
//!
//! The match log is the primary artifact this crate produces; a nested
//! tree is a convenience view over it, not something the core combinators
//! build directly (keeping the hot path allocation-free per match, as
//! `native_parser.rs`'s `XmlNode`-per-match approach does not). Walking
//! the log right-to-left and consuming `child_count` preceding records
//! mirrors how the teacher's `xml_node.rs` builds `XmlNode` trees from its
//! own flatter intermediate representation, generalized to any `Tag`.

use crate::context::Match;
use crate::input::Position;

/// One node of a reconstructed parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub id: T,
    pub begin: Position,
    pub end: Position,
    pub children: Vec<Node<T>>,
}

/// Rebuild the forest of top-level nodes from a match log produced by one
/// successful parse. Matches are appended in post-order (§3), so a single
/// right-to-left pass can consume each node's `child_count` immediately
/// preceding siblings without extra bookkeeping.
pub fn reconstruct<T: Clone>(matches: &[Match<T>]) -> Vec<Node<T>> {
    let mut remaining = matches.len();
    let mut forest = Vec::new();
    while remaining > 0 {
        let (node, consumed) = build_one(matches, remaining);
        remaining -= consumed;
        forest.push(node);
    }
    forest.reverse();
    forest
}

/// Build the node ending at `matches[end - 1]`, returning it along with
/// how many log entries (itself plus all descendants) it consumed.
fn build_one<T: Clone>(matches: &[Match<T>], end: usize) -> (Node<T>, usize) {
    let m = &matches[end - 1];
    let mut children = Vec::with_capacity(m.child_count);
    let mut cursor = end - 1;
    for _ in 0..m.child_count {
        let (child, consumed) = build_one(matches, cursor);
        cursor -= consumed;
        children.push(child);
    }
    children.reverse();
    (
        Node {
            id: m.id.clone(),
            begin: m.begin,
            end: m.end,
            children,
        },
        end - cursor,
    )
}

/// How many log entries the node ending at `matches[end - 1]` consumed —
/// itself plus every descendant, found by recursively walking back over
/// each immediate child's own `child_count`. `Match::run` in
/// `combinator.rs` uses this to turn "how many log entries has the log
/// grown by since my checkpoint" into "how many of those are my own
/// *immediate* children" (a match's `child_count` counts only direct
/// children, per the format this module's `build_one` walk relies on).
pub(crate) fn span<T>(matches: &[Match<T>], end: usize) -> usize {
    let m = &matches[end - 1];
    let mut cursor = end - 1;
    for _ in 0..m.child_count {
        cursor -= span(matches, cursor);
    }
    end - cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Digit,
        Add,
    }

    #[test]
    fn flat_log_with_no_nesting_reconstructs_as_siblings() {
        let matches = vec![
            Match {
                id: Tag::Digit,
                begin: 0,
                end: 1,
                child_count: 0,
            },
            Match {
                id: Tag::Digit,
                begin: 1,
                end: 2,
                child_count: 0,
            },
        ];
        let forest = reconstruct(&matches);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].begin, 0);
        assert_eq!(forest[1].begin, 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn nested_log_reconstructs_parent_with_children_in_order() {
        // "1+2" matched as Add(Digit, Digit): log = [Digit(0,1), Digit(2,3), Add(0,3,child_count=2)]
        let matches = vec![
            Match {
                id: Tag::Digit,
                begin: 0,
                end: 1,
                child_count: 0,
            },
            Match {
                id: Tag::Digit,
                begin: 2,
                end: 3,
                child_count: 0,
            },
            Match {
                id: Tag::Add,
                begin: 0,
                end: 3,
                child_count: 2,
            },
        ];
        let forest = reconstruct(&matches);
        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.id, Tag::Add);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].begin, 0);
        assert_eq!(root.children[1].begin, 2);
    }

    #[test]
    fn deeply_left_nested_log_reconstructs_left_associatively() {
        // "1+2+3": log = [D(0,1), D(2,3), Add(0,3,2), D(4,5), Add(0,5,2)]
        let matches = vec![
            Match { id: Tag::Digit, begin: 0, end: 1, child_count: 0 },
            Match { id: Tag::Digit, begin: 2, end: 3, child_count: 0 },
            Match { id: Tag::Add, begin: 0, end: 3, child_count: 2 },
            Match { id: Tag::Digit, begin: 4, end: 5, child_count: 0 },
            Match { id: Tag::Add, begin: 0, end: 5, child_count: 2 },
        ];
        let forest = reconstruct(&matches);
        assert_eq!(forest.len(), 1);
        let outer = &forest[0];
        assert_eq!(outer.id, Tag::Add);
        assert_eq!((outer.begin, outer.end), (0, 5));
        assert_eq!(outer.children.len(), 2);
        let inner = &outer.children[0];
        assert_eq!(inner.id, Tag::Add);
        assert_eq!((inner.begin, inner.end), (0, 3));
        assert_eq!(outer.children[1].begin, 4);
    }
}
