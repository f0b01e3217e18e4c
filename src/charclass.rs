//! Character-range sets and Unicode-category sugar for `char`-based grammars.
//!
//! This is convenience built on top of the generic core (§11.2 of
//! SPEC_FULL.md): `RangeSet` and `unicode_category` are not core primitives,
//! they are `CharInput`-specific helpers assembled from the generic
//! `TerminalRange`/`TerminalSet` combinators. Carried over from the
//! teacher's `charclass.rs`, trimmed to the range-set algebra this crate
//! actually uses.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use unicode_general_category::{get_general_category, GeneralCategory};

/// A sorted, merged set of inclusive `char` ranges.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RangeSet {
    ranges: Vec<(char, char)>,
}

impl RangeSet {
    pub fn new() -> Self {
        RangeSet { ranges: Vec::new() }
    }

    pub fn from_char(ch: char) -> Self {
        RangeSet {
            ranges: vec![(ch, ch)],
        }
    }

    pub fn from_range(start: char, end: char) -> Self {
        if start <= end {
            RangeSet {
                ranges: vec![(start, end)],
            }
        } else {
            RangeSet::new()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn add_range(&mut self, start: char, end: char) {
        if start > end {
            return;
        }
        self.ranges.push((start, end));
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.ranges.len() <= 1 {
            return;
        }
        self.ranges.sort_by_key(|r| r.0);
        let mut merged = Vec::with_capacity(self.ranges.len());
        let mut current = self.ranges[0];
        for &(start, end) in &self.ranges[1..] {
            if start as u32 <= current.1 as u32 + 1 {
                current.1 = current.1.max(end);
            } else {
                merged.push(current);
                current = (start, end);
            }
        }
        merged.push(current);
        self.ranges = merged;
    }

    pub fn union(&self, other: &RangeSet) -> RangeSet {
        let mut result = self.clone();
        for &(start, end) in &other.ranges {
            result.add_range(start, end);
        }
        result
    }

    pub fn contains(&self, ch: char) -> bool {
        self.ranges.iter().any(|&(start, end)| ch >= start && ch <= end)
    }

    /// The sorted, merged `(start, end)` ranges backing this set — used by
    /// `combinator::char_class` to build a `Choice` of `TerminalRange`s
    /// (§11.2: this type is sugar over the generic core, not a new
    /// primitive, so it exposes its ranges rather than parsing itself).
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }
}

impl FromIterator<(char, char)> for RangeSet {
    fn from_iter<I: IntoIterator<Item = (char, char)>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        for (start, end) in iter {
            set.add_range(start, end);
        }
        set
    }
}

/// Build the `RangeSet` of all `char`s in Unicode general category `cat`,
/// e.g. `GeneralCategory::UppercaseLetter` for `\p{Lu}`.
///
/// Scanning every codepoint is expensive, so results are cached by
/// category for the process lifetime — a grammar that references the same
/// category from several rules only pays the scan once.
pub fn unicode_category_rangeset(cat: GeneralCategory) -> RangeSet {
    static CACHE: OnceLock<Mutex<HashMap<GeneralCategory, RangeSet>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(set) = cache.lock().unwrap().get(&cat) {
        return set.clone();
    }

    let set = compute_category_rangeset(cat);
    cache.lock().unwrap().insert(cat, set.clone());
    set
}

fn compute_category_rangeset(cat: GeneralCategory) -> RangeSet {
    let mut set = RangeSet::new();
    let mut run: Option<(char, char)> = None;
    for code in 0u32..=0x10FFFF {
        let Some(ch) = char::from_u32(code) else { continue };
        if get_general_category(ch) == cat {
            match &mut run {
                Some((_, end)) if code == *end as u32 + 1 => *end = ch,
                Some((start, end)) => {
                    set.add_range(*start, *end);
                    run = Some((ch, ch));
                }
                None => run = Some((ch, ch)),
            }
        }
    }
    if let Some((start, end)) = run {
        set.add_range(start, end);
    }
    set
}
