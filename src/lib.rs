//! peggrow - PEG combinators with direct left recursion
//!
//! A small parsing-expression-grammar engine built from composable
//! combinators, generic over the symbol type being parsed and the tag
//! type attached to matches. Rules may recurse directly into themselves
//! at the position they started from; the dispatcher resolves this with
//! Warth's seed/grow fixpoint instead of rejecting it.
//!
//! # Quick Start
//!
//! ```rust
//! use peggrow::combinator::{choice, lit, range};
//! use peggrow::driver::{parse, DriverConfig};
//! use peggrow::input::CharInput;
//! use peggrow::rule::Rule;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Tag { Digit, Add }
//!
//! let expr: Rule<CharInput, Tag> = Rule::new("expr");
//! let digit = range('0', '9').mark(Tag::Digit);
//! let recursive_case = peggrow::combinator::seq(vec![
//!     expr.as_combinator(), lit("+"), digit.clone(),
//! ]).mark(Tag::Add);
//! expr.set_body(choice(vec![recursive_case, digit]));
//!
//! let input = CharInput::new("1+2+3");
//! let outcome = parse(&expr.as_combinator(), &input, DriverConfig::default());
//! assert!(outcome.ok);
//! ```
//!
//! # Features
//!
//! - Direct left recursion via seed/grow, without value-returning parsers
//! - Generic over input symbol and match tag
//! - Flat, append-only match log with post-order tree reconstruction
//! - Pure safe Rust, single third-party dependency (unicode-general-category)

pub mod charclass;
pub mod combinator;
pub mod context;
pub mod driver;
pub mod error;
pub mod input;
pub mod rule;
pub mod tree;

pub use combinator::{Combinator, Parser};
pub use context::{Match, ParseContext};
pub use driver::{furthest_failure_line_col, parse, DriverConfig, Outcome};
pub use error::GrammarError;
pub use input::{CharInput, InputView, Position};
pub use rule::Rule;
pub use tree::{reconstruct, Node};
