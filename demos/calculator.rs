//! Runnable demo: builds the arithmetic grammar from `peggrow`'s public
//! combinator API and parses an expression given on the command line (or
//! a default one), printing the reconstructed parse tree.

use peggrow::combinator::{choice, lit, range, seq, Combinator};
use peggrow::driver::{parse, DriverConfig};
use peggrow::input::CharInput;
use peggrow::rule::Rule;
use peggrow::tree::{reconstruct, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Number,
    Add,
    Sub,
    Mul,
    Div,
    Group,
}

fn calculator() -> Combinator<CharInput, Tag> {
    let expr: Rule<CharInput, Tag> = Rule::new("expr");
    let term: Rule<CharInput, Tag> = Rule::new("term");
    let factor: Rule<CharInput, Tag> = Rule::new("factor");

    let number = range('0', '9').plus().mark(Tag::Number);
    let group = seq(vec![lit("("), expr.as_combinator(), lit(")")]).mark(Tag::Group);
    factor.set_body(choice(vec![number, group]));

    let mul = seq(vec![term.as_combinator(), lit("*"), factor.as_combinator()]).mark(Tag::Mul);
    let div = seq(vec![term.as_combinator(), lit("/"), factor.as_combinator()]).mark(Tag::Div);
    term.set_body(choice(vec![mul, div, factor.as_combinator()]));

    let add = seq(vec![expr.as_combinator(), lit("+"), term.as_combinator()]).mark(Tag::Add);
    let sub = seq(vec![expr.as_combinator(), lit("-"), term.as_combinator()]).mark(Tag::Sub);
    expr.set_body(choice(vec![add, sub, term.as_combinator()]));

    expr.as_combinator()
}

fn print_node(node: &Node<Tag>, depth: usize) {
    println!("{}{:?} [{}, {})", "  ".repeat(depth), node.id, node.begin, node.end);
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn main() {
    let input = std::env::args().nth(1).unwrap_or_else(|| "1+2*(3+4)".to_string());
    let grammar = calculator();
    let view = CharInput::new(&input);
    let outcome = parse(&grammar, &view, DriverConfig::default());

    if !outcome.ok {
        let (line, col) = peggrow::driver::furthest_failure_line_col(&view, &outcome);
        eprintln!("parse failed at line {line}, column {col}");
        std::process::exit(1);
    }

    println!("parsed {:?} -> end {}", input, outcome.end);
    for node in reconstruct(&outcome.matches) {
        print_node(&node, 0);
    }
}
