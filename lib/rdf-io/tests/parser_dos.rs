//! Parser resource-budget tests.
//!
//! Grounded on the reference workspace's `oxttl/tests/parser_dos.rs`: a deeply nested
//! blank-node property list or collection must not be allowed to grow the parser's explicit
//! state stack without bound. §4.1 calls this `BadStack`/`Status::Overflow`; this crate raises
//! it as `ReadError::StackOverflow`.

use rdf_core::model::{Model, ModelOptions};
use rdf_io::{Inserter, ReadError, Reader, ReaderOptions, Syntax};

fn nested_collections(depth: usize) -> String {
    let mut turtle = String::from("@prefix : <http://example.org/> .\n:s :p ");
    for _ in 0..depth {
        turtle.push_str("( ");
    }
    turtle.push_str(":value ");
    for _ in 0..depth {
        turtle.push_str(") ");
    }
    turtle.push('.');
    turtle
}

fn nested_blank_nodes(depth: usize) -> String {
    let mut turtle = String::from("@prefix : <http://example.org/> .\n:s :p ");
    for _ in 0..depth {
        turtle.push_str("[ :p ");
    }
    turtle.push_str(":value ");
    for _ in 0..depth {
        turtle.push_str("] ");
    }
    turtle.push('.');
    turtle
}

fn read_all(input: &str, stack_bytes: usize) -> Result<(), ReadError> {
    let mut model = Model::new(ModelOptions::default());
    let sink = Inserter::new(&mut model);
    let mut reader = Reader::new(
        Syntax::Turtle,
        ReaderOptions::default().with_stack_bytes(stack_bytes),
        sink,
    );
    reader.start(
        std::io::Cursor::new(input.as_bytes().to_vec()),
        "doc.ttl",
        4096,
    );
    reader.read_document()?;
    reader.finish()?;
    Ok(())
}

#[test]
fn deeply_nested_collections_are_rejected() {
    let turtle = nested_collections(10_000);
    let result = read_all(&turtle, 8192);
    assert!(
        matches!(result, Err(ReadError::StackOverflow { .. })),
        "expected a stack overflow error, got {result:?}"
    );
}

#[test]
fn deeply_nested_blank_nodes_are_rejected() {
    let turtle = nested_blank_nodes(10_000);
    let result = read_all(&turtle, 8192);
    assert!(
        matches!(result, Err(ReadError::StackOverflow { .. })),
        "expected a stack overflow error, got {result:?}"
    );
}

#[test]
fn moderate_nesting_is_allowed_under_the_default_budget() {
    let turtle = nested_collections(20);
    read_all(&turtle, 8192).expect("moderate nesting should be allowed");
}

#[test]
fn normal_input_still_works() {
    let turtle = r#"
        @prefix : <http://example.org/> .
        :subject :predicate :object .
        :foo :bar ( :item1 :item2 :item3 ) .
        :baz :qux [ :nested :value ] .
    "#;
    read_all(turtle, 8192).expect("normal input should parse successfully");
}
