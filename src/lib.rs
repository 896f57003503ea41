//! An idiomatic codec for the Internet Object document format.
//!
//! The format is a human-authored, JSON-adjacent text format: an optional
//! header of schema and variable definitions, followed by one or more named
//! sections, each holding either a single object or a collection of them.
//! Sections can be validated positionally against a compiled schema instead
//! of repeating every key on every record.
//!
//! The pipeline is nine small, independently testable stages:
//!
//! - [`tokenizer`] turns source bytes into a flat token stream. It never
//!   fails outright — anything it can't lex becomes an error token.
//! - [`ast`] is the tree [`parser`] builds from that token stream: a tagged
//!   [`ast::Node`] enum, every variant carrying its own source span and a
//!   `to_value` conversion to the schema-less [`value::Value`] model.
//! - [`definitions`] is the header's `$schema`/`@variable` table.
//! - [`schema`] compiles a raw schema object into an ordered, validated
//!   [`schema::Schema`]; [`types`] is the registry of built-in value types
//!   it dispatches to.
//! - [`processor`] applies a compiled schema to parsed data, producing a
//!   validated [`value::Record`].
//! - [`stringifier`] renders a [`document::Document`] or a bare value back to
//!   canonical text.
//!
//! [`load_document`] wires the first four stages together for the common
//! case of decoding a document without a schema.

pub mod ast;
pub mod definitions;
pub mod document;
pub mod error;
pub mod parser;
pub mod position;
pub mod processor;
pub mod schema;
pub mod stringifier;
pub mod token;
pub mod tokenizer;
pub mod types;
pub mod value;

pub use document::Document;
pub use error::{Category, Error, ErrorCollector, ErrorKind};
pub use schema::Schema;
pub use stringifier::{stringify, stringify_document, StringifyOptions};
pub use value::{Record, Value};

use parser::ParserOptions;
use tokenizer::TokenizerOptions;

/// Bundles [`TokenizerOptions`] and [`ParserOptions`] into the single knob
/// [`load_document_with`] takes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
	pub tokenizer: TokenizerOptions,
	pub parser: ParserOptions,
}

/// Tokenizes, parses, and decodes `source` into a [`Document`], with
/// default options. Never fails: recovered syntax errors end up in
/// [`Document::errors`] instead of aborting the decode.
pub fn load_document(source: &str) -> Document {
	load_document_with(source, ParseOptions::default())
}

/// As [`load_document`], with explicit tokenizer/parser tuning.
pub fn load_document_with(source: &str, options: ParseOptions) -> Document {
	let tokens = tokenizer::tokenize(source, options.tokenizer);
	let (doc_node, errors) = parser::parse(tokens, options.parser);
	document::Document::from_ast(&doc_node, errors)
}

/// Decodes just the header's `$schema`/`@variable` table, ignoring any
/// sections that follow. A convenience over [`load_document`] for callers
/// that only need the definitions (e.g. to resolve a `$ref` elsewhere).
pub fn parse_definitions(source: &str) -> definitions::Definitions {
	load_document(source).definitions
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn load_document_never_panics_on_malformed_input() {
		let doc = load_document("--- a\n{unterminated");
		assert!(!doc.errors.is_empty());
	}

	#[test]
	fn round_trip_stringify_then_reparse_preserves_section_name() {
		let doc = load_document("--- people\nname: \"Ada\", age: 30");
		let text = stringify_document(&doc, &StringifyOptions::default());
		let reparsed = load_document(&text);
		assert_eq!(reparsed.sections[0].name.as_deref(), Some("people"));
	}

	#[test]
	fn header_variables_are_available_via_parse_definitions() {
		let defs = parse_definitions("@currency: \"USD\"\n--- a\n1");
		assert!(defs.get_value("currency").is_some());
	}
}
