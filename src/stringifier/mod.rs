//! C9 — renders a [`Document`] or a bare [`Value`] back to canonical text.
//!
//! Grounded on the teacher's `schema/safe/canonical_form.rs`: walk the
//! already-structured value, emit canonical tokens, with no dependence on
//! how (or whether) the value was originally written.

use std::fmt::Write as _;

use base64::Engine;

use crate::document::{Document, Section, SectionValue};
use crate::schema::Schema;
use crate::value::{Record, Value};

/// Tunables for [`stringify`] / [`stringify_document`].
#[derive(Clone, Debug)]
pub struct StringifyOptions {
	/// Spaces per indent level; `0` renders on one line with no extra
	/// whitespace.
	pub indent: usize,
	/// Render `Value::Error` placeholders as `null` instead of an inline
	/// `<error: ...>` marker.
	pub skip_errors: bool,
	/// Prefix each literal with its type name in parentheses, for debugging
	/// output.
	pub include_types: bool,
	/// Only used by [`stringify`] (schema-less): annotate the output with
	/// this schema's name in a leading comment.
	pub schema_name: Option<String>,
	/// Emit a header block (`@var: value, ...`) before the first section.
	pub include_header: bool,
	/// Emit `--- name` separator lines between sections.
	pub include_section_names: bool,
	/// Only emit sections whose name is in this set; `None` emits all.
	pub sections_filter: Option<Vec<String>>,
	/// Render booleans as `true`/`false` instead of `T`/`F`.
	pub long_booleans: bool,
}

impl Default for StringifyOptions {
	fn default() -> Self {
		Self {
			indent: 0,
			skip_errors: false,
			include_types: false,
			schema_name: None,
			include_header: true,
			include_section_names: true,
			sections_filter: None,
			long_booleans: false,
		}
	}
}

/// Renders a single value with no document structure around it.
pub fn stringify(value: &Value, options: &StringifyOptions) -> String {
	let mut out = String::new();
	write_value(&mut out, value, options, 0);
	out
}

/// Renders a whole document: optional header, then each section in order.
pub fn stringify_document(document: &Document, options: &StringifyOptions) -> String {
	let mut out = String::new();

	if options.include_header && !document.definitions.is_empty() {
		let mut entries = document.definitions.iter();
		let only = entries.next().filter(|_| entries.next().is_none());
		match only {
			// Sugar form (spec §4.7): the header is *just* the default
			// schema, so round-trip it the same way it's read back in — a
			// bare object with no `$schema:` key and no `~` prefix. (The
			// general "$schema: {...}" keyed form would parse back as a
			// schema definition nested *under* a `$schema` member instead of
			// *being* the default schema — see `Document::populate_definitions`.)
			Some(("schema", crate::definitions::DefinitionValue::Schema(value))) => {
				write_value(&mut out, value, options, 0);
				out.push('\n');
			}
			_ => {
				for (name, def) in document.definitions.iter() {
					let sigil = match def {
						crate::definitions::DefinitionValue::Schema(_) => "$",
						crate::definitions::DefinitionValue::Variable(_) => "@",
					};
					let _ = write!(out, "~ {sigil}{name}: ");
					write_value(&mut out, def.value(), options, 0);
					out.push('\n');
				}
			}
		}
	}

	for section in &document.sections {
		if let Some(filter) = &options.sections_filter {
			if section.name.as_deref().map(|n| filter.iter().any(|f| f == n)) != Some(true) {
				continue;
			}
		}
		write_section(&mut out, section, options);
	}

	out
}

fn write_section(out: &mut String, section: &Section, options: &StringifyOptions) {
	out.push_str("---");
	if options.include_section_names {
		if let Some(name) = &section.name {
			let _ = write!(out, " {name}");
		}
		if let Some(schema_name) = &section.schema_name {
			let _ = write!(out, ":${schema_name}");
		}
	}
	out.push('\n');
	match &section.body {
		SectionValue::Object(record) => {
			write_record_body(out, record, section.schema.as_ref(), options);
			out.push('\n');
		}
		SectionValue::Collection(items) => {
			for item in items {
				out.push_str("~ ");
				match item {
					Value::Object(record) => write_record_body(out, record, section.schema.as_ref(), options),
					other => write_value(out, other, options, 0),
				}
				out.push('\n');
			}
		}
	}
}

/// Emits one row's members. When `schema` is known, members are written
/// positionally in the schema's declaration order, with no keys (spec §4.7);
/// any extra key an open schema let through is appended afterward, keyed,
/// since it has no positional slot. With no schema, every member is written
/// keyed, in record order.
fn write_record_body(out: &mut String, record: &Record, schema: Option<&Schema>, options: &StringifyOptions) {
	let mut first = true;
	let Some(schema) = schema else {
		for (key, value) in record.iter() {
			if !first {
				out.push_str(", ");
			}
			first = false;
			let _ = write!(out, "{key}: ");
			write_value(out, value, options, 0);
		}
		return;
	};

	for name in schema.member_order() {
		if !first {
			out.push_str(", ");
		}
		first = false;
		let value = record.get(name).unwrap_or(&Value::Undefined);
		write_value(out, value, options, 0);
	}
	for (key, value) in record.iter() {
		if schema.members.contains_key(key) {
			continue;
		}
		if !first {
			out.push_str(", ");
		}
		first = false;
		let _ = write!(out, "{key}: ");
		write_value(out, value, options, 0);
	}
}

fn write_value(out: &mut String, value: &Value, options: &StringifyOptions, depth: usize) {
	if options.include_types {
		let _ = write!(out, "({})", value.type_name());
	}
	match value {
		Value::Null => out.push_str("null"),
		Value::Undefined => out.push('?'),
		Value::Bool(b) => {
			if options.long_booleans {
				out.push_str(if *b { "true" } else { "false" });
			} else {
				out.push_str(if *b { "T" } else { "F" });
			}
		}
		Value::Number(n) => {
			let _ = write!(out, "{n}");
		}
		Value::BigInt(b) => {
			let _ = write!(out, "{b}n");
		}
		Value::Decimal(d) => {
			let _ = write!(out, "{d}m");
		}
		Value::String(s) => write_string_literal(out, s),
		Value::DateTime(dt) => {
			let _ = write!(out, "dt'{}'", dt.to_rfc3339());
		}
		Value::Date(d) => {
			let _ = write!(out, "d'{}'", d.format("%Y-%m-%d"));
		}
		Value::Time(t) => {
			let _ = write!(out, "t'{}'", t.format("%H:%M:%S"));
		}
		Value::Binary(bytes) => {
			let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
			let _ = write!(out, "b'{encoded}'");
		}
		Value::Array(items) => {
			out.push('[');
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_value(out, item, options, depth + 1);
			}
			out.push(']');
		}
		Value::Object(record) => {
			out.push('{');
			write_record_body(out, record, None, options);
			out.push('}');
		}
		Value::Error(e) => {
			if options.skip_errors {
				out.push_str("null");
			} else {
				let _ = write!(out, "<error: {e}>");
			}
		}
	}
}

fn write_string_literal(out: &mut String, s: &str) {
	let needs_quotes = s.is_empty()
		|| !s.chars().next().unwrap().is_alphabetic()
		|| s.chars().any(|c| c.is_whitespace() || matches!(c, ',' | ':' | '{' | '}' | '[' | ']' | '~'));
	if !needs_quotes {
		out.push_str(s);
		return;
	}
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			other => out.push(other),
		}
	}
	out.push('"');
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_bareword_strings_are_not_quoted() {
		let mut out = String::new();
		write_value(&mut out, &Value::String("hello".to_owned()), &StringifyOptions::default(), 0);
		assert_eq!(out, "hello");
	}

	#[test]
	fn strings_with_commas_are_quoted_and_escaped() {
		let mut out = String::new();
		write_value(
			&mut out,
			&Value::String("a, b".to_owned()),
			&StringifyOptions::default(),
			0,
		);
		assert_eq!(out, "\"a, b\"");
	}

	#[test]
	fn booleans_render_short_by_default() {
		assert_eq!(stringify(&Value::Bool(true), &StringifyOptions::default()), "T");
	}

	#[test]
	fn booleans_render_long_when_requested() {
		let options = StringifyOptions {
			long_booleans: true,
			..StringifyOptions::default()
		};
		assert_eq!(stringify(&Value::Bool(false), &options), "false");
	}

	#[test]
	fn a_known_schema_emits_the_row_positionally() {
		use crate::schema::MemberDef;

		let mut schema = Schema::default();
		schema.members.insert("name".to_owned(), MemberDef::scalar("string"));
		schema.members.insert("n".to_owned(), MemberDef::scalar("int"));

		let mut record = Record::new();
		record.insert("name".to_owned(), Value::String("Alice".to_owned()));
		record.insert("n".to_owned(), Value::Number(42.0));

		let mut out = String::new();
		write_record_body(&mut out, &record, Some(&schema), &StringifyOptions::default());
		assert_eq!(out, "Alice, 42");
	}

	#[test]
	fn an_open_schemas_extra_members_are_appended_keyed() {
		use crate::schema::MemberDef;

		let mut schema = Schema::default();
		schema.members.insert("name".to_owned(), MemberDef::scalar("string"));
		schema.open = true;

		let mut record = Record::new();
		record.insert("name".to_owned(), Value::String("Alice".to_owned()));
		record.insert("note".to_owned(), Value::String("vip".to_owned()));

		let mut out = String::new();
		write_record_body(&mut out, &record, Some(&schema), &StringifyOptions::default());
		assert_eq!(out, "Alice, note: vip");
	}

	#[test]
	fn with_no_schema_every_member_is_written_keyed() {
		let mut record = Record::new();
		record.insert("name".to_owned(), Value::String("Alice".to_owned()));
		record.insert("n".to_owned(), Value::Number(42.0));

		let mut out = String::new();
		write_record_body(&mut out, &record, None, &StringifyOptions::default());
		assert_eq!(out, "name: Alice, n: 42");
	}

	#[test]
	fn a_lone_default_schema_header_round_trips_as_the_bare_sugar_form() {
		let doc = crate::load_document("name: string, n: int\n---\nAlice, 42");
		let text = stringify_document(&doc, &StringifyOptions::default());
		assert!(
			text.starts_with("{name: string, n: int}\n"),
			"expected the bare sugar line with no `$schema:` key, got: {text:?}"
		);
		let reparsed = crate::load_document(&text);
		assert_eq!(reparsed.definitions, doc.definitions);
	}

	#[test]
	fn multiple_header_definitions_round_trip_as_one_tilde_line_each() {
		let doc = crate::load_document("~ r: red\n~ $schema: { name, color }\n---\n~ Spiderman, $r\n");
		let text = stringify_document(&doc, &StringifyOptions::default());
		assert!(text.contains("~ @r: red\n"), "expected a tilde-prefixed variable line, got: {text:?}");
		assert!(text.contains("~ $schema: "), "expected a tilde-prefixed schema line, got: {text:?}");
	}
}
