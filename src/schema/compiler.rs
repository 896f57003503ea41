//! Turns a raw schema value (the decoded form of a `$name: {...}` header
//! definition, or an inline object given straight to the processor) into a
//! [`Schema`].
//!
//! Member keys carry their own cardinality suffixes, recognized here the way
//! the teacher's `parsing/raw.rs` recognizes a type name vs. a
//! nested-options object vs. a reference before committing to a node shape
//! (spec §4.4): `name` (required), `name?` (optional), `name*` (nullable),
//! `name?*`/`name*?` (optional and nullable). A trailing standalone `*` — a
//! positional member whose value is the bare string `*`, not a key suffix —
//! marks the schema open (unknown keys pass through unvalidated). An array
//! member is written as a one-element array schema (`tags: [string]`), not
//! via a key suffix.
//!
//! A schema member may itself be written with no key at all, just a bareword
//! (`name, age?, gender`, spec scenario S1): there, the *value* is the
//! member's name (with its own cardinality suffixes) and its type defaults
//! to `any` — untyped declaration sugar for "this column exists".

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::ObjectNode;
use crate::definitions::Definitions;
use crate::error::{Error as IoError, ErrorKind};
use crate::position::PositionRange;
use crate::value::Value;

use super::{MemberDef, MemberValue, Schema};

pub fn compile(node: &ObjectNode, definitions: &Rc<RefCell<Definitions>>) -> Result<Schema, IoError> {
	compile_value(&node.to_value(), definitions)
}

pub fn compile_value(value: &Value, definitions: &Rc<RefCell<Definitions>>) -> Result<Schema, IoError> {
	let record = value.as_object().ok_or_else(|| {
		IoError::new(
			ErrorKind::InvalidSchema("schema must be an object".to_owned()),
			PositionRange::default(),
		)
	})?;

	let mut schema = Schema::default();
	for (raw_key, member_value) in record.iter() {
		if looks_positional(raw_key, record) {
			let Value::String(bareword) = member_value else {
				return Err(IoError::new(
					ErrorKind::InvalidSchema("a keyless schema member must be a bareword".to_owned()),
					PositionRange::default(),
				));
			};
			// A standalone `*` marks the schema open rather than declaring a
			// member; anything else keyless is untyped declaration sugar
			// (spec S1): the bareword names the member, typed `any`.
			if bareword == "*" {
				schema.open = true;
			} else {
				let (name, optional, nullable) = split_key(bareword);
				schema.members.insert(
					name,
					MemberDef {
						optional,
						nullable,
						..MemberDef::scalar("any")
					},
				);
			}
			continue;
		}
		let (name, optional, nullable) = split_key(raw_key);
		let member = compile_member(member_value, optional, nullable, definitions)?;
		schema.members.insert(name, member);
	}
	Ok(schema)
}

/// A positional (keyless) schema member gets its to_value record key from
/// its 0-based position among the object's members; a member actually named
/// with that digit string would be indistinguishable, but no type name or
/// constraint keyword is ever a bare digit, so this heuristic is exact in
/// practice.
fn looks_positional(raw_key: &str, record: &crate::value::Record) -> bool {
	raw_key.parse::<usize>().is_ok() && !record.is_empty()
}

/// Splits `"foo?*"` into `("foo", true, true)` (optional, nullable). Order of
/// suffixes doesn't matter (`foo*?` is accepted too).
fn split_key(raw_key: &str) -> (String, bool, bool) {
	let mut optional = false;
	let mut nullable = false;
	let mut end = raw_key.len();
	loop {
		if raw_key[..end].ends_with('?') {
			optional = true;
			end -= 1;
		} else if raw_key[..end].ends_with('*') {
			nullable = true;
			end -= 1;
		} else {
			break;
		}
	}
	(raw_key[..end].to_owned(), optional, nullable)
}

fn compile_member(
	value: &Value,
	optional: bool,
	nullable: bool,
	definitions: &Rc<RefCell<Definitions>>,
) -> Result<MemberDef, IoError> {
	match value {
		Value::String(type_name) => Ok(MemberDef {
			optional,
			nullable,
			..MemberDef::scalar(type_name.clone())
		}),
		// Nested schema (spec §4.4): every member is keyed, with no
		// positional first value naming a type -- `address: {city: string,
		// zip: int}` rather than `age: {int, min: 18}`. Distinguished from a
		// member-def tree by the absence of a "0" key: `to_value` only ever
		// assigns a positional member that slot, so its absence means there's
		// nothing here but a nested object's own member list.
		Value::Object(record) if !record.contains_key("0") => {
			let nested = compile_value(value, definitions)?;
			Ok(MemberDef {
				optional,
				nullable,
				of: Some(Box::new(MemberValue::Inline(nested))),
				..MemberDef::scalar("object")
			})
		}
		Value::Object(record) => {
			// Member-def tree (spec §4.4): the first value — positional, so
			// `to_value` gave it a numeric string key — names the type;
			// every keyed entry after it is a constraint option. A bare
			// positional `optional`/`null` token is also a recognized
			// shorthand for `optional: true` / `nullable: true`.
			let mut type_name = "any".to_owned();
			let mut optional = optional;
			let mut nullable = nullable;
			for (key, entry) in record.iter() {
				if key.parse::<usize>().is_err() {
					continue;
				}
				match entry.as_str() {
					Some("optional") => optional = true,
					Some("null") => nullable = true,
					Some(name) => type_name = name.to_owned(),
					None => {}
				}
			}
			if let Some(explicit) = record.get("type").and_then(Value::as_str) {
				type_name = explicit.to_owned();
			}
			if let Some(explicit) = record.get("optional").and_then(Value::as_bool) {
				optional = explicit;
			}
			if let Some(explicit) = record.get("null").and_then(Value::as_bool) {
				nullable = explicit;
			}
			if let Some(explicit) = record.get("nullable").and_then(Value::as_bool) {
				nullable = explicit;
			}

			let of = match (record.get("of"), record.get("$ref")) {
				(Some(_), Some(_)) => {
					return Err(IoError::new(
						ErrorKind::InvalidSchema("member may not set both `of` and `$ref`".to_owned()),
						PositionRange::default(),
					))
				}
				(Some(nested), None) => Some(Box::new(MemberValue::Inline(compile_value(nested, definitions)?))),
				(None, Some(Value::String(name))) => Some(Box::new(MemberValue::Ref(name.clone()))),
				_ => None,
			};

			Ok(MemberDef {
				type_name,
				optional,
				nullable,
				is_array: false,
				default: record.get("default").cloned(),
				choices: record.get("choices").and_then(Value::as_array).map(|a| a.to_vec()),
				min: record.get("min").and_then(Value::as_number),
				max: record.get("max").and_then(Value::as_number),
				len: record.get("len").and_then(Value::as_number).map(|n| n as usize),
				min_length: record.get("minLen").and_then(Value::as_number).map(|n| n as usize),
				max_length: record.get("maxLen").and_then(Value::as_number).map(|n| n as usize),
				pattern: record.get("pattern").and_then(Value::as_str).map(str::to_owned),
				precision: record.get("precision").and_then(Value::as_number).map(|n| n as u32),
				scale: record.get("scale").and_then(Value::as_number).map(|n| n as u32),
				of,
			})
		}
		// A one-element array schema (`tags: [string]`, `tags: [{int, min:0}]`)
		// declares an array member whose element type is the inner def.
		Value::Array(items) if items.len() == 1 => {
			let element = compile_member(&items[0], false, false, definitions)?;
			Ok(MemberDef {
				optional,
				nullable,
				is_array: true,
				..element
			})
		}
		other => Err(IoError::new(
			ErrorKind::InvalidSchema(format!("unsupported member definition shape: {}", other.type_name())),
			PositionRange::default(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::Record;

	fn defs() -> Rc<RefCell<Definitions>> {
		Rc::new(RefCell::new(Definitions::new()))
	}

	#[test]
	fn scalar_member_with_suffixes() {
		let mut record = Record::new();
		record.insert("name?*".to_owned(), Value::String("string".to_owned()));
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		let member = schema.member("name").unwrap();
		assert!(member.optional);
		assert!(member.nullable);
		assert_eq!(member.type_name, "string");
	}

	#[test]
	fn keyless_barewords_name_the_member_and_default_to_any() {
		let mut record = Record::new();
		record.insert("0".to_owned(), Value::String("name".to_owned()));
		record.insert("1".to_owned(), Value::String("age?".to_owned()));
		record.insert("2".to_owned(), Value::String("gender".to_owned()));
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		assert_eq!(schema.member_order().collect::<Vec<_>>(), vec!["name", "age", "gender"]);
		assert_eq!(schema.member("name").unwrap().type_name, "any");
		assert!(schema.member("age").unwrap().optional);
	}

	#[test]
	fn array_member_via_one_element_array_schema() {
		let mut record = Record::new();
		record.insert(
			"tags".to_owned(),
			Value::Array(vec![Value::String("string".to_owned())]),
		);
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		let member = schema.member("tags").unwrap();
		assert!(member.is_array);
		assert_eq!(member.type_name, "string");
	}

	#[test]
	fn member_def_tree_names_its_type_positionally() {
		let mut inner = Record::new();
		inner.insert("0".to_owned(), Value::String("int".to_owned()));
		inner.insert("min".to_owned(), Value::Number(18.0));
		let mut record = Record::new();
		record.insert("age".to_owned(), Value::Object(inner));
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		let member = schema.member("age").unwrap();
		assert_eq!(member.type_name, "int");
		assert_eq!(member.min, Some(18.0));
	}

	#[test]
	fn all_keyed_inner_object_compiles_as_a_nested_schema_not_a_member_def_tree() {
		let mut inner = Record::new();
		inner.insert("city".to_owned(), Value::String("string".to_owned()));
		inner.insert("zip".to_owned(), Value::String("int".to_owned()));
		let mut record = Record::new();
		record.insert("address".to_owned(), Value::Object(inner));
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		let member = schema.member("address").unwrap();
		assert_eq!(member.type_name, "object");
		let of = member.of.as_ref().expect("nested schema should populate `of`");
		let MemberValue::Inline(nested) = of.as_ref() else {
			panic!("expected an inline nested schema");
		};
		assert_eq!(nested.member("city").unwrap().type_name, "string");
		assert_eq!(nested.member("zip").unwrap().type_name, "int");
	}

	#[test]
	fn open_schema_via_standalone_asterisk_member() {
		let mut record = Record::new();
		record.insert("name".to_owned(), Value::String("string".to_owned()));
		record.insert("1".to_owned(), Value::String("*".to_owned()));
		let schema = compile_value(&Value::Object(record), &defs()).unwrap();
		assert!(schema.open);
		assert_eq!(schema.members.len(), 1);
	}
}
