//! The parsed-and-decoded form of a whole document: a [`Definitions`] table
//! built from the header plus an ordered list of decoded sections, each
//! validated against its resolved schema (C8) when one applies.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{CollectionItem, DocumentNode, SectionBody};
use crate::definitions::Definitions;
use crate::error::Error as IoError;
use crate::processor::Processor;
use crate::schema::{self, Schema};
use crate::types::TypeRegistry;
use crate::value::{Record, Value};

/// One `--- name:$schema` section, already lowered to a [`Value`] and, when a
/// schema applies, validated against it.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
	pub name: Option<String>,
	pub schema_name: Option<String>,
	/// The resolved, compiled schema that validated this section's body, when
	/// one applied — kept so the stringifier can decide positional-vs-keyed
	/// emission (spec §4.7) without re-resolving it against `definitions`.
	pub schema: Option<Schema>,
	pub body: SectionValue,
}

/// A section body lowered to values: either one object, or a collection of
/// them (the repeated `~` form).
///
/// A collection item that failed collection-level parse recovery or schema
/// validation is kept as `Value::Error` in its slot rather than dropped, so
/// `items.len()` always matches the source's `~` count (spec §4.6: insert an
/// error placeholder and continue).
#[derive(Clone, Debug, PartialEq)]
pub enum SectionValue {
	Object(Record),
	Collection(Vec<Value>),
}

/// A fully decoded document: header definitions plus ordered sections, with
/// every recovered parse error and every collected validation error in
/// source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
	pub definitions: Definitions,
	pub sections: Vec<Section>,
	pub errors: Vec<IoError>,
}

impl Document {
	/// Builds a [`Document`] from a parsed [`DocumentNode`]: compiles the
	/// header's `$schema` definitions (C6), then resolves and applies the
	/// applicable schema to each section (C8) — a section naming no schema of
	/// its own falls back to the header's default (`$schema`); a section
	/// whose name resolves to no known schema is passed through unvalidated,
	/// per §2's "unresolved schema → pass-through conversion".
	pub fn from_ast(doc: &DocumentNode, mut errors: Vec<IoError>) -> Self {
		let registry = TypeRegistry::with_defaults();
		let mut definitions = Definitions::new();
		if let Some(header) = &doc.header {
			populate_definitions(header, &mut definitions);
		}
		let defs = Rc::new(RefCell::new(definitions));

		let mut sections = Vec::with_capacity(doc.sections.len());
		for section in &doc.sections {
			let schema_name = section.schema_name.as_deref().unwrap_or("schema");
			let compiled = defs
				.borrow()
				.get_schema(schema_name)
				.cloned()
				.and_then(|raw| schema::compile_value(&raw, &defs).ok());

			let body = match (&section.body, &compiled) {
				(SectionBody::Object(o), Some(sch)) => {
					let processor = Processor::new(sch, &defs, &registry);
					let mut local = Vec::new();
					match processor.process(o, Some(&mut local)) {
						Ok(record) => {
							errors.extend(local);
							SectionValue::Object(record)
						}
						Err(e) => {
							errors.push(e);
							SectionValue::Object(Record::new())
						}
					}
				}
				(SectionBody::Object(o), None) => {
					let Value::Object(record) = o.to_value() else {
						unreachable!("ObjectNode::to_value always returns Value::Object")
					};
					SectionValue::Object(record)
				}
				(SectionBody::Collection(c), Some(sch)) => {
					let processor = Processor::new(sch, &defs, &registry);
					let mut local = Vec::new();
					let values = processor.process_collection(c, Some(&mut local)).unwrap_or_default();
					errors.extend(local);
					SectionValue::Collection(values)
				}
				(SectionBody::Collection(c), None) => {
					SectionValue::Collection(c.items.iter().map(CollectionItem::to_value).collect())
				}
			};

			sections.push(Section {
				name: section.name.clone(),
				schema_name: section.schema_name.clone(),
				schema: compiled,
				body,
			});
		}

		errors.sort_by_key(|e| e.range().start.offset);
		let definitions = Rc::try_unwrap(defs)
			.expect("no Processor retains its Definitions handle past from_ast")
			.into_inner();
		Self {
			definitions,
			sections,
			errors,
		}
	}

	pub fn section(&self, name: &str) -> Option<&Section> {
		self.sections.iter().find(|s| s.name.as_deref() == Some(name))
	}
}

/// Populates `definitions` from a parsed header body (spec §4.3's two-pass
/// rule, simplified to one pass since compiling happens lazily at schema
/// resolution time rather than eagerly at header-parse time): the general
/// case is a `~`-prefixed collection of single-member objects, one per
/// `~ key: value` line; the sugar case is a single braceless object, which
/// *is* the default schema.
fn populate_definitions(header: &SectionBody, definitions: &mut Definitions) {
	match header {
		SectionBody::Object(o) => definitions.set_default_schema(o.to_value()),
		// A single-item `~`-collection whose lone item has more than one
		// member (spec scenario S4: `~ name: string, age: int`) is the same
		// sugar as a bare ObjectNode header — the stray leading `~` doesn't
		// turn it into a list of `$key: value` definitions, since there's
		// nothing to list. Anything else in collection form is the general
		// case: one `$schema`/`@variable`/metadata definition per item.
		SectionBody::Collection(c) if c.items.len() == 1 => match &c.items[0] {
			CollectionItem::Object(obj) if obj.members.len() > 1 => {
				definitions.set_default_schema(obj.to_value());
			}
			CollectionItem::Object(obj) => push_definition_members(obj, definitions),
			CollectionItem::Error(_) => {}
		},
		SectionBody::Collection(c) => {
			for item in &c.items {
				let CollectionItem::Object(obj) = item else { continue };
				push_definition_members(obj, definitions);
			}
		}
	}
}

fn push_definition_members(obj: &crate::ast::ObjectNode, definitions: &mut Definitions) {
	for member in &obj.members {
		let Some(key) = &member.key else { continue };
		let value = member.value.to_value();
		match key.strip_prefix('$') {
			Some(schema_name) => definitions.push_schema(schema_name, value),
			None => definitions.push_variable(key, value),
		}
	}
}
