//! C8 — applies a compiled [`Schema`] to a parsed data [`ObjectNode`]/
//! [`CollectionNode`], producing a validated [`Record`].
//!
//! Grounded on the teacher's `DeserializerState`/`DatumDeserializer` split: a
//! `Processor` holds the state that's constant across an entire document
//! (schema, definitions, registry, error collector) while each member is
//! walked one at a time against one [`MemberDef`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{CollectionItem, CollectionNode, ObjectNode};
use crate::definitions::Definitions;
use crate::error::{Error as IoError, ErrorCollector, ErrorKind};
use crate::position::PositionRange;
use crate::schema::{MemberDef, Schema};
use crate::types::{self, TypeRegistry};
use crate::value::{Record, Value};

pub struct Processor<'a> {
	pub schema: &'a Schema,
	pub definitions: &'a Rc<RefCell<Definitions>>,
	pub registry: &'a TypeRegistry,
}

impl<'a> Processor<'a> {
	pub fn new(
		schema: &'a Schema,
		definitions: &'a Rc<RefCell<Definitions>>,
		registry: &'a TypeRegistry,
	) -> Self {
		Self {
			schema,
			definitions,
			registry,
		}
	}

	/// Validates one object against `self.schema`. Errors are pushed to
	/// `collector` when given; with no collector, the first error raises
	/// immediately (the propagation policy for an unattended validation
	/// call).
	pub fn process(
		&self,
		object: &ObjectNode,
		mut collector: Option<&mut dyn ErrorCollector>,
	) -> Result<Record, IoError> {
		let assigned = self.assign_members(object);
		let mut record = Record::new();

		for name in self.schema.member_order() {
			let member = self.schema.member(name).expect("member_order only yields present keys");
			let value = assigned.get(name).cloned().unwrap_or(Value::Undefined);
			match self.process_member(name, member, &value) {
				Ok(v) => {
					record.insert(name.to_owned(), v);
				}
				Err(e) => match collector.as_deref_mut() {
					// Keep the member's slot in the record — as an error
					// placeholder — rather than dropping it, so a collected
					// record still has exactly `schema.member_order` keys
					// (spec §4.6).
					Some(c) => {
						record.insert(name.to_owned(), Value::Error(Box::new(e.clone())));
						c.push(e);
					}
					None => return Err(e),
				},
			}
		}

		if self.schema.open {
			for (key, value) in assigned.iter() {
				if !self.schema.members.contains_key(key) {
					record.insert(key.clone(), value.clone());
				}
			}
		}

		Ok(record)
	}

	/// Validates every item in a section's collection body, tagging each
	/// error with its `collectionIndex` so a caller can tell which row
	/// failed.
	///
	/// The result has exactly one [`Value`] per input item, preserving
	/// indices: a valid item becomes `Value::Object`, and a failed one
	/// (whether already an `ErrorNode` from collection-level parse recovery,
	/// spec §4.2 tier 2, or a validation failure) becomes `Value::Error` in
	/// its place rather than being dropped — the same "errors are first-class
	/// values" policy the per-member loop applies to a single failed field.
	pub fn process_collection(
		&self,
		collection: &CollectionNode,
		mut collector: Option<&mut dyn ErrorCollector>,
	) -> Result<Vec<Value>, IoError> {
		let mut out = Vec::with_capacity(collection.items.len());
		for (index, item) in collection.items.iter().enumerate() {
			let item = match item {
				CollectionItem::Object(o) => o,
				CollectionItem::Error(e) => {
					let error = e.error.clone().with_collection_index(index);
					match collector.as_deref_mut() {
						Some(c) => {
							c.push(error.clone());
							out.push(Value::Error(Box::new(error)));
							continue;
						}
						None => return Err(error),
					}
				}
			};
			let mut local = Vec::new();
			match self.process(item, Some(&mut local)) {
				Ok(record) => {
					match collector.as_deref_mut() {
						Some(c) => {
							for e in local {
								c.push(e.with_collection_index(index));
							}
							out.push(Value::Object(record));
						}
						None => match local.into_iter().next() {
							Some(e) => return Err(e.with_collection_index(index)),
							None => out.push(Value::Object(record)),
						},
					}
				}
				Err(e) => match collector.as_deref_mut() {
					Some(c) => {
						let e = e.with_collection_index(index);
						c.push(e.clone());
						out.push(Value::Error(Box::new(e)));
					}
					None => return Err(e.with_collection_index(index)),
				},
			}
		}
		Ok(out)
	}

	/// Maps each parsed member to its schema key: positional members are
	/// assigned to the next not-yet-filled schema slot in declaration
	/// order, named members are assigned directly by name. Keys with no
	/// schema slot are kept too, for an open schema's wildcard pass-through.
	fn assign_members(&self, object: &ObjectNode) -> Record {
		let mut assigned = Record::new();
		let mut positions = self.schema.member_order().map(str::to_owned);
		for member in &object.members {
			let key = match &member.key {
				Some(k) => k.clone(),
				None => positions.find(|name| !assigned.contains_key(name.as_str())).unwrap_or_else(
					|| format!("${}", assigned.len()),
				),
			};
			assigned.insert(key, member.value.to_value());
		}
		assigned
	}

	fn process_member(&self, path: &str, member: &MemberDef, value: &Value) -> Result<Value, IoError> {
		if member.is_array {
			return self.process_array_member(path, member, value);
		}
		self.process_scalar(path, member, value)
	}

	fn process_array_member(&self, path: &str, member: &MemberDef, value: &Value) -> Result<Value, IoError> {
		let value = &types::resolve_value(value, &self.definitions.borrow());
		if let Some(resolved) = types::pre_check(value, member, self.definitions, path)? {
			return Ok(resolved);
		}
		let items = value.as_array().ok_or_else(|| {
			IoError::new(ErrorKind::NotAnArray(path.to_owned()), PositionRange::default())
		})?;
		let element_def = MemberDef {
			is_array: false,
			optional: false,
			..member.clone()
		};
		let mut out = Vec::with_capacity(items.len());
		for (index, item) in items.iter().enumerate() {
			let item_path = format!("{path}[{index}]");
			out.push(self.process_scalar(&item_path, &element_def, item)?);
		}
		Ok(Value::Array(out))
	}

	fn process_scalar(&self, path: &str, member: &MemberDef, value: &Value) -> Result<Value, IoError> {
		let value = &types::resolve_value(value, &self.definitions.borrow());
		if let Some(resolved) = types::pre_check(value, member, self.definitions, path)? {
			return Ok(resolved);
		}

		if member.type_name == "object" {
			return self.process_nested_object(path, member, value);
		}

		let type_def = self.registry.get(&member.type_name).ok_or_else(|| {
			IoError::new(
				ErrorKind::InvalidType(member.type_name.clone()),
				PositionRange::default(),
			)
		})?;
		type_def.validate(value, member, path)
	}

	fn process_nested_object(&self, path: &str, member: &MemberDef, value: &Value) -> Result<Value, IoError> {
		let record = value
			.as_object()
			.ok_or_else(|| IoError::new(ErrorKind::ExpectedObject, PositionRange::default()))?;

		let Some(of) = &member.of else {
			// No nested schema declared: pass the object through unvalidated,
			// the same leniency an untyped `any` member would give.
			return Ok(Value::Object(record.clone()));
		};

		let mut resolved_ref = None;
		let nested_schema = match of.resolve(self.definitions, &mut resolved_ref) {
			Some(schema) => schema,
			None => {
				return Err(IoError::new(
					ErrorKind::DefinitionsRequired(path.to_owned()),
					PositionRange::default(),
				))
			}
		};

		let nested = Processor::new(nested_schema, self.definitions, self.registry);
		let mut out = Record::new();
		for name in nested_schema.member_order() {
			let member_def = nested_schema.member(name).expect("present");
			let field_value = record.get(name).cloned().unwrap_or(Value::Undefined);
			let field_path = format!("{path}.{name}");
			out.insert(name.to_owned(), nested.process_member(&field_path, member_def, &field_value)?);
		}
		if nested_schema.open {
			for (key, v) in record.iter() {
				if !nested_schema.members.contains_key(key) {
					out.insert(key.clone(), v.clone());
				}
			}
		}
		Ok(Value::Object(out))
	}
}
