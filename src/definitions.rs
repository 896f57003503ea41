//! C5 — the header's definitions table: schemas, variables, and metadata.
//!
//! Modeled on the teacher's `names: HashMap<NameKey, usize>` plus
//! `unresolved_names` forward-reference list: entries are pushed as they're
//! parsed, in document order, and may be referenced by name before or after
//! their own definition — `get` doesn't care about insertion order, only
//! `iter`/`names` expose it.

use indexmap::IndexMap;

use crate::value::Value;

/// One entry in a [`Definitions`] table.
#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionValue {
	/// A `$name` schema definition, stored as its already-compiled form once
	/// C6 has run over the raw object; `None` while only parsed, not yet
	/// compiled.
	Schema(Value),
	/// An `@name` variable: any decoded value usable in value position.
	Variable(Value),
}

impl DefinitionValue {
	pub fn value(&self) -> &Value {
		match self {
			DefinitionValue::Schema(v) | DefinitionValue::Variable(v) => v,
		}
	}
}

/// An insertion-ordered, name-addressable table of `$schema` and `@variable`
/// entries declared in a document's header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Definitions {
	entries: IndexMap<String, DefinitionValue>,
}

impl Definitions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Strips a leading `$` or `@` sigil, if present, so lookups work
	/// regardless of whether the caller included it.
	fn normalize(name: &str) -> &str {
		name.strip_prefix('$').or_else(|| name.strip_prefix('@')).unwrap_or(name)
	}

	pub fn push_schema(&mut self, name: impl Into<String>, value: Value) {
		let name = name.into();
		let key = Self::normalize(&name).to_owned();
		self.entries.insert(key, DefinitionValue::Schema(value));
	}

	pub fn push_variable(&mut self, name: impl Into<String>, value: Value) {
		let name = name.into();
		let key = Self::normalize(&name).to_owned();
		self.entries.insert(key, DefinitionValue::Variable(value));
	}

	pub fn get(&self, name: &str) -> Option<&DefinitionValue> {
		self.entries.get(Self::normalize(name))
	}

	pub fn get_value(&self, name: &str) -> Option<&Value> {
		self.get(name).map(DefinitionValue::value)
	}

	pub fn get_schema(&self, name: &str) -> Option<&Value> {
		match self.get(name)? {
			DefinitionValue::Schema(v) => Some(v),
			DefinitionValue::Variable(_) => None,
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(Self::normalize(name))
	}

	/// The conventional default schema, keyed by the `$schema` sentinel name
	/// (spec §3: "Derived `schema_name` falls back ... to `"$schema"`"),
	/// used by a section whose separator line names no `$schema` of its own.
	pub fn default_schema(&self) -> Option<&Value> {
		self.get_schema("schema")
	}

	pub fn set_default_schema(&mut self, value: Value) {
		self.push_schema("schema", value);
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &DefinitionValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Merges `other` into `self` (spec §4.3: `merge(other, overwrite)`).
	/// With `overwrite = true`, an entry in `other` replaces an existing
	/// same-named entry in `self`; with `overwrite = false`, `self`'s own
	/// entries win and only names absent from `self` are inserted.
	pub fn merge(&mut self, other: &Definitions, overwrite: bool) {
		for (name, value) in other.entries.iter() {
			if overwrite || !self.entries.contains_key(name) {
				self.entries.insert(name.clone(), value.clone());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sigils_are_stripped_on_both_insert_and_lookup() {
		let mut defs = Definitions::new();
		defs.push_schema("$address", Value::Null);
		assert!(defs.get_schema("address").is_some());
		assert!(defs.get_schema("$address").is_some());
	}

	#[test]
	fn merge_with_overwrite_prefers_incoming_entries() {
		let mut base = Definitions::new();
		base.push_variable("@x", Value::Number(1.0));
		let mut incoming = Definitions::new();
		incoming.push_variable("@x", Value::Number(2.0));
		base.merge(&incoming, true);
		assert_eq!(base.get_value("x"), Some(&Value::Number(2.0)));
	}

	#[test]
	fn merge_without_overwrite_keeps_existing_entries() {
		let mut base = Definitions::new();
		base.push_variable("@x", Value::Number(1.0));
		let mut incoming = Definitions::new();
		incoming.push_variable("@x", Value::Number(2.0));
		incoming.push_variable("@y", Value::Number(3.0));
		base.merge(&incoming, false);
		assert_eq!(base.get_value("x"), Some(&Value::Number(1.0)));
		assert_eq!(base.get_value("y"), Some(&Value::Number(3.0)));
	}

	#[test]
	fn default_schema_lives_under_the_schema_sentinel_key() {
		let mut defs = Definitions::new();
		defs.set_default_schema(Value::Null);
		assert!(defs.default_schema().is_some());
		assert!(defs.get_schema("$schema").is_some());
		assert_eq!(defs.len(), 1);
	}
}
