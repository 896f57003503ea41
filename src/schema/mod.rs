//! C6 — compiles a schema object (a header `$name` definition, or an inline
//! object given directly to the processor) into a [`Schema`] the processor
//! can run without re-inspecting the schema AST on every record.
//!
//! Split the same way the teacher splits `SchemaMut` from `Schema`: member
//! definitions are collected in document order into an ordered map while
//! compiling (mutable construction), then the result is treated as an
//! immutable, `Clone`-cheap value from there on.

mod compiler;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::definitions::Definitions;
use crate::value::Value;

pub use compiler::{compile, compile_value};

/// A compiled member definition.
///
/// `pattern`'s compiled form is cached lazily on the definition that owns it
/// (spec §3 Lifecycles: "Compiled regex caches live on the `MemberDef` that
/// owns them"), not derived from `pattern` or compared/cloned with it — a
/// clone simply starts with a cold cache, and equality only ever looks at the
/// declarative fields.
#[derive(Debug)]
pub struct MemberDef {
	pub type_name: String,
	/// `foo?` — the member may be absent/undefined.
	pub optional: bool,
	/// The type allows an explicit `null` value.
	pub nullable: bool,
	/// `foo*` — the member is an array of `type_name`, not a scalar.
	pub is_array: bool,
	pub default: Option<Value>,
	pub choices: Option<Vec<Value>>,
	pub min: Option<f64>,
	pub max: Option<f64>,
	/// Exact required length (`len`); checked instead of `min_length`/
	/// `max_length` when present.
	pub len: Option<usize>,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
	pub pattern: Option<String>,
	pattern_regex: OnceLock<regex::Regex>,
	/// `decimal` only: total significant digits.
	pub precision: Option<u32>,
	/// `decimal` only: digits after the decimal point: values are rounded
	/// half-up to this scale rather than rejected, per the precision-overflow
	/// policy decided in DESIGN.md.
	pub scale: Option<u32>,
	/// For `type_name == "object"`: the nested schema, by value or by
	/// `$ref` name resolved lazily against the owning [`Definitions`].
	pub of: Option<Box<MemberValue>>,
}

impl Clone for MemberDef {
	fn clone(&self) -> Self {
		Self {
			type_name: self.type_name.clone(),
			optional: self.optional,
			nullable: self.nullable,
			is_array: self.is_array,
			default: self.default.clone(),
			choices: self.choices.clone(),
			min: self.min,
			max: self.max,
			len: self.len,
			min_length: self.min_length,
			max_length: self.max_length,
			pattern: self.pattern.clone(),
			pattern_regex: OnceLock::new(),
			precision: self.precision,
			scale: self.scale,
			of: self.of.clone(),
		}
	}
}

impl PartialEq for MemberDef {
	fn eq(&self, other: &Self) -> bool {
		self.type_name == other.type_name
			&& self.optional == other.optional
			&& self.nullable == other.nullable
			&& self.is_array == other.is_array
			&& self.default == other.default
			&& self.choices == other.choices
			&& self.min == other.min
			&& self.max == other.max
			&& self.len == other.len
			&& self.min_length == other.min_length
			&& self.max_length == other.max_length
			&& self.pattern == other.pattern
			&& self.precision == other.precision
			&& self.scale == other.scale
			&& self.of == other.of
	}
}

impl MemberDef {
	pub fn scalar(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			optional: false,
			nullable: false,
			is_array: false,
			default: None,
			choices: None,
			min: None,
			max: None,
			len: None,
			min_length: None,
			max_length: None,
			pattern: None,
			pattern_regex: OnceLock::new(),
			precision: None,
			scale: None,
			of: None,
		}
	}

	/// The compiled form of `pattern`, built and cached on first use.
	/// Anchored at both ends (`^...$`) when the author's pattern isn't
	/// already anchored, per spec §4.5's `string`/`email`/`url` rule — a
	/// `pattern` constraint is meant to validate the *whole* field, not just
	/// find a match somewhere inside it.
	pub fn compiled_pattern(&self) -> Result<&regex::Regex, regex::Error> {
		if let Some(re) = self.pattern_regex.get() {
			return Ok(re);
		}
		let raw = self.pattern.as_deref().unwrap_or("");
		let anchored = anchor_pattern(raw);
		let re = regex::Regex::new(&anchored)?;
		Ok(self.pattern_regex.get_or_init(|| re))
	}
}

fn anchor_pattern(pattern: &str) -> String {
	let mut anchored = String::with_capacity(pattern.len() + 2);
	if !pattern.starts_with('^') {
		anchored.push('^');
	}
	anchored.push_str(pattern);
	if !pattern.ends_with('$') {
		anchored.push('$');
	}
	anchored
}

/// What a member's nested/referenced structure resolves to.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberValue {
	Inline(Schema),
	Ref(String),
}

impl MemberValue {
	/// Resolves a `$ref` against `definitions`, returning the referenced
	/// schema. Cyclic and forward references both work because resolution
	/// happens lazily, at validation time, through the owning table rather
	/// than by eagerly inlining at compile time.
	pub fn resolve<'a>(
		&'a self,
		definitions: &Rc<RefCell<Definitions>>,
		resolved_ref: &'a mut Option<Schema>,
	) -> Option<&'a Schema> {
		match self {
			MemberValue::Inline(schema) => Some(schema),
			MemberValue::Ref(name) => {
				let defs = definitions.borrow();
				let value = defs.get_schema(name)?;
				*resolved_ref = compile_from_value(value, definitions).ok();
				resolved_ref.as_ref()
			}
		}
	}
}

fn compile_from_value(value: &Value, definitions: &Rc<RefCell<Definitions>>) -> Result<Schema, crate::error::Error> {
	compiler::compile_value(value, definitions)
}

/// A compiled schema: an ordered member list plus whether unknown keys are
/// allowed (an "open" schema, the wildcard `...` member).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
	pub name: Option<String>,
	pub members: IndexMap<String, MemberDef>,
	pub open: bool,
}

impl Schema {
	pub fn member(&self, name: &str) -> Option<&MemberDef> {
		self.members.get(name)
	}

	pub fn member_order(&self) -> impl Iterator<Item = &str> {
		self.members.keys().map(String::as_str)
	}
}
