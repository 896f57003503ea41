//! C7 — the process-wide type dispatch table and the built-in [`TypeDef`]s.
//!
//! Grounded on the teacher's `RegularType`/`LogicalType` split (a scalar type
//! plus an optional validating layer stacked on top): here that shape is
//! [`pre_check`] (shared undefined/null/choices handling for every type)
//! feeding into a per-type [`TypeDef::validate`], and on `grill`'s
//! name-keyed validator dispatch table for the registry itself.

mod composite;
mod scalar;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::definitions::Definitions;
use crate::error::{Error as IoError, ErrorKind};
use crate::position::PositionRange;
use crate::schema::MemberDef;
use crate::value::Value;

/// One registered type's validation rule.
///
/// `validate` receives the *already pre-checked* value (never `Undefined`,
/// never bare `Null` unless `nullable` let it through) and returns the final
/// value to store in the record — which may differ from the input (e.g. a
/// `number` member coerces an integral `f64` the same way regardless of
/// whether the literal was written `1` or `1.0`).
pub trait TypeDef: Send + Sync {
	fn name(&self) -> &'static str;
	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError>;
}

/// The process-wide `type name -> TypeDef` table.
#[derive(Clone)]
pub struct TypeRegistry {
	types: HashMap<String, Arc<dyn TypeDef>>,
}

impl TypeRegistry {
	pub fn empty() -> Self {
		Self {
			types: HashMap::new(),
		}
	}

	/// The built-in types (spec §4.5), registered once the same way the
	/// teacher registers its logical type table at startup.
	pub fn with_defaults() -> Self {
		let mut registry = Self::empty();
		registry.register(Arc::new(scalar::StringType));
		registry.register(Arc::new(scalar::NumberType));
		registry.register(Arc::new(scalar::ByteType));
		registry.register(Arc::new(scalar::Int16Type));
		registry.register(Arc::new(scalar::Int32Type));
		registry.register(Arc::new(scalar::IntType));
		registry.register(Arc::new(scalar::BoolType));
		registry.register(Arc::new(scalar::EmailType));
		registry.register(Arc::new(scalar::UrlType));
		registry.register(Arc::new(scalar::DateTimeType));
		registry.register(Arc::new(scalar::DateType));
		registry.register(Arc::new(scalar::TimeType));
		registry.register(Arc::new(scalar::DecimalType));
		registry.register(Arc::new(scalar::BigIntType));
		registry.register(Arc::new(scalar::BinaryType));
		registry.register(Arc::new(composite::ArrayType));
		registry.register(Arc::new(composite::ObjectType));
		registry.register(Arc::new(composite::AnyType));
		registry
	}

	pub fn register(&mut self, type_def: Arc<dyn TypeDef>) {
		self.types.insert(type_def.name().to_owned(), type_def);
	}

	pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn TypeDef>> {
		self.types.remove(name)
	}

	pub fn get(&self, name: &str) -> Option<&Arc<dyn TypeDef>> {
		self.types.get(name)
	}
}

impl Default for TypeRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}

/// Dereferences a `@variable`/`$schema` token value against `definitions`
/// (spec §4.5: "dereference variable references via `defs.get_value(node)`
/// before type checks"); any other value, or a reference that doesn't
/// resolve, passes through unchanged.
pub fn resolve_value(value: &Value, definitions: &Definitions) -> Value {
	match value {
		Value::String(s) if s.starts_with('@') || s.starts_with('$') => {
			definitions.get_value(s).cloned().unwrap_or_else(|| value.clone())
		}
		other => other.clone(),
	}
}

/// Runs the checks every type shares (undefined/default, null, choices)
/// before handing off to the type-specific rule. Returns `Ok(Some(value))`
/// when the pre-check alone determines the outcome (nothing left for the
/// type to validate), `Ok(None)` to continue to `TypeDef::validate`.
///
/// `value` is expected to already be dereferenced (see [`resolve_value`]);
/// this only still needs `definitions` to resolve `choices` entries.
pub fn pre_check(
	value: &Value,
	member: &MemberDef,
	definitions: &Rc<RefCell<Definitions>>,
	path: &str,
) -> Result<Option<Value>, IoError> {
	if value.is_undefined() {
		if let Some(default) = &member.default {
			return Ok(Some(default.clone()));
		}
		if member.optional {
			return Ok(Some(Value::Undefined));
		}
		return Err(IoError::new(
			ErrorKind::ValueRequired(path.to_owned()),
			PositionRange::default(),
		));
	}

	if value.is_null() {
		if member.nullable {
			return Ok(Some(Value::Null));
		}
		return Err(IoError::new(
			ErrorKind::NullNotAllowed(path.to_owned()),
			PositionRange::default(),
		));
	}

	if let Some(choices) = &member.choices {
		let defs = definitions.borrow();
		let matches = choices.iter().any(|choice| resolve_choice(choice, &defs) == *value);
		if !matches {
			return Err(IoError::new(
				ErrorKind::InvalidChoice(path.to_owned()),
				PositionRange::default(),
			));
		}
	}

	Ok(None)
}

/// A `choices` entry may itself be a `@variable`/`$schema` reference (spec
/// §3: "choices entries may be literals or variable references; lookup is
/// eager at validation time"); resolve it against `definitions` before
/// comparing, falling back to the literal value when it isn't a reference or
/// the reference doesn't resolve.
fn resolve_choice(choice: &Value, definitions: &Definitions) -> Value {
	match choice {
		Value::String(s) if s.starts_with('@') || s.starts_with('$') => {
			definitions.get_value(s).cloned().unwrap_or_else(|| choice.clone())
		}
		other => other.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_registry_has_all_built_ins() {
		let registry = TypeRegistry::with_defaults();
		for name in [
			"string", "number", "byte", "int16", "int32", "int", "bool", "email", "url", "datetime",
			"date", "time", "decimal", "bigint", "binary", "array", "object", "any",
		] {
			assert!(registry.get(name).is_some(), "missing {name}");
		}
	}

	fn defs() -> Rc<RefCell<Definitions>> {
		Rc::new(RefCell::new(Definitions::new()))
	}

	#[test]
	fn pre_check_applies_default_for_undefined() {
		let mut member = MemberDef::scalar("string");
		member.default = Some(Value::String("fallback".to_owned()));
		let result = pre_check(&Value::Undefined, &member, &defs(), "x").unwrap();
		assert_eq!(result, Some(Value::String("fallback".to_owned())));
	}

	#[test]
	fn pre_check_rejects_null_unless_nullable() {
		let member = MemberDef::scalar("string");
		assert!(pre_check(&Value::Null, &member, &defs(), "x").is_err());
	}

	#[test]
	fn pre_check_resolves_variable_references_in_choices() {
		let mut definitions = Definitions::new();
		definitions.push_variable("@allowed", Value::String("red".to_owned()));
		let mut member = MemberDef::scalar("string");
		member.choices = Some(vec![Value::String("@allowed".to_owned())]);
		let definitions = Rc::new(RefCell::new(definitions));
		let result = pre_check(&Value::String("red".to_owned()), &member, &definitions, "color").unwrap();
		assert_eq!(result, None);
		assert!(pre_check(&Value::String("blue".to_owned()), &member, &definitions, "color").is_err());
	}
}
