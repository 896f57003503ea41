//! The runtime value model shared by the AST, the schema processor, and the
//! stringifier.

use indexmap::IndexMap;

use crate::error::Error as IoError;

/// An insertion-ordered, string-keyed value map.
///
/// Backs both a plain object's decoded value and the schema processor's
/// output record. Ordering matters here the same way it matters for
/// `Definitions`: a document's members are positional, so losing insertion
/// order would lose the ability to round-trip positionally.
pub type Record = IndexMap<String, Value>;

/// A decoded value.
///
/// This is the type every literal, object, array and collection in a
/// document eventually becomes, whether by tokenizing a literal directly or
/// by a `Node::to_value` walk.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Null,
	Undefined,
	Bool(bool),
	Number(f64),
	BigInt(num_bigint::BigInt),
	Decimal(rust_decimal::Decimal),
	String(String),
	DateTime(chrono::DateTime<chrono::Utc>),
	Date(chrono::NaiveDate),
	Time(chrono::NaiveTime),
	Binary(Vec<u8>),
	Array(Vec<Value>),
	Object(Record),
	/// A value position occupied by a recovered parse or validation error,
	/// carried as data instead of aborting the walk (the "errors are
	/// first-class values" policy).
	Error(Box<IoError>),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s.as_str()),
			_ => None,
		}
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items.as_slice()),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Record> {
		match self {
			Value::Object(record) => Some(record),
			_ => None,
		}
	}

	/// The type name this value would report to `typeof`-style diagnostics,
	/// matching the registry's type names so a validation message can say
	/// "expected `string`, got `number`".
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Undefined => "undefined",
			Value::Bool(_) => "bool",
			Value::Number(_) => "number",
			Value::BigInt(_) => "bigint",
			Value::Decimal(_) => "decimal",
			Value::String(_) => "string",
			Value::DateTime(_) => "datetime",
			Value::Date(_) => "date",
			Value::Time(_) => "time",
			Value::Binary(_) => "binary",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
			Value::Error(_) => "error",
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Value::Number(n)
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_owned())
	}
}
