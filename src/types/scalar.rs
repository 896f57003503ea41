//! Scalar `TypeDef`s: string, number, byte, int16, int32, int, bool, email,
//! url, datetime, date, time, decimal, bigint, binary.

use std::sync::OnceLock;

use crate::error::{Error as IoError, ErrorKind};
use crate::position::PositionRange;
use crate::schema::MemberDef;
use crate::value::Value;

use super::TypeDef;

fn err(kind: ErrorKind) -> IoError {
	IoError::new(kind, PositionRange::default())
}

pub struct StringType;

impl TypeDef for StringType {
	fn name(&self) -> &'static str {
		"string"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		let s = value.as_str().ok_or_else(|| err(ErrorKind::NotAString(path.to_owned())))?;
		check_string_length(s, member, path)?;
		if member.pattern.is_some() {
			let re = member
				.compiled_pattern()
				.map_err(|e| err(ErrorKind::InvalidSchema(e.to_string())))?;
			if !re.is_match(s) {
				return Err(err(ErrorKind::InvalidValue(path.to_owned())));
			}
		}
		Ok(Value::String(s.to_owned()))
	}
}

fn check_string_length(s: &str, member: &MemberDef, path: &str) -> Result<(), IoError> {
	let count = s.chars().count();
	if let Some(len) = member.len {
		if count != len {
			return Err(err(ErrorKind::InvalidLength {
				path: path.to_owned(),
				len,
			}));
		}
		return Ok(());
	}
	if let Some(min) = member.min_length {
		if count < min {
			return Err(err(ErrorKind::InvalidMinLength {
				path: path.to_owned(),
				min,
			}));
		}
	}
	if let Some(max) = member.max_length {
		if count > max {
			return Err(err(ErrorKind::InvalidMaxLength {
				path: path.to_owned(),
				max,
			}));
		}
	}
	Ok(())
}

fn email_regex() -> &'static regex::Regex {
	static RE: OnceLock<regex::Regex> = OnceLock::new();
	RE.get_or_init(|| regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("fixed pattern is valid"))
}

fn url_regex() -> &'static regex::Regex {
	static RE: OnceLock<regex::Regex> = OnceLock::new();
	RE.get_or_init(|| regex::Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s]+$").expect("fixed pattern is valid"))
}

pub struct EmailType;

impl TypeDef for EmailType {
	fn name(&self) -> &'static str {
		"email"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		let s = value.as_str().ok_or_else(|| err(ErrorKind::NotAString(path.to_owned())))?;
		if !email_regex().is_match(s) {
			return Err(err(ErrorKind::InvalidEmail(path.to_owned())));
		}
		check_string_length(s, member, path)?;
		Ok(Value::String(s.to_owned()))
	}
}

pub struct UrlType;

impl TypeDef for UrlType {
	fn name(&self) -> &'static str {
		"url"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		let s = value.as_str().ok_or_else(|| err(ErrorKind::NotAString(path.to_owned())))?;
		if !url_regex().is_match(s) {
			return Err(err(ErrorKind::InvalidUrl(path.to_owned())));
		}
		check_string_length(s, member, path)?;
		Ok(Value::String(s.to_owned()))
	}
}

pub struct NumberType;

impl TypeDef for NumberType {
	fn name(&self) -> &'static str {
		"number"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		let n = value.as_number().ok_or_else(|| err(ErrorKind::NotANumber(path.to_owned())))?;
		check_bounds(n, member, path)?;
		Ok(Value::Number(n))
	}
}

pub struct IntType;

impl TypeDef for IntType {
	fn name(&self) -> &'static str {
		"int"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		validate_integer(value, member, path, i64::MIN as f64, i64::MAX as f64)
	}
}

pub struct ByteType;

impl TypeDef for ByteType {
	fn name(&self) -> &'static str {
		"byte"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		validate_integer(value, member, path, 0.0, 255.0)
	}
}

pub struct Int16Type;

impl TypeDef for Int16Type {
	fn name(&self) -> &'static str {
		"int16"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		validate_integer(value, member, path, i16::MIN as f64, i16::MAX as f64)
	}
}

pub struct Int32Type;

impl TypeDef for Int32Type {
	fn name(&self) -> &'static str {
		"int32"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		validate_integer(value, member, path, i32::MIN as f64, i32::MAX as f64)
	}
}

/// Shared body for the integer family (spec §4.5): reject non-integral
/// values, reject anything outside the type's native range, then apply
/// `min`/`max` as a further clip.
fn validate_integer(
	value: &Value,
	member: &MemberDef,
	path: &str,
	native_min: f64,
	native_max: f64,
) -> Result<Value, IoError> {
	let n = value.as_number().ok_or_else(|| err(ErrorKind::NotANumber(path.to_owned())))?;
	if n.fract() != 0.0 {
		return Err(err(ErrorKind::NotAnInteger(path.to_owned())));
	}
	if n < native_min || n > native_max {
		return Err(err(ErrorKind::OutOfRange(path.to_owned())));
	}
	check_bounds(n, member, path)?;
	Ok(Value::Number(n))
}

fn check_bounds(n: f64, member: &MemberDef, path: &str) -> Result<(), IoError> {
	if let Some(min) = member.min {
		if n < min {
			return Err(err(ErrorKind::InvalidMinValue {
				path: path.to_owned(),
				min: min.to_string(),
			}));
		}
	}
	if let Some(max) = member.max {
		if n > max {
			return Err(err(ErrorKind::InvalidMaxValue {
				path: path.to_owned(),
				max: max.to_string(),
			}));
		}
	}
	Ok(())
}

pub struct BoolType;

impl TypeDef for BoolType {
	fn name(&self) -> &'static str {
		"bool"
	}

	fn validate(&self, value: &Value, _member: &MemberDef, path: &str) -> Result<Value, IoError> {
		value
			.as_bool()
			.map(Value::Bool)
			.ok_or_else(|| err(ErrorKind::NotABool(path.to_owned())))
	}
}

pub struct DateTimeType;

impl TypeDef for DateTimeType {
	fn name(&self) -> &'static str {
		"datetime"
	}

	fn validate(&self, value: &Value, _member: &MemberDef, path: &str) -> Result<Value, IoError> {
		match value {
			Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
			// A date-only literal promotes to a UTC-midnight instant when a
			// `datetime`-typed member consumes it.
			Value::Date(d) => Ok(Value::DateTime(
				d.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc(),
			)),
			_ => Err(err(ErrorKind::InvalidDateTime(path.to_owned()))),
		}
	}
}

pub struct DateType;

impl TypeDef for DateType {
	fn name(&self) -> &'static str {
		"date"
	}

	fn validate(&self, value: &Value, _member: &MemberDef, path: &str) -> Result<Value, IoError> {
		match value {
			Value::Date(d) => Ok(Value::Date(*d)),
			_ => Err(err(ErrorKind::InvalidDateTime(path.to_owned()))),
		}
	}
}

pub struct TimeType;

impl TypeDef for TimeType {
	fn name(&self) -> &'static str {
		"time"
	}

	fn validate(&self, value: &Value, _member: &MemberDef, path: &str) -> Result<Value, IoError> {
		match value {
			Value::Time(t) => Ok(Value::Time(*t)),
			_ => Err(err(ErrorKind::InvalidDateTime(path.to_owned()))),
		}
	}
}

pub struct DecimalType;

impl TypeDef for DecimalType {
	fn name(&self) -> &'static str {
		"decimal"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		let d = match value {
			Value::Decimal(d) => *d,
			Value::Number(n) => rust_decimal::Decimal::try_from(*n)
				.map_err(|_| err(ErrorKind::OutOfRange(path.to_owned())))?,
			_ => return Err(err(ErrorKind::InvalidValue(path.to_owned()))),
		};
		// A value whose scale exceeds the declared `scale` is rounded half-up
		// rather than raised, per the decimal precision overflow handling
		// decided in DESIGN.md.
		let d = match member.scale {
			Some(scale) => d.round_dp(scale),
			None => d,
		};
		if let Some(precision) = member.precision {
			let digits = d.mantissa().unsigned_abs().to_string().len() as u32;
			if digits > precision {
				return Err(err(ErrorKind::OutOfRange(path.to_owned())));
			}
		}
		Ok(Value::Decimal(d))
	}
}

pub struct BigIntType;

impl TypeDef for BigIntType {
	fn name(&self) -> &'static str {
		"bigint"
	}

	fn validate(&self, value: &Value, _member: &MemberDef, path: &str) -> Result<Value, IoError> {
		match value {
			Value::BigInt(b) => Ok(Value::BigInt(b.clone())),
			Value::Number(n) if n.fract() == 0.0 => Ok(Value::BigInt(num_bigint::BigInt::from(*n as i64))),
			_ => Err(err(ErrorKind::NotAnInteger(path.to_owned()))),
		}
	}
}

pub struct BinaryType;

impl TypeDef for BinaryType {
	fn name(&self) -> &'static str {
		"binary"
	}

	fn validate(&self, value: &Value, member: &MemberDef, path: &str) -> Result<Value, IoError> {
		match value {
			Value::Binary(bytes) => {
				if let Some(len) = member.len {
					if bytes.len() != len {
						return Err(err(ErrorKind::InvalidLength {
							path: path.to_owned(),
							len,
						}));
					}
				} else {
					if let Some(min) = member.min_length {
						if bytes.len() < min {
							return Err(err(ErrorKind::InvalidMinLength {
								path: path.to_owned(),
								min,
							}));
						}
					}
					if let Some(max) = member.max_length {
						if bytes.len() > max {
							return Err(err(ErrorKind::InvalidMaxLength {
								path: path.to_owned(),
								max,
							}));
						}
					}
				}
				Ok(Value::Binary(bytes.clone()))
			}
			_ => Err(err(ErrorKind::InvalidValue(path.to_owned()))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn string_length_bounds_are_enforced() {
		let mut member = MemberDef::scalar("string");
		member.min_length = Some(3);
		let err = StringType.validate(&Value::String("hi".to_owned()), &member, "name").unwrap_err();
		assert_eq!(err.kind().code(), "invalid-min-length");
	}

	#[test]
	fn int_rejects_fractional_numbers() {
		let member = MemberDef::scalar("int");
		assert!(IntType.validate(&Value::Number(1.5), &member, "n").is_err());
	}

	#[test]
	fn date_promotes_to_utc_midnight_for_datetime_members() {
		let member = MemberDef::scalar("datetime");
		let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
		let result = DateTimeType.validate(&Value::Date(date), &member, "d").unwrap();
		assert!(matches!(result, Value::DateTime(_)));
	}

	#[test]
	fn int32_rejects_value_out_of_native_range() {
		let member = MemberDef::scalar("int32");
		let err = Int32Type.validate(&Value::Number(2147483648.0), &member, "n").unwrap_err();
		assert_eq!(err.kind().code(), "out-of-range");
	}

	#[test]
	fn byte_accepts_its_full_native_range() {
		let member = MemberDef::scalar("byte");
		assert!(ByteType.validate(&Value::Number(0.0), &member, "b").is_ok());
		assert!(ByteType.validate(&Value::Number(255.0), &member, "b").is_ok());
		assert!(ByteType.validate(&Value::Number(256.0), &member, "b").is_err());
	}

	#[test]
	fn email_rejects_addresses_without_an_at_sign() {
		let member = MemberDef::scalar("email");
		assert!(EmailType.validate(&Value::String("nope".to_owned()), &member, "e").is_err());
		assert!(EmailType
			.validate(&Value::String("a@b.com".to_owned()), &member, "e")
			.is_ok());
	}

	#[test]
	fn url_requires_a_scheme() {
		let member = MemberDef::scalar("url");
		assert!(UrlType.validate(&Value::String("example.com".to_owned()), &member, "u").is_err());
		assert!(UrlType
			.validate(&Value::String("https://example.com".to_owned()), &member, "u")
			.is_ok());
	}

	#[test]
	fn decimal_rounds_to_the_declared_scale() {
		let mut member = MemberDef::scalar("decimal");
		member.scale = Some(2);
		let input = rust_decimal::Decimal::new(1236, 3); // 1.236
		let result = DecimalType.validate(&Value::Decimal(input), &member, "d").unwrap();
		assert_eq!(result, Value::Decimal(rust_decimal::Decimal::new(124, 2)));
	}

	#[test]
	fn pattern_is_anchored_at_both_ends_when_the_author_did_not() {
		let mut member = MemberDef::scalar("string");
		member.pattern = Some(r"\d+".to_owned());
		// A bare `\d+` would match `"12"` inside "a12b" unanchored; anchoring
		// means only an all-digit string passes.
		assert!(StringType.validate(&Value::String("a12b".to_owned()), &member, "x").is_err());
		assert!(StringType.validate(&Value::String("123".to_owned()), &member, "x").is_ok());
	}

	#[test]
	fn pattern_already_anchored_is_left_alone() {
		let mut member = MemberDef::scalar("string");
		member.pattern = Some(r"^[a-z]+$".to_owned());
		assert!(StringType.validate(&Value::String("abc".to_owned()), &member, "x").is_ok());
		assert!(StringType.validate(&Value::String("ABC".to_owned()), &member, "x").is_err());
	}
}
