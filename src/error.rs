//! The error taxonomy described in spec §7.
//!
//! Mirrors the teacher's `SerError`/`DeError` shape (a `thiserror`-derived
//! wrapper around a boxed inner value) rather than a flat `String`-carrying
//! error, but since every error here needs a `PositionRange` and a `Category`
//! regardless of kind, those live on the wrapper (`Error`) instead of being
//! repeated in every `ErrorKind` variant.

use crate::position::PositionRange;

/// Which family an [`ErrorKind`] belongs to (spec §7).
///
/// Exposed on serialized error placeholders (`ErrorNode::to_value`) so
/// downstream tooling (e.g. an editor) can color-code without matching on
/// every individual kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Syntax,
	Validation,
	Runtime,
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Category::Syntax => "syntax",
			Category::Validation => "validation",
			Category::Runtime => "runtime",
		};
		f.write_str(s)
	}
}

/// One error kind from the taxonomy in spec §7.
///
/// Each variant carries exactly the fields its message needs, following the
/// teacher's `SchemaError::msg(format_args!(...))` style of building the
/// message at the point the error is known rather than post-hoc formatting a
/// generic code.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
	// Tokenization
	#[error("unterminated string literal")]
	StringNotClosed,
	#[error("invalid escape sequence `\\{0}`")]
	InvalidEscapeSequence(char),
	#[error("invalid base64 content in binary literal")]
	InvalidBase64,
	#[error("invalid datetime literal `{0}`")]
	InvalidDatetime(String),

	// Parsing (syntax)
	#[error("unexpected token `{found}`, expected {expected}")]
	UnexpectedToken { found: String, expected: String },
	#[error("expecting closing `{0}`")]
	ExpectingBracket(char),
	#[error("`{0}` is not a valid object key")]
	InvalidKey(String),
	#[error("a document may only have one header")]
	MultipleHeaders,
	#[error("invalid collection item")]
	InvalidCollection,
	#[error("duplicate section name `{0}`, renamed to `{1}`")]
	DuplicateSection(String, String),
	#[error("invalid header definition")]
	InvalidDefinition,

	// Schema
	#[error("invalid schema: {0}")]
	InvalidSchema(String),
	#[error("unknown type `{0}`")]
	InvalidType(String),
	#[error("invalid array definition")]
	InvalidArrayDefinition,
	#[error("invalid array schema")]
	InvalidArraySchema,
	#[error("member `{0}` is required by the schema")]
	KeyRequired(String),

	// Validation
	#[error("value required for `{0}`")]
	ValueRequired(String),
	#[error("`{0}` may not be null")]
	NullNotAllowed(String),
	#[error("`{0}` is not one of the allowed choices")]
	InvalidChoice(String),
	#[error("invalid value for `{0}`")]
	InvalidValue(String),
	#[error("`{0}` is not a string")]
	NotAString(String),
	#[error("`{0}` is not a number")]
	NotANumber(String),
	#[error("`{0}` is not a bool")]
	NotABool(String),
	#[error("`{0}` is not an array")]
	NotAnArray(String),
	#[error("`{0}` is not an integer")]
	NotAnInteger(String),
	#[error("`{path}` must be >= {min}")]
	InvalidMinValue { path: String, min: String },
	#[error("`{path}` must be <= {max}")]
	InvalidMaxValue { path: String, max: String },
	#[error("`{0}` is out of range for its type")]
	OutOfRange(String),
	#[error("`{path}` must have length {len}")]
	InvalidLength { path: String, len: usize },
	#[error("`{path}` must have length >= {min}")]
	InvalidMinLength { path: String, min: usize },
	#[error("`{path}` must have length <= {max}")]
	InvalidMaxLength { path: String, max: usize },
	#[error("`{0}` is not a valid email address")]
	InvalidEmail(String),
	#[error("`{0}` is not a valid url")]
	InvalidUrl(String),
	#[error("`{0}` is not a valid date/time")]
	InvalidDateTime(String),

	// General
	#[error("definitions are required to resolve `{0}`")]
	DefinitionsRequired(String),
	#[error("expected an object")]
	ExpectedObject,
	#[error("expected an array")]
	ExpectedArray,
}

impl ErrorKind {
	/// Derives the [`Category`] for this kind, per spec §7.
	pub fn category(&self) -> Category {
		use ErrorKind::*;
		match self {
			StringNotClosed
			| InvalidEscapeSequence(_)
			| InvalidBase64
			| InvalidDatetime(_)
			| UnexpectedToken { .. }
			| ExpectingBracket(_)
			| InvalidKey(_)
			| MultipleHeaders
			| InvalidCollection
			| DuplicateSection(..)
			| InvalidDefinition => Category::Syntax,

			InvalidSchema(_) | InvalidType(_) | InvalidArrayDefinition | InvalidArraySchema
			| KeyRequired(_) => Category::Runtime,

			ValueRequired(_)
			| NullNotAllowed(_)
			| InvalidChoice(_)
			| InvalidValue(_)
			| NotAString(_)
			| NotANumber(_)
			| NotABool(_)
			| NotAnArray(_)
			| NotAnInteger(_)
			| InvalidMinValue { .. }
			| InvalidMaxValue { .. }
			| OutOfRange(_)
			| InvalidLength { .. }
			| InvalidMinLength { .. }
			| InvalidMaxLength { .. }
			| InvalidEmail(_)
			| InvalidUrl(_)
			| InvalidDateTime(_) => Category::Validation,

			DefinitionsRequired(_) | ExpectedObject | ExpectedArray => Category::Runtime,
		}
	}

	/// The stable machine-readable name used in `ErrorNode::to_value`'s
	/// `error_code` and in diagnostics (kebab-case, per spec §7's taxonomy
	/// listing).
	pub fn code(&self) -> &'static str {
		use ErrorKind::*;
		match self {
			StringNotClosed => "string-not-closed",
			InvalidEscapeSequence(_) => "invalid-escape-sequence",
			InvalidBase64 => "invalid-base64",
			InvalidDatetime(_) => "invalid-datetime",
			UnexpectedToken { .. } => "unexpected-token",
			ExpectingBracket(_) => "expecting-bracket",
			InvalidKey(_) => "invalid-key",
			MultipleHeaders => "multiple-headers",
			InvalidCollection => "invalid-collection",
			DuplicateSection(..) => "duplicate-section",
			InvalidDefinition => "invalid-definition",
			InvalidSchema(_) => "invalid-schema",
			InvalidType(_) => "invalid-type",
			InvalidArrayDefinition => "invalid-array-definition",
			InvalidArraySchema => "invalid-array-schema",
			KeyRequired(_) => "key-required",
			ValueRequired(_) => "value-required",
			NullNotAllowed(_) => "null-not-allowed",
			InvalidChoice(_) => "invalid-choice",
			InvalidValue(_) => "invalid-value",
			NotAString(_) => "not-a-string",
			NotANumber(_) => "not-a-number",
			NotABool(_) => "not-a-bool",
			NotAnArray(_) => "not-an-array",
			NotAnInteger(_) => "not-an-integer",
			InvalidMinValue { .. } => "invalid-min-value",
			InvalidMaxValue { .. } => "invalid-max-value",
			OutOfRange(_) => "out-of-range",
			InvalidLength { .. } => "invalid-length",
			InvalidMinLength { .. } => "invalid-min-length",
			InvalidMaxLength { .. } => "invalid-max-length",
			InvalidEmail(_) => "invalid-email",
			InvalidUrl(_) => "invalid-url",
			InvalidDateTime(_) => "invalid-date-time",
			DefinitionsRequired(_) => "definitions-required",
			ExpectedObject => "expected-object",
			ExpectedArray => "expected-array",
		}
	}
}

/// A fully-located error: kind + span + optional collection index.
///
/// This is what ends up in `Document::errors`, in an `ErrorNode`, and (when
/// an error collector is supplied to the processor) in the collector.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
	inner: Box<ErrorInner>,
}

#[derive(Debug, Clone, PartialEq)]
struct ErrorInner {
	kind: ErrorKind,
	range: PositionRange,
	collection_index: Option<usize>,
}

impl Error {
	pub fn new(kind: ErrorKind, range: PositionRange) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind,
				range,
				collection_index: None,
			}),
		}
	}

	pub fn with_collection_index(mut self, index: usize) -> Self {
		self.inner.collection_index = Some(index);
		self
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.inner.kind
	}

	pub fn range(&self) -> PositionRange {
		self.inner.range
	}

	pub fn collection_index(&self) -> Option<usize> {
		self.inner.collection_index
	}

	pub fn category(&self) -> Category {
		self.inner.kind.category()
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} at {}: {}",
			self.category(),
			self.inner.range.start,
			self.inner.kind
		)
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.inner.kind)
	}
}

/// Collects validation errors instead of having them propagate, per §4.6/§7.
///
/// Passed by the caller to `process`/`parse`; without one, validation errors
/// raise immediately (propagation policy in spec §7).
pub trait ErrorCollector {
	fn push(&mut self, error: Error);
}

impl ErrorCollector for Vec<Error> {
	fn push(&mut self, error: Error) {
		Vec::push(self, error);
	}
}
