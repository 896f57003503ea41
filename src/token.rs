//! Token kinds produced by the tokenizer and consumed by the parser.

use crate::position::PositionRange;
use crate::value::Value;

/// What kind of lexeme a [`Token`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
	CurlyOpen,
	CurlyClose,
	BracketOpen,
	BracketClose,
	Colon,
	Comma,
	Tilde,
	String,
	Number,
	BigInt,
	Decimal,
	Boolean,
	Null,
	Undefined,
	DateTime,
	Date,
	Time,
	Binary,
	Whitespace,
	Comment,
	/// The `---` section separator.
	SectionSep,
	/// A bareword or quoted section name immediately before `:` in a
	/// section separator line.
	SectionName,
	/// The `$name` schema-reference token at the start of a section
	/// separator line.
	SectionSchema,
	/// A `~` starting a collection item.
	CollectionStart,
	/// A bareword that isn't any recognized literal keyword — resolved to a
	/// string by the parser in open-schema contexts.
	OpenString,
	/// An embedded recoverable error: the tokenizer never fails outright, it
	/// records the problem as a token instead.
	Error,
	Unknown,
}

/// Further classifies a token within its [`TokenKind`], e.g. the quoting
/// style of a string or the base of a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubKind {
	/// `"..."` or `'...'`
	QuotedString,
	/// An unquoted bareword used where a string is expected.
	OpenString,
	/// `r"..."` / `r'...'` — no escape processing.
	RawString,
	/// `b"..."` / `b'...'` — base64-decoded binary.
	BinaryString,
	Decimal10,
	Hex,
	Octal,
	Binary2,
	None,
}

/// A single lexeme, with its source span, raw text, and (when applicable) its
/// already-decoded literal value.
///
/// The tokenizer decodes literals eagerly (numbers, strings, dates, binary)
/// so the parser and processor never need to re-scan token text.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub sub_kind: SubKind,
	pub range: PositionRange,
	pub text: String,
	pub value: Option<Value>,
}

impl Token {
	pub fn new(kind: TokenKind, range: PositionRange, text: impl Into<String>) -> Self {
		Self {
			kind,
			sub_kind: SubKind::None,
			range,
			text: text.into(),
			value: None,
		}
	}

	pub fn with_sub_kind(mut self, sub_kind: SubKind) -> Self {
		self.sub_kind = sub_kind;
		self
	}

	pub fn with_value(mut self, value: Value) -> Self {
		self.value = Some(value);
		self
	}

	pub fn is_punctuation(&self) -> bool {
		matches!(
			self.kind,
			TokenKind::CurlyOpen
				| TokenKind::CurlyClose
				| TokenKind::BracketOpen
				| TokenKind::BracketClose
				| TokenKind::Colon
				| TokenKind::Comma
				| TokenKind::Tilde
		)
	}

	pub fn is_trivia(&self) -> bool {
		matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
	}

	pub fn is_literal(&self) -> bool {
		matches!(
			self.kind,
			TokenKind::String
				| TokenKind::Number
				| TokenKind::BigInt
				| TokenKind::Decimal
				| TokenKind::Boolean
				| TokenKind::Null
				| TokenKind::Undefined
				| TokenKind::DateTime
				| TokenKind::Date
				| TokenKind::Time
				| TokenKind::Binary
				| TokenKind::OpenString
		)
	}
}

impl crate::position::Spanned for Token {
	fn range(&self) -> PositionRange {
		self.range
	}
}
