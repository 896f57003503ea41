//! C2 — turns raw document text into a flat stream of [`Token`]s.
//!
//! The tokenizer never raises: anything it can't make sense of is emitted as
//! a [`TokenKind::Error`] token carrying the offending span, so the parser
//! always has a complete token stream to recover from.

mod datetime;
mod number;
mod string;

use crate::error::{Error as IoError, ErrorKind};
use crate::position::{Position, PositionRange};
use crate::token::{SubKind, Token, TokenKind};
use crate::value::Value;

/// Tunables for [`tokenize`].
#[derive(Clone, Copy, Debug)]
pub struct TokenizerOptions {
	/// Normalize `\r\n` and lone `\r` to `\n` before scanning, so row/col
	/// bookkeeping doesn't need to special-case line ending styles.
	pub normalize_line_endings: bool,
}

impl Default for TokenizerOptions {
	fn default() -> Self {
		Self {
			normalize_line_endings: true,
		}
	}
}

/// Scans `source` into a token stream. Trivia (whitespace, comments) is kept
/// in the stream; the parser filters it.
pub fn tokenize(source: &str, options: TokenizerOptions) -> Vec<Token> {
	let normalized;
	let source = if options.normalize_line_endings && source.contains('\r') {
		normalized = source.replace("\r\n", "\n").replace('\r', "\n");
		normalized.as_str()
	} else {
		source
	};
	let mut cursor = Cursor::new(source);
	let mut tokens = Vec::new();
	while let Some(token) = cursor.next_token() {
		tokens.push(token);
	}
	tokens
}

struct Cursor<'a> {
	bytes: &'a [u8],
	src: &'a str,
	offset: usize,
	row: u32,
	col: u32,
}

impl<'a> Cursor<'a> {
	fn new(src: &'a str) -> Self {
		Self {
			bytes: src.as_bytes(),
			src,
			offset: 0,
			row: 1,
			col: 1,
		}
	}

	fn pos(&self) -> Position {
		Position::new(self.offset, self.row, self.col)
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.offset).copied()
	}

	fn peek_at(&self, ahead: usize) -> Option<u8> {
		self.bytes.get(self.offset + ahead).copied()
	}

	fn bump(&mut self) -> Option<u8> {
		let b = self.peek()?;
		self.offset += 1;
		if b == b'\n' {
			self.row += 1;
			self.col = 1;
		} else {
			self.col += 1;
		}
		Some(b)
	}

	fn starts_with(&self, needle: &str) -> bool {
		self.src[self.offset..].starts_with(needle)
	}

	fn slice_from(&self, start: usize) -> &'a str {
		&self.src[start..self.offset]
	}

	fn error_token(&mut self, start: Position, kind: ErrorKind, text: &str) -> Token {
		let range = PositionRange::new(start, self.pos());
		Token::new(TokenKind::Error, range, text)
			.with_value(Value::Error(Box::new(IoError::new(kind, range))))
	}

	fn next_token(&mut self) -> Option<Token> {
		let b = self.peek()?;
		let start = self.pos();

		if b == b' ' || b == b'\t' || b == b'\n' {
			return Some(self.scan_whitespace(start));
		}
		if b == b'#' {
			return Some(self.scan_line_comment(start));
		}
		if self.starts_with("---") {
			self.offset += 3;
			self.col += 3;
			return Some(Token::new(
				TokenKind::SectionSep,
				PositionRange::new(start, self.pos()),
				"---",
			));
		}

		match b {
			b'{' => Some(self.single(start, TokenKind::CurlyOpen, "{")),
			b'}' => Some(self.single(start, TokenKind::CurlyClose, "}")),
			b'[' => Some(self.single(start, TokenKind::BracketOpen, "[")),
			b']' => Some(self.single(start, TokenKind::BracketClose, "]")),
			b':' => Some(self.single(start, TokenKind::Colon, ":")),
			b',' => Some(self.single(start, TokenKind::Comma, ",")),
			b'~' => Some(self.single(start, TokenKind::CollectionStart, "~")),
			b'"' | b'\'' => Some(string::scan_string(self, start, b as char)),
			b'r' if matches!(self.peek_at(1), Some(b'\'') | Some(b'"')) => {
				Some(string::scan_raw_string(self, start))
			}
			b'b' if self.peek_at(1) == Some(b'\'') || self.peek_at(1) == Some(b'"') => {
				Some(string::scan_binary(self, start))
			}
			_ if self.starts_with("dt'") || self.starts_with("dt\"") => {
				Some(datetime::scan_datetime(self, start))
			}
			b'd' if self.peek_at(1) == Some(b'\'') || self.peek_at(1) == Some(b'"') => {
				Some(datetime::scan_date(self, start))
			}
			b't' if self.peek_at(1) == Some(b'\'') || self.peek_at(1) == Some(b'"') => {
				Some(datetime::scan_time(self, start))
			}
			b'-' | b'+' if self.peek_at(1).map(is_ascii_digit).unwrap_or(false) => {
				Some(number::scan_number(self, start))
			}
			_ if is_ascii_digit(b) => Some(number::scan_number(self, start)),
			_ if is_bareword_start(b) => Some(self.scan_bareword(start)),
			_ => {
				self.bump();
				Some(self.error_token(
					start,
					ErrorKind::UnexpectedToken {
						found: (b as char).to_string(),
						expected: "a value or punctuation".to_owned(),
					},
					&(b as char).to_string(),
				))
			}
		}
	}

	fn single(&mut self, start: Position, kind: TokenKind, text: &str) -> Token {
		self.bump();
		Token::new(kind, PositionRange::new(start, self.pos()), text)
	}

	fn scan_whitespace(&mut self, start: Position) -> Token {
		let begin = self.offset;
		while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n')) {
			self.bump();
		}
		let text = self.slice_from(begin).to_owned();
		Token::new(TokenKind::Whitespace, PositionRange::new(start, self.pos()), text)
	}

	fn scan_line_comment(&mut self, start: Position) -> Token {
		let begin = self.offset;
		while !matches!(self.peek(), None | Some(b'\n')) {
			self.bump();
		}
		let text = self.slice_from(begin).to_owned();
		Token::new(TokenKind::Comment, PositionRange::new(start, self.pos()), text)
	}

	fn scan_bareword(&mut self, start: Position) -> Token {
		let begin = self.offset;
		while matches!(self.peek(), Some(b) if is_bareword_continue(b)) {
			self.bump();
		}
		let text = self.slice_from(begin).to_owned();
		classify_bareword(text, start, self.pos())
	}
}

fn is_ascii_digit(b: u8) -> bool {
	b.is_ascii_digit()
}

/// Terminator bytes that close an unquoted (open-string) value, per spec
/// §4.1's character classes.
fn is_terminator(b: u8) -> bool {
	matches!(
		b,
		b'{' | b'}' | b'[' | b']' | b':' | b',' | b'#' | b'"' | b'\'' | b'~'
	)
}

/// An open string runs until a terminator or whitespace; this is
/// deliberately permissive (it's how `$ref`/`@var` references, which start
/// with punctuation, tokenize as a single bareword).
fn is_bareword_start(b: u8) -> bool {
	!is_terminator(b) && !b.is_ascii_whitespace()
}

fn is_bareword_continue(b: u8) -> bool {
	!is_terminator(b) && !b.is_ascii_whitespace()
}

/// A bareword is resolved at tokenize time when it spells a keyword literal
/// (`true`/`false`/`T`/`F`/`null`/`N`/`undefined`) or one of the special
/// numeric spellings (`NaN`/`Inf`/`+Inf`/`-Inf`); anything else becomes an
/// [`TokenKind::OpenString`], which the parser treats as a string literal in
/// value position and as a plain name in key position.
fn classify_bareword(text: String, start: Position, end: Position) -> Token {
	let range = PositionRange::new(start, end);
	match text.as_str() {
		"true" | "T" => Token::new(TokenKind::Boolean, range, text).with_value(Value::Bool(true)),
		"false" | "F" => Token::new(TokenKind::Boolean, range, text).with_value(Value::Bool(false)),
		"null" | "N" => Token::new(TokenKind::Null, range, text).with_value(Value::Null),
		"undefined" | "?" => {
			Token::new(TokenKind::Undefined, range, text).with_value(Value::Undefined)
		}
		"NaN" => Token::new(TokenKind::Number, range, text).with_value(Value::Number(f64::NAN)),
		"Inf" | "+Inf" => {
			Token::new(TokenKind::Number, range, text).with_value(Value::Number(f64::INFINITY))
		}
		"-Inf" => Token::new(TokenKind::Number, range, text)
			.with_value(Value::Number(f64::NEG_INFINITY)),
		_ => Token::new(TokenKind::OpenString, range, text.clone())
			.with_sub_kind(SubKind::OpenString)
			.with_value(Value::String(text)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(src: &str) -> Vec<TokenKind> {
		tokenize(src, TokenizerOptions::default())
			.into_iter()
			.map(|t| t.kind)
			.collect()
	}

	#[test]
	fn punctuation_is_lexed_one_char_at_a_time() {
		assert_eq!(
			kinds("{}[]:,~"),
			vec![
				TokenKind::CurlyOpen,
				TokenKind::CurlyClose,
				TokenKind::BracketOpen,
				TokenKind::BracketClose,
				TokenKind::Colon,
				TokenKind::Comma,
				TokenKind::CollectionStart,
			]
		);
	}

	#[test]
	fn section_separator_is_its_own_token() {
		assert_eq!(kinds("---"), vec![TokenKind::SectionSep]);
	}

	#[test]
	fn keywords_resolve_to_literal_kinds() {
		assert_eq!(
			kinds("true false null undefined"),
			vec![
				TokenKind::Boolean,
				TokenKind::Whitespace,
				TokenKind::Boolean,
				TokenKind::Whitespace,
				TokenKind::Null,
				TokenKind::Whitespace,
				TokenKind::Undefined,
			]
		);
	}

	#[test]
	fn unknown_bareword_becomes_open_string() {
		let toks = tokenize("hello", TokenizerOptions::default());
		assert_eq!(toks[0].kind, TokenKind::OpenString);
		assert_eq!(toks[0].value, Some(Value::String("hello".to_owned())));
	}

	#[test]
	fn line_comment_runs_to_end_of_line() {
		let toks = tokenize("# a comment\n1", TokenizerOptions::default());
		assert_eq!(toks[0].kind, TokenKind::Comment);
		assert_eq!(toks[0].text, "# a comment");
	}

	#[test]
	fn unterminated_string_becomes_error_token_not_a_panic() {
		let toks = tokenize("\"abc", TokenizerOptions::default());
		assert_eq!(toks.len(), 1);
		assert_eq!(toks[0].kind, TokenKind::Error);
	}

	#[test]
	fn variable_and_schema_references_tokenize_as_open_strings() {
		let toks = tokenize("$schema @var", TokenizerOptions::default());
		assert_eq!(toks[0].kind, TokenKind::OpenString);
		assert_eq!(toks[0].text, "$schema");
		assert_eq!(toks[2].kind, TokenKind::OpenString);
		assert_eq!(toks[2].text, "@var");
	}

	#[test]
	fn special_numeric_spellings_are_recognized() {
		let toks: Vec<_> = tokenize("NaN Inf +Inf -Inf", TokenizerOptions::default())
			.into_iter()
			.filter(|t| t.kind == TokenKind::Number)
			.collect();
		assert_eq!(toks.len(), 4);
		assert!(toks[0].value.as_ref().unwrap().as_number().unwrap().is_nan());
		assert_eq!(toks[1].value, Some(Value::Number(f64::INFINITY)));
		assert_eq!(toks[2].value, Some(Value::Number(f64::INFINITY)));
		assert_eq!(toks[3].value, Some(Value::Number(f64::NEG_INFINITY)));
	}

	#[test]
	fn raw_strings_skip_escape_processing() {
		let toks = tokenize(r#"r"a\nb""#, TokenizerOptions::default());
		assert_eq!(toks[0].kind, TokenKind::String);
		assert_eq!(toks[0].value, Some(Value::String("a\\nb".to_owned())));
	}
}
