//! Quoted string and base64 binary literal scanning.

use super::Cursor;
use crate::error::ErrorKind;
use crate::position::{Position, PositionRange};
use crate::token::{SubKind, Token, TokenKind};
use crate::value::Value;

/// Scans a `"..."` or `'...'` string, honoring `\\`, `\"`, `\'`, `\n`, `\t`,
/// `\r`, `\uXXXX` escapes. An unterminated string produces an
/// [`TokenKind::Error`] token spanning to end of input rather than panicking.
pub(super) fn scan_string(cursor: &mut Cursor<'_>, start: Position, quote: char) -> Token {
	let begin = cursor.offset;
	cursor.bump(); // opening quote
	let mut decoded = String::new();
	loop {
		match cursor.peek() {
			None => {
				let text = cursor.slice_from(begin).to_owned();
				return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
			}
			Some(b) if b as char == quote => {
				cursor.bump();
				break;
			}
			Some(b'\\') => {
				cursor.bump();
				match cursor.peek() {
					None => {
						let text = cursor.slice_from(begin).to_owned();
						return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
					}
					Some(b'n') => {
						decoded.push('\n');
						cursor.bump();
					}
					Some(b't') => {
						decoded.push('\t');
						cursor.bump();
					}
					Some(b'r') => {
						decoded.push('\r');
						cursor.bump();
					}
					Some(b'\\') => {
						decoded.push('\\');
						cursor.bump();
					}
					Some(b'"') => {
						decoded.push('"');
						cursor.bump();
					}
					Some(b'\'') => {
						decoded.push('\'');
						cursor.bump();
					}
					Some(b'/') => {
						decoded.push('/');
						cursor.bump();
					}
					Some(b'b') => {
						decoded.push('\u{8}');
						cursor.bump();
					}
					Some(b'f') => {
						decoded.push('\u{c}');
						cursor.bump();
					}
					Some(b'x') => {
						cursor.bump();
						match read_hex_escape(cursor) {
							Some(c) => decoded.push(c),
							None => {
								let text = cursor.slice_from(begin).to_owned();
								return cursor.error_token(
									start,
									ErrorKind::InvalidEscapeSequence('x'),
									&text,
								);
							}
						}
					}
					Some(b'u') => {
						cursor.bump();
						match read_unicode_escape(cursor) {
							Some(c) => decoded.push(c),
							None => {
								let text = cursor.slice_from(begin).to_owned();
								return cursor.error_token(
									start,
									ErrorKind::InvalidEscapeSequence('u'),
									&text,
								);
							}
						}
					}
					Some(other) => {
						// Lenient: drop the backslash, keep the character
						// literally, per the leniency note on escapes.
						decoded.push(other as char);
						cursor.bump();
					}
				}
			}
			Some(_) => {
				let ch_start = cursor.offset;
				cursor.bump();
				while !cursor.src.is_char_boundary(cursor.offset) {
					cursor.bump();
				}
				decoded.push_str(&cursor.src[ch_start..cursor.offset]);
			}
		}
	}
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	Token::new(TokenKind::String, range, text)
		.with_sub_kind(SubKind::QuotedString)
		.with_value(Value::String(decoded))
}

fn read_unicode_escape(cursor: &mut Cursor<'_>) -> Option<char> {
	let mut code = 0u32;
	for _ in 0..4 {
		let b = cursor.peek()?;
		let digit = (b as char).to_digit(16)?;
		code = code * 16 + digit;
		cursor.bump();
	}
	char::from_u32(code)
}

fn read_hex_escape(cursor: &mut Cursor<'_>) -> Option<char> {
	let mut code = 0u32;
	for _ in 0..2 {
		let b = cursor.peek()?;
		let digit = (b as char).to_digit(16)?;
		code = code * 16 + digit;
		cursor.bump();
	}
	char::from_u32(code)
}

/// Scans a `r"..."` / `r'...'` raw string: no escape processing at all.
pub(super) fn scan_raw_string(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;
	cursor.bump(); // 'r'
	let quote = cursor.peek().unwrap_or(b'\'') as char;
	cursor.bump(); // opening quote
	let content_start = cursor.offset;
	while matches!(cursor.peek(), Some(b) if b as char != quote) {
		cursor.bump();
	}
	if cursor.peek().is_none() {
		let text = cursor.slice_from(begin).to_owned();
		return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
	}
	let content = cursor.slice_from(content_start).to_owned();
	cursor.bump(); // closing quote
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	Token::new(TokenKind::String, range, text)
		.with_sub_kind(SubKind::RawString)
		.with_value(Value::String(content))
}

/// Scans a `b'...'` base64-encoded binary literal.
pub(super) fn scan_binary(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;
	cursor.bump(); // 'b'
	let quote = cursor.peek().unwrap_or(b'\'') as char;
	cursor.bump(); // opening quote
	let content_start = cursor.offset;
	while matches!(cursor.peek(), Some(b) if b as char != quote) {
		cursor.bump();
	}
	let content = cursor.slice_from(content_start).to_owned();
	if cursor.peek().is_none() {
		let text = cursor.slice_from(begin).to_owned();
		return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
	}
	cursor.bump(); // closing quote
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	use base64::Engine;
	match base64::engine::general_purpose::STANDARD.decode(content.as_bytes()) {
		Ok(bytes) => Token::new(TokenKind::Binary, range, text)
			.with_sub_kind(SubKind::BinaryString)
			.with_value(Value::Binary(bytes)),
		Err(_) => cursor.error_token(start, ErrorKind::InvalidBase64, &text),
	}
}
