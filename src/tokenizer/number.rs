//! Numeric literal scanning: decimal, hex/octal/binary integers, bigint and
//! decimal suffixes.

use super::Cursor;
use crate::error::ErrorKind;
use crate::position::{Position, PositionRange};
use crate::token::{SubKind, Token, TokenKind};
use crate::value::Value;

pub(super) fn scan_number(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;

	if cursor.peek() == Some(b'-') || cursor.peek() == Some(b'+') {
		cursor.bump();
	}

	if cursor.peek() == Some(b'0') && matches!(cursor.peek_at(1), Some(b'x') | Some(b'X')) {
		return scan_radix(cursor, start, begin, 16, SubKind::Hex, |b| b.is_ascii_hexdigit());
	}
	if cursor.peek() == Some(b'0') && matches!(cursor.peek_at(1), Some(b'o') | Some(b'O')) {
		return scan_radix(cursor, start, begin, 8, SubKind::Octal, |b| (b'0'..=b'7').contains(&b));
	}
	if cursor.peek() == Some(b'0') && matches!(cursor.peek_at(1), Some(b'b') | Some(b'B')) {
		return scan_radix(cursor, start, begin, 2, SubKind::Binary2, |b| b == b'0' || b == b'1');
	}

	while matches!(cursor.peek(), Some(b) if b.is_ascii_digit()) {
		cursor.bump();
	}

	let mut is_float = false;
	if cursor.peek() == Some(b'.') && cursor.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
	{
		is_float = true;
		cursor.bump();
		while matches!(cursor.peek(), Some(b) if b.is_ascii_digit()) {
			cursor.bump();
		}
	}
	if matches!(cursor.peek(), Some(b'e') | Some(b'E')) {
		let save = cursor.offset;
		let mut tentative = String::new();
		tentative.push('e');
		let mut i = 1;
		if matches!(cursor.peek_at(i), Some(b'+') | Some(b'-')) {
			i += 1;
		}
		if cursor.peek_at(i).map(|b| b.is_ascii_digit()).unwrap_or(false) {
			is_float = true;
			cursor.bump();
			if matches!(cursor.peek(), Some(b'+') | Some(b'-')) {
				cursor.bump();
			}
			while matches!(cursor.peek(), Some(b) if b.is_ascii_digit()) {
				cursor.bump();
			}
		} else {
			cursor.offset = save;
		}
		let _ = tentative;
	}

	// Trailing type suffix: `n` bigint, `m`/`d` decimal.
	let suffix = cursor.peek();
	let text_without_suffix = cursor.slice_from(begin).to_owned();
	match suffix {
		Some(b'n') => {
			cursor.bump();
			let text = cursor.slice_from(begin).to_owned();
			let range = PositionRange::new(start, cursor.pos());
			return match text_without_suffix.parse::<num_bigint::BigInt>() {
				Ok(v) => Token::new(TokenKind::BigInt, range, text).with_value(Value::BigInt(v)),
				Err(_) => cursor.error_token(start, ErrorKind::OutOfRange(text.clone()), &text),
			};
		}
		Some(b'm') => {
			cursor.bump();
			let text = cursor.slice_from(begin).to_owned();
			let range = PositionRange::new(start, cursor.pos());
			return match text_without_suffix.parse::<rust_decimal::Decimal>() {
				Ok(v) => Token::new(TokenKind::Decimal, range, text).with_value(Value::Decimal(v)),
				Err(_) => cursor.error_token(start, ErrorKind::OutOfRange(text.clone()), &text),
			};
		}
		_ => {}
	}

	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	if is_float {
		match text.parse::<f64>() {
			Ok(v) => Token::new(TokenKind::Number, range, text).with_value(Value::Number(v)),
			Err(_) => cursor.error_token(start, ErrorKind::OutOfRange(text.clone()), &text),
		}
	} else {
		match text.parse::<f64>() {
			Ok(v) => Token::new(TokenKind::Number, range, text).with_value(Value::Number(v)),
			Err(_) => cursor.error_token(start, ErrorKind::OutOfRange(text.clone()), &text),
		}
	}
}

fn scan_radix(
	cursor: &mut Cursor<'_>,
	start: Position,
	begin: usize,
	radix: u32,
	sub_kind: SubKind,
	is_digit: impl Fn(u8) -> bool,
) -> Token {
	cursor.bump(); // '0'
	cursor.bump(); // x/o/b
	let digits_start = cursor.offset;
	while matches!(cursor.peek(), Some(b) if is_digit(b)) {
		cursor.bump();
	}
	let text = cursor.slice_from(begin).to_owned();
	let digits = cursor.slice_from(digits_start);
	let range = PositionRange::new(start, cursor.pos());
	match i64::from_str_radix(digits, radix) {
		Ok(v) => Token::new(TokenKind::Number, range, text)
			.with_sub_kind(sub_kind)
			.with_value(Value::Number(v as f64)),
		Err(_) => cursor.error_token(start, ErrorKind::OutOfRange(text.clone()), &text),
	}
}
