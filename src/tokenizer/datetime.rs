//! `d'...'`, `t'...'` and `dt'...'` literal scanning.

use super::Cursor;
use crate::error::ErrorKind;
use crate::position::{Position, PositionRange};
use crate::token::{Token, TokenKind};
use crate::value::Value;

fn take_quoted(cursor: &mut Cursor<'_>, prefix_len: usize) -> Option<String> {
	for _ in 0..prefix_len {
		cursor.bump();
	}
	let quote = cursor.peek()? as char;
	cursor.bump();
	let content_start = cursor.offset;
	while matches!(cursor.peek(), Some(b) if b as char != quote) {
		cursor.bump();
	}
	if cursor.peek().is_none() {
		return None;
	}
	let content = cursor.slice_from(content_start).to_owned();
	cursor.bump(); // closing quote
	Some(content)
}

/// Parses `YYYY-MM-DD`, or a partial `YYYY-MM` / `YYYY` form zero-filled to
/// the first of the month / January 1st (spec §4.1: "Partial forms are
/// zero-filled").
fn parse_date_zero_filled(content: &str) -> Option<chrono::NaiveDate> {
	if let Ok(date) = chrono::NaiveDate::parse_from_str(content, "%Y-%m-%d") {
		return Some(date);
	}
	let parts: Vec<&str> = content.split('-').collect();
	match parts.as_slice() {
		[y] => y.parse().ok().and_then(|y| chrono::NaiveDate::from_ymd_opt(y, 1, 1)),
		[y, m] => {
			let y = y.parse().ok()?;
			let m = m.parse().ok()?;
			chrono::NaiveDate::from_ymd_opt(y, m, 1)
		}
		_ => None,
	}
}

/// Parses `HH:MM:SS[.fff]`, or a partial `HH:MM` form zero-filled to
/// `seconds = 0` (spec §4.1: "time without seconds → seconds=0").
fn parse_time_zero_filled(content: &str) -> Option<chrono::NaiveTime> {
	chrono::NaiveTime::parse_from_str(content, "%H:%M:%S%.f")
		.or_else(|_| chrono::NaiveTime::parse_from_str(content, "%H:%M:%S"))
		.or_else(|_| chrono::NaiveTime::parse_from_str(content, "%H:%M"))
		.ok()
}

/// `d'YYYY-MM-DD'` — a date-only literal, with the `YYYY-MM`/`YYYY` partial
/// forms zero-filled per spec §4.1. Per the design note on date-only
/// tokens, the decoded value keeps a distinct `Value::Date` variant rather
/// than being eagerly promoted to a UTC-midnight instant; promotion happens
/// only where a `datetime`-typed schema member consumes it.
pub(super) fn scan_date(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;
	let Some(content) = take_quoted(cursor, 1) else {
		let text = cursor.slice_from(begin).to_owned();
		return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
	};
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	match parse_date_zero_filled(&content) {
		Some(date) => Token::new(TokenKind::Date, range, text).with_value(Value::Date(date)),
		None => cursor.error_token(start, ErrorKind::InvalidDatetime(content), &text),
	}
}

/// `t'HH:MM:SS'` (fractional seconds optional, and `HH:MM` with seconds
/// zero-filled per spec §4.1).
pub(super) fn scan_time(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;
	let Some(content) = take_quoted(cursor, 1) else {
		let text = cursor.slice_from(begin).to_owned();
		return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
	};
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());
	match parse_time_zero_filled(&content) {
		Some(time) => Token::new(TokenKind::Time, range, text).with_value(Value::Time(time)),
		None => cursor.error_token(start, ErrorKind::InvalidDatetime(content), &text),
	}
}

/// `dt'YYYY-MM-DDTHH:MM:SS[.fff][Z|+HH:MM]'` — a full timestamp, defaulting
/// to UTC when no offset is present. A bare date (no `T...` part) zero-fills
/// to UTC midnight, per spec §4.1's "date without time → midnight UTC".
pub(super) fn scan_datetime(cursor: &mut Cursor<'_>, start: Position) -> Token {
	let begin = cursor.offset;
	let Some(content) = take_quoted(cursor, 2) else {
		let text = cursor.slice_from(begin).to_owned();
		return cursor.error_token(start, ErrorKind::StringNotClosed, &text);
	};
	let text = cursor.slice_from(begin).to_owned();
	let range = PositionRange::new(start, cursor.pos());

	let with_offset = chrono::DateTime::parse_from_rfc3339(&content)
		.map(|dt| dt.with_timezone(&chrono::Utc));
	let value = with_offset
		.or_else(|_| {
			chrono::NaiveDateTime::parse_from_str(&content, "%Y-%m-%dT%H:%M:%S%.f")
				.or_else(|_| chrono::NaiveDateTime::parse_from_str(&content, "%Y-%m-%dT%H:%M:%S"))
				.map(|naive| naive.and_utc())
		})
		.ok()
		.or_else(|| {
			parse_date_zero_filled(&content).map(|date| {
				date.and_hms_opt(0, 0, 0)
					.expect("midnight is always valid")
					.and_utc()
			})
		});
	match value {
		Some(dt) => Token::new(TokenKind::DateTime, range, text).with_value(Value::DateTime(dt)),
		None => cursor.error_token(start, ErrorKind::InvalidDatetime(content), &text),
	}
}
