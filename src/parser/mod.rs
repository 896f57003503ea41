//! C4 — turns a token stream into a [`DocumentNode`], never aborting: a
//! malformed member, object, or section is swapped for an [`ErrorNode`] and
//! parsing carries on from the next recovery point.
//!
//! Three tiers of recovery, from narrowest to widest, mirroring the
//! error-tolerant recursive descent style the pack's `apollographql-apollo-rs`
//! parser uses (produce a tree with embedded error nodes instead of
//! aborting):
//!
//! 1. token level — an unexpected token becomes an [`ErrorNode`] in place.
//! 2. collection/object level — a malformed member is skipped up to the next
//!    `,` or closing bracket, and parsing resumes with the next member.
//! 3. section level — a section whose body can't be recovered at all becomes
//!    a single [`ErrorNode`] section body, and the parser resumes at the next
//!    `---`.

use crate::ast::{
	ArrayNode, CollectionItem, CollectionNode, DocumentNode, ErrorNode, MemberNode, Node, ObjectNode,
	SectionBody, SectionNode, TokenNode,
};
use crate::error::{Error as IoError, ErrorKind};
use crate::position::PositionRange;
use crate::token::{Token, TokenKind};

/// Tunables for [`parse`].
#[derive(Clone, Copy, Debug)]
pub struct ParserOptions {
	/// Maximum recursive descent depth for nested objects/arrays, bounding
	/// stack growth on adversarial input.
	pub max_nesting_depth: usize,
	/// When `true`, an unrecognized `\x` escape in a string raises
	/// `InvalidEscapeSequence` instead of being dropped leniently.
	pub strict_escapes: bool,
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self {
			max_nesting_depth: 64,
			strict_escapes: false,
		}
	}
}

/// Parses a token stream (as produced by [`crate::tokenizer::tokenize`]) into
/// a [`DocumentNode`] plus every recovered error, in source order.
pub fn parse(tokens: Vec<Token>, options: ParserOptions) -> (DocumentNode, Vec<IoError>) {
	let significant: Vec<Token> = tokens
		.into_iter()
		.filter(|t| !t.is_trivia())
		.collect();
	let mut parser = Parser {
		tokens: significant,
		pos: 0,
		depth: 0,
		options,
		errors: Vec::new(),
	};
	let doc = parser.parse_document();
	(doc, parser.errors)
}

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
	depth: usize,
	options: ParserOptions,
	errors: Vec<IoError>,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn peek_kind(&self) -> Option<TokenKind> {
		self.peek().map(|t| t.kind)
	}

	fn bump(&mut self) -> Option<Token> {
		let t = self.tokens.get(self.pos).cloned();
		if t.is_some() {
			self.pos += 1;
		}
		t
	}

	fn eof_range(&self) -> PositionRange {
		self.tokens
			.last()
			.map(|t| PositionRange::at(t.range.end))
			.unwrap_or_default()
	}

	fn record_error(&mut self, kind: ErrorKind, range: PositionRange) -> ErrorNode {
		let error = IoError::new(kind, range);
		self.errors.push(error.clone());
		ErrorNode { error, range }
	}

	/// Skips tokens until one of `stop` is found (not consumed) or EOF.
	/// Bracket/brace-aware: won't stop on a `,` nested inside a deeper
	/// object/array than where recovery started.
	///
	/// `CollectionStart`/`SectionSep` are *always* hard stops, regardless of
	/// `stop` or nesting depth (spec §4.2 tier 2/3: resynchronize "until the
	/// next COLLECTION_START or SECTION_SEP") — a malformed, never-closed
	/// `{`/`[` must not let recovery walk across the next `~` item or `---`
	/// section boundary and swallow it.
	fn synchronize(&mut self, stop: &[TokenKind]) {
		let mut depth = 0i32;
		while let Some(tok) = self.peek() {
			match tok.kind {
				TokenKind::CollectionStart | TokenKind::SectionSep => return,
				TokenKind::CurlyOpen | TokenKind::BracketOpen => depth += 1,
				TokenKind::CurlyClose | TokenKind::BracketClose => {
					if depth == 0 && stop.contains(&tok.kind) {
						return;
					}
					depth -= 1;
				}
				_ if depth == 0 && stop.contains(&tok.kind) => return,
				_ => {}
			}
			self.pos += 1;
		}
	}

	/// Whether `kind` is a boundary that member/element parsing must never
	/// cross, even when it isn't in the caller's own `stop` set — the next
	/// collection item or section always ends the current (malformed)
	/// construct instead of being absorbed into it.
	fn is_hard_stop(kind: TokenKind) -> bool {
		matches!(kind, TokenKind::CollectionStart | TokenKind::SectionSep)
	}

	fn parse_document(&mut self) -> DocumentNode {
		let segments = self.split_sections();
		let start = self.tokens.first().map(|t| t.range.start).unwrap_or_default();

		if segments.len() <= 1 {
			// No `---` anywhere: the whole document is one unnamed section.
			let body_tokens = segments.into_iter().next().map(|s| s.1).unwrap_or_default();
			let section = self.parse_section(None, None, body_tokens, start);
			let end = section.range.end;
			return DocumentNode {
				header: None,
				sections: vec![section],
				range: PositionRange::new(start, end),
			};
		}

		let mut iter = segments.into_iter();
		let (_, header_tokens) = iter.next().expect("checked len > 1 above");
		let header = if header_tokens.is_empty() {
			None
		} else {
			Some(self.parse_header(header_tokens))
		};

		let mut sections = Vec::new();
		let mut used_names = std::collections::HashSet::new();
		for (sep, body_tokens) in iter {
			let sep_tok = sep.expect("every non-first segment has a separator");
			let sep_row = sep_tok.range.start.row;
			let mut rest = body_tokens.into_iter().peekable();
			let mut header_line = Vec::new();
			while let Some(t) = rest.peek() {
				if t.range.start.row == sep_row {
					header_line.push(rest.next().unwrap());
				} else {
					break;
				}
			}
			let body_tokens: Vec<Token> = rest.collect();
			let (mut name, schema_name) = parse_section_header_line(&header_line);
			if let Some(n) = &name {
				if !used_names.insert(n.clone()) {
					let mut suffix = 2;
					let mut candidate = format!("{n}_{suffix}");
					while !used_names.insert(candidate.clone()) {
						suffix += 1;
						candidate = format!("{n}_{suffix}");
					}
					self.errors.push(IoError::new(
						ErrorKind::DuplicateSection(n.clone(), candidate.clone()),
						sep_tok.range,
					));
					name = Some(candidate);
				}
			}
			sections.push(self.parse_section(name, schema_name, body_tokens, sep_tok.range.start));
		}

		let end = sections
			.last()
			.map(|s| s.range.end)
			.or(header.as_ref().map(|h| body_range(h).end))
			.unwrap_or(start);
		DocumentNode {
			header,
			sections,
			range: PositionRange::new(start, end),
		}
	}

	/// Splits the significant token stream into `(separator, body)` chunks at
	/// every top-level `---`. The very first chunk always has `separator ==
	/// None` (it's either the header, or the document's only section).
	fn split_sections(&self) -> Vec<(Option<Token>, Vec<Token>)> {
		let mut segments = Vec::new();
		let mut current_sep = None;
		let mut current_body = Vec::new();
		let mut depth = 0i32;
		for tok in &self.tokens {
			match tok.kind {
				TokenKind::CurlyOpen | TokenKind::BracketOpen => {
					depth += 1;
					current_body.push(tok.clone());
				}
				TokenKind::CurlyClose | TokenKind::BracketClose => {
					depth -= 1;
					current_body.push(tok.clone());
				}
				TokenKind::SectionSep if depth == 0 => {
					segments.push((current_sep.take(), std::mem::take(&mut current_body)));
					current_sep = Some(tok.clone());
				}
				_ => current_body.push(tok.clone()),
			}
		}
		segments.push((current_sep.take(), current_body));
		segments
	}

	fn parse_section(
		&mut self,
		name: Option<String>,
		schema_name: Option<String>,
		body_tokens: Vec<Token>,
		start: crate::position::Position,
	) -> SectionNode {
		let body = self.parse_body(body_tokens);
		let end = body_range(&body).end;
		SectionNode {
			name,
			schema_name,
			body,
			range: PositionRange::new(start, end.max_with(start)),
		}
	}

	/// Parses a section (or header) body: a `~`-led token stream becomes a
	/// [`SectionBody::Collection`], anything else a braceless
	/// [`SectionBody::Object`].
	fn parse_body(&mut self, body_tokens: Vec<Token>) -> SectionBody {
		let is_collection = matches!(body_tokens.first(), Some(t) if t.kind == TokenKind::CollectionStart);
		let mut sub = Parser {
			tokens: body_tokens,
			pos: 0,
			depth: 0,
			options: self.options,
			errors: Vec::new(),
		};
		let body = if is_collection {
			SectionBody::Collection(sub.parse_collection())
		} else {
			SectionBody::Object(sub.parse_braceless_object())
		};
		self.errors.append(&mut sub.errors);
		body
	}

	/// The document header: either a `~`-prefixed collection of single-member
	/// definition objects (`~ key: value` lines — spec §4.3's general case)
	/// or, as sugar, a flat braceless object that is itself the default
	/// schema.
	fn parse_header(&mut self, header_tokens: Vec<Token>) -> SectionBody {
		self.parse_body(header_tokens)
	}

	fn parse_collection(&mut self) -> CollectionNode {
		let start = self.peek().map(|t| t.range.start).unwrap_or_default();
		let mut items = Vec::new();
		while self.peek_kind() == Some(TokenKind::CollectionStart) {
			self.bump();
			let errors_before = self.errors.len();
			let obj = self.parse_one_object_item();
			// Collection-level recovery (spec §4.2 tier 2): a syntax error
			// raised while parsing this item (e.g. an unclosed `{`) means the
			// token stream desynced past this item's true boundary, so the
			// whole item becomes an `ErrorNode` and we resynchronize to the
			// next `~` instead of trusting the partial object.
			if self.errors.len() > errors_before {
				let error = self.errors[errors_before].clone();
				let range = error.range();
				self.synchronize(&[TokenKind::CollectionStart]);
				items.push(CollectionItem::Error(ErrorNode { error, range }));
			} else {
				items.push(CollectionItem::Object(obj));
			}
			// Optional trailing comma between `~` items.
			if self.peek_kind() == Some(TokenKind::Comma) {
				self.bump();
			}
		}
		let end = items
			.last()
			.map(|item| crate::position::Spanned::range(item).end)
			.unwrap_or(start);
		CollectionNode {
			items,
			range: PositionRange::new(start, end),
		}
	}

	fn parse_one_object_item(&mut self) -> ObjectNode {
		if self.peek_kind() == Some(TokenKind::CurlyOpen) {
			self.parse_braced_object()
		} else {
			finish_braceless(self.parse_members_until(&[TokenKind::CollectionStart]))
		}
	}

	fn parse_braceless_object(&mut self) -> ObjectNode {
		finish_braceless(self.parse_members_until(&[]))
	}

	fn parse_braced_object(&mut self) -> ObjectNode {
		let start = self.peek().map(|t| t.range.start).unwrap_or_default();
		self.bump(); // `{`
		let obj = self.parse_members_until(&[TokenKind::CurlyClose]);
		if self.peek_kind() == Some(TokenKind::CurlyClose) {
			let end = self.bump().unwrap().range.end;
			ObjectNode {
				members: obj.members,
				range: PositionRange::new(start, end),
			}
		} else {
			self.record_error(ErrorKind::ExpectingBracket('}'), PositionRange::at(
				self.peek().map(|t| t.range.start).unwrap_or(self.eof_range().end),
			));
			obj
		}
	}

	/// Parses a comma-delimited member list (spec §4.2's `Members` rule).
	/// A comma with no value before it — either two commas back to back, or
	/// a trailing comma right before `stop` — yields an `UNDEFINED` member
	/// rather than being silently skipped, per spec's comma semantics.
	fn parse_members_until(&mut self, stop: &[TokenKind]) -> ObjectNode {
		let start = self.peek().map(|t| t.range.start).unwrap_or_default();
		let mut members = Vec::new();
		// Set right after a comma is consumed; cleared once a member (or a
		// further comma's placeholder) accounts for it.
		let mut pending_comma: Option<Token> = None;
		loop {
			match self.peek_kind() {
				None => {
					if let Some(comma) = pending_comma.take() {
						members.push(undefined_member(comma));
					}
					break;
				}
				Some(k) if stop.contains(&k) || Self::is_hard_stop(k) => {
					if let Some(comma) = pending_comma.take() {
						members.push(undefined_member(comma));
					}
					break;
				}
				Some(TokenKind::Comma) => {
					if let Some(comma) = pending_comma.take() {
						members.push(undefined_member(comma));
					}
					pending_comma = self.bump();
					continue;
				}
				_ => {}
			}
			pending_comma = None;
			let before = self.pos;
			members.push(self.parse_member());
			if self.pos == before {
				// Parser made no progress; force it to avoid an infinite loop.
				self.bump();
			}
			match self.peek_kind() {
				Some(TokenKind::Comma) => {
					pending_comma = self.bump();
				}
				Some(k) if stop.contains(&k) || Self::is_hard_stop(k) => break,
				None => break,
				_ => {
					// Missing comma between members: resynchronize. The
					// boundary always includes the hard stops too (enforced
					// again inside `synchronize` itself), so a malformed
					// member can't be recovered from by walking across the
					// next `~` item or `---` section.
					let mut boundary = stop.to_vec();
					boundary.push(TokenKind::Comma);
					self.synchronize(&boundary);
					if self.peek_kind() == Some(TokenKind::Comma) {
						pending_comma = self.bump();
					}
				}
			}
		}
		let end = members.last().map(|m: &MemberNode| m.range.end).unwrap_or(start);
		ObjectNode {
			members,
			range: PositionRange::new(start, end),
		}
	}

	fn parse_member(&mut self) -> MemberNode {
		let start = self.peek().map(|t| t.range.start).unwrap_or_default();
		let key = self.try_parse_key();
		let value = self.parse_value();
		let end = value.range();
		MemberNode {
			key,
			value: Box::new(value),
			range: PositionRange::new(start, end.end),
		}
	}

	/// A member key is any `ValidKey` token (string, number, boolean, or
	/// null — spec §4.2's grammar) immediately followed by `:`. Anything
	/// else means this member is a bare positional value.
	fn try_parse_key(&mut self) -> Option<String> {
		let is_key_token = matches!(
			self.peek().map(|t| t.kind),
			Some(TokenKind::OpenString)
				| Some(TokenKind::String)
				| Some(TokenKind::Number)
				| Some(TokenKind::Boolean)
				| Some(TokenKind::Null)
		);
		if !is_key_token {
			return None;
		}
		if self.tokens.get(self.pos + 1).map(|t| t.kind) != Some(TokenKind::Colon) {
			return None;
		}
		let key_tok = self.bump().unwrap();
		self.bump(); // `:`
		match key_tok.value {
			Some(crate::value::Value::String(s)) => Some(s),
			_ => Some(key_tok.text),
		}
	}

	fn parse_value(&mut self) -> Node {
		use crate::position::Spanned;
		if self.depth >= self.options.max_nesting_depth {
			let range = PositionRange::at(self.peek().map(|t| t.range.start).unwrap_or_default());
			return Node::Error(self.record_error(ErrorKind::InvalidCollection, range));
		}
		match self.peek_kind() {
			Some(TokenKind::CurlyOpen) => {
				self.depth += 1;
				let obj = self.parse_braced_object();
				self.depth -= 1;
				Node::Object(obj)
			}
			Some(TokenKind::BracketOpen) => {
				self.depth += 1;
				let arr = self.parse_array();
				self.depth -= 1;
				Node::Array(arr)
			}
			Some(k) if is_literal_kind(k) => {
				let tok = self.bump().unwrap();
				Node::Token(TokenNode { token: tok })
			}
			Some(TokenKind::Error) => {
				let tok = self.bump().unwrap();
				let range = tok.range;
				let kind = match tok.value {
					Some(crate::value::Value::Error(e)) => e.kind().clone(),
					_ => ErrorKind::UnexpectedToken {
						found: tok.text.clone(),
						expected: "a value".to_owned(),
					},
				};
				Node::Error(self.record_error(kind, range))
			}
			Some(_) => {
				let tok = self.bump().unwrap();
				let range = tok.range;
				Node::Error(self.record_error(
					ErrorKind::UnexpectedToken {
						found: tok.text,
						expected: "a value".to_owned(),
					},
					range,
				))
			}
			None => {
				let range = self.eof_range();
				Node::Error(self.record_error(
					ErrorKind::UnexpectedToken {
						found: String::new(),
						expected: "a value".to_owned(),
					},
					range,
				))
			}
		}
	}

	/// Arrays forbid empty elements (contrast with objects): a comma with no
	/// value before it — two commas back to back, a leading comma, or a
	/// trailing comma right before `]` — raises `unexpectedToken` rather than
	/// producing an `UNDEFINED` placeholder.
	fn parse_array(&mut self) -> ArrayNode {
		let start = self.peek().map(|t| t.range.start).unwrap_or_default();
		self.bump(); // `[`
		let mut items = Vec::new();
		let mut pending_comma: Option<Token> = None;
		loop {
			match self.peek_kind() {
				None | Some(TokenKind::BracketClose) => {
					if let Some(comma) = pending_comma.take() {
						items.push(Node::Error(self.record_error(
							ErrorKind::UnexpectedToken {
								found: self
									.peek()
									.map(|t| t.text.clone())
									.unwrap_or_else(|| "]".to_owned()),
								expected: "a value".to_owned(),
							},
							comma.range,
						)));
					}
					break;
				}
				// An unclosed `[` must not swallow the next collection item
				// or section separator; stop here and leave `]` unclosed
				// (recorded below).
				Some(k) if Self::is_hard_stop(k) => {
					pending_comma.take();
					break;
				}
				Some(TokenKind::Comma) => {
					if let Some(comma) = pending_comma.take() {
						items.push(Node::Error(self.record_error(
							ErrorKind::UnexpectedToken {
								found: ",".to_owned(),
								expected: "a value".to_owned(),
							},
							comma.range,
						)));
					}
					pending_comma = self.bump();
					continue;
				}
				_ => {}
			}
			pending_comma = None;
			let before = self.pos;
			items.push(self.parse_value());
			if self.pos == before {
				self.bump();
			}
			match self.peek_kind() {
				Some(TokenKind::Comma) => {
					pending_comma = self.bump();
				}
				Some(TokenKind::BracketClose) | None => {}
				Some(k) if Self::is_hard_stop(k) => {}
				_ => self.synchronize(&[TokenKind::Comma, TokenKind::BracketClose]),
			}
		}
		let end = if self.peek_kind() == Some(TokenKind::BracketClose) {
			self.bump().unwrap().range.end
		} else {
			self.record_error(
				ErrorKind::ExpectingBracket(']'),
				PositionRange::at(self.peek().map(|t| t.range.start).unwrap_or(self.eof_range().end)),
			);
			items.last().map(|n: &Node| { use crate::position::Spanned; n.range().end }).unwrap_or(start)
		};
		ArrayNode {
			items,
			range: PositionRange::new(start, end),
		}
	}

}

/// The value token cloned from a comma's position for a `Member` the comma
/// grammar implies but no literal occupies — a missing value between
/// consecutive commas, or a trailing comma right before a closing bracket.
fn undefined_member(comma: Token) -> MemberNode {
	let pos = comma.range.start;
	let range = PositionRange::at(pos);
	let value = TokenNode {
		token: Token::new(TokenKind::Undefined, range, "").with_value(crate::value::Value::Undefined),
	};
	MemberNode {
		key: None,
		value: Box::new(Node::Token(value)),
		range,
	}
}

/// Object disambiguation (spec §4.2): an open-object with exactly one
/// positional member whose value is itself an `ObjectNode` collapses to
/// that inner object — `{X}` in a positional slot becomes `X`.
fn finish_braceless(obj: ObjectNode) -> ObjectNode {
	if obj.members.len() == 1 {
		let member = &obj.members[0];
		if member.key.is_none() {
			if let Node::Object(inner) = member.value.as_ref() {
				return inner.clone();
			}
		}
	}
	obj
}

fn is_literal_kind(kind: TokenKind) -> bool {
	matches!(
		kind,
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

fn body_range(body: &SectionBody) -> PositionRange {
	match body {
		SectionBody::Object(o) => o.range,
		SectionBody::Collection(c) => c.range,
	}
}

trait MaxWith {
	fn max_with(self, other: Self) -> Self;
}

impl MaxWith for crate::position::Position {
	fn max_with(self, other: Self) -> Self {
		if self.offset >= other.offset {
			self
		} else {
			other
		}
	}
}

/// Parses the tokens that appeared on the same line as a `---` separator:
/// an optional bareword name, an optional `:`, and an optional `$schema`
/// reference, in either order the grammar allows (`name:$schema`, `$schema`,
/// `name`, or nothing).
fn parse_section_header_line(tokens: &[Token]) -> (Option<String>, Option<String>) {
	let mut name = None;
	let mut schema_name = None;
	for tok in tokens {
		if tok.kind != TokenKind::OpenString && tok.kind != TokenKind::String {
			continue;
		}
		let text = match &tok.value {
			Some(crate::value::Value::String(s)) => s.clone(),
			None => tok.text.clone(),
			_ => tok.text.clone(),
		};
		if let Some(stripped) = text.strip_prefix('$') {
			schema_name = Some(stripped.to_owned());
		} else {
			name = Some(text);
		}
	}
	(name, schema_name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenizer::{tokenize, TokenizerOptions};

	fn parse_src(src: &str) -> (DocumentNode, Vec<IoError>) {
		let tokens = tokenize(src, TokenizerOptions::default());
		parse(tokens, ParserOptions::default())
	}

	#[test]
	fn single_section_with_no_separator() {
		let (doc, errors) = parse_src("a: 1, b: 2");
		assert!(errors.is_empty());
		assert_eq!(doc.sections.len(), 1);
		assert!(doc.header.is_none());
	}

	#[test]
	fn header_and_one_named_section() {
		let (doc, errors) = parse_src("@x: 1\n--- people\na: 1");
		assert!(errors.is_empty(), "{errors:?}");
		assert!(doc.header.is_some());
		assert_eq!(doc.sections.len(), 1);
		assert_eq!(doc.sections[0].name.as_deref(), Some("people"));
	}

	#[test]
	fn section_with_schema_reference() {
		let (doc, errors) = parse_src("--- people:$person\na: 1");
		assert!(errors.is_empty(), "{errors:?}");
		assert_eq!(doc.sections[0].name.as_deref(), Some("people"));
		assert_eq!(doc.sections[0].schema_name.as_deref(), Some("person"));
	}

	#[test]
	fn duplicate_section_names_are_renamed_and_reported() {
		let (doc, errors) = parse_src("--- a\n1\n--- a\n2");
		assert_eq!(doc.sections[0].name.as_deref(), Some("a"));
		assert_eq!(doc.sections[1].name.as_deref(), Some("a_2"));
		assert_eq!(errors.len(), 1);
	}

	#[test]
	fn unbalanced_brace_recovers_with_an_error_instead_of_panicking() {
		let (_doc, errors) = parse_src("{a: 1");
		assert!(!errors.is_empty());
	}

	#[test]
	fn collection_section_parses_each_item() {
		let (doc, errors) = parse_src("--- items\n~ a: 1\n~ a: 2");
		assert!(errors.is_empty(), "{errors:?}");
		match &doc.sections[0].body {
			SectionBody::Collection(c) => assert_eq!(c.items.len(), 2),
			_ => panic!("expected a collection body"),
		}
	}
}
