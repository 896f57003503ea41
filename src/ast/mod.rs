//! C3 — the parse tree produced by C4, shared by the stringifier and the
//! schema processor.
//!
//! A tagged `Node` enum rather than a trait-object tree, the same shape as
//! the teacher's tagged `SchemaNode`/`RegularType` enum: one type, matched on
//! by kind, instead of a family of dynamically-dispatched node types. Every
//! variant knows its own source span and how to lower itself to a
//! [`crate::value::Value`] (see `to_value`).

mod to_value;

use crate::error::Error as IoError;
use crate::position::{PositionRange, Spanned};
use crate::token::Token;

/// Any node produced by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
	Document(DocumentNode),
	Section(SectionNode),
	Object(ObjectNode),
	Member(MemberNode),
	Array(ArrayNode),
	Collection(CollectionNode),
	Token(TokenNode),
	Error(ErrorNode),
}

impl Spanned for Node {
	fn range(&self) -> PositionRange {
		match self {
			Node::Document(n) => n.range,
			Node::Section(n) => n.range,
			Node::Object(n) => n.range,
			Node::Member(n) => n.range,
			Node::Array(n) => n.range,
			Node::Collection(n) => n.range,
			Node::Token(n) => n.token.range,
			Node::Error(n) => n.range,
		}
	}
}

impl Node {
	pub fn as_object(&self) -> Option<&ObjectNode> {
		match self {
			Node::Object(o) => Some(o),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&ArrayNode> {
		match self {
			Node::Array(a) => Some(a),
			_ => None,
		}
	}

	pub fn as_token(&self) -> Option<&Token> {
		match self {
			Node::Token(t) => Some(&t.token),
			_ => None,
		}
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Node::Error(_))
	}
}

/// The root node: an optional header and an ordered list of sections.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentNode {
	/// Either a `~`-prefixed collection of single-member definitions
	/// (`~ key: value` lines) or, as sugar, a single braceless object that
	/// *is* the default schema (spec §4.3's C5 note).
	pub header: Option<SectionBody>,
	pub sections: Vec<SectionNode>,
	pub range: PositionRange,
}

/// What a section's body holds: a single object, or a collection of them.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionBody {
	Object(ObjectNode),
	Collection(CollectionNode),
}

/// One `--- name:$schema` ... body block.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionNode {
	/// The name given in the separator line, after duplicate-renaming has
	/// been applied by the parser.
	pub name: Option<String>,
	/// The `$schema` name referenced in the separator line, if any.
	pub schema_name: Option<String>,
	pub body: SectionBody,
	pub range: PositionRange,
}

/// A brace-delimited (or positional, braceless) set of members.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectNode {
	pub members: Vec<MemberNode>,
	pub range: PositionRange,
}

impl ObjectNode {
	pub fn get(&self, key: &str) -> Option<&MemberNode> {
		self.members.iter().find(|m| m.key.as_deref() == Some(key))
	}
}

/// A single `key: value` pair, or a bare positional value (`key` is `None`).
#[derive(Clone, Debug, PartialEq)]
pub struct MemberNode {
	pub key: Option<String>,
	pub value: Box<Node>,
	pub range: PositionRange,
}

/// A bracket-delimited ordered list of values.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayNode {
	pub items: Vec<Node>,
	pub range: PositionRange,
}

/// A `~`-prefixed sequence of objects forming a section's repeated body.
///
/// Each item is either a successfully parsed [`ObjectNode`] or an
/// [`ErrorNode`] standing in for one that could not be recovered past the
/// collection-level recovery tier (spec §3: "`CollectionNode` children are
/// exclusively Objects or ErrorNodes, never raw scalars").
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionNode {
	pub items: Vec<CollectionItem>,
	pub range: PositionRange,
}

/// One item of a [`CollectionNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionItem {
	Object(ObjectNode),
	Error(ErrorNode),
}

impl CollectionItem {
	pub fn as_object(&self) -> Option<&ObjectNode> {
		match self {
			CollectionItem::Object(o) => Some(o),
			CollectionItem::Error(_) => None,
		}
	}

	pub fn is_error(&self) -> bool {
		matches!(self, CollectionItem::Error(_))
	}
}

impl Spanned for CollectionItem {
	fn range(&self) -> PositionRange {
		match self {
			CollectionItem::Object(o) => o.range,
			CollectionItem::Error(e) => e.range,
		}
	}
}

/// A leaf literal, wrapping the token the tokenizer already decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenNode {
	pub token: Token,
}

/// A recovered parse error occupying a value or member position, so the rest
/// of the tree stays walkable.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorNode {
	pub error: IoError,
	pub range: PositionRange,
}
