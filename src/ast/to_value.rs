//! Lowers a parsed [`super::Node`] tree to a [`crate::value::Value`] tree,
//! independent of any schema. This is the "raw" decode a caller gets without
//! supplying a schema to validate against.

use super::{ArrayNode, CollectionItem, CollectionNode, MemberNode, Node, ObjectNode};
use crate::value::{Record, Value};

impl Node {
	pub fn to_value(&self) -> Value {
		match self {
			Node::Document(doc) => {
				let mut record = Record::new();
				for section in &doc.sections {
					if let Some(name) = &section.name {
						record.insert(name.clone(), section.to_value());
					}
				}
				Value::Object(record)
			}
			Node::Section(section) => section.to_value(),
			Node::Object(o) => o.to_value(),
			Node::Member(m) => m.to_value(),
			Node::Array(a) => a.to_value(),
			Node::Collection(c) => c.to_value(),
			Node::Token(t) => t.token.value.clone().unwrap_or(Value::Undefined),
			Node::Error(e) => Value::Error(Box::new(e.error.clone())),
		}
	}
}

impl super::SectionNode {
	pub fn to_value(&self) -> Value {
		match &self.body {
			super::SectionBody::Object(o) => o.to_value(),
			super::SectionBody::Collection(c) => c.to_value(),
		}
	}
}

impl ObjectNode {
	pub fn to_value(&self) -> Value {
		let mut record = Record::new();
		for (index, member) in self.members.iter().enumerate() {
			let key = member.key.clone().unwrap_or_else(|| index.to_string());
			record.insert(key, member.value.to_value());
		}
		Value::Object(record)
	}
}

impl MemberNode {
	pub fn to_value(&self) -> Value {
		self.value.to_value()
	}
}

impl ArrayNode {
	pub fn to_value(&self) -> Value {
		Value::Array(self.items.iter().map(Node::to_value).collect())
	}
}

impl CollectionNode {
	pub fn to_value(&self) -> Value {
		Value::Array(self.items.iter().map(CollectionItem::to_value).collect())
	}
}

impl CollectionItem {
	pub fn to_value(&self) -> Value {
		match self {
			CollectionItem::Object(o) => o.to_value(),
			CollectionItem::Error(e) => Value::Error(Box::new(e.error.clone())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::position::PositionRange;
	use crate::token::{Token, TokenKind};
	use crate::ast::TokenNode;

	fn tok_node(value: Value) -> Node {
		let range = PositionRange::default();
		let mut token = Token::new(TokenKind::Number, range, "1");
		token.value = Some(value);
		Node::Token(TokenNode { token })
	}

	#[test]
	fn object_to_value_uses_positional_index_when_key_missing() {
		let range = PositionRange::default();
		let obj = ObjectNode {
			members: vec![MemberNode {
				key: None,
				value: Box::new(tok_node(Value::Number(42.0))),
				range,
			}],
			range,
		};
		let value = obj.to_value();
		let record = value.as_object().unwrap();
		assert_eq!(record.get("0"), Some(&Value::Number(42.0)));
	}

	#[test]
	fn collection_to_value_is_an_array_of_objects() {
		let range = PositionRange::default();
		let item = ObjectNode { members: vec![], range };
		let collection = CollectionNode {
			items: vec![
				CollectionItem::Object(item.clone()),
				CollectionItem::Object(item),
			],
			range,
		};
		assert_eq!(collection.to_value().as_array().unwrap().len(), 2);
	}

	#[test]
	fn collection_error_item_lowers_to_an_error_value() {
		use crate::error::{Error as IoError, ErrorKind};
		let range = PositionRange::default();
		let error_item = CollectionItem::Error(crate::ast::ErrorNode {
			error: IoError::new(ErrorKind::ExpectingBracket('}'), range),
			range,
		});
		let collection = CollectionNode {
			items: vec![error_item],
			range,
		};
		let array = collection.to_value();
		assert!(matches!(array.as_array().unwrap()[0], Value::Error(_)));
	}
}
