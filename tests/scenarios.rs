//! The concrete scenarios from spec §8 ("concrete scenarios"), run end to
//! end through the public API.

use internet_object::document::SectionValue;
use internet_object::{load_document, stringify_document, StringifyOptions, Value};

#[test]
fn s1_simple_schema_and_data() {
	let doc = load_document("name, age, gender\n---\nSpiderman, 25, Male");
	assert!(doc.errors.is_empty());
	assert_eq!(doc.sections.len(), 1);

	assert!(doc.definitions.default_schema().is_some());

	let schema = doc.sections[0].schema.as_ref().expect("section resolved the default schema");
	assert_eq!(schema.member_order().collect::<Vec<_>>(), vec!["name", "age", "gender"]);
	for name in ["name", "age", "gender"] {
		assert_eq!(schema.member(name).unwrap().type_name, "any");
	}

	let SectionValue::Object(record) = &doc.sections[0].body else {
		panic!("expected an object section body");
	};
	assert_eq!(record.get("name"), Some(&Value::String("Spiderman".to_owned())));
	assert_eq!(record.get("age"), Some(&Value::Number(25.0)));
	assert_eq!(record.get("gender"), Some(&Value::String("Male".to_owned())));
}

#[test]
fn s2_header_variables_and_schema() {
	let source = "~ r: red\n~ g: green\n~ $schema: { name, color }\n---\n~ Spiderman, $r\n~ Ironman,   $g\n";
	let doc = load_document(source);
	assert!(doc.errors.is_empty(), "unexpected errors: {:?}", doc.errors);
	assert_eq!(doc.sections.len(), 1);

	let SectionValue::Collection(items) = &doc.sections[0].body else {
		panic!("expected a collection section body");
	};
	assert_eq!(items.len(), 2);

	let Value::Object(spiderman) = &items[0] else {
		panic!("expected a validated record")
	};
	assert_eq!(spiderman.get("name"), Some(&Value::String("Spiderman".to_owned())));
	assert_eq!(spiderman.get("color"), Some(&Value::String("red".to_owned())));

	let Value::Object(ironman) = &items[1] else {
		panic!("expected a validated record")
	};
	assert_eq!(ironman.get("name"), Some(&Value::String("Ironman".to_owned())));
	assert_eq!(ironman.get("color"), Some(&Value::String("green".to_owned())));
}

#[test]
fn s3_optional_and_nullable_members() {
	let doc = load_document("name, age?, bio?*: string\n---\nAlice, 28, null");
	assert!(doc.errors.is_empty(), "unexpected errors: {:?}", doc.errors);
	let SectionValue::Object(record) = &doc.sections[0].body else {
		panic!("expected an object section body");
	};
	assert_eq!(record.get("name"), Some(&Value::String("Alice".to_owned())));
	assert_eq!(record.get("age"), Some(&Value::Number(28.0)));
	assert_eq!(record.get("bio"), Some(&Value::Null));

	let doc = load_document("name, age?, bio?*: string\n---\nAlice");
	assert!(doc.errors.is_empty(), "unexpected errors: {:?}", doc.errors);
	let SectionValue::Object(record) = &doc.sections[0].body else {
		panic!("expected an object section body");
	};
	assert_eq!(record.get("name"), Some(&Value::String("Alice".to_owned())));
	assert_eq!(record.get("age"), Some(&Value::Undefined));
	assert_eq!(record.get("bio"), Some(&Value::Undefined));
}

#[test]
fn s4_collection_with_recoverable_error() {
	let source = "~ name: string, age: int\n---\n~ Alice, 28\n~ Bob, {unclosed\n~ Carol, 30\n";
	let doc = load_document(source);

	assert_eq!(doc.errors.len(), 1);
	let error = &doc.errors[0];
	assert_eq!(error.category(), internet_object::Category::Syntax);
	assert_eq!(error.kind().code(), "expecting-bracket");

	let SectionValue::Collection(items) = &doc.sections[0].body else {
		panic!("expected a collection section body");
	};
	assert_eq!(items.len(), 3);

	let Value::Object(alice) = &items[0] else {
		panic!("expected a validated record")
	};
	assert_eq!(alice.get("name"), Some(&Value::String("Alice".to_owned())));
	assert_eq!(alice.get("age"), Some(&Value::Number(28.0)));

	assert!(matches!(&items[1], Value::Error(_)), "item 1 should be an error placeholder");

	let Value::Object(carol) = &items[2] else {
		panic!("expected a validated record")
	};
	assert_eq!(carol.get("name"), Some(&Value::String("Carol".to_owned())));
	assert_eq!(carol.get("age"), Some(&Value::Number(30.0)));
}

#[test]
fn s5_validation_error_with_collector() {
	let source = "age: {int, min:18}\n---\n~ 20\n~ 10\n";
	let doc = load_document(source);

	let SectionValue::Collection(items) = &doc.sections[0].body else {
		panic!("expected a collection section body");
	};
	assert_eq!(items.len(), 2);

	let Value::Object(first) = &items[0] else {
		panic!("expected a validated record")
	};
	assert_eq!(first.get("age"), Some(&Value::Number(20.0)));

	let Value::Object(second) = &items[1] else {
		panic!("expected a validated record even with a collected error")
	};
	assert!(matches!(second.get("age"), Some(Value::Error(_))));

	assert_eq!(doc.errors.len(), 1);
	let error = &doc.errors[0];
	assert_eq!(error.kind().code(), "invalid-min-value");
	assert_eq!(error.collection_index(), Some(1));
}

#[test]
fn s6_round_trip_reparse_matches_original_document() {
	let source = "name: string, n: int\n---\nAlice, 42\nBob, 7";
	let doc = load_document(source);
	let text = stringify_document(&doc, &StringifyOptions::default());
	let reparsed = load_document(&text);
	assert_eq!(reparsed, doc);
}
