// POJO emitter tests, asserting over the generated Java text.

use std::fs;

use modelgen::emit::{Emitter, GENERATED_HEADER, TypeMapping};
use modelgen::model::Primitive;
use modelgen::parse::{ParseOptions, parse};
use modelgen::pojo::PojoEmitter;

const SCHEMA: &str = r#"
namespace com.example.crm

entity Person @1.2.0 {
    id: long [identity],
    name: string,
    nickname: string?,
    home: Address,
    tags: list<string>,
    scores: map<string, double>
}

entity Address {
    street: string [identity],
    city: string [identity]
}
"#;

fn generate(schema: &str) -> (tempfile::TempDir, Vec<std::path::PathBuf>) {
    let model = parse(schema, ParseOptions::default()).expect("schema parses");
    let out = tempfile::tempdir().expect("tempdir");
    let written = PojoEmitter::default()
        .emit(&model, out.path())
        .expect("pojo emission");
    (out, written)
}

#[test]
fn one_file_per_entity_under_namespace_directories() {
    let (out, written) = generate(SCHEMA);
    assert_eq!(written.len(), 2);
    assert!(out.path().join("com/example/crm/Person.java").is_file());
    assert!(out.path().join("com/example/crm/Address.java").is_file());
}

#[test]
fn person_class_has_fields_constructors_and_accessors() {
    let (out, _) = generate(SCHEMA);
    let body = fs::read_to_string(out.path().join("com/example/crm/Person.java")).expect("read");

    assert!(body.starts_with(GENERATED_HEADER));
    assert!(body.contains("package com.example.crm;"));
    assert!(body.contains("/** Schema entity Person, version 1.2.0. */"));
    assert!(body.contains("public class Person {"));

    // required primitive stays plain, nullable is boxed
    assert!(body.contains("private long id;"));
    assert!(body.contains("private String nickname;"));
    assert!(body.contains("private List<String> tags;"));
    assert!(body.contains("private Map<String, Double> scores;"));
    assert!(body.contains("import java.util.List;"));
    assert!(body.contains("import java.util.Map;"));

    // no-args constructor plus the all-fields one, declaration order
    assert!(body.contains("public Person() {}"));
    assert!(body.contains(
        "public Person(final long id, final String name, final String nickname, \
         final Address home, final List<String> tags, final Map<String, Double> scores) {"
    ));

    // one accessor pair per field
    assert!(body.contains("public long getId() { return id; }"));
    assert!(body.contains("public void setId(final long id) { this.id = id; }"));
    assert!(body.contains("public Address getHome() { return home; }"));
    assert!(body.contains("public void setHome(final Address home) { this.home = home; }"));
}

#[test]
fn generated_header_is_the_first_line_exactly_once() {
    let (_out, written) = generate(SCHEMA);
    for path in &written {
        let body = fs::read_to_string(path).expect("read");
        assert!(body.starts_with(GENERATED_HEADER), "{}", path.display());
        assert_eq!(body.matches(GENERATED_HEADER).count(), 1, "{}", path.display());
    }
}

#[test]
fn same_package_reference_needs_no_import() {
    let (out, _) = generate(SCHEMA);
    let body = fs::read_to_string(out.path().join("com/example/crm/Person.java")).expect("read");
    assert!(!body.contains("import com.example.crm.Address;"));
}

#[test]
fn cross_namespace_reference_is_imported() {
    let schema = r#"
namespace geo
entity Address { street: string [identity] }
namespace crm
entity Person { id: long [identity], home: Address }
"#;
    let (out, _) = generate(schema);
    let body = fs::read_to_string(out.path().join("crm/Person.java")).expect("read");
    assert!(body.contains("import geo.Address;"));
    assert!(body.contains("private Address home;"));
}

#[test]
fn nullable_primitive_is_boxed() {
    let schema = "entity Sample { count: int?, flag: bool? }";
    let (out, _) = generate(schema);
    let body = fs::read_to_string(out.path().join("Sample.java")).expect("read");
    assert!(body.contains("private Integer count;"));
    assert!(body.contains("private Boolean flag;"));
}

#[test]
fn datetime_and_decimal_pull_their_imports() {
    let schema = "entity Stamped { at: datetime, amount: decimal }";
    let (out, _) = generate(schema);
    let body = fs::read_to_string(out.path().join("Stamped.java")).expect("read");
    assert!(body.contains("import java.time.ZonedDateTime;"));
    assert!(body.contains("import java.math.BigDecimal;"));
    assert!(body.contains("private ZonedDateTime at;"));
    assert!(body.contains("private BigDecimal amount;"));
}

#[test]
fn emission_is_byte_stable() {
    let (out1, _) = generate(SCHEMA);
    let (out2, _) = generate(SCHEMA);
    let one = fs::read_to_string(out1.path().join("com/example/crm/Person.java")).expect("read");
    let two = fs::read_to_string(out2.path().join("com/example/crm/Person.java")).expect("read");
    assert_eq!(one, two);
}

#[test]
fn removed_primitive_mapping_fails_emission() {
    let model = parse("entity Stamped { at: datetime }", ParseOptions::default()).expect("parses");
    let mut mapping = TypeMapping::default();
    mapping.remove(Primitive::DateTime);
    let out = tempfile::tempdir().expect("tempdir");
    let err = PojoEmitter::new(mapping)
        .emit(&model, out.path())
        .expect_err("datetime has no mapping");
    let message = err.to_string();
    assert!(message.contains("datetime"), "{message}");
    assert!(message.contains("Stamped"), "{message}");
}
