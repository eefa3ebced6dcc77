// Schema text goes in, a frozen Model comes out. Parsing is all-or-nothing:
// the first problem aborts with an error and no partial model escapes.
//
// Resolution is two-pass. Pass one builds the raw entity declarations and a
// symbol table of every declared entity, so mutually referencing entities and
// forward references need no special casing. Pass two resolves every field
// type against that table and applies identity blocks and auto-versioning.

use std::collections::{HashMap, HashSet};

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{ModelgenError, Result};
use crate::model::{Entity, Field, FieldType, Model, Primitive, Version, qualify};

#[derive(Parser)]
#[grammar = "schema.pest"]
struct SchemaParser;

/// Recognized parser configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// When set, an entity without an explicit `@x.y.z` tag gets the version
    /// `1.0.<n>`, where `<n>` is its declaration ordinal among the unversioned
    /// entities of its namespace. The assignment is derived from declared
    /// data only, so re-parsing the same source always yields the same tags.
    pub auto_version_namespace: bool,
}

struct RawType {
    name: String,
    args: Vec<RawType>,
    line: usize,
    col: usize,
}

struct RawField {
    name: String,
    ty: RawType,
    nullable: bool,
    identity: bool,
    line: usize,
    col: usize,
}

struct RawEntity {
    name: String,
    namespace: String,
    version: Option<Version>,
    fields: Vec<RawField>,
    identity_names: Vec<String>,
}

/// Parse schema source text into a validated, immutable [`Model`].
pub fn parse(source: &str, options: ParseOptions) -> Result<Model> {
    let mut pairs = SchemaParser::parse(Rule::schema, source).map_err(syntax_error)?;
    // the grammar guarantees exactly one `schema` pair on success
    let schema = pairs.next().expect("schema rule");

    // pass one: collect declarations
    let mut namespace = String::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut raws: Vec<RawEntity> = Vec::new();
    for stmt in schema.into_inner() {
        match stmt.as_rule() {
            Rule::namespace_decl => {
                for p in stmt.into_inner() {
                    if p.as_rule() == Rule::dotted {
                        namespace = p.as_str().to_string();
                    }
                }
            }
            Rule::entity_decl => {
                let raw = parse_entity(stmt, &namespace)?;
                if !seen.insert((raw.namespace.clone(), raw.name.clone())) {
                    return Err(ModelgenError::DuplicateEntity {
                        namespace: raw.namespace,
                        name: raw.name,
                    });
                }
                raws.push(raw);
            }
            Rule::EOI => {}
            _ => {}
        }
    }

    // symbol table for reference resolution, forward declarations included
    let mut symbols: HashMap<String, Vec<String>> = HashMap::new();
    for raw in &raws {
        symbols
            .entry(raw.name.clone())
            .or_default()
            .push(raw.namespace.clone());
    }

    if options.auto_version_namespace {
        let mut ordinals: HashMap<String, u32> = HashMap::new();
        for raw in &mut raws {
            if raw.version.is_none() {
                let n = ordinals.entry(raw.namespace.clone()).or_insert(0);
                *n += 1;
                raw.version = Some(Version::new(1, 0, *n));
            }
        }
    }

    // pass two: validate identity subsets, resolve types, freeze
    let mut entities = Vec::with_capacity(raws.len());
    for raw in &raws {
        for id_name in &raw.identity_names {
            if !raw.fields.iter().any(|f| &f.name == id_name) {
                return Err(ModelgenError::InvalidIdentityField {
                    entity: qualify(&raw.namespace, &raw.name),
                    field: id_name.clone(),
                });
            }
        }
        let mut fields = Vec::with_capacity(raw.fields.len());
        for rf in &raw.fields {
            let ftype = resolve_type(&rf.ty, raw, rf, &symbols)?;
            let identity = rf.identity || raw.identity_names.iter().any(|n| n == &rf.name);
            fields.push(Field::new(rf.name.clone(), ftype, rf.nullable, identity));
        }
        entities.push(Entity::new(
            raw.name.clone(),
            raw.namespace.clone(),
            raw.version,
            fields,
        ));
    }
    Model::new(entities)
}

fn parse_entity(pair: Pair<Rule>, namespace: &str) -> Result<RawEntity> {
    let mut name = String::new();
    let mut version = None;
    let mut fields: Vec<RawField> = Vec::new();
    let mut identity_names: Vec<String> = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ident => name = p.as_str().to_string(),
            Rule::version_tag => version = Some(parse_version(p)?),
            Rule::field => {
                let f = parse_field(p);
                if fields.iter().any(|x| x.name == f.name) {
                    return Err(ModelgenError::Syntax {
                        message: format!("duplicate field '{}' in entity '{}'", f.name, name),
                        line: f.line,
                        col: f.col,
                    });
                }
                fields.push(f);
            }
            Rule::identity_decl => {
                for id in p.into_inner() {
                    if id.as_rule() == Rule::ident {
                        identity_names.push(id.as_str().to_string());
                    }
                }
            }
            _ => {}
        }
    }
    Ok(RawEntity {
        name,
        namespace: namespace.to_string(),
        version,
        fields,
        identity_names,
    })
}

fn parse_field(pair: Pair<Rule>) -> RawField {
    let (line, col) = pair.as_span().start_pos().line_col();
    let mut inner = pair.into_inner();
    // the grammar fixes the order: ident, field_type, then markers
    let name = inner.next().expect("field name").as_str().to_string();
    let ty = parse_type(inner.next().expect("field type"));
    let mut nullable = false;
    let mut identity = false;
    for p in inner {
        match p.as_rule() {
            Rule::nullable => nullable = true,
            Rule::identity_flag => identity = true,
            _ => {}
        }
    }
    RawField {
        name,
        ty,
        nullable,
        identity,
        line,
        col,
    }
}

fn parse_type(pair: Pair<Rule>) -> RawType {
    let (line, col) = pair.as_span().start_pos().line_col();
    let mut name = String::new();
    let mut args = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::type_name => name = p.as_str().to_string(),
            Rule::type_args => args.extend(p.into_inner().map(parse_type)),
            _ => {}
        }
    }
    RawType {
        name,
        args,
        line,
        col,
    }
}

fn parse_version(pair: Pair<Rule>) -> Result<Version> {
    let (line, col) = pair.as_span().start_pos().line_col();
    let semver = pair.into_inner().next().expect("semver").as_str().to_string();
    let mut parts = semver.split('.').map(|p| {
        p.parse::<u32>().map_err(|_| ModelgenError::Syntax {
            message: format!("version component out of range in '{semver}'"),
            line,
            col,
        })
    });
    // the grammar guarantees three dot-separated digit runs
    let major = parts.next().expect("major")?;
    let minor = parts.next().expect("minor")?;
    let patch = parts.next().expect("patch")?;
    Ok(Version::new(major, minor, patch))
}

fn resolve_type(
    raw: &RawType,
    entity: &RawEntity,
    field: &RawField,
    symbols: &HashMap<String, Vec<String>>,
) -> Result<FieldType> {
    let arity_error = |expected: usize| ModelgenError::Syntax {
        message: format!(
            "type '{}' takes {} type parameter(s), found {}",
            raw.name,
            expected,
            raw.args.len()
        ),
        line: raw.line,
        col: raw.col,
    };
    if let Some(p) = Primitive::lookup(&raw.name) {
        if !raw.args.is_empty() {
            return Err(arity_error(0));
        }
        return Ok(FieldType::Primitive(p));
    }
    match raw.name.as_str() {
        "list" | "set" => {
            if raw.args.len() != 1 {
                return Err(arity_error(1));
            }
            let inner = Box::new(resolve_type(&raw.args[0], entity, field, symbols)?);
            if raw.name == "list" {
                Ok(FieldType::List(inner))
            } else {
                Ok(FieldType::Set(inner))
            }
        }
        "map" => {
            if raw.args.len() != 2 {
                return Err(arity_error(2));
            }
            let key = Box::new(resolve_type(&raw.args[0], entity, field, symbols)?);
            let value = Box::new(resolve_type(&raw.args[1], entity, field, symbols)?);
            Ok(FieldType::Map(key, value))
        }
        _ => {
            if !raw.args.is_empty() {
                return Err(arity_error(0));
            }
            let context = format!(
                "field '{}' of entity '{}'",
                field.name,
                qualify(&entity.namespace, &entity.name)
            );
            let unresolved = |context: String| ModelgenError::UnresolvedReference {
                reference: raw.name.clone(),
                context,
            };
            let declared = symbols.get(&raw.name).ok_or_else(|| unresolved(context.clone()))?;
            // same-namespace declarations win; otherwise the name must be
            // unique across the whole model
            let namespace = if declared.iter().any(|ns| ns == &entity.namespace) {
                entity.namespace.clone()
            } else if declared.len() == 1 {
                declared[0].clone()
            } else {
                return Err(unresolved(format!("ambiguous across namespaces, {context}")));
            };
            Ok(FieldType::Reference {
                namespace,
                name: raw.name.clone(),
            })
        }
    }
}

fn syntax_error(e: pest::error::Error<Rule>) -> ModelgenError {
    let (line, col) = match e.line_col {
        LineColLocation::Pos((l, c)) => (l, c),
        LineColLocation::Span((l, c), _) => (l, c),
    };
    ModelgenError::Syntax {
        message: e.variant.message().into_owned(),
        line,
        col,
    }
}
