// The in-memory DOM for a parsed schema. Everything here is constructed once
// by the parser and read-only afterwards: the emitters only traverse.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::{ModelgenError, Result};

// ------------- Version -------------

/// Semantic version tag attached to an entity, either declared in the schema
/// or synthesized when automatic versioning is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
    pub fn major(&self) -> u32 {
        self.major
    }
    pub fn minor(&self) -> u32 {
        self.minor
    }
    pub fn patch(&self) -> u32 {
        self.patch
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ------------- Types -------------

/// The primitives the schema language recognizes. Anything else in type
/// position has to resolve to a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Primitive {
    Int,
    Long,
    Float,
    Double,
    Bool,
    String,
    DateTime,
    Decimal,
}

impl Primitive {
    /// The spelling used in schema source.
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::DateTime => "datetime",
            Primitive::Decimal => "decimal",
        }
    }

    pub fn lookup(keyword: &str) -> Option<Primitive> {
        match keyword {
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            "bool" => Some(Primitive::Bool),
            "string" => Some(Primitive::String),
            "datetime" => Some(Primitive::DateTime),
            "decimal" => Some(Primitive::Decimal),
            _ => None,
        }
    }

}

/// A resolved field type. References carry the qualified name of the entity
/// they point at, so an emitter never needs the parser's symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    Primitive(Primitive),
    Reference { namespace: String, name: String },
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => write!(f, "{}", p.keyword()),
            FieldType::Reference { namespace, name } => {
                if namespace.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{namespace}.{name}")
                }
            }
            FieldType::List(t) => write!(f, "list<{t}>"),
            FieldType::Set(t) => write!(f, "set<{t}>"),
            FieldType::Map(k, v) => write!(f, "map<{k}, {v}>"),
        }
    }
}

// ------------- Field -------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    field_type: FieldType,
    nullable: bool,
    identity: bool,
}

impl Field {
    pub fn new(name: String, field_type: FieldType, nullable: bool, identity: bool) -> Self {
        Self {
            name,
            field_type,
            nullable,
            identity,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
    pub fn nullable(&self) -> bool {
        self.nullable
    }
    pub fn identity(&self) -> bool {
        self.identity
    }
}

// ------------- Entity -------------

/// A named record declaration: an ordered field list plus an optional subset
/// of fields that make up the entity's logical identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    name: String,
    namespace: String,
    version: Option<Version>,
    fields: Vec<Field>,
}

impl Entity {
    pub fn new(
        name: String,
        namespace: String,
        version: Option<Version>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name,
            namespace,
            version,
            fields,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
    pub fn version(&self) -> Option<Version> {
        self.version
    }
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
    pub fn identity_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.identity())
    }
    pub fn has_identity(&self) -> bool {
        self.fields.iter().any(|f| f.identity())
    }
    /// Namespace-qualified name, the key the model is indexed by.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

// ------------- Model -------------

/// Root container of a parse: an ordered sequence of entities with a lookup
/// index by qualified name. Entity names are unique within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    entities: Vec<Entity>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Model {
    /// Freeze a sequence of entities into a model, enforcing the uniqueness
    /// invariant. The parser is the intended caller; declaration order is
    /// preserved so the output of every emitter stays deterministic.
    pub fn new(entities: Vec<Entity>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entities.len());
        for (i, entity) in entities.iter().enumerate() {
            if index.insert(entity.qualified_name(), i).is_some() {
                return Err(ModelgenError::DuplicateEntity {
                    namespace: entity.namespace().to_string(),
                    name: entity.name().to_string(),
                });
            }
        }
        Ok(Self { entities, index })
    }

    /// All entities in declaration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up an entity by qualified name (`namespace.Name`, or the bare
    /// name for the root namespace).
    pub fn entity_by_name(&self, qualified: &str) -> Result<&Entity> {
        self.index
            .get(qualified)
            .map(|i| &self.entities[*i])
            .ok_or_else(|| ModelgenError::UnresolvedReference {
                reference: qualified.to_string(),
                context: "model lookup".to_string(),
            })
    }

    /// Distinct namespaces, sorted.
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.entities.iter().map(|e| e.namespace()).collect()
    }
}
