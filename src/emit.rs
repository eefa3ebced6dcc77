// Shared machinery for the emitters: the Emitter trait every generator
// implements, the schema-to-Java type mapping, and deterministic file output.
// Emitters are plain strategies over the Model, not a class hierarchy.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ModelgenError, Result};
use crate::model::{FieldType, Model, Primitive};

/// First line of every generated file. Deliberately does not match the
/// retention marker, so the reconciler deletes generated output on the next
/// run while hand-marked files survive.
pub const GENERATED_HEADER: &str =
    "// Generated by modelgen. Do not edit: regenerated on every run.";

/// A generator of one kind of artifact. Consumes the model read-only and
/// writes one file per entity under the output root.
pub trait Emitter {
    /// Short name used in stage logging and error reporting.
    fn name(&self) -> &'static str;
    /// Write this emitter's artifact for every entity in the model,
    /// returning the paths written, in entity declaration order.
    fn emit(&self, model: &Model, out_root: &Path) -> Result<Vec<PathBuf>>;
}

/// Run a sequence of emitters against the same model. Fail-fast: the first
/// emitter error aborts, output already written stays on disk for the next
/// reconcile pass to clean up.
pub fn emit_all(
    model: &Model,
    out_root: &Path,
    emitters: &[&dyn Emitter],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for emitter in emitters {
        let files = emitter.emit(model, out_root)?;
        info!(target_kind = emitter.name(), files = files.len(), "emitted");
        written.extend(files);
    }
    Ok(written)
}

// ------------- Type mapping -------------

#[derive(Debug, Clone)]
struct JavaType {
    name: &'static str,
    import: Option<&'static str>,
}

/// Maps schema primitives to Java types, in two flavors: the plain form used
/// for required fields and the boxed form used for nullable fields and
/// container parameters.
#[derive(Debug, Clone)]
pub struct TypeMapping {
    plain: HashMap<Primitive, JavaType>,
    boxed: HashMap<Primitive, JavaType>,
}

impl Default for TypeMapping {
    fn default() -> Self {
        let mut plain = HashMap::new();
        let mut boxed = HashMap::new();
        let mut both = |p: Primitive, pl: &'static str, bx: &'static str, im: Option<&'static str>| {
            plain.insert(p, JavaType { name: pl, import: im });
            boxed.insert(p, JavaType { name: bx, import: im });
        };
        both(Primitive::Int, "int", "Integer", None);
        both(Primitive::Long, "long", "Long", None);
        both(Primitive::Float, "float", "Float", None);
        both(Primitive::Double, "double", "Double", None);
        both(Primitive::Bool, "boolean", "Boolean", None);
        both(Primitive::String, "String", "String", None);
        both(
            Primitive::DateTime,
            "ZonedDateTime",
            "ZonedDateTime",
            Some("java.time.ZonedDateTime"),
        );
        both(
            Primitive::Decimal,
            "BigDecimal",
            "BigDecimal",
            Some("java.math.BigDecimal"),
        );
        Self { plain, boxed }
    }
}

impl TypeMapping {
    /// Drop a primitive from the mapping. Any schema that still uses it then
    /// fails emission with an `UnsupportedType` error.
    pub fn remove(&mut self, primitive: Primitive) {
        self.plain.remove(&primitive);
        self.boxed.remove(&primitive);
    }

    /// Render a field type as Java source, collecting required imports.
    ///
    /// `boxed` selects the boxed primitive flavor; container parameters are
    /// always boxed. `current_namespace` suppresses self-imports for
    /// references within the same package.
    pub fn java_type(
        &self,
        ftype: &FieldType,
        boxed: bool,
        current_namespace: &str,
        imports: &mut BTreeSet<String>,
        context: &str,
    ) -> Result<String> {
        match ftype {
            FieldType::Primitive(p) => {
                let table = if boxed { &self.boxed } else { &self.plain };
                let java = table.get(p).ok_or_else(|| ModelgenError::UnsupportedType {
                    type_name: p.keyword().to_string(),
                    context: context.to_string(),
                })?;
                if let Some(import) = java.import {
                    imports.insert(import.to_string());
                }
                Ok(java.name.to_string())
            }
            FieldType::Reference { namespace, name } => {
                if !namespace.is_empty() && namespace != current_namespace {
                    imports.insert(format!("{namespace}.{name}"));
                }
                Ok(name.clone())
            }
            FieldType::List(inner) => {
                imports.insert("java.util.List".to_string());
                let inner = self.java_type(inner, true, current_namespace, imports, context)?;
                Ok(format!("List<{inner}>"))
            }
            FieldType::Set(inner) => {
                imports.insert("java.util.Set".to_string());
                let inner = self.java_type(inner, true, current_namespace, imports, context)?;
                Ok(format!("Set<{inner}>"))
            }
            FieldType::Map(key, value) => {
                imports.insert("java.util.Map".to_string());
                let key = self.java_type(key, true, current_namespace, imports, context)?;
                let value = self.java_type(value, true, current_namespace, imports, context)?;
                Ok(format!("Map<{key}, {value}>"))
            }
        }
    }
}

/// Is the Java rendering of this field a primitive (unboxed) type?
pub fn is_java_primitive(ftype: &FieldType, nullable: bool) -> bool {
    !nullable
        && matches!(
            ftype,
            FieldType::Primitive(
                Primitive::Int
                    | Primitive::Long
                    | Primitive::Float
                    | Primitive::Double
                    | Primitive::Bool
            )
        )
}

// ------------- Naming and paths -------------

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn getter_name(field: &str) -> String {
    format!("get{}", upper_first(field))
}

pub fn setter_name(field: &str) -> String {
    format!("set{}", upper_first(field))
}

/// Where an artifact for the given namespace lands: one directory per
/// namespace segment under the output root.
pub fn artifact_path(out_root: &Path, namespace: &str, file_name: &str) -> PathBuf {
    let mut path = out_root.to_path_buf();
    if !namespace.is_empty() {
        for segment in namespace.split('.') {
            path.push(segment);
        }
    }
    path.push(file_name);
    path
}

// ------------- Source assembly -------------

/// Tiny indent-aware line buffer for assembling generated source. Appending
/// is infallible, so emitters stay free of write-error plumbing.
#[derive(Debug, Default)]
pub struct SourceBuf {
    buf: String,
}

impl SourceBuf {
    pub fn new() -> Self {
        Self::default()
    }
    /// A buffer seeded with [`GENERATED_HEADER`], for assembling whole files.
    pub fn with_header() -> Self {
        let mut buf = String::new();
        buf.push_str(GENERATED_HEADER);
        buf.push('\n');
        Self { buf }
    }
    pub fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }
    pub fn push_raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }
    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Write a generated artifact, creating namespace directories as needed.
pub fn write_artifact(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ModelgenError::file_system(parent, e))?;
    }
    fs::write(path, body).map_err(|e| ModelgenError::file_system(path, e))
}

/// Standard preamble: header is already in the buffer, add package and
/// imports. Imports are sorted (BTreeSet) so output is byte-stable.
pub fn preamble(src: &mut SourceBuf, namespace: &str, imports: &BTreeSet<String>) {
    if !namespace.is_empty() {
        src.line(0, &format!("package {namespace};"));
    }
    if !imports.is_empty() {
        src.blank();
        for import in imports {
            src.line(0, &format!("import {import};"));
        }
    }
    src.blank();
}
