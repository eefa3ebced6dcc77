// Emits one JSON adapter per entity: a static streaming `write` and `read`
// pair over the Jackson core API. Wire names are the schema field names,
// nullable fields are omitted when null, and nested entities delegate to the
// referenced entity's own generated adapter. The format parameter is an open
// set so another binding style can be added without touching the model or
// the other emitters.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::emit::{
    Emitter, SourceBuf, TypeMapping, artifact_path, getter_name, is_java_primitive, preamble,
    setter_name, write_artifact,
};
use crate::error::{ModelgenError, Result};
use crate::model::{Entity, Field, FieldType, Model, Primitive};

/// Supported serialization bindings.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerFormat {
    /// Jackson streaming API (`com.fasterxml.jackson.core`).
    #[default]
    Jackson,
}

#[derive(Debug, Default)]
pub struct JsonableEmitter {
    format: SerFormat,
    mapping: TypeMapping,
}

impl JsonableEmitter {
    pub fn new(format: SerFormat) -> Self {
        Self {
            format,
            mapping: TypeMapping::default(),
        }
    }

    fn render(&self, entity: &Entity) -> Result<String> {
        match self.format {
            SerFormat::Jackson => self.render_jackson(entity),
        }
    }

    fn render_jackson(&self, entity: &Entity) -> Result<String> {
        let pojo = entity.name();
        let class = format!("{pojo}Json");
        let mut imports: BTreeSet<String> = [
            "com.fasterxml.jackson.core.JsonGenerator",
            "com.fasterxml.jackson.core.JsonParser",
            "com.fasterxml.jackson.core.JsonToken",
            "java.io.IOException",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mut body = SourceBuf::new();

        // write(): object envelope plus one directive per field
        body.line(
            1,
            &format!("public static void write(final JsonGenerator out, final {pojo} v) throws IOException {{"),
        );
        body.line(2, "out.writeStartObject();");
        for field in entity.fields() {
            self.write_field(&mut body, entity, field, &mut imports)?;
        }
        body.line(2, "out.writeEndObject();");
        body.line(1, "}");
        body.blank();

        // read(): token loop with a case per field, unknown fields skipped
        body.line(
            1,
            &format!("public static {pojo} read(final JsonParser in) throws IOException {{"),
        );
        body.line(2, &format!("final {pojo} v = new {pojo}();"));
        body.line(2, "if (in.currentToken() != JsonToken.START_OBJECT) {");
        body.line(3, "in.nextToken();");
        body.line(2, "}");
        body.line(2, "while (in.nextToken() != JsonToken.END_OBJECT) {");
        body.line(3, "final String field = in.currentName();");
        body.line(3, "in.nextToken();");
        body.line(3, "switch (field) {");
        for field in entity.fields() {
            self.read_field(&mut body, entity, field, &mut imports)?;
        }
        body.line(4, "default:");
        body.line(5, "in.skipChildren();");
        body.line(5, "break;");
        body.line(3, "}");
        body.line(2, "}");
        body.line(2, "return v;");
        body.line(1, "}");

        let mut src = SourceBuf::with_header();
        preamble(&mut src, entity.namespace(), &imports);
        src.line(0, &format!("/** JSON adapter for {pojo}. */"));
        src.line(0, &format!("public final class {class} {{"));
        src.blank();
        if let Some(version) = entity.version() {
            src.line(1, "/** Schema version of the entity this adapter was generated from. */");
            src.line(1, &format!("public static final String VERSION = \"{version}\";"));
            src.blank();
        }
        src.line(1, &format!("private {class}() {{}}"));
        src.blank();
        src.push_raw(&body.into_string());
        src.line(0, "}");
        Ok(src.into_string())
    }

    fn write_field(
        &self,
        src: &mut SourceBuf,
        entity: &Entity,
        field: &Field,
        imports: &mut BTreeSet<String>,
    ) -> Result<()> {
        let value = format!("v.{}()", getter_name(field.name()));
        let wire = field.name();
        if is_java_primitive(field.field_type(), field.nullable()) {
            src.line(2, &format!("out.writeFieldName(\"{wire}\");"));
            self.write_value(src, 2, entity, field, field.field_type(), &value, imports, 0)?;
        } else if field.nullable() {
            // null-handling policy: omit
            src.line(2, &format!("if ({value} != null) {{"));
            src.line(3, &format!("out.writeFieldName(\"{wire}\");"));
            self.write_value(src, 3, entity, field, field.field_type(), &value, imports, 0)?;
            src.line(2, "}");
        } else {
            // null-handling policy: emit-null
            src.line(2, &format!("if ({value} == null) {{"));
            src.line(3, &format!("out.writeNullField(\"{wire}\");"));
            src.line(2, "} else {");
            src.line(3, &format!("out.writeFieldName(\"{wire}\");"));
            self.write_value(src, 3, entity, field, field.field_type(), &value, imports, 0)?;
            src.line(2, "}");
        }
        Ok(())
    }

    /// Emit statements writing `expr` at JSON value position.
    #[allow(clippy::too_many_arguments)]
    fn write_value(
        &self,
        src: &mut SourceBuf,
        indent: usize,
        entity: &Entity,
        field: &Field,
        ftype: &FieldType,
        expr: &str,
        imports: &mut BTreeSet<String>,
        depth: usize,
    ) -> Result<()> {
        match ftype {
            FieldType::Primitive(p) => {
                let call = match p {
                    Primitive::Int
                    | Primitive::Long
                    | Primitive::Float
                    | Primitive::Double
                    | Primitive::Decimal => format!("out.writeNumber({expr});"),
                    Primitive::Bool => format!("out.writeBoolean({expr});"),
                    Primitive::String => format!("out.writeString({expr});"),
                    Primitive::DateTime => format!("out.writeString({expr}.toString());"),
                };
                src.line(indent, &call);
            }
            FieldType::Reference { namespace, name } => {
                if !namespace.is_empty() && namespace != entity.namespace() {
                    imports.insert(format!("{namespace}.{name}Json"));
                }
                src.line(indent, &format!("{name}Json.write(out, {expr});"));
            }
            FieldType::List(inner) | FieldType::Set(inner) => {
                let elem = self.java_type(inner, entity, field, imports)?;
                let var = format!("e{depth}");
                src.line(indent, "out.writeStartArray();");
                src.line(indent, &format!("for (final {elem} {var} : {expr}) {{"));
                self.write_value(src, indent + 1, entity, field, inner, &var, imports, depth + 1)?;
                src.line(indent, "}");
                src.line(indent, "out.writeEndArray();");
            }
            FieldType::Map(key, value) => {
                let key_java = self.java_type(key, entity, field, imports)?;
                let value_java = self.java_type(value, entity, field, imports)?;
                imports.insert("java.util.Map".to_string());
                let var = format!("en{depth}");
                src.line(indent, "out.writeStartObject();");
                src.line(
                    indent,
                    &format!(
                        "for (final Map.Entry<{key_java}, {value_java}> {var} : {expr}.entrySet()) {{"
                    ),
                );
                src.line(
                    indent + 1,
                    &format!("out.writeFieldName(String.valueOf({var}.getKey()));"),
                );
                self.write_value(
                    src,
                    indent + 1,
                    entity,
                    field,
                    value,
                    &format!("{var}.getValue()"),
                    imports,
                    depth + 1,
                )?;
                src.line(indent, "}");
                src.line(indent, "out.writeEndObject();");
            }
        }
        Ok(())
    }

    fn read_field(
        &self,
        src: &mut SourceBuf,
        entity: &Entity,
        field: &Field,
        imports: &mut BTreeSet<String>,
    ) -> Result<()> {
        let setter = setter_name(field.name());
        src.line(4, &format!("case \"{}\": {{", field.name()));
        if !is_java_primitive(field.field_type(), field.nullable()) {
            src.line(5, "if (in.currentToken() == JsonToken.VALUE_NULL) {");
            src.line(6, &format!("v.{setter}(null);"));
            src.line(6, "break;");
            src.line(5, "}");
        }
        match self.read_value_expr(field.field_type(), entity, imports) {
            Some(expr) => src.line(5, &format!("v.{setter}({expr});")),
            None => {
                self.read_into(src, 5, entity, field, field.field_type(), "a0", imports, 0)?;
                src.line(5, &format!("v.{setter}(a0);"));
            }
        }
        src.line(5, "break;");
        src.line(4, "}");
        Ok(())
    }

    /// Expression form of a value read, for scalars and entity references.
    /// Containers need the statement form and return `None`.
    fn read_value_expr(
        &self,
        ftype: &FieldType,
        entity: &Entity,
        imports: &mut BTreeSet<String>,
    ) -> Option<String> {
        match ftype {
            FieldType::Primitive(p) => Some(match p {
                Primitive::Int => "in.getIntValue()".to_string(),
                Primitive::Long => "in.getLongValue()".to_string(),
                Primitive::Float => "in.getFloatValue()".to_string(),
                Primitive::Double => "in.getDoubleValue()".to_string(),
                Primitive::Bool => "in.getBooleanValue()".to_string(),
                Primitive::String => "in.getText()".to_string(),
                Primitive::DateTime => {
                    imports.insert("java.time.ZonedDateTime".to_string());
                    "ZonedDateTime.parse(in.getText())".to_string()
                }
                Primitive::Decimal => "in.getDecimalValue()".to_string(),
            }),
            FieldType::Reference { namespace, name } => {
                if !namespace.is_empty() && namespace != entity.namespace() {
                    imports.insert(format!("{namespace}.{name}Json"));
                }
                Some(format!("{name}Json.read(in)"))
            }
            _ => None,
        }
    }

    /// Emit statements declaring `var` and filling it from the parser.
    #[allow(clippy::too_many_arguments)]
    fn read_into(
        &self,
        src: &mut SourceBuf,
        indent: usize,
        entity: &Entity,
        field: &Field,
        ftype: &FieldType,
        var: &str,
        imports: &mut BTreeSet<String>,
        depth: usize,
    ) -> Result<()> {
        match ftype {
            FieldType::List(inner) | FieldType::Set(inner) => {
                let elem = self.java_type(inner, entity, field, imports)?;
                let (iface, concrete) = match ftype {
                    FieldType::List(_) => {
                        imports.insert("java.util.ArrayList".to_string());
                        ("List", "ArrayList")
                    }
                    _ => {
                        // insertion order preserved so round-trips are stable
                        imports.insert("java.util.LinkedHashSet".to_string());
                        ("Set", "LinkedHashSet")
                    }
                };
                src.line(
                    indent,
                    &format!("final {iface}<{elem}> {var} = new {concrete}<>();"),
                );
                src.line(indent, "while (in.nextToken() != JsonToken.END_ARRAY) {");
                match self.read_value_expr(inner, entity, imports) {
                    Some(expr) => src.line(indent + 1, &format!("{var}.add({expr});")),
                    None => {
                        let elem_var = format!("a{}", depth + 1);
                        self.read_into(src, indent + 1, entity, field, inner, &elem_var, imports, depth + 1)?;
                        src.line(indent + 1, &format!("{var}.add({elem_var});"));
                    }
                }
                src.line(indent, "}");
            }
            FieldType::Map(key, value) => {
                let key_java = self.java_type(key, entity, field, imports)?;
                let value_java = self.java_type(value, entity, field, imports)?;
                imports.insert("java.util.Map".to_string());
                imports.insert("java.util.LinkedHashMap".to_string());
                src.line(
                    indent,
                    &format!(
                        "final Map<{key_java}, {value_java}> {var} = new LinkedHashMap<>();"
                    ),
                );
                src.line(indent, "while (in.nextToken() != JsonToken.END_OBJECT) {");
                let key_var = format!("k{depth}");
                src.line(
                    indent + 1,
                    &format!("final String {key_var} = in.currentName();"),
                );
                src.line(indent + 1, "in.nextToken();");
                let key_expr = self.map_key_expr(key, entity, field, &key_var, imports)?;
                match self.read_value_expr(value, entity, imports) {
                    Some(expr) => {
                        src.line(indent + 1, &format!("{var}.put({key_expr}, {expr});"));
                    }
                    None => {
                        let value_var = format!("a{}", depth + 1);
                        self.read_into(src, indent + 1, entity, field, value, &value_var, imports, depth + 1)?;
                        src.line(indent + 1, &format!("{var}.put({key_expr}, {value_var});"));
                    }
                }
                src.line(indent, "}");
            }
            _ => {
                // scalars and references take the expression path in read_field
                let elem = self.java_type(ftype, entity, field, imports)?;
                if let Some(expr) = self.read_value_expr(ftype, entity, imports) {
                    src.line(indent, &format!("final {elem} {var} = {expr};"));
                }
            }
        }
        Ok(())
    }

    /// JSON object keys arrive as strings; convert back to the declared key
    /// type. Only primitive keys have a defined wire form.
    fn map_key_expr(
        &self,
        key: &FieldType,
        entity: &Entity,
        field: &Field,
        key_var: &str,
        imports: &mut BTreeSet<String>,
    ) -> Result<String> {
        let p = match key {
            FieldType::Primitive(p) => *p,
            other => {
                return Err(ModelgenError::UnsupportedType {
                    type_name: other.to_string(),
                    context: format!(
                        "map key in field '{}' of entity '{}'",
                        field.name(),
                        entity.qualified_name()
                    ),
                });
            }
        };
        Ok(match p {
            Primitive::Int => format!("Integer.valueOf({key_var})"),
            Primitive::Long => format!("Long.valueOf({key_var})"),
            Primitive::Float => format!("Float.valueOf({key_var})"),
            Primitive::Double => format!("Double.valueOf({key_var})"),
            Primitive::Bool => format!("Boolean.valueOf({key_var})"),
            Primitive::String => key_var.to_string(),
            Primitive::DateTime => {
                imports.insert("java.time.ZonedDateTime".to_string());
                format!("ZonedDateTime.parse({key_var})")
            }
            Primitive::Decimal => {
                imports.insert("java.math.BigDecimal".to_string());
                format!("new BigDecimal({key_var})")
            }
        })
    }

    fn java_type(
        &self,
        ftype: &FieldType,
        entity: &Entity,
        field: &Field,
        imports: &mut BTreeSet<String>,
    ) -> Result<String> {
        let context = format!(
            "field '{}' of entity '{}'",
            field.name(),
            entity.qualified_name()
        );
        self.mapping
            .java_type(ftype, true, entity.namespace(), imports, &context)
    }
}

impl Emitter for JsonableEmitter {
    fn name(&self) -> &'static str {
        "jsonable"
    }

    fn emit(&self, model: &Model, out_root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(model.entities().len());
        for entity in model.entities() {
            let body = self.render(entity)?;
            let file = format!("{}Json.java", entity.name());
            let path = artifact_path(out_root, entity.namespace(), &file);
            write_artifact(&path, &body)?;
            written.push(path);
        }
        Ok(written)
    }
}
