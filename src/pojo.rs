// Emits one Java data class per entity: typed fields, a no-args constructor
// for deserialization, an all-fields constructor in declaration order, and a
// getter/setter pair per field.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::emit::{
    Emitter, SourceBuf, TypeMapping, artifact_path, getter_name, preamble, setter_name,
    write_artifact,
};
use crate::error::Result;
use crate::model::{Entity, Model};

#[derive(Debug, Default)]
pub struct PojoEmitter {
    mapping: TypeMapping,
}

impl PojoEmitter {
    pub fn new(mapping: TypeMapping) -> Self {
        Self { mapping }
    }

    fn render(&self, entity: &Entity) -> Result<String> {
        let name = entity.name();
        let mut imports = BTreeSet::new();
        let mut body = SourceBuf::new();

        // field declarations
        let mut java_types = Vec::with_capacity(entity.fields().len());
        for field in entity.fields() {
            let context = format!("field '{}' of entity '{}'", field.name(), entity.qualified_name());
            let java = self.mapping.java_type(
                field.field_type(),
                field.nullable(),
                entity.namespace(),
                &mut imports,
                &context,
            )?;
            body.line(1, &format!("private {} {};", java, field.name()));
            java_types.push(java);
        }
        body.blank();

        // constructors
        body.line(1, &format!("public {name}() {{}}"));
        if !entity.fields().is_empty() {
            body.blank();
            let params: Vec<String> = entity
                .fields()
                .iter()
                .zip(&java_types)
                .map(|(f, t)| format!("final {} {}", t, f.name()))
                .collect();
            body.line(1, &format!("public {name}({}) {{", params.join(", ")));
            for field in entity.fields() {
                body.line(2, &format!("this.{0} = {0};", field.name()));
            }
            body.line(1, "}");
        }

        // accessor pairs
        for (field, java) in entity.fields().iter().zip(&java_types) {
            body.blank();
            body.line(
                1,
                &format!(
                    "public {} {}() {{ return {}; }}",
                    java,
                    getter_name(field.name()),
                    field.name()
                ),
            );
            body.line(
                1,
                &format!(
                    "public void {}(final {} {2}) {{ this.{2} = {2}; }}",
                    setter_name(field.name()),
                    java,
                    field.name()
                ),
            );
        }

        let mut src = SourceBuf::with_header();
        preamble(&mut src, entity.namespace(), &imports);
        match entity.version() {
            Some(version) => src.line(0, &format!("/** Schema entity {name}, version {version}. */")),
            None => src.line(0, &format!("/** Schema entity {name}. */")),
        }
        src.line(0, &format!("public class {name} {{"));
        src.blank();
        src.push_raw(&body.into_string());
        src.line(0, "}");
        Ok(src.into_string())
    }
}

impl Emitter for PojoEmitter {
    fn name(&self) -> &'static str {
        "pojo"
    }

    fn emit(&self, model: &Model, out_root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(model.entities().len());
        for entity in model.entities() {
            let body = self.render(entity)?;
            let file = format!("{}.java", entity.name());
            let path = artifact_path(out_root, entity.namespace(), &file);
            write_artifact(&path, &body)?;
            written.push(path);
        }
        Ok(written)
    }
}
