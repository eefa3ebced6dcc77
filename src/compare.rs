// Emits equality companions for the generated POJOs. Two modes: Full covers
// every declared field, IdOnly covers only the identity subset. Both produce
// a static null-safe isSame plus a sameHash that agrees with it, so the
// generated relation is a proper equivalence with a consistent hash.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::emit::{Emitter, SourceBuf, artifact_path, getter_name, preamble, write_artifact};
use crate::error::{ModelgenError, Result};
use crate::model::{Entity, Field, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Full,
    IdOnly,
}

impl CompareMode {
    /// Suffix of the generated class and file name.
    pub fn suffix(&self) -> &'static str {
        match self {
            CompareMode::Full => "FullCompare",
            CompareMode::IdOnly => "IdCompare",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompareEmitter {
    mode: CompareMode,
}

impl CompareEmitter {
    pub fn new(mode: CompareMode) -> Self {
        Self { mode }
    }

    /// The fields the comparison covers, in declaration order.
    fn covered<'m>(&self, entity: &'m Entity) -> Result<Vec<&'m Field>> {
        match self.mode {
            CompareMode::Full => Ok(entity.fields().iter().collect()),
            CompareMode::IdOnly => {
                let fields: Vec<&Field> = entity.identity_fields().collect();
                if fields.is_empty() {
                    return Err(ModelgenError::NoIdentityFields {
                        entity: entity.qualified_name(),
                    });
                }
                Ok(fields)
            }
        }
    }

    fn render(&self, entity: &Entity) -> Result<String> {
        let covered = self.covered(entity)?;
        let pojo = entity.name();
        let class = format!("{}{}", pojo, self.mode.suffix());
        let mut imports = BTreeSet::new();
        imports.insert("java.util.Objects".to_string());

        let mut src = SourceBuf::with_header();
        preamble(&mut src, entity.namespace(), &imports);
        let what = match self.mode {
            CompareMode::Full => "all declared fields",
            CompareMode::IdOnly => "identity fields only",
        };
        src.line(0, &format!("/** Equality over {what} of {pojo}. */"));
        src.line(0, &format!("public final class {class} {{"));
        src.blank();
        src.line(1, &format!("private {class}() {{}}"));
        src.blank();
        src.line(
            1,
            &format!("public static boolean isSame(final {pojo} one, final {pojo} another) {{"),
        );
        src.line(2, "if (one == another) return true;");
        src.line(2, "if (one == null || another == null) return false;");
        for field in &covered {
            // short-circuit on the first mismatch, declaration order
            src.line(
                2,
                &format!(
                    "if (!Objects.equals(one.{0}(), another.{0}())) return false;",
                    getter_name(field.name())
                ),
            );
        }
        src.line(2, "return true;");
        src.line(1, "}");
        src.blank();
        src.line(1, &format!("public static int sameHash(final {pojo} v) {{"));
        let args: Vec<String> = covered
            .iter()
            .map(|f| format!("v.{}()", getter_name(f.name())))
            .collect();
        src.line(2, &format!("return Objects.hash({});", args.join(", ")));
        src.line(1, "}");
        src.line(0, "}");
        Ok(src.into_string())
    }
}

impl Emitter for CompareEmitter {
    fn name(&self) -> &'static str {
        match self.mode {
            CompareMode::Full => "compare-full",
            CompareMode::IdOnly => "compare-id",
        }
    }

    fn emit(&self, model: &Model, out_root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(model.entities().len());
        for entity in model.entities() {
            let body = self.render(entity)?;
            let file = format!("{}{}.java", entity.name(), self.mode.suffix());
            let path = artifact_path(out_root, entity.namespace(), &file);
            write_artifact(&path, &body)?;
            written.push(path);
        }
        Ok(written)
    }
}
