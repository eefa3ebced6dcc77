use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a generation run. The pipeline is fail-fast:
/// no partial model and no partial emitter output is ever considered usable,
/// so every variant terminates the run when it surfaces.
#[derive(Error, Debug)]
pub enum ModelgenError {
    #[error("Syntax error at line {line}, column {col}: {message}")]
    Syntax {
        message: String,
        line: usize,
        col: usize,
    },
    #[error("Duplicate entity '{name}' in namespace '{namespace}'")]
    DuplicateEntity { namespace: String, name: String },
    #[error("Unresolved reference '{reference}' ({context})")]
    UnresolvedReference { reference: String, context: String },
    #[error("Identity field '{field}' is not declared in entity '{entity}'")]
    InvalidIdentityField { entity: String, field: String },
    #[error("No target type mapping for '{type_name}' ({context})")]
    UnsupportedType { type_name: String, context: String },
    #[error("Entity '{entity}' declares no identity fields")]
    NoIdentityFields { entity: String },
    #[error("File system error on '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ModelgenError>;

impl ModelgenError {
    /// Shorthand for wrapping an I/O failure together with the path it hit.
    pub fn file_system(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
