// The generation run: Reconcile -> Parse -> Emit(pojo) -> Emit(compare, full)
// -> Emit(compare, id) -> Emit(jsonable), single-threaded and fail-fast. The
// only job of this module beyond sequencing is attributing a failure to the
// stage it happened in, so the binary can report it.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::compare::{CompareEmitter, CompareMode};
use crate::emit::Emitter;
use crate::error::ModelgenError;
use crate::jsonable::JsonableEmitter;
use crate::parse::{ParseOptions, parse};
use crate::pojo::PojoEmitter;
use crate::reconcile::{ReconcileStats, reconcile};

pub struct RunConfig {
    pub schema_path: PathBuf,
    pub out_root: PathBuf,
    pub options: ParseOptions,
    /// Extension of generated files the reconciler is allowed to delete.
    pub target_extension: String,
    /// First-line pattern that exempts a file from cleanup.
    pub retention: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reconcile,
    Parse,
    Pojo,
    CompareFull,
    CompareId,
    Jsonable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Reconcile => "reconcile",
            Stage::Parse => "parse",
            Stage::Pojo => "pojo",
            Stage::CompareFull => "compare-full",
            Stage::CompareId => "compare-id",
            Stage::Jsonable => "jsonable",
        };
        write!(f, "{name}")
    }
}

/// A pipeline failure, tagged with the stage that produced it.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: ModelgenError,
}

#[derive(Debug)]
pub struct RunSummary {
    pub reconciled: ReconcileStats,
    pub entities: usize,
    pub written: Vec<PathBuf>,
}

/// Execute one full generation run.
pub fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    let at = |stage: Stage| move |source: ModelgenError| RunError { stage, source };

    let reconciled = reconcile(
        &config.out_root,
        &config.target_extension,
        &config.retention,
    )
    .map_err(at(Stage::Reconcile))?;

    let source = fs::read_to_string(&config.schema_path)
        .map_err(|e| ModelgenError::file_system(&config.schema_path, e))
        .map_err(at(Stage::Parse))?;
    let model = parse(&source, config.options).map_err(at(Stage::Parse))?;
    info!(entities = model.entities().len(), "parsed model");

    let emitters: Vec<(Stage, Box<dyn Emitter>)> = vec![
        (Stage::Pojo, Box::new(PojoEmitter::default())),
        (
            Stage::CompareFull,
            Box::new(CompareEmitter::new(CompareMode::Full)),
        ),
        (
            Stage::CompareId,
            Box::new(CompareEmitter::new(CompareMode::IdOnly)),
        ),
        (Stage::Jsonable, Box::new(JsonableEmitter::default())),
    ];
    let mut written = Vec::new();
    for (stage, emitter) in &emitters {
        let files = emitter.emit(&model, &config.out_root).map_err(at(*stage))?;
        info!(stage = %stage, files = files.len(), "stage complete");
        written.extend(files);
    }

    Ok(RunSummary {
        reconciled,
        entities: model.entities().len(),
        written,
    })
}
