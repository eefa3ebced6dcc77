//! Schema-driven source generator: a small DSL of versioned entities goes in,
//! Java data classes with equality companions and JSON adapters come out.
//!
//! The crate is organized as a pipeline over an immutable [`model::Model`]:
//!
//! * [`parse`] turns schema text into a validated model (pest grammar,
//!   two-pass reference resolution, optional auto-versioning).
//! * [`reconcile`] clears stale generated files from the output tree before
//!   a run, honoring a first-line retention marker.
//! * [`emit`] holds the [`emit::Emitter`] strategy trait plus the shared
//!   type-mapping and source-assembly machinery.
//! * [`pojo`], [`compare`] and [`jsonable`] are the concrete emitters.
//! * [`pipeline`] wires the stages together with per-stage error attribution.
//!
//! Quick start:
//!
//! ```
//! use modelgen::parse::{parse, ParseOptions};
//!
//! let model = parse(
//!     "entity Person { id: int [identity], name: string }",
//!     ParseOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(model.entities().len(), 1);
//! assert_eq!(model.entities()[0].name(), "Person");
//! ```

pub mod compare;
pub mod emit;
pub mod error;
pub mod jsonable;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod pojo;
pub mod reconcile;
