//! Structured search over world records.
//!
//! A search string is parsed into conditions and free text, assembled into
//! a [`CompiledQuery`] for a screen, then evaluated lazily or in budgeted
//! batches.

pub mod assembler;
pub mod builders;
pub mod materialize;
pub mod matcher;
pub mod parser;
pub mod suggest;
pub mod types;

pub use assembler::{assemble, compile};
pub use builders::NbtLiteral;
pub use materialize::{Budget, CountBudget, Materializer, NoProgress, ProgressSink, TimeBudget, materialize};
pub use matcher::{evaluate, evaluate_decoding, tag_matches};
pub use parser::parse_search;
pub use suggest::suggest;
pub use types::*;
