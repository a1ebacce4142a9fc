//! # kiva-pipeline
//!
//! Turns raw Kiva loan dumps into model-ready tables.
//!
//! ## Usage
//!
//! ```bash
//! kiva build data/raw -o data/loans.snap [--mode complex] [--features]
//! kiva batch data/2013 data/2014 --out-dir data/dumps
//! kiva condense data/dumps/2013.json data/dumps/2014.json -o data/everything.json
//! kiva query --baseline
//! kiva evaluate data/everything.json
//! ```
//!
//! ## Modules
//!
//! - `record` - Serde types for the raw source records
//! - `ingest` - Reading source directories and deduplicating loans
//! - `transform` - Flattening, date derivation, window filtering and column modes
//! - `features` - Derived model columns (expiry label, text lengths, theme flags)
//! - `table` - The in-memory loan table indexed by id
//! - `storage` - JSON, snapshot and CSV persistence; batch merging
//! - `sql` - Feature queries and the optional PostgreSQL store
//! - `model` - The model-training seam and evaluation driver
//! - `config` - TOML configuration with environment overrides
//! - `cli` - Argument parsing and command handlers for the `kiva` binary
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod model;
pub mod record;
pub mod sql;
pub mod storage;
pub mod table;
pub mod transform;

pub use error::{PipelineError, Result};
pub use table::{LoanRow, LoanTable};
pub use transform::{build_from_dir, build_table, BuildOptions, DateWindow, Mode};
