//! # dupes
//!
//! Highlight duplicate code in the open document from a pre-generated
//! [jscpd](https://github.com/kucherenko/jscpd) report.
//!
//! The crate does not detect clones itself. It locates `jscpd-report.json`
//! in the workspace, keeps only the clone pairs that touch the active file,
//! and turns their reported locations into zero-based ranges with a hover
//! message naming the partner file.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use dupes::matcher::relative_path;
//! use dupes::report::Report;
//! use dupes::translate::{Offsets, translate};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), dupes::ReportError> {
//! let report = Report::load(Path::new("report/jscpd-report.json")).await?;
//! let rel = relative_path(Path::new("/repo/src/app.js"), Path::new("/repo")).unwrap();
//! for decoration in translate(&report, &rel, Offsets::default()) {
//!     println!("{:?} {}", decoration.range, decoration.hover);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Editors plug in through the [`host::Host`] trait and drive passes with
//! [`viewer::DupeViewer`].

// ============================================================================
// Core Modules
// ============================================================================

/// Optional `.dupe-viewer/config.toml` loading.
pub mod config;

/// Cancel-and-replace timer used for text-change triggers.
pub mod debounce;

/// Typed errors for report and config handling.
pub mod error;

/// Narrow interface over the editor runtime.
pub mod host;

/// Workspace search for the report file.
pub mod locator;

/// Path normalization and report lookups for the active file.
pub mod matcher;

/// Serde model of the jscpd JSON report.
pub mod report;

/// Report locations to host ranges and hover text.
pub mod translate;

/// One detection pass over the active document.
pub mod viewer;

pub use config::DupesConfig;
pub use error::{ConfigError, ReportError};
pub use host::{Host, MessageLevel};
pub use report::Report;
pub use translate::{Decoration, Offsets, Position, Span};
pub use viewer::{DupeViewer, PassOutcome, Trigger};
