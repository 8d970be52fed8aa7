//! # texnorm-pipeline
//!
//! The texture normalization pipeline: turns supplier deliveries described
//! by a rule hierarchy into normalized per-asset output variants.
//!
//! ## Processing model
//!
//! The [`Orchestrator`] drives one [`SourceRule`](rules::SourceRule) at a
//! time. Per asset it runs the pre-item stages (metadata initialization,
//! supplier determination, skip evaluation, file filtering), explodes the
//! file rules into work items (one per map type and eligible resolution,
//! plus configured channel-pack merges), and processes each item through
//! transform, scaling and saving. A failing item is recorded under its key
//! and never aborts its siblings. Outputs land in a scratch directory and
//! are organized into their final location only when the asset did not
//! fail, together with a YAML metadata sidecar.
//!
//! ```text
//! rules + config
//!      |
//!      v
//! pre stages -> prepare -> [ transform/merge -> scale -> save ]* -> organize
//!                                                                      |
//!                                       RunSummary <- final status <---+
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use texnorm_pipeline::{Orchestrator, PipelineConfig, RunTokens};
//! use std::sync::atomic::AtomicBool;
//!
//! let config: PipelineConfig = serde_yaml::from_str(&config_text)?;
//! let orchestrator = Orchestrator::new(config);
//! let summary = orchestrator.process_source_rule(
//!     &source_rule, workspace, output_base, false,
//!     &RunTokens::default(), &AtomicBool::new(false),
//! );
//! println!("processed {} assets", summary.processed.len());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
mod error;
pub mod naming;
pub mod orchestrator;
pub mod rules;
pub mod stages;

pub use config::{BitDepthRule, MergeRule, MismatchPolicy, PipelineConfig, ScalingMode};
pub use context::{AssetStatus, ItemStatus, RunTokens};
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{Orchestrator, RunSummary};
pub use rules::{AssetRule, FileRule, SourceRule};
