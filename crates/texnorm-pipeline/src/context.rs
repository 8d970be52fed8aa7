//! Per-asset processing state.
//!
//! [`AssetContext`] is the mutable state bag threaded through all stages for
//! one asset. It is owned exclusively by the orchestrator's per-asset loop,
//! so independent assets can run in parallel without locks.

use crate::rules::{AssetRule, FileRule, SourceRule};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use texnorm_core::ImageBuf;

/// Resolution key of the undersized-source fallback variant.
pub const LOWRES_KEY: &str = "LOWRES";

/// Per-item processing status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemStatus {
    /// Not yet processed.
    #[default]
    Pending,
    /// Processed with at least one saved variant.
    Processed,
    /// Processed but every resolution was skipped (e.g. all larger than
    /// the source).
    ProcessedNoOutput,
    /// Skipped with a reason.
    Skipped(String),
    /// Failed with a reason.
    Failed(String),
}

impl ItemStatus {
    /// Returns true for both processed variants.
    pub fn is_processed(&self) -> bool {
        matches!(self, ItemStatus::Processed | ItemStatus::ProcessedNoOutput)
    }

    /// Short status label for logs and the metadata sidecar.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Processed => "Processed",
            ItemStatus::ProcessedNoOutput => "Processed (No Output)",
            ItemStatus::Skipped(_) => "Skipped",
            ItemStatus::Failed(_) => "Failed",
        }
    }
}

/// One concrete unit of map-processing work.
#[derive(Debug, Clone)]
pub struct ProcessingItem {
    /// Absolute path of the source image.
    pub source_path: PathBuf,
    /// Resolved map type identifier (suffixed, e.g. `MAP_COL-2`).
    pub map_type: String,
    /// Target resolution key (a resolution table key or `LOWRES`).
    pub resolution_key: String,
    /// Working image buffer.
    pub image: ImageBuf,
    /// Native source dimensions (width, height).
    pub original_dimensions: (u32, u32),
    /// Current buffer dimensions, updated by scaling.
    pub current_dimensions: (u32, u32),
    /// Source bit depth, when known.
    pub bit_depth: Option<u8>,
    /// Source channel count.
    pub channels: u32,
}

/// One configuration-declared channel-pack merge.
#[derive(Debug, Clone)]
pub struct MergeTask {
    /// Stable result key for this task.
    pub key: String,
    /// Map type of the composite output.
    pub output_map_type: String,
    /// Channel letter → required input map type.
    pub inputs: BTreeMap<char, String>,
    /// Channel letter → constant fallback (normalized).
    pub defaults: BTreeMap<char, f32>,
    /// Output channel order.
    pub channel_order: String,
    /// Fixed target dimensions for fallback synthesis.
    pub target_dimensions: Option<(u32, u32)>,
}

/// Work dispatched by the orchestrator's item loop.
#[derive(Debug, Clone)]
pub enum WorkItem {
    /// A plain per-map, per-resolution item.
    Map(ProcessingItem),
    /// A channel-pack merge task.
    Merge(MergeTask),
}

impl WorkItem {
    /// Stable result key for this item.
    pub fn key(&self) -> String {
        match self {
            WorkItem::Map(item) => format!("{}_{}", item.map_type, item.resolution_key),
            WorkItem::Merge(task) => task.key.clone(),
        }
    }
}

/// One saved output file.
#[derive(Debug, Clone, Serialize)]
pub struct SavedVariant {
    /// Location of the written file.
    pub path: PathBuf,
    /// Resolution key this variant was written for.
    pub resolution_key: String,
    /// Final file extension actually used.
    pub format: String,
    /// Final bit depth.
    pub bit_depth: u8,
    /// Final pixel dimensions (width, height).
    pub dimensions: (u32, u32),
}

/// Outcome of one work item.
#[derive(Debug, Clone, Default)]
pub struct ItemResult {
    /// Final status.
    pub status: ItemStatus,
    /// Final resolved map type (post rename).
    pub map_type: String,
    /// Human-readable transform notes.
    pub notes: Vec<String>,
    /// Variants written for this item.
    pub saved: Vec<SavedVariant>,
}

/// Skip/failure markers set by pre-item stages and item preparation.
#[derive(Debug, Clone, Default)]
pub struct StatusFlags {
    /// Asset was explicitly skipped.
    pub skipped: bool,
    /// Why the asset was skipped.
    pub skip_reason: Option<String>,
    /// Asset-level failure marker.
    pub failed: bool,
    /// Why the asset failed.
    pub fail_reason: Option<String>,
}

impl StatusFlags {
    /// Marks the asset skipped; the first reason wins.
    pub fn mark_skipped(&mut self, reason: impl Into<String>) {
        if !self.skipped {
            self.skipped = true;
            self.skip_reason = Some(reason.into());
        }
    }

    /// Marks the asset failed; the first reason wins.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if !self.failed {
            self.failed = true;
            self.fail_reason = Some(reason.into());
        }
    }
}

/// Run-level token values substituted into naming patterns.
#[derive(Debug, Clone, Default)]
pub struct RunTokens {
    /// Token name → value (without brackets).
    pub values: BTreeMap<String, String>,
}

/// Terminal per-asset status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    /// Every item processed.
    Processed,
    /// Asset skipped with a reason.
    Skipped(String),
    /// Asset failed with a reason.
    Failed(String),
}

/// Per-asset aggregate state, created once per asset and discarded after
/// its final status is recorded.
#[derive(Debug)]
pub struct AssetContext<'a> {
    /// Owning source rule.
    pub source_rule: &'a SourceRule,
    /// The asset being processed.
    pub asset_rule: &'a AssetRule,
    /// Workspace directory file paths are relative to.
    pub workspace: PathBuf,
    /// Per-asset scratch directory under the run's temp dir.
    pub temp_dir: PathBuf,
    /// Base directory for organized outputs.
    pub output_base: PathBuf,
    /// Overwrite already-processed outputs.
    pub overwrite: bool,
    /// Resolved effective supplier.
    pub supplier: Option<String>,
    /// Asset metadata accumulated across stages.
    pub metadata: BTreeMap<String, String>,
    /// File rules surviving the ignore filter.
    pub filtered_files: Vec<FileRule>,
    /// Prepared work items, in execution order.
    pub work_items: Vec<WorkItem>,
    /// Item key → result record.
    pub results: BTreeMap<String, ItemResult>,
    /// Skip/failure markers.
    pub flags: StatusFlags,
}

impl<'a> AssetContext<'a> {
    /// Creates a fresh context for one asset.
    pub fn new(
        source_rule: &'a SourceRule,
        asset_rule: &'a AssetRule,
        workspace: PathBuf,
        temp_dir: PathBuf,
        output_base: PathBuf,
        overwrite: bool,
    ) -> Self {
        Self {
            source_rule,
            asset_rule,
            workspace,
            temp_dir,
            output_base,
            overwrite,
            supplier: None,
            metadata: BTreeMap::new(),
            filtered_files: Vec::new(),
            work_items: Vec::new(),
            results: BTreeMap::new(),
            flags: StatusFlags::default(),
        }
    }

    /// Records a result under the given item key.
    pub fn record_result(&mut self, key: String, result: ItemResult) {
        self.results.insert(key, result);
    }

    /// Derives the terminal asset status from flags and item results.
    ///
    /// Failed beats Skipped; an asset with zero prepared items is Skipped;
    /// Processed requires every item in a processed status.
    pub fn final_status(&self) -> AssetStatus {
        if self.flags.failed {
            return AssetStatus::Failed(
                self.flags
                    .fail_reason
                    .clone()
                    .unwrap_or_else(|| "unspecified failure".to_string()),
            );
        }
        if self.flags.skipped {
            return AssetStatus::Skipped(
                self.flags
                    .skip_reason
                    .clone()
                    .unwrap_or_else(|| "unspecified".to_string()),
            );
        }
        if self.work_items.is_empty() {
            return AssetStatus::Skipped("no processing items prepared".to_string());
        }
        for (key, result) in &self.results {
            if !result.status.is_processed() {
                let reason = match &result.status {
                    ItemStatus::Failed(r) | ItemStatus::Skipped(r) => {
                        format!("item '{}': {}", key, r)
                    }
                    other => format!("item '{}' ended in status {}", key, other.label()),
                };
                return AssetStatus::Failed(reason);
            }
        }
        AssetStatus::Processed
    }
}
