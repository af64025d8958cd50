//! Manifest-driven batch analysis.
//!
//! Each manifest row names a bug, a source file, the target function, a
//! patch location and the tool that produced the patches. Rows are analysed
//! independently: a failure is logged and only costs that row (or patch).

use crate::analyze::PatchAnalyzer;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::extent::cache::ProxyCache;
use crate::extent::ExtentBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Columns every manifest must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "bug_id",
    "source_file",
    "function_name",
    "patch_folder",
    "tool_name",
];

/// One result row: manifest columns, metric columns and `patch_filename`.
pub type ResultRow = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct ManifestRow {
    pub bug_id: String,
    pub source_file: String,
    pub function_name: String,
    pub patch_folder: String,
    pub tool_name: String,
    /// Every column as read, for carrying into the results
    pub columns: BTreeMap<String, String>,
}

impl ManifestRow {
    fn from_columns(columns: BTreeMap<String, String>) -> Self {
        let field = |name: &str| columns.get(name).map_or("", |v| v.trim()).to_owned();
        Self {
            bug_id: field("bug_id"),
            source_file: field("source_file"),
            function_name: field("function_name"),
            patch_folder: field("patch_folder"),
            tool_name: field("tool_name"),
            columns,
        }
    }
}

/// Rows produced plus counts of what was passed over.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rows: Vec<ResultRow>,
    /// Manifest rows skipped entirely
    pub skipped_rows: usize,
    /// Individual patches that failed analysis
    pub failed_patches: usize,
}

/// Read a CSV manifest.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>, AnalysisError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| AnalysisError::document(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::document(path, e.to_string()))?
        .clone();
    let header_names: Vec<String> = headers.iter().map(|h| h.trim().to_owned()).collect();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|name| !header_names.iter().any(|h| h == *name))
    {
        return Err(AnalysisError::document(
            path,
            format!("manifest is missing the '{missing}' column"),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AnalysisError::document(path, e.to_string()))?;
        let columns = header_names
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_owned))
            .collect();
        rows.push(ManifestRow::from_columns(columns));
    }
    Ok(rows)
}

/// Patch files for one manifest row: the file itself when it is a `.json`
/// plan, otherwise every `*.patch` file in the directory, sorted.
pub fn discover_patches(patch_path: &Path) -> Vec<PathBuf> {
    if patch_path.extension().is_some_and(|ext| ext == "json") {
        return vec![patch_path.to_path_buf()];
    }

    let pattern = format!(
        "{}/*.patch",
        glob::Pattern::escape(&patch_path.to_string_lossy())
    );
    let mut patches: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            log::warn!("[batch] bad patch pattern {pattern}: {e}");
            Vec::new()
        }
    };
    patches.sort();
    patches
}

/// Run every manifest row and collect the result rows.
pub fn run_manifest(
    manifest: &Path,
    source_root: &Path,
    patches_root: &Path,
    config: &Config,
) -> Result<BatchOutcome, AnalysisError> {
    let rows = read_manifest(manifest)?;
    let analyzer = PatchAnalyzer::new(config)?;
    let mut cache = ProxyCache::new(ExtentBuilder::c(config.system_include_dirs.clone()));
    let mut outcome = BatchOutcome::default();

    for row in &rows {
        log::info!("Processing {}...", row.bug_id);
        if !run_row(row, source_root, patches_root, config, &analyzer, &mut cache, &mut outcome) {
            outcome.skipped_rows += 1;
        }
    }

    Ok(outcome)
}

/// Source file and include directories for a row. A matching project rule
/// picks the subdirectory and include dirs; otherwise the default subdirectory
/// is used with no extra include dirs.
pub fn resolve_source(
    config: &Config,
    source_root: &Path,
    row: &ManifestRow,
) -> (PathBuf, Vec<PathBuf>) {
    let project = config.project_for(&row.bug_id);
    let base_dir = match (project, &config.default_source_subdir) {
        (Some(rule), _) => source_root.join(&rule.source_subdir),
        (None, Some(subdir)) => source_root.join(subdir),
        (None, None) => source_root.to_path_buf(),
    };
    let include_dirs = project
        .map(|rule| rule.include_dirs.iter().map(|dir| base_dir.join(dir)).collect())
        .unwrap_or_default();
    (base_dir.join(&row.source_file), include_dirs)
}

/// Analyse one manifest row. Returns false when the row is skipped.
fn run_row(
    row: &ManifestRow,
    source_root: &Path,
    patches_root: &Path,
    config: &Config,
    analyzer: &PatchAnalyzer,
    cache: &mut ProxyCache,
    outcome: &mut BatchOutcome,
) -> bool {
    let (source_file, include_dirs) = resolve_source(config, source_root, row);
    if !source_file.is_file() {
        log::warn!(
            "[batch] Source not found: {}. Skipping.",
            source_file.display()
        );
        return false;
    }

    let patches = discover_patches(&patches_root.join(&row.patch_folder));
    if patches.is_empty() {
        log::warn!(
            "[batch] No patches found in {}. Skipping.",
            patches_root.join(&row.patch_folder).display()
        );
        return false;
    }

    if let Err(e) = analyzer.tool_kind(&row.tool_name) {
        log::warn!("[batch] Skipping {}: {e}", row.bug_id);
        return false;
    }

    let proxy = match cache.get_or_build(&source_file, &row.function_name, &include_dirs) {
        Ok(proxy) => proxy,
        Err(e) => {
            log::warn!("[batch] Skipping {}: {e}", row.bug_id);
            return false;
        }
    };

    for patch in &patches {
        match analyzer.analyze_file(&proxy, patch, &row.tool_name) {
            Ok(record) => {
                let mut result = row.columns.clone();
                for (name, value) in record.columns() {
                    result.insert(name.to_owned(), value);
                }
                let file_name = patch
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                log::info!("  Successfully processed patch: {file_name}");
                result.insert("patch_filename".to_owned(), file_name);
                outcome.rows.push(result);
            }
            Err(e) => {
                log::warn!("[batch] {} / {}: {e}", row.bug_id, patch.display());
                outcome.failed_patches += 1;
            }
        }
    }
    true
}

/// Write result rows as CSV. Columns are the sorted union of all row keys;
/// a row without a column gets an empty cell.
pub fn write_results(path: &Path, rows: &[ResultRow]) -> Result<(), AnalysisError> {
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer =
        csv::Writer::from_path(path).map_err(|e| AnalysisError::document(path, e.to_string()))?;
    let write_err = |e: csv::Error| AnalysisError::document(path, e.to_string());

    writer.write_record(&columns).map_err(write_err)?;
    for row in rows {
        writer
            .write_record(
                columns
                    .iter()
                    .map(|column| row.get(*column).map_or("", String::as_str)),
            )
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AnalysisError::io(path, &e))?;
    Ok(())
}
