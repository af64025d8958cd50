pub mod parser;

use parser::{first_added_line, parse_diff};

/// What the cost model needs from a diff-emitting tool's patch.
///
/// Extraction is best-effort: a missing added line becomes `""` and a
/// missing hunk header makes the target line 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPatch {
    /// First added line, trimmed
    pub added_line: String,
    /// New-side start line of the first hunk
    pub target_line: u32,
    /// Hunk headers seen; only the first decides the target line
    pub hunk_count: usize,
}

impl DiffPatch {
    pub fn from_text(diff_text: &str) -> Self {
        let hunks = parse_diff(diff_text);
        let target_line = hunks.first().map_or(0, |hunk| hunk.new_start);
        let added_line = first_added_line(diff_text).unwrap_or("").to_owned();

        if hunks.len() > 1 {
            log::debug!(
                "[diff] {} hunks, using the first (target line {target_line})",
                hunks.len()
            );
        }

        Self {
            added_line,
            target_line,
            hunk_count: hunks.len(),
        }
    }
}
