/// Line ranges from one hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
}

/// Parse the hunk headers of unified diff text, in order.
///
/// Everything that is not a hunk header is ignored, as are headers that
/// cannot be parsed.
pub fn parse_diff(diff_output: &str) -> Vec<DiffHunk> {
    diff_output
        .lines()
        .filter(|line| line.starts_with("@@"))
        .filter_map(parse_hunk_header)
        .map(|(old_start, old_count, new_start, new_count)| DiffHunk {
            old_start,
            old_count,
            new_start,
            new_count,
        })
        .collect()
}

/// The first added line anywhere in the text: a line starting with a single
/// `+` followed by at least one character. Returned trimmed.
pub fn first_added_line(diff_output: &str) -> Option<&str> {
    diff_output.lines().find_map(|line| {
        let rest = line.strip_prefix('+')?;
        if rest.is_empty() || rest.starts_with('+') {
            None
        } else {
            Some(rest.trim())
        }
    })
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    // @@ -1,5 +1,7 @@ optional context
    let line = line.trim_start_matches("@@ ");
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() < 2 {
        return None;
    }

    let old = parts[0].strip_prefix('-')?;
    let new = parts[1].strip_prefix('+')?;

    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;

    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = range.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // Single line: "5" means line 5, count 1
        Some((range.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(parse_hunk_header("@@ -1,5 +1,7 @@"), Some((1, 5, 1, 7)));
        assert_eq!(
            parse_hunk_header("@@ -10,3 +12,5 @@ int foo(void)"),
            Some((10, 3, 12, 5))
        );
    }

    #[test]
    fn test_parse_hunk_header_single_line() {
        assert_eq!(parse_hunk_header("@@ -5 +5 @@"), Some((5, 1, 5, 1)));
        assert_eq!(parse_hunk_header("@@ -1 +1,3 @@"), Some((1, 1, 1, 3)));
    }

    #[test]
    fn test_parse_hunk_header_garbage() {
        assert_eq!(parse_hunk_header("@@ garbage @@"), None);
        assert_eq!(parse_hunk_header("@@"), None);
    }

    #[test]
    fn test_parse_hunk_header_out_of_range() {
        assert_eq!(
            parse_hunk_header("@@ -1,1 +4294967295,2 @@"),
            Some((1, 1, u32::MAX, 2))
        );
        assert_eq!(parse_hunk_header("@@ -1,1 +4294967296,2 @@"), None);
    }

    #[test]
    fn test_parse_diff_empty() {
        assert!(parse_diff("").is_empty());
    }

    #[test]
    fn test_parse_diff_multiple_hunks() {
        let diff = "@@ -1,2 +1,2 @@\n old1\n+new1\n@@ -10,2 +12,3 @@\n old2\n+new2";
        let hunks = parse_diff(diff);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].new_start, 1);
        assert_eq!(
            hunks[1],
            DiffHunk {
                old_start: 10,
                old_count: 2,
                new_start: 12,
                new_count: 3,
            }
        );
    }

    #[test]
    fn test_parse_diff_ignores_file_headers() {
        let diff = "--- a/test.c\n+++ b/test.c\n@@ -1,1 +1,1 @@\n-old\n+new\n\\ No newline at end of file";
        let hunks = parse_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start, 1);
    }

    #[test]
    fn test_first_added_line_skips_file_marker() {
        let diff = "--- a/x.c\n+++ b/x.c\n@@ -3,1 +3,2 @@\n foo();\n+    if (!p) return -1;\n";
        assert_eq!(first_added_line(diff), Some("if (!p) return -1;"));
    }

    #[test]
    fn test_first_added_line_skips_bare_plus() {
        let diff = "@@ -3,1 +3,3 @@\n+\n+  x = 0;\n";
        assert_eq!(first_added_line(diff), Some("x = 0;"));
    }

    #[test]
    fn test_first_added_line_absent() {
        assert_eq!(first_added_line("@@ -1,1 +1,0 @@\n-gone\n"), None);
        assert_eq!(first_added_line(""), None);
    }
}
