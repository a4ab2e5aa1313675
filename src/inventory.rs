use std::ops::Range;
use std::path::Path;

use log::warn;

// ---------------------------------------------------------------------------
// Saved-figure inventory
// ---------------------------------------------------------------------------

/// Figures already on disk, plus the rows a resumed session still has to
/// visit.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFigures {
    /// Row indices of saved figures, ascending (listing order is not).
    pub existing: Vec<usize>,
    /// Rows after the highest saved figure, up to the dataset length.
    pub remaining: Range<usize>,
}

/// Scan `dir` for figure files ending in `ext` and recover their row indices.
///
/// Returns `None` when the directory is unreadable, holds no matching files,
/// or a matching name does not follow the `No<row>_...` pattern, so callers
/// can tell "start from scratch" apart from "resume after row K". Never
/// raises; both results come from the single scan.
pub fn scan_saved(dir: &Path, ext: &str, last_idx: usize) -> Option<SavedFigures> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read {}: {e}", dir.display());
            return None;
        }
    };

    let mut existing = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(ext) {
            continue;
        }
        match parse_row_index(&name) {
            Some(row) => existing.push(row),
            None => {
                warn!("unparsable figure name '{name}' in {}", dir.display());
                return None;
            }
        }
    }

    let &highest = existing.iter().max()?;
    existing.sort_unstable();

    Some(SavedFigures {
        existing,
        remaining: (highest + 1)..last_idx,
    })
}

/// Recover the row index from a figure filename.
///
/// Deliberately narrow: take the first `_`-separated token (`No<row>`),
/// split at the first `o`, parse what follows. Resume logic depends on
/// exactly this shape; do not generalise it.
fn parse_row_index(name: &str) -> Option<usize> {
    let token = name.split('_').next()?;
    let (_, digits) = token.split_once('o')?;
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"<svg/>").unwrap();
    }

    #[test]
    fn sorts_existing_and_computes_continuation() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "No3_Ch1_SpkNo2_Amp40.svg");
        touch(dir.path(), "No1_Ch1_SpkNo7_Amp38.svg");
        touch(dir.path(), "No9_Ch2_SpkNo1_Amp41.svg");

        let saved = scan_saved(dir.path(), ".svg", 12).unwrap();
        assert_eq!(saved.existing, vec![1, 3, 9]);
        assert_eq!(saved.remaining.collect::<Vec<_>>(), vec![10, 11]);
    }

    #[test]
    fn empty_directory_is_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(scan_saved(dir.path(), ".svg", 12), None);
    }

    #[test]
    fn missing_directory_is_the_sentinel() {
        assert_eq!(scan_saved(Path::new("no/such/dir"), ".svg", 12), None);
    }

    #[test]
    fn unparsable_matching_name_is_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "No4_Ch1_SpkNo2_Amp40.svg");
        touch(dir.path(), "notes.svg");
        assert_eq!(scan_saved(dir.path(), ".svg", 12), None);
    }

    #[test]
    fn non_matching_extensions_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "No2_Ch1_SpkNo5_Amp40.svg");
        touch(dir.path(), "readme.txt");

        let saved = scan_saved(dir.path(), ".svg", 5).unwrap();
        assert_eq!(saved.existing, vec![2]);
        assert_eq!(saved.remaining, 3..5);
    }

    #[test]
    fn all_rows_saved_leaves_nothing_remaining() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "No1_Ch1_SpkNo1_Amp40.svg");

        let saved = scan_saved(dir.path(), ".svg", 2).unwrap();
        assert!(saved.remaining.is_empty());
    }

    #[test]
    fn row_index_parsing_is_the_narrow_contract() {
        assert_eq!(parse_row_index("No7_Ch2_SpkNo15_Amp124.svg"), Some(7));
        assert_eq!(parse_row_index("No130_Ch2_SpkNo15_Amp124.svg"), Some(130));
        assert_eq!(parse_row_index("fig7_Ch2.svg"), None);
    }
}
