use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::render::SpikeFigure;
use crate::data::model::SaveMetadata;

// ---------------------------------------------------------------------------
// Filename grammar
// ---------------------------------------------------------------------------

/// Build the output filename for a saved figure:
/// `No<row>_Ch<channel>_SpkNo<spike_idx>_Amp<amplitude><ext>`, with the
/// amplitude rounded to the nearest integer and `ext` carrying its leading
/// dot. The leading `No<row>` token is what the inventory scan parses back.
pub fn figure_filename(meta: &SaveMetadata, ext: &str) -> String {
    format!(
        "No{}_Ch{}_SpkNo{}_Amp{}{}",
        meta.row,
        meta.channel,
        meta.spike_idx,
        meta.amplitude.round() as i64,
        ext
    )
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `figure` into `dir` under its metadata-derived name and return the
/// full path. An existing file of the same name is overwritten; IO failures
/// propagate, since a half-saved session is worse than a stopped one.
pub fn save_figure(
    dir: &Path,
    figure: &SpikeFigure,
    meta: &SaveMetadata,
    ext: &str,
) -> Result<PathBuf> {
    let path = dir.join(figure_filename(meta, ext));
    std::fs::write(&path, &figure.svg)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
