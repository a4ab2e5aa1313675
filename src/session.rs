use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use crate::data::model::{SaveMetadata, SpikeDataset};
use crate::figure::persist::save_figure;
use crate::figure::render::{render_spike, PlotStyle};
use crate::inventory::scan_saved;

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

const PROMPT: &str = "{Enter} to continue, {s} to save plot, {x} to exit";

/// What the operator asked for at a prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Continue,
    Save,
    Exit,
}

/// Anything other than `s` or `x` (including an empty line) means continue.
fn parse_decision(line: &str) -> Decision {
    match line.trim() {
        "s" => Decision::Save,
        "x" => Decision::Exit,
        _ => Decision::Continue,
    }
}

// ---------------------------------------------------------------------------
// Session options and report
// ---------------------------------------------------------------------------

/// Everything the loop needs besides the dataset.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory saved figures go to.
    pub save_dir: PathBuf,
    /// Figure file extension, leading dot included.
    pub save_ext: String,
    /// Persist every figure without prompting.
    pub autosave: bool,
    /// Write each rendered figure to the preview file for an external viewer.
    pub show: bool,
    pub style: PlotStyle,
}

/// Outcome of one run.
#[derive(Debug, Default, PartialEq)]
pub struct SessionReport {
    /// Rows saved by an explicit operator decision, in save order.
    /// Autosaved figures are not listed here.
    pub saved: Vec<usize>,
    /// Whether the operator exited before the range was exhausted.
    pub exited_early: bool,
}

// ---------------------------------------------------------------------------
// The loop
// ---------------------------------------------------------------------------

/// Visit each row in `rows`: render it, show it, and either persist it
/// (autosave) or ask the operator what to do. A row that fails to render is
/// reported and skipped; a figure that fails to write ends the run.
pub fn run_session(
    dataset: &SpikeDataset,
    rows: impl IntoIterator<Item = usize>,
    opts: &SessionOptions,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<SessionReport> {
    let mut report = SessionReport::default();

    for row in rows {
        let Some(spike) = dataset.spikes.get(row) else {
            warn!("row {row} is out of range, skipping");
            continue;
        };

        let figure = match render_spike(&spike.timestamps, &spike.waveform, &opts.style) {
            Ok(figure) => figure,
            Err(e) => {
                writeln!(out, "The following error occurred: {e}")?;
                continue;
            }
        };

        if opts.show {
            let preview = figure.show()?;
            info!("preview written to {}", preview.display());
        }
        writeln!(out, "Spike number {row}")?;

        if opts.autosave {
            save_figure(
                &opts.save_dir,
                &figure,
                &SaveMetadata::for_row(row, spike),
                &opts.save_ext,
            )?;
            continue;
        }

        writeln!(out, "{PROMPT}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF on stdin: treat like exit so piped input cannot spin.
            report.exited_early = true;
            break;
        }

        match parse_decision(&line) {
            Decision::Save => {
                save_figure(
                    &opts.save_dir,
                    &figure,
                    &SaveMetadata::for_row(row, spike),
                    &opts.save_ext,
                )?;
                report.saved.push(row);
            }
            Decision::Exit => {
                report.exited_early = true;
                break;
            }
            Decision::Continue => {}
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// End-of-run summary
// ---------------------------------------------------------------------------

/// Re-scan the save directory and print what is on disk and what this
/// session saved.
pub fn print_summary(
    out: &mut impl Write,
    opts: &SessionOptions,
    dataset_len: usize,
    report: &SessionReport,
) -> Result<()> {
    match scan_saved(&opts.save_dir, &opts.save_ext, dataset_len) {
        Some(saved) => {
            writeln!(
                out,
                "\nThe following spikes are currently in {} (total of {}):",
                opts.save_dir.display(),
                saved.existing.len()
            )?;
            writeln!(out, "{:?}", saved.existing)?;
        }
        None => {
            writeln!(
                out,
                "\nNo saved figures found in {}.",
                opts.save_dir.display()
            )?;
        }
    }

    writeln!(
        out,
        "\nThe following spikes were saved this session (total of {}):",
        report.saved.len()
    )?;
    writeln!(out, "{:?}", report.saved)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SpikeRecord;
    use std::io::Cursor;

    fn record(channel: i64, waveform: Vec<f64>, timestamps: Vec<f64>) -> SpikeRecord {
        SpikeRecord {
            index: 0,
            channel,
            amplitude: -40.0,
            spike_idx: 1,
            waveform,
            timestamps,
        }
    }

    /// Three rows; the third has mismatched vector lengths.
    fn dataset() -> SpikeDataset {
        SpikeDataset::from_records(vec![
            record(1, vec![-1.0, 2.0, 0.5], vec![0.0, 0.001, 0.002]),
            record(1, vec![-0.8, 1.5, 0.2], vec![0.0, 0.001, 0.002]),
            record(2, vec![-1.0, 2.0], vec![0.0]),
        ])
    }

    fn options(dir: &std::path::Path) -> SessionOptions {
        SessionOptions {
            save_dir: dir.to_path_buf(),
            save_ext: ".svg".to_string(),
            autosave: false,
            show: false,
            style: PlotStyle::default(),
        }
    }

    #[test]
    fn exit_stops_before_later_rows_are_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(b"\nx\n".to_vec());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &options(dir.path()), &mut input, &mut out)
            .unwrap();

        assert_eq!(report.saved, Vec::<usize>::new());
        assert!(report.exited_early);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Spike number 1"));
        assert!(!printed.contains("Spike number 2"));
        assert!(!printed.contains("error occurred"));
    }

    #[test]
    fn render_failure_is_logged_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(b"\n\n\n".to_vec());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &options(dir.path()), &mut input, &mut out)
            .unwrap();

        assert_eq!(report.saved, Vec::<usize>::new());
        assert!(!report.exited_early);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("The following error occurred"));
    }

    #[test]
    fn save_writes_the_figure_and_records_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(b"s\nx\n".to_vec());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &options(dir.path()), &mut input, &mut out)
            .unwrap();

        assert_eq!(report.saved, vec![0]);
        assert!(dir.path().join("No0_Ch1_SpkNo1_Amp-40.svg").exists());
    }

    #[test]
    fn unrecognised_input_means_continue() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(b"q\nx\n".to_vec());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &options(dir.path()), &mut input, &mut out)
            .unwrap();

        assert_eq!(report.saved, Vec::<usize>::new());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn autosave_persists_everything_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let opts = SessionOptions {
            autosave: true,
            ..options(dir.path())
        };
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &opts, &mut input, &mut out).unwrap();

        // Rows 0 and 1 are written; row 2 fails to render. The session list
        // only tracks explicit operator saves.
        assert_eq!(report.saved, Vec::<usize>::new());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn eof_on_input_behaves_like_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &options(dir.path()), &mut input, &mut out)
            .unwrap();
        assert!(report.exited_early);
    }

    #[test]
    fn summary_reports_disk_inventory_and_session_list() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let mut input = Cursor::new(b"s\nx\n".to_vec());
        let mut out = Vec::new();

        let report = run_session(&dataset(), 0..3, &opts, &mut input, &mut out).unwrap();
        print_summary(&mut out, &opts, 3, &report).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("(total of 1):\n[0]"));
        assert!(printed.contains("saved this session (total of 1):\n[0]"));
    }

    #[test]
    fn summary_with_empty_directory_reports_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let mut out = Vec::new();

        print_summary(&mut out, &opts, 3, &SessionReport::default()).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("No saved figures found"));
    }
}
