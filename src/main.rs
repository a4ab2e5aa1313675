mod data;
mod figure;
mod inventory;
mod session;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use data::loader::load_csv;
use figure::render::PlotStyle;
use inventory::scan_saved;
use session::{print_summary, run_session, SessionOptions};

/// Browse spike waveforms from a CSV table and export selected figures.
#[derive(Parser)]
#[command(name = "rusty-spikes")]
#[command(about = "Interactive spike waveform viewer and figure exporter")]
struct Args {
    /// Input CSV file, one spike per row
    #[arg(default_value = "spike_data_filtered.csv")]
    input: PathBuf,

    /// Directory figures are saved to (created if missing)
    #[arg(short, long, default_value = "Figures")]
    out_dir: PathBuf,

    /// Figure file extension, including the dot
    #[arg(long, default_value = ".svg")]
    ext: String,

    /// Which rows to visit
    #[arg(long, value_enum, default_value = "all")]
    range: RangeMode,

    /// Save every figure without prompting
    #[arg(long)]
    autosave: bool,

    /// Skip writing the per-spike preview file
    #[arg(long)]
    no_show: bool,

    /// Output resolution in dots per inch
    #[arg(long, default_value_t = 300)]
    dpi: u32,

    /// Paint the figure background white instead of leaving it transparent
    #[arg(long)]
    opaque: bool,
}

/// Row-range selection: everything, re-visit already-saved figures, or pick
/// up after the last saved one.
#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum RangeMode {
    All,
    Saved,
    Continue,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = load_csv(&args.input)?;
    info!(
        "loaded {} spikes from {}",
        dataset.len(),
        args.input.display()
    );

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let rows: Vec<usize> = match args.range {
        RangeMode::All => (0..dataset.len()).collect(),
        RangeMode::Saved => match scan_saved(&args.out_dir, &args.ext, dataset.len()) {
            Some(saved) => saved.existing,
            None => {
                println!(
                    "No saved figures found in {}. Nothing to re-visit.",
                    args.out_dir.display()
                );
                Vec::new()
            }
        },
        RangeMode::Continue => match scan_saved(&args.out_dir, &args.ext, dataset.len()) {
            Some(saved) => saved.remaining.collect(),
            // Nothing saved yet: resuming means starting from the top.
            None => (0..dataset.len()).collect(),
        },
    };

    let opts = SessionOptions {
        save_dir: args.out_dir,
        save_ext: args.ext,
        autosave: args.autosave,
        show: !args.no_show,
        style: PlotStyle {
            dpi: args.dpi,
            transparent: !args.opaque,
            ..PlotStyle::default()
        },
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let report = run_session(&dataset, rows, &opts, &mut input, &mut out)?;
    print_summary(&mut out, &opts, dataset.len(), &report)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// End-to-end test: load → session → save → rescan
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn full_flow_from_csv_to_saved_figure_and_resume_range() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("spikes.csv");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(
            file,
            "Index,Channel,Amplitude,Spike_Idx,Waveform_1,Waveform_2,Waveform_3,\
             Timestamps_1,Timestamps_2,Timestamps_3"
        )
        .unwrap();
        for row in 0..4 {
            writeln!(
                file,
                "{row},1,-40.5,{row},-1.0,2.0,0.5,0.0,0.001,0.002"
            )
            .unwrap();
        }

        let dataset = load_csv(&csv_path).unwrap();
        assert_eq!(dataset.len(), 4);

        let save_dir = dir.path().join("Figures");
        std::fs::create_dir_all(&save_dir).unwrap();
        let opts = SessionOptions {
            save_dir: save_dir.clone(),
            save_ext: ".svg".to_string(),
            autosave: false,
            show: false,
            style: PlotStyle::default(),
        };

        // Save rows 0 and 1, then exit.
        let mut input = Cursor::new(b"s\ns\nx\n".to_vec());
        let mut out = Vec::new();
        let report = run_session(&dataset, 0..4, &opts, &mut input, &mut out).unwrap();
        assert_eq!(report.saved, vec![0, 1]);

        // A resumed session picks up right after the highest saved row.
        let saved = scan_saved(&save_dir, ".svg", dataset.len()).unwrap();
        assert_eq!(saved.existing, vec![0, 1]);
        assert_eq!(saved.remaining.collect::<Vec<_>>(), vec![2, 3]);
    }
}
