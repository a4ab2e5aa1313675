use std::path::Path;

use anyhow::{Context, Result};

use super::model::{SpikeDataset, SpikeRecord};

/// Header prefix of the flattened waveform sample columns.
const WAVEFORM_PREFIX: &str = "Waveform";
/// Header prefix of the flattened timestamp columns.
const TIMESTAMP_PREFIX: &str = "Timestamps";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a spike dataset from a CSV file.
///
/// Expected layout: header row with `Index`, `Channel`, `Amplitude`,
/// `Spike_Idx` plus two families of numbered scalar columns
/// (`Waveform_1..k`, `Timestamps_1..k`) left behind by the exporter that
/// flattened the vector fields. The families are re-assembled here into one
/// waveform vector and one timestamp vector per row; `k` is whatever number
/// of matching columns the file carries. An absent family yields empty
/// vectors rather than an error.
pub fn load_csv(path: &Path) -> Result<SpikeDataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let index_col = column_position(&headers, "Index")?;
    let channel_col = column_position(&headers, "Channel")?;
    let amplitude_col = column_position(&headers, "Amplitude")?;
    let spike_idx_col = column_position(&headers, "Spike_Idx")?;

    // Family members in header (file) order. Sorting by name would misorder
    // `_10` before `_2`.
    let waveform_cols = family_positions(&headers, WAVEFORM_PREFIX);
    let timestamp_cols = family_positions(&headers, TIMESTAMP_PREFIX);

    let mut spikes = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let index = parse_cell::<i64>(&record, index_col, row_no, "Index")?;
        let channel = parse_cell::<i64>(&record, channel_col, row_no, "Channel")?;
        let amplitude = parse_cell::<f64>(&record, amplitude_col, row_no, "Amplitude")?;
        let spike_idx = parse_cell::<i64>(&record, spike_idx_col, row_no, "Spike_Idx")?;

        let waveform = gather_family(&record, &waveform_cols, row_no, WAVEFORM_PREFIX)?;
        let timestamps = gather_family(&record, &timestamp_cols, row_no, TIMESTAMP_PREFIX)?;

        spikes.push(SpikeRecord {
            index,
            channel,
            amplitude,
            spike_idx,
            waveform,
            timestamps,
        });
    }

    Ok(SpikeDataset::from_records(spikes))
}

// ---------------------------------------------------------------------------
// Header / cell helpers
// ---------------------------------------------------------------------------

fn column_position(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("CSV missing '{name}' column"))
}

/// Positions of all columns whose header starts with `prefix`, in file order.
fn family_positions(headers: &[String], prefix: &str) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(prefix))
        .map(|(i, _)| i)
        .collect()
}

fn parse_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    col: usize,
    row: usize,
    name: &str,
) -> Result<T> {
    let raw = record.get(col).unwrap_or("");
    raw.trim()
        .parse::<T>()
        .ok()
        .with_context(|| format!("Row {row}, {name}: '{raw}' is not a number"))
}

/// Gather one family's cells for a row into an ordered vector.
fn gather_family(
    record: &csv::StringRecord,
    cols: &[usize],
    row: usize,
    prefix: &str,
) -> Result<Vec<f64>> {
    cols.iter()
        .enumerate()
        .map(|(j, &col)| {
            let raw = record.get(col).unwrap_or("");
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row}, {prefix}[{j}]: '{raw}' is not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
