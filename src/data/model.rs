// ---------------------------------------------------------------------------
// SpikeRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single detected spike (one row of the source CSV).
#[derive(Debug, Clone)]
pub struct SpikeRecord {
    /// Value of the `Index` column.
    pub index: i64,
    /// Recording channel that produced the spike.
    pub channel: i64,
    /// Peak amplitude in microvolts.
    pub amplitude: f64,
    /// Spike number within its channel.
    pub spike_idx: i64,
    /// Amplitude samples describing the spike shape.
    pub waveform: Vec<f64>,
    /// Sample timestamps in seconds. Well-formed inputs pair one timestamp
    /// per waveform sample; a mismatch surfaces at render time, not here.
    pub timestamps: Vec<f64>,
}

// ---------------------------------------------------------------------------
// SpikeDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset, in file order, immutable after load.
#[derive(Debug, Clone)]
pub struct SpikeDataset {
    /// All spikes (rows).
    pub spikes: Vec<SpikeRecord>,
}

impl SpikeDataset {
    pub fn from_records(spikes: Vec<SpikeRecord>) -> Self {
        SpikeDataset { spikes }
    }

    /// Number of spikes.
    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SaveMetadata – the fields encoded into an output filename
// ---------------------------------------------------------------------------

/// Metadata captured at the moment a figure is saved, used only to build the
/// output filename.
///
/// `row` is the dataset row position, not the `Index` column: resuming a
/// session depends on parsing the row position back out of the filename.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveMetadata {
    pub row: usize,
    pub channel: i64,
    pub spike_idx: i64,
    pub amplitude: f64,
}

impl SaveMetadata {
    /// Capture the filename fields for the spike at dataset row `row`.
    pub fn for_row(row: usize, spike: &SpikeRecord) -> Self {
        SaveMetadata {
            row,
            channel: spike.channel,
            spike_idx: spike.spike_idx,
            amplitude: spike.amplitude,
        }
    }
}
