/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv (flattened Waveform_*/Timestamps_* columns)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + re-assemble families → SpikeDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpikeDataset │  Vec<SpikeRecord>, file order, immutable
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
