//! Generate a synthetic spike table in the flattened CSV layout the viewer
//! expects, so the tool can be exercised without lab data.

use anyhow::{Context, Result};

/// Samples per waveform snippet.
const SAMPLES: usize = 51;
/// Acquisition rate in Hz.
const SAMPLE_RATE: f64 = 30_000.0;
const CHANNELS: i64 = 4;
const SPIKES_PER_CHANNEL: usize = 10;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn gaussian(t: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(t - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// A biphasic extracellular spike: sharp negative trough followed by a
/// slower positive overshoot, in microvolts.
fn spike_waveform(trough_uv: f64, noise_uv: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let dt = 1.0 / SAMPLE_RATE;
    (0..SAMPLES)
        .map(|i| {
            let t = i as f64 * dt;
            let trough = gaussian(t, 0.4e-3, 0.12e-3, trough_uv);
            let overshoot = gaussian(t, 0.9e-3, 0.25e-3, -0.35 * trough_uv);
            trough + overshoot + rng.gauss(0.0, noise_uv)
        })
        .collect()
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = "spike_data_filtered.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec![
        "Index".to_string(),
        "Channel".to_string(),
        "Amplitude".to_string(),
        "Spike_Idx".to_string(),
    ];
    header.extend((1..=SAMPLES).map(|i| format!("Waveform_{i}")));
    header.extend((1..=SAMPLES).map(|i| format!("Timestamps_{i}")));
    writer.write_record(&header).context("writing header")?;

    let mut index: i64 = 0;
    for channel in 1..=CHANNELS {
        for spike_idx in 0..SPIKES_PER_CHANNEL {
            let trough_uv = -(30.0 + 40.0 * rng.next_f64());
            let waveform = spike_waveform(trough_uv, 1.5, &mut rng);

            // Each snippet sits somewhere in a ten-minute recording.
            let start = rng.next_f64() * 600.0;
            let timestamps: Vec<f64> =
                (0..SAMPLES).map(|i| start + i as f64 / SAMPLE_RATE).collect();

            let amplitude = waveform.iter().cloned().fold(f64::INFINITY, f64::min);

            let mut row = vec![
                index.to_string(),
                channel.to_string(),
                format!("{amplitude:.4}"),
                spike_idx.to_string(),
            ];
            row.extend(waveform.iter().map(|v| format!("{v:.4}")));
            row.extend(timestamps.iter().map(|t| format!("{t:.6}")));
            writer.write_record(&row).context("writing row")?;

            index += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    println!(
        "Wrote {index} spikes ({SAMPLES} samples each) to {output_path}"
    );
    Ok(())
}
