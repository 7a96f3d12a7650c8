//! Write a folder of synthetic measurement files plus a matching config file.
//!
//! Each fiber is driven by a toy auto-integration controller: whenever the
//! peak leaves the target range the next measurement uses a rescaled
//! integration time, so the folder exercises the success analysis.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use flame_analysis::config::{AnalysisConfig, DEFAULT_CONFIG_FILE};

const NR_PIXELS: usize = 3669;
const INTEGRATION_TIME_LIMIT: i64 = 1_000_000;
const LOWER_BOUNDARY: i32 = 40_000;
const UPPER_BOUNDARY: i32 = 60_000;
const SATURATION: f64 = 65_535.0;

#[derive(Parser)]
#[command(name = "generate_sample", about = "Write synthetic spectrometer measurements")]
struct Args {
    /// Output folder (created if missing).
    #[arg(default_value = "sample_data")]
    output: PathBuf,

    /// Measurements per fiber.
    #[arg(long, default_value_t = 40)]
    count: usize,

    /// Number of fibers.
    #[arg(long, default_value_t = 2)]
    fibers: i32,

    /// Where to write the matching config; kept out of the measurement folder.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Counts per pixel for a flame emission spectrum at the given brightness.
fn generate_spectrum(wavelengths: &[f64], brightness: f64, rng: &mut SimpleRng) -> Vec<i32> {
    // sodium, potassium and a broad OH/continuum band
    let peaks = [(589.0, 1.5, 1.0), (766.5, 2.0, 0.45), (310.0, 12.0, 0.2)];
    wavelengths
        .iter()
        .map(|&wl| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, rel)| gaussian(wl, mu, sigma, rel * brightness))
                .sum();
            let counts = 1200.0 + signal + rng.gauss(0.0, 25.0);
            counts.clamp(0.0, SATURATION) as i32
        })
        .collect()
}

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

/// Render a measurement the way the instrument dumps it: comma separated
/// values with a line break every 16 samples.
fn render_content(integration_time_us: i64, pixel_mode: i32, data: &[i32]) -> String {
    let header = [2, 1, 1, (integration_time_us / 1000) as i32, 1180, 1175, pixel_mode];
    let mut lines = vec![format!("{};", join_values(&header))];
    lines.extend(data.chunks(16).map(|chunk| format!("{},", join_values(chunk))));
    lines.push("3;".to_string());
    lines.join("\r\n") + "\r\n"
}

fn join_values(values: &[i32]) -> String {
    values.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
}

fn file_name(ts: NaiveDateTime, fiber: i32, integration_time_us: i64) -> String {
    format!(
        "{}-F{fiber}-i{integration_time_us}.txt",
        ts.format("%Y%m%dT%H%M%S")
    )
}

fn write_measurements(args: &Args, wavelengths: &[f64], rng: &mut SimpleRng) -> Result<usize> {
    let start = NaiveDate::from_ymd_opt(2026, 1, 21)
        .and_then(|d| d.and_hms_opt(14, 30, 0))
        .context("invalid start timestamp")?;
    let target = f64::from(LOWER_BOUNDARY + UPPER_BOUNDARY) / 2.0;

    let mut integration = vec![20_000i64; args.fibers.max(0) as usize];
    let mut brightness = vec![2.0f64; integration.len()];
    let mut written = 0;

    for step in 0..args.count {
        for (f, (int_us, light)) in integration.iter_mut().zip(&mut brightness).enumerate() {
            let fiber = f as i32 + 1;
            // flame intensity drifts between measurements
            *light = (*light * (1.0 + rng.gauss(0.0, 0.15))).clamp(0.2, 20.0);

            let amplitude = *light * *int_us as f64;
            let data = generate_spectrum(wavelengths, amplitude, rng);
            let ts = start + Duration::seconds((step as i64) * 10 + f as i64);
            let path = args.output.join(file_name(ts, fiber, *int_us));
            fs::write(&path, render_content(*int_us, 0, &data))
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;

            let peak = data.iter().copied().max().unwrap_or(0);
            if !(LOWER_BOUNDARY..UPPER_BOUNDARY).contains(&peak) {
                let rescaled = (*int_us as f64 * target / f64::from(peak.max(1))) as i64;
                *int_us = rescaled.clamp(1_000, INTEGRATION_TIME_LIMIT);
            }
        }
    }
    Ok(written)
}

/// A handful of files the parser must reject or flag.
fn write_broken(dir: &Path) -> Result<usize> {
    let mut non_utf8 = b"2, 1, 1, 20, 1180, 1175, 0, ".to_vec();
    non_utf8.extend_from_slice(&[0xff, 0xfe]);
    non_utf8.extend_from_slice(b" 100, 200, 3");

    let files: [(&str, Vec<u8>); 4] = [
        ("20260121T150000-F1-i20000.txt", b"2, 1, 1, 20;\r\n".to_vec()),
        ("2026-01-21_broken-F1-i20000.txt", render_content(20_000, 0, &[1, 2, 3]).into_bytes()),
        ("20260121T150002-F2-i20000.txt", non_utf8),
        ("20260121T150003-F2-i20000.txt", render_content(20_000, 1, &[5; 32]).into_bytes()),
    ];
    for (name, content) in &files {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(files.len())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    // 200 nm → ~1025 nm, evenly spaced
    let wavelengths: Vec<f64> = (0..NR_PIXELS).map(|i| 200.0 + i as f64 * 0.225).collect();

    let good = write_measurements(&args, &wavelengths, &mut rng)?;
    let broken = write_broken(&args.output)?;

    let config = AnalysisConfig {
        nr_pixels: NR_PIXELS,
        integration_time_limit: INTEGRATION_TIME_LIMIT,
        lower_boundary: LOWER_BOUNDARY,
        upper_boundary: UPPER_BOUNDARY,
        encoding: "utf-8".to_string(),
        wavelengths: Some(wavelengths),
    };
    let json = serde_json::to_string_pretty(&config).context("serializing config")?;
    fs::write(&args.config, json)
        .with_context(|| format!("writing {}", args.config.display()))?;

    println!(
        "Wrote {good} measurements ({NR_PIXELS} pixels each) and {broken} broken files to {}",
        args.output.display()
    );
    println!("Config: {}", args.config.display());
    Ok(())
}
