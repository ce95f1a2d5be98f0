//! combfx - comb filter command line
//!
//! Run with: cargo run -- process input.wav output.wav --kind iir

mod view;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use combfx::{
    compare::{compare_files, plot::write_plot},
    dsp::response::{bin_frequency, extrema, magnitude_response},
    process_file, CombKind, CombParams, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "combfx", about = "FIR and IIR comb filters for WAV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a WAV file and write 16-bit PCM
    Process {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Difference two WAV files with the same rate and shape
    Compare {
        left: PathBuf,
        right: PathBuf,
        /// Write one chart per channel of the difference to this text file
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Plot title, defaults to the two file names
        #[arg(long)]
        title: Option<String>,
        /// Fail if any sample differs by more than this
        #[arg(long)]
        tolerance: Option<f32>,
    },
    /// Show the difference of two WAV files in the terminal
    View { left: PathBuf, right: PathBuf },
    /// Print the strongest peaks and nulls of a comb's magnitude response
    Response {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 8192)]
        fft_len: usize,
        /// How many peaks and nulls to list
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Exactly "fir", anything else selects the IIR filter
    #[arg(long, default_value_t = CombKind::Fir)]
    kind: CombKind,
    /// Operating sample rate in Hz; the input is resampled to it
    #[arg(long, default_value_t = CombParams::default().sample_rate)]
    sample_rate: u32,
    #[arg(long, default_value_t = CombParams::default().gain, allow_negative_numbers = true)]
    gain: f32,
    /// Delay in seconds
    #[arg(long, default_value_t = CombParams::default().delay_sec)]
    delay: f64,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Process {
            input,
            output,
            filter,
        } => {
            let config = PipelineConfig::new(input, output)
                .with_kind(filter.kind)
                .with_sample_rate(filter.sample_rate)
                .with_gain(filter.gain)
                .with_delay(filter.delay);

            let report = process_file(&config).wrap_err_with(|| {
                format!("failed to process {}", config.input.display())
            })?;

            println!(
                "{} comb -> {} ({} channel(s), {} frames @ {} Hz, delay {} samples)",
                config.kind,
                config.output.display(),
                report.num_channels,
                report.frames,
                report.output_sample_rate,
                report.delay_samples
            );
            if report.resampled {
                println!(
                    "Resampled from {} Hz before filtering",
                    report.input_sample_rate
                );
            }
            if report.clipped > 0 {
                println!("Clipped samples: {}", report.clipped);
            }
        }
        Commands::Compare {
            left,
            right,
            plot,
            title,
            tolerance,
        } => {
            let diff = compare_files(&left, &right).wrap_err("comparison failed")?;

            println!("=== {} vs {} ===", left.display(), right.display());
            println!("Sample rate: {} Hz", diff.sample_rate);
            for (i, stats) in diff.stats.iter().enumerate() {
                println!(
                    "  Channel {}: peak {:.6} (frame {}), rms {:.6}",
                    i + 1,
                    stats.peak,
                    stats.peak_index,
                    stats.rms
                );
            }

            if let Some(path) = plot {
                let title = title
                    .unwrap_or_else(|| format!("{} - {}", left.display(), right.display()));
                write_plot(&path, &diff, &title)
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                println!("Plot: {}", path.display());
            }

            if let Some(tolerance) = tolerance {
                if !diff.within(tolerance) {
                    bail!(
                        "peak difference {} exceeds tolerance {}",
                        diff.peak(),
                        tolerance
                    );
                }
            }
        }
        Commands::View { left, right } => {
            let diff = compare_files(&left, &right).wrap_err("comparison failed")?;
            let title = format!("{} - {}", left.display(), right.display());
            view::run(diff, title)?;
        }
        Commands::Response {
            filter,
            fft_len,
            count,
        } => {
            let params = CombParams::new(filter.sample_rate, filter.gain, filter.delay);
            let delay = params.delay_samples()?;
            let mags = magnitude_response(filter.kind, filter.gain, delay, fft_len)?;

            println!(
                "{} comb, gain {}, delay {} samples @ {} Hz",
                filter.kind, filter.gain, delay, filter.sample_rate
            );
            for (label, peaks) in [("Peaks", true), ("Nulls", false)] {
                println!("{}:", label);
                for bin in extrema(&mags, peaks, count) {
                    let db = 20.0 * mags[bin].max(1e-9).log10();
                    println!(
                        "  {:>10.2} Hz  {:>8.2} dB",
                        bin_frequency(bin, fft_len, filter.sample_rate),
                        db
                    );
                }
            }
        }
    }

    Ok(())
}
