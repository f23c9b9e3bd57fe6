use std::path::PathBuf;
use std::process::ExitCode;

use beamscan_lib::{
    doa::estimate_doa, error::Result, pattern_chart::PatternChart, scenario::Scenario,
    series_chart::ChartSet,
};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, LevelFilter, SimpleLogger};

/// Simulate a narrowband source in front of a uniform linear array and estimate its direction of
/// arrival with a delay-and-sum beam scan.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level for output (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    loglevel: LevelFilter,

    /// Number of antenna elements
    #[arg(short = 'm', long, default_value = "3")]
    elements: usize,

    /// Element spacing in wavelengths
    #[arg(short, long, default_value = "0.5")]
    spacing: f64,

    /// True arrival angle of the simulated source, degrees
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    doa: f64,

    /// Start of the field of view, degrees
    #[arg(long, default_value = "-45", allow_negative_numbers = true)]
    fov_start: f64,

    /// End of the field of view, degrees
    #[arg(long, default_value = "45", allow_negative_numbers = true)]
    fov_end: f64,

    /// Number of scan angles across the field of view
    #[arg(long, default_value = "180")]
    points: usize,

    /// Duration of the sample batch, seconds
    #[arg(long, default_value = "0.01")]
    duration: f64,

    /// Deviation of the transmitter noise (per I/Q component)
    #[arg(long, default_value = "0.1")]
    tx_noise: f64,

    /// Deviation of the receiver noise (per I/Q component)
    #[arg(long, default_value = "0.1")]
    rx_noise: f64,

    /// Seed for the noise generator; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for the angular sweep; all cores if omitted
    #[arg(long)]
    threads: Option<usize>,

    /// Write the normalized beam pattern to this SVG file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the real and imaginary parts of the noisy transmitted signal to this SVG file
    #[arg(long)]
    tx_svg: Option<PathBuf>,

    /// Write the signal received on every antenna to this SVG file
    #[arg(long)]
    rx_svg: Option<PathBuf>,

    /// Samples shown in the waveform charts
    #[arg(long, default_value = "100")]
    waveform_samples: usize,

    /// Print the normalized spectrum, one angle per line
    #[arg(long, default_value = "false")]
    print_spectrum: bool,
}

impl Cli {
    fn scenario(&self) -> Scenario {
        Scenario {
            duration: self.duration,
            tx_noise: self.tx_noise,
            rx_noise: self.rx_noise,
            element_count: self.elements,
            spacing: self.spacing,
            true_doa: self.doa,
            fov_start: self.fov_start,
            fov_end: self.fov_end,
            scan_points: self.points,
            ..Scenario::default()
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let scenario = cli.scenario();
    let geometry = scenario.geometry()?;
    let scan = scenario.scan()?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let realization = scenario.realize(rng)?;

    if let Some(path) = &cli.tx_svg {
        ChartSet::transmitted(
            realization.time.view(),
            realization.tx.view(),
            cli.waveform_samples,
        )
        .render_svg(path, (800, 400))?;
    }
    if let Some(path) = &cli.rx_svg {
        ChartSet::received(
            realization.time.view(),
            realization.rx.view(),
            cli.waveform_samples,
        )
        .render_svg(path, (800, 400))?;
    }

    let (estimate, spectrum) = estimate_doa(realization.rx.view(), &geometry, &scan)?;
    println!("Estimated DOA: {:.3} degrees", estimate.degrees());
    log::info!(
        "True DOA {}°, error {:.3}°, scan resolution {:.3}°",
        scenario.true_doa,
        estimate.degrees() - scenario.true_doa,
        scan.resolution().to_degrees()
    );

    if cli.print_spectrum {
        for (deg, p) in scan.degrees().iter().zip(spectrum.normalized().iter()) {
            println!("{:8.3} {:.6}", deg, p);
        }
    }

    if let Some(path) = &cli.svg {
        PatternChart::new(&scan, &spectrum)
            .with_estimate(&estimate)
            .render_svg(path, (800, 400))?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::init(cli.loglevel, Config::default()) {
        eprintln!("Could not set up logging: {}", e);
    }

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            log::error!("Failed to configure sweep thread pool: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
