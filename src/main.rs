//! SA818 configuration CLI
//!
//! Usage:
//!   sa818 --device /dev/ttyUSB0 --tx-frequency 145.525 --rx-frequency 145.525 --volume 6
//!   sa818 --dry-run --filter 1,1,1

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sa818::api::{JsonFormatter, SessionReport, TextFormatter};
use sa818::core::{Band, Bandwidth, ConfigurationProfile, FilterConfig, Frequency, SubAudioCode};
use sa818::hardware::{Channel, SerialChannel, SerialSettings};
use sa818::processing::MarkerPolicy;
use sa818::session::{apply_profile, query_rssi, query_version, RunOptions};
use sa818::utils::{FileProfileStore, ProfileStore};
use sa818::validation::ProfileValidator;

/// Configure an SA818 radio module over its serial AT command interface.
///
/// Fields not given on the command line are taken from the last
/// successfully applied configuration.
#[derive(Parser)]
#[command(name = "sa818", version, about)]
struct Cli {
    /// Serial device the module is attached to
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Module variant (vhf or uhf); frequencies outside it are refused
    #[arg(long)]
    band: Option<Band>,

    /// Channel bandwidth: 0/narrow or 1/wide
    #[arg(short, long)]
    bandwidth: Option<Bandwidth>,

    /// Transmit frequency in MHz
    #[arg(long)]
    tx_frequency: Option<Frequency>,

    /// Receive frequency in MHz
    #[arg(long)]
    rx_frequency: Option<Frequency>,

    /// Transmit sub-audio code (0000 for none)
    #[arg(long)]
    tx_sub: Option<SubAudioCode>,

    /// Receive sub-audio code (0000 for none)
    #[arg(long)]
    rx_sub: Option<SubAudioCode>,

    /// Squelch level 0-8
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=8))]
    squelch: Option<u8>,

    /// Frequency to scan for a carrier, in MHz
    #[arg(long)]
    scan_frequency: Option<Frequency>,

    /// Volume 1-8
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    volume: Option<u8>,

    /// Filter flags as emphasis,high-pass,low-pass (each 0 or 1)
    #[arg(short, long)]
    filter: Option<FilterConfig>,

    /// File holding the last applied configuration
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Print the generated commands instead of sending them
    #[arg(long, visible_alias = "debug")]
    dry_run: bool,

    /// Query the received signal strength and exit
    #[arg(long)]
    rssi: bool,

    /// Query the module firmware version and exit
    #[arg(long)]
    version_query: bool,

    /// Accept any reply containing a '0' as success
    #[arg(long)]
    lenient: bool,

    /// Print the session report as JSON
    #[arg(long)]
    json: bool,

    /// Quiet time around each command, in milliseconds
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Per-read timeout, in milliseconds
    #[arg(long, default_value_t = 500)]
    read_timeout_ms: u64,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overlay command line values on a base profile
    fn merge_into(&self, mut profile: ConfigurationProfile) -> ConfigurationProfile {
        if let Some(bandwidth) = self.bandwidth {
            profile.bandwidth = bandwidth;
        }
        if let Some(frequency) = self.tx_frequency {
            profile.tx_frequency = frequency;
        }
        if let Some(frequency) = self.rx_frequency {
            profile.rx_frequency = frequency;
        }
        if let Some(code) = &self.tx_sub {
            profile.tx_sub_audio = code.clone();
        }
        if let Some(code) = &self.rx_sub {
            profile.rx_sub_audio = code.clone();
        }
        if let Some(squelch) = self.squelch {
            profile.squelch = squelch;
        }
        if let Some(frequency) = self.scan_frequency {
            profile.scan_frequency = frequency;
        }
        if let Some(volume) = self.volume {
            profile.volume = volume;
        }
        if let Some(filter) = self.filter {
            profile.filter = filter;
        }
        profile
    }

    /// Refuse profiles that do not fit the module variant given with `--band`
    fn check_band(&self, profile: &ConfigurationProfile) -> anyhow::Result<()> {
        if let Some(band) = self.band {
            ProfileValidator::for_band(band)
                .validate(profile)
                .with_context(|| format!("profile does not fit a {} module", band))?;
        }
        Ok(())
    }

    fn run_options(&self) -> RunOptions {
        let policy = if self.lenient {
            MarkerPolicy::Lenient
        } else {
            MarkerPolicy::Strict
        };

        RunOptions {
            dry_run: self.dry_run,
            ..Default::default()
        }
        .with_settle_delay(Duration::from_millis(self.settle_ms))
        .with_marker_policy(policy)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.run_options();

    let mut port = if options.dry_run {
        None
    } else {
        let settings = SerialSettings {
            read_timeout_ms: cli.read_timeout_ms,
            ..Default::default()
        };
        let port = SerialChannel::open(&cli.device, &settings)
            .with_context(|| format!("cannot use serial device {}", cli.device))?;
        Some(port)
    };

    if cli.rssi || cli.version_query {
        let mut answered = true;
        if cli.version_query {
            let channel = port.as_mut().map(|p| p as &mut dyn Channel);
            match query_version(channel, &options)? {
                Some(version) => println!("firmware: {}", version),
                None => answered = options.dry_run,
            }
        }
        if cli.rssi {
            let channel = port.as_mut().map(|p| p as &mut dyn Channel);
            match query_rssi(channel, &options)? {
                Some(rssi) => println!("rssi: {}", rssi),
                None => answered = answered && options.dry_run,
            }
        }
        return Ok(if answered { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let mut store = FileProfileStore::new(
        cli.state_file
            .clone()
            .unwrap_or_else(FileProfileStore::default_path),
    );
    let saved = store.load().unwrap_or_else(|e| {
        warn!("ignoring saved configuration: {}", e);
        ConfigurationProfile::default()
    });
    let profile = cli.merge_into(saved);
    cli.check_band(&profile)?;

    let channel = port.as_mut().map(|p| p as &mut dyn Channel);
    let result = apply_profile(channel, &profile, &options, &mut store)?;

    let device = if options.dry_run { "dry run" } else { cli.device.as_str() };
    let report = SessionReport {
        device,
        profile: &profile,
        result: &result,
    };
    if cli.json {
        println!("{}", JsonFormatter::pretty().format_json(&report)?);
    } else {
        print!("{}", TextFormatter::with_replies().format_report(&report));
    }

    Ok(if result.overall_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
