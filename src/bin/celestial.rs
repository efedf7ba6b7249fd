use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use flexi_logger::{Logger, LoggerHandle};
use log::error;

use celestial::{
    celestial::Celestial,
    config::CelestialConfig,
    fields::{names, FieldValue, OutputRecord},
    jpl_ephem::{download_jpl_file::get_ephemeris_file, naif::naif_data::NaifData},
    units::{observation_group, UnitSystem},
};

#[derive(Parser)]
#[command(name = "celestial", about = "Celestial fields for weather station loop packets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version
    Version,
    /// Run one cycle on a synthetic packet and check every field
    Test {
        /// TOML file with a [celestial] section
        #[arg(long)]
        config: Utf8PathBuf,
        /// Unix timestamp of the packet (default: now)
        #[arg(long)]
        timestamp: Option<f64>,
        /// Outside temperature, °C
        #[arg(long)]
        temperature: Option<f64>,
        /// Barometer, mbar
        #[arg(long)]
        pressure: Option<f64>,
        /// Unit system of the packet: us, metric or metricwx
        #[arg(long, default_value = "metric")]
        units: UnitSystem,
    },
    /// Print the header and segments of an ephemeris file
    Info {
        /// Kernel path or NAIF version name (DE421, DE440, ...)
        #[arg(long)]
        ephemeris: String,
    },
}

/// Log to stderr, level from `RUST_LOG` or `info`.
fn setup_logging() -> Option<LoggerHandle> {
    match Logger::try_with_env_or_str("info").and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Logger initialization failed with {err}");
            None
        }
    }
}

/// Every added field, with the type the host expects.
fn check_fields(record: &OutputRecord) -> Vec<String> {
    let numeric = names::NUMERIC_FIELDS.iter().filter_map(|name| match record.get(name) {
        Some(FieldValue::Float(_)) => None,
        Some(other) => Some(format!("{name}: expected a float, found {other}")),
        None => Some(format!("{name}: missing")),
    });
    let text = names::TEXT_FIELDS.iter().filter_map(|name| match record.get(name) {
        Some(FieldValue::Text(_)) => None,
        Some(other) => Some(format!("{name}: expected a string, found {other}")),
        None => Some(format!("{name}: missing")),
    });
    numeric.chain(text).collect()
}

fn run_test(
    config: &Utf8PathBuf,
    timestamp: Option<f64>,
    temperature: Option<f64>,
    pressure: Option<f64>,
    units: UnitSystem,
) -> Result<bool, celestial::celestial_errors::CelestialError> {
    let mut config = CelestialConfig::from_file(config)?;
    config.enable = true;
    let service = Celestial::start(config);

    let unix = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp() as f64);
    let record = service.compute(unix, units, temperature, pressure)?;

    for (name, value) in record.iter() {
        let group = observation_group(name).map(|g| g.as_str()).unwrap_or("-");
        println!("{name:<28} {value:<24} {group}");
    }

    let problems = check_fields(&record);
    for problem in &problems {
        println!("FAIL {problem}");
    }
    Ok(problems.is_empty())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = setup_logging();

    match cli.command {
        Commands::Version => {
            println!("celestial {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::Test {
            config,
            timestamp,
            temperature,
            pressure,
            units,
        } => match run_test(&config, timestamp, temperature, pressure, units) {
            Ok(true) => {
                println!("PASS");
                ExitCode::SUCCESS
            }
            Ok(false) => ExitCode::FAILURE,
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        },
        Commands::Info { ephemeris } => {
            match get_ephemeris_file(&ephemeris).and_then(|path| NaifData::read_naif_file(&path)) {
                Ok(data) => {
                    println!("{data}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
