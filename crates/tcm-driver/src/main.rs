//! Command-line tool for poking at a TCM module.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tcm_driver::{CaptureReader, DriverConfig, DriverError, DriverResult, SerialChannel, Tcm};
use tcm_protocol::{AcqParams, CalibrationMode, CalibrationStatus, COMPONENT_HEADING};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tcm", about = "Talk to a PNI Fieldforce TCM compass module")]
struct Cli {
    /// YAML driver config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device, overrides the config file.
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides the config file.
    #[arg(short, long)]
    baud: Option<u32>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print module info, one data sample and the acquisition parameters.
    Info,
    /// Print one data sample.
    Data,
    /// Set the FIR filter tap count and print the filter read back.
    Filter {
        /// Number of taps: 0, 4, 8, 16 or 32.
        count: u8,
    },
    /// Stream heading samples in interval mode.
    Stream {
        /// Number of samples to print.
        #[arg(short, long, default_value_t = 10)]
        samples: usize,
        /// Seconds between samples.
        #[arg(short, long, default_value_t = 0.1)]
        interval: f32,
    },
    /// Run a user calibration and print its scores.
    Calibrate {
        #[arg(short, long, value_enum, default_value_t = CalMode::FullRange)]
        mode: CalMode,
    },
    /// Decode a recording of the module's output without opening a port.
    Replay {
        /// File holding the raw bytes.
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CalMode {
    FullRange,
    TwoDimensional,
    HardIron,
    LimitedTilt,
    Accel,
    AccelMagnetic,
}

impl From<CalMode> for CalibrationMode {
    fn from(mode: CalMode) -> Self {
        match mode {
            CalMode::FullRange => CalibrationMode::FullRange,
            CalMode::TwoDimensional => CalibrationMode::TwoDimensional,
            CalMode::HardIron => CalibrationMode::HardIron,
            CalMode::LimitedTilt => CalibrationMode::LimitedTilt,
            CalMode::Accel => CalibrationMode::Accel,
            CalMode::AccelMagnetic => CalibrationMode::AccelMagnetic,
        }
    }
}

fn load_config(cli: &Cli) -> DriverResult<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(port) = &cli.port {
        config.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    config.validate()?;
    Ok(config)
}

fn replay(path: &Path) -> DriverResult<()> {
    let mut bad = 0usize;
    for response in CaptureReader::new(BufReader::new(File::open(path)?)) {
        match response {
            Ok(response) => println!("{:?}", response),
            Err(e @ DriverError::Io(_)) => return Err(e),
            Err(e) => {
                warn!("{}", e);
                bad += 1;
            }
        }
    }
    if bad > 0 {
        warn!("{} decode errors in {}", bad, path.display());
    }
    Ok(())
}

fn run(cli: Cli) -> DriverResult<()> {
    if let CliCommand::Replay { file } = &cli.command {
        return replay(file);
    }

    let config = load_config(&cli)?;
    let mut tcm = Tcm::new(SerialChannel::open(&config)?);

    match cli.command {
        CliCommand::Info => {
            let info = tcm.get_model_info()?;
            println!("Model: {} rev {}", info.device_type_str(), info.revision_str());
            println!("Data: {:?}", tcm.get_data()?);
            println!("Acquisition: {:?}", tcm.get_acquisition_params()?);
        }
        CliCommand::Data => {
            println!("{:?}", tcm.get_data()?);
        }
        CliCommand::Filter { count } => {
            tcm.set_filter(count, None)?;
            let filter = tcm.get_filter()?;
            println!("{} taps: {:?}", filter.count(), filter.coefficients());
        }
        CliCommand::Stream { samples, interval } => {
            tcm.set_data_components(&[COMPONENT_HEADING])?;
            tcm.set_acquisition_params(AcqParams {
                polling_mode: false,
                flush_filter: false,
                sensor_acq_time: 0.0,
                interval_resp_time: interval,
            })?;
            tcm.start_streaming()?;
            let result = (0..samples).try_for_each(|_| {
                let datum = tcm.read_streamed_data()?;
                println!("{:?}", datum.heading);
                Ok::<(), DriverError>(())
            });
            tcm.stop_streaming()?;
            result?;
        }
        CliCommand::Calibrate { mode } => {
            let mut session = tcm.start_calibration(mode.into())?;
            loop {
                match tcm.calibration_status(&mut session)? {
                    CalibrationStatus::Progress(count) => println!("sample {}", count),
                    CalibrationStatus::Converged(scores) => {
                        println!("{:#?}", scores);
                        break;
                    }
                }
            }
        }
        CliCommand::Replay { .. } => {}
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
