//! crt571 - command line front end for CRT-571 card dispensers.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crt571_driver::config::{AppConfig, ConfigLoadResult};
use crt571_driver::crt571::*;

/// Drive a CRT-571 card dispenser over its serial line.
#[derive(Parser)]
#[command(name = "crt571", version)]
struct Cli {
    /// Config file (defaults to crt571.toml next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use crt571.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Serial device path, overrides the config file
    #[arg(long)]
    port: Option<String>,

    /// Baud rate, overrides the config file
    #[arg(long)]
    baud: Option<u32>,

    /// Device address, overrides the config file
    #[arg(long)]
    address: Option<u8>,

    /// Accept replies with a bad BCC
    #[arg(long)]
    lenient: bool,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inquire device or sensor status
    Status {
        #[arg(long)]
        sensor: bool,
    },
    /// Initialize the dispenser
    Init {
        #[arg(value_enum, default_value_t = InitArg::Hold)]
        mode: InitArg,
    },
    /// Move the card
    Move {
        #[arg(value_enum)]
        position: MoveArg,
    },
    /// Enable or disable card entry from the output gate
    Entry {
        #[arg(value_enum)]
        state: EntryArg,
    },
    /// Detect the card type
    CardType {
        #[arg(value_enum)]
        kind: CardKindArg,
    },
    /// Read the card serial number
    Serial,
    /// Read configuration information
    Config,
    /// Read the firmware version
    Version,
    /// Read or reset the error card bin counter
    Counter {
        #[arg(value_enum, default_value_t = CounterArg::Read)]
        action: CounterArg,
    },
    /// Send a raw command: CM and PM as hex bytes, optional hex payload
    Raw { cm: String, pm: String, data: Option<String> },
    /// Send EOT to clear the line
    Clear,
    /// Write the effective configuration to the config file
    WriteConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum InitArg {
    Hold,
    Capture,
    Keep,
    HoldCounted,
    CaptureCounted,
    KeepCounted,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveArg {
    Hold,
    Ic,
    Rf,
    ErrorBin,
    Gate,
}

#[derive(Clone, Copy, ValueEnum)]
enum EntryArg {
    Enable,
    Disable,
}

#[derive(Clone, Copy, ValueEnum)]
enum CardKindArg {
    Ic,
    Rf,
}

#[derive(Clone, Copy, ValueEnum)]
enum CounterArg {
    Read,
    Reset,
}

impl Command {
    /// Command byte, parameter byte and payload for a device request.
    fn request(&self) -> anyhow::Result<Option<(u8, u8, Vec<u8>)>> {
        let request = match self {
            Command::Status { sensor } => {
                let kind = if *sensor { StatusKind::Sensor } else { StatusKind::Device };
                (CM_STATUS_REQUEST, kind.pm(), Vec::new())
            }
            Command::Init { mode } => {
                let mode = match mode {
                    InitArg::Hold => InitMode::MoveToHold,
                    InitArg::Capture => InitMode::Capture,
                    InitArg::Keep => InitMode::NoMove,
                    InitArg::HoldCounted => InitMode::MoveToHoldCounted,
                    InitArg::CaptureCounted => InitMode::CaptureCounted,
                    InitArg::KeepCounted => InitMode::NoMoveCounted,
                };
                (CM_INITIALIZE, mode.pm(), Vec::new())
            }
            Command::Move { position } => {
                let position = match position {
                    MoveArg::Hold => MovePosition::Hold,
                    MoveArg::Ic => MovePosition::IcPosition,
                    MoveArg::Rf => MovePosition::RfPosition,
                    MoveArg::ErrorBin => MovePosition::ErrorBin,
                    MoveArg::Gate => MovePosition::Gate,
                };
                (CM_CARD_MOVE, position.pm(), Vec::new())
            }
            Command::Entry { state } => {
                let entry = match state {
                    EntryArg::Enable => CardEntry::Enable,
                    EntryArg::Disable => CardEntry::Disable,
                };
                (CM_CARD_ENTRY, entry.pm(), Vec::new())
            }
            Command::CardType { kind } => {
                let check = match kind {
                    CardKindArg::Ic => CardTypeCheck::Ic,
                    CardKindArg::Rf => CardTypeCheck::Rf,
                };
                (CM_CARD_TYPE, check.pm(), Vec::new())
            }
            Command::Serial => (CM_CARD_SERIAL_NUMBER, PM_READ, Vec::new()),
            Command::Config => (CM_READ_CONFIG, PM_READ, Vec::new()),
            Command::Version => (CM_READ_VERSION, PM_READ, Vec::new()),
            Command::Counter { action } => {
                let op = match action {
                    CounterArg::Read => BinCounterOp::Read,
                    CounterArg::Reset => BinCounterOp::Reset,
                };
                (CM_RECYCLE_BIN_COUNTER, op.pm(), Vec::new())
            }
            Command::Raw { cm, pm, data } => {
                let cm = parse_byte(cm).context("invalid CM")?;
                let pm = parse_byte(pm).context("invalid PM")?;
                let data = match data {
                    Some(hex) => parse_hex(hex).context("invalid payload")?,
                    None => Vec::new(),
                };
                (cm, pm, data)
            }
            Command::Clear | Command::WriteConfig => return Ok(None),
        };
        Ok(Some(request))
    }
}

fn parse_byte(text: &str) -> anyhow::Result<u8> {
    let text = text.trim_start_matches("0x").trim_start_matches("0X");
    Ok(u8::from_str_radix(text, 16)?)
}

/// Parse hex bytes, ignoring spaces, e.g. `"00 A4 04 00"`.
fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16).with_context(|| format!("bad hex byte '{byte}'"))
        })
        .collect()
}

/// Install stderr logging plus an optional log file.
fn init_logging(level: &str, file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path.file_name().context("log file path has no file name")?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("crt571.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let (mut config, load_warning) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, None),
        ConfigLoadResult::Missing => (AppConfig::default(), Some("Config missing, using defaults".to_string())),
        ConfigLoadResult::Invalid(e) => bail!("Config {} invalid: {e}", config_path.display()),
    };

    if let Some(port) = cli.port {
        config.device.path = port;
    }
    if let Some(baud) = cli.baud {
        config.device.baud_rate = baud;
    }
    if let Some(address) = cli.address {
        config.device.address = address;
    }
    if cli.lenient {
        config.device.strict_checksum = false;
    }
    config.validate()?;

    let _guard = init_logging(&config.logging.level, config.logging.file.as_deref())?;
    tracing::info!("Config path: {:?}", config_path);
    if let Some(warning) = load_warning {
        tracing::warn!("{warning}");
    }

    if let Command::WriteConfig = cli.command {
        config.save(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }
    let request = cli.command.request()?;

    let client = Crt571Client::open(
        &config.device.path,
        config.device.baud_rate,
        config.device.session_options(),
    )?;
    let device = DeviceHandle::spawn(client)?;

    let Some((cm, pm, data)) = request else {
        device.clear_line().await?;
        println!("Line cleared");
        return Ok(());
    };

    match device.command(cm, pm, data).await {
        Ok(reply) if cli.json => println!("{}", serde_json::to_string_pretty(&reply)?),
        Ok(reply) => {
            println!("{reply}");
            if !reply.data.is_empty() {
                println!("data (hex): {:02X?}", reply.data);
            }
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("00 A4 04 00").unwrap(), vec![0x00, 0xA4, 0x04, 0x00]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("ABC").is_err());
        assert!(parse_hex("ZZ").is_err());
    }

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("0x31").unwrap(), 0x31);
        assert_eq!(parse_byte("A2").unwrap(), 0xA2);
        assert!(parse_byte("100").is_err());
    }

    #[test]
    fn test_cli_move_request() {
        let cli = Cli::parse_from(["crt571", "move", "gate"]);
        assert_eq!(cli.command.request().unwrap(), Some((CM_CARD_MOVE, 0x39, Vec::new())));
    }

    #[test]
    fn test_cli_raw_request() {
        let cli = Cli::parse_from(["crt571", "--lenient", "raw", "51", "39", "00A40400"]);
        assert!(cli.lenient);
        assert_eq!(
            cli.command.request().unwrap(),
            Some((CM_CPU_CARD, 0x39, vec![0x00, 0xA4, 0x04, 0x00]))
        );
    }
}
