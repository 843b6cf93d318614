use clap::{Args, Parser, Subcommand};
use coverless::cli::{
    embed_to_zcode, extract_from_zcode, show_capacity, show_info, CapacityOptions, CarrierSize,
    EmbedOptions, ExtractOptions, SecretSource,
};
use coverless::config::{BitMode, Checksum, StegoConfig};
use coverless::error::{CoverlessError, Result};
use coverless::stego::SecretDetails;
use coverless::zcode::ZCodeTag;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("COVERLESS_VERSION");
const BUILD: &str = env!("COVERLESS_BUILD");
const PROFILE: &str = env!("COVERLESS_PROFILE");
const GIT_HASH: &str = env!("COVERLESS_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "coverless")]
#[command(
    author,
    about = "Coverless image steganography: the carrier is never modified",
    long_about = None
)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Framing options shared by embed, extract and capacity
#[derive(Args)]
struct FramingArgs {
    /// Bits per average: msb (21/tile) or full (168/tile)
    #[arg(long, default_value = "msb", value_parser = parse_mode)]
    mode: BitMode,

    /// Payload checksum: sha256 or none
    #[arg(long, default_value = "sha256", value_parser = parse_checksum)]
    checksum: Checksum,
}

impl FramingArgs {
    fn config(&self) -> StegoConfig {
        StegoConfig::new(self.mode, self.checksum)
    }
}

/// The secret to hide (at most one)
#[derive(Args)]
#[group(multiple = false)]
struct SecretArgs {
    /// Text secret
    #[arg(long)]
    text: Option<String>,

    /// UTF-8 text file secret
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Image file secret
    #[arg(long)]
    image: Option<PathBuf>,
}

impl SecretArgs {
    fn source(self) -> Option<SecretSource> {
        if let Some(text) = self.text {
            Some(SecretSource::Text(text))
        } else if let Some(path) = self.text_file {
            Some(SecretSource::TextFile(path))
        } else {
            self.image.map(SecretSource::Image)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a secret against a carrier and write the Z-code image
    #[command(alias = "e")]
    Embed {
        /// Carrier image (never modified)
        #[arg(long)]
        carrier: PathBuf,

        #[command(flatten)]
        secret: SecretArgs,

        /// Shared secret key
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        framing: FramingArgs,

        /// Output Z-code PNG
        #[arg(long, short)]
        output: PathBuf,

        /// Sequence index for a tagged Z-code
        #[arg(long, requires = "size_tag")]
        index: Option<u16>,

        /// Size tag for a tagged Z-code
        #[arg(long, requires = "index")]
        size_tag: Option<u16>,

        /// Write the embed report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Recover a secret from a carrier and Z-code image
    #[command(alias = "x")]
    Extract {
        /// Carrier image used at embed time
        #[arg(long)]
        carrier: PathBuf,

        /// Z-code PNG
        #[arg(long)]
        zcode: PathBuf,

        /// Shared secret key
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        framing: FramingArgs,

        /// Z-code carries index and size tag
        #[arg(long)]
        tagged: bool,

        /// Output file (text as UTF-8, images as PNG)
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Show how much a carrier can hold
    #[command(alias = "c")]
    Capacity {
        /// Carrier width in pixels
        #[arg(long, requires = "height", conflicts_with = "carrier")]
        width: Option<u32>,

        /// Carrier height in pixels
        #[arg(long, requires = "width", conflicts_with = "carrier")]
        height: Option<u32>,

        /// Carrier image to measure
        #[arg(long)]
        carrier: Option<PathBuf>,

        #[command(flatten)]
        framing: FramingArgs,

        /// Payload bits to plan for
        #[arg(long, conflicts_with_all = ["text", "text_file", "image"])]
        bits: Option<usize>,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Show information about a Z-code image
    #[command(alias = "i")]
    Info {
        /// Z-code PNG to inspect
        #[arg(long)]
        zcode: PathBuf,

        /// Z-code carries index and size tag
        #[arg(long)]
        tagged: bool,
    },
}

fn parse_mode(s: &str) -> std::result::Result<BitMode, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_checksum(s: &str) -> std::result::Result<Checksum, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn describe(details: &SecretDetails) -> String {
    match details {
        SecretDetails::Text { length } => format!("text, {} chars", length),
        SecretDetails::Image {
            original_size,
            stored_size,
            color,
        } => {
            let mut out = format!("{:?} image {}x{}", color, stored_size.0, stored_size.1);
            if original_size != stored_size {
                out.push_str(&format!(" (scaled from {}x{})", original_size.0, original_size.1));
            }
            out
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Embed {
            carrier,
            secret,
            key,
            framing,
            output,
            index,
            size_tag,
            report,
        } => {
            let source = secret.source().ok_or_else(|| {
                CoverlessError::UnsupportedOption(
                    "embed needs --text, --text-file or --image".into(),
                )
            })?;
            let tag = match (index, size_tag) {
                (Some(index), Some(size)) => Some(ZCodeTag { index, size }),
                _ => None,
            };
            let options = EmbedOptions {
                key,
                config: framing.config(),
                tag,
                report,
            };

            let report = embed_to_zcode(&carrier, &source, &output, &options)?;
            println!(
                "Embedded {} as {} Z-code bits (capacity {}, {} tiles) into {}",
                describe(&report.details),
                report.payload_bits,
                report.capacity_bits,
                report.tiles_used,
                output.display()
            );
            Ok(())
        }

        Commands::Extract {
            carrier,
            zcode,
            key,
            framing,
            tagged,
            output,
        } => {
            let options = ExtractOptions {
                key,
                config: framing.config(),
                tagged,
            };
            let report = extract_from_zcode(&carrier, &zcode, &output, &options)?;
            println!("Extracted {} to {}", describe(&report.details), output.display());
            Ok(())
        }

        Commands::Capacity {
            width,
            height,
            carrier,
            framing,
            bits,
            secret,
        } => {
            let size = match (carrier, width, height) {
                (Some(path), _, _) => CarrierSize::Carrier(path),
                (None, Some(width), Some(height)) => CarrierSize::Dimensions { width, height },
                _ => {
                    return Err(CoverlessError::UnsupportedOption(
                        "capacity needs --carrier or --width and --height".into(),
                    ))
                }
            };
            let options = CapacityOptions {
                config: framing.config(),
                required_bits: bits,
                secret: secret.source(),
            };
            print!("{}", show_capacity(&size, &options)?);
            Ok(())
        }

        Commands::Info { zcode, tagged } => {
            print!("{}", show_info(&zcode, tagged)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("coverless {}", get_version());
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        if Cli::command().print_help().is_err() {
            return ExitCode::FAILURE;
        }
        println!();
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
