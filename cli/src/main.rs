use clap::{Parser, Subcommand};
use exdump_core::{
    AnalysisCommand, AnalysisManager, AnalysisRequest, ConfigOverrides, ConfigSource, ExdumpConfig,
    FieldPolicy, ValidationError,
};
use std::io::Write;
use std::path::PathBuf;

mod exit;
mod logging;
mod render;

use exit::ExdumpExit;

#[derive(Parser)]
#[command(name = "exdump")]
#[command(version, about = "Front-end for the exfat_dump.py exFAT analyzer", long_about = None)]
struct Cli {
    /// Config file (defaults to ./exdump.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Interpreter used to launch the analyzer
    #[arg(long, global = true, value_name = "PROGRAM")]
    python: Option<String>,

    /// Path to exfat_dump.py
    #[arg(long, global = true, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Seconds before the analyzer is killed
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analyzer against an image
    Run {
        /// Analyzer command (mmls, fls, fsstat, icat, istat)
        command: AnalysisCommand,
        /// Disk image file
        image: String,
        /// Entry number, or the partition offset when -o is given
        value: Option<String>,
        /// Pass VALUE to the analyzer as the partition offset (-o)
        #[arg(short = 'o', long = "offset")]
        offset: bool,
        /// Long/detailed listing (fls)
        #[arg(short = 'l', long = "long")]
        long_listing: bool,
        /// List recursively (fls)
        #[arg(short = 'r', long)]
        recursive: bool,
        /// Compute SHA1 of the file content (icat)
        #[arg(short = 'H', long)]
        hash: bool,
        /// Analyzer debug level
        #[arg(short = 'd', long = "debug", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
        debug_level: u8,
        /// Print the command line without running it
        #[arg(long)]
        dry_run: bool,
        /// Print the command line and outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which fields each command accepts
    Fields {
        /// Only this command
        command: Option<AnalysisCommand>,
        /// Show the table as if -o were checked
        #[arg(short = 'o', long = "offset")]
        offset: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> ExdumpExit {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExdumpExit::Error
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<ExdumpExit> {
    let (mut config, source) = ExdumpConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&ConfigOverrides {
        interpreter: cli.python,
        script_path: cli.script,
        timeout_secs: cli.timeout,
    })?;
    tracing::debug!(?source, interpreter = %config.interpreter, script = %config.script_path.display(), "effective configuration");

    match cli.command {
        Commands::Run {
            command,
            image,
            value,
            offset,
            long_listing,
            recursive,
            hash,
            debug_level,
            dry_run,
            json,
        } => {
            let mut request = AnalysisRequest::new(command, image)
                .with_offset_flag(offset)
                .with_long_listing(long_listing)
                .with_recursive(recursive)
                .with_hash(hash)
                .with_debug_level(debug_level);
            request.entry_or_offset = value;

            let manager = AnalysisManager::from_config(&config);

            if dry_run {
                return Ok(match manager.preview(&request) {
                    Ok(command_line) => {
                        println!("{}", command_line);
                        ExdumpExit::Success
                    }
                    Err(e) => invalid(e),
                });
            }

            let command_line = match manager.preview(&request) {
                Ok(command_line) => command_line,
                Err(e) => return Ok(invalid(e)),
            };
            if !json {
                print!("{}", render::executing_banner(&command_line));
                println!();
                std::io::stdout().flush()?;
            }

            let run = match manager.run(&request).await {
                Ok(run) => run,
                Err(e) => return Ok(invalid(e)),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                print!("{}", render::render_run(&run, manager.launcher()));
            }

            Ok(ExdumpExit::from(&run.outcome))
        }
        Commands::Fields { command, offset } => {
            let rows = match command {
                Some(cmd) => vec![FieldPolicy::for_command(cmd, offset)],
                None => FieldPolicy::table(offset),
            };
            print!("{}", render::render_field_table(&rows));
            Ok(ExdumpExit::Success)
        }
        Commands::Config => {
            match source {
                ConfigSource::File(path) => println!("# loaded from {}", path.display()),
                ConfigSource::Defaults => println!("# built-in defaults"),
            }
            print!("{}", config.to_toml_string()?);
            Ok(ExdumpExit::Success)
        }
    }
}

fn invalid(e: ValidationError) -> ExdumpExit {
    eprintln!("ERROR: {}", e);
    ExdumpExit::InvalidInput
}
