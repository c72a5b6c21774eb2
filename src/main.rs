use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use phpantom_finder::config::ConfigError;
use phpantom_finder::{Config, DeclarationRecord, Finder, FsError, Relation};

/// Find PHP classes by parent, interface or trait, without running PHP.
#[derive(Parser)]
#[command(name = "phpantom-finder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Read settings from this TOML file instead of discovering one.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Resolve names by namespace only, ignoring `use` imports.
    #[arg(long, global = true)]
    no_imports: bool,

    /// Scan files in parallel.
    #[arg(long, global = true)]
    parallel: bool,

    /// Log progress to stderr (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Declarations whose `extends` clause names FQCN.
    Extends {
        fqcn: String,
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Declarations whose `implements` list includes FQCN.
    Implements {
        fqcn: String,
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Declarations that use the trait FQCN.
    Uses {
        fqcn: String,
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// List every declaration in a file or directory.
    Scan { path: PathBuf },
}

enum Failure {
    Config(ConfigError),
    Fs(FsError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(records) => {
            print_records(&records, cli.json);
            ExitCode::SUCCESS
        }
        Err(Failure::Config(e)) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
        Err(Failure::Fs(e)) => {
            eprintln!("error: {e}");
            match e {
                FsError::DirectoryNotFound { .. } | FsError::FileNotFound { .. } => {
                    ExitCode::from(2)
                }
                FsError::Io { .. } => ExitCode::from(1),
            }
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<DeclarationRecord>, Failure> {
    let root = match &cli.command {
        Command::Extends { dir, .. }
        | Command::Implements { dir, .. }
        | Command::Uses { dir, .. } => dir.as_path(),
        Command::Scan { path } if path.is_dir() => path.as_path(),
        Command::Scan { path } => path.parent().unwrap_or(Path::new(".")),
    };

    let mut config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover(root),
    }
    .map_err(Failure::Config)?;
    if cli.no_imports {
        config.resolve_imports = false;
    }
    if cli.parallel {
        config.parallel = true;
    }

    let finder = Finder::new(config);
    let result = match &cli.command {
        Command::Extends { fqcn, dir } => finder.find(dir, fqcn, Relation::Parent),
        Command::Implements { fqcn, dir } => finder.find(dir, fqcn, Relation::Interface),
        Command::Uses { fqcn, dir } => finder.find(dir, fqcn, Relation::Trait),
        Command::Scan { path } if path.is_dir() => finder.scan_directory(path),
        Command::Scan { path } => {
            if !path.exists() {
                return Err(Failure::Fs(FsError::FileNotFound { path: path.clone() }));
            }
            finder.scan_file(path)
        }
    };
    result.map_err(Failure::Fs)
}

fn print_records(records: &[DeclarationRecord], json: bool) {
    if json {
        match serde_json::to_string_pretty(records) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: failed to serialize results: {e}"),
        }
        return;
    }
    for record in records {
        println!("{}\t{}", record.fqcn, record.file);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
