use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use netvol::{ClientExecutor, VolumeDriver};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Plugin root directory holding the state file and mountpoints
    #[arg(long, global = true, default_value = "/run/docker/plugins")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a volume
    Create {
        /// Volume name
        name: String,
        /// Creation option as key=value (host= and token= are required)
        #[arg(short = 'o', long = "opt", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },
    /// Remove a volume and its mountpoint directory
    Remove {
        /// Volume name
        name: String,
    },
    /// Attach to a volume, mounting it on first use
    Mount {
        /// Volume name
        name: String,
    },
    /// Detach from a volume, unmounting it when idle
    Unmount {
        /// Volume name
        name: String,
    },
    /// Print the mountpoint of a volume
    Path {
        /// Volume name
        name: String,
    },
    /// Show a volume
    Get {
        /// Volume name
        name: String,
    },
    /// List all volumes
    List,
    /// Show driver capabilities
    Capabilities,
}

fn parse_options(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut options = HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) => {
                options.insert(key.to_string(), value.to_string());
            }
            None => bail!("invalid option {:?}, expected key=value", pair),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger based on verbose flag
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(log_level).init();

    if !cli.root.is_dir() {
        bail!(
            "invalid plugin root {}, try: /run/docker/plugins",
            cli.root.display()
        );
    }

    info!("Starting netvol in {}", cli.root.display());

    let driver = VolumeDriver::new(&cli.root, Box::new(ClientExecutor))?;

    match &cli.command {
        Commands::Create { name, options } => {
            let options = parse_options(options)?;
            driver.create(name, &options)?;
            println!("Created volume: {}", name);
        }
        Commands::Remove { name } => {
            driver.remove(name)?;
            println!("Removed volume: {}", name);
        }
        Commands::Mount { name } => {
            let mountpoint = driver.mount(name)?;
            println!("{}", mountpoint.display());
        }
        Commands::Unmount { name } => {
            driver.unmount(name)?;
            println!("Unmounted volume: {}", name);
        }
        Commands::Path { name } => {
            let mountpoint = driver.path(name)?;
            println!("{}", mountpoint.display());
        }
        Commands::Get { name } => {
            let info = driver.get(name)?;
            println!("Name: {}", info.name);
            println!("Mountpoint: {}", info.mountpoint.display());
        }
        Commands::List => {
            for info in driver.list() {
                println!("{}\t{}", info.name, info.mountpoint.display());
            }
        }
        Commands::Capabilities => {
            println!("Scope: {}", driver.capabilities().scope);
        }
    }

    Ok(())
}
