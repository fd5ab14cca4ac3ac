mod cli;

use mediascope::{config, input, summary};
use ms_core::{AnalyzeOptions, OutputFormat};
use ms_engine::{EngineFactory, NativeFactory};
use ms_stream::MediaReport;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

/// Flags of the `analyze` command that override the config file.
struct AnalyzeOverrides {
    options_json: Option<String>,
    format: Option<OutputFormat>,
    chunk_size: Option<u64>,
    full: bool,
    cover_data: bool,
    summary: bool,
}

impl AnalyzeOverrides {
    fn apply(&self, options: AnalyzeOptions) -> Result<AnalyzeOptions> {
        let mut options = match self.options_json {
            Some(ref json) => AnalyzeOptions::from_json(json).context("Invalid --options")?,
            None => options,
        };
        if let Some(format) = self.format {
            options.format = format;
        }
        if self.summary {
            options.format = OutputFormat::Object;
        }
        if let Some(chunk_size) = self.chunk_size {
            options.chunk_size = chunk_size;
        }
        options.full |= self.full;
        options.cover_data |= self.cover_data;
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediascope=debug,ms_core=debug,ms_engine=debug,ms_stream=trace".to_string()
        } else {
            "mediascope=warn,ms_core=warn,ms_engine=warn,ms_stream=warn".to_string()
        }
    });

    // Reports go to stdout; keep logs out of the way.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            input,
            options,
            format,
            chunk_size,
            full,
            cover_data,
            library,
            summary,
        } => {
            let overrides = AnalyzeOverrides {
                options_json: options,
                format,
                chunk_size,
                full,
                cover_data,
                summary,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(analyze_input(
                &input,
                cli.config.as_deref(),
                library,
                &overrides,
            ))
        }
        Commands::CheckEngine { library } => check_engine(cli.config.as_deref(), library),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::InitConfig { path, force } => init_config(&path, force),
        Commands::Version => {
            println!("mediascope {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load MediaInfoLib from the flag, then the config file, then the system.
fn load_factory(flag: Option<PathBuf>, config: &config::Config) -> Result<NativeFactory> {
    let factory = match flag.or_else(|| config.engine.library.clone()) {
        Some(path) => NativeFactory::load(&path)
            .with_context(|| format!("Failed to load MediaInfoLib from {:?}", path))?,
        None => NativeFactory::load_default()
            .context("Failed to find MediaInfoLib; install it or pass --library")?,
    };
    Ok(factory)
}

async fn analyze_input(
    input: &str,
    config_path: Option<&Path>,
    library: Option<PathBuf>,
    overrides: &AnalyzeOverrides,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let options = overrides.apply(config.analyze.clone())?;
    options.check().context("Invalid analyze options")?;

    // Open the input first so a typo fails before the engine is loaded.
    let mut source = input::open_source(input).await?;
    let factory = load_factory(library, &config)?;

    tracing::info!(
        "Analyzing {} with {} (chunk size {}, format {})",
        input,
        factory.name(),
        options.chunk_size,
        options.format
    );

    let output = ms_stream::analyze(&factory, options, &mut source)
        .await
        .with_context(|| format!("Failed to analyze {}", input))?;

    if output.is_empty() {
        anyhow::bail!("The engine produced no report for {}", input);
    }

    if overrides.summary {
        let value = output
            .as_object()
            .cloned()
            .context("Summary needs a structured report")?;
        let report = MediaReport::from_value(value)?;
        println!("Input: {}", input);
        print!("{}", summary::render_summary(&report));
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn check_engine(config_path: Option<&Path>, library: Option<PathBuf>) -> Result<()> {
    println!("Checking analysis engine...\n");

    let config = config::load_config_or_default(config_path)?;
    let factory = load_factory(library, &config)?;
    let version = factory.version()?;

    println!("✓ {}", factory.name());
    println!("  Library: {}", factory.library_path().display());
    if !version.is_empty() {
        println!("  Version: {}", version);
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    match config.engine.library {
        Some(ref library) => println!("  Engine library: {}", library.display()),
        None => println!("  Engine library: (search system paths)"),
    }
    println!("  Format: {}", config.analyze.format);
    println!("  Chunk size: {} bytes", config.analyze.chunk_size);
    println!("  Full: {}", config.analyze.full);
    println!("  Cover data: {}", config.analyze.cover_data);

    for warning in config.analyze.validate() {
        println!("  ! {}", warning);
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Config file already exists: {:?} (use --force to overwrite)", path);
    }

    config::persist::save_config(path, &config::Config::default())?;
    println!("Wrote default config to {:?}", path);
    Ok(())
}
