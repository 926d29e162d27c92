use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::{
    env,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::config::{self, Config};
use crate::domain::answers::generate_accepted_answers;
use crate::import::{
    category::{self, CATEGORY_NAMES},
    orchestrator::Importer,
    stats::ImportStats,
};
use crate::providers::{
    TrackRegistry,
    download::NetworkDownloader,
    media::LocalMedia,
    omdb::{OmdbClient, SearchHit},
    registry::TrackApiClient,
};

mod summary;

use summary::{category_summary, overall_summary, rule};

#[derive(Parser)]
#[command(name = "blindtest-import")]
#[command(version)]
#[command(about = "Imports blind test tracks into the quiz backend")]
pub struct Cli {
    /// Path to the config TOML file [default: import.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output, shows error details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metadata and media for each category and create the tracks
    Import(ImportArgs),
    /// Delete every track from the backend
    Clear {
        /// Don't ask for confirmation
        #[arg(long)]
        force: bool,
    },
    /// Print the accepted answers generated for a title
    Answers {
        title: String,
        /// Localized title
        #[arg(long)]
        localized: Option<String>,
    },
    /// Look a title up on OMDb
    Lookup(LookupArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// OMDb API key (or set OMDB_API_KEY)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Backend base url (or set API_BASE_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Categories to import, all of them by default
    #[arg(short, long, num_args = 1..)]
    pub categories: Vec<String>,

    /// Max items per category
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Re-import tracks that already exist
    #[arg(long)]
    pub no_skip_existing: bool,

    /// Show what would be imported without downloading or creating anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct LookupArgs {
    /// Title to resolve, or a free text query with --search
    pub query: String,

    /// Release year
    #[arg(short, long)]
    pub year: Option<u16>,

    /// List every search hit instead of resolving the best match
    #[arg(short, long)]
    pub search: bool,

    /// OMDb API key (or set OMDB_API_KEY)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,
}

/// Entrypoint for CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("warn,blindtest_import={level}")),
    )
    .format_timestamp(None)
    .init();
}

fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let verbose = cli.verbose;

    match cli.command {
        Commands::Answers { title, localized } => {
            print_answers(&title, localized.as_deref());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Import(args) => {
            let config = load_config(cli.config.as_deref())?;
            import(config, args, verbose)
        }
        Commands::Clear { force } => {
            let config = load_config(cli.config.as_deref())?;
            clear(&config, force)
        }
        Commands::Lookup(args) => {
            let config = load_config(cli.config.as_deref())?;
            lookup(config, args)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Config::load_dotenv();

    let mut config = match path {
        Some(path) => Config::load(path, true)?,
        None => Config::load(Path::new(config::DEFAULT_CONFIG_PATH), false)?,
    };
    config.apply_env(|name| env::var(name).ok());
    Ok(config)
}

fn import(mut config: Config, args: ImportArgs, verbose: bool) -> anyhow::Result<ExitCode> {
    if let Some(key) = args.api_key {
        config.omdb.api_key = Some(key);
    }
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }

    let warnings = config.warnings();
    if !warnings.is_empty() {
        println!("Configuration warnings:");
        for warning in &warnings {
            println!("  ⚠ {warning}");
        }
        println!();
    }

    if config.omdb.api_key.is_none() {
        report_missing_api_key();
        return Ok(ExitCode::FAILURE);
    }

    let categories = if args.categories.is_empty() {
        CATEGORY_NAMES.iter().map(|name| name.to_string()).collect()
    } else {
        args.categories
    };
    let unknown = unknown_categories(&categories);
    if !unknown.is_empty() {
        eprintln!("Error: Unknown categories: {}", unknown.join(", "));
        eprintln!("Available categories: {}", CATEGORY_NAMES.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    let skip_existing = !args.no_skip_existing;
    let limit = args.limit.map(|limit| limit as usize);

    if args.dry_run {
        println!("DRY RUN MODE - No files will be downloaded or created");
        println!("Would import categories: {}", categories.join(", "));
        if let Some(limit) = limit {
            println!("Limit: {limit} items per category");
        }
        println!("Skip existing: {skip_existing}");
        return Ok(ExitCode::SUCCESS);
    }

    let retry = config.retry_policy();
    let omdb = OmdbClient::new(&config.omdb, &config.http, retry)?;
    let registry = TrackApiClient::new(&config.api, &config.http, retry)?;
    let downloader = NetworkDownloader::new(&config.media, &config.http, retry)?;
    let media = LocalMedia::from_config(&config.media, downloader);

    if !registry.validate_connection() {
        println!(
            "⚠ Backend at {} is not reachable, track creation will fail",
            config.api.base_url
        );
    }

    let interrupt = install_interrupt_handler();

    println!(
        "Starting import for: {} ({})",
        categories.join(", "),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    let mut overall = ImportStats::default();
    let mut completed_runs = 0;

    for name in &categories {
        let Some(category) = category::by_name(name, config.data_dir.as_deref()) else {
            continue;
        };

        println!("\n{}", rule());
        println!("Category: {}", name.to_uppercase());
        println!("{}", rule());

        let importer = Importer::new(category.as_ref(), &omdb, &media, &registry)
            .with_track_defaults(config.track)
            .with_interrupt(&interrupt);

        match importer.import_all(skip_existing, limit) {
            Ok(stats) => {
                print!("{}", category_summary(name, &stats, verbose));
                overall.absorb(&stats);
                completed_runs += 1;

                if stats.interrupted {
                    println!("\n\nImport interrupted by user");
                    break;
                }
            }
            Err(e) => {
                println!("\n[FAIL] Error importing {name}: {e:#}");
                if verbose {
                    println!("{e:?}");
                }
            }
        }
    }

    if completed_runs > 1 {
        print!("{}", overall_summary(&overall));
    }

    println!("\n[OK] Import completed!");
    Ok(ExitCode::SUCCESS)
}

fn report_missing_api_key() {
    eprintln!("Error: OMDb API key required.");
    eprintln!("  Use --api-key or set OMDB_API_KEY environment variable.");
    eprintln!("  Get a free key at: http://www.omdbapi.com/apikey.aspx");
}

/// First Ctrl-C finishes the current item and stops, a second one exits right away
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);

    let installed = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        println!("\nStopping after the current item, press Ctrl-C again to quit");
    });
    if let Err(e) = installed {
        log::warn!("Ctrl-C handler not installed: {e}");
    }

    interrupt
}

fn unknown_categories(requested: &[String]) -> Vec<&str> {
    requested
        .iter()
        .map(String::as_str)
        .filter(|name| !CATEGORY_NAMES.contains(name))
        .collect()
}

fn clear(config: &Config, force: bool) -> anyhow::Result<ExitCode> {
    let registry = TrackApiClient::new(&config.api, &config.http, config.retry_policy())?;

    println!("Fetching all tracks...");
    let tracks = registry.list().context("Failed to fetch tracks")?;

    if tracks.is_empty() {
        println!("[OK] Database is already empty (no tracks found)");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Found {} tracks to delete", tracks.len());

    if !force {
        let prompt = format!(
            "\nAre you sure you want to delete ALL {} tracks? (yes/no): ",
            tracks.len()
        );
        if !confirm(&prompt)? {
            println!("Operation cancelled");
            return Ok(ExitCode::SUCCESS);
        }
    }

    println!("\nDeleting tracks...");
    let (mut deleted, mut failed) = (0, 0);
    for track in &tracks {
        match registry.delete(track.id) {
            Ok(true) => {
                deleted += 1;
                println!("  [OK] Deleted: {}", track.title);
            }
            Ok(false) => {
                failed += 1;
                println!("  [FAIL] Failed: {}", track.title);
            }
            Err(e) => {
                failed += 1;
                println!("  [FAIL] Failed: {} ({e})", track.title);
            }
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Deleted: {deleted}");
    println!("Failed:  {failed}");
    println!("{}", "=".repeat(50));
    if failed == 0 {
        println!("\n[OK] Database cleared!");
    }

    Ok(ExitCode::SUCCESS)
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_confirmation(&answer))
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y" | "oui")
}

fn lookup(mut config: Config, args: LookupArgs) -> anyhow::Result<ExitCode> {
    if let Some(key) = args.api_key {
        config.omdb.api_key = Some(key);
    }
    if config.omdb.api_key.is_none() {
        report_missing_api_key();
        return Ok(ExitCode::FAILURE);
    }

    let omdb = OmdbClient::new(&config.omdb, &config.http, config.retry_policy())?;

    if args.search {
        let hits = omdb.search(&args.query)?;
        if hits.is_empty() {
            println!("No results for {:?}", args.query);
            return Ok(ExitCode::FAILURE);
        }
        println!("Results ({}):", hits.len());
        for hit in &hits {
            println!("  {}", describe_hit(hit));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(metadata) = omdb.fetch_by_title(&args.query, args.year)? else {
        println!("No match for {:?}", args.query);
        return Ok(ExitCode::FAILURE);
    };

    println!("{} ({})", metadata.title, metadata.year);
    println!("  id:     {}", metadata.external_id);
    println!("  type:   {}", metadata.media_type);
    if let Some(poster) = &metadata.poster_url {
        println!("  poster: {poster}");
    }
    if let Some(plot) = &metadata.plot {
        println!("  plot:   {plot}");
    }
    println!();
    print_answers(&metadata.title, None);

    Ok(ExitCode::SUCCESS)
}

fn describe_hit(hit: &SearchHit) -> String {
    let mut line = format!("{}  {}", hit.external_id, hit.title);
    if let Some(year) = &hit.year {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(kind) = &hit.media_type {
        line.push_str(&format!(" [{kind}]"));
    }
    line
}

fn print_answers(title: &str, localized: Option<&str>) {
    let answers = generate_accepted_answers(title, localized);
    if answers.is_empty() {
        println!("No accepted answers for {title:?}");
        return;
    }

    println!("Accepted answers ({}):", answers.len());
    for answer in answers.iter() {
        println!("  - {answer}");
    }
}
