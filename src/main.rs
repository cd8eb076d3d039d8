use clap::{Parser, Subcommand};
use hoi4_icon_search::{config, convert, output, render, scan};
use std::collections::HashSet;
use std::path::PathBuf;

/// Shared flag for commands that convert textures.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the conversion cache — force re-converting every texture
    #[arg(long)]
    no_cache: bool,
}

#[derive(clap::Args, Clone)]
struct ConvertArgs {
    #[command(flatten)]
    cache: CacheArgs,

    /// Restrict conversion to the given texture paths (repeatable)
    #[arg(long, value_name = "PATH")]
    only: Vec<PathBuf>,
}

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup — trivial, called exactly once
        Box::leak(format!("{}+{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "hoi4-icon-search")]
#[command(about = "Searchable HTML icon catalog for Hearts of Iron IV mods")]
#[command(long_about = "\
Searchable HTML icon catalog for Hearts of Iron IV mods

Scans the mod's .gfx files for spriteType declarations, converts the
referenced textures to PNG (written next to their sources), and fills a
template's @TOKEN placeholders with icon entries:

  @GOALS_ICONS    icon entries for the 'goals' section
  @GOALS_NUM      icon count for the 'goals' section
  @TITLE          page title
  @FAVICON        favicon path (empty when unset)
  @UPDATE_DATE    current UTC time (only with stamp_date / --stamp-date)

Configuration comes from icon-search.json in the mod root (or --config),
with these flags layered on top. Without a config file the stock section
list is used; point sections at your gfx files with repeated --gfx flags:

  hoi4-icon-search build --title \"My Mod\" \\
      --gfx goals=interface/mymod_goals.gfx \\
      --gfx ideas=interface/mymod_ideas.gfx

Problems (missing textures, wrong-case paths, duplicate sprites) never
abort a build; they are collected and reported at the end. Only a missing
template stops the run.

Run 'hoi4-icon-search gen-config' to print a stock icon-search.json.")]
#[command(version = version_string())]
struct Cli {
    /// Mod directory to scan
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/icon-search.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for intermediate files (manifest, conversion cache)
    #[arg(long, default_value = ".hoi4-icon-search-temp", global = true)]
    temp_dir: PathBuf,

    /// Page title (overrides the config file)
    #[arg(long, global = true)]
    title: Option<String>,

    /// HTML template path, relative to the root
    #[arg(long, global = true)]
    template: Option<String>,

    /// Favicon path substituted for @FAVICON
    #[arg(long, global = true)]
    favicon: Option<String>,

    /// Output HTML file, relative to the root
    #[arg(long, global = true)]
    output: Option<String>,

    /// Substitute the current UTC time for @UPDATE_DATE
    #[arg(long, global = true)]
    stamp_date: bool,

    /// Add a gfx file or directory to a section (repeatable)
    #[arg(long = "gfx", value_name = "KEY=PATH", global = true)]
    gfx: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan gfx files into a manifest
    Scan,
    /// Convert the manifest's textures to PNG
    Convert(ConvertArgs),
    /// Produce the HTML catalog from the manifest
    Render,
    /// Run the full pipeline: scan → convert → render
    Build(CacheArgs),
    /// Scan and report issues without converting or rendering
    Check,
    /// Print a stock icon-search.json with all options
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Scan => {
            let config = resolve_config(&cli)?;
            let manifest = scan::scan(&config, &cli.root)?;
            scan::write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);
            println!();
            output::print_issue_report(&manifest.issues);
        }
        Command::Convert(args) => {
            let manifest = scan::load_manifest(&cli.temp_dir)?;
            init_thread_pool(&manifest.config.processing);
            let only: Option<HashSet<PathBuf>> = if args.only.is_empty() {
                None
            } else {
                Some(args.only.iter().cloned().collect())
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_convert_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = convert::convert(
                &manifest,
                &cli.root,
                &cli.temp_dir,
                !args.cache.no_cache,
                only.as_ref(),
                Some(tx),
            )?;
            printer.join().unwrap();
            output::print_convert_summary(&result);

            let mut issues = manifest.issues.clone();
            issues.extend(result.issues);
            println!();
            output::print_issue_report(&issues);
        }
        Command::Render => {
            let manifest = scan::load_manifest(&cli.temp_dir)?;
            let report = render::render(&manifest, &cli.root)?;
            output::print_render_report(&report);

            let mut issues = manifest.issues.clone();
            issues.extend(report.issues);
            println!();
            output::print_issue_report(&issues);
        }
        Command::Build(cache_args) => {
            let config = resolve_config(&cli)?;

            println!("==> Stage 1: Scanning {}", cli.root.display());
            let manifest = scan::scan(&config, &cli.root)?;
            scan::write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 2: Converting textures");
            init_thread_pool(&manifest.config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_convert_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = convert::convert(
                &manifest,
                &cli.root,
                &cli.temp_dir,
                !cache_args.no_cache,
                None,
                Some(tx),
            )?;
            printer.join().unwrap();
            output::print_convert_summary(&result);

            println!("==> Stage 3: Rendering HTML");
            let report = render::render(&manifest, &cli.root)?;
            output::print_render_report(&report);

            let mut issues = manifest.issues.clone();
            issues.extend(result.issues);
            issues.extend(report.issues);
            println!();
            output::print_issue_report(&issues);
            println!("==> Build complete: {}", report.output.display());
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", cli.root.display());
            let manifest = scan::scan(&config, &cli.root)?;
            output::print_scan_output(&manifest);
            println!();
            output::print_issue_report(&manifest.issues);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_json());
        }
    }

    Ok(())
}

/// Load the config file and merge CLI overrides onto it. Validation runs
/// after the merge so `--title` can satisfy the title requirement.
fn resolve_config(cli: &Cli) -> Result<config::CatalogConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let default_path = cli.root.join("icon-search.json");
            if default_path.is_file() {
                config::load_config(&default_path)?
            } else {
                config::CatalogConfig::default()
            }
        }
    };

    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    if let Some(template) = &cli.template {
        config.template = template.clone();
    }
    if let Some(favicon) = &cli.favicon {
        config.favicon = Some(favicon.clone());
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if cli.stamp_date {
        config.stamp_date = true;
    }
    for spec in &cli.gfx {
        config.apply_gfx_override(spec)?;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down,
/// not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let workers = config::effective_workers(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
