//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use uscdefs_core::pipeline;
use uscdefs_core::stats::ScanProgress;
use uscdefs_crawler::LevelLocator;
use uscdefs_shared::{
    AppConfig, TermDefinition, TermFrequency, UscDefsError, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// uscdefs — find where US Code terms are defined.
#[derive(Parser)]
#[command(
    name = "uscdefs",
    version,
    about = "Extract legal term definitions from USLM US Code titles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.uscdefs/uscdefs.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the <code>.xml title files.
    #[arg(long, env = "USCDEFS_XML_DIR", global = true)]
    pub xml_dir: Option<String>,

    /// Output format for command results.
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the definitions a level contains.
    Define {
        /// Title code, e.g. usc26.
        title: String,
        /// Level without the leading `s`, e.g. 7701/a.
        level: String,
    },

    /// List the terms a level defines, with repeats.
    Terms {
        /// Title code, e.g. usc26.
        title: String,
        /// Level without the leading `s`, e.g. 7701/a.
        level: String,
    },

    /// Print the sentences of a level in reading order.
    Sentences {
        /// Title code, e.g. usc26.
        title: String,
        /// Level without the leading `s`, e.g. 7701/a.
        level: String,
    },

    /// Term usage and definition counts for a level.
    Stats {
        /// Title code, e.g. usc26.
        title: String,
        /// Level without the leading `s`, e.g. 7701/a.
        level: String,
    },

    /// List the configured title codes.
    Titles,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "uscdefs=info",
        1 => "uscdefs=debug",
        _ => "uscdefs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Config { ref action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        },
        Command::Titles => cmd_titles(&resolve_config(&cli)?, format),
        Command::Define {
            ref title,
            ref level,
        } => cmd_define(&resolve_config(&cli)?, title, level, format),
        Command::Terms {
            ref title,
            ref level,
        } => cmd_terms(&resolve_config(&cli)?, title, level, format),
        Command::Sentences {
            ref title,
            ref level,
        } => cmd_sentences(&resolve_config(&cli)?, title, level, format),
        Command::Stats {
            ref title,
            ref level,
        } => cmd_stats(&resolve_config(&cli)?, title, level, format),
    }
}

/// Load the config file and apply CLI overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(dir) = &cli.xml_dir {
        config.defaults.xml_dir = dir.clone();
    }
    Ok(config)
}

/// Put the fixed user-facing message in front of the diagnostic chain.
fn user_facing(err: UscDefsError) -> Report {
    let message = err.user_message();
    Report::new(err).wrap_err(message)
}

// ---------------------------------------------------------------------------
// Lookup commands
// ---------------------------------------------------------------------------

fn cmd_define(config: &AppConfig, title: &str, level: &str, format: OutputFormat) -> Result<()> {
    info!(title, level, "extracting definitions");
    let definitions = pipeline::define(config, title, level).map_err(user_facing)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&definitions)?),
        OutputFormat::Text => print!("{}", render_definitions(&definitions)),
    }
    Ok(())
}

fn cmd_terms(config: &AppConfig, title: &str, level: &str, format: OutputFormat) -> Result<()> {
    let terms = pipeline::defined_terms(config, title, level).map_err(user_facing)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&terms)?),
        OutputFormat::Text => {
            for term in &terms {
                println!("{term}");
            }
        }
    }
    Ok(())
}

fn cmd_sentences(config: &AppConfig, title: &str, level: &str, format: OutputFormat) -> Result<()> {
    let sentences = pipeline::sentences(config, title, level).map_err(user_facing)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sentences)?),
        OutputFormat::Text => {
            for (i, sentence) in sentences.iter().enumerate() {
                println!("{:>4}  {sentence}", i + 1);
            }
        }
    }
    Ok(())
}

fn cmd_stats(config: &AppConfig, title: &str, level: &str, format: OutputFormat) -> Result<()> {
    info!(title, level, "computing term statistics");
    let reporter = CliProgress::new();
    let stats = pipeline::term_statistics(config, title, level, &reporter);
    reporter.spinner.finish_and_clear();
    let stats = stats.map_err(user_facing)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => print!("{}", render_stats(&stats)),
    }
    Ok(())
}

fn cmd_titles(config: &AppConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config.titles)?),
        OutputFormat::Text => {
            for (code, number) in &config.titles {
                let path = config.title_path(code);
                let marker = if path.exists() { "" } else { "  (missing)" };
                println!("{code:<8} {number:<4} {}{marker}", path.display());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_definitions(definitions: &[TermDefinition]) -> String {
    let mut out = String::new();
    for entry in definitions {
        let record = &entry.definition;
        out.push_str(&format!("{} ({})\n", entry.term, record.clause_type));
        out.push_str(&format!("    {}\n", record.sentence));
    }
    out
}

fn render_stats(stats: &[TermFrequency]) -> String {
    let width = stats
        .iter()
        .map(|s| s.term.chars().count())
        .max()
        .unwrap_or(0)
        .max("term".len());

    let mut out = format!(
        "{:<width$}  {:>5}  {:>5}  {:>5}  repeated\n",
        "term", "uses", "level", "title"
    );
    for s in stats {
        let repeated = match (s.repeated_in_level, s.repeated_in_title) {
            (true, true) => "level, title",
            (true, false) => "level",
            (false, true) => "title",
            (false, false) => "",
        };
        out.push_str(
            format!(
                "{:<width$}  {:>5}  {:>5}  {:>5}  {repeated}",
                s.term, s.occurrences, s.defined_in_level, s.defined_in_title
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown on stderr while the whole title is scanned.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner.set_message("Loading title");
        Self { spinner }
    }
}

impl ScanProgress for CliProgress {
    fn section_scanned(&self, locator: &LevelLocator, scanned: usize) {
        self.spinner
            .set_message(format!("Scanning title [{scanned}] {locator}"));
    }

    fn done(&self, scanned: usize) {
        self.spinner
            .set_message(format!("Scanned {scanned} sections"));
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config().wrap_err("could not write the config file")?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
