use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use worlds_results::assets::AssetPaths;
use worlds_results::export;
use worlds_results::images::{ImageStores, NoImages};
use worlds_results::leaguepedia::{DEFAULT_API_URL, DEFAULT_MAX_REQS_PER_MIN, LeaguepediaClient};
use worlds_results::logging;
use worlds_results::model::MatchRecord;
use worlds_results::pipeline::{self, PipelineOptions};
use worlds_results::series::TerminalRule;
use worlds_results::source::{CsvSource, MatchSource, TournamentFilter};
use worlds_results::stage::StageClassifier;

#[derive(Parser, Debug)]
#[command(
    name = "worlds-results",
    about = "Builds the match results page data for a League of Legends tournament",
    version
)]
struct Cli {
    /// Append logs to this file instead of stderr
    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query Leaguepedia for a tournament and write the page data
    Results {
        /// Tournament overview page (e.g., "2024 Season World Championship/Main Event")
        #[arg(long)]
        tournament: String,

        /// Only games played on this UTC day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long = "api-url", env = "LEAGUEPEDIA_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Directory holding the player and team image caches
        #[arg(long = "cache-dir", env = "WORLDS_RESULTS_CACHE_DIR", default_value = ".cache")]
        cache_dir: PathBuf,

        #[arg(
            long = "max-reqs-per-min",
            env = "WORLDS_RESULTS_MAX_REQS_PER_MIN",
            default_value_t = DEFAULT_MAX_REQS_PER_MIN
        )]
        max_reqs_per_min: usize,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Build the page data from a CSV of game rows, without network access
    FromCsv {
        /// CSV whose headers are the game row field names
        #[arg(long)]
        input: PathBuf,

        /// Read (but never update) image caches from this directory
        #[arg(long = "cache-dir", env = "WORLDS_RESULTS_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the stage classification of game identifiers as JSON
    Classify {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Page data JSON handed to the template
    #[arg(long, default_value = "results.json")]
    out: PathBuf,

    /// Also write a per-player CSV summary
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long = "champion-base")]
    champion_base: Option<String>,

    #[arg(long = "rune-base")]
    rune_base: Option<String>,

    #[arg(long = "spell-base")]
    spell_base: Option<String>,

    /// How the deciding game of a series is picked: numeric or lexicographic
    #[arg(long = "terminal-rule", default_value = "numeric")]
    terminal_rule: TerminalRule,
}

impl RenderArgs {
    fn options(&self) -> PipelineOptions {
        let defaults = AssetPaths::default();
        PipelineOptions {
            assets: AssetPaths {
                champion_base: self.champion_base.clone().unwrap_or(defaults.champion_base),
                rune_base: self.rune_base.clone().unwrap_or(defaults.rune_base),
                spell_base: self.spell_base.clone().unwrap_or(defaults.spell_base),
            },
            terminal_rule: self.terminal_rule,
        }
    }

    fn write(&self, matches: &[MatchRecord]) -> Result<()> {
        export::write_page_json(matches, &self.out)
            .with_context(|| format!("writing {}", self.out.display()))?;
        println!("Wrote {} games to {}", matches.len(), self.out.display());

        if let Some(csv) = &self.csv {
            export::write_player_summary(matches, csv)
                .with_context(|| format!("writing {}", csv.display()))?;
            println!("Wrote player summary to {}", csv.display());
        }
        Ok(())
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Results {
            tournament,
            date,
            api_url,
            cache_dir,
            max_reqs_per_min,
            render,
        } => {
            let mut filter = TournamentFilter::new(tournament);
            if let Some(date) = date {
                filter = filter.on_date(&date)?;
            }

            let client = LeaguepediaClient::new(&api_url, max_reqs_per_min)?;
            let mut images = ImageStores::load(&cache_dir);
            let matches = pipeline::run(&client, &filter, &render.options(), &mut images, &client);

            images
                .save()
                .with_context(|| format!("saving image caches to {}", cache_dir.display()))?;
            render.write(&matches)
        }
        Command::FromCsv {
            input,
            cache_dir,
            render,
        } => {
            let source = CsvSource::new(&input);
            let mut images = cache_dir
                .as_deref()
                .map(ImageStores::load)
                .unwrap_or_default();

            let filter = TournamentFilter::new(input.display().to_string());
            let rows = source
                .fetch_rows(&filter)
                .with_context(|| format!("reading {}", input.display()))?;
            let matches = pipeline::aggregate(rows, &render.options(), &mut images, &NoImages);
            render.write(&matches)
        }
        Command::Classify { identifiers } => {
            let mut classifier = StageClassifier::new();
            for identifier in identifiers {
                let classification = classifier.classify(&identifier);
                println!(
                    "{}\t{}",
                    identifier,
                    serde_json::to_string(&classification)?
                );
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
