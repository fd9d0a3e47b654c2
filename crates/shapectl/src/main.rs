//! Summoner's Shape - command-line client.
//!
//! Loads the snapshot, runs one engine command, saves, prints. All game
//! rules live in `shape_engine`; this binary only parses arguments and
//! renders results.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shapectl")]
#[command(about = "Summoner's Shape - ranked habit tracking", long_about = None)]
#[command(version)]
struct Cli {
    /// Use an alternate state file instead of the default location
    #[arg(long, global = true)]
    state_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create your profile and start the first split
    Onboard,

    /// Log metrics for a day (defaults to today)
    Log {
        /// Date to log for (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Calories eaten
        #[arg(long)]
        calories: Option<u32>,

        /// Morning weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Step count
        #[arg(long)]
        steps: Option<u32>,

        /// Hours slept
        #[arg(long)]
        sleep: Option<f64>,

        /// Subjective sleep quality, 1-5
        #[arg(long)]
        quality: Option<u8>,

        /// Free-form note for the day
        #[arg(long)]
        notes: Option<String>,

        /// Evening reflection
        #[arg(long)]
        reflection: Option<String>,

        /// Context tag: travel, sick, stress, celebration, work
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show today's status, rank and nudges
    Status,

    /// Show the rank ledger
    Rank {
        /// Number of history lines to print
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },

    /// Show open and completed quests
    Quests,

    /// Show mastery levels and badges
    Mastery,

    /// Spend coins to soften a logged day into a Draw
    Grace {
        /// Date to grace (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Personal records and the season timeline
    Records,

    /// Browse or buy cosmetic themes
    Theme {
        /// Theme id to buy; omit to list the shop
        id: Option<String>,
    },

    /// Show or change the focus area
    Focus {
        /// One of: balanced, calories, sleep, steps, consistency
        area: Option<String>,
    },

    /// Adjust targets and feature toggles
    Settings {
        /// Daily calorie target
        #[arg(long)]
        calorie_target: Option<u32>,

        /// Sleep target in hours
        #[arg(long)]
        sleep_target: Option<f64>,

        /// Daily step target
        #[arg(long)]
        step_target: Option<u32>,

        /// Goal weight in kg
        #[arg(long)]
        target_weight: Option<f64>,

        /// Goal date (YYYY-MM-DD)
        #[arg(long)]
        target_date: Option<NaiveDate>,

        /// Enable or disable promotion-mode doubling
        #[arg(long)]
        promotion_mode: Option<bool>,

        /// Show faith quests and quotes
        #[arg(long)]
        faith: Option<bool>,

        /// Reset visible rank when a new split starts
        #[arg(long)]
        reset_rank_on_split: Option<bool>,
    },

    /// Set this week's plan
    Plan {
        /// Focus area for the week
        focus: String,

        /// The commitment, in your own words
        promise: String,
    },

    /// Archive the current split and start a new one
    Split {
        /// Name for the new split
        name: String,
    },

    /// Export a backup file
    Export {
        /// Output path (defaults to a dated file in the current directory)
        path: Option<std::path::PathBuf>,
    },

    /// Restore from a backup file (replaces current state)
    Import {
        path: std::path::PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete all local data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match cli.state_file {
        Some(path) => shape_common::StateStore::new(path),
        None => shape_common::StateStore::new(shape_common::StateStore::default_path()),
    };

    match cli.command {
        Commands::Onboard => commands::onboard(&store),
        Commands::Log {
            date,
            calories,
            weight,
            steps,
            sleep,
            quality,
            notes,
            reflection,
            tag,
        } => commands::log(
            &store, date, calories, weight, steps, sleep, quality, notes, reflection, tag,
        ),
        Commands::Status => commands::status(&store),
        Commands::Rank { limit } => commands::rank(&store, limit),
        Commands::Quests => commands::quests(&store),
        Commands::Mastery => commands::mastery(&store),
        Commands::Grace { date } => commands::grace(&store, date),
        Commands::Records => commands::records(&store),
        Commands::Theme { id } => commands::theme(&store, id),
        Commands::Focus { area } => commands::focus(&store, area),
        Commands::Settings {
            calorie_target,
            sleep_target,
            step_target,
            target_weight,
            target_date,
            promotion_mode,
            faith,
            reset_rank_on_split,
        } => commands::settings(
            &store,
            shape_engine::ProfileUpdate {
                calorie_target,
                sleep_target_hours: sleep_target,
                target_steps: step_target,
                target_weight,
                target_date,
                promotion_mode_enabled: promotion_mode,
                show_faith_quotes: faith,
                show_faith_quests: faith,
                reset_rank_on_split,
                ..Default::default()
            },
        ),
        Commands::Plan { focus, promise } => commands::plan(&store, &focus, &promise),
        Commands::Split { name } => commands::split(&store, &name),
        Commands::Export { path } => commands::export(&store, path),
        Commands::Import { path, yes } => commands::import(&store, &path, yes),
        Commands::Reset { yes } => commands::reset(&store, yes),
    }
}
