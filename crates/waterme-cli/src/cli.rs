use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "waterme")]
#[command(about = "Keep track of your houseplants and when they need water")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name holding backend configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a plant
    #[command(alias = "new")]
    Add {
        /// Plant name
        name: String,
        /// Days between waterings
        #[arg(short, long, value_name = "DAYS", default_value_t = 3)]
        interval: u32,
        #[command(flatten)]
        details: PlantDetailArgs,
    },
    /// List your plants, soonest due first
    #[command(alias = "ls")]
    List {
        /// Refresh from the backend before listing
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one plant
    Show {
        /// Plant ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a plant
    Edit {
        /// Plant ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New number of days between waterings
        #[arg(short, long, value_name = "DAYS")]
        interval: Option<u32>,
        #[command(flatten)]
        details: PlantDetailArgs,
    },
    /// Record that a plant was watered just now
    Water {
        /// Plant ID
        id: String,
    },
    /// Show the watering history of a plant
    History {
        /// Plant ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a plant and its history
    #[command(alias = "rm")]
    Delete {
        /// Plant ID
        id: String,
    },
    /// Push local changes and pull your plants from the backend
    Sync,
    /// Check which plants need water
    Remind {
        /// Keep running and check periodically
        #[arg(long)]
        watch: bool,
        /// Seconds between checks in watch mode (at least 60)
        #[arg(long, value_name = "SECS")]
        interval_secs: Option<u64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage your WaterMe account
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

/// Optional plant fields shared by `add` and `edit`
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct PlantDetailArgs {
    /// Free-form description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Reference to a photo on this device
    #[arg(long, value_name = "URI")]
    pub photo: Option<String>,
    /// Light level on the 1-10 scale
    #[arg(long, value_name = "LEVEL", conflicts_with = "lux")]
    pub light: Option<f32>,
    /// Raw light sensor reading in lux, converted to the 1-10 scale
    #[arg(long, value_name = "LUX")]
    pub lux: Option<f32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Backend base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        request_timeout_secs: Option<u64>,
        /// Seconds between reminder checks
        #[arg(long, value_name = "SECS")]
        reminder_interval_secs: Option<u64>,
        /// Do not make this the active profile
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Log in and load your plants
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Show who is logged in
    Status,
    /// Change the password of the logged-in account
    ChangePassword {
        /// Current password
        #[arg(long)]
        current: String,
        /// New password
        #[arg(long)]
        new: String,
        /// New password again
        #[arg(long)]
        confirm: String,
    },
    /// Log out and clear cached plants
    Logout,
}
