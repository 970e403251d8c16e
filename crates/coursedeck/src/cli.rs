//! Clap derive structures for the `coursedeck` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use coursedeck_core::Category;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// coursedeck -- browse and edit courses from the command line
#[derive(Debug, Parser)]
#[command(
    name = "coursedeck",
    version,
    about = "Browse and edit courses from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides the config file)
    #[arg(long, short = 'u', env = "COURSEDECK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "COURSEDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "COURSEDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Beginner,
    Advanced,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Beginner => Category::Beginner,
            CategoryArg::Advanced => Category::Advanced,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List courses, grouped into beginner and advanced views
    #[command(alias = "ls")]
    Courses(CoursesArgs),

    /// Edit a course (applied locally first, then saved)
    Save(SaveArgs),

    /// Log in and remember the session
    Login(LoginArgs),

    /// Forget the remembered session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Courses ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoursesArgs {
    /// Only show one category
    #[arg(long, short = 'c')]
    pub category: Option<CategoryArg>,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Course ID
    pub id: String,

    /// New short description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New long description
    #[arg(long)]
    pub long_description: Option<String>,

    /// Move the course to another category
    #[arg(long, short = 'c')]
    pub category: Option<CategoryArg>,

    /// New display position
    #[arg(long, allow_negative_numbers = true)]
    pub seq_no: Option<i64>,

    /// Mark or unmark the course as promoted
    #[arg(long)]
    pub promo: Option<bool>,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Account password (prompted for when absent)
    #[arg(long, env = "COURSEDECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the resolved configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
