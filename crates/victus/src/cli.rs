//! Clap derive structures for the `victus` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use victus_core::{DwellingStatus, DwellingType};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// victus -- catalog console for Victus Viviendas
#[derive(Debug, Parser)]
#[command(
    name = "victus",
    version,
    about = "Manage the Victus Viviendas residential catalog from the command line",
    long_about = "Reads and edits the reference catalogs (departments, cities,\n\
        residential complexes, administrators) and the dwellings of each complex.\n\n\
        `victus watch` follows the live event streams and reports sync state.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "VICTUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Catalog REST base URL (overrides profile)
    #[arg(long, short = 'u', env = "VICTUS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Event-stream base URL (overrides profile)
    #[arg(long, env = "VICTUS_STREAM_URL", global = true)]
    pub stream_url: Option<String>,

    /// API gateway subscription key
    #[arg(long, env = "VICTUS_SUBSCRIPTION_KEY", global = true, hide_env_values = true)]
    pub subscription_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VICTUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VICTUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage departments
    #[command(alias = "dep", alias = "departamentos")]
    Departments(DepartmentsArgs),

    /// Manage cities
    #[command(alias = "ciudades")]
    Cities(CitiesArgs),

    /// Manage residential complexes
    #[command(alias = "cx", alias = "conjuntos")]
    Complexes(ComplexesArgs),

    /// View administrators
    #[command(alias = "admins", alias = "administradores")]
    Administrators(AdministratorsArgs),

    /// Manage the dwellings of a residential complex
    #[command(alias = "viviendas")]
    Dwellings(DwellingsArgs),

    /// Follow the live catalogs and report sync state until Ctrl-C
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),
}

// ── Departments ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DepartmentsArgs {
    #[command(subcommand)]
    pub command: DepartmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DepartmentsCommand {
    /// List departments
    #[command(alias = "ls")]
    List {
        /// Only names containing this text
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a department
    Create {
        #[arg(long)]
        name: String,
    },

    /// Rename a department
    Update {
        id: String,
        #[arg(long)]
        name: String,
    },

    /// Delete a department and, locally, its cities and complexes
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Cities ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CitiesArgs {
    #[command(subcommand)]
    pub command: CitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CitiesCommand {
    /// List cities
    #[command(alias = "ls")]
    List {
        /// Only cities of this department
        #[arg(long, short = 'd')]
        department: Option<String>,
        /// Only names containing this text
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a city
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, short = 'd')]
        department: String,
    },

    /// Update a city
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, short = 'd')]
        department: String,
    },

    /// Delete a city
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Complexes ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ComplexesArgs {
    #[command(subcommand)]
    pub command: ComplexesCommand,
}

#[derive(Debug, Args)]
pub struct ComplexFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, short = 'd')]
    pub department: String,
    #[arg(long, short = 'c')]
    pub city: String,
    #[arg(long, short = 'a')]
    pub administrator: String,
}

#[derive(Debug, Subcommand)]
pub enum ComplexesCommand {
    /// List residential complexes with resolved names
    #[command(alias = "ls")]
    List {
        #[arg(long, short = 'd', conflicts_with_all = ["city", "administrator", "name"])]
        department: Option<String>,
        #[arg(long, short = 'c', conflicts_with_all = ["administrator", "name"])]
        city: Option<String>,
        #[arg(long, short = 'a', conflicts_with = "name")]
        administrator: Option<String>,
        /// Only names containing this text
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a residential complex
    Create(ComplexFields),

    /// Update a residential complex
    Update {
        id: String,
        #[command(flatten)]
        fields: ComplexFields,
    },

    /// Delete a residential complex
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Administrators ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AdministratorsArgs {
    #[command(subcommand)]
    pub command: AdministratorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdministratorsCommand {
    /// List administrators
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete an administrator
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Dwellings ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DwellingsArgs {
    #[command(subcommand)]
    pub command: DwellingsCommand,
}

#[derive(Debug, Args)]
pub struct DwellingFields {
    /// Dwelling number (e.g. 101, 2B)
    #[arg(long)]
    pub number: String,
    #[arg(long = "type", value_enum, default_value = "apartment")]
    pub dwelling_type: DwellingTypeArg,
    #[arg(long, value_enum, default_value = "available")]
    pub status: DwellingStatusArg,
}

#[derive(Debug, Subcommand)]
pub enum DwellingsCommand {
    /// List the dwellings of a complex
    #[command(alias = "ls")]
    List {
        complex: String,
        /// Match number, type or status
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Register a dwelling in a complex
    Create {
        complex: String,
        #[command(flatten)]
        fields: DwellingFields,
    },

    /// Update a dwelling
    Update {
        complex: String,
        id: String,
        #[command(flatten)]
        fields: DwellingFields,
    },

    /// Delete a dwelling
    #[command(alias = "rm")]
    Delete { complex: String, id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DwellingTypeArg {
    Apartment,
    House,
    Duplex,
}

impl From<DwellingTypeArg> for DwellingType {
    fn from(arg: DwellingTypeArg) -> Self {
        match arg {
            DwellingTypeArg::Apartment => Self::Apartment,
            DwellingTypeArg::House => Self::House,
            DwellingTypeArg::Duplex => Self::Duplex,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DwellingStatusArg {
    Available,
    Occupied,
    Maintenance,
}

impl From<DwellingStatusArg> for DwellingStatus {
    fn from(arg: DwellingStatusArg) -> Self {
        match arg {
            DwellingStatusArg::Available => Self::Available,
            DwellingStatusArg::Occupied => Self::Occupied,
            DwellingStatusArg::Maintenance => Self::Maintenance,
        }
    }
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit as soon as the catalogs are live
    #[arg(long)]
    pub until_live: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Print the config file path
    Path,

    /// Show the loaded configuration (secrets masked)
    Show,

    /// List profile names
    Profiles,

    /// Set a key on the active profile
    Set {
        /// api_url, stream_url, subscription_key_env, timeout,
        /// retry_interval, page_size, optimistic_updates
        key: String,
        value: String,
    },

    /// Make a profile the default
    Use { name: String },
}
