//! Clap derive structures for the `guardly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// guardly -- manage AdGuard Home from the command line
#[derive(Debug, Parser)]
#[command(
    name = "guardly",
    version,
    about = "Manage AdGuard Home DNS filtering from the command line",
    long_about = "A CLI for administering AdGuard Home servers.\n\n\
        Detects the server version, gates features it cannot serve,\n\
        and merges every write into the current remote record.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "GUARDLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Web interface URL (overrides profile)
    #[arg(long, env = "GUARDLY_URL", global = true)]
    pub url: Option<String>,

    /// Web interface username (overrides profile)
    #[arg(long, env = "GUARDLY_USERNAME", global = true)]
    pub username: Option<String>,

    /// Web interface password
    #[arg(long, env = "GUARDLY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "GUARDLY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GUARDLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GUARDLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalOpts {
    /// The selected output format.
    pub fn output(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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

/// `on` / `off` positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Self::On
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Server version and protection overview
    #[command(alias = "st")]
    Status,

    /// Dump the full reconciled snapshot
    Snapshot,

    /// Poll the server and print each change
    Watch(WatchArgs),

    /// Global DNS protection
    Protection(ProtectionArgs),

    /// Safe browsing (malware and phishing domains)
    SafeBrowsing(ToggleArgs),

    /// Parental control
    Parental(ToggleArgs),

    /// Safe search enforcement
    SafeSearch(SafeSearchArgs),

    /// Manage persistent clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Manage filter lists
    #[command(alias = "f")]
    Filters(FiltersArgs),

    /// Manage blocked services
    Blocked(BlockedArgs),

    /// Manage DNS rewrites
    #[command(alias = "rw")]
    Rewrites(RewritesArgs),

    /// DNS server settings
    Dns(DnsArgs),

    /// DHCP server
    Dhcp(DhcpArgs),

    /// Query statistics
    Stats(StatsArgs),

    /// Query log
    #[command(alias = "ql")]
    Querylog(QuerylogArgs),

    /// Show how a host name would be filtered
    CheckHost(CheckHostArgs),

    /// Features the connected server supports
    #[command(alias = "caps")]
    Capabilities,

    /// Redacted diagnostics export
    Diagnostics,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Time between polls (e.g. "10s", "1m") [default: from profile]
    #[arg(long, short = 'i')]
    pub interval: Option<humantime::Duration>,
}

// ── Protection ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProtectionArgs {
    #[command(subcommand)]
    pub command: ProtectionCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProtectionCommand {
    /// Enable protection
    On,
    /// Disable protection
    Off,
    /// Disable protection for a while (e.g. "30s", "10m", "1h")
    Pause {
        duration: humantime::Duration,
    },
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    pub state: Toggle,
}

#[derive(Debug, Args)]
pub struct SafeSearchArgs {
    pub state: Toggle,

    /// Only change these engines (repeatable)
    #[arg(long = "engine", short = 'e')]
    pub engines: Vec<SearchEngine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchEngine {
    Bing,
    Duckduckgo,
    Ecosia,
    Google,
    Pixabay,
    Yandex,
    Youtube,
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List persistent clients
    #[command(alias = "ls")]
    List,

    /// Show one client
    Show { name: String },

    /// Look up clients by IP, MAC or ClientID
    Search {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add a persistent client
    Add {
        name: String,

        /// IP, CIDR, MAC or ClientID (repeatable)
        #[arg(long = "id", required_unless_present = "from_file")]
        ids: Vec<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Create from a JSON client record instead
        #[arg(long, conflicts_with_all = ["ids", "tags"])]
        from_file: Option<PathBuf>,
    },

    /// Remove a persistent client
    #[command(alias = "rm")]
    Remove { name: String },

    /// Change fields of a client; everything else is kept
    Update(ClientUpdateArgs),

    /// Replace the services blocked for one client
    SetBlockedServices {
        name: String,

        /// Service ids; none clears the list
        services: Vec<String>,

        /// JSON schedule file; the current schedule is kept when absent
        #[arg(long)]
        schedule_file: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ClientUpdateArgs {
    pub name: String,

    /// Rename the client
    #[arg(long)]
    pub rename: Option<String>,

    /// Replace identifiers (repeatable)
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Replace tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Replace upstream servers (repeatable)
    #[arg(long = "upstream")]
    pub upstreams: Vec<String>,

    #[arg(long)]
    pub use_global_settings: Option<bool>,

    #[arg(long)]
    pub filtering: Option<bool>,

    #[arg(long)]
    pub parental: Option<bool>,

    #[arg(long)]
    pub safe_browsing: Option<bool>,

    #[arg(long)]
    pub safe_search: Option<bool>,

    #[arg(long)]
    pub use_global_blocked_services: Option<bool>,

    #[arg(long)]
    pub ignore_querylog: Option<bool>,

    #[arg(long)]
    pub ignore_statistics: Option<bool>,
}

// ── Filters ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FiltersArgs {
    #[command(subcommand)]
    pub command: FiltersCommand,
}

#[derive(Debug, Subcommand)]
pub enum FiltersCommand {
    /// List block and allow lists
    #[command(alias = "ls")]
    List,

    /// Subscribe to a filter list
    Add {
        url: String,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        side: ListSide,
    },

    /// Unsubscribe from a filter list
    #[command(alias = "rm")]
    Remove {
        url: String,
        #[command(flatten)]
        side: ListSide,
    },

    /// Enable a filter list
    Enable {
        url: String,
        #[command(flatten)]
        side: ListSide,
    },

    /// Disable a filter list
    Disable {
        url: String,
        #[command(flatten)]
        side: ListSide,
    },

    /// Force an update of every list
    Refresh {
        #[command(flatten)]
        side: ListSide,
    },

    /// Turn filtering on or off globally
    Set {
        state: Toggle,
        /// Update check interval in hours
        #[arg(long)]
        interval: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct ListSide {
    /// Target the allowlist instead of the blocklist
    #[arg(long)]
    pub allowlist: bool,
}

// ── Blocked services ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BlockedArgs {
    #[command(subcommand)]
    pub command: BlockedCommand,
}

#[derive(Debug, Subcommand)]
pub enum BlockedCommand {
    /// Show the globally blocked services
    Global,

    /// Replace the global list; a missing schedule clears the current one
    Set {
        services: Vec<String>,

        /// JSON schedule file
        #[arg(long)]
        schedule_file: Option<PathBuf>,
    },

    /// Add one service to the global list
    Block { id: String },

    /// Remove one service from the global list
    Unblock { id: String },

    /// Services the server knows how to block
    Catalog,
}

// ── Rewrites ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RewritesArgs {
    #[command(subcommand)]
    pub command: RewritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RewritesCommand {
    /// List DNS rewrites
    #[command(alias = "ls")]
    List,
    /// Add a rewrite
    Add(RewriteTarget),
    /// Remove a rewrite
    #[command(alias = "rm")]
    Remove(RewriteTarget),
    /// Enable a rewrite
    Enable(RewriteTarget),
    /// Disable a rewrite without deleting it
    Disable(RewriteTarget),
}

#[derive(Debug, Args)]
pub struct RewriteTarget {
    /// Domain, wildcards allowed (e.g. "*.example.lan")
    pub domain: String,
    /// IP address, CNAME target, "A" or "AAAA"
    pub answer: String,
}

// ── DNS / DHCP ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DnsArgs {
    #[command(subcommand)]
    pub command: DnsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DnsCommand {
    /// Show DNS server settings
    Show,
    /// Change DNS server settings
    Set(DnsSetArgs),
}

#[derive(Debug, Args)]
pub struct DnsSetArgs {
    /// Upstream server (repeatable, replaces the list)
    #[arg(long = "upstream")]
    pub upstreams: Vec<String>,

    /// Bootstrap server (repeatable, replaces the list)
    #[arg(long = "bootstrap")]
    pub bootstraps: Vec<String>,

    #[arg(long)]
    pub ratelimit: Option<u32>,

    /// e.g. "default", "refused", "nxdomain", "null_ip"
    #[arg(long)]
    pub blocking_mode: Option<String>,

    #[arg(long)]
    pub edns_cs: Option<bool>,

    #[arg(long)]
    pub dnssec: Option<bool>,

    /// Cache size in bytes
    #[arg(long)]
    pub cache_size: Option<u64>,

    #[arg(long)]
    pub cache_ttl_min: Option<u32>,

    #[arg(long)]
    pub cache_ttl_max: Option<u32>,

    /// Toggle the cache without touching its size
    #[arg(long)]
    pub cache_enabled: Option<bool>,
}

#[derive(Debug, Args)]
pub struct DhcpArgs {
    #[command(subcommand)]
    pub command: DhcpCommand,
}

#[derive(Debug, Subcommand)]
pub enum DhcpCommand {
    /// List DHCP leases
    Leases {
        /// Static leases only
        #[arg(long = "static")]
        static_only: bool,
    },
}

// ── Stats / query log ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Counters and top lists
    Show,
    /// Reset all statistics
    Reset,
    /// Change statistics retention
    Config(RetentionArgs),
}

#[derive(Debug, Args)]
pub struct QuerylogArgs {
    #[command(subcommand)]
    pub command: QuerylogCommand,
}

#[derive(Debug, Subcommand)]
pub enum QuerylogCommand {
    /// Recent queries
    Show {
        #[arg(long, short = 'l', default_value = "25")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Domain or client substring
        #[arg(long, short = 's')]
        search: Option<String>,
        /// e.g. "blocked", "processed", "whitelisted"
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete the whole query log
    Clear,
    /// Change query log retention
    Config {
        #[command(flatten)]
        retention: RetentionArgs,
        #[arg(long)]
        anonymize_client_ip: Option<bool>,
    },
}

#[derive(Debug, Args)]
pub struct RetentionArgs {
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Retention period (e.g. "24h", "7days", "90days")
    #[arg(long)]
    pub interval: Option<humantime::Duration>,

    /// Domain excluded from recording (repeatable, replaces the list)
    #[arg(long = "ignore")]
    pub ignored: Vec<String>,
}

// ── Check host ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckHostArgs {
    pub name: String,

    /// Evaluate as this client (IP or ClientID)
    #[arg(long)]
    pub client: Option<String>,

    /// DNS record type, e.g. "AAAA"
    #[arg(long)]
    pub qtype: Option<String>,
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
    /// Show the current configuration (passwords masked)
    Show,
    /// Set a profile value
    Set { key: String, value: String },
    /// List profiles
    Profiles,
    /// Make a profile the default
    Use { name: String },
    /// Store a profile's password in the system keyring
    SetPassword {
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}
