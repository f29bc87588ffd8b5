use clap::{Parser, Subcommand};

pub const REDIS_URL_ENV: &str = "EVANESCE_REDIS_URL";
pub const KEY_PREFIX_ENV: &str = "EVANESCE_KEY_PREFIX";
pub const ID_LENGTH_ENV: &str = "EVANESCE_ID_LENGTH";
pub const TIMEOUT_MS_ENV: &str = "EVANESCE_TIMEOUT_MS";
pub const MAX_ATTEMPTS_ENV: &str = "EVANESCE_MAX_ATTEMPTS";
pub const LOG_JSON_ENV: &str = "EVANESCE_LOG_JSON";

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_KEY_PREFIX: &str = "paste:";

#[derive(Debug, Parser)]
#[command(
    name = "evanesce",
    about = "Store and read self-destructing text pastes"
)]
pub struct CLI {
    #[arg(
        long,
        global = true,
        env = REDIS_URL_ENV,
        default_value = DEFAULT_REDIS_URL
    )]
    pub redis_url: String,

    #[arg(
        long,
        global = true,
        env = KEY_PREFIX_ENV,
        default_value = DEFAULT_KEY_PREFIX
    )]
    pub key_prefix: String,

    /// Length of generated paste ids.
    #[arg(long, global = true, env = ID_LENGTH_ENV, default_value_t = 8)]
    pub id_length: usize,

    /// Timeout for each Redis operation, in milliseconds.
    #[arg(long, global = true, env = TIMEOUT_MS_ENV, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Ids tried per paste when a generated id is already taken.
    #[arg(long, global = true, env = MAX_ATTEMPTS_ENV, default_value_t = 3)]
    pub max_attempts: u32,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = LOG_JSON_ENV)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a paste and print its id as JSON.
    Create {
        /// Paste content. Read from stdin when omitted.
        #[arg(long)]
        content: Option<String>,

        /// Seconds until the paste expires.
        #[arg(long, allow_hyphen_values = true)]
        expires_in: Option<String>,

        /// Number of reads before the paste is destroyed.
        #[arg(long, allow_hyphen_values = true)]
        max_views: Option<String>,
    },
    /// Print a paste's content, consuming one view.
    Read {
        id: String,

        /// Print content and metadata as JSON.
        #[arg(long)]
        json: bool,
    },
}
