//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Case trends command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the web server should listen
    #[arg(long, default_value = "127.0.0.1", env = "CASE_TRENDS_HOST")]
    pub host: String,
    /// The port to which the web server should bind
    #[arg(long, default_value_t = 5000, env = "CASE_TRENDS_PORT")]
    pub port: u16,
    /// The IP address on which the monitor should listen
    #[arg(long, default_value = "0.0.0.0", env = "CASE_TRENDS_MONITOR_HOST")]
    pub monitor_host: String,
    /// The port to which the monitor should bind
    #[arg(long, default_value_t = 4040, env = "CASE_TRENDS_MONITOR_PORT")]
    pub monitor_port: u16,
    /// Path to the CSV data file
    #[arg(
        long,
        default_value = "data/covid_case_trends_sample.csv",
        env = "CASE_TRENDS_DATA_FILE"
    )]
    pub data_file: String,
    /// Load the data file at start-up rather than on the first query
    #[arg(long, default_value_t = false, env = "CASE_TRENDS_EAGER_LOAD")]
    pub eager_load: bool,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "CASE_TRENDS_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/case-trends/certs/cert.pem",
        env = "CASE_TRENDS_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/case-trends/certs/key.pem",
        env = "CASE_TRENDS_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for queries to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "CASE_TRENDS_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "CASE_TRENDS_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Whether to use Rayon for execution of trend aggregations.
    #[arg(long, default_value_t = false, env = "CASE_TRENDS_USE_RAYON")]
    pub use_rayon: bool,
    /// Maximum number of trend aggregations to run at once.
    /// Defaults to the number of CPUs minus one.
    #[arg(long, env = "CASE_TRENDS_THREAD_LIMIT")]
    pub thread_limit: Option<usize>,
    /// Number of completed jobs kept for the monitor.
    #[arg(long, default_value_t = 100, env = "CASE_TRENDS_JOB_HISTORY")]
    pub job_history: usize,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
