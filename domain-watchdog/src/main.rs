//! Domain Watchdog CLI Application
//!
//! Checks that a list of domains is still registered. The process exit code
//! tells a scheduler whether any domain became available or could not be
//! checked.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_watchdog_lib::{
    load_env_config, parse_timeout_string, split_domain_list, ConfigManager, EnvConfig,
    FileConfig,
};
use domain_watchdog_lib::{CheckConfig, DomainReport, DomainWatchdog, Outcome};
use std::process;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-watchdog
#[derive(Parser, Debug)]
#[command(name = "domain-watchdog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify that domains are still registered using WHOIS")]
#[command(
    long_about = "Verify that domains are still registered using WHOIS.\n\nExit codes: 0 all domains are given, 1 fatal error, 2 at least one domain is available, 3 at least one domain could not be checked."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to check
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub positional: Vec<String>,

    /// Domains to check (comma-separated or multiple --domains flags)
    #[arg(long = "domains", value_name = "DOMAIN", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Domain Selection")]
    pub domains: Option<Vec<String>>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Max concurrent WHOIS lookups (default: 10, max: 100)
    #[arg(short = 'c', long = "concurrency", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Timeout per network step, e.g. "5s", "2m" (default: 10s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,
}

/// Result class of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every domain is registered
    AllGiven,
    /// Nothing was checked: bad flags, bad config or no domains
    Fatal,
    /// At least one domain is not registered
    Available,
    /// At least one domain could not be checked and none is available
    UnknownError,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::AllGiven => 0,
            ExitStatus::Fatal => 1,
            ExitStatus::Available => 2,
            ExitStatus::UnknownError => 3,
        }
    }

    /// Class of a single report.
    ///
    /// Any error wins, including a response that could not be parsed. A
    /// domain with no error that is not registered counts as available,
    /// `Outcome::Unknown` included.
    pub fn of_report(report: &DomainReport) -> Self {
        match (report.outcome, &report.error) {
            (_, Some(_)) | (None, None) => ExitStatus::UnknownError,
            (Some(Outcome::Registered), None) => ExitStatus::AllGiven,
            (Some(_), None) => ExitStatus::Available,
        }
    }

    /// Combine per-report classes. Available takes precedence over errors.
    pub fn aggregate<I: IntoIterator<Item = ExitStatus>>(statuses: I) -> Self {
        statuses
            .into_iter()
            .fold(ExitStatus::AllGiven, |result, status| match (result, status) {
                (ExitStatus::Available, _) | (_, ExitStatus::Available) => ExitStatus::Available,
                (_, ExitStatus::UnknownError | ExitStatus::Fatal) => ExitStatus::UnknownError,
                (result, ExitStatus::AllGiven) => result,
            })
    }
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(ExitStatus::Fatal.code());
        }
    };

    init_logging(args.debug);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(ExitStatus::Fatal.code());
    }

    match run(args).await {
        Ok(status) => process::exit(status.code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(ExitStatus::Fatal.code());
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    let blank_flag = args.domains.iter().flatten().any(|d| d.trim().is_empty());
    let blank_positional = args
        .positional
        .iter()
        .any(|arg| arg.split(',').any(|d| d.trim().is_empty()));
    if blank_flag || blank_positional {
        return Err("Domain list contains an empty entry".to_string());
    }

    Ok(())
}

async fn run(args: Args) -> Result<ExitStatus, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;

    let config = build_config(&args, &env_config, &file_config);
    let domains = resolve_domains(&args, &env_config, &file_config);
    if domains.is_empty() {
        return Err("No domains given. Use --domains, DOMAINS arguments or DW_DOMAINS".into());
    }

    let json = args.json
        || env_config
            .json
            .or_else(|| file_config.defaults.as_ref().and_then(|d| d.json))
            .unwrap_or(false);

    debug!(
        domains = domains.len(),
        concurrency = config.concurrency,
        timeout = ?config.timeout,
        "Starting domain checks"
    );

    let watchdog = DomainWatchdog::with_config(config);
    let start_time = Instant::now();
    let reports = watchdog.check_domains(&domains).await;
    let duration = start_time.elapsed();

    let status = log_reports(&reports);

    if json {
        ui::print_json_reports(&reports)?;
    } else {
        ui::print_text_reports(&reports, duration);
    }

    Ok(status)
}

/// Log every report, then combine their exit classes.
fn log_reports(reports: &[DomainReport]) -> ExitStatus {
    let statuses: Vec<ExitStatus> = reports.iter().map(log_report).collect();
    ExitStatus::aggregate(statuses)
}

/// Log the result of one domain and return its exit class.
fn log_report(report: &DomainReport) -> ExitStatus {
    let status = ExitStatus::of_report(report);
    let outcome = report.outcome.map(|o| o.description()).unwrap_or("none");

    match status {
        ExitStatus::UnknownError => warn!(
            domain = %report.domain,
            error = report.error.as_deref().unwrap_or_default(),
            "cannot determine status of domain"
        ),
        ExitStatus::Available => info!(domain = %report.domain, outcome, "domain is available"),
        _ => info!(domain = %report.domain, outcome, "status of domain"),
    }

    status
}

/// Load the config file named by `--config` or `DW_CONFIG`, else discover one.
///
/// An explicit file that cannot be loaded is fatal; discovery never is.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let explicit = args.config.as_ref().or(env_config.config.as_ref());
    if let Some(path) = explicit {
        debug!(path = %path, "Using explicit config file");
        return config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e).into());
    }

    Ok(config_manager.discover_and_load()?)
}

/// Build the check configuration. CLI > environment > file > defaults.
fn build_config(args: &Args, env_config: &EnvConfig, file_config: &FileConfig) -> CheckConfig {
    let config = merge_file_config_into_check_config(CheckConfig::default(), file_config);
    let config = apply_environment_config(config, env_config);
    apply_cli_args_to_config(config, args)
}

fn merge_file_config_into_check_config(
    mut config: CheckConfig,
    file_config: &FileConfig,
) -> CheckConfig {
    if let Some(defaults) = &file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout_secs) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            config = config.with_timeout(Duration::from_secs(timeout_secs));
        }
    }

    if let Some(servers) = &file_config.servers {
        for (tld, server) in servers {
            config = config.with_server(tld.as_str(), server.trim());
        }
    }

    config
}

fn apply_environment_config(mut config: CheckConfig, env_config: &EnvConfig) -> CheckConfig {
    if let Some(concurrency) = env_config.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout_secs) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        config = config.with_timeout(Duration::from_secs(timeout_secs));
    }
    config
}

fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout_secs) = args.timeout.as_deref().and_then(parse_timeout_string) {
        config = config.with_timeout(Duration::from_secs(timeout_secs));
    }
    config
}

/// Domains from the command line, else `DW_DOMAINS`, else the config file.
fn resolve_domains(args: &Args, env_config: &EnvConfig, file_config: &FileConfig) -> Vec<String> {
    let cli: Vec<String> = args
        .positional
        .iter()
        .flat_map(|arg| split_domain_list(arg))
        .chain(args.domains.iter().flatten().map(|d| d.trim().to_string()))
        .collect();
    if !cli.is_empty() {
        return cli;
    }

    if let Some(domains) = &env_config.domains {
        return domains.clone();
    }

    file_config
        .defaults
        .as_ref()
        .and_then(|d| d.domains.clone())
        .unwrap_or_default()
}
