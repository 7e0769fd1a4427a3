#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
mod modules;

include_modules!();

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::model::{Config, EntryFilter, ReconcilePolicy};
use crate::processing::probe::ReqwestTransport;
use crate::processing::processor::{exec_check, exec_repair, exec_suggest, run_scheduled, show_last_report, CheckSchedule, ReconciliationEngine};
use crate::processing::resolver::{resolve_with_timeout, YtDlpResolver};
use crate::utils::{create_client, get_default_config_file_path, init_logger, read_config, resolve_env_var, sanitize_sensitive_info, set_sanitize_sensitive_info};

#[derive(Parser)]
#[command(name = "m3u-checker")]
#[command(version)]
#[command(about = "M3U playlist liveness checker", long_about = None)]
struct Args {
    /// The config file
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// The playlist file, overrides config playlist
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// log level
    #[arg(short = 'l', long = "log-level", default_missing_value = "info")]
    log_level: Option<String>,

    /// Check only channels whose category contains this text
    #[arg(long, conflicts_with = "name")]
    category: Option<String>,

    /// Check only channels whose name contains this text
    #[arg(long)]
    name: Option<String>,

    /// Show the last report
    #[arg(long, default_value_t = false, default_missing_value = "true")]
    report: bool,

    /// Apply the substitutions file to the broken channels of the last report
    #[arg(long, default_value_t = false, default_missing_value = "true")]
    repair: bool,

    /// Print failure class, advice and replacement for each broken channel of the last report, writes nothing
    #[arg(long, default_value_t = false, default_missing_value = "true", conflicts_with = "repair")]
    suggest: bool,

    /// Repeat the check on schedule until Ctrl-C
    #[arg(long, default_value_t = false, default_missing_value = "true")]
    watch: bool,

    /// Keep broken channels in the playlist
    #[arg(long, default_value_t = false, default_missing_value = "true")]
    annotate: bool,

    /// Number of concurrent probes
    #[arg(long)]
    workers: Option<usize>,

    /// Ignore platform rules
    #[arg(long, default_value_t = false, default_missing_value = "true")]
    strict: bool,

    /// Resolve a video page url to a direct stream url
    #[arg(long = "resolve", value_name = "PAGE_URL")]
    resolve: Option<String>,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config_file = args.config_file.as_ref().map_or_else(get_default_config_file_path, |file| resolve_env_var(file));
    init_logger(args.log_level.as_ref(), &config_file);

    info!("Version: {VERSION}");
    if let Some(bts) = BUILD_TIMESTAMP.to_string().parse::<DateTime<Utc>>().ok().map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S %Z").to_string()) {
        info!("Build time: {bts}");
    }

    let mut config = read_config(&config_file).unwrap_or_else(|err| exit!("{}", err));
    apply_arguments(&mut config, &args);
    set_sanitize_sensitive_info(config.log.sanitize_sensitive_info);
    print_info(&config_file, &config);

    if let Some(page_url) = args.resolve.as_ref() {
        start_resolve(&config, page_url).await;
    } else if args.report {
        if let Err(err) = show_last_report(&config) {
            exit!("{}", err);
        }
    } else if args.suggest {
        if let Err(err) = exec_suggest(&config) {
            exit!("{}", err);
        }
    } else if args.repair {
        if let Err(err) = exec_repair(&config) {
            exit!("{}", err);
        }
    } else {
        let client = create_client(&config).unwrap_or_else(|err| exit!("{}", err));
        let engine = ReconciliationEngine::from_config(ReqwestTransport::new(client), &config, args.strict);
        let filter = entry_filter(&args);
        if args.watch {
            start_watch(&engine, &config, &filter).await;
        } else if let Err(err) = exec_check(&engine, &config, &filter).await {
            exit!("{}", err);
        }
    }
}

fn apply_arguments(config: &mut Config, args: &Args) {
    if let Some(input) = args.input.as_ref() {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        config.set_playlist(&resolve_env_var(input), &working_dir);
    }
    if args.annotate {
        config.policy = ReconcilePolicy::AnnotateOnly;
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            exit!("workers must be at least 1");
        }
        config.check.workers = workers;
    }
}

fn entry_filter(args: &Args) -> EntryFilter {
    if let Some(category) = args.category.as_ref() {
        EntryFilter::Category(category.to_string())
    } else if let Some(name) = args.name.as_ref() {
        EntryFilter::Name(name.to_string())
    } else {
        EntryFilter::All
    }
}

fn print_info(config_file: &str, config: &Config) {
    info!("Current time: {}", chrono::offset::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("Config file: {config_file}");
    info!("Playlist: {}", config.playlist_path.display());
    info!("Report file: {}", config.report_path.display());
    info!("Policy: {}", config.policy);
}

async fn start_resolve(config: &Config, page_url: &str) {
    let resolver = YtDlpResolver::from_config(&config.resolver);
    let timeout = Duration::from_secs(config.resolver.timeout_secs);
    match resolve_with_timeout(&resolver, page_url, timeout).await {
        Ok(Some(url)) => println!("{url}"),
        Ok(None) => println!("no stream found for {}", sanitize_sensitive_info(page_url)),
        Err(err) => exit!("{}", err),
    }
}

async fn start_watch(engine: &ReconciliationEngine<ReqwestTransport>, config: &Config, filter: &EntryFilter) {
    let schedule = CheckSchedule::from_config(&config.schedule).unwrap_or_else(|err| exit!("{}", err));
    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stopping after the current check");
            stopper.cancel();
        }
    });
    run_scheduled(&schedule, &cancel, move || async move {
        if let Err(err) = exec_check(engine, config, filter).await {
            error!("{err}");
        }
    }).await;
}
