use crate::model::LogLevelConfig;
use crate::utils::{read_resolved_text, ENV_LOG_LEVEL};
use env_logger::{Builder, Target};
use log::{error, info, LevelFilter};
use std::path::Path;

const LOG_ERROR_LEVEL_MOD: &[&str] = &[
    "reqwest::async_impl::client",
    "reqwest::connect",
    "hyper_util::client",
];

fn get_log_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Builds the `module=level` filters for a level expression like `info,reqwest=warn`.
fn parse_log_levels(log_level: &str) -> Vec<(Option<String>, LevelFilter)> {
    let mut levels = vec![];
    for pair in log_level.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if pair.contains('=') {
            let mut kv_iter = pair.split('=').map(str::trim);
            if let (Some(module), Some(level)) = (kv_iter.next(), kv_iter.next()) {
                levels.push((Some(module.to_string()), get_log_level(level)));
            }
        } else {
            levels.push((None, get_log_level(pair)));
        }
    }
    levels
}

pub fn init_logger(user_log_level: Option<&String>, config_file: &str) {
    let env_log_level = std::env::var(ENV_LOG_LEVEL).ok();

    let mut log_builder = Builder::from_default_env();
    log_builder.target(Target::Stdout);

    // priority  CLI-Argument, Env-Var, Config, Default
    let log_level = user_log_level
        .map(std::string::ToString::to_string)
        .or(env_log_level)
        .or_else(|| {
            read_resolved_text(Path::new(config_file)).ok()
                .and_then(|content| serde_yaml::from_str::<LogLevelConfig>(&content)
                    .map_err(|e| error!("Failed to parse log config file: {e}"))
                    .ok())
                .and_then(|cfg| cfg.log.and_then(|l| l.log_level))
        })
        .unwrap_or_else(|| "info".to_string());

    let mut log_levels = vec![];
    for (module, level) in parse_log_levels(&log_level) {
        if let Some(module_name) = module {
            log_levels.push(format!("{module_name}={level}"));
            log_builder.filter_module(&module_name, level);
        } else {
            log_levels.push(level.to_string());
            log_builder.filter_level(level);
        }
    }
    for module in LOG_ERROR_LEVEL_MOD {
        log_builder.filter_module(module, LevelFilter::Error);
    }
    log_builder.init();
    info!("Log Level {}", &log_levels.join(", "));
}

#[cfg(test)]
mod tests {
    use crate::utils::logging::parse_log_levels;
    use log::LevelFilter;

    #[test]
    fn test_parse_log_levels() {
        let levels = parse_log_levels("debug, m3u_checker::processing=trace,reqwest=warn");
        assert_eq!(levels, vec![
            (None, LevelFilter::Debug),
            (Some("m3u_checker::processing".to_string()), LevelFilter::Trace),
            (Some("reqwest".to_string()), LevelFilter::Warn),
        ]);
    }

    #[test]
    fn test_unknown_level_is_info() {
        assert_eq!(parse_log_levels("verbose"), vec![(None, LevelFilter::Info)]);
    }
}
