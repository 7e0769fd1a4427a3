mod config;
mod config_log;
mod config_probe;
mod playlist;
mod probe;
mod report;

pub use self::config::*;
pub use self::config_log::*;
pub use self::config_probe::*;
pub use self::playlist::*;
pub use self::probe::*;
pub use self::report::*;
