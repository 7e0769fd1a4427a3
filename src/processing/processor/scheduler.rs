use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, FixedOffset, Local};
use cron::Schedule;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::model::ScheduleConfig;

fn duration_until(datetime: DateTime<FixedOffset>) -> Duration {
    let target: SystemTime = datetime.into();
    target.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone)]
pub enum CheckSchedule {
    Interval(Duration),
    Cron(Box<Schedule>),
}

impl CheckSchedule {
    /// A cron expression takes precedence over the interval.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, M3uCheckerError> {
        match config.cron.as_ref() {
            Some(expression) => Schedule::from_str(expression)
                .map(|schedule| Self::Cron(Box::new(schedule)))
                .map_err(|err| info_err!("invalid cron expression '{}': {}", expression, err)),
            None if config.interval_secs == 0 => Err(info_err!("schedule interval must be greater than 0")),
            None => Ok(Self::Interval(Duration::from_secs(config.interval_secs))),
        }
    }

    /// Wait time until the next cycle starts.
    pub fn next_delay(&self) -> Duration {
        match self {
            Self::Interval(interval) => *interval,
            Self::Cron(schedule) => {
                let offset = *Local::now().offset();
                schedule.upcoming(offset).next().map_or(Duration::ZERO, duration_until)
            }
        }
    }
}

/// Runs `cycle` now and then on every tick of `schedule` until `cancel` fires.
/// A running cycle is never interrupted, cancellation takes effect before the next one.
/// Returns the number of completed cycles.
pub async fn run_scheduled<F, Fut>(schedule: &CheckSchedule, cancel: &CancellationToken, mut cycle: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output=()>,
{
    let mut cycles = 0;
    while !cancel.is_cancelled() {
        cycle().await;
        cycles += 1;
        let delay = schedule.next_delay();
        info!("next check in {}s", delay.as_secs());
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = cancel.cancelled() => {}
        }
    }
    info!("scheduler stopped after {cycles} cycle(s)");
    cycles
}
