mod rate_limiter;
mod reconcile;
mod repair;
mod scheduler;
mod summary;
mod check;

pub use self::rate_limiter::*;
pub use self::reconcile::*;
pub use self::repair::*;
pub use self::scheduler::*;
pub use self::summary::*;
pub use self::check::*;
