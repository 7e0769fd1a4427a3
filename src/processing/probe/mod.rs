mod content;
mod liveness;
mod strategy;
mod transport;

pub use self::content::*;
pub use self::liveness::*;
pub use self::strategy::*;
pub use self::transport::*;
