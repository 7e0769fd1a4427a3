mod m3u_repository;
mod report_repository;
mod substitution_repository;

pub use self::m3u_repository::*;
pub use self::report_repository::*;
pub use self::substitution_repository::*;
