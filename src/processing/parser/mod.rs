mod m3u;

pub use self::m3u::*;
