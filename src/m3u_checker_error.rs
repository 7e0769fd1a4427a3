use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use crate::utils::sanitize_sensitive_info;

#[macro_export]
macro_rules! create_m3u_checker_error {
     ($kind: expr, $($arg:tt)*) => {
        $crate::m3u_checker_error::M3uCheckerError::new($kind, format!($($arg)*))
    }
}
pub use create_m3u_checker_error;

#[macro_export]
macro_rules! create_m3u_checker_error_result {
     ($kind: expr, $($arg:tt)*) => {
        Err($crate::m3u_checker_error::M3uCheckerError::new($kind, format!($($arg)*)))
    }
}
pub use create_m3u_checker_error_result;

#[macro_export]
macro_rules! handle_m3u_checker_error_result {
    ($kind:expr, $result: expr) => {
        if let Err(err) = $result {
            return Err($crate::m3u_checker_error::M3uCheckerError::new($kind, err.to_string()));
        }
    }
}
pub use handle_m3u_checker_error_result;

#[macro_export]
macro_rules! info_err {
    ($($arg:tt)*) => {
        $crate::m3u_checker_error::M3uCheckerError::new($crate::m3u_checker_error::M3uCheckerErrorKind::Info, format!($($arg)*))
    }
}
pub use info_err;

#[macro_export]
macro_rules! notify_err {
    ($($arg:tt)*) => {
        $crate::m3u_checker_error::M3uCheckerError::new($crate::m3u_checker_error::M3uCheckerErrorKind::Notify, format!($($arg)*))
    }
}
pub use notify_err;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum M3uCheckerErrorKind {
    // configuration or usage problems
    Info,
    // the requested operation could not be carried out
    Notify,
}

#[derive(Debug)]
pub struct M3uCheckerError {
    pub kind: M3uCheckerErrorKind,
    pub message: String,
}

impl M3uCheckerError {
    pub const fn new(kind: M3uCheckerErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl Display for M3uCheckerError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "M3uChecker error: {}", self.message)
    }
}

impl Error for M3uCheckerError {}

pub fn to_io_error<E>(err: E) -> std::io::Error
where
    E: std::error::Error,
{
    std::io::Error::other(sanitize_sensitive_info(&err.to_string()))
}

pub fn str_to_io_error(err: &str) -> std::io::Error {
    std::io::Error::other(sanitize_sensitive_info(err))
}

#[cfg(test)]
mod tests {
    use crate::m3u_checker_error::{M3uCheckerError, M3uCheckerErrorKind};

    fn failing(name: &str) -> Result<(), M3uCheckerError> {
        create_m3u_checker_error_result!(M3uCheckerErrorKind::Notify, "cant read {}", name)
    }

    #[test]
    fn test_error_result_macro() {
        let err = failing("playlist.m3u").unwrap_err();
        assert_eq!(err.kind, M3uCheckerErrorKind::Notify);
        assert_eq!(err.to_string(), "M3uChecker error: cant read playlist.m3u");
    }

    #[test]
    fn test_info_err_kind() {
        let err = info_err!("invalid value {}", 3);
        assert_eq!(err.kind, M3uCheckerErrorKind::Info);
        assert_eq!(err.message, "invalid value 3");
    }
}
