#[macro_export]
macro_rules! include_modules {
    () => {
        extern crate env_logger;
        pub mod m3u_checker_error;
        pub mod model;
        pub mod processing;
        pub mod repository;
        pub mod utils;
    }
}
