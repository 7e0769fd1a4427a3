pub mod parser;
pub mod probe;
pub mod processor;
pub mod resolver;
