pub mod jmc;

pub use jmc::{ForestBuilder, JmcLine, JmcParseError, parse_jmc};
