//! CLI subcommand implementations for sui-ptb

pub mod decode;
pub mod encode;
pub mod output;
