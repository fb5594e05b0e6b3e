pub mod analyzers;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod join;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod publish;
pub mod records;
pub mod sources;
pub mod stats;
pub mod storage;
