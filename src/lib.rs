//! Download the customs FTS workbooks and reduce them to one commodity extract.

pub mod config;
pub mod export;
pub mod fetch;
pub mod history;
pub mod pipeline;
pub mod process;

pub use config::{Config, FetchConfig, InputFile, MergeConfig, OutputFormat};
pub use process::{Cell, Table, TableError};
