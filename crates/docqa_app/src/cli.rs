use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use docqa_logging::LogDestination;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "docqa",
    author,
    version,
    about = "Upload a PDF to a document Q&A service and ask questions about it",
    long_about = None
)]
pub struct Args {
    /// Base URL of the document service (e.g., http://127.0.0.1:8000/)
    #[arg(long, env = "DOCQA_SERVER")]
    pub server: Option<String>,

    /// RON config file. Without this flag `docqa.ron` is read if it exists.
    #[arg(long, env = "DOCQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Log at debug level (includes question and answer text)
    #[arg(short, long)]
    pub verbose: bool,

    /// PDF to preselect for upload
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
