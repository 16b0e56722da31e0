use std::io::{self, Write};

use serde::Serialize;
use tracing::info;

use crate::app::{CatalogResult, ProgressEvent, ProgressSink, RunResult};
use crate::consortium::ConsortiumResult;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_consortium(result: &ConsortiumResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_catalog(result: &CatalogResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        let elapsed_ms = event.elapsed.map(|elapsed| elapsed.as_millis() as u64);
        info!(phase = ?event.phase, elapsed_ms, "{}", event.message);
    }
}
