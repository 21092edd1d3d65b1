//! Result sink.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::resolve::ResolutionResult;

/// Receives each result as soon as it is final.
pub trait ResultSink: Send {
    fn write_result(&mut self, result: &ResolutionResult) -> Result<()>;

    /// Flushes buffered output. Called once, after the last result.
    fn finish(&mut self) -> Result<()>;
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    original_url: &'a str,
    final_url: &'a str,
    status: &'a str,
    redirect_count: usize,
    strategy: &'a str,
    elapsed_ms: u64,
    id: Option<&'a str>,
    model: Option<&'a str>,
}

impl<'a> From<&'a ResolutionResult> for CsvRecord<'a> {
    fn from(result: &'a ResolutionResult) -> Self {
        let context = result.row_context.as_ref();
        Self {
            original_url: &result.original_url,
            final_url: &result.final_url,
            status: result.status.as_str(),
            redirect_count: result.redirect_count,
            strategy: &result.strategy_used,
            elapsed_ms: result.elapsed_ms,
            id: context.and_then(|c| c.id.as_deref()),
            model: context.and_then(|c| c.model.as_deref()),
        }
    }
}

/// CSV output: a header, then one record per result in completion order.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}

impl CsvSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl CsvSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ResultSink for CsvSink<W> {
    fn write_result(&mut self, result: &ResolutionResult) -> Result<()> {
        self.writer
            .serialize(CsvRecord::from(result))
            .context("Failed to write result row")?;
        // Keep partial output useful if the run is interrupted
        self.writer.flush().context("Failed to flush result row")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV output")
    }
}

/// A file sink when `path` is given, stdout otherwise.
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn ResultSink>> {
    Ok(match path {
        Some(path) => Box::new(CsvSink::create(path)?),
        None => Box::new(CsvSink::stdout()),
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::resolve::{ResolutionRequest, ResolutionStatus, RowContext};

    fn result(status: ResolutionStatus, context: Option<RowContext>) -> ResolutionResult {
        let mut request = ResolutionRequest::new("https://a.com/x", 5, Duration::from_secs(1));
        if let Some(context) = context {
            request = request.with_row_context(context);
        }
        ResolutionResult::new(
            &request,
            "https://b.com/y",
            2,
            status,
            "plain-http",
            Instant::now(),
        )
    }

    #[test]
    fn test_csv_columns_and_rows() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_result(&result(
            ResolutionStatus::Success,
            Some(RowContext {
                id: Some("7".to_string()),
                model: Some("M,1".to_string()),
            }),
        ))
        .expect("write");
        sink.write_result(&result(ResolutionStatus::Blocked, None))
            .expect("write");
        sink.finish().expect("finish");

        let bytes = sink.into_inner().expect("inner");
        let text = String::from_utf8(bytes).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "original_url,final_url,status,redirect_count,strategy,elapsed_ms,id,model"
        );
        assert!(lines[1].starts_with("https://a.com/x,https://b.com/y,SUCCESS,2,plain-http,"));
        assert!(lines[1].ends_with(",7,\"M,1\""));
        assert!(lines[2].contains(",BLOCKED,"));
        assert!(lines[2].ends_with(",,"));
    }
}
