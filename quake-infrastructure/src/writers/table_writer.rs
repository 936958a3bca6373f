// Delimited-file output for assembled tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use quake_domain::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Some(OutputFormat::Csv),
            Some("tsv") | Some("tab") => Some(OutputFormat::Tsv),
            _ => None,
        }
    }
}

/// Serialize `table` to `out`. The assembler has already applied the
/// missing-value sentinel, so every cell renders directly.
pub fn write_table<W: Write>(table: &ResultTable, out: W, format: OutputFormat) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(out);
    writer
        .write_record(&table.columns)
        .context("writing header row")?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .context("writing data row")?;
    }
    writer.flush().context("flushing output")?;
    Ok(())
}

/// Write `table` to `path`, inferring the format from the extension when
/// none is given (unknown extensions fall back to CSV).
pub fn write_table_file(
    table: &ResultTable,
    path: &Path,
    format: Option<OutputFormat>,
) -> Result<()> {
    let format = format
        .or_else(|| OutputFormat::from_path(path))
        .unwrap_or(OutputFormat::Csv);
    let file = File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    write_table(table, io::BufWriter::new(file), format)
}
