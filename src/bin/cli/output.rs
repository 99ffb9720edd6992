//! Output records and formatting for search results.

use std::io::Write;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use neardup_rs::DupePair;

/// One near-duplicate line pair, with 1-based line numbers.
#[derive(Debug, Serialize)]
pub struct PairRecord {
    pub left_line: usize,
    pub right_line: usize,
    pub left_fingerprint: String,
    pub right_fingerprint: String,
    pub distance: u32,
    pub similarity: f64,
}

impl From<&DupePair> for PairRecord {
    fn from(pair: &DupePair) -> Self {
        Self {
            left_line: pair.left + 1,
            right_line: pair.right + 1,
            left_fingerprint: pair.left_fingerprint.to_hex(),
            right_fingerprint: pair.right_fingerprint.to_hex(),
            distance: pair.distance,
            similarity: pair.similarity(),
        }
    }
}

/// One line matching a query.
#[derive(Debug, Serialize)]
pub struct MatchRecord {
    pub line: usize,
    pub fingerprint: String,
    pub distance: u32,
    pub similarity: f64,
    pub text: String,
}

/// Write pair records in the requested format.
pub fn write_pairs<W: Write>(
    out: &mut W,
    records: &[PairRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for record in records {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{:.6}",
                    record.left_line, record.right_line, record.distance, record.similarity
                )?;
            }
        }
    }
    Ok(())
}

/// Write query matches in the requested format.
pub fn write_matches<W: Write>(
    out: &mut W,
    records: &[MatchRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for record in records {
                writeln!(
                    out,
                    "{}\t{}\t{:.6}\t{}",
                    record.line, record.distance, record.similarity, record.text
                )?;
            }
        }
    }
    Ok(())
}
