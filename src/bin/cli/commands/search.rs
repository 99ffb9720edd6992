//! Fingerprinting and near-duplicate search over line-oriented input.

use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use crate::cli::args::{DupesArgs, InputArgs, QueryArgs};
use crate::cli::output::{write_matches, write_pairs, MatchRecord, PairRecord};
use neardup_rs::simhash::distance::similarity;
use neardup_rs::{Fingerprint, FingerprintEngine, SimhashConfig, SimhashIndex};

/// Read every line of `path`, or of stdin when `path` is `-`.
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut content = String::new();
    if path.as_os_str() == "-" {
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
    } else {
        content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(content.lines().map(str::to_owned).collect())
}

fn fingerprint_lines(
    config: &SimhashConfig,
    lines: &[String],
) -> anyhow::Result<Vec<Fingerprint>> {
    let engine = FingerprintEngine::from_config(config)?;
    let start = Instant::now();
    let fingerprints = engine.fingerprint_batch(lines, &config.tokenizer);
    info!(
        "Fingerprinted {} lines in {:?}",
        fingerprints.len(),
        start.elapsed()
    );
    Ok(fingerprints)
}

fn build_index(
    config: &SimhashConfig,
    fingerprints: &[Fingerprint],
) -> anyhow::Result<SimhashIndex> {
    Ok(SimhashIndex::with_config(
        config,
        fingerprints.iter().copied(),
    )?)
}

/// Print `hex<TAB>line` for every input line.
pub fn fingerprint_command(args: InputArgs, config: &SimhashConfig) -> anyhow::Result<()> {
    let lines = read_lines(&args.input)?;
    let fingerprints = fingerprint_lines(config, &lines)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (fingerprint, line) in fingerprints.iter().zip(&lines) {
        writeln!(out, "{}\t{}", fingerprint.to_hex(), line)?;
    }
    out.flush()?;
    Ok(())
}

/// Print every near-duplicate line pair.
pub fn dupes_command(args: DupesArgs, config: &SimhashConfig) -> anyhow::Result<()> {
    let lines = read_lines(&args.input.input)?;
    let fingerprints = fingerprint_lines(config, &lines)?;
    let index = build_index(config, &fingerprints)?;

    if args.stats {
        index.statistics().log_summary();
    }

    let start = Instant::now();
    let records: Vec<PairRecord> = index
        .find_all_dupes()
        .map(|pair| PairRecord::from(&pair))
        .collect();
    info!(
        "Found {} near-duplicate pairs in {:?}",
        records.len(),
        start.elapsed()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_pairs(&mut out, &records, args.format)?;
    out.flush()?;
    Ok(())
}

/// Print the lines that are near-duplicates of `--text`.
pub fn query_command(args: QueryArgs, config: &SimhashConfig) -> anyhow::Result<()> {
    let lines = read_lines(&args.input.input)?;
    let fingerprints = fingerprint_lines(config, &lines)?;
    let index = build_index(config, &fingerprints)?;

    let engine = FingerprintEngine::from_config(config)?;
    let query = engine.fingerprint_text(&args.text, &config.tokenizer);

    let mut records = Vec::new();
    for dupe in index.find_dupe_entries(&query)? {
        records.push(MatchRecord {
            line: dupe.entry + 1,
            fingerprint: dupe.fingerprint.to_hex(),
            distance: dupe.distance,
            similarity: similarity(dupe.fingerprint, &query)?,
            text: lines[dupe.entry].clone(),
        });
    }
    records.sort_by_key(|record| (record.distance, record.line));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_matches(&mut out, &records, args.format)?;
    out.flush()?;
    Ok(())
}
