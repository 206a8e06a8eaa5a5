use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::batch::DEFAULT_BATCH_ROWS;

#[derive(Debug, Parser)]
#[command(author, version, about = "Load municipal planning-records exports into a relational store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a planning-records CSV export into a fresh SQLite database
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input CSV export ('-' reads from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Target SQLite database file
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// Stop after the first chunk of rows (quick iteration on new exports)
    #[arg(long = "first-chunk")]
    pub first_chunk: bool,
    /// Rows per input chunk (progress reporting and truncation granularity)
    #[arg(long = "chunk-rows", default_value_t = 5_000)]
    pub chunk_rows: usize,
    /// Rows buffered per entity kind before a batch flush
    #[arg(long = "batch-rows", default_value_t = DEFAULT_BATCH_ROWS)]
    pub batch_rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
