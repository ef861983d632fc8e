use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Load dotted-header CSV files into a users table",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a CSV file into users, store them and report the age distribution
    Convert(ConvertArgs),
    /// Print the nested JSON record rebuilt from each CSV row
    Nest(NestArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input CSV file whose headers use dotted paths such as `address.city`
    #[arg(short = 'i', long = "input", env = "CSV_FILE_PATH")]
    pub input: PathBuf,
    /// Users table file receiving the converted rows
    #[arg(short = 't', long = "table", env = "USERS_TABLE_PATH")]
    pub table: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How to print the result on stdout
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `{status, message, age_distribution}` document
    #[default]
    Json,
    /// Aligned table of the age distribution
    Table,
}

#[derive(Debug, Args)]
pub struct NestArgs {
    /// Input CSV file to convert
    #[arg(short = 'i', long = "input", env = "CSV_FILE_PATH")]
    pub input: PathBuf,
    /// Emit the mapped user instead of the raw nested record
    #[arg(long)]
    pub mapped: bool,
    /// Stop after this many emitted rows
    #[arg(long)]
    pub limit: Option<usize>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn convert_arguments_parse() {
        let cli = Cli::try_parse_from([
            "csv-users",
            "convert",
            "-i",
            "people.csv",
            "-t",
            "users.csv",
            "--format",
            "table",
        ])
        .expect("parse");
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, PathBuf::from("people.csv"));
                assert_eq!(args.format, OutputFormat::Table);
                assert_eq!(args.delimiter, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
