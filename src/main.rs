//! filterql - filter a JSON array of objects with a filter query

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use filterql::json::{self, FieldSpec, JsonRow};
use filterql::FilterCompiler;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

/// Filter JSON rows with a filter query such as `Age >> '30' && Name @= 'A'`
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filter query to apply
    #[arg(short, long)]
    query: String,

    /// Filterable field as NAME:TYPE (bool, int32, int64, float64, string, date, datetime, guid)
    #[arg(short, long = "field", value_name = "NAME:TYPE", required = true)]
    fields: Vec<FieldSpec>,

    /// JSON file holding an array of objects; stdin when absent or `-`
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print the SQL WHERE fragment and its parameters instead of filtering
    #[arg(long, conflicts_with = "count")]
    sql: bool,

    /// Print only the number of matching rows
    #[arg(long)]
    count: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let registry = json::registry(&args.fields).context("Invalid field declarations")?;
    let compiler = FilterCompiler::new(registry);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.sql {
        let bound = compiler
            .bind(&args.query)
            .with_context(|| format!("Failed to compile query '{}'", args.query))?;
        let filter = filterql::expression::to_sql(&bound);
        writeln!(out, "{}", filter.clause)?;
        writeln!(out, "{}", serde_json::to_string(&filter.params)?)?;
        return Ok(());
    }

    let predicate = compiler
        .compile(&args.query)
        .with_context(|| format!("Failed to compile query '{}'", args.query))?;

    let rows = read_rows(args.input.as_ref())?;
    log::debug!("Loaded {} rows", rows.len());

    if args.count {
        writeln!(out, "{}", predicate.count_matches(&rows))?;
        return Ok(());
    }

    let matches: Vec<&JsonRow> = predicate.filter(&rows).collect();
    log::debug!("{} of {} rows matched", matches.len(), rows.len());
    serde_json::to_writer_pretty(&mut out, &matches).context("Failed to write output")?;
    writeln!(out)?;

    Ok(())
}

fn read_rows(input: Option<&PathBuf>) -> Result<Vec<JsonRow>> {
    let reader: Box<dyn Read> = match input {
        Some(path) if path.as_os_str() != "-" => {
            if path.is_dir() {
                bail!("{} is a directory", path.display());
            }
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(io::stdin().lock()),
    };
    json::load_rows(reader)
}
