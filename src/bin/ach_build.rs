//! ACH Build - CLI tool for producing an ACH file from a CSV of entries.

use ach_writer::{
    AchFile, Batch, BatchOptions, EffectiveDate, Entry, EntryFields, Error, FileOptions, Result,
};
use clap::Parser;
use csv::{ReaderBuilder, Trim};
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "ach_build")]
#[command(about = "Build an ACH payment file from a CSV of entries", long_about = None)]
struct Cli {
    /// Input CSV file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Immediate destination routing number
    #[arg(long)]
    destination: String,

    /// Immediate origin routing number or 10-digit identifier
    #[arg(long)]
    origin: String,

    #[arg(long = "destination-name", default_value = "")]
    destination_name: String,

    #[arg(long = "origin-name", default_value = "")]
    origin_name: String,

    #[arg(long = "reference-code", default_value = "")]
    reference_code: String,

    #[arg(long = "priority-code")]
    priority_code: Option<String>,

    #[arg(long = "file-id-modifier")]
    file_id_modifier: Option<String>,

    /// File creation date override (YYMMDD)
    #[arg(long = "creation-date")]
    creation_date: Option<String>,

    /// File creation time override (HHMM)
    #[arg(long = "creation-time")]
    creation_time: Option<String>,

    /// Service class code (200, 220, 225)
    #[arg(long = "service-class", default_value = "200")]
    service_class: String,

    #[arg(long = "company-name")]
    company_name: String,

    /// Standard entry class code (CCD, PPD, CTX, ...)
    #[arg(long)]
    sec: String,

    #[arg(long = "company-id")]
    company_id: String,

    /// Company entry description
    #[arg(long)]
    description: String,

    #[arg(long = "descriptive-date", default_value = "")]
    descriptive_date: String,

    /// Effective entry date (YYMMDD)
    #[arg(long = "effective-date")]
    effective_date: String,

    /// Originating DFI routing number
    #[arg(long)]
    odfi: String,

    #[arg(long = "originator-status", default_value = "1")]
    originator_status: String,
}

/// One CSV row of entry input.
#[derive(Debug, Deserialize)]
struct CsvEntry {
    transaction_code: String,
    routing_number: String,
    account_number: String,
    /// Major units, at most two decimal places.
    amount: String,
    individual_name: String,
    #[serde(default)]
    individual_id: String,
    #[serde(default)]
    addenda: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut file = AchFile::new(FileOptions {
        immediate_destination: cli.destination.clone(),
        immediate_origin: cli.origin.clone(),
        immediate_destination_name: cli.destination_name.clone(),
        immediate_origin_name: cli.origin_name.clone(),
        reference_code: cli.reference_code.clone(),
        priority_code: cli.priority_code.clone(),
        file_id_modifier: cli.file_id_modifier.clone(),
        file_creation_date: cli.creation_date.clone(),
        file_creation_time: cli.creation_time.clone(),
    })?;

    let mut batch = Batch::new(BatchOptions {
        service_class_code: cli.service_class.clone(),
        company_name: cli.company_name.clone(),
        company_discretionary_data: String::new(),
        standard_entry_class_code: cli.sec.clone(),
        company_identification: cli.company_id.clone(),
        company_entry_description: cli.description.clone(),
        company_descriptive_date: cli.descriptive_date.clone(),
        effective_entry_date: EffectiveDate::Text(cli.effective_date.clone()),
        originating_dfi: cli.odfi.clone(),
        originator_status_code: cli.originator_status.clone(),
    })?;

    // Process based on input file or stdin
    if let Some(ref input_path) = cli.input {
        let mut input = File::open(input_path)?;
        read_entries(&mut input, &mut batch)?;
    } else {
        let mut stdin = io::stdin();
        read_entries(&mut stdin, &mut batch)?;
    }
    file.add_batch(batch);

    // Output based on output file or stdout
    if let Some(ref output_path) = cli.output {
        // Render before creating the file so a failure leaves nothing behind.
        let text = file.render_string()?;
        let mut output = File::create(output_path)?;
        writeln!(output, "{}", text)?;
    } else {
        let mut stdout = io::stdout();
        file.write_to(&mut stdout)?;
    }

    Ok(())
}

fn read_entries<R: Read>(reader: &mut R, batch: &mut Batch) -> Result<()> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    for result in csv_reader.deserialize() {
        let record: CsvEntry = result?;
        let mut entry = Entry::new(EntryFields {
            transaction_code: record.transaction_code,
            routing_number: record.routing_number,
            account_number: record.account_number,
            amount: minor_units(&record.amount)?,
            individual_id: record.individual_id,
            individual_name: record.individual_name,
            discretionary_data: String::new(),
        })?;
        if !record.addenda.is_empty() {
            entry.add_addenda(record.addenda)?;
        }
        let sequence = batch.add_entry(entry)?;
        debug!("Read entry {}", sequence);
    }

    Ok(())
}

/// Convert a decimal major-unit amount such as `12.50` into cents.
fn minor_units(amount: &str) -> Result<u64> {
    let invalid = || Error::InvalidAmount(amount.to_string());

    let value = Decimal::from_str(amount.trim()).map_err(|_| invalid())?;
    if value.is_sign_negative() || value.scale() > 2 {
        return Err(invalid());
    }
    (value * Decimal::from(100)).to_u64().ok_or_else(invalid)
}
