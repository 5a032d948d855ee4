//! The top-level ACH file: header, batches, control and block padding.

use crate::batch::{Batch, ControlTotals};
use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::layout::{
    file_control, file_header, filler_line, render_record, BLOCKING_FACTOR, RECORD_WIDTH,
};
use crate::validate::{parse_hhmm, parse_yymmdd, validate};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use serde::Deserialize;
use std::io::Write;

/// Caller-supplied file header values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Routing number of the receiving point.
    pub immediate_destination: String,
    /// Routing number or 10-digit identifier of the sender.
    pub immediate_origin: String,
    pub immediate_destination_name: String,
    pub immediate_origin_name: String,
    pub reference_code: String,
    /// Defaults to `01`.
    pub priority_code: Option<String>,
    /// Defaults to `A`.
    pub file_id_modifier: Option<String>,
    /// `YYMMDD`; defaults to today.
    pub file_creation_date: Option<String>,
    /// `HHMM`; defaults to the current time.
    pub file_creation_time: Option<String>,
}

/// An ACH file under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchFile {
    immediate_destination: String,
    immediate_origin: String,
    immediate_destination_name: String,
    immediate_origin_name: String,
    reference_code: String,
    priority_code: u64,
    file_id_modifier: String,
    file_creation_date: NaiveDate,
    file_creation_time: NaiveTime,
    batches: Vec<Batch>,
}

impl AchFile {
    /// Validate the header values, defaulting the creation stamp to now.
    ///
    /// # Examples
    ///
    /// ```
    /// use ach_writer::file::{AchFile, FileOptions};
    ///
    /// let file = AchFile::new(FileOptions {
    ///     immediate_destination: "110000000".into(),
    ///     immediate_origin: "110000000".into(),
    ///     immediate_destination_name: "SOME BANK".into(),
    ///     immediate_origin_name: "SOME COMPANY".into(),
    ///     file_creation_date: Some("190301".into()),
    ///     file_creation_time: Some("1212".into()),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(file.file_id_modifier(), "A");
    /// # Ok::<(), ach_writer::Error>(())
    /// ```
    pub fn new(options: FileOptions) -> Result<Self> {
        Self::new_at(options, Local::now().naive_local())
    }

    /// Like [`AchFile::new`] with an explicit clock for the defaults.
    pub fn new_at(options: FileOptions, now: NaiveDateTime) -> Result<Self> {
        validate(&options.immediate_destination, &file_header::IMMEDIATE_DESTINATION)?;
        validate(&options.immediate_origin, &file_header::IMMEDIATE_ORIGIN)?;
        validate(
            &options.immediate_destination_name,
            &file_header::IMMEDIATE_DESTINATION_NAME,
        )?;
        validate(&options.immediate_origin_name, &file_header::IMMEDIATE_ORIGIN_NAME)?;
        validate(&options.reference_code, &file_header::REFERENCE_CODE)?;

        let priority_code = match options.priority_code {
            Some(ref code) => {
                validate(code, &file_header::PRIORITY_CODE)?;
                code.parse::<u64>()
                    .map_err(|_| Error::validation("priority_code", code, "should be a number"))?
            }
            None => 1,
        };

        let file_id_modifier = options.file_id_modifier.unwrap_or_else(|| "A".to_string());
        validate(&file_id_modifier, &file_header::FILE_ID_MODIFIER)?;

        let file_creation_date = match options.file_creation_date {
            Some(ref text) => parse_yymmdd(text, &file_header::FILE_CREATION_DATE)?,
            None => now.date(),
        };
        let file_creation_time = match options.file_creation_time {
            Some(ref text) => parse_hhmm(text, &file_header::FILE_CREATION_TIME)?,
            None => now.time(),
        };

        Ok(AchFile {
            immediate_destination: options.immediate_destination,
            immediate_origin: options.immediate_origin,
            immediate_destination_name: options.immediate_destination_name,
            immediate_origin_name: options.immediate_origin_name,
            reference_code: options.reference_code,
            priority_code,
            file_id_modifier,
            file_creation_date,
            file_creation_time,
            batches: Vec::new(),
        })
    }

    /// Append a batch and return the batch number it will render with.
    ///
    /// Emptiness is checked at render time since the batch may still be
    /// filled in by the caller.
    pub fn add_batch(&mut self, batch: Batch) -> u32 {
        self.batches.push(batch);
        let batch_number = self.batches.len() as u32;
        debug!("Added batch {}", batch_number);
        batch_number
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn file_id_modifier(&self) -> &str {
        &self.file_id_modifier
    }

    pub fn file_creation_date(&self) -> NaiveDate {
        self.file_creation_date
    }

    pub fn file_creation_time(&self) -> NaiveTime {
        self.file_creation_time
    }

    /// Totals across every batch.
    pub fn control_totals(&self) -> ControlTotals {
        let mut totals = ControlTotals::default();
        for batch in &self.batches {
            totals.accumulate(&batch.control_totals());
        }
        totals
    }

    /// Render every line of the file, padded to whole blocks.
    pub fn render(&self) -> Result<Vec<String>> {
        let totals = self.control_totals();
        if totals.entry_addenda_count == 0 {
            return Err(Error::EmptyFile);
        }

        let mut lines = vec![self.render_header()?];
        for (index, batch) in self.batches.iter().enumerate() {
            lines.extend(batch.render_numbered(index as u32 + 1)?);
        }

        let unpadded = lines.len() + 1;
        let padded = unpadded.div_ceil(BLOCKING_FACTOR) * BLOCKING_FACTOR;
        let block_count = padded / BLOCKING_FACTOR;

        lines.push(render_record(
            file_control::FIELDS,
            &[
                FieldValue::Text(file_control::RECORD_TYPE),
                FieldValue::Number(self.batches.len() as u64),
                FieldValue::Number(block_count as u64),
                FieldValue::Number(totals.entry_addenda_count),
                FieldValue::Number(totals.entry_hash),
                FieldValue::Number(totals.total_debit),
                FieldValue::Number(totals.total_credit),
                FieldValue::Blank,
            ],
        )?);

        let filler = filler_line();
        lines.resize(padded, filler);

        info!(
            "Rendered ACH file: {} batches, {} entry/addenda records, {} blocks",
            self.batches.len(),
            totals.entry_addenda_count,
            block_count
        );
        Ok(lines)
    }

    /// Rendered lines joined with `\n`.
    pub fn render_string(&self) -> Result<String> {
        Ok(self.render()?.join("\n"))
    }

    /// Write the rendered file, one newline-terminated line per record.
    ///
    /// Nothing is written when rendering fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let lines = self.render()?;
        let mut buffer = String::with_capacity(lines.len() * (RECORD_WIDTH + 1));
        for line in &lines {
            buffer.push_str(line);
            buffer.push('\n');
        }
        writer.write_all(buffer.as_bytes())?;
        Ok(())
    }

    fn render_header(&self) -> Result<String> {
        render_record(
            file_header::FIELDS,
            &[
                FieldValue::Text(file_header::RECORD_TYPE),
                FieldValue::Number(self.priority_code),
                FieldValue::Text(&self.immediate_destination),
                FieldValue::Text(&self.immediate_origin),
                FieldValue::Date(self.file_creation_date),
                FieldValue::Time(self.file_creation_time),
                FieldValue::Text(&self.file_id_modifier),
                FieldValue::Number(RECORD_WIDTH as u64),
                FieldValue::Number(BLOCKING_FACTOR as u64),
                FieldValue::Number(1),
                FieldValue::Text(&self.immediate_destination_name),
                FieldValue::Text(&self.immediate_origin_name),
                FieldValue::Text(&self.reference_code),
            ],
        )
    }
}
