//! Batch header/control records and the entries they group.

use crate::entry::{Entry, TraceNumber};
use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::layout::{batch_control, batch_header, render_record, ENTRY_HASH_MODULUS};
use crate::types::{DebitCredit, EffectiveDate, ServiceClassCode, StandardEntryClass};
use crate::validate::{parse_yymmdd, validate};
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

/// Caller-supplied batch header values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchOptions {
    /// `200`, `220` or `225`.
    pub service_class_code: String,
    pub company_name: String,
    #[serde(default)]
    pub company_discretionary_data: String,
    /// Standard entry class code, e.g. `CCD` or `PPD`.
    pub standard_entry_class_code: String,
    pub company_identification: String,
    pub company_entry_description: String,
    #[serde(default)]
    pub company_descriptive_date: String,
    pub effective_entry_date: EffectiveDate,
    /// Eight-digit DFI identification or the full nine-digit routing number.
    pub originating_dfi: String,
    pub originator_status_code: String,
}

/// Derived control values of a batch or a whole file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTotals {
    /// Detail plus addenda lines.
    pub entry_addenda_count: u64,
    /// Sum of receiving DFI prefixes, low-order ten digits.
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

impl ControlTotals {
    /// Fold another set of totals into this one.
    pub fn accumulate(&mut self, other: &ControlTotals) {
        self.entry_addenda_count += other.entry_addenda_count;
        self.entry_hash = (self.entry_hash + other.entry_hash) % ENTRY_HASH_MODULUS;
        self.total_debit += other.total_debit;
        self.total_credit += other.total_credit;
    }
}

/// A group of entries sharing one originator header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    service_class_code: ServiceClassCode,
    company_name: String,
    company_discretionary_data: String,
    standard_entry_class: StandardEntryClass,
    company_identification: String,
    company_entry_description: String,
    company_descriptive_date: String,
    effective_entry_date: NaiveDate,
    originating_dfi: String,
    originator_status_code: String,
    entries: Vec<Entry>,
}

impl Batch {
    /// Validate the header values and create an empty batch.
    pub fn new(options: BatchOptions) -> Result<Self> {
        validate(&options.service_class_code, &batch_header::SERVICE_CLASS_CODE)?;
        let service_class_code = options
            .service_class_code
            .parse::<ServiceClassCode>()
            .map_err(|reason| Error::validation("service_class_code", &options.service_class_code, reason))?;

        validate(&options.company_name, &batch_header::COMPANY_NAME)?;
        validate(
            &options.company_discretionary_data,
            &batch_header::COMPANY_DISCRETIONARY_DATA,
        )?;

        validate(
            &options.standard_entry_class_code,
            &batch_header::STANDARD_ENTRY_CLASS_CODE,
        )?;
        let standard_entry_class = options
            .standard_entry_class_code
            .parse::<StandardEntryClass>()
            .map_err(|reason| {
                Error::validation("standard_entry_class_code", &options.standard_entry_class_code, reason)
            })?;

        validate(&options.company_identification, &batch_header::COMPANY_IDENTIFICATION)?;
        validate(
            &options.company_entry_description,
            &batch_header::COMPANY_ENTRY_DESCRIPTION,
        )?;
        validate(
            &options.company_descriptive_date,
            &batch_header::COMPANY_DESCRIPTIVE_DATE,
        )?;

        let effective_entry_date = match options.effective_entry_date {
            EffectiveDate::Date(date) => date,
            EffectiveDate::Text(ref text) => {
                parse_yymmdd(text, &batch_header::EFFECTIVE_ENTRY_DATE)?
            }
        };

        validate(&options.originating_dfi, &batch_header::ORIGINATING_DFI)?;
        let originating_dfi = options.originating_dfi[..8].to_string();

        validate(
            &options.originator_status_code,
            &batch_header::ORIGINATOR_STATUS_CODE,
        )?;

        Ok(Batch {
            service_class_code,
            company_name: options.company_name,
            company_discretionary_data: options.company_discretionary_data,
            standard_entry_class,
            company_identification: options.company_identification,
            company_entry_description: options.company_entry_description,
            company_descriptive_date: options.company_descriptive_date,
            effective_entry_date,
            originating_dfi,
            originator_status_code: options.originator_status_code,
            entries: Vec::new(),
        })
    }

    /// Append an entry and return the trace sequence it will render with.
    pub fn add_entry(&mut self, entry: Entry) -> Result<u32> {
        let direction = entry.debit_credit();
        if !self.service_class_code.accepts(direction) {
            let kind = match direction {
                DebitCredit::Debit => "debit",
                DebitCredit::Credit => "credit",
            };
            return Err(Error::validation(
                "transaction_code",
                entry.transaction_code().to_string(),
                format!(
                    "{} entries are not allowed in service class {}",
                    kind,
                    self.service_class_code.code()
                ),
            ));
        }

        let max_addenda = self.standard_entry_class.max_addenda();
        if entry.addenda().len() > max_addenda {
            return Err(Error::validation(
                "addenda",
                entry.addenda().len().to_string(),
                format!(
                    "{} entries carry at most {} addenda",
                    self.standard_entry_class.code(),
                    max_addenda
                ),
            ));
        }

        self.entries.push(entry);
        let sequence = self.entries.len() as u32;
        debug!(
            "Added {:?} entry {} to {} batch",
            direction,
            sequence,
            self.standard_entry_class.code()
        );
        Ok(sequence)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn service_class_code(&self) -> ServiceClassCode {
        self.service_class_code
    }

    pub fn standard_entry_class(&self) -> StandardEntryClass {
        self.standard_entry_class
    }

    pub fn effective_entry_date(&self) -> NaiveDate {
        self.effective_entry_date
    }

    /// Eight-digit originating DFI identification.
    pub fn originating_dfi(&self) -> &str {
        &self.originating_dfi
    }

    /// Control values derived from the current entries.
    pub fn control_totals(&self) -> ControlTotals {
        let mut totals = ControlTotals::default();
        for entry in &self.entries {
            totals.entry_addenda_count += entry.line_count() as u64;
            totals.entry_hash = (totals.entry_hash + entry.hash_value()) % ENTRY_HASH_MODULUS;
            match entry.debit_credit() {
                DebitCredit::Debit => totals.total_debit += entry.amount(),
                DebitCredit::Credit => totals.total_credit += entry.amount(),
            }
        }
        totals
    }

    pub fn entry_addenda_count(&self) -> u64 {
        self.control_totals().entry_addenda_count
    }

    pub fn entry_hash(&self) -> u64 {
        self.control_totals().entry_hash
    }

    pub fn total_debit(&self) -> u64 {
        self.control_totals().total_debit
    }

    pub fn total_credit(&self) -> u64 {
        self.control_totals().total_credit
    }

    /// Render as a standalone batch numbered 1.
    pub fn render(&self) -> Result<Vec<String>> {
        self.render_numbered(1)
    }

    /// Render header, entry lines and control with the given batch number.
    pub fn render_numbered(&self, batch_number: u32) -> Result<Vec<String>> {
        if self.entries.is_empty() {
            return Err(Error::EmptyBatch { batch_number });
        }

        let totals = self.control_totals();
        let mut lines = Vec::with_capacity(totals.entry_addenda_count as usize + 2);
        lines.push(self.render_header(batch_number)?);

        for (index, entry) in self.entries.iter().enumerate() {
            let trace = TraceNumber::new(self.originating_dfi.as_str(), index as u32 + 1);
            lines.extend(entry.render(&trace)?);
        }

        lines.push(self.render_control(batch_number, &totals)?);
        debug!(
            "Rendered batch {} with {} entry/addenda lines",
            batch_number, totals.entry_addenda_count
        );
        Ok(lines)
    }

    fn render_header(&self, batch_number: u32) -> Result<String> {
        render_record(
            batch_header::FIELDS,
            &[
                FieldValue::Text(batch_header::RECORD_TYPE),
                FieldValue::Text(self.service_class_code.code()),
                FieldValue::Text(&self.company_name),
                FieldValue::Text(&self.company_discretionary_data),
                FieldValue::Text(&self.company_identification),
                FieldValue::Text(self.standard_entry_class.code()),
                FieldValue::Text(&self.company_entry_description),
                FieldValue::Text(&self.company_descriptive_date),
                FieldValue::Date(self.effective_entry_date),
                FieldValue::Blank,
                FieldValue::Text(&self.originator_status_code),
                FieldValue::Text(&self.originating_dfi),
                FieldValue::Number(u64::from(batch_number)),
            ],
        )
    }

    fn render_control(&self, batch_number: u32, totals: &ControlTotals) -> Result<String> {
        render_record(
            batch_control::FIELDS,
            &[
                FieldValue::Text(batch_control::RECORD_TYPE),
                FieldValue::Text(self.service_class_code.code()),
                FieldValue::Number(totals.entry_addenda_count),
                FieldValue::Number(totals.entry_hash),
                FieldValue::Number(totals.total_debit),
                FieldValue::Number(totals.total_credit),
                FieldValue::Text(&self.company_identification),
                FieldValue::Blank,
                FieldValue::Blank,
                FieldValue::Text(&self.originating_dfi),
                FieldValue::Number(u64::from(batch_number)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryFields;
    use pretty_assertions::assert_eq;

    fn options() -> BatchOptions {
        BatchOptions {
            service_class_code: "200".into(),
            company_name: "Test Firm".into(),
            company_discretionary_data: String::new(),
            standard_entry_class_code: "CCD".into(),
            company_identification: "110000000".into(),
            company_entry_description: "OP PAYYOUT".into(),
            company_descriptive_date: "12345".into(),
            effective_entry_date: "200907".into(),
            originating_dfi: "110000000".into(),
            originator_status_code: "1".into(),
        }
    }

    fn entry(code: &str, routing: &str, amount: u64) -> Entry {
        Entry::new(EntryFields {
            transaction_code: code.into(),
            routing_number: routing.into(),
            account_number: "987654321".into(),
            amount,
            individual_name: "ACME CORP".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_effective_date_text_and_date_agree() {
        let from_text = Batch::new(options()).unwrap();
        let mut with_date = options();
        with_date.effective_entry_date = NaiveDate::from_ymd_opt(2020, 9, 7).unwrap().into();
        let from_date = Batch::new(with_date).unwrap();

        assert_eq!(from_text.effective_entry_date(), from_date.effective_entry_date());
        let mut a = from_text;
        let mut b = from_date;
        a.add_entry(entry("22", "021000021", 100)).unwrap();
        b.add_entry(entry("22", "021000021", 100)).unwrap();
        assert_eq!(a.render().unwrap(), b.render().unwrap());
        assert_eq!(&a.render().unwrap()[0][69..75], "200907");
    }

    #[test]
    fn test_invalid_effective_dates() {
        for bad in ["121314", "2009079"] {
            let mut opts = options();
            opts.effective_entry_date = bad.into();
            let err = Batch::new(opts).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid effective_entry_date, should be YYMMDD: {}", bad)
            );
        }
    }

    #[test]
    fn test_enumerations_are_enforced() {
        let mut opts = options();
        opts.service_class_code = "230".into();
        assert!(Batch::new(opts).is_err());

        let mut opts = options();
        opts.standard_entry_class_code = "XYZ".into();
        let err = Batch::new(opts).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "standard_entry_class_code", .. }));

        let mut opts = options();
        opts.originator_status_code = "7".into();
        assert!(Batch::new(opts).is_err());
    }

    #[test]
    fn test_sequences_and_controls() {
        let mut batch = Batch::new(options()).unwrap();
        assert_eq!(batch.add_entry(entry("22", "021000021", 1_000)).unwrap(), 1);
        let mut with_addenda = entry("27", "011000015", 250);
        with_addenda.add_addenda("INV 1").unwrap();
        assert_eq!(batch.add_entry(with_addenda).unwrap(), 2);

        assert_eq!(batch.entry_addenda_count(), 3);
        assert_eq!(batch.entry_hash(), 2_100_002 + 1_100_001);
        assert_eq!(batch.total_credit(), 1_000);
        assert_eq!(batch.total_debit(), 250);

        let lines = batch.render().unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("5200Test Firm"));
        assert!(lines[1].ends_with("110000000000001"));
        assert!(lines[2].starts_with("627"));
        assert!(lines[2].ends_with("110000000000002"));
        assert!(lines[3].starts_with("705INV 1"));
        assert_eq!(
            lines[4],
            format!(
                "8200000003{:010}{:012}{:012}{:<10}{}{}{}",
                3_200_003,
                250,
                1_000,
                "110000000",
                " ".repeat(25),
                "11000000",
                "0000001"
            )
        );
        assert!(lines.iter().all(|line| line.len() == 94));
    }

    #[test]
    fn test_entry_hash_keeps_low_order_digits() {
        let mut opts = options();
        opts.standard_entry_class_code = "PPD".into();
        let mut batch = Batch::new(opts).unwrap();
        // 99999999 * 101 overflows ten digits.
        for _ in 0..101 {
            batch.add_entry(entry("22", "999999992", 1)).unwrap();
        }
        assert_eq!(batch.entry_hash(), (99_999_999u64 * 101) % ENTRY_HASH_MODULUS);
        let lines = batch.render().unwrap();
        let control = lines.last().unwrap();
        assert_eq!(&control[10..20], format!("{:010}", 99_999_999u64 * 101 % ENTRY_HASH_MODULUS));
    }

    #[test]
    fn test_empty_batch_cannot_render() {
        let batch = Batch::new(options()).unwrap();
        let err = batch.render().unwrap_err();
        assert!(matches!(err, Error::EmptyBatch { batch_number: 1 }));
    }

    #[test]
    fn test_service_class_direction_is_enforced() {
        let mut opts = options();
        opts.service_class_code = "225".into();
        let mut batch = Batch::new(opts).unwrap();
        assert!(batch.add_entry(entry("22", "021000021", 5)).is_err());
        assert!(batch.add_entry(entry("27", "021000021", 5)).is_ok());
    }

    #[test]
    fn test_addenda_limit_by_entry_class() {
        let mut batch = Batch::new(options()).unwrap();
        let mut two = entry("22", "021000021", 5);
        two.add_addenda("ONE").unwrap();
        two.add_addenda("TWO").unwrap();
        let err = batch.add_entry(two.clone()).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "addenda", .. }));

        let mut opts = options();
        opts.standard_entry_class_code = "CTX".into();
        let mut ctx = Batch::new(opts).unwrap();
        assert!(ctx.add_entry(two).is_ok());

        let mut opts = options();
        opts.standard_entry_class_code = "TEL".into();
        let mut tel = Batch::new(opts).unwrap();
        let mut one = entry("22", "021000021", 5);
        one.add_addenda("ONE").unwrap();
        let err = tel.add_entry(one).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "addenda", .. }));
        assert!(tel.add_entry(entry("22", "021000021", 5)).is_ok());
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut batch = Batch::new(options()).unwrap();
        batch.add_entry(entry("22", "021000021", 7)).unwrap();
        assert_eq!(batch.render().unwrap(), batch.render().unwrap());
    }
}
