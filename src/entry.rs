//! Entry detail records and their addenda.

use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::layout::{addenda, entry_detail, render_record};
use crate::types::{DebitCredit, TransactionCode};
use crate::validate::validate;
use serde::Deserialize;
use std::fmt;

/// Largest amount the 10-column amount field can hold.
pub const MAX_AMOUNT: u64 = 9_999_999_999;

/// Addenda sequence numbers occupy four columns.
pub const MAX_ADDENDA: usize = 9999;

/// Caller-supplied values for one entry detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntryFields {
    /// Two-digit transaction code, e.g. `22` (checking credit).
    pub transaction_code: String,
    /// Nine-digit receiving routing number including its check digit.
    pub routing_number: String,
    pub account_number: String,
    /// Amount in minor units (cents).
    pub amount: u64,
    pub individual_id: String,
    pub individual_name: String,
    pub discretionary_data: String,
}

/// Trace number of an entry: the originating DFI followed by a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNumber {
    pub odfi: String,
    pub sequence: u32,
}

impl TraceNumber {
    pub fn new(odfi: impl Into<String>, sequence: u32) -> Self {
        Self {
            odfi: odfi.into(),
            sequence,
        }
    }
}

impl fmt::Display for TraceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:07}", self.odfi, self.sequence)
    }
}

/// Free-form payment related information attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addenda {
    payment_related_information: String,
}

impl Addenda {
    pub fn payment_related_information(&self) -> &str {
        &self.payment_related_information
    }
}

/// One payment instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    transaction_code: TransactionCode,
    receiving_dfi: String,
    check_digit: String,
    account_number: String,
    amount: u64,
    individual_id: String,
    individual_name: String,
    discretionary_data: String,
    addenda: Vec<Addenda>,
}

impl Entry {
    /// Validate `fields` and build an entry, failing on the first bad field.
    ///
    /// # Examples
    ///
    /// ```
    /// use ach_writer::entry::{Entry, EntryFields};
    ///
    /// let entry = Entry::new(EntryFields {
    ///     transaction_code: "22".into(),
    ///     routing_number: "021000021".into(),
    ///     account_number: "12345678".into(),
    ///     amount: 1050,
    ///     individual_name: "JANE DOE".into(),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(entry.amount(), 1050);
    /// # Ok::<(), ach_writer::Error>(())
    /// ```
    pub fn new(fields: EntryFields) -> Result<Self> {
        validate(&fields.transaction_code, &entry_detail::TRANSACTION_CODE)?;
        let transaction_code = fields
            .transaction_code
            .parse::<TransactionCode>()
            .map_err(|reason| Error::validation("transaction_code", &fields.transaction_code, reason))?;

        validate(&fields.routing_number, &entry_detail::ROUTING_NUMBER)?;
        validate(&fields.account_number, &entry_detail::DFI_ACCOUNT_NUMBER)?;

        if fields.amount > MAX_AMOUNT {
            return Err(Error::validation(
                "amount",
                fields.amount.to_string(),
                format!("should be at most {}", MAX_AMOUNT),
            ));
        }
        if transaction_code.requires_zero_amount() && fields.amount != 0 {
            return Err(Error::validation(
                "amount",
                fields.amount.to_string(),
                format!("should be 0 for transaction code {}", transaction_code),
            ));
        }

        validate(&fields.individual_id, &entry_detail::INDIVIDUAL_ID)?;
        validate(&fields.individual_name, &entry_detail::INDIVIDUAL_NAME)?;
        validate(&fields.discretionary_data, &entry_detail::DISCRETIONARY_DATA)?;

        let (receiving_dfi, check_digit) = fields.routing_number.split_at(8);

        Ok(Entry {
            transaction_code,
            receiving_dfi: receiving_dfi.to_string(),
            check_digit: check_digit.to_string(),
            account_number: fields.account_number,
            amount: fields.amount,
            individual_id: fields.individual_id,
            individual_name: fields.individual_name,
            discretionary_data: fields.discretionary_data,
            addenda: Vec::new(),
        })
    }

    /// Append an addenda record and return its 1-based sequence number.
    ///
    /// Only the record format's ceiling of 9999 is checked here. The tighter
    /// per-class limit (none for TEL, one for most classes) is enforced when
    /// the entry is added to a batch, see [`crate::batch::Batch::add_entry`].
    pub fn add_addenda(&mut self, payment_related_information: impl Into<String>) -> Result<u16> {
        let info = payment_related_information.into();
        validate(&info, &addenda::PAYMENT_RELATED_INFORMATION)?;

        if self.addenda.len() >= MAX_ADDENDA {
            return Err(Error::validation(
                "addenda",
                info,
                format!("an entry carries at most {} addenda", MAX_ADDENDA),
            ));
        }

        self.addenda.push(Addenda {
            payment_related_information: info,
        });
        // Bounded by MAX_ADDENDA above.
        Ok(self.addenda.len() as u16)
    }

    pub fn transaction_code(&self) -> TransactionCode {
        self.transaction_code
    }

    pub fn debit_credit(&self) -> DebitCredit {
        self.transaction_code.debit_credit()
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// First eight digits of the receiving routing number.
    pub fn receiving_dfi(&self) -> &str {
        &self.receiving_dfi
    }

    /// Contribution of this entry to the entry hash.
    pub fn hash_value(&self) -> u64 {
        // Validated as eight ASCII digits at construction.
        self.receiving_dfi.parse().unwrap_or(0)
    }

    pub fn addenda(&self) -> &[Addenda] {
        &self.addenda
    }

    /// Number of physical lines this entry renders to.
    pub fn line_count(&self) -> usize {
        1 + self.addenda.len()
    }

    /// Render the detail line followed by each addenda line.
    pub fn render(&self, trace: &TraceNumber) -> Result<Vec<String>> {
        let amount = self.amount;
        let indicator = if self.addenda.is_empty() { 0 } else { 1 };
        let code = self.transaction_code.to_string();

        let mut lines = Vec::with_capacity(self.line_count());
        lines.push(render_record(
            entry_detail::FIELDS,
            &[
                FieldValue::Text(entry_detail::RECORD_TYPE),
                FieldValue::Text(&code),
                FieldValue::Text(&self.receiving_dfi),
                FieldValue::Text(&self.check_digit),
                FieldValue::Text(&self.account_number),
                FieldValue::Number(amount),
                FieldValue::Text(&self.individual_id),
                FieldValue::Text(&self.individual_name),
                FieldValue::Text(&self.discretionary_data),
                FieldValue::Number(indicator),
                FieldValue::Text(&trace.odfi),
                FieldValue::Number(u64::from(trace.sequence)),
            ],
        )?);

        for (index, item) in self.addenda.iter().enumerate() {
            lines.push(render_record(
                addenda::FIELDS,
                &[
                    FieldValue::Text(addenda::RECORD_TYPE),
                    FieldValue::Number(5),
                    FieldValue::Text(&item.payment_related_information),
                    FieldValue::Number(index as u64 + 1),
                    FieldValue::Number(u64::from(trace.sequence)),
                ],
            )?);
        }

        Ok(lines)
    }
}
