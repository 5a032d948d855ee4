//! ACH Writer Library
//!
//! A library for building ACH (NACHA) payment files: fixed-width, 94-column
//! records grouped into batches, with derived control totals and block
//! padding.
//!
//! # Record hierarchy
//!
//! - **File**: file header, batches, file control, filler lines
//! - **Batch**: batch header, entries, batch control
//! - **Entry**: one entry detail record plus optional addenda records
//!
//! Control records are never supplied by the caller. Counts, entry hashes and
//! debit/credit totals are derived from the entries at render time.
//!
//! # Examples
//!
//! ```
//! use ach_writer::{AchFile, Batch, BatchOptions, Entry, EntryFields, FileOptions};
//!
//! let mut file = AchFile::new(FileOptions {
//!     immediate_destination: "110000000".into(),
//!     immediate_origin: "110000000".into(),
//!     immediate_destination_name: "SOME BANK".into(),
//!     immediate_origin_name: "SOME COMPANY".into(),
//!     reference_code: "ABCD".into(),
//!     ..Default::default()
//! })?;
//!
//! let mut batch = Batch::new(BatchOptions {
//!     service_class_code: "225".into(),
//!     company_name: "Test Firm".into(),
//!     company_discretionary_data: String::new(),
//!     standard_entry_class_code: "CCD".into(),
//!     company_identification: "110000000".into(),
//!     company_entry_description: "OP PAYYOUT".into(),
//!     company_descriptive_date: "12345".into(),
//!     effective_entry_date: "200907".into(),
//!     originating_dfi: "110000000".into(),
//!     originator_status_code: "1".into(),
//! })?;
//!
//! batch.add_entry(Entry::new(EntryFields {
//!     transaction_code: "27".into(),
//!     routing_number: "021000021".into(),
//!     account_number: "12345678".into(),
//!     amount: 2500,
//!     individual_name: "JOHN SMITH".into(),
//!     ..Default::default()
//! })?)?;
//! file.add_batch(batch);
//!
//! let lines = file.render()?;
//! assert_eq!(lines.len() % 10, 0);
//! # Ok::<(), ach_writer::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod field;
pub mod validate;
pub mod layout;
pub mod entry;
pub mod batch;
pub mod file;
pub mod calendar;

// Re-export commonly used types
pub use batch::{Batch, BatchOptions, ControlTotals};
pub use calendar::{BankInstant, BusinessCalendar, HolidayCalendar};
pub use entry::{Addenda, Entry, EntryFields, TraceNumber};
pub use error::{Error, Result};
pub use file::{AchFile, FileOptions};
pub use types::{DebitCredit, EffectiveDate, ServiceClassCode, StandardEntryClass, TransactionCode};
