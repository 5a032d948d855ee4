//! Record layouts of the ACH file format.
//!
//! Each record type is a table of [`FieldSpec`]s in column order. The tables
//! are the wire contract: widths and order must not change.

use crate::error::{Error, Result};
use crate::field::{format, FieldSpec, FieldValue, Justify, Rule};
use crate::types::{ServiceClassCode, StandardEntryClass, TransactionCode};
use crate::validate::{digits, routing_check_digit, routing_or_company_id, upper_alphanumeric_char};

/// Width of every physical line.
pub const RECORD_WIDTH: usize = 94;

/// Number of lines per block.
pub const BLOCKING_FACTOR: usize = 10;

/// Character filling padding lines.
pub const FILL_CHAR: char = '9';

/// Entry hash totals keep only their ten low-order digits.
pub const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

const RECORD_TYPE: FieldSpec = FieldSpec::numeric("record_type_code", 1, Rule::Any);

/// One line of fill characters.
pub fn filler_line() -> String {
    std::iter::repeat(FILL_CHAR).take(RECORD_WIDTH).collect()
}

/// Format `values` against `layout` and join them into one line.
pub fn render_record(layout: &[FieldSpec], values: &[FieldValue<'_>]) -> Result<String> {
    if layout.len() != values.len() {
        return Err(Error::Format {
            field: "record",
            value: format!("{} values for {} fields", values.len(), layout.len()),
            width: RECORD_WIDTH,
        });
    }

    let mut line = String::with_capacity(RECORD_WIDTH);
    for (spec, value) in layout.iter().zip(values) {
        line.push_str(&format(*value, spec)?);
    }

    if line.len() != RECORD_WIDTH {
        return Err(Error::Format {
            field: "record",
            value: line,
            width: RECORD_WIDTH,
        });
    }
    Ok(line)
}

fn dfi_identification(raw: &str) -> std::result::Result<(), String> {
    let valid = match raw.len() {
        8 => digits().is_match(raw),
        9 => digits().is_match(raw) && routing_check_digit(&raw[..8]) == raw[8..].parse().ok(),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err("should be an 8-digit DFI identification or a 9-digit routing number".to_string())
    }
}

fn account_number(raw: &str) -> std::result::Result<(), String> {
    if raw.len() <= entry_detail::DFI_ACCOUNT_NUMBER.width {
        Ok(())
    } else {
        Err(format!(
            "should be at most {} characters",
            entry_detail::DFI_ACCOUNT_NUMBER.width
        ))
    }
}

pub mod file_header {
    use super::*;

    pub const RECORD_TYPE: &str = "1";
    pub const PRIORITY_CODE: FieldSpec = FieldSpec::numeric("priority_code", 2, Rule::Range(1, 99));
    pub const IMMEDIATE_DESTINATION: FieldSpec =
        FieldSpec::alpha("immediate_destination", 10, true, Rule::Routing).justified(Justify::Right, ' ');
    pub const IMMEDIATE_ORIGIN: FieldSpec =
        FieldSpec::alpha("immediate_origin", 10, true, Rule::Custom(routing_or_company_id))
            .justified(Justify::Right, ' ');
    pub const FILE_CREATION_DATE: FieldSpec = FieldSpec::date("file_creation_date");
    pub const FILE_CREATION_TIME: FieldSpec = FieldSpec::time("file_creation_time");
    pub const FILE_ID_MODIFIER: FieldSpec = FieldSpec::alpha(
        "file_id_modifier",
        1,
        true,
        Rule::Pattern(upper_alphanumeric_char, "should be a single character A-Z or 0-9"),
    );
    pub const RECORD_SIZE: FieldSpec = FieldSpec::numeric("record_size", 3, Rule::Any);
    pub const BLOCKING_FACTOR: FieldSpec = FieldSpec::numeric("blocking_factor", 2, Rule::Any);
    pub const FORMAT_CODE: FieldSpec = FieldSpec::numeric("format_code", 1, Rule::Any);
    pub const IMMEDIATE_DESTINATION_NAME: FieldSpec =
        FieldSpec::alpha("immediate_destination_name", 23, false, Rule::Any);
    pub const IMMEDIATE_ORIGIN_NAME: FieldSpec =
        FieldSpec::alpha("immediate_origin_name", 23, false, Rule::Any);
    pub const REFERENCE_CODE: FieldSpec = FieldSpec::alpha("reference_code", 8, false, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        PRIORITY_CODE,
        IMMEDIATE_DESTINATION,
        IMMEDIATE_ORIGIN,
        FILE_CREATION_DATE,
        FILE_CREATION_TIME,
        FILE_ID_MODIFIER,
        RECORD_SIZE,
        BLOCKING_FACTOR,
        FORMAT_CODE,
        IMMEDIATE_DESTINATION_NAME,
        IMMEDIATE_ORIGIN_NAME,
        REFERENCE_CODE,
    ];
}

pub mod batch_header {
    use super::*;

    pub const RECORD_TYPE: &str = "5";
    pub const SERVICE_CLASS_CODE: FieldSpec =
        FieldSpec::numeric("service_class_code", 3, Rule::OneOf(ServiceClassCode::CODES));
    pub const COMPANY_NAME: FieldSpec = FieldSpec::alpha("company_name", 16, true, Rule::Any);
    pub const COMPANY_DISCRETIONARY_DATA: FieldSpec =
        FieldSpec::alpha("company_discretionary_data", 20, false, Rule::Any);
    pub const COMPANY_IDENTIFICATION: FieldSpec =
        FieldSpec::alpha("company_identification", 10, true, Rule::Any);
    pub const STANDARD_ENTRY_CLASS_CODE: FieldSpec = FieldSpec::alpha(
        "standard_entry_class_code",
        3,
        true,
        Rule::OneOf(StandardEntryClass::CODES),
    );
    pub const COMPANY_ENTRY_DESCRIPTION: FieldSpec =
        FieldSpec::alpha("company_entry_description", 10, true, Rule::Any);
    pub const COMPANY_DESCRIPTIVE_DATE: FieldSpec =
        FieldSpec::alpha("company_descriptive_date", 6, false, Rule::Any);
    pub const EFFECTIVE_ENTRY_DATE: FieldSpec = FieldSpec::date("effective_entry_date");
    pub const SETTLEMENT_DATE: FieldSpec = FieldSpec::alpha("settlement_date", 3, false, Rule::Any);
    pub const ORIGINATOR_STATUS_CODE: FieldSpec =
        FieldSpec::numeric("originator_status_code", 1, Rule::OneOf(&["0", "1", "2"]));
    pub const ORIGINATING_DFI: FieldSpec =
        FieldSpec::alpha("originating_dfi", 8, true, Rule::Custom(dfi_identification));
    pub const BATCH_NUMBER: FieldSpec = FieldSpec::numeric("batch_number", 7, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        SERVICE_CLASS_CODE,
        COMPANY_NAME,
        COMPANY_DISCRETIONARY_DATA,
        COMPANY_IDENTIFICATION,
        STANDARD_ENTRY_CLASS_CODE,
        COMPANY_ENTRY_DESCRIPTION,
        COMPANY_DESCRIPTIVE_DATE,
        EFFECTIVE_ENTRY_DATE,
        SETTLEMENT_DATE,
        ORIGINATOR_STATUS_CODE,
        ORIGINATING_DFI,
        BATCH_NUMBER,
    ];
}

pub mod entry_detail {
    use super::*;

    pub const RECORD_TYPE: &str = "6";
    pub const TRANSACTION_CODE: FieldSpec =
        FieldSpec::numeric("transaction_code", 2, Rule::OneOf(TransactionCode::CODES));
    /// Input-only: the full receiving routing number, split on render.
    pub const ROUTING_NUMBER: FieldSpec = FieldSpec::alpha("routing_number", 9, true, Rule::Routing);
    pub const RECEIVING_DFI: FieldSpec = FieldSpec::numeric("receiving_dfi", 8, Rule::Any);
    pub const CHECK_DIGIT: FieldSpec = FieldSpec::numeric("check_digit", 1, Rule::Any);
    pub const DFI_ACCOUNT_NUMBER: FieldSpec =
        FieldSpec::alpha("dfi_account_number", 17, true, Rule::Custom(account_number));
    pub const AMOUNT: FieldSpec = FieldSpec::amount("amount", 10);
    pub const INDIVIDUAL_ID: FieldSpec =
        FieldSpec::alpha("individual_identification_number", 15, false, Rule::Any);
    pub const INDIVIDUAL_NAME: FieldSpec = FieldSpec::alpha("individual_name", 22, true, Rule::Any);
    pub const DISCRETIONARY_DATA: FieldSpec =
        FieldSpec::alpha("discretionary_data", 2, false, Rule::Any);
    pub const ADDENDA_INDICATOR: FieldSpec = FieldSpec::numeric("addenda_record_indicator", 1, Rule::Any);
    pub const TRACE_ODFI: FieldSpec = FieldSpec::numeric("trace_odfi", 8, Rule::Any);
    pub const TRACE_SEQUENCE: FieldSpec = FieldSpec::numeric("trace_sequence", 7, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        TRANSACTION_CODE,
        RECEIVING_DFI,
        CHECK_DIGIT,
        DFI_ACCOUNT_NUMBER,
        AMOUNT,
        INDIVIDUAL_ID,
        INDIVIDUAL_NAME,
        DISCRETIONARY_DATA,
        ADDENDA_INDICATOR,
        TRACE_ODFI,
        TRACE_SEQUENCE,
    ];
}

pub mod addenda {
    use super::*;

    pub const RECORD_TYPE: &str = "7";
    pub const ADDENDA_TYPE_CODE: FieldSpec = FieldSpec::numeric("addenda_type_code", 2, Rule::Any);
    pub const PAYMENT_RELATED_INFORMATION: FieldSpec =
        FieldSpec::alpha("payment_related_information", 80, true, Rule::Any);
    pub const ADDENDA_SEQUENCE_NUMBER: FieldSpec =
        FieldSpec::numeric("addenda_sequence_number", 4, Rule::Any);
    pub const ENTRY_DETAIL_SEQUENCE_NUMBER: FieldSpec =
        FieldSpec::numeric("entry_detail_sequence_number", 7, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        ADDENDA_TYPE_CODE,
        PAYMENT_RELATED_INFORMATION,
        ADDENDA_SEQUENCE_NUMBER,
        ENTRY_DETAIL_SEQUENCE_NUMBER,
    ];
}

pub mod batch_control {
    use super::*;

    pub const RECORD_TYPE: &str = "8";
    pub const ENTRY_ADDENDA_COUNT: FieldSpec = FieldSpec::numeric("entry_addenda_count", 6, Rule::Any);
    pub const ENTRY_HASH: FieldSpec = FieldSpec::numeric("entry_hash", 10, Rule::Any);
    pub const TOTAL_DEBIT: FieldSpec = FieldSpec::amount("total_debit_entry_dollar_amount", 12);
    pub const TOTAL_CREDIT: FieldSpec = FieldSpec::amount("total_credit_entry_dollar_amount", 12);
    pub const MESSAGE_AUTHENTICATION_CODE: FieldSpec =
        FieldSpec::alpha("message_authentication_code", 19, false, Rule::Any);
    pub const RESERVED: FieldSpec = FieldSpec::alpha("reserved", 6, false, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        batch_header::SERVICE_CLASS_CODE,
        ENTRY_ADDENDA_COUNT,
        ENTRY_HASH,
        TOTAL_DEBIT,
        TOTAL_CREDIT,
        batch_header::COMPANY_IDENTIFICATION,
        MESSAGE_AUTHENTICATION_CODE,
        RESERVED,
        batch_header::ORIGINATING_DFI,
        batch_header::BATCH_NUMBER,
    ];
}

pub mod file_control {
    use super::*;

    pub const RECORD_TYPE: &str = "9";
    pub const BATCH_COUNT: FieldSpec = FieldSpec::numeric("batch_count", 6, Rule::Any);
    pub const BLOCK_COUNT: FieldSpec = FieldSpec::numeric("block_count", 6, Rule::Any);
    pub const ENTRY_ADDENDA_COUNT: FieldSpec = FieldSpec::numeric("entry_addenda_count", 8, Rule::Any);
    pub const RESERVED: FieldSpec = FieldSpec::alpha("reserved", 39, false, Rule::Any);

    pub const FIELDS: &[FieldSpec] = &[
        super::RECORD_TYPE,
        BATCH_COUNT,
        BLOCK_COUNT,
        ENTRY_ADDENDA_COUNT,
        batch_control::ENTRY_HASH,
        batch_control::TOTAL_DEBIT,
        batch_control::TOTAL_CREDIT,
        RESERVED,
    ];
}
