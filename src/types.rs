//! Code enumerations shared by the record types.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Debit/Credit classification of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebitCredit {
    /// Funds are pulled from the receiver.
    Debit,
    /// Funds are pushed to the receiver.
    Credit,
}

/// Service class code of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceClassCode {
    /// `200`: debits and credits.
    Mixed,
    /// `220`: credits only.
    CreditsOnly,
    /// `225`: debits only.
    DebitsOnly,
}

impl ServiceClassCode {
    pub const CODES: &'static [&'static str] = &["200", "220", "225"];

    pub fn code(&self) -> &'static str {
        match self {
            ServiceClassCode::Mixed => "200",
            ServiceClassCode::CreditsOnly => "220",
            ServiceClassCode::DebitsOnly => "225",
        }
    }

    /// Whether an entry of the given direction may appear in the batch.
    pub fn accepts(&self, direction: DebitCredit) -> bool {
        match self {
            ServiceClassCode::Mixed => true,
            ServiceClassCode::CreditsOnly => direction == DebitCredit::Credit,
            ServiceClassCode::DebitsOnly => direction == DebitCredit::Debit,
        }
    }
}

impl FromStr for ServiceClassCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "200" => Ok(ServiceClassCode::Mixed),
            "220" => Ok(ServiceClassCode::CreditsOnly),
            "225" => Ok(ServiceClassCode::DebitsOnly),
            _ => Err(format!("Invalid service class code: {}", s)),
        }
    }
}

/// Standard entry class code of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardEntryClass {
    Arc,
    Boc,
    Ccd,
    Cie,
    Ctx,
    Pop,
    Ppd,
    Rck,
    Tel,
    Web,
}

impl StandardEntryClass {
    pub const CODES: &'static [&'static str] = &[
        "ARC", "BOC", "CCD", "CIE", "CTX", "POP", "PPD", "RCK", "TEL", "WEB",
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StandardEntryClass::Arc => "ARC",
            StandardEntryClass::Boc => "BOC",
            StandardEntryClass::Ccd => "CCD",
            StandardEntryClass::Cie => "CIE",
            StandardEntryClass::Ctx => "CTX",
            StandardEntryClass::Pop => "POP",
            StandardEntryClass::Ppd => "PPD",
            StandardEntryClass::Rck => "RCK",
            StandardEntryClass::Tel => "TEL",
            StandardEntryClass::Web => "WEB",
        }
    }

    /// Maximum number of addenda an entry of this class may carry.
    pub fn max_addenda(&self) -> usize {
        match self {
            StandardEntryClass::Tel => 0,
            StandardEntryClass::Ctx => 9999,
            _ => 1,
        }
    }
}

impl FromStr for StandardEntryClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ARC" => Ok(StandardEntryClass::Arc),
            "BOC" => Ok(StandardEntryClass::Boc),
            "CCD" => Ok(StandardEntryClass::Ccd),
            "CIE" => Ok(StandardEntryClass::Cie),
            "CTX" => Ok(StandardEntryClass::Ctx),
            "POP" => Ok(StandardEntryClass::Pop),
            "PPD" => Ok(StandardEntryClass::Ppd),
            "RCK" => Ok(StandardEntryClass::Rck),
            "TEL" => Ok(StandardEntryClass::Tel),
            "WEB" => Ok(StandardEntryClass::Web),
            _ => Err(format!("Invalid standard entry class code: {}", s)),
        }
    }
}

/// Two-digit transaction code of an entry detail record.
///
/// The first digit names the account type (checking, savings, general
/// ledger, loan); the second the direction and whether the entry is live,
/// a prenotification or a zero-dollar remittance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCode(u8);

impl TransactionCode {
    pub const CODES: &'static [&'static str] = &[
        "22", "23", "24", "27", "28", "29", // checking
        "32", "33", "34", "37", "38", "39", // savings
        "42", "43", "44", "47", "48", "49", // general ledger
        "52", "53", "54", "55", // loan
    ];

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn debit_credit(&self) -> DebitCredit {
        if self.0 % 10 >= 5 {
            DebitCredit::Debit
        } else {
            DebitCredit::Credit
        }
    }

    /// Prenotifications and zero-dollar remittances carry no amount.
    pub fn requires_zero_amount(&self) -> bool {
        matches!(self.0 % 10, 3 | 4 | 8 | 9)
    }
}

impl FromStr for TransactionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !Self::CODES.contains(&s) {
            return Err(format!("Invalid transaction code: {}", s));
        }
        s.parse::<u8>()
            .map(TransactionCode)
            .map_err(|_| format!("Invalid transaction code: {}", s))
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Effective entry date as supplied by the caller.
///
/// Both shapes normalize to the same `NaiveDate` once validated by the
/// owning batch. Serialized form is always `YYMMDD` text, and deserialized
/// text is kept as-is so that the batch reports any other shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveDate {
    Date(NaiveDate),
    /// Six-character `YYMMDD` text.
    Text(String),
}

impl Serialize for EffectiveDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EffectiveDate::Date(date) => serializer.collect_str(&date.format("%y%m%d")),
            EffectiveDate::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for EffectiveDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(EffectiveDate::Text)
    }
}

impl From<NaiveDate> for EffectiveDate {
    fn from(date: NaiveDate) -> Self {
        EffectiveDate::Date(date)
    }
}

impl From<&str> for EffectiveDate {
    fn from(text: &str) -> Self {
        EffectiveDate::Text(text.to_string())
    }
}

impl From<String> for EffectiveDate {
    fn from(text: String) -> Self {
        EffectiveDate::Text(text)
    }
}
