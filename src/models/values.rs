use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Patient identification number: 7 or 8 decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "u64")]
pub struct IdentificationNumber(u64);

impl IdentificationNumber {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty()
            || !raw.chars().all(|c| c.is_ascii_digit())
            || !(7..=8).contains(&raw.len())
        {
            return Err(format!("identification number must be 7-8 digits, got {raw:?}"));
        }
        raw.parse()
            .map(Self)
            .map_err(|e| format!("invalid identification number {raw:?}: {e}"))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IdentificationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<IdentificationNumber> for u64 {
    fn from(id: IdentificationNumber) -> Self {
        id.0
    }
}

impl TryFrom<Value> for IdentificationNumber {
    type Error = String;

    // Models send the id flat (1234567, "1234567") or wrapped as {"id": ...}.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match unwrap_field(value, "id") {
            Value::Number(n) => match n.as_u64() {
                Some(v) => Self::parse(&v.to_string()),
                None => Err(format!("identification number must be a positive integer, got {n}")),
            },
            Value::String(s) => Self::parse(&s),
            other => Err(format!("identification number must be a number, got {other}")),
        }
    }
}

/// A calendar day in `DD-MM-YYYY` form, as the store keys its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct DesiredDate(String);

impl DesiredDate {
    pub fn parse(raw: &str) -> Result<Self, String> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("valid regex"));
        let raw = raw.trim();
        if re.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(format!("date must be in DD-MM-YYYY format, got {raw:?}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DesiredDate> for String {
    fn from(d: DesiredDate) -> Self {
        d.0
    }
}

impl TryFrom<Value> for DesiredDate {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match unwrap_field(value, "date") {
            Value::String(s) => Self::parse(&s),
            other => Err(format!("date must be a string, got {other}")),
        }
    }
}

/// Free-text date and time as the user phrased it; normalized by the booking operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct DesiredDateTime(String);

impl DesiredDateTime {
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err("date and time must not be empty".to_string());
        }
        Ok(Self(raw.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DesiredDateTime> for String {
    fn from(d: DesiredDateTime) -> Self {
        d.0
    }
}

impl TryFrom<Value> for DesiredDateTime {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match unwrap_field(value, "date") {
            Value::String(s) => Self::new(s),
            other => Err(format!("date and time must be a string, got {other}")),
        }
    }
}

fn unwrap_field(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(key) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}
