use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{DoctorName, Specialization};

/// One row of the appointment table.
///
/// `date_slot` is stored as `DD-MM-YYYY HH.MM`. A slot is either available with
/// no patient, or unavailable with exactly one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub date_slot: String,
    pub doctor_name: DoctorName,
    pub specialization: Specialization,
    #[serde(
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub is_available: bool,
    #[serde(deserialize_with = "deserialize_patient")]
    pub patient_to_attend: Option<u64>,
}

impl AppointmentSlot {
    /// The `DD-MM-YYYY` part of the slot.
    pub fn date(&self) -> &str {
        self.date_slot.split(' ').next().unwrap_or_default()
    }

    /// The `HH.MM` part of the slot.
    pub fn time(&self) -> &str {
        self.date_slot.rsplit(' ').next().unwrap_or_default()
    }

    pub fn assign(&mut self, patient: u64) {
        self.is_available = false;
        self.patient_to_attend = Some(patient);
    }

    pub fn release(&mut self) {
        self.is_available = true;
        self.patient_to_attend = None;
    }
}

/// "14.30" -> "2:30 PM"
pub fn to_twelve_hour(time: &str) -> Option<String> {
    let (hours, minutes) = time.split_once('.')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let period = if hours < 12 { "AM" } else { "PM" };
    let hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    Some(format!("{hours}:{minutes:02} {period}"))
}

// The table is shared with pandas tooling, which writes True/False.
fn serialize_flag<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *value { "True" } else { "False" })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(d)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid availability flag: {other}"
        ))),
    }
}

// Empty means unassigned; pandas writes integer columns holding NaN as floats ("1234567.0").
fn deserialize_patient<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(r) if r.eq_ignore_ascii_case("nan") => return Ok(None),
        Some(r) => r,
    };
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    digits
        .parse()
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid patient id: {raw}")))
}
