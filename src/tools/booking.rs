use chrono::NaiveDateTime;

use crate::models::{AppointmentSlot, DesiredDateTime, DoctorName, IdentificationNumber};
use crate::store::{AppointmentStore, StoreError};

pub const NOT_AVAILABLE: &str =
    "No available appointments for that particular date and time. Please try another time slot.";
pub const NO_APPOINTMENT: &str = "You don't have any appointment with those specifications";
pub const NO_EXISTING_APPOINTMENT: &str =
    "You don't have an existing appointment with those specifications";
pub const NEW_SLOT_UNAVAILABLE: &str = "No available slots for the desired new date and time";

/// Converts user-entered date and time into the stored `DD-MM-YYYY HH.MM` key.
///
/// Accepts `DD-MM-YYYY HH:MM` and `YYYY-MM-DD HH:MM`, with an optional `at`
/// between the date and the time.
pub fn normalize_date_time(raw: &str) -> Result<String, StoreError> {
    let cleaned = raw.trim().replace(" at ", " ");

    NaiveDateTime::parse_from_str(&cleaned, "%d-%m-%Y %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%d %H:%M"))
        .map(|dt| dt.format("%d-%m-%Y %H.%M").to_string())
        .map_err(|_| {
            tracing::warn!(input = raw, "failed to parse date");
            StoreError::DateFormat
        })
}

pub fn set_appointment(
    store: &AppointmentStore,
    desired_date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> String {
    match book(store, desired_date, id_number, doctor_name) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "set_appointment failed");
            format!("There was an issue booking your appointment: {e}")
        }
    }
}

pub fn cancel_appointment(
    store: &AppointmentStore,
    date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> String {
    match cancel(store, date, id_number, doctor_name) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "cancel_appointment failed");
            format!("There was an issue canceling your appointment: {e}")
        }
    }
}

pub fn reschedule_appointment(
    store: &AppointmentStore,
    old_date: &DesiredDateTime,
    new_date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> String {
    match reschedule(store, old_date, new_date, id_number, doctor_name) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "reschedule_appointment failed");
            format!("There was an issue rescheduling your appointment: {e}")
        }
    }
}

fn is_open(slot: &AppointmentSlot, key: &str, doctor: DoctorName) -> bool {
    slot.date_slot == key && slot.doctor_name == doctor && slot.is_available
}

fn is_held_by(slot: &AppointmentSlot, key: &str, doctor: DoctorName, patient: u64) -> bool {
    slot.date_slot == key && slot.doctor_name == doctor && slot.patient_to_attend == Some(patient)
}

fn book(
    store: &AppointmentStore,
    desired_date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> Result<String, StoreError> {
    let key = normalize_date_time(desired_date.as_str())?;
    let mut slots = store.load()?;

    let mut matched = false;
    for slot in slots.iter_mut().filter(|s| is_open(s, &key, doctor_name)) {
        slot.assign(id_number.get());
        matched = true;
    }
    if !matched {
        return Ok(NOT_AVAILABLE.to_string());
    }

    store.save(&slots)?;
    tracing::info!(slot = %key, doctor = %doctor_name, "appointment booked");

    Ok(format!(
        "Appointment successfully booked with Dr. {} on {}.",
        doctor_name.title(),
        desired_date.as_str()
    ))
}

fn cancel(
    store: &AppointmentStore,
    date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> Result<String, StoreError> {
    let key = normalize_date_time(date.as_str())?;
    let mut slots = store.load()?;

    let mut matched = false;
    for slot in slots
        .iter_mut()
        .filter(|s| is_held_by(s, &key, doctor_name, id_number.get()))
    {
        slot.release();
        matched = true;
    }
    if !matched {
        return Ok(NO_APPOINTMENT.to_string());
    }

    store.save(&slots)?;
    tracing::info!(slot = %key, doctor = %doctor_name, "appointment cancelled");

    Ok("Appointment successfully cancelled".to_string())
}

fn reschedule(
    store: &AppointmentStore,
    old_date: &DesiredDateTime,
    new_date: &DesiredDateTime,
    id_number: IdentificationNumber,
    doctor_name: DoctorName,
) -> Result<String, StoreError> {
    let old_key = normalize_date_time(old_date.as_str())?;
    let new_key = normalize_date_time(new_date.as_str())?;
    let patient = id_number.get();
    let mut slots = store.load()?;

    // Both checks run before anything is touched.
    if !slots
        .iter()
        .any(|s| is_held_by(s, &old_key, doctor_name, patient))
    {
        return Ok(NO_EXISTING_APPOINTMENT.to_string());
    }
    if !slots.iter().any(|s| is_open(s, &new_key, doctor_name)) {
        return Ok(NEW_SLOT_UNAVAILABLE.to_string());
    }

    for slot in slots.iter_mut() {
        if is_held_by(slot, &old_key, doctor_name, patient) {
            slot.release();
        } else if is_open(slot, &new_key, doctor_name) {
            slot.assign(patient);
        }
    }

    store.save(&slots)?;
    tracing::info!(
        from = %old_key,
        to = %new_key,
        doctor = %doctor_name,
        "appointment rescheduled"
    );

    Ok(format!(
        "Successfully rescheduled appointment with Dr. {} from {} to {}",
        doctor_name.title(),
        old_date.as_str(),
        new_date.as_str()
    ))
}
