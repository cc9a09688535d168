use std::collections::BTreeMap;

use crate::models::slot::to_twelve_hour;
use crate::models::{DesiredDate, DoctorName, Specialization};
use crate::store::{AppointmentStore, StoreError};

pub const NO_AVAILABILITY: &str = "No availability in the entire day";

pub fn check_availability_by_doctor(
    store: &AppointmentStore,
    desired_date: &DesiredDate,
    doctor_name: DoctorName,
) -> String {
    match availability_by_doctor(store, desired_date, doctor_name) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, doctor = %doctor_name, "availability lookup failed");
            format!("There was an issue checking availability: {e}")
        }
    }
}

pub fn check_availability_by_specialization(
    store: &AppointmentStore,
    desired_date: &DesiredDate,
    specialization: Specialization,
) -> String {
    match availability_by_specialization(store, desired_date, specialization) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(
                error = %e,
                specialization = %specialization,
                "availability lookup failed"
            );
            format!("There was an issue checking availability: {e}")
        }
    }
}

fn availability_by_doctor(
    store: &AppointmentStore,
    desired_date: &DesiredDate,
    doctor_name: DoctorName,
) -> Result<String, StoreError> {
    let slots = store.load()?;
    let times: Vec<&str> = slots
        .iter()
        .filter(|s| {
            s.date() == desired_date.as_str() && s.doctor_name == doctor_name && s.is_available
        })
        .map(|s| s.time())
        .collect();

    if times.is_empty() {
        return Ok(NO_AVAILABILITY.to_string());
    }

    Ok(format!(
        "This availability for {}\nAvailable slots: {}",
        desired_date.as_str(),
        times.join(", ")
    ))
}

fn availability_by_specialization(
    store: &AppointmentStore,
    desired_date: &DesiredDate,
    specialization: Specialization,
) -> Result<String, StoreError> {
    let slots = store.load()?;

    // Grouped per doctor, doctors in name order, slots in table order.
    let mut by_doctor: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for slot in slots.iter().filter(|s| {
        s.date() == desired_date.as_str() && s.specialization == specialization && s.is_available
    }) {
        let display = to_twelve_hour(slot.time()).unwrap_or_else(|| slot.time().to_string());
        by_doctor
            .entry(slot.doctor_name.as_str())
            .or_default()
            .push(display);
    }

    if by_doctor.is_empty() {
        return Ok(NO_AVAILABILITY.to_string());
    }

    let mut output = format!("This availability for {}\n", desired_date.as_str());
    for (doctor, times) in by_doctor {
        output.push_str(doctor);
        output.push_str(". Available slots: \n");
        output.push_str(&times.join(", \n"));
        output.push('\n');
    }
    Ok(output)
}
