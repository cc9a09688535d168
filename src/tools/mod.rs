//! The operations a handler may ask the model to run against the appointment table.

pub mod availability;
pub mod booking;

use serde::Deserialize;

use crate::models::{DesiredDate, DesiredDateTime, DoctorName, IdentificationNumber, Specialization};
use crate::services::ai::tool_call::ToolCall;
use crate::store::AppointmentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CheckAvailabilityByDoctor,
    CheckAvailabilityBySpecialization,
    SetAppointment,
    CancelAppointment,
    RescheduleAppointment,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CheckAvailabilityByDoctor => "check_availability_by_doctor",
            OperationKind::CheckAvailabilityBySpecialization => {
                "check_availability_by_specialization"
            }
            OperationKind::SetAppointment => "set_appointment",
            OperationKind::CancelAppointment => "cancel_appointment",
            OperationKind::RescheduleAppointment => "reschedule_appointment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            OperationKind::CheckAvailabilityByDoctor,
            OperationKind::CheckAvailabilityBySpecialization,
            OperationKind::SetAppointment,
            OperationKind::CancelAppointment,
            OperationKind::RescheduleAppointment,
        ]
        .into_iter()
        .find(|k| k.name() == name.trim())
    }

    /// Argument schema shown to the model.
    pub fn signature(&self) -> &'static str {
        match self {
            OperationKind::CheckAvailabilityByDoctor => {
                r#"check_availability_by_doctor {"desired_date": "DD-MM-YYYY", "doctor_name": "<doctor>"}
  Checks which time slots a specific doctor has free on a day."#
            }
            OperationKind::CheckAvailabilityBySpecialization => {
                r#"check_availability_by_specialization {"desired_date": "DD-MM-YYYY", "specialization": "<specialization>"}
  Checks which doctors of a specialization have free time slots on a day."#
            }
            OperationKind::SetAppointment => {
                r#"set_appointment {"desired_date": "DD-MM-YYYY HH:MM", "id_number": <7-8 digits>, "doctor_name": "<doctor>"}
  Books a time slot with the doctor. Every parameter MUST come from the user."#
            }
            OperationKind::CancelAppointment => {
                r#"cancel_appointment {"date": "DD-MM-YYYY HH:MM", "id_number": <7-8 digits>, "doctor_name": "<doctor>"}
  Cancels an existing appointment. Every parameter MUST come from the user."#
            }
            OperationKind::RescheduleAppointment => {
                r#"reschedule_appointment {"old_date": "DD-MM-YYYY HH:MM", "new_date": "DD-MM-YYYY HH:MM", "id_number": <7-8 digits>, "doctor_name": "<doctor>"}
  Moves an existing appointment to a new time slot with the same doctor. Every parameter MUST come from the user."#
            }
        }
    }
}

/// A fully-typed invocation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum Operation {
    CheckAvailabilityByDoctor {
        desired_date: DesiredDate,
        doctor_name: DoctorName,
    },
    CheckAvailabilityBySpecialization {
        desired_date: DesiredDate,
        specialization: Specialization,
    },
    SetAppointment {
        desired_date: DesiredDateTime,
        id_number: IdentificationNumber,
        doctor_name: DoctorName,
    },
    CancelAppointment {
        date: DesiredDateTime,
        id_number: IdentificationNumber,
        doctor_name: DoctorName,
    },
    RescheduleAppointment {
        old_date: DesiredDateTime,
        new_date: DesiredDateTime,
        id_number: IdentificationNumber,
        doctor_name: DoctorName,
    },
}

impl Operation {
    pub fn decode(call: &ToolCall) -> Result<Self, String> {
        let tagged = serde_json::json!({
            "name": call.name.trim(),
            "arguments": call.arguments,
        });
        serde_json::from_value(tagged)
            .map_err(|e| format!("invalid arguments for {}: {e}", call.name))
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CheckAvailabilityByDoctor { .. } => OperationKind::CheckAvailabilityByDoctor,
            Operation::CheckAvailabilityBySpecialization { .. } => {
                OperationKind::CheckAvailabilityBySpecialization
            }
            Operation::SetAppointment { .. } => OperationKind::SetAppointment,
            Operation::CancelAppointment { .. } => OperationKind::CancelAppointment,
            Operation::RescheduleAppointment { .. } => OperationKind::RescheduleAppointment,
        }
    }

    pub fn execute(&self, store: &AppointmentStore) -> String {
        match self {
            Operation::CheckAvailabilityByDoctor {
                desired_date,
                doctor_name,
            } => availability::check_availability_by_doctor(store, desired_date, *doctor_name),
            Operation::CheckAvailabilityBySpecialization {
                desired_date,
                specialization,
            } => availability::check_availability_by_specialization(
                store,
                desired_date,
                *specialization,
            ),
            Operation::SetAppointment {
                desired_date,
                id_number,
                doctor_name,
            } => booking::set_appointment(store, desired_date, *id_number, *doctor_name),
            Operation::CancelAppointment {
                date,
                id_number,
                doctor_name,
            } => booking::cancel_appointment(store, date, *id_number, *doctor_name),
            Operation::RescheduleAppointment {
                old_date,
                new_date,
                id_number,
                doctor_name,
            } => booking::reschedule_appointment(
                store,
                old_date,
                new_date,
                *id_number,
                *doctor_name,
            ),
        }
    }

    /// Prose for a request the model printed instead of running.
    pub fn describe(&self) -> String {
        match self {
            Operation::CheckAvailabilityByDoctor {
                desired_date,
                doctor_name,
            } => format!(
                "I checked the availability of Dr. {} on {}. Please let me know which time works best for you.",
                doctor_name.title(),
                desired_date.as_str()
            ),
            Operation::CheckAvailabilityBySpecialization {
                desired_date,
                specialization,
            } => format!(
                "I checked the availability of our {} specialists on {}. Please let me know which doctor and time works best for you.",
                specialization.display_name(),
                desired_date.as_str()
            ),
            Operation::SetAppointment {
                desired_date,
                id_number,
                doctor_name,
            } => format!(
                "Your appointment with Dr. {} on {} has been booked. Your reference number is APT-{}.",
                doctor_name.title(),
                desired_date.as_str(),
                id_number
            ),
            Operation::CancelAppointment {
                date, doctor_name, ..
            } => format!(
                "Your appointment with Dr. {} on {} has been cancelled.",
                doctor_name.title(),
                date.as_str()
            ),
            Operation::RescheduleAppointment {
                old_date,
                new_date,
                doctor_name,
                ..
            } => format!(
                "Your appointment with Dr. {} has been rescheduled from {} to {}.",
                doctor_name.title(),
                old_date.as_str(),
                new_date.as_str()
            ),
        }
    }
}
