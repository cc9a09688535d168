use axum::Json;
use serde::Serialize;

use crate::models::{DoctorName, Specialization};

#[derive(Serialize)]
pub struct DoctorsResponse {
    doctors: Vec<&'static str>,
    specializations: Vec<&'static str>,
}

// GET /doctors
pub async fn list_doctors() -> Json<DoctorsResponse> {
    Json(DoctorsResponse {
        doctors: DoctorName::ALL.iter().map(|d| d.as_str()).collect(),
        specializations: Specialization::ALL.iter().map(|s| s.as_str()).collect(),
    })
}
