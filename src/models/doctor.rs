use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DoctorName {
    #[serde(rename = "kevin anderson")]
    KevinAnderson,
    #[serde(rename = "robert martinez")]
    RobertMartinez,
    #[serde(rename = "susan davis")]
    SusanDavis,
    #[serde(rename = "daniel miller")]
    DanielMiller,
    #[serde(rename = "sarah wilson")]
    SarahWilson,
    #[serde(rename = "michael green")]
    MichaelGreen,
    #[serde(rename = "lisa brown")]
    LisaBrown,
    #[serde(rename = "jane smith")]
    JaneSmith,
    #[serde(rename = "emily johnson")]
    EmilyJohnson,
    #[serde(rename = "john doe")]
    JohnDoe,
}

impl DoctorName {
    pub const ALL: [DoctorName; 10] = [
        DoctorName::KevinAnderson,
        DoctorName::RobertMartinez,
        DoctorName::SusanDavis,
        DoctorName::DanielMiller,
        DoctorName::SarahWilson,
        DoctorName::MichaelGreen,
        DoctorName::LisaBrown,
        DoctorName::JaneSmith,
        DoctorName::EmilyJohnson,
        DoctorName::JohnDoe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DoctorName::KevinAnderson => "kevin anderson",
            DoctorName::RobertMartinez => "robert martinez",
            DoctorName::SusanDavis => "susan davis",
            DoctorName::DanielMiller => "daniel miller",
            DoctorName::SarahWilson => "sarah wilson",
            DoctorName::MichaelGreen => "michael green",
            DoctorName::LisaBrown => "lisa brown",
            DoctorName::JaneSmith => "jane smith",
            DoctorName::EmilyJohnson => "emily johnson",
            DoctorName::JohnDoe => "john doe",
        }
    }

    /// Accepts the stored lowercase form; surrounding whitespace and case are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|d| d.as_str() == wanted)
    }

    /// "kevin anderson" -> "Kevin Anderson"
    pub fn title(&self) -> String {
        self.as_str()
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for DoctorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    GeneralDentist,
    CosmeticDentist,
    Prosthodontist,
    PediatricDentist,
    EmergencyDentist,
    OralSurgeon,
    Orthodontist,
}

impl Specialization {
    pub const ALL: [Specialization; 7] = [
        Specialization::GeneralDentist,
        Specialization::CosmeticDentist,
        Specialization::Prosthodontist,
        Specialization::PediatricDentist,
        Specialization::EmergencyDentist,
        Specialization::OralSurgeon,
        Specialization::Orthodontist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::GeneralDentist => "general_dentist",
            Specialization::CosmeticDentist => "cosmetic_dentist",
            Specialization::Prosthodontist => "prosthodontist",
            Specialization::PediatricDentist => "pediatric_dentist",
            Specialization::EmergencyDentist => "emergency_dentist",
            Specialization::OralSurgeon => "oral_surgeon",
            Specialization::Orthodontist => "orthodontist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|sp| sp.as_str() == wanted)
    }

    /// "oral_surgeon" -> "oral surgeon"
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Models tend to title-case names ("Kevin Anderson"); accept any casing.
impl<'de> Deserialize<'de> for DoctorName {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        DoctorName::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown doctor: {raw}")))
    }
}

impl<'de> Deserialize<'de> for Specialization {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Specialization::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown specialization: {raw}")))
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + &c.as_str().to_lowercase(),
    }
}
