use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub appointments_csv: String,
    pub llm_provider: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub session_ttl_minutes: i64,
    pub max_tool_steps: usize,
    pub recursion_limit: usize,
    pub clinic_year: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            appointments_csv: env::var("APPOINTMENTS_CSV")
                .unwrap_or_else(|_| "data/doctor_availability.csv".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "groq".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_tool_steps: env::var("MAX_TOOL_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            recursion_limit: env::var("RECURSION_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            clinic_year: env::var("CLINIC_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2024),
        }
    }
}
