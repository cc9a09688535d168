use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use clinicdesk::config::AppConfig;
use clinicdesk::handlers;
use clinicdesk::models::{DoctorName, MessageKind};
use clinicdesk::services::ai::{LlmProvider, Message};
use clinicdesk::state::AppState;

// ── Mock Provider ──

type Call = (String, Vec<Message>);

/// Replays canned replies in order and records every prompt it receives.
struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), messages.to_vec()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }
}

// ── Helpers ──

const TABLE: &str = "date_slot,doctor_name,specialization,is_available,patient_to_attend
22-05-2024 08.00,john doe,orthodontist,True,
22-05-2024 08.30,john doe,orthodontist,False,1000082
22-05-2024 14.30,kevin anderson,general_dentist,True,
22-05-2024 15.00,kevin anderson,general_dentist,True,
";

struct Harness {
    state: Arc<AppState>,
    calls: Arc<Mutex<Vec<Call>>>,
    _dir: tempfile::TempDir,
}

fn test_config(csv: &str) -> AppConfig {
    AppConfig {
        port: 3000,
        appointments_csv: csv.to_string(),
        llm_provider: "mock".to_string(),
        groq_api_key: String::new(),
        groq_model: String::new(),
        ollama_url: "http://localhost:11434".to_string(),
        ollama_model: "llama3.2".to_string(),
        session_ttl_minutes: 30,
        max_tool_steps: 5,
        recursion_limit: 25,
        clinic_year: 2024,
    }
}

fn harness_with(
    script: Vec<Result<&str, &str>>,
    tweak: impl FnOnce(&mut AppConfig),
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doctor_availability.csv");
    std::fs::write(&path, TABLE).unwrap();

    let mut config = test_config(path.to_str().unwrap());
    tweak(&mut config);

    let calls = Arc::new(Mutex::new(vec![]));
    let llm = ScriptedLlm {
        replies: Mutex::new(
            script
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect(),
        ),
        calls: Arc::clone(&calls),
    };

    Harness {
        state: Arc::new(AppState::new(config, Box::new(llm))),
        calls,
        _dir: dir,
    }
}

fn harness(script: Vec<&str>) -> Harness {
    harness_with(script.into_iter().map(Ok).collect(), |_| {})
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Logs in and returns the `Cookie` header value for later requests.
async fn login(state: &Arc<AppState>, id_number: &str) -> String {
    let res = test_app(state.clone())
        .oneshot(post_json("/login", serde_json::json!({ "id_number": id_number }), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn chat(
    state: &Arc<AppState>,
    cookie: &str,
    message: &str,
) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(post_json(
            "/chat",
            serde_json::json!({ "message": message }),
            Some(cookie),
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

fn session_token(cookie: &str) -> &str {
    cookie.split_once('=').unwrap().1
}

// ── Gateway ──

#[tokio::test]
async fn test_health() {
    let h = harness(vec![]);
    let res = test_app(h.state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_doctors_lists_fixed_enumerations() {
    let h = harness(vec![]);
    let res = test_app(h.state)
        .oneshot(Request::builder().uri("/doctors").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["doctors"].as_array().unwrap().len(), 10);
    assert_eq!(json["doctors"][0], "kevin anderson");
    assert_eq!(json["specializations"].as_array().unwrap().len(), 7);
    assert_eq!(json["specializations"][6], "orthodontist");
}

#[tokio::test]
async fn test_login_rejects_bad_id_numbers() {
    let h = harness(vec![]);
    for bad in [
        serde_json::json!({ "id_number": "123456" }),
        serde_json::json!({ "id_number": "123456789" }),
        serde_json::json!({ "id_number": "12345ab" }),
        serde_json::json!({}),
    ] {
        let res = test_app(h.state.clone())
            .oneshot(post_json("/login", bad.clone(), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {bad}");
        let json = body_json(res).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Please enter a valid 7-8 digit ID number");
    }
}

#[tokio::test]
async fn test_login_accepts_numeric_id() {
    let h = harness(vec![]);
    let res = test_app(h.state.clone())
        .oneshot(post_json("/login", serde_json::json!({ "id_number": 12345678 }), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Login successful");
    assert_eq!(h.state.sessions.len(), 1);
}

#[tokio::test]
async fn test_chat_requires_login() {
    let h = harness(vec![]);
    let res = test_app(h.state)
        .oneshot(post_json("/chat", serde_json::json!({ "message": "hi" }), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["message"], "Please login first");
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let h = harness(vec![]);
    let cookie = login(&h.state, "1234567").await;
    let (status, json) = chat(&h.state, &cookie, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Message cannot be empty");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let h = harness(vec![]);
    let cookie = login(&h.state, "1234567").await;

    let res = test_app(h.state.clone())
        .oneshot(post_json("/logout", serde_json::json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "Logged out successfully");

    let (status, _) = chat(&h.state, &cookie, "hello").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Conversation loop ──

#[tokio::test]
async fn test_information_turn_runs_lookup() {
    let h = harness(vec![
        "Next: information_node\nReasoning: availability question",
        r#"<tool_call>{"name": "check_availability_by_doctor", "arguments": {"desired_date": "22-05-2024", "doctor_name": "john doe"}}</tool_call>"#,
        "Dr. John Doe is free at 08.00 on 22-05-2024.",
        "Next: FINISH\nReasoning: answered",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "Is john doe free on 22-05-2024?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Dr. John Doe is free at 08.00 on 22-05-2024.");

    let calls = h.calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    let observation = &calls[2].1.last().unwrap().content;
    assert!(observation.contains("Available slots: 08.00"), "{observation}");

    let session = h.state.sessions.get(session_token(&cookie)).unwrap();
    let conversation = session.conversation.unwrap();
    assert_eq!(conversation.query, "Is john doe free on 22-05-2024?");
    assert_eq!(conversation.current_reasoning, "answered");
    let last = conversation.messages.last().unwrap();
    assert_eq!(last.kind, MessageKind::Ai);
    assert_eq!(last.name.as_deref(), Some("information_node"));
}

#[tokio::test]
async fn test_booking_turn_updates_store() {
    let h = harness(vec![
        "Next: booking_node\nReasoning: wants an appointment",
        r#"<tool_call>{"name": "set_appointment", "arguments": {"desired_date": "22-05-2024 14:30", "id_number": 1234567, "doctor_name": "kevin anderson"}}</tool_call>"#,
        "You're booked with Dr. Kevin Anderson on 22-05-2024 at 14:30.",
        "Next: FINISH\nReasoning: booked",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(
        &h.state,
        &cookie,
        "Book kevin anderson on 22-05-2024 at 14:30",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["message"],
        "You're booked with Dr. Kevin Anderson on 22-05-2024 at 14:30."
    );

    let slots = h.state.store.load().unwrap();
    let booked = slots
        .iter()
        .find(|s| {
            s.date_slot == "22-05-2024 14.30" && s.doctor_name == DoctorName::KevinAnderson
        })
        .unwrap();
    assert!(!booked.is_available);
    assert_eq!(booked.patient_to_attend, Some(1234567));

    let calls = h.calls.lock().unwrap();
    // The booking handler sees the connector-free date.
    let booking_prompt = &calls[1].1;
    assert_eq!(booking_prompt[0].content, "Book kevin anderson on 22-05-2024 14:30");
    assert!(calls[1].0.contains("set_appointment"));
    assert!(!calls[1].0.contains("check_availability_by_doctor"));
    let observation = &calls[2].1.last().unwrap().content;
    assert!(observation.contains("Appointment successfully booked with Dr. Kevin Anderson"));
}

fn kevin_slot_is_free(state: &AppState, date_slot: &str) -> bool {
    state
        .store
        .load()
        .unwrap()
        .iter()
        .find(|s| s.date_slot == date_slot && s.doctor_name == DoctorName::KevinAnderson)
        .unwrap()
        .is_available
}

#[tokio::test]
async fn test_information_handler_cannot_book() {
    let h = harness(vec![
        "Next: information_node\nReasoning: availability question",
        r#"<tool_call>{"name": "set_appointment", "arguments": {"desired_date": "22-05-2024 14:30", "id_number": 1234567, "doctor_name": "kevin anderson"}}</tool_call>"#,
        "Dr. Kevin Anderson is free at 14.30 on 22-05-2024.",
        "Next: FINISH\nReasoning: answered",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (status, _) = chat(&h.state, &cookie, "Is kevin anderson free on 22-05-2024?").await;
    assert_eq!(status, StatusCode::OK);

    let calls = h.calls.lock().unwrap();
    let observation = &calls[2].1.last().unwrap().content;
    assert!(observation.contains("Unknown tool `set_appointment`"), "{observation}");
    assert!(
        observation.contains(
            "Available tools: check_availability_by_doctor, check_availability_by_specialization"
        ),
        "{observation}"
    );
    assert!(kevin_slot_is_free(&h.state, "22-05-2024 14.30"));
}

#[tokio::test]
async fn test_booking_handler_reports_invalid_arguments() {
    let h = harness(vec![
        "Next: booking_node\nReasoning: wants an appointment",
        r#"<tool_call>{"name": "set_appointment", "arguments": {"desired_date": "22-05-2024 14:30", "id_number": 123456, "doctor_name": "kevin anderson"}}</tool_call>"#,
        "Could you confirm your 7-8 digit identification number?",
        "Next: FINISH\nReasoning: waiting for the user",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "Book kevin anderson on 22-05-2024 14:30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["message"],
        "Could you confirm your 7-8 digit identification number?"
    );

    let calls = h.calls.lock().unwrap();
    let observation = &calls[2].1.last().unwrap().content;
    let result = observation
        .strip_prefix("Tool `set_appointment` returned:\n")
        .unwrap();
    assert!(
        result.starts_with("invalid arguments for set_appointment"),
        "{observation}"
    );
    assert!(kevin_slot_is_free(&h.state, "22-05-2024 14.30"));
}

#[tokio::test]
async fn test_unparseable_routing_falls_back_to_booking() {
    let h = harness(vec![
        "I'd say the booking agent.",
        "Which doctor would you like to see?",
        "Next: FINISH\nReasoning: waiting for the user",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "I need an appointment").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Which doctor would you like to see?");
    let session = h.state.sessions.get(session_token(&cookie)).unwrap();
    let conversation = session.conversation.unwrap();
    let handler_reply = &conversation.messages[2];
    assert_eq!(handler_reply.name.as_deref(), Some("booking_node"));
}

#[tokio::test]
async fn test_booking_failure_is_reported_in_band() {
    let h = harness_with(
        vec![
            Ok("Next: booking_node\nReasoning: cancel request"),
            Err("connection reset"),
            Ok("Next: FINISH\nReasoning: reported the error"),
        ],
        |_| {},
    );
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "Cancel my appointment").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["message"],
        "I apologize, but I encountered an error while processing your request: connection reset"
    );
}

#[tokio::test]
async fn test_leaked_tool_call_is_reformatted() {
    let h = harness_with(
        vec![
            Ok("Next: information_node\nReasoning: lookup"),
            Ok(r#"<function=check_availability_by_doctor>{"desired_date": "22-05-2024", "doctor_name": "john doe"}</function>"#),
            Ok("Next: FINISH\nReasoning: done"),
        ],
        |config| config.max_tool_steps = 0,
    );
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "john doe on 22-05-2024?").await;

    assert_eq!(status, StatusCode::OK);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("Dr. John Doe"), "{message}");
    assert!(message.contains("22-05-2024"), "{message}");
    assert!(!message.contains("<function="), "{message}");
}

#[tokio::test]
async fn test_identification_line_added_once() {
    let h = harness(vec![
        "Next: information_node\nReasoning: lookup",
        "Which day are you interested in?",
        "Next: FINISH\nReasoning: asked for a date",
        "Next: information_node\nReasoning: date given",
        "Dr. John Doe is free at 08.00.",
        "Next: FINISH\nReasoning: answered",
    ]);
    let cookie = login(&h.state, "1234567").await;

    let (_, first) = chat(&h.state, &cookie, "Is john doe free?").await;
    assert_eq!(first["message"], "Which day are you interested in?");
    let (_, second) = chat(&h.state, &cookie, "22-05-2024").await;
    assert_eq!(second["message"], "Dr. John Doe is free at 08.00.");

    let session = h.state.sessions.get(session_token(&cookie)).unwrap();
    let conversation = session.conversation.unwrap();
    let announcements = conversation
        .messages
        .iter()
        .filter(|m| m.content == "user's identification number is 1234567")
        .count();
    assert_eq!(announcements, 1);
    assert_eq!(conversation.messages.len(), 5);
    assert_eq!(conversation.query, "Is john doe free?");

    // Every supervisor prompt opens with the identification line.
    let calls = h.calls.lock().unwrap();
    assert_eq!(calls[3].1[0].content, "user's identification number is 1234567");
}

#[tokio::test]
async fn test_recursion_limit_is_a_server_error() {
    let h = harness_with(
        vec![
            Ok("Next: booking_node\nReasoning: again"),
            Ok("Still working on it."),
            Ok("Next: booking_node\nReasoning: again"),
            Ok("Still working on it."),
        ],
        |config| config.recursion_limit = 4,
    );
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "book something").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Server error: Recursion limit of 4"), "{message}");
}

#[tokio::test]
async fn test_no_handler_reply_is_an_error() {
    let h = harness(vec!["Next: FINISH\nReasoning: nothing to do"]);
    let cookie = login(&h.state, "1234567").await;

    let (status, json) = chat(&h.state, &cookie, "thanks").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "No response from the agent");
}
