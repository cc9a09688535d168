use crate::models::{ChatMessage, ConversationState, Route, RoutingDecision};
use crate::services::ai::{LlmProvider, Message};

pub const FALLBACK_REASONING: &str = "Default routing due to parsing issue.";

const SYSTEM_PROMPT: &str = r#"You are a supervisor tasked with managing a conversation between the following workers. Your primary role is to help the user make, cancel or reschedule appointments with the clinic's doctors and to answer questions about doctor availability. Given the user request and the conversation so far, respond with the worker to act next.

information_node: answers questions about the availability of a doctor or of a specialization on a given day.
booking_node: sets, cancels or reschedules appointments.

Each worker performs a task and responds with its result. When the user's request has been answered, or the latest worker reply asks the user for more information, respond with FINISH. Never route twice in a row for the same request without new input from the user."#;

const ROUTING_INSTRUCTIONS: &str = r#"Based on the user's query, determine which specialized node should handle this request.
If the user is asking about doctor availability or hospital information, respond with "information_node".
If the user is trying to book, cancel, or reschedule an appointment, respond with "booking_node".
If the query has been completely answered or no further action is needed, respond with "FINISH".

Your response should be in this format:
Next: [information_node/booking_node/FINISH]
Reasoning: [your reasoning for the selection]"#;

pub fn id_announcement(state: &ConversationState) -> String {
    format!("user's identification number is {}", state.id_number)
}

/// Reads the two-line `Next:` / `Reasoning:` contract.
///
/// Prefixes match case-insensitively and the last occurrence wins. A missing,
/// empty or unknown `Next:` tag routes to booking with [`FALLBACK_REASONING`].
pub fn parse_routing_reply(reply: &str) -> RoutingDecision {
    let mut tag: Option<String> = None;
    let mut reasoning = String::new();

    for line in reply.lines() {
        let line = line.trim_start();
        if let Some(value) = strip_prefix_ignore_case(line, "next:") {
            tag = Some(clean_tag(value));
        } else if let Some(value) = strip_prefix_ignore_case(line, "reasoning:") {
            reasoning = value.trim().to_string();
        }
    }

    match tag.as_deref().and_then(Route::parse) {
        Some(route) => RoutingDecision { route, reasoning },
        None => RoutingDecision {
            route: Route::Booking,
            reasoning: FALLBACK_REASONING.to_string(),
        },
    }
}

/// Asks the model where the conversation goes next and records the decision.
///
/// On the first turn the user's text is kept as `query` and the identification
/// line is appended to the history; later turns leave the history alone.
pub async fn supervise(
    llm: &dyn LlmProvider,
    state: &mut ConversationState,
) -> anyhow::Result<RoutingDecision> {
    let mut messages = vec![Message::user(id_announcement(state))];
    messages.extend(state.messages.iter().map(Message::from));
    messages.push(Message::system(ROUTING_INSTRUCTIONS));

    let reply = llm.chat(SYSTEM_PROMPT, &messages).await?;
    let decision = parse_routing_reply(&reply);

    tracing::info!(
        route = decision.route.as_str(),
        reasoning = %decision.reasoning,
        history = state.messages.len(),
        "supervisor decision"
    );

    let first_turn = state.messages.len() == 1;
    state.next = Some(decision.route);
    state.current_reasoning = decision.reasoning.clone();
    if first_turn {
        state.query = state.messages[0].content.clone();
        let announcement = id_announcement(state);
        state.messages.push(ChatMessage::human(announcement));
    }

    Ok(decision)
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

// Models echo the format literally at times: "[booking_node]", "**FINISH**".
fn clean_tag(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| matches!(c, '[' | ']' | '"' | '\'' | '*' | '`' | '.'))
        .trim()
        .to_string()
}
