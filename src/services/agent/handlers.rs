use std::sync::OnceLock;

use regex::Regex;

use crate::models::{
    ChatMessage, ConversationState, DoctorName, MessageKind, Route, Specialization,
};
use crate::services::ai::tool_call::{self, Reply, ToolCall};
use crate::services::ai::{LlmProvider, Message};
use crate::state::AppState;
use crate::store::AppointmentStore;
use crate::tools::{Operation, OperationKind};

const INFORMATION_TOOLS: &[OperationKind] = &[
    OperationKind::CheckAvailabilityByDoctor,
    OperationKind::CheckAvailabilityBySpecialization,
];

const BOOKING_TOOLS: &[OperationKind] = &[
    OperationKind::SetAppointment,
    OperationKind::CancelAppointment,
    OperationKind::RescheduleAppointment,
];

// Leaked booking replies may carry any of the five shapes.
const ALL_TOOLS: [OperationKind; 5] = [
    OperationKind::CheckAvailabilityByDoctor,
    OperationKind::CheckAvailabilityBySpecialization,
    OperationKind::SetAppointment,
    OperationKind::CancelAppointment,
    OperationKind::RescheduleAppointment,
];

const INFORMATION_ROLE: &str = "You are specialized agent to provide information related to availability of doctors or any FAQs related to hospital based on the query. You have access to the tool.\nMake sure to ask user politely if you need any further information to execute the tool.";

const BOOKING_ROLE: &str = "You are specialized agent to set, cancel or reschedule appointment based on the query. You have access to the tool.\nMake sure to ask user politely if you need any further information to execute the tool.";

const FALLBACK_REPLY: &str = "I'm sorry, I couldn't complete that request. Could you tell me the doctor's name and the date you have in mind?";

/// Answers availability questions, then hands control back to the supervisor.
pub async fn information_node(
    state: &AppState,
    conversation: &mut ConversationState,
) -> anyhow::Result<()> {
    let history: Vec<Message> = conversation.messages.iter().map(Message::from).collect();
    let system = system_prompt(INFORMATION_ROLE, INFORMATION_TOOLS, state.config.clinic_year);

    let reply = run_tool_loop(
        state.llm.as_ref(),
        &state.store,
        &system,
        history,
        INFORMATION_TOOLS,
        state.config.max_tool_steps,
        Route::Information,
    )
    .await?;

    let content = finalize_reply(&reply, INFORMATION_TOOLS);
    conversation
        .messages
        .push(ChatMessage::ai(content, Route::Information.as_str()));
    Ok(())
}

/// Sets, cancels or reschedules appointments, then hands control back to the supervisor.
///
/// Never fails: an error inside the tool loop becomes the reply.
pub async fn booking_node(state: &AppState, conversation: &mut ConversationState) {
    let history: Vec<Message> = conversation
        .messages
        .iter()
        .map(|m| match m.kind {
            MessageKind::Human => Message::user(normalize_at_connector(&m.content)),
            MessageKind::Ai => Message::from(m),
        })
        .collect();
    let system = system_prompt(BOOKING_ROLE, BOOKING_TOOLS, state.config.clinic_year);

    let result = run_tool_loop(
        state.llm.as_ref(),
        &state.store,
        &system,
        history,
        BOOKING_TOOLS,
        state.config.max_tool_steps,
        Route::Booking,
    )
    .await;

    let content = match result {
        Ok(reply) => finalize_reply(&reply, &ALL_TOOLS),
        Err(e) => {
            tracing::error!(error = %e, "booking handler failed");
            format!(
                "I apologize, but I encountered an error while processing your request: {e:#}"
            )
        }
    };
    conversation
        .messages
        .push(ChatMessage::ai(content, Route::Booking.as_str()));
}

/// "22-05-2024 at 14:30" -> "22-05-2024 14:30"
pub fn normalize_at_connector(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(\d{2}-\d{2}-\d{4}) at (\d{2}:\d{2})").expect("valid regex")
    });
    re.replace_all(text, "$1 $2").into_owned()
}

fn system_prompt(role: &str, tools: &[OperationKind], clinic_year: i32) -> String {
    let signatures = tools
        .iter()
        .map(|t| t.signature())
        .collect::<Vec<_>>()
        .join("\n");
    let doctors = DoctorName::ALL
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let specializations = Specialization::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{role}\nFor your information, Always consider current year is {clinic_year}.\n\n\
         Tools:\n{signatures}\n\n\
         Valid doctor names: {doctors}\n\
         Valid specializations: {specializations}\n\n\
         To use a tool, reply with exactly one call and nothing else:\n\
         <tool_call>{{\"name\": \"<tool name>\", \"arguments\": {{...}}}}</tool_call>\n\
         The tool result will be sent back to you. When you have everything you need, \
         reply to the user in plain text without any tool call."
    )
}

/// Runs model turns, executing requested operations, until the model answers in
/// plain text or `max_steps` operations have run. Returns the last raw reply.
async fn run_tool_loop(
    llm: &dyn LlmProvider,
    store: &AppointmentStore,
    system: &str,
    mut transcript: Vec<Message>,
    allowed: &[OperationKind],
    max_steps: usize,
    handler: Route,
) -> anyhow::Result<String> {
    let mut reply = llm.chat(system, &transcript).await?;

    for _ in 0..max_steps {
        let call = match tool_call::parse_reply(&reply) {
            Reply::Invoke(call) => call,
            Reply::Final(_) => break,
        };
        let observation = observe(store, &call, allowed, handler);
        transcript.push(Message::assistant(reply));
        transcript.push(Message::user(format!(
            "Tool `{}` returned:\n{}",
            call.name, observation
        )));
        reply = llm.chat(system, &transcript).await?;
    }

    Ok(reply)
}

fn observe(
    store: &AppointmentStore,
    call: &ToolCall,
    allowed: &[OperationKind],
    handler: Route,
) -> String {
    let permitted = OperationKind::from_name(&call.name).filter(|k| allowed.contains(k));
    if permitted.is_none() {
        tracing::warn!(
            tool = %call.name,
            handler = handler.as_str(),
            "tool not available to handler"
        );
        let names = allowed.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ");
        return format!("Unknown tool `{}`. Available tools: {names}", call.name);
    }

    match Operation::decode(call) {
        Ok(operation) => {
            tracing::info!(tool = %call.name, handler = handler.as_str(), "executing tool");
            operation.execute(store)
        }
        Err(e) => {
            tracing::warn!(tool = %call.name, error = %e, "rejected tool arguments");
            e
        }
    }
}

/// Turns any invocation markup left in the reply into prose.
fn finalize_reply(reply: &str, describable: &[OperationKind]) -> String {
    if !tool_call::contains_payload(reply) {
        return reply.trim().to_string();
    }

    tracing::warn!("tool call leaked into the final reply, reformatting");

    let described = tool_call::extract(reply)
        .and_then(|call| Operation::decode(&call).ok())
        .filter(|op| describable.contains(&op.kind()))
        .map(|op| op.describe());
    if let Some(prose) = described {
        return prose;
    }

    let stripped = tool_call::strip_payload(reply);
    if stripped.is_empty() || stripped.starts_with('{') {
        FALLBACK_REPLY.to_string()
    } else {
        stripped
    }
}
