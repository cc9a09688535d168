use serde::{Deserialize, Serialize};

use super::IdentificationNumber;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    /// Handler that produced an ai message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Human,
            content: content.into(),
            name: None,
        }
    }

    pub fn ai(content: impl Into<String>, name: &str) -> Self {
        Self {
            kind: MessageKind::Ai,
            content: content.into(),
            name: Some(name.to_string()),
        }
    }

    pub fn role(&self) -> &'static str {
        match self.kind {
            MessageKind::Human => "user",
            MessageKind::Ai => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Route {
    #[serde(rename = "information_node")]
    Information,
    #[serde(rename = "booking_node")]
    Booking,
    #[serde(rename = "FINISH")]
    Finish,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Information => "information_node",
            Route::Booking => "booking_node",
            Route::Finish => "FINISH",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "information_node" => Some(Route::Information),
            "booking_node" => Some(Route::Booking),
            "finish" => Some(Route::Finish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub route: Route,
    pub reasoning: String,
}

/// Everything the routing loop knows about one patient's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub id_number: IdentificationNumber,
    #[serde(default)]
    pub next: Option<Route>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current_reasoning: String,
}

impl ConversationState {
    pub fn new(id_number: IdentificationNumber, first_message: &str) -> Self {
        Self {
            messages: vec![ChatMessage::human(first_message)],
            id_number,
            next: None,
            query: first_message.to_string(),
            current_reasoning: String::new(),
        }
    }

    pub fn last_ai_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Ai)
    }
}
