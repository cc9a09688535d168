use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{Duration, NaiveDateTime, Utc};

use crate::models::{ConversationState, IdentificationNumber};

#[derive(Debug, Clone)]
pub struct Session {
    pub id_number: IdentificationNumber,
    pub conversation: Option<ConversationState>,
    pub expires_at: NaiveDateTime,
}

/// In-memory per-browser sessions keyed by an opaque token.
///
/// Sessions slide forward by `ttl` on every access. Concurrent turns on the
/// same session are not serialized: the later write replaces the earlier one.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    /// Logs a patient in, reusing `existing` when it belongs to the same patient.
    ///
    /// Switching identification numbers discards the previous conversation.
    pub fn login(&self, existing: Option<&str>, id_number: IdentificationNumber) -> String {
        let now = Self::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(token) = existing {
            if let Some(session) = sessions.get_mut(token) {
                if session.id_number == id_number && session.expires_at > now {
                    session.expires_at = now + self.ttl;
                    return token.to_string();
                }
            }
            sessions.remove(token);
        }

        let token = uuid::Uuid::new_v4().to_string();
        sessions.insert(
            token.clone(),
            Session {
                id_number,
                conversation: None,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let now = Self::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        match sessions.get_mut(token) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + self.ttl;
                Some(session.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Stores the conversation after a turn. Returns false if the session is gone.
    pub fn update(&self, token: &str, conversation: ConversationState) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(token) {
            Some(session) => {
                session.conversation = Some(conversation);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// Drops every expired session, returning how many were removed.
    pub fn expire(&self) -> usize {
        let now = Self::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
