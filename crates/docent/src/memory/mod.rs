//! Bounded per-session conversation memory
//!
//! Turns accumulate per opaque session id and feed the prompt's history
//! window. Growth is bounded twice: each session keeps at most
//! `max_turns_per_session` turns (oldest dropped), and the map keeps at most
//! `max_sessions` sessions (least recently active evicted). Nothing here
//! survives the process.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::MemoryConfig;
use crate::types::query::Role;

/// One exchange turn in a conversation
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

struct SessionHistory {
    turns: VecDeque<ConversationTurn>,
    last_active: DateTime<Utc>,
}

/// In-process conversation store, scoped per session
pub struct ConversationMemory {
    sessions: DashMap<String, SessionHistory>,
    max_turns_per_session: usize,
    max_sessions: usize,
}

impl ConversationMemory {
    /// Create a store with the configured bounds
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns_per_session: config.max_turns_per_session.max(1),
            max_sessions: config.max_sessions.max(1),
        }
    }

    /// Record a turn under a session, creating the session on first use
    pub fn append(&self, session_id: &str, role: Role, content: impl Into<String>) {
        let turn = ConversationTurn {
            role,
            content: content.into(),
            at: Utc::now(),
        };

        {
            let mut session = self
                .sessions
                .entry(session_id.to_string())
                .or_insert_with(|| SessionHistory {
                    turns: VecDeque::new(),
                    last_active: Utc::now(),
                });
            session.turns.push_back(turn);
            while session.turns.len() > self.max_turns_per_session {
                session.turns.pop_front();
            }
            session.last_active = Utc::now();
        }

        self.evict_if_over_capacity(session_id);
    }

    /// The most recent `limit` turns of a session, oldest first.
    ///
    /// Unknown sessions yield an empty history; other sessions' turns are
    /// never visible.
    pub fn recent(&self, session_id: &str, limit: usize) -> Vec<ConversationTurn> {
        match self.sessions.get(session_id) {
            Some(session) => {
                let skip = session.turns.len().saturating_sub(limit);
                session.turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Number of tracked sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn evict_if_over_capacity(&self, just_touched: &str) {
        while self.sessions.len() > self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .filter(|entry| entry.key() != just_touched)
                .min_by_key(|entry| entry.value().last_active)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    tracing::debug!(session = %key, "evicting least recently active session");
                    self.sessions.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(max_turns: usize, max_sessions: usize) -> ConversationMemory {
        ConversationMemory::new(&MemoryConfig {
            history_window: 5,
            max_turns_per_session: max_turns,
            max_sessions,
        })
    }

    #[test]
    fn recent_caps_at_limit_and_keeps_order() {
        let memory = memory(50, 8);
        for i in 0..7 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            memory.append("s1", role, format!("turn {}", i));
        }

        let recent = memory.recent("s1", 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content, "turn 2");
        assert_eq!(recent[4].content, "turn 6");
    }

    #[test]
    fn sessions_are_isolated() {
        let memory = memory(50, 8);
        memory.append("a", Role::User, "from a");
        memory.append("b", Role::User, "from b");

        let recent = memory.recent("a", 10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "from a");
        assert!(memory.recent("unknown", 10).is_empty());
    }

    #[test]
    fn per_session_turn_cap_drops_oldest() {
        let memory = memory(3, 8);
        for i in 0..5 {
            memory.append("s", Role::User, format!("turn {}", i));
        }
        let recent = memory.recent("s", 10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "turn 2");
    }

    #[test]
    fn session_cap_evicts_least_recently_active() {
        let memory = memory(10, 2);
        memory.append("first", Role::User, "x");
        memory.append("second", Role::User, "y");
        memory.append("third", Role::User, "z");

        assert_eq!(memory.session_count(), 2);
        assert!(memory.recent("first", 10).is_empty());
        assert_eq!(memory.recent("third", 10).len(), 1);
    }
}
