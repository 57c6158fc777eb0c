//! Coordinator for the two AI content modes layered over the selected
//! passage: a cached devotion and a free-form chat.
//!
//! Pure state, no I/O. Requests are generation-tagged like the navigation
//! cascade; a passage or language change bumps the generation and resets
//! both modes, so completions for the old passage are dropped on arrival.

use std::time::{Duration, Instant};

use crate::ai::{AiError, ChatResponse, VersePayload};
use crate::language::Language;

/// Cool-down after a successful devotion refresh.
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

/// Chat input is truncated to this many characters before sending.
pub const MAX_QUESTION_CHARS: usize = 500;

pub const RATE_LIMIT_MESSAGE: &str =
    "The AI service is busy right now. Please wait a moment before refreshing again.";

/// Identity of the content both modes are scoped to. Any change here is
/// the dominant invalidation rule: everything resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageKey {
    pub book: String,
    pub chapter: String,
    pub version: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiTab {
    #[default]
    Devotion,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevotionRequest {
    pub generation: u64,
    pub key: PassageKey,
    pub use_cache: bool,
    pub verses: Vec<VersePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub generation: u64,
    pub key: PassageKey,
    pub question: String,
    pub previous_response_id: Option<String>,
}

#[derive(Debug, Default)]
struct Devotion {
    content: Option<String>,
    loading: bool,
    refreshing: bool,
    error: Option<String>,
    cooldown_until: Option<Instant>,
}

#[derive(Debug, Default)]
struct Chat {
    messages: Vec<ChatMessage>,
    previous_response_id: Option<String>,
    sending: bool,
    error: Option<String>,
}

#[derive(Debug, Default)]
pub struct AiState {
    key: Option<PassageKey>,
    generation: u64,
    ready: bool,
    pub tab: AiTab,
    devotion: Devotion,
    chat: Chat,
}

impl AiState {
    /// Warm-up probe finished; until then no request is issued.
    pub fn set_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn passage(&self) -> Option<&PassageKey> {
        self.key.as_ref()
    }

    pub fn devotion_content(&self) -> Option<&str> {
        self.devotion.content.as_deref()
    }

    pub fn devotion_error(&self) -> Option<&str> {
        self.devotion.error.as_deref()
    }

    pub fn devotion_loading(&self) -> bool {
        self.devotion.loading
    }

    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let until = self.devotion.cooldown_until?;
        if now >= until {
            return None;
        }
        Some(until - now)
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        &self.chat.messages
    }

    pub fn chat_error(&self) -> Option<&str> {
        self.chat.error.as_deref()
    }

    pub fn chat_sending(&self) -> bool {
        self.chat.sending
    }

    /// Point both modes at a (possibly new) passage. A changed key resets
    /// them to idle/empty and invalidates in-flight completions.
    pub fn sync_passage(&mut self, key: Option<PassageKey>) {
        if key == self.key {
            return;
        }

        tracing::debug!(?key, "passage changed, resetting AI content");
        self.key = key;
        self.generation += 1;
        self.devotion = Devotion::default();
        self.chat = Chat::default();
    }

    /// Ask for devotion content. Returns nothing on a cache hit, while a
    /// request is already in flight, while the refresh cool-down runs, or
    /// when there is no passage yet.
    pub fn request_devotion(
        &mut self,
        now: Instant,
        refresh: bool,
        verses: Vec<VersePayload>,
    ) -> Option<DevotionRequest> {
        if !self.ready || self.devotion.loading {
            return None;
        }
        if !refresh && self.devotion.content.is_some() {
            return None;
        }
        if refresh && self.cooldown_remaining(now).is_some() {
            return None;
        }
        let key = self.key.clone()?;

        self.devotion.loading = true;
        self.devotion.refreshing = refresh;
        self.devotion.error = None;

        Some(DevotionRequest {
            generation: self.generation,
            key,
            use_cache: !refresh,
            verses,
        })
    }

    /// Commit a devotion completion. A 429 on refresh keeps the previous
    /// content on screen with a rate-limit notice; other failures clear
    /// the content. A successful refresh starts the cool-down.
    pub fn commit_devotion(
        &mut self,
        generation: u64,
        now: Instant,
        result: Result<String, AiError>,
    ) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale devotion");
            return;
        }

        self.devotion.loading = false;
        let was_refresh = std::mem::take(&mut self.devotion.refreshing);

        match result {
            Ok(content) => {
                self.devotion.content = Some(content);
                self.devotion.error = None;
                if was_refresh {
                    self.devotion.cooldown_until = Some(now + REFRESH_COOLDOWN);
                }
            }
            Err(AiError::RateLimited) => {
                self.devotion.error = Some(RATE_LIMIT_MESSAGE.to_string());
            }
            Err(error) => {
                self.devotion.content = None;
                self.devotion.error = Some(error.to_string());
            }
        }
    }

    /// Send a chat message. The user turn is appended immediately; the
    /// request carries the running continuation token when one exists.
    pub fn send_chat(&mut self, question: &str) -> Option<ChatRequest> {
        if !self.ready || self.chat.sending {
            return None;
        }
        let question: String = question.trim().chars().take(MAX_QUESTION_CHARS).collect();
        if question.is_empty() {
            return None;
        }
        let key = self.key.clone()?;

        self.chat.messages.push(ChatMessage {
            role: ChatRole::User,
            content: question.clone(),
        });
        self.chat.sending = true;
        self.chat.error = None;

        Some(ChatRequest {
            generation: self.generation,
            key,
            question,
            previous_response_id: self.chat.previous_response_id.clone(),
        })
    }

    /// Commit a chat completion: append the assistant turn and store the
    /// new continuation token, or surface an inline error with no turn.
    pub fn commit_chat(&mut self, generation: u64, result: Result<ChatResponse, AiError>) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale chat reply");
            return;
        }

        self.chat.sending = false;
        match result {
            Ok(response) => {
                self.chat.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: response.response,
                });
                self.chat.previous_response_id = Some(response.response_id);
                self.chat.error = None;
            }
            Err(error) => {
                self.chat.error = Some(error.to_string());
            }
        }
    }
}
