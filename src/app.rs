use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::ai::{
    AiClient, AiError, AiRequestBody, ChatResponse, DevotionResponse, VersePayload,
};
use crate::bible::{
    BibleClient, BibleVersion, Book, BooksResponse, Chapter, ChaptersResponse, VersionsResponse,
    VersesResponse,
};
use crate::config::{Preferences, Settings};
use crate::devotion::{AiState, AiTab, ChatRequest, DevotionRequest, PassageKey};
use crate::language::Language;
use crate::navigation::{LoadRequest, Navigation};
use crate::tui::AppEvent;

/// Network completions posted back into the event loop by spawned fetch
/// tasks. Generations travel with the results so commits can reject
/// anything superseded while the request was in flight.
#[derive(Debug)]
pub enum DataEvent {
    Versions(anyhow::Result<VersionsResponse>),
    Books {
        generation: u64,
        result: anyhow::Result<BooksResponse>,
    },
    Chapters {
        generation: u64,
        result: anyhow::Result<ChaptersResponse>,
    },
    Verses {
        generation: u64,
        result: anyhow::Result<VersesResponse>,
    },
    AiReady,
    Devotion {
        generation: u64,
        result: Result<DevotionResponse, AiError>,
    },
    Chat {
        generation: u64,
        result: Result<ChatResponse, AiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Filtering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Navigation,
    Content,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLevel {
    Version,
    Book,
    Chapter,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Navigation pane state
    pub nav_level: NavLevel,
    pub nav_filter: String,
    pub version_state: ListState,
    pub book_state: ListState,
    pub chapter_state: ListState,

    // Content pane state
    pub content_scroll: u16,
    pub content_height: u16,
    pub total_content_lines: u16,

    // AI pane state
    pub ai_scroll: u16,
    pub chat_input: String,
    pub chat_cursor: usize,

    // Animation state (ellipsis while anything loads)
    pub animation_frame: u8,

    pub language: Language,
    pub navigation: Navigation,
    pub ai: AiState,

    preferences: Preferences,
    bible: BibleClient,
    ai_client: AiClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        preferences: Preferences,
        settings: &Settings,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let navigation = Navigation::new(
            preferences.version.clone(),
            preferences.version_name.clone(),
        );

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Navigation,

            nav_level: NavLevel::Version,
            nav_filter: String::new(),
            version_state: ListState::default(),
            book_state: ListState::default(),
            chapter_state: ListState::default(),

            content_scroll: 0,
            content_height: 0,
            total_content_lines: 0,

            ai_scroll: 0,
            chat_input: String::new(),
            chat_cursor: 0,

            animation_frame: 0,

            language: preferences.language,
            navigation,
            ai: AiState::default(),

            preferences,
            bible: BibleClient::new(&settings.bible_api_url),
            ai_client: AiClient::new(&settings.ai_api_url, &settings.ai_api_key),
            events,
        }
    }

    /// Kick off the startup fetches and the AI warm-up probe.
    pub fn start(&mut self) {
        let client = self.ai_client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            client.warm_up().await;
            let _ = tx.send(AppEvent::Data(DataEvent::AiReady));
        });

        let requests = self.navigation.startup_requests();
        self.dispatch(requests);
    }

    /// Spawn one fetch task per request; each posts its completion back
    /// into the event loop tagged with the generation it was issued under.
    pub fn dispatch(&mut self, requests: Vec<LoadRequest>) {
        for request in requests {
            let bible = self.bible.clone();
            let tx = self.events.clone();

            match request {
                LoadRequest::Versions => {
                    tokio::spawn(async move {
                        let result = bible.fetch_versions().await;
                        let _ = tx.send(AppEvent::Data(DataEvent::Versions(result)));
                    });
                }
                LoadRequest::Books {
                    generation,
                    version,
                } => {
                    tokio::spawn(async move {
                        let result = bible.fetch_books(&version).await;
                        let _ = tx.send(AppEvent::Data(DataEvent::Books { generation, result }));
                    });
                }
                LoadRequest::Chapters {
                    generation,
                    version,
                    book,
                } => {
                    tokio::spawn(async move {
                        let result = bible.fetch_chapters(&version, &book).await;
                        let _ =
                            tx.send(AppEvent::Data(DataEvent::Chapters { generation, result }));
                    });
                }
                LoadRequest::Verses {
                    generation,
                    version,
                    book,
                    chapter,
                } => {
                    tokio::spawn(async move {
                        let result = bible.fetch_verses(&version, &book, chapter).await;
                        let _ = tx.send(AppEvent::Data(DataEvent::Verses { generation, result }));
                    });
                }
            }
        }
    }

    pub fn handle_data(&mut self, event: DataEvent) {
        match event {
            DataEvent::Versions(result) => match result {
                Ok(response) => {
                    self.navigation.commit_versions(response.translations);
                    self.sync_version_cursor();
                }
                Err(error) => {
                    // Non-fatal: the chooser stays empty until a retry.
                    tracing::warn!(%error, "failed to fetch versions");
                }
            },
            DataEvent::Books { generation, result } => {
                let books = match result {
                    Ok(response) => response.books,
                    Err(error) => {
                        tracing::warn!(%error, "failed to fetch books, degrading to empty list");
                        Vec::new()
                    }
                };
                self.navigation.commit_books(generation, books);
                self.sync_book_cursor();
                self.sync_chapter_cursor();
                self.sync_ai_passage();
            }
            DataEvent::Chapters { generation, result } => {
                let chapters = match result {
                    Ok(response) => response.chapters,
                    Err(error) => {
                        tracing::warn!(%error, "failed to fetch chapters, degrading to empty list");
                        Vec::new()
                    }
                };
                let follow_up = self.navigation.commit_chapters(generation, chapters);
                self.sync_chapter_cursor();
                if let Some(request) = follow_up {
                    self.dispatch(vec![request]);
                }
                self.sync_ai_passage();
            }
            DataEvent::Verses { generation, result } => {
                let verses = match result {
                    Ok(response) => Some(response),
                    Err(error) => {
                        tracing::warn!(%error, "failed to fetch verses");
                        None
                    }
                };
                self.navigation.commit_verses(generation, verses);

                // Consume the scroll intent only once the stage settled;
                // a still-loading stage means a newer request owns it.
                if !self.navigation.is_loading_verses() && self.navigation.take_scroll_flag() {
                    self.content_scroll = 0;
                }
                self.sync_ai_passage();
            }
            DataEvent::AiReady => {
                self.ai.set_ready();
                self.maybe_request_devotion(false);
            }
            DataEvent::Devotion { generation, result } => {
                self.ai.commit_devotion(
                    generation,
                    Instant::now(),
                    result.map(|response| response.response),
                );
            }
            DataEvent::Chat { generation, result } => {
                self.ai.commit_chat(generation, result);
            }
        }
    }

    // Navigation pane helpers

    pub fn nav_list_len(&self) -> usize {
        self.filtered_nav_indices().len()
    }

    /// Indices into the current level's full list that match the pane
    /// filter (case-insensitive substring). An empty filter matches all.
    pub fn filtered_nav_indices(&self) -> Vec<usize> {
        let filter = self.nav_filter.to_lowercase();
        let matches = |name: &str| filter.is_empty() || name.to_lowercase().contains(&filter);

        match self.nav_level {
            NavLevel::Version => self
                .navigation
                .versions()
                .iter()
                .enumerate()
                .filter(|(_, v)| matches(&v.name) || matches(&v.identifier))
                .map(|(i, _)| i)
                .collect(),
            NavLevel::Book => self
                .navigation
                .books()
                .iter()
                .enumerate()
                .filter(|(_, b)| matches(&b.name))
                .map(|(i, _)| i)
                .collect(),
            NavLevel::Chapter => self
                .navigation
                .chapters()
                .iter()
                .enumerate()
                .filter(|(_, c)| matches(&c.chapter.to_string()))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.nav_filter.push(c);
        self.reset_filter_cursor();
    }

    pub fn pop_filter_char(&mut self) {
        self.nav_filter.pop();
        self.reset_filter_cursor();
    }

    /// Drop the filter and re-point the cursor at the same item in the
    /// unfiltered list.
    pub fn clear_nav_filter(&mut self) {
        if self.nav_filter.is_empty() {
            return;
        }
        let actual = self
            .nav_state()
            .selected()
            .and_then(|cursor| self.filtered_nav_indices().get(cursor).copied());
        self.nav_filter.clear();
        self.select_or_first(self.nav_level, actual);
    }

    fn reset_filter_cursor(&mut self) {
        let selection = if self.nav_list_len() > 0 { Some(0) } else { None };
        self.nav_state_mut().select(selection);
    }

    fn nav_state(&self) -> &ListState {
        match self.nav_level {
            NavLevel::Version => &self.version_state,
            NavLevel::Book => &self.book_state,
            NavLevel::Chapter => &self.chapter_state,
        }
    }

    fn nav_state_mut(&mut self) -> &mut ListState {
        match self.nav_level {
            NavLevel::Version => &mut self.version_state,
            NavLevel::Book => &mut self.book_state,
            NavLevel::Chapter => &mut self.chapter_state,
        }
    }

    pub fn nav_down(&mut self) {
        let len = self.nav_list_len();
        if len > 0 {
            let state = self.nav_state_mut();
            let i = state.selected().unwrap_or(0);
            state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn nav_up(&mut self) {
        let state = self.nav_state_mut();
        let i = state.selected().unwrap_or(0);
        state.select(Some(i.saturating_sub(1)));
    }

    pub fn nav_first(&mut self) {
        if self.nav_list_len() > 0 {
            self.nav_state_mut().select(Some(0));
        }
    }

    pub fn nav_last(&mut self) {
        let len = self.nav_list_len();
        if len > 0 {
            self.nav_state_mut().select(Some(len - 1));
        }
    }

    /// Cursor indices address the filtered view when the filter applies
    /// to that level; map back to the full list before lookup.
    fn actual_index(&self, level: NavLevel, cursor: usize) -> Option<usize> {
        if level == self.nav_level && !self.nav_filter.is_empty() {
            self.filtered_nav_indices().get(cursor).copied()
        } else {
            Some(cursor)
        }
    }

    pub fn selected_version(&self) -> Option<&BibleVersion> {
        let cursor = self.version_state.selected()?;
        let index = self.actual_index(NavLevel::Version, cursor)?;
        self.navigation.versions().get(index)
    }

    pub fn selected_book(&self) -> Option<&Book> {
        let cursor = self.book_state.selected()?;
        let index = self.actual_index(NavLevel::Book, cursor)?;
        self.navigation.books().get(index)
    }

    pub fn selected_chapter(&self) -> Option<&Chapter> {
        let cursor = self.chapter_state.selected()?;
        let index = self.actual_index(NavLevel::Chapter, cursor)?;
        self.navigation.chapters().get(index)
    }

    /// Apply the highlighted item at the current level.
    pub fn nav_enter(&mut self) {
        match self.nav_level {
            NavLevel::Version => {
                if let Some(version) = self.selected_version().cloned() {
                    self.clear_nav_filter();
                    let requests = self
                        .navigation
                        .set_version(&version.identifier, &version.name);
                    if !requests.is_empty() {
                        self.persist_preferences();
                        self.dispatch(requests);
                    }
                    self.nav_level = NavLevel::Book;
                    self.sync_book_cursor();
                }
            }
            NavLevel::Book => {
                if let Some(book) = self.selected_book().cloned() {
                    self.clear_nav_filter();
                    let requests = self.navigation.set_book(&book.id, None);
                    self.dispatch(requests);
                    self.nav_level = NavLevel::Chapter;
                    self.sync_chapter_cursor();
                }
            }
            NavLevel::Chapter => {
                if let Some(chapter) = self.selected_chapter().map(|c| c.chapter) {
                    self.clear_nav_filter();
                    self.navigation.set_scroll_on_next_verses(true);
                    let requests = self.navigation.set_chapter(&chapter.to_string());
                    self.dispatch(requests);
                    self.focus = FocusPane::Content;
                }
            }
        }
    }

    pub fn nav_back(&mut self) {
        self.clear_nav_filter();
        match self.nav_level {
            NavLevel::Version => {}
            NavLevel::Book => self.nav_level = NavLevel::Version,
            NavLevel::Chapter => self.nav_level = NavLevel::Book,
        }
    }

    pub fn previous_chapter(&mut self) {
        let requests = self.navigation.previous_chapter();
        self.dispatch(requests);
        self.sync_book_cursor();
        self.sync_chapter_cursor();
    }

    pub fn next_chapter(&mut self) {
        let requests = self.navigation.next_chapter();
        self.dispatch(requests);
        self.sync_book_cursor();
        self.sync_chapter_cursor();
    }

    pub fn cycle_language(&mut self) {
        self.language = self.language.next();
        self.persist_preferences();
        self.sync_ai_passage();
    }

    // AI pane

    pub fn select_tab(&mut self, tab: AiTab) {
        self.ai.tab = tab;
        self.ai_scroll = 0;
        if tab == AiTab::Devotion {
            self.maybe_request_devotion(false);
        }
    }

    pub fn refresh_devotion(&mut self) {
        self.maybe_request_devotion(true);
    }

    fn maybe_request_devotion(&mut self, refresh: bool) {
        if self.ai.tab != AiTab::Devotion {
            return;
        }
        let Some(verses) = self.navigation.verses() else {
            return;
        };

        let payload: Vec<VersePayload> = verses
            .verses
            .iter()
            .map(|v| VersePayload {
                verse: v.verse,
                text: v.text.clone(),
            })
            .collect();

        if let Some(request) = self.ai.request_devotion(Instant::now(), refresh, payload) {
            self.spawn_devotion(request);
        }
    }

    fn spawn_devotion(&self, request: DevotionRequest) {
        let body = AiRequestBody::Devotion {
            book: request.key.book,
            chapter: request.key.chapter,
            version: request.key.version,
            language: request.key.language.as_str().to_string(),
            use_cache: request.use_cache,
            verses: request.verses,
        };
        let generation = request.generation;

        let client = self.ai_client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.devotion(body).await;
            let _ = tx.send(AppEvent::Data(DataEvent::Devotion { generation, result }));
        });
    }

    pub fn send_chat_input(&mut self) {
        let question = self.chat_input.clone();
        if let Some(request) = self.ai.send_chat(&question) {
            self.chat_input.clear();
            self.chat_cursor = 0;
            self.spawn_chat(request);
        }
    }

    fn spawn_chat(&self, request: ChatRequest) {
        let body = AiRequestBody::FreeForm {
            book: request.key.book,
            chapter: request.key.chapter,
            version: request.key.version,
            language: request.key.language.as_str().to_string(),
            question: request.question,
            previous_response_id: request.previous_response_id,
        };
        let generation = request.generation;

        let client = self.ai_client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.free_form(body).await;
            let _ = tx.send(AppEvent::Data(DataEvent::Chat { generation, result }));
        });
    }

    /// Recompute the passage both AI modes are scoped to. The key is only
    /// defined once the verse payload for the current selection has
    /// settled; any change resets both modes.
    fn sync_ai_passage(&mut self) {
        let key = self.passage_key();
        self.ai.sync_passage(key);
        self.maybe_request_devotion(false);
    }

    fn passage_key(&self) -> Option<PassageKey> {
        let nav = &self.navigation;
        if nav.is_loading_verses() || nav.verses().is_none() {
            return None;
        }
        if nav.version().is_empty() || nav.book().is_empty() || nav.chapter().is_empty() {
            return None;
        }

        Some(PassageKey {
            book: nav.book().to_string(),
            chapter: nav.chapter().to_string(),
            version: nav.version().to_string(),
            language: self.language,
        })
    }

    fn persist_preferences(&mut self) {
        self.preferences.version = self.navigation.version().to_string();
        self.preferences.version_name = self.navigation.version_name().to_string();
        self.preferences.language = self.language;
        if let Err(error) = self.preferences.save() {
            tracing::warn!(%error, "failed to persist preferences");
        }
    }

    // Content pane scrolling

    pub fn scroll_down(&mut self) {
        if self.content_scroll < self.total_content_lines.saturating_sub(self.content_height) {
            self.content_scroll = self.content_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    pub fn is_busy(&self) -> bool {
        self.navigation.is_loading_verses()
            || self.ai.devotion_loading()
            || self.ai.chat_sending()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Cursor syncing: keep each list cursor pointing at the committed
    // selection after a list replaces its contents.

    fn sync_version_cursor(&mut self) {
        let position = self
            .navigation
            .versions()
            .iter()
            .position(|v| v.identifier == self.navigation.version());
        self.select_or_first(NavLevel::Version, position);
    }

    fn sync_book_cursor(&mut self) {
        let current = self.navigation.book().to_string();
        let position = self
            .navigation
            .books()
            .iter()
            .position(|b| b.id == current);
        self.select_or_first(NavLevel::Book, position);
    }

    fn sync_chapter_cursor(&mut self) {
        let position = self
            .navigation
            .chapter()
            .parse::<u32>()
            .ok()
            .and_then(|n| self.navigation.chapters().iter().position(|c| c.chapter == n));
        self.select_or_first(NavLevel::Chapter, position);
    }

    fn select_or_first(&mut self, level: NavLevel, position: Option<usize>) {
        // Commits land positions in the full list; translate into the
        // filtered view when one is active at this level.
        let (position, len) = if level == self.nav_level && !self.nav_filter.is_empty() {
            let filtered = self.filtered_nav_indices();
            let mapped = position.and_then(|p| filtered.iter().position(|&i| i == p));
            (mapped, filtered.len())
        } else {
            let len = match level {
                NavLevel::Version => self.navigation.versions().len(),
                NavLevel::Book => self.navigation.books().len(),
                NavLevel::Chapter => self.navigation.chapters().len(),
            };
            (position, len)
        };
        let state = match level {
            NavLevel::Version => &mut self.version_state,
            NavLevel::Book => &mut self.book_state,
            NavLevel::Chapter => &mut self.chapter_state,
        };
        match position {
            Some(i) => state.select(Some(i)),
            None if len > 0 => state.select(Some(0)),
            None => state.select(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let settings = Settings {
            bible_api_url: "http://localhost:1".to_string(),
            ai_api_url: "http://localhost:2".to_string(),
            ai_api_key: String::new(),
        };
        App::new(Preferences::default(), &settings, tx)
    }

    fn book(id: &str, name: &str) -> Book {
        Book {
            id: id.to_string(),
            name: name.to_string(),
            url: String::new(),
        }
    }

    fn app_with_books() -> App {
        let mut app = app();
        app.nav_level = NavLevel::Book;
        app.navigation.commit_books(
            0,
            vec![
                book("genesis", "Genesis"),
                book("exodus", "Exodus"),
                book("ezra", "Ezra"),
            ],
        );
        app
    }

    #[test]
    fn nav_filter_narrows_list_and_maps_selection() {
        let mut app = app_with_books();

        for c in "ex".chars() {
            app.push_filter_char(c);
        }

        assert_eq!(app.nav_list_len(), 1);
        assert_eq!(app.selected_book().unwrap().id, "exodus");

        // Clearing the filter re-points the cursor at the same book in
        // the unfiltered list.
        app.clear_nav_filter();
        assert_eq!(app.book_state.selected(), Some(1));
        assert_eq!(app.selected_book().unwrap().id, "exodus");
    }

    #[test]
    fn nav_filter_is_case_insensitive() {
        let mut app = app_with_books();
        for c in "GEN".chars() {
            app.push_filter_char(c);
        }
        assert_eq!(app.selected_book().unwrap().id, "genesis");
    }

    #[test]
    fn nav_filter_without_matches_selects_nothing() {
        let mut app = app_with_books();
        for c in "zzz".chars() {
            app.push_filter_char(c);
        }

        assert_eq!(app.nav_list_len(), 0);
        assert!(app.selected_book().is_none());

        // Deleting back to a matching prefix restores a selection.
        app.pop_filter_char();
        app.pop_filter_char();
        app.pop_filter_char();
        assert_eq!(app.nav_list_len(), 3);
        assert_eq!(app.book_state.selected(), Some(0));
    }
}
