//! Navigation state machine for the version -> book -> chapter -> verses
//! cascade.
//!
//! All methods are synchronous and perform no I/O. Setters and commits
//! return the [`LoadRequest`]s the caller must issue; each request carries
//! the generation counter of its stage, and a commit whose generation no
//! longer matches the stage counter is dropped. That is the whole
//! stale-result story: dependencies changing bump the counter, so a late
//! completion can never overwrite state established by a newer request.

use crate::bible::{BibleVersion, Book, Chapter, VersesResponse};

pub const VERSES_ERROR_MESSAGE: &str = "Unable to load verses right now. Please try again.";

/// One-time instruction for which chapter to land on once a new book's
/// chapter list is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSpecifier {
    First,
    Last,
    Number(u32),
}

impl ChapterSpecifier {
    /// Parse a raw specifier. Strings that are neither "first", "last",
    /// nor numeric carry no selection intent.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => raw.parse::<u32>().ok().map(Self::Number),
        }
    }

    /// Resolve against an ascending chapter list. An empty list resolves
    /// nothing. Numeric specifiers pass through without an existence
    /// check; callers supply values taken from prior fetches.
    pub fn resolve(self, available: &[Chapter]) -> Option<u32> {
        if available.is_empty() {
            return None;
        }

        match self {
            Self::First => available.first().map(|c| c.chapter),
            Self::Last => available.last().map(|c| c.chapter),
            Self::Number(n) => Some(n),
        }
    }
}

/// A fetch the caller must run, tagged with the generation it was issued
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Versions,
    Books {
        generation: u64,
        version: String,
    },
    Chapters {
        generation: u64,
        version: String,
        book: String,
    },
    Verses {
        generation: u64,
        version: String,
        book: String,
        chapter: u32,
    },
}

#[derive(Debug, Default)]
pub struct Navigation {
    version: String,
    version_name: String,
    book: String,
    chapter: String,

    versions: Vec<BibleVersion>,
    books: Vec<Book>,
    chapters: Vec<Chapter>,
    verses: Option<VersesResponse>,

    loading_verses: bool,
    verses_error: Option<String>,

    pending_chapter: Option<ChapterSpecifier>,
    scroll_on_next_verses: bool,

    books_generation: u64,
    chapters_generation: u64,
    verses_generation: u64,
}

impl Navigation {
    pub fn new(version: String, version_name: String) -> Self {
        Self {
            version,
            version_name,
            ..Self::default()
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn book_name(&self) -> Option<&str> {
        self.books
            .iter()
            .find(|b| b.id == self.book)
            .map(|b| b.name.as_str())
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn versions(&self) -> &[BibleVersion] {
        &self.versions
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn verses(&self) -> Option<&VersesResponse> {
        self.verses.as_ref()
    }

    pub fn is_loading_verses(&self) -> bool {
        self.loading_verses
    }

    pub fn verses_error(&self) -> Option<&str> {
        self.verses_error.as_deref()
    }

    /// Fetches to issue on startup: the version list (once, for the
    /// chooser) and the book list for the hydrated version.
    pub fn startup_requests(&mut self) -> Vec<LoadRequest> {
        let mut requests = vec![LoadRequest::Versions];
        requests.extend(self.next_books_request());
        requests
    }

    /// Switch the selected version. A no-op when the identifier is
    /// unchanged; always drops any pending chapter specifier.
    pub fn set_version(&mut self, identifier: &str, name: &str) -> Vec<LoadRequest> {
        self.pending_chapter = None;
        if identifier == self.version {
            return Vec::new();
        }

        self.version = identifier.to_string();
        self.version_name = name.to_string();

        let mut requests = Vec::new();
        requests.extend(self.next_books_request());
        requests.extend(self.next_chapters_request());
        requests.extend(self.next_verses_request());
        requests
    }

    /// Switch the selected book, optionally carrying a chapter specifier
    /// for one-time consumption when the new chapter list lands.
    /// Reselecting the current book without a specifier is a no-op.
    pub fn set_book(&mut self, id: &str, pending: Option<ChapterSpecifier>) -> Vec<LoadRequest> {
        let has_pending = pending.is_some();
        self.pending_chapter = pending;
        if id == self.book && !has_pending {
            return Vec::new();
        }

        self.chapter.clear();
        self.book = id.to_string();

        let mut requests = Vec::new();
        requests.extend(self.next_chapters_request());
        requests.extend(self.next_verses_request());
        requests
    }

    /// Direct, final chapter selection; not subject to resolution, so any
    /// pending specifier is dropped.
    pub fn set_chapter(&mut self, value: &str) -> Vec<LoadRequest> {
        self.pending_chapter = None;
        self.chapter = value.to_string();
        self.next_verses_request().into_iter().collect()
    }

    pub fn set_scroll_on_next_verses(&mut self, flag: bool) {
        self.scroll_on_next_verses = flag;
    }

    /// Single-shot read of the scroll intent; always resets to false.
    pub fn take_scroll_flag(&mut self) -> bool {
        std::mem::take(&mut self.scroll_on_next_verses)
    }

    pub fn commit_versions(&mut self, versions: Vec<BibleVersion>) {
        self.versions = versions;
    }

    /// Commit a completed book-list fetch. Stale generations are dropped.
    /// A selected book missing from the new list (a version switch dropped
    /// it) clears the book and chapter selection.
    pub fn commit_books(&mut self, generation: u64, books: Vec<Book>) {
        if generation != self.books_generation {
            tracing::debug!(generation, current = self.books_generation, "dropping stale book list");
            return;
        }

        self.books = books;

        if !self.book.is_empty() && !self.books.iter().any(|b| b.id == self.book) {
            self.book.clear();
            self.chapter.clear();
            self.pending_chapter = None;
            // Invalidate in-flight loads for the vanished book and clear
            // the dependent lists.
            let _ = self.next_chapters_request();
            let _ = self.next_verses_request();
        }
    }

    /// Commit a completed chapter-list fetch. Consumes the pending chapter
    /// specifier exactly once, whether or not it resolves, and returns the
    /// follow-up verse fetch when it does. Failed resolution clears the
    /// verse payload that was kept through the book transition: it belongs
    /// to the old book and no chapter will land to replace it.
    pub fn commit_chapters(&mut self, generation: u64, chapters: Vec<Chapter>) -> Option<LoadRequest> {
        if generation != self.chapters_generation {
            tracing::debug!(generation, current = self.chapters_generation, "dropping stale chapter list");
            return None;
        }

        self.chapters = chapters;

        let pending = self.pending_chapter.take()?;
        match pending.resolve(&self.chapters) {
            Some(resolved) => {
                self.chapter = resolved.to_string();
                self.next_verses_request()
            }
            None => {
                self.verses = None;
                self.loading_verses = false;
                None
            }
        }
    }

    /// Commit a completed verse fetch. `None` marks a failed fetch: the
    /// prior payload is cleared so stale verses never sit next to an
    /// error message.
    pub fn commit_verses(&mut self, generation: u64, verses: Option<VersesResponse>) {
        if generation != self.verses_generation {
            tracing::debug!(generation, current = self.verses_generation, "dropping stale verses");
            return;
        }

        self.loading_verses = false;
        match verses {
            Some(data) => {
                self.verses = Some(data);
                self.verses_error = None;
            }
            None => {
                self.verses = None;
                self.verses_error = Some(VERSES_ERROR_MESSAGE.to_string());
            }
        }
    }

    fn chapter_number(&self) -> Option<u32> {
        self.chapter.parse().ok()
    }

    fn chapter_index(&self) -> Option<usize> {
        let number = self.chapter_number()?;
        self.chapters.iter().position(|c| c.chapter == number)
    }

    fn book_index(&self) -> Option<usize> {
        if self.book.is_empty() {
            return None;
        }
        self.books.iter().position(|b| b.id == self.book)
    }

    pub fn can_go_previous(&self) -> bool {
        match self.chapter_index() {
            Some(index) if index > 0 => true,
            Some(_) => self.book_index().is_some_and(|i| i > 0),
            None => false,
        }
    }

    pub fn can_go_next(&self) -> bool {
        match self.chapter_index() {
            Some(index) if index + 1 < self.chapters.len() => true,
            Some(_) => self
                .book_index()
                .is_some_and(|i| i + 1 < self.books.len()),
            None => false,
        }
    }

    /// Step to the previous chapter; crossing a book boundary lands on the
    /// prior book's last chapter. Disabled at the first chapter of the
    /// first book.
    pub fn previous_chapter(&mut self) -> Vec<LoadRequest> {
        let requests = match self.chapter_index() {
            Some(index) if index > 0 => {
                let target = self.chapters[index - 1].chapter.to_string();
                self.set_chapter(&target)
            }
            Some(_) => match self.book_index() {
                Some(book_index) if book_index > 0 => {
                    let previous = self.books[book_index - 1].id.clone();
                    self.set_book(&previous, Some(ChapterSpecifier::Last))
                }
                _ => return Vec::new(),
            },
            None => return Vec::new(),
        };

        self.scroll_on_next_verses = true;
        requests
    }

    /// Step to the next chapter; crossing a book boundary lands on the
    /// next book's first chapter. Disabled at the last chapter of the
    /// last book.
    pub fn next_chapter(&mut self) -> Vec<LoadRequest> {
        let requests = match self.chapter_index() {
            Some(index) if index + 1 < self.chapters.len() => {
                let target = self.chapters[index + 1].chapter.to_string();
                self.set_chapter(&target)
            }
            Some(_) => match self.book_index() {
                Some(book_index) if book_index + 1 < self.books.len() => {
                    let next = self.books[book_index + 1].id.clone();
                    self.set_book(&next, Some(ChapterSpecifier::First))
                }
                _ => return Vec::new(),
            },
            None => return Vec::new(),
        };

        self.scroll_on_next_verses = true;
        requests
    }

    fn next_books_request(&mut self) -> Option<LoadRequest> {
        self.books_generation += 1;
        if self.version.is_empty() {
            self.books.clear();
            return None;
        }

        Some(LoadRequest::Books {
            generation: self.books_generation,
            version: self.version.clone(),
        })
    }

    fn next_chapters_request(&mut self) -> Option<LoadRequest> {
        // Bump before the gating checks so an in-flight load for the old
        // dependency key is invalidated even when no new fetch is issued.
        self.chapters_generation += 1;
        if self.version.is_empty() || self.book.is_empty() {
            self.chapters.clear();
            return None;
        }

        Some(LoadRequest::Chapters {
            generation: self.chapters_generation,
            version: self.version.clone(),
            book: self.book.clone(),
        })
    }

    fn next_verses_request(&mut self) -> Option<LoadRequest> {
        self.verses_generation += 1;
        if self.version.is_empty() || self.book.is_empty() || self.chapter.is_empty() {
            // A pending specifier means a resolved chapter is about to
            // land; keep the current payload until it does to avoid a
            // blank frame mid-transition.
            if self.pending_chapter.is_none() {
                self.verses = None;
            }
            self.loading_verses = false;
            return None;
        }

        let Ok(chapter) = self.chapter.parse::<u32>() else {
            // Non-numeric chapter: not yet ready, not an error.
            self.loading_verses = false;
            return None;
        };

        self.loading_verses = true;
        self.verses_error = None;

        Some(LoadRequest::Verses {
            generation: self.verses_generation,
            version: self.version.clone(),
            book: self.book.clone(),
            chapter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bible::Translation;

    fn chapter(book_id: &str, number: u32) -> Chapter {
        Chapter {
            book_id: book_id.to_string(),
            book: book_id.to_string(),
            chapter: number,
            url: String::new(),
        }
    }

    fn chapters(book_id: &str, count: u32) -> Vec<Chapter> {
        (1..=count).map(|n| chapter(book_id, n)).collect()
    }

    fn book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            name: id.to_string(),
            url: String::new(),
        }
    }

    fn translation(identifier: &str) -> Translation {
        Translation {
            identifier: identifier.to_string(),
            name: identifier.to_string(),
            language: String::new(),
            language_code: String::new(),
            license: String::new(),
        }
    }

    fn verses_response(version: &str, book_id: &str, chapter_number: u32, count: u32) -> VersesResponse {
        VersesResponse {
            translation: translation(version),
            verses: (1..=count)
                .map(|n| crate::bible::Verse {
                    book_id: book_id.to_string(),
                    book: book_id.to_string(),
                    chapter: chapter_number,
                    verse: n,
                    text: format!("verse {n}"),
                })
                .collect(),
        }
    }

    fn books_generation(request: &LoadRequest) -> u64 {
        match request {
            LoadRequest::Books { generation, .. } => *generation,
            other => panic!("expected books request, got {other:?}"),
        }
    }

    fn chapters_generation(request: &LoadRequest) -> u64 {
        match request {
            LoadRequest::Chapters { generation, .. } => *generation,
            other => panic!("expected chapters request, got {other:?}"),
        }
    }

    fn nav() -> Navigation {
        Navigation::new("kjv".to_string(), "King James Version".to_string())
    }

    #[test]
    fn resolve_first_and_last() {
        let list = chapters("genesis", 50);
        assert_eq!(ChapterSpecifier::First.resolve(&list), Some(1));
        assert_eq!(ChapterSpecifier::Last.resolve(&list), Some(50));
    }

    #[test]
    fn resolve_empty_list_is_none_for_every_specifier() {
        assert_eq!(ChapterSpecifier::First.resolve(&[]), None);
        assert_eq!(ChapterSpecifier::Last.resolve(&[]), None);
        assert_eq!(ChapterSpecifier::Number(7).resolve(&[]), None);
    }

    #[test]
    fn resolve_numeric_passes_through_without_existence_check() {
        let list = chapters("genesis", 3);
        assert_eq!(ChapterSpecifier::Number(99).resolve(&list), Some(99));
    }

    #[test]
    fn parse_accepts_keywords_and_numbers_only() {
        assert_eq!(ChapterSpecifier::parse("first"), Some(ChapterSpecifier::First));
        assert_eq!(ChapterSpecifier::parse("last"), Some(ChapterSpecifier::Last));
        assert_eq!(ChapterSpecifier::parse("12"), Some(ChapterSpecifier::Number(12)));
        assert_eq!(ChapterSpecifier::parse("middle"), None);
    }

    #[test]
    fn set_version_same_identifier_is_noop() {
        let mut nav = nav();
        let requests = nav.set_version("kjv", "King James Version");
        assert!(requests.is_empty());
    }

    #[test]
    fn set_book_same_id_without_pending_is_noop() {
        let mut nav = nav();
        let _ = nav.set_book("genesis", None);
        assert!(nav.set_book("genesis", None).is_empty());
    }

    #[test]
    fn set_book_same_id_with_pending_proceeds() {
        let mut nav = nav();
        let _ = nav.set_book("genesis", None);
        let requests = nav.set_book("genesis", Some(ChapterSpecifier::Last));
        assert!(matches!(requests[0], LoadRequest::Chapters { .. }));
    }

    #[test]
    fn reselecting_book_clears_stored_pending_even_on_noop() {
        let mut nav = nav();
        let requests = nav.set_book("exodus", Some(ChapterSpecifier::Last));
        let generation = chapters_generation(&requests[0]);
        // The redundant click stores (and thereby clears) the specifier
        // before the no-op check, matching the setter contract.
        let _ = nav.set_book("exodus", None);

        let follow_up = nav.commit_chapters(generation, chapters("exodus", 40));
        assert!(follow_up.is_none());
        assert_eq!(nav.chapter(), "");
    }

    #[test]
    fn pending_last_resolves_once_then_clears() {
        let mut nav = nav();
        let requests = nav.set_book("exodus", Some(ChapterSpecifier::Last));
        let generation = chapters_generation(&requests[0]);

        let follow_up = nav.commit_chapters(generation, chapters("exodus", 40));
        assert_eq!(nav.chapter(), "40");
        assert!(matches!(
            follow_up,
            Some(LoadRequest::Verses { chapter: 40, .. })
        ));

        // An unrelated chapter-list reload (version switch keeps the book
        // and chapter) must not re-apply the consumed specifier.
        let requests = nav.set_version("niv", "NIV");
        let generation = requests
            .iter()
            .find_map(|r| match r {
                LoadRequest::Chapters { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();
        let follow_up = nav.commit_chapters(generation, chapters("exodus", 40));
        assert!(follow_up.is_none());
        assert_eq!(nav.chapter(), "40");
    }

    #[test]
    fn pending_consumed_even_when_resolution_fails() {
        let mut nav = nav();
        let requests = nav.set_book("exodus", Some(ChapterSpecifier::Last));
        let generation = chapters_generation(&requests[0]);

        // Empty chapter list: resolution fails, specifier still consumed.
        assert!(nav.commit_chapters(generation, Vec::new()).is_none());

        let requests = nav.set_book("leviticus", None);
        let generation = chapters_generation(&requests[0]);
        assert!(nav.commit_chapters(generation, chapters("leviticus", 27)).is_none());
        assert_eq!(nav.chapter(), "");
    }

    #[test]
    fn failed_pending_resolution_clears_kept_verses() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "exodus", "1");
        let requests = nav.set_chapter("1");
        let generation = match &requests[0] {
            LoadRequest::Verses { generation, .. } => *generation,
            other => panic!("expected verses request, got {other:?}"),
        };
        nav.commit_verses(generation, Some(verses_response("kjv", "exodus", 1, 22)));

        let requests = nav.previous_chapter();
        assert_eq!(nav.book(), "genesis");
        // The payload survives the transition until the chapter list lands.
        assert!(nav.verses().is_some());

        // The new book's chapter list fails and degrades to empty, so the
        // pending specifier cannot resolve; the old book's verses must not
        // stay on screen against the new selection.
        let generation = chapters_generation(&requests[0]);
        assert!(nav.commit_chapters(generation, Vec::new()).is_none());
        assert_eq!(nav.chapter(), "");
        assert!(nav.verses().is_none());
        assert!(!nav.is_loading_verses());
    }

    #[test]
    fn stale_book_list_is_rejected() {
        let mut nav = nav();
        let stale = books_generation(&nav.startup_requests()[1]);

        let requests = nav.set_version("niv", "NIV");
        let fresh = books_generation(&requests[0]);

        // Version A's list completes after the switch to B.
        nav.commit_books(stale, vec![book("a-only")]);
        assert!(nav.books().is_empty());

        nav.commit_books(fresh, vec![book("genesis"), book("exodus")]);
        assert_eq!(nav.books().len(), 2);
        assert_eq!(nav.books()[0].id, "genesis");
    }

    #[test]
    fn version_switch_prunes_missing_book() {
        let mut nav = nav();
        let generation = books_generation(&nav.startup_requests()[1]);
        nav.commit_books(generation, vec![book("genesis"), book("tobit")]);

        let _ = nav.set_book("tobit", None);
        let _ = nav.set_chapter("3");

        let requests = nav.set_version("kjv2", "KJV 2");
        let generation = books_generation(&requests[0]);
        nav.commit_books(generation, vec![book("genesis"), book("exodus")]);

        assert_eq!(nav.book(), "");
        assert_eq!(nav.chapter(), "");
        assert!(nav.chapters().is_empty());
        assert!(nav.verses().is_none());
    }

    #[test]
    fn stale_verses_are_rejected() {
        let mut nav = nav();
        let generation = books_generation(&nav.startup_requests()[1]);
        nav.commit_books(generation, vec![book("genesis")]);
        let requests = nav.set_book("genesis", None);
        let generation = chapters_generation(&requests[0]);
        let _ = nav.commit_chapters(generation, chapters("genesis", 50));

        let first = nav.set_chapter("1");
        let stale = match &first[0] {
            LoadRequest::Verses { generation, .. } => *generation,
            other => panic!("expected verses request, got {other:?}"),
        };
        let second = nav.set_chapter("2");
        let fresh = match &second[0] {
            LoadRequest::Verses { generation, .. } => *generation,
            other => panic!("expected verses request, got {other:?}"),
        };

        nav.commit_verses(stale, Some(verses_response("kjv", "genesis", 1, 31)));
        assert!(nav.verses().is_none());

        nav.commit_verses(fresh, Some(verses_response("kjv", "genesis", 2, 25)));
        assert_eq!(nav.verses().unwrap().verses[0].chapter, 2);
    }

    #[test]
    fn full_cascade_reaches_verses() {
        let mut nav = Navigation::new(String::new(), String::new());
        let requests = nav.set_version("kjv", "King James Version");
        let generation = books_generation(&requests[0]);
        nav.commit_books(generation, vec![book("genesis"), book("exodus")]);

        let requests = nav.set_book("genesis", None);
        let generation = chapters_generation(&requests[0]);
        assert!(nav.commit_chapters(generation, chapters("genesis", 50)).is_none());
        assert_eq!(nav.chapters().len(), 50);

        let requests = nav.set_chapter("3");
        match &requests[0] {
            LoadRequest::Verses {
                generation,
                version,
                book,
                chapter,
            } => {
                assert_eq!(version, "kjv");
                assert_eq!(book, "genesis");
                assert_eq!(*chapter, 3);
                assert!(nav.is_loading_verses());

                nav.commit_verses(*generation, Some(verses_response("kjv", "genesis", 3, 24)));
            }
            other => panic!("expected verses request, got {other:?}"),
        }

        let verses = nav.verses().unwrap();
        assert!(!nav.is_loading_verses());
        assert_eq!(verses.verses.len(), 24);
        assert_eq!(verses.verses.first().unwrap().verse, 1);
        assert!(verses
            .verses
            .windows(2)
            .all(|pair| pair[0].verse < pair[1].verse));
        assert!(verses.verses.iter().all(|v| v.chapter == 3));
    }

    #[test]
    fn verse_failure_clears_payload_and_sets_message() {
        let mut nav = nav();
        let _ = nav.set_book("genesis", None);
        let requests = nav.set_chapter("1");
        let generation = match &requests[0] {
            LoadRequest::Verses { generation, .. } => *generation,
            other => panic!("expected verses request, got {other:?}"),
        };

        nav.commit_verses(generation, Some(verses_response("kjv", "genesis", 1, 31)));

        let requests = nav.set_chapter("2");
        let generation = match &requests[0] {
            LoadRequest::Verses { generation, .. } => *generation,
            other => panic!("expected verses request, got {other:?}"),
        };
        nav.commit_verses(generation, None);

        assert!(nav.verses().is_none());
        assert_eq!(nav.verses_error(), Some(VERSES_ERROR_MESSAGE));
    }

    #[test]
    fn non_numeric_chapter_skips_the_fetch() {
        let mut nav = nav();
        let _ = nav.set_book("genesis", None);
        let requests = nav.set_chapter("intro");
        assert!(requests.is_empty());
        assert!(!nav.is_loading_verses());
    }

    fn navigate_to(nav: &mut Navigation, book_id: &str, chapter_value: &str) {
        let requests = nav.set_book(book_id, None);
        if let Some(request) = requests.first() {
            let generation = chapters_generation(request);
            let count = if book_id == "genesis" { 50 } else { 40 };
            let _ = nav.commit_chapters(generation, chapters(book_id, count));
        }
        let _ = nav.set_chapter(chapter_value);
    }

    fn nav_with_two_books() -> Navigation {
        let mut nav = nav();
        let generation = books_generation(&nav.startup_requests()[1]);
        nav.commit_books(generation, vec![book("genesis"), book("exodus")]);
        nav
    }

    #[test]
    fn previous_disabled_at_first_chapter_of_first_book() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "genesis", "1");

        assert!(!nav.can_go_previous());
        assert!(nav.previous_chapter().is_empty());
        assert!(!nav.take_scroll_flag());
    }

    #[test]
    fn next_disabled_at_last_chapter_of_last_book() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "exodus", "40");

        assert!(!nav.can_go_next());
        assert!(nav.next_chapter().is_empty());
    }

    #[test]
    fn previous_across_book_boundary_lands_on_last_chapter() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "exodus", "1");

        assert!(nav.can_go_previous());
        let requests = nav.previous_chapter();
        assert_eq!(nav.book(), "genesis");

        let generation = chapters_generation(&requests[0]);
        let follow_up = nav.commit_chapters(generation, chapters("genesis", 50));
        assert_eq!(nav.chapter(), "50");
        assert!(matches!(
            follow_up,
            Some(LoadRequest::Verses { chapter: 50, .. })
        ));
        assert!(nav.take_scroll_flag());
    }

    #[test]
    fn next_across_book_boundary_lands_on_first_chapter() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "genesis", "50");

        let requests = nav.next_chapter();
        assert_eq!(nav.book(), "exodus");

        let generation = chapters_generation(&requests[0]);
        let _ = nav.commit_chapters(generation, chapters("exodus", 40));
        assert_eq!(nav.chapter(), "1");
    }

    #[test]
    fn previous_within_book_steps_one_chapter() {
        let mut nav = nav_with_two_books();
        navigate_to(&mut nav, "genesis", "3");

        let requests = nav.previous_chapter();
        assert_eq!(nav.chapter(), "2");
        assert!(matches!(
            requests[0],
            LoadRequest::Verses { chapter: 2, .. }
        ));
    }

    #[test]
    fn scroll_flag_is_single_shot() {
        let mut nav = nav();
        nav.set_scroll_on_next_verses(true);
        assert!(nav.take_scroll_flag());
        assert!(!nav.take_scroll_flag());
    }
}
