use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FocusPane, InputMode};
use crate::devotion::AiTab;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Data(data) => app.handle_data(data),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Filtering => handle_filter_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Focus cycling
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Navigation => FocusPane::Content,
                FocusPane::Content => FocusPane::Ai,
                FocusPane::Ai => FocusPane::Navigation,
            };
        }

        // Up/down within the focused pane
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Navigation => app.nav_down(),
            FocusPane::Content => app.scroll_down(),
            FocusPane::Ai => app.ai_scroll = app.ai_scroll.saturating_add(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Navigation => app.nav_up(),
            FocusPane::Content => app.scroll_up(),
            FocusPane::Ai => app.ai_scroll = app.ai_scroll.saturating_sub(1),
        },
        KeyCode::Char('g') => {
            if app.focus == FocusPane::Navigation {
                app.nav_first();
            } else if app.focus == FocusPane::Content {
                app.content_scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if app.focus == FocusPane::Navigation {
                app.nav_last();
            } else if app.focus == FocusPane::Content {
                app.content_scroll = app
                    .total_content_lines
                    .saturating_sub(app.content_height);
            }
        }

        // Select / descend
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            if app.focus == FocusPane::Navigation {
                app.nav_enter();
            }
        }

        // Back / ascend
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
            if app.focus == FocusPane::Navigation {
                app.nav_back();
            } else {
                app.focus = FocusPane::Navigation;
            }
        }

        // Chapter paging, available from any pane
        KeyCode::Char('[') => app.previous_chapter(),
        KeyCode::Char(']') => app.next_chapter(),

        // AI pane tabs and actions
        KeyCode::Char('d') => {
            app.focus = FocusPane::Ai;
            app.select_tab(AiTab::Devotion);
        }
        KeyCode::Char('c') => {
            app.focus = FocusPane::Ai;
            app.select_tab(AiTab::Chat);
        }
        KeyCode::Char('r') => {
            if app.focus == FocusPane::Ai && app.ai.tab == AiTab::Devotion {
                app.refresh_devotion();
            }
        }
        KeyCode::Char('i') => enter_chat_editing(app),

        // In the navigation pane '/' filters the list; elsewhere it opens
        // the chat input.
        KeyCode::Char('/') => {
            if app.focus == FocusPane::Navigation {
                app.input_mode = InputMode::Filtering;
            } else {
                enter_chat_editing(app);
            }
        }

        // Language cycling
        KeyCode::Char('L') => app.cycle_language(),

        _ => {}
    }
}

fn enter_chat_editing(app: &mut App) {
    app.focus = FocusPane::Ai;
    app.select_tab(AiTab::Chat);
    app.input_mode = InputMode::Editing;
    app.chat_cursor = app.chat_input.chars().count();
}

fn handle_filter_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_nav_filter();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.nav_enter();
            // Covers the no-selection case; a successful enter has
            // already dropped the filter.
            app.clear_nav_filter();
        }
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Down => app.nav_down(),
        KeyCode::Up => app.nav_up(),
        KeyCode::Char(c) => app.push_filter_char(c),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send_chat_input();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_to_byte_index_handles_multibyte_text() {
        let s = "한국어 abc";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 3);
        assert_eq!(char_to_byte_index(s, 3), 9);
        assert_eq!(char_to_byte_index(s, 100), s.len());
    }
}
