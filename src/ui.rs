use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthChar;

use crate::app::{App, FocusPane, InputMode, NavLevel};
use crate::devotion::{AiTab, ChatRole};
use std::time::Instant;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some((_, c)) = chars.next() {
                if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Wrap text to fit within a given width on word boundaries.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Display column of the cursor within the chat input. CJK characters
/// occupy two terminal columns, so a plain char count lands short.
fn cursor_column(input: &str, cursor: usize) -> u16 {
    input
        .chars()
        .take(cursor)
        .map(|c| c.width().unwrap_or(0))
        .sum::<usize>() as u16
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn loading_dots(frame: u8) -> &'static str {
    match frame % 3 {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [nav_area, content_area, ai_area] = Layout::horizontal([
        Constraint::Length(26),
        Constraint::Percentage(45),
        Constraint::Min(30),
    ])
    .areas(body_area);

    render_navigation(app, frame, nav_area);
    render_verses(app, frame, content_area);
    render_ai_panel(app, frame, ai_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            app.language.title(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.navigation.version_name().to_string(),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            app.language.as_str(),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_navigation(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Navigation;

    let filtered = app.filtered_nav_indices();
    let (title, items): (String, Vec<ListItem>) = match app.nav_level {
        NavLevel::Version => (
            "Versions".to_string(),
            filtered
                .iter()
                .filter_map(|&i| app.navigation.versions().get(i))
                .map(|v| ListItem::new(format!("{} ({})", v.name, v.identifier)))
                .collect(),
        ),
        NavLevel::Book => (
            format!("Books · {}", app.navigation.version_name()),
            filtered
                .iter()
                .filter_map(|&i| app.navigation.books().get(i))
                .map(|b| ListItem::new(b.name.clone()))
                .collect(),
        ),
        NavLevel::Chapter => (
            app.navigation
                .book_name()
                .unwrap_or("Chapters")
                .to_string(),
            filtered
                .iter()
                .filter_map(|&i| app.navigation.chapters().get(i))
                .map(|c| ListItem::new(format!("Chapter {}", c.chapter)))
                .collect(),
        ),
    };

    let filtering = app.input_mode == InputMode::Filtering;
    let title = if filtering || !app.nav_filter.is_empty() {
        format!("{} /{}", title, app.nav_filter)
    } else {
        title
    };

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let state = match app.nav_level {
        NavLevel::Version => &mut app.version_state,
        NavLevel::Book => &mut app.book_state,
        NavLevel::Chapter => &mut app.chapter_state,
    };
    frame.render_stateful_widget(list, area, state);

    if empty {
        let hint = if app.nav_filter.is_empty() {
            "Loading…"
        } else {
            "No matches"
        };
        let hint = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
        let inner = area.inner(ratatui::layout::Margin {
            horizontal: 2,
            vertical: 2,
        });
        frame.render_widget(hint, inner);
    }
}

fn render_verses(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Content;

    let title = match (app.navigation.book_name(), app.navigation.chapter()) {
        (Some(book), chapter) if !chapter.is_empty() => format!("{} {}", book, chapter),
        _ => "Select a chapter".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = app.navigation.verses_error() {
        let message = Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(message, inner);
        return;
    }

    let Some(verses) = app.navigation.verses() else {
        let hint = if app.navigation.is_loading_verses() {
            format!("Loading verses{}", loading_dots(app.animation_frame))
        } else {
            "Select a version, book, and chapter to load verses.".to_string()
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let wrap_width = inner.width.saturating_sub(1).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!(
            "{} ({})",
            verses.translation.name,
            verses.translation.identifier.to_uppercase()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::default());

    if app.navigation.is_loading_verses() {
        lines.push(Line::from(Span::styled(
            format!("Loading next chapter{}", loading_dots(app.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::default());
    }

    for verse in &verses.verses {
        let text = format!("{} {}", verse.verse, verse.text.trim());
        for (i, wrapped) in wrap_text_to_width(&text, wrap_width).into_iter().enumerate() {
            if i == 0 {
                // Verse number leads the first wrapped line
                let number_len = verse.verse.to_string().len();
                let (number, rest) = wrapped.split_at(number_len.min(wrapped.len()));
                lines.push(Line::from(vec![
                    Span::styled(
                        number.to_string(),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(rest.to_string()),
                ]));
            } else {
                lines.push(Line::from(Span::raw(wrapped)));
            }
        }
        lines.push(Line::default());
    }

    app.total_content_lines = lines.len() as u16;
    app.content_height = inner.height;
    let max_scroll = app
        .total_content_lines
        .saturating_sub(app.content_height);
    if app.content_scroll > max_scroll {
        app.content_scroll = max_scroll;
    }

    let paragraph = Paragraph::new(lines).scroll((app.content_scroll, 0));
    frame.render_widget(paragraph, inner);
}

fn render_ai_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Ai;

    let devotion_label = app.language.devotion_tab_label();
    let chat_label = app.language.chat_tab_label();
    let tab_style = |active: bool| {
        if active {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", devotion_label),
            tab_style(app.ai.tab == AiTab::Devotion),
        ),
        Span::raw("|"),
        Span::styled(
            format!(" {} ", chat_label),
            tab_style(app.ai.tab == AiTab::Chat),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !app.ai.is_ready() {
        frame.render_widget(
            Paragraph::new(format!(
                "Warming up the AI service{}",
                loading_dots(app.animation_frame)
            ))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    if app.ai.passage().is_none() {
        frame.render_widget(
            Paragraph::new("Open a chapter to get AI insights for the passage.")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    match app.ai.tab {
        AiTab::Devotion => render_devotion(app, frame, inner),
        AiTab::Chat => render_chat(app, frame, inner),
    }
}

fn render_devotion(app: &mut App, frame: &mut Frame, area: Rect) {
    let wrap_width = area.width.saturating_sub(1).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = app.ai.devotion_error() {
        for wrapped in wrap_text_to_width(error, wrap_width) {
            lines.push(Line::from(Span::styled(
                wrapped,
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::default());
    }

    if app.ai.devotion_loading() {
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", loading_dots(app.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::default());
    }

    if let Some(content) = app.ai.devotion_content() {
        for raw_line in content.lines() {
            if raw_line.trim().is_empty() {
                lines.push(Line::default());
                continue;
            }
            for wrapped in wrap_text_to_width(raw_line, wrap_width) {
                lines.push(parse_markdown_line(&wrapped));
            }
        }
    } else if !app.ai.devotion_loading() && app.ai.devotion_error().is_none() {
        lines.push(Line::from(Span::styled(
            "No devotion yet. Press 'r' to generate one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(remaining) = app.ai.cooldown_remaining(Instant::now()) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Refresh available in {}s", remaining.as_secs().max(1)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let total = lines.len() as u16;
    let max_scroll = total.saturating_sub(area.height);
    if app.ai_scroll > max_scroll {
        app.ai_scroll = max_scroll;
    }

    frame.render_widget(Paragraph::new(lines).scroll((app.ai_scroll, 0)), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let wrap_width = history_area.width.saturating_sub(1).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for message in app.ai.chat_messages() {
        let (label, color) = match message.role {
            ChatRole::User => ("You:", Color::Cyan),
            ChatRole::Assistant => ("AI:", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for raw_line in message.content.lines() {
            for wrapped in wrap_text_to_width(raw_line, wrap_width) {
                lines.push(parse_markdown_line(&wrapped));
            }
        }
        lines.push(Line::default());
    }

    if app.ai.chat_sending() {
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", loading_dots(app.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(error) = app.ai.chat_error() {
        for wrapped in wrap_text_to_width(error, wrap_width) {
            lines.push(Line::from(Span::styled(
                wrapped,
                Style::default().fg(Color::Red),
            )));
        }
    }

    // Keep the tail of the conversation in view
    let total = lines.len() as u16;
    let scroll = total.saturating_sub(history_area.height);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), history_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(editing))
        .title(if editing { "Question (Enter to send)" } else { "Question ('i' to type)" });
    let input_inner = input_block.inner(input_area);
    frame.render_widget(input_block, input_area);
    frame.render_widget(Paragraph::new(app.chat_input.clone()), input_inner);

    if editing {
        let column = cursor_column(&app.chat_input, app.chat_cursor)
            .min(input_inner.width.saturating_sub(1));
        frame.set_cursor_position((input_inner.x + column, input_inner.y));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let keys = match app.input_mode {
        InputMode::Editing => "Esc exit input · Enter send".to_string(),
        InputMode::Filtering => "type to filter · Esc clear · Enter select".to_string(),
        InputMode::Normal => format!(
            "q quit · Tab focus · j/k move · Enter select · / filter · [ {} · ] {} · d/c AI tabs · r refresh · L language",
            app.language.prev_label(),
            app.language.next_label(),
        ),
    };
    frame.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_column_counts_wide_characters() {
        assert_eq!(cursor_column("abc", 0), 0);
        assert_eq!(cursor_column("abc", 2), 2);
        assert_eq!(cursor_column("한국어", 2), 4);
        assert_eq!(cursor_column("한a국", 2), 3);
        // Cursor past the end clamps to the full width.
        assert_eq!(cursor_column("한국어", 10), 6);
    }
}
