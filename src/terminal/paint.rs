//! Screen composition.
//!
//! `compose` turns editor state into a flat list of paint instructions;
//! [`super::Terminal::render`] is the only place they meet crossterm.

use crossterm::style::Color;

use crate::editor::{Editor, Mode};
use crate::syntax::Highlight;

/// One drawing instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    HideCursor,
    ShowCursor,
    MoveTo { row: u16, col: u16 },
    Styled { fg: Color, bg: Color, text: String },
    /// Clear from the current position to the end of the row
    ClearLine,
}

/// Build the full frame for the current editor state
pub fn compose(editor: &Editor) -> Vec<Paint> {
    let mut out = vec![Paint::HideCursor];
    compose_rows(editor, &mut out);
    compose_status_bar(editor, &mut out);
    compose_message_bar(editor, &mut out);

    let (row, col) = cursor_position(editor);
    out.push(Paint::MoveTo { row, col });
    out.push(Paint::ShowCursor);
    out
}

fn compose_rows(editor: &Editor, out: &mut Vec<Paint>) {
    let theme = &editor.theme;
    let buffer = editor.buffer();
    let gutter = editor.gutter_width();
    let cols = editor.text_cols();

    for y in 0..editor.text_rows() {
        out.push(Paint::MoveTo { row: y as u16, col: 0 });
        let filerow = editor.view.row_offset + y;

        let Some(line) = buffer.line(filerow) else {
            out.push(Paint::Styled {
                fg: theme.linenum,
                bg: theme.background,
                text: "~".to_string(),
            });
            out.push(Paint::ClearLine);
            continue;
        };

        if gutter > 0 {
            out.push(Paint::Styled {
                fg: theme.linenum,
                bg: theme.linenum_bg,
                text: format!("{:>width$} ", filerow + 1, width = gutter - 1),
            });
        }

        let render = line.render();
        let hl = line.hl();
        let start = editor.view.col_offset.min(render.len());
        let end = (start + cols).min(render.len());

        // Group consecutive columns that share a style into one run
        let mut run: Option<(Color, Color, String)> = None;
        for rx in start..end {
            let ch = render[rx];
            let tag = hl.get(rx).copied().unwrap_or(Highlight::Normal);
            let (fg, bg) = theme.style(tag);
            let (fg, bg, shown) = if ch.is_ascii_control() {
                (bg, fg, control_glyph(ch))
            } else {
                (fg, bg, ch)
            };

            match run.as_mut() {
                Some((rfg, rbg, text)) if *rfg == fg && *rbg == bg => text.push(shown),
                _ => {
                    if let Some((fg, bg, text)) = run.take() {
                        out.push(Paint::Styled { fg, bg, text });
                    }
                    run = Some((fg, bg, shown.to_string()));
                }
            }
        }
        if let Some((fg, bg, text)) = run {
            out.push(Paint::Styled { fg, bg, text });
        }
        out.push(Paint::ClearLine);
    }
}

/// Control characters show as `@`+ch, or `?` past the letters
fn control_glyph(ch: char) -> char {
    let code = ch as u32;
    if code <= 26 {
        char::from_u32('@' as u32 + code).unwrap_or('?')
    } else {
        '?'
    }
}

fn compose_status_bar(editor: &Editor, out: &mut Vec<Paint>) {
    let width = editor.term_width as usize;
    let buffer = editor.buffer();

    let pending = if editor.input_state.is_pending() {
        format!(" [{}]", editor.input_state.pending_display())
    } else {
        String::new()
    };
    let name: String = buffer.display_name().chars().take(20).collect();
    let modified = if buffer.dirty { " (modified)" } else { "" };
    let left = format!(
        " {}{} | {} - {} lines{}",
        editor.mode.as_str(),
        pending,
        name,
        buffer.len_lines(),
        modified
    );

    let filetype = buffer.syntax().map(|p| p.filetype).unwrap_or("no ft");
    let percent = (editor.cursor.cy + 1) * 100 / buffer.len_lines().max(1);
    let right = format!(
        "{} | {},{} {}% ",
        filetype,
        editor.cursor.cy + 1,
        editor.cursor.cx + 1,
        percent
    );

    let mut text = left;
    let used = text.chars().count() + right.chars().count();
    if used <= width {
        text.push_str(&" ".repeat(width - used));
        text.push_str(&right);
    }
    let text: String = text.chars().take(width).collect();

    out.push(Paint::MoveTo {
        row: editor.text_rows() as u16,
        col: 0,
    });
    out.push(Paint::Styled {
        fg: editor.theme.color(Highlight::Normal),
        bg: editor.theme.status,
        text,
    });
}

/// Text of the bottom row: the open prompt, else the status message, else the mode
fn message_text(editor: &Editor) -> String {
    match editor.mode {
        Mode::Command => editor.command_line.display(),
        Mode::Search => search_prompt(editor.search_query().unwrap_or("")),
        _ => match (&editor.status_message, editor.mode) {
            (Some(msg), _) => msg.clone(),
            (None, Mode::Insert) => "-- INSERT --".to_string(),
            (None, Mode::Visual) => "-- VISUAL --".to_string(),
            (None, _) => String::new(),
        },
    }
}

fn search_prompt(query: &str) -> String {
    format!("Search: {}", query)
}

fn compose_message_bar(editor: &Editor, out: &mut Vec<Paint>) {
    let text: String = message_text(editor)
        .chars()
        .take(editor.term_width as usize)
        .collect();
    out.push(Paint::MoveTo {
        row: editor.text_rows() as u16 + 1,
        col: 0,
    });
    if !text.is_empty() {
        out.push(Paint::Styled {
            fg: editor.theme.color(Highlight::Normal),
            bg: editor.theme.background,
            text,
        });
    }
    out.push(Paint::ClearLine);
}

/// Screen row and column of the terminal cursor
fn cursor_position(editor: &Editor) -> (u16, u16) {
    let prompt_row = editor.text_rows() as u16 + 1;
    match editor.mode {
        Mode::Command => (prompt_row, (1 + editor.command_line.cursor) as u16),
        Mode::Search => {
            let prompt = search_prompt(editor.search_query().unwrap_or(""));
            (prompt_row, prompt.chars().count() as u16)
        }
        _ => {
            let row = editor.cursor.cy.saturating_sub(editor.view.row_offset);
            let col = editor.gutter_width() + editor.cursor_rx().saturating_sub(editor.view.col_offset);
            (row as u16, col as u16)
        }
    }
}
