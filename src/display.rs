//! Display rendering
//!
//! Draws the buffer with its live language decorations, a mode line and a
//! message line. Replaced spans show their widget content in place of the
//! markup, so screen columns and buffer offsets diverge on decorated lines.

use std::ops::Range;

use praecordi::buffer::Buffer;
use praecordi::decoration::{Decoration, RenderAs};
use praecordi::line::Line;
use praecordi::{HostEditor, Result, Settings};

use crate::editor::Session;
use crate::style::{Color, Style};
use crate::terminal::Terminal;

/// A run of screen text drawn with one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Text as drawn
    pub text: String,
    pub style: Style,
    /// Line-local character range the segment stands for
    pub source: Range<usize>,
    /// Whether `text` differs from the source characters
    pub replaced: bool,
}

/// Split a line into styled segments.
///
/// `line_start` is the document offset of the line's first character.
/// Decorations that do not fit entirely inside the line are ignored.
pub fn layout_line(line: &Line, line_start: usize, decorations: &[Decoration]) -> Vec<Segment> {
    let line_end = line_start + line.len();
    let mut segments = Vec::new();
    let mut pos = 0;

    for decoration in decorations {
        let range = &decoration.range;
        if range.start < line_start + pos || range.end > line_end {
            continue;
        }
        let start = range.start - line_start;
        let end = range.end - line_start;

        if start > pos {
            segments.push(plain(line, pos..start));
        }
        let style = Style::for_decoration(&decoration.render_as);
        let segment = match &decoration.render_as {
            RenderAs::Replace(widget) => Segment {
                text: widget.content.clone(),
                style,
                source: start..end,
                replaced: true,
            },
            RenderAs::Mark { .. } => Segment {
                style,
                ..plain(line, start..end)
            },
        };
        segments.push(segment);
        pos = end;
    }

    if pos < line.len() {
        segments.push(plain(line, pos..line.len()));
    }
    segments
}

fn plain(line: &Line, source: Range<usize>) -> Segment {
    Segment {
        text: line.slice(source.start, source.end).to_string(),
        style: Style::default(),
        source,
        replaced: false,
    }
}

/// Screen column of a line-local character offset.
///
/// An offset strictly inside a replaced segment maps to the segment's first
/// column; the widget has no inner positions.
pub fn cursor_column(segments: &[Segment], ch: usize) -> usize {
    let mut col = 0;
    for segment in segments {
        if ch <= segment.source.start {
            return col;
        }
        if ch < segment.source.end {
            if segment.replaced {
                return col;
            }
            let prefix: String = segment.text.chars().take(ch - segment.source.start).collect();
            return col + str_width(&prefix);
        }
        col += str_width(&segment.text);
    }
    col
}

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// First buffer line shown
    top_line: usize,
}

impl Display {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            top_line: 0,
        }
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Render the editor display
    pub fn render(&mut self, terminal: &mut Terminal, session: &Session) -> Result<()> {
        let cols = terminal.cols() as usize;
        let rows = terminal.rows() as usize;
        // Text area, then mode line, then message line
        let height = rows.saturating_sub(2).max(1);
        let buffer = session.buffer();
        let cursor = buffer.cursor();

        self.scroll_to(cursor.line, height);

        terminal.set_cursor_visible(false)?;
        if self.needs_redraw {
            terminal.clear_screen()?;
        }

        let decorations = session.decorations();
        let mut line_start = buffer.line_start_offset(self.top_line);
        let mut cursor_col = 0;
        for row in 0..height {
            let line_idx = self.top_line + row;
            terminal.move_cursor(row as u16, 0)?;

            match buffer.line(line_idx) {
                Some(line) => {
                    let segments = layout_line(line, line_start, decorations);
                    write_segments(terminal, &segments, cols)?;
                    if line_idx == cursor.line {
                        cursor_col = cursor_column(&segments, cursor.ch);
                    }
                    line_start += line.len() + 1;
                }
                None => {
                    terminal.apply_style(&Style::fg(Color::BrightBlack))?;
                    terminal.write_str("~")?;
                    terminal.reset_attributes()?;
                }
            }
            terminal.clear_to_eol()?;
        }

        self.render_mode_line(terminal, buffer, session.settings(), height as u16, cols)?;
        self.render_minibuffer(terminal, session.message(), (height + 1) as u16, cols)?;

        let screen_row = (cursor.line - self.top_line) as u16;
        let screen_col = cursor_col.min(cols.saturating_sub(1)) as u16;
        terminal.move_cursor(screen_row, screen_col)?;
        terminal.set_cursor_visible(true)?;
        terminal.flush()?;

        self.needs_redraw = false;
        Ok(())
    }

    /// Keep `line` inside a window of `height` rows
    fn scroll_to(&mut self, line: usize, height: usize) {
        if line < self.top_line {
            self.top_line = line;
            self.needs_redraw = true;
        } else if line >= self.top_line + height {
            self.top_line = line + 1 - height;
            self.needs_redraw = true;
        }
    }

    /// Render the mode line
    fn render_mode_line(
        &self,
        terminal: &mut Terminal,
        buffer: &Buffer,
        settings: &Settings,
        row: u16,
        cols: usize,
    ) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        terminal.apply_style(&Style::reverse())?;

        let mode_line = mode_line_text(buffer, settings);
        let padded = if str_width(&mode_line) < cols {
            format!("{}{}", mode_line, "-".repeat(cols - str_width(&mode_line)))
        } else {
            truncate_to_width(&mode_line, cols)
        };

        terminal.write_str(&padded)?;
        terminal.reset_attributes()?;
        Ok(())
    }

    /// Render the minibuffer (message area)
    fn render_minibuffer(
        &self,
        terminal: &mut Terminal,
        message: Option<&str>,
        row: u16,
        cols: usize,
    ) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        if let Some(msg) = message {
            terminal.write_str(&truncate_to_width(msg, cols))?;
        }
        terminal.clear_to_eol()?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode line content: modified flag, name, file, line and plugin state
fn mode_line_text(buffer: &Buffer, settings: &Settings) -> String {
    let modified = if buffer.is_modified() { "**" } else { "--" };
    let filename = buffer
        .filename()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "no file".to_string());
    let language = if settings.default_language.is_empty() {
        "-"
    } else {
        settings.default_language.as_str()
    };

    format!(
        "{}- praecordi: {} ({}) L{} [tokens:{}] [lang:{}] [{}] ",
        modified,
        buffer.name(),
        filename,
        buffer.cursor().line + 1,
        if settings.enable_token_replace { "on" } else { "off" },
        language,
        settings.decoration_style.name(),
    )
}

fn write_segments(terminal: &mut Terminal, segments: &[Segment], max_cols: usize) -> Result<()> {
    let mut remaining = max_cols;
    for segment in segments {
        if remaining == 0 {
            break;
        }
        let text = truncate_to_width(&segment.text, remaining);
        remaining -= str_width(&text);
        if segment.style.is_default() {
            terminal.write_str(&text)?;
        } else {
            terminal.apply_style(&segment.style)?;
            terminal.write_str(&text)?;
            terminal.reset_attributes()?;
        }
    }
    Ok(())
}

fn str_width(s: &str) -> usize {
    s.chars()
        .map(|ch| unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1))
        .sum()
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}
