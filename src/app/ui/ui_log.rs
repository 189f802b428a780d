#[allow(unused)]
use {
    super::normal_block,
    crate::{
        alarm::{EventLog, LogLine},
        error::SPError,
    },
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::Rect,
        prelude::{Color, Style},
        text::{Line, Span},
        widgets::{Paragraph, Widget},
    },
};

fn line_color(text: &str) -> Color {
    if text.contains("FAILED") || text.contains("TRIP") || text.starts_with("ALARM") {
        Color::Red
    } else if text.starts_with("EVENT") || text.starts_with("GOOSE") {
        Color::Yellow
    } else {
        Color::White
    }
}

fn render_line(line: &LogLine) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            format!("[{}] ", line.timestamp().format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(line.text(), Style::default().fg(line_color(line.text()))),
    ])
}

/// Tail of the event log, newest line at the bottom.
pub fn draw(area: Rect, buf: &mut Buffer, log: &EventLog, title: &str) -> Result<(), SPError> {
    let lines: Vec<Line> = if log.is_empty() {
        vec![Line::from(Span::styled(
            "No events",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = log.len().saturating_sub(visible);
        log.lines().skip(skip).map(render_line).collect()
    };

    Paragraph::new(lines)
        .block(normal_block(title))
        .render(area, buf);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ui::buffer_text;

    #[test]
    fn test_log_shows_tail() {
        let mut log = EventLog::new();
        for i in 0..20 {
            log.push(format!("entry {i:02}"));
        }

        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        draw(area, &mut buf, &log, " EVENT LOG ").unwrap();
        let text = buffer_text(&buf);
        assert!(text.contains("entry 19"));
        assert!(text.contains("entry 16"));
        assert!(!text.contains("entry 15"));
        assert!(text.contains("EVENT LOG"));
    }

    #[test]
    fn test_empty_log() {
        let log = EventLog::new();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        draw(area, &mut buf, &log, " EVENT LOG ").unwrap();
        assert!(buffer_text(&buf).contains("No events"));
    }

    #[test]
    fn test_line_colors() {
        assert_eq!(line_color("TRIP FAILED: HTTP 500"), Color::Red);
        assert_eq!(line_color("GOOSE MSG: StNum=1"), Color::Yellow);
        assert_eq!(line_color("All alarms acknowledged"), Color::White);
    }
}
