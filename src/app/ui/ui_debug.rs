#[allow(unused)]
use {
    super::normal_block,
    crate::{app::App, error::SPError},
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::Rect,
        prelude::{Color, Style},
        text::Text,
        widgets::{Paragraph, Widget, Wrap},
    },
};

/// Reply of the last debug or diagnostics request.
pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let text = app.debug_text().unwrap_or("Waiting for reply...");
    let color = if text.ends_with("FAILED") {
        Color::Red
    } else {
        Color::White
    };

    Paragraph::new(Text::styled(text, Style::default().fg(color)))
        .wrap(Wrap { trim: false })
        .block(normal_block(" DEBUG "))
        .render(area, buf);

    Ok(())
}
