#[allow(unused)]
use {
    super::centered_rect,
    crate::{app::App, error::SPError},
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::{Alignment, Constraint, Layout, Rect},
        prelude::{Color, Direction},
        style::Stylize,
        widgets::{Block, Borders, Clear, Paragraph, Widget},
    },
};

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let pop_area = centered_rect(60, 25, area);

    let popup_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3)])
        .split(pop_area);

    Clear.render(popup_chunks[0], buf);
    Paragraph::new(format!("Close the {} panel? (y/n)", app.panel().title()))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" EXIT ")
                .borders(Borders::ALL)
                .bg(Color::DarkGray),
        )
        .render(popup_chunks[0], buf);

    Ok(())
}
