#[allow(unused)]
use {
    crate::{app::App, error::SPError},
    chrono::Local,
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::{Alignment, Constraint, Layout, Rect},
        prelude::{Color, Direction, Style},
        style::Stylize,
        text::{Line, Span, Text},
        widgets::{Block, Borders, Paragraph, Widget},
    },
};

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(10)])
        .split(area);

    Paragraph::new(Text::styled(
        format!("{} | Virtual Substation v{VERSION}", app.panel().title()),
        Style::default().fg(Color::White).bold(),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::empty()))
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        Local::now().format("%H:%M:%S").to_string(),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Right)
    .render(chunks[1], buf);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::ui::buffer_text,
        link::LinkCtrl,
        panel::{PanelKind, Services},
    };

    #[test]
    fn test_draw_renders_title_ok() {
        let (link, _tx, _cmd_rx) = LinkCtrl::detached();
        let app = App::with_link(PanelKind::Relay, Services::new("localhost").unwrap(), link);
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        assert!(draw(area, &mut buf, &app).is_ok());
        assert!(buffer_text(&buf).contains("Virtual Substation"));
    }
}
