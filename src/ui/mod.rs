pub mod widgets;

use crate::app::App;
use crate::models::FormField;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use std::time::Instant;

/// Height of one bordered single-line field.
const FIELD_HEIGHT: u16 = 3;

pub fn render(frame: &mut Frame, app: &mut App) {
    let now = Instant::now();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(0),    // Form and output
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let mut form_constraints: Vec<Constraint> = FormField::ALL
        .iter()
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    form_constraints.push(Constraint::Length(FIELD_HEIGHT)); // Submit button
    form_constraints.push(Constraint::Min(0));

    let form_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(form_constraints)
        .split(columns[0]);

    // The error box grows with its message but leaves the output pane at least half
    let error_height = widgets::error_height(app, columns[1].width, columns[1].height / 2);
    let output_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(error_height)])
        .split(columns[1]);

    widgets::render_title(frame, app, rows[0]);
    for (field, area) in FormField::ALL.iter().zip(form_rows.iter()) {
        widgets::render_field(frame, app, *field, *area);
    }
    widgets::render_submit_button(frame, app, form_rows[FormField::ALL.len()]);
    widgets::render_output(frame, app, output_rows[0], now);
    widgets::render_error(frame, app, output_rows[1]);
    widgets::render_bottom_bar(frame, app, rows[2]);

    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AppEvent;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App) -> String {
        screen_sized(app, 120, 32)
    }

    fn screen_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_idle_form() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        let text = screen(&mut app);

        assert!(text.contains("Área de negocio"));
        assert!(text.contains("Técnica de prompting"));
        assert!(text.contains("Generar Prompt"));
        assert!(text.contains("Copiar"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_render_generating_disables_button() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        let text = screen(&mut app);
        assert!(text.contains("Generando..."));
        assert!(!text.contains("Generar Prompt"));
    }

    #[test]
    fn test_render_shows_error_region() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        app.handle_event(AppEvent::Failed("quota exceeded".to_string()));
        let text = screen(&mut app);

        assert!(text.contains("Error: quota exceeded"));
        assert!(text.contains("Hubo un error al generar el prompt."));
    }

    #[test]
    fn test_render_help_popup() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.toggle_help();
        let text = screen(&mut app);
        assert!(text.contains("Atajos de teclado"));
    }

    #[test]
    fn test_render_clamps_scroll_offset() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        app.handle_event(AppEvent::StreamOpened);
        app.handle_event(AppEvent::Fragment("línea\n".repeat(200)));
        assert_eq!(app.scroll_offset, usize::MAX);

        screen(&mut app);
        assert!(app.scroll_offset < 200);
        assert!(app.scroll_offset > 0);
    }

    #[test]
    fn test_render_scroll_to_bottom_reaches_end_of_wrapped_output() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        app.handle_event(AppEvent::StreamOpened);

        let mut output: String = (0..120)
            .map(|n| format!("palabra{n} estratégica "))
            .collect();
        output.push_str("FINALMARK");
        app.handle_event(AppEvent::Fragment(output));
        app.handle_event(AppEvent::Completed);
        app.scroll_to_bottom();

        let text = screen_sized(&mut app, 80, 24);
        assert!(text.contains("FINALMARK"));
    }

    #[test]
    fn test_render_long_error_is_not_cut_off() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        app.handle_event(AppEvent::Failed(
            "request failed with status 400 Bad Request: API key not valid. Please pass a valid API key."
                .to_string(),
        ));

        let text = screen_sized(&mut app, 80, 24);
        assert!(text.contains("Error: request failed"));
        assert!(text.contains("valid API key."));
        assert!(text.contains("Hubo un error al generar el prompt."));
    }

    #[test]
    fn test_render_placeholder_shows_its_start() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        let text = screen_sized(&mut app, 80, 24);

        // Unfocused and focused empty fields both start at the beginning of the hint
        assert!(text.contains("Describe el reto"));
        assert!(text.contains("Ej: Ventas"));
    }

    #[test]
    fn test_render_keymap_bar_fits_narrow_terminal() {
        let mut app = App::new("gemini-2.5-flash".to_string());
        let text = screen_sized(&mut app, 80, 24);
        let bar = text.lines().last().unwrap_or_default();

        assert!(bar.contains("Generar"));
        assert!(bar.contains("Salir"));
    }
}
