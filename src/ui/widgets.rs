use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

use crate::app::App;
use crate::models::FormField;
use crate::session::{Phase, COPIED_LABEL, GENERATING_TEXT};

pub fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Promptsmith ",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Generador de prompts estratégicos para pymes",
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("  [{}]", app.model), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

pub fn render_field(frame: &mut Frame, app: &App, field: FormField, area: Rect) {
    let focused = app.focused == field;
    let value = app.form.value(field);

    let (text, text_style) = if value.is_empty() {
        (field.placeholder(), Style::default().fg(Color::DarkGray))
    } else {
        (value, Style::default().fg(Color::White))
    };

    let border_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut title = format!(" {} ", field.label());
    if focused && !field.presets().is_empty() {
        title.push_str("◂▸ ");
    }

    let cursor = Span::styled("▏", Style::default().fg(Color::Cyan));
    let line = if value.is_empty() {
        // Placeholders read from the start and clip at the border
        let mut line = Vec::with_capacity(2);
        if focused {
            line.push(cursor);
        }
        line.push(Span::styled(text, text_style));
        line
    } else {
        // Keep the end of long values (and the cursor) in view
        let inner_width = area.width.saturating_sub(2) as usize;
        let mut line = vec![Span::styled(tail(text, inner_width.saturating_sub(1)), text_style)];
        if focused {
            line.push(cursor);
        }
        line
    };

    let input = Paragraph::new(Line::from(line)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );

    frame.render_widget(input, area);
}

/// Last `width` characters of `text`.
fn tail(text: &str, width: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(width)).collect()
}

pub fn render_submit_button(frame: &mut Frame, app: &App, area: Rect) {
    let (label, style) = if app.session.is_in_progress() {
        (
            GENERATING_TEXT,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        )
    } else {
        (
            "Generar Prompt",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(button, area);
}

pub fn render_output(frame: &mut Frame, app: &mut App, area: Rect, now: Instant) {
    let copy_label = app.session.copy_label(now);
    let copy_style = if copy_label == COPIED_LABEL {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let text_style = match app.session.phase() {
        Phase::Idle => Style::default().fg(Color::DarkGray),
        Phase::Generating if app.session.output() == GENERATING_TEXT => {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
        }
        Phase::Failed => Style::default().fg(Color::Red),
        Phase::Generating | Phase::Completed => Style::default().fg(Color::White),
    };

    let lines: Vec<Line> = app
        .session
        .output()
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), text_style)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Word-wrapped height, so the scroll offset can be clamped to the real bottom
    let inner_width = area.width.saturating_sub(2).max(1);
    let total_visual_lines = paragraph.line_count(inner_width);

    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);
    if app.scroll_offset != actual_scroll {
        app.scroll_offset = actual_scroll;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Prompt generado ")
        .title(
            Line::from(Span::styled(format!(" {copy_label} (Ctrl+Y) "), copy_style))
                .alignment(Alignment::Right),
        )
        .border_style(Style::default().fg(Color::Cyan));

    let output = paragraph
        .block(block)
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(output, area);
}

/// Rows the bordered error box needs at `width`, capped at `max_height`.
/// Zero when there is no error.
pub fn error_height(app: &App, width: u16, max_height: u16) -> u16 {
    let Some(error) = app.session.error() else {
        return 0;
    };

    let inner_width = width.saturating_sub(2).max(1);
    let wrapped = Paragraph::new(error)
        .wrap(Wrap { trim: true })
        .line_count(inner_width);
    let needed = u16::try_from(wrapped).unwrap_or(u16::MAX).saturating_add(2);
    needed.min(max_height)
}

pub fn render_error(frame: &mut Frame, app: &App, area: Rect) {
    let Some(error) = app.session.error() else {
        return;
    };

    let error_box = Paragraph::new(error)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(error_box, area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Pulsa Ctrl+C otra vez para salir, Esc para cancelar",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        (keymap_text(area.width), Style::default().fg(Color::DarkGray))
    };

    let bar = Paragraph::new(text).alignment(Alignment::Center).style(style);

    frame.render_widget(bar, area);
}

const KEYMAP_FULL: &str =
    "Enter: Generar | Tab: Campo | ←/→: Opciones | Ctrl+Y: Copiar | Ctrl+H: Ayuda | Ctrl+C: Salir";
const KEYMAP_SHORT: &str = "Enter Generar · Tab Campo · ^Y Copiar · ^H Ayuda · ^C Salir";

/// Keymap hint that fits in `width` columns; the exit hint is always kept.
fn keymap_text(width: u16) -> &'static str {
    if Line::from(KEYMAP_FULL).width() <= width as usize {
        KEYMAP_FULL
    } else {
        KEYMAP_SHORT
    }
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled(
            "Promptsmith - Atajos de teclado",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Formulario:", bold)),
        Line::from("  Tab / Shift+Tab - Siguiente / anterior campo"),
        Line::from("  ←/→             - Recorrer opciones sugeridas"),
        Line::from("  Enter           - Generar prompt"),
        Line::from(""),
        Line::from(Span::styled("Resultado:", bold)),
        Line::from("  Ctrl+Y          - Copiar al portapapeles"),
        Line::from("  Up/Down         - Desplazar"),
        Line::from("  PgUp/PgDn       - Desplazar página"),
        Line::from("  Home/End        - Inicio / final"),
        Line::from(""),
        Line::from(Span::styled("General:", bold)),
        Line::from("  Ctrl+H          - Mostrar/ocultar ayuda"),
        Line::from("  Ctrl+Q          - Salir"),
        Line::from("  Ctrl+C (x2)     - Salir"),
        Line::from(""),
        Line::from(Span::styled(
            "Ctrl+H o Esc para cerrar",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Ayuda ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 56;
    let popup_height = 21;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}
