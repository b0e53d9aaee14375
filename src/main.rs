mod api;
mod app;
mod clipboard;
mod config;
mod controller;
mod events;
mod models;
mod prompt;
mod session;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use api::{GeminiClient, GenerationService};
use app::App;
use clipboard::{ArboardClipboard, ClipboardWriter};
use events::AppEvent;
use models::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = config::load_config().unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load config, using defaults");
        config::apply_env_overrides(AppConfig::default(), |key| std::env::var(key).ok())
    });

    let api_key = config::api_key();
    if api_key.is_none() {
        warn!("GEMINI_API_KEY environment variable not set");
    }

    let service: Arc<dyn GenerationService> = Arc::new(
        GeminiClient::from_config(&config, api_key).context("Failed to create Gemini client")?,
    );
    info!(model = %config.model, base_url = %config.api_base_url, "promptsmith starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.model.clone());
    let mut clipboard = ArboardClipboard::new();

    // Generation tasks report back over this channel
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let res = run_app(&mut terminal, &mut app, &service, &mut clipboard, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file next to the config; stdout belongs to the terminal UI.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = config::get_log_path().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))
    });

    let writer = match log_file {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(io::sink),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyEvent,
    service: &Arc<dyn GenerationService>,
    clipboard: &mut dyn ClipboardWriter,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return;
        }
        KeyCode::Esc => {
            if app.show_help {
                app.show_help = false;
            } else if app.exit_pending {
                app.exit_pending = false;
            }
            return;
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit
            app.exit_pending = false;
        }
        _ => {}
    }

    // The help window swallows everything but its own toggle
    if app.show_help {
        if key.code == KeyCode::Char('h') && ctrl {
            app.toggle_help();
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') if ctrl => app.quit(),
        KeyCode::Char('h') if ctrl => app.toggle_help(),
        KeyCode::Char('y') if ctrl => {
            controller::copy_output(app, clipboard, Instant::now());
        }

        KeyCode::Enter => {
            let _ = controller::submit(app, service, event_tx);
        }

        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_previous(),
        KeyCode::Left => app.cycle_preset(false),
        KeyCode::Right => app.cycle_preset(true),

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) if !ctrl => app.type_char(c),

        _ => {}
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    service: &Arc<dyn GenerationService>,
    clipboard: &mut dyn ClipboardWriter,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Apply everything the generation task sent since the last frame
        while let Ok(app_event) = event_rx.try_recv() {
            app.handle_event(app_event);
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_keyboard_input(app, key, service, clipboard, event_tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FragmentStream, MockGenerationService};
    use crate::clipboard::MockClipboardWriter;
    use crate::models::FormField;
    use crate::session::{Phase, COPIED_LABEL};
    use futures::stream;

    fn press(
        app: &mut App,
        code: KeyCode,
        modifiers: KeyModifiers,
        service: &Arc<dyn GenerationService>,
        clipboard: &mut dyn ClipboardWriter,
        tx: &mpsc::UnboundedSender<AppEvent>,
    ) {
        handle_keyboard_input(app, KeyEvent::new(code, modifiers), service, clipboard, tx);
    }

    fn idle_service() -> Arc<dyn GenerationService> {
        let mut service = MockGenerationService::new();
        service.expect_generate_stream().times(0);
        Arc::new(service)
    }

    #[tokio::test]
    async fn test_enter_submits_the_form() {
        let mut service = MockGenerationService::new();
        service
            .expect_generate_stream()
            .times(1)
            .returning(|_| {
                let empty: FragmentStream = Box::pin(stream::empty());
                Ok(empty)
            });
        let service: Arc<dyn GenerationService> = Arc::new(service);
        let mut clipboard = MockClipboardWriter::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut app = App::new("gemini-2.5-flash".to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE, &service, &mut clipboard, &tx);
        assert!(app.session.is_in_progress());

        // A second Enter while busy does not start another request
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE, &service, &mut clipboard, &tx);

        while let Some(event) = rx.recv().await {
            let done = matches!(event, AppEvent::Completed | AppEvent::Failed(_));
            app.handle_event(event);
            if done {
                break;
            }
        }
        assert_eq!(app.session.phase(), Phase::Completed);
    }

    #[test]
    fn test_ctrl_y_copies_output() {
        let service = idle_service();
        let mut clipboard = MockClipboardWriter::new();
        clipboard
            .expect_write_text()
            .withf(|text: &str| text == "Actúa como consultor.")
            .times(1)
            .returning(|_| Ok(()));
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut app = App::new("gemini-2.5-flash".to_string());
        app.session.begin();
        app.session.stream_opened();
        app.session.append_fragment("Actúa como consultor.");
        app.session.complete();

        press(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);
        assert_eq!(app.session.copy_label(Instant::now()), COPIED_LABEL);
        assert!(app.form.value(FormField::AreaDeNegocio).is_empty());
    }

    #[test]
    fn test_help_window_swallows_keys() {
        let service = idle_service();
        let mut clipboard = MockClipboardWriter::new();
        clipboard.expect_write_text().times(0);
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut app = App::new("gemini-2.5-flash".to_string());
        press(&mut app, KeyCode::Char('h'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE, &service, &mut clipboard, &tx);
        press(&mut app, KeyCode::Tab, KeyModifiers::NONE, &service, &mut clipboard, &tx);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE, &service, &mut clipboard, &tx);
        press(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);

        assert!(app.show_help);
        assert!(app.form.value(FormField::AreaDeNegocio).is_empty());
        assert_eq!(app.focused, FormField::AreaDeNegocio);
        assert_eq!(app.session.phase(), Phase::Idle);

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE, &service, &mut clipboard, &tx);
        assert!(!app.show_help);

        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE, &service, &mut clipboard, &tx);
        assert_eq!(app.form.value(FormField::AreaDeNegocio), "x");
    }

    #[test]
    fn test_ctrl_c_twice_quits() {
        let service = idle_service();
        let mut clipboard = MockClipboardWriter::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut app = App::new("gemini-2.5-flash".to_string());
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);
        assert!(app.exit_pending);
        assert!(!app.should_quit);

        // Any other key cancels the pending exit
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE, &service, &mut clipboard, &tx);
        assert!(!app.exit_pending);

        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &service, &mut clipboard, &tx);
        assert!(app.should_quit);
    }
}
