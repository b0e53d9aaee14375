use crate::events::AppEvent;
use crate::models::{FormField, FormInput};
use crate::session::GenerationSession;

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub form: FormInput,
    pub focused: FormField,
    pub session: GenerationSession,
    pub scroll_offset: usize,
    pub show_help: bool,
    pub exit_pending: bool,
    pub model: String,
}

impl App {
    pub fn new(model: String) -> Self {
        Self {
            should_quit: false,
            form: FormInput::default(),
            focused: FormField::AreaDeNegocio,
            session: GenerationSession::new(),
            scroll_offset: 0,
            show_help: false,
            exit_pending: false,
            model,
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_previous(&mut self) {
        self.focused = self.focused.previous();
    }

    pub fn type_char(&mut self, c: char) {
        self.form.value_mut(self.focused).push(c);
    }

    pub fn backspace(&mut self) {
        self.form.value_mut(self.focused).pop();
    }

    pub fn cycle_preset(&mut self, forward: bool) {
        self.form.cycle_preset(self.focused, forward);
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub const fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped to the real bottom at render time
        self.scroll_offset = usize::MAX;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::StreamOpened => {
                self.session.stream_opened();
                self.scroll_to_top();
            }
            AppEvent::Fragment(text) => {
                self.session.append_fragment(&text);
                self.scroll_to_bottom();
            }
            AppEvent::Completed => self.session.complete(),
            AppEvent::Failed(message) => {
                self.session.fail(&message);
                self.scroll_to_top();
            }
        }
    }
}
