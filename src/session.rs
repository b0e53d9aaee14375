// Generation session state

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PLACEHOLDER_TEXT: &str = "El prompt generado aparecerá aquí. Completa el formulario y haz clic en \"Generar Prompt\" para comenzar.";
pub const GENERATING_TEXT: &str = "Generando...";
pub const FAILURE_TEXT: &str = "Hubo un error al generar el prompt.";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

pub const COPY_LABEL: &str = "Copiar";
pub const COPIED_LABEL: &str = "¡Copiado!";
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Completed,
    Failed,
}

/// State of the current (or last) submission.
///
/// `Generating` doubles as the in-progress flag that disables the submit
/// control; every other phase accepts a new submission.
#[derive(Debug)]
pub struct GenerationSession {
    id: Option<Uuid>,
    phase: Phase,
    output: String,
    error: Option<String>,
    copied_until: Option<Instant>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self {
            id: None,
            phase: Phase::Idle,
            output: PLACEHOLDER_TEXT.to_string(),
            error: None,
            copied_until: None,
        }
    }

    pub const fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::Generating
    }

    /// Text currently shown in the output region.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a new submission. Returns `false` while one is already running.
    pub fn begin(&mut self) -> bool {
        if self.is_in_progress() {
            debug!("submission ignored, generation already in progress");
            return false;
        }

        let id = Uuid::new_v4();
        self.id = Some(id);
        self.phase = Phase::Generating;
        self.error = None;
        self.output = GENERATING_TEXT.to_string();
        info!(session = %id, "generation started");
        true
    }

    /// The service accepted the request; fragments will follow.
    pub fn stream_opened(&mut self) {
        if self.is_in_progress() {
            self.output.clear();
        }
    }

    pub fn append_fragment(&mut self, text: &str) {
        if self.is_in_progress() {
            self.output.push_str(text);
        }
    }

    pub fn complete(&mut self) {
        if !self.is_in_progress() {
            return;
        }
        self.phase = Phase::Completed;
        info!(session = ?self.id, chars = self.output.chars().count(), "generation completed");
    }

    pub fn fail(&mut self, message: &str) {
        if !self.is_in_progress() {
            return;
        }
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR
        } else {
            message
        };
        warn!(session = ?self.id, error = %message, "generation failed");

        self.phase = Phase::Failed;
        self.error = Some(format!("Error: {message}"));
        self.output = FAILURE_TEXT.to_string();
    }

    /// Whether the displayed output is worth copying.
    pub fn has_copyable_output(&self) -> bool {
        !self.output.is_empty() && self.output != PLACEHOLDER_TEXT
    }

    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_until = Some(now + COPY_FEEDBACK);
    }

    /// Label of the copy affordance at `now`.
    pub fn copy_label(&self, now: Instant) -> &'static str {
        match self.copied_until {
            Some(until) if now < until => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}
