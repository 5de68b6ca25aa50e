use chat_widget_core::{MessageStatus, MessageView, WidgetPhase, WidgetViewModel};

/// Prints transcript lines once and a status line on every render.
#[derive(Debug, Default)]
pub(crate) struct Renderer {
    printed: usize,
    last_status: Option<String>,
}

impl Renderer {
    pub(crate) fn render(&mut self, view: &WidgetViewModel) -> Vec<String> {
        let mut lines: Vec<String> = view
            .messages
            .iter()
            .skip(self.printed)
            .map(message_line)
            .collect();
        self.printed = view.messages.len();

        let status = status_line(view);
        if self.last_status.as_ref() != Some(&status) {
            lines.push(status.clone());
            self.last_status = Some(status);
        }
        lines
    }
}

fn message_line(message: &MessageView) -> String {
    let marker = match message.status {
        MessageStatus::Sent => "",
        MessageStatus::Pending => " …",
        MessageStatus::Error => " !",
    };
    format!("[{}{}] {}", message.label, marker, message.content)
}

fn status_line(view: &WidgetViewModel) -> String {
    let phase = match view.phase {
        WidgetPhase::Closed => "closed",
        WidgetPhase::Idle => "open",
        WidgetPhase::Sending => "thinking...",
        WidgetPhase::IdleWithError => "open (error)",
    };
    let mut status = format!("-- {phase}");
    if view.is_loading && view.phase == WidgetPhase::Closed {
        status.push_str(", waiting for reply");
    }
    if let Some(selected) = view.selected_text.as_deref().filter(|_| view.show_context_badge) {
        status.push_str(&format!(
            " | context found: \"{}\"",
            widget_logging::preview(selected, 40)
        ));
    }
    if let Some(error) = view.error.as_deref() {
        status.push_str(&format!(" | {error}"));
    }
    if !view.input_text.is_empty() {
        status.push_str(&format!(" | draft: {} chars", view.input_text.chars().count()));
    }
    status.push_str(" --");
    status
}
