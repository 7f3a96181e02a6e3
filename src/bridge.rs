use kuchiki::NodeRef;
use serde::Serialize;

use crate::config::WidgetConfig;
use crate::dom;
use crate::event_loop::{EventLoop, PollStatus, PollingTask, Task};
use crate::theme::Theme;

/// Light maps to the high-contrast palette; the widget's plain light theme washes out metadata text.
pub fn widget_theme(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "dark",
        Theme::Light => "light_high_contrast",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetMessage {
    pub giscus: GiscusCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiscusCommand {
    #[serde(rename = "setConfig")]
    pub set_config: SetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetConfig {
    pub theme: String,
}

impl WidgetMessage {
    pub fn set_theme(theme: &str) -> Self {
        Self {
            giscus: GiscusCommand {
                set_config: SetConfig {
                    theme: theme.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target_origin: String,
    pub payload: serde_json::Value,
}

/// How the bridge reaches the widget: its loader script and, once rendered, its frame.
pub trait WidgetTransport {
    fn script_present(&self) -> bool;
    fn frame_present(&self) -> bool;
    fn configured_theme(&self) -> Option<String>;
    fn configure(&mut self, theme: &str);
    fn post(&mut self, message: &WidgetMessage, target_origin: &str);
}

/// Transport over the page document. Messages posted to the frame land in an outbox.
#[derive(Debug)]
pub struct DomTransport {
    document: NodeRef,
    script_selector: String,
    frame_selector: String,
    outbox: Vec<PostedMessage>,
}

impl DomTransport {
    pub fn new(document: NodeRef, widget: &WidgetConfig) -> Self {
        Self {
            document,
            script_selector: format!("script[src=\"{}\"]", widget.script_src),
            frame_selector: widget.frame_selector.clone(),
            outbox: Vec::new(),
        }
    }

    pub fn outbox(&self) -> &[PostedMessage] {
        &self.outbox
    }

    fn script(&self) -> Option<NodeRef> {
        dom::select_first(&self.document, &self.script_selector)
    }
}

impl WidgetTransport for DomTransport {
    fn script_present(&self) -> bool {
        self.script().is_some()
    }

    fn frame_present(&self) -> bool {
        dom::select_first(&self.document, &self.frame_selector).is_some()
    }

    fn configured_theme(&self) -> Option<String> {
        dom::get_attr(&self.script()?, "data-theme")
    }

    fn configure(&mut self, theme: &str) {
        if let Some(script) = self.script() {
            dom::set_attr(&script, "data-theme", theme);
        }
    }

    fn post(&mut self, message: &WidgetMessage, target_origin: &str) {
        match serde_json::to_value(message) {
            Ok(payload) => self.outbox.push(PostedMessage {
                target_origin: target_origin.to_string(),
                payload,
            }),
            Err(e) => tracing::warn!(error = %e, "widget message not serializable"),
        }
    }
}

pub struct ThemeBridge<T> {
    transport: T,
    origin: String,
    theme: Theme,
    poll: PollingTask,
}

impl<T: WidgetTransport> ThemeBridge<T> {
    pub fn new(transport: T, widget: &WidgetConfig, theme: Theme) -> Self {
        Self {
            transport,
            origin: widget.origin.clone(),
            theme,
            poll: PollingTask::new(widget.retry_interval(), widget.max_attempts),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notify_theme_changed(&mut self, theme: Theme) {
        self.theme = theme;
        self.resync();
    }

    /// Pushes the current theme to the widget. Returns `false` when there is no widget on the page.
    pub fn resync(&mut self) -> bool {
        if !self.transport.script_present() {
            return false;
        }

        let theme = widget_theme(self.theme);
        if self.transport.configured_theme().as_deref() != Some(theme) {
            self.transport.configure(theme);
        }

        // A rendered frame ignores later attribute changes; it has to be told directly.
        if self.transport.frame_present() {
            self.transport
                .post(&WidgetMessage::set_theme(theme), &self.origin);
        }
        true
    }

    /// Syncs now, then keeps polling until the frame appears.
    pub fn start(&mut self, event_loop: &mut EventLoop) {
        if !self.resync() {
            tracing::trace!("no comment widget on page");
            return;
        }
        self.poll.start(event_loop, Task::WidgetThemeRetry);
    }

    pub fn retry_tick(&mut self, event_loop: &mut EventLoop) -> PollStatus {
        self.resync();
        let status = self
            .poll
            .record_attempt(event_loop, self.transport.frame_present());
        match status {
            PollStatus::Pending => {}
            PollStatus::Satisfied => {
                tracing::debug!(attempts = self.poll.attempts(), "comment widget frame synced")
            }
            PollStatus::Exhausted => {
                tracing::debug!(attempts = self.poll.attempts(), "comment widget frame never appeared")
            }
        }
        status
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_running()
    }

    pub fn stop(&mut self, event_loop: &mut EventLoop) {
        self.poll.cancel(event_loop);
    }
}
