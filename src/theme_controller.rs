use std::time::Duration;

use kuchiki::NodeRef;

use crate::components::{THEME_TOGGLE_ATTR, TOGGLE_ICON_CLASS};
use crate::dom;
use crate::event_loop::{EventLoop, Task, TimerId};
use crate::theme::{Theme, ThemeState};

pub const THEME_ATTR: &str = "data-theme";
pub const TRANSITION_ATTR: &str = "data-theme-transitioning";

/// Icon and accessible label for a toggle, naming the theme a click would switch to.
pub fn toggle_label(current: Theme) -> (&'static str, &'static str) {
    match current {
        Theme::Dark => ("☼", "Switch to light mode"),
        Theme::Light => ("☾", "Switch to dark mode"),
    }
}

/// Reads the theme the document root currently shows.
pub fn root_theme(root: &NodeRef) -> Option<Theme> {
    dom::get_attr(root, THEME_ATTR).and_then(|v| v.parse().ok())
}

/// Stored preference first, then the root attribute, then the default.
pub fn initial_theme(stored: Option<Theme>, root: &NodeRef) -> Theme {
    stored.or_else(|| root_theme(root)).unwrap_or_default()
}

/// Owns the theme UI state and is the only writer of the root theme attributes and toggle labels.
pub struct ThemeController {
    root: NodeRef,
    toggles: Vec<NodeRef>,
    state: ThemeState,
    transition: Duration,
    transition_timer: Option<TimerId>,
}

impl ThemeController {
    /// `None` when the page has no toggle controls.
    pub fn discover(document: &NodeRef, root: NodeRef, transition: Duration) -> Option<Self> {
        let toggles = dom::select_all(document, &format!("[{THEME_TOGGLE_ATTR}]"));
        if toggles.is_empty() {
            return None;
        }
        let state = ThemeState {
            theme: root_theme(&root).unwrap_or_default(),
            transitioning: dom::has_attr(&root, TRANSITION_ATTR),
        };
        Some(Self {
            root,
            toggles,
            state,
            transition,
            transition_timer: None,
        })
    }

    pub fn toggles(&self) -> &[NodeRef] {
        &self.toggles
    }

    pub fn state(&self) -> ThemeState {
        self.state
    }

    /// Writes `state` to the document.
    pub fn render(&self, state: ThemeState) {
        match state.theme {
            Theme::Light => dom::set_attr(&self.root, THEME_ATTR, Theme::Light.as_str()),
            Theme::Dark => dom::remove_attr(&self.root, THEME_ATTR),
        };
        if state.transitioning {
            dom::set_attr(&self.root, TRANSITION_ATTR, "");
        } else {
            dom::remove_attr(&self.root, TRANSITION_ATTR);
        }

        let (icon, label) = toggle_label(state.theme);
        for btn in &self.toggles {
            let glyph = dom::select_first(btn, &format!(".{TOGGLE_ICON_CLASS}"))
                .unwrap_or_else(|| btn.clone());
            dom::set_text(&glyph, icon);
            dom::set_attr(btn, "aria-label", label);
        }
    }

    /// Switches to `theme`. An animated switch (re)starts the transition window.
    pub fn apply(&mut self, theme: Theme, animate: bool, event_loop: &mut EventLoop) {
        if let Some(id) = self.transition_timer.take() {
            event_loop.cancel(id);
        }
        self.state = ThemeState {
            theme,
            transitioning: animate,
        };
        self.render(self.state);
        if animate {
            self.transition_timer =
                Some(event_loop.set_timeout(self.transition, Task::ClearThemeTransition));
        }
        tracing::debug!(%theme, animate, "theme applied");
    }

    pub fn finish_transition(&mut self) {
        self.transition_timer = None;
        if !self.state.transitioning {
            return;
        }
        self.state.transitioning = false;
        self.render(self.state);
    }

    /// The theme a toggle click switches to, read from the root like the click handler does.
    pub fn next_theme(&self) -> Theme {
        root_theme(&self.root).unwrap_or_default().toggled()
    }
}
