use std::time::Duration;

use kuchiki::NodeRef;
use url::Url;

use crate::bridge::{DomTransport, PostedMessage, ThemeBridge};
use crate::components::Components;
use crate::config::SiteConfig;
use crate::dom;
use crate::event_loop::{EventLoop, Task};
use crate::inject;
use crate::links::{self, InternalHosts};
use crate::menu::{MenuState, MobileMenu};
use crate::reading::ReadingToggle;
use crate::storage::PreferenceStore;
use crate::theme::Theme;
use crate::theme_controller::{self, ThemeController};

/// What a click on a registered element does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleTheme,
    ToggleMenu,
    CloseMenu,
    ToggleReading,
}

/// Summary of the page-load sequence.
#[derive(Debug, Clone, Default)]
pub struct PageLoad {
    pub injected: inject::Injected,
    pub active_nav: Option<String>,
    pub outbound_links: usize,
    pub theme: Option<Theme>,
    pub widget: bool,
}

pub struct Page {
    document: NodeRef,
    root: NodeRef,
    location: Url,
    site: SiteConfig,
    store: PreferenceStore,
    event_loop: EventLoop,
    theme: Option<ThemeController>,
    menu: Option<MobileMenu>,
    reading: Option<ReadingToggle>,
    bridge: ThemeBridge<DomTransport>,
    listeners: Vec<(NodeRef, Action)>,
    loaded: bool,
}

impl Page {
    pub fn new(html: &str, location: Url, store: PreferenceStore, site: SiteConfig) -> Self {
        let document = dom::parse_document(html);
        let root = dom::select_first(&document, "html").unwrap_or_else(|| document.clone());
        let transport = DomTransport::new(document.clone(), &site.widget);
        let initial = theme_controller::root_theme(&root).unwrap_or_default();
        let bridge = ThemeBridge::new(transport, &site.widget, initial);
        Self {
            document,
            root,
            location,
            site,
            store,
            event_loop: EventLoop::new(),
            theme: None,
            menu: None,
            reading: None,
            bridge,
            listeners: Vec::new(),
            loaded: false,
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Injects shared components, then wires links, theme, reading mode, menu and the widget bridge.
    pub fn load(&mut self) -> PageLoad {
        if self.loaded {
            tracing::warn!(location = %self.location, "page already loaded");
            return PageLoad::default();
        }
        self.loaded = true;

        let components = Components::render(&self.site);
        let injected = inject::inject_components(&self.document, &components);

        let active_nav = inject::active_nav(self.location.path(), &self.site.nav_rules)
            .map(str::to_string);
        if let Some(id) = &active_nav {
            inject::mark_active_nav(&self.document, id);
        }

        let hosts = InternalHosts::new(&self.location, &self.site);
        let outbound_links = links::normalize_outbound_links(&self.document, &self.location, &hosts);

        self.init_theme();
        self.init_reading();
        self.init_menu();
        self.bridge.start(&mut self.event_loop);

        let report = PageLoad {
            injected,
            active_nav,
            outbound_links,
            theme: self.theme.as_ref().map(|t| t.state().theme),
            widget: self.bridge.is_polling(),
        };
        tracing::info!(
            location = %self.location,
            header = report.injected.header,
            mobile_menu = report.injected.mobile_menu,
            footer = report.injected.footer,
            active_nav = report.active_nav.as_deref().unwrap_or(""),
            outbound_links = report.outbound_links,
            "page loaded"
        );
        report
    }

    fn init_theme(&mut self) {
        let Some(controller) = ThemeController::discover(
            &self.document,
            self.root.clone(),
            self.site.theme_transition(),
        ) else {
            tracing::trace!("no theme toggles on page");
            return;
        };
        let initial = theme_controller::initial_theme(self.store.get(), &self.root);
        for toggle in controller.toggles() {
            self.listeners.push((toggle.clone(), Action::ToggleTheme));
        }
        self.theme = Some(controller);
        self.apply_theme(initial, false);
    }

    fn init_reading(&mut self) {
        let Some(reading) = ReadingToggle::discover(&self.document) else {
            return;
        };
        self.listeners
            .push((reading.button().clone(), Action::ToggleReading));
        self.reading = Some(reading);
    }

    fn init_menu(&mut self) {
        let Some(menu) = MobileMenu::discover(&self.document) else {
            tracing::trace!("no mobile menu on page");
            return;
        };
        self.listeners.push((menu.button().clone(), Action::ToggleMenu));
        self.listeners.push((menu.overlay().clone(), Action::CloseMenu));
        for node in dom::select_all(menu.panel(), ".mobile-menu-close, nav a") {
            self.listeners.push((node, Action::CloseMenu));
        }
        self.menu = Some(menu);
    }

    /// Applies `theme` everywhere it shows: document, toggles, storage and the comment widget.
    pub fn apply_theme(&mut self, theme: Theme, animate: bool) {
        let Some(controller) = self.theme.as_mut() else {
            return;
        };
        controller.apply(theme, animate, &mut self.event_loop);
        self.store.set(theme);
        self.bridge.notify_theme_changed(theme);
    }

    /// Dispatches a click on `target` and its ancestors. Returns how many listeners ran.
    pub fn click(&mut self, target: &NodeRef) -> usize {
        let mut actions = Vec::new();
        for node in target.inclusive_ancestors() {
            for (element, action) in &self.listeners {
                if dom::same_node(element, &node) {
                    actions.push(*action);
                }
            }
        }
        for action in &actions {
            self.dispatch(*action);
        }
        actions.len()
    }

    /// Clicks the first element matching `selector`; `false` when nothing matches.
    pub fn click_selector(&mut self, selector: &str) -> bool {
        match dom::select_first(&self.document, selector) {
            Some(node) => {
                self.click(&node);
                true
            }
            None => false,
        }
    }

    pub fn key_down(&mut self, key: &str) {
        if key == "Escape" {
            if let Some(menu) = self.menu.as_mut() {
                menu.close();
            }
        }
    }

    fn dispatch(&mut self, action: Action) {
        tracing::trace!(?action, "dispatch");
        match action {
            Action::ToggleTheme => {
                if let Some(next) = self.theme.as_ref().map(ThemeController::next_theme) {
                    self.apply_theme(next, true);
                }
            }
            Action::ToggleMenu => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.toggle();
                }
            }
            Action::CloseMenu => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.close();
                }
            }
            Action::ToggleReading => {
                if let Some(reading) = &self.reading {
                    reading.toggle();
                }
            }
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ClearThemeTransition => {
                if let Some(controller) = self.theme.as_mut() {
                    controller.finish_transition();
                }
            }
            Task::WidgetThemeRetry => {
                self.bridge.retry_tick(&mut self.event_loop);
            }
        }
    }

    pub fn now(&self) -> Duration {
        self.event_loop.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.event_loop.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.event_loop.pending()
    }

    /// Moves the clock forward by `by`, running every timer that comes due on the way.
    pub fn advance(&mut self, by: Duration) {
        let until = self.event_loop.now() + by;
        while let Some((_, task)) = self.event_loop.pop_due(until) {
            self.run_task(task);
        }
        self.event_loop.advance_to(until);
    }

    /// Runs timers until none are left. Every timer the page creates is bounded, so this ends.
    pub fn settle(&mut self) -> Duration {
        let start = self.event_loop.now();
        while let Some(deadline) = self.event_loop.next_deadline() {
            let by = deadline.saturating_sub(self.event_loop.now());
            self.advance(by);
        }
        self.event_loop.now() - start
    }

    /// Cancels outstanding timers so the page can be dropped or reloaded without leaks.
    pub fn teardown(&mut self) {
        self.bridge.stop(&mut self.event_loop);
        if let Some(controller) = self.theme.as_mut() {
            controller.finish_transition();
        }
        let cancelled = self.event_loop.cancel_all();
        tracing::debug!(cancelled, "page torn down");
    }

    /// The theme the document currently shows.
    pub fn theme(&self) -> Theme {
        theme_controller::root_theme(&self.root).unwrap_or_default()
    }

    pub fn menu_state(&self) -> Option<MenuState> {
        self.menu.as_ref().map(MobileMenu::state)
    }

    pub fn posted_messages(&self) -> &[PostedMessage] {
        self.bridge.transport().outbox()
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        dom::serialize(&self.document)
    }
}
