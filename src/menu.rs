use kuchiki::NodeRef;

use crate::dom;

pub const MENU_ID: &str = "mobileMenu";
pub const OVERLAY_ID: &str = "mobileMenuOverlay";
pub const BUTTON_SELECTOR: &str = ".mobile-menu-button";
const ACTIVE: &str = "active";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Slide-in navigation panel plus its overlay. Locks page scroll while open.
pub struct MobileMenu {
    menu: NodeRef,
    overlay: NodeRef,
    button: NodeRef,
    body: Option<NodeRef>,
    state: MenuState,
    saved_overflow: Option<String>,
}

impl MobileMenu {
    /// `None` unless the panel, overlay and trigger button are all present.
    pub fn discover(document: &NodeRef) -> Option<Self> {
        let menu = dom::get_element_by_id(document, MENU_ID)?;
        let overlay = dom::get_element_by_id(document, OVERLAY_ID)?;
        let button = dom::select_first(document, BUTTON_SELECTOR)?;
        Some(Self {
            menu,
            overlay,
            button,
            body: dom::select_first(document, "body"),
            state: MenuState::Closed,
            saved_overflow: None,
        })
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn button(&self) -> &NodeRef {
        &self.button
    }

    pub fn overlay(&self) -> &NodeRef {
        &self.overlay
    }

    pub fn panel(&self) -> &NodeRef {
        &self.menu
    }

    pub fn toggle(&mut self) {
        match self.state {
            MenuState::Open => self.close(),
            MenuState::Closed => self.open(),
        }
    }

    pub fn open(&mut self) {
        if self.state == MenuState::Open {
            return;
        }
        dom::add_class(&self.menu, ACTIVE);
        dom::add_class(&self.overlay, ACTIVE);
        dom::set_attr(&self.button, "aria-expanded", "true");
        if let Some(body) = &self.body {
            self.saved_overflow = dom::style_property(body, "overflow");
            dom::set_style_property(body, "overflow", Some("hidden"));
        }
        self.state = MenuState::Open;
        tracing::debug!("mobile menu opened");
    }

    pub fn close(&mut self) {
        if self.state == MenuState::Closed {
            return;
        }
        dom::remove_class(&self.menu, ACTIVE);
        dom::remove_class(&self.overlay, ACTIVE);
        dom::set_attr(&self.button, "aria-expanded", "false");
        if let Some(body) = &self.body {
            dom::set_style_property(body, "overflow", self.saved_overflow.take().as_deref());
        }
        self.state = MenuState::Closed;
        tracing::debug!("mobile menu closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components;
    use crate::config::SiteConfig;

    fn page() -> NodeRef {
        let site = SiteConfig::default();
        dom::parse_document(&format!(
            "<html><body>{}{}</body></html>",
            components::header(&site).into_string(),
            components::mobile_menu(&site).into_string()
        ))
    }

    #[test]
    fn open_and_close() {
        let doc = page();
        let mut menu = MobileMenu::discover(&doc).unwrap();
        let body = dom::select_first(&doc, "body").unwrap();

        menu.toggle();
        assert_eq!(menu.state(), MenuState::Open);
        assert!(dom::has_class(menu.panel(), "active"));
        assert!(dom::has_class(menu.overlay(), "active"));
        assert_eq!(
            dom::get_attr(menu.button(), "aria-expanded").as_deref(),
            Some("true")
        );
        assert_eq!(dom::style_property(&body, "overflow").as_deref(), Some("hidden"));

        menu.toggle();
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!dom::has_class(menu.panel(), "active"));
        assert_eq!(
            dom::get_attr(menu.button(), "aria-expanded").as_deref(),
            Some("false")
        );
        assert!(!dom::has_attr(&body, "style"));
    }

    #[test]
    fn close_when_closed_changes_nothing() {
        let doc = page();
        let mut menu = MobileMenu::discover(&doc).unwrap();
        let before = dom::serialize(&doc).unwrap();
        menu.close();
        assert_eq!(dom::serialize(&doc).unwrap(), before);
    }

    #[test]
    fn needs_all_three_elements() {
        let doc = dom::parse_document(
            r#"<body><div id="mobileMenu"></div><button class="mobile-menu-button"></button></body>"#,
        );
        assert!(MobileMenu::discover(&doc).is_none());
    }
}
