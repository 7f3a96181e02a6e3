use kuchiki::NodeRef;

use crate::dom;

pub const BUTTON_ID: &str = "gcReadingToggle";
pub const BODY_CLASS: &str = "reading-relaxed";

/// Relaxed line spacing switch. Not persisted.
pub struct ReadingToggle {
    button: NodeRef,
    body: NodeRef,
}

impl ReadingToggle {
    pub fn discover(document: &NodeRef) -> Option<Self> {
        Some(Self {
            button: dom::get_element_by_id(document, BUTTON_ID)?,
            body: dom::select_first(document, "body")?,
        })
    }

    pub fn button(&self) -> &NodeRef {
        &self.button
    }

    pub fn is_relaxed(&self) -> bool {
        dom::get_attr(&self.button, "aria-pressed").as_deref() == Some("true")
    }

    pub fn toggle(&self) -> bool {
        let relaxed = !self.is_relaxed();
        dom::set_attr(&self.button, "aria-pressed", if relaxed { "true" } else { "false" });
        dom::toggle_class(&self.body, BODY_CLASS, relaxed);
        relaxed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_pressed_and_body_class() {
        let doc = dom::parse_document(
            r#"<body class="page"><button id="gcReadingToggle" aria-pressed="false"></button></body>"#,
        );
        let toggle = ReadingToggle::discover(&doc).unwrap();
        let body = dom::select_first(&doc, "body").unwrap();

        assert!(toggle.toggle());
        assert!(dom::has_class(&body, BODY_CLASS));
        assert!(dom::has_class(&body, "page"));
        assert!(!toggle.toggle());
        assert!(!dom::has_class(&body, BODY_CLASS));
        assert_eq!(
            dom::get_attr(toggle.button(), "aria-pressed").as_deref(),
            Some("false")
        );
    }
}
