use kuchiki::NodeRef;

use crate::components::Components;
use crate::config::NavRule;
use crate::dom;

pub const HEADER_SLOT: &str = "shared-header";
pub const MOBILE_MENU_SLOT: &str = "shared-mobile-menu";
pub const FOOTER_SLOT: &str = "shared-footer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Injected {
    pub header: bool,
    pub mobile_menu: bool,
    pub footer: bool,
}

/// Replaces each placeholder that exists with its shared markup: header, mobile menu, footer.
pub fn inject_components(document: &NodeRef, components: &Components) -> Injected {
    let fill = |slot: &str, markup: &str| match dom::get_element_by_id(document, slot) {
        Some(node) => {
            dom::replace_with_markup(&node, markup);
            true
        }
        None => {
            tracing::trace!(slot, "placeholder missing");
            false
        }
    };
    Injected {
        header: fill(HEADER_SLOT, &components.header),
        mobile_menu: fill(MOBILE_MENU_SLOT, &components.mobile_menu),
        footer: fill(FOOTER_SLOT, &components.footer),
    }
}

/// The navigation id for `path`; rules are tried in order and the first hit wins.
pub fn active_nav<'a>(path: &str, rules: &'a [NavRule]) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| {
            rule.exact.iter().any(|p| p == path)
                || rule.contains.iter().any(|needle| path.contains(needle.as_str()))
        })
        .map(|rule| rule.id.as_str())
}

pub fn mark_active_nav(document: &NodeRef, nav_id: &str) -> bool {
    let selector = format!(".mobile-menu [data-nav='{nav_id}']");
    match dom::select_first(document, &selector) {
        Some(link) => dom::add_class(&link, "active"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const PAGE: &str = r#"<html><body>
        <div id="shared-header"></div>
        <div id="shared-mobile-menu"></div>
        <main><p>content</p></main>
        <footer><div id="shared-footer"></div></footer>
    </body></html>"#;

    #[test]
    fn fills_every_slot() {
        let site = SiteConfig::default();
        let doc = dom::parse_document(PAGE);
        let injected = inject_components(&doc, &Components::render(&site));
        assert_eq!(
            injected,
            Injected {
                header: true,
                mobile_menu: true,
                footer: true
            }
        );
        for slot in [HEADER_SLOT, MOBILE_MENU_SLOT, FOOTER_SLOT] {
            assert!(dom::get_element_by_id(&doc, slot).is_none());
        }
        assert!(dom::select_first(&doc, "nav.gc-header").is_some());
        assert!(dom::get_element_by_id(&doc, "mobileMenu").is_some());
        assert!(dom::get_element_by_id(&doc, "mobileMenuOverlay").is_some());
        assert!(dom::select_first(&doc, "footer > .footer-top").is_some());
        assert!(dom::select_first(&doc, "main p").is_some());
    }

    #[test]
    fn missing_slots_are_skipped() {
        let doc = dom::parse_document("<html><body><p>bare</p></body></html>");
        let before = dom::serialize(&doc).unwrap();
        let injected = inject_components(&doc, &Components::render(&SiteConfig::default()));
        assert_eq!(injected, Injected::default());
        assert_eq!(dom::serialize(&doc).unwrap(), before);
    }

    #[test]
    fn path_rules() {
        let rules = SiteConfig::default().nav_rules;
        assert_eq!(active_nav("/", &rules), Some("home"));
        assert_eq!(active_nav("/index.html", &rules), Some("home"));
        assert_eq!(active_nav("/tools/consideration-matrix", &rules), Some("tools"));
        assert_eq!(active_nav("/stress-mapper/", &rules), Some("tools"));
        assert_eq!(active_nav("/findings/2025-audit", &rules), Some("findings"));
        assert_eq!(active_nav("/position/", &rules), Some("position"));
        assert_eq!(active_nav("/legal", &rules), Some("legal"));
        assert_eq!(active_nav("/about", &rules), None);
    }

    #[test]
    fn marks_only_matching_entry() {
        let site = SiteConfig::default();
        let doc = dom::parse_document(PAGE);
        inject_components(&doc, &Components::render(&site));

        let id = active_nav("/tools/consideration-matrix", &site.nav_rules).unwrap();
        assert!(mark_active_nav(&doc, id));
        let active: Vec<String> = dom::select_all(&doc, ".mobile-menu [data-nav].active")
            .iter()
            .filter_map(|n| dom::get_attr(n, "data-nav"))
            .collect();
        assert_eq!(active, ["tools"]);
    }

    #[test]
    fn unknown_nav_is_noop() {
        let doc = dom::parse_document(PAGE);
        assert!(!mark_active_nav(&doc, "tools"));
    }
}
