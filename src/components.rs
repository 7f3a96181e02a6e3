use maud::{Markup, html};

use crate::config::{NavItem, SiteConfig};

pub const THEME_TOGGLE_ATTR: &str = "data-theme-toggle";
/// Child of a toggle that holds its glyph, so the label can change without replacing the button's content.
pub const TOGGLE_ICON_CLASS: &str = "toggle-icon";

fn logo(id_prefix: &str) -> Markup {
    let prism = format!("{id_prefix}PrismGrad");
    let beam = format!("{id_prefix}LightBeam");
    html! {
        svg width="32" height="32" viewBox="0 0 80 80" fill="none" aria-hidden="true" {
            defs {
                linearGradient id=(prism) x1="0%" y1="0%" x2="100%" y2="100%" {
                    stop offset="0%" stop-color="#E8F4F8" stop-opacity="0.9" {}
                    stop offset="50%" stop-color="#4A9FD8" stop-opacity="0.7" {}
                    stop offset="100%" stop-color="#3ABEF9" stop-opacity="0.9" {}
                }
                linearGradient id=(beam) x1="0%" y1="0%" x2="100%" y2="0%" {
                    stop offset="0%" stop-color="#FFFFFF" stop-opacity="0.8" {}
                    stop offset="100%" stop-color="#4A9FD8" stop-opacity="0.4" {}
                }
            }
            path d="M 28 22 L 42 40 L 28 58 Z" fill="rgba(74, 159, 216, 0.08)" stroke="rgba(74, 159, 216, 0.15)" stroke-width="0.5" opacity="0.4" {}
            line x1="8" y1="40" x2="30" y2="40" stroke=(format!("url(#{beam})")) stroke-width="2" opacity="0.6" class="shimmer" {}
            path d="M 30 20 L 45 40 L 30 60 Z" fill=(format!("url(#{prism})")) stroke="#4A9FD8" stroke-width="1" class="prism-glow" {}
            path d="M 32 28 L 42 40 L 32 52" fill="rgba(255, 255, 255, 0.3)" {}
            line x1="45" y1="40" x2="72" y2="28" stroke="#4A9FD8" stroke-width="2" opacity="0.85" class="shimmer" {}
            line x1="45" y1="40" x2="72" y2="40" stroke="#3ABEF9" stroke-width="2.5" opacity="0.9" class="shimmer" {}
            line x1="45" y1="40" x2="72" y2="52" stroke="#F4C430" stroke-width="2" opacity="0.85" class="shimmer" {}
        }
    }
}

fn brand(site: &SiteConfig, id_prefix: &str) -> Markup {
    html! {
        a href=(site.home_url) class="brand" aria-label=(format!("{} home", site.brand_name)) {
            (logo(id_prefix))
            p class="brand-name" {
                span class="glass" { "Glass" }
                span class="divider" { "/" }
                span class="case" { "Case" }
            }
        }
    }
}

fn theme_toggle(extra_class: Option<&str>, id: Option<&str>) -> Markup {
    let class = match extra_class {
        Some(extra) => format!("gc-theme-toggle {extra}"),
        None => "gc-theme-toggle".to_string(),
    };
    html! {
        button id=[id] class=(class) data-theme-toggle="" aria-label="Switch to light mode" type="button" {
            span class=(TOGGLE_ICON_CLASS) aria-hidden="true" { "☼" }
        }
    }
}

fn desktop_link(item: &NavItem) -> Markup {
    html! {
        @if item.external {
            a href=(item.href) target="_blank" rel="noopener" { (item.label) }
        } @else {
            a href=(item.href) { (item.label) }
        }
    }
}

pub fn header(site: &SiteConfig) -> Markup {
    html! {
        nav class="gc-header" {
            div class="nav-inner" {
                (brand(site, "header"))
                div class="nav-right" {
                    nav class="desktop-nav" {
                        @for item in site.nav.iter().filter(|n| !n.mobile_only) {
                            (desktop_link(item))
                        }
                    }
                    button class="gc-reading-toggle" id="gcReadingToggle" type="button"
                        aria-pressed="false"
                        aria-label="Toggle relaxed reading spacing"
                        title="Wider line spacing for easier reading" {
                        span class=(TOGGLE_ICON_CLASS) aria-hidden="true" { "Aa" }
                        span { "Relaxed reading" }
                    }
                    (theme_toggle(None, Some("theme-toggle")))
                    button class="mobile-menu-button" type="button" aria-label="Toggle menu" aria-expanded="false" aria-controls="mobileMenu" {
                        span {}
                        span {}
                        span {}
                    }
                }
            }
        }
    }
}

pub fn mobile_menu(site: &SiteConfig) -> Markup {
    html! {
        div class="mobile-menu" id="mobileMenu" {
            button class="mobile-menu-close" type="button" aria-label="Close menu" { "×" }
            div class="mobile-menu-header" {
                span class="mobile-menu-title" { (site.brand_name) }
                div class="mobile-menu-divider" {}
            }
            div class="mobile-menu-theme-wrap" {
                (theme_toggle(Some("mobile-menu-theme-toggle"), None))
            }
            nav {
                @for item in &site.nav {
                    a href=(item.href) data-nav=(item.id) { (item.label) }
                }
            }
        }
        div class="mobile-menu-overlay" id="mobileMenuOverlay" {}
    }
}

pub fn footer(site: &SiteConfig) -> Markup {
    let footer = &site.footer;
    html! {
        div class="footer-top" {
            div class="footer-brand" {
                (brand(site, "footer"))
                @for line in &footer.taglines {
                    p class="footer-tagline" { (line) }
                }
            }
            @for section in &footer.sections {
                div class="footer-section" {
                    h4 { (section.heading) }
                    div class="footer-links" {
                        @for link in &section.links {
                            a href=(link.href) { (link.label) }
                        }
                    }
                }
            }
            div class="footer-section" {
                h4 { (footer.community_heading) }
                p class="footer-community-note" { (footer.community_note) }
                a href=(footer.community_cta.href) class="footer-cta" { (footer.community_cta.label) }
            }
        }
    }
}

/// Pre-rendered markup for the three injection slots.
#[derive(Debug, Clone)]
pub struct Components {
    pub header: String,
    pub mobile_menu: String,
    pub footer: String,
}

impl Components {
    pub fn render(site: &SiteConfig) -> Self {
        Self {
            header: header(site).into_string(),
            mobile_menu: mobile_menu(site).into_string(),
            footer: footer(site).into_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_markup_has_no_inline_style_or_handlers() {
        let c = Components::render(&SiteConfig::default());
        for markup in [&c.header, &c.mobile_menu, &c.footer] {
            assert!(!markup.contains("style="), "inline style in {markup}");
            assert!(!markup.contains("onclick"), "inline handler in {markup}");
        }
    }

    #[test]
    fn both_theme_toggles_are_marked() {
        let c = Components::render(&SiteConfig::default());
        assert!(c.header.contains(r#"data-theme-toggle="""#));
        assert!(c.mobile_menu.contains(r#"data-theme-toggle="""#));
        assert!(c.header.contains(r#"id="theme-toggle""#));
    }

    #[test]
    fn home_only_in_mobile_menu() {
        let c = Components::render(&SiteConfig::default());
        assert!(c.mobile_menu.contains(r#"data-nav="home""#));
        assert!(!c.header.contains(">Home<"));
        assert!(c.header.contains("Use &amp; Privacy"));
    }
}
