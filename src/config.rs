use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::storage::DEFAULT_THEME_KEY;

/// Site-wide data: hosts, navigation, footer copy and third-party widget settings.
///
/// Every field has a default so a config file only needs to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub canonical_host: String,
    pub internal_hosts: Vec<String>,
    pub home_url: String,
    pub brand_name: String,
    pub theme_storage_key: String,
    pub theme_transition_ms: u64,
    pub nav: Vec<NavItem>,
    pub nav_rules: Vec<NavRule>,
    pub footer: FooterConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub href: String,
    /// Only listed in the mobile menu.
    #[serde(default)]
    pub mobile_only: bool,
    #[serde(default)]
    pub external: bool,
}

/// Maps a path to a navigation id. `exact` paths are compared whole, `contains` as substrings.
#[derive(Debug, Clone, Deserialize)]
pub struct NavRule {
    pub id: String,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub taglines: Vec<String>,
    pub sections: Vec<FooterSection>,
    pub community_heading: String,
    pub community_note: String,
    pub community_cta: Link,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterSection {
    pub heading: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub script_src: String,
    pub origin: String,
    pub frame_selector: String,
    pub retry_interval_ms: u64,
    pub max_attempts: u32,
}

impl SiteConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn theme_transition(&self) -> Duration {
        Duration::from_millis(self.theme_transition_ms)
    }
}

impl WidgetConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

fn nav(id: &str, label: &str, href: &str) -> NavItem {
    NavItem {
        id: id.to_string(),
        label: label.to_string(),
        href: href.to_string(),
        mobile_only: false,
        external: href.starts_with("http"),
    }
}

fn rule(id: &str, exact: &[&str], contains: &[&str]) -> NavRule {
    NavRule {
        id: id.to_string(),
        exact: exact.iter().map(|s| s.to_string()).collect(),
        contains: contains.iter().map(|s| s.to_string()).collect(),
    }
}

fn link(label: &str, href: &str) -> Link {
    Link {
        label: label.to_string(),
        href: href.to_string(),
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            canonical_host: "glasscase.org".to_string(),
            internal_hosts: vec!["www.glasscase.org".to_string()],
            home_url: "https://glasscase.org/".to_string(),
            brand_name: "GlassCase".to_string(),
            theme_storage_key: DEFAULT_THEME_KEY.to_string(),
            theme_transition_ms: 400,
            nav: vec![
                NavItem {
                    mobile_only: true,
                    ..nav("home", "Home", "/")
                },
                nav("position", "Position Paper", "/position/"),
                nav("tools", "Tools", "/tools"),
                nav("findings", "Findings", "/findings"),
                nav("commentary", "Commentary", "/commentary"),
                nav("submissions", "Submissions", "/submissions"),
                nav("legal", "Use & Privacy", "/legal"),
                nav("lightkey", "LightKey", "https://lightkey.org"),
            ],
            // First match wins, so specific sub-tool names sit with their parent ahead of the rest.
            nav_rules: vec![
                rule("home", &["/", "/index.html"], &[]),
                rule(
                    "tools",
                    &[],
                    &[
                        "tools",
                        "consideration-matrix",
                        "redaction-taxonomy",
                        "stress-mapper",
                    ],
                ),
                rule("findings", &[], &["findings"]),
                rule("commentary", &[], &["commentary"]),
                rule("submissions", &[], &["submissions"]),
                rule("position", &[], &["position"]),
                rule("legal", &[], &["legal"]),
            ],
            footer: FooterConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            taglines: vec![
                "Making Integrity Visible".to_string(),
                "Evidence systems across education and civic-tech, designed for fairness."
                    .to_string(),
            ],
            sections: vec![
                FooterSection {
                    heading: "Site".to_string(),
                    links: vec![
                        link("Home", "https://glasscase.org/"),
                        link("Position Paper", "/position/"),
                        link("Problem", "https://glasscase.org/#problem"),
                        link("Available Now", "https://glasscase.org/#available-now"),
                        link("Roadmap", "https://glasscase.org/#roadmap"),
                        link("Use & Privacy", "/legal"),
                    ],
                },
                FooterSection {
                    heading: "Projects".to_string(),
                    links: vec![
                        link("Tools", "/tools"),
                        link("Findings", "/findings"),
                        link("Commentary", "/commentary"),
                        link("Submissions", "/submissions"),
                        link("LightKey", "https://lightkey.org"),
                    ],
                },
            ],
            community_heading: "Join the Community".to_string(),
            community_note: "Updates on evidence systems and civic-legal data/tech.".to_string(),
            community_cta: link(
                "Follow on LinkedIn",
                "https://linkedin.com/company/glasscase-org",
            ),
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            script_src: "https://giscus.app/client.js".to_string(),
            origin: "https://giscus.app".to_string(),
            frame_selector: "iframe.giscus-frame".to_string(),
            retry_interval_ms: 150,
            max_attempts: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: SiteConfig = serde_json::from_str(
            r#"{"canonical_host":"example.org","widget":{"max_attempts":3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.canonical_host, "example.org");
        assert_eq!(cfg.widget.max_attempts, 3);
        assert_eq!(cfg.widget.retry_interval_ms, 150);
        assert_eq!(cfg.theme_storage_key, "glasscase-theme");
        assert!(cfg.nav.iter().any(|n| n.id == "tools"));
    }

    #[test]
    fn default_nav_marks_external_links() {
        let cfg = SiteConfig::default();
        let lightkey = cfg.nav.iter().find(|n| n.id == "lightkey").unwrap();
        assert!(lightkey.external);
        let tools = cfg.nav.iter().find(|n| n.id == "tools").unwrap();
        assert!(!tools.external);
    }
}
