use std::collections::HashSet;

use kuchiki::NodeRef;
use url::Url;

use crate::config::SiteConfig;
use crate::dom;

/// Hosts treated as part of the site. Compared like `URL.host`: hostname plus any non-default port.
#[derive(Debug, Clone)]
pub struct InternalHosts(HashSet<String>);

impl InternalHosts {
    pub fn new(location: &Url, site: &SiteConfig) -> Self {
        let mut hosts: HashSet<String> = site
            .internal_hosts
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        hosts.insert(site.canonical_host.to_ascii_lowercase());
        if let Some(own) = host_key(location) {
            hosts.insert(own);
        }
        Self(hosts)
    }

    pub fn contains(&self, url: &Url) -> bool {
        host_key(url).is_some_and(|h| self.0.contains(&h))
    }
}

fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

/// Resolves `href` and returns it only when it leaves the site over http(s).
fn external_target(href: &str, location: &Url, hosts: &InternalHosts) -> Option<Url> {
    if href.starts_with('#') || href.starts_with("/#") {
        return None;
    }
    if href.starts_with("mailto:") || href.starts_with("tel:") {
        return None;
    }
    let url = location.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if hosts.contains(&url) {
        return None;
    }
    Some(url)
}

fn ensure_rel_tokens(node: &NodeRef) -> bool {
    let current = dom::get_attr(node, "rel").unwrap_or_default();
    let mut tokens: Vec<&str> = current.split_whitespace().collect();
    for required in ["noopener", "noreferrer"] {
        if !tokens.iter().any(|t| t.eq_ignore_ascii_case(required)) {
            tokens.push(required);
        }
    }
    dom::set_attr(node, "rel", &tokens.join(" "))
}

/// Opens off-site links in a new browsing context without leaking the opener or referrer.
///
/// Returns how many anchors were changed; a second pass over the same document changes none.
pub fn normalize_outbound_links(document: &NodeRef, location: &Url, hosts: &InternalHosts) -> usize {
    let mut changed = 0;
    for anchor in dom::select_all(document, "a[href]") {
        let Some(href) = dom::get_attr(&anchor, "href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let Some(url) = external_target(&href, location, hosts) else {
            tracing::trace!(%href, "link left as-is");
            continue;
        };

        let target = dom::set_attr(&anchor, "target", "_blank");
        let rel = ensure_rel_tokens(&anchor);
        if target || rel {
            tracing::debug!(%url, "marked outbound link");
            changed += 1;
        }
    }
    changed
}
