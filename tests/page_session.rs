use std::path::{Path, PathBuf};

use glasscase_chrome::{CliArgs, Interaction};
use tempfile::tempdir;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Consideration Matrix</title></head>
<body>
  <div id="shared-header"></div>
  <div id="shared-mobile-menu"></div>
  <main>
    <p>See the <a id="src" href="https://example.org/dataset">dataset</a>,
       the <a id="pdf" href="/findings/report.pdf">report</a>
       and <a id="mail" href="mailto:team@glasscase.org">email us</a>.</p>
    <script src="https://giscus.app/client.js" data-theme="preferred_color_scheme" async></script>
  </main>
  <footer class="gc-footer"><div id="shared-footer"></div></footer>
</body>
</html>"#;

fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn args(input: PathBuf, out: PathBuf) -> CliArgs {
    CliArgs {
        input,
        out: Some(out),
        location: None,
        path: "/tools/consideration-matrix".to_string(),
        storage: None,
        storage_unavailable: false,
        site_config: None,
        actions: vec![],
        settle_ms: None,
        realtime: false,
    }
}

fn root_tag(html: &str) -> &str {
    let start = html.find("<html").unwrap();
    let end = start + html[start..].find('>').unwrap();
    &html[start..=end]
}

#[tokio::test]
async fn injects_components_into_page() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    std::fs::write(&input, PAGE).unwrap();
    let out = tmp.path().join("out/index.html");

    glasscase_chrome::run(args(input, out.clone())).await.unwrap();
    let html = read_to_string(&out);

    for slot in ["shared-header", "shared-mobile-menu", "shared-footer"] {
        assert!(!html.contains(slot), "placeholder {slot} left in output");
    }
    assert!(html.contains(r#"class="gc-header""#));
    assert!(html.contains(r#"id="mobileMenu""#));
    assert!(html.contains(r#"class="footer-top""#));
    assert!(html.contains(r#"<a class="active" data-nav="tools" href="/tools">"#));
    assert_eq!(html.matches(r#"class="active""#).count(), 1);

    assert!(html.contains(
        r#"<a href="https://example.org/dataset" id="src" rel="noopener noreferrer" target="_blank">"#
    ));
    assert!(html.contains(r#"<a href="mailto:team@glasscase.org" id="mail">"#));

    // Dark is the default: no root attribute, and the widget gets the dark palette.
    assert!(!root_tag(&html).contains("data-theme"));
    assert!(html.contains(r#"data-theme="dark""#));
}

#[tokio::test]
async fn theme_persists_between_runs() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    std::fs::write(&input, PAGE).unwrap();
    let storage = tmp.path().join("local-storage.json");

    let first_out = tmp.path().join("first.html");
    let mut first = args(input.clone(), first_out.clone());
    first.storage = Some(storage.clone());
    first.actions = vec![Interaction::Theme];
    glasscase_chrome::run(first).await.unwrap();

    let html = read_to_string(&first_out);
    assert!(root_tag(&html).contains(r#"data-theme="light""#));
    assert!(!root_tag(&html).contains("data-theme-transitioning"));
    assert!(html.contains(r#"data-theme="light_high_contrast""#));
    assert!(html.contains("Switch to dark mode"));

    let stored: serde_json::Value = serde_json::from_str(&read_to_string(&storage)).unwrap();
    assert_eq!(stored["glasscase-theme"], "light");

    let second_out = tmp.path().join("second.html");
    let mut second = args(input, second_out.clone());
    second.storage = Some(storage);
    glasscase_chrome::run(second).await.unwrap();
    let html = read_to_string(&second_out);
    assert!(root_tag(&html).contains(r#"data-theme="light""#));
}

#[tokio::test]
async fn blocked_storage_still_toggles() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    std::fs::write(&input, PAGE).unwrap();
    let out = tmp.path().join("out.html");

    let mut a = args(input, out.clone());
    a.storage_unavailable = true;
    a.actions = vec![Interaction::Theme, Interaction::Theme, Interaction::Theme];
    glasscase_chrome::run(a).await.unwrap();

    let html = read_to_string(&out);
    assert!(root_tag(&html).contains(r#"data-theme="light""#));
}

#[tokio::test]
async fn menu_interactions_and_settle_limit() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    std::fs::write(&input, PAGE).unwrap();
    let out = tmp.path().join("out.html");

    let mut a = args(input, out.clone());
    a.actions = vec![Interaction::Menu, Interaction::Reading, Interaction::Theme];
    a.settle_ms = Some(100);
    glasscase_chrome::run(a).await.unwrap();

    let html = read_to_string(&out);
    assert!(html.contains(r#"aria-expanded="true""#));
    assert!(html.contains("overflow: hidden;"));
    assert!(html.contains("reading-relaxed"));
    assert!(html.contains(r#"aria-pressed="true""#));
    // Stopped before the 400 ms transition window closed.
    assert!(root_tag(&html).contains("data-theme-transitioning"));
}

#[tokio::test]
async fn site_config_overrides_hosts() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    std::fs::write(&input, PAGE).unwrap();
    let config = tmp.path().join("site.json");
    std::fs::write(&config, r#"{"internal_hosts":["example.org"]}"#).unwrap();
    let out = tmp.path().join("out.html");

    let mut a = args(input, out.clone());
    a.site_config = Some(config);
    glasscase_chrome::run(a).await.unwrap();

    let html = read_to_string(&out);
    assert!(html.contains(r#"<a href="https://example.org/dataset" id="src">"#));
}

#[tokio::test]
async fn missing_input_is_an_error() {
    let tmp = tempdir().unwrap();
    let err = glasscase_chrome::run(args(tmp.path().join("nope.html"), tmp.path().join("o.html")))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("nope.html"));
}
