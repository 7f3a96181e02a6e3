mod bridge;
mod cli;
mod components;
mod config;
mod dom;
mod event_loop;
mod inject;
mod links;
mod menu;
mod page;
mod reading;
mod storage;
mod theme;
mod theme_controller;

use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use cli::Args;
use url::Url;

pub use bridge::{
    DomTransport, PostedMessage, ThemeBridge, WidgetMessage, WidgetTransport, widget_theme,
};
pub use cli::{Args as CliArgs, Interaction};
pub use components::Components;
pub use config::{FooterConfig, FooterSection, Link, NavItem, NavRule, SiteConfig, WidgetConfig};
pub use event_loop::{EventLoop, PollStatus, PollingTask, Task, TimerId};
pub use inject::{Injected, active_nav};
pub use links::{InternalHosts, normalize_outbound_links};
pub use menu::MenuState;
pub use page::{Action, Page, PageLoad};
pub use storage::{
    DEFAULT_THEME_KEY, JsonFileStorage, MemoryStorage, PreferenceBackend, PreferenceStore,
    UnavailableStorage,
};
pub use theme::{Theme, ThemeState};

pub async fn run(args: Args) -> anyhow::Result<()> {
    let site = match &args.site_config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    let location = match &args.location {
        Some(url) => url.clone(),
        None => Url::parse(&site.home_url)
            .with_context(|| format!("parse home_url {}", site.home_url))?
            .join(&args.path)
            .with_context(|| format!("resolve path {}", args.path))?,
    };

    let backend: Box<dyn PreferenceBackend> = if args.storage_unavailable {
        Box::new(UnavailableStorage)
    } else if let Some(path) = &args.storage {
        Box::new(JsonFileStorage::new(path))
    } else {
        Box::new(MemoryStorage::new())
    };
    let store = PreferenceStore::new(backend, site.theme_storage_key.clone());

    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;

    let mut page = Page::new(&html, location, store, site);
    page.load();

    for action in &args.actions {
        replay(&mut page, *action);
    }

    let limit = args.settle_ms.map(Duration::from_millis);
    run_timers(&mut page, limit, args.realtime).await;
    tracing::info!(
        elapsed_ms = page.now().as_millis() as u64,
        theme = %page.theme(),
        "page settled"
    );

    let out = page.to_html()?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(out.as_bytes())
                .context("write stdout")?;
        }
    }
    Ok(())
}

fn replay(page: &mut Page, action: Interaction) {
    let hit = match action {
        Interaction::Theme => {
            page.click_selector("#theme-toggle") || page.click_selector("[data-theme-toggle]")
        }
        Interaction::Menu => page.click_selector(menu::BUTTON_SELECTOR),
        Interaction::Close => page.click_selector(".mobile-menu-close"),
        Interaction::Escape => {
            page.key_down("Escape");
            true
        }
        Interaction::Reading => page.click_selector(&format!("#{}", reading::BUTTON_ID)),
    };
    if !hit {
        tracing::warn!(?action, "interaction target not on page");
    }
}

async fn run_timers(page: &mut Page, limit: Option<Duration>, realtime: bool) {
    let cap = limit.map(|l| page.now() + l);
    while let Some(next) = page.next_deadline() {
        if cap.is_some_and(|cap| next > cap) {
            break;
        }
        let wait = next.saturating_sub(page.now());
        if realtime {
            tokio::time::sleep(wait).await;
        }
        page.advance(wait);
    }
    if let Some(cap) = cap {
        page.advance(cap.saturating_sub(page.now()));
    }
}
