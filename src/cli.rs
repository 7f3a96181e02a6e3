use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

/// A user interaction replayed against the page after it loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Interaction {
    /// Click the header theme toggle.
    Theme,
    /// Click the mobile menu button.
    Menu,
    /// Click the mobile menu close button.
    Close,
    /// Press Escape.
    Escape,
    /// Click the relaxed-reading toggle.
    Reading,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// HTML page containing the `shared-header` / `shared-mobile-menu` / `shared-footer` placeholders.
    #[arg(long)]
    pub input: PathBuf,

    /// Output HTML file. Defaults to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Full page URL. Takes precedence over `--path`.
    #[arg(long)]
    pub location: Option<Url>,

    /// Page path, resolved against the site's home URL.
    #[arg(long, default_value = "/")]
    pub path: String,

    /// JSON file standing in for the browser's local storage; persists the theme between runs.
    ///
    /// Without it (and without `--storage-unavailable`) the preference lives only for this run.
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Behave as if local storage is blocked.
    #[arg(long, conflicts_with = "storage")]
    pub storage_unavailable: bool,

    /// Site configuration JSON (hosts, navigation, footer, widget). Missing fields use built-in defaults.
    #[arg(long)]
    pub site_config: Option<PathBuf>,

    /// Interactions to replay after load, in order. Repeatable.
    #[arg(long = "action", value_enum)]
    pub actions: Vec<Interaction>,

    /// Stop running timers after this many milliseconds. By default every timer runs to completion.
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Wait for timers in wall-clock time instead of skipping ahead.
    #[arg(long)]
    pub realtime: bool,
}
