//! palette-replay: drive the command palette from a JSONL script.
//!
//! Loads a fixture describing the open tabs and their pages, then reads one
//! command per line from stdin and prints the rendered view after each one.
//!
//! Usage:
//!   palette-replay fixture.json < commands.jsonl
//!   palette-replay fixture.json --debug --log-file /tmp/gofaster.jsonl
//!   palette-replay fixture.json --json-log
//!
//! Fixture:
//!
//! ```json
//! {
//!   "tabs": [{"id": 1, "title": "Docs", "url": "https://docs.rs", "active": true}],
//!   "pages": {"1": {"title": "Docs", "url": "https://docs.rs", "body": [{"text": "hello"}]}},
//!   "currentTabId": 1
//! }
//! ```
//!
//! Commands:
//!
//! ```json
//! {"command": "open", "mode": "content"}
//! {"command": "setQuery", "query": "error"}
//! {"command": "key", "key": "ArrowDown"}
//! {"command": "execute"}
//! ```

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use gofaster::config::{load_config, DEFAULT_CONFIG_PATH};
use gofaster::keymap::KeyInput;
use gofaster::logging::{self, LogSettings};
use gofaster::memory::{InMemoryDirectory, RecordingHost};
use gofaster::protocol::{JsonlReader, Notification, PaletteMode};
use gofaster::render::RenderedView;
use gofaster::scanner::{PageSnapshot, ScanLimits};
use gofaster::tabs::{deserialize_tab_list, Tab, TabId};
use gofaster::CommandPalette;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "palette-replay")]
#[command(about = "Replay palette commands against an in-memory browser")]
#[command(version)]
struct Args {
    /// Fixture JSON with tabs and page contents
    fixture: PathBuf,

    /// Settings file (JSON)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Debug logging
    #[arg(long, short)]
    debug: bool,

    /// Append structured JSONL logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Append JSONL logs to ~/.gofaster/logs/gofaster.jsonl
    #[arg(long, conflicts_with = "log_file")]
    json_log: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    #[serde(default, deserialize_with = "deserialize_tab_list")]
    tabs: Vec<Tab>,
    /// Page contents keyed by tab id
    #[serde(default)]
    pages: HashMap<i64, PageSnapshot>,
    #[serde(default)]
    current_tab_id: Option<i64>,
}

/// One line of the command script
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum ReplayCommand {
    Open {
        #[serde(default)]
        mode: Option<PaletteMode>,
    },
    Toggle,
    Close,
    SetQuery {
        query: String,
    },
    SwitchMode {
        mode: PaletteMode,
    },
    Select {
        index: usize,
    },
    Key(KeyInput),
    Execute,
    Pin,
    Mute,
    CloseTab,
    Group,
    TabsChanged {
        #[serde(default, deserialize_with = "deserialize_tab_list")]
        tabs: Vec<Tab>,
    },
    /// Raw runtime message, routed like the Tab Directory would send it
    Message {
        message: Value,
    },
}

impl ReplayCommand {
    fn name(&self) -> &'static str {
        match self {
            ReplayCommand::Open { .. } => "open",
            ReplayCommand::Toggle => "toggle",
            ReplayCommand::Close => "close",
            ReplayCommand::SetQuery { .. } => "setQuery",
            ReplayCommand::SwitchMode { .. } => "switchMode",
            ReplayCommand::Select { .. } => "select",
            ReplayCommand::Key(_) => "key",
            ReplayCommand::Execute => "execute",
            ReplayCommand::Pin => "pin",
            ReplayCommand::Mute => "mute",
            ReplayCommand::CloseTab => "closeTab",
            ReplayCommand::Group => "group",
            ReplayCommand::TabsChanged { .. } => "tabsChanged",
            ReplayCommand::Message { .. } => "message",
        }
    }
}

/// One line of output
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayStep<'a> {
    step: usize,
    command: &'a str,
    /// Outcome of commands that report one (execute, pin, key, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    handled: Option<bool>,
    view: RenderedView,
}

type ReplayPalette = CommandPalette<InMemoryDirectory, RecordingHost>;

fn build_palette(fixture: Fixture, config: gofaster::config::PaletteConfig) -> ReplayPalette {
    let current_page = fixture
        .current_tab_id
        .and_then(|id| fixture.pages.get(&id).cloned())
        .unwrap_or_default();

    let directory = InMemoryDirectory::new(fixture.tabs)
        .with_limits(ScanLimits::from(&config.search));
    directory.set_current_tab(fixture.current_tab_id.map(TabId));
    for (id, page) in fixture.pages {
        directory.set_page(TabId(id), page);
    }

    CommandPalette::new(directory, RecordingHost::new(current_page), config)
}

async fn apply(palette: &ReplayPalette, command: ReplayCommand) -> Option<bool> {
    match command {
        ReplayCommand::Open { mode } => palette.open(mode).await,
        ReplayCommand::Toggle => palette.toggle().await,
        ReplayCommand::Close => palette.close(),
        ReplayCommand::SetQuery { query } => palette.set_query(query).await,
        ReplayCommand::SwitchMode { mode } => palette.switch_mode(mode),
        ReplayCommand::Select { index } => palette.select_index(index),
        ReplayCommand::Key(input) => return Some(palette.handle_key(&input).await),
        ReplayCommand::Execute => return Some(palette.execute_selected().await),
        ReplayCommand::Pin => return Some(palette.toggle_pin().await),
        ReplayCommand::Mute => return Some(palette.toggle_mute().await),
        ReplayCommand::CloseTab => return Some(palette.close_selected().await),
        ReplayCommand::Group => palette.toggle_grouping(),
        ReplayCommand::TabsChanged { tabs } => {
            palette
                .handle_notification(Notification::TabsChanged { tabs })
                .await
        }
        ReplayCommand::Message { message } => palette.handle_message(message).await,
    }
    None
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = logging::init(&LogSettings {
        debug: args.debug,
        json_log_path: args
            .log_file
            .clone()
            .or_else(|| args.json_log.then(logging::default_log_path)),
    });

    let config = load_config(&args.config);
    let debug = args.debug || config.debug;
    let config = config.with_debug(debug);

    let raw = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("Failed to read fixture {}", args.fixture.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse fixture {}", args.fixture.display()))?;
    info!(
        tab_count = fixture.tabs.len(),
        page_count = fixture.pages.len(),
        "Loaded fixture"
    );

    let palette = build_palette(fixture, config);
    let mut reader = JsonlReader::new(io::stdin().lock());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut step = 0;
    while let Some(command) = reader
        .next_item::<ReplayCommand>()
        .context("Failed to read command stream")?
    {
        step += 1;
        let name = command.name();
        debug!(step, command = name, "Replaying command");
        let handled = pollster::block_on(apply(&palette, command));

        let line = ReplayStep {
            step,
            command: name,
            handled,
            view: palette.view(),
        };
        serde_json::to_writer(&mut out, &line).context("Failed to encode view")?;
        writeln!(out)?;
    }
    out.flush()?;

    let log = palette.host().log();
    info!(
        steps = step,
        highlights = log.highlights.len(),
        requests = palette.directory().channel().requests().len(),
        "Replay finished"
    );
    Ok(())
}
