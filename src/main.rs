mod config;
mod controller;
mod dataset;
mod events;
mod filter;
mod launcher;
mod model;
mod state;
mod ui;

use anyhow::{Context, Result};
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use smithay_client_toolkit::shell::wlr_layer::Layer;
use wayland_client::{Connection, globals::registry_queue_init};
use crate::config::{Config, load_config};
use crate::filter::filter;
use crate::model::SearchResult;
use crate::state::AppState;
use crate::ui::wayland::WaylandApp;
use crate::ui::render::Renderer;
use crate::ui::icons::IconTable;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const ICON_SIZE: u32 = 18;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyboard-driven link search overlay", long_about = None)]
struct Args {
    /// Config file to use instead of the per-user one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter the configured links and print the result
    Search {
        /// Text to match against link labels; empty lists everything
        #[arg(default_value = "")]
        query: String,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Some(Command::Search { query, json }) => search(&config, &query, json),
        None => run_overlay(config),
    }
}

fn search(config: &Config, query: &str, json: bool) -> Result<()> {
    let result = filter(&config.dataset(), query);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_result(&result));
    }
    Ok(())
}

fn format_result(result: &SearchResult) -> String {
    let mut out = String::new();
    for group in &result.groups {
        out.push_str(&group.category);
        out.push('\n');
        for item in &group.items {
            out.push_str(&format!("  {}  {}\n", item.label, item.link));
        }
    }
    out
}

fn run_overlay(config: Config) -> Result<()> {
    // 1. Setup Wayland Connection & Event Loop
    let mut event_loop: EventLoop<WaylandApp> = EventLoop::try_new()?;
    let conn = Connection::connect_to_env().context("failed to connect to the Wayland compositor")?;
    let (globals, event_queue) = registry_queue_init::<WaylandApp>(&conn)?;
    let qh = event_queue.handle();

    // 2. Init State & UI
    let renderer = Renderer::new(IconTable::load(&config, ICON_SIZE));
    let app_state = AppState::new(config);
    let mut app = WaylandApp::new(&globals, &qh, app_state, renderer)?;

    // 3. Create the bar surface; it grows into the backdrop when the overlay opens
    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell_state.create_layer_surface(
        &qh,
        surface,
        Layer::Top,
        Some("universal-search"),
        None,
    );
    app.configure_surface(&layer_surface, false);
    app.layer_surface = Some(layer_surface);

    event_loop
        .handle()
        .insert_source(WaylandSource::new(conn.clone(), event_queue), |_, queue, app| {
            queue.dispatch_pending(app)
        })
        .map_err(|e| anyhow::anyhow!("failed to register Wayland source: {}", e.error))?;

    // 4. Run Loop
    while !app.should_exit {
        event_loop.dispatch(None, &mut app)?;
    }
    app.state.overlay.unmount();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_groups_items_under_categories() {
        let result = filter(&dataset::builtin(), "readme");
        assert_eq!(
            format_result(&result),
            "Guides\n  Readme  https://github.com/your-repository/blob/main/README.md\n"
        );
    }

    #[test]
    fn search_subcommand_parses() {
        let args = Args::try_parse_from(["universal-search", "search", "git", "--json"]).unwrap();
        match args.command {
            Some(Command::Search { query, json }) => {
                assert_eq!(query, "git");
                assert!(json);
            }
            None => panic!("expected search subcommand"),
        }
    }

    #[test]
    fn no_subcommand_runs_overlay() {
        let args = Args::try_parse_from(["universal-search", "--config", "/tmp/x.toml"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.config, Some(PathBuf::from("/tmp/x.toml")));
    }
}
