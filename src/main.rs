//! Demo application: a team roster table screen plus a greeting plugin,
//! wired through the shell's config, theme, and plugin layers.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use crossterm::event::KeyCode;
use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::json;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use pepper::core::action::ShellAction;
use pepper::core::command::Command;
use pepper::core::config::{self, CliOverrides, PepperConfig};
use pepper::core::notification::Severity;
use pepper::core::plugin::{Plugin, PluginError, ShellSetup};
use pepper::core::theme::Theme;
use pepper::tui::Shell;
use pepper::tui::component::Component;
use pepper::tui::components::{Column, DataTable};
use pepper::tui::event::TuiEvent;
use pepper::tui::screen::{Screen, ScreenEvent};

#[derive(Parser)]
#[command(name = "pepper", about = "Terminal application shell demo")]
struct Args {
    /// Theme to activate at startup
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory of theme YAML files (defaults to ~/.pepper/themes)
    #[arg(long)]
    theme_dir: Option<PathBuf>,

    /// Directory of plugin manifests
    #[arg(long)]
    plugin_dir: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Demo screen
// ============================================================================

/// Table of people. `l` loads sample data, `s` sorts by name, `r` runs the
/// async reload command.
struct TeamScreen {
    table: DataTable,
}

impl TeamScreen {
    fn new() -> Self {
        Self {
            table: DataTable::new(vec![
                Column::new("name", "Name", 20),
                Column::new("age", "Age", 8),
                Column::new("city", "City", 20),
            ]),
        }
    }

    fn load_sample(&mut self) {
        self.table.load_rows(vec![
            json!({"name": "John", "age": 30, "city": "New York"}),
            json!({"name": "Alice", "age": 25, "city": "London"}),
            json!({"name": "Bob", "age": 35, "city": "Paris"}),
        ]);
    }
}

impl Screen for TeamScreen {
    fn title(&self) -> &str {
        "Team"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ScreenEvent> {
        if self.table.handle_navigation(event) {
            return None;
        }
        let TuiEvent::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Char('l') => {
                self.load_sample();
                Some(ScreenEvent::Notify {
                    message: format!("Loaded {} rows", self.table.len()),
                    severity: Severity::Info,
                })
            }
            KeyCode::Char('s') => match self.table.sort_by("name") {
                Ok(()) => None,
                Err(e) => Some(ScreenEvent::Notify {
                    message: e.to_string(),
                    severity: Severity::Error,
                }),
            },
            KeyCode::Char('r') => Some(ScreenEvent::RunCommand("Reload Data".to_string())),
            _ => None,
        }
    }
}

// ============================================================================
// Demo plugin
// ============================================================================

struct GreetingPlugin;

#[async_trait]
impl Plugin for GreetingPlugin {
    fn name(&self) -> &str {
        "greeting"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn description(&self) -> &str {
        "Posts a welcome message and registers a Greet command"
    }

    async fn initialize(&mut self, shell: &mut ShellSetup<'_>) -> Result<(), PluginError> {
        shell.commands.register(
            Command::new(
                "Greet",
                "Post a friendly greeting",
                Box::new(|ctx| {
                    ctx.notifications.notify(
                        "Hello from the greeting plugin",
                        Severity::Info,
                        Some(Duration::from_secs(4)),
                    );
                    Ok(())
                }),
            )
            .with_category("Plugins"),
        );
        shell.notifications.notify(
            "Welcome to pepper. Press ctrl+p for commands.",
            Severity::Info,
            Some(Duration::from_secs(6)),
        );
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

fn register_demo(shell: &mut Shell) {
    shell.commands.register(
        Command::new(
            "Reload Data",
            "Simulate an async data refresh",
            Box::new(|ctx| {
                ctx.post(ShellAction::PushLoading("Refreshing team data".to_string()));
                let actions = ctx.actions.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(1500)).await;
                    if actions.send(ShellAction::PopScreen).is_err() {
                        return;
                    }
                    let _ = actions.send(ShellAction::Notify {
                        message: "Team data refreshed".to_string(),
                        severity: Severity::Info,
                        duration: Some(Duration::from_secs(4)),
                    });
                });
                Ok(())
            }),
        )
        .with_category("Data")
        .with_shortcut("r"),
    );

    shell.screens.register("team", Box::new(|| {
        let mut screen = TeamScreen::new();
        screen.load_sample();
        Box::new(screen)
    }));
    shell.screens.switch_to("team");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let file_config = match config::load_config() {
        Ok(file_config) => file_config,
        Err(e) => {
            eprintln!("Ignoring config file: {e}");
            PepperConfig::default()
        }
    };
    let cli = CliOverrides {
        theme: args.theme,
        theme_dir: args.theme_dir,
        plugin_dir: args.plugin_dir,
        log_file: args.log_file,
    };
    let config = config::resolve(&file_config, &cli);

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
    info!("Pepper starting up");

    let mut shell = Shell::new(&config);

    if let Some(dir) = config.theme_dir.as_deref()
        && dir.is_dir()
        && let Err(e) = shell.load_themes(dir, config.theme.as_deref())
    {
        warn!("Theme loading failed: {e}");
    }

    shell.plugins.register(Box::new(GreetingPlugin));
    shell.load_plugins(config.plugin_dir.as_deref()).await;

    register_demo(&mut shell);

    shell.run().await
}
