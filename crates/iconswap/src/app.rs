//! Line-oriented front end for the icon controller.
//!
//! Reads one command per line, forwards it to the controller and prints the
//! state changes and outcomes the controller publishes.

use iconswap_core::{ControllerEvent, IconSelectionController, SelectionState, CUSTOM_ICON};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// How often pending completions are drained while waiting for input.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
Commands:
  list              show the bundled icons
  select <icon>     switch to a bundled icon (or 'Custom')
  load <path>       use a PNG, JPEG or SVG file as the icon
  status            show the current selection
  help              show this help
  quit              exit";

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the catalog with the current icon marked.
    List,
    /// Select a catalog icon or the custom sentinel.
    Select(String),
    /// Load a dropped file as the custom icon.
    Load(String),
    /// Show the current selection.
    Status,
    /// Show the command list.
    Help,
    /// Exit after in-flight changes finish.
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match (verb.to_ascii_lowercase().as_str(), rest) {
            ("list" | "ls", _) => Self::List,
            ("status", _) => Self::Status,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit" | "q", _) => Self::Quit,
            ("custom", _) => Self::Select(CUSTOM_ICON.to_string()),
            ("select" | "use", "") => return Err("select needs an icon name".to_string()),
            ("select" | "use", icon) => Self::Select(icon.to_string()),
            ("load" | "drop", "") => return Err("load needs a file path".to_string()),
            ("load" | "drop", path) => Self::Load(path.trim_matches('"').to_string()),
            (other, _) => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// The view: owns the controller and renders its events.
pub struct IconSwapApp {
    controller: IconSelectionController,
    events: UnboundedReceiver<ControllerEvent>,
}

impl IconSwapApp {
    /// Wrap a controller that has not been initialized yet.
    pub fn new(mut controller: IconSelectionController) -> Self {
        let events = controller.subscribe();
        Self { controller, events }
    }

    /// Run until `quit` or end of input, printing everything rendered.
    pub async fn run(&mut self, mut input: UnboundedReceiver<String>) {
        self.controller.initialize();
        println!("{HELP}");
        self.print_pending();

        loop {
            match tokio::time::timeout(POLL_INTERVAL, input.recv()).await {
                Ok(Some(line)) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => {}
            }
            self.controller.process_completions();
            self.print_pending();
        }

        // Let in-flight icon changes finish before exiting.
        while self.controller.next_completion().await.is_some() {}
        self.print_pending();
        tracing::info!("iconswap exiting");
    }

    /// Handle one input line. Returns `false` when the user asked to quit.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                println!("{message}");
                return true;
            }
        };

        tracing::debug!(?command, "Command received");
        match command {
            Command::List => println!("{}", self.list()),
            Command::Select(icon) => {
                self.controller.select(&icon);
            }
            Command::Load(path) => {
                self.controller.load_custom_icon_in_background(&path);
            }
            Command::Status => println!("{}", self.status()),
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }

    /// Bundled icons with the current one marked.
    pub fn list(&self) -> String {
        let current = self.controller.current().as_str();
        self.controller
            .catalog()
            .entries()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(CUSTOM_ICON))
            .map(|id| {
                let marker = if id == current { '*' } else { ' ' };
                format!("{marker} {id}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One-line summary of the controller state.
    pub fn status(&self) -> String {
        let mut status = format!(
            "{} (adapter: {})",
            describe(&self.controller.state()),
            self.controller.adapter_name()
        );
        if let Some(asset) = self.controller.custom_asset() {
            let (w, h) = asset.dimensions();
            status.push_str(&format!(
                ", custom {} {w}x{h} from {}",
                asset.format(),
                asset.source().display()
            ));
        }
        if self.controller.pending() > 0 {
            status.push_str(&format!(", {} pending", self.controller.pending()));
        }
        status
    }

    /// Render every event published since the last call.
    pub fn render_pending(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match event {
                ControllerEvent::SelectionChanged(state) => lines.push(describe(&state)),
                ControllerEvent::Outcome(result) => lines.push(result.message()),
            }
        }
        lines
    }

    fn print_pending(&mut self) {
        for line in self.render_pending() {
            println!("{line}");
        }
    }
}

fn describe(state: &SelectionState) -> String {
    match state {
        SelectionState::Catalog(id) => format!("Selected: {id}"),
        SelectionState::PendingCustom => {
            format!("Selected: {CUSTOM_ICON} (drop an image with 'load <path>')")
        }
        SelectionState::Custom => format!("Selected: {CUSTOM_ICON}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconswap_core::services::platform::{DockIconAdapter, LiveIcon};
    use iconswap_core::{IconCatalog, IconDecoder, IconResources, MemoryStore};
    use std::sync::Arc;

    fn app() -> IconSwapApp {
        let resources = Arc::new(IconResources::in_memory());
        resources.register("AppIcon", image::RgbaImage::new(2, 2));
        resources.register("AppIcon 2", image::RgbaImage::new(2, 2));
        let adapter = DockIconAdapter::new(resources, Arc::new(LiveIcon::new()), "AppIcon");
        let controller = IconSelectionController::new(
            IconCatalog::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(adapter),
            tokio::runtime::Handle::current(),
        )
        .with_decoder(IconDecoder::new(16));
        IconSwapApp::new(controller)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(Command::parse("LIST"), Ok(Some(Command::List)));
        assert_eq!(
            Command::parse("select AppIcon 2"),
            Ok(Some(Command::Select("AppIcon 2".into())))
        );
        assert_eq!(Command::parse("custom"), Ok(Some(Command::Select("Custom".into()))));
        assert_eq!(
            Command::parse("load \"/tmp/my icon.png\""),
            Ok(Some(Command::Load("/tmp/my icon.png".into())))
        );
        assert!(Command::parse("select").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_select_renders_state_and_outcome() {
        let mut app = app();
        assert_eq!(app.render_pending(), vec!["Selected: AppIcon"]);

        assert!(app.handle_line("select AppIcon 2"));
        assert_eq!(
            app.render_pending(),
            vec!["Selected: AppIcon 2", "App icon changed successfully to AppIcon 2!"]
        );
        assert!(app.list().contains("* AppIcon 2"));
        assert!(app.status().starts_with("Selected: AppIcon 2 (adapter: dock)"));
    }

    #[tokio::test]
    async fn test_bad_drop_is_reported() {
        let mut app = app();
        app.render_pending();

        app.handle_line("load picture.bmp");
        assert_eq!(app.render_pending(), vec!["Invalid icon: unsupported format"]);
        assert!(!app.status().contains("pending"));
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let mut app = app();
        assert!(!app.handle_line("quit"));
    }
}
