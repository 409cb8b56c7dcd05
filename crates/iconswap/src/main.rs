//! iconswap - preview and switch the application icon.

mod app;

use app::IconSwapApp;
use iconswap_core::logging::{init_logging, LogConfig};
use iconswap_core::IconSwapState;
use std::io::BufRead;

fn main() {
    // Initialize logging before IconSwapState so startup is traced
    let log_config = LogConfig::new(iconswap_core::logging::log_dir());
    let _logging_guard = init_logging(log_config);

    tracing::info!("Starting iconswap");

    let state = match IconSwapState::new() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize IconSwapState");
            let info = e.to_error_info();
            eprintln!("{}: {}", info.error_type, info.message);
            if let Some(hint) = info.hint {
                eprintln!("Hint: {hint}");
            }
            std::process::exit(1);
        }
    };

    // Stdin is read on its own thread; lines are forwarded to the UI task.
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut app = IconSwapApp::new(state.controller());
    state.block_on(app.run(rx));
}
