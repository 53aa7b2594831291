//! postcode-tui - A terminal dashboard for postcode scraping jobs
//!
//! This is the main entry point for the postcode-tui application.
//! It uses the Component Architecture pattern from ratatui; network work runs
//! on a tokio runtime and reaches the UI loop as events drained on each tick.

mod action;
mod app;
mod component;
mod components;
mod config;
mod format;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::tui::Tui;
use anyhow::Result;
use crossterm::event::Event;
use std::time::Duration;

fn main() -> Result<()> {
    let log_result = logging::init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Create app state
    let mut app = App::new(runtime.handle().clone());
    match log_result {
        Ok(path) => tracing::info!(log = %path.display(), "postcode-tui started"),
        Err(e) => app.error = Some(format!("Logging disabled: {}", e)),
    }
    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;
    drop(app);
    runtime.shutdown_timeout(Duration::from_millis(500));

    // Handle any errors
    if let Err(err) = result {
        tracing::error!(error = %err, "postcode-tui exited with an error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(e) = app.draw(frame, area) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        // Poll for events
        let event = tui.next_event()?;
        handle_event(app, event)?;
    }

    Ok(())
}

/// Apply one terminal event (if any), then a tick
///
/// The tick runs on every pass, including passes that handled an event.
fn handle_event(app: &mut App, event: Option<Event>) -> Result<()> {
    let action = match event {
        Some(Event::Key(key)) => app.handle_key_event(key)?,
        Some(Event::Mouse(mouse)) => app.handle_mouse_event(mouse)?,
        Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
        _ => None,
    };

    // Action might produce a follow-up action
    let mut current_action = action;
    while let Some(a) = current_action {
        current_action = app.update(a)?;
    }

    app.update(Action::Tick)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::json;
    use tokio::runtime::Handle;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_background_results_applied_during_key_input() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_postcodes": 7,
                "recent_entries": [],
                "region_counts": {}
            })))
            .mount(&server)
            .await;

        let config = Config {
            base_url: server.uri(),
            download_dir: std::env::temp_dir().display().to_string(),
            job_poll_secs: 1,
            stats_poll_secs: 30,
            request_timeout_secs: 5,
        };
        let mut app = App::with_config(Handle::current(), config);

        // Only key events arrive; no idle pass ever happens
        let scroll = Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        for _ in 0..250 {
            handle_event(&mut app, Some(scroll.clone())).unwrap();
            if app.domain.stats.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(app.domain.stats.as_ref().map(|s| s.total_records), Some(7));
    }
}
