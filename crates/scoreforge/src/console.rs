//! Console output for scoring events.
//!
//! Provides a `tracing` layer that prints the structured events emitted by
//! the scoring crates, one line per event.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::OnceLock;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "scoreforge_scoring=info,scoreforge_core=info";

/// Initializes console output.
///
/// Safe to call multiple times; only the first call has effect. `RUST_LOG`
/// replaces the default filter, e.g. `RUST_LOG=scoreforge_scoring=debug`
/// also prints session builds.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ScoringConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats scoring events.
pub struct ScoringConsoleLayer;

impl<S: Subscriber> Layer<S> for ScoringConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("scoreforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let line = format_event(*metadata.level(), &visitor);
        if *metadata.level() <= Level::WARN {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            name => self.fields.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        match field.name() {
            "event" => self.event = Some(text.trim_matches('"').to_string()),
            "message" => self.message = Some(text),
            name => self.fields.push((name, text)),
        }
    }
}

fn format_event(level: Level, visitor: &EventVisitor) -> String {
    let mut line = format!("[scoreforge] {:>5}", level);
    if let Some(event) = &visitor.event {
        let _ = write!(line, " {}", event);
    }
    if let Some(message) = &visitor.message {
        let _ = write!(line, " {}", message);
    }
    for (name, value) in &visitor.fields {
        let _ = write!(line, " {}={}", name, value);
    }
    line
}
