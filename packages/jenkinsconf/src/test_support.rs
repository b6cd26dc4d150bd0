//! Helpers shared by unit tests.

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

struct WarningCollector(Arc<Mutex<Vec<String>>>);

struct FieldWriter(String);

impl Visit for FieldWriter {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

impl<S: Subscriber> Layer<S> for WarningCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut writer = FieldWriter(String::new());
        event.record(&mut writer);
        self.0.lock().unwrap().push(writer.0.trim_end().to_string());
    }
}

/// Run `f` and collect the warnings it emits, one `field=value` line each.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarningCollector(Arc::clone(&collected)));
    let result = tracing::subscriber::with_default(subscriber, f);
    let warnings = collected.lock().unwrap().clone();
    (result, warnings)
}
