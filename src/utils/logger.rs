use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::BridgeError;

/// Collects the fields the bridge logs (`bridge_id`, `context`,
/// `cache_key`, `event_name`, ...) as JSON attributes.
#[derive(Default)]
struct FieldCollector(Map<String, Value>);

impl FieldCollector {
    fn put(&mut self, field: &Field, value: Value) {
        self.0
            .insert(attribute_name(field.name()).to_string(), value);
    }
}

/// Attribute name for a logged field. Bridge fields are grouped under
/// `bridge.*`; anything else keeps its name.
fn attribute_name(field: &str) -> &str {
    match field {
        "event_name" => "event.name",
        "event_domain" => "event.domain",
        "bridge_id" => "bridge.id",
        "context" => "bridge.context",
        "cache_key" => "bridge.cache_key",
        "instance_type" => "bridge.instance_type",
        other => other,
    }
}

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::from(format!("{:?}", value)));
    }
}

/// One JSON line per event: `body` is the message, `attributes` the
/// bridge fields plus code location, `resource` the service identity.
#[derive(Clone)]
struct JsonLineFormatter {
    resource: Map<String, Value>,
}

impl JsonLineFormatter {
    fn new(config: &LoggingConfig) -> Self {
        let mut resource = Map::new();
        resource.insert("service.name".into(), Value::from(config.service_name.clone()));
        resource.insert(
            "service.version".into(),
            Value::from(config.service_version.clone()),
        );
        JsonLineFormatter { resource }
    }

    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn to_value(&self, event: &Event<'_>) -> Value {
        let metadata = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        let mut attributes = fields.0;

        let body = match attributes.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => metadata.name().to_string(),
        };
        attributes.insert("code.target".into(), Value::from(metadata.target()));
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".into(), Value::from(file));
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".into(), Value::from(line));
        }

        let mut root = Map::new();
        root.insert(
            "timestamp".into(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        root.insert("severity_text".into(), Value::from(metadata.level().as_str()));
        root.insert(
            "severity_number".into(),
            Value::from(Self::severity_number(metadata.level())),
        );
        root.insert("body".into(), Value::from(body));
        root.insert("resource".into(), Value::Object(self.resource.clone()));
        root.insert("attributes".into(), Value::Object(attributes));
        Value::Object(root)
    }
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let line = serde_json::to_string(&self.to_value(event)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, BridgeError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        other => Err(BridgeError::Config(format!(
            "invalid logging.level '{}', expected one of trace, debug, info, warn, error",
            other
        ))),
    }
}

/// Installs the global subscriber. `RUST_LOG` directives refine the
/// configured level; records from the `log` crate are forwarded.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BridgeError> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().event_format(JsonLineFormatter::new(config))),
        ),
        LogFormat::Console => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty()))
        }
    };
    installed.map_err(|e| BridgeError::Config(format!("failed to install logger: {}", e)))?;
    tracing_log::LogTracer::init()
        .map_err(|e| BridgeError::Config(format!("failed to bridge `log` records: {}", e)))
}
