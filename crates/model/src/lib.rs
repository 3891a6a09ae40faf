//! Shared JSON document model for the orchestrator deployment toolchain.
//!
//! `JsonValue` is `serde_json::Value` built with the `preserve_order`
//! feature, so object key insertion order survives load -> merge ->
//! serialize. The canonical serializer (`to_canonical_string`) sorts keys
//! and indents by 4 spaces, and is only ever applied at the final emission
//! boundary.

mod canonical;
mod error;

pub use canonical::to_canonical_string;
pub use error::Error;

pub type JsonValue = serde_json::Value;
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A fully-rendered orchestrator application document: a JSON object that is
/// expected (but not yet guaranteed, until `id()` is called) to carry an
/// `id` field. Arbitrary other keys are preserved verbatim.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Application(pub JsonObject);

impl Application {
    pub fn from_value(value: JsonValue) -> Result<Self, Error> {
        match value {
            JsonValue::Object(obj) => Ok(Application(obj)),
            other => Err(Error::Config(format!(
                "expected an application object, found {other}"
            ))),
        }
    }

    pub fn id(&self) -> Result<&str, Error> {
        self.0
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Config("application is missing a string \"id\"".to_string()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert("id".to_string(), JsonValue::String(id.into()));
    }

    /// The wire payload may encode `instances` as either a JSON integer or a
    /// JSON string; both are accepted.
    pub fn instances(&self) -> Option<i64> {
        match self.0.get("instances")? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.0
            .get("dependencies")
            .and_then(JsonValue::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_dependencies(&mut self, deps: Vec<String>) {
        self.0.insert(
            "dependencies".to_string(),
            JsonValue::Array(deps.into_iter().map(JsonValue::String).collect()),
        );
    }

    pub fn ports(&self) -> Option<&Vec<JsonValue>> {
        self.0.get("ports").and_then(JsonValue::as_array)
    }

    pub fn port_definitions(&self) -> Option<&Vec<JsonValue>> {
        self.0.get("portDefinitions").and_then(JsonValue::as_array)
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }

    pub fn as_value(&self) -> &JsonObject {
        &self.0
    }
}

/// A group of applications and nested subgroups, keyed by a slash-path id.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub apps: Option<Vec<Application>>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Group {
            id: id.into(),
            groups: Vec::new(),
            apps: None,
        }
    }
}

/// A task's health check result, as returned by the orchestrator.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HealthCheckResult {
    pub alive: bool,
}

/// A single running (or starting) instance of an application.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Task {
    #[serde(rename = "appId")]
    pub app_id: String,
    pub state: String,
    pub version: String,
    #[serde(rename = "healthCheckResults")]
    pub health_check_results: Option<Vec<HealthCheckResult>>,
}

impl Task {
    /// A task is healthy iff no `healthCheckResults` entry reports `alive: false`.
    pub fn is_healthy(&self) -> bool {
        self.health_check_results
            .as_ref()
            .map_or(true, |results| results.iter().all(|r| r.alive))
    }

    pub fn is_running(&self) -> bool {
        self.state == "TASK_RUNNING"
    }
}

/// The JSON body returned by the orchestrator for a single application,
/// nested under `{"app": ...}`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ObservedApp {
    pub version: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub spec: JsonObject,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct GetAppResponse {
    pub app: ObservedApp,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Deployment {
    #[serde(rename = "affectedApps", default)]
    pub affected_apps: Vec<String>,
}
