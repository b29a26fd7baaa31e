use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A recoverable finding. The run continues with best-effort data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    ClasspathMiss {
        class: String,
    },
    ClasspathDecodeFailed {
        class: String,
        message: String,
    },
    /// Matched the getter shape outside the accessor ordering window.
    DemotedRecordGetter {
        class: String,
        method: String,
    },
    /// Linked, but not at the position its component was declared in.
    SuspiciousRecordGetter {
        class: String,
        method: String,
        expected: Option<String>,
        found: String,
    },
    DuplicateRecordClaim {
        class: String,
        component: String,
    },
    DanglingRecordComponent {
        class: String,
        component: String,
    },
    UnclaimedRecordComponents {
        class: String,
        components: Vec<String>,
    },
}

impl Anomaly {
    /// Stable snake_case name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::ClasspathMiss { .. } => "classpath_miss",
            Anomaly::ClasspathDecodeFailed { .. } => "classpath_decode_failed",
            Anomaly::DemotedRecordGetter { .. } => "demoted_record_getter",
            Anomaly::SuspiciousRecordGetter { .. } => "suspicious_record_getter",
            Anomaly::DuplicateRecordClaim { .. } => "duplicate_record_claim",
            Anomaly::DanglingRecordComponent { .. } => "dangling_record_component",
            Anomaly::UnclaimedRecordComponents { .. } => "unclaimed_record_components",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::ClasspathMiss { class } => write!(f, "{class} not found on classpath"),
            Anomaly::ClasspathDecodeFailed { class, message } => {
                write!(f, "could not decode classpath class {class}: {message}")
            }
            Anomaly::DemotedRecordGetter { class, method } => {
                write!(f, "demoting record getter {class};{method}")
            }
            Anomaly::SuspiciousRecordGetter {
                class,
                method,
                expected,
                found,
            } => write!(
                f,
                "suspicious getter {class};{method}: expected {} but got {found}",
                expected.as_deref().unwrap_or("<none>")
            ),
            Anomaly::DuplicateRecordClaim { class, component } => {
                write!(f, "duplicate assignment for record component {class};{component}")
            }
            Anomaly::DanglingRecordComponent { class, component } => {
                write!(f, "dangling record component {component} in class {class}")
            }
            Anomaly::UnclaimedRecordComponents { class, components } => write!(
                f,
                "record {class} still has {} unclaimed record getters ({})",
                components.len(),
                components.join(", ")
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    anomalies: Vec<Anomaly>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, anomaly: Anomaly) {
        warn!("{anomaly}");
        self.anomalies.push(anomaly);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.anomalies.extend(other.anomalies);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> + '_ {
        self.anomalies.iter()
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn into_vec(self) -> Vec<Anomaly> {
        self.anomalies
    }
}
