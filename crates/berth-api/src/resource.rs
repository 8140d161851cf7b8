//! Resource names and request lists.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;

pub const HUGE_PAGES_PREFIX: &str = "hugepages-";

/// Name of a schedulable resource.
///
/// Well-known resources get their own variants. Hugepage resources keep
/// their page size (`hugepages-2Mi`); anything else, such as an extended
/// resource like `example.com/gpu`, is `Custom`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceName {
    Cpu,
    Memory,
    EphemeralStorage,
    HugePages(String),
    Custom(String),
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        match s {
            "cpu" => ResourceName::Cpu,
            "memory" => ResourceName::Memory,
            "ephemeral-storage" => ResourceName::EphemeralStorage,
            _ => match s.strip_prefix(HUGE_PAGES_PREFIX) {
                Some(size) => ResourceName::HugePages(size.to_string()),
                None => ResourceName::Custom(s.to_string()),
            },
        }
    }
}

impl From<String> for ResourceName {
    fn from(s: String) -> Self {
        ResourceName::from(s.as_str())
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> String {
        name.to_string()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceName::Cpu => f.write_str("cpu"),
            ResourceName::Memory => f.write_str("memory"),
            ResourceName::EphemeralStorage => f.write_str("ephemeral-storage"),
            ResourceName::HugePages(size) => write!(f, "{HUGE_PAGES_PREFIX}{size}"),
            ResourceName::Custom(name) => f.write_str(name),
        }
    }
}

/// Per-resource quantities, as written in container requests and pod
/// overhead. Ordered so that rendering and iteration are deterministic.
pub type ResourceList = BTreeMap<ResourceName, Quantity>;

// ── Tests ───────────────────────────────────────────────────────────────────
