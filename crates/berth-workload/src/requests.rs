//! Accounted resource demand.
//!
//! Quantities from definitions are mapped onto plain integers before any
//! arithmetic happens: cpu into thousandths of a core, everything else
//! into whole units (bytes for memory). All arithmetic saturates, so a
//! pathological definition yields a pinned value rather than a panic.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use berth_api::quantity::{Format, Quantity};
use berth_api::resource::{ResourceList, ResourceName};
use berth_api::workload::PodSpec;

/// Converts a quantity to its accounted integer form for `name`.
pub fn resource_value(name: &ResourceName, quantity: &Quantity) -> i64 {
    match name {
        ResourceName::Cpu => quantity.milli_value(),
        _ => quantity.value(),
    }
}

/// Inverse of [`resource_value`]: wraps an accounted integer back into a
/// quantity, in the suffix family conventional for `name`.
pub fn resource_quantity(name: &ResourceName, value: i64) -> Quantity {
    match name {
        ResourceName::Cpu => Quantity::from_milli(value),
        ResourceName::Memory | ResourceName::EphemeralStorage | ResourceName::HugePages(_) => {
            Quantity::new(value, Format::BinarySi)
        }
        ResourceName::Custom(_) => Quantity::new(value, Format::DecimalSi),
    }
}

/// Demand per resource in accounted integer units.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requests {
    items: BTreeMap<ResourceName, i64>,
}

impl Requests {
    pub fn from_list(list: &ResourceList) -> Self {
        let items = list
            .iter()
            .map(|(name, quantity)| (name.clone(), resource_value(name, quantity)))
            .collect();
        Requests { items }
    }

    /// Demand for one resource; resources never requested are zero.
    pub fn get(&self, name: &ResourceName) -> i64 {
        self.items.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ResourceName, i64> {
        self.items.iter()
    }

    /// Adds `other` resource by resource.
    pub fn add(&mut self, other: &Requests) {
        for (name, value) in &other.items {
            let entry = self.items.entry(name.clone()).or_insert(0);
            *entry = entry.saturating_add(*value);
        }
    }

    /// Lifts each resource to at least its value in `other`.
    pub fn set_max(&mut self, other: &Requests) {
        for (name, value) in &other.items {
            let entry = self.items.entry(name.clone()).or_insert(0);
            *entry = (*entry).max(*value);
        }
    }

    /// Multiplies every resource by `factor`.
    pub fn scale(&mut self, factor: i64) {
        for value in self.items.values_mut() {
            *value = value.saturating_mul(factor);
        }
    }
}

impl<'a> IntoIterator for &'a Requests {
    type Item = (&'a ResourceName, &'a i64);
    type IntoIter = btree_map::Iter<'a, ResourceName, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Demand of a single pod built from its template: container requests
/// summed, then lifted resource by resource to the largest init container
/// (init containers run one at a time, before the main ones), then pod
/// overhead on top.
pub fn pod_requests(spec: &PodSpec) -> Requests {
    let mut total = Requests::default();
    for container in &spec.containers {
        total.add(&Requests::from_list(&container.requests));
    }
    for container in &spec.init_containers {
        total.set_max(&Requests::from_list(&container.requests));
    }
    total.add(&Requests::from_list(&spec.overhead));
    total
}

// ── Tests ───────────────────────────────────────────────────────────────────
