//! Normalized view of one cache snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::snapshot::{KeyRef, StripeId, NO_EXPIRY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey {
    pub namespace: String,
    pub key: String,
    pub value: String,
    pub ttl_seconds: i64,
    pub expired: bool,
    pub stripe_id: StripeId,
}

impl CacheKey {
    pub fn key_ref(&self) -> KeyRef {
        KeyRef::new(self.namespace.clone(), self.key.clone())
    }

    pub fn matches(&self, namespace: &str, key: &str) -> bool {
        self.namespace == namespace && self.key == key
    }

    /// Keys stored with TTL `-1` never expire.
    pub fn is_persistent(&self) -> bool {
        self.ttl_seconds == NO_EXPIRY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stripe {
    pub id: StripeId,
    /// Share of the total capacity; the service does not report it per stripe.
    pub capacity: f64,
    pub key_count: usize,
    /// Index 0 is the next eviction candidate, the last entry the most recently used.
    pub recency_order: Vec<KeyRef>,
}

impl Stripe {
    /// Fraction of the stripe in use, `0.0` when capacity is zero.
    pub fn occupancy(&self) -> f64 {
        if self.capacity > 0.0 {
            self.key_count as f64 / self.capacity
        } else {
            0.0
        }
    }

    pub fn eviction_candidate(&self) -> Option<&KeyRef> {
        self.recency_order.first()
    }

    pub fn most_recent(&self) -> Option<&KeyRef> {
        self.recency_order.last()
    }
}

/// Figures shown in the system overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOverview {
    pub total_capacity: u64,
    pub key_count: usize,
    pub stripe_count: usize,
    pub namespace_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Ascending by stripe id.
    pub stripes: Vec<Stripe>,
    pub all_keys: Vec<CacheKey>,
    pub total_capacity: u64,
}

impl ViewModel {
    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty() && self.all_keys.is_empty()
    }

    pub fn stripe(&self, id: StripeId) -> Option<&Stripe> {
        self.stripes.iter().find(|s| s.id == id)
    }

    pub fn find_key(&self, namespace: &str, key: &str) -> Option<&CacheKey> {
        self.all_keys.iter().find(|k| k.matches(namespace, key))
    }

    pub fn keys_in(&self, stripe_id: StripeId) -> impl Iterator<Item = &CacheKey> {
        self.all_keys.iter().filter(move |k| k.stripe_id == stripe_id)
    }

    /// Distinct namespaces, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        self.all_keys
            .iter()
            .map(|k| k.namespace.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn overview(&self) -> CacheOverview {
        CacheOverview {
            total_capacity: self.total_capacity,
            key_count: self.all_keys.len(),
            stripe_count: self.stripes.len(),
            namespace_count: self.namespaces().len(),
        }
    }

    /// True when every key belongs to exactly one listed stripe, each
    /// stripe's `key_count` matches, and each recency order names exactly
    /// the stripe's keys.
    pub fn is_consistent(&self) -> bool {
        let known: HashSet<StripeId> = self.stripes.iter().map(|s| s.id).collect();
        if self.all_keys.iter().any(|k| !known.contains(&k.stripe_id)) {
            return false;
        }

        let mut seen = HashSet::new();
        if !self.all_keys.iter().all(|k| seen.insert(k.key_ref())) {
            return false;
        }

        self.stripes.iter().all(|stripe| {
            let members: BTreeSet<KeyRef> = self.keys_in(stripe.id).map(CacheKey::key_ref).collect();
            let recency: BTreeSet<KeyRef> = stripe.recency_order.iter().cloned().collect();
            members.len() == stripe.key_count
                && recency.len() == stripe.recency_order.len()
                && members == recency
        })
    }
}
