//! # View Model Normalizer
//!
//! Turns one [`RawSnapshot`] into a [`ViewModel`].
//!
//! The snapshot carries two maps keyed by stripe id: the key records and the
//! recency (LRU) lists. Either may list stripes the other omits, so stripes are
//! built from the union of both id sets, in numeric order.
//!
//! Cross-reference problems between the two maps are reported as
//! [`ConsistencyIssue`]s next to the view instead of being repaired. The view
//! itself is still complete and usable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use cacheforge_types::{CacheKey, KeyRecord, KeyRef, RawSnapshot, Stripe, StripeId, ViewModel};

/// Output of one normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSnapshot {
    pub view: ViewModel,
    pub issues: Vec<ConsistencyIssue>,
}

impl NormalizedSnapshot {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    /// A stripe's recency list does not name exactly its keys.
    RecencyMismatch {
        stripe_id: StripeId,
        missing_from_recency: Vec<KeyRef>,
        missing_from_keys: Vec<KeyRef>,
    },
    /// The same entry is listed under more than one stripe.
    DuplicateKey { key: KeyRef, stripe_ids: Vec<StripeId> },
    /// A stripe id that is not a non-negative integer; its data is skipped.
    InvalidStripeId { raw: String },
    /// Several raw ids parse to the same stripe; their entries are merged.
    DuplicateStripeId { id: StripeId, raw: Vec<String> },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::RecencyMismatch {
                stripe_id,
                missing_from_recency,
                missing_from_keys,
            } => {
                write!(f, "Stripe {} LRU order disagrees with its keys", stripe_id)?;
                if !missing_from_recency.is_empty() {
                    write!(f, "; not in LRU: {}", join(missing_from_recency))?;
                }
                if !missing_from_keys.is_empty() {
                    write!(f, "; unknown in LRU: {}", join(missing_from_keys))?;
                }
                Ok(())
            }
            ConsistencyIssue::DuplicateKey { key, stripe_ids } => {
                let ids: Vec<String> = stripe_ids.iter().map(|id| id.to_string()).collect();
                write!(f, "Key [{}] listed in stripes {}", key, ids.join(", "))
            }
            ConsistencyIssue::InvalidStripeId { raw } => {
                write!(f, "Ignoring stripe with invalid id '{}'", raw)
            }
            ConsistencyIssue::DuplicateStripeId { id, raw } => {
                let raw: Vec<String> = raw.iter().map(|r| format!("'{}'", r)).collect();
                write!(f, "Stripe {} listed under ids {}; entries merged", id, raw.join(", "))
            }
        }
    }
}

fn join(keys: &[KeyRef]) -> String {
    keys.iter().map(|k| format!("[{}]", k)).collect::<Vec<_>>().join(", ")
}

/// Parses stripe ids, dropping the ones that are not integers.
///
/// Raw ids naming the same number (`"1"`, `"01"`) are merged in raw-id order.
fn parse_ids<'a, T>(
    map: &'a BTreeMap<String, Vec<T>>,
    issues: &mut Vec<ConsistencyIssue>,
    reported: &mut BTreeSet<String>,
) -> BTreeMap<StripeId, Vec<&'a T>> {
    let mut parsed: BTreeMap<StripeId, Vec<&'a T>> = BTreeMap::new();
    let mut aliases: BTreeMap<StripeId, Vec<String>> = BTreeMap::new();
    for (raw, items) in map {
        match raw.trim().parse::<StripeId>() {
            Ok(id) => {
                parsed.entry(id).or_default().extend(items.iter());
                aliases.entry(id).or_default().push(raw.clone());
            }
            Err(_) => {
                if reported.insert(raw.clone()) {
                    issues.push(ConsistencyIssue::InvalidStripeId { raw: raw.clone() });
                }
            }
        }
    }

    for (id, raw) in aliases {
        if raw.len() > 1 {
            let issue = ConsistencyIssue::DuplicateStripeId { id, raw };
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
    }
    parsed
}

/// Build the view model for one snapshot.
///
/// Pure and deterministic: the same snapshot always yields an equal result.
pub fn normalize(raw: &RawSnapshot) -> NormalizedSnapshot {
    let mut issues = Vec::new();
    let mut reported = BTreeSet::new();
    let keys = parse_ids(&raw.keys, &mut issues, &mut reported);
    let lru = parse_ids(&raw.lru, &mut issues, &mut reported);

    let ids: BTreeSet<StripeId> = keys.keys().chain(lru.keys()).copied().collect();
    let capacity = match ids.len() {
        0 => raw.capacity as f64,
        n => raw.capacity as f64 / n as f64,
    };

    let mut stripes = Vec::with_capacity(ids.len());
    let mut all_keys = Vec::new();
    let mut owners: BTreeMap<KeyRef, Vec<StripeId>> = BTreeMap::new();

    for id in ids {
        let records: &[&KeyRecord] = keys.get(&id).map(Vec::as_slice).unwrap_or_default();
        let recency_order: Vec<KeyRef> = lru
            .get(&id)
            .map(|refs| refs.iter().map(|r| (*r).clone()).collect())
            .unwrap_or_default();

        let members: BTreeSet<KeyRef> = records.iter().map(|r| r.key_ref()).collect();
        let listed: BTreeSet<KeyRef> = recency_order.iter().cloned().collect();
        if members != listed {
            issues.push(ConsistencyIssue::RecencyMismatch {
                stripe_id: id,
                missing_from_recency: members.difference(&listed).cloned().collect(),
                missing_from_keys: listed.difference(&members).cloned().collect(),
            });
        }

        for record in records {
            owners.entry(record.key_ref()).or_default().push(id);
            all_keys.push(CacheKey {
                namespace: record.namespace.clone(),
                key: record.key.clone(),
                value: record.value.clone(),
                ttl_seconds: record.ttl,
                expired: record.expired,
                stripe_id: id,
            });
        }

        stripes.push(Stripe {
            id,
            capacity,
            key_count: records.len(),
            recency_order,
        });
    }

    for (key, stripe_ids) in owners {
        if stripe_ids.len() > 1 {
            issues.push(ConsistencyIssue::DuplicateKey { key, stripe_ids });
        }
    }

    NormalizedSnapshot {
        view: ViewModel {
            stripes,
            all_keys,
            total_capacity: raw.capacity,
        },
        issues,
    }
}
