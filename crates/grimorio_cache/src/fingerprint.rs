//! Context and template fingerprints.

use grimorio_core::{ContextSlice, VariableContext};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::warn;

/// Which part of the context feeds the cache fingerprint.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FingerprintScope {
    /// Hash the whole serialized context
    #[default]
    WholeContext,
    /// Hash only the slices the card can statically reach
    ReachableSlices,
}

/// SHA-256 digest rendered as lowercase hex.
///
/// Hashes serialize through `serde_json`, whose maps keep keys sorted, so
/// equal values always produce equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of the whole context.
    pub fn of_context(ctx: &VariableContext) -> Self {
        let mut hasher = Sha256::new();
        update_json(&mut hasher, ctx);
        Self::finish(hasher)
    }

    /// Fingerprint of the selected slices only.
    ///
    /// Absent slices still contribute their name, so a slice appearing or
    /// disappearing changes the fingerprint.
    pub fn of_slices(ctx: &VariableContext, slices: &BTreeSet<ContextSlice>) -> Self {
        let mut hasher = Sha256::new();
        for slice in slices {
            hasher.update(slice.to_string().as_bytes());
            hasher.update([0]);
            match ctx.slice_value(slice) {
                Some(value) => update_json(&mut hasher, &value),
                None => hasher.update([0xff]),
            }
            hasher.update([0]);
        }
        Self::finish(hasher)
    }

    /// Digest of template bodies, in order.
    pub fn of_bodies<'a>(bodies: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = Sha256::new();
        for body in bodies {
            hasher.update((body.len() as u64).to_le_bytes());
            hasher.update(body.as_bytes());
        }
        Self::finish(hasher)
    }

    /// Combine with another fingerprint, such as a template digest.
    pub fn with(&self, other: &Fingerprint) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher.update([0]);
        hasher.update(other.0.as_bytes());
        Self::finish(hasher)
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn finish(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn update_json<T: Serialize>(hasher: &mut Sha256, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => hasher.update(&bytes),
        Err(e) => warn!(error = %e, "Context could not be serialized for fingerprinting"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_fingerprint_is_stable() {
        let a = VariableContext::default().with_npc(json!({"nombre": "Gareth", "edad": 40}));
        let b = VariableContext::default().with_npc(json!({"edad": 40, "nombre": "Gareth"}));
        let c = VariableContext::default().with_npc(json!({"nombre": "Elena", "edad": 40}));

        assert_eq!(Fingerprint::of_context(&a), Fingerprint::of_context(&b));
        assert_ne!(Fingerprint::of_context(&a), Fingerprint::of_context(&c));
        assert_eq!(Fingerprint::of_context(&a).as_str().len(), 64);
    }

    #[test]
    fn test_slice_fingerprint_ignores_other_slices() {
        let slices: BTreeSet<_> = [ContextSlice::Npc].into_iter().collect();
        let a = VariableContext::default()
            .with_npc(json!({"nombre": "Gareth"}))
            .with_world(json!({"era": 1}));
        let b = a.clone().with_world(json!({"era": 2}));
        let c = a.clone().with_npc(json!({"nombre": "Elena"}));

        assert_eq!(Fingerprint::of_slices(&a, &slices), Fingerprint::of_slices(&b, &slices));
        assert_ne!(Fingerprint::of_slices(&a, &slices), Fingerprint::of_slices(&c, &slices));
    }

    #[test]
    fn test_absent_slice_differs_from_empty() {
        let slices: BTreeSet<_> = [ContextSlice::Session].into_iter().collect();
        let absent = VariableContext::default();
        let empty = VariableContext::default().with_session(json!({}));
        assert_ne!(
            Fingerprint::of_slices(&absent, &slices),
            Fingerprint::of_slices(&empty, &slices)
        );
    }

    #[test]
    fn test_body_digest_is_boundary_sensitive() {
        assert_ne!(Fingerprint::of_bodies(["ab", "c"]), Fingerprint::of_bodies(["a", "bc"]));
        assert_eq!(Fingerprint::of_bodies(["ab", "c"]), Fingerprint::of_bodies(["ab", "c"]));
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(FingerprintScope::default(), FingerprintScope::WholeContext);
        assert_eq!(FingerprintScope::ReachableSlices.to_string(), "reachable_slices");
        assert_eq!(
            "whole_context".parse::<FingerprintScope>().unwrap(),
            FingerprintScope::WholeContext
        );
    }
}
