//! Content digests of states and plans.

use crate::carrier::world_state::WorldState;
use crate::operators::action::Action;
use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash};
use crate::proof::hash_domain::HashDomain;

/// Fingerprint of the mutable facts of `state`.
///
/// Static tables are not covered; two states of the same problem are equal
/// iff their fingerprints are.
///
/// # Errors
///
/// Returns [`CanonError`] if canonicalization fails.
pub fn state_fingerprint(state: &WorldState) -> Result<ContentHash, CanonError> {
    let bytes = canonical_json_bytes(&state.to_json())?;
    Ok(canonical_hash(HashDomain::StateFingerprint, &bytes))
}

/// Canonical JSON of a plan: an array of action wire forms.
///
/// # Errors
///
/// Returns [`CanonError`] if canonicalization fails.
pub fn plan_canonical_bytes(plan: &[Action]) -> Result<Vec<u8>, CanonError> {
    let value = serde_json::Value::Array(plan.iter().map(Action::to_json).collect());
    canonical_json_bytes(&value)
}

/// Digest of an ordered action sequence.
///
/// # Errors
///
/// Returns [`CanonError`] if canonicalization fails.
pub fn plan_digest(plan: &[Action]) -> Result<ContentHash, CanonError> {
    let bytes = plan_canonical_bytes(plan)?;
    Ok(canonical_hash(HashDomain::PlanDigest, &bytes))
}
