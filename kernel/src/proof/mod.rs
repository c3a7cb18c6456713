//! Proof module: canonical hashing, digests, replay verification.
//!
//! Depends on `carrier` and `operators`.

pub mod canon;
pub mod digest;
pub mod hash;
pub mod hash_domain;
pub mod replay;
