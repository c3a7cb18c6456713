//! Typed domain separators for canonical hashing.
//!
//! Every hash computation selects a domain via [`HashDomain`]. The enum,
//! `as_bytes()`, `ALL`, and `Display` are generated from one macro
//! invocation, so adding a domain is a single change here.

/// Declares `HashDomain` enum, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used
        /// as a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    // -----------------------------------------------------------------------
    // Kernel
    // -----------------------------------------------------------------------

    /// Mutable facts of a `WorldState`.
    StateFingerprint => b"SKYPLAN::STATE_FINGERPRINT::V1\0",

    /// Ordered action sequence of a plan.
    PlanDigest => b"SKYPLAN::PLAN_DIGEST::V1\0",

    /// Canonical form of an `ActionRegistryV1`.
    ActionRegistry => b"SKYPLAN::ACTION_REGISTRY::V1\0",

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// `SearchPolicyV1` snapshot.
    SearchPolicy => b"SKYPLAN::SEARCH_POLICY::V1\0",

    /// `RefinementTraceV1` event stream.
    RefinementTrace => b"SKYPLAN::REFINEMENT_TRACE::V1\0",

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    /// Effective `PlannerConfig`.
    PlannerConfig => b"SKYPLAN::PLANNER_CONFIG::V1\0",
}
