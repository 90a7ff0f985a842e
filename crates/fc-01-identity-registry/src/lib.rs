//! # fc-01-identity-registry
//!
//! Identity and authority registry for the federated consensus core.
//!
//! ## Architecture
//!
//! The registry maps chain IDs to two kinds of record:
//!
//! - **Identity**: the cryptographic identity of a server. Holds the
//!   registration key, the current block-signing key and the matryoshka
//!   hash commitment used for forward-secure key rotation.
//! - **Authority**: eligibility and liveness of a federated or audit
//!   server. Status and the online flag are atomics so liveness updates
//!   from validation lanes only need the shared lock.
//!
//! Both maps sit behind one `parking_lot::RwLock`. Reads take the shared
//! lock, every mutation takes the exclusive lock. The registry is an
//! explicit object constructed once at node startup and shared through an
//! `Arc`; `IdentityRegistry::default()` is ready to use.
//!
//! ## Identity-management structures
//!
//! On-chain identity events arrive as signed structures (see
//! [`domain::structures`]). Key rotation and matryoshka updates are only
//! applied after the embedded signature verifies against the identity's
//! current authorizing key.
//!
//! ```text
//! apply_new_block_signing_key(s)
//!     ├── identity missing ──────────→ Err(ChainDoesNotExist)
//!     ├── signature not by current key → Err(Signature(..)), key untouched
//!     └── ok ──→ Identity replaced with the new signing key
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fc_01_identity_registry::{Identity, IdentityRegistry};
//!
//! let registry = IdentityRegistry::new();
//! registry.set_identity(Identity::new(chain_id, registration_key));
//! registry.create_authority(chain_id)?;
//! ```

pub mod domain;
pub mod registry;
pub mod snapshot;

pub use domain::{
    Authority, AuthorityStatus, Identity, IdentityChainStructure, NewBitcoinKeyStructure,
    NewBlockSigningKeyStruct, NewMatryoshkaHashStructure, RegisterIdentityStructure,
    RegisterServerManagementStructure, RegistryError, RegistryResult, ServerManagementStructure,
    SignedStructure,
};
pub use registry::IdentityRegistry;
pub use snapshot::{AuthorityRecord, RegistrySnapshot};
