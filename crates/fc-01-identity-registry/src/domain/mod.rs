//! Domain layer: registry records, signed identity structures and errors.

pub mod entities;
pub mod error;
pub mod structures;

pub use entities::{Authority, AuthorityStatus, Identity};
pub use error::{RegistryError, RegistryResult};
pub use structures::{
    IdentityChainStructure, NewBitcoinKeyStructure, NewBlockSigningKeyStruct,
    NewMatryoshkaHashStructure, RegisterIdentityStructure, RegisterServerManagementStructure,
    ServerManagementStructure, SignedStructure,
};
