//! external-dns TXT registry ownership
//!
//! - [`codec`]: parse and rewrite ownership marker strings
//! - [`naming`]: derive TXT registry record names for a hostname
//! - [`matcher`]: find ownership records in a zone snapshot and test owners

pub mod codec;
pub mod matcher;
pub mod naming;

pub use codec::{OwnershipMarker, parse_owner, rewrite_owner};
pub use matcher::{
    OwnershipClaim, lookup_ownership_records, owned_records, owner_claims, ownership_claims,
};
pub use naming::{TxtNames, plain_name, typed_name};
