//! Organization directory (banks, buyers, sellers).
//!
//! Organizations are owned by an external directory; the engine only reads
//! their identity and role flags.

pub mod organization;

pub use organization::{
    BANK_LABEL, ContactInfo, Organization, OrganizationDirectory, UNKNOWN_LABEL,
};
