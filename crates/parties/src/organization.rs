use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use scf_core::{Entity, OrganizationId};

/// Placeholder shown when a record is attributed to the bank's own book.
pub const BANK_LABEL: &str = "Bank";

/// Placeholder shown when a referenced organization cannot be found.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Contact information for an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Party identity. Role flags are not mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub tax_id: String,
    #[serde(default)]
    pub contact: ContactInfo,
    pub is_buyer: bool,
    pub is_seller: bool,
    pub is_bank: bool,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OrganizationId::new(),
            name: name.into(),
            tax_id: String::new(),
            contact: ContactInfo::default(),
            is_buyer: false,
            is_seller: false,
            is_bank: false,
        }
    }

    pub fn buyer(mut self) -> Self {
        self.is_buyer = true;
        self
    }

    pub fn seller(mut self) -> Self {
        self.is_seller = true;
        self
    }

    pub fn bank(mut self) -> Self {
        self.is_bank = true;
        self
    }

    /// Human-readable role, e.g. "Buyer/Seller".
    pub fn role_label(&self) -> &'static str {
        if self.is_bank {
            "Bank"
        } else if self.is_buyer && self.is_seller {
            "Buyer/Seller"
        } else if self.is_buyer {
            "Buyer"
        } else if self.is_seller {
            "Seller"
        } else {
            "None"
        }
    }

    /// Whether `other` may hold a facility earmarked by `self`.
    ///
    /// A pure buyer deals with sellers, a pure seller with buyers; dual-role
    /// organizations deal with either. Banks and `self` are never counterparties.
    pub fn accepts_counterparty(&self, other: &Organization) -> bool {
        if other.id == self.id || other.is_bank {
            return false;
        }
        match (self.is_buyer, self.is_seller) {
            (true, false) => other.is_seller,
            (false, true) => other.is_buyer,
            _ => other.is_buyer || other.is_seller,
        }
    }
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> OrganizationId {
        self.id
    }
}

/// Lookup boundary for organizations.
pub trait OrganizationDirectory {
    fn organization(&self, id: OrganizationId) -> Option<&Organization>;

    /// Name for an optional attribution: "Bank" when `None`, "Unknown" when missing.
    fn display_name(&self, id: Option<OrganizationId>) -> String {
        match id {
            None => BANK_LABEL.to_string(),
            Some(id) => self
                .organization(id)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        }
    }

    /// Name of a referenced organization, "Unknown" when missing.
    fn name_of(&self, id: OrganizationId) -> String {
        self.display_name(Some(id))
    }
}

impl OrganizationDirectory for HashMap<OrganizationId, Organization> {
    fn organization(&self, id: OrganizationId) -> Option<&Organization> {
        self.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(orgs: &[Organization]) -> HashMap<OrganizationId, Organization> {
        orgs.iter().map(|o| (o.id, o.clone())).collect()
    }

    #[test]
    fn seller_sees_only_buyers_as_counterparties() {
        let seller = Organization::new("ACME Corp").seller();
        let buyer = Organization::new("BigBuy Inc").buyer();
        let other_seller = Organization::new("Supply Solutions").seller();
        let bank = Organization::new("First Bank").bank().buyer();

        assert!(seller.accepts_counterparty(&buyer));
        assert!(!seller.accepts_counterparty(&other_seller));
        assert!(!seller.accepts_counterparty(&bank));
        assert!(!seller.accepts_counterparty(&seller));
    }

    #[test]
    fn dual_role_sees_both_sides() {
        let both = Organization::new("Trading House").buyer().seller();
        let buyer = Organization::new("Buyer").buyer();
        let seller = Organization::new("Seller").seller();
        assert!(both.accepts_counterparty(&buyer));
        assert!(both.accepts_counterparty(&seller));
        assert_eq!(both.role_label(), "Buyer/Seller");
    }

    #[test]
    fn display_name_degrades_to_placeholders() {
        let acme = Organization::new("ACME Corp").seller();
        let dir = directory(&[acme.clone()]);

        assert_eq!(dir.display_name(None), BANK_LABEL);
        assert_eq!(dir.display_name(Some(acme.id)), "ACME Corp");
        assert_eq!(dir.display_name(Some(OrganizationId::new())), UNKNOWN_LABEL);
    }
}
