//! Master credit limits and their facility collections.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{
    CreditLimitId, DomainError, DomainResult, Entity, FacilityId, Money, OrganizationId,
    money::{checked_sum, ensure_non_negative, ensure_positive, percentage},
};

use crate::facility::{Facility, FacilityType, FacilityUpdate};

/// Months between credit reviews for limits created on demand.
pub const REVIEW_CYCLE_MONTHS: u32 = 12;

/// Facility terms supplied when granting a limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitySpec {
    pub facility_type: FacilityType,
    pub total_limit: Money,
    pub review_end_date: DateTime<Utc>,
    pub grace_period_days: u32,
}

/// Financing privileges of one organization.
///
/// A `master_limit` of zero means no master ceiling is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLimitInfo {
    pub id: CreditLimitId,
    pub organization_id: OrganizationId,
    pub master_limit: Money,
    pub last_review_date: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
    facilities: Vec<Facility>,
}

impl CreditLimitInfo {
    pub fn new(organization_id: OrganizationId, master_limit: Money, now: DateTime<Utc>) -> Self {
        Self {
            id: CreditLimitId::new(),
            organization_id,
            master_limit,
            last_review_date: now,
            next_review_date: now
                .checked_add_months(Months::new(REVIEW_CYCLE_MONTHS))
                .unwrap_or(now),
            facilities: Vec::new(),
        }
    }

    /// Build a limit with its facilities in one step.
    ///
    /// When `ceiling` is given, the facilities' combined total may not exceed it.
    pub fn with_facilities(
        organization_id: OrganizationId,
        master_limit: Money,
        specs: &[FacilitySpec],
        ceiling: Option<Money>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_non_negative(master_limit, "master limit")?;
        let mut requested = Decimal::ZERO;
        for spec in specs {
            requested = checked_sum(requested, ensure_positive(spec.total_limit, "facility limit")?)?;
        }
        if let Some(ceiling) = ceiling {
            if requested > ceiling {
                return Err(DomainError::limit_exceeded(format!(
                    "facilities total {requested} exceeds ceiling {ceiling}"
                )));
            }
        }

        let mut info = Self::new(organization_id, master_limit, now);
        for spec in specs {
            info.add_facility(spec)?;
        }
        Ok(info)
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn require_facility(&self, id: FacilityId) -> DomainResult<&Facility> {
        self.facility(id)
            .ok_or_else(|| DomainError::not_found(format!("facility {id}")))
    }

    fn facility_mut(&mut self, id: FacilityId) -> DomainResult<&mut Facility> {
        self.facilities
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| DomainError::not_found(format!("facility {id}")))
    }

    /// The organization's own (non-counterparty) facility of `facility_type`.
    pub fn base_facility(&self, facility_type: FacilityType) -> Option<&Facility> {
        self.facilities
            .iter()
            .find(|f| f.facility_type == facility_type && !f.is_counterparty())
    }

    pub fn counterparty_facility(
        &self,
        facility_type: FacilityType,
        party: OrganizationId,
    ) -> Option<&Facility> {
        self.facilities
            .iter()
            .find(|f| f.facility_type == facility_type && f.related_party_id == Some(party))
    }

    /// Facility a drawdown against `counterparty` should consume: the
    /// earmarked one when present, otherwise the base facility.
    pub fn resolve_facility(
        &self,
        facility_type: FacilityType,
        counterparty: Option<OrganizationId>,
    ) -> Option<&Facility> {
        counterparty
            .and_then(|party| self.counterparty_facility(facility_type, party))
            .or_else(|| self.base_facility(facility_type))
    }

    pub fn total_utilization(&self) -> Money {
        self.facilities.iter().map(|f| f.current_utilization).sum()
    }

    pub fn available_master_limit(&self) -> Money {
        self.master_limit - self.total_utilization()
    }

    pub fn master_utilization_percentage(&self) -> Decimal {
        percentage(self.total_utilization(), self.master_limit)
    }

    pub fn add_facility(&mut self, spec: &FacilitySpec) -> DomainResult<FacilityId> {
        ensure_positive(spec.total_limit, "facility limit")?;
        let facility = Facility::new(
            self.id,
            spec.facility_type,
            spec.total_limit,
            spec.review_end_date,
            spec.grace_period_days,
        );
        let id = facility.id;
        self.facilities.push(facility);
        Ok(id)
    }

    pub fn modify_facility(&mut self, id: FacilityId, update: &FacilityUpdate) -> DomainResult<()> {
        self.facility_mut(id)?.modify(update)
    }

    pub fn adjust_facility_limit(&mut self, id: FacilityId, delta: Money) -> DomainResult<Money> {
        self.facility_mut(id)?.adjust_total_limit(delta)
    }

    /// Apply a signed utilization delta to one facility.
    ///
    /// Increases must fit the facility's availability and, when a master
    /// ceiling is set, the master limit. Nothing changes on failure.
    pub fn update_utilization(
        &mut self,
        id: FacilityId,
        delta: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Money> {
        self.require_facility(id)?.check_utilization(delta, now)?;

        if delta > Decimal::ZERO && self.master_limit > Decimal::ZERO {
            let projected = checked_sum(self.total_utilization(), delta)?;
            if projected > self.master_limit {
                return Err(DomainError::limit_exceeded(format!(
                    "master limit {} would be exceeded ({projected})",
                    self.master_limit
                )));
            }
        }

        self.facility_mut(id)?.apply_utilization(delta, now)
    }

    /// Grow (or create) the facility earmarked for `party` by `amount`,
    /// carving it out of the base facility of the same type.
    pub fn allocate_buyer_limit(
        &mut self,
        party: OrganizationId,
        facility_type: FacilityType,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<FacilityId> {
        let parent_id = self
            .base_facility(facility_type)
            .map(|f| f.id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "{facility_type} facility for organization {}",
                    self.organization_id
                ))
            })?;
        self.check_allocation(parent_id, party, amount, now)?;

        let existing = self.counterparty_facility(facility_type, party).map(|f| f.id);
        let child_id = match existing {
            Some(id) => id,
            None => {
                let child = Facility::counterparty_of(self.require_facility(parent_id)?, party);
                let id = child.id;
                self.facilities.push(child);
                id
            }
        };

        self.commit_allocation(parent_id, child_id, amount)?;
        Ok(child_id)
    }

    /// Earmark `amount` of `parent_id` for `party` as a new facility row.
    pub fn allocate_to_counterparty(
        &mut self,
        parent_id: FacilityId,
        party: OrganizationId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<FacilityId> {
        self.check_allocation(parent_id, party, amount, now)?;

        let child = Facility::counterparty_of(self.require_facility(parent_id)?, party);
        let child_id = child.id;
        self.facilities.push(child);

        self.commit_allocation(parent_id, child_id, amount)?;
        Ok(child_id)
    }

    fn check_allocation(
        &self,
        parent_id: FacilityId,
        party: OrganizationId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        ensure_positive(amount, "allocation")?;
        if party == self.organization_id {
            return Err(DomainError::validation(
                "an organization cannot allocate a limit to itself",
            ));
        }
        let parent = self.require_facility(parent_id)?;
        if parent.is_counterparty() {
            return Err(DomainError::validation(format!(
                "facility {parent_id} is already a counterparty allocation"
            )));
        }
        if parent.is_expired(now) {
            return Err(DomainError::expired(format!(
                "{} facility {parent_id} expired at {}",
                parent.facility_type,
                parent.expires_at()
            )));
        }
        let available = parent.available_limit(now);
        if amount > available {
            return Err(DomainError::limit_exceeded(format!(
                "cannot allocate {amount}; {available} available on facility {parent_id}"
            )));
        }
        Ok(())
    }

    fn commit_allocation(
        &mut self,
        parent_id: FacilityId,
        child_id: FacilityId,
        amount: Money,
    ) -> DomainResult<()> {
        let child = self.facility_mut(child_id)?;
        child.total_limit += amount;
        child.allocated_limit += amount;
        self.facility_mut(parent_id)?.allocated_limit += amount;
        Ok(())
    }
}

impl Entity for CreditLimitInfo {
    type Id = CreditLimitId;

    fn id(&self) -> CreditLimitId {
        self.id
    }
}
