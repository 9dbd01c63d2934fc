//! Credit limit and facility service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use scf_core::{
    Clock, DomainError, DomainResult, FacilityId, Money, OrganizationId, money::ensure_non_negative,
};
use scf_facilities::{
    CreditLimitInfo, FacilitySpec, FacilityType, FacilityUpdate, LimitTableRow, LimitTree,
};

use crate::config::EngineConfig;
use crate::error::ServiceResult;
use crate::store::{LedgerState, LedgerStore};

pub struct LimitService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl<S> Clone for LimitService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: LedgerStore> LimitService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn credit_limit_info(&self, organization_id: OrganizationId) -> ServiceResult<CreditLimitInfo> {
        Ok(self
            .store
            .read(|state| state.credit_limit(organization_id).cloned())??)
    }

    /// Grant a master limit with its facilities in one unit of work.
    #[tracing::instrument(skip(self, facilities), fields(facilities = facilities.len()))]
    pub fn create_credit_limit_with_facilities(
        &self,
        organization_id: OrganizationId,
        master_limit: Money,
        facilities: Vec<FacilitySpec>,
        ceiling: Option<Money>,
    ) -> ServiceResult<CreditLimitInfo> {
        let now = self.clock.now();
        let info = self.store.transact(|state| {
            state.organization(organization_id)?;
            let info = CreditLimitInfo::with_facilities(
                organization_id,
                master_limit,
                &facilities,
                ceiling,
                now,
            )?;
            state.insert_credit_limit(info.clone())?;
            Ok(info)
        })?;
        tracing::info!(
            organization_id = %organization_id,
            credit_limit_id = %info.id,
            master_limit = %master_limit,
            "credit limit created"
        );
        Ok(info)
    }

    /// Add a facility, creating the organization's credit limit on demand.
    ///
    /// `master_limit` only applies when the credit limit is created here.
    #[tracing::instrument(skip(self))]
    pub fn add_facility(
        &self,
        organization_id: OrganizationId,
        facility_type: FacilityType,
        total_limit: Money,
        review_end_date: DateTime<Utc>,
        grace_period_days: Option<u32>,
        master_limit: Money,
    ) -> ServiceResult<FacilityId> {
        let now = self.clock.now();
        let spec = FacilitySpec {
            facility_type,
            total_limit,
            review_end_date,
            grace_period_days: grace_period_days.unwrap_or(self.config.default_grace_days),
        };
        let id = self.store.transact(|state| {
            state.organization(organization_id)?;
            if !state.has_credit_limit(organization_id) {
                ensure_non_negative(master_limit, "master limit")?;
                state.insert_credit_limit(CreditLimitInfo::new(organization_id, master_limit, now))?;
            }
            state.update_credit_limit(organization_id, |info| info.add_facility(&spec))
        })?;
        tracing::info!(
            organization_id = %organization_id,
            facility_id = %id,
            %facility_type,
            total_limit = %total_limit,
            "facility added"
        );
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub fn modify_facility(&self, facility_id: FacilityId, update: FacilityUpdate) -> ServiceResult<()> {
        self.store.transact(|state| {
            let owner = state.facility_owner(facility_id)?;
            state.update_credit_limit(owner, |info| info.modify_facility(facility_id, &update))
        })?;
        tracing::info!(facility_id = %facility_id, "facility modified");
        Ok(())
    }

    /// Carve `amount` for `buyer_id` out of the seller's base facility.
    #[tracing::instrument(skip(self))]
    pub fn allocate_buyer_limit(
        &self,
        seller_id: OrganizationId,
        buyer_id: OrganizationId,
        facility_type: FacilityType,
        amount: Money,
    ) -> ServiceResult<FacilityId> {
        let now = self.clock.now();
        let id = self.store.transact(|state| {
            ensure_counterparties(state, seller_id, buyer_id)?;
            state.update_credit_limit(seller_id, |info| {
                info.allocate_buyer_limit(buyer_id, facility_type, amount, now)
            })
        })?;
        tracing::info!(
            seller_id = %seller_id,
            buyer_id = %buyer_id,
            facility_id = %id,
            amount = %amount,
            "buyer limit allocated"
        );
        Ok(id)
    }

    /// Earmark part of `parent_id` for `party_id` as a new facility.
    #[tracing::instrument(skip(self))]
    pub fn allocate_to_counterparty(
        &self,
        parent_id: FacilityId,
        party_id: OrganizationId,
        amount: Money,
    ) -> ServiceResult<FacilityId> {
        let now = self.clock.now();
        let id = self.store.transact(|state| {
            let owner = state.facility_owner(parent_id)?;
            ensure_counterparties(state, owner, party_id)?;
            state.update_credit_limit(owner, |info| {
                info.allocate_to_counterparty(parent_id, party_id, amount, now)
            })
        })?;
        tracing::info!(
            parent_id = %parent_id,
            party_id = %party_id,
            facility_id = %id,
            amount = %amount,
            "limit allocated to counterparty"
        );
        Ok(id)
    }

    /// Apply a signed utilization change; returns the new utilization.
    #[tracing::instrument(skip(self))]
    pub fn update_utilization(&self, facility_id: FacilityId, delta: Money) -> ServiceResult<Money> {
        let now = self.clock.now();
        let utilization = self
            .store
            .transact(|state| update_utilization_in(state, facility_id, delta, now))?;
        tracing::info!(
            facility_id = %facility_id,
            delta = %delta,
            utilization = %utilization,
            "facility utilization updated"
        );
        Ok(utilization)
    }

    pub fn limit_tree(&self, viewer_id: OrganizationId) -> ServiceResult<LimitTree> {
        let now = self.clock.now();
        let tree = self.store.read(|state| {
            let viewer = state.organization(viewer_id)?;
            Ok::<_, DomainError>(LimitTree::build(
                viewer,
                state.credit_limits(),
                &state.organizations,
                now,
            ))
        })??;
        tracing::debug!(
            viewer_id = %viewer_id,
            limits = tree.limits.len(),
            received = tree.received.len(),
            "limit tree generated"
        );
        Ok(tree)
    }

    pub fn limit_table(&self, viewer_id: OrganizationId) -> ServiceResult<Vec<LimitTableRow>> {
        Ok(self.limit_tree(viewer_id)?.rows())
    }
}

fn ensure_counterparties(
    state: &LedgerState,
    owner_id: OrganizationId,
    party_id: OrganizationId,
) -> DomainResult<()> {
    let owner = state.organization(owner_id)?;
    let party = state.organization(party_id)?;
    if !owner.accepts_counterparty(party) {
        return Err(DomainError::validation(format!(
            "{} is not an eligible counterparty of {}",
            party.name, owner.name
        )));
    }
    Ok(())
}

pub(crate) fn update_utilization_in(
    state: &mut LedgerState,
    facility_id: FacilityId,
    delta: Money,
    now: DateTime<Utc>,
) -> DomainResult<Money> {
    let owner = state.facility_owner(facility_id)?;
    state.update_credit_limit(owner, |info| info.update_utilization(facility_id, delta, now))
}
