//! Visibility-filtered limit reports.
//!
//! A viewer sees its own limits in full. For facilities another organization
//! has earmarked for the viewer, only the allocation itself is exposed, never
//! the provider's totals or other facilities. A bank viewer sees every limit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{CreditLimitId, FacilityId, Money, OrganizationId};
use scf_parties::{Organization, OrganizationDirectory};

use crate::credit_limit::CreditLimitInfo;
use crate::facility::{Facility, FacilityType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationNode {
    pub facility_id: FacilityId,
    pub counterparty_id: Option<OrganizationId>,
    pub counterparty_name: String,
    pub allocated_limit: Money,
    pub current_utilization: Money,
    pub available_limit: Money,
    pub is_expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityNode {
    pub facility_id: FacilityId,
    pub facility_type: FacilityType,
    pub total_limit: Money,
    pub current_utilization: Money,
    pub allocated_limit: Money,
    pub available_limit: Money,
    pub utilization_percentage: Decimal,
    pub review_end_date: DateTime<Utc>,
    pub grace_period_days: u32,
    pub is_expired: bool,
    pub in_excess: Money,
    pub allocations: Vec<AllocationNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationLimitNode {
    pub credit_limit_id: CreditLimitId,
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub master_limit: Money,
    pub total_utilization: Money,
    pub available_master_limit: Money,
    pub master_utilization_percentage: Decimal,
    pub facilities: Vec<FacilityNode>,
}

/// A limit another organization has earmarked for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedAllocation {
    pub facility_id: FacilityId,
    pub provider_id: OrganizationId,
    pub provider_name: String,
    pub facility_type: FacilityType,
    pub allocated_limit: Money,
    pub current_utilization: Money,
    pub available_limit: Money,
    pub review_end_date: DateTime<Utc>,
    pub is_expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitTree {
    pub viewer_id: OrganizationId,
    pub viewer_name: String,
    pub generated_at: DateTime<Utc>,
    pub limits: Vec<OrganizationLimitNode>,
    pub received: Vec<ReceivedAllocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowVisibility {
    Full,
    AllocationOnly,
}

/// One row of the flat tabular view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitTableRow {
    pub owner_name: String,
    pub facility_id: FacilityId,
    pub facility_type: FacilityType,
    pub counterparty_name: Option<String>,
    pub limit: Money,
    pub utilization: Money,
    pub available: Money,
    pub is_expired: bool,
    pub visibility: RowVisibility,
}

impl LimitTree {
    pub fn build<'a, D>(
        viewer: &Organization,
        credit_limits: impl IntoIterator<Item = &'a CreditLimitInfo>,
        directory: &D,
        now: DateTime<Utc>,
    ) -> Self
    where
        D: OrganizationDirectory + ?Sized,
    {
        let mut limits = Vec::new();
        let mut received = Vec::new();

        for info in credit_limits {
            if viewer.is_bank || info.organization_id == viewer.id {
                limits.push(organization_node(info, directory, now));
                continue;
            }
            received.extend(
                info.facilities()
                    .iter()
                    .filter(|f| f.related_party_id == Some(viewer.id))
                    .map(|f| ReceivedAllocation {
                        facility_id: f.id,
                        provider_id: info.organization_id,
                        provider_name: directory.name_of(info.organization_id),
                        facility_type: f.facility_type,
                        allocated_limit: f.allocated_limit,
                        current_utilization: f.current_utilization,
                        available_limit: f.available_limit(now),
                        review_end_date: f.review_end_date,
                        is_expired: f.is_expired(now),
                    }),
            );
        }

        limits.sort_by(|a, b| a.organization_name.cmp(&b.organization_name));
        received.sort_by(|a, b| a.provider_name.cmp(&b.provider_name));

        Self {
            viewer_id: viewer.id,
            viewer_name: viewer.name.clone(),
            generated_at: now,
            limits,
            received,
        }
    }

    /// Flatten the tree into table rows, parents before their allocations.
    pub fn rows(&self) -> Vec<LimitTableRow> {
        let mut rows = Vec::new();
        for org in &self.limits {
            for facility in &org.facilities {
                rows.push(LimitTableRow {
                    owner_name: org.organization_name.clone(),
                    facility_id: facility.facility_id,
                    facility_type: facility.facility_type,
                    counterparty_name: None,
                    limit: facility.total_limit,
                    utilization: facility.current_utilization,
                    available: facility.available_limit,
                    is_expired: facility.is_expired,
                    visibility: RowVisibility::Full,
                });
                rows.extend(facility.allocations.iter().map(|a| LimitTableRow {
                    owner_name: org.organization_name.clone(),
                    facility_id: a.facility_id,
                    facility_type: facility.facility_type,
                    counterparty_name: Some(a.counterparty_name.clone()),
                    limit: a.allocated_limit,
                    utilization: a.current_utilization,
                    available: a.available_limit,
                    is_expired: a.is_expired,
                    visibility: RowVisibility::Full,
                }));
            }
        }
        rows.extend(self.received.iter().map(|r| LimitTableRow {
            owner_name: r.provider_name.clone(),
            facility_id: r.facility_id,
            facility_type: r.facility_type,
            counterparty_name: Some(self.viewer_name.clone()),
            limit: r.allocated_limit,
            utilization: r.current_utilization,
            available: r.available_limit,
            is_expired: r.is_expired,
            visibility: RowVisibility::AllocationOnly,
        }));
        rows
    }
}

fn organization_node<D>(
    info: &CreditLimitInfo,
    directory: &D,
    now: DateTime<Utc>,
) -> OrganizationLimitNode
where
    D: OrganizationDirectory + ?Sized,
{
    let facilities = info.facilities();
    let mut nodes: Vec<FacilityNode> = facilities
        .iter()
        .filter(|f| !f.is_counterparty())
        .map(|f| facility_node(f, now))
        .collect();

    for child in facilities.iter().filter(|f| f.is_counterparty()) {
        let allocation = AllocationNode {
            facility_id: child.id,
            counterparty_id: child.related_party_id,
            counterparty_name: directory.display_name(child.related_party_id),
            allocated_limit: child.allocated_limit,
            current_utilization: child.current_utilization,
            available_limit: child.available_limit(now),
            is_expired: child.is_expired(now),
        };
        let parent = nodes
            .iter()
            .position(|n| Some(n.facility_id) == child.parent_facility_id)
            .or_else(|| {
                nodes
                    .iter()
                    .position(|n| n.facility_type == child.facility_type)
            });
        match parent {
            Some(index) => nodes[index].allocations.push(allocation),
            // Parent row is gone: show the allocation as a standalone facility.
            None => {
                let mut node = facility_node(child, now);
                node.allocations.push(allocation);
                nodes.push(node);
            }
        }
    }

    OrganizationLimitNode {
        credit_limit_id: info.id,
        organization_id: info.organization_id,
        organization_name: directory.name_of(info.organization_id),
        master_limit: info.master_limit,
        total_utilization: info.total_utilization(),
        available_master_limit: info.available_master_limit(),
        master_utilization_percentage: info.master_utilization_percentage(),
        facilities: nodes,
    }
}

fn facility_node(f: &Facility, now: DateTime<Utc>) -> FacilityNode {
    FacilityNode {
        facility_id: f.id,
        facility_type: f.facility_type,
        total_limit: f.total_limit,
        current_utilization: f.current_utilization,
        allocated_limit: f.allocated_limit,
        available_limit: f.available_limit(now),
        utilization_percentage: f.utilization_percentage(),
        review_end_date: f.review_end_date,
        grace_period_days: f.grace_period_days,
        is_expired: f.is_expired(now),
        in_excess: f.in_excess(now),
        allocations: Vec::new(),
    }
}
