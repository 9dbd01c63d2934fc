//! Credit limit and facility hierarchy.

pub mod credit_limit;
pub mod facility;
pub mod report;

pub use credit_limit::{CreditLimitInfo, FacilitySpec, REVIEW_CYCLE_MONTHS};
pub use facility::{DEFAULT_GRACE_PERIOD_DAYS, Facility, FacilityType, FacilityUpdate};
pub use report::{
    AllocationNode, FacilityNode, LimitTableRow, LimitTree, OrganizationLimitNode,
    ReceivedAllocation, RowVisibility,
};
