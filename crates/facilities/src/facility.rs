//! Typed sub-limits with expiry and grace-period semantics.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{
    CreditLimitId, DomainError, DomainResult, Entity, FacilityId, Money, OrganizationId,
    money::{checked_sum, ensure_bounded, ensure_non_negative, percentage},
};

pub const DEFAULT_GRACE_PERIOD_DAYS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    InvoiceFinancing,
    TermLoan,
    Overdraft,
    Guarantee,
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FacilityType::InvoiceFinancing => "Invoice Financing",
            FacilityType::TermLoan => "Term Loan",
            FacilityType::Overdraft => "Overdraft",
            FacilityType::Guarantee => "Guarantee",
        };
        f.write_str(label)
    }
}

/// Sub-limit under a [`CreditLimitInfo`](crate::CreditLimitInfo).
///
/// A facility with `related_party_id` set is a counterparty facility: it was
/// carved out of `parent_facility_id` and its `allocated_limit` records the
/// earmarked size. On a base facility `allocated_limit` is the total earmarked
/// for counterparties, which is no longer available to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub credit_limit_id: CreditLimitId,
    pub facility_type: FacilityType,
    pub total_limit: Money,
    pub current_utilization: Money,
    pub review_end_date: DateTime<Utc>,
    pub grace_period_days: u32,
    pub related_party_id: Option<OrganizationId>,
    pub parent_facility_id: Option<FacilityId>,
    pub allocated_limit: Money,
}

/// Changes accepted by [`Facility::modify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityUpdate {
    pub total_limit: Option<Money>,
    pub review_end_date: Option<DateTime<Utc>>,
    pub grace_period_days: Option<u32>,
}

impl Facility {
    pub fn new(
        credit_limit_id: CreditLimitId,
        facility_type: FacilityType,
        total_limit: Money,
        review_end_date: DateTime<Utc>,
        grace_period_days: u32,
    ) -> Self {
        Self {
            id: FacilityId::new(),
            credit_limit_id,
            facility_type,
            total_limit,
            current_utilization: Decimal::ZERO,
            review_end_date,
            grace_period_days,
            related_party_id: None,
            parent_facility_id: None,
            allocated_limit: Decimal::ZERO,
        }
    }

    /// Empty facility earmarked for `party`, inheriting the parent's review terms.
    pub fn counterparty_of(parent: &Facility, party: OrganizationId) -> Self {
        Self {
            related_party_id: Some(party),
            parent_facility_id: Some(parent.id),
            ..Self::new(
                parent.credit_limit_id,
                parent.facility_type,
                Decimal::ZERO,
                parent.review_end_date,
                parent.grace_period_days,
            )
        }
    }

    pub fn is_counterparty(&self) -> bool {
        self.related_party_id.is_some()
    }

    /// End of the grace period; saturates for grace periods past the calendar range.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.review_end_date
            .checked_add_signed(Duration::days(i64::from(self.grace_period_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Headroom for new utilization or allocation; zero once expired.
    pub fn available_limit(&self, now: DateTime<Utc>) -> Money {
        if self.is_expired(now) {
            return Decimal::ZERO;
        }
        let earmarked = if self.is_counterparty() {
            Decimal::ZERO
        } else {
            self.allocated_limit
        };
        (self.total_limit - self.current_utilization - earmarked).max(Decimal::ZERO)
    }

    pub fn in_excess(&self, now: DateTime<Utc>) -> Money {
        if self.is_expired(now) {
            self.current_utilization
        } else {
            Decimal::ZERO
        }
    }

    pub fn utilization_percentage(&self) -> Decimal {
        percentage(self.current_utilization, self.total_limit)
    }

    /// Check that `delta` can be applied, without applying it.
    pub fn check_utilization(&self, delta: Money, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_bounded(delta, "utilization change")?;
        if delta <= Decimal::ZERO {
            return Ok(());
        }
        if self.is_expired(now) {
            return Err(DomainError::expired(format!(
                "{} facility {} expired at {}",
                self.facility_type,
                self.id,
                self.expires_at()
            )));
        }
        let available = self.available_limit(now);
        if delta > available {
            return Err(DomainError::limit_exceeded(format!(
                "{} facility {} needs {delta} but only {available} is available",
                self.facility_type, self.id
            )));
        }
        Ok(())
    }

    /// Apply a signed utilization change. Repayments floor at zero.
    pub fn apply_utilization(&mut self, delta: Money, now: DateTime<Utc>) -> DomainResult<Money> {
        self.check_utilization(delta, now)?;
        self.current_utilization = checked_sum(self.current_utilization, delta)?.max(Decimal::ZERO);
        Ok(self.current_utilization)
    }

    /// Move `total_limit` by `delta`; it may not drop below what is drawn or earmarked.
    pub fn adjust_total_limit(&mut self, delta: Money) -> DomainResult<Money> {
        ensure_bounded(delta, "limit adjustment")?;
        let new_total = ensure_bounded(checked_sum(self.total_limit, delta)?, "total limit")?;
        self.ensure_covers_commitments(new_total)?;
        self.total_limit = new_total;
        Ok(new_total)
    }

    pub fn modify(&mut self, update: &FacilityUpdate) -> DomainResult<()> {
        if let Some(total) = update.total_limit {
            ensure_non_negative(total, "total limit")?;
            self.ensure_covers_commitments(total)?;
        }
        if let Some(total) = update.total_limit {
            self.total_limit = total;
        }
        if let Some(date) = update.review_end_date {
            self.review_end_date = date;
        }
        if let Some(days) = update.grace_period_days {
            self.grace_period_days = days;
        }
        Ok(())
    }

    fn ensure_covers_commitments(&self, total: Money) -> DomainResult<()> {
        let committed = if self.is_counterparty() {
            self.current_utilization
        } else {
            checked_sum(self.current_utilization, self.allocated_limit)?
        };
        if total < committed {
            return Err(DomainError::limit_exceeded(format!(
                "total limit {total} is below the {committed} already committed on facility {}",
                self.id
            )));
        }
        Ok(())
    }
}

impl Entity for Facility {
    type Id = FacilityId;

    fn id(&self) -> FacilityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn facility(total: Money, utilization: Money, review_end: DateTime<Utc>) -> Facility {
        let mut f = Facility::new(
            CreditLimitId::new(),
            FacilityType::InvoiceFinancing,
            total,
            review_end,
            DEFAULT_GRACE_PERIOD_DAYS,
        );
        f.current_utilization = utilization;
        f
    }

    #[test]
    fn expired_facility_has_no_availability() {
        let now = Utc::now();
        let f = facility(dec!(250000), dec!(1000), now - Duration::days(10));

        assert!(f.is_expired(now));
        assert_eq!(f.available_limit(now), Decimal::ZERO);
        assert_eq!(f.in_excess(now), dec!(1000));
    }

    #[test]
    fn grace_period_keeps_facility_open() {
        let now = Utc::now();
        let f = facility(dec!(100), Decimal::ZERO, now - Duration::days(3));

        assert!(!f.is_expired(now));
        assert_eq!(f.available_limit(now), dec!(100));
    }

    #[test]
    fn increase_beyond_available_is_rejected() {
        let now = Utc::now();
        let mut f = facility(dec!(250000), dec!(240000), now + Duration::days(30));

        let err = f.apply_utilization(dec!(20000), now).unwrap_err();
        assert!(matches!(err, DomainError::LimitExceeded(_)));
        assert_eq!(f.current_utilization, dec!(240000));
    }

    #[test]
    fn increase_on_expired_facility_fails_but_repayment_succeeds() {
        let now = Utc::now();
        let mut f = facility(dec!(100), dec!(60), now - Duration::days(30));

        assert!(matches!(
            f.apply_utilization(dec!(1), now),
            Err(DomainError::Expired(_))
        ));
        assert_eq!(f.apply_utilization(dec!(-80), now).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn earmarked_amount_reduces_base_availability() {
        let now = Utc::now();
        let mut base = facility(dec!(1000), dec!(100), now + Duration::days(30));
        base.allocated_limit = dec!(300);
        assert_eq!(base.available_limit(now), dec!(600));

        let mut child = Facility::counterparty_of(&base, OrganizationId::new());
        child.total_limit = dec!(300);
        child.allocated_limit = dec!(300);
        assert_eq!(child.available_limit(now), dec!(300));
    }

    #[test]
    fn total_limit_cannot_drop_below_commitments() {
        let now = Utc::now();
        let mut f = facility(dec!(1000), dec!(400), now);
        f.allocated_limit = dec!(100);

        assert!(matches!(
            f.adjust_total_limit(dec!(-600)),
            Err(DomainError::LimitExceeded(_))
        ));
        assert_eq!(f.adjust_total_limit(dec!(-500)).unwrap(), dec!(500));

        let update = FacilityUpdate {
            total_limit: Some(dec!(450)),
            ..FacilityUpdate::default()
        };
        assert!(f.modify(&update).is_err());
        assert_eq!(f.total_limit, dec!(500));
    }

    #[test]
    fn oversized_deltas_are_rejected() {
        let now = Utc::now();
        let mut f = facility(dec!(1000), dec!(400), now + Duration::days(30));

        assert!(matches!(
            f.apply_utilization(-Decimal::MAX, now),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            f.adjust_total_limit(Decimal::MAX),
            Err(DomainError::InvalidAmount(_))
        ));
        assert_eq!(f.current_utilization, dec!(400));
        assert_eq!(f.total_limit, dec!(1000));
    }

    #[test]
    fn huge_grace_period_saturates_expiry() {
        let now = Utc::now();
        let mut f = facility(dec!(100), Decimal::ZERO, now);
        f.grace_period_days = u32::MAX;

        assert_eq!(f.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!f.is_expired(now));
    }

    #[test]
    fn utilization_percentage() {
        let f = facility(dec!(200), dec!(50), Utc::now());
        assert_eq!(f.utilization_percentage(), dec!(25));
    }
}
