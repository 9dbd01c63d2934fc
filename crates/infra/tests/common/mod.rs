#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

use scf_core::{AccountId, FacilityId, FixedClock, InvoiceId, Money, OrganizationId, UserId};
use scf_facilities::{DEFAULT_GRACE_PERIOD_DAYS, FacilitySpec, FacilityType};
use scf_infra::{Engine, EngineConfig, InMemoryLedgerStore};
use scf_invoicing::{Invoice, InvoiceStatus};
use scf_parties::Organization;

pub fn start() -> DateTime<Utc> {
    "2025-06-02T09:00:00Z".parse().unwrap()
}

pub struct World {
    pub engine: Engine<InMemoryLedgerStore>,
    pub clock: Arc<FixedClock>,
    pub bank: OrganizationId,
    pub seller: OrganizationId,
    pub buyer: OrganizationId,
    pub facility: FacilityId,
    pub user: UserId,
}

/// Bank, seller and buyer; the seller holds a 1,000,000 master limit with a
/// 250,000 invoice-financing facility reviewed in 90 days.
pub fn world(config: EngineConfig) -> World {
    let clock = Arc::new(FixedClock::new(start()));
    let engine = Engine::new(Arc::new(InMemoryLedgerStore::new()), clock.clone(), config);
    engine.journal.initialize_chart_of_accounts().unwrap();

    let bank = engine
        .registry
        .upsert_organization(Organization::new("First Bank").bank())
        .unwrap();
    let seller = engine
        .registry
        .upsert_organization(Organization::new("MegaCorp Industries").seller())
        .unwrap();
    let buyer = engine
        .registry
        .upsert_organization(Organization::new("RetailCo").buyer())
        .unwrap();

    let info = engine
        .limits
        .create_credit_limit_with_facilities(
            seller,
            dec!(1000000),
            vec![FacilitySpec {
                facility_type: FacilityType::InvoiceFinancing,
                total_limit: dec!(250000),
                review_end_date: start() + Duration::days(90),
                grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            }],
            None,
        )
        .unwrap();
    let facility = info.facilities()[0].id;

    World {
        engine,
        clock,
        bank,
        seller,
        buyer,
        facility,
        user: UserId::new(),
    }
}

impl World {
    /// Store an approved invoice from the seller to the buyer.
    pub fn approved_invoice(&self, amount: Money) -> InvoiceId {
        let invoice = Invoice::new(
            format!("INV-{amount}"),
            amount,
            start(),
            start() + Duration::days(60),
        )
        .with_parties(self.seller, self.buyer)
        .with_status(InvoiceStatus::Approved);
        self.engine.registry.upsert_invoice(invoice).unwrap()
    }

    pub fn utilization(&self) -> Money {
        self.engine
            .limits
            .credit_limit_info(self.seller)
            .unwrap()
            .facility(self.facility)
            .unwrap()
            .current_utilization
    }

    pub fn account_id(&self, code: &str) -> AccountId {
        self.engine
            .journal
            .accounts()
            .unwrap()
            .into_iter()
            .find(|a| a.code == code)
            .map(|a| a.id)
            .unwrap()
    }

    pub fn account_balance(&self, code: &str) -> Money {
        self.engine.journal.account(self.account_id(code)).unwrap().balance()
    }
}
