//! End-to-end flows through the recorder, journal and limit services.

mod common;

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use scf_accounting::{JournalEntryStatus, codes};
use scf_core::{DomainError, UserId};
use scf_facilities::{FacilityType, FacilityUpdate};
use scf_infra::{EngineConfig, ServiceError};
use scf_invoicing::InvoiceStatus;
use scf_transactions::{Transaction, TransactionType};

use common::{start, world};

fn auto_post() -> EngineConfig {
    EngineConfig {
        auto_post: true,
        ..EngineConfig::default()
    }
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

#[test]
fn funding_consumes_facility_and_books_discount() {
    let w = world(auto_post());
    let invoice = w.approved_invoice(dec!(100000));

    let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(100000), start())
        .with_invoice(invoice)
        .with_rate(dec!(5));
    let recorded = w.engine.recorder.record_transaction(tx, Some(w.user)).unwrap();

    assert_eq!(recorded.facility_id, Some(w.facility));
    assert_eq!(recorded.utilization, Some(dec!(100000)));
    assert_eq!(recorded.invoice_status, Some(InvoiceStatus::Funded));
    assert_eq!(w.utilization(), dec!(100000));

    let entry = recorded.journal_entry.unwrap();
    assert_eq!(entry.status, JournalEntryStatus::Posted);
    assert!(entry.is_balanced());
    assert!(entry.reference.starts_with("FUND-20250602-"));

    let accounts = w.engine.journal.accounts().unwrap();
    let balance = |code: &str| {
        accounts
            .iter()
            .find(|a| a.code == code)
            .map(|a| a.balance())
            .unwrap()
    };
    assert_eq!(balance(codes::LOANS_TO_CUSTOMERS), dec!(100000));
    assert_eq!(balance(codes::CASH), dec!(-95000));
    assert_eq!(balance(codes::INTEREST_INCOME), dec!(5000));

    let invoice = w.engine.registry.invoice(invoice).unwrap();
    assert_eq!(invoice.funded_amount, Some(dec!(95000)));

    let tb = w.engine.journal.generate_trial_balance(None, w.user).unwrap();
    assert!(tb.is_balanced());
}

#[test]
fn funding_beyond_availability_changes_nothing() {
    let w = world(auto_post());
    w.engine
        .limits
        .update_utilization(w.facility, dec!(240000))
        .unwrap();
    let invoice = w.approved_invoice(dec!(20000));

    let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(20000), start())
        .with_invoice(invoice)
        .with_rate(dec!(2));
    let err = domain(w.engine.recorder.record_transaction(tx, None).unwrap_err());

    assert!(matches!(err, DomainError::LimitExceeded(_)));
    assert_eq!(w.utilization(), dec!(240000));
    assert!(w
        .engine
        .journal
        .list_journal_entries(Default::default(), None)
        .unwrap()
        .is_empty());
    assert_eq!(
        w.engine.registry.invoice(invoice).unwrap().status,
        InvoiceStatus::Approved
    );
    assert!(w.engine.recorder.transaction_history(w.seller, None).unwrap().is_empty());
}

#[test]
fn expired_facility_blocks_funding() {
    let w = world(auto_post());
    w.engine
        .limits
        .modify_facility(
            w.facility,
            FacilityUpdate {
                review_end_date: Some(start() - Duration::days(10)),
                ..FacilityUpdate::default()
            },
        )
        .unwrap();
    let info = w.engine.limits.credit_limit_info(w.seller).unwrap();
    let facility = info.facility(w.facility).unwrap();
    assert!(facility.is_expired(start()));
    assert_eq!(facility.available_limit(start()), Decimal::ZERO);

    let invoice = w.approved_invoice(dec!(1000));
    let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(1000), start())
        .with_invoice(invoice);
    let err = domain(w.engine.recorder.record_transaction(tx, None).unwrap_err());
    assert!(matches!(err, DomainError::Expired(_)));
}

#[test]
fn payments_release_utilization_and_settle_invoice() {
    let w = world(auto_post());
    let invoice = w.approved_invoice(dec!(50000));
    let fund = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(50000), start())
        .with_invoice(invoice)
        .with_rate(dec!(3));
    w.engine.recorder.record_transaction(fund, None).unwrap();

    let partial = Transaction::new(TransactionType::Payment, w.buyer, dec!(20000), start())
        .with_invoice(invoice);
    let recorded = w.engine.recorder.record_transaction(partial, None).unwrap();
    assert_eq!(recorded.invoice_status, Some(InvoiceStatus::PartiallyPaid));
    assert_eq!(w.utilization(), dec!(30000));

    let rest = Transaction::new(TransactionType::Payment, w.buyer, dec!(30000), start())
        .with_invoice(invoice);
    let recorded = w.engine.recorder.record_transaction(rest, None).unwrap();
    assert_eq!(recorded.invoice_status, Some(InvoiceStatus::FullyPaid));
    assert_eq!(w.utilization(), Decimal::ZERO);

    let overpay = Transaction::new(TransactionType::Payment, w.buyer, dec!(1), start())
        .with_invoice(invoice);
    let err = domain(w.engine.recorder.record_transaction(overpay, None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidState(_)));

    assert!(w.engine.journal.verify_balances().unwrap().is_empty());
}

#[test]
fn funding_draws_from_buyer_allocation_first() {
    let w = world(auto_post());
    let child = w
        .engine
        .limits
        .allocate_buyer_limit(w.seller, w.buyer, FacilityType::InvoiceFinancing, dec!(60000))
        .unwrap();

    let invoice = w.approved_invoice(dec!(50000));
    let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(50000), start())
        .with_invoice(invoice);
    let recorded = w.engine.recorder.record_transaction(tx, None).unwrap();

    assert_eq!(recorded.facility_id, Some(child));
    let info = w.engine.limits.credit_limit_info(w.seller).unwrap();
    assert_eq!(info.facility(child).unwrap().current_utilization, dec!(50000));
    assert_eq!(info.facility(w.facility).unwrap().current_utilization, Decimal::ZERO);
    assert_eq!(info.facility(w.facility).unwrap().available_limit(start()), dec!(190000));
}

#[test]
fn pending_entries_post_once() {
    let w = world(EngineConfig::default());
    let tx = Transaction::new(TransactionType::TreasuryFunding, w.bank, dec!(5000000), start());
    let entry = w
        .engine
        .recorder
        .record_transaction(tx, None)
        .unwrap()
        .journal_entry
        .unwrap();
    assert_eq!(entry.status, JournalEntryStatus::Pending);
    assert!(entry.reference.starts_with("TRSY-"));

    let poster = UserId::new();
    let posted = w.engine.journal.post_journal_entry(entry.id, poster).unwrap();
    assert_eq!(posted.posted_by, Some(poster));

    let err = domain(w.engine.journal.post_journal_entry(entry.id, poster).unwrap_err());
    assert!(matches!(err, DomainError::AlreadyPosted(_)));

    let summary = w.engine.journal.balance_summary().unwrap();
    assert_eq!(summary.assets, dec!(5000000));
    assert_eq!(summary.liabilities, dec!(5000000));
}

#[test]
fn fee_and_upload_transactions() {
    let w = world(auto_post());
    let invoice = w.approved_invoice(dec!(1000));

    let upload = Transaction::new(TransactionType::InvoiceUpload, w.seller, dec!(1000), start())
        .with_invoice(invoice);
    let recorded = w.engine.recorder.record_transaction(upload, None).unwrap();
    assert!(recorded.journal_entry.is_none());
    assert!(recorded.facility_id.is_none());

    let fee = Transaction::new(TransactionType::FeeCharge, w.seller, dec!(250), start())
        .with_description("Facility arrangement fee");
    let entry = w
        .engine
        .recorder
        .record_transaction(fee, None)
        .unwrap()
        .journal_entry
        .unwrap();
    assert_eq!(entry.description, "Facility arrangement fee");
    let detail = w.engine.journal.journal_entry(entry.id).unwrap();
    assert_eq!(detail.lines[0].account_code, codes::FEE_RECEIVABLE);
    assert_eq!(detail.lines[0].organization_name, "MegaCorp Industries");

    let history = w.engine.recorder.transaction_history(w.seller, None).unwrap();
    assert_eq!(history.len(), 2);
}

#[test]
fn limit_adjustment_moves_total_and_treasury() {
    let w = world(auto_post());

    let up = Transaction::new(TransactionType::LimitAdjustment, w.seller, dec!(50000), start());
    w.engine.recorder.record_transaction(up, None).unwrap();
    let info = w.engine.limits.credit_limit_info(w.seller).unwrap();
    assert_eq!(info.facility(w.facility).unwrap().total_limit, dec!(300000));

    w.engine
        .limits
        .update_utilization(w.facility, dec!(200000))
        .unwrap();
    let down = Transaction::new(TransactionType::LimitAdjustment, w.seller, dec!(-150000), start());
    let err = domain(w.engine.recorder.record_transaction(down, None).unwrap_err());
    assert!(matches!(err, DomainError::LimitExceeded(_)));

    let detail_count = w
        .engine
        .journal
        .list_journal_entries(Default::default(), None)
        .unwrap()
        .len();
    assert_eq!(detail_count, 1);
}

#[test]
fn missing_facility_is_tolerated_unless_required() {
    let lenient = world(auto_post());
    let buyer_invoice = lenient.approved_invoice(dec!(10));
    let tx = Transaction::new(TransactionType::InvoiceFunding, lenient.seller, dec!(10), start())
        .with_invoice(buyer_invoice)
        .with_facility_type(FacilityType::TermLoan);
    let recorded = lenient.engine.recorder.record_transaction(tx, None).unwrap();
    assert!(recorded.facility_id.is_none());
    assert!(recorded.journal_entry.is_some());

    let strict = world(EngineConfig {
        require_facility: true,
        ..auto_post()
    });
    let invoice = strict.approved_invoice(dec!(10));
    let tx = Transaction::new(TransactionType::InvoiceFunding, strict.seller, dec!(10), start())
        .with_invoice(invoice)
        .with_facility_type(FacilityType::TermLoan);
    let err = domain(strict.engine.recorder.record_transaction(tx, None).unwrap_err());
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[test]
fn reversal_restores_balances() {
    let w = world(auto_post());
    let tx = Transaction::new(TransactionType::TreasuryFunding, w.bank, dec!(1000), start());
    let entry = w
        .engine
        .recorder
        .record_transaction(tx, None)
        .unwrap()
        .journal_entry
        .unwrap();

    let reversal = w.engine.journal.reverse_journal_entry(entry.id, w.user).unwrap();
    assert_eq!(reversal.original.status, JournalEntryStatus::Reversed);
    assert_eq!(reversal.reversal.status, JournalEntryStatus::Posted);
    assert!(reversal.reversal.reference.starts_with("REV-"));

    let summary = w.engine.journal.balance_summary().unwrap();
    assert_eq!(summary.assets, Decimal::ZERO);
    assert!(w.engine.journal.verify_balances().unwrap().is_empty());
}

#[test]
fn trial_balance_as_of_past_date_replays_journal() {
    let w = world(auto_post());
    let first = Transaction::new(TransactionType::TreasuryFunding, w.bank, dec!(700), start());
    w.engine.recorder.record_transaction(first, None).unwrap();

    w.clock.advance(Duration::days(3));
    let later = Transaction::new(
        TransactionType::TreasuryFunding,
        w.bank,
        dec!(300),
        start() + Duration::days(3),
    );
    w.engine.recorder.record_transaction(later, None).unwrap();

    let past = w
        .engine
        .journal
        .generate_trial_balance(Some(start() + Duration::days(1)), w.user)
        .unwrap();
    assert!(past.replayed);
    assert_eq!(past.total_debits(), dec!(700));

    let current = w.engine.journal.generate_trial_balance(None, w.user).unwrap();
    assert!(!current.replayed);
    assert_eq!(current.total_debits(), dec!(1000));
}

#[test]
fn partial_funding_is_rejected_so_repayment_matches_principal() {
    let w = world(auto_post());
    let first = w.approved_invoice(dec!(100000));
    let second = w.approved_invoice(dec!(100001));

    let partial = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(50000), start())
        .with_invoice(first);
    let err = domain(w.engine.recorder.record_transaction(partial, None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidAmount(_)));
    assert_eq!(w.utilization(), Decimal::ZERO);
    assert_eq!(w.engine.registry.invoice(first).unwrap().status, InvoiceStatus::Approved);

    for (invoice, amount) in [(first, dec!(100000)), (second, dec!(100001))] {
        let fund = Transaction::new(TransactionType::InvoiceFunding, w.seller, amount, start())
            .with_invoice(invoice);
        w.engine.recorder.record_transaction(fund, None).unwrap();
    }
    assert_eq!(w.utilization(), dec!(200001));

    let pay = Transaction::new(TransactionType::Payment, w.buyer, dec!(100000), start())
        .with_invoice(first);
    let recorded = w.engine.recorder.record_transaction(pay, None).unwrap();
    assert_eq!(recorded.invoice_status, Some(InvoiceStatus::FullyPaid));

    assert_eq!(w.utilization(), dec!(100001));
    assert_eq!(w.account_balance(codes::LOANS_TO_CUSTOMERS), dec!(100001));
    assert!(w.engine.journal.verify_balances().unwrap().is_empty());
}

#[test]
fn oversized_amounts_fail_cleanly_and_the_engine_stays_usable() {
    let w = world(auto_post());
    let invoice = w.approved_invoice(dec!(1000));

    let huge = Transaction::new(TransactionType::InvoiceFunding, w.seller, Decimal::MAX, start())
        .with_invoice(invoice)
        .with_rate(dec!(50));
    let err = domain(w.engine.recorder.record_transaction(huge, None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidAmount(_)));

    let adjust = Transaction::new(TransactionType::LimitAdjustment, w.seller, Decimal::MAX, start());
    let err = domain(w.engine.recorder.record_transaction(adjust, None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidAmount(_)));

    let err = domain(
        w.engine
            .limits
            .update_utilization(w.facility, -Decimal::MAX)
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::InvalidAmount(_)));

    assert!(w.engine.journal.accounts().is_ok());
    assert_eq!(w.utilization(), Decimal::ZERO);

    let fund = Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(1000), start())
        .with_invoice(invoice)
        .with_rate(dec!(50));
    let recorded = w.engine.recorder.record_transaction(fund, None).unwrap();
    assert_eq!(recorded.utilization, Some(dec!(1000)));
}

#[test]
fn journal_failure_after_drawdown_rolls_back_the_whole_transaction() {
    let w = world(auto_post());
    let invoice = w.approved_invoice(dec!(80000));
    let cash = w.account_id(codes::CASH);
    w.engine.journal.set_account_active(cash, false).unwrap();

    let fund = || {
        Transaction::new(TransactionType::InvoiceFunding, w.seller, dec!(80000), start())
            .with_invoice(invoice)
            .with_rate(dec!(2))
    };
    let err = domain(w.engine.recorder.record_transaction(fund(), None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidState(_)));

    assert_eq!(w.utilization(), Decimal::ZERO);
    let stored = w.engine.registry.invoice(invoice).unwrap();
    assert_eq!(stored.status, InvoiceStatus::Approved);
    assert_eq!(stored.funded_amount, None);
    assert!(w.engine.recorder.transaction_history(w.seller, None).unwrap().is_empty());
    assert!(
        w.engine
            .journal
            .list_journal_entries(Default::default(), None)
            .unwrap()
            .is_empty()
    );
    assert_eq!(w.account_balance(codes::LOANS_TO_CUSTOMERS), Decimal::ZERO);

    w.engine.journal.set_account_active(cash, true).unwrap();
    let recorded = w.engine.recorder.record_transaction(fund(), None).unwrap();
    assert_eq!(recorded.utilization, Some(dec!(80000)));
    assert_eq!(recorded.invoice_status, Some(InvoiceStatus::Funded));
}
