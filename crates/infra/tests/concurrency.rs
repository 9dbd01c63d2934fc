//! Concurrent callers against one store must not overshoot limits or
//! double-post entries.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use scf_accounting::{JournalEntryHeader, JournalEntryLine, codes};
use scf_core::{Money, UserId};
use scf_infra::EngineConfig;
use scf_transactions::{Transaction, TransactionType};

use common::{start, world};

const THREADS: usize = 8;

#[test]
fn concurrent_fundings_never_exceed_facility() {
    let w = Arc::new(world(EngineConfig {
        auto_post: true,
        ..EngineConfig::default()
    }));
    // Eight fundings of 40,000 against 250,000: at most six fit.
    let invoices: Vec<_> = (0..THREADS)
        .map(|i| w.approved_invoice(dec!(40000) + Decimal::from(i) / dec!(100)))
        .collect();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = invoices
        .into_iter()
        .map(|invoice| {
            let w = Arc::clone(&w);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let amount = w.engine.registry.invoice(invoice).unwrap().amount;
                let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, amount, start())
                    .with_invoice(invoice);
                barrier.wait();
                w.engine.recorder.record_transaction(tx, None).is_ok()
            })
        })
        .collect();

    let succeeded = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, 6);
    assert!(w.utilization() <= dec!(250000));

    let tb = w.engine.journal.generate_trial_balance(None, w.user).unwrap();
    assert!(tb.is_balanced());
    assert!(w.engine.journal.verify_balances().unwrap().is_empty());
}

#[test]
fn concurrent_posts_apply_once() {
    let w = Arc::new(world(EngineConfig::default()));
    let accounts = w.engine.journal.accounts().unwrap();
    let id = |code: &str| accounts.iter().find(|a| a.code == code).unwrap().id;

    let entry = w
        .engine
        .journal
        .create_journal_entry(
            JournalEntryHeader::new("", start(), "Owner capital"),
            vec![
                JournalEntryLine::debit(id(codes::CASH), dec!(1000)),
                JournalEntryLine::credit(id(codes::SHARE_CAPITAL), dec!(1000)),
            ],
        )
        .unwrap();
    assert!(entry.reference.starts_with("MAN-"));

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let w = Arc::clone(&w);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                w.engine.journal.post_journal_entry(entry.id, UserId::new()).is_ok()
            })
        })
        .collect();

    let posted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(posted, 1);

    let cash: Money = w
        .engine
        .journal
        .account(id(codes::CASH))
        .unwrap()
        .balance();
    assert_eq!(cash, dec!(1000));
}

#[test]
fn concurrent_chart_initialization_seeds_once() {
    let w = Arc::new(world(EngineConfig::default()));
    let before = w.engine.journal.accounts().unwrap().len();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let w = Arc::clone(&w);
            thread::spawn(move || w.engine.journal.initialize_chart_of_accounts().unwrap())
        })
        .collect();
    let created: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(created, 0);
    assert_eq!(w.engine.journal.accounts().unwrap().len(), before);
}
