//! Randomized funding and repayment sequences against one facility.

mod common;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use scf_accounting::codes;
use scf_core::{DomainError, InvoiceId, Money};
use scf_infra::EngineConfig;
use scf_transactions::{Transaction, TransactionType};

use common::{start, world};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Utilization and the loan book both track the face amount still owed
    /// on funded invoices, and running balances never drift from the journal.
    #[test]
    fn fundings_and_repayments_keep_limits_and_books_consistent(
        steps in prop::collection::vec((1u32..120_000u32, 1u32..=100u32, any::<bool>()), 1..16)
    ) {
        let w = world(EngineConfig {
            auto_post: true,
            ..EngineConfig::default()
        });
        let mut outstanding: Vec<(InvoiceId, Money)> = Vec::new();

        for (step, (amount, pay_percent, fund)) in steps.into_iter().enumerate() {
            if fund || outstanding.is_empty() {
                let amount = Decimal::from(amount);
                let invoice = w.approved_invoice(amount);
                let tx = Transaction::new(TransactionType::InvoiceFunding, w.seller, amount, start())
                    .with_invoice(invoice)
                    .with_rate(dec!(4.5));
                match w.engine.recorder.record_transaction(tx, None) {
                    Ok(_) => outstanding.push((invoice, amount)),
                    Err(err) => prop_assert!(matches!(
                        err.as_domain(),
                        Some(DomainError::LimitExceeded(_))
                    )),
                }
            } else {
                let slot = step % outstanding.len();
                let (invoice, due) = outstanding[slot];
                let payment = (due * Decimal::from(pay_percent) / Decimal::ONE_HUNDRED).round_dp(2);
                if payment.is_zero() {
                    continue;
                }
                let tx = Transaction::new(TransactionType::Payment, w.buyer, payment, start())
                    .with_invoice(invoice);
                w.engine.recorder.record_transaction(tx, None).unwrap();
                if payment == due {
                    outstanding.swap_remove(slot);
                } else {
                    outstanding[slot].1 = due - payment;
                }
            }

            let owed: Money = outstanding.iter().map(|(_, due)| *due).sum();
            prop_assert_eq!(w.utilization(), owed);
            prop_assert!(w.utilization() <= dec!(250000));
            prop_assert_eq!(w.account_balance(codes::LOANS_TO_CUSTOMERS), owed);
            prop_assert!(w.engine.journal.verify_balances().unwrap().is_empty());
        }
    }
}
