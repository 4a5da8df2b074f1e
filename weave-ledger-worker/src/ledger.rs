// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::ledger_db::LedgerDB;
use parking_lot::RwLock;
use weave_db_exports::ShareableStore;
use weave_ledger_exports::{
    LedgerController, LedgerError, MilestoneDiff, Output, OutputId, Spent,
};
use weave_models::address::Address;
use weave_models::milestone::MilestoneIndex;

/// The injected ledger handle.
///
/// The inner `RwLock` is the process-wide ledger gate: every read holds it
/// shared, [`LedgerController::apply_confirmation`] holds it exclusively.
/// Collaborators that need a stable multi-read view take the gate themselves
/// through the controller they were given.
#[derive(Debug)]
pub struct UtxoLedger {
    db: RwLock<LedgerDB>,
}

impl UtxoLedger {
    /// Creates a `UtxoLedger` over the given backing store.
    pub fn new(store: ShareableStore) -> Self {
        UtxoLedger {
            db: RwLock::new(LedgerDB::new(store)),
        }
    }
}

impl LedgerController for UtxoLedger {
    fn get_output(&self, output_id: &OutputId) -> Result<Option<Output>, LedgerError> {
        self.db.read().get_output(output_id)
    }

    fn is_output_unspent(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        self.db.read().is_output_unspent(output_id)
    }

    fn unspent_outputs_for_address(&self, address: &Address) -> Result<Vec<Output>, LedgerError> {
        self.db.read().unspent_outputs_for_address(address)
    }

    fn spent_outputs_for_address(&self, address: &Address) -> Result<Vec<Spent>, LedgerError> {
        self.db.read().spent_outputs_for_address(address)
    }

    fn get_milestone_diff(
        &self,
        index: MilestoneIndex,
    ) -> Result<Option<MilestoneDiff>, LedgerError> {
        self.db.read().get_milestone_diff(index)
    }

    fn apply_confirmation(
        &self,
        index: MilestoneIndex,
        new_outputs: &[Output],
        new_spents: &[Spent],
    ) -> Result<(), LedgerError> {
        self.db.write().apply_confirmation(index, new_outputs, new_spents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use weave_db_exports::{StoreConfig, StoreController};
    use weave_db_worker::WeaveDB;
    use weave_hash::Hash;
    use weave_models::transaction_id::TransactionId;

    fn transaction_id(fill: u8) -> TransactionId {
        TransactionId(Hash::from_bytes(&[fill; 32]).unwrap())
    }

    fn address(fill: u8) -> Address {
        Address(Hash::from_bytes(&[fill; 32]).unwrap())
    }

    fn output(tx_fill: u8, index: u16, addr_fill: u8, amount: u64) -> Output {
        Output::new(
            OutputId::new(transaction_id(tx_fill), index),
            address(addr_fill),
            amount,
        )
    }

    fn init_test_ledger() -> (UtxoLedger, ShareableStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db: ShareableStore = Arc::new(
            WeaveDB::new(StoreConfig {
                path: temp_dir.path().to_path_buf(),
            })
            .unwrap(),
        );
        (UtxoLedger::new(Arc::clone(&db)), db, temp_dir)
    }

    /// Dumps every key/value pair of the store, for snapshot comparison.
    fn snapshot(db: &ShareableStore) -> Vec<(Vec<u8>, Vec<u8>)> {
        db.prefix_iterator(&[])
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_confirm_then_spend() {
        let (ledger, _db, _temp) = init_test_ledger();
        let created = output(0x01, 0, 0xAA, 500);

        ledger
            .apply_confirmation(MilestoneIndex(1), &[created], &[])
            .unwrap();
        assert_eq!(ledger.get_output(&created.id).unwrap(), Some(created));
        assert!(ledger.is_output_unspent(&created.id).unwrap());

        let spent = Spent::new(created, transaction_id(0x02));
        let followup = output(0x02, 0, 0xBB, 500);
        ledger
            .apply_confirmation(MilestoneIndex(2), &[followup], &[spent])
            .unwrap();

        // the record survives the spend, the unspent marker does not
        assert_eq!(ledger.get_output(&created.id).unwrap(), Some(created));
        assert!(!ledger.is_output_unspent(&created.id).unwrap());
        assert!(ledger.is_output_unspent(&followup.id).unwrap());
    }

    #[test]
    fn test_spend_within_same_confirmation() {
        let (ledger, _db, _temp) = init_test_ledger();
        let created = output(0x01, 0, 0xAA, 500);
        let spent = Spent::new(created, transaction_id(0x02));

        // an output created and consumed by the same milestone is valid
        ledger
            .apply_confirmation(MilestoneIndex(1), &[created], &[spent])
            .unwrap();
        assert!(!ledger.is_output_unspent(&created.id).unwrap());
        assert_eq!(
            ledger
                .spent_outputs_for_address(&address(0xAA))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_address_queries() {
        let (ledger, _db, _temp) = init_test_ledger();
        let queried = address(0xAA);
        let out_a = output(0x01, 0, 0xAA, 100);
        let out_b = output(0x02, 3, 0xAA, 200);
        let other = output(0x03, 0, 0xBB, 300);

        ledger
            .apply_confirmation(MilestoneIndex(1), &[out_a, out_b, other], &[])
            .unwrap();
        let unspent = ledger.unspent_outputs_for_address(&queried).unwrap();
        assert_eq!(unspent, vec![out_a, out_b]);
        assert!(ledger.spent_outputs_for_address(&queried).unwrap().is_empty());

        let spender = transaction_id(0x04);
        ledger
            .apply_confirmation(MilestoneIndex(2), &[], &[Spent::new(out_a, spender)])
            .unwrap();
        assert_eq!(
            ledger.unspent_outputs_for_address(&queried).unwrap(),
            vec![out_b]
        );
        let spents = ledger.spent_outputs_for_address(&queried).unwrap();
        assert_eq!(spents, vec![Spent::new(out_a, spender)]);
        // the other address is untouched
        assert_eq!(
            ledger.unspent_outputs_for_address(&address(0xBB)).unwrap(),
            vec![other]
        );
    }

    #[test]
    fn test_unknown_output() {
        let (ledger, _db, _temp) = init_test_ledger();
        let id = OutputId::new(transaction_id(0x77), 0);
        assert_eq!(ledger.get_output(&id).unwrap(), None);
        assert!(matches!(
            ledger.is_output_unspent(&id),
            Err(LedgerError::OutputNotFound(_))
        ));
    }

    #[test]
    fn test_failed_confirmation_has_no_effect() {
        let (ledger, db, _temp) = init_test_ledger();
        let existing = output(0x01, 0, 0xAA, 100);
        ledger
            .apply_confirmation(MilestoneIndex(1), &[existing], &[])
            .unwrap();
        let before = snapshot(&db);

        // the second spent references an output that exists nowhere, so the
        // whole call must leave the store byte-identical
        let fresh = output(0x02, 0, 0xBB, 200);
        let phantom = Spent::new(output(0x66, 9, 0xCC, 1), transaction_id(0x03));
        let result = ledger.apply_confirmation(
            MilestoneIndex(2),
            &[fresh],
            &[Spent::new(existing, transaction_id(0x03)), phantom],
        );
        assert!(matches!(result, Err(LedgerError::OutputNotFound(_))));

        assert_eq!(snapshot(&db), before);
        assert!(ledger.is_output_unspent(&existing.id).unwrap());
        assert_eq!(ledger.get_output(&fresh.id).unwrap(), None);
        assert!(ledger.get_milestone_diff(MilestoneIndex(2)).unwrap().is_none());
    }

    #[test]
    fn test_milestone_diff_records_supplied_order() {
        let (ledger, _db, _temp) = init_test_ledger();
        // deliberately not in key order
        let out_a = output(0x05, 1, 0xAA, 10);
        let out_b = output(0x01, 0, 0xBB, 20);
        let out_c = output(0x03, 2, 0xCC, 30);
        ledger
            .apply_confirmation(MilestoneIndex(3), &[out_a, out_b, out_c], &[])
            .unwrap();
        let spender = transaction_id(0x09);
        ledger
            .apply_confirmation(
                MilestoneIndex(4),
                &[],
                &[Spent::new(out_c, spender), Spent::new(out_a, spender)],
            )
            .unwrap();

        let diff = ledger
            .get_milestone_diff(MilestoneIndex(3))
            .unwrap()
            .unwrap();
        assert_eq!(diff.index, MilestoneIndex(3));
        assert_eq!(diff.created_outputs, vec![out_a.id, out_b.id, out_c.id]);
        assert!(diff.consumed_outputs.is_empty());

        let diff = ledger
            .get_milestone_diff(MilestoneIndex(4))
            .unwrap()
            .unwrap();
        assert!(diff.created_outputs.is_empty());
        assert_eq!(
            diff.consumed_outputs,
            vec![(out_c.address, out_c.id), (out_a.address, out_a.id)]
        );

        assert!(ledger.get_milestone_diff(MilestoneIndex(5)).unwrap().is_none());
    }

    #[test]
    fn test_unspent_and_spent_are_mutually_exclusive() {
        let (ledger, _db, _temp) = init_test_ledger();
        let queried = address(0xAA);
        let out = output(0x01, 0, 0xAA, 100);
        ledger
            .apply_confirmation(MilestoneIndex(1), &[out], &[])
            .unwrap();

        let in_unspent =
            |l: &UtxoLedger| l.unspent_outputs_for_address(&queried).unwrap().contains(&out);
        let in_spent = |l: &UtxoLedger| {
            l.spent_outputs_for_address(&queried)
                .unwrap()
                .iter()
                .any(|s| s.output == out)
        };
        assert!(in_unspent(&ledger) && !in_spent(&ledger));

        ledger
            .apply_confirmation(
                MilestoneIndex(2),
                &[],
                &[Spent::new(out, transaction_id(0x02))],
            )
            .unwrap();
        assert!(!in_unspent(&ledger) && in_spent(&ledger));
    }
}
