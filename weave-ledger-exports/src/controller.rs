// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::error::LedgerError;
use crate::milestone_diff::MilestoneDiff;
use crate::output::{Output, OutputId};
use crate::spent::Spent;
use weave_models::address::Address;
use weave_models::milestone::MilestoneIndex;

/// Read and mutation interface of the confirmed UTXO ledger.
///
/// The implementation serializes all access behind a single read/write gate:
/// reads run concurrently, [`LedgerController::apply_confirmation`] runs
/// exclusively.
pub trait LedgerController: Send + Sync + std::fmt::Debug {
    /// Point read of an output record. `Ok(None)` when the output was never
    /// part of a confirmed transaction.
    fn get_output(&self, output_id: &OutputId) -> Result<Option<Output>, LedgerError>;

    /// Whether the output is still unspent. Fails with
    /// [`LedgerError::OutputNotFound`] when the output record itself is
    /// absent.
    fn is_output_unspent(&self, output_id: &OutputId) -> Result<bool, LedgerError>;

    /// All currently unspent outputs addressed to `address`, in ascending
    /// key order.
    fn unspent_outputs_for_address(&self, address: &Address) -> Result<Vec<Output>, LedgerError>;

    /// All spent outputs that were addressed to `address`, each joined with
    /// the transaction that consumed it, in ascending key order.
    fn spent_outputs_for_address(&self, address: &Address) -> Result<Vec<Spent>, LedgerError>;

    /// The confirmation journal entry written by the milestone at `index`,
    /// or `Ok(None)` when that milestone was never applied.
    fn get_milestone_diff(
        &self,
        index: MilestoneIndex,
    ) -> Result<Option<MilestoneDiff>, LedgerError>;

    /// Applies one confirmed milestone atomically: books every new output as
    /// unspent, moves every consumed output from the unspent to the spent
    /// index, and journals the diff under `index`. On any error the ledger
    /// is left untouched.
    fn apply_confirmation(
        &self,
        index: MilestoneIndex,
        new_outputs: &[Output],
        new_spents: &[Spent],
    ) -> Result<(), LedgerError>;
}
