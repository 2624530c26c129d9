//! Pure functions over transfer lists.
//!
//! All maps are `BTreeMap`s keyed by [`ParticipantId`] so iteration
//! follows participant order and downstream graph construction is
//! deterministic.

use crate::core::error::SettlementError;
use crate::core::ledger::Ledger;
use crate::core::participant::ParticipantId;
use crate::core::transfer::{checked_total, validate_all, Transfer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Participant -> net balance. Positive = owed money, negative = owes money.
pub type BalanceMap = BTreeMap<ParticipantId, i64>;

/// Payer -> payee -> aggregated positive amount.
pub type TransferMatrix = BTreeMap<ParticipantId, BTreeMap<ParticipantId, i64>>;

/// Participant -> total amount originated as payer.
pub type OutflowMap = BTreeMap<ParticipantId, i64>;

/// Sorted, de-duplicated participants appearing as either endpoint.
pub fn users(transfers: &[Transfer]) -> Vec<ParticipantId> {
    transfers
        .iter()
        .flat_map(|t| [t.from().clone(), t.to().clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Net balance of every participant.
///
/// Every participant returned by [`users`] has an entry, so a participant
/// that only appears in zero-amount transfers maps to 0. A balance
/// outside the `i64` range fails with [`SettlementError::AmountOverflow`].
pub fn balances(transfers: &[Transfer]) -> Result<BalanceMap, SettlementError> {
    validate_all(transfers)?;
    Ok(Ledger::from_transfers(transfers)?.into_positions())
}

/// Aggregate strictly positive transfers by ordered pair.
///
/// The result is the allowed-edge set: no settlement may use a pair
/// that is absent here.
pub fn transfer_matrix(transfers: &[Transfer]) -> Result<TransferMatrix, SettlementError> {
    let mut matrix = TransferMatrix::new();
    for t in transfers.iter().filter(|t| t.amount() > 0) {
        let cell = matrix
            .entry(t.from().clone())
            .or_default()
            .entry(t.to().clone())
            .or_insert(0);
        *cell = checked_total(*cell, t.amount(), t.from())?;
    }
    Ok(matrix)
}

/// Total positive amount each participant originated as payer.
///
/// Participants that never pay are absent; callers treat them as 0.
pub fn outflows(transfers: &[Transfer]) -> Result<OutflowMap, SettlementError> {
    let mut totals = OutflowMap::new();
    for t in transfers.iter().filter(|t| t.amount() > 0) {
        let total = totals.entry(t.from().clone()).or_insert(0);
        *total = checked_total(*total, t.amount(), t.from())?;
    }
    Ok(totals)
}

/// Sum of positive balances, i.e. how much has to reach the creditors.
pub fn total_demand(balances: &BalanceMap) -> Result<i64, SettlementError> {
    balances
        .iter()
        .filter(|(_, b)| **b > 0)
        .try_fold(0i64, |total, (participant, b)| {
            checked_total(total, *b, participant)
        })
}

/// Net opposing transfers between each pair down to one directed amount.
///
/// For every unordered pair the two directions are summed separately and
/// a single transfer is emitted in the direction of the surplus. Pairs
/// that net to zero emit nothing, and so do self-transfers. Output is
/// ordered by the (smaller, larger) participant pair.
pub fn collapse_transfers(transfers: &[Transfer]) -> Result<Vec<Transfer>, SettlementError> {
    validate_all(transfers)?;

    // (low, high) -> (amount flowing low -> high, amount flowing high -> low)
    let mut net: BTreeMap<(ParticipantId, ParticipantId), (i64, i64)> = BTreeMap::new();
    for t in transfers {
        if t.from() == t.to() {
            continue;
        }
        if t.from() < t.to() {
            let (forward, _) = net.entry((t.from().clone(), t.to().clone())).or_default();
            *forward = checked_total(*forward, t.amount(), t.from())?;
        } else {
            let (_, backward) = net.entry((t.to().clone(), t.from().clone())).or_default();
            *backward = checked_total(*backward, t.amount(), t.from())?;
        }
    }

    Ok(net
        .into_iter()
        .filter_map(|((low, high), (forward, backward))| {
            match forward.cmp(&backward) {
                Ordering::Equal => None,
                Ordering::Greater => Some(Transfer::new(low, high, forward - backward)),
                Ordering::Less => Some(Transfer::new(high, low, backward - forward)),
            }
        })
        .collect())
}
