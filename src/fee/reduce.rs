//! Change reduction against a total fee
//!
//! The change reducer makes a change list pay a fee: each change coin
//! gives up its proportional share, and whatever the payment turns into
//! dust is coalesced back into the surviving coins.

use crate::coin::{Coin, DustThreshold, Fee};
use crate::fee::distribute::distribute_fee;
use crate::fee::dust::coalesce_dust;

/// Produce change outputs that have collectively paid `fee`.
///
/// When the fee meets or exceeds the total change, the change is consumed
/// entirely and the result is empty - the caller observes the residual
/// through the selection's implicit fee. Note that this includes the case
/// where the fee equals the change exactly: a successful balance may end
/// with no change at all, and callers must not assume otherwise.
///
/// Otherwise each positive change coin pays its proportional share of the
/// fee and the dust left behind is coalesced, so the result sums to
/// `change - fee` exactly.
pub fn reduce_change_outputs(
    threshold: DustThreshold,
    fee: Fee,
    change: &[Coin],
) -> Vec<Coin> {
    let positive: Vec<Coin> = change.iter().copied().filter(|c| !c.is_zero()).collect();
    if positive.is_empty() {
        return Vec::new();
    }
    let change_total: Coin = positive.iter().sum();
    if fee.coin() >= change_total {
        return Vec::new();
    }
    let paid: Vec<Coin> = distribute_fee(fee, &positive)
        .into_iter()
        .map(|(share, coin)| pay_fee(share, coin))
        .collect();
    coalesce_dust(threshold, &paid)
}

/// One coin's payment of its fee share. A share never exceeds its coin
/// by more than the rounding carry, so the zero clamp preserves the
/// aggregate exactly.
fn pay_fee(share: Fee, coin: Coin) -> Coin {
    coin.checked_sub(share.coin()).unwrap_or(Coin::ZERO)
}
