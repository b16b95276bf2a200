//! Swap router (component C5): sequences nearest-neighbor SWAPs so two
//! logically non-adjacent sites become adjacent.

use mps_core::{MpsError, Result};
use mps_sim::{GateOptions, Mps};
use mps_tensor::Tensor;
use tracing::debug;

/// Applies SWAP on `(l, l+1), (l+1, l+2), …, (r-2, r-1)` in sequence,
/// so that the logical qudits originally at `l` and `r` end up
/// adjacent at positions `r-1, r`. `swap_gate` is called once per
/// swap, since a gate tensor is consumed by application and cannot be
/// reused — pass `|| mps_gates::swap()` or an equivalent collaborator.
///
/// A no-op (returns `Ok(())` without applying any gate) when `r == l + 1`.
/// Fails with [`MpsError::InvalidIndexOrder`] if `l >= r`, or
/// [`MpsError::IndexOutOfRange`] if `r` is out of bounds.
///
/// The router does not undo the resulting permutation; a caller that
/// needs the original ordering restored must issue the inverse swap
/// chain itself.
pub fn swap_until_adjacent(
    mps: &mut Mps,
    l: usize,
    r: usize,
    mut swap_gate: impl FnMut() -> Tensor,
    options: GateOptions,
) -> Result<()> {
    if l >= r {
        return Err(MpsError::InvalidIndexOrder { left: l, right: r });
    }
    if r >= mps.num_sites() {
        return Err(MpsError::IndexOutOfRange {
            index: r,
            num_sites: mps.num_sites(),
        });
    }
    if r == l + 1 {
        return Ok(());
    }

    for pos in l..r - 1 {
        debug!(pos, next = pos + 1, "swapping adjacent sites for routing");
        mps.apply_two_site(swap_gate(), pos, pos + 1, options)?;
    }
    Ok(())
}
