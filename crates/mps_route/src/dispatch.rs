//! Operation dispatcher (component C6): consumes a typed operation
//! stream and invokes the gate engine (C4) directly, or the swap
//! router (C5) first when the two targets are not adjacent.

use crate::router::swap_until_adjacent;
use mps_core::{MpsError, Result};
use mps_sim::{GateOptions, Mps};
use mps_tensor::Tensor;

/// A single typed operation: a gate tensor plus its ordered target
/// qudit indices. Arity is implied by `targets.len()`.
///
/// Two-site targets must be given in ascending position order
/// (`targets[0] < targets[1]`) — the dispatcher forwards them
/// unchanged to the same engine calls a direct caller would make, and
/// those calls reject reversed order with [`MpsError::InvalidIndexOrder`]
/// rather than silently reinterpreting which target is which.
pub struct Operation {
    pub gate: Tensor,
    pub targets: Vec<usize>,
}

impl Operation {
    pub fn new(gate: Tensor, targets: Vec<usize>) -> Self {
        Self { gate, targets }
    }

    /// Arity of this operation (number of target qudits).
    pub fn arity(&self) -> usize {
        self.targets.len()
    }

    fn validate(&self, num_sites: usize) -> Result<()> {
        let arity = self.arity();
        if arity != 1 && arity != 2 {
            return Err(MpsError::UnsupportedArity(arity));
        }
        let expected_edges = arity * 2;
        if self.gate.rank() != expected_edges {
            return Err(MpsError::InvalidGateShape {
                expected: expected_edges,
                got: self.gate.rank(),
            });
        }
        for &idx in &self.targets {
            if idx >= num_sites {
                return Err(MpsError::IndexOutOfRange {
                    index: idx,
                    num_sites,
                });
            }
        }
        if arity == 2 && self.targets[0] == self.targets[1] {
            return Err(MpsError::InvalidIndexOrder {
                left: self.targets[0],
                right: self.targets[1],
            });
        }
        Ok(())
    }
}

/// Dispatches `op` against `mps`: arity 1 goes straight to
/// [`Mps::apply_one_site`]; arity 2 with adjacent targets goes
/// straight to [`Mps::apply_two_site`]; arity 2 with non-adjacent
/// targets is routed through [`swap_until_adjacent`] first. `swap_gate`
/// supplies a fresh SWAP tensor per call, as required by the router.
pub fn dispatch(
    mps: &mut Mps,
    op: Operation,
    swap_gate: impl FnMut() -> Tensor,
    options: GateOptions,
) -> Result<()> {
    op.validate(mps.num_sites())?;

    match op.arity() {
        1 => mps.apply_one_site(op.gate, op.targets[0]),
        2 => {
            let (i, j) = (op.targets[0], op.targets[1]);
            if j < i {
                return Err(MpsError::InvalidIndexOrder { left: i, right: j });
            }
            if j - i == 1 {
                mps.apply_two_site(op.gate, i, j, options)
            } else {
                swap_until_adjacent(mps, i, j, swap_gate, options)?;
                mps.apply_two_site(op.gate, j - 1, j, options)
            }
        }
        n => Err(MpsError::UnsupportedArity(n)),
    }
}
