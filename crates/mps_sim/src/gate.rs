//! Gate-application engine (component C4): one-site and adjacent
//! two-site gate application, with canonical-form choice and bond
//! truncation after two-site gates.

use crate::chain::Mps;
use crate::options::{BondCap, GateOptions};
use mps_core::{MpsError, Result};
use mps_tensor::{fresh_edge_id, split, Tensor};
use tracing::debug;

impl Mps {
    /// Applies a rank-2 gate (edges `[input, output]`) to site `i`.
    pub fn apply_one_site(&mut self, gate: Tensor, i: usize) -> Result<()> {
        self.check_index(i)?;
        if gate.rank() != 2 {
            return Err(MpsError::InvalidGateShape {
                expected: 2,
                got: gate.rank(),
            });
        }

        let input_edge = gate.edges()[0];
        let output_edge = gate.edges()[1];
        let physical = self.physical_edges[i];

        let mut gate = gate;
        gate.rename_edge(input_edge, physical)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;

        let result = Tensor::contract_between(&self.sites[i], &gate)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;

        self.sites[i] = result;
        self.physical_edges[i] = output_edge;

        debug!(site = i, "applied one-site gate");
        Ok(())
    }

    /// Applies `gate` independently to every site in the chain.
    pub fn apply_one_site_all(&mut self, gate_for_site: impl Fn(usize) -> Tensor) -> Result<()> {
        for i in 0..self.num_sites() {
            self.apply_one_site(gate_for_site(i), i)?;
        }
        Ok(())
    }

    /// Applies a rank-4 gate (edges `[input_i, input_j, output_i,
    /// output_j]`) to the adjacent sites `i < j = i + 1`, running the
    /// SVD/truncation kernel and reassembling canonical form per
    /// `options`.
    ///
    /// If this returns `Err`, the chain's state is undefined: the
    /// sites may already have been replaced and the truncation history
    /// may have been appended to without a matching fidelity entry
    /// (the failure modes after the SVD are all in bookkeeping, not in
    /// the tensors themselves, but no caller should rely on that). A
    /// chain that returns an error from this method must be discarded,
    /// not reused.
    pub fn apply_two_site(&mut self, gate: Tensor, i: usize, j: usize, options: GateOptions) -> Result<()> {
        if i >= j {
            return Err(MpsError::InvalidIndexOrder { left: i, right: j });
        }
        self.check_index(j)?;
        if j - i != 1 {
            return Err(MpsError::NonAdjacentSites { a: i, b: j });
        }
        if gate.rank() != 4 {
            return Err(MpsError::InvalidGateShape {
                expected: 4,
                got: gate.rank(),
            });
        }

        let [in_i, in_j, out_i, out_j] = [
            gate.edges()[0],
            gate.edges()[1],
            gate.edges()[2],
            gate.edges()[3],
        ];
        let phys_i = self.physical_edges[i];
        let phys_j = self.physical_edges[j];

        let mut gate = gate;
        gate.rename_edge(in_i, phys_i)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;
        gate.rename_edge(in_j, phys_j)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;

        let combined = Tensor::contract_between(&self.sites[i], &self.sites[j])
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;
        let m = Tensor::contract_between(&combined, &gate)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;

        let left_bond = if i > 0 { Some(self.bond_edges[i - 1]) } else { None };
        let right_bond = if j < self.num_sites() - 1 {
            Some(self.bond_edges[j])
        } else {
            None
        };

        let mut left_edges = vec![out_i];
        left_edges.extend(left_bond);
        let mut right_edges = vec![out_j];
        right_edges.extend(right_bond);

        let ceiling = self.max_bond_dimension(i);
        let max_rank = match options.cap {
            BondCap::NoTruncation => None,
            BondCap::AbsoluteCap(k) => Some(k),
            BondCap::FractionalCap(f) => Some((f * ceiling as f64).round() as usize),
        };

        let u_bond = fresh_edge_id();
        let v_bond = fresh_edge_id();
        let split_result = split(&m, &left_edges, &right_edges, max_rank, u_bond, v_bond)
            .map_err(|e| MpsError::invalid_chain(e.to_string()))?;

        let dropped_weight = mps_tensor::dropped_weight(&split_result.dropped);
        // Per the SVD kernel's numerical policy, values within
        // `svd_epsilon` of the largest kept singular value are
        // structural zeros; this never changes which values `split`
        // kept (that's `max_rank`'s job), it only sizes the diagnostic
        // below.
        let structural_rank = mps_tensor::structural_rank(&split_result.s, self.config.svd_epsilon);

        let (new_left, new_right, new_bond) = if options.keep_left_canonical {
            let s_tensor = mps_tensor::diagonal_tensor(&split_result.s, u_bond, v_bond);
            let right = Tensor::contract_between(&s_tensor, &split_result.vt)
                .map_err(|e| MpsError::invalid_chain(e.to_string()))?;
            (split_result.u, right, u_bond)
        } else {
            let s_tensor = mps_tensor::diagonal_tensor(&split_result.s, u_bond, v_bond);
            let left = Tensor::contract_between(&split_result.u, &s_tensor)
                .map_err(|e| MpsError::invalid_chain(e.to_string()))?;
            (left, split_result.vt, v_bond)
        };

        self.sites[i] = new_left;
        self.sites[j] = new_right;
        self.physical_edges[i] = out_i;
        self.physical_edges[j] = out_j;
        self.bond_edges[i] = new_bond;

        self.record_truncation(dropped_weight);
        let post_norm = self.norm()?;
        self.record_fidelity(post_norm);

        debug!(
            site_i = i,
            site_j = j,
            dropped_weight,
            post_norm,
            structural_rank,
            "applied two-site gate"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Mps;

    fn hadamard_gate() -> Tensor {
        let frac = 1.0 / std::f64::consts::SQRT_2;
        let input = fresh_edge_id();
        let output = fresh_edge_id();
        let mut data = ndarray::Array2::<mps_core::C64>::zeros((2, 2));
        data[[0, 0]] = mps_core::C64::new(frac, 0.0);
        data[[1, 0]] = mps_core::C64::new(frac, 0.0);
        data[[0, 1]] = mps_core::C64::new(frac, 0.0);
        data[[1, 1]] = mps_core::C64::new(-frac, 0.0);
        Tensor::new(data.into_dyn(), vec![input, output]).unwrap()
    }

    fn x_gate_2x2() -> Tensor {
        let input = fresh_edge_id();
        let output = fresh_edge_id();
        let mut data = ndarray::Array2::<mps_core::C64>::zeros((2, 2));
        data[[1, 0]] = mps_core::C64::new(1.0, 0.0);
        data[[0, 1]] = mps_core::C64::new(1.0, 0.0);
        Tensor::new(data.into_dyn(), vec![input, output]).unwrap()
    }

    fn cnot_gate() -> Tensor {
        let (ia, ib, oa, ob) = (fresh_edge_id(), fresh_edge_id(), fresh_edge_id(), fresh_edge_id());
        let mut data = ndarray::Array4::<mps_core::C64>::zeros((2, 2, 2, 2));
        let one = mps_core::C64::new(1.0, 0.0);
        // CNOT: control=a, target=b. out = (a, a xor b).
        for a in 0..2 {
            for b in 0..2 {
                let ob_val = a ^ b;
                data[[a, b, a, ob_val]] = one;
            }
        }
        Tensor::new(data.into_dyn(), vec![ia, ib, oa, ob]).unwrap()
    }

    #[test]
    fn test_apply_one_site_preserves_bond_dimensions() {
        let mut mps = Mps::new(3, 2).unwrap();
        let before = mps.bond_dimensions().unwrap();
        mps.apply_one_site(x_gate_2x2(), 1).unwrap();
        let after = mps.bond_dimensions().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_apply_one_site_all_flips_every_site() {
        let mut mps = Mps::new(3, 2).unwrap();
        mps.apply_one_site_all(|_| x_gate_2x2()).unwrap();
        let psi = mps.wavefunction().unwrap();
        // |000> -> |111>, linear index 7.
        assert!((psi[7] - mps_core::C64::new(1.0, 0.0)).norm() < 1e-9);
        for (k, amp) in psi.iter().enumerate() {
            if k != 7 {
                assert!(amp.norm() < 1e-9);
            }
        }
        assert_eq!(mps.bond_dimensions().unwrap(), vec![1, 1]);
    }

    #[test]
    fn test_apply_one_site_rejects_wrong_rank() {
        let mut mps = Mps::new(2, 2).unwrap();
        let err = mps.apply_one_site(cnot_gate(), 0).unwrap_err();
        assert!(matches!(err, MpsError::InvalidGateShape { .. }));
    }

    #[test]
    fn test_x_twice_is_identity() {
        let mut mps = Mps::new(2, 2).unwrap();
        mps.apply_one_site(x_gate_2x2(), 0).unwrap();
        mps.apply_one_site(x_gate_2x2(), 0).unwrap();
        let psi = mps.wavefunction().unwrap();
        assert!((psi[0] - mps_core::C64::new(1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_bell_state_via_h_then_cnot() {
        let mut mps = Mps::new(2, 2).unwrap();
        let frac = 1.0 / std::f64::consts::SQRT_2;

        mps.apply_one_site(hadamard_gate(), 0).unwrap();
        mps.apply_two_site(cnot_gate(), 0, 1, GateOptions::default())
            .unwrap();

        let psi = mps.wavefunction().unwrap();
        assert!((psi[0].norm() - frac).abs() < 1e-8);
        assert!(psi[1].norm() < 1e-8);
        assert!(psi[2].norm() < 1e-8);
        assert!((psi[3].norm() - frac).abs() < 1e-8);

        assert_eq!(mps.truncation_history().len(), 1);
        assert!(mps.truncation_history()[0].abs() < 1e-10);
        assert!((mps.fidelity_history()[0] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_bell_state_truncated_to_one_sval_is_product_state() {
        let mut mps = Mps::new(2, 2).unwrap();

        mps.apply_one_site(hadamard_gate(), 0).unwrap();
        let options = GateOptions {
            keep_left_canonical: true,
            cap: BondCap::AbsoluteCap(1),
        };
        mps.apply_two_site(cnot_gate(), 0, 1, options).unwrap();

        assert!((mps.truncation_history()[0] - 0.5).abs() < 1e-8);
    }

    #[test]
    fn test_non_adjacent_two_site_rejected() {
        let mut mps = Mps::new(3, 2).unwrap();
        let err = mps
            .apply_two_site(cnot_gate(), 0, 2, GateOptions::default())
            .unwrap_err();
        assert!(matches!(err, MpsError::NonAdjacentSites { .. }));
    }

    #[test]
    fn test_reversed_order_rejected() {
        let mut mps = Mps::new(2, 2).unwrap();
        let err = mps
            .apply_two_site(cnot_gate(), 1, 0, GateOptions::default())
            .unwrap_err();
        assert!(matches!(err, MpsError::InvalidIndexOrder { .. }));
    }
}
