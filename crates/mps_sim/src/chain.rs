//! MPS chain (component C3): an ordered sequence of site tensors
//! connected by virtual bonds, with one dangling physical edge per site.

use mps_core::{MpsConfig, MpsError, Result, C64};
use mps_tensor::{fresh_edge_id, EdgeId, Tensor};
use std::collections::HashMap;
use tracing::debug;

/// A Matrix Product State chain of `N` sites, each of qudit dimension `d`.
pub struct Mps {
    pub(crate) config: MpsConfig,
    pub(crate) dim: usize,
    pub(crate) sites: Vec<Tensor>,
    /// `physical_edges[i]` is the current dangling-edge id of site `i`.
    pub(crate) physical_edges: Vec<EdgeId>,
    /// `bond_edges[i]` connects site `i` and site `i + 1`.
    pub(crate) bond_edges: Vec<EdgeId>,
    truncation_history: Vec<f64>,
    fidelity_history: Vec<f64>,
}

impl Mps {
    /// Creates a chain of `num_sites` sites, each of qudit dimension
    /// `dim`, in the |0…0⟩ state. Fails with [`MpsError::InvalidShape`]
    /// if `num_sites < 2` or `dim < 2`.
    pub fn new(num_sites: usize, dim: usize) -> Result<Self> {
        Self::with_config(num_sites, dim, MpsConfig::default())
    }

    /// Like [`Mps::new`], with an explicit [`MpsConfig`] instead of the default.
    pub fn with_config(num_sites: usize, dim: usize, config: MpsConfig) -> Result<Self> {
        if num_sites < 2 {
            return Err(MpsError::invalid_shape(format!(
                "chain requires at least 2 sites, got {num_sites}"
            )));
        }
        if dim < 2 {
            return Err(MpsError::invalid_shape(format!(
                "qudit dimension must be at least 2, got {dim}"
            )));
        }

        let mut sites = Vec::with_capacity(num_sites);
        let mut physical_edges = Vec::with_capacity(num_sites);
        let mut bond_edges = Vec::with_capacity(num_sites.saturating_sub(1));

        for i in 0..num_sites {
            let physical = fresh_edge_id();
            physical_edges.push(physical);

            let mut edges = vec![physical];
            let mut shape = vec![dim];
            if i > 0 {
                edges.push(bond_edges[i - 1]);
                shape.push(1);
            }
            if i < num_sites - 1 {
                let bond = fresh_edge_id();
                bond_edges.push(bond);
                edges.push(bond);
                shape.push(1);
            }

            let mut data = ndarray::ArrayD::<C64>::zeros(ndarray::IxDyn(&shape));
            let zero_index = vec![0usize; shape.len()];
            data[ndarray::IxDyn(&zero_index)] = C64::new(1.0, 0.0);

            sites.push(Tensor::new(data, edges).expect("fresh chain tensor has matching rank"));
        }

        debug!(num_sites, dim, "constructed fresh MPS chain");

        Ok(Self {
            config,
            dim,
            sites,
            physical_edges,
            bond_edges,
            truncation_history: Vec::new(),
            fidelity_history: Vec::new(),
        })
    }

    /// Number of sites in the chain.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Qudit dimension `d`.
    pub fn qudit_dimension(&self) -> usize {
        self.dim
    }

    pub(crate) fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.num_sites() {
            return Err(MpsError::IndexOutOfRange {
                index: i,
                num_sites: self.num_sites(),
            });
        }
        Ok(())
    }

    /// Dimension of the virtual bond between sites `i` and `i + 1`.
    pub fn bond_dimension(&self, i: usize) -> Result<usize> {
        if i + 1 >= self.num_sites() {
            return Err(MpsError::IndexOutOfRange {
                index: i,
                num_sites: self.num_sites() - 1,
            });
        }
        let bond = self.bond_edges[i];
        let dim_left = self.sites[i]
            .dim_of(bond)
            .ok_or_else(|| MpsError::invalid_chain(format!("site {i} missing bond {bond}")))?;
        let dim_right = self.sites[i + 1]
            .dim_of(bond)
            .ok_or_else(|| MpsError::invalid_chain(format!("site {} missing bond {bond}", i + 1)))?;
        if dim_left != dim_right {
            return Err(MpsError::invalid_chain(format!(
                "bond {i} has mismatched dimensions {dim_left} (left) vs {dim_right} (right)"
            )));
        }
        Ok(dim_left)
    }

    /// Dimension of every virtual bond, left to right.
    pub fn bond_dimensions(&self) -> Result<Vec<usize>> {
        (0..self.num_sites() - 1).map(|i| self.bond_dimension(i)).collect()
    }

    /// The exact representable Schmidt-rank ceiling for the bond to
    /// the right of site `i`: `min(d^(i+1), d^(N-i-1))`.
    pub fn max_bond_dimension(&self, i: usize) -> usize {
        let n = self.num_sites();
        let left_rank = (self.dim as u64).saturating_pow((i + 1) as u32);
        let right_rank = (self.dim as u64).saturating_pow((n - i - 1) as u32);
        left_rank.min(right_rank) as usize
    }

    /// The max bond ceiling for every bond, left to right.
    pub fn max_bond_dimensions(&self) -> Vec<usize> {
        (0..self.num_sites() - 1).map(|i| self.max_bond_dimension(i)).collect()
    }

    /// Checks the five §3 chain invariants.
    pub fn is_valid(&self) -> bool {
        if self.sites.len() != self.physical_edges.len() {
            return false;
        }
        if self.bond_edges.len() + 1 != self.sites.len() {
            return false;
        }
        for (i, site) in self.sites.iter().enumerate() {
            let expected_rank = match i {
                0 => 1,
                k if k == self.sites.len() - 1 => 1,
                _ => 2,
            } + 1; // + physical edge
            if site.rank() != expected_rank {
                return false;
            }
            if site.position_of(self.physical_edges[i]).is_none() {
                return false;
            }
            if i > 0 && site.position_of(self.bond_edges[i - 1]).is_none() {
                return false;
            }
            if i < self.sites.len() - 1 && site.position_of(self.bond_edges[i]).is_none() {
                return false;
            }
        }
        for i in 0..self.bond_edges.len() {
            match self.bond_dimension(i) {
                Ok(d) if d > self.max_bond_dimension(i) => return false,
                Err(_) => return false,
                _ => {}
            }
        }
        true
    }

    /// Appends a truncated-weight value to the truncation history.
    pub(crate) fn record_truncation(&mut self, dropped_weight: f64) {
        self.truncation_history.push(dropped_weight);
    }

    /// Appends a norm value to the fidelity history.
    pub(crate) fn record_fidelity(&mut self, norm: f64) {
        self.fidelity_history.push(norm);
    }

    /// Truncated-weight history, one entry per successful two-site gate.
    pub fn truncation_history(&self) -> &[f64] {
        &self.truncation_history
    }

    /// Post-gate norm history, one entry per successful two-site gate.
    pub fn fidelity_history(&self) -> &[f64] {
        &self.fidelity_history
    }

    /// Contracts the chain left to right into a length-`d^N` vector.
    /// Element `k` corresponds to the base-`d` digit sequence of `k`
    /// with site 0 as the most significant digit.
    pub fn wavefunction(&self) -> Result<Vec<C64>> {
        if !self.is_valid() {
            return Err(MpsError::invalid_chain("chain invariants violated"));
        }

        let mut acc = self.sites[0].clone();
        for site in &self.sites[1..] {
            acc = Tensor::contract_between(&acc, site)
                .map_err(|e| MpsError::invalid_chain(e.to_string()))?;
        }

        let order: Vec<usize> = self
            .physical_edges
            .iter()
            .map(|e| acc.position_of(*e).expect("wavefunction retains all physical edges"))
            .collect();
        let permuted = acc.permuted(&order);
        Ok(permuted.data().iter().copied().collect())
    }

    /// `√⟨ψ|ψ⟩`, computed by contracting the chain against its complex
    /// conjugate (a transfer-matrix sweep, not by materializing the
    /// full wavefunction). Fails with [`MpsError::NumericError`] if the
    /// residual imaginary part exceeds `config.norm_imag_tolerance`.
    pub fn norm(&self) -> Result<f64> {
        if !self.is_valid() {
            return Err(MpsError::invalid_chain("chain invariants violated"));
        }

        let mut bond_map: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut env: Option<Tensor> = None;

        for (i, ket) in self.sites.iter().enumerate() {
            let physical = self.physical_edges[i];
            let bra = conjugate_with_fresh_bonds(ket, physical, &mut bond_map);

            env = Some(match env {
                None => Tensor::contract_between(ket, &bra)
                    .map_err(|e| MpsError::numeric(e.to_string()))?,
                Some(e) => {
                    let step = Tensor::contract_between(&e, ket)
                        .map_err(|err| MpsError::numeric(err.to_string()))?;
                    Tensor::contract_between(&step, &bra)
                        .map_err(|err| MpsError::numeric(err.to_string()))?
                }
            });
        }

        let overlap = env.expect("chain has at least one site")
            .data()
            .iter()
            .next()
            .copied()
            .expect("fully contracted overlap is a scalar");

        if overlap.im.abs() > self.config.norm_imag_tolerance {
            return Err(MpsError::numeric(format!(
                "norm has non-negligible imaginary residual {}",
                overlap.im
            )));
        }
        if overlap.re < 0.0 && overlap.re.abs() > self.config.norm_imag_tolerance {
            return Err(MpsError::numeric(format!(
                "norm-squared is negative: {}",
                overlap.re
            )));
        }

        Ok(overlap.re.max(0.0).sqrt())
    }
}

/// Clones `t`, complex-conjugates its data, and relabels every edge
/// except `physical` to a fresh id — reusing the same fresh id for a
/// given original edge across calls (via `bond_map`) so that the
/// conjugated chain's bonds still connect to each other consistently.
fn conjugate_with_fresh_bonds(
    t: &Tensor,
    physical: EdgeId,
    bond_map: &mut HashMap<EdgeId, EdgeId>,
) -> Tensor {
    let data = t.data().mapv(|x| x.conj());
    let edges: Vec<EdgeId> = t
        .edges()
        .iter()
        .map(|&e| {
            if e == physical {
                e
            } else {
                *bond_map.entry(e).or_insert_with(fresh_edge_id)
            }
        })
        .collect();
    Tensor::new(data, edges).expect("conjugate tensor retains the original rank")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_too_few_sites() {
        let err = Mps::new(1, 2).unwrap_err();
        assert!(matches!(err, MpsError::InvalidShape(_)));
    }

    #[test]
    fn test_new_rejects_qudit_dimension_below_two() {
        let err = Mps::new(3, 1).unwrap_err();
        assert!(matches!(err, MpsError::InvalidShape(_)));
    }

    #[test]
    fn test_fresh_chain_invariants() {
        let mps = Mps::new(4, 2).unwrap();
        assert!(mps.is_valid());
        assert_eq!(mps.bond_dimensions().unwrap(), vec![1, 1, 1]);
        assert_eq!(mps.max_bond_dimensions(), vec![2, 4, 2]);
        assert!((mps.norm().unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fresh_chain_wavefunction_is_all_zero_basis_state() {
        let mps = Mps::new(3, 2).unwrap();
        let psi = mps.wavefunction().unwrap();
        assert_eq!(psi.len(), 8);
        assert!((psi[0] - C64::new(1.0, 0.0)).norm() < 1e-10);
        for amp in &psi[1..] {
            assert!(amp.norm() < 1e-10);
        }
    }

    #[test]
    fn test_bond_dimension_out_of_range() {
        let mps = Mps::new(2, 2).unwrap();
        let err = mps.bond_dimension(1).unwrap_err();
        assert!(matches!(err, MpsError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_max_bond_dimension_ceiling_formula() {
        let mps = Mps::new(5, 2).unwrap();
        assert_eq!(mps.max_bond_dimensions(), vec![2, 4, 4, 2]);
    }
}
