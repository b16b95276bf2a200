//! Integration tests for the swap router (C5) and operation dispatcher
//! (C6), including the N=3 GHZ-family scenario from the component spec.

use mps_core::MpsError;
use mps_route::{dispatch, swap_until_adjacent, Operation};
use mps_sim::{GateOptions, Mps};

const TOL: f64 = 1e-8;

#[test]
fn scenario_6_ghz_via_swap_routing() {
    let mut mps = Mps::new(3, 2).unwrap();
    mps.apply_one_site(mps_gates::hadamard(), 0).unwrap();

    swap_until_adjacent(&mut mps, 0, 2, mps_gates::swap, GateOptions::default()).unwrap();
    // The qudit originally at 0 is now at position 1, adjacent to the
    // untouched qudit originally at 2 (still at position 2).
    mps.apply_two_site(mps_gates::cnot(), 1, 2, GateOptions::default())
        .unwrap();

    assert!(mps.is_valid());
    assert!((mps.norm().unwrap() - 1.0).abs() < TOL);
    assert_eq!(mps.bond_dimension(0).unwrap(), 2);
    assert_eq!(mps.bond_dimension(1).unwrap(), 2);
}

#[test]
fn dispatcher_routes_non_adjacent_two_site_operation_through_the_swap_router() {
    let mut mps = Mps::new(4, 2).unwrap();
    mps.apply_one_site(mps_gates::pauli_x(), 0).unwrap();

    let op = Operation::new(mps_gates::cnot(), vec![0, 3]);
    dispatch(&mut mps, op, mps_gates::swap, GateOptions::default()).unwrap();

    assert!(mps.is_valid());
    assert!((mps.norm().unwrap() - 1.0).abs() < TOL);
}

#[test]
fn dispatcher_preserves_stream_order_across_mixed_arities() {
    let mut mps = Mps::new(3, 2).unwrap();

    let ops = vec![
        Operation::new(mps_gates::hadamard(), vec![0]),
        Operation::new(mps_gates::cnot(), vec![0, 1]),
        Operation::new(mps_gates::cnot(), vec![1, 2]),
    ];
    for op in ops {
        dispatch(&mut mps, op, mps_gates::swap, GateOptions::default()).unwrap();
    }

    // GHZ state: only |000> and |111> have non-negligible amplitude.
    let psi = mps.wavefunction().unwrap();
    let frac = 1.0 / std::f64::consts::SQRT_2;
    assert!((psi[0].norm() - frac).abs() < TOL);
    assert!((psi[7].norm() - frac).abs() < TOL);
    for (k, amp) in psi.iter().enumerate() {
        if k != 0 && k != 7 {
            assert!(amp.norm() < TOL);
        }
    }
}

#[test]
fn error_unsupported_arity_rejected() {
    let mut mps = Mps::new(3, 2).unwrap();
    let op = Operation::new(mps_gates::pauli_x(), vec![0, 1, 2]);
    let err = dispatch(&mut mps, op, mps_gates::swap, GateOptions::default()).unwrap_err();
    assert!(matches!(err, MpsError::UnsupportedArity(3)));
}

#[test]
fn error_swap_router_rejects_reversed_range() {
    let mut mps = Mps::new(3, 2).unwrap();
    let err = swap_until_adjacent(&mut mps, 2, 1, mps_gates::swap, GateOptions::default())
        .unwrap_err();
    assert!(matches!(err, MpsError::InvalidIndexOrder { .. }));
}

#[test]
fn error_swap_router_rejects_out_of_range() {
    let mut mps = Mps::new(3, 2).unwrap();
    let err = swap_until_adjacent(&mut mps, 0, 9, mps_gates::swap, GateOptions::default())
        .unwrap_err();
    assert!(matches!(err, MpsError::IndexOutOfRange { .. }));
}

#[test]
fn swap_router_no_op_when_already_adjacent_reports_success() {
    let mut mps = Mps::new(3, 2).unwrap();
    let before = mps.truncation_history().len();
    swap_until_adjacent(&mut mps, 0, 1, mps_gates::swap, GateOptions::default()).unwrap();
    assert_eq!(mps.truncation_history().len(), before);
}
