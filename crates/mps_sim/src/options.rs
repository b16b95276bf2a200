//! Typed configuration for two-site gate application (spec Design Note 1:
//! "dynamic options bag → typed config").

/// How a two-site gate application caps the post-SVD bond dimension.
///
/// Replaces a `(max_svals: Option<usize>, fraction: Option<f64>)` pair
/// with a tagged choice, so "both supplied" is representable only by
/// code that explicitly maps external input onto this enum — not by
/// constructing a `GateOptions` value directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BondCap {
    /// No cap; truncation is limited only by the ambient SVD rank.
    NoTruncation,
    /// Absolute cap on the number of retained singular values.
    AbsoluteCap(usize),
    /// Cap expressed as a fraction of the bond's max ceiling.
    FractionalCap(f64),
}

impl Default for BondCap {
    fn default() -> Self {
        BondCap::NoTruncation
    }
}

/// Options recognized by [`crate::Mps::apply_two_site`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOptions {
    /// Canonical-form side after SVD reassembly. Default `true`.
    pub keep_left_canonical: bool,
    /// How to cap the post-SVD bond dimension.
    pub cap: BondCap,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            keep_left_canonical: true,
            cap: BondCap::NoTruncation,
        }
    }
}

impl GateOptions {
    /// Builds options from the dynamic `(max_svals, fraction)` pair an
    /// external caller (e.g. a deserialized options record) might
    /// supply, enforcing spec.md §4.4's mutual-exclusion and range
    /// rules that a directly-constructed [`GateOptions`] cannot violate.
    pub fn from_dynamic(
        keep_left_canonical: bool,
        max_svals: Option<usize>,
        fraction: Option<f64>,
    ) -> mps_core::Result<Self> {
        let cap = match (max_svals, fraction) {
            (Some(_), Some(_)) => return Err(mps_core::MpsError::ConflictingOptions),
            (Some(k), None) => BondCap::AbsoluteCap(k),
            (None, Some(f)) => {
                if !(0.0..=1.0).contains(&f) {
                    return Err(mps_core::MpsError::invalid_option(format!(
                        "fraction {f} outside [0, 1]"
                    )));
                }
                BondCap::FractionalCap(f)
            }
            (None, None) => BondCap::NoTruncation,
        };
        Ok(Self {
            keep_left_canonical,
            cap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_no_truncation() {
        let opts = GateOptions::default();
        assert!(opts.keep_left_canonical);
        assert_eq!(opts.cap, BondCap::NoTruncation);
    }

    #[test]
    fn test_from_dynamic_conflicting_options() {
        let err = GateOptions::from_dynamic(true, Some(2), Some(0.5)).unwrap_err();
        assert!(matches!(err, mps_core::MpsError::ConflictingOptions));
    }

    #[test]
    fn test_from_dynamic_fraction_out_of_range() {
        let err = GateOptions::from_dynamic(true, None, Some(1.5)).unwrap_err();
        assert!(matches!(err, mps_core::MpsError::InvalidOption(_)));
    }

    #[test]
    fn test_from_dynamic_absolute_cap() {
        let opts = GateOptions::from_dynamic(false, Some(3), None).unwrap();
        assert_eq!(opts.cap, BondCap::AbsoluteCap(3));
        assert!(!opts.keep_left_canonical);
    }
}
