//! Shared constants of the photo-electron spectrum model.
//!
//! The truncation order bounds every count-indexed table and weight vector;
//! changing it changes the shape of the lookup tables and the peak matrix.

/// Number of photo-electron counts modelled, `0..TRUNCATION_ORDER`.
pub const TRUNCATION_ORDER: usize = 11;
/// Length of the factorial table the inverse factorials are read from.
pub const FACTORIAL_TABLE_LEN: usize = 15;
pub const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_5_f64;

/// Largest illumination mean for which the Poisson mass discarded beyond the
/// truncation order stays below [`TRUNCATION_TAIL_TOLERANCE`].
///
/// The fit bounds for `lambda_` reach 6, well past this limit; at 6 about
/// 4.3% of the mass is dropped. Starting points above the limit are logged
/// by `ParameterSchema::initial_values`; the evaluators themselves never warn
/// about values a fit moves to later.
pub const SUPPORTED_MEAN_LIMIT: f64 = 2.5;
pub const TRUNCATION_TAIL_TOLERANCE: f64 = 1.0e-4;
