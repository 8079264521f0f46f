//! Parameter declarations handed to the external fitting engine.

pub mod binning;
pub mod overrides;
pub mod schema;

pub use binning::HistogramBinning;
pub use overrides::{
    OverrideError, ParameterOverride, ParameterOverrides, load_parameter_overrides,
    parse_parameter_overrides,
};
pub use schema::{
    DAP, EPED, EPED_SIGMA, FitParameter, LAMBDA, NORM, OPCT, PAP, ParameterSchema, ParameterSpec,
    ParameterValues, SPE, SPE_SIGMA, expanded_name,
};
