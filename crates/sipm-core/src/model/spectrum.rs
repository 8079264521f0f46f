use super::components::{pedestal_signal, photoelectron_signal};
use crate::binding::{ParameterSchema, ParameterValues};
use crate::domain::{SipmError, SipmResult};
use serde::{Deserialize, Serialize};

/// Physical parameters of one illumination.
///
/// `opct` and `pap` are probabilities, the two spreads must be positive and
/// `lambda` non-negative. The evaluators do not check any of this; the fit
/// engine's bounds are expected to keep values in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumParameters {
    /// Total integral of the spectrum.
    pub norm: f64,
    /// Pedestal position.
    pub eped: f64,
    /// Pedestal width (electronic noise).
    pub eped_sigma: f64,
    /// Single photo-electron amplitude.
    pub spe: f64,
    /// Single photo-electron spread.
    pub spe_sigma: f64,
    /// Poisson mean of the illumination, in photo-electrons.
    #[serde(rename = "lambda_")]
    pub lambda: f64,
    /// Optical crosstalk probability.
    pub opct: f64,
    /// Afterpulse probability.
    pub pap: f64,
    /// Fractional distance of the afterpulse peak towards the pedestal.
    pub dap: f64,
}

/// Pedestal plus photo-electron peaks on `x`.
pub fn evaluate_spectrum(x: &[f64], params: &SpectrumParameters) -> Vec<f64> {
    let mut curve = pedestal_signal(x, params.norm, params.eped, params.eped_sigma, params.lambda);
    for (value, photoelectrons) in curve.iter_mut().zip(photoelectron_signal(x, params)) {
        *value += photoelectrons;
    }
    curve
}

/// Entry point for a fitting engine working with named parameters.
///
/// Shared parameters are looked up by their plain name, per-illumination
/// ones by name plus illumination index (`norm0`, `lambda_1`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumModel {
    schema: ParameterSchema,
}

impl SpectrumModel {
    pub fn new(schema: ParameterSchema) -> Self {
        Self { schema }
    }

    pub fn with_illuminations(n_illuminations: usize) -> Self {
        Self::new(ParameterSchema::sipm(n_illuminations))
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn n_illuminations(&self) -> usize {
        self.schema.n_illuminations()
    }

    pub fn evaluate(&self, x: &[f64], params: &SpectrumParameters) -> Vec<f64> {
        evaluate_spectrum(x, params)
    }

    pub fn evaluate_named(
        &self,
        x: &[f64],
        values: &ParameterValues,
        illumination: usize,
    ) -> SipmResult<Vec<f64>> {
        let params = self.schema.resolve(values, illumination)?;
        Ok(evaluate_spectrum(x, &params))
    }

    /// One curve per illumination, all on the same grid.
    pub fn evaluate_all(&self, x: &[f64], values: &ParameterValues) -> SipmResult<Vec<Vec<f64>>> {
        if self.n_illuminations() == 0 {
            return Err(SipmError::input_validation(
                "INPUT.ILLUMINATION_COUNT",
                "spectrum model has no illuminations to evaluate",
            ));
        }
        (0..self.n_illuminations())
            .map(|illumination| self.evaluate_named(x, values, illumination))
            .collect()
    }
}
