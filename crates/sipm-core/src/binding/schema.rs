use super::overrides::ParameterOverrides;
use crate::common::SUPPORTED_MEAN_LIMIT;
use crate::domain::{SipmError, SipmResult};
use crate::model::SpectrumParameters;
use crate::numerics::integrate_trapezoid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named parameter values as exchanged with the fitting engine.
pub type ParameterValues = BTreeMap<String, f64>;

pub const NORM: &str = "norm";
pub const EPED: &str = "eped";
pub const EPED_SIGMA: &str = "eped_sigma";
pub const SPE: &str = "spe";
pub const SPE_SIGMA: &str = "spe_sigma";
pub const LAMBDA: &str = "lambda_";
pub const OPCT: &str = "opct";
pub const PAP: &str = "pap";
pub const DAP: &str = "dap";

/// Declaration of one model parameter before per-illumination expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub default: Option<f64>,
    pub lower: f64,
    pub upper: f64,
    pub fixed: bool,
    pub multi: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, default: Option<f64>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            default,
            lower,
            upper,
            fixed: false,
            multi: false,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }
}

/// One parameter as the fitting engine sees it, after expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParameter {
    pub name: String,
    pub base: String,
    pub illumination: Option<usize>,
    pub default: Option<f64>,
    pub lower: f64,
    pub upper: f64,
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    n_illuminations: usize,
    parameters: Vec<FitParameter>,
}

impl ParameterSchema {
    pub fn new(n_illuminations: usize) -> Self {
        Self {
            n_illuminations,
            parameters: Vec::new(),
        }
    }

    /// The nine SiPM parameters with their default starting points and bounds.
    ///
    /// Normalizations start unset and fixed; [`Self::prepare_defaults`] fills
    /// them from the histograms.
    pub fn sipm(n_illuminations: usize) -> Self {
        let mut schema = Self::new(n_illuminations);
        for spec in [
            ParameterSpec::new(NORM, None, 0.0, 100_000.0).fixed().multi(),
            ParameterSpec::new(EPED, Some(0.0), -10.0, 10.0),
            ParameterSpec::new(EPED_SIGMA, Some(9.0), 2.0, 20.0),
            ParameterSpec::new(SPE, Some(25.0), 15.0, 40.0),
            ParameterSpec::new(SPE_SIGMA, Some(2.0), 1.0, 20.0),
            ParameterSpec::new(LAMBDA, Some(0.7), 0.001, 6.0).multi(),
            ParameterSpec::new(OPCT, Some(0.4), 0.01, 0.8),
            ParameterSpec::new(PAP, Some(0.09), 0.01, 0.8),
            ParameterSpec::new(DAP, Some(0.5), 0.0, 0.8),
        ] {
            schema.add_parameter(spec);
        }
        schema
    }

    pub fn add_parameter(&mut self, spec: ParameterSpec) {
        if spec.multi {
            for illumination in 0..self.n_illuminations {
                self.parameters.push(FitParameter {
                    name: expanded_name(&spec.name, illumination),
                    base: spec.name.clone(),
                    illumination: Some(illumination),
                    default: spec.default,
                    lower: spec.lower,
                    upper: spec.upper,
                    fixed: spec.fixed,
                });
            }
        } else {
            self.parameters.push(FitParameter {
                name: spec.name.clone(),
                base: spec.name,
                illumination: None,
                default: spec.default,
                lower: spec.lower,
                upper: spec.upper,
                fixed: spec.fixed,
            });
        }
    }

    pub fn n_illuminations(&self) -> usize {
        self.n_illuminations
    }

    pub fn parameters(&self) -> &[FitParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&FitParameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn free_parameters(&self) -> impl Iterator<Item = &FitParameter> {
        self.parameters.iter().filter(|parameter| !parameter.fixed)
    }

    /// Fill every unset per-illumination normalization with the trapezoidal
    /// integral of that illumination's histogram over the bin centers.
    pub fn prepare_defaults(&mut self, histograms: &[Vec<f64>], between: &[f64]) -> SipmResult<()> {
        if histograms.len() != self.n_illuminations {
            return Err(SipmError::input_validation(
                "INPUT.HISTOGRAM_COUNT",
                format!(
                    "expected {} histograms, one per illumination, got {}",
                    self.n_illuminations,
                    histograms.len()
                ),
            ));
        }

        let mut parameters = self.parameters.clone();
        for parameter in &mut parameters {
            let Some(illumination) = parameter.illumination else {
                continue;
            };
            if parameter.base != NORM || parameter.default.is_some() {
                continue;
            }

            let histogram = histograms.get(illumination).ok_or_else(|| {
                SipmError::input_validation(
                    "INPUT.HISTOGRAM_COUNT",
                    format!(
                        "parameter '{}' refers to illumination {illumination} but only {} histograms were given",
                        parameter.name,
                        histograms.len()
                    ),
                )
            })?;
            let integral = integrate_trapezoid(histogram, between).map_err(|error| {
                SipmError::input_validation(
                    "INPUT.HISTOGRAM",
                    format!("illumination {illumination} histogram cannot be integrated: {error}"),
                )
            })?;
            tracing::debug!(
                parameter = %parameter.name,
                integral,
                "normalization default taken from histogram integral"
            );
            parameter.default = Some(integral);
        }

        self.parameters = parameters;
        Ok(())
    }

    /// Starting point for the fit, keyed by expanded parameter name.
    pub fn initial_values(&self) -> SipmResult<ParameterValues> {
        let mut values = ParameterValues::new();
        for parameter in &self.parameters {
            let value = parameter.default.ok_or_else(|| {
                SipmError::input_validation(
                    "INPUT.PARAMETER_UNSET",
                    format!("parameter '{}' has no default value", parameter.name),
                )
            })?;
            if parameter.base == LAMBDA && value > SUPPORTED_MEAN_LIMIT {
                tracing::warn!(
                    parameter = %parameter.name,
                    value,
                    limit = SUPPORTED_MEAN_LIMIT,
                    "illumination mean exceeds the range the truncated photo-electron sum represents accurately"
                );
            }
            values.insert(parameter.name.clone(), value);
        }
        Ok(values)
    }

    /// Collect the physical parameters of one illumination from named values.
    pub fn resolve(
        &self,
        values: &ParameterValues,
        illumination: usize,
    ) -> SipmResult<SpectrumParameters> {
        if illumination >= self.n_illuminations {
            return Err(SipmError::input_validation(
                "INPUT.ILLUMINATION_INDEX",
                format!(
                    "illumination {illumination} is out of range for {} illuminations",
                    self.n_illuminations
                ),
            ));
        }

        let value = |base: &str| self.value_for(values, base, illumination);
        Ok(SpectrumParameters {
            norm: value(NORM)?,
            eped: value(EPED)?,
            eped_sigma: value(EPED_SIGMA)?,
            spe: value(SPE)?,
            spe_sigma: value(SPE_SIGMA)?,
            lambda: value(LAMBDA)?,
            opct: value(OPCT)?,
            pap: value(PAP)?,
            dap: value(DAP)?,
        })
    }

    /// Apply every override or none of them; on error the schema is unchanged.
    pub fn apply_overrides(&mut self, overrides: &ParameterOverrides) -> SipmResult<()> {
        let mut parameters = self.parameters.clone();
        for (key, entry) in overrides.entries() {
            let mut matched = false;
            for parameter in parameters
                .iter_mut()
                .filter(|parameter| parameter.name == *key || parameter.base == *key)
            {
                matched = true;
                entry.apply_to(parameter);
                if parameter.lower > parameter.upper {
                    return Err(SipmError::input_validation(
                        "INPUT.PARAMETER_BOUNDS",
                        format!(
                            "parameter '{}' has lower bound {} above upper bound {}",
                            parameter.name, parameter.lower, parameter.upper
                        ),
                    ));
                }
            }

            if !matched {
                return Err(SipmError::input_validation(
                    "INPUT.PARAMETER_UNKNOWN",
                    format!("override names unknown parameter '{key}'"),
                ));
            }
        }

        self.parameters = parameters;
        for (key, _) in overrides.entries() {
            tracing::info!(parameter = %key, "parameter override applied");
        }
        Ok(())
    }

    fn value_for(&self, values: &ParameterValues, base: &str, illumination: usize) -> SipmResult<f64> {
        let parameter = self
            .parameters
            .iter()
            .find(|parameter| {
                parameter.base == base
                    && parameter.illumination.is_none_or(|index| index == illumination)
            })
            .ok_or_else(|| {
                SipmError::internal(
                    "SYS.PARAMETER_UNDECLARED",
                    format!("schema does not declare parameter '{base}'"),
                )
            })?;

        values.get(&parameter.name).copied().ok_or_else(|| {
            SipmError::input_validation(
                "INPUT.PARAMETER_MISSING",
                format!("parameter '{}' is not set", parameter.name),
            )
        })
    }
}

/// Name of a per-illumination parameter, e.g. `norm0` or `lambda_2`.
pub fn expanded_name(base: &str, illumination: usize) -> String {
    format!("{base}{illumination}")
}

#[cfg(test)]
mod tests {
    use super::{LAMBDA, NORM, ParameterSchema, ParameterSpec, ParameterValues, expanded_name};
    use crate::binding::parse_parameter_overrides;
    use crate::common::{SUPPORTED_MEAN_LIMIT, TRUNCATION_TAIL_TOLERANCE};
    use crate::numerics::truncation_tail_mass;

    #[test]
    fn sipm_schema_expands_per_illumination_parameters() {
        let schema = ParameterSchema::sipm(2);
        let names: Vec<&str> = schema
            .parameters()
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "norm0",
                "norm1",
                "eped",
                "eped_sigma",
                "spe",
                "spe_sigma",
                "lambda_0",
                "lambda_1",
                "opct",
                "pap",
                "dap"
            ]
        );

        let norm = schema.parameter("norm1").expect("norm1 declared");
        assert_eq!(norm.default, None);
        assert!(norm.fixed);
        assert_eq!((norm.lower, norm.upper), (0.0, 100_000.0));
        assert_eq!(norm.illumination, Some(1));

        let lambda = schema.parameter("lambda_0").expect("lambda_0 declared");
        assert_eq!(lambda.default, Some(0.7));
        assert_eq!((lambda.lower, lambda.upper), (0.001, 6.0));
        assert!(!lambda.fixed);

        assert_eq!(schema.free_parameters().count(), 9);
    }

    #[test]
    fn prepare_defaults_integrates_each_histogram() {
        let mut schema = ParameterSchema::sipm(2);
        let between = [0.0, 1.0, 2.0, 3.0];
        let histograms = vec![vec![0.0, 2.0, 2.0, 0.0], vec![1.0, 1.0, 1.0, 1.0]];

        schema
            .prepare_defaults(&histograms, &between)
            .expect("defaults should be prepared");

        assert_eq!(schema.parameter("norm0").and_then(|p| p.default), Some(4.0));
        assert_eq!(schema.parameter("norm1").and_then(|p| p.default), Some(3.0));
    }

    #[test]
    fn prepare_defaults_keeps_explicit_normalizations() {
        let mut schema = ParameterSchema::sipm(1);
        let overrides =
            parse_parameter_overrides(r#"{"norm0": {"default": 123.0}}"#).expect("overrides");
        schema.apply_overrides(&overrides).expect("override applies");

        schema
            .prepare_defaults(&[vec![5.0, 5.0]], &[0.0, 1.0])
            .expect("defaults should be prepared");
        assert_eq!(schema.parameter("norm0").and_then(|p| p.default), Some(123.0));
    }

    #[test]
    fn prepare_defaults_validates_histogram_shapes() {
        let mut schema = ParameterSchema::sipm(2);
        let error = schema
            .prepare_defaults(&[vec![1.0, 2.0]], &[0.0, 1.0])
            .expect_err("histogram count mismatch");
        assert_eq!(error.placeholder(), "INPUT.HISTOGRAM_COUNT");

        let error = schema
            .prepare_defaults(&[vec![1.0, 2.0], vec![1.0]], &[0.0, 1.0])
            .expect_err("histogram length mismatch");
        assert_eq!(error.placeholder(), "INPUT.HISTOGRAM");
        assert!(error.message().contains("illumination 1"));
        assert_eq!(schema.parameter("norm0").and_then(|p| p.default), None);
    }

    #[test]
    fn initial_values_require_every_default() {
        let schema = ParameterSchema::sipm(1);
        let error = schema
            .initial_values()
            .expect_err("normalization is unset before preparation");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER_UNSET");

        let mut schema = ParameterSchema::sipm(1);
        schema
            .prepare_defaults(&[vec![2.0, 2.0]], &[0.0, 1.0])
            .expect("defaults should be prepared");
        let values = schema.initial_values().expect("initial values");
        assert_eq!(values.len(), 9);
        assert_eq!(values["norm0"], 2.0);
        assert_eq!(values["spe"], 25.0);
    }

    #[test]
    fn resolve_selects_illumination_values() {
        let schema = ParameterSchema::sipm(2);
        let mut values = ParameterValues::new();
        for (name, value) in [
            ("norm0", 100.0),
            ("norm1", 200.0),
            ("eped", 1.0),
            ("eped_sigma", 4.0),
            ("spe", 21.0),
            ("spe_sigma", 1.5),
            ("lambda_0", 0.4),
            ("lambda_1", 1.4),
            ("opct", 0.3),
            ("pap", 0.1),
            ("dap", 0.6),
        ] {
            values.insert(name.to_string(), value);
        }

        let second = schema.resolve(&values, 1).expect("resolve");
        assert_eq!(second.norm, 200.0);
        assert_eq!(second.lambda, 1.4);
        assert_eq!(second.spe, 21.0);
        assert_eq!(second.dap, 0.6);

        let error = schema.resolve(&values, 2).expect_err("index out of range");
        assert_eq!(error.placeholder(), "INPUT.ILLUMINATION_INDEX");
    }

    #[test]
    fn resolve_reports_undeclared_parameters() {
        let mut schema = ParameterSchema::new(1);
        schema.add_parameter(ParameterSpec::new(NORM, Some(1.0), 0.0, 10.0).multi());
        let mut values = ParameterValues::new();
        values.insert(expanded_name(NORM, 0), 1.0);

        let error = schema.resolve(&values, 0).expect_err("eped is not declared");
        assert_eq!(error.placeholder(), "SYS.PARAMETER_UNDECLARED");
    }

    #[test]
    fn overrides_apply_by_base_or_expanded_name() {
        let mut schema = ParameterSchema::sipm(2);
        let overrides = parse_parameter_overrides(
            r#"{
                "lambda_": {"default": 1.2, "upper": 3.0},
                "lambda_1": {"fixed": true},
                "opct": {"lower": 0.0}
            }"#,
        )
        .expect("overrides");
        schema.apply_overrides(&overrides).expect("overrides apply");

        let first = schema.parameter("lambda_0").expect("lambda_0");
        let second = schema.parameter("lambda_1").expect("lambda_1");
        assert_eq!((first.default, first.upper, first.fixed), (Some(1.2), 3.0, false));
        assert_eq!((second.default, second.upper, second.fixed), (Some(1.2), 3.0, true));
        assert_eq!(schema.parameter("opct").map(|p| p.lower), Some(0.0));
        assert_eq!(schema.parameter(LAMBDA), None);
    }

    #[test]
    fn overrides_reject_unknown_names_and_inverted_bounds() {
        let mut schema = ParameterSchema::sipm(1);
        let unknown = parse_parameter_overrides(r#"{"gain": {"default": 1.0}}"#).expect("parse");
        let error = schema.apply_overrides(&unknown).expect_err("unknown parameter");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER_UNKNOWN");

        let inverted = parse_parameter_overrides(r#"{"spe": {"lower": 50.0}}"#).expect("parse");
        let error = schema.apply_overrides(&inverted).expect_err("lower above upper");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER_BOUNDS");
    }

    #[test]
    fn failed_overrides_leave_the_schema_unchanged() {
        let mut schema = ParameterSchema::sipm(1);
        let before = schema.clone();
        let overrides =
            parse_parameter_overrides(r#"{"eped": {"default": 5.0}, "spe": {"lower": 50.0}}"#)
                .expect("parse");

        let error = schema.apply_overrides(&overrides).expect_err("spe bounds are inverted");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER_BOUNDS");
        assert_eq!(schema, before);

        let overrides =
            parse_parameter_overrides(r#"{"eped": {"default": 5.0}, "gain": {"lower": 0.0}}"#)
                .expect("parse");
        let error = schema.apply_overrides(&overrides).expect_err("gain is unknown");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER_UNKNOWN");
        assert_eq!(schema, before);
    }

    #[test]
    fn prepare_defaults_rejects_parameters_beyond_the_histograms() {
        let mut schema: ParameterSchema = serde_json::from_str(
            r#"{
                "n_illuminations": 1,
                "parameters": [{
                    "name": "norm3", "base": "norm", "illumination": 3,
                    "default": null, "lower": 0.0, "upper": 10.0, "fixed": true
                }]
            }"#,
        )
        .expect("schema deserializes");

        let error = schema
            .prepare_defaults(&[vec![1.0, 1.0]], &[0.0, 1.0])
            .expect_err("illumination 3 has no histogram");
        assert_eq!(error.placeholder(), "INPUT.HISTOGRAM_COUNT");
        assert!(error.message().contains("norm3"));
    }

    #[test]
    fn lambda_fit_bound_reaches_past_the_supported_mean() {
        let schema = ParameterSchema::sipm(1);
        let lambda = schema.parameter("lambda_0").expect("lambda_0 declared");

        assert!(lambda.upper > SUPPORTED_MEAN_LIMIT);
        assert!(truncation_tail_mass(SUPPORTED_MEAN_LIMIT) < TRUNCATION_TAIL_TOLERANCE);
        assert!(truncation_tail_mass(lambda.upper) > 0.04);
    }

    #[test]
    fn schema_serializes_to_json() {
        let schema = ParameterSchema::sipm(1);
        let json = serde_json::to_value(&schema).expect("schema serializes");
        assert_eq!(json["n_illuminations"], 1);
        assert_eq!(json["parameters"][0]["name"], "norm0");
        assert!(json["parameters"][0]["default"].is_null());
    }
}
