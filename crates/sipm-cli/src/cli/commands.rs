use super::CliError;
use super::helpers::{
    ensure_finite_curve, read_overrides, read_parameter_values, render_curve, write_output,
};
use anyhow::Context;
use clap::Args;
use sipm_core::binding::{HistogramBinning, ParameterSchema};
use sipm_core::common::SUPPORTED_MEAN_LIMIT;
use sipm_core::model::SpectrumModel;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// JSON object of named parameter values, e.g. {"norm0": 1000.0, "lambda_0": 0.7, ...}
    #[arg(long, value_name = "FILE")]
    params: PathBuf,

    /// Number of illuminations the parameter names are expanded for
    #[arg(long, default_value_t = 1)]
    illuminations: usize,

    /// Illumination index to evaluate
    #[arg(long, default_value_t = 0)]
    illumination: usize,

    #[arg(long, default_value_t = HistogramBinning::default().n_bins)]
    bins: usize,

    #[arg(long, default_value_t = HistogramBinning::default().lower, allow_negative_numbers = true)]
    min: f64,

    #[arg(long, default_value_t = HistogramBinning::default().upper, allow_negative_numbers = true)]
    max: f64,

    /// CSV destination; stdout when omitted
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[arg(long, default_value_t = 1)]
    illuminations: usize,

    /// JSON parameter overrides applied on top of the defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    let binning = HistogramBinning::new(args.bins, args.min, args.max)?;
    let between = binning.bin_centers()?;
    let values = read_parameter_values(&args.params)?;

    let model = SpectrumModel::with_illuminations(args.illuminations);
    let params = model.schema().resolve(&values, args.illumination)?;
    if params.lambda > SUPPORTED_MEAN_LIMIT {
        tracing::warn!(
            lambda = params.lambda,
            limit = SUPPORTED_MEAN_LIMIT,
            "illumination mean is beyond the accurately truncated range"
        );
    }
    let curve = model.evaluate(&between, &params);
    ensure_finite_curve(&between, &curve)?;
    tracing::debug!(
        illumination = args.illumination,
        bins = binning.n_bins,
        "evaluated spectrum"
    );

    write_output(args.output.as_deref(), &render_curve(&between, &curve))?;
    if let Some(output) = &args.output {
        println!("Wrote {} points to {}", curve.len(), output.display());
    }
    Ok(0)
}

pub(super) fn run_schema_command(args: SchemaArgs) -> Result<i32, CliError> {
    let mut schema = ParameterSchema::sipm(args.illuminations);
    let overrides = read_overrides(args.config.as_deref())?;
    if !overrides.is_empty() {
        schema.apply_overrides(&overrides)?;
    }

    let rendered = serde_json::to_string_pretty(&schema).context("failed to render schema")?;
    write_output(None, &format!("{rendered}\n"))?;
    Ok(0)
}
