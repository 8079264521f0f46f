use anyhow::Context;
use sipm_core::binding::{ParameterOverrides, ParameterValues, load_parameter_overrides};
use sipm_core::domain::{SipmError, SipmResult};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub(super) fn read_parameter_values(path: &Path) -> SipmResult<ParameterValues> {
    let source = fs::read_to_string(path).map_err(|source| {
        SipmError::io_system(
            "IO.PARAMETERS",
            format!("failed to read parameter values '{}': {}", path.display(), source),
        )
    })?;
    serde_json::from_str(&source).map_err(|source| {
        SipmError::input_validation(
            "INPUT.PARAMETERS",
            format!("failed to parse parameter values '{}': {}", path.display(), source),
        )
    })
}

pub(super) fn read_overrides(path: Option<&Path>) -> SipmResult<ParameterOverrides> {
    match path {
        Some(path) => Ok(load_parameter_overrides(path)?),
        None => Ok(ParameterOverrides::default()),
    }
}

/// The evaluator does not check spreads or probabilities; a zero spread or an
/// out-of-range probability surfaces here as a non-finite or negative value.
pub(super) fn ensure_finite_curve(x: &[f64], y: &[f64]) -> SipmResult<()> {
    match x.iter().zip(y).find(|(_, value)| !value.is_finite() || **value < 0.0) {
        Some((point, value)) => Err(SipmError::computation(
            "RUN.SPECTRUM_INVALID",
            format!("model value {value} at x={point} is not a finite non-negative density"),
        )),
        None => Ok(()),
    }
}

pub(super) fn render_curve(x: &[f64], y: &[f64]) -> String {
    let mut rendered = String::from("x,y\n");
    for (x, y) in x.iter().zip(y) {
        rendered.push_str(&format!("{x},{y}\n"));
    }
    rendered
}

pub(super) fn write_output(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create '{}'", parent.display()))?;
            }
            fs::write(path, contents)
                .with_context(|| format!("failed to write '{}'", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}
