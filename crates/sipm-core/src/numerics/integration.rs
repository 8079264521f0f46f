#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("trapezoidal integration requires at least 2 points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("trapezoidal input length mismatch: values={values}, grid={grid}")]
    LengthMismatch { values: usize, grid: usize },
    #[error("trapezoidal '{field}' must contain finite values, index {index} got {value}")]
    NonFiniteValue {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

/// Trapezoidal rule integral of `values` sampled on `grid`.
///
/// The grid need not be uniform; a decreasing grid yields a negated integral.
pub fn integrate_trapezoid(values: &[f64], grid: &[f64]) -> Result<f64, IntegrationError> {
    if values.len() != grid.len() {
        return Err(IntegrationError::LengthMismatch {
            values: values.len(),
            grid: grid.len(),
        });
    }
    if grid.len() < 2 {
        return Err(IntegrationError::InsufficientPoints { actual: grid.len() });
    }
    validate_finite("values", values)?;
    validate_finite("grid", grid)?;

    let mut sum = 0.0;
    let mut correction = 0.0;
    for (value_pair, grid_pair) in values.windows(2).zip(grid.windows(2)) {
        let area = 0.5 * (grid_pair[1] - grid_pair[0]) * (value_pair[0] + value_pair[1]);
        super::kahan_add(&mut sum, &mut correction, area);
    }

    Ok(sum)
}

fn validate_finite(field: &'static str, values: &[f64]) -> Result<(), IntegrationError> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(IntegrationError::NonFiniteValue {
            field,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
