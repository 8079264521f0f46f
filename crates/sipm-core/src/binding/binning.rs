use crate::domain::{SipmError, SipmResult};
use crate::numerics::linear_grid;
use serde::{Deserialize, Serialize};

/// Histogram binning of the charge axis the spectra are fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBinning {
    pub n_bins: usize,
    pub lower: f64,
    pub upper: f64,
}

impl Default for HistogramBinning {
    fn default() -> Self {
        Self {
            n_bins: 100,
            lower: -40.0,
            upper: 150.0,
        }
    }
}

impl HistogramBinning {
    pub fn new(n_bins: usize, lower: f64, upper: f64) -> SipmResult<Self> {
        let binning = Self {
            n_bins,
            lower,
            upper,
        };
        binning.validate()?;
        Ok(binning)
    }

    pub fn validate(&self) -> SipmResult<()> {
        if self.n_bins == 0 {
            return Err(SipmError::input_validation(
                "INPUT.BINNING",
                "histogram binning needs at least one bin",
            ));
        }
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(SipmError::input_validation(
                "INPUT.BINNING",
                format!(
                    "histogram range must be finite and increasing, got [{}, {}]",
                    self.lower, self.upper
                ),
            ));
        }
        Ok(())
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.n_bins as f64
    }

    pub fn bin_edges(&self) -> SipmResult<Vec<f64>> {
        self.validate()?;
        linear_grid(self.lower, self.upper, self.n_bins + 1).ok_or_else(|| {
            SipmError::internal("SYS.BINNING", "bin edge grid could not be built")
        })
    }

    /// Midpoints between consecutive edges; the grid histograms are
    /// integrated and the model is evaluated on.
    pub fn bin_centers(&self) -> SipmResult<Vec<f64>> {
        let edges = self.bin_edges()?;
        Ok(edges
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect())
    }
}
