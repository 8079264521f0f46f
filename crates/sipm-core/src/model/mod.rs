//! Expected charge spectrum of a photon-counting SiPM.
//!
//! The model follows Gentile et al. (2010): Poisson-distributed
//! photo-electrons, a binomial crosstalk cascade, and a one-afterpulse branch
//! drawn as a shifted copy of each photo-electron peak.

pub mod afterpulse;
pub mod components;
pub mod crosstalk;
pub mod spectrum;

pub use afterpulse::AfterpulseSplit;
pub use components::{
    PEAK_COUNT, PeakShape, peak_weights, pedestal_signal, photoelectron_peaks,
    photoelectron_signal, sum_over_counts,
};
pub use crosstalk::crosstalk_mixture;
pub use spectrum::{SpectrumModel, SpectrumParameters, evaluate_spectrum};
