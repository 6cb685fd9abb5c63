//! Kernel front-end for IIR design.

use super::{design_ba, BaFormatFilter, FilterBandType, FilterMethod};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::traits::IirDesign;
use alloc::{format, vec, vec::Vec};

/// Constructor config for [`IirDesignKernel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IirDesignConfig {
    /// Filter order.
    pub order: usize,
    /// Critical frequencies normalised to Nyquist.
    pub wn: Vec<f64>,
    /// Band type.
    pub btype: FilterBandType,
    /// Prototype family.
    pub method: FilterMethod,
}

impl Default for IirDesignConfig {
    fn default() -> Self {
        Self {
            order: 3,
            wn: vec![],
            btype: FilterBandType::Bandpass,
            method: FilterMethod::Butterworth,
        }
    }
}

/// Validated Butterworth/Bessel design kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct IirDesignKernel {
    order: usize,
    wn: Vec<f64>,
    btype: FilterBandType,
    method: FilterMethod,
}

impl KernelLifecycle for IirDesignKernel {
    type Config = IirDesignConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.order == 0 {
            return Err(ConfigError::invalid("order", "must be >= 1, got 0"));
        }
        if config.wn.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "wn" });
        }
        let n_edges = config.btype.n_edges();
        if config.wn.len() != n_edges {
            return Err(ConfigError::invalid(
                "wn",
                format!(
                    "{} designs require {n_edges} critical frequencies, got {:?}",
                    config.btype, config.wn
                ),
            ));
        }
        if let Some(w) = config.wn.iter().find(|w| !(**w > 0. && **w < 1.)) {
            return Err(ConfigError::invalid(
                "wn",
                format!("normalised critical frequencies must satisfy 0 < wn < 1, got {w}"),
            ));
        }
        if n_edges == 2 && config.wn[0] >= config.wn[1] {
            return Err(ConfigError::invalid(
                "wn",
                format!(
                    "wn[0] must be less than wn[1], got {:?}",
                    config.wn.as_slice()
                ),
            ));
        }
        Ok(Self {
            order: config.order,
            wn: config.wn,
            btype: config.btype,
            method: config.method,
        })
    }
}

impl IirDesign<f64> for IirDesignKernel {
    type Output = BaFormatFilter<f64>;

    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation> {
        design_ba(self.order, &self.wn, self.btype, self.method)
            .map_err(ExecInvariantViolation::from)
    }
}
