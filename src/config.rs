//! Run configuration: site constants, domain geometry, search parallelism
//! and the dispersion model selector.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::{FootprintError, Result};

/// Dispersion model variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Log-wind-profile similarity footprint (Hsieh et al. 2000).
    #[default]
    LogProfile,
    /// Analytical advection-diffusion footprint (Kormann & Meixner 2001).
    AnalyticalDiffusion,
}

impl FromStr for Method {
    type Err = FootprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LogProfile" | "Hsieh" => Ok(Method::LogProfile),
            "AnalyticalDiffusion" | "Kormann & Meixner" => Ok(Method::AnalyticalDiffusion),
            other => Err(FootprintError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::LogProfile => f.write_str("LogProfile"),
            Method::AnalyticalDiffusion => f.write_str("AnalyticalDiffusion"),
        }
    }
}

/// Number of threads used by the nearest-neighbour search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Workers {
    #[default]
    Single,
    Count(NonZeroUsize),
    /// Every logical core the platform reports.
    All,
}

impl Workers {
    /// `-1` means all cores, any positive value is an explicit count.
    pub fn from_hint(hint: i64) -> Result<Self> {
        match hint {
            -1 => Ok(Workers::All),
            1 => Ok(Workers::Single),
            n if n > 1 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Workers::Count)
                .ok_or(FootprintError::InvalidWorkers(n)),
            n => Err(FootprintError::InvalidWorkers(n)),
        }
    }

    pub fn threads(self) -> usize {
        match self {
            Workers::Single => 1,
            Workers::Count(n) => n.get(),
            Workers::All => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FootprintConfig {
    /// Measurement height above the displacement plane (m).
    pub instrument_height: f64,
    /// Aerodynamic roughness length (m).
    pub roughness_length: f64,
    /// Upwind extent of the computational grid (m).
    pub domain_length: f64,
    /// Grid spacing (m).
    pub resolution: f64,
    pub workers: Workers,
    pub method: Method,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            instrument_height: 2.5,
            roughness_length: 0.0206,
            domain_length: 1000.0,
            resolution: 5.0,
            workers: Workers::Single,
            method: Method::LogProfile,
        }
    }
}

impl FootprintConfig {
    pub fn new(instrument_height: f64, roughness_length: f64) -> Self {
        Self {
            instrument_height,
            roughness_length,
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain_length: f64, resolution: f64) -> Self {
        self.domain_length = domain_length;
        self.resolution = resolution;
        self
    }

    pub fn with_workers(mut self, workers: Workers) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Reject geometry that would produce a zero-size grid.
    pub fn validate(&self) -> Result<()> {
        validate_domain(self.domain_length, self.resolution)
    }
}

pub(crate) fn validate_domain(domain_length: f64, resolution: f64) -> Result<()> {
    let ok = domain_length.is_finite()
        && resolution.is_finite()
        && domain_length > 0.0
        && resolution > 0.0
        && (domain_length / resolution).floor() >= 1.0;
    if ok {
        Ok(())
    } else {
        Err(FootprintError::InvalidDomain {
            domain_length,
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_and_aliases() {
        assert_eq!("LogProfile".parse::<Method>().unwrap(), Method::LogProfile);
        assert_eq!("Hsieh".parse::<Method>().unwrap(), Method::LogProfile);
        assert_eq!(
            "Kormann & Meixner".parse::<Method>().unwrap(),
            Method::AnalyticalDiffusion
        );
        assert!(matches!(
            "Gaussian".parse::<Method>(),
            Err(FootprintError::UnknownMethod(m)) if m == "Gaussian"
        ));
    }

    #[test]
    fn test_workers_hint() {
        assert_eq!(Workers::from_hint(1).unwrap(), Workers::Single);
        assert_eq!(Workers::from_hint(4).unwrap().threads(), 4);
        assert!(Workers::from_hint(-1).unwrap().threads() >= 1);
        assert!(Workers::from_hint(0).is_err());
        assert!(Workers::from_hint(-3).is_err());
    }

    #[test]
    fn test_validate_domain() {
        assert!(FootprintConfig::default().validate().is_ok());
        assert!(FootprintConfig::default().with_domain(0.0, 5.0).validate().is_err());
        assert!(FootprintConfig::default().with_domain(100.0, -1.0).validate().is_err());
        assert!(FootprintConfig::default().with_domain(4.0, 5.0).validate().is_err());
        assert!(FootprintConfig::default().with_domain(5.0, 5.0).validate().is_ok());
    }
}
