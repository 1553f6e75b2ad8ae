use std::path::PathBuf;

use crate::error::Result;
use crate::math::MATCH_TOL;
use crate::operations::tolerance::check_tolerance;

/// Tolerances and output locations shared by the coupling operations.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    /// Relative positional tolerance (fraction of the local face size).
    pub match_tol: f64,
    /// Absolute error allowed per normal or tensor comparison.
    pub abs_tol: f64,
    /// Where to dump OBJ files when face matching fails. `None` disables.
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            match_tol: MATCH_TOL,
            abs_tol: MATCH_TOL,
            diagnostics_dir: None,
        }
    }
}

impl MatchSettings {
    /// Sets both tolerances.
    #[must_use]
    pub fn with_tolerance(mut self, match_tol: f64, abs_tol: f64) -> Self {
        self.match_tol = match_tol;
        self.abs_tol = abs_tol;
        self
    }

    /// Enables diagnostic dumps into `dir`.
    #[must_use]
    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = Some(dir.into());
        self
    }

    /// Checks that both tolerances are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ContractError::InvalidTolerance`] naming the
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        check_tolerance("match_tol", self.match_tol)?;
        check_tolerance("abs_tol", self.abs_tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_crate_tolerance() {
        let s = MatchSettings::default();
        assert!((s.match_tol - MATCH_TOL).abs() < f64::EPSILON);
        assert!((s.abs_tol - MATCH_TOL).abs() < f64::EPSILON);
        assert!(s.diagnostics_dir.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn bad_tolerance_is_rejected() {
        assert!(MatchSettings::default().with_tolerance(-1.0, 1e-3).validate().is_err());
        assert!(MatchSettings::default().with_tolerance(1e-3, f64::NAN).validate().is_err());
    }
}
