//! Relaxation and convergence tests for iterative runs.

use std::collections::BTreeMap;

use pf_core::{Real, relative_change};

use crate::error::TransportResult;
use crate::settings::ReactiveSettings;

/// `x = w * x_new + (1 - w) * x`.
pub fn relax(x: &mut [Real], x_new: &[Real], w: Real) {
    for (xi, &ni) in x.iter_mut().zip(x_new) {
        *xi = w * ni + (1.0 - w) * *xi;
    }
}

/// Outcome of one convergence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceReport {
    /// Relative change in `x` over the cycle
    pub dx: Real,
    /// Relative residual `|A x - b| / |b|` of the rebuilt system
    pub residual: Real,
    /// Largest relative change of a tracked property
    pub dprops: Real,
    pub solver_converged: bool,
    pub converged: bool,
}

/// Decides when a sequence of assemble/solve cycles has converged.
#[derive(Debug, Clone)]
pub struct IterativeController {
    settings: ReactiveSettings,
}

impl IterativeController {
    pub fn new(settings: ReactiveSettings) -> TransportResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ReactiveSettings {
        &self.settings
    }

    pub fn relaxation_factor(&self) -> Real {
        self.settings.relaxation_factor
    }

    pub fn max_iter(&self) -> usize {
        self.settings.max_iter
    }

    /// Compare the state before and after a cycle.
    ///
    /// A property present after the cycle but not before counts as an
    /// unbounded change.
    pub fn check(
        &self,
        x_old: &[Real],
        x_new: &[Real],
        props_old: &BTreeMap<String, Vec<Real>>,
        props_new: &BTreeMap<String, Vec<Real>>,
        residual: Real,
        solver_converged: bool,
    ) -> ConvergenceReport {
        let dx = relative_change(x_new, x_old);
        let dprops = props_new
            .iter()
            .map(|(name, new)| match props_old.get(name) {
                Some(old) if old.len() == new.len() => relative_change(new, old),
                _ => Real::INFINITY,
            })
            .fold(0.0, Real::max);
        let converged = solver_converged
            && dx <= self.settings.x_rtol
            && dprops <= self.settings.x_rtol
            && residual <= self.settings.f_rtol;
        ConvergenceReport {
            dx,
            residual,
            dprops,
            solver_converged,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relax_blends_old_and_new() {
        let mut x = vec![0.0, 10.0];
        relax(&mut x, &[10.0, 0.0], 0.25);
        assert_eq!(x, vec![2.5, 7.5]);
        relax(&mut x, &[1.0, 1.0], 1.0);
        assert_eq!(x, vec![1.0, 1.0]);
    }

    #[test]
    fn rejects_bad_settings() {
        let settings = ReactiveSettings {
            relaxation_factor: 0.0,
            ..ReactiveSettings::default()
        };
        assert!(IterativeController::new(settings).is_err());
    }

    #[test]
    fn every_criterion_must_hold() {
        let ctl = IterativeController::new(ReactiveSettings::default()).unwrap();
        let none = BTreeMap::new();
        let x = [1.0, 2.0];

        assert!(ctl.check(&x, &x, &none, &none, 0.0, true).converged);
        assert!(!ctl.check(&x, &x, &none, &none, 0.0, false).converged);
        assert!(!ctl.check(&x, &x, &none, &none, 1e-3, true).converged);
        assert!(!ctl.check(&[0.0, 0.0], &x, &none, &none, 0.0, true).converged);

        let old = BTreeMap::from([("pore.k".to_string(), vec![1.0, 1.0])]);
        let new = BTreeMap::from([("pore.k".to_string(), vec![1.0, 2.0])]);
        let report = ctl.check(&x, &x, &old, &new, 0.0, true);
        assert!(!report.converged);
        assert!(report.dprops > 0.4);
        assert_eq!(ctl.check(&x, &x, &none, &new, 0.0, true).dprops, Real::INFINITY);
    }
}
