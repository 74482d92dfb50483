//! Per-property data health.

use std::collections::BTreeMap;

use crate::phase::Phase;

/// Health of one property array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// `count` elements hold NaN or infinite values.
    NonFinite { count: usize },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl Phase {
    /// Health of every stored property, keyed by property name.
    pub fn check_data_health(&self) -> BTreeMap<String, HealthStatus> {
        self.props()
            .iter()
            .map(|(name, values)| {
                let count = values.nonfinite_count();
                let status = if count == 0 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::NonFinite { count }
                };
                (name.clone(), status)
            })
            .collect()
    }

    /// Names of properties holding non-finite values.
    pub fn unhealthy_props(&self) -> Vec<String> {
        self.check_data_health()
            .into_iter()
            .filter(|(_, status)| !status.is_healthy())
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_network::NetworkBuilder;

    #[test]
    fn reports_nonfinite_properties() {
        let net = NetworkBuilder::from_conns(2, vec![[0, 1]]).build().unwrap();
        let mut phase = Phase::new("water", &net);
        phase.set("pore.a", vec![1.0, f64::NAN]).unwrap();
        phase.set("pore.b", vec![1.0, 2.0]).unwrap();
        phase.set("throat.c", vec![f64::INFINITY]).unwrap();

        let health = phase.check_data_health();
        assert_eq!(health["pore.a"], HealthStatus::NonFinite { count: 1 });
        assert!(health["pore.b"].is_healthy());
        assert_eq!(
            phase.unhealthy_props(),
            vec!["pore.a".to_string(), "throat.c".to_string()]
        );
    }
}
