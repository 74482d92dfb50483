//! A network plus the phases defined on it.

use std::collections::BTreeMap;

use pf_network::Network;

use crate::error::{PhaseError, PhaseResult};
use crate::phase::Phase;

/// Owns the network and every phase, addressed by name.
#[derive(Debug)]
pub struct Project {
    network: Network,
    phases: BTreeMap<String, Phase>,
}

impl Project {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            phases: BTreeMap::new(),
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Create an empty phase sized to the network and return it.
    pub fn add_phase(&mut self, name: &str) -> PhaseResult<&mut Phase> {
        if self.phases.contains_key(name) {
            return Err(PhaseError::DuplicatePhase {
                name: name.to_string(),
            });
        }
        let phase = Phase::new(name, &self.network);
        Ok(self.phases.entry(name.to_string()).or_insert(phase))
    }

    pub fn phase(&self, name: &str) -> PhaseResult<&Phase> {
        self.phases.get(name).ok_or_else(|| PhaseError::UnknownPhase {
            name: name.to_string(),
        })
    }

    pub fn phase_mut(&mut self, name: &str) -> PhaseResult<&mut Phase> {
        self.phases
            .get_mut(name)
            .ok_or_else(|| PhaseError::UnknownPhase {
                name: name.to_string(),
            })
    }

    /// Network and one phase, borrowed together.
    pub fn split_mut(&mut self, name: &str) -> PhaseResult<(&Network, &mut Phase)> {
        let phase = self
            .phases
            .get_mut(name)
            .ok_or_else(|| PhaseError::UnknownPhase {
                name: name.to_string(),
            })?;
        Ok((&self.network, phase))
    }

    pub fn phase_names(&self) -> impl Iterator<Item = &str> {
        self.phases.keys().map(String::as_str)
    }
}
