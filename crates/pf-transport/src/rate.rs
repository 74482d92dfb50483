//! Net rates through pores and throats after a solve.

use pf_core::{Real, ensure_index, ensure_len};
use pf_network::Network;
use pf_phase::PropertyValues;
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// How rates over several elements are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMode {
    /// One summed value
    #[default]
    Group,
    /// One value per element
    Single,
}

/// Elements a rate is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTarget<'a> {
    Pores(&'a [usize]),
    Throats(&'a [usize]),
}

/// Signed rate through each throat, `flow[t] = g[t,0] * x[p1] - g[t,1] * x[p0]`.
///
/// Negative when the quantity moves from `p0` towards `p1`.
pub fn throat_flows(
    network: &Network,
    x: &[Real],
    conductance: &PropertyValues,
) -> TransportResult<Vec<Real>> {
    ensure_len(x.len(), network.num_pores(), "quantity")?;
    ensure_len(conductance.len(), network.num_throats(), "conductance")?;
    let g = conductance.to_pairs();
    Ok(network
        .conns()
        .iter()
        .zip(&g)
        .map(|(&[p0, p1], &[g01, g10])| g01 * x[p1] - g10 * x[p0])
        .collect())
}

/// Net rate at the target elements.
///
/// Throat rates are magnitudes. A pore's rate is its net efflux, so a
/// pore held by a positive rate condition reports that rate.
pub fn rate(
    network: &Network,
    x: &[Real],
    conductance: &PropertyValues,
    target: RateTarget<'_>,
    mode: RateMode,
) -> TransportResult<Vec<Real>> {
    let flows = throat_flows(network, x, conductance)?;
    let values: Vec<Real> = match target {
        RateTarget::Throats(throats) => throats
            .iter()
            .map(|&t| ensure_index(t, flows.len(), "throat").map(|t| flows[t].abs()))
            .collect::<Result<_, _>>()?,
        RateTarget::Pores(pores) => {
            let mut net = vec![0.0; network.num_pores()];
            for (&[p0, p1], &q) in network.conns().iter().zip(&flows) {
                net[p0] -= q;
                net[p1] += q;
            }
            pores
                .iter()
                .map(|&p| ensure_index(p, net.len(), "pore").map(|p| net[p]))
                .collect::<Result<_, _>>()?
        }
    };
    if values.is_empty() {
        return Err(TransportError::input("no pores or throats given"));
    }
    Ok(match mode {
        RateMode::Group => vec![values.iter().sum()],
        RateMode::Single => values,
    })
}
