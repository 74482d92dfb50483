//! Network validation logic.

use crate::error::{NetworkError, NetworkResult};

/// Validate throat connections: endpoints exist and differ.
pub(crate) fn validate_conns(num_pores: usize, conns: &[[usize; 2]]) -> NetworkResult<()> {
    for (t, &[a, b]) in conns.iter().enumerate() {
        for pore in [a, b] {
            if pore >= num_pores {
                return Err(NetworkError::InvalidPoreRef { throat: t, pore });
            }
        }
        if a == b {
            return Err(NetworkError::SelfLoop { throat: t, pore: a });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_empty_network() {
        assert!(validate_conns(0, &[]).is_ok());
    }

    #[test]
    fn validate_invalid_pore_ref() {
        let result = validate_conns(2, &[[0, 1], [1, 99]]);
        assert_eq!(
            result.unwrap_err(),
            NetworkError::InvalidPoreRef {
                throat: 1,
                pore: 99
            }
        );
    }

    #[test]
    fn validate_self_loop() {
        let result = validate_conns(3, &[[0, 1], [2, 2]]);
        assert_eq!(
            result.unwrap_err(),
            NetworkError::SelfLoop { throat: 1, pore: 2 }
        );
    }
}
