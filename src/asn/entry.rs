//! Autonomous system range entries and belonging network computation.

use std::net::Ipv4Addr;

use ipnet::{Ipv4Net, Ipv4Subnets};
use serde::Serialize;

use crate::error_handling::AsnError;

/// One row of the IP-to-AS range table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutonomousSystemEntry {
    pub number: u32,
    pub description: String,
    pub country_code: String,
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl AutonomousSystemEntry {
    pub fn new(
        number: u32,
        description: impl Into<String>,
        country_code: impl Into<String>,
        start: Ipv4Addr,
        end: Ipv4Addr,
    ) -> Self {
        Self {
            number,
            description: description.into(),
            country_code: country_code.into(),
            start,
            end,
        }
    }

    pub fn covers(&self, address: Ipv4Addr) -> bool {
        self.start <= address && address <= self.end
    }

    /// Minimal set of CIDR blocks exactly covering `[start, end]`.
    pub fn networks(&self) -> Vec<Ipv4Net> {
        Ipv4Subnets::new(self.start, self.end, 0).collect()
    }

    /// The CIDR block of this range that contains `address`.
    ///
    /// # Errors
    ///
    /// `AsnError::NetworkComputation` when no block of the range contains the
    /// address, which only happens when the address lies outside the range.
    pub fn belonging_network(&self, address: Ipv4Addr) -> Result<Ipv4Net, AsnError> {
        self.networks()
            .into_iter()
            .find(|network| network.contains(&address))
            .ok_or(AsnError::NetworkComputation {
                address,
                as_number: self.number,
                start: self.start,
                end: self.end,
            })
    }
}
