//! Resource records as learned facts.
//!
//! A record is `(name, type, values)`. Its identity inside the store is the
//! explicit `RecordKey` `(name, type)`: the value payload is deliberately not
//! part of it, so two records with the same key but different values are
//! indistinguishable to the store.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use super::name::DomainName;
use crate::error_handling::RecordError;

/// The record types the dependency mapper understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    MX,
}

impl RecordType {
    /// The literal token used in snapshots and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "NS" => Ok(RecordType::NS),
            "CNAME" => Ok(RecordType::CNAME),
            "MX" => Ok(RecordType::MX),
            _ => Err(RecordError::UnknownType(s.trim().to_string())),
        }
    }
}

/// Composite identity of a record inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub name: DomainName,
    pub rtype: RecordType,
}

impl RecordKey {
    pub fn new(name: DomainName, rtype: RecordType) -> Self {
        Self { name, rtype }
    }
}

/// A resource record: a name, a type and an ordered list of values.
///
/// Values are stored normalized: dotted quads for `A`, fully-qualified names
/// for `NS`/`CNAME`, and `"priority name"` pairs for `MX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RRecord {
    name: DomainName,
    rtype: RecordType,
    values: Vec<String>,
}

impl RRecord {
    /// Builds a record, validating and normalizing every value for its type.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NoValues` for an empty value list and
    /// `RecordError::InvalidValue` when a value does not fit the type.
    pub fn new(name: DomainName, rtype: RecordType, values: Vec<String>) -> Result<Self, RecordError> {
        if values.is_empty() {
            return Err(RecordError::NoValues {
                name: name.to_string(),
                rtype,
            });
        }
        let values = values
            .iter()
            .map(|value| normalize_value(rtype, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, rtype, values })
    }

    /// Convenience constructor from string slices.
    pub fn from_parts(name: &str, rtype: RecordType, values: &[&str]) -> Result<Self, RecordError> {
        let name = DomainName::new(name)?;
        Self::new(name, rtype, values.iter().map(|v| v.to_string()).collect())
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn rtype(&self) -> RecordType {
        self.rtype
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First value of the record. Records are never empty.
    pub fn first_value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.name.clone(), self.rtype)
    }

    /// Domain names carried by the values (`NS`, `CNAME` targets, `MX` exchanges).
    ///
    /// `A` records carry no names and yield an empty list.
    pub fn value_names(&self) -> Vec<DomainName> {
        match self.rtype {
            RecordType::A => Vec::new(),
            RecordType::NS | RecordType::CNAME => self
                .values
                .iter()
                .filter_map(|v| DomainName::new(v).ok())
                .collect(),
            RecordType::MX => self
                .values
                .iter()
                .filter_map(|v| parse_mx_value(v).map(|(_, exchange)| exchange))
                .collect(),
        }
    }

    /// IPv4 addresses carried by an `A` record.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        match self.rtype {
            RecordType::A => self.values.iter().filter_map(|v| v.parse().ok()).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for RRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t[{}]", self.name, self.rtype, self.values.join(","))
    }
}

/// Splits an MX value `"priority name"` into its parts.
pub fn parse_mx_value(value: &str) -> Option<(u16, DomainName)> {
    let mut parts = value.split_whitespace();
    let priority = parts.next()?.parse().ok()?;
    let exchange = DomainName::new(parts.next()?).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((priority, exchange))
}

/// Validates a single value against the rule of its record type and returns
/// its normalized spelling.
pub(crate) fn normalize_value(rtype: RecordType, value: &str) -> Result<String, RecordError> {
    let invalid = || RecordError::InvalidValue {
        rtype,
        value: value.to_string(),
    };
    match rtype {
        RecordType::A => value
            .trim()
            .parse::<Ipv4Addr>()
            .map(|ip| ip.to_string())
            .map_err(|_| invalid()),
        RecordType::NS | RecordType::CNAME => DomainName::new(value)
            .map(|name| name.to_string())
            .map_err(|_| invalid()),
        RecordType::MX => parse_mx_value(value)
            .map(|(priority, exchange)| format!("{priority} {exchange}"))
            .ok_or_else(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_record_type_tokens() {
        for rtype in RecordType::iter() {
            assert_eq!(rtype.as_str().parse::<RecordType>().unwrap(), rtype);
        }
        assert_eq!("cname".parse::<RecordType>().unwrap(), RecordType::CNAME);
        assert!(matches!(
            "TXT".parse::<RecordType>(),
            Err(RecordError::UnknownType(_))
        ));
    }

    #[test]
    fn test_values_are_normalized() {
        let ns = RRecord::from_parts("Example.com", RecordType::NS, &["NS1.Example.com"]).unwrap();
        assert_eq!(ns.values(), &["ns1.example.com.".to_string()]);

        let mx = RRecord::from_parts("example.com", RecordType::MX, &["10   MX.example.com"]).unwrap();
        assert_eq!(mx.first_value(), "10 mx.example.com.");
    }

    #[test]
    fn test_rejects_values_of_wrong_shape() {
        assert!(matches!(
            RRecord::from_parts("a.example.", RecordType::A, &["not-an-ip"]),
            Err(RecordError::InvalidValue { .. })
        ));
        assert!(matches!(
            RRecord::from_parts("a.example.", RecordType::MX, &["mx.example."]),
            Err(RecordError::InvalidValue { .. })
        ));
        assert!(matches!(
            RRecord::from_parts("a.example.", RecordType::A, &[]),
            Err(RecordError::NoValues { .. })
        ));
    }

    #[test]
    fn test_key_ignores_values() {
        let first = RRecord::from_parts("a.example.", RecordType::A, &["10.0.0.1"]).unwrap();
        let second = RRecord::from_parts("a.example.", RecordType::A, &["10.0.0.2"]).unwrap();
        assert_eq!(first.key(), second.key());
        assert_ne!(first, second);
    }

    #[test]
    fn test_value_names_per_type() {
        let mx = RRecord::from_parts("example.com.", RecordType::MX, &["5 mx1.example.com.", "10 mx2.example.com."])
            .unwrap();
        let names: Vec<String> = mx.value_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["mx1.example.com.", "mx2.example.com."]);

        let a = RRecord::from_parts("ns.example.", RecordType::A, &["10.0.0.1"]).unwrap();
        assert!(a.value_names().is_empty());
        assert_eq!(a.addresses(), vec![Ipv4Addr::new(10, 0, 0, 1)]);
    }
}
