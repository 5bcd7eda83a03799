//! Vendor detection from device serial numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor profile selected for a transformation job. Exactly one profile is
/// chosen per job; unrecognized serials fall back to [`Vendor::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Hp,
    Canon,
    Epson,
    Brother,
    Samsung,
    Lexmark,
    Generic,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Vendor::Hp => "HP",
            Vendor::Canon => "Canon",
            Vendor::Epson => "Epson",
            Vendor::Brother => "Brother",
            Vendor::Samsung => "Samsung",
            Vendor::Lexmark => "Lexmark",
            Vendor::Generic => "Generic",
        };
        f.write_str(name)
    }
}

/// One serial-number heuristic: a vendor matches when the normalized serial
/// starts with `prefix` or contains any of `infixes`.
struct VendorProbe {
    vendor: Vendor,
    prefix: &'static str,
    infixes: &'static [&'static str],
}

/// Probes are evaluated in this order and the first match wins. Serials can
/// satisfy several probes at once (e.g. a serial containing both "CN" and
/// "EPSON"), so the order is part of the contract.
const PROBES: &[VendorProbe] = &[
    VendorProbe { vendor: Vendor::Hp, prefix: "HP", infixes: &["CN", "SG"] },
    VendorProbe { vendor: Vendor::Canon, prefix: "K", infixes: &["CANON"] },
    VendorProbe { vendor: Vendor::Epson, prefix: "X", infixes: &["EPSON"] },
    VendorProbe { vendor: Vendor::Brother, prefix: "E", infixes: &["BROTHER"] },
    VendorProbe { vendor: Vendor::Samsung, prefix: "Z", infixes: &["SAMSUNG"] },
    VendorProbe { vendor: Vendor::Lexmark, prefix: "2", infixes: &["LEXMARK"] },
];

/// Map a serial number to its vendor profile.
///
/// The serial is trimmed and uppercased before matching; classification is
/// total and never fails.
pub fn classify(serial: &str) -> Vendor {
    let serial = serial.to_uppercase();
    let serial = serial.trim();

    for probe in PROBES {
        if serial.starts_with(probe.prefix)
            || probe.infixes.iter().any(|infix| serial.contains(infix))
        {
            return probe.vendor;
        }
    }

    Vendor::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches() {
        assert_eq!(classify("HP123456789"), Vendor::Hp);
        assert_eq!(classify("K9000"), Vendor::Canon);
        assert_eq!(classify("X500"), Vendor::Epson);
        assert_eq!(classify("E77"), Vendor::Brother);
        assert_eq!(classify("Z1"), Vendor::Samsung);
        assert_eq!(classify("2024A"), Vendor::Lexmark);
    }

    #[test]
    fn test_infix_matches() {
        assert_eq!(classify("CANONXYZ"), Vendor::Canon);
        assert_eq!(classify("ABCN99"), Vendor::Hp);
        assert_eq!(classify("00SG11"), Vendor::Hp);
        assert_eq!(classify("A-EPSON-B"), Vendor::Epson);
        assert_eq!(classify("MYBROTHER"), Vendor::Brother);
        assert_eq!(classify("1SAMSUNG"), Vendor::Samsung);
        assert_eq!(classify("9LEXMARK"), Vendor::Lexmark);
    }

    #[test]
    fn test_unknown_serial_is_generic() {
        assert_eq!(classify("000000"), Vendor::Generic);
        assert_eq!(classify(""), Vendor::Generic);
        assert_eq!(classify("   "), Vendor::Generic);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(classify("  hp42  "), Vendor::Hp);
        assert_eq!(classify("canonxyz"), Vendor::Canon);
        assert_eq!(classify("\tlexmark\n"), Vendor::Lexmark);
    }

    #[test]
    fn test_priority_order_on_overlap() {
        // Contains both "CN" (HP infix) and "EPSON"; HP is probed first.
        assert_eq!(classify("CNEPSON"), Vendor::Hp);
        // Starts with "K" (Canon) and contains "EPSON"; Canon is probed first.
        assert_eq!(classify("KEPSON"), Vendor::Canon);
        // Starts with "E" (Brother prefix) but "EPSON" infix is probed before
        // Brother's prefix. Epson wins via infix.
        assert_eq!(classify("EPSON1"), Vendor::Epson);
        // "ZSAMSUNGLEXMARK" matches Samsung before Lexmark.
        assert_eq!(classify("ZSAMSUNGLEXMARK"), Vendor::Samsung);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Vendor::Hp.to_string(), "HP");
        assert_eq!(Vendor::Generic.to_string(), "Generic");
    }
}
