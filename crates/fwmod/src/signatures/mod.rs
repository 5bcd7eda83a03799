//! Static byte-pattern rule tables.
//!
//! Pure data: every rule is a literal byte sequence plus the rewrite action
//! applied at each occurrence. Tables are grouped into vendor-independent
//! lists (restriction signatures, checksum labels, authentication labels)
//! and one list per vendor profile. The byte values are fixed at compile
//! time and identical across builds.

/// How a matched pattern span is rewritten in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    /// Overwrite the whole matched span with 0x00.
    ZeroFill,
    /// Overwrite the whole matched span with a fixed byte.
    FixedFill(u8),
    /// Overwrite only the first two bytes of the match (lead, trail); the
    /// scan resumes two bytes past the match start rather than past the
    /// span. Patterns carrying this action must be at least two bytes long.
    LabelReplace(u8, u8),
}

/// A literal byte sequence plus the action applied wherever it occurs.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    /// Bytes to search for. Never empty.
    pub bytes: &'static [u8],
    /// Rewrite applied at each non-overlapping occurrence.
    pub action: PatchAction,
}

/// x86 NOP opcode, used as the neutral fill for code-shaped spans.
pub const NOP: u8 = 0x90;

/// Vendor-independent restriction signatures, zero-filled on match.
///
/// Covers HP, Canon, Epson and Brother signature bytes plus three
/// alternating-bit chip-handshake sequences.
pub const RESTRICTION_RULES: &[PatternRule] = &[
    PatternRule { bytes: &[0x48, 0x50, 0x00, 0x01, 0xFF, 0xFF], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0x43, 0x48, 0x49, 0x50, 0x00, 0x00], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0x43, 0x41, 0x4E, 0x4F, 0x4E, 0x00], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0x54, 0x4F, 0x4E, 0x45, 0x52, 0x00], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0x45, 0x50, 0x53, 0x4F, 0x4E, 0x00], action: PatchAction::ZeroFill },
    PatternRule { bytes: b"BROTHE", action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0xAA, 0x55, 0xAA, 0x55], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0xFF, 0x00, 0xFF, 0x00], action: PatchAction::ZeroFill },
    PatternRule { bytes: &[0x00, 0xFF, 0x00, 0xFF], action: PatchAction::ZeroFill },
];

/// Checksum routine labels, NOP-filled on match.
pub const CHECKSUM_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"CRC32", action: PatchAction::FixedFill(NOP) },
    PatternRule { bytes: b"MD5", action: PatchAction::FixedFill(NOP) },
    PatternRule { bytes: b"SHA", action: PatchAction::FixedFill(NOP) },
];

/// Authentication call labels. Only the first two bytes of each match are
/// rewritten: a RET opcode followed by a zero status byte.
pub const AUTH_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"AUTH", action: PatchAction::LabelReplace(0xC3, 0x00) },
    PatternRule { bytes: b"VERI", action: PatchAction::LabelReplace(0xC3, 0x00) },
    PatternRule { bytes: b"CHEC", action: PatchAction::LabelReplace(0xC3, 0x00) },
];

/// HP cartridge signatures, zero-filled.
pub const HP_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"HPCHIP", action: PatchAction::ZeroFill },
    PatternRule { bytes: b"Cartri", action: PatchAction::ZeroFill },
    PatternRule { bytes: b"Toner ", action: PatchAction::ZeroFill },
];

/// Canon FINE cartridge signatures, 0xFF-filled.
pub const CANON_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"FINE", action: PatchAction::FixedFill(0xFF) },
    PatternRule { bytes: b"CANON", action: PatchAction::FixedFill(0xFF) },
    PatternRule { bytes: b"INKJET", action: PatchAction::FixedFill(0xFF) },
];

/// Epson DURABrite signatures, space-filled.
pub const EPSON_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"DURABR", action: PatchAction::FixedFill(0x20) },
    PatternRule { bytes: b"EPSON", action: PatchAction::FixedFill(0x20) },
    PatternRule { bytes: b"ICC P", action: PatchAction::FixedFill(0x20) },
];

/// Brother toner-series signatures, zero-filled.
pub const BROTHER_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"BROTHER", action: PatchAction::ZeroFill },
    PatternRule { bytes: b"TN 2", action: PatchAction::ZeroFill },
];

/// Samsung toner-series signatures, 0xFF-filled.
pub const SAMSUNG_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"SAMSUNG", action: PatchAction::FixedFill(0xFF) },
    PatternRule { bytes: b"MLT-D", action: PatchAction::FixedFill(0xFF) },
];

/// Lexmark return-program signatures, zero-filled.
pub const LEXMARK_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"LEXMARK", action: PatchAction::ZeroFill },
    PatternRule { bytes: b"RETURN", action: PatchAction::ZeroFill },
];

/// Fallback signatures for unrecognized devices, NOP-filled.
pub const GENERIC_RULES: &[PatternRule] = &[
    PatternRule { bytes: b"AUTHEN", action: PatchAction::FixedFill(NOP) },
    PatternRule { bytes: b"VALIDA", action: PatchAction::FixedFill(NOP) },
    PatternRule { bytes: b"COUNTE", action: PatchAction::FixedFill(NOP) },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rule_has_empty_pattern() {
        let tables: [&[PatternRule]; 10] = [
            RESTRICTION_RULES,
            CHECKSUM_RULES,
            AUTH_RULES,
            HP_RULES,
            CANON_RULES,
            EPSON_RULES,
            BROTHER_RULES,
            SAMSUNG_RULES,
            LEXMARK_RULES,
            GENERIC_RULES,
        ];
        for table in tables {
            for rule in table {
                assert!(!rule.bytes.is_empty());
            }
        }
    }

    #[test]
    fn test_label_rules_span_at_least_two_bytes() {
        for rule in AUTH_RULES {
            assert!(matches!(rule.action, PatchAction::LabelReplace(..)));
            assert!(rule.bytes.len() >= 2);
        }
    }

    #[test]
    fn test_restriction_table_contents() {
        assert_eq!(RESTRICTION_RULES.len(), 9);
        assert_eq!(RESTRICTION_RULES[0].bytes, &[0x48, 0x50, 0x00, 0x01, 0xFF, 0xFF]);
        assert_eq!(RESTRICTION_RULES[6].bytes, &[0xAA, 0x55, 0xAA, 0x55]);
        for rule in RESTRICTION_RULES {
            assert_eq!(rule.action, PatchAction::ZeroFill);
        }
    }

    #[test]
    fn test_checksum_labels_are_ascii_mnemonics() {
        let labels: Vec<&[u8]> = CHECKSUM_RULES.iter().map(|r| r.bytes).collect();
        assert_eq!(labels, vec![b"CRC32".as_slice(), b"MD5", b"SHA"]);
    }
}
