//! In-place byte-pattern rewriting.
//!
//! Two families of passes operate on the image buffer:
//!
//! - **Rule passes** ([`apply_rule`]): scan for a literal byte sequence and
//!   rewrite each non-overlapping occurrence according to the rule's action.
//! - **Positional passes**: single forward scans with a 1-byte stride that
//!   key off short local byte shapes rather than a rule table
//!   ([`reset_counter_windows`], [`reset_page_windows`],
//!   [`neutralize_branch_checks`]).
//!
//! All passes are total: they never fail and never index past the buffer.

use memchr::memmem;

use crate::signatures::{PatchAction, PatternRule, NOP};

/// Apply one pattern rule to the buffer, in place.
///
/// The buffer is scanned left to right. At each match the rule's action is
/// applied and scanning resumes past the rewritten bytes: past the whole
/// span for fill actions, two bytes past the match start for
/// [`PatchAction::LabelReplace`]. A rewritten span no longer equals the
/// original pattern, so matches never overlap a previous rewrite of the
/// same pass. A pattern longer than the remaining buffer simply stops the
/// scan.
pub fn apply_rule(buf: &mut [u8], rule: &PatternRule) {
    let pattern = rule.bytes;
    debug_assert!(!pattern.is_empty());

    let mut pos = 0;
    while pos < buf.len() {
        let Some(offset) = memmem::find(&buf[pos..], pattern) else {
            break;
        };
        let at = pos + offset;

        let advance = match rule.action {
            PatchAction::ZeroFill => {
                buf[at..at + pattern.len()].fill(0x00);
                pattern.len()
            }
            PatchAction::FixedFill(value) => {
                buf[at..at + pattern.len()].fill(value);
                pattern.len()
            }
            PatchAction::LabelReplace(lead, trail) => {
                debug_assert!(pattern.len() >= 2);
                buf[at] = lead;
                buf[at + 1] = trail;
                2
            }
        };
        pos = at + advance;
    }
}

/// Zero out counter-shaped bytes following each "TONE" tag.
///
/// Wherever four consecutive bytes spell `TONE`, every byte in the window
/// `[tag + 4, tag + 20)` whose value lies strictly between 0x00 and 0xFF is
/// reset to zero. The scan keeps its 1-byte stride over the original
/// stream, so overlapping tags each get their own window.
pub fn reset_counter_windows(buf: &mut [u8]) {
    let scan_end = buf.len().saturating_sub(8);
    for i in 0..scan_end {
        if &buf[i..i + 4] == b"TONE" {
            let window_end = (i + 20).min(buf.len());
            for byte in &mut buf[i + 4..window_end] {
                if *byte > 0x00 && *byte < 0xFF {
                    *byte = 0x00;
                }
            }
        }
    }
}

/// Zero out every non-zero byte following each "PAGE" tag.
///
/// Same shape as [`reset_counter_windows`] but with a `[tag + 4, tag + 16)`
/// window and no upper-value exclusion. Applied only by the HP profile.
pub fn reset_page_windows(buf: &mut [u8]) {
    let scan_end = buf.len().saturating_sub(10);
    for i in 0..scan_end {
        if &buf[i..i + 4] == b"PAGE" {
            let window_end = (i + 16).min(buf.len());
            for byte in &mut buf[i + 4..window_end] {
                if *byte != 0x00 {
                    *byte = 0x00;
                }
            }
        }
    }
}

/// Neutralize bytes shaped like conditional-branch and compare opcodes.
///
/// Single forward pass:
/// - a byte equal to 0x74 or 0x75 (JZ/JNZ shapes) is overwritten together
///   with its successor by NOPs;
/// - a 0x3C byte (CMP AL shape) whose successor lies in [0x01, 0x63] gets
///   that successor zeroed.
///
/// Both checks run at each position of the same pass. Neither rewrite can
/// create or destroy the other's trigger bytes (0x74, 0x75 and 0x90 all
/// sit above 0x63, and the compare rewrite only writes 0x00), so the
/// combined pass is equivalent to running the two checks back to back.
pub fn neutralize_branch_checks(buf: &mut [u8]) {
    let scan_end = buf.len().saturating_sub(4);
    for i in 0..scan_end {
        if buf[i] == 0x74 || buf[i] == 0x75 {
            buf[i] = NOP;
            buf[i + 1] = NOP;
        }
        if buf[i] == 0x3C && buf[i + 1] > 0x00 && buf[i + 1] < 0x64 {
            buf[i + 1] = 0x00;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::{AUTH_RULES, CHECKSUM_RULES};

    fn zero_rule(bytes: &'static [u8]) -> PatternRule {
        PatternRule { bytes, action: PatchAction::ZeroFill }
    }

    #[test]
    fn test_zero_fill_covers_whole_span() {
        let mut buf = b"..TONER\x00..".to_vec();
        apply_rule(&mut buf, &zero_rule(&[0x54, 0x4F, 0x4E, 0x45, 0x52, 0x00]));
        assert_eq!(&buf, b"..\x00\x00\x00\x00\x00\x00..");
    }

    #[test]
    fn test_fixed_fill_rewrites_checksum_label() {
        let mut buf = b"xxCRC32yy".to_vec();
        apply_rule(&mut buf, &CHECKSUM_RULES[0]);
        assert_eq!(&buf[2..7], &[0x90; 5]);
        assert_eq!(&buf[..2], b"xx");
        assert_eq!(&buf[7..], b"yy");
    }

    #[test]
    fn test_label_replace_touches_two_bytes_only() {
        let mut buf = b"..AUTH..".to_vec();
        apply_rule(&mut buf, &AUTH_RULES[0]);
        assert_eq!(&buf, b"..\xC3\x00TH..");
    }

    #[test]
    fn test_all_occurrences_rewritten() {
        let mut buf = b"MD5--MD5--MD5".to_vec();
        apply_rule(&mut buf, &CHECKSUM_RULES[1]);
        assert_eq!(&buf, b"\x90\x90\x90--\x90\x90\x90--\x90\x90\x90");
    }

    #[test]
    fn test_label_replace_short_advance_allows_adjacent_match() {
        // After rewriting the first match, the scan resumes two bytes in and
        // still finds the back-to-back occurrence.
        let mut buf = b"AUTHAUTH".to_vec();
        apply_rule(&mut buf, &AUTH_RULES[0]);
        assert_eq!(&buf, b"\xC3\x00TH\xC3\x00TH");
    }

    #[test]
    fn test_second_pass_finds_nothing() {
        let mut buf = b"aaSHAbb".to_vec();
        apply_rule(&mut buf, &CHECKSUM_RULES[2]);
        let after_first = buf.clone();
        apply_rule(&mut buf, &CHECKSUM_RULES[2]);
        assert_eq!(buf, after_first);
    }

    #[test]
    fn test_pattern_longer_than_buffer_is_a_no_op() {
        let mut buf = b"ab".to_vec();
        apply_rule(&mut buf, &zero_rule(b"abcdef"));
        assert_eq!(&buf, b"ab");
    }

    #[test]
    fn test_counter_window_resets_midrange_bytes() {
        let mut buf = vec![0u8; 40];
        buf[4..8].copy_from_slice(b"TONE");
        buf[8] = 0x05; // reset
        buf[9] = 0xFF; // kept: at the exclusive upper bound
        buf[10] = 0x00; // kept: already zero
        buf[23] = 0x42; // reset: window covers [8, 24)
        buf[24] = 0x42; // kept: past the window
        reset_counter_windows(&mut buf);
        assert_eq!(buf[8], 0x00);
        assert_eq!(buf[9], 0xFF);
        assert_eq!(buf[23], 0x00);
        assert_eq!(buf[24], 0x42);
    }

    #[test]
    fn test_counter_window_clamps_at_buffer_end() {
        let mut buf = vec![0u8; 16];
        buf[2..6].copy_from_slice(b"TONE");
        buf[14] = 0x10;
        buf[15] = 0x10;
        reset_counter_windows(&mut buf);
        assert_eq!(buf[14], 0x00);
        assert_eq!(buf[15], 0x00);
    }

    #[test]
    fn test_counter_tag_near_end_is_ignored() {
        // The scan stops 8 bytes before the end, so a tag in the tail is
        // never inspected.
        let mut buf = vec![0u8; 12];
        buf[6..10].copy_from_slice(b"TONE");
        buf[10] = 0x33;
        reset_counter_windows(&mut buf);
        assert_eq!(buf[10], 0x33);
    }

    #[test]
    fn test_page_window_resets_all_nonzero_bytes() {
        let mut buf = vec![0u8; 32];
        buf[0..4].copy_from_slice(b"PAGE");
        buf[4] = 0xFF; // reset: no upper-value exclusion here
        buf[11] = 0x01; // reset: window covers [4, 16)
        buf[16] = 0x01; // kept: past the window
        reset_page_windows(&mut buf);
        assert_eq!(buf[4], 0x00);
        assert_eq!(buf[11], 0x00);
        assert_eq!(buf[16], 0x01);
    }

    #[test]
    fn test_branch_bytes_become_nops() {
        let mut buf = vec![0x00, 0x74, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00];
        neutralize_branch_checks(&mut buf);
        assert_eq!(buf[1], 0x90);
        assert_eq!(buf[2], 0x90);
    }

    #[test]
    fn test_compare_operand_zeroed_in_percent_range() {
        let mut buf = vec![0x3C, 0x32, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        neutralize_branch_checks(&mut buf);
        assert_eq!(buf[0], 0x3C);
        assert_eq!(buf[1], 0x00);
    }

    #[test]
    fn test_compare_operand_outside_range_kept() {
        let mut buf = vec![0x3C, 0x64, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00];
        neutralize_branch_checks(&mut buf);
        assert_eq!(buf[1], 0x64);
        assert_eq!(buf[3], 0x00);
    }

    #[test]
    fn test_branch_pass_skips_last_four_bytes() {
        let mut buf = vec![0x00, 0x00, 0x00, 0x00, 0x74, 0x01, 0x02, 0x75];
        neutralize_branch_checks(&mut buf);
        // Scan covers positions [0, 4); the 0x74 at index 4 is untouched.
        assert_eq!(buf[4], 0x74);
        assert_eq!(buf[7], 0x75);
    }

    #[test]
    fn test_tiny_buffers_do_not_panic() {
        let mut empty: Vec<u8> = vec![];
        reset_counter_windows(&mut empty);
        reset_page_windows(&mut empty);
        neutralize_branch_checks(&mut empty);

        let mut small = vec![0x74, 0x75];
        neutralize_branch_checks(&mut small);
        assert_eq!(small, vec![0x74, 0x75]);
    }
}
