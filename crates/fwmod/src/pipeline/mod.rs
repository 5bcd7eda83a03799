//! The transformation pipeline: ordered rewrite passes plus output framing.
//!
//! [`transform`] consumes the raw image and produces the framed artifact:
//!
//! 1. universal restriction signatures (zero-fill)
//! 2. checksum labels (NOP-fill)
//! 3. toner-counter windows
//! 4. authentication labels (RET stub)
//! 5. branch/compare neutralization
//! 6. vendor profile selection and vendor rule list
//! 7. structural validation and repair (the only failure point)
//! 8. framing: header + payload + footer
//!
//! Passes run strictly in this order on a single exclusively-owned buffer;
//! nothing here is concurrent.

mod steps;

pub use steps::{Checkpoint, CHECKPOINTS};

use bytes::{BufMut, BytesMut};
use tracing::{debug, info};

use crate::classify::{self, Vendor};
use crate::error::Result;
use crate::rewrite::{self, apply_rule};
use crate::signatures;
use crate::validate;
use crate::vendor;

/// Leading magic of the framed output.
pub const FRAME_MAGIC: &[u8; 6] = b"BYPASS";

/// Frame format version, big-endian.
pub const FRAME_VERSION: [u8; 2] = [0x00, 0x01];

/// Width of the serial-number field in the header.
pub const SERIAL_FIELD_LEN: usize = 16;

/// Bytes the frame adds around the payload: 28-byte header, 16-byte footer.
pub const FRAME_OVERHEAD: usize = 6 + 2 + SERIAL_FIELD_LEN + 4 + 16;

const HEADER_END_MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const FOOTER_TAG: &[u8; 8] = b"MODIFIED";
const FOOTER_PAD: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
const FOOTER_MAGIC: [u8; 4] = [0xAA, 0x55, 0xAA, 0x55];

/// Outcome of a successful pipeline run.
#[derive(Debug)]
pub struct Transformed {
    /// Vendor profile selected from the serial number.
    pub vendor: Vendor,
    /// Framed output: header + transformed payload + footer.
    pub bytes: Vec<u8>,
}

/// Run the full pipeline over an image.
///
/// Takes ownership of the buffer; on success the transformed payload comes
/// back framed. The only error is the validator's size rejection, raised
/// after the rewrite passes but before any framing.
pub fn transform(mut data: Vec<u8>, serial: &str) -> Result<Transformed> {
    apply_universal_passes(&mut data);

    let vendor = classify::classify(serial);
    info!("detected vendor profile: {}", vendor);
    vendor::optimize(&mut data, vendor);

    validate::validate(&mut data)?;

    let bytes = frame_output(&data, serial);
    Ok(Transformed { vendor, bytes })
}

/// The vendor-independent rewrite passes, in order.
fn apply_universal_passes(data: &mut [u8]) {
    debug!("pass: restriction signatures");
    for rule in signatures::RESTRICTION_RULES {
        apply_rule(data, rule);
    }

    debug!("pass: checksum labels");
    for rule in signatures::CHECKSUM_RULES {
        apply_rule(data, rule);
    }

    debug!("pass: toner-counter windows");
    rewrite::reset_counter_windows(data);

    debug!("pass: authentication labels");
    for rule in signatures::AUTH_RULES {
        apply_rule(data, rule);
    }

    debug!("pass: branch and compare neutralization");
    rewrite::neutralize_branch_checks(data);
}

/// Wrap the transformed payload in the output frame.
///
/// Layout: `"BYPASS"`, version, the serial number NUL-padded or truncated
/// to exactly [`SERIAL_FIELD_LEN`] bytes, four 0xFF bytes, the payload,
/// then `"MODIFIED"`, four zero bytes and the AA 55 AA 55 trailer.
pub fn frame_output(payload: &[u8], serial: &str) -> Vec<u8> {
    let mut out = BytesMut::with_capacity(payload.len() + FRAME_OVERHEAD);

    out.put_slice(FRAME_MAGIC);
    out.put_slice(&FRAME_VERSION);

    let mut field = [0u8; SERIAL_FIELD_LEN];
    for (slot, byte) in field.iter_mut().zip(serial.bytes()) {
        *slot = byte;
    }
    out.put_slice(&field);
    out.put_slice(&HEADER_END_MARKER);

    out.put_slice(payload);

    out.put_slice(FOOTER_TAG);
    out.put_slice(&FOOTER_PAD);
    out.put_slice(&FOOTER_MAGIC);

    out.to_vec()
}
