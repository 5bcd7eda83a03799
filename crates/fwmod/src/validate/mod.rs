//! Structural validation and repair of transformed images.

use memchr::memmem;
use tracing::{debug, warn};

use crate::error::{FwmodError, Result};

/// Smallest accepted image, in bytes.
pub const MIN_IMAGE_BYTES: usize = 1024;

/// Largest accepted image, in bytes (100 MiB).
pub const MAX_IMAGE_BYTES: usize = 100 * 1024 * 1024;

/// Marker injected at the start of images with no recognizable structure.
pub const COMPAT_MARKER: [u8; 4] = [0xBE, 0xEF, 0xCA, 0xFE];

const ELF_MAGIC: [u8; 4] = [0x7F, 0x45, 0x4C, 0x46];
const BOOT_MARKERS: [[u8; 2]; 3] = [[0xBE, 0xEF], [0xDE, 0xAD], [0xCA, 0xFE]];

/// An ELF header only counts when it starts within this many bytes of the
/// image start.
const ELF_SCAN_LIMIT: usize = 10_000;

/// Validate the image and repair missing structure markers.
///
/// Fails with [`FwmodError::ImageSize`] when the length falls outside
/// [`MIN_IMAGE_BYTES`]..=[`MAX_IMAGE_BYTES`]; this is the only failure.
/// Otherwise the buffer is scanned for any of the two-byte bootloader
/// markers (BE EF, DE AD, CA FE) anywhere, and for an ELF magic starting in
/// the first [`ELF_SCAN_LIMIT`] bytes. When neither is present, the first
/// four bytes are overwritten with [`COMPAT_MARKER`], whatever they held.
pub fn validate(buf: &mut [u8]) -> Result<()> {
    if buf.len() < MIN_IMAGE_BYTES || buf.len() > MAX_IMAGE_BYTES {
        return Err(FwmodError::ImageSize { actual: buf.len() as u64 });
    }

    let has_boot_marker = BOOT_MARKERS
        .iter()
        .any(|marker| memmem::find(buf, marker).is_some());

    let has_elf_header = {
        // A match must start before the limit but may extend past it.
        let scan_end = buf.len().min(ELF_SCAN_LIMIT + ELF_MAGIC.len() - 1);
        memmem::find(&buf[..scan_end], &ELF_MAGIC)
            .is_some_and(|pos| pos < ELF_SCAN_LIMIT)
    };

    if !has_boot_marker && !has_elf_header {
        warn!("no bootloader marker or ELF header found, injecting compatibility marker");
        buf[..COMPAT_MARKER.len()].copy_from_slice(&COMPAT_MARKER);
    } else {
        debug!(
            boot_marker = has_boot_marker,
            elf_header = has_elf_header,
            "image structure recognized"
        );
    }

    Ok(())
}
