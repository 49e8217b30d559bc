use crate::{try_zeroed, DecodeError};
use alloc::vec::Vec;
use miniz_oxide::inflate::{
    core::{decompress as inflate_core, inflate_flags, DecompressorOxide},
    TINFLStatus,
};

/// Inflates a zlib stream into a buffer of at most `capacity` bytes.
///
/// A stream that would produce more than `capacity` bytes fails with
/// `TINFLStatus::HasMoreOutput`, a truncated one with
/// `TINFLStatus::FailedCannotMakeProgress`.
pub fn decompress(compressed: &[u8], capacity: usize) -> Result<Vec<u8>, DecodeError> {
    let mut output = try_zeroed(capacity)?;
    // Kept on the stack, the output buffer is the only heap allocation.
    let mut decompressor = DecompressorOxide::new();

    let flags = inflate_flags::TINFL_FLAG_PARSE_ZLIB_HEADER
        | inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF;

    let (status, _consumed, produced) =
        inflate_core(&mut decompressor, compressed, &mut output, 0, flags);

    match status {
        TINFLStatus::Done => {
            output.truncate(produced);
            Ok(output)
        },
        status => Err(DecodeError::DuringDecompression(status)),
    }
}
