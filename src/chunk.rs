use crate::DecodeError;
use crc32fast::Hasher;

pub const PNG_MAGIC_BYTES: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10];

// length bytes + chunk type bytes + crc bytes
pub const CHUNK_FRAMING_LENGTH: usize = 4 + 4 + 4;

// Clears bit 5 of every byte, which is what distinguishes
// ancillary/private/reserved/safe-to-copy chunks from critical ones.
const UPPERCASE_MASK: u32 = 0xDFDF_DFDF;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ChunkType {
    ImageHeader,
    Palette,
    Srgb,
    Gamma,
    ImageData,
    ImageEnd,
    Unknown([u8; 4]),
}

impl ChunkType {
    fn from_bytes(bytes: [u8; 4]) -> Self {
        let canonical = (u32::from_be_bytes(bytes) & UPPERCASE_MASK).to_be_bytes();

        match &canonical {
            b"IHDR" => ChunkType::ImageHeader,
            b"PLTE" => ChunkType::Palette,
            b"SRGB" => ChunkType::Srgb,
            b"GAMA" => ChunkType::Gamma,
            b"IDAT" => ChunkType::ImageData,
            b"IEND" => ChunkType::ImageEnd,
            _ => ChunkType::Unknown(bytes),
        }
    }

    /// The four byte tag as it appears in a conforming file.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            ChunkType::ImageHeader => *b"IHDR",
            ChunkType::Palette => *b"PLTE",
            ChunkType::Srgb => *b"sRGB",
            ChunkType::Gamma => *b"gAMA",
            ChunkType::ImageData => *b"IDAT",
            ChunkType::ImageEnd => *b"IEND",
            ChunkType::Unknown(tag) => *tag,
        }
    }
}

/// Framing of one chunk. The data itself stays in the input buffer,
/// `data_offset` points at its first byte.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChunkDescriptor {
    pub chunk_type: ChunkType,
    pub length: usize,
    pub crc: u32,
    pub data_offset: usize,
}

impl ChunkDescriptor {
    pub fn data<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.data_offset..self.data_offset + self.length]
    }

    fn type_offset(&self) -> usize {
        self.data_offset - 4
    }

    pub fn byte_size(&self) -> usize {
        CHUNK_FRAMING_LENGTH + self.length
    }
}

pub fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

pub(crate) fn check_signature(input: &[u8]) -> Result<(), DecodeError> {
    if input.len() < PNG_MAGIC_BYTES.len() {
        return Err(DecodeError::BufferTooShort);
    }

    if &input[..PNG_MAGIC_BYTES.len()] != PNG_MAGIC_BYTES {
        return Err(DecodeError::WrongSignature);
    }

    Ok(())
}

/// Reads the length, type and CRC of the chunk starting at `offset`.
///
/// Every offset is checked against `input.len()` before it is read, the
/// declared length is untrusted.
pub(crate) fn read_chunk_metadata(
    input: &[u8],
    offset: usize,
) -> Result<ChunkDescriptor, DecodeError> {
    let data_offset = offset.checked_add(8).ok_or(DecodeError::MissingBytes)?;
    if data_offset > input.len() {
        return Err(DecodeError::MissingBytes);
    }

    let length = read_u32(input, offset) as usize;
    let chunk_type = ChunkType::from_bytes([
        input[offset + 4],
        input[offset + 5],
        input[offset + 6],
        input[offset + 7],
    ]);

    let crc_offset = data_offset.checked_add(length).ok_or(DecodeError::MissingBytes)?;
    match crc_offset.checked_add(4) {
        Some(end) if end <= input.len() => {},
        _ => return Err(DecodeError::MissingBytes),
    }

    let crc = read_u32(input, crc_offset);

    Ok(ChunkDescriptor { chunk_type, length, crc, data_offset })
}

/// The CRC covers the type tag and the data, not the length field.
pub(crate) fn verify_crc(input: &[u8], chunk: &ChunkDescriptor) -> Result<(), DecodeError> {
    let covered = &input[chunk.type_offset()..chunk.data_offset + chunk.length];

    if checksum(covered) != chunk.crc {
        return Err(DecodeError::CorruptedData);
    }

    Ok(())
}
