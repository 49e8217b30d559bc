use core::fmt;
use miniz_oxide::inflate::TINFLStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The input is shorter than the PNG signature.
    BufferTooShort,
    WrongSignature,
    /// A chunk's CRC doesn't match its type and data bytes.
    CorruptedData,
    WrongCompression,
    /// Indexed color or Adam7 interlacing, neither of which is decoded.
    NotSupportedInterlacedImage,
    DuringDecompression(TINFLStatus),
    AllocatingMemory,
    /// A PLTE chunk was found.
    General,

    MissingBytes,
    InvalidChunk,
    ImageDataBeforeHeader,
    DuplicateHeader,
    InvalidBitDepth,
    UnsupportedBitDepth,
    InvalidColorType,
    InvalidFilterMethod,
    InvalidFilterType,
    InvalidInterlaceMethod,
    InvalidDimensions,
    DecompressedSizeMismatch {
        expected: usize,
        actual: usize,
    },
    LimitsExceeded,

    // The width/height specified in the image contains too many
    // bytes to address with a usize on this platform.
    IntegerOverflow,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BufferTooShort => f.write_str("input is shorter than the PNG signature"),
            DecodeError::WrongSignature => {
                f.write_str("input does not start with the PNG signature")
            },
            DecodeError::CorruptedData => f.write_str("chunk CRC mismatch"),
            DecodeError::WrongCompression => f.write_str("unknown compression method"),
            DecodeError::NotSupportedInterlacedImage => {
                f.write_str("indexed color and interlaced images are not supported")
            },
            DecodeError::DuringDecompression(status) => {
                write!(f, "zlib decompression failed: {:?}", status)
            },
            DecodeError::AllocatingMemory => f.write_str("memory allocation failed"),
            DecodeError::General => f.write_str("palette chunks are not supported"),
            DecodeError::MissingBytes => f.write_str("unexpected end of input"),
            DecodeError::InvalidChunk => f.write_str("chunk data is too short for its type"),
            DecodeError::ImageDataBeforeHeader => f.write_str("image data found before IHDR"),
            DecodeError::DuplicateHeader => f.write_str("more than one IHDR chunk"),
            DecodeError::InvalidBitDepth => f.write_str("invalid bit depth"),
            DecodeError::UnsupportedBitDepth => f.write_str("only 8-bit samples are supported"),
            DecodeError::InvalidColorType => f.write_str("invalid color type"),
            DecodeError::InvalidFilterMethod => f.write_str("invalid filter method"),
            DecodeError::InvalidFilterType => f.write_str("invalid scanline filter type"),
            DecodeError::InvalidInterlaceMethod => f.write_str("invalid interlace method"),
            DecodeError::InvalidDimensions => {
                f.write_str("image width and height must be non-zero")
            },
            DecodeError::DecompressedSizeMismatch { expected, actual } => write!(
                f,
                "decompressed {} bytes of scanline data, expected {}",
                actual, expected
            ),
            DecodeError::LimitsExceeded => f.write_str("image exceeds the configured limits"),
            DecodeError::IntegerOverflow => f.write_str("image size overflows usize"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
