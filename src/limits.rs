use crate::DecodeError;

/// Resource limits for a single decode.
///
/// `max_alloc` bounds the bytes held at once by the compressed IDAT payload,
/// the decompressed scanlines and the output pixel buffer. The default is
/// 512MiB.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    pub max_image_width: Option<u32>,
    pub max_image_height: Option<u32>,
    pub max_alloc: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_image_width: None, max_image_height: None, max_alloc: Some(512 * 1024 * 1024) }
    }
}

impl Limits {
    pub fn no_limits() -> Self {
        Limits { max_image_width: None, max_image_height: None, max_alloc: None }
    }

    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), DecodeError> {
        if let Some(max_width) = self.max_image_width {
            if width > max_width {
                return Err(DecodeError::LimitsExceeded);
            }
        }

        if let Some(max_height) = self.max_image_height {
            if height > max_height {
                return Err(DecodeError::LimitsExceeded);
            }
        }

        Ok(())
    }

    /// Takes `amount` bytes out of the allocation budget.
    pub fn reserve(&mut self, amount: usize) -> Result<(), DecodeError> {
        if let Some(max_alloc) = self.max_alloc.as_mut() {
            let amount = amount as u64;
            if amount > *max_alloc {
                return Err(DecodeError::LimitsExceeded);
            }

            *max_alloc -= amount;
        }

        Ok(())
    }

    /// Returns `amount` bytes to the allocation budget.
    pub fn free(&mut self, amount: usize) {
        if let Some(max_alloc) = self.max_alloc.as_mut() {
            *max_alloc = max_alloc.saturating_add(amount as u64);
        }
    }
}
