use crate::{header::PngHeader, DecodeError};
use core::convert::TryFrom;
use num_enum::TryFromPrimitive;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

/// Already reconstructed bytes around the one being defiltered.
/// Missing neighbors (first row, first pixel) read as 0.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct Neighbors {
    pub left: u8,
    pub up: u8,
    pub up_left: u8,
}

impl Neighbors {
    /// `channels` is also the byte distance to the left neighbor, which only
    /// holds for 8-bit samples.
    #[inline(always)]
    pub fn at(
        current_row: &[u8],
        previous_row: Option<&[u8]>,
        index: usize,
        channels: usize,
    ) -> Self {
        let has_left = index >= channels;

        let left = if has_left { current_row[index - channels] } else { 0 };

        match previous_row {
            Some(previous_row) => Neighbors {
                left,
                up: previous_row[index],
                up_left: if has_left { previous_row[index - channels] } else { 0 },
            },
            None => Neighbors { left, up: 0, up_left: 0 },
        }
    }
}

impl FilterType {
    /// The value that was subtracted from the byte when it was filtered.
    #[inline(always)]
    pub(crate) fn predict(self, neighbors: Neighbors) -> u8 {
        match self {
            FilterType::None => 0,
            FilterType::Sub => neighbors.left,
            FilterType::Up => neighbors.up,
            FilterType::Average => ((neighbors.left as u16 + neighbors.up as u16) / 2) as u8,
            FilterType::Paeth => paeth_predictor(neighbors.left, neighbors.up, neighbors.up_left),
        }
    }
}

// a = left, b = up, c = upper left
#[inline(always)]
pub(crate) fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a_, b_, c_) = (a as i16, b as i16, c as i16);
    let p = a_ + b_ - c_;
    let pa = (p - a_).abs();
    let pb = (p - b_).abs();
    let pc = (p - c_).abs();

    // Ties go to a, then b.
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn defilter_row<const CHANNELS: usize>(
    filter_type: FilterType,
    current_row: &mut [u8],
    previous_row: Option<&[u8]>,
) {
    if filter_type == FilterType::None {
        return;
    }

    // Each byte depends on the ones reconstructed before it, strictly left to right.
    for i in 0..current_row.len() {
        let neighbors = Neighbors::at(current_row, previous_row, i, CHANNELS);
        current_row[i] = current_row[i].wrapping_add(filter_type.predict(neighbors));
    }
}

/// Reconstructs the pixel bytes of every row in `scanline_data` into `output`.
///
/// `scanline_data` holds `height` rows of one filter type byte followed by
/// `row_stride` filtered bytes, `output` receives `height` rows of `row_stride`
/// bytes with the filter bytes stripped.
pub(crate) fn defilter_image(
    header: &PngHeader,
    scanline_data: &[u8],
    output: &mut [u8],
) -> Result<(), DecodeError> {
    let row_stride = header.row_stride()?;

    let expected = header.scanline_data_len()?;
    if scanline_data.len() != expected {
        return Err(DecodeError::DecompressedSizeMismatch {
            expected,
            actual: scanline_data.len(),
        });
    }

    debug_assert_eq!(output.len(), header.image_len()?);

    let scanlines = scanline_data.chunks_exact(row_stride + 1);
    let mut previous_row: Option<&[u8]> = None;
    let mut remaining_output = output;

    for scanline in scanlines {
        let filter_type =
            FilterType::try_from(scanline[0]).map_err(|_| DecodeError::InvalidFilterType)?;

        let (current_row, output_tail) =
            core::mem::take(&mut remaining_output).split_at_mut(row_stride);
        current_row.copy_from_slice(&scanline[1..]);

        match header.channels {
            1 => defilter_row::<1>(filter_type, current_row, previous_row),
            2 => defilter_row::<2>(filter_type, current_row, previous_row),
            3 => defilter_row::<3>(filter_type, current_row, previous_row),
            4 => defilter_row::<4>(filter_type, current_row, previous_row),
            _ => unreachable!("a PngHeader carries 1 to 4 channels"),
        }

        previous_row = Some(&*current_row);
        remaining_output = output_tail;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ihdr_bytes;

    fn header(width: u32, height: u32, color_type: u8) -> PngHeader {
        PngHeader::from_bytes(&ihdr_bytes(width, height, color_type)).unwrap()
    }

    #[test]
    fn paeth_prefers_left_on_ties() {
        // left == up, upleft differs: p = 0, pa == pb == 10, pc == 20
        assert_eq!(paeth_predictor(10, 10, 20), 10);
        // All three equally distant.
        assert_eq!(paeth_predictor(7, 7, 7), 7);
    }

    #[test]
    fn paeth_prefers_up_over_upleft() {
        // p = 3, pa = 2, pb = pc = 1
        assert_eq!(paeth_predictor(5, 2, 4), 2);
    }

    #[test]
    fn paeth_picks_the_closest() {
        // p = 3 + 5 - 1 = 7, pa = 4, pb = 2, pc = 6
        assert_eq!(paeth_predictor(3, 5, 1), 5);
        // p = 1 + 5 - 3 = 3, pa = 2, pb = 2, pc = 0
        assert_eq!(paeth_predictor(1, 5, 3), 3);
        // Arithmetic has to happen outside of u8.
        assert_eq!(paeth_predictor(255, 255, 0), 255);
        assert_eq!(paeth_predictor(0, 0, 255), 0);
    }

    #[test]
    fn average_floors_without_overflowing() {
        let neighbors = Neighbors { left: 255, up: 254, up_left: 0 };
        assert_eq!(FilterType::Average.predict(neighbors), 254);

        let neighbors = Neighbors { left: 3, up: 0, up_left: 0 };
        assert_eq!(FilterType::Average.predict(neighbors), 1);
    }

    #[test]
    fn neighbors_are_zero_outside_the_image() {
        let previous = [1, 2, 3, 4, 5, 6];
        let current = [7, 8, 9, 10, 11, 12];

        assert_eq!(Neighbors::at(&current, None, 0, 3), Neighbors::default());
        assert_eq!(
            Neighbors::at(&current, None, 4, 3),
            Neighbors { left: 8, up: 0, up_left: 0 }
        );
        assert_eq!(
            Neighbors::at(&current, Some(&previous), 2, 3),
            Neighbors { left: 0, up: 3, up_left: 0 }
        );
        assert_eq!(
            Neighbors::at(&current, Some(&previous), 5, 3),
            Neighbors { left: 9, up: 6, up_left: 3 }
        );
    }

    #[test]
    fn none_is_the_identity() {
        let header = header(2, 3, 4);
        let scanlines = [
            0, 1, 2, 3, 4, //
            0, 250, 251, 252, 253, //
            0, 9, 8, 7, 6,
        ];
        let mut output = [0u8; 12];

        defilter_image(&header, &scanlines, &mut output).unwrap();

        assert_eq!(output, [1, 2, 3, 4, 250, 251, 252, 253, 9, 8, 7, 6]);
    }

    #[test]
    fn up_adds_the_row_above() {
        let header = header(2, 2, 0);
        let scanlines = [
            0, 10, 200, //
            2, 5, 100,
        ];
        let mut output = [0u8; 4];

        defilter_image(&header, &scanlines, &mut output).unwrap();

        assert_eq!(output, [10, 200, 15, 44]);
    }

    #[test]
    fn sub_uses_the_pixel_to_the_left() {
        let header = header(3, 1, 2);
        let scanlines = [1, 10, 20, 30, 1, 1, 1, 250, 0, 5];
        let mut output = [0u8; 9];

        defilter_image(&header, &scanlines, &mut output).unwrap();

        assert_eq!(output, [10, 20, 30, 11, 21, 31, 5, 21, 36]);
    }

    #[test]
    fn first_row_treats_up_as_zero() {
        let header = header(2, 1, 0);

        let mut output = [0u8; 2];
        defilter_image(&header, &[2, 7, 9], &mut output).unwrap();
        assert_eq!(output, [7, 9]);

        // Average: 7, 9 + 7 / 2
        let mut output = [0u8; 2];
        defilter_image(&header, &[3, 7, 9], &mut output).unwrap();
        assert_eq!(output, [7, 12]);

        // Paeth degenerates to Sub.
        let mut output = [0u8; 2];
        defilter_image(&header, &[4, 7, 9], &mut output).unwrap();
        assert_eq!(output, [7, 16]);
    }

    #[test]
    fn paeth_over_two_rows() {
        let header = header(2, 2, 0);
        let scanlines = [
            0, 10, 20, //
            4, 1, 1,
        ];
        let mut output = [0u8; 4];

        defilter_image(&header, &scanlines, &mut output).unwrap();

        // (0, 0): left 0, up 10, upleft 0 -> p = 10, picks up.
        // (1, 1): left 11, up 20, upleft 10 -> p = 21, pa = 10, pb = 1, pc = 11, picks up.
        assert_eq!(output, [10, 20, 11, 21]);
    }

    #[test]
    fn unknown_filter_type_is_an_error() {
        let header = header(1, 1, 0);
        let mut output = [0u8; 1];

        assert_eq!(
            defilter_image(&header, &[5, 0], &mut output),
            Err(DecodeError::InvalidFilterType)
        );
    }

    #[test]
    fn short_scanline_data_is_rejected() {
        let header = header(2, 2, 0);
        let scanlines = [0u8; 5];
        let mut output = [0u8; 4];

        assert_eq!(
            defilter_image(&header, &scanlines, &mut output),
            Err(DecodeError::DecompressedSizeMismatch { expected: 6, actual: 5 })
        );
    }

    #[test]
    #[should_panic]
    fn output_must_hold_the_whole_image() {
        let header = header(2, 2, 0);
        let scanlines = [0u8; 6];
        let mut output = [0u8; 3];

        let _ = defilter_image(&header, &scanlines, &mut output);
    }
}
