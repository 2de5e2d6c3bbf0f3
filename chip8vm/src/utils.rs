#[cfg(test)]
pub mod testing {
    use core::fmt;

    use crate::frame::{FrameView, HEIGHT, WIDTH};

    /// Pixel mask comparable frame by frame, printed as ascii art on assertion failures
    #[derive(Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ImageMask([[bool; WIDTH]; HEIGHT]);

    impl ImageMask {
        pub fn new() -> Self {
            Self([[false; WIDTH]; HEIGHT])
        }
    }

    impl fmt::Debug for ImageMask {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let width = WIDTH + 2;
            writeln!(f)?;
            for _ in 0..width {
                write!(f, "-")?;
            }
            writeln!(f)?;
            for row in &self.0 {
                write!(f, "|")?;
                for &p in row.iter() {
                    write!(f, "{}", if p { '#' } else { '.' })?;
                }
                writeln!(f, "|")?;
            }
            for _ in 0..width {
                write!(f, "-")?;
            }
            Ok(())
        }
    }

    pub trait ToMask {
        fn to_mask(&self) -> ImageMask;
    }

    /// Rows separated by whitespace, `#` marks a lit pixel
    impl ToMask for str {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            mask.0
                .iter_mut()
                .zip(self.split_whitespace())
                .for_each(|(m_row, c_row)| {
                    m_row
                        .iter_mut()
                        .zip(c_row.chars())
                        .for_each(|(m, c)| *m = c == '#')
                });
            mask
        }
    }

    impl ToMask for FrameView<'_> {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            self.iter_rows_as_bitslices()
                .zip(mask.0.iter_mut())
                .for_each(|(f_row, m_row)| {
                    m_row
                        .iter_mut()
                        .zip(f_row.iter())
                        .for_each(|(m, pixel)| *m = *pixel)
                });
            mask
        }
    }

    mod tests {
        use super::*;
        use crate::frame::Frame;

        #[test]
        fn empty_frame_mask() {
            let frame = Frame::new();
            assert_eq!(frame.view().to_mask(), ImageMask::new());
            assert_eq!("".to_mask(), ImageMask::new());
        }

        #[test]
        fn str_mask_matches_frame() {
            let mut frame = Frame::new();
            frame.draw_sprite(1, 1, &[0b1100_0000]);
            let expected = "
                ........
                .##.....
            ";
            assert_eq!(frame.view().to_mask(), expected.to_mask());
        }
    }
}
