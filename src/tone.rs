//! Log-density tone mapping and box-filter downsampling of the accumulator.

use plotters::prelude::*;
use rayon::prelude::*;

use crate::accumulator::{Accumulator, Cell};
use crate::cancel::CancelToken;
use crate::config::GammaConvention;
use crate::error::{FlameError, Result};

/// Display-resolution RGB image, three bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneMapped {
    pub pixels: PixelBuffer,
    pub painted: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ToneMapper {
    supersample: usize,
    convention: GammaConvention,
}

fn paint_error<E: std::fmt::Display>(err: E) -> FlameError {
    FlameError::Paint(err.to_string())
}

impl ToneMapper {
    pub fn new(supersample: usize, convention: GammaConvention) -> Self {
        Self {
            supersample: supersample.max(1),
            convention,
        }
    }

    /// Per-channel value of one touched cell before the final clamp.
    pub fn intensity(cell: &Cell, exponent: f64) -> [f64; 3] {
        let n = cell.alpha_count as f64;
        let alpha = n.ln() / n;
        cell.color_sum.map(|sum| (alpha * sum).powf(exponent))
    }

    /// Converts the accumulator into a display image.
    ///
    /// Each display pixel averages the touched cells of the `(2k+1)²` window centred on its
    /// subcell block, `k = supersample / 2`. Pixels without a touched cell stay black.
    /// Returns `Ok(None)` if `cancel` fires before the image is complete.
    pub fn render(
        &self,
        accumulator: &Accumulator,
        gamma: f64,
        cancel: &CancelToken,
    ) -> Result<Option<ToneMapped>> {
        let s = self.supersample;
        let width = accumulator.width() / s;
        let height = accumulator.height() / s;
        let exponent = self.convention.exponent(gamma);

        let rows: Option<Vec<Vec<Option<[u8; 3]>>>> = (0..height)
            .into_par_iter()
            .map(|py| {
                let mut row = Vec::with_capacity(width);
                for px in 0..width {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    row.push(self.filter(accumulator, px, py, exponent));
                }
                Some(row)
            })
            .collect();
        let Some(rows) = rows else {
            return Ok(None);
        };

        let mut data = vec![0u8; width * height * 3];
        let mut painted = 0;
        {
            let root = BitMapBackend::with_buffer(&mut data, (width as u32, height as u32))
                .into_drawing_area();
            root.fill(&BLACK).map_err(paint_error)?;
            for (py, row) in rows.iter().enumerate() {
                for (px, rgb) in row.iter().enumerate() {
                    if let Some([r, g, b]) = *rgb {
                        root.draw_pixel((px as i32, py as i32), &RGBColor(r, g, b))
                            .map_err(paint_error)?;
                        painted += 1;
                    }
                }
            }
            root.present().map_err(paint_error)?;
        }

        Ok(Some(ToneMapped {
            pixels: PixelBuffer {
                width,
                height,
                data,
            },
            painted,
        }))
    }

    fn filter(&self, accumulator: &Accumulator, px: usize, py: usize, exponent: f64) -> Option<[u8; 3]> {
        let s = self.supersample;
        let k = s / 2;
        let (cx, cy) = (px * s + k, py * s + k);
        let x_range = cx.saturating_sub(k)..(cx + k + 1).min(accumulator.width());
        let y_range = cy.saturating_sub(k)..(cy + k + 1).min(accumulator.height());

        let mut total = [0.0f64; 3];
        let mut touched = 0usize;
        for y in y_range {
            let row = accumulator.row(y);
            for cell in &row[x_range.clone()] {
                if !cell.is_touched() {
                    continue;
                }
                let value = Self::intensity(cell, exponent);
                for (t, v) in total.iter_mut().zip(value) {
                    *t += v.min(1.0);
                }
                touched += 1;
            }
        }
        if touched == 0 {
            return None;
        }
        Some(total.map(|t| (t / touched as f64 * 255.0 + 0.5) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn render(acc: &Accumulator, s: usize, gamma: f64) -> ToneMapped {
        ToneMapper::new(s, GammaConvention::Power)
            .render(acc, gamma, &CancelToken::new())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn empty_histogram_paints_nothing() {
        let acc = Accumulator::new(12, 9);
        let out = render(&acc, 3, 4.0);
        assert_eq!(out.painted, 0);
        assert_eq!((out.pixels.width(), out.pixels.height()), (4, 3));
        assert!(out.pixels.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn log_density_value_for_one_cell() {
        let mut acc = Accumulator::new(2, 2);
        for _ in 0..3 {
            acc.deposit(1, 0, [0.5, 0.25, 0.0]);
        }
        let out = render(&acc, 1, 1.0);
        assert_eq!(out.painted, 1);
        // ln(3)/3 * 1.5 = 0.5493 -> 140, ln(3)/3 * 0.75 = 0.2747 -> 70
        assert_eq!(out.pixels.pixel(1, 0), Some([140, 70, 0]));
        assert_eq!(out.pixels.pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn single_visit_counts_as_painted_but_stays_dark() {
        let mut acc = Accumulator::new(3, 3);
        acc.deposit(0, 0, [1.0, 1.0, 1.0]);
        let out = render(&acc, 3, 4.0);
        assert_eq!(out.painted, 1);
        assert_eq!(out.pixels.pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn averages_touched_subcells_only() {
        let mut acc = Accumulator::new(3, 3);
        // 8 visits of pure red give alpha·sum = ln(8) > 1, clamped to 1.
        for _ in 0..8 {
            acc.deposit(0, 0, [1.0, 0.0, 0.0]);
        }
        for _ in 0..3 {
            acc.deposit(2, 2, [0.0, 0.0, 0.0]);
        }
        let out = render(&acc, 3, 1.0);
        assert_eq!(out.painted, 1);
        // (1.0 + 0.0) / 2 touched cells
        assert_eq!(out.pixels.pixel(0, 0), Some([128, 0, 0]));
    }

    #[test]
    fn intensity_is_monotonic_in_hits() {
        let color = [0.3, 0.6, 0.9];
        for exponent in [0.25, 1.0, 4.0] {
            let mut previous = [0.0f64; 3];
            for n in 1..2000u64 {
                let cell = Cell {
                    hits: n,
                    color_sum: color.map(|c| c * n as f64),
                    alpha_count: n,
                };
                let value = ToneMapper::intensity(&cell, exponent);
                for (v, p) in value.iter().zip(previous) {
                    assert!(*v >= p, "n = {} exponent = {}", n, exponent);
                }
                previous = value;
            }
        }
    }

    #[test]
    fn dense_cell_beyond_u32_stays_bright() {
        let n = u64::from(u32::MAX) + 5;
        let cell = Cell {
            hits: n,
            color_sum: [n as f64; 3],
            alpha_count: n,
        };
        let value = ToneMapper::intensity(&cell, 1.0);
        assert!(value.iter().all(|v| v.is_finite() && *v > 1.0));
    }

    #[test]
    fn gamma_convention_changes_the_image() {
        let mut acc = Accumulator::new(1, 1);
        for _ in 0..2 {
            acc.deposit(0, 0, [0.5, 0.5, 0.5]);
        }
        let power = ToneMapper::new(1, GammaConvention::Power)
            .render(&acc, 2.0, &CancelToken::new())
            .unwrap()
            .unwrap();
        let inverse = ToneMapper::new(1, GammaConvention::InversePower)
            .render(&acc, 2.0, &CancelToken::new())
            .unwrap()
            .unwrap();
        assert!(power.pixels.pixel(0, 0).unwrap()[0] < inverse.pixels.pixel(0, 0).unwrap()[0]);
    }

    #[test]
    fn even_supersampling_clips_the_window() {
        let mut acc = Accumulator::new(4, 4);
        for _ in 0..5 {
            acc.deposit(3, 3, [1.0, 1.0, 1.0]);
        }
        let out = render(&acc, 2, 1.0);
        assert_eq!((out.pixels.width(), out.pixels.height()), (2, 2));
        assert_eq!(out.painted, 1);
        assert!(out.pixels.pixel(1, 1).unwrap()[0] > 0);
    }

    #[test]
    fn cancelled_render_returns_nothing() {
        let mut acc = Accumulator::new(9, 9);
        acc.deposit(4, 4, [1.0; 3]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let out = ToneMapper::new(3, GammaConvention::Power).render(&acc, 4.0, &cancel).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut acc = Accumulator::new(30, 30);
        for i in 0..500usize {
            acc.deposit((i * 7) % 30, (i * 13) % 30, [0.2, 0.4, 0.8]);
        }
        assert_eq!(render(&acc, 3, 4.0), render(&acc, 3, 4.0));
    }
}
