use crate::error::{ChartError, ChartResult};

/// Affine mapping between a numeric domain and a pixel span `[0, length_px]`.
///
/// Both chart axes are expressed with this type: the index axis maps
/// `[from, from + candles_per_screen]` onto the surface width, the price axis
/// maps `[min_price, max_price]` onto the surface height (inverted by the
/// caller).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.domain_end - self.domain_start
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64, length_px: f64) -> f64 {
        (value - self.domain_start) / self.span() * length_px
    }

    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64, length_px: f64) -> f64 {
        self.domain_start + pixel / length_px * self.span()
    }
}
