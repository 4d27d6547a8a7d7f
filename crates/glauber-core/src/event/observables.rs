use super::TINY;
use crate::grid::Grid;

/// Per-order accumulator for the complex harmonic moment sums.
#[derive(Clone, Copy, Debug, Default)]
struct HarmonicAccumulator {
    re: f64,
    im: f64,
    wt: f64,
}

impl HarmonicAccumulator {
    fn finish(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt() / self.wt.max(TINY)
    }
}

/// Eccentricity harmonics of orders 2..=5 about the centroid `(xcm, ycm)`
/// (grid-index units).
///
/// The harmonics are weighted averages of r^n*exp(i*n*phi) over the reduced
/// thickness field. The naive evaluation via `atan2` plus `cos`/`sin` of
/// `n*phi` costs three trig calls per cell; expressing the real and imaginary
/// parts as polynomials in x and y (through the multiple angle formulas, e.g.
/// `sin(2*atan2(y, x)) = 2*x*y/r^2`) eliminates the trig calls and cancels
/// the r^n weight algebraically, avoiding a separate r^n multiplication and
/// its precision loss at large radius. The event tests verify the polynomial
/// and trig forms agree.
pub(crate) fn eccentricity_harmonics(field: &Grid, xcm: f64, ycm: f64) -> [f64; 4] {
    let nsteps = field.geometry().nsteps;

    let mut e2 = HarmonicAccumulator::default();
    let mut e3 = HarmonicAccumulator::default();
    let mut e4 = HarmonicAccumulator::default();
    let mut e5 = HarmonicAccumulator::default();

    for row in 0..nsteps {
        for col in 0..nsteps {
            let t = field.value(row, col);
            if t < TINY {
                continue;
            }

            // (x, y) relative to the centroid; cache powers of x, y, r.
            let x = col as f64 - xcm;
            let x2 = x * x;
            let x3 = x2 * x;
            let x4 = x2 * x2;

            let y = row as f64 - ycm;
            let y2 = y * y;
            let y3 = y2 * y;
            let y4 = y2 * y2;

            let r2 = x2 + y2;
            let r = r2.sqrt();
            let r4 = r2 * r2;

            let xy = x * y;
            let x2y2 = x2 * y2;

            e2.re += t * (y2 - x2);
            e2.im += t * 2.0 * xy;
            e2.wt += t * r2;

            e3.re += t * (y3 - 3.0 * y * x2);
            e3.im += t * (3.0 * x * y2 - x3);
            e3.wt += t * r2 * r;

            e4.re += t * (x4 + y4 - 6.0 * x2y2);
            e4.im += t * 4.0 * xy * (y2 - x2);
            e4.wt += t * r4;

            e5.re += t * y * (5.0 * x4 - 10.0 * x2y2 + y4);
            e5.im += t * x * (x4 - 10.0 * x2y2 + 5.0 * y4);
            e5.wt += t * r4 * r;
        }
    }

    [e2.finish(), e3.finish(), e4.finish(), e5.finish()]
}
