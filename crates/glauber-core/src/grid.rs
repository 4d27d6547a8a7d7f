use crate::config::ConfigError;

/// Geometry of the square transverse grid, fixed for the lifetime of an event.
///
/// The grid is determined like so:
///   1. Take the requested half-width `max` and the step size from the config.
///   2. Set `nsteps = ceil(2*max/step)`.
///   3. Set the actual half-width as `half_extent = nsteps*step/2`. Hence if
///      the step size does not evenly divide `2*max`, the actual half-width is
///      marginally larger (by at most half a step per side).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub step: f64,
    pub nsteps: usize,
    pub half_extent: f64,
}

impl GridGeometry {
    pub fn new(max: f64, step: f64) -> Result<Self, ConfigError> {
        if !(step > 0.0 && step.is_finite()) {
            return Err(ConfigError::NonPositiveGridStep { value: step });
        }
        if !(max > 0.0 && max.is_finite()) {
            return Err(ConfigError::NonPositiveGridMax { value: max });
        }
        let nsteps = (2.0 * max / step).ceil() as usize;
        Ok(Self {
            step,
            nsteps,
            half_extent: 0.5 * nsteps as f64 * step,
        })
    }

    /// Center of cell `index` along one axis, in grid-local coordinates
    /// (origin at the lower-left corner of the domain).
    #[inline]
    pub fn cell_center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.step
    }
}

/// A scalar field over the grid, stored row-major.
///
/// The buffer is allocated once and reused across events; `reset` zero-fills
/// without reallocating.
#[derive(Clone, Debug)]
pub struct Grid {
    geometry: GridGeometry,
    data: Vec<f64>,
}

impl Grid {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            data: vec![0.0; geometry.nsteps * geometry.nsteps],
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn reset(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.geometry.nsteps && col < self.geometry.nsteps);
        row * self.geometry.nsteps + col
    }

    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let i = self.index(row, col);
        self.data[i] = value;
    }

    #[inline]
    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        let i = self.index(row, col);
        self.data[i] += delta;
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_minimal_cover_of_requested_domain() {
        let cases = [
            (10.0, 0.2),
            (10.0, 0.3),
            (5.0, 1.0),
            (0.05, 0.2),
            (7.3, 0.17),
            (1.0, 0.33),
        ];
        for (max, step) in cases {
            let geometry = GridGeometry::new(max, step).unwrap();
            let n = geometry.nsteps as f64;
            assert!(
                n * step >= 2.0 * max,
                "grid ({max}, {step}) does not cover the requested domain"
            );
            assert!(
                (n - 1.0) * step < 2.0 * max,
                "grid ({max}, {step}) is one step larger than necessary"
            );
            assert!((geometry.half_extent - 0.5 * n * step).abs() < 1e-12);
        }
    }

    #[test]
    fn exact_multiple_does_not_over_cover() {
        let geometry = GridGeometry::new(10.0, 0.2).unwrap();
        assert_eq!(geometry.nsteps, 100);
        assert!((geometry.half_extent - 10.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        assert!(GridGeometry::new(10.0, 0.0).is_err());
        assert!(GridGeometry::new(10.0, -0.5).is_err());
        assert!(GridGeometry::new(0.0, 0.2).is_err());
        assert!(GridGeometry::new(-1.0, 0.2).is_err());
        assert!(GridGeometry::new(f64::INFINITY, 0.2).is_err());
        assert!(GridGeometry::new(10.0, f64::NAN).is_err());
    }

    #[test]
    fn reset_zeroes_without_reallocating() {
        let geometry = GridGeometry::new(1.0, 0.5).unwrap();
        let mut grid = Grid::new(geometry);
        grid.add(1, 2, 3.5);
        grid.add(1, 2, 0.5);
        assert_eq!(grid.value(1, 2), 4.0);
        assert_eq!(grid.total(), 4.0);

        let ptr = grid.data.as_ptr();
        grid.reset();
        assert_eq!(grid.total(), 0.0);
        assert_eq!(ptr, grid.data.as_ptr(), "reset must not reallocate");
    }

    #[test]
    fn cell_centers_span_the_domain_symmetrically() {
        let geometry = GridGeometry::new(2.0, 0.5).unwrap();
        // First and last cell centers sit half a step inside the domain edges.
        assert!((geometry.cell_center(0) - 0.25).abs() < 1e-12);
        let last = geometry.cell_center(geometry.nsteps - 1);
        assert!((last - (2.0 * geometry.half_extent - 0.25)).abs() < 1e-12);
    }
}
