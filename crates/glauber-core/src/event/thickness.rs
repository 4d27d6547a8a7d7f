use super::TINY;
use crate::grid::Grid;
use crate::nucleus::Nucleus;
use crate::profile::NucleonProfile;
use rand::Rng;

/// Construct a nuclear thickness field by looping over participants and
/// adding each to a small subgrid within the profile radius. Compared to the
/// other possibility (grid cells as the outer loop and participants as the
/// inner loop), this bounds the per-nucleon cost to the profile's support
/// area instead of the whole domain. The event tests verify that the two
/// methods agree, including when a subgrid is clipped by the domain edge.
///
/// Returns the number of participants deposited.
pub(crate) fn deposit<R: Rng + ?Sized>(
    field: &mut Grid,
    nucleus: &Nucleus,
    profile: &mut NucleonProfile,
    rng: &mut R,
) -> usize {
    field.reset();

    let geometry = field.geometry();
    let r = profile.radius();
    let mut npart = 0;

    for nucleon in nucleus {
        if !nucleon.is_participant() {
            continue;
        }
        npart += 1;

        // Work in coordinates relative to the lower-left domain corner.
        let x = nucleon.x() + geometry.half_extent;
        let y = nucleon.y() + geometry.half_extent;

        let col_min = clamped_cell((x - r) / geometry.step, geometry.nsteps);
        let col_max = clamped_cell((x + r) / geometry.step, geometry.nsteps);
        let row_min = clamped_cell((y - r) / geometry.step, geometry.nsteps);
        let row_max = clamped_cell((y + r) / geometry.step, geometry.nsteps);

        // Prepare profile for the new nucleon.
        profile.fluctuate(rng);

        for row in row_min..=row_max {
            let dy = y - geometry.cell_center(row);
            let dysq = dy * dy;
            for col in col_min..=col_max {
                let dx = x - geometry.cell_center(col);
                field.add(row, col, profile.thickness(dx * dx + dysq));
            }
        }
    }

    npart
}

/// Floor a grid-local coordinate (in step units) to a cell index clamped to
/// `[0, nsteps-1]`. Flooring (rather than truncating toward zero) keeps
/// subgrid bounds consistent for positions left of the domain.
#[inline]
fn clamped_cell(raw: f64, nsteps: usize) -> usize {
    let max = nsteps - 1;
    let cell = raw.floor();
    if cell <= 0.0 {
        0
    } else if cell >= max as f64 {
        max
    } else {
        cell as usize
    }
}

/// Scalars produced alongside the reduced thickness field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReducedSummary {
    pub multiplicity: f64,
    /// Center of mass, grid-index units.
    pub xcm: f64,
    pub ycm: f64,
}

/// Combine the two nuclear thickness fields into the reduced thickness field,
/// accumulating its total mass and center of mass in the same pass.
pub(crate) fn combine(
    thickness_a: &Grid,
    thickness_b: &Grid,
    reduced: &mut Grid,
    norm: f64,
) -> ReducedSummary {
    let geometry = reduced.geometry();

    let mut sum = 0.0;
    let mut xcm = 0.0;
    let mut ycm = 0.0;

    for row in 0..geometry.nsteps {
        for col in 0..geometry.nsteps {
            let t = norm * (thickness_a.value(row, col) + thickness_b.value(row, col));
            reduced.set(row, col, t);
            sum += t;
            // Center of mass in grid indices; the step factor cancels in the
            // centroid ratio and is reintroduced only for the multiplicity.
            xcm += t * col as f64;
            ycm += t * row as f64;
        }
    }

    // Guard the degenerate zero-mass case instead of propagating NaN.
    let denom = sum.max(TINY);
    ReducedSummary {
        multiplicity: geometry.step * geometry.step * sum,
        xcm: xcm / denom,
        ycm: ycm / denom,
    }
}
