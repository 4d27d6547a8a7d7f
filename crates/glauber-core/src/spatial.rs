use crate::nucleus::Nucleus;
use rstar::{RTree, RTreeObject, AABB};

/// A nucleon's transverse position tagged with its index in the nucleus.
#[derive(Clone, Debug)]
pub struct IndexedPosition {
    pub position: [f64; 2],
    pub index: usize,
}

impl RTreeObject for IndexedPosition {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Build an R*-tree over a nucleus's nucleon positions via bulk_load (O(n log n)).
pub fn build_index(nucleus: &Nucleus) -> RTree<IndexedPosition> {
    RTree::bulk_load(
        nucleus
            .iter()
            .enumerate()
            .map(|(index, nucleon)| IndexedPosition {
                position: [nucleon.x(), nucleon.y()],
                index,
            })
            .collect(),
    )
}

/// Nucleon indices within `radius` of `center`.
/// Uses an AABB envelope query then filters by Euclidean distance.
pub fn query_within(
    tree: &RTree<IndexedPosition>,
    center: [f64; 2],
    radius: f64,
) -> Vec<usize> {
    let envelope = AABB::from_corners(
        [center[0] - radius, center[1] - radius],
        [center[0] + radius, center[1] + radius],
    );
    let r_sq = radius * radius;

    tree.locate_in_envelope(&envelope)
        .filter(|entry| {
            let dx = entry.position[0] - center[0];
            let dy = entry.position[1] - center[1];
            dx * dx + dy * dy < r_sq
        })
        .map(|entry| entry.index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nucleon::Nucleon;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn query_matches_brute_force() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let nucleons: Vec<Nucleon> = (0..200)
            .map(|_| {
                Nucleon::new(
                    rng.random_range(-8.0..8.0),
                    rng.random_range(-8.0..8.0),
                )
            })
            .collect();
        let nucleus = Nucleus::from_nucleons(nucleons);
        let tree = build_index(&nucleus);

        for _ in 0..50 {
            let center = [rng.random_range(-8.0..8.0), rng.random_range(-8.0..8.0)];
            let radius = rng.random_range(0.1..4.0);
            let mut found = query_within(&tree, center, radius);
            found.sort_unstable();

            let expected: Vec<usize> = nucleus
                .iter()
                .enumerate()
                .filter(|(_, n)| {
                    let dx = n.x() - center[0];
                    let dy = n.y() - center[1];
                    dx * dx + dy * dy < radius * radius
                })
                .map(|(i, _)| i)
                .collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn empty_query_outside_cloud() {
        let nucleus = Nucleus::from_nucleons(vec![Nucleon::new(0.0, 0.0)]);
        let tree = build_index(&nucleus);
        assert!(query_within(&tree, [100.0, 100.0], 1.0).is_empty());
    }
}
