use crate::angle;
use serde::Serialize;

/// One angular sector around a shared center, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcDefinition {
    pub from: f64,
    pub through: f64,
    pub to: f64,
    pub orig_angle: f64,
}

impl ArcDefinition {
    pub fn contains(&self, angle: f64) -> bool {
        angle::between(angle, self.from, self.to)
    }

    /// Angular width of the sector, clockwise from `from` to `to`.
    pub fn sweep(&self) -> f64 {
        (self.to - self.from).rem_euclid(angle::FULL_CIRCLE_RAD)
    }
}

/// Tiles the circle into one sector per angle.
///
/// Sector bounds are the bisectors between neighbouring angles (sorted
/// ascending, wrapping last to first). A lone angle gets its opposite as a
/// sibling so both sectors have two bounds.
pub fn from_angles(angles: &[f64]) -> Vec<ArcDefinition> {
    let mut angles = angles.to_vec();
    if angles.len() == 1 {
        angles.push(angle::opposite(angles[0]));
    }
    angles.sort_by(f64::total_cmp);

    let bisectors: Vec<f64> = angles
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            let prev = angles[(i + angles.len() - 1) % angles.len()];
            angle::bisecting(prev, current)
        })
        .collect();

    bisectors
        .iter()
        .enumerate()
        .map(|(i, &from)| {
            let to = bisectors[(i + 1) % bisectors.len()];
            ArcDefinition {
                from,
                through: angle::bisecting(from, to),
                to,
                orig_angle: angles[i],
            }
        })
        .collect()
}

/// The sector reserved for `orig_angle`, if present.
pub fn find(arcs: &[ArcDefinition], orig_angle: f64) -> Option<&ArcDefinition> {
    arcs.iter()
        .find(|arc| (arc.orig_angle - orig_angle).abs() < angle::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::to_rad;

    fn check(input: &[f64], expected: &[[f64; 4]]) {
        let angles: Vec<f64> = input.iter().copied().map(to_rad).collect();
        let arcs = from_angles(&angles);
        assert_eq!(arcs.len(), expected.len());

        for (arc, [orig, from, through, to]) in arcs.iter().zip(expected) {
            for (actual, wanted) in [
                (arc.orig_angle, orig),
                (arc.from, from),
                (arc.through, through),
                (arc.to, to),
            ] {
                assert!(
                    (actual - to_rad(*wanted)).abs() < 1e-9,
                    "{input:?}: expected {wanted}°, got {}°",
                    angle::to_deg(actual)
                );
            }
        }
    }

    #[test]
    fn quadrants_are_offset_by_half_a_quadrant() {
        check(
            &[0.0, 90.0, 180.0, 270.0],
            &[
                [0.0, 315.0, 0.0, 45.0],
                [90.0, 45.0, 90.0, 135.0],
                [180.0, 135.0, 180.0, 225.0],
                [270.0, 225.0, 270.0, 315.0],
            ],
        );
    }

    #[test]
    fn two_angles_split_the_gaps() {
        check(
            &[180.0, 270.0],
            &[[180.0, 45.0, 135.0, 225.0], [270.0, 225.0, 315.0, 45.0]],
        );
        check(&[0.0, 180.0], &[[0.0, 270.0, 0.0, 90.0], [180.0, 90.0, 180.0, 270.0]]);
    }

    #[test]
    fn uneven_angles() {
        check(
            &[0.0, 45.0, 180.0],
            &[
                [0.0, 270.0, 326.25, 22.5],
                [45.0, 22.5, 67.5, 112.5],
                [180.0, 112.5, 191.25, 270.0],
            ],
        );
        check(
            &[0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0],
            &[
                [0.0, 270.0, 320.0, 10.0],
                [20.0, 10.0, 20.0, 30.0],
                [40.0, 30.0, 40.0, 50.0],
                [60.0, 50.0, 60.0, 70.0],
                [80.0, 70.0, 80.0, 90.0],
                [100.0, 90.0, 100.0, 110.0],
                [120.0, 110.0, 120.0, 130.0],
                [140.0, 130.0, 140.0, 150.0],
                [160.0, 150.0, 160.0, 170.0],
                [180.0, 170.0, 220.0, 270.0],
            ],
        );
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        check(
            &[270.0, 0.0, 180.0, 90.0],
            &[
                [0.0, 315.0, 0.0, 45.0],
                [90.0, 45.0, 90.0, 135.0],
                [180.0, 135.0, 180.0, 225.0],
                [270.0, 225.0, 270.0, 315.0],
            ],
        );
    }

    #[test]
    fn single_angle_gets_an_opposite_sibling() {
        check(&[90.0], &[[90.0, 0.0, 90.0, 180.0], [270.0, 180.0, 270.0, 0.0]]);
    }

    #[test]
    fn sectors_tile_the_circle() {
        let angles: Vec<f64> = [10.0, 100.0, 200.0, 330.0].map(to_rad).to_vec();
        let arcs = from_angles(&angles);
        let total: f64 = arcs.iter().map(ArcDefinition::sweep).sum();
        assert!((total - angle::FULL_CIRCLE_RAD).abs() < 1e-9);

        for probe in [0.5, 45.0, 150.0, 260.0, 359.0] {
            let hits = arcs.iter().filter(|a| a.contains(to_rad(probe))).count();
            assert_eq!(hits, 1, "probe {probe}° hit {hits} sectors");
        }
    }

    #[test]
    fn find_back_sector() {
        let arcs = from_angles(&[to_rad(0.0), to_rad(90.0), angle::opposite(to_rad(0.0))]);
        let back = find(&arcs, angle::opposite(to_rad(0.0))).unwrap();
        assert!(back.contains(to_rad(180.0)));
        assert!(find(&arcs, to_rad(45.0)).is_none());
    }
}
