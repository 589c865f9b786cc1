//! Horn's quaternion fit on aligned C-alpha atoms; never yields a reflection.

use serde::Serialize;

use crate::align::sequence::SequenceAlignment;
use crate::error::KiraError;
use crate::structure::{Point3, Structure, centroid, rotate};

#[derive(Debug, Clone, Serialize)]
pub struct Superposition {
    pub rotation: [[f64; 3]; 3],
    /// `fixed_center - rotation * mobile_center`.
    pub translation: Point3,
    pub fixed_points: Vec<Point3>,
    pub mobile_points: Vec<Point3>,
    pub moved_points: Vec<Point3>,
    #[serde(skip)]
    pub superposed: (Structure, Structure),
}

pub trait StructuralOverlap {
    fn superpose(
        &self,
        fixed: &Structure,
        mobile: &Structure,
        alignment: &SequenceAlignment,
    ) -> Result<Superposition, KiraError>;
}

#[derive(Debug, Clone, Copy)]
pub struct Kabsch {
    pub min_pairs: usize,
}

impl Default for Kabsch {
    fn default() -> Self {
        Self { min_pairs: 3 }
    }
}

impl StructuralOverlap for Kabsch {
    fn superpose(
        &self,
        fixed: &Structure,
        mobile: &Structure,
        alignment: &SequenceAlignment,
    ) -> Result<Superposition, KiraError> {
        let (fixed_points, mobile_points): (Vec<Point3>, Vec<Point3>) = alignment
            .pairs
            .iter()
            .filter_map(|&(i, j)| Some((fixed.ca_position(i)?, mobile.ca_position(j)?)))
            .unzip();

        if fixed_points.len() < self.min_pairs.max(3) {
            return Err(KiraError::InvalidInput(format!(
                "need at least {} aligned C-alpha pairs, found {}",
                self.min_pairs.max(3),
                fixed_points.len()
            )));
        }

        let fixed_center = centroid(&fixed_points);
        let mobile_center = centroid(&mobile_points);
        let rotation = optimal_rotation(&fixed_points, fixed_center, &mobile_points, mobile_center);

        let moved_points = mobile_points
            .iter()
            .map(|point| rotate(&rotation, *point - mobile_center) + fixed_center)
            .collect();
        let translation = fixed_center - rotate(&rotation, mobile_center);
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

        Ok(Superposition {
            rotation,
            translation,
            fixed_points,
            mobile_points,
            moved_points,
            superposed: (
                fixed.transformed(&identity, Point3::default(), Point3::default()),
                mobile.transformed(&rotation, mobile_center, fixed_center),
            ),
        })
    }
}

pub fn optimal_rotation(
    fixed: &[Point3],
    fixed_center: Point3,
    mobile: &[Point3],
    mobile_center: Point3,
) -> [[f64; 3]; 3] {
    let mut s = [[0.0f64; 3]; 3];
    for (f, m) in fixed.iter().zip(mobile) {
        let a = (*m - mobile_center).to_array();
        let b = (*f - fixed_center).to_array();
        for (row, a_value) in s.iter_mut().zip(a) {
            for (cell, b_value) in row.iter_mut().zip(b) {
                *cell += a_value * b_value;
            }
        }
    }

    let [[xx, xy, xz], [yx, yy, yz], [zx, zy, zz]] = s;
    let key = [
        [xx + yy + zz, yz - zy, zx - xz, xy - yx],
        [yz - zy, xx - yy - zz, xy + yx, zx + xz],
        [zx - xz, xy + yx, -xx + yy - zz, yz + zy],
        [xy - yx, zx + xz, yz + zy, -xx - yy + zz],
    ];

    let (eigenvalues, eigenvectors) = jacobi_eigen(key);
    let best = (0..4)
        .max_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]))
        .unwrap_or(0);
    let [q0, q1, q2, q3] = [0, 1, 2, 3].map(|row| eigenvectors[row][best]);

    [
        [
            q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
            2.0 * (q1 * q2 - q0 * q3),
            2.0 * (q1 * q3 + q0 * q2),
        ],
        [
            2.0 * (q1 * q2 + q0 * q3),
            q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,
            2.0 * (q2 * q3 - q0 * q1),
        ],
        [
            2.0 * (q1 * q3 - q0 * q2),
            2.0 * (q2 * q3 + q0 * q1),
            q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
        ],
    ]
}

/// Cyclic Jacobi; eigenvectors are returned as matrix columns.
fn jacobi_eigen<const N: usize>(matrix: [[f64; N]; N]) -> ([f64; N], [[f64; N]; N]) {
    const MAX_SWEEPS: usize = 64;
    const TOLERANCE: f64 = 1e-14;

    let mut a = matrix;
    let mut v = [[0.0f64; N]; N];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _ in 0..MAX_SWEEPS {
        let off_diagonal: f64 = (0..N)
            .flat_map(|p| ((p + 1)..N).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q].abs())
            .sum();
        if off_diagonal < TOLERANCE {
            break;
        }

        for p in 0..N {
            for q in (p + 1)..N {
                if a[p][q].abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..N {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..N {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut eigenvalues = [0.0f64; N];
    for (i, value) in eigenvalues.iter_mut().enumerate() {
        *value = a[i][i];
    }
    (eigenvalues, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::rmsd::rmsd;

    fn cloud() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.8, 0.0, 0.0),
            Point3::new(5.1, 3.2, 0.4),
            Point3::new(4.0, 6.1, 2.2),
            Point3::new(1.2, 7.0, 4.9),
            Point3::new(-1.5, 5.3, 6.6),
        ]
    }

    #[test]
    fn jacobi_diagonalizes_symmetric_matrix() {
        let (values, vectors) = jacobi_eigen([[2.0, 1.0], [1.0, 2.0]]);
        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);
        assert!((sorted[0] - 1.0).abs() < 1e-12);
        assert!((sorted[1] - 3.0).abs() < 1e-12);
        let norm = vectors[0][0].powi(2) + vectors[1][0].powi(2);
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn recovers_rotation_and_translation() {
        let fixed = cloud();
        let (sin, cos) = 1.1f64.sin_cos();
        let mobile = fixed
            .iter()
            .map(|p| Point3::new(cos * p.x - sin * p.y + 5.0, sin * p.x + cos * p.y - 3.0, p.z + 2.0))
            .collect::<Vec<_>>();

        let fixed_center = centroid(&fixed);
        let mobile_center = centroid(&mobile);
        let rotation = optimal_rotation(&fixed, fixed_center, &mobile, mobile_center);
        let moved = mobile
            .iter()
            .map(|p| rotate(&rotation, *p - mobile_center) + fixed_center)
            .collect::<Vec<_>>();
        assert!(rmsd(&fixed, &moved).unwrap() < 1e-9);
    }

    #[test]
    fn mirror_image_is_not_superposable() {
        let fixed = cloud();
        let mirrored = fixed
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect::<Vec<_>>();
        let fixed_center = centroid(&fixed);
        let mobile_center = centroid(&mirrored);
        let rotation = optimal_rotation(&fixed, fixed_center, &mirrored, mobile_center);
        let moved = mirrored
            .iter()
            .map(|p| rotate(&rotation, *p - mobile_center) + fixed_center)
            .collect::<Vec<_>>();
        assert!(rmsd(&fixed, &moved).unwrap() > 0.1);
    }
}
