//! Vector geometry on Cartesian coordinates.
//!
//! All angles are returned in degrees. Functions that normalize bond vectors
//! first check that no two participating points coincide.

use thiserror::Error;

pub type Vec3 = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Two participating atoms share identical coordinates. Indices refer to
    /// the position of the atom within the measurement (0 = `a`).
    #[error("atom coordinates for atom {first} and atom {second} can not be equal")]
    Degenerate { first: usize, second: usize },

    /// The three points lie on one line, so they span no plane.
    #[error("atoms are collinear and do not define a plane")]
    Collinear,
}

const COLLINEAR_EPS: f64 = 1e-10;

#[inline]
fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn scale(a: Vec3, k: f64) -> Vec3 {
    [a[0] * k, a[1] * k, a[2] * k]
}

fn unit(a: Vec3) -> Vec3 {
    scale(a, 1.0 / norm(a))
}

fn acos_deg(cos: f64) -> f64 {
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Fails on the first pair of exactly equal points.
pub fn check_distinct(points: &[Vec3]) -> Result<(), GeometryError> {
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if points[i] == points[j] {
                return Err(GeometryError::Degenerate {
                    first: i,
                    second: j,
                });
            }
        }
    }
    Ok(())
}

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    norm(sub(a, b))
}

/// Angle a-b-c with its vertex at `b`, in [0, 180].
pub fn angle(a: Vec3, b: Vec3, c: Vec3) -> Result<f64, GeometryError> {
    check_distinct(&[a, b, c])?;
    let u = unit(sub(a, b));
    let v = unit(sub(c, b));
    Ok(acos_deg(dot(u, v)))
}

/// Unit normal of the plane through a, b and c.
///
/// With `u` the unit bond vector b→a and `v` the unit bond vector b→c, the
/// normal is `v × u` normalized.
pub fn plane_normal(a: Vec3, b: Vec3, c: Vec3) -> Result<Vec3, GeometryError> {
    check_distinct(&[a, b, c])?;
    let u = unit(sub(a, b));
    let v = unit(sub(c, b));
    let n = cross(v, u);
    if norm(n) < COLLINEAR_EPS {
        return Err(GeometryError::Collinear);
    }
    Ok(unit(n))
}

/// Unsigned dihedral angle of the chain a-b-c-d, in [0, 180].
///
/// This is the angle between the planes (a, b, c) and (b, c, d), so +60° and
/// -60° are both reported as 60°. Use [`signed_dihedral`] when the sense of
/// rotation matters. A collinear half chain is treated as lying in the other
/// plane and yields 0.
pub fn dihedral(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Result<f64, GeometryError> {
    check_distinct(&[a, b, c, d])?;
    let (n1, n2) = match (plane_normal(a, b, c), plane_normal(b, c, d)) {
        (Ok(n1), Ok(n2)) => (n1, n2),
        (Err(GeometryError::Collinear), _) | (_, Err(GeometryError::Collinear)) => {
            return Ok(0.0);
        }
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };
    Ok(acos_deg(dot(n1, n2)))
}

/// Signed dihedral angle of the chain a-b-c-d, in (-180, 180].
///
/// Positive values are clockwise rotations of `a` onto `d` looking down the
/// b→c bond (IUPAC convention).
pub fn signed_dihedral(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Result<f64, GeometryError> {
    check_distinct(&[a, b, c, d])?;
    let b0 = sub(a, b);
    let b1 = unit(sub(c, b));
    let b2 = sub(d, c);

    // Components of the outer bonds perpendicular to the central bond.
    let v = sub(b0, scale(b1, dot(b0, b1)));
    let w = sub(b2, scale(b1, dot(b2, b1)));
    if norm(v) < COLLINEAR_EPS || norm(w) < COLLINEAR_EPS {
        return Ok(0.0);
    }

    let x = dot(v, w);
    let y = dot(cross(b1, v), w);
    Ok(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = [0.1, -2.0, 3.5];
        let b = [1.4, 0.2, -0.7];
        assert_eq!(distance(a, b), distance(b, a));
        assert_eq!(distance(a, a), 0.0);
        assert_close(distance([0.0; 3], [3.0, 4.0, 0.0]), 5.0);
    }

    #[test]
    fn right_angle() {
        let a = angle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]).unwrap();
        assert_close(a, 90.0);
    }

    #[test]
    fn angle_stays_in_range() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.2, -0.3],
            [2.0, 0.0, 0.0],
            [-1.0, 0.5, 0.25],
            [0.3, 3.0, 1.0],
        ];
        for a in points {
            for b in points {
                for c in points {
                    if let Ok(deg) = angle(a, b, c) {
                        assert!((0.0..=180.0).contains(&deg), "{deg}");
                    }
                }
            }
        }
        assert_close(angle([0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]).unwrap(), 180.0);
        assert_close(angle([2.0, 0.0, 0.0], [0.0; 3], [1.0, 0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn coincident_atoms_are_degenerate() {
        let p = [1.0, 2.0, 3.0];
        assert_eq!(
            angle(p, p, [0.0; 3]),
            Err(GeometryError::Degenerate { first: 0, second: 1 })
        );
        assert_eq!(
            angle([0.0; 3], p, p),
            Err(GeometryError::Degenerate { first: 1, second: 2 })
        );
        assert_eq!(
            dihedral([0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0; 3]),
            Err(GeometryError::Degenerate { first: 0, second: 3 })
        );
        assert_eq!(
            GeometryError::Degenerate { first: 0, second: 3 }.to_string(),
            "atom coordinates for atom 0 and atom 3 can not be equal"
        );
    }

    #[test]
    fn plane_normal_of_xy_triangle_points_along_z() {
        let n = plane_normal([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]).unwrap();
        assert_close(n[0], 0.0);
        assert_close(n[1], 0.0);
        assert_close(n[2].abs(), 1.0);
        assert_close(norm(n), 1.0);

        assert_eq!(
            plane_normal([0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            Err(GeometryError::Collinear)
        );
    }

    #[test]
    fn planar_chain_has_zero_dihedral() {
        let d = dihedral(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 1.0, 0.0],
        )
        .unwrap();
        assert_close(d, 0.0);
    }

    #[test]
    fn cis_trans_and_perpendicular_dihedrals() {
        let b = [0.0, 0.0, 0.0];
        let c = [1.0, 0.0, 0.0];
        let a = [0.0, 1.0, 0.0];

        assert_close(dihedral(a, b, c, [1.0, 1.0, 0.0]).unwrap(), 0.0);
        assert_close(dihedral(a, b, c, [1.0, -1.0, 0.0]).unwrap(), 180.0);
        assert_close(dihedral(a, b, c, [1.0, 0.0, 1.0]).unwrap(), 90.0);
        assert_close(dihedral(a, b, c, [1.0, 0.0, -1.0]).unwrap(), 90.0);
    }

    #[test]
    fn dihedral_stays_in_range() {
        let chain = [[0.3, 1.1, -0.2], [0.0, 0.0, 0.0], [1.5, 0.0, 0.0]];
        for k in 0..24_i32 {
            let t = f64::from(k) * 15.0_f64.to_radians();
            let d = [1.5 + 0.5, t.cos(), t.sin()];
            let deg = dihedral(chain[0], chain[1], chain[2], d).unwrap();
            assert!((0.0..=180.0).contains(&deg), "{deg}");
        }
    }

    #[test]
    fn signed_dihedral_distinguishes_rotation_sense() {
        let a = [0.0, 1.0, 0.0];
        let b = [0.0, 0.0, 0.0];
        let c = [1.0, 0.0, 0.0];

        let plus = signed_dihedral(a, b, c, [1.0, 0.0, 1.0]).unwrap();
        let minus = signed_dihedral(a, b, c, [1.0, 0.0, -1.0]).unwrap();
        assert_close(plus, 90.0);
        assert_close(minus, -90.0);
        assert_close(signed_dihedral(a, b, c, [1.0, 1.0, 0.0]).unwrap(), 0.0);
        assert_close(signed_dihedral(a, b, c, [1.0, -1.0, 0.0]).unwrap().abs(), 180.0);

        let unsigned = dihedral(a, b, c, [1.0, 0.0, -1.0]).unwrap();
        assert_close(unsigned, minus.abs());
    }
}
