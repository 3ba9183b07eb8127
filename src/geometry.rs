//! Unit-vector conversions and the cosine-of-separation test
//!
//! Everything in this module works in radians internally; the only
//! boundary where degrees are used is [eq2xyz] and its callers.

//a Imports
use geo_nd::Vector;

use crate::{Error, Vec3};

//a Constants
const D2R: f64 = std::f64::consts::PI / 180.0;

//fp eq2xyz
/// Convert a right ascension and declination, both in degrees, to a
/// unit vector on the sphere
///
/// Uses the standard astronomy convention: right ascension is measured
/// around the z axis, declination from the equator
pub fn eq2xyz(ra_deg: f64, dec_deg: f64) -> Result<Vec3, Error> {
    if !(-90.0..=90.0).contains(&dec_deg) {
        return Err(Error::InvalidCoordinate(format!(
            "declination {dec_deg} out of range [-90, 90]"
        )));
    }
    let ra = ra_deg * D2R;
    let dec = dec_deg * D2R;
    let (sin_ra, cos_ra) = ra.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();
    let x = cos_dec * cos_ra;
    let y = cos_dec * sin_ra;
    let z = sin_dec;
    Ok([x, y, z].into())
}

//fp cos_sep
/// The cosine of the angular separation between two unit vectors
///
/// Larger values mean the points are closer together
pub fn cos_sep(p: &Vec3, q: &Vec3) -> f64 {
    p.dot(q)
}

//a Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_prime_meridian() {
        let v = eq2xyz(0.0, 0.0).unwrap();
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
        assert!(v[2].abs() < 1e-12);
    }

    #[test]
    fn north_pole() {
        let v = eq2xyz(123.0, 90.0).unwrap();
        assert!(v[0].abs() < 1e-9);
        assert!(v[1].abs() < 1e-9);
        assert!((v[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_declination() {
        assert!(eq2xyz(0.0, 90.5).is_err());
        assert!(eq2xyz(0.0, -90.5).is_err());
    }

    #[test]
    fn cos_sep_of_identical_point_is_one() {
        let v = eq2xyz(10.5, -4.2).unwrap();
        assert!((cos_sep(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cos_sep_of_half_degree_separation() {
        let p = eq2xyz(10.0, 0.0).unwrap();
        let q = eq2xyz(10.5, 0.0).unwrap();
        let c = cos_sep(&p, &q);
        assert!((c - 0.5f64.to_radians().cos()).abs() < 1e-9);
    }
}
