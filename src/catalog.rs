//! The primary catalog: per-point geometry, precomputed disc pixels, and
//! the match list the matching driver fills in.

use log::debug;

use crate::geometry::eq2xyz;
use crate::healpix::HealpixContext;
use crate::{Error, MatchVec, Vec3};

//a Point
//tp Point
/// A point on the unit sphere together with its matching radius
#[derive(Debug, Clone, Copy)]
pub struct Point {
    /// Unit vector on the sphere
    pub vec: Vec3,
    /// Matching radius, in radians
    pub radius: f64,
    /// `cos(radius)`, cached for the per-candidate acceptance test
    pub cos_radius: f64,
}

//ip Point
impl Point {
    //cp new
    /// Build a point from (ra, dec) in degrees and a radius in radians
    fn new(ra_deg: f64, dec_deg: f64, radius: f64) -> Result<Self, Error> {
        let vec = eq2xyz(ra_deg, dec_deg)?;
        Ok(Self {
            vec,
            radius,
            cos_radius: radius.cos(),
        })
    }

    //ap x
    pub fn x(&self) -> f64 {
        self.vec[0]
    }
    //ap y
    pub fn y(&self) -> f64 {
        self.vec[1]
    }
    //ap z
    pub fn z(&self) -> f64 {
        self.vec[2]
    }
}

//a CatalogEntry
//tp CatalogEntry
/// One primary-catalog entry: its point, the HEALPix ids its disc
/// intersects, and the match list the matching driver maintains for it
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// The point and its radius
    pub point: Point,
    /// HEALPix RING ids whose cell intersects this point's disc; computed
    /// once at construction and never mutated afterwards
    pub disc_pixels: Vec<i64>,
    /// Accepted matches for this entry; mutated only by [crate::Engine]
    pub matches: MatchVec,
}

//a Catalog
//tp Catalog
/// The primary catalog: an ordered sequence of [CatalogEntry]
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

//ip Catalog
impl Catalog {
    //cp new
    /// Build a catalog from parallel `ra`/`dec`/`radius` arrays (all in
    /// degrees) and a HEALPix context
    ///
    /// Fails with [Error::InvalidInput] if the arrays are empty or of
    /// mismatched length; fails with [Error::InvalidCoordinate] if any
    /// declination is out of range.
    pub fn new(
        hpix: &HealpixContext,
        ra: &[f64],
        dec: &[f64],
        radius_deg: &[f64],
    ) -> Result<Self, Error> {
        let n = ra.len();
        if n == 0 {
            return Err(Error::InvalidInput("primary catalog is empty".to_string()));
        }
        if dec.len() != n || radius_deg.len() != n {
            return Err(Error::InvalidInput(format!(
                "ra/dec/radius arrays must have equal length; got {}, {}, {}",
                n,
                dec.len(),
                radius_deg.len()
            )));
        }

        const D2R: f64 = std::f64::consts::PI / 180.0;
        let mut entries = Vec::with_capacity(n);
        let mut total_disc_pixels = 0usize;
        for i in 0..n {
            let point = Point::new(ra[i], dec[i], radius_deg[i] * D2R)?;
            let mut disc_pixels = Vec::new();
            hpix.disc_intersect(&point.vec, point.radius, &mut disc_pixels);
            total_disc_pixels += disc_pixels.len();
            entries.push(CatalogEntry {
                point,
                disc_pixels,
                matches: MatchVec::new(),
            });
        }
        debug!(
            "catalog built: {n} primary points, nside={}, {total_disc_pixels} total disc-pixel entries",
            hpix.nside()
        );
        Ok(Self { entries })
    }

    //ap len
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    //ap is_empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    //ap iter
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    //ap entries
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    //ap entries_mut
    pub fn entries_mut(&mut self) -> &mut [CatalogEntry] {
        &mut self.entries
    }
}

impl std::ops::Index<usize> for Catalog {
    type Output = CatalogEntry;
    fn index(&self, i: usize) -> &CatalogEntry {
        &self.entries[i]
    }
}

//a Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> HealpixContext {
        HealpixContext::new(64).unwrap()
    }

    #[test]
    fn rejects_empty_catalog() {
        let hpix = ctx();
        let err = Catalog::new(&hpix, &[], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let hpix = ctx();
        let err = Catalog::new(&hpix, &[1.0, 2.0], &[1.0], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_bad_declination() {
        let hpix = ctx();
        let err = Catalog::new(&hpix, &[0.0], &[91.0], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate(_)));
    }

    #[test]
    fn builds_single_point_catalog() {
        let hpix = ctx();
        let cat = Catalog::new(&hpix, &[10.0], &[20.0], &[1.0]).unwrap();
        assert_eq!(cat.len(), 1);
        assert!(!cat[0].disc_pixels.is_empty());
        assert_eq!(cat[0].matches.len(), 0);
        assert!((cat[0].point.cos_radius - 1.0_f64.to_radians().cos()).abs() < 1e-12);
    }
}
