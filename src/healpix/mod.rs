//! HEALPix RING-scheme pixelization
//!
//! The `ang2pix` core is transcribed from the standard HEALPix `ang2pix_ring`
//! formulas (see e.g. Gorski et al. 2005, and the sibling transcription in
//! the `startracker` crate's `healpix.rs`, which this module generalizes
//! from `u32` pixel numbers to signed `i64` ids and adds disc enumeration).
//!
//! `nside` must be a positive power of two; `npix = 12 * nside^2`.

//a Imports
use std::f64::consts::PI;

use crate::{Error, Vec3};

//a Constants
const D2R: f64 = PI / 180.0;

//a HealpixContext
//tp HealpixContext
/// An immutable HEALPix RING-scheme context for a given `nside`
#[derive(Debug, Clone, Copy)]
pub struct HealpixContext {
    nside: i64,
    npix: i64,
}

//ip HealpixContext
impl HealpixContext {
    //cp new
    /// Create a context for the given `nside`, which must be a positive
    /// power of two
    pub fn new(nside: i64) -> Result<Self, Error> {
        if nside <= 0 || (nside & (nside - 1)) != 0 {
            return Err(Error::InvalidInput(format!(
                "nside {nside} must be a positive power of two"
            )));
        }
        Ok(Self {
            nside,
            npix: npix(nside),
        })
    }

    //ap nside
    /// The resolution parameter
    pub fn nside(&self) -> i64 {
        self.nside
    }

    //ap npix
    /// The total number of pixels, `12 * nside^2`
    pub fn npix(&self) -> i64 {
        self.npix
    }

    //ap pixel_area
    /// The solid angle (steradians) subtended by a single pixel
    pub fn pixel_area(&self) -> f64 {
        pixel_area(self.nside)
    }

    //fp eq2pix
    /// Map a (ra, dec) in degrees to a RING-scheme pixel id in `[0, npix)`
    pub fn eq2pix(&self, ra_deg: f64, dec_deg: f64) -> Result<i64, Error> {
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(Error::InvalidCoordinate(format!(
                "declination {dec_deg} out of range [-90, 90]"
            )));
        }
        let theta = (90.0 - dec_deg) * D2R;
        let phi = ra_deg * D2R;
        let z = theta.cos();
        Ok(ang2pix_ring_z_phi(self.nside, z, phi))
    }

    //fp disc_intersect
    /// Append to `out` the id of every RING-scheme pixel whose cell
    /// intersects the spherical cap of the given centre and angular radius
    /// (in radians)
    ///
    /// The enumeration is a conservative over-approximation: a fixed,
    /// resolution-dependent fudge term (the angular size of one pixel) is
    /// added to `radius` before any ring or per-ring pixel range is
    /// computed, so that a point exactly on the cap boundary is never
    /// missed. Output order is unspecified; ids are not repeated (each
    /// ring owns a disjoint, contiguous range of pixel ids).
    pub fn disc_intersect(&self, center: &Vec3, radius: f64, out: &mut Vec<i64>) {
        disc_intersect(self.nside, center, radius, out);
    }
}

//a Free functions
//fp npix
/// `npix(nside) = 12 * nside^2`
pub fn npix(nside: i64) -> i64 {
    12 * nside * nside
}

//fp pixel_area
/// `pixel_area(nside) = 4*pi / npix(nside)`
pub fn pixel_area(nside: i64) -> f64 {
    4.0 * PI / (npix(nside) as f64)
}

//a Internal ring geometry
//tp RingInfo
/// The geometric description of a single iso-latitude ring of pixels
struct RingInfo {
    z: f64,
    num_pix: i64,
    start: i64,
    shift: f64,
    dphi_unit: f64,
}

//fi ring_info
/// Compute the ring descriptor for global ring index `t` (1-based, north
/// pole to south pole, `1..=4*nside-1`)
fn ring_info(nside: i64, t: i64) -> RingInfo {
    let npix = npix(nside);
    let fact2 = 4.0 / (npix as f64);
    if t <= nside - 1 {
        // north polar cap
        let z = 1.0 - (t * t) as f64 * fact2;
        RingInfo {
            z,
            num_pix: 4 * t,
            start: 2 * t * (t - 1),
            shift: 0.5,
            dphi_unit: PI / (2.0 * t as f64),
        }
    } else if t <= 3 * nside {
        // equatorial belt
        let ncap = 2 * nside * (nside - 1);
        let fodd = if (t + nside) % 2 == 0 { 0.5 } else { 1.0 };
        RingInfo {
            z: (2 * nside - t) as f64 * (2.0 / (3.0 * nside as f64)),
            num_pix: 4 * nside,
            start: ncap + (t - nside) * 4 * nside,
            shift: fodd,
            dphi_unit: PI / (2.0 * nside as f64),
        }
    } else {
        // south polar cap, mirrors the north cap
        let s = 4 * nside - t;
        let z = -(1.0 - (s * s) as f64 * fact2);
        RingInfo {
            z,
            num_pix: 4 * s,
            start: npix - 2 * s * (s + 1),
            shift: 0.5,
            dphi_unit: PI / (2.0 * s as f64),
        }
    }
}

//fi ring_of_z
/// The ring index whose latitude is closest to `z = cos(theta)`
fn ring_of_z(nside: i64, z: f64) -> i64 {
    let npix = npix(nside);
    let fact2 = 4.0 / (npix as f64);
    let z = z.clamp(-1.0, 1.0);
    if z > 2.0 / 3.0 {
        let t = (((1.0 - z) / fact2).sqrt()).round() as i64;
        t.clamp(1, nside - 1)
    } else if z < -2.0 / 3.0 {
        let s = (((1.0 + z) / fact2).sqrt()).round() as i64;
        4 * nside - s.clamp(1, nside - 1)
    } else {
        let t = (2 * nside) as f64 - z * 1.5 * nside as f64;
        (t.round() as i64).clamp(nside, 3 * nside)
    }
}

//fi add_ring_pixels
/// Append the pixel ids of `ring` whose centre azimuth lies within `dphi`
/// of `phi0`
fn add_ring_pixels(ring: &RingInfo, phi0: f64, dphi: f64, out: &mut Vec<i64>) {
    if ring.num_pix <= 0 {
        return;
    }
    if dphi >= PI - 1.0e-12 {
        for idx in 0..ring.num_pix {
            out.push(ring.start + idx);
        }
        return;
    }
    let idx_lo = ((phi0 - dphi) / ring.dphi_unit - ring.shift).floor() as i64;
    let idx_hi = ((phi0 + dphi) / ring.dphi_unit - ring.shift).ceil() as i64;
    if idx_hi - idx_lo + 1 >= ring.num_pix {
        for idx in 0..ring.num_pix {
            out.push(ring.start + idx);
        }
        return;
    }
    for i in idx_lo..=idx_hi {
        let idx = i.rem_euclid(ring.num_pix);
        out.push(ring.start + idx);
    }
}

//fi disc_intersect
fn disc_intersect(nside: i64, center: &Vec3, radius: f64, out: &mut Vec<i64>) {
    let z0 = center[2].clamp(-1.0, 1.0);
    let phi0 = center[1].atan2(center[0]);

    // Conservative inclusive query: expand the search by the angular size
    // of one pixel so that edge-touching cells are never dropped (see the
    // resolved open question on `disc_intersect` inclusivity).
    let fudge = pixel_area(nside).sqrt();
    let r_eff = (radius + fudge).min(PI);
    let cosr = r_eff.cos();

    let theta0 = z0.acos();
    let rlo = (theta0 - r_eff).max(0.0);
    let rhi = (theta0 + r_eff).min(PI);
    let z_hi = rlo.cos();
    let z_lo = rhi.cos();

    let t_min = (ring_of_z(nside, z_hi) - 1).max(1);
    let t_max = (ring_of_z(nside, z_lo) + 1).min(4 * nside - 1);

    for t in t_min..=t_max {
        let ring = ring_info(nside, t);
        let z = ring.z;
        let sq = ((1.0 - z * z).max(0.0)).sqrt() * ((1.0 - z0 * z0).max(0.0)).sqrt();
        if sq < 1.0e-300 {
            if z * z0 >= cosr {
                for idx in 0..ring.num_pix {
                    out.push(ring.start + idx);
                }
            }
            continue;
        }
        let c = (cosr - z * z0) / sq;
        if c <= -1.0 {
            for idx in 0..ring.num_pix {
                out.push(ring.start + idx);
            }
        } else if c > 1.0 {
            continue;
        } else {
            add_ring_pixels(&ring, phi0, c.acos(), out);
        }
    }
}

//fi ang2pix_ring_z_phi
/// The standard HEALPix `ang2pix_ring` formulas, in terms of
/// `z = cos(theta)` and `phi`
fn ang2pix_ring_z_phi(nside: i64, z: f64, phi: f64) -> i64 {
    let za = z.abs();
    let tt = phi.rem_euclid(2.0 * PI) * 2.0 / PI;

    if za <= 2.0 / 3.0 {
        let temp1 = nside as f64 * (0.5 + tt);
        let temp2 = nside as f64 * z * 0.75;
        let jp = (temp1 - temp2).floor() as i64;
        let jm = (temp1 + temp2).floor() as i64;
        let ir = nside + 1 + jp - jm;
        let kshift = 1 - (ir & 1);
        let ip = (jp + jm - nside + kshift + 1) / 2;
        let ip = ip.rem_euclid(4 * nside);
        2 * nside * (nside - 1) + (ir - 1) * 4 * nside + ip
    } else {
        let tp = tt - tt.floor();
        let tmp = nside as f64 * (3.0 * (1.0 - za)).sqrt();
        let jp = (tp * tmp).floor() as i64;
        let jm = ((1.0 - tp) * tmp).floor() as i64;
        let ir = (jp + jm + 1).max(1);
        let ip = ((tt * ir as f64).floor() as i64).rem_euclid(4 * ir);
        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            12 * nside * nside - 2 * ir * (ir + 1) + ip
        }
    }
}
