//! The matching driver: builds the pixel-id tree from the secondary
//! catalog, walks primary entries, and maintains per-primary match lists
//! under the selected retention policy.

use log::{debug, trace};

use crate::geometry::{cos_sep, eq2xyz};
use crate::healpix::HealpixContext;
use crate::pixtree::PixelTree;
use crate::records;
use crate::{Catalog, Error, Match};

//a Engine
//tp Engine
/// The matching engine: owns the HEALPix context and the primary catalog,
/// and drives matches against successive secondary catalogs
///
/// Not re-entrant: every matching method takes `&mut self`, and the
/// Rust borrow checker (rather than a runtime check, as in the original)
/// enforces that no two matches can be in flight at once.
#[derive(Debug)]
pub struct Engine {
    hpix: HealpixContext,
    catalog: Catalog,
    nmatches: i64,
}

//ip Engine
impl Engine {
    //cp new
    /// Build an engine from a primary catalog's parallel `ra`/`dec`/`radius`
    /// arrays (degrees) and the HEALPix resolution to index it at
    pub fn new(nside: i64, ra: &[f64], dec: &[f64], radius_deg: &[f64]) -> Result<Self, Error> {
        let hpix = HealpixContext::new(nside)?;
        let catalog = Catalog::new(&hpix, ra, dec, radius_deg)?;
        Ok(Self {
            hpix,
            catalog,
            nmatches: 0,
        })
    }

    //ap catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    //ap nmatches
    /// Total accepted matches from the most recent `match_`/`match_to_file`
    /// call (replacements of an already-full top-K slot are not counted)
    pub fn nmatches(&self) -> i64 {
        self.nmatches
    }

    //mi half_npix
    fn half_npix(&self) -> i64 {
        self.hpix.npix() / 2
    }

    //mp match_prep
    /// Empty every primary entry's match list, sizing its capacity for
    /// the retention policy that is about to run
    pub fn match_prep(&mut self, max_match: i64) {
        for entry in self.catalog.entries_mut() {
            if max_match <= 0 {
                entry.matches.clear_and_shrink();
            } else {
                entry.matches.reserve_exact(max_match as usize);
                entry.matches.clear();
            }
        }
    }

    //mi build_tree
    /// Index every secondary point into a fresh pixel-id tree, keyed by
    /// its shifted HEALPix id
    fn build_tree(&self, ra2: &[f64], dec2: &[f64]) -> Result<PixelTree, Error> {
        let half_npix = self.half_npix();
        let mut tree = PixelTree::new();
        for i in 0..ra2.len() {
            let hpixid = self.hpix.eq2pix(ra2[i], dec2[i])?;
            tree.insert(hpixid - half_npix, i);
        }
        Ok(tree)
    }

    //fi check_lengths
    fn check_lengths(ra2: &[f64], dec2: &[f64]) -> Result<(), Error> {
        if ra2.len() != dec2.len() {
            return Err(Error::InvalidInput(format!(
                "secondary ra/dec arrays must have equal length; got {} and {}",
                ra2.len(),
                dec2.len()
            )));
        }
        Ok(())
    }

    //mp match_
    /// Match every primary entry against the secondary catalog `(ra2, dec2)`
    ///
    /// `max_match <= 0` keeps every match; otherwise at most `max_match`
    /// matches per primary entry are retained, preferring the closest.
    /// `matching_self` skips a candidate whose secondary index equals the
    /// primary index being matched (meaningful when the secondary catalog
    /// is the primary catalog itself).
    pub fn match_(
        &mut self,
        max_match: i64,
        matching_self: bool,
        ra2: &[f64],
        dec2: &[f64],
    ) -> Result<(), Error> {
        Self::check_lengths(ra2, dec2)?;
        trace!(
            "match_: {} secondary points, max_match={max_match}, matching_self={matching_self}",
            ra2.len()
        );
        self.match_prep(max_match);
        let tree = self.build_tree(ra2, dec2)?;

        let half_npix = self.half_npix();
        let mut nmatches = 0i64;
        for (ci, entry) in self.catalog.entries_mut().iter_mut().enumerate() {
            let point = entry.point;
            let mut accepted = 0i64;
            // `entry.disc_pixels` and `entry.matches` are disjoint fields of
            // the same entry, so the candidate loop can read one while
            // mutating the other without cloning either.
            for &hpixid in &entry.disc_pixels {
                let Some(indices) = tree.find(hpixid - half_npix) else {
                    continue;
                };
                for &si in indices {
                    if matching_self && si == ci {
                        continue;
                    }
                    let q = eq2xyz(ra2[si], dec2[si])?;
                    let c = cos_sep(&point.vec, &q);
                    if c <= point.cos_radius {
                        continue;
                    }
                    let m = Match {
                        primary_index: ci as i64,
                        secondary_index: si as i64,
                        cosdist: c,
                    };
                    accepted += accept_match(&mut entry.matches, max_match, m);
                }
            }
            nmatches += accepted;
        }
        self.nmatches = nmatches;
        // `tree` is dropped here, tearing down the ephemeral pixel-id tree
        debug!("match_ complete: nmatches={}", self.nmatches);
        Ok(())
    }

    //mp match_to_file
    /// Match against the secondary catalog and write results directly to
    /// `path` in the §6 record grammar
    ///
    /// For unbounded matching (`max_match <= 0`) records are streamed out
    /// as soon as they are accepted, without ever being materialised in a
    /// primary's match list: the query direction is flipped, iterating
    /// secondary points and looking up the single cell they fall in,
    /// relying on the primaries having indexed their discs into the tree
    /// built over their own catalog (see [Self::build_self_tree]).
    /// Bounded matching runs the full query phase first and then
    /// serialises every match list.
    pub fn match_to_file(
        &mut self,
        max_match: i64,
        matching_self: bool,
        ra2: &[f64],
        dec2: &[f64],
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Error> {
        Self::check_lengths(ra2, dec2)?;
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);

        if max_match <= 0 {
            self.nmatches = 0;
            let tree = self.build_self_tree();
            let half_npix = self.half_npix();
            for si in 0..ra2.len() {
                let hpixid = self.hpix.eq2pix(ra2[si], dec2[si])?;
                let Some(indices) = tree.find(hpixid - half_npix) else {
                    continue;
                };
                let q = eq2xyz(ra2[si], dec2[si])?;
                for &ci in indices {
                    if matching_self && si == ci {
                        continue;
                    }
                    let point = self.catalog[ci].point;
                    let c = cos_sep(&point.vec, &q);
                    if c <= point.cos_radius {
                        continue;
                    }
                    self.nmatches += 1;
                    records::write_record(
                        &mut writer,
                        &Match {
                            primary_index: ci as i64,
                            secondary_index: si as i64,
                            cosdist: c,
                        },
                        path,
                    )?;
                }
            }
        } else {
            self.match_(max_match, matching_self, ra2, dec2)?;
            for entry in self.catalog.iter() {
                for m in entry.matches.iter() {
                    records::write_record(&mut writer, m, path)?;
                }
            }
        }
        use std::io::Write;
        writer.flush().map_err(|e| Error::io(path, e))?;
        debug!("match_to_file complete: nmatches={}", self.nmatches);
        Ok(())
    }

    //mi build_self_tree
    /// Build a pixel-id tree over the primary catalog's own points
    /// (indexed by their own HEALPix pixel, not their disc), for the
    /// unbounded streaming direction which looks up primaries from a
    /// secondary point's single cell
    fn build_self_tree(&self) -> PixelTree {
        let half_npix = self.half_npix();
        let mut tree = PixelTree::new();
        for (ci, entry) in self.catalog.iter().enumerate() {
            for &hpixid in &entry.disc_pixels {
                tree.insert(hpixid - half_npix, ci);
            }
        }
        tree
    }

    //mp copy_matches
    /// Append every primary entry's match records, in primary-index order,
    /// to `out`, then clear each primary's list (shrinking its capacity to
    /// 1 if it had grown past that)
    ///
    /// Within one primary entry the ordering of records is heap/insertion
    /// order; no sort is applied, for consistency with the streaming mode
    /// which cannot sort.
    pub fn copy_matches(&mut self, out: &mut Vec<Match>) {
        for entry in self.catalog.entries_mut() {
            out.extend(entry.matches.iter().copied());
            entry.matches.clear_and_shrink();
        }
    }
}

//fi accept_match
/// Apply the retention rule for one accepted candidate to `matches`,
/// returning 1 if it counted as a new match and 0 if it was a
/// heap-replacement (or rejected outright)
fn accept_match(matches: &mut crate::MatchVec, max_match: i64, m: Match) -> i64 {
    if max_match <= 0 {
        matches.push(m);
        1
    } else if (matches.len() as i64) < max_match {
        matches.push(m);
        if max_match > 1 && matches.len() as i64 == max_match {
            matches.build_max_heap_on_neg_cosdist();
        }
        1
    } else {
        matches.heap_try_replace(m);
        0
    }
}

//a Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_self_match() {
        let mut e = Engine::new(4096, &[10.0], &[0.0], &[1.0]).unwrap();
        e.match_(0, false, &[10.5], &[0.0]).unwrap();
        assert_eq!(e.nmatches(), 1);
        let m = e.catalog()[0].matches.iter().next().unwrap();
        assert!((m.cosdist - 0.5_f64.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn zero_radius_matches_nothing() {
        let mut e = Engine::new(4096, &[10.0], &[0.0], &[0.0]).unwrap();
        e.match_(0, false, &[10.0], &[0.0]).unwrap();
        assert_eq!(e.nmatches(), 0);
    }

    #[test]
    fn identical_point_cosdist_is_one() {
        let mut e = Engine::new(1024, &[30.0], &[-10.0], &[1.0]).unwrap();
        e.match_(0, false, &[30.0], &[-10.0]).unwrap();
        assert_eq!(e.nmatches(), 1);
        let m = e.catalog()[0].matches.iter().next().unwrap();
        assert!((m.cosdist - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bounded_keeps_closest_two() {
        let mut e = Engine::new(4096, &[10.0], &[0.0], &[1.0]).unwrap();
        e.match_(
            2,
            false,
            &[10.5, 10.2, 10.1],
            &[0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(e.nmatches(), 2);
        let kept: Vec<i64> = e.catalog()[0]
            .matches
            .iter()
            .map(|m| m.secondary_index)
            .collect();
        assert_eq!(kept.len(), 2);
        assert!(kept.contains(&1));
        assert!(kept.contains(&2));
        assert!(!kept.contains(&0));
    }

    #[test]
    fn bounded_single_keeps_closest_only() {
        let mut e = Engine::new(4096, &[0.0], &[0.0], &[2.0]).unwrap();
        e.match_(1, false, &[1.0, 0.6, 0.3], &[0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(e.nmatches(), 1);
        assert_eq!(e.catalog()[0].matches.len(), 1);
        let kept = e.catalog()[0].matches.iter().next().unwrap();
        assert_eq!(kept.secondary_index, 2);

        // A further, worse candidate must not displace it
        e.match_(1, false, &[1.0, 0.6, 0.3, 0.9], &[0.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(e.nmatches(), 1);
        let kept = e.catalog()[0].matches.iter().next().unwrap();
        assert_eq!(kept.secondary_index, 2);
    }

    #[test]
    fn matching_self_excludes_own_index() {
        let ra = [0.0, 0.05];
        let dec = [0.0, 0.0];
        let radius = [0.1, 0.1];
        let mut e = Engine::new(4096, &ra, &dec, &radius).unwrap();
        e.match_(0, true, &ra, &dec).unwrap();
        let m0: Vec<i64> = e.catalog()[0]
            .matches
            .iter()
            .map(|m| m.secondary_index)
            .collect();
        let m1: Vec<i64> = e.catalog()[1]
            .matches
            .iter()
            .map(|m| m.secondary_index)
            .collect();
        assert_eq!(m0, vec![1]);
        assert_eq!(m1, vec![0]);
    }

    #[test]
    fn idempotent_across_repeated_calls() {
        let mut e = Engine::new(4096, &[10.0], &[0.0], &[1.0]).unwrap();
        let ra2 = [10.5, 10.2, 10.1];
        let dec2 = [0.0, 0.0, 0.0];
        e.match_(2, false, &ra2, &dec2).unwrap();
        let first: Vec<i64> = e.catalog()[0]
            .matches
            .iter()
            .map(|m| m.secondary_index)
            .collect();
        let first_n = e.nmatches();
        e.match_(2, false, &ra2, &dec2).unwrap();
        let second: Vec<i64> = e.catalog()[0]
            .matches
            .iter()
            .map(|m| m.secondary_index)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first_n, e.nmatches());
    }

    #[test]
    fn copy_matches_drains_and_shrinks() {
        let mut e = Engine::new(4096, &[10.0], &[0.0], &[1.0]).unwrap();
        e.match_(0, false, &[10.5, 10.4], &[0.0, 0.0]).unwrap();
        let mut out = Vec::new();
        e.copy_matches(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(e.catalog()[0].matches.len(), 0);
    }

    #[test]
    fn antipodal_point_outside_radius_does_not_match() {
        let mut e = Engine::new(1024, &[0.0], &[0.0], &[10.0]).unwrap();
        e.match_(0, false, &[180.0], &[0.0]).unwrap();
        assert_eq!(e.nmatches(), 0);
    }
}
