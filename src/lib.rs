/*!
# skymatch

A spherical point-catalog radius-matching engine.

Given a *primary* catalog of points, each carrying its own matching
radius, and a *secondary* catalog of points, [Engine::match_] finds, for
every primary point, every secondary point within that primary's radius
(measured as great-circle angular separation), optionally keeping only
the `max_match` closest.

The spatial index underneath is a HEALPix RING-scheme pixelization
([healpix]) combined with a binary search tree keyed by (shifted) pixel
id ([pixtree]); see [Engine] for the matching driver itself.
 */

pub type Vec3 = geo_nd::FArray<f64, 3>;

mod error;
pub use error::Error;

pub mod geometry;

pub mod healpix;

mod matchvec;
pub use matchvec::{Match, MatchVec};

mod pixtree;

mod catalog;
pub use catalog::{Catalog, CatalogEntry, Point};

mod engine;
pub use engine::Engine;

pub mod records;

pub mod cmdline;
