//! The per-primary match list: a growable buffer of [Match] records with
//! capacity tracked separately from size, doubling as a bounded min-heap
//! on `cosdist` once a top-K list reaches capacity.

use serde::{Deserialize, Serialize};

//a Match
//tp Match
/// A single accepted match between a primary and a secondary point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Index into the primary catalog
    pub primary_index: i64,
    /// Index into the secondary (input) catalog
    pub secondary_index: i64,
    /// Cosine of the angular separation; larger means closer
    pub cosdist: f64,
}

//a MatchVec
//tp MatchVec
/// An ordered sequence of [Match] records, used as a plain append-only
/// list when unbounded, or as a min-heap on `cosdist` (worst retained
/// match at the root) once a top-K list is full
#[derive(Debug, Clone, Default)]
pub struct MatchVec {
    data: Vec<Match>,
}

//ip MatchVec
impl MatchVec {
    //cp new
    /// A new, empty list with capacity for exactly one element (the
    /// common case: `max_match` unset or `1`)
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(1),
        }
    }

    //ap len
    pub fn len(&self) -> usize {
        self.data.len()
    }

    //ap is_empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    //ap iter
    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.data.iter()
    }

    //ap as_slice
    pub fn as_slice(&self) -> &[Match] {
        &self.data
    }

    //mp push
    /// Amortised O(1) append
    pub fn push(&mut self, m: Match) {
        self.data.push(m);
    }

    //mp clear
    /// Size -> 0, capacity preserved
    pub fn clear(&mut self) {
        self.data.clear();
    }

    //mp reserve_exact
    /// Ensure capacity >= `k` without altering size
    pub fn reserve_exact(&mut self, k: usize) {
        if self.data.capacity() < k {
            let extra = k - self.data.len();
            self.data.reserve_exact(extra);
        }
    }

    //mp clear_and_shrink
    /// Reset to size 0, and if the buffer had grown past a single-element
    /// footprint, release it and start again at capacity 1. Used when
    /// switching back to unbounded matching after a bounded run, so a
    /// large top-K buffer from a previous call isn't carried forward
    /// unnecessarily.
    pub fn clear_and_shrink(&mut self) {
        if self.data.capacity() > 1 {
            self.data = Vec::with_capacity(1);
        } else {
            self.data.clear();
        }
    }

    //mp build_max_heap_on_neg_cosdist
    /// Reorganise a list that has just reached capacity `K` into a
    /// min-heap on `cosdist` (equivalently a max-heap on `-cosdist`), so
    /// its root is the worst retained match
    pub fn build_max_heap_on_neg_cosdist(&mut self) {
        let n = self.data.len();
        if n <= 1 {
            return;
        }
        for start in (0..n / 2).rev() {
            self.sift_down(start);
        }
    }

    //mp heap_try_replace
    /// If `m` is closer than the current worst retained match, replace
    /// the root with it and restore the heap property. No-op otherwise.
    pub fn heap_try_replace(&mut self, m: Match) {
        if self.data.is_empty() {
            return;
        }
        if m.cosdist > self.data[0].cosdist {
            self.data[0] = m;
            if self.data.len() > 1 {
                self.sift_down(0);
            }
        }
    }

    //fi sift_down
    fn sift_down(&mut self, mut i: usize) {
        let n = self.data.len();
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < n && self.data[l].cosdist < self.data[smallest].cosdist {
                smallest = l;
            }
            if r < n && self.data[r].cosdist < self.data[smallest].cosdist {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.data.swap(i, smallest);
            i = smallest;
        }
    }
}

//a Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn m(cosdist: f64) -> Match {
        Match {
            primary_index: 0,
            secondary_index: 0,
            cosdist,
        }
    }

    #[test]
    fn clear_preserves_capacity() {
        let mut v = MatchVec::new();
        v.reserve_exact(8);
        let cap = v.as_slice().len();
        let _ = cap;
        v.push(m(0.5));
        v.push(m(0.6));
        v.clear();
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn clear_and_shrink_drops_large_capacity() {
        let mut v = MatchVec::new();
        v.reserve_exact(16);
        for i in 0..16 {
            v.push(m(i as f64));
        }
        v.clear_and_shrink();
        assert_eq!(v.len(), 0);
        assert!(v.data.capacity() <= 1);
    }

    #[test]
    fn heap_root_is_worst_match() {
        let mut v = MatchVec::new();
        for c in [0.9, 0.99, 0.95, 0.999, 0.92] {
            v.push(m(c));
        }
        v.build_max_heap_on_neg_cosdist();
        assert_eq!(v.as_slice()[0].cosdist, 0.9);
    }

    #[test]
    fn heap_replace_keeps_top_k() {
        let mut v = MatchVec::new();
        for c in [0.9, 0.95, 0.99] {
            v.push(m(c));
        }
        v.build_max_heap_on_neg_cosdist();
        // worse than the current worst: no-op
        v.heap_try_replace(m(0.8));
        assert_eq!(v.as_slice()[0].cosdist, 0.9);
        // better than the current worst: replaces it
        v.heap_try_replace(m(0.97));
        assert!(v.as_slice().iter().all(|x| x.cosdist >= 0.95));
        let worst = v.as_slice().iter().map(|x| x.cosdist).fold(f64::MAX, f64::min);
        assert_eq!(worst, 0.95);
    }

    #[test]
    fn heap_invariant_survives_random_sequence() {
        // deterministic LCG so the test has no external rand dependency
        let mut state: u64 = 0x9e3779b97f4a7c15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 1000) as f64 / 1000.0
        };

        const K: usize = 5;
        let mut v = MatchVec::new();
        v.reserve_exact(K);
        for _ in 0..K {
            v.push(m(next()));
        }
        v.build_max_heap_on_neg_cosdist();

        for _ in 0..200 {
            let candidate = m(next());
            v.heap_try_replace(candidate);
            assert_eq!(v.len(), K);
            // min-heap invariant: every parent <= its children
            for i in 0..K {
                let l = 2 * i + 1;
                let r = 2 * i + 2;
                if l < K {
                    assert!(v.as_slice()[i].cosdist <= v.as_slice()[l].cosdist);
                }
                if r < K {
                    assert!(v.as_slice()[i].cosdist <= v.as_slice()[r].cosdist);
                }
            }
        }
    }
}
