//! Mesh triangle list ↔ triangle strip conversion

use log::{debug, trace};

use crate::adjacency::{Adjacency, build_adjacency};
use crate::error::Result;
use crate::link::link_strips;
use crate::radix::sort_indices;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StripifyOptions {
    /// Keep the winding of every triangle, at the cost of an occasional replicated index
    pub one_sided: bool,
    /// Start new strips from the triangles with the fewest neighbours first, instead of in input order
    pub least_connected_first: bool,
    /// Link all strips into a single one with degenerate triangles
    pub connect_all: bool,
}

impl Default for StripifyOptions {
    fn default() -> Self {
        Self {
            one_sided: true,
            least_connected_first: true,
            connect_all: false,
        }
    }
}

/// A triangle strip along with the triangles it covers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Strip {
    /// Vertex references; every index after the first two forms a triangle with the previous two
    pub indices: Vec<u32>,
    /// Source triangles covered by the strip, in strip order
    pub faces: Vec<u32>,
}

impl Strip {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Decodes the strip into triangles with their rendered winding, skipping degenerate ones.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut list = vec![0; unstripify_bound(self.indices.len())];
        let size = unstripify(&mut list, &self.indices, None);

        list[0..size].chunks_exact(3).map(|abc| [abc[0], abc[1], abc[2]]).collect()
    }
}

struct StripGrower<'a> {
    adjacency: &'a Adjacency,
    /// Triangles committed to a strip
    used: Vec<bool>,
    /// Triangles visited by the candidate currently being grown, marked with its stamp
    visited: Vec<u32>,
    stamp: u32,
}

struct Candidate {
    indices: Vec<u32>,
    faces: Vec<u32>,
    /// Length of the forward part, which decides whether the winding got flipped
    first_length: usize,
}

impl<'a> StripGrower<'a> {
    fn new(adjacency: &'a Adjacency) -> Self {
        Self {
            adjacency,
            used: vec![false; adjacency.len()],
            visited: vec![0; adjacency.len()],
            stamp: 0,
        }
    }

    fn is_taken(&self, face: u32) -> bool {
        self.used[face as usize] || self.visited[face as usize] == self.stamp
    }

    // extends the strip from `face`, entering it through the edge (oldest, middle)
    fn track(
        &mut self,
        mut face: u32,
        mut oldest: u32,
        mut middle: u32,
        indices: &mut Vec<u32>,
        faces: &mut Vec<u32>,
    ) {
        indices.push(oldest);
        indices.push(middle);

        loop {
            let triangle = self.adjacency.get(face);

            // entry edges always belong to the triangle: the seed provides its own, links provide shared ones
            let Some(newest) = triangle.opposite_vertex(oldest, middle) else {
                break;
            };

            indices.push(newest);
            faces.push(face);
            self.visited[face as usize] = self.stamp;

            let next = triangle
                .find_edge(middle, newest)
                .and_then(|edge| triangle.links[edge as usize]);

            oldest = middle;
            middle = newest;

            match next {
                Some(link) if !self.is_taken(link.face) => face = link.face,
                _ => break,
            }
        }
    }

    fn grow(&mut self, seed: u32, oldest: u32, middle: u32) -> Candidate {
        // every candidate gets a fresh view of the visited triangles
        self.stamp += 1;

        let mut indices = Vec::new();
        let mut faces = Vec::new();

        self.track(seed, oldest, middle, &mut indices, &mut faces);

        let first_length = indices.len();

        // flip the forward part, then continue past the seed in the other direction
        indices.reverse();
        faces.reverse();

        let length = indices.len();
        let (oldest, middle) = (indices[length - 3], indices[length - 2]);

        indices.truncate(length - 3);
        faces.pop();

        self.track(seed, oldest, middle, &mut indices, &mut faces);

        Candidate {
            indices,
            faces,
            first_length,
        }
    }

    fn best_strip(&mut self, seed: u32, one_sided: bool) -> Strip {
        let refs = self.adjacency.get(seed).refs;

        // each starting edge keeps the seed's winding
        let starts = [(refs[0], refs[1]), (refs[2], refs[0]), (refs[1], refs[2])];

        let (oldest, middle) = starts[0];
        let mut best = self.grow(seed, oldest, middle);

        // ties keep the earlier starting edge
        for (oldest, middle) in &starts[1..] {
            let candidate = self.grow(seed, *oldest, *middle);

            if candidate.indices.len() > best.indices.len() {
                best = candidate;
            }
        }

        let Candidate {
            mut indices,
            faces,
            first_length,
        } = best;

        for face in &faces {
            self.used[*face as usize] = true;
        }

        // an odd forward part means the strip was written with flipped winding
        if one_sided && first_length % 2 == 1 {
            fix_winding(&mut indices, first_length);
        }

        Strip { indices, faces }
    }
}

fn fix_winding(indices: &mut Vec<u32>, first_length: usize) {
    let length = indices.len();

    if length == 3 || length == 4 {
        // an isolated triangle or quad flips by swapping its middle indices
        indices.swap(1, 2);
    } else {
        indices.reverse();

        // reversing fixes odd lengths only, even ones also need the first index replicated
        if (length - first_length) % 2 == 1 {
            indices.insert(0, indices[0]);
        }
    }
}

/// Partitions all triangles of the adjacency database into strips.
///
/// Every triangle ends up in exactly one strip. For each seed triangle three strips are grown, one per starting
/// edge, and the longest one is kept.
pub fn compute_strips(adjacency: &Adjacency, options: &StripifyOptions) -> Vec<Strip> {
    let face_count = adjacency.len();

    let order: Vec<u32> = if options.least_connected_first {
        let connectivity: Vec<u32> = adjacency.triangles().iter().map(|t| t.connectivity()).collect();
        sort_indices(&connectivity, false)
    } else {
        (0..face_count as u32).collect()
    };

    let mut grower = StripGrower::new(adjacency);
    let mut strips = Vec::new();

    let mut covered = 0;
    let mut cursor = 0;

    while covered < face_count {
        while grower.used[order[cursor] as usize] {
            cursor += 1;
        }

        let seed = order[cursor];
        let strip = grower.best_strip(seed, options.one_sided);

        trace!(
            "strip {} from seed {}: {} indices, {} triangles",
            strips.len(),
            seed,
            strip.len(),
            strip.triangle_count()
        );

        covered += strip.triangle_count();
        strips.push(strip);
    }

    debug!(
        "stripified {} triangles into {} strips ({} indices)",
        face_count,
        strips.len(),
        strips.iter().map(Strip::len).sum::<usize>()
    );

    strips
}

/// Converts a triangle list to triangle strips.
///
/// Returns a single strip when [StripifyOptions::connect_all] is set.
///
/// # Arguments
///
/// * `indices`: triangle list of a 2-manifold mesh
///
/// # Example
///
/// ```
/// use tristrip_rs::stripify::{StripifyOptions, stripify};
///
/// let options = StripifyOptions { one_sided: false, ..Default::default() };
/// let strips = stripify(&[0u32, 1, 2, 1, 2, 3, 2, 3, 4], &options).unwrap();
///
/// assert_eq!(strips.len(), 1);
/// assert_eq!(strips[0].len(), 5);
/// ```
pub fn stripify<T>(indices: &[T], options: &StripifyOptions) -> Result<Vec<Strip>>
where
    T: Copy + Into<u32>,
{
    let adjacency = build_adjacency(indices)?;
    let strips = compute_strips(&adjacency, options);

    if options.connect_all && !strips.is_empty() {
        Ok(vec![link_strips(&strips, options.one_sided)])
    } else {
        Ok(strips)
    }
}

/// Converts a triangle strip to a triangle list.
///
/// Returns the number of indices in the resulting list, with destination containing new index data.
/// Degenerate triangles are skipped.
///
/// # Arguments
///
/// * `destination`: must contain enough space for the target index buffer, worst case can be computed with [unstripify_bound]
/// * `restart_index`: index value that starts a new strip, if the strip stream uses primitive restart
pub fn unstripify(destination: &mut [u32], indices: &[u32], restart_index: Option<u32>) -> usize {
    let mut offset = 0;
    let mut start = 0;

    for (i, index) in indices.iter().enumerate() {
        if restart_index == Some(*index) {
            start = i + 1;
        } else if i - start >= 2 {
            let mut a = indices[i - 2];
            let mut b = indices[i - 1];
            let c = indices[i];

            // flip winding for odd triangles
            if ((i - start) & 1) != 0 {
                std::mem::swap(&mut a, &mut b);
            }

            if a != b && a != c && b != c {
                destination[offset..offset + 3].copy_from_slice(&[a, b, c]);
                offset += 3;
            }
        }
    }

    offset
}

/// Returns worst case size requirement for [unstripify].
pub fn unstripify_bound(index_count: usize) -> usize {
    if index_count < 3 { 0 } else { (index_count - 2) * 3 }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::testing::{assert_covers, grid, shuffle, tetrahedron};

    const UNORIENTED: StripifyOptions = StripifyOptions {
        one_sided: false,
        least_connected_first: false,
        connect_all: false,
    };

    #[test]
    fn test_empty() {
        assert!(stripify::<u32>(&[], &StripifyOptions::default()).unwrap().is_empty());

        let mut options = StripifyOptions::default();
        options.connect_all = true;
        assert!(stripify::<u32>(&[], &options).unwrap().is_empty());
    }

    #[test]
    fn test_chain() {
        let indices = [0u32, 1, 2, 1, 2, 3, 2, 3, 4];

        let strips = stripify(&indices, &UNORIENTED).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].indices, [4, 3, 2, 1, 0]);
        assert_eq!(strips[0].faces, [2, 1, 0]);

        assert_covers(&strips, &indices, false);
    }

    #[test]
    fn test_chain_least_connected() {
        let indices = [0u32, 1, 2, 1, 2, 3, 2, 3, 4, 3, 4, 5];

        let mut options = UNORIENTED;
        options.least_connected_first = true;

        let strips = stripify(&indices, &options).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].len(), 6);

        assert_covers(&strips, &indices, false);
    }

    #[test]
    fn test_single_triangle_winding() {
        let strips = stripify(&[0u32, 1, 2], &StripifyOptions::default()).unwrap();

        // same winding as 0 1 2
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].indices, [2, 0, 1]);
        assert_eq!(strips[0].triangles(), [[2, 0, 1]]);
    }

    #[test]
    fn test_quad_winding() {
        // two counter-clockwise triangles sharing the diagonal 0-2
        let indices = [0u32, 1, 2, 0, 2, 3];

        let strips = stripify(&indices, &StripifyOptions::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].len(), 4);

        assert_covers(&strips, &indices, true);
    }

    #[test]
    fn test_candidates_are_independent() {
        // the seed's first candidate visits 2 1 3 on its way to a dead end, the third one needs it to reach the chain
        let indices = [0u32, 1, 2, 2, 1, 3, 3, 1, 4, 3, 4, 5, 5, 4, 6];
        let adjacency = build_adjacency(&indices).unwrap();

        let mut grower = StripGrower::new(&adjacency);
        let strip = grower.best_strip(0, false);

        assert_eq!(strip.indices, [0, 2, 1, 3, 4, 5, 6]);
        assert_eq!(strip.faces, [0, 1, 2, 3, 4]);

        let strips = compute_strips(&adjacency, &UNORIENTED);
        assert_eq!(strips.len(), 1);

        let mut options = UNORIENTED;
        options.one_sided = true;

        let strips = compute_strips(&adjacency, &options);
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].indices, [6, 5, 4, 3, 1, 2, 0]);
        assert_covers(&strips, &indices, true);
    }

    #[test]
    fn test_tetrahedron() {
        let indices = tetrahedron();

        for options in [UNORIENTED, StripifyOptions::default()] {
            let strips = stripify(&indices, &options).unwrap();

            assert_covers(&strips, &indices, options.one_sided);
        }
    }

    #[test]
    fn test_grid() {
        let indices = grid(8, 5);

        let options = StripifyOptions::default();
        let strips = stripify(&indices, &options).unwrap();

        assert_covers(&strips, &indices, true);

        // a regular grid strips much better than one strip per triangle
        assert!(strips.len() * 3 < indices.len() / 3);
    }

    #[test]
    fn test_shuffled_grids() {
        let mut rng = oorandom::Rand32::new(42);

        for (width, height) in [(1, 1), (3, 2), (7, 7), (16, 3)] {
            let indices = shuffle(&grid(width, height), &mut rng);

            for one_sided in [false, true] {
                for least_connected_first in [false, true] {
                    let options = StripifyOptions {
                        one_sided,
                        least_connected_first,
                        connect_all: false,
                    };

                    let strips = stripify(&indices, &options).unwrap();

                    assert_covers(&strips, &indices, one_sided);
                }
            }
        }
    }

    #[test]
    fn test_connect_all() {
        let indices = grid(6, 6);

        for one_sided in [false, true] {
            let options = StripifyOptions {
                one_sided,
                least_connected_first: true,
                connect_all: true,
            };

            let strips = stripify(&indices, &options).unwrap();

            assert_eq!(strips.len(), 1);
            assert_covers(&strips, &indices, one_sided);
        }
    }

    #[test]
    fn test_u16_indices() {
        let indices = [0u16, 1, 2, 2, 1, 3];

        let strips = stripify(&indices, &StripifyOptions::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].triangle_count(), 2);
    }

    #[test]
    fn test_non_manifold() {
        let indices = [2u32, 5, 0, 5, 2, 1, 2, 5, 3];

        assert!(matches!(
            stripify(&indices, &StripifyOptions::default()),
            Err(Error::NonManifoldEdge { edge: (2, 5), .. })
        ));
    }

    #[test]
    fn test_degenerate_triangle() {
        let indices = [1u32, 1, 2, 3, 4, 5];

        let strips = stripify(&indices, &UNORIENTED).unwrap();

        let covered: usize = strips.iter().map(Strip::triangle_count).sum();
        assert_eq!(covered, 2);
    }

    #[test]
    fn test_fix_winding() {
        // forward parts of odd length flip the strip
        let mut triangle = vec![2, 1, 0];
        fix_winding(&mut triangle, 3);
        assert_eq!(triangle, [2, 0, 1]);

        let mut odd = vec![0, 1, 2, 3, 4];
        fix_winding(&mut odd, 3);
        assert_eq!(odd, [4, 3, 2, 1, 0]);

        let mut even = vec![0, 1, 2, 3, 4, 5];
        fix_winding(&mut even, 3);
        assert_eq!(even, [5, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_unstripify() {
        let strip = [0, 1, 2, 3, 4, 4, 5, 6];

        let mut list = vec![0; unstripify_bound(strip.len())];
        let size = unstripify(&mut list, &strip, None);

        // 3 4 4 and 4 4 5 are degenerate
        assert_eq!(&list[0..size], &[0, 1, 2, 2, 1, 3, 2, 3, 4, 5, 4, 6]);
    }

    #[test]
    fn test_unstripify_restart() {
        let strip = [0, 1, 2, 3, u32::MAX, 5, 6, 7];

        let mut list = vec![0; unstripify_bound(strip.len())];
        let size = unstripify(&mut list, &strip, Some(u32::MAX));

        assert_eq!(&list[0..size], &[0, 1, 2, 2, 1, 3, 5, 6, 7]);
    }

    #[test]
    fn test_unstripify_bound() {
        assert_eq!(unstripify_bound(0), 0);
        assert_eq!(unstripify_bound(2), 0);
        assert_eq!(unstripify_bound(5), 9);
    }
}
