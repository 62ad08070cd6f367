//! Edge adjacency database for triangle meshes

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::radix::RadixSorter;

/// Vertex slots of the three triangle edges: edge 0 is `(v0, v1)`, edge 1 is `(v0, v2)`, edge 2 is `(v1, v2)`.
const EDGE_VERTICES: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Link from a triangle edge to the neighbouring triangle sharing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Index of the neighbouring triangle
    pub face: u32,
    /// Which of the neighbour's edges is the shared one
    pub edge: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triangle {
    /// Vertex references
    pub refs: [u32; 3],
    /// One link per edge, `None` for boundary edges
    pub links: [Option<Link>; 3],
}

impl Triangle {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self {
            refs: [a, b, c],
            links: [None; 3],
        }
    }

    /// Returns the vertex references of the given edge.
    pub fn edge(&self, edge: usize) -> (u32, u32) {
        let (a, b) = EDGE_VERTICES[edge];
        (self.refs[a], self.refs[b])
    }

    /// Finds the edge made of the two vertex references, in either order.
    pub fn find_edge(&self, a: u32, b: u32) -> Option<u8> {
        EDGE_VERTICES
            .iter()
            .position(|(i, j)| {
                let (ri, rj) = (self.refs[*i], self.refs[*j]);
                (ri == a && rj == b) || (ri == b && rj == a)
            })
            .map(|e| e as u8)
    }

    /// Returns the vertex that is not part of the edge `(a, b)`.
    pub fn opposite_vertex(&self, a: u32, b: u32) -> Option<u32> {
        self.find_edge(a, b).map(|e| self.refs[2 - e as usize])
    }

    /// Returns the number of edges shared with another triangle.
    pub fn connectivity(&self) -> u32 {
        self.links.iter().filter(|l| l.is_some()).count() as u32
    }
}

/// Triangles of a mesh with their edge links.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
    triangles: Vec<Triangle>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn get(&self, face: u32) -> &Triangle {
        &self.triangles[face as usize]
    }

    /// Returns the neighbour across `edge` of `face`, if any.
    pub fn neighbour(&self, face: u32, edge: u8) -> Option<Link> {
        self.get(face).links[edge as usize]
    }

    /// Iterates over `(face, edge)` pairs that have no neighbour.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.triangles.iter().enumerate().flat_map(|(face, triangle)| {
            (0..3u8)
                .filter(move |edge| triangle.links[*edge as usize].is_none())
                .map(move |edge| (face as u32, edge))
        })
    }
}

// links two edge records; record `r` is edge `r % 3` of triangle `r / 3`
fn update_link(triangles: &mut [Triangle], first: u32, second: u32) {
    let (first_face, first_edge) = (first / 3, (first % 3) as u8);
    let (second_face, second_edge) = (second / 3, (second % 3) as u8);

    triangles[first_face as usize].links[first_edge as usize] = Some(Link {
        face: second_face,
        edge: second_edge,
    });
    triangles[second_face as usize].links[second_edge as usize] = Some(Link {
        face: first_face,
        edge: first_edge,
    });
}

/// Builds the edge adjacency of a triangle list.
///
/// Fails with [Error::NonManifoldEdge] if an edge is shared by more than two triangles.
///
/// # Arguments
///
/// * `indices`: triangle list, three vertex references per triangle
///
/// # Example
///
/// ```
/// use tristrip_rs::adjacency::build_adjacency;
///
/// let adjacency = build_adjacency(&[0u16, 1, 2, 2, 1, 3]).unwrap();
///
/// assert_eq!(adjacency.get(0).connectivity(), 1);
/// assert_eq!(adjacency.boundary_edges().count(), 4);
/// ```
pub fn build_adjacency<T>(indices: &[T]) -> Result<Adjacency>
where
    T: Copy + Into<u32>,
{
    assert!(indices.len() % 3 == 0);

    let face_count = indices.len() / 3;
    let edge_count = indices.len();

    if edge_count > u32::MAX as usize {
        return Err(Error::TooManyTriangles(face_count));
    }

    let mut triangles = Vec::new();
    triangles.try_reserve_exact(face_count)?;

    // edge records, one per triangle edge, with canonical (low, high) references
    let mut owners = Vec::new();
    let mut lows = Vec::new();
    let mut highs = Vec::new();
    owners.try_reserve_exact(edge_count)?;
    lows.try_reserve_exact(edge_count)?;
    highs.try_reserve_exact(edge_count)?;

    for (face, abc) in indices.chunks_exact(3).enumerate() {
        let triangle = Triangle::new(abc[0].into(), abc[1].into(), abc[2].into());

        for edge in 0..3 {
            let (a, b) = triangle.edge(edge);

            owners.push(face as u32);
            lows.push(a.min(b));
            highs.push(a.max(b));
        }

        triangles.push(triangle);
    }

    // stable chained sort: identical (low, high) pairs end up contiguous, owners ascending inside each run
    let mut sorter = RadixSorter::new();
    sorter.try_reserve(edge_count)?;

    let sorted = sorter.sort(&owners, false).sort(&lows, false).sort(&highs, false).ranks();

    let mut shared = 0;

    let same_edge = |a: &u32, b: &u32| {
        let (a, b) = (*a as usize, *b as usize);
        lows[a] == lows[b] && highs[a] == highs[b]
    };

    for run in sorted.chunk_by(same_edge) {
        match *run {
            // boundary edge
            [_] => {}
            [a, b] => {
                update_link(&mut triangles, a, b);
                shared += 1;
            }
            [a, b, c, ..] => {
                let edge = (lows[a as usize], highs[a as usize]);
                let faces = [owners[a as usize], owners[b as usize], owners[c as usize]];
                warn!("edge {:?} is shared by {} triangles, starting with {:?}", edge, run.len(), faces);

                return Err(Error::NonManifoldEdge { edge, faces });
            }
            [] => unreachable!(),
        }
    }

    debug!(
        "built adjacency for {} triangles: {} shared edges, {} boundary edges",
        face_count,
        shared,
        edge_count - 2 * shared
    );

    Ok(Adjacency { triangles })
}
