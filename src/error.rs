use std::collections::TryReserveError;

/// Errors reported while building adjacency or encoding strips.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An edge is shared by three or more triangles.
    ///
    /// `faces` holds the first three owners found for the edge.
    #[error("the edge {edge:?} is shared by more than two triangles (at least {faces:?}), the mesh is not manifold")]
    NonManifoldEdge { edge: (u32, u32), faces: [u32; 3] },
    /// The triangle count does not fit into a 32-bit face handle.
    #[error("{0} triangles exceed the 32-bit face handle range")]
    TooManyTriangles(usize),
    /// A strip index does not fit into the requested output index width.
    #[error("the index {index} does not fit into a {width}-bit index buffer")]
    IndexOutOfRange { index: u32, width: usize },
    /// Scratch memory for the adjacency build could not be reserved.
    #[error("failed to reserve scratch memory: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
