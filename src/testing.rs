//! Mesh generators and strip checks shared by the unit tests

use crate::stripify::Strip;

/// Regular grid of `width` x `height` quads, two counter-clockwise triangles each.
pub(crate) fn grid(width: u32, height: u32) -> Vec<u32> {
    let vertex = |x: u32, y: u32| y * (width + 1) + x;

    let mut indices = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let a = vertex(x, y);
            let b = vertex(x + 1, y);
            let c = vertex(x, y + 1);
            let d = vertex(x + 1, y + 1);

            indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }

    indices
}

/// Closed, consistently oriented tetrahedron.
pub(crate) fn tetrahedron() -> Vec<u32> {
    vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]
}

/// Shuffles triangle order and rotates each triangle, keeping its winding.
pub(crate) fn shuffle(indices: &[u32], rng: &mut oorandom::Rand32) -> Vec<u32> {
    let mut triangles: Vec<[u32; 3]> = indices.chunks_exact(3).map(|abc| [abc[0], abc[1], abc[2]]).collect();

    for i in (1..triangles.len()).rev() {
        let j = rng.rand_range(0..(i as u32 + 1)) as usize;
        triangles.swap(i, j);
    }

    for triangle in &mut triangles {
        triangle.rotate_left(rng.rand_range(0..3) as usize);
    }

    triangles.concat()
}

fn normalize(triangle: [u32; 3], oriented: bool) -> [u32; 3] {
    let mut triangle = triangle;

    if oriented {
        let min = (0..3).min_by_key(|i| triangle[*i]).unwrap_or(0);
        triangle.rotate_left(min);
    } else {
        triangle.sort_unstable();
    }

    triangle
}

/// Checks that the strips cover every input triangle exactly once, each strip decoding to the triangles it claims.
///
/// With `oriented` set, the decoded triangles must also keep the input winding.
pub(crate) fn assert_covers(strips: &[Strip], indices: &[u32], oriented: bool) {
    let input: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|abc| normalize([abc[0], abc[1], abc[2]], oriented))
        .collect();

    let mut faces: Vec<u32> = strips.iter().flat_map(|s| s.faces.iter().copied()).collect();
    faces.sort_unstable();
    assert_eq!(faces, (0..input.len() as u32).collect::<Vec<_>>());

    for strip in strips {
        let mut decoded: Vec<[u32; 3]> = strip.triangles().into_iter().map(|t| normalize(t, oriented)).collect();
        let mut expected: Vec<[u32; 3]> = strip.faces.iter().map(|f| input[*f as usize]).collect();

        decoded.sort_unstable();
        expected.sort_unstable();

        assert_eq!(decoded, expected, "strip {:?}", strip.indices);
    }
}
