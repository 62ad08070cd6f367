//! Joining several strips into a single draw call

use log::debug;

use crate::stripify::Strip;

/// Concatenates strips into a single one using degenerate triangles.
///
/// Two bridge indices are inserted between consecutive strips: the last index of the previous strip and the first
/// index of the next one. With `one_sided` set, every strip keeps starting on an even position so that its winding
/// is preserved; this costs either one more replicated index or, when the next strip already starts with a
/// replicated index, one index less.
///
/// The faces of the result are the faces of all strips, in order.
pub fn link_strips(strips: &[Strip], one_sided: bool) -> Strip {
    let mut result = Strip::default();

    let index_count: usize = strips.iter().map(|s| s.len() + 3).sum();
    result.indices.reserve(index_count);
    result.faces.reserve(strips.iter().map(Strip::triangle_count).sum());

    for strip in strips.iter().filter(|s| !s.is_empty()) {
        let mut run = strip.indices.as_slice();

        if let Some(&last) = result.indices.last() {
            let first = run[0];

            result.indices.push(last);
            result.indices.push(first);

            // an odd offset would flip the winding of the whole next strip
            if one_sided && result.indices.len() % 2 == 1 {
                if run.len() > 1 && run[1] == first {
                    // the strip already starts with a replicated index, drop it instead
                    run = &run[1..];
                } else {
                    result.indices.push(first);
                }
            }
        }

        result.indices.extend_from_slice(run);
        result.faces.extend_from_slice(&strip.faces);
    }

    debug!("linked {} strips into {} indices", strips.len(), result.indices.len());

    result
}

/// Concatenates strips into a single index stream separated by `restart_index`.
pub fn link_strips_with_restart(strips: &[Strip], restart_index: u32) -> Vec<u32> {
    let mut result = Vec::with_capacity(strips.iter().map(|s| s.len() + 1).sum());

    for strip in strips.iter().filter(|s| !s.is_empty()) {
        if !result.is_empty() {
            result.push(restart_index);
        }

        result.extend_from_slice(&strip.indices);
    }

    result
}
