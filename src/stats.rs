//! Strip efficiency analysis

use crate::stripify::Strip;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StripStatistics {
    pub strip_count: u32,
    pub index_count: u32,
    /// Non-degenerate triangles rendered by the strips
    pub triangle_count: u32,
    /// Zero-area triangles introduced by replicated or bridging indices
    pub degenerate_count: u32,
    /// Indices / strip count
    pub average_length: f32,
    pub vertices_transformed: u32,
    /// Transformed vertices / triangle count
    ///
    /// Best case approaches 1.0 for long strips, worst case 3.0
    pub acmr: f32,
}

/// Returns strip statistics, with cache hits computed using a simplified FIFO model.
///
/// Every strip is drawn in order and the cache is kept between strips.
pub fn analyze_strips(strips: &[Strip], vertex_count: usize, cache_size: usize) -> StripStatistics {
    assert!(cache_size >= 3);

    let mut result = StripStatistics {
        strip_count: strips.len() as u32,
        ..Default::default()
    };

    let mut cache_timestamps = vec![0u32; vertex_count];
    let mut timestamp = cache_size as u32 + 1;

    for strip in strips {
        result.index_count += strip.len() as u32;

        for (i, index) in strip.indices.iter().enumerate() {
            let index = *index as usize;
            assert!(index < vertex_count);

            if timestamp - cache_timestamps[index] > cache_size as u32 {
                cache_timestamps[index] = timestamp;
                timestamp += 1;
                result.vertices_transformed += 1;
            }

            if i >= 2 {
                let (a, b, c) = (strip.indices[i - 2], strip.indices[i - 1], strip.indices[i]);

                if a != b && a != c && b != c {
                    result.triangle_count += 1;
                } else {
                    result.degenerate_count += 1;
                }
            }
        }
    }

    result.average_length = if strips.is_empty() {
        0.0
    } else {
        result.index_count as f32 / strips.len() as f32
    };
    result.acmr = if result.triangle_count == 0 {
        0.0
    } else {
        result.vertices_transformed as f32 / result.triangle_count as f32
    };

    result
}
