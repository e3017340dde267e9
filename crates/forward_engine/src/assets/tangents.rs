//! Per-vertex tangent generation from texture coordinates

use crate::foundation::math::Vec3;

/// Compute a unit tangent per vertex, aligned with increasing U.
///
/// Triangle tangents are accumulated per vertex and then made orthogonal to
/// the vertex normal. Faces that are not triangles or reference missing
/// vertices are skipped. Vertices left without a usable tangent get an
/// arbitrary unit vector perpendicular to their normal.
pub fn generate_tangents(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 3]],
    faces: &[Vec<u32>],
) -> Vec<[f32; 3]> {
    let vertex_count = positions.len();
    let mut accumulated = vec![Vec3::zeros(); vertex_count];

    for face in faces {
        let [a, b, c] = match face.as_slice() {
            [a, b, c] => [*a as usize, *b as usize, *c as usize],
            _ => continue,
        };
        let limit = vertex_count.min(uvs.len());
        if a >= limit || b >= limit || c >= limit {
            continue;
        }

        let p0 = Vec3::from(positions[a]);
        let edge1 = Vec3::from(positions[b]) - p0;
        let edge2 = Vec3::from(positions[c]) - p0;

        let du1 = uvs[b][0] - uvs[a][0];
        let dv1 = uvs[b][1] - uvs[a][1];
        let du2 = uvs[c][0] - uvs[a][0];
        let dv2 = uvs[c][1] - uvs[a][1];

        let det = du1 * dv2 - du2 * dv1;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge1 * dv2 - edge2 * dv1) / det;

        accumulated[a] += tangent;
        accumulated[b] += tangent;
        accumulated[c] += tangent;
    }

    accumulated
        .iter()
        .enumerate()
        .map(|(i, tangent)| {
            let normal = normals.get(i).map_or_else(Vec3::z, |n| Vec3::from(*n));
            let orthogonal = tangent - normal * normal.dot(tangent);
            let unit = orthogonal
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| perpendicular(&normal));
            [unit.x, unit.y, unit.z]
        })
        .collect()
}

fn perpendicular(normal: &Vec3) -> Vec3 {
    let helper = if normal.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    helper
        .cross(normal)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::x)
}
