//! Wavefront OBJ importer
//!
//! Each `o`/`g` group becomes a child node of a single root with one mesh.
//! Position/texcoord/normal triples are de-duplicated into shared vertices.
//! Negative (relative) indices are supported. Materials are ignored.

use std::collections::HashMap;
use std::path::Path;

use crate::assets::{AssetError, ImportOptions, ImportedMesh, ImportedNode, ImportedScene, SceneImporter, UvChannel};

/// OBJ file importer
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError> {
        if !path.exists() {
            return Err(AssetError::FileNotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path).map_err(|error| AssetError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&source, path, options)
    }
}

impl ObjImporter {
    /// Parse OBJ text; `path` names the scene and labels errors
    pub fn parse(source: &str, path: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError> {
        let fail = |line: usize, reason: String| AssetError::Import {
            path: path.to_path_buf(),
            reason: format!("line {}: {}", line + 1, reason),
        };

        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<([f32; 3], u32)> = Vec::new();

        let mut finished: Vec<ImportedMesh> = Vec::new();
        let mut group = GroupBuilder::new("default");

        for (line_number, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let args: Vec<&str> = parts.collect();

            match keyword {
                "v" => {
                    let [x, y, z] = parse_floats::<3>(&args).map_err(|e| fail(line_number, e))?;
                    positions.push([x, y, z]);
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3>(&args).map_err(|e| fail(line_number, e))?;
                    normals.push([x, y, z]);
                }
                "vt" => {
                    if args.is_empty() {
                        return Err(fail(line_number, "texture coordinate has no components".to_string()));
                    }
                    let components = args.len().min(3);
                    let mut coord = [0.0; 3];
                    for (slot, text) in coord.iter_mut().zip(&args[..components]) {
                        *slot = parse_float(text).map_err(|e| fail(line_number, e))?;
                    }
                    tex_coords.push((coord, components as u32));
                }
                "f" => {
                    if args.len() < 3 {
                        return Err(fail(line_number, format!("face has {} vertices", args.len())));
                    }
                    let mut face = Vec::with_capacity(args.len());
                    for token in &args {
                        let key = parse_face_vertex(token, positions.len(), tex_coords.len(), normals.len())
                            .map_err(|e| fail(line_number, e))?;
                        face.push(group.vertex(key, &positions, &tex_coords, &normals));
                    }
                    group.mesh.faces.push(face);
                }
                "o" | "g" => {
                    let name = args.first().copied().unwrap_or("unnamed");
                    let next = GroupBuilder::new(name);
                    let previous = std::mem::replace(&mut group, next);
                    if let Some(mesh) = previous.finish() {
                        finished.push(mesh);
                    }
                }
                _ => {
                    // mtllib, usemtl, s and friends
                }
            }
        }
        if let Some(mesh) = group.finish() {
            finished.push(mesh);
        }

        let root_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("obj");
        let mut root = ImportedNode::new(root_name);
        for (index, mesh) in finished.iter().enumerate() {
            root.children.push(ImportedNode::new(mesh.name.clone()).with_meshes(&[index]));
        }

        log::debug!(
            "Parsed OBJ {}: {} positions, {} groups",
            path.display(),
            positions.len(),
            finished.len()
        );

        let mut scene = ImportedScene { root, meshes: finished };
        scene.apply_options(options);
        Ok(scene)
    }
}

type VertexKey = (usize, Option<usize>, Option<usize>);

struct GroupBuilder {
    mesh: ImportedMesh,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 3]>,
    uv_components: u32,
    missing_normal: bool,
    any_uv: bool,
    vertex_map: HashMap<VertexKey, u32>,
}

impl GroupBuilder {
    fn new(name: &str) -> Self {
        Self {
            mesh: ImportedMesh { name: name.to_string(), ..ImportedMesh::default() },
            normals: Vec::new(),
            uvs: Vec::new(),
            uv_components: 0,
            missing_normal: false,
            any_uv: false,
            vertex_map: HashMap::new(),
        }
    }

    fn vertex(
        &mut self,
        key: VertexKey,
        positions: &[[f32; 3]],
        tex_coords: &[([f32; 3], u32)],
        normals: &[[f32; 3]],
    ) -> u32 {
        if let Some(&index) = self.vertex_map.get(&key) {
            return index;
        }

        let (position, uv, normal) = key;
        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(positions[position]);

        match normal {
            Some(n) => self.normals.push(normals[n]),
            None => {
                self.missing_normal = true;
                self.normals.push([0.0; 3]);
            }
        }

        match uv {
            Some(t) => {
                let (coord, components) = tex_coords[t];
                self.any_uv = true;
                self.uv_components = self.uv_components.max(components);
                self.uvs.push(coord);
            }
            None => self.uvs.push([0.0; 3]),
        }

        self.vertex_map.insert(key, index);
        index
    }

    fn finish(self) -> Option<ImportedMesh> {
        if self.mesh.faces.is_empty() {
            return None;
        }
        let mut mesh = self.mesh;
        mesh.normals = (!self.missing_normal).then_some(self.normals);
        mesh.uv_channel = self.any_uv.then(|| UvChannel {
            components: self.uv_components,
            coords: self.uvs,
        });
        Some(mesh)
    }
}

fn parse_float(text: &str) -> Result<f32, String> {
    text.parse().map_err(|_| format!("invalid number '{text}'"))
}

fn parse_floats<const N: usize>(args: &[&str]) -> Result<[f32; N], String> {
    if args.len() < N {
        return Err(format!("expected {} values, found {}", N, args.len()));
    }
    let mut values = [0.0; N];
    for (value, text) in values.iter_mut().zip(args) {
        *value = parse_float(text)?;
    }
    Ok(values)
}

/// Resolve a 1-based or negative relative OBJ index against `len` entries
fn resolve_index(text: &str, len: usize, what: &str) -> Result<usize, String> {
    let raw: i64 = text.parse().map_err(|_| format!("invalid {what} index '{text}'"))?;
    let resolved = match raw {
        0 => return Err(format!("{what} index 0 is not valid")),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if resolved < 0 || resolved as usize >= len {
        return Err(format!("{what} index {raw} is out of range for {len} entries"));
    }
    Ok(resolved as usize)
}

fn parse_face_vertex(token: &str, positions: usize, tex_coords: usize, normals: usize) -> Result<VertexKey, String> {
    let mut fields = token.split('/');
    let position = resolve_index(fields.next().unwrap_or(""), positions, "position")?;
    let uv = match fields.next() {
        Some(text) if !text.is_empty() => Some(resolve_index(text, tex_coords, "texture coordinate")?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(text) if !text.is_empty() => Some(resolve_index(text, normals, "normal")?),
        _ => None,
    };
    Ok((position, uv, normal))
}
