//! Wavefront OBJ parsing for mesh resources
//!
//! Supports `v`, `vt`, `vn` and `f` records. Faces with more than three
//! corners are fan-triangulated and negative (relative) indices are resolved
//! against the records read so far. Everything else is ignored.

use thiserror::Error;

use super::mesh_data::{MeshData, Vertex};

/// OBJ parse errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ObjError {
    /// A record has a malformed number
    #[error("line {line}: {message}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },
    /// Structurally invalid file
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// OBJ file parser
pub struct ObjLoader;

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];

impl ObjLoader {
    /// Parse OBJ source text into a triangle list
    pub fn parse(source: &str) -> Result<MeshData, ObjError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut mesh = MeshData::default();

        for (number, line) in source.lines().enumerate() {
            let line_no = number + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let fields: Vec<&str> = parts.collect();

            match keyword {
                "v" => positions.push(parse_floats::<3>(&fields, line_no, "vertex")?),
                "vn" => normals.push(parse_floats::<3>(&fields, line_no, "normal")?),
                "vt" => tex_coords.push(parse_floats::<2>(&fields, line_no, "texture coordinate")?),
                "f" => {
                    if fields.len() < 3 {
                        return Err(parse_error(line_no, "face needs at least three corners"));
                    }

                    let first = mesh.vertices.len() as u32;
                    for corner in &fields {
                        let vertex = resolve_corner(corner, &positions, &tex_coords, &normals, line_no)?;
                        mesh.vertices.push(vertex);
                    }

                    // Fan triangulation around the first corner
                    for i in 1..(fields.len() as u32 - 1) {
                        mesh.indices.extend_from_slice(&[first, first + i, first + i + 1]);
                    }
                }
                _ => {
                    // Groups, materials and smoothing are not needed for upload
                }
            }
        }

        if mesh.vertices.is_empty() {
            return Err(ObjError::InvalidFormat("No faces found in OBJ source".to_string()));
        }
        Ok(mesh)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::ParseError {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(fields: &[&str], line: usize, what: &str) -> Result<[f32; N], ObjError> {
    if fields.len() < N {
        return Err(parse_error(line, format!("{} needs {} components", what, N)));
    }
    let mut values = [0.0; N];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field
            .parse()
            .map_err(|_| parse_error(line, format!("invalid {} component '{}'", what, field)))?;
    }
    Ok(values)
}

/// Turn a 1-based or negative OBJ index into a 0-based one
fn resolve_index(raw: &str, count: usize, line: usize) -> Result<usize, ObjError> {
    let index: i64 = raw
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{}'", raw)))?;
    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => count.checked_sub(i.unsigned_abs() as usize),
    };
    resolved
        .filter(|&i| i < count)
        .ok_or_else(|| parse_error(line, format!("index {} out of range ({} available)", index, count)))
}

fn resolve_corner(
    corner: &str,
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
    line: usize,
) -> Result<Vertex, ObjError> {
    let mut refs = corner.split('/');
    let position = match refs.next() {
        Some(raw) if !raw.is_empty() => positions[resolve_index(raw, positions.len(), line)?],
        _ => return Err(parse_error(line, format!("face corner '{}' has no position", corner))),
    };
    let tex_coord = match refs.next() {
        Some(raw) if !raw.is_empty() => tex_coords[resolve_index(raw, tex_coords.len(), line)?],
        _ => DEFAULT_TEX_COORD,
    };
    let normal = match refs.next() {
        Some(raw) if !raw.is_empty() => normals[resolve_index(raw, normals.len(), line)?],
        _ => DEFAULT_NORMAL,
    };

    Ok(Vertex {
        position,
        normal,
        tex_coord,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = ObjLoader::parse(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = ObjLoader::parse(source).unwrap();
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].normal, DEFAULT_NORMAL);
    }

    #[test]
    fn position_only_and_normal_only_corners() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1//1 2//1 3//1\n";
        let mesh = ObjLoader::parse(source).unwrap();
        assert_eq!(mesh.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].tex_coord, DEFAULT_TEX_COORD);
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let source = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = ObjLoader::parse(source).unwrap_err();
        assert!(matches!(err, ObjError::ParseError { line: 3, .. }));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = ObjLoader::parse("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::ParseError { line: 1, .. }));
    }

    #[test]
    fn source_without_faces_is_invalid() {
        let err = ObjLoader::parse("v 0 0 0\n").unwrap_err();
        assert!(matches!(err, ObjError::InvalidFormat(_)));
    }
}
