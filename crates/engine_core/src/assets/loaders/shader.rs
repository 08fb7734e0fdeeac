//! Shader loader: stage sources, program link and uniform discovery
//!
//! Two layouts are accepted:
//! - `name.vs` + `name.fs` next to each other; loading either path builds the
//!   program from both files.
//! - a single `name.glsl` holding both stages after `#type vertex` and
//!   `#type fragment` marker lines. Lines before the first marker (usually
//!   `#version`) are shared by both stages.
//!
//! Uniforms are taken from `uniform <type> <name>;` declarations. Arrays
//! `name[N]` are expanded to `name[0]` .. `name[N-1]`. Every declared name is
//! recorded, including the ones the linker dropped (location -1).

use std::collections::HashMap;

use super::{LoadRequest, ResourceLoader};
use crate::assets::error::read_text;
use crate::assets::{LoadError, Resource, ResourceKind, ShaderResource};
use crate::backend::ShaderSource;
use crate::foundation::logging::{debug, warn};

const VERTEX_EXTENSION: &str = "vs";
const FRAGMENT_EXTENSION: &str = "fs";
const STAGE_MARKER: &str = "#type";

/// One `uniform` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    /// Declared name without array suffix
    pub name: String,
    /// Element count for array uniforms
    pub array_len: Option<usize>,
}

impl UniformDecl {
    /// Names the uniform is queried by
    pub fn expanded_names(&self) -> Vec<String> {
        match self.array_len {
            Some(len) => (0..len).map(|i| format!("{}[{}]", self.name, i)).collect(),
            None => vec![self.name.clone()],
        }
    }
}

/// Every plain `uniform` declaration in `source`
///
/// Interface blocks and declarations whose array length is not a literal are
/// skipped; see [`parse_uniforms`] for the strict variant.
pub fn declared_uniforms(source: &str) -> Vec<UniformDecl> {
    source
        .lines()
        .filter_map(|line| parse_uniform_line(line).ok().flatten())
        .flatten()
        .collect()
}

/// Like [`declared_uniforms`] but rejects malformed array lengths
pub fn parse_uniforms(source: &str) -> Result<Vec<UniformDecl>, LoadError> {
    let mut uniforms = Vec::new();
    for (number, line) in source.lines().enumerate() {
        match parse_uniform_line(line) {
            Ok(Some(decls)) => uniforms.extend(decls),
            Ok(None) => {}
            Err(message) => return Err(LoadError::Parse(format!("line {}: {}", number + 1, message))),
        }
    }
    Ok(uniforms)
}

fn parse_uniform_line(line: &str) -> Result<Option<Vec<UniformDecl>>, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix("uniform") else {
        return Ok(None);
    };
    // `uniform` must be a whole word and blocks are not plain uniforms
    if !rest.starts_with(char::is_whitespace) || rest.contains('{') {
        return Ok(None);
    }

    let declaration = rest.split(';').next().unwrap_or("").trim();
    let Some((_, names)) = declaration.split_once(char::is_whitespace) else {
        return Err(format!("uniform declaration '{}' has no name", line));
    };

    let mut decls = Vec::new();
    for name in names.split(',') {
        let name = name.split('=').next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(format!("uniform declaration '{}' has an empty name", line));
        }

        match name.split_once('[') {
            Some((base, len)) => {
                let len = len.trim_end_matches(']').trim();
                let len: usize = len
                    .parse()
                    .map_err(|_| format!("could not parse array element count for uniform '{}'", base.trim()))?;
                decls.push(UniformDecl {
                    name: base.trim().to_string(),
                    array_len: Some(len),
                });
            }
            None => decls.push(UniformDecl {
                name: name.to_string(),
                array_len: None,
            }),
        }
    }
    Ok(Some(decls))
}

/// Whether `identifier` occurs in `text` as a whole word
pub fn references_identifier(text: &str, identifier: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    text.match_indices(identifier).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + identifier.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Split a combined source on `#type vertex` / `#type fragment` markers
pub fn split_stages(source: &str) -> Result<ShaderSource, LoadError> {
    let mut shared = String::new();
    let mut vertex: Option<String> = None;
    let mut fragment: Option<String> = None;
    let mut current: Option<&str> = None;

    for line in source.lines() {
        if let Some(stage) = line.trim().strip_prefix(STAGE_MARKER) {
            let stage = stage.trim();
            current = match stage {
                "vertex" => Some("vertex"),
                "fragment" | "pixel" => Some("fragment"),
                other => return Err(LoadError::Parse(format!("unknown shader stage '{}'", other))),
            };
            let target = if current == Some("vertex") { &mut vertex } else { &mut fragment };
            if target.is_some() {
                return Err(LoadError::Parse(format!("shader stage '{}' defined twice", stage)));
            }
            *target = Some(shared.clone());
            continue;
        }

        let target = match current {
            None => Some(&mut shared),
            Some("vertex") => vertex.as_mut(),
            Some(_) => fragment.as_mut(),
        };
        if let Some(target) = target {
            target.push_str(line);
            target.push('\n');
        }
    }

    match (vertex, fragment) {
        (Some(vertex), Some(fragment)) => Ok(ShaderSource { vertex, fragment }),
        (None, _) => Err(LoadError::Parse("missing '#type vertex' stage".to_string())),
        (_, None) => Err(LoadError::Parse("missing '#type fragment' stage".to_string())),
    }
}

/// Compiles shader programs and records their uniform locations
#[derive(Debug, Default)]
pub struct ShaderLoader;

impl ShaderLoader {
    fn read_source(request: &LoadRequest<'_>) -> Result<ShaderSource, LoadError> {
        let file_path = &request.file_path;
        match request.path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case(VERTEX_EXTENSION) || ext.eq_ignore_ascii_case(FRAGMENT_EXTENSION) => {
                Ok(ShaderSource {
                    vertex: read_text(&file_path.with_extension(VERTEX_EXTENSION))?,
                    fragment: read_text(&file_path.with_extension(FRAGMENT_EXTENSION))?,
                })
            }
            _ => split_stages(&read_text(file_path)?),
        }
    }
}

impl ResourceLoader for ShaderLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Shader
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let source = Self::read_source(request)?;

        let mut declarations = parse_uniforms(&source.vertex)?;
        declarations.extend(parse_uniforms(&source.fragment)?);

        let program = request.graphics.compile_program(&source)?;

        let mut uniforms = HashMap::new();
        for declaration in &declarations {
            for name in declaration.expanded_names() {
                if uniforms.contains_key(&name) {
                    continue;
                }
                let location = request.graphics.uniform_location(program, &name);
                if location == -1 {
                    warn!("Unused uniform at location -1: {} in {}", name, request.path);
                }
                uniforms.insert(name, location);
            }
        }
        debug!("Shader {} has {} uniforms", request.path, uniforms.len());

        Ok(ShaderResource::new(program, uniforms).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_and_array_uniforms() {
        let source = "\
#version 330
uniform mat4 world;
uniform vec3 lights[3];
uniform float a, b;
uniform Block { vec4 x; };
void main() {}
";
        let uniforms = parse_uniforms(source).unwrap();
        let names: Vec<_> = uniforms.iter().flat_map(UniformDecl::expanded_names).collect();
        assert_eq!(names, vec!["world", "lights[0]", "lights[1]", "lights[2]", "a", "b"]);
    }

    #[test]
    fn bad_array_length_is_a_parse_error() {
        let err = parse_uniforms("uniform vec3 lights[COUNT];").unwrap_err();
        assert!(matches!(err, LoadError::Parse(message) if message.contains("lights")));
        assert!(declared_uniforms("uniform vec3 lights[COUNT];").is_empty());
    }

    #[test]
    fn identifiers_match_whole_words() {
        assert!(references_identifier("x = tint[0];", "tint"));
        assert!(!references_identifier("x = tinted;", "tint"));
        assert!(!references_identifier("x = my_tint;", "tint"));
        assert!(references_identifier("void main()", "main"));
    }

    #[test]
    fn combined_source_splits_into_stages() {
        let source = "#version 330\n#type vertex\nvoid main() { v(); }\n#type fragment\nvoid main() { f(); }\n";
        let stages = split_stages(source).unwrap();
        assert_eq!(stages.vertex, "#version 330\nvoid main() { v(); }\n");
        assert_eq!(stages.fragment, "#version 330\nvoid main() { f(); }\n");
    }

    #[test]
    fn combined_source_needs_both_stages() {
        let err = split_stages("#type vertex\nvoid main() {}\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(message) if message.contains("fragment")));

        let err = split_stages("#type geometry\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
