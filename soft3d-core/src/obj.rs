//! Wavefront OBJ mesh parser.
//!
//! Parsing is permissive: records with too few fields and record kinds
//! this engine does not use are skipped, not fatal. Only an input with no
//! vertex data at all is rejected.

use std::path::Path;

use log::{debug, trace};
use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, space1},
    combinator::{map_res, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::preceded,
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::{Face, Mesh};
use crate::vector::Vec3;

/// One vertex reference of a face record: a 1-based vertex index with
/// optional texture-coordinate and normal sub-indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FaceRef {
    vertex: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

/// Reads a mesh from an OBJ file on disk.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let text = std::fs::read_to_string(path)?;
    parse_obj(&text)
}

/// Parses OBJ text into a mesh.
pub fn parse_obj(input: &str) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    let mut skipped = 0usize;

    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Ok((_, vertex)) = position(line) {
            mesh.vertices.push(vertex);
        } else if let Ok((_, uv)) = tex_coord(line) {
            mesh.tex_coords.push(uv);
        } else if let Ok((_, normal)) = vertex_normal(line) {
            mesh.normals.push(normal);
        } else if let Ok((_, references)) = face(line) {
            if !push_face_record(&mut mesh, &references) {
                skipped += 1;
                trace!("skipping face record on line {}", number + 1);
            }
        } else {
            skipped += 1;
            trace!("skipping record on line {}", number + 1);
        }
    }

    if mesh.vertices.is_empty() {
        return Err(Error::MeshParse("no vertex records found".to_string()));
    }

    // A face pointing past the vertex buffer would fault every later
    // pipeline stage; drop such faces here.
    let vertex_count = mesh.vertices.len();
    let face_count = mesh.faces.len();
    mesh.faces
        .retain(|face| face.vertices.iter().all(|&v| v < vertex_count));
    let dropped = face_count - mesh.faces.len();

    debug!(
        "parsed obj: {} vertices, {} normals, {} texture coordinates, {} faces \
         ({} records skipped, {} faces out of range)",
        mesh.vertices.len(),
        mesh.normals.len(),
        mesh.tex_coords.len(),
        mesh.faces.len(),
        skipped,
        dropped
    );

    Ok(mesh)
}

/// `v x y z` — any trailing w coordinate is ignored.
fn position(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = tag("v")(input)?;
    let (input, _) = space1(input)?;
    let (input, x) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = double(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

/// `vt u v [w]` — two-component coordinates get a zero third component.
fn tex_coord(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = tag("vt")(input)?;
    let (input, _) = space1(input)?;
    let (input, u) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, v) = double(input)?;
    let (input, w) = opt(preceded(space1, double))(input)?;
    Ok((input, Vec3::new(u, v, w.unwrap_or(0.0))))
}

/// `vn x y z`
fn vertex_normal(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = tag("vn")(input)?;
    let (input, _) = space1(input)?;
    let (input, x) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = double(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

/// `f v[/vt[/vn]] ...`
fn face(input: &str) -> IResult<&str, Vec<FaceRef>> {
    let (input, _) = tag("f")(input)?;
    let (input, _) = space1(input)?;
    separated_list1(space1, face_reference)(input)
}

fn face_reference(input: &str) -> IResult<&str, FaceRef> {
    let (input, vertex) = index(input)?;
    let (input, tex_coord) = opt(preceded(char('/'), opt(index)))(input)?;
    let (input, normal) = match tex_coord {
        Some(_) => opt(preceded(char('/'), index))(input)?,
        None => (input, None),
    };
    Ok((
        input,
        FaceRef {
            vertex,
            tex_coord: tex_coord.flatten(),
            normal,
        },
    ))
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

/// Converts a 1-based reference to 0-based attribute indices.
///
/// A missing texture-coordinate or normal sub-index reuses the vertex
/// index, matching the faces-only convention of
/// [`Face::from_vertices`]; it never aliases attribute slot 0.
fn resolve(reference: FaceRef) -> Option<(usize, usize, usize)> {
    let vertex = reference.vertex.checked_sub(1)?;
    let tex_coord = match reference.tex_coord {
        Some(t) => t.checked_sub(1)?,
        None => vertex,
    };
    let normal = match reference.normal {
        Some(n) => n.checked_sub(1)?,
        None => vertex,
    };
    Some((vertex, tex_coord, normal))
}

/// Adds a 3-reference face, or fan-triangulates the first 4 references of
/// a larger record into two faces sharing the first vertex. Returns false
/// for records that cannot produce a face.
fn push_face_record(mesh: &mut Mesh, references: &[FaceRef]) -> bool {
    if references.len() < 3 {
        return false;
    }

    let mut corners = Vec::with_capacity(4);
    for &reference in references.iter().take(4) {
        match resolve(reference) {
            Some(corner) => corners.push(corner),
            None => return false,
        }
    }

    let face_of = |a: (usize, usize, usize), b: (usize, usize, usize), c: (usize, usize, usize)| {
        Face::new([a.0, b.0, c.0], [a.2, b.2, c.2], [a.1, b.1, c.1])
    };

    mesh.faces.push(face_of(corners[0], corners[1], corners[2]));
    if corners.len() == 4 {
        mesh.faces.push(face_of(corners[0], corners[2], corners[3]));
    }
    true
}
