//! Vector-overlay asset parsing.
//!
//! The overlay asset is an SVG-subset document whose `<path>` elements
//! carry the building footprints. Paths are parsed into named sub-path
//! polygons keyed by their `id` attribute; ids must match building
//! hotspot identifiers for a mesh to be produced. Fill tessellation
//! goes through lyon so concave footprints triangulate correctly.

use fnv::FnvHashMap;
use lyon_path::math::Point;
use lyon_path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

use crate::error::EngineError;

/// Closed sub-path polygon in the asset's local 2-D space.
pub type Polygon = Vec<[f32; 2]>;

/// Triangulated fill of one or more sub-paths. The outline polygons
/// are kept alongside the triangles for pointer hit-testing.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub outline: Vec<Polygon>,
}

impl TriangleMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Parsed vector document: path id -> sub-path polygons.
#[derive(Clone, Debug, Default)]
pub struct VectorDoc {
    paths: FnvHashMap<String, Vec<Polygon>>,
}

impl VectorDoc {
    pub fn get(&self, path_id: &str) -> Option<&[Polygon]> {
        self.paths.get(path_id).map(|p| p.as_slice())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Parse a vector-overlay document. Elements without an `id` or with
/// unusable path data are skipped; a document yielding no paths at all
/// is treated as a parse failure.
pub fn parse_vector_doc(url: &str, text: &str) -> Result<VectorDoc, EngineError> {
    let mut paths = FnvHashMap::default();
    let mut rest = text;
    while let Some(start) = rest.find("<path") {
        let tag = &rest[start..];
        let end = tag.find('>').unwrap_or(tag.len());
        let attrs = &tag[..end];
        if let (Some(id), Some(data)) = (attribute(attrs, "id"), attribute(attrs, "d")) {
            let polygons = parse_path_data(data);
            if !polygons.is_empty() {
                paths.insert(id.to_string(), polygons);
            }
        }
        rest = &rest[start + end.min(tag.len() - 1) + 1..];
    }
    if paths.is_empty() {
        return Err(EngineError::AssetLoad {
            url: url.to_string(),
            reason: "no named paths in vector document".to_string(),
        });
    }
    Ok(VectorDoc { paths })
}

/// Extract a quoted attribute value from a raw element tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut search = tag;
    loop {
        let at = search.find(name)?;
        let after = &search[at + name.len()..];
        // Reject substring hits like `id` inside `grid-id`.
        let preceded_ok = at == 0
            || search[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        let trimmed = after.trim_start();
        if preceded_ok && trimmed.starts_with('=') {
            let value = trimmed[1..].trim_start();
            let quote = value.chars().next()?;
            if quote == '"' || quote == '\'' {
                let body = &value[1..];
                let close = body.find(quote)?;
                return Some(&body[..close]);
            }
        }
        search = &search[at + name.len()..];
    }
}

/// Parse SVG path data into closed sub-path polygons. Supports
/// M/m, L/l, H/h, V/v, C/c and Z/z; cubics are flattened by fixed-step
/// sampling, which is plenty for hit shapes.
fn parse_path_data(data: &str) -> Vec<Polygon> {
    const CURVE_STEPS: u32 = 8;
    let mut polygons = Vec::new();
    let mut current: Polygon = Vec::new();
    let mut cursor = [0.0f32, 0.0f32];
    let mut tokens = PathTokens::new(data);

    while let Some(command) = tokens.next_command() {
        match command {
            'M' | 'm' => {
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                let relative = command == 'm';
                if let Some(p) = tokens.next_pair() {
                    cursor = apply(cursor, p, relative);
                    current.push(cursor);
                }
                // Extra coordinate pairs after a moveto are implicit linetos.
                while let Some(p) = tokens.next_pair() {
                    cursor = apply(cursor, p, relative);
                    current.push(cursor);
                }
            }
            'L' | 'l' => {
                while let Some(p) = tokens.next_pair() {
                    cursor = apply(cursor, p, command == 'l');
                    current.push(cursor);
                }
            }
            'H' | 'h' => {
                while let Some(x) = tokens.next_number() {
                    cursor[0] = if command == 'h' { cursor[0] + x } else { x };
                    current.push(cursor);
                }
            }
            'V' | 'v' => {
                while let Some(y) = tokens.next_number() {
                    cursor[1] = if command == 'v' { cursor[1] + y } else { y };
                    current.push(cursor);
                }
            }
            'C' | 'c' => {
                while let (Some(c1), Some(c2), Some(end)) =
                    (tokens.next_pair(), tokens.next_pair(), tokens.next_pair())
                {
                    let relative = command == 'c';
                    let p0 = cursor;
                    let p1 = apply(cursor, c1, relative);
                    let p2 = apply(cursor, c2, relative);
                    let p3 = apply(cursor, end, relative);
                    for step in 1..=CURVE_STEPS {
                        let t = step as f32 / CURVE_STEPS as f32;
                        current.push(cubic_at(p0, p1, p2, p3, t));
                    }
                    cursor = p3;
                }
            }
            'Z' | 'z' => {
                if current.len() >= 3 {
                    if let Some(first) = current.first().copied() {
                        cursor = first;
                    }
                    polygons.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            _ => {
                // Unsupported command: drop its arguments.
                while tokens.next_number().is_some() {}
            }
        }
    }
    if current.len() >= 3 {
        polygons.push(current);
    }
    polygons
}

fn apply(cursor: [f32; 2], p: [f32; 2], relative: bool) -> [f32; 2] {
    if relative {
        [cursor[0] + p[0], cursor[1] + p[1]]
    } else {
        p
    }
}

fn cubic_at(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], t: f32) -> [f32; 2] {
    let u = 1.0 - t;
    let coeff = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    [
        coeff[0] * p0[0] + coeff[1] * p1[0] + coeff[2] * p2[0] + coeff[3] * p3[0],
        coeff[0] * p0[1] + coeff[1] * p1[1] + coeff[2] * p2[1] + coeff[3] * p3[1],
    ]
}

struct PathTokens<'a> {
    rest: &'a str,
}

impl<'a> PathTokens<'a> {
    fn new(data: &'a str) -> Self {
        Self { rest: data }
    }

    fn skip_separators(&mut self) {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    fn next_command(&mut self) -> Option<char> {
        self.skip_separators();
        let c = self.rest.chars().next()?;
        if c.is_ascii_alphabetic() {
            self.rest = &self.rest[c.len_utf8()..];
            Some(c)
        } else {
            // Implicit repeat of the previous command is handled by the
            // per-command argument loops; seeing a number here means the
            // data started without a command and is unusable.
            None
        }
    }

    fn next_number(&mut self) -> Option<f32> {
        self.skip_separators();
        let bytes = self.rest.as_bytes();
        if bytes.is_empty() || bytes[0].is_ascii_alphabetic() {
            return None;
        }
        let mut end = 0;
        let mut seen_dot = false;
        let mut seen_exp = false;
        while end < bytes.len() {
            let b = bytes[end];
            let ok = b.is_ascii_digit()
                || (b == b'-' && (end == 0 || bytes[end - 1] | 0x20 == b'e'))
                || (b == b'+' && end > 0 && bytes[end - 1] | 0x20 == b'e')
                || (b == b'.' && !seen_dot && !seen_exp)
                || ((b | 0x20 == b'e') && !seen_exp && end > 0);
            if !ok {
                break;
            }
            seen_dot |= b == b'.';
            seen_exp |= b | 0x20 == b'e';
            end += 1;
        }
        if end == 0 {
            return None;
        }
        let (num, rest) = self.rest.split_at(end);
        self.rest = rest;
        num.parse().ok()
    }

    fn next_pair(&mut self) -> Option<[f32; 2]> {
        let x = self.next_number()?;
        let y = self.next_number()?;
        Some([x, y])
    }
}

/// Fill-tessellate sub-path polygons into a triangle mesh.
pub fn tessellate(polygons: &[Polygon]) -> TriangleMesh {
    let mut builder = Path::builder();
    let mut any = false;
    for polygon in polygons {
        if polygon.len() < 3 {
            continue;
        }
        builder.begin(Point::new(polygon[0][0], polygon[0][1]));
        for p in &polygon[1..] {
            builder.line_to(Point::new(p[0], p[1]));
        }
        builder.end(true);
        any = true;
    }
    if !any {
        return TriangleMesh::default();
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tess = FillTessellator::new();
    let result = tess.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
            let p = v.position();
            [p.x, p.y]
        }),
    );
    if result.is_err() {
        log::warn!("fill tessellation failed; overlay keeps outline only");
        return TriangleMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
            outline: polygons.to_vec(),
        };
    }
    TriangleMesh {
        vertices: buffers.vertices,
        indices: buffers.indices,
        outline: polygons.to_vec(),
    }
}
