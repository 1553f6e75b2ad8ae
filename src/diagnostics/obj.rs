//! Wavefront OBJ export for post-mortem inspection of coupled patches.
//!
//! Writes vertex positions (`v`), line segments (`l`) and polygons (`f`).
//! Indices are 1-based and keep counting across calls on the same writer, so
//! points, edges and faces can be mixed in one file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::math::Point3;
use crate::topology::Face;

/// Streams geometry as OBJ text while tracking the vertex numbering.
pub struct ObjWriter<W: Write> {
    writer: W,
    vertices: usize,
}

impl<W: Write> ObjWriter<W> {
    /// Creates a writer whose first vertex gets index 1.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_vertex_offset(writer, 0)
    }

    /// Creates a writer continuing after `written` vertices already in the
    /// output.
    #[must_use]
    pub fn with_vertex_offset(writer: W, written: usize) -> Self {
        Self {
            writer,
            vertices: written,
        }
    }

    /// Number of vertices written so far (the index of the last one).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices
    }

    /// Writes a `#` comment line.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying writer.
    pub fn write_comment(&mut self, text: &str) -> io::Result<()> {
        for line in text.lines() {
            writeln!(self.writer, "# {line}")?;
        }
        Ok(())
    }

    /// Writes one vertex and returns its 1-based index.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying writer.
    pub fn write_point(&mut self, pt: &Point3) -> io::Result<usize> {
        writeln!(self.writer, "v {} {} {}", pt.x, pt.y, pt.z)?;
        self.vertices += 1;
        Ok(self.vertices)
    }

    /// Writes the points selected by `labels`, in label order.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] for a label outside `points`,
    /// and propagates I/O errors.
    pub fn write_points(&mut self, points: &[Point3], labels: &[usize]) -> io::Result<()> {
        for &label in labels {
            let pt = points.get(label).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("point label {label} out of range ({} points)", points.len()),
                )
            })?;
            self.write_point(pt)?;
        }
        Ok(())
    }

    /// Writes a line segment between two new vertices.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying writer.
    pub fn write_edge(&mut self, p0: &Point3, p1: &Point3) -> io::Result<()> {
        let i0 = self.write_point(p0)?;
        let i1 = self.write_point(p1)?;
        writeln!(self.writer, "l {i0} {i1}")
    }

    /// Writes faces as polygons, emitting each referenced point once.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] for a label outside `points`,
    /// and propagates I/O errors.
    pub fn write_faces(&mut self, faces: &[Face], points: &[Point3]) -> io::Result<()> {
        let mut obj_index: HashMap<usize, usize> = HashMap::with_capacity(4 * faces.len());
        for face in faces {
            let mut line = String::from("f");
            for &label in face.vertices() {
                let index = if let Some(&index) = obj_index.get(&label) {
                    index
                } else {
                    self.write_points(points, &[label])?;
                    obj_index.insert(label, self.vertices);
                    self.vertices
                };
                line.push(' ');
                line.push_str(&index.to_string());
            }
            writeln!(self.writer, "{line}")?;
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Propagates the flush error.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Writes a whole patch (faces and the points they use) to `path`.
///
/// # Errors
///
/// Returns [`crate::error::CoupleError::Io`] if the file cannot be written.
pub fn write_patch_obj(path: impl AsRef<Path>, faces: &[Face], points: &[Point3]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut obj = ObjWriter::new(BufWriter::new(file));
    obj.write_faces(faces, points)?;
    obj.into_inner()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn text(obj: ObjWriter<Vec<u8>>) -> String {
        String::from_utf8(obj.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn point_numbering_continues_across_calls() {
        let mut obj = ObjWriter::new(Vec::new());
        assert_eq!(obj.write_point(&p(0.0, 0.0, 0.0)).unwrap(), 1);
        obj.write_edge(&p(1.0, 0.0, 0.0), &p(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(obj.write_point(&p(3.0, 0.0, 0.0)).unwrap(), 4);
        let out = text(obj);
        assert_eq!(out.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert!(out.lines().any(|l| l == "l 2 3"));
    }

    #[test]
    fn vertex_offset_shifts_indices() {
        let mut obj = ObjWriter::with_vertex_offset(Vec::new(), 10);
        obj.write_edge(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(obj.vertex_count(), 12);
        assert!(text(obj).contains("l 11 12"));
    }

    #[test]
    fn selected_points_follow_label_order() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let mut obj = ObjWriter::new(Vec::new());
        obj.write_points(&pts, &[2, 0]).unwrap();
        let out = text(obj);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["v 2 0 0", "v 0 0 0"]);
    }

    #[test]
    fn bad_label_is_invalid_input() {
        let mut obj = ObjWriter::new(Vec::new());
        let err = obj.write_points(&[p(0.0, 0.0, 0.0)], &[5]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn shared_points_are_written_once() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(2.0, 1.0, 0.0),
        ];
        let faces = vec![Face::new(vec![0, 1, 4, 3]), Face::new(vec![1, 2, 5, 4])];
        let mut obj = ObjWriter::new(Vec::new());
        obj.write_faces(&faces, &pts).unwrap();
        let out = text(obj);
        assert_eq!(out.lines().filter(|l| l.starts_with("v ")).count(), 6);
        let f: Vec<&str> = out.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(f, vec!["f 1 2 3 4", "f 2 5 6 3"]);
    }

    #[test]
    fn patch_file_is_written() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let faces = vec![Face::new(vec![0, 1, 2])];
        let path = std::env::temp_dir().join(format!("geocouple_obj_{}.obj", std::process::id()));
        write_patch_obj(&path, &faces, &pts).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(out.ends_with("f 1 2 3\n"));
    }
}
