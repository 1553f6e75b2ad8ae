use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::diagnostics::{write_patch_obj, ObjWriter};
use crate::error::{ContractError, CoupleError, MatchError, Result};
use crate::math::MATCH_TOL;
use crate::operations::tolerance::check_tolerance;
use crate::topology::{Face, PatchGeometry};

use super::match_points::{match_points, nearest_index};
use super::rotation::{anchor_distance, get_rotation};

/// Correspondence between a candidate face list and a reference face list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceOrdering {
    /// New index of every old (candidate) face.
    pub face_map: Vec<usize>,
    /// For every new face, the number of positions the old face is rotated.
    pub rotation: Vec<usize>,
    /// `false` iff `face_map` is the identity and every rotation is zero.
    pub changed: bool,
}

impl FaceOrdering {
    /// The ordering that leaves `n` faces untouched.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            face_map: (0..n).collect(),
            rotation: vec![0; n],
            changed: false,
        }
    }

    /// Reorders and rotates `faces` (in old numbering) into the new numbering.
    ///
    /// # Errors
    ///
    /// Returns a contract error if `faces` does not have one entry per mapped
    /// face.
    pub fn apply(&self, faces: &[Face]) -> Result<Vec<Face>> {
        if faces.len() != self.face_map.len() {
            return Err(ContractError::LengthMismatch {
                what: "faces to reorder",
                expected: self.face_map.len(),
                actual: faces.len(),
            }
            .into());
        }
        let mut reordered = vec![Face::new(Vec::new()); faces.len()];
        for (old, &new) in self.face_map.iter().enumerate() {
            reordered[new] = faces[old].rotated(self.rotation[new]);
        }
        Ok(reordered)
    }
}

/// Matches a candidate face set onto an owner face set occupying the same
/// positions.
///
/// Both sets must already be in a common frame. Faces correspond when their
/// centres lie within the tighter of the two face tolerances, and each
/// matched candidate face is rotated so its first vertex sits on the owner
/// anchor.
#[derive(Debug, Clone)]
pub struct FaceOrderer {
    match_tol: f64,
    diagnostics: Option<(PathBuf, String)>,
}

impl Default for FaceOrderer {
    fn default() -> Self {
        Self::new(MATCH_TOL)
    }
}

impl FaceOrderer {
    /// Creates an orderer with relative tolerance `match_tol`.
    #[must_use]
    pub fn new(match_tol: f64) -> Self {
        Self {
            match_tol,
            diagnostics: None,
        }
    }

    /// Writes OBJ dumps named after `name` into `dir` when matching fails.
    #[must_use]
    pub fn with_diagnostics(mut self, dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.diagnostics = Some((dir.into(), name.into()));
        self
    }

    /// Returns the relative matching tolerance.
    #[must_use]
    pub fn match_tol(&self) -> f64 {
        self.match_tol
    }

    /// Computes the ordering of `candidate` that lines it up with `owner`.
    ///
    /// # Errors
    ///
    /// Returns a contract error for sets of different size or an invalid
    /// tolerance, and a [`MatchError`] naming every face that has no, or more
    /// than one, geometric partner or whose anchor cannot be aligned.
    pub fn order(&self, owner: &PatchGeometry, candidate: &PatchGeometry) -> Result<FaceOrdering> {
        check_tolerance("match_tol", self.match_tol)?;
        if owner.len() != candidate.len() {
            return Err(ContractError::LengthMismatch {
                what: "candidate faces",
                expected: owner.len(),
                actual: candidate.len(),
            }
            .into());
        }

        let owner_tols = owner.tolerances(self.match_tol)?;
        let candidate_tols = candidate.tolerances(self.match_tol)?;

        let matched = match match_points(
            owner.centres(),
            &owner_tols,
            candidate.centres(),
            &candidate_tols,
        ) {
            Ok(m) => m,
            Err(CoupleError::Matching(err)) => return Err(self.fail(owner, candidate, err)),
            Err(err) => return Err(err),
        };

        let anchors = owner.anchor_points();
        let mut face_map = vec![0; owner.len()];
        let mut rotation = vec![0; owner.len()];
        let mut misaligned = Vec::new();
        let mut nearest = Vec::new();

        for (new, &old) in matched.partner.iter().enumerate() {
            face_map[old] = new;
            let face = &candidate.faces()[old];
            let tol = owner_tols[new].min(candidate_tols[old]);
            if let Some(r) = get_rotation(candidate.points(), face, &anchors[new], tol) {
                rotation[new] = r;
            } else {
                misaligned.push(new);
                nearest.push(anchor_distance(candidate.points(), face, &anchors[new]));
            }
        }

        if !misaligned.is_empty() {
            let err = MatchError::NoAnchor {
                faces: misaligned,
                nearest,
            };
            return Err(self.fail(owner, candidate, err));
        }

        let changed = face_map.iter().enumerate().any(|(old, &new)| old != new)
            || rotation.iter().any(|&r| r != 0);
        debug!(
            faces = owner.len(),
            moved = face_map.iter().enumerate().filter(|&(old, &new)| old != new).count(),
            rotated = rotation.iter().filter(|&&r| r != 0).count(),
            "ordered coupled faces"
        );

        Ok(FaceOrdering {
            face_map,
            rotation,
            changed,
        })
    }

    /// Logs the failure and dumps the geometry, then hands the error back.
    fn fail(
        &self,
        owner: &PatchGeometry,
        candidate: &PatchGeometry,
        err: MatchError,
    ) -> CoupleError {
        warn!(faces = owner.len(), match_tol = self.match_tol, %err, "face matching failed");
        if let Some((dir, name)) = &self.diagnostics {
            if let Err(io_err) = dump(dir, name, owner, candidate, &err) {
                warn!(dir = %dir.display(), %io_err, "could not write matching diagnostics");
            }
        }
        err.into()
    }
}

fn dump(
    dir: &Path,
    name: &str,
    owner: &PatchGeometry,
    candidate: &PatchGeometry,
    err: &MatchError,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_patch_obj(dir.join(format!("{name}_owner.obj")), owner.faces(), owner.points())?;
    write_patch_obj(
        dir.join(format!("{name}_candidate.obj")),
        candidate.faces(),
        candidate.points(),
    )?;

    let failed = match err {
        MatchError::Unmatched { faces, .. }
        | MatchError::Ambiguous { faces, .. }
        | MatchError::NoAnchor { faces, .. } => faces,
    };
    let file = File::create(dir.join(format!("{name}_connections.obj")))?;
    let mut obj = ObjWriter::new(BufWriter::new(file));
    obj.write_comment(&err.to_string())?;
    for &face in failed {
        let from = owner.centres()[face];
        if let Some(j) = nearest_index(&from, candidate.centres()) {
            obj.write_edge(&from, &candidate.centres()[j])?;
        }
    }
    obj.into_inner()?;
    debug!(dir = %dir.display(), name, "wrote matching diagnostics");
    Ok(())
}
