/// Given the sorted start labels of consecutive patches, returns the patch
/// that owns global face `face`.
///
/// Returns `None` if `face` lies before the first patch.
#[must_use]
pub fn which_patch(patch_starts: &[usize], face: usize) -> Option<usize> {
    patch_starts
        .partition_point(|&start| start <= face)
        .checked_sub(1)
}

/// Contiguous range of global face labels occupied by one patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRange {
    /// Label of the first face.
    pub start: usize,
    /// Number of faces.
    pub size: usize,
}

impl PatchRange {
    /// Creates a new range.
    #[must_use]
    pub fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// Returns `true` if global face `face` lies in this patch.
    #[must_use]
    pub fn contains(&self, face: usize) -> bool {
        face >= self.start && face < self.start + self.size
    }

    /// Returns `true` if old face `old_face`, renumbered by `old_to_new`, lands
    /// in this patch.
    #[must_use]
    pub fn in_patch(&self, old_to_new: &[usize], old_face: usize) -> bool {
        old_to_new
            .get(old_face)
            .is_some_and(|&face| self.contains(face))
    }

    /// Converts a global face label to a patch-local index.
    #[must_use]
    pub fn local(&self, face: usize) -> Option<usize> {
        self.contains(face).then(|| face - self.start)
    }
}
