use crate::error::{ContractError, MatchError, Result};
use crate::math::polygon_3d::average_point;
use crate::math::Point3;

/// Result of matching two point sets of equal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointMatch {
    /// For every point of the first set, the index of its partner in the
    /// second set.
    pub partner: Vec<usize>,
}

/// Pairs every point of `pts0` with the unique point of `pts1` within
/// tolerance.
///
/// Points `i` and `j` match if `|pts0[i] - pts1[j]| <= min(tols0[i], tols1[j])`.
/// Candidates are found through a sorted index of distances to a common
/// reference point: by the triangle inequality only candidates whose key lies
/// within `tols0[i]` of the query key can match.
///
/// # Errors
///
/// Returns a contract error if the sets differ in size or a tolerance list
/// does not have one entry per point. Returns [`MatchError::Unmatched`]
/// listing every point without a partner, or [`MatchError::Ambiguous`]
/// listing every point with several partners or sharing its partner with
/// another point.
pub fn match_points(
    pts0: &[Point3],
    tols0: &[f64],
    pts1: &[Point3],
    tols1: &[f64],
) -> Result<PointMatch> {
    for (what, actual) in [
        ("second point set", pts1.len()),
        ("first point tolerances", tols0.len()),
        ("second point tolerances", tols1.len()),
    ] {
        if actual != pts0.len() {
            return Err(ContractError::LengthMismatch {
                what,
                expected: pts0.len(),
                actual,
            }
            .into());
        }
    }

    let reference = average_point(pts1);
    let mut sorted: Vec<(f64, usize)> = pts1
        .iter()
        .enumerate()
        .map(|(j, p)| ((p - reference).norm(), j))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut partner = Vec::with_capacity(pts0.len());
    let mut unmatched = Vec::new();
    let mut ambiguous = Vec::new();

    for (i, p) in pts0.iter().enumerate() {
        let key = (p - reference).norm();
        let lo = sorted.partition_point(|&(k, _)| k < key - tols0[i]);
        let hits: Vec<usize> = sorted[lo..]
            .iter()
            .take_while(|&&(k, _)| k <= key + tols0[i])
            .map(|&(_, j)| j)
            .filter(|&j| (p - pts1[j]).norm() <= tols0[i].min(tols1[j]))
            .collect();

        match hits.as_slice() {
            [] => {
                unmatched.push(i);
                partner.push(usize::MAX);
            }
            [j] => partner.push(*j),
            _ => {
                partner.push(usize::MAX);
                ambiguous.push((i, hits));
            }
        }
    }

    if !unmatched.is_empty() {
        let nearest = unmatched
            .iter()
            .map(|&i| nearest_distance(&pts0[i], pts1))
            .collect();
        return Err(MatchError::Unmatched {
            faces: unmatched,
            nearest,
        }
        .into());
    }

    // A partner claimed twice is ambiguous for every claimant.
    let mut claimed_by: Vec<Vec<usize>> = vec![Vec::new(); pts1.len()];
    for (i, &j) in partner.iter().enumerate() {
        if j != usize::MAX {
            claimed_by[j].push(i);
        }
    }
    for owners in claimed_by.iter().filter(|o| o.len() > 1) {
        for &i in owners {
            ambiguous.push((i, vec![partner[i]]));
        }
    }

    if !ambiguous.is_empty() {
        ambiguous.sort_by_key(|&(i, _)| i);
        let (faces, candidates) = ambiguous.into_iter().unzip();
        return Err(MatchError::Ambiguous { faces, candidates }.into());
    }

    Ok(PointMatch { partner })
}

/// Distance from `p` to the closest point of `pts`.
#[must_use]
pub fn nearest_distance(p: &Point3, pts: &[Point3]) -> f64 {
    pts.iter()
        .map(|q| (p - q).norm())
        .fold(f64::INFINITY, f64::min)
}

/// Index of the point of `pts` closest to `p`.
#[must_use]
pub fn nearest_index(p: &Point3, pts: &[Point3]) -> Option<usize> {
    pts.iter()
        .enumerate()
        .min_by(|a, b| (p - a.1).norm().total_cmp(&(p - b.1).norm()))
        .map(|(j, _)| j)
}
