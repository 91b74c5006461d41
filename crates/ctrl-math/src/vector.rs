// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Vector Utilities
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Vector utilities.
//!
//! Norms, column means, blending and zero-padding on `Array1<f64>`.

use ndarray::Array1;

/// ‖v‖₁.
pub fn norm_l1(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x.abs()).sum()
}

/// ‖v‖₂.
pub fn norm_l2(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Per-dimension mean over a set of equally sized vectors.
///
/// Returns zeros of length `dim` for an empty set. Entries shorter than `dim`
/// contribute nothing past their end.
pub fn column_mean<'a, I>(entries: I, dim: usize) -> Array1<f64>
where
    I: IntoIterator<Item = &'a Array1<f64>>,
{
    let mut sum = Array1::zeros(dim);
    let mut count = 0usize;
    for entry in entries {
        for (s, &e) in sum.iter_mut().zip(entry.iter()) {
            *s += e;
        }
        count += 1;
    }
    if count > 0 {
        sum /= count as f64;
    }
    sum
}

/// Elementwise sum of a set of vectors, zeros of length `dim` when empty.
pub fn column_sum<'a, I>(entries: I, dim: usize) -> Array1<f64>
where
    I: IntoIterator<Item = &'a Array1<f64>>,
{
    let mut sum = Array1::zeros(dim);
    for entry in entries {
        for (s, &e) in sum.iter_mut().zip(entry.iter()) {
            *s += e;
        }
    }
    sum
}

/// `w·a + (1−w)·b`.
pub fn blend(a: &Array1<f64>, b: &Array1<f64>, w: f64) -> Array1<f64> {
    a * w + b * (1.0 - w)
}

/// Copy `v` into a zero vector of length `len`, truncating if longer.
pub fn zero_pad(v: &Array1<f64>, len: usize) -> Array1<f64> {
    let mut out = Array1::zeros(len);
    for (o, &x) in out.iter_mut().zip(v.iter()) {
        *o = x;
    }
    out
}

/// First `n` entries of `v` (fewer if `v` is shorter).
pub fn head(v: &Array1<f64>, n: usize) -> Array1<f64> {
    v.iter().take(n).copied().collect()
}
