//! Conversion between automorphisms, given by the images of the generators, and their integer
//! matrices.

use std::sync::Arc;

use ndarray::Array2;

use crate::abelian::{AbelianGroup, AbelianGroupElement};
use crate::error::AutomorphismError;
use crate::matrix::{is_bijective_endomorphism, is_homomorphism_matrix, reduce_modulo, IntMatrix};

/// Builds the matrix whose $`i`$th row is the exponent vector of `images[i]`.
///
/// # Arguments
///
/// * `domain` - The domain of the automorphism.
/// * `images` - The images of the generators of `domain`, in order.
///
/// # Errors
///
/// Errors if the number of images differs from the number of generators, or if an image cannot be
/// coerced into `domain`.
pub fn to_matrix(
    domain: &Arc<AbelianGroup>,
    images: &[AbelianGroupElement],
) -> Result<IntMatrix, AutomorphismError> {
    let n = domain.ngens();
    if images.len() != n {
        return Err(AutomorphismError::DomainError(format!(
            "{} generator images were given, but {domain} has {n} generators.",
            images.len()
        )));
    }
    let mut mat = Array2::<i64>::zeros((n, n));
    for (i, image) in images.iter().enumerate() {
        let image = domain.coerce(image)?;
        mat.row_mut(i)
            .iter_mut()
            .zip(image.exponents().iter())
            .for_each(|(m, &e)| *m = e);
    }
    Ok(mat)
}

/// Validates a candidate integer matrix as an automorphism of `domain` and returns its canonical
/// form, *i.e.* with every column reduced modulo the order of the corresponding generator.
///
/// # Errors
///
/// * [`AutomorphismError::UnsupportedDomain`] if `domain` is infinite.
/// * [`AutomorphismError::DomainError`] if `mat` is not $`n \times n`$, or if the exponent of
///   `domain` does not fit into `u64`.
/// * [`AutomorphismError::NotAutomorphism`] if `mat` does not define a bijective homomorphism.
pub fn from_matrix(
    domain: &Arc<AbelianGroup>,
    mat: &IntMatrix,
) -> Result<IntMatrix, AutomorphismError> {
    if !domain.is_finite() {
        return Err(AutomorphismError::UnsupportedDomain(
            "only finite abelian groups are supported".to_string(),
        ));
    }
    let n = domain.ngens();
    if mat.dim() != (n, n) {
        return Err(AutomorphismError::DomainError(format!(
            "A {n}×{n} matrix is required for {domain}, but a {}×{} matrix was given.",
            mat.nrows(),
            mat.ncols()
        )));
    }
    let orders = domain.gens_orders();
    let canonical = reduce_modulo(mat, orders);
    if !is_homomorphism_matrix(&canonical, orders) {
        return Err(AutomorphismError::NotAutomorphism(format!(
            "the generator images {canonical} do not respect the generator orders of {domain}"
        )));
    }
    if !is_bijective_endomorphism(&canonical, orders)? {
        return Err(AutomorphismError::NotAutomorphism(format!(
            "the endomorphism {canonical} of {domain} is not bijective"
        )));
    }
    Ok(canonical)
}
