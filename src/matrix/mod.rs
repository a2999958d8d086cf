//! Integer matrices over generator exponent vectors.
//!
//! Matrices act on exponent row vectors from the right: an element with exponent vector
//! $`\mathbf{x}`$ is mapped to $`\mathbf{x} \mathbf{M}`$. Row $`i`$ of $`\mathbf{M}`$ is therefore
//! the exponent vector of the image of the $`i`$th generator, and column $`j`$ is defined modulo
//! the order of the $`j`$th generator.

use itertools::Itertools;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayViewMut1, Axis, Zip};
use num::integer::{ExtendedGcd, Integer};
use num_modular::ModularCoreOps;

use crate::abelian::{add_exponents, checked_exponent, mul_exponents, reduce_exponent};
use crate::error::AutomorphismError;

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod matrix_tests;

/// A square integer matrix in the covering matrix ring.
pub type IntMatrix = Array2<i64>;

/// Returns the $`n \times n`$ identity matrix.
pub fn identity(n: usize) -> IntMatrix {
    Array2::eye(n)
}

/// Reduces every column of a matrix modulo the order of the corresponding generator.
///
/// # Panics
///
/// Panics if the number of columns of `mat` does not match the number of `orders`.
pub fn reduce_modulo(mat: &IntMatrix, orders: &[u64]) -> IntMatrix {
    assert_eq!(
        mat.ncols(),
        orders.len(),
        "The number of matrix columns does not match the number of generator orders."
    );
    let mut reduced = mat.clone();
    reduced
        .axis_iter_mut(Axis(1))
        .zip(orders.iter())
        .for_each(|(mut col, &n)| col.mapv_inplace(|x| reduce_exponent(x, n)));
    reduced
}

/// Multiplies a row vector by a matrix, reducing every entry of the product modulo the order of
/// its column.
///
/// Each term is reduced before it is accumulated, so no intermediate value exceeds the column
/// order.
///
/// # Errors
///
/// Errors if an entry in a column of infinite order overflows.
///
/// # Panics
///
/// Panics if the dimensions of `x`, `mat` and `orders` are incompatible.
pub fn vecmat_reduced(
    x: ArrayView1<'_, i64>,
    mat: &IntMatrix,
    orders: &[u64],
) -> Result<Array1<i64>, AutomorphismError> {
    assert_eq!(
        x.len(),
        mat.nrows(),
        "The length of the vector does not match the number of matrix rows."
    );
    assert_eq!(
        mat.ncols(),
        orders.len(),
        "The number of matrix columns does not match the number of generator orders."
    );
    mat.axis_iter(Axis(1))
        .zip(orders.iter())
        .enumerate()
        .map(|(j, (col, &n))| {
            x.iter()
                .zip(col.iter())
                .try_fold(0i64, |acc, (&xi, &m)| {
                    add_exponents(acc, mul_exponents(xi, m, n)?, n)
                })
                .ok_or_else(|| {
                    AutomorphismError::DomainError(format!(
                        "Entry {} of the product overflows in a factor of infinite order.",
                        j + 1
                    ))
                })
        })
        .collect()
}

/// Multiplies two matrices and reduces the product modulo the generator orders.
///
/// # Errors
///
/// Errors if an entry in a column of infinite order overflows.
///
/// # Panics
///
/// Panics if the dimensions of `a`, `b` and `orders` are incompatible.
pub fn matmul_reduced(
    a: &IntMatrix,
    b: &IntMatrix,
    orders: &[u64],
) -> Result<IntMatrix, AutomorphismError> {
    let entries = a
        .rows()
        .into_iter()
        .map(|row| vecmat_reduced(row, b, orders))
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .flat_map(|row| row.iter().copied())
        .collect_vec();
    Array2::from_shape_vec((a.nrows(), b.ncols()), entries)
        .map_err(|err| AutomorphismError::DomainError(err.to_string()))
}

/// Converts a matrix into nested rows.
pub fn to_rows(mat: &IntMatrix) -> Vec<Vec<i64>> {
    mat.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Converts nested rows into a matrix, or `None` if the rows are ragged.
pub fn from_rows(rows: &[Vec<i64>]) -> Option<IntMatrix> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return None;
    }
    Array2::from_shape_vec((nrows, ncols), rows.concat()).ok()
}

/// Checks if a matrix sends every generator to an element whose order divides the order of that
/// generator, *i.e.* $`n_i M_{ij} \equiv 0 \pmod{n_j}`$ for all $`i, j`$.
///
/// This is precisely the condition for the generator images to extend to a homomorphism.
pub fn is_homomorphism_matrix(mat: &IntMatrix, orders: &[u64]) -> bool {
    if mat.nrows() != orders.len() || mat.ncols() != orders.len() {
        return false;
    }
    mat.indexed_iter().all(|((i, j), &m)| {
        let (n_i, n_j) = (i128::from(orders[i]), i128::from(orders[j]));
        if n_j == 0 {
            // A finite-order image inside an infinite factor must be trivial.
            n_i == 0 || m == 0
        } else {
            (n_i * i128::from(m)).rem_euclid(n_j) == 0
        }
    })
}

/// Returns the exponent $`N`$ of a finite abelian group with the given generator orders.
///
/// Every element of the group is annihilated by $`N`$, so integer row reduction of exponent
/// vectors can be carried out modulo $`N`$.
///
/// # Errors
///
/// * [`AutomorphismError::UnsupportedDomain`] if an order is infinite.
/// * [`AutomorphismError::DomainError`] if $`N`$ does not fit into `u64`.
pub fn finite_exponent(orders: &[u64]) -> Result<u64, AutomorphismError> {
    if orders.iter().any(|&n| n == 0) {
        return Err(AutomorphismError::UnsupportedDomain(
            "only finite abelian groups are supported".to_string(),
        ));
    }
    checked_exponent(orders).ok_or_else(|| {
        AutomorphismError::DomainError(format!(
            "The exponent of a group with generator orders {orders:?} does not fit into 64 bits."
        ))
    })
}

/// Returns the residue of an integer modulo a positive modulus.
// The residue is smaller than the modulus.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_residue(x: i64, modulus: u64) -> u64 {
    i128::from(x).rem_euclid(i128::from(modulus)) as u64
}

/// Converts a residue modulo a generator order into a signed exponent.
// Generator orders fit into `i64`.
#[allow(clippy::cast_possible_wrap)]
fn to_signed(residue: u64) -> i64 {
    residue as i64
}

/// Decides whether the rows of `mat` generate $`(\mathbb{Z}/N\mathbb{Z})^n`$, where $`n`$ is the
/// number of columns of `mat`.
///
/// The rows are brought into echelon form by integer row operations (Euclidean pivoting) carried
/// out modulo $`N`$. Since the lattice $`N\mathbb{Z}^n`$ is always adjoined, the rows generate the
/// whole space if and only if every column admits a pivot coprime to $`N`$.
///
/// # Panics
///
/// Panics if `modulus` is zero.
pub fn spans_modulo(mat: &IntMatrix, modulus: u64) -> bool {
    assert!(modulus > 0, "The modulus must be a positive integer.");
    if modulus == 1 {
        return true;
    }
    let mut rows = mat.mapv(|x| to_residue(x, modulus));
    let ncols = rows.ncols();
    echelonise_modulo(&mut rows, ncols, modulus)
}

/// Brings the leading `npivots` columns of a matrix of residues into reduced echelon form modulo
/// `modulus`, applying every row operation to entire rows.
///
/// On success, row $`i`$ has a unit in column $`i`$ and zeros in the other leading columns for
/// every $`i < `$ `npivots`. Returns `false` as soon as a leading column admits no pivot invertible
/// modulo `modulus`.
fn echelonise_modulo(rows: &mut Array2<u64>, npivots: usize, modulus: u64) -> bool {
    let nrows = rows.nrows();
    for col in 0..npivots {
        let pivot_row = col;

        // Euclidean elimination on the remaining rows until at most one non-zero entry is left.
        loop {
            let nonzero = (pivot_row..nrows)
                .filter(|&r| rows[(r, col)] != 0)
                .collect_vec();
            let Some(&min_row) = nonzero.iter().min_by_key(|&&r| rows[(r, col)]) else {
                break;
            };
            swap_rows(rows, pivot_row, min_row);
            if nonzero.len() == 1 {
                break;
            }
            let pivot = rows.row(pivot_row).to_owned();
            for r in (pivot_row + 1)..nrows {
                let q = rows[(r, col)] / pivot[col];
                if q != 0 {
                    subtract_multiple(rows.row_mut(r), &pivot, q, modulus);
                }
            }
        }

        let g = if pivot_row < nrows {
            rows[(pivot_row, col)]
        } else {
            0
        };
        let n = i128::from(modulus);
        let ExtendedGcd { gcd: d, x: u, .. } = i128::from(g).extended_gcd(&n);
        if d != 1 {
            log::debug!("Column {col} has no pivot invertible modulo {modulus}.");
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let u = u.rem_euclid(n) as u64;

        // Normalise the pivot to unity, then clear the column everywhere else.
        let pivot = rows.row(pivot_row).mapv(|x| x.mulm(u, &modulus));
        rows.row_mut(pivot_row).assign(&pivot);
        for r in (0..nrows).filter(|&r| r != pivot_row) {
            let a = rows[(r, col)];
            if a != 0 {
                subtract_multiple(rows.row_mut(r), &pivot, a, modulus);
            }
        }
    }
    true
}

/// Subtracts `factor` times `pivot` from `row` modulo `modulus`.
fn subtract_multiple(
    row: ArrayViewMut1<'_, u64>,
    pivot: &Array1<u64>,
    factor: u64,
    modulus: u64,
) {
    Zip::from(row)
        .and(pivot)
        .for_each(|x, &p| *x = (*x).subm(factor.mulm(p, &modulus), &modulus));
}

/// Swaps two rows of a matrix in place.
fn swap_rows<T>(mat: &mut Array2<T>, i: usize, j: usize) {
    if i == j {
        return;
    }
    let (lo, hi) = (i.min(j), i.max(j));
    let (mut above, mut below) = mat.view_mut().split_at(Axis(0), hi);
    let row_lo = above.slice_mut(s![lo, ..]);
    let row_hi = below.slice_mut(s![0, ..]);
    Zip::from(row_lo).and(row_hi).for_each(std::mem::swap);
}

/// Checks if a matrix defines a bijective endomorphism of the finite abelian group with the given
/// generator orders.
///
/// The matrix must first define a homomorphism (see [`is_homomorphism_matrix`]). Writing the group
/// as $`\mathbb{Z}^n / \mathbf{D}\mathbb{Z}^n`$ with $`\mathbf{D} = \mathrm{diag}(n_1, \ldots,
/// n_n)`$, the induced map is surjective if and only if the rows of $`\mathbf{M}`$ together with
/// those of $`\mathbf{D}`$ generate $`\mathbb{Z}^n`$. These rows contain $`N\mathbb{Z}^n`$ for the
/// group exponent $`N`$, so the test runs modulo $`N`$. A surjective endomorphism of a finite set
/// is bijective.
///
/// Infinite groups are never accepted.
///
/// # Errors
///
/// Errors if the group exponent does not fit into `u64`.
pub fn is_bijective_endomorphism(
    mat: &IntMatrix,
    orders: &[u64],
) -> Result<bool, AutomorphismError> {
    if orders.iter().any(|&n| n == 0) || !is_homomorphism_matrix(mat, orders) {
        return Ok(false);
    }
    let modulus = finite_exponent(orders)?;
    let n = orders.len();
    let mut stacked = Array2::<i64>::zeros((2 * n, n));
    stacked.slice_mut(s![..n, ..]).assign(mat);
    orders
        .iter()
        .enumerate()
        .for_each(|(i, &order)| stacked[(n + i, i)] = to_signed(order));
    Ok(spans_modulo(&stacked, modulus))
}

/// Inverts the automorphism matrix of a finite abelian group.
///
/// Row $`j`$ of the inverse is the exponent vector of the preimage $`\mathbf{y}_j`$ of the
/// $`j`$th generator, *i.e.* a solution of $`\mathbf{y}_j \mathbf{M} + \mathbf{z}_j \mathbf{D}
/// \equiv \mathbf{e}_j \pmod{N}`$. All of these are read off at once by reducing
/// $`[\mathbf{M} \mid \mathbf{I}]`$ stacked over $`[\mathbf{D} \mid \mathbf{0}]`$ modulo the
/// group exponent $`N`$.
///
/// # Errors
///
/// * [`AutomorphismError::UnsupportedDomain`] if an order is infinite.
/// * [`AutomorphismError::DomainError`] if the group exponent does not fit into `u64`.
/// * [`AutomorphismError::NotAutomorphism`] if `mat` does not define a bijective homomorphism.
pub fn inverse_modulo(mat: &IntMatrix, orders: &[u64]) -> Result<IntMatrix, AutomorphismError> {
    let modulus = finite_exponent(orders)?;
    if !is_homomorphism_matrix(mat, orders) {
        return Err(AutomorphismError::NotAutomorphism(format!(
            "the generator images {mat} do not respect the generator orders {orders:?}"
        )));
    }
    let k = orders.len();
    if modulus == 1 {
        return Ok(reduce_modulo(&identity(k), orders));
    }

    let mut augmented = Array2::<u64>::zeros((2 * k, 2 * k));
    augmented
        .slice_mut(s![..k, ..k])
        .assign(&mat.mapv(|x| to_residue(x, modulus)));
    orders.iter().enumerate().for_each(|(i, &order)| {
        augmented[(i, k + i)] = 1;
        augmented[(k + i, i)] = order % modulus;
    });
    if !echelonise_modulo(&mut augmented, k, modulus) {
        return Err(AutomorphismError::NotAutomorphism(format!(
            "the endomorphism {mat} of a group with generator orders {orders:?} is not bijective"
        )));
    }
    Ok(Array2::from_shape_fn((k, k), |(i, j)| {
        to_signed(augmented[(i, k + j)] % orders[j])
    }))
}
