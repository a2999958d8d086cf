use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;
use std::sync::Arc;

use itertools::Itertools;
use ndarray::ArrayView1;
use num_traits::{Inv, Pow};
use serde::{Deserialize, Serialize};

use crate::abelian::{AbelianGroup, AbelianGroupElement};
use crate::error::AutomorphismError;
use crate::io::AutomorphismRecord;
use crate::matrix::{
    self, from_rows, inverse_modulo, is_homomorphism_matrix, matmul_reduced, reduce_modulo,
    to_rows, vecmat_reduced, IntMatrix,
};

pub mod matrix_codec;
mod module_morphism;

pub use module_morphism::ModuleMorphism;


/// A structure to manage automorphisms of finite abelian groups.
///
/// An automorphism is stored as its canonical integer matrix: row $`i`$ is the exponent vector of
/// the image of the $`i`$th generator, with column $`j`$ reduced modulo the order of the $`j`$th
/// generator. Equality and hashing only depend on this matrix and on the generator orders of the
/// domain.
///
/// Products follow the right-action convention: `&f * &g` applies `f` first and then `g`, so that
/// the matrix of `&f * &g` is the matrix product of the matrix of `f` and the matrix of `g`.
/// [`Self::compose`] provides the usual composition of maps instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "AutomorphismRecord", into = "AutomorphismRecord")]
pub struct Automorphism {
    /// The domain (and codomain) of this automorphism.
    domain: Arc<AbelianGroup>,

    /// The canonical matrix of this automorphism.
    matrix: IntMatrix,
}

impl Automorphism {
    /// Wraps a matrix that is already known to be a canonical automorphism matrix.
    pub(crate) fn from_canonical(domain: &Arc<AbelianGroup>, matrix: IntMatrix) -> Self {
        Self {
            domain: Arc::clone(domain),
            matrix,
        }
    }

    /// The identity automorphism of `domain`.
    pub fn identity(domain: &Arc<AbelianGroup>) -> Self {
        let mat = reduce_modulo(&matrix::identity(domain.ngens()), domain.gens_orders());
        Self::from_canonical(domain, mat)
    }

    /// Constructs an automorphism from the images of the generators of `domain`.
    ///
    /// # Errors
    ///
    /// Errors if the images cannot be coerced into `domain` or do not define an automorphism.
    pub fn from_images(
        domain: &Arc<AbelianGroup>,
        images: &[AbelianGroupElement],
    ) -> Result<Self, AutomorphismError> {
        let mat = matrix_codec::to_matrix(domain, images)?;
        Self::from_matrix(domain, &mat)
    }

    /// Constructs an automorphism from an integer matrix whose rows are the exponent vectors of the
    /// generator images.
    ///
    /// # Errors
    ///
    /// Errors if `mat` has the wrong shape or does not define an automorphism.
    pub fn from_matrix(
        domain: &Arc<AbelianGroup>,
        mat: &IntMatrix,
    ) -> Result<Self, AutomorphismError> {
        let canonical = matrix_codec::from_matrix(domain, mat)?;
        Ok(Self::from_canonical(domain, canonical))
    }

    /// Constructs an automorphism from nested rows.
    ///
    /// # Errors
    ///
    /// Errors if the rows are ragged or do not define an automorphism.
    pub fn from_matrix_rows(
        domain: &Arc<AbelianGroup>,
        rows: &[Vec<i64>],
    ) -> Result<Self, AutomorphismError> {
        let mat = from_rows(rows).ok_or_else(|| {
            AutomorphismError::DomainError(format!("The rows `{rows:?}` do not form a matrix."))
        })?;
        Self::from_matrix(domain, &mat)
    }

    /// Constructs an automorphism from an additive module endomorphism.
    ///
    /// # Errors
    ///
    /// * [`AutomorphismError::DomainError`] if the domain invariants of `morphism` differ from the
    /// generator orders of `domain`, or the images have the wrong shape.
    /// * [`AutomorphismError::NotAutomorphism`] if the domain and codomain of `morphism` differ,
    /// if its images do not respect the generator orders, or if its kernel is non-trivial.
    pub fn from_module_morphism(
        domain: &Arc<AbelianGroup>,
        morphism: &ModuleMorphism,
    ) -> Result<Self, AutomorphismError> {
        if morphism.domain_invariants() != domain.gens_orders() {
            return Err(AutomorphismError::DomainError(format!(
                "invariants of domains must agree: {:?} versus {:?}",
                morphism.domain_invariants(),
                domain.gens_orders()
            )));
        }
        if !morphism.is_endomorphism() {
            return Err(AutomorphismError::NotAutomorphism(
                "domain and codomain do not agree".to_string(),
            ));
        }
        let images = morphism
            .images()
            .iter()
            .map(|image| domain.element(image))
            .collect::<Result<Vec<_>, _>>()?;
        let mat = matrix_codec::to_matrix(domain, &images)?;
        let is_homomorphism = is_homomorphism_matrix(&mat, domain.gens_orders());
        Self::from_matrix(domain, &mat).map_err(|err| match err {
            AutomorphismError::NotAutomorphism(_) if is_homomorphism => {
                AutomorphismError::NotAutomorphism(format!(
                    "the kernel of the morphism with images {:?} is not trivial",
                    morphism.images()
                ))
            }
            other => other,
        })
    }

    /// The domain of this automorphism.
    pub fn domain(&self) -> &Arc<AbelianGroup> {
        &self.domain
    }

    /// The canonical matrix defining this automorphism.
    ///
    /// The $`i`$th row is the exponent vector of the image of the $`i`$th generator.
    pub fn matrix(&self) -> &IntMatrix {
        &self.matrix
    }

    /// Returns `true` if this is the identity automorphism.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity(&self.domain)
    }

    /// Returns the image of an element under this automorphism.
    ///
    /// # Errors
    ///
    /// Errors if `x` cannot be coerced into the domain.
    pub fn apply(&self, x: &AbelianGroupElement) -> Result<AbelianGroupElement, AutomorphismError> {
        let x = self.domain.coerce(x)?;
        self.apply_exponents(x.exponents())
    }

    /// Returns the image of the element with the given exponent vector under this automorphism.
    ///
    /// # Errors
    ///
    /// Errors if the length of `exponents` differs from the number of generators, or if an
    /// exponent in an infinite factor overflows.
    pub fn apply_exponents(
        &self,
        exponents: &[i64],
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        let x = self.domain.element(exponents)?;
        let image = vecmat_reduced(
            ArrayView1::from(x.exponents()),
            &self.matrix,
            self.domain.gens_orders(),
        )?;
        self.domain.element(&image.to_vec())
    }

    /// Checks that two automorphisms act on the same domain.
    fn check_domain(&self, other: &Self) -> Result<(), AutomorphismError> {
        if self.domain.gens_orders() == other.domain.gens_orders() {
            Ok(())
        } else {
            Err(AutomorphismError::DomainError(format!(
                "automorphisms of {} and of {} cannot be combined",
                self.domain, other.domain
            )))
        }
    }

    /// Returns the composition $`\mathrm{self} \circ \mathrm{other}`$, which applies `other` first
    /// and then `self`.
    ///
    /// # Errors
    ///
    /// Errors if the two automorphisms have different domains, or if an entry in an infinite
    /// factor overflows.
    pub fn compose(&self, other: &Self) -> Result<Self, AutomorphismError> {
        self.check_domain(other)?;
        Ok(Self::from_canonical(
            &self.domain,
            matmul_reduced(&other.matrix, &self.matrix, self.domain.gens_orders())?,
        ))
    }

    /// Returns the `k`th power of this automorphism by repeated squaring.
    fn power(&self, mut k: u64) -> Result<Self, AutomorphismError> {
        let orders = self.domain.gens_orders();
        let mut result = Self::identity(&self.domain);
        let mut base = self.matrix.clone();
        while k > 0 {
            if k & 1 == 1 {
                result.matrix = matmul_reduced(&result.matrix, &base, orders)?;
            }
            k >>= 1;
            if k > 0 {
                base = matmul_reduced(&base, &base, orders)?;
            }
        }
        Ok(result)
    }

    /// An upper bound for the order of any automorphism of the domain.
    ///
    /// An automorphism is determined by the images of the $`n`$ generators, so there are at most
    /// $`|G|^n`$ of them.
    fn order_bound(&self) -> u64 {
        let group_order = self.domain.order().unwrap_or(u64::MAX);
        (0..self.domain.ngens()).fold(1u64, |acc, _| acc.saturating_mul(group_order))
    }

    /// The order of this automorphism, *i.e.* the smallest positive $`k`$ such that the $`k`$th
    /// power is the identity.
    ///
    /// The powers are visited one by one, so this takes time linear in the order. [`Self::inverse`]
    /// does not depend on it.
    ///
    /// # Errors
    ///
    /// Errors if no such $`k`$ is found within the bound on automorphism orders, which means that
    /// the matrix is not invertible.
    pub fn order(&self) -> Result<u64, AutomorphismError> {
        let identity = Self::identity(&self.domain);
        let bound = self.order_bound();
        let mut current = self.clone();
        let mut k = 1u64;
        while current != identity {
            if k >= bound {
                return Err(AutomorphismError::NotAutomorphism(format!(
                    "no power of {self} up to {bound} is the identity"
                )));
            }
            current = self.compose(&current)?;
            k += 1;
        }
        Ok(k)
    }

    /// Returns the inverse automorphism.
    ///
    /// The inverse matrix is solved for directly modulo the exponent of the domain, see
    /// [`matrix::inverse_modulo`].
    ///
    /// # Errors
    ///
    /// Errors if this automorphism is not invertible, which cannot happen for validated
    /// automorphisms of domains whose exponent fits into `u64`.
    pub fn inverse(&self) -> Result<Self, AutomorphismError> {
        if self.is_identity() {
            return Ok(self.clone());
        }
        let inverse = inverse_modulo(&self.matrix, self.domain.gens_orders())?;
        Ok(Self::from_canonical(&self.domain, inverse))
    }

    /// Returns the images of the generators of the domain.
    pub fn images(&self) -> Result<Vec<AbelianGroupElement>, AutomorphismError> {
        to_rows(&self.matrix)
            .iter()
            .map(|row| self.domain.element(row))
            .collect()
    }
}

impl PartialEq for Automorphism {
    fn eq(&self, other: &Self) -> bool {
        self.domain.gens_orders() == other.domain.gens_orders() && self.matrix == other.matrix
    }
}

impl Eq for Automorphism {}

impl Hash for Automorphism {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.gens_orders().hash(state);
        self.matrix.hash(state);
    }
}

impl fmt::Display for Automorphism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gens = self.domain.gens().iter().map(ToString::to_string).join(", ");
        let images = self
            .images()
            .map_err(|_| fmt::Error)?
            .iter()
            .map(ToString::to_string)
            .join(", ");
        write!(f, "[{gens}] -> [{images}]")
    }
}

impl TryFrom<AutomorphismRecord> for Automorphism {
    type Error = AutomorphismError;

    fn try_from(record: AutomorphismRecord) -> Result<Self, Self::Error> {
        let domain = AbelianGroup::new(&record.domain)?;
        Self::from_matrix_rows(&domain, &record.matrix)
    }
}

impl From<Automorphism> for AutomorphismRecord {
    fn from(aut: Automorphism) -> Self {
        Self {
            domain: aut.domain.gens_orders().to_vec(),
            matrix: to_rows(&aut.matrix),
        }
    }
}

// ---
// Mul
// ---
impl Mul<&'_ Automorphism> for &Automorphism {
    type Output = Automorphism;

    /// Applies `self` first and then `rhs`.
    ///
    /// # Panics
    ///
    /// Panics if the two automorphisms have different domains.
    fn mul(self, rhs: &Automorphism) -> Self::Output {
        rhs.compose(self)
            .unwrap_or_else(|err| panic!("Unable to multiply `{self}` and `{rhs}`: {err}"))
    }
}

impl Mul<&'_ Automorphism> for Automorphism {
    type Output = Automorphism;

    fn mul(self, rhs: &Automorphism) -> Self::Output {
        &self * rhs
    }
}

impl Mul<Automorphism> for Automorphism {
    type Output = Automorphism;

    fn mul(self, rhs: Automorphism) -> Self::Output {
        &self * &rhs
    }
}

impl Mul<Automorphism> for &Automorphism {
    type Output = Automorphism;

    fn mul(self, rhs: Automorphism) -> Self::Output {
        self * &rhs
    }
}

// ---
// Inv
// ---
impl Inv for &Automorphism {
    type Output = Automorphism;

    /// # Panics
    ///
    /// Panics if the automorphism is not invertible.
    fn inv(self) -> Self::Output {
        self.inverse()
            .unwrap_or_else(|err| panic!("Unable to invert `{self}`: {err}"))
    }
}

impl Inv for Automorphism {
    type Output = Automorphism;

    fn inv(self) -> Self::Output {
        (&self).inv()
    }
}

// ---
// Pow
// ---
impl Pow<i32> for &Automorphism {
    type Output = Automorphism;

    /// # Panics
    ///
    /// Panics if the automorphism is not invertible and `rhs` is negative.
    fn pow(self, rhs: i32) -> Self::Output {
        let k = u64::from(rhs.unsigned_abs());
        let result = if rhs >= 0 {
            self.power(k)
        } else {
            self.inverse().and_then(|inv| inv.power(k))
        };
        result.unwrap_or_else(|err| panic!("Unable to raise `{self}` to the power {rhs}: {err}"))
    }
}

impl Pow<i32> for Automorphism {
    type Output = Automorphism;

    fn pow(self, rhs: i32) -> Self::Output {
        (&self).pow(rhs)
    }
}
