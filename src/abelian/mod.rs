use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;
use std::sync::Arc;

use derive_builder::Builder;
use itertools::Itertools;
use num::integer::gcd;
use num_modular::{ModularCoreOps, ModularUnaryOps};
use num_traits::{Inv, Pow};

use crate::error::AutomorphismError;


// ==================
// Struct definitions
// ==================

/// A structure to manage finitely generated abelian groups given as direct products of cyclic
/// factors.
///
/// The group is written multiplicatively with generators $`f_1, \ldots, f_n`$. A generator order
/// of `0` denotes an infinite cyclic factor.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Hash)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct AbelianGroup {
    /// The orders of the generators.
    #[builder(setter(custom))]
    gens_orders: Vec<u64>,
}

impl AbelianGroupBuilder {
    fn gens_orders(&mut self, orders: &[u64]) -> &mut Self {
        self.gens_orders = Some(orders.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        let orders = self
            .gens_orders
            .as_ref()
            .ok_or_else(|| "Generator orders have not been set.".to_string())?;
        if let Some(order) = orders.iter().find(|&&order| i64::try_from(order).is_err()) {
            Err(format!("Generator order `{order}` is too large to be represented."))
        } else {
            Ok(())
        }
    }
}

/// An element of an [`AbelianGroup`], stored as its canonical exponent vector.
#[derive(Clone, Debug)]
pub struct AbelianGroupElement {
    /// The group to which this element belongs.
    group: Arc<AbelianGroup>,

    /// The canonical exponents of this element with respect to the generators of
    /// [`Self::group`]. Each exponent lies in $`[0, n_i)`$ for a finite generator order $`n_i`$.
    exponents: Vec<i64>,
}

/// Reduces an exponent modulo a generator order. Infinite orders leave the exponent untouched.
pub(crate) fn reduce_exponent(exponent: i64, order: u64) -> i64 {
    if order == 0 {
        exponent
    } else {
        // Orders are validated to fit into `i64` on construction.
        #[allow(clippy::cast_possible_wrap)]
        let modulus = order as i64;
        exponent.rem_euclid(modulus)
    }
}

/// Returns the residue of an exponent modulo a finite generator order.
fn residue(exponent: i64, order: u64) -> u64 {
    reduce_exponent(exponent, order).unsigned_abs()
}

/// Converts a residue modulo a finite generator order back into an exponent.
// Residues lie below an order that fits into `i64`.
#[allow(clippy::cast_possible_wrap)]
fn from_residue(residue: u64) -> i64 {
    residue as i64
}

/// Adds two exponents of a generator of the given order, reducing modulo the order.
///
/// Returns `None` if the order is infinite and the sum overflows.
pub(crate) fn add_exponents(a: i64, b: i64, order: u64) -> Option<i64> {
    if order == 0 {
        a.checked_add(b)
    } else {
        Some(from_residue(
            residue(a, order).addm(residue(b, order), &order),
        ))
    }
}

/// Multiplies two exponents of a generator of the given order, reducing modulo the order.
///
/// Returns `None` if the order is infinite and the product overflows.
pub(crate) fn mul_exponents(a: i64, b: i64, order: u64) -> Option<i64> {
    if order == 0 {
        a.checked_mul(b)
    } else {
        Some(from_residue(
            residue(a, order).mulm(residue(b, order), &order),
        ))
    }
}

/// Negates an exponent of a generator of the given order, reducing modulo the order.
///
/// Returns `None` if the order is infinite and the negation overflows.
fn neg_exponent(a: i64, order: u64) -> Option<i64> {
    if order == 0 {
        a.checked_neg()
    } else {
        Some(from_residue(residue(a, order).negm(&order)))
    }
}

/// Least common multiple of two integers, or `None` if it does not fit into `u64`.
fn checked_lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        Some(0)
    } else {
        (a / gcd(a, b)).checked_mul(b)
    }
}

/// The least common multiple of a list of finite generator orders, or `None` if it does not fit
/// into `u64`. Every finite abelian group with these generator orders is annihilated by it.
pub(crate) fn checked_exponent(orders: &[u64]) -> Option<u64> {
    orders
        .iter()
        .try_fold(1u64, |acc, &n| checked_lcm(acc, n))
}

// =====================
// Struct implementations
// =====================

impl AbelianGroup {
    /// Returns a builder to construct a new abelian group.
    fn builder() -> AbelianGroupBuilder {
        AbelianGroupBuilder::default()
    }

    /// Constructs a shared abelian group from the orders of its generators.
    ///
    /// # Arguments
    ///
    /// * `orders` - The generator orders. An order of `0` denotes $`\mathbb{Z}`$, and an order of
    /// `1` denotes a trivial factor.
    ///
    /// # Errors
    ///
    /// Errors if an order cannot be represented as a signed 64-bit integer.
    pub fn new(orders: &[u64]) -> Result<Arc<Self>, AutomorphismError> {
        Self::builder()
            .gens_orders(orders)
            .build()
            .map(Arc::new)
            .map_err(|err| AutomorphismError::DomainError(err.to_string()))
    }

    /// The number of generators.
    pub fn ngens(&self) -> usize {
        self.gens_orders.len()
    }

    /// The orders of the generators.
    pub fn gens_orders(&self) -> &[u64] {
        &self.gens_orders
    }

    /// Returns the order of the `i`th generator.
    ///
    /// # Errors
    ///
    /// Errors if there is no `i`th generator.
    pub fn order_of(&self, i: usize) -> Result<u64, AutomorphismError> {
        self.gens_orders.get(i).copied().ok_or_else(|| {
            AutomorphismError::DomainError(format!(
                "Generator index `{i}` is out of range for a group with {} generators.",
                self.ngens()
            ))
        })
    }

    /// Returns `true` if all generators have finite orders.
    pub fn is_finite(&self) -> bool {
        self.gens_orders.iter().all(|&order| order > 0)
    }

    /// The order of the group, or `None` if the group is infinite or its order does not fit into
    /// `u64`.
    pub fn order(&self) -> Option<u64> {
        if self.is_finite() {
            self.gens_orders
                .iter()
                .try_fold(1u64, |acc, &n| acc.checked_mul(n))
        } else {
            None
        }
    }

    /// The exponent of the group, *i.e.* the least common multiple of the generator orders, or
    /// `None` if the group is infinite or its exponent does not fit into `u64`.
    pub fn exponent(&self) -> Option<u64> {
        if self.is_finite() {
            checked_exponent(&self.gens_orders)
        } else {
            None
        }
    }

    /// Applies an exponent operation generator by generator, failing if an infinite factor
    /// overflows.
    fn combine_exponents<F>(
        self: &Arc<Self>,
        exponents: &[i64],
        op: F,
    ) -> Result<AbelianGroupElement, AutomorphismError>
    where
        F: Fn(usize, i64, u64) -> Option<i64>,
    {
        let combined = exponents
            .iter()
            .zip(self.gens_orders.iter())
            .enumerate()
            .map(|(i, (&e, &n))| {
                op(i, e, n).ok_or_else(|| {
                    AutomorphismError::DomainError(format!(
                        "The exponent of generator {} overflows in the infinite factor of {self}.",
                        i + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.element(&combined)
    }

    /// Reduces an arbitrary exponent vector into canonical form.
    fn canonicalise(&self, exponents: &[i64]) -> Result<Vec<i64>, AutomorphismError> {
        if exponents.len() != self.ngens() {
            return Err(AutomorphismError::DomainError(format!(
                "The exponent vector `{exponents:?}` has length {}, but the group {self} has {} generators.",
                exponents.len(),
                self.ngens()
            )));
        }
        Ok(exponents
            .iter()
            .zip(self.gens_orders.iter())
            .map(|(&e, &n)| reduce_exponent(e, n))
            .collect())
    }

    /// Constructs an element of this group from an exponent vector.
    ///
    /// Each exponent is reduced modulo the order of its generator.
    ///
    /// # Errors
    ///
    /// Errors if the length of `exponents` differs from the number of generators.
    pub fn element(
        self: &Arc<Self>,
        exponents: &[i64],
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        let exponents = self.canonicalise(exponents)?;
        Ok(AbelianGroupElement {
            group: Arc::clone(self),
            exponents,
        })
    }

    /// Coerces an element of a group with the same generator orders into this group.
    ///
    /// # Errors
    ///
    /// Errors if the generator orders of the two groups do not agree.
    pub fn coerce(
        self: &Arc<Self>,
        element: &AbelianGroupElement,
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        if element.group.gens_orders != self.gens_orders {
            return Err(AutomorphismError::DomainError(format!(
                "{element} of {} cannot be coerced into {self}.",
                element.group
            )));
        }
        self.element(&element.exponents)
    }

    /// The identity element.
    pub fn identity(self: &Arc<Self>) -> AbelianGroupElement {
        AbelianGroupElement {
            group: Arc::clone(self),
            exponents: vec![0; self.ngens()],
        }
    }

    /// Returns the `i`th generator.
    ///
    /// # Errors
    ///
    /// Errors if there is no `i`th generator.
    pub fn gen(self: &Arc<Self>, i: usize) -> Result<AbelianGroupElement, AutomorphismError> {
        self.order_of(i)?;
        let mut exponents = vec![0; self.ngens()];
        exponents[i] = 1;
        self.element(&exponents)
    }

    /// Returns all generators.
    pub fn gens(self: &Arc<Self>) -> Vec<AbelianGroupElement> {
        (0..self.ngens())
            .map(|i| {
                let mut exponents = vec![0; self.ngens()];
                exponents[i] = reduce_exponent(1, self.gens_orders[i]);
                AbelianGroupElement {
                    group: Arc::clone(self),
                    exponents,
                }
            })
            .collect()
    }

    /// Returns the product of all generators.
    pub fn an_element(self: &Arc<Self>) -> AbelianGroupElement {
        self.gens()
            .iter()
            .fold(self.identity(), |acc, gen| &acc * gen)
    }

    /// Enumerates all elements of this group in lexicographic order of their exponent vectors.
    ///
    /// # Errors
    ///
    /// Errors if the group is infinite.
    pub fn elements(self: &Arc<Self>) -> Result<Vec<AbelianGroupElement>, AutomorphismError> {
        if !self.is_finite() {
            return Err(AutomorphismError::UnsupportedDomain(format!(
                "the elements of the infinite group {self} cannot be enumerated"
            )));
        }
        if self.ngens() == 0 {
            return Ok(vec![self.identity()]);
        }
        Ok(self
            .gens_orders
            .iter()
            .map(|&n| {
                #[allow(clippy::cast_possible_wrap)]
                let n = n as i64;
                0..n
            })
            .multi_cartesian_product()
            .map(|exponents| AbelianGroupElement {
                group: Arc::clone(self),
                exponents,
            })
            .collect())
    }

    /// Checks that an element belongs to a group with the same generator orders.
    fn check_membership(&self, element: &AbelianGroupElement) -> Result<(), AutomorphismError> {
        if element.group.gens_orders == self.gens_orders {
            Ok(())
        } else {
            Err(AutomorphismError::DomainError(format!(
                "{element} does not belong to {self}."
            )))
        }
    }

    /// Multiplies two elements of this group.
    ///
    /// # Errors
    ///
    /// Errors if either element belongs to a different group, or if an exponent in an infinite
    /// factor overflows.
    pub fn multiply(
        self: &Arc<Self>,
        a: &AbelianGroupElement,
        b: &AbelianGroupElement,
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        self.check_membership(a)?;
        self.check_membership(b)?;
        self.combine_exponents(&a.exponents, |i, x, n| {
            add_exponents(x, b.exponents[i], n)
        })
    }

    /// Returns the inverse of an element of this group.
    ///
    /// # Errors
    ///
    /// Errors if the element belongs to a different group, or if an exponent in an infinite factor
    /// overflows.
    pub fn inverse(
        self: &Arc<Self>,
        a: &AbelianGroupElement,
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        self.check_membership(a)?;
        self.combine_exponents(&a.exponents, |_, x, n| neg_exponent(x, n))
    }

    /// Returns the `k`th power of an element of this group.
    ///
    /// # Errors
    ///
    /// Errors if the element belongs to a different group, or if an exponent in an infinite factor
    /// overflows.
    pub fn power(
        self: &Arc<Self>,
        a: &AbelianGroupElement,
        k: i64,
    ) -> Result<AbelianGroupElement, AutomorphismError> {
        self.check_membership(a)?;
        self.combine_exponents(&a.exponents, |_, x, n| mul_exponents(x, k, n))
    }

    /// Returns the canonical exponent vector of an element of this group.
    ///
    /// # Errors
    ///
    /// Errors if the element belongs to a different group.
    pub fn exponents(&self, a: &AbelianGroupElement) -> Result<Vec<i64>, AutomorphismError> {
        self.check_membership(a)?;
        Ok(a.exponents.clone())
    }
}

impl fmt::Display for AbelianGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Abelian group with generator orders ({})",
            self.gens_orders.iter().map(u64::to_string).join(", ")
        )
    }
}

impl AbelianGroupElement {
    /// The group to which this element belongs.
    pub fn group(&self) -> &Arc<AbelianGroup> {
        &self.group
    }

    /// The canonical exponent vector of this element.
    pub fn exponents(&self) -> &[i64] {
        &self.exponents
    }

    /// Returns `true` if this is the identity element.
    pub fn is_identity(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    /// The order of this element, or `None` if it has infinite order or an order that does not fit
    /// into `u64`.
    pub fn order(&self) -> Option<u64> {
        self.exponents
            .iter()
            .zip(self.group.gens_orders.iter())
            .try_fold(1u64, |acc, (&e, &n)| {
                if e == 0 {
                    Some(acc)
                } else if n == 0 {
                    None
                } else {
                    let e = e.unsigned_abs();
                    checked_lcm(acc, n / gcd(e, n))
                }
            })
    }
}

impl PartialEq for AbelianGroupElement {
    fn eq(&self, other: &Self) -> bool {
        self.group.gens_orders == other.group.gens_orders && self.exponents == other.exponents
    }
}

impl Eq for AbelianGroupElement {}

impl Hash for AbelianGroupElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.gens_orders.hash(state);
        self.exponents.hash(state);
    }
}

impl fmt::Display for AbelianGroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            write!(f, "1")
        } else {
            let terms = self
                .exponents
                .iter()
                .enumerate()
                .filter(|(_, &e)| e != 0)
                .map(|(i, &e)| {
                    if e == 1 {
                        format!("f{}", i + 1)
                    } else {
                        format!("f{}^{e}", i + 1)
                    }
                })
                .join("*");
            write!(f, "{terms}")
        }
    }
}

// ---
// Mul
// ---
impl Mul<&'_ AbelianGroupElement> for &AbelianGroupElement {
    type Output = AbelianGroupElement;

    /// # Panics
    ///
    /// Panics if the two elements belong to groups with different generator orders.
    fn mul(self, rhs: &AbelianGroupElement) -> Self::Output {
        self.group
            .multiply(self, rhs)
            .unwrap_or_else(|err| panic!("Unable to multiply `{self}` and `{rhs}`: {err}"))
    }
}

impl Mul<&'_ AbelianGroupElement> for AbelianGroupElement {
    type Output = AbelianGroupElement;

    fn mul(self, rhs: &AbelianGroupElement) -> Self::Output {
        &self * rhs
    }
}

impl Mul<AbelianGroupElement> for AbelianGroupElement {
    type Output = AbelianGroupElement;

    fn mul(self, rhs: AbelianGroupElement) -> Self::Output {
        &self * &rhs
    }
}

impl Mul<AbelianGroupElement> for &AbelianGroupElement {
    type Output = AbelianGroupElement;

    fn mul(self, rhs: AbelianGroupElement) -> Self::Output {
        self * &rhs
    }
}

// ---
// Inv
// ---
impl Inv for &AbelianGroupElement {
    type Output = AbelianGroupElement;

    /// # Panics
    ///
    /// Panics if an exponent in an infinite factor overflows.
    fn inv(self) -> Self::Output {
        self.group
            .inverse(self)
            .unwrap_or_else(|err| panic!("Unable to invert `{self}`: {err}"))
    }
}

impl Inv for AbelianGroupElement {
    type Output = AbelianGroupElement;

    fn inv(self) -> Self::Output {
        (&self).inv()
    }
}

// ---
// Pow
// ---
impl Pow<i32> for &AbelianGroupElement {
    type Output = AbelianGroupElement;

    /// # Panics
    ///
    /// Panics if an exponent in an infinite factor overflows.
    fn pow(self, rhs: i32) -> Self::Output {
        self.group
            .power(self, i64::from(rhs))
            .unwrap_or_else(|err| panic!("Unable to raise `{self}` to the power {rhs}: {err}"))
    }
}

impl Pow<i32> for AbelianGroupElement {
    type Output = AbelianGroupElement;

    fn pow(self, rhs: i32) -> Self::Output {
        (&self).pow(rhs)
    }
}
