use std::sync::Arc;

use itertools::Itertools;
use ndarray::Array2;
use rayon::prelude::*;

use super::closure;
use crate::abelian::AbelianGroup;
use crate::automorphism::Automorphism;
use crate::error::AutomorphismError;
use crate::matrix::is_bijective_endomorphism;

/// A trait for sources of generating sets of full automorphism groups.
pub trait AutomorphismOracle {
    /// Returns a finite list of automorphisms of `domain` that generates its full automorphism
    /// group.
    ///
    /// # Errors
    ///
    /// Errors if `domain` is not supported by the oracle.
    fn automorphism_generators(
        &self,
        domain: &Arc<AbelianGroup>,
    ) -> Result<Vec<Automorphism>, AutomorphismError>;
}

/// An oracle that enumerates every automorphism of the domain and then extracts a small generating
/// set greedily.
///
/// The image of the $`i`$th generator must be an element $`x`$ with $`x^{n_i} = 1`$, so the
/// candidate matrices are the products of these restricted image sets. Candidates are visited in
/// lexicographic order and a candidate is kept as a generator only when it is not already in the
/// closure of the generators kept so far, which makes the result deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExhaustiveOracle;

impl ExhaustiveOracle {
    /// Enumerates all automorphisms of a finite domain in lexicographic order of their matrices.
    ///
    /// # Errors
    ///
    /// Errors if `domain` is infinite.
    pub fn automorphisms(
        &self,
        domain: &Arc<AbelianGroup>,
    ) -> Result<Vec<Automorphism>, AutomorphismError> {
        let elements = domain.elements()?;
        let orders = domain.gens_orders();
        let ngens = domain.ngens();
        if ngens == 0 {
            return Ok(vec![Automorphism::identity(domain)]);
        }

        log::debug!("Enumerating automorphisms of {domain} in parallel...");
        let candidate_images = orders
            .iter()
            .map(|&n| {
                elements
                    .iter()
                    .filter(|x| x.order().is_some_and(|ord| n % ord == 0))
                    .map(|x| x.exponents().to_vec())
                    .collect_vec()
            })
            .collect_vec();
        let candidates = candidate_images
            .iter()
            .multi_cartesian_product()
            .collect_vec();
        let auts = candidates
            .into_par_iter()
            .map(|rows| -> Result<Option<Automorphism>, AutomorphismError> {
                let entries = rows.into_iter().flatten().copied().collect_vec();
                let mat = Array2::from_shape_vec((ngens, ngens), entries)
                    .map_err(|err| AutomorphismError::DomainError(err.to_string()))?;
                Ok(is_bijective_endomorphism(&mat, orders)?
                    .then(|| Automorphism::from_canonical(domain, mat)))
            })
            .collect::<Result<Vec<_>, AutomorphismError>>()?
            .into_iter()
            .flatten()
            .collect_vec();
        log::debug!(
            "Enumerating automorphisms of {domain} in parallel... Done. {} automorphisms found.",
            auts.len()
        );
        Ok(auts)
    }
}

impl AutomorphismOracle for ExhaustiveOracle {
    fn automorphism_generators(
        &self,
        domain: &Arc<AbelianGroup>,
    ) -> Result<Vec<Automorphism>, AutomorphismError> {
        let auts = self.automorphisms(domain)?;
        let aut_order = auts.len();
        log::debug!("Extracting a generating set...");
        let mut generators: Vec<Automorphism> = vec![];
        let mut generated = closure(domain, &generators);
        for aut in auts {
            if generated.len() == aut_order {
                break;
            }
            if !generated.contains(&aut) {
                generators.push(aut);
                generated = closure(domain, &generators);
            }
        }
        log::debug!(
            "Extracting a generating set... Done. {} generators kept.",
            generators.len()
        );
        Ok(generators)
    }
}
