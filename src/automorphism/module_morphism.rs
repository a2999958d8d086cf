use serde::{Deserialize, Serialize};

/// A homomorphism between finitely generated $`\mathbb{Z}`$-modules described in Smith form.
///
/// Each module is $`\mathbb{Z}/d_1 \oplus \cdots \oplus \mathbb{Z}/d_k`$ with the listed
/// invariants. The morphism is given by the images of the Smith-form generators of the domain,
/// expressed in the Smith-form coordinates of the codomain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleMorphism {
    /// The invariants of the domain module.
    domain_invariants: Vec<u64>,

    /// The invariants of the codomain module.
    codomain_invariants: Vec<u64>,

    /// The coordinates of the images of the domain generators.
    images: Vec<Vec<i64>>,
}

impl ModuleMorphism {
    /// Constructs a module morphism.
    ///
    /// # Arguments
    ///
    /// * `domain_invariants` - The invariants of the domain module.
    /// * `codomain_invariants` - The invariants of the codomain module.
    /// * `images` - The codomain coordinates of the images of the domain generators.
    pub fn new(domain_invariants: &[u64], codomain_invariants: &[u64], images: &[Vec<i64>]) -> Self {
        Self {
            domain_invariants: domain_invariants.to_vec(),
            codomain_invariants: codomain_invariants.to_vec(),
            images: images.to_vec(),
        }
    }

    /// Constructs a module endomorphism.
    pub fn endomorphism(invariants: &[u64], images: &[Vec<i64>]) -> Self {
        Self::new(invariants, invariants, images)
    }

    /// The invariants of the domain module.
    pub fn domain_invariants(&self) -> &[u64] {
        &self.domain_invariants
    }

    /// The invariants of the codomain module.
    pub fn codomain_invariants(&self) -> &[u64] {
        &self.codomain_invariants
    }

    /// The coordinate vectors of the images of the domain generators.
    pub fn images(&self) -> &[Vec<i64>] {
        &self.images
    }

    /// Returns `true` if the domain and codomain coincide.
    pub fn is_endomorphism(&self) -> bool {
        self.domain_invariants == self.codomain_invariants
    }
}
