use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use derive_builder::Builder;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use ndarray::{Array2, Zip};
use rand::Rng;

use crate::abelian::{AbelianGroup, AbelianGroupElement};
use crate::automorphism::{Automorphism, ModuleMorphism};
use crate::error::AutomorphismError;
use crate::io::format::{abelaut_output, log_subtitle, nice_bool, AbelautOutput};
use crate::io::AutomorphismGroupRecord;
use crate::matrix::{to_rows, IntMatrix};

pub mod class;
pub mod oracle;

use class::{ClassProperties, ClassStructure};
use oracle::{AutomorphismOracle, ExhaustiveOracle};


lazy_static! {
    /// Full automorphism groups that are still alive, keyed by the generator orders of their
    /// domains.
    static ref FULL_GROUP_REGISTRY: Mutex<HashMap<Vec<u64>, Weak<AutomorphismGroup>>> =
        Mutex::new(HashMap::new());
}

/// Source of the identifiers shared by a full automorphism group and all of its subgroups.
static NEXT_AMBIENT_ID: AtomicUsize = AtomicUsize::new(0);

// =================
// Trait definitions
// =================

/// A trait for finite groups whose elements are enumerated in a fixed order.
pub trait GroupProperties {
    /// The type of the elements in the group.
    type GroupElement: Clone + Hash + Eq + fmt::Debug + fmt::Display;

    /// Returns a name describing the group.
    fn name(&self) -> String;

    /// Returns all elements of the group. The identity is always the first element.
    fn elements(&self) -> &IndexSet<Self::GroupElement>;

    /// Returns the Cayley table of the group w.r.t. the order in [`Self::elements`].
    ///
    /// Entry `[i, j]` is the index of the product of elements `i` and `j`.
    fn cayley_table(&self) -> &Array2<usize>;

    /// The order of the group.
    fn order(&self) -> usize {
        self.elements().len()
    }

    /// Returns the element with index `i`, if any.
    fn get_index(&self, i: usize) -> Option<&Self::GroupElement> {
        self.elements().get_index(i)
    }

    /// Returns the index of an element, or `None` if it is not in the group.
    fn get_index_of(&self, g: &Self::GroupElement) -> Option<usize> {
        self.elements().get_index_of(g)
    }

    /// Checks if this group is Abelian.
    fn is_abelian(&self) -> bool {
        let ctb = self.cayley_table();
        ctb == ctb.t()
    }
}

// ==================
// Struct definitions
// ==================

/// An enumerated type to distinguish full automorphism groups from their subgroups.
#[derive(Clone, Debug)]
pub enum GroupKind {
    /// Variant for the full automorphism group of a domain.
    Full,

    /// Variant for a subgroup of a full automorphism group.
    Subgroup {
        /// The full automorphism group in which the subgroup lives.
        ambient: Arc<AutomorphismGroup>,
    },
}

/// A structure to manage groups of automorphisms of finite abelian groups.
///
/// A group is described by its generators. Its elements, Cayley table, and conjugacy classes are
/// only computed when first requested, and are then kept for the lifetime of the group.
///
/// Full automorphism groups are obtained from [`Self::full`], which returns the same shared
/// instance for equal domains for as long as that instance is alive. Subgroups are obtained from
/// [`Self::subgroup`] and are likewise shared per ambient group and generator list.
#[derive(Builder, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct AutomorphismGroup {
    /// The abelian group on which the automorphisms act.
    domain: Arc<AbelianGroup>,

    /// The generators of this group.
    generators: Vec<Automorphism>,

    /// Whether this is a full automorphism group or a subgroup of one.
    kind: GroupKind,

    /// An identifier shared by a full automorphism group and all of its subgroups.
    ambient_id: usize,

    /// All elements of this group, starting with the identity.
    #[builder(setter(skip), default = "OnceLock::new()")]
    elements: OnceLock<IndexSet<Automorphism>>,

    /// The Cayley table for this group w.r.t. the elements in [`Self::elements`].
    ///
    /// Entry `[i, j]` is the index of `&elements[i] * &elements[j]`, which applies element `i`
    /// first and then element `j`.
    #[builder(setter(skip), default = "OnceLock::new()")]
    cayley_table: OnceLock<Array2<usize>>,

    /// The conjugacy class structure of this group.
    #[builder(setter(skip), default = "OnceLock::new()")]
    class_structure: OnceLock<ClassStructure>,

    /// Subgroups of this group that are still alive, keyed by their generators.
    #[builder(setter(skip), default = "Mutex::new(HashMap::new())")]
    subgroup_cache: Mutex<HashMap<Vec<Automorphism>, Weak<AutomorphismGroup>>>,
}

impl AutomorphismGroupBuilder {
    fn validate(&self) -> Result<(), String> {
        let domain = self
            .domain
            .as_ref()
            .ok_or_else(|| "No domain found.".to_string())?;
        let generators = self
            .generators
            .as_ref()
            .ok_or_else(|| "No generators found.".to_string())?;
        match generators
            .iter()
            .find(|gen| gen.domain().gens_orders() != domain.gens_orders())
        {
            Some(gen) => Err(format!("The generator {gen} is not an automorphism of {domain}.")),
            None => Ok(()),
        }
    }
}

// ======================
// Struct implementations
// ======================

/// Returns all products of `generators` together with the identity of `domain`.
///
/// The elements are found breadth-first by right-multiplying known elements by generators, so the
/// identity comes first and the result is deterministic.
pub(crate) fn closure(
    domain: &Arc<AbelianGroup>,
    generators: &[Automorphism],
) -> IndexSet<Automorphism> {
    let mut elements = IndexSet::from([Automorphism::identity(domain)]);
    let mut i = 0;
    while let Some(g) = elements.get_index(i).cloned() {
        for gen in generators {
            elements.insert(&g * gen);
        }
        i += 1;
    }
    elements
}

impl AutomorphismGroup {
    /// Returns a builder to construct a new automorphism group.
    fn builder() -> AutomorphismGroupBuilder {
        AutomorphismGroupBuilder::default()
    }

    /// Checks that every generator of `domain` has a finite order.
    fn check_domain(domain: &AbelianGroup) -> Result<(), AutomorphismError> {
        if domain.is_finite() {
            Ok(())
        } else {
            Err(AutomorphismError::UnsupportedDomain(
                "only finite abelian groups are supported".to_string(),
            ))
        }
    }

    /// Returns the full automorphism group of `domain`.
    ///
    /// Calls with domains of equal generator orders return the same shared group for as long as
    /// that group is alive. The generators are computed once, when the group is first created.
    ///
    /// # Errors
    ///
    /// Errors with [`AutomorphismError::UnsupportedDomain`] if a generator of `domain` has
    /// infinite order.
    pub fn full(domain: &Arc<AbelianGroup>) -> Result<Arc<Self>, AutomorphismError> {
        Self::check_domain(domain)?;
        let key = domain.gens_orders().to_vec();
        let mut registry = FULL_GROUP_REGISTRY
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(group) = registry.get(&key).and_then(Weak::upgrade) {
            log::debug!("Reusing the full automorphism group of {domain}.");
            return Ok(group);
        }
        registry.retain(|_, group| group.strong_count() > 0);
        let group = Self::full_with_oracle(domain, &ExhaustiveOracle)?;
        registry.insert(key, Arc::downgrade(&group));
        Ok(group)
    }

    /// Constructs a new full automorphism group of `domain` whose generators are supplied by
    /// `oracle`. The process-wide cache used by [`Self::full`] is bypassed.
    ///
    /// # Errors
    ///
    /// Errors if `domain` is not finite, if the oracle fails, or if the oracle returns
    /// automorphisms of a different domain.
    pub fn full_with_oracle(
        domain: &Arc<AbelianGroup>,
        oracle: &dyn AutomorphismOracle,
    ) -> Result<Arc<Self>, AutomorphismError> {
        Self::check_domain(domain)?;
        log::debug!("Constructing the full automorphism group of {domain}...");
        let generators = oracle.automorphism_generators(domain)?;
        let group = Self::builder()
            .domain(Arc::clone(domain))
            .generators(generators)
            .kind(GroupKind::Full)
            .ambient_id(NEXT_AMBIENT_ID.fetch_add(1, Ordering::Relaxed))
            .build()
            .map_err(|err| AutomorphismError::DomainError(err.to_string()))?;
        log::debug!("Constructing the full automorphism group of {domain}... Done.");
        Ok(Arc::new(group))
    }

    /// Returns the subgroup generated by `generators`.
    ///
    /// The subgroup lives in the full automorphism group of this group, so that subgroups of
    /// subgroups are subgroups of the same ambient group. Equal generator lists give the same
    /// shared subgroup for as long as it is alive.
    ///
    /// # Errors
    ///
    /// Errors with [`AutomorphismError::DomainError`] if a generator acts on a different domain.
    pub fn subgroup(
        self: &Arc<Self>,
        generators: &[Automorphism],
    ) -> Result<Arc<Self>, AutomorphismError> {
        let ambient = self.ambient();
        let mut cache = ambient
            .subgroup_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(group) = cache.get(generators).and_then(Weak::upgrade) {
            return Ok(group);
        }
        cache.retain(|_, group| group.strong_count() > 0);
        let group = Arc::new(
            Self::builder()
                .domain(Arc::clone(&ambient.domain))
                .generators(generators.to_vec())
                .kind(GroupKind::Subgroup {
                    ambient: Arc::clone(&ambient),
                })
                .ambient_id(ambient.ambient_id)
                .build()
                .map_err(|err| AutomorphismError::DomainError(err.to_string()))?,
        );
        cache.insert(generators.to_vec(), Arc::downgrade(&group));
        Ok(group)
    }

    /// The abelian group on which the automorphisms act.
    pub fn domain(&self) -> &Arc<AbelianGroup> {
        &self.domain
    }

    /// Whether this is a full automorphism group or a subgroup of one.
    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    /// Returns `true` if this is a full automorphism group.
    pub fn is_full(&self) -> bool {
        matches!(self.kind, GroupKind::Full)
    }

    /// The full automorphism group in which this group lives.
    pub fn ambient(self: &Arc<Self>) -> Arc<Self> {
        match &self.kind {
            GroupKind::Full => Arc::clone(self),
            GroupKind::Subgroup { ambient } => Arc::clone(ambient),
        }
    }

    /// The generators of this group.
    pub fn generators(&self) -> &[Automorphism] {
        &self.generators
    }

    /// The generators of this group.
    pub fn gens(&self) -> &[Automorphism] {
        self.generators()
    }

    /// The number of generators.
    pub fn ngens(&self) -> usize {
        self.generators.len()
    }

    /// Returns the `i`th generator, if any.
    pub fn gen(&self, i: usize) -> Option<&Automorphism> {
        self.generators.get(i)
    }

    /// An identifier shared by a full automorphism group and all of its subgroups.
    pub fn ambient_id(&self) -> usize {
        self.ambient_id
    }

    /// The size of the square integer matrices representing the elements of this group.
    pub fn covering_matrix_dim(&self) -> usize {
        self.domain.ngens()
    }

    /// Returns `true` if `aut` is an element of this group.
    pub fn contains(&self, aut: &Automorphism) -> bool {
        aut.domain().gens_orders() == self.domain.gens_orders()
            && GroupProperties::elements(self).contains(aut)
    }

    /// Checks that an automorphism is an element of this group.
    fn check_element(&self, aut: Automorphism) -> Result<Automorphism, AutomorphismError> {
        if self.contains(&aut) {
            Ok(aut)
        } else {
            Err(AutomorphismError::NotAutomorphism(format!(
                "{aut} is not in the group ({self})"
            )))
        }
    }

    /// Constructs an element of this group from its defining matrix.
    ///
    /// # Errors
    ///
    /// Errors if the matrix does not define an automorphism of the domain, or if that automorphism
    /// is not in this group.
    pub fn element_from_matrix(&self, mat: &IntMatrix) -> Result<Automorphism, AutomorphismError> {
        self.check_element(Automorphism::from_matrix(&self.domain, mat)?)
    }

    /// Constructs an element of this group from the images of the generators of the domain.
    ///
    /// # Errors
    ///
    /// Errors if the images do not define an automorphism of the domain, or if that automorphism
    /// is not in this group.
    pub fn element_from_images(
        &self,
        images: &[AbelianGroupElement],
    ) -> Result<Automorphism, AutomorphismError> {
        self.check_element(Automorphism::from_images(&self.domain, images)?)
    }

    /// Constructs an element of this group from an additive module endomorphism.
    ///
    /// # Errors
    ///
    /// Errors if the morphism does not define an automorphism of the domain, or if that
    /// automorphism is not in this group.
    pub fn element_from_module_morphism(
        &self,
        morphism: &ModuleMorphism,
    ) -> Result<Automorphism, AutomorphismError> {
        self.check_element(Automorphism::from_module_morphism(&self.domain, morphism)?)
    }

    /// Returns the product of all generators, or the identity if there are none.
    pub fn an_element(&self) -> Automorphism {
        self.generators
            .iter()
            .fold(Automorphism::identity(&self.domain), |acc, gen| &acc * gen)
    }

    /// Returns an element of this group chosen uniformly at random.
    pub fn random_element<R: Rng>(&self, rng: &mut R) -> Automorphism {
        let elements = GroupProperties::elements(self);
        let i = rng.gen_range(0..elements.len());
        elements[i].clone()
    }

    /// Returns `true` if every element of this group lies in `other` and both groups live in the
    /// same full automorphism group.
    pub fn is_subgroup_of(&self, other: &Self) -> bool {
        self.ambient_id == other.ambient_id
            && self.generators.iter().all(|gen| other.contains(gen))
    }

    /// Returns `true` if elements of `other` can be regarded as elements of this group.
    pub fn coerce_map_from(&self, other: &Self) -> bool {
        other.is_subgroup_of(self)
    }

    /// Returns the conjugacy classes as lists of elements, in class order. Within each class, the
    /// elements follow the order in [`GroupProperties::elements`].
    pub fn conjugacy_class_elements(&self) -> Vec<Vec<Automorphism>> {
        let elements = GroupProperties::elements(self);
        self.conjugacy_classes()
            .iter()
            .map(|cc| {
                let mut indices = cc.iter().copied().collect::<Vec<_>>();
                indices.sort_unstable();
                indices
                    .into_iter()
                    .map(|i| elements[i].clone())
                    .collect()
            })
            .collect()
    }

    /// Returns a serialisable description of this group.
    pub fn to_record(&self) -> AutomorphismGroupRecord {
        AutomorphismGroupRecord {
            domain: self.domain.gens_orders().to_vec(),
            generators: match self.kind {
                GroupKind::Full => None,
                GroupKind::Subgroup { .. } => Some(
                    self.generators
                        .iter()
                        .map(|gen| to_rows(gen.matrix()))
                        .collect(),
                ),
            },
        }
    }

    /// Reconstructs a group from its serialisable description.
    ///
    /// # Errors
    ///
    /// Errors if the domain is not supported or a generator matrix does not define an
    /// automorphism.
    pub fn from_record(record: &AutomorphismGroupRecord) -> Result<Arc<Self>, AutomorphismError> {
        let domain = AbelianGroup::new(&record.domain)?;
        let full = Self::full(&domain)?;
        match &record.generators {
            None => Ok(full),
            Some(mats) => {
                let generators = mats
                    .iter()
                    .map(|rows| Automorphism::from_matrix_rows(&domain, rows))
                    .collect::<Result<Vec<_>, _>>()?;
                full.subgroup(&generators)
            }
        }
    }

    /// Logs a summary of this group to the `abelaut-output` logger.
    pub fn log_summary(&self) {
        log_subtitle(&self.to_string());
        abelaut_output!("Domain: {}", self.domain);
        abelaut_output!("Number of generators: {}", self.ngens());
        for (i, gen) in self.generators.iter().enumerate() {
            abelaut_output!("  g{}: {gen}", i + 1);
        }
        abelaut_output!("Order: {}", self.order());
        abelaut_output!("Abelian: {}", nice_bool(self.is_abelian()));
        abelaut_output!("");
        self.class_structure().log_output_display();
    }
}

impl GroupProperties for AutomorphismGroup {
    type GroupElement = Automorphism;

    fn name(&self) -> String {
        self.to_string()
    }

    fn elements(&self) -> &IndexSet<Automorphism> {
        self.elements.get_or_init(|| {
            log::debug!("Enumerating elements of the {self}...");
            let elements = closure(&self.domain, &self.generators);
            log::debug!(
                "Enumerating elements of the {self}... Done. {} elements found.",
                elements.len()
            );
            elements
        })
    }

    fn cayley_table(&self) -> &Array2<usize> {
        self.cayley_table.get_or_init(|| {
            log::debug!("Constructing Cayley table in parallel...");
            let elements = GroupProperties::elements(self);
            let order = elements.len();
            let mut ctb = Array2::<usize>::zeros((order, order));
            Zip::indexed(&mut ctb).par_for_each(|(i, j), k| {
                let op_k = &elements[i] * &elements[j];
                *k = elements.get_index_of(&op_k).unwrap_or_else(|| {
                    panic!(
                        "Group closure not fulfilled. The composition {} * {} = {op_k} is not contained in the group.",
                        elements[i], elements[j]
                    )
                });
            });
            log::debug!("Constructing Cayley table in parallel... Done.");
            ctb
        })
    }
}

impl ClassProperties for AutomorphismGroup {
    fn class_structure(&self) -> &ClassStructure {
        self.class_structure
            .get_or_init(|| ClassStructure::new(self.cayley_table()))
    }
}

impl fmt::Display for AutomorphismGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GroupKind::Full => write!(f, "Full group of automorphisms of {}", self.domain),
            GroupKind::Subgroup { .. } => write!(
                f,
                "Subgroup of automorphisms of {} generated by {} automorphisms",
                self.domain,
                self.ngens()
            ),
        }
    }
}
