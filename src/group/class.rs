use std::collections::{BTreeSet, HashSet};
use std::fmt;

use derive_builder::Builder;
use itertools::Itertools;
use ndarray::{s, Array2};

use super::GroupProperties;
use crate::io::format::{nice_bool, write_subtitle};

#[cfg(test)]
#[path = "class_tests.rs"]
mod class_tests;

/// A structure to manage the conjugacy classes of a finite group whose elements are enumerated
/// in a fixed order, with the identity at index `0`.
#[derive(Builder, Clone, Debug)]
pub struct ClassStructure {
    /// A vector of conjugacy classes.
    ///
    /// Each element in the vector is a hashset containing the indices of the elements in the
    /// enumerated group for a particular conjugacy class. The classes are ordered by their
    /// smallest element index, so the class of the identity comes first.
    conjugacy_classes: Vec<HashSet<usize>>,

    /// The conjugacy class index of every element in the enumerated group.
    ///
    /// This is the so-called inverse map of [`Self::conjugacy_classes`].
    element_to_conjugacy_classes: Vec<usize>,

    /// The conjugacy class representatives of the group.
    ///
    /// Each element in the vector is the smallest element index in the corresponding conjugacy
    /// class, *i.e.* the first class member encountered in enumeration order.
    #[builder(setter(custom))]
    conjugacy_class_transversal: Vec<usize>,

    /// A vector containing the indices of inverse conjugacy classes.
    ///
    /// Each index gives the inverse conjugacy class for the corresponding conjugacy class.
    #[builder(setter(custom))]
    inverse_conjugacy_classes: Vec<usize>,

    /// Whether every conjugacy class is a singleton.
    abelian: bool,
}

impl ClassStructureBuilder {
    fn conjugacy_class_transversal(&mut self) -> &mut Self {
        self.conjugacy_class_transversal = Some(
            self.conjugacy_classes
                .as_ref()
                .expect("Conjugacy classes have not been found.")
                .iter()
                .map(|cc| {
                    *cc.iter()
                        .min()
                        .expect("No conjugacy classes can be empty.")
                })
                .collect::<Vec<usize>>(),
        );
        self
    }

    fn inverse_conjugacy_classes(&mut self, ctb: &Array2<usize>) -> &mut Self {
        log::debug!("Finding inverse conjugacy classes...");
        let ccs = self
            .conjugacy_classes
            .as_ref()
            .expect("Conjugacy classes have not been found.");
        let e2ccs = self
            .element_to_conjugacy_classes
            .as_ref()
            .expect("Map from element to conjugacy class has not been found.");
        let iccs = ccs
            .iter()
            .map(|cc| {
                let g = *cc.iter().next().expect("No conjugacy classes can be empty.");
                let g_inv = ctb
                    .slice(s![g, ..])
                    .iter()
                    .position(|&x| x == 0)
                    .unwrap_or_else(|| {
                        panic!("No identity element can be found in row `{g}` of Cayley table.")
                    });
                e2ccs[g_inv]
            })
            .collect_vec();
        self.inverse_conjugacy_classes = Some(iccs);
        log::debug!("Finding inverse conjugacy classes... Done.");
        self
    }
}

impl ClassStructure {
    /// Returns a builder to construct a new class structure.
    fn builder() -> ClassStructureBuilder {
        ClassStructureBuilder::default()
    }

    /// Constructs the class structure induced by the equivalence relation
    ///
    /// ```math
    ///     g \sim h \Leftrightarrow \exists u : h = u g u^{-1}.
    /// ```
    ///
    /// # Arguments
    ///
    /// * `ctb` - The Cayley table of the group, with the identity at index `0`. Entry `[i, j]`
    /// is the index of the product of elements `i` and `j`.
    ///
    /// # Returns
    ///
    /// A new class structure.
    pub(crate) fn new(ctb: &Array2<usize>) -> Self {
        log::debug!("Finding conjugacy classes...");
        let order = ctb.nrows();
        let abelian = *ctb == ctb.t();
        let (ccs, e2ccs) = if abelian {
            log::debug!("Abelian group found.");
            // Abelian group; each element is in its own conjugacy class.
            (
                (0usize..order)
                    .map(|i| HashSet::from([i]))
                    .collect::<Vec<_>>(),
                (0usize..order).collect::<Vec<_>>(),
            )
        } else {
            log::debug!("Non-Abelian group found.");
            let inverses = (0..order)
                .map(|s| {
                    ctb.slice(s![s, ..])
                        .iter()
                        .position(|&x| x == 0)
                        .unwrap_or_else(|| {
                            panic!("No identity element can be found in row `{s}` of Cayley table.")
                        })
                })
                .collect_vec();
            let mut ccs: Vec<HashSet<usize>> = vec![];
            let mut e2ccs = vec![0usize; order];
            let mut remaining_elements: BTreeSet<usize> = (0usize..order).collect();
            while let Some(g) = remaining_elements.pop_first() {
                // For a fixed g, collect s g s^(-1) for all s in the group.
                let mut cur_cc = HashSet::from([g]);
                for s in 0usize..order {
                    let h = ctb[[ctb[[s, g]], inverses[s]]];
                    if remaining_elements.remove(&h) {
                        cur_cc.insert(h);
                    }
                }
                ccs.push(cur_cc);
            }
            ccs.iter().enumerate().for_each(|(i, cc)| {
                cc.iter().for_each(|&j| e2ccs[j] = i);
            });
            (ccs, e2ccs)
        };
        log::debug!("Finding conjugacy classes... Done.");

        Self::builder()
            .conjugacy_classes(ccs)
            .element_to_conjugacy_classes(e2ccs)
            .abelian(abelian)
            .conjugacy_class_transversal()
            .inverse_conjugacy_classes(ctb)
            .build()
            .expect("Unable to construct a `ClassStructure`.")
    }

    /// Returns the number of conjugacy classes in the class structure.
    #[must_use]
    pub fn class_number(&self) -> usize {
        self.conjugacy_classes.len()
    }
}

impl fmt::Display for ClassStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Conjugacy classes")?;
        writeln!(f, "Abelian: {}", nice_bool(self.abelian))?;
        writeln!(f, "Number of classes: {}", self.class_number())?;
        for (i, (cc, rep)) in self
            .conjugacy_classes
            .iter()
            .zip(self.conjugacy_class_transversal.iter())
            .enumerate()
        {
            writeln!(f, "K{i}: size {}, representative #{rep}", cc.len())?;
        }
        Ok(())
    }
}

/// A trait for groups whose conjugacy classes can be determined.
pub trait ClassProperties: GroupProperties {
    /// Returns a shared reference to the underlying class structure of the group, computing it
    /// on first use.
    #[must_use]
    fn class_structure(&self) -> &ClassStructure;

    /// Returns a vector of hashsets, each containing indices of elements in the same conjugacy
    /// class.
    #[must_use]
    fn conjugacy_classes(&self) -> &Vec<HashSet<usize>> {
        &self.class_structure().conjugacy_classes
    }

    /// Returns the conjugacy class index of every element.
    #[must_use]
    fn element_to_conjugacy_classes(&self) -> &Vec<usize> {
        &self.class_structure().element_to_conjugacy_classes
    }

    /// Returns the element indices of the conjugacy class representatives.
    #[must_use]
    fn conjugacy_class_transversal(&self) -> &Vec<usize> {
        &self.class_structure().conjugacy_class_transversal
    }

    /// Returns a vector containing the indices of the inverse conjugacy classes.
    #[must_use]
    fn inverse_conjugacy_classes(&self) -> &Vec<usize> {
        &self.class_structure().inverse_conjugacy_classes
    }

    /// Returns the number of conjugacy classes in the group.
    #[must_use]
    fn class_number(&self) -> usize {
        self.class_structure().class_number()
    }

    /// Returns the size of a conjugacy class, or `None` if the class index is out of range.
    #[must_use]
    fn class_size(&self, cc_idx: usize) -> Option<usize> {
        self.conjugacy_classes().get(cc_idx).map(HashSet::len)
    }

    /// Returns the representative element of a conjugacy class.
    #[must_use]
    fn get_cc_transversal(&self, cc_idx: usize) -> Option<Self::GroupElement> {
        self.conjugacy_class_transversal()
            .get(cc_idx)
            .and_then(|&i| self.get_index(i))
            .cloned()
    }

    /// Returns the conjugacy class representatives in class order.
    #[must_use]
    fn conjugacy_classes_representatives(&self) -> Vec<Self::GroupElement> {
        (0..self.class_number())
            .filter_map(|cc_idx| self.get_cc_transversal(cc_idx))
            .collect()
    }
}
