use std::collections::HashSet;

use itertools::Itertools;
use ndarray::Array2;

use crate::group::class::ClassStructure;

/// Builds the Cayley table of the symmetric group on `n` letters, with permutations enumerated in
/// lexicographic order so that the identity comes first.
fn symmetric_group_cayley_table(n: usize) -> Array2<usize> {
    let perms = (0..n).permutations(n).collect_vec();
    let order = perms.len();
    Array2::from_shape_fn((order, order), |(i, j)| {
        let prod = (0..n).map(|k| perms[j][perms[i][k]]).collect_vec();
        perms
            .iter()
            .position(|p| *p == prod)
            .expect("Symmetric group not closed.")
    })
}

#[test]
fn test_class_structure_cyclic() {
    let ctb = Array2::from_shape_fn((5, 5), |(i, j)| (i + j) % 5);
    let cs = ClassStructure::new(&ctb);
    assert!(cs.abelian);
    assert_eq!(cs.class_number(), 5);
    assert_eq!(cs.conjugacy_class_transversal, vec![0, 1, 2, 3, 4]);
    assert_eq!(cs.element_to_conjugacy_classes, vec![0, 1, 2, 3, 4]);
    assert_eq!(cs.inverse_conjugacy_classes, vec![0, 4, 3, 2, 1]);
}

#[test]
fn test_class_structure_s3() {
    let ctb = symmetric_group_cayley_table(3);
    let cs = ClassStructure::new(&ctb);
    assert!(!cs.abelian);
    assert_eq!(cs.class_number(), 3);
    assert_eq!(
        cs.conjugacy_classes,
        vec![
            HashSet::from([0]),
            HashSet::from([1, 2, 5]),
            HashSet::from([3, 4])
        ]
    );
    assert_eq!(cs.conjugacy_class_transversal, vec![0, 1, 3]);
    assert_eq!(cs.element_to_conjugacy_classes, vec![0, 1, 1, 2, 2, 1]);
    assert_eq!(cs.inverse_conjugacy_classes, vec![0, 1, 2]);

    let summary = cs.to_string();
    assert!(summary.contains("Number of classes: 3"));
    assert!(summary.contains("K1: size 3, representative #1"));
}

#[test]
fn test_class_structure_s4() {
    let ctb = symmetric_group_cayley_table(4);
    let cs = ClassStructure::new(&ctb);
    assert_eq!(cs.class_number(), 5);
    let sizes = cs
        .conjugacy_classes
        .iter()
        .map(HashSet::len)
        .sorted()
        .collect_vec();
    assert_eq!(sizes, vec![1, 3, 6, 6, 8]);
    assert_eq!(cs.conjugacy_classes[0], HashSet::from([0]));

    // Classes are ordered by their smallest element index.
    let transversal = &cs.conjugacy_class_transversal;
    assert!(transversal.windows(2).all(|w| w[0] < w[1]));
    for (cc, &rep) in cs.conjugacy_classes.iter().zip(transversal.iter()) {
        assert_eq!(cc.iter().min(), Some(&rep));
    }

    // Every element of the symmetric group is conjugate to its inverse.
    assert_eq!(cs.inverse_conjugacy_classes, (0..5).collect_vec());
}
