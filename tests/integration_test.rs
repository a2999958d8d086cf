use std::sync::Arc;

use ndarray::array;
use num_traits::Inv;

use abelaut::abelian::AbelianGroup;
use abelaut::automorphism::{Automorphism, ModuleMorphism};
use abelaut::error::AutomorphismError;
use abelaut::group::class::ClassProperties;
use abelaut::group::{AutomorphismGroup, GroupProperties};
use abelaut::io::AutomorphismGroupRecord;

#[test]
fn test_aut_z2_z6() {
    let _ = env_logger::builder().is_test(true).try_init();
    let g = AbelianGroup::new(&[2, 6]).unwrap();
    let aut_g = AutomorphismGroup::full(&g).unwrap();
    assert_eq!(aut_g.order(), 12);
    assert!(Arc::ptr_eq(&aut_g, &AutomorphismGroup::full(&g).unwrap()));

    let f = aut_g.an_element();
    let x = g.an_element();
    let y = f.apply(&x).unwrap();
    assert_eq!((&f).inv().apply(&y).unwrap(), x);

    let reps = aut_g.conjugacy_classes_representatives();
    assert_eq!(reps.len(), aut_g.class_number());
    assert!(reps[0].is_identity());
}

#[test]
fn test_documented_automorphism_matrix() {
    let g = AbelianGroup::new(&[2, 3, 4]).unwrap();
    let images = [[1, 0, 2], [0, 2, 0], [1, 0, 1]]
        .iter()
        .map(|row| g.element(row).unwrap())
        .collect::<Vec<_>>();
    let f = Automorphism::from_images(&g, &images).unwrap();
    assert_eq!(f.matrix(), &array![[1, 0, 2], [0, 2, 0], [1, 0, 1]]);

    let aut_g = AutomorphismGroup::full(&g).unwrap();
    assert!(aut_g.contains(&f));
    let sub = aut_g.subgroup(&[f.clone()]).unwrap();
    assert!(sub.contains(&f));
    assert!(sub.is_subgroup_of(&aut_g));
}

#[test]
fn test_module_morphism_coercion() {
    let g = AbelianGroup::new(&[2, 10]).unwrap();
    let aut_g = AutomorphismGroup::full(&g).unwrap();
    let morphism = ModuleMorphism::endomorphism(&[2, 10], &[vec![1, 5], vec![0, 3]]);
    let f = aut_g.element_from_module_morphism(&morphism).unwrap();
    assert_eq!(f.matrix(), &array![[1, 5], [0, 3]]);
}

#[test]
fn test_infinite_domain_rejected() {
    let g = AbelianGroup::new(&[0]).unwrap();
    assert!(matches!(
        AutomorphismGroup::full(&g),
        Err(AutomorphismError::UnsupportedDomain(_))
    ));
}

#[test]
fn test_group_from_yaml_record() {
    let record: AutomorphismGroupRecord = serde_yaml::from_str(
        "domain: [2, 3, 4]\ngenerators:\n  - [[1, 0, 2], [0, 2, 0], [1, 0, 1]]\n",
    )
    .unwrap();
    let sub = AutomorphismGroup::from_record(&record).unwrap();
    assert!(!sub.is_full());
    assert_eq!(sub.order(), 4);
    assert_eq!(sub.to_record(), record);
}
