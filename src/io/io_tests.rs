use std::env;
use std::fs;

use ndarray::array;

use crate::abelian::AbelianGroup;
use crate::automorphism::Automorphism;
use crate::group::AutomorphismGroup;
use crate::io::{
    read_abelaut_binary, read_abelaut_yaml, write_abelaut_binary, write_abelaut_yaml,
    AbelautFileType, AutomorphismGroupRecord, AutomorphismRecord,
};

#[test]
fn test_io_file_type_extensions() {
    assert_eq!(AbelautFileType::Grp.ext(), "abelaut.grp");
    assert_eq!(AbelautFileType::Aut.ext(), "abelaut.aut");
}

#[test]
fn test_io_automorphism_binary() {
    let g = AbelianGroup::new(&[2, 3, 4]).unwrap();
    let f = Automorphism::from_matrix(&g, &array![[1, 0, 2], [0, 2, 0], [1, 0, 1]]).unwrap();
    let name = env::temp_dir().join(format!("abelaut_io_aut_{}", std::process::id()));
    write_abelaut_binary(&name, AbelautFileType::Aut, &f).unwrap();
    let f2: Automorphism = read_abelaut_binary(&name, AbelautFileType::Aut).unwrap();
    assert_eq!(f, f2);

    let record: AutomorphismRecord = read_abelaut_binary(&name, AbelautFileType::Aut).unwrap();
    assert_eq!(record.domain, vec![2, 3, 4]);
    assert_eq!(
        record.matrix,
        vec![vec![1, 0, 2], vec![0, 2, 0], vec![1, 0, 1]]
    );

    let mut path = name.clone();
    path.set_extension(AbelautFileType::Aut.ext());
    fs::remove_file(path).unwrap();
    assert!(read_abelaut_binary::<Automorphism, _>(&name, AbelautFileType::Aut).is_err());
}

#[test]
fn test_io_group_record_yaml() {
    let g = AbelianGroup::new(&[2, 6]).unwrap();
    let aut_g = AutomorphismGroup::full(&g).unwrap();
    let f = Automorphism::from_matrix(&g, &array![[1, 3], [0, 5]]).unwrap();
    let sub = aut_g.subgroup(&[f]).unwrap();

    let name = env::temp_dir().join(format!("abelaut_io_grp_{}", std::process::id()));
    write_abelaut_yaml(&name, &sub.to_record()).unwrap();
    let mut path = name.clone();
    path.set_extension("yml");
    let record: AutomorphismGroupRecord = read_abelaut_yaml(&path).unwrap();
    assert_eq!(record, sub.to_record());
    assert_eq!(record.generators, Some(vec![vec![vec![1, 3], vec![0, 5]]]));

    let sub2 = AutomorphismGroup::from_record(&record).unwrap();
    assert!(std::sync::Arc::ptr_eq(&sub, &sub2));
    fs::remove_file(path).unwrap();

    let full_record: AutomorphismGroupRecord =
        serde_yaml::from_str("domain: [2, 6]\n").unwrap();
    assert_eq!(full_record.generators, None);
    let aut_g2 = AutomorphismGroup::from_record(&full_record).unwrap();
    assert!(std::sync::Arc::ptr_eq(&aut_g, &aut_g2));
}

#[test]
fn test_io_group_record_binary() {
    let g = AbelianGroup::new(&[3, 3]).unwrap();
    let aut_g = AutomorphismGroup::full(&g).unwrap();
    let name = env::temp_dir().join(format!("abelaut_io_grp_bin_{}", std::process::id()));
    write_abelaut_binary(&name, AbelautFileType::Grp, &aut_g.to_record()).unwrap();
    let record: AutomorphismGroupRecord =
        read_abelaut_binary(&name, AbelautFileType::Grp).unwrap();
    assert_eq!(
        record,
        AutomorphismGroupRecord {
            domain: vec![3, 3],
            generators: None
        }
    );
    let mut path = name.clone();
    path.set_extension(AbelautFileType::Grp.ext());
    fs::remove_file(path).unwrap();
}
