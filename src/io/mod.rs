//! Persistence of automorphisms and automorphism groups.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_yaml;

pub(crate) mod format;

#[cfg(test)]
#[path = "io_tests.rs"]
mod io_tests;

/// A serialisable description of an automorphism: the generator orders of its domain and its
/// defining matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomorphismRecord {
    /// The generator orders of the domain.
    pub domain: Vec<u64>,

    /// The rows of the defining matrix.
    pub matrix: Vec<Vec<i64>>,
}

/// A serialisable description of an automorphism group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomorphismGroupRecord {
    /// The generator orders of the domain.
    pub domain: Vec<u64>,

    /// The matrices of the generators of a subgroup, or `None` for the full automorphism group.
    #[serde(default)]
    pub generators: Option<Vec<Vec<Vec<i64>>>>,
}

/// An enumerated type for `abelaut` file types.
pub enum AbelautFileType {
    /// Variant for binary files containing automorphism groups.
    Grp,

    /// Variant for binary files containing single automorphisms.
    Aut,
}

impl AbelautFileType {
    /// Returns the extension of the file type.
    pub fn ext(&self) -> String {
        match self {
            AbelautFileType::Grp => "abelaut.grp".to_string(),
            AbelautFileType::Aut => "abelaut.aut".to_string(),
        }
    }
}

/// Reads an `abelaut` binary file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (without `abelaut`-specific extensions).
/// * `file_type` - The type of the `abelaut` file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_abelaut_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: AbelautFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    log::debug!("Reading binary file {}...", path.display());
    let mut reader = BufReader::new(File::open(path).map_err(|err| format_err!(err))?);
    bincode::deserialize_from(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into an `abelaut` binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written (without `abelaut`-specific extensions).
/// * `file_type` - The type of the `abelaut` file to be written.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_abelaut_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: AbelautFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    log::debug!("Writing binary file {}...", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|err| format_err!(err))
}

/// Reads an `abelaut` YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_abelaut_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into an `abelaut` YAML file.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be written (without extensions). The resulting file
/// will have the `.yml` extension.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_abelaut_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension("yml");
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, value).map_err(|err| format_err!(err))
}
