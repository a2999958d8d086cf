//! # abelaut: Automorphism groups of finite abelian groups
//!
//! abelaut is a library for computing with automorphisms of finite abelian groups written in Rust
//! with the following capabilities:
//! - construction of finite abelian groups as direct products of cyclic factors,
//! - representation of automorphisms by canonical integer matrices over generator exponent
//!   vectors,
//! - evaluation, composition, and inversion of automorphisms,
//! - enumeration of full automorphism groups and of their subgroups, and
//! - determination of conjugacy classes in automorphism groups.
//!
//! ## Conventions
//!
//! A finite abelian group $`G = \langle f_1 \rangle \times \cdots \times \langle f_n \rangle`$ is
//! given by the orders $`n_1, \ldots, n_n`$ of its generators. An element
//! $`f_1^{e_1} \cdots f_n^{e_n}`$ is stored as its exponent vector $`(e_1, \ldots, e_n)`$ with
//! $`0 \le e_i < n_i`$.
//!
//! An automorphism $`\phi`$ is stored as the $`n \times n`$ integer matrix $`\mathbf{M}`$ whose
//! $`i`$th row is the exponent vector of $`\phi(f_i)`$, so that an element with exponent row
//! vector $`\mathbf{e}`$ is mapped to $`\mathbf{e}\mathbf{M}`$. Products of automorphisms act on
//! the right: `&f * &g` applies `f` first, and its matrix is $`\mathbf{M}_f \mathbf{M}_g`$.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions. For more explanation, please consult this documentation.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod abelian;
pub mod automorphism;
pub mod error;
pub mod group;
pub mod io;
pub mod matrix;
