//! The type model for the IR pipeline: types, type constructor kinds,
//! structural subtyping, substitution, and the effect lattice.
//!
//! This crate has no notion of an expression or a declaration — see
//! `irc-ir` for the node model that uses these types.

pub mod con;
pub mod display;
pub mod effect;
pub mod error;
pub mod ops;
pub mod prim;
pub mod subst;
pub mod subtype;
pub mod ty;

pub use con::{ConId, ConTable, Kind};
pub use effect::Effect;
pub use error::TypeError;
pub use prim::Prim;
pub use subst::{close, open};
pub use subtype::{equiv, subtype};
pub use ty::{Field, FuncSort, FuncType, ObjSort, Control, Type, TypeBind};
