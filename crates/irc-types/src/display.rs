//! Pretty-printing types for diagnostics.
//!
//! [`Type`] itself carries no names — labels and constructor identities
//! are [`irc_common::interner::Atom`]s and [`crate::con::ConId`]s, neither
//! of which prints anything useful on its own. [`TypeDisplay`] borrows an
//! interner and constructor table to render a type the way a diagnostic
//! message should read.

use crate::con::ConTable;
use crate::ty::{ObjSort, Type};
use irc_common::interner::Interner;
use std::fmt;

pub struct TypeDisplay<'a> {
    ty: &'a Type,
    interner: &'a Interner,
    cons: &'a ConTable,
}

impl Type {
    pub fn display<'a>(&'a self, interner: &'a Interner, cons: &'a ConTable) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, interner, cons }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self.ty, self.interner, self.cons)
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, t: &Type, interner: &Interner, cons: &ConTable) -> fmt::Result {
    let w = |f: &mut fmt::Formatter<'_>, t: &Type| write_type(f, t, interner, cons);
    match t {
        Type::Prim(p) => write!(f, "{p}"),
        Type::Any => write!(f, "Any"),
        Type::Non => write!(f, "None"),
        Type::Shared => write!(f, "Shared"),
        Type::Tuple(ts) => {
            write!(f, "(")?;
            for (i, t) in ts.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                w(f, t)?;
            }
            write!(f, ")")
        }
        Type::Option(t) => {
            write!(f, "?")?;
            w(f, t)
        }
        Type::Array(t) => {
            write!(f, "[")?;
            w(f, t)?;
            write!(f, "]")
        }
        Type::Mut(t) => {
            write!(f, "var ")?;
            w(f, t)
        }
        Type::Async(t) => {
            write!(f, "async ")?;
            w(f, t)
        }
        Type::Serialized(t) => {
            write!(f, "serialized ")?;
            w(f, t)
        }
        Type::Object(sort, fields) => {
            let keyword = match sort {
                ObjSort::Object => "object",
                ObjSort::Module => "module",
                ObjSort::Actor => "actor",
            };
            write!(f, "{keyword} {{")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{} : ", interner.resolve(field.label))?;
                w(f, &field.typ)?;
            }
            write!(f, "}}")
        }
        Type::Variant(arms) => {
            write!(f, "{{")?;
            for (i, (label, t)) in arms.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "#{} : ", interner.resolve(*label))?;
                w(f, t)?;
            }
            write!(f, "}}")
        }
        Type::Func(func) => {
            let sort = match func.sort {
                crate::ty::FuncSort::Local => "",
                crate::ty::FuncSort::Shared => "shared ",
            };
            write!(f, "{sort}(")?;
            for (i, t) in func.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                w(f, t)?;
            }
            write!(f, ") -> ")?;
            match func.control {
                crate::ty::Control::Promises => write!(f, "async ")?,
                crate::ty::Control::Returns => {}
            }
            write!(f, "(")?;
            for (i, t) in func.ret.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                w(f, t)?;
            }
            write!(f, ")")
        }
        Type::Con(c, args) => {
            write!(f, "{}", interner.resolve(cons.name(*c)))?;
            if !args.is_empty() {
                write!(f, "<")?;
                for (i, t) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    w(f, t)?;
                }
                write!(f, ">")?;
            }
            Ok(())
        }
        Type::Bound(i) => write!(f, "'{i}"),
        Type::Pre => write!(f, "<unresolved>"),
    }
}
