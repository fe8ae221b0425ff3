//! Shape mismatches reported by the destructuring helpers in [`crate::ops`].
//!
//! These carry no position; the checker attaches one when it turns a
//! [`TypeError`] into a [`irc_common::diagnostic::Diagnostic`].

use crate::ty::Type;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    NotATuple(Type),
    NotAnObject(Type),
    NotAnArray(Type),
    NotAFunction(Type),
    NotAnAsync(Type),
    NotMutable(Type),
    NoSuchField(Type),
    WrongArity { expected: usize, found: usize },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::NotATuple(t) => write!(f, "expected a tuple type, found {t:?}"),
            TypeError::NotAnObject(t) => write!(f, "expected an object type, found {t:?}"),
            TypeError::NotAnArray(t) => write!(f, "expected an array type, found {t:?}"),
            TypeError::NotAFunction(t) => write!(f, "expected a function type, found {t:?}"),
            TypeError::NotAnAsync(t) => write!(f, "expected an async type, found {t:?}"),
            TypeError::NotMutable(t) => write!(f, "expected a mutable cell type, found {t:?}"),
            TypeError::NoSuchField(t) => write!(f, "no such field on {t:?}"),
            TypeError::WrongArity { expected, found } => {
                write!(f, "expected {expected} type argument(s), found {found}")
            }
        }
    }
}

impl std::error::Error for TypeError {}
