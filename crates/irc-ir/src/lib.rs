//! The IR expression, declaration, and pattern model, plus the smart
//! constructors that assemble annotated nodes (`spec.md` §3.2, §4.2).

pub mod constructors;
pub mod expr;
pub mod literal;
pub mod pattern;
pub mod program;
pub mod visit;

pub use expr::{Case, Dec, Expr, ExprKind, FuncData, Mutability};
pub use literal::{BinOp, Literal, RelOp, UnOp};
pub use pattern::Pattern;
pub use program::{Flavor, Program};
