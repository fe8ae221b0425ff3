//! The self tail-call optimizer (`spec.md` §4.4) and the async/await CPS
//! transform (`spec.md` §4.5), the two IR-to-IR rewrites that sit between
//! elaboration and code generation (`spec.md` §2).

mod cps;
mod tailcall;

pub use cps::cps_pass;
pub use tailcall::tailcall_pass;
