//! Centralized limits and thresholds for the IR pipeline.
//!
//! Recursion depths and iteration counts used throughout the checker and
//! transforms are collected here rather than hard-coded at each call site.
//! Centralizing these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Makes it easy to tune limits for constrained embedding environments
//! - Documents the rationale for each limit

// =============================================================================
// Recursion Depth Limits
// =============================================================================
// These bound the depth of recursive tree walks so that pathological input
// (deeply nested expressions, deeply nested type constructor applications)
// fails predictably instead of overflowing the stack.

/// Maximum depth for the checker's recursive expression walk.
///
/// Each nested expression node (`a + (b + (c + (d + ...)))`, chained calls,
/// chained object field access) adds one frame to the call stack. At this
/// depth the checker raises an internal "expression nesting too deep"
/// diagnostic rather than risk a stack overflow.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum depth for `open`/`close` substitution through nested type
/// constructor applications.
///
/// Bounds recursive type constructor instantiation, e.g. a constructor
/// whose body itself instantiates another parameterized constructor many
/// levels deep (`type List<T> = ?(T, List<T>)` unfolded repeatedly via
/// `promote`). Exceeding this depth means the type is almost certainly
/// infinite and the checker stops unfolding.
pub const MAX_INSTANTIATION_DEPTH: u32 = 64;

/// Maximum depth for `subtype(t1, t2)`.
///
/// Structural subtyping recurses into object fields, variant arms, tuple
/// components, array and mutable-cell element types, and function
/// domain/codomain. Recursive type constructors (a constructor whose body
/// refers back to itself through a bound-variable index) could otherwise
/// make this recursion unbounded.
pub const MAX_SUBTYPE_DEPTH: u32 = 128;

/// Maximum depth for the tail-call optimizer's tail-position traversal.
///
/// Deeply nested `if`/`switch`/`block` chains inside a candidate function
/// body are walked to find tail calls. Bounds the same class of
/// pathological input as [`MAX_EXPR_CHECK_DEPTH`].
pub const MAX_TAILCALL_WALK_DEPTH: u32 = 500;

/// Maximum depth for the async/await CPS transform's recursive descent.
///
/// `C[e] k` and `T[e]` recurse into sub-expressions; this bounds how deep
/// a chain of nested `async`/`await`/`if`/`switch` can be before the
/// transform gives up rather than blow the stack.
pub const MAX_CPS_DEPTH: u32 = 500;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of declarations gathered from a single block.
///
/// A safety valve for the two-phase `gather`/`check` walk over a block's
/// declarations (see the checker's declaration gathering). Pathological
/// generated IR with an enormous flat declaration list stops here rather
/// than allocating unbounded scope maps.
pub const MAX_BLOCK_DECLARATIONS: u32 = 100_000;

/// Maximum number of case arms in a single `switch`.
///
/// Bounds how many pattern/body pairs the checker and the CPS transform
/// will walk for one `switch` expression.
pub const MAX_SWITCH_ARMS: u32 = 10_000;

/// Maximum number of fields on a single object or record type.
///
/// Object and variant types must keep their fields sorted and distinct;
/// this bounds how many fields `check_typ` will validate before bailing
/// out with an internal diagnostic.
pub const MAX_TYPE_FIELDS: u32 = 10_000;
