//! Common types and utilities shared across the IR pipeline crates.
//!
//! This crate provides the foundations used by the type model, the IR
//! node model, the checker, and the transforms:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`, `ByteSpan`)
//! - A process-wide fresh-identifier counter (`IdGen`)
//! - The single internal diagnostic shape raised by the checker
//! - Centralized recursion/iteration limits

// String interning for identifier and constructor-name deduplication.
pub mod interner;
pub use interner::{Atom, Interner};

// Span - source location tracking (byte offsets).
pub mod span;
pub use span::{ByteSpan, Span, SpanBuilder, Spanned};

// Centralized recursion and iteration limits.
pub mod limits;

// Fresh-identifier generation (the pipeline's only process-wide mutable state).
pub mod id;
pub use id::{Id, IdGen};

// The checker's internal diagnostic shape.
pub mod diagnostic;
pub use diagnostic::Diagnostic;
