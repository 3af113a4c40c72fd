// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the crate — pure Rust structs and enums
// that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - NO tensor math
//   - Only plain Rust structs, enums, and errors
//
// Why keep this layer pure?
//   - Easy to unit test (no tensor backend needed)
//   - Easy to understand (no framework noise)
//   - Callers can browse layer metadata and handle errors
//     without ever touching a tensor type
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

// The typed failure taxonomy of the core
pub mod error;

// Layer metadata: kinds, catalog entries, descriptions
pub mod layer;

// Unit selection and progress reporting types
pub mod selection;

// The 8-bit output raster buffer
pub mod raster;
