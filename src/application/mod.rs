// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish a
// caller's goal (visualizing one unit, or sweeping a range).
//
// Rules for this layer:
//   - No tensor math or optimization code here
//   - No printing or rendering here (callers present results)
//   - Only workflow coordination: resolve through the
//     directory, hand off to the engine, package the outcome
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Single-unit and unit-range visualization workflows
pub mod visualize_use_case;
