//! End-to-end test crate for the Helio broker core.
//!
//! All tests live under `tests/`; this library target is intentionally empty.
