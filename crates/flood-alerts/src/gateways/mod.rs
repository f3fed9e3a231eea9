//! Outbound collaborators: every external dependency sits behind a trait so
//! the pipeline can run against scripted doubles in tests.

pub mod email;
pub mod geocode;
pub mod routing;
pub mod store;
