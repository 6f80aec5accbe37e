pub mod errors;
pub mod model;
pub mod multiselect;
pub mod reconcile;
pub mod snapshot;
