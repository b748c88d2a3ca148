//! Core building blocks: the typed `params` record and the `dating` engine
//! (time grids, priors, likelihoods, inside/outside passes). These are
//! consumed by the high-level `api` module.
pub mod dating;
pub mod params;
