//! `data_runtime`: ability schemas, catalog, and loaders.
//!
//! Extracted so client/server/tests can depend on a stable data API. The
//! catalog is a pure lookup table shared by both sides; it has no behavior
//! beyond resolution of ability ids to immutable definitions.

#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod ability;
pub mod catalog;
pub mod ids;
pub mod loader;
pub mod tuning;

pub use ability::{AbilityDef, EffectDef, EffectKind, TargetRelation};
pub use catalog::AbilityCatalog;
pub use ids::{AbilityId, ActorId};
