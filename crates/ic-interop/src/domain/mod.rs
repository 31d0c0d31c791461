//! Domain layer: records, messages, codes, errors and static invariants.

pub mod ccm;
pub mod certificate;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod params;
pub mod value_objects;

pub use ccm::*;
pub use certificate::*;
pub use constants::*;
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use invariants::*;
pub use params::*;
pub use value_objects::*;
