//! Card system: definitions, parameters, instances, registry, and catalog.
//!
//! ## Key Types
//!
//! - `CardKey`: Symbolic identifier of a card definition
//! - `CardDefinition`: Static card data with a typed script
//! - `Params`: Named card parameters (defaults, variations, node overrides)
//! - `CardInstance`: One physical copy with a unique `InstanceId`
//! - `CardRegistry`: Card definition lookup
//! - `CardCatalog`: Read-only source of definitions and deck composition

pub mod catalog;
pub mod definition;
pub mod instance;
pub mod params;
pub mod registry;

pub use catalog::{build_deck, CardCatalog, CatalogError, DeckEntry, StandardCatalog};
pub use definition::{CardCategory, CardDefinition, CardKey, Rarity};
pub use instance::{CardInstance, InstanceId, InstanceIdAllocator};
pub use params::{ParamValue, Params};
pub use registry::CardRegistry;
