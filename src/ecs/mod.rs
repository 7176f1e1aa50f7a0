//! Entity Component System (ECS) implementation
//!
//! String-keyed entities, one hash table per component type, and a
//! [`World`] facade that also owns the system scheduler.

pub mod component;
pub mod entity;
pub mod store;
pub mod world;

pub use component::{Component, ComponentStorage, ComponentType, TypedComponentStorage};
pub use entity::{Entity, EntityRegistry};
pub use store::ComponentStore;
pub use world::{World, WorldError};
