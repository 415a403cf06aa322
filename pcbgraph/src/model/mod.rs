//! Entity/relation model: node kinds, relation kinds and their payloads.

pub mod entity;

pub use entity::*;
