//! # stratus-compose
//!
//! Stack composition engine for the Stratus topology.
//!
//! Handles:
//! - **Graph**: Static component dependency graph and topological ordering.
//! - **Naming**: Deterministic, scope-derived identifiers.
//! - **Handles**: Read-only references passed from owners to dependents.
//! - **Components**: Network, storage, identity, edge, DNS, alerting, monitoring.
//! - **Manifest**: Dependency-ordered declarative resource description.
//! - **Root**: The composition pass that evaluates conditional branches and
//!   records every realized identifier.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratus_common::config::{ConfigurationBundle, StackSettings};
//! use stratus_compose::root::CompositionRoot;
//!
//! let root = CompositionRoot::new(StackSettings::default());
//! let result = root.compose(&ConfigurationBundle::default());
//! ```

pub mod components;
pub mod graph;
pub mod handle;
pub mod manifest;
pub mod naming;
pub mod result;
pub mod root;
