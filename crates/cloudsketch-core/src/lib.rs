//! Cloudsketch Core Types and Definitions
//!
//! This crate provides the declaration model for Cloudsketch architecture
//! diagrams. It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Semantic**: Nodes, clusters, edges and the scoped [`semantic::Canvas`]
//!   used to declare them ([`semantic`] module)

pub mod color;
pub mod semantic;
