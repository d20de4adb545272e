//! NetSvg Core Types
//!
//! This crate provides the foundational types shared by the NetSvg builder
//! and its command-line front end. It includes:
//!
//! - **Colors**: CSS color parsing, blending and darkening ([`color::Color`])
//! - **DOM**: The mutable SVG element tree with its serializer and parser ([`dom`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Scales**: Linear and ordinal domain-to-range mappings ([`scale`] module)

pub mod color;
pub mod dom;
pub mod geometry;
pub mod scale;
