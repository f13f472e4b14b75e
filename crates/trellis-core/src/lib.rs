//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis diagram
//! toolkit. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing with hex output ([`color::Color`])
//! - **Categories**: Node taxonomy and icon resolution ([`category`] module)
//! - **Style**: Directions, line styles and output formats ([`style`] module)

pub mod category;
pub mod color;
pub mod identifier;
pub mod style;
