//! Normalization and pass/fail evaluation of athlete mobility-test exports.
//!
//! A loaded export goes through [`pipeline::Pipeline`], which resolves variant
//! headers, normalizes cells and classifies every metric against its
//! threshold. [`state::ViewState`] keeps the current dataset and the
//! subject / category / date selections for whatever renders it.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod state;
