//! Vendor adapters implementing [`crate::ModelProvider`].

#[cfg(feature = "provider-openai")]
pub mod openai;
