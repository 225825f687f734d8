//! Wire format types, one module per dialect
//!
//! `gateway` is the inbound caller-facing format; the vendor modules are the
//! outbound upstream formats.

pub mod anthropic;
pub mod gateway;
pub mod google;
pub mod openai;
