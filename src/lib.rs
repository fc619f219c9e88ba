//! # voxmind
//!
//! Voice and text note capture organized by an AI analysis gateway.
//!
//! Captures become memos in a local, JSON-persisted store. The gateway
//! structures each memo into a title, literal summary, categories, due date,
//! key points and action items; memos are then classified into a primary
//! scene and filtered by scene or by the to-do calendar.

pub mod capture;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod model;
pub mod notebook;
pub mod storage;
pub mod store;
pub mod telemetry;
