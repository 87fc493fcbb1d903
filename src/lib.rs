//! # Deep Research
//!
//! A command-line research assistant. Given a topic, a rig agent runs a
//! series of Tavily web searches, synthesizes what it found, and the
//! result is rendered as a Markdown report.
//!
//! The crate is a linear pipeline; each stage lives in its own module:
//!
//! | Stage | Module |
//! |-------|--------|
//! | Settings from env / `.env` / flags | [`config`] |
//! | `provider:model` → rig client | [`llm`] |
//! | Tavily search tool | [`tools`] |
//! | Agent construction and research run | [`agent`] |
//! | Markdown rendering | [`report`] |
//! | Sequencing and output | [`pipeline`] |

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod tools;

pub use error::AppError;
