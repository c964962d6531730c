//! Decision Advisor - Decision-tree consultation engine
//!
//! A user answers a fixed sequence of multiple-choice steps for one advisor.
//! Progress is persisted after every answer so a consultation can resume, and
//! answering the last step yields a deterministic, structured recommendation.
//!
//! Layout follows ports and adapters:
//! - `domain` - trees, paths, the navigator state machine and the synthesizer
//! - `ports` - the `PathStore` interface
//! - `adapters` - storage backends and the HTTP surface
//! - `application` - the consultation service
//! - `config` / `startup` - environment configuration and wiring

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod startup;
