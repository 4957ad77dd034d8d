//! Domain layer containing business entities and logic.
//!
//! This module defines entities, slug validation and the contracts for the
//! store and the analytics sink, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Link record and its create/patch inputs
//! - [`validator`] - Slug pattern and reserved-set checks
//! - [`repositories`] - Store and sink trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click batching worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves a slug
//! 2. [`click_event::ClickEvent`] is handed to the recorder's bounded channel
//! 3. [`click_worker::run_click_worker`] batches events and retries delivery
//! 4. Batches are appended via [`repositories::ClickSink`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
pub mod validator;
