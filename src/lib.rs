//! Game Task Board Library
//!
//! This module exports the core components for testing and integration.

pub mod board;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod policy;
pub mod storage;
pub mod types;
pub mod web;
