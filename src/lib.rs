//! Library exports for the media-portfolio backend
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod publish;
pub mod route;
pub mod staging;
