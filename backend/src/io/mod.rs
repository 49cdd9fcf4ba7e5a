//! Outer surfaces of the service.

pub mod rest;
