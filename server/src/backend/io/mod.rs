//! # IO Module
//!
//! Interface layer between clients and the domain logic. It translates HTTP
//! requests into domain commands and domain results into the wire DTOs of the
//! `shared` crate, and turns domain errors into status codes.

pub mod rest;
