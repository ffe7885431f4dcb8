//! View models for the host-rendered surfaces.

pub mod network_info;
pub mod token_details;
