//! A2P Onboard — brand registration workflow for application-to-person messaging.

pub mod a2p;
pub mod config;
pub mod error;
pub mod provider;
