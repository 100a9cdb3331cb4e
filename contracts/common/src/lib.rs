#![no_std]

//! Shared access-control helpers for the staking contracts.

pub mod pausable;
pub mod roles;
