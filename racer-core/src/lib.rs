//! Reactive steering/throttle control core for a small RC car on no-std
//! embedded platforms.
//!
//! For a runnable host demo, see the `mock-rig` crate in this workspace.
#![no_std]

extern crate alloc;

pub mod utils;
