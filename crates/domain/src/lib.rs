//! # pkone-domain
//!
//! Pure addressing and protocol model for PKONE expansion boards.
//!
//! ## Responsibilities
//! - Hold the registered boards and check their addresses ([`registry`])
//! - Turn `"<board>-<index>"` numbers into typed addresses ([`number`])
//! - Gate switch → coil rules on the same board ([`cross_board`])
//! - Encode hardware rules, coil and servo commands ([`rule`], [`driver`], [`servo`], [`command`])
//! - Decode switch snapshot and change frames ([`frame`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! Transport and timing live behind the ports of the `app` crate.

pub mod error;

pub mod address;
pub mod board;
pub mod command;
pub mod cross_board;
pub mod driver;
pub mod frame;
pub mod number;
pub mod registry;
pub mod rule;
pub mod servo;
pub mod switch_state;
