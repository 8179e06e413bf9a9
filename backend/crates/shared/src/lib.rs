//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by every backend crate:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP classification
//! - Typed ID wrappers ([`id::Id`], [`id::SerialId`])
//!
//! Only things whose meaning is identical across all domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
