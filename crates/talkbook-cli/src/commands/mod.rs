//! CLI command implementations

pub mod compare;
pub mod inspect;
pub mod json_output;
pub mod publish;
