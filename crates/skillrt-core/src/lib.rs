//! Shared vocabulary for the agent skill runtime: the dynamic [`value::Value`]
//! type, the domain [`types`] (`Skill`, `Step`, `StepResult`, ...), the
//! workspace-wide [`error::SkillError`] taxonomy, and version comparison.

pub mod error;
pub mod scope;
pub mod types;
pub mod validate;
pub mod value;
pub mod version;

pub use error::{SkillError, SkillResult};
pub use scope::{Scope, VariableResolver};
pub use value::Value;
