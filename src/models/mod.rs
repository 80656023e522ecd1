pub mod category;
pub mod rejected_request;
pub mod service;
pub mod service_request;
pub mod user;

/// A stored string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
