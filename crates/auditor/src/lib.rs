pub mod auditor;
pub mod error;
pub mod record;
pub mod redact;

pub use auditor::Auditor;
pub use error::AuditError;
pub use record::build_audit_event;
