use edon_core::{AuditLevel, Constraints, Intent, RiskLevel, Scope};

/// The four named presets spec.md §4.10 requires. Each compiles to a
/// concrete, unapproved [`Intent`] — applying a pack never implies operator
/// sign-off, only a starting scope/constraint shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pack {
    PersonalSafe,
    WorkSafe,
    OpsAdmin,
    ClawdbotSafe,
}

impl Pack {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PersonalSafe => "personal_safe",
            Self::WorkSafe => "work_safe",
            Self::OpsAdmin => "ops_admin",
            Self::ClawdbotSafe => "clawdbot_safe",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "personal_safe" => Some(Self::PersonalSafe),
            "work_safe" => Some(Self::WorkSafe),
            "ops_admin" => Some(Self::OpsAdmin),
            "clawdbot_safe" => Some(Self::ClawdbotSafe),
            _ => None,
        }
    }

    /// Compile this pack into a fresh, unapproved Intent.
    #[must_use]
    pub fn compile(self) -> Intent {
        match self {
            Self::PersonalSafe => personal_safe(),
            Self::WorkSafe => work_safe(),
            Self::OpsAdmin => ops_admin(),
            Self::ClawdbotSafe => clawdbot_safe(),
        }
    }
}

fn scope(pairs: &[(&str, &[&str])]) -> Scope {
    pairs
        .iter()
        .map(|(tool, ops)| ((*tool).to_owned(), ops.iter().map(|op| (*op).to_owned()).collect()))
        .collect()
}

fn personal_safe() -> Intent {
    let mut intent = Intent::new("personal_safe policy pack", RiskLevel::Low);
    intent.scope = scope(&[
        ("email", &["read", "draft", "search"]),
        ("calendar", &["read", "summarize"]),
        ("filesystem", &["read_file"]),
        ("search", &["search"]),
    ]);
    intent.constraints = Constraints {
        drafts_only: Some(true),
        max_recipients: Some(1),
        ..Constraints::default()
    };
    intent
}

fn work_safe() -> Intent {
    let mut intent = Intent::new("work_safe policy pack", RiskLevel::Medium);
    intent.scope = scope(&[
        ("email", &["read", "draft", "send", "search"]),
        ("calendar", &["read", "summarize", "create_event"]),
        ("filesystem", &["read_file", "write_file"]),
        ("search", &["search"]),
    ]);
    intent.constraints = Constraints {
        max_recipients: Some(10),
        confirm_irreversible: Some(true),
        ..Constraints::default()
    };
    intent
}

fn ops_admin() -> Intent {
    let mut intent = Intent::new("ops_admin policy pack", RiskLevel::High);
    intent.scope = scope(&[
        ("email", &["read", "draft", "send"]),
        ("calendar", &["read", "summarize", "create_event"]),
        ("filesystem", &["read_file", "write_file", "delete_file"]),
        ("search", &["search"]),
        ("clawdbot", &["invoke"]),
    ]);
    intent.constraints = Constraints {
        confirm_irreversible: Some(true),
        audit_level: Some(AuditLevel::Detailed),
        ..Constraints::default()
    };
    intent
}

fn clawdbot_safe() -> Intent {
    let mut intent = Intent::new("clawdbot_safe policy pack", RiskLevel::Medium);
    intent.scope = scope(&[("clawdbot", &["invoke"])]);
    intent.constraints = Constraints {
        allowed_clawdbot_tools: Some(vec![
            "sessions_list".into(),
            "sessions_get".into(),
            "sessions_create".into(),
            "sessions_update".into(),
        ]),
        blocked_clawdbot_tools: Some(vec![
            "sessions_delete".into(),
            "sessions_terminate".into(),
            "sessions_destroy".into(),
        ]),
        ..Constraints::default()
    };
    intent
}
