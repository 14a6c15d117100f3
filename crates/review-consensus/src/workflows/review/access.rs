use serde::{Deserialize, Serialize};

/// Role of the caller as resolved by the surrounding authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    #[default]
    Reviewer,
    Staff,
    Admin,
}

impl StaffRole {
    pub const fn label(self) -> &'static str {
        match self {
            StaffRole::Reviewer => "reviewer",
            StaffRole::Staff => "staff",
            StaffRole::Admin => "admin",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reviewer" => Ok(StaffRole::Reviewer),
            "staff" => Ok(StaffRole::Staff),
            "admin" => Ok(StaffRole::Admin),
            other => Err(format!("unknown staff role '{other}'")),
        }
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SubmitEvaluation,
    ViewConsensus,
    ManageAssignments,
}

/// Capability check handed to the service by the caller; the engine keeps no session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub role: StaffRole,
}

impl Permissions {
    pub const fn new(role: StaffRole) -> Self {
        Self { role }
    }

    pub const fn admin() -> Self {
        Self::new(StaffRole::Admin)
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::SubmitEvaluation => true,
            Capability::ViewConsensus => matches!(self.role, StaffRole::Staff | StaffRole::Admin),
            Capability::ManageAssignments => self.role == StaffRole::Admin,
        }
    }

    pub fn require(&self, capability: Capability) -> Result<(), AccessDenied> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(AccessDenied {
                role: self.role,
                capability,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role '{}' may not perform {capability:?}", .role.label())]
pub struct AccessDenied {
    pub role: StaffRole,
    pub capability: Capability,
}
