//! Third-party integration configuration.
//!
//! # Invariants
//! - At most one integration per kind per workspace; toggling an existing
//!   kind flips `enabled` instead of creating another record.
//! - Settings are typed per kind, so a Slack webhook can never be attached
//!   to a GitHub integration.

use super::{IntegrationId, WorkspaceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Github,
    Slack,
    Google,
    Microsoft,
    Discord,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 5] = [
        Self::Github,
        Self::Slack,
        Self::Google,
        Self::Microsoft,
        Self::Discord,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Slack => "Slack",
            Self::Google => "Google Workspace",
            Self::Microsoft => "Microsoft 365",
            Self::Discord => "Discord",
        }
    }
}

/// Per-kind integration settings.
///
/// Serialized as `{"type": "...", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum IntegrationSettings {
    #[serde(rename_all = "camelCase")]
    Github {
        repository: Option<String>,
        api_key: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Slack {
        webhook_url: Option<String>,
        notifications: bool,
    },
    #[serde(rename_all = "camelCase")]
    Google {
        api_key: Option<String>,
        calendar_sync: bool,
    },
    #[serde(rename_all = "camelCase")]
    Microsoft {
        tenant_id: Option<String>,
        notifications: bool,
    },
    #[serde(rename_all = "camelCase")]
    Discord {
        webhook_url: Option<String>,
        notifications: bool,
    },
}

impl IntegrationSettings {
    /// Unconfigured settings for a freshly connected integration.
    pub fn default_for(kind: IntegrationKind) -> Self {
        match kind {
            IntegrationKind::Github => Self::Github {
                repository: None,
                api_key: None,
            },
            IntegrationKind::Slack => Self::Slack {
                webhook_url: None,
                notifications: true,
            },
            IntegrationKind::Google => Self::Google {
                api_key: None,
                calendar_sync: false,
            },
            IntegrationKind::Microsoft => Self::Microsoft {
                tenant_id: None,
                notifications: true,
            },
            IntegrationKind::Discord => Self::Discord {
                webhook_url: None,
                notifications: true,
            },
        }
    }

    pub fn kind(&self) -> IntegrationKind {
        match self {
            Self::Github { .. } => IntegrationKind::Github,
            Self::Slack { .. } => IntegrationKind::Slack,
            Self::Google { .. } => IntegrationKind::Google,
            Self::Microsoft { .. } => IntegrationKind::Microsoft,
            Self::Discord { .. } => IntegrationKind::Discord,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: IntegrationId,
    #[serde(flatten)]
    pub settings: IntegrationSettings,
    pub enabled: bool,
    pub workspace_id: WorkspaceId,
}

impl Integration {
    /// Creates an enabled integration with default settings for `kind`.
    pub fn new(kind: IntegrationKind, workspace_id: WorkspaceId) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings: IntegrationSettings::default_for(kind),
            enabled: true,
            workspace_id,
        }
    }

    pub fn kind(&self) -> IntegrationKind {
        self.settings.kind()
    }
}
