use serde::{Deserialize, Serialize};

/// Lifecycle state of a project task or sub-project task.
///
/// Any status may be set from any other; there is no enforced ordering and a
/// completed task can be reopened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Display label shown next to task rows.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "未着手",
            Self::InProgress => "進行中",
            Self::Completed => "完了",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Portfolio-level state of a big project. Set by hand, never derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BigProjectStatus {
    #[default]
    Planning,
    Active,
    Completed,
    OnHold,
}

impl BigProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Planning => "計画中",
            Self::Active => "進行中",
            Self::Completed => "完了",
            Self::OnHold => "保留中",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Explicit discriminant for every stored entity kind.
///
/// Used as the type tag on search results and in validation messages, so no
/// caller ever has to guess an entity's kind from the fields it happens to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Project,
    Task,
    BigProject,
    SubProject,
    SubProjectTask,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::BigProject => "bigProject",
            Self::SubProject => "subProject",
            Self::SubProjectTask => "subProjectTask",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => "プロジェクト",
            Self::Task => "タスク",
            Self::BigProject => "ビッグプロジェクト",
            Self::SubProject => "サブプロジェクト",
            Self::SubProjectTask => "サブプロジェクトタスク",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"not-started\"").unwrap();
        assert_eq!(parsed, TaskStatus::NotStarted);
    }

    #[test]
    fn task_status_round_trips_through_as_str() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("done"), None);
    }

    #[test]
    fn entity_kind_serializes_as_type_tag() {
        let json = serde_json::to_string(&EntityKind::SubProjectTask).unwrap();
        assert_eq!(json, "\"subProjectTask\"");
        assert_eq!(EntityKind::BigProject.to_string(), "bigProject");
    }
}
