//! Enumerations shared between the API and the database.
//!
//! Each enum serializes with its snake_case wire name, which is also the
//! label of the matching `PostgreSQL` enum type in the `ops` schema.

use serde::{Deserialize, Serialize};

/// Error returned when a wire name does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! wire_names {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The snake_case wire name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Employee role. Ordered by privilege, so `role >= EmployeeRole::Leader`
/// reads as "at least a leader".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.employee_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    /// Hourly team member: records waste, completes checklists.
    TeamMember,
    /// Shift or department leader: manages checklists, setup sheets, evaluations.
    Leader,
    /// Operator or director: full store administration.
    Director,
}

wire_names!(EmployeeRole, "employee role", {
    TeamMember => "team_member",
    Leader => "leader",
    Director => "director",
});

/// Department an employee works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.department", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Front of house.
    Foh,
    /// Back of house (kitchen).
    Boh,
    #[default]
    Both,
}

wire_names!(Department, "department", {
    Foh => "foh",
    Boh => "boh",
    Both => "both",
});

/// Shift checklist type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.checklist_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistType {
    Opening,
    Transition,
    Closing,
}

wire_names!(ChecklistType, "checklist type", {
    Opening => "opening",
    Transition => "transition",
    Closing => "closing",
});

/// Why food was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.waste_reason", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum WasteReason {
    Overcooked,
    Dropped,
    Expired,
    Overproduction,
    Quality,
    Other,
}

wire_names!(WasteReason, "waste reason", {
    Overcooked => "overcooked",
    Dropped => "dropped",
    Expired => "expired",
    Overproduction => "overproduction",
    Quality => "quality",
    Other => "other",
});

/// Lifecycle of a 360° evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.evaluation_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Created, no raters assigned yet.
    PendingEvaluators,
    /// At least one rater has not submitted.
    InProgress,
    /// Every assigned rater has submitted.
    Completed,
}

wire_names!(EvaluationStatus, "evaluation status", {
    PendingEvaluators => "pending_evaluators",
    InProgress => "in_progress",
    Completed => "completed",
});

/// How a rater relates to the subject of a 360° evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.rater_relationship", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RaterRelationship {
    /// The subject rating themselves.
    #[serde(rename = "self")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "self"))]
    SelfAssessment,
    Peer,
    DirectReport,
    Manager,
}

wire_names!(RaterRelationship, "rater relationship", {
    SelfAssessment => "self",
    Peer => "peer",
    DirectReport => "direct_report",
    Manager => "manager",
});

/// Category of an employee documentation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ops.documentation_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentationKind {
    Disciplinary,
    Recognition,
    Coaching,
    Performance,
    Other,
}

wire_names!(DocumentationKind, "documentation kind", {
    Disciplinary => "disciplinary",
    Recognition => "recognition",
    Coaching => "coaching",
    Performance => "performance",
    Other => "other",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(EmployeeRole::Director > EmployeeRole::Leader);
        assert!(EmployeeRole::Leader > EmployeeRole::TeamMember);
    }

    #[test]
    fn test_wire_names_match_serde() {
        for role in EmployeeRole::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
        for relationship in RaterRelationship::ALL {
            let json = serde_json::to_string(relationship).unwrap();
            assert_eq!(json, format!("\"{relationship}\""));
        }
        for reason in WasteReason::ALL {
            let json = serde_json::to_string(reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
    }

    #[test]
    fn test_self_relationship_wire_name() {
        assert_eq!(RaterRelationship::SelfAssessment.as_str(), "self");
        assert_eq!(
            "self".parse::<RaterRelationship>().unwrap(),
            RaterRelationship::SelfAssessment
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "brunch".parse::<ChecklistType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid checklist type: brunch");
    }

    #[test]
    fn test_checklist_type_all_in_shift_order() {
        assert_eq!(
            ChecklistType::ALL,
            &[
                ChecklistType::Opening,
                ChecklistType::Transition,
                ChecklistType::Closing
            ]
        );
    }
}
