//! Setup templates and weekly setup sheets.
//!
//! A template describes, for each day of the week, the time blocks of a
//! shift and the positions that must be covered in each block. A setup sheet
//! is a copy of that layout for a concrete week with employees assigned to
//! positions; each of its days is the daily schedule for that date.

use std::collections::HashSet;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::EmployeeId;

/// Errors raised while validating a day layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("{0} appears more than once")]
    DuplicateDay(Weekday),

    #[error("{day}: block starting {start} must end after it starts")]
    EmptyBlock { day: Weekday, start: NaiveTime },

    #[error("{day}: blocks starting {first} and {second} overlap")]
    OverlappingBlocks {
        day: Weekday,
        first: NaiveTime,
        second: NaiveTime,
    },

    #[error("{day}: block starting {start} has a position without a name")]
    UnnamedPosition { day: Weekday, start: NaiveTime },

    #[error("{day}: employee {employee} is assigned twice at {start}")]
    DoubleBooked {
        day: Weekday,
        start: NaiveTime,
        employee: EmployeeId,
    },
}

/// A position to cover within a time block, optionally filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSlot {
    pub position: String,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
}

/// A stretch of a shift, e.g. 10:30-14:00 lunch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub positions: Vec<PositionSlot>,
}

impl TimeBlock {
    fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One day of a template or sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupDay {
    #[serde(with = "weekday_name")]
    pub day: Weekday,
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
}

/// Check a week layout and sort it.
///
/// Days are returned Sunday first and blocks by start time. Position names
/// are trimmed.
///
/// # Errors
///
/// Returns the first [`SetupError`] found: a weekday listed twice, a block
/// that does not end after it starts, overlapping blocks, a blank position,
/// or an employee holding two positions at the same time.
pub fn validate_days(mut days: Vec<SetupDay>) -> Result<Vec<SetupDay>, SetupError> {
    let mut seen = HashSet::with_capacity(days.len());
    for day in &days {
        if !seen.insert(day.day) {
            return Err(SetupError::DuplicateDay(day.day));
        }
    }
    days.sort_by_key(|day| day.day.num_days_from_sunday());

    for day in &mut days {
        day.blocks.sort_by_key(|block| block.start);
        for block in &mut day.blocks {
            if block.end <= block.start {
                return Err(SetupError::EmptyBlock {
                    day: day.day,
                    start: block.start,
                });
            }
            for slot in &mut block.positions {
                let trimmed = slot.position.trim();
                if trimmed.is_empty() {
                    return Err(SetupError::UnnamedPosition {
                        day: day.day,
                        start: block.start,
                    });
                }
                slot.position = trimmed.to_owned();
            }
        }
        check_day(day)?;
    }

    Ok(days)
}

fn check_day(day: &SetupDay) -> Result<(), SetupError> {
    for (index, block) in day.blocks.iter().enumerate() {
        let mut assigned = HashSet::new();
        for employee in block.positions.iter().filter_map(|slot| slot.employee_id) {
            if !assigned.insert(employee) {
                return Err(SetupError::DoubleBooked {
                    day: day.day,
                    start: block.start,
                    employee,
                });
            }
        }

        for later in day.blocks.iter().skip(index + 1) {
            if block.overlaps(later) {
                return Err(SetupError::OverlappingBlocks {
                    day: day.day,
                    first: block.start,
                    second: later.start,
                });
            }
        }
    }
    Ok(())
}

/// Copy a template layout for a new sheet with every assignment cleared.
#[must_use]
pub fn days_from_template(template: &[SetupDay]) -> Vec<SetupDay> {
    template
        .iter()
        .map(|day| SetupDay {
            day: day.day,
            blocks: day
                .blocks
                .iter()
                .map(|block| TimeBlock {
                    start: block.start,
                    end: block.end,
                    positions: block
                        .positions
                        .iter()
                        .map(|slot| PositionSlot {
                            position: slot.position.clone(),
                            employee_id: None,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

fn slots(days: &[SetupDay]) -> impl Iterator<Item = &PositionSlot> {
    days.iter()
        .flat_map(|day| day.blocks.iter())
        .flat_map(|block| block.positions.iter())
}

/// Number of filled positions across the week.
#[must_use]
pub fn assignment_count(days: &[SetupDay]) -> usize {
    slots(days).filter(|slot| slot.employee_id.is_some()).count()
}

/// Number of positions still waiting for an employee.
#[must_use]
pub fn unfilled_positions(days: &[SetupDay]) -> usize {
    slots(days).filter(|slot| slot.employee_id.is_none()).count()
}

/// Every distinct employee scheduled during the week.
#[must_use]
pub fn scheduled_employees(days: &[SetupDay]) -> Vec<EmployeeId> {
    let mut ids: Vec<EmployeeId> = slots(days)
        .filter_map(|slot| slot.employee_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    ids.sort_unstable();
    ids
}

/// Serialize weekdays as lower-case English names ("sunday").
mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAMES: [(Weekday, &str); 7] = [
        (Weekday::Sun, "sunday"),
        (Weekday::Mon, "monday"),
        (Weekday::Tue, "tuesday"),
        (Weekday::Wed, "wednesday"),
        (Weekday::Thu, "thursday"),
        (Weekday::Fri, "friday"),
        (Weekday::Sat, "saturday"),
    ];

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        let name = NAMES
            .iter()
            .find(|(weekday, _)| weekday == day)
            .map_or("sunday", |(_, name)| name);
        serializer.serialize_str(name)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let lower = raw.to_lowercase();
        NAMES
            .iter()
            .find(|(_, name)| *name == lower || name.get(..3) == Some(lower.as_str()))
            .map(|(weekday, _)| *weekday)
            .ok_or_else(|| D::Error::custom(format!("invalid weekday: {raw}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(position: &str, employee: Option<i32>) -> PositionSlot {
        PositionSlot {
            position: position.to_owned(),
            employee_id: employee.map(EmployeeId::new),
        }
    }

    fn block(start: (u32, u32), end: (u32, u32), positions: Vec<PositionSlot>) -> TimeBlock {
        TimeBlock {
            start: time(start.0, start.1),
            end: time(end.0, end.1),
            positions,
        }
    }

    fn monday(blocks: Vec<TimeBlock>) -> SetupDay {
        SetupDay {
            day: Weekday::Mon,
            blocks,
        }
    }

    #[test]
    fn test_validate_sorts_days_and_blocks() {
        let days = vec![
            monday(vec![
                block((14, 0), (20, 0), vec![slot("Grill", Some(2))]),
                block((6, 0), (14, 0), vec![slot(" Grill ", Some(2))]),
            ]),
            SetupDay {
                day: Weekday::Sun,
                blocks: vec![],
            },
        ];

        let days = validate_days(days).unwrap();
        assert_eq!(days[0].day, Weekday::Sun);
        assert_eq!(days[1].blocks[0].start, time(6, 0));
        assert_eq!(days[1].blocks[0].positions[0].position, "Grill");
    }

    #[test]
    fn test_validate_rejects_duplicate_day() {
        let err = validate_days(vec![monday(vec![]), monday(vec![])]).unwrap_err();
        assert_eq!(err, SetupError::DuplicateDay(Weekday::Mon));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let err = validate_days(vec![monday(vec![
            block((6, 0), (11, 0), vec![]),
            block((10, 30), (14, 0), vec![]),
        ])])
        .unwrap_err();
        assert!(matches!(err, SetupError::OverlappingBlocks { .. }));
    }

    #[test]
    fn test_validate_allows_back_to_back_blocks() {
        assert!(
            validate_days(vec![monday(vec![
                block((6, 0), (11, 0), vec![]),
                block((11, 0), (14, 0), vec![]),
            ])])
            .is_ok()
        );
    }

    #[test]
    fn test_validate_rejects_inverted_block_and_blank_position() {
        assert!(matches!(
            validate_days(vec![monday(vec![block((11, 0), (11, 0), vec![])])]),
            Err(SetupError::EmptyBlock { .. })
        ));
        assert!(matches!(
            validate_days(vec![monday(vec![block((6, 0), (11, 0), vec![slot("  ", None)])])]),
            Err(SetupError::UnnamedPosition { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_double_booking() {
        let err = validate_days(vec![monday(vec![block(
            (6, 0),
            (11, 0),
            vec![slot("Grill", Some(5)), slot("Fryer", Some(5))],
        )])])
        .unwrap_err();
        assert_eq!(
            err,
            SetupError::DoubleBooked {
                day: Weekday::Mon,
                start: time(6, 0),
                employee: EmployeeId::new(5),
            }
        );
    }

    #[test]
    fn test_template_copy_clears_assignments() {
        let template = vec![monday(vec![block(
            (6, 0),
            (11, 0),
            vec![slot("Grill", Some(1)), slot("Fryer", None)],
        )])];
        assert_eq!(assignment_count(&template), 1);

        let sheet = days_from_template(&template);
        assert_eq!(assignment_count(&sheet), 0);
        assert_eq!(unfilled_positions(&sheet), 2);
        assert_eq!(sheet[0].blocks[0].positions[1].position, "Fryer");
    }

    #[test]
    fn test_scheduled_employees_deduplicates() {
        let days = vec![monday(vec![
            block((6, 0), (11, 0), vec![slot("Grill", Some(3)), slot("Fryer", Some(1))]),
            block((11, 0), (14, 0), vec![slot("Grill", Some(3))]),
        ])];
        assert_eq!(
            scheduled_employees(&days),
            vec![EmployeeId::new(1), EmployeeId::new(3)]
        );
    }

    #[test]
    fn test_day_wire_format() {
        let json = r#"{"day": "Tue", "blocks": [{"start": "06:00:00", "end": "11:00:00", "positions": [{"position": "Bagging"}]}]}"#;
        let day: SetupDay = serde_json::from_str(json).unwrap();
        assert_eq!(day.day, Weekday::Tue);
        assert_eq!(day.blocks[0].positions[0].employee_id, None);

        let back = serde_json::to_value(&day).unwrap();
        assert_eq!(back["day"], "tuesday");
        assert_eq!(back["blocks"][0]["positions"][0]["employeeId"], serde_json::Value::Null);
    }
}
