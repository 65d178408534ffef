//! Subject reshaper - per-subject accumulators into ordered rosters

use crate::types::{RosterEntry, SubjectColumns, SubjectRoster};

/// Enrolled students per subject, collected while scanning roster rows.
///
/// Seeded with every subject column so output order follows the header,
/// not enrollment order.
#[derive(Debug, Clone, Default)]
pub struct SubjectAccumulators {
    rosters: Vec<SubjectRoster>,
}

impl SubjectAccumulators {
    pub fn from_columns(columns: &SubjectColumns) -> Self {
        Self {
            rosters: columns.codes().map(SubjectRoster::new).collect(),
        }
    }

    /// Append a student to a subject. Unknown codes start a new roster at the end.
    pub fn push(&mut self, subject_code: &str, entry: RosterEntry) {
        match self
            .rosters
            .iter_mut()
            .find(|roster| roster.subject_code == subject_code)
        {
            Some(roster) => roster.students.push(entry),
            None => {
                let mut roster = SubjectRoster::new(subject_code);
                roster.students.push(entry);
                self.rosters.push(roster);
            }
        }
    }

    /// Number of subjects with at least one student
    pub fn enrolled_subject_count(&self) -> usize {
        self.rosters.iter().filter(|r| !r.is_empty()).count()
    }
}

/// Drop subjects nobody enrolled in, keeping header order
pub fn reshape(accumulators: SubjectAccumulators) -> Vec<SubjectRoster> {
    accumulators
        .rosters
        .into_iter()
        .filter(|roster| !roster.is_empty())
        .collect()
}

/// Look up a subject roster by code
pub fn find_subject<'a>(
    rosters: &'a [SubjectRoster],
    subject_code: &str,
) -> Option<&'a SubjectRoster> {
    rosters
        .iter()
        .find(|roster| roster.subject_code == subject_code)
}
