use crate::models::{DiffKind, DiffLine, DiffPolicy, DiffSummary};

/// Positional line comparison of teacher and student code.
///
/// Lines are paired by index only; there is no alignment or move detection, so
/// one inserted line shifts every following row. A missing line and an empty
/// line compare the same way.
pub fn diff_lines(teacher: &str, student: &str, policy: DiffPolicy) -> Vec<DiffLine> {
    let teacher_lines: Vec<&str> = teacher.split('\n').collect();
    let student_lines: Vec<&str> = student.split('\n').collect();
    let len = teacher_lines.len().max(student_lines.len());

    (0..len)
        .map(|index| {
            let t = teacher_lines.get(index).copied().unwrap_or("");
            let s = student_lines.get(index).copied().unwrap_or("");
            DiffLine {
                index,
                teacher: t.to_string(),
                student: s.to_string(),
                kind: classify(t, s, policy),
            }
        })
        .collect()
}

fn classify(teacher: &str, student: &str, policy: DiffPolicy) -> DiffKind {
    if teacher == student {
        return DiffKind::Same;
    }
    match (teacher.is_empty(), student.is_empty()) {
        (false, true) => DiffKind::Removed,
        (true, false) => DiffKind::Added,
        _ => match policy {
            DiffPolicy::Distinct => DiffKind::Modified,
            DiffPolicy::CollapseModified => DiffKind::Added,
        },
    }
}

pub fn summarize(lines: &[DiffLine]) -> DiffSummary {
    lines.iter().fold(DiffSummary::default(), |mut summary, line| {
        match line.kind {
            DiffKind::Same => summary.same += 1,
            DiffKind::Added => summary.added += 1,
            DiffKind::Removed => summary.removed += 1,
            DiffKind::Modified => summary.modified += 1,
        }
        summary
    })
}
