//! SGPA and overall GPA computation.

use crate::models::{SemesterResult, StudentResult, is_passing};

/// Grade points on the ten-point scale; `None` for unrecognised grades.
pub fn grade_points(grade: &str) -> Option<f64> {
    let points = match grade.trim().to_ascii_uppercase().as_str() {
        "O" => 10.0,
        "A+" => 9.0,
        "A" => 8.0,
        "B+" => 7.0,
        "B" => 6.0,
        "C" => 5.0,
        "D" => 4.0,
        "F" | "AB" | "ABSENT" => 0.0,
        _ => return None,
    };
    Some(points)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Credit-weighted SGPA of one period.
///
/// `None` when a credited subject failed or nothing carries credits.
pub fn semester_sgpa(semester: &SemesterResult) -> Option<f64> {
    let mut weighted = 0.0;
    let mut credits = 0.0;

    for subject in semester.subjects.values() {
        if subject.credits <= 0.0 {
            continue;
        }
        if !is_passing(&subject.grade) {
            return None;
        }
        if let Some(points) = grade_points(&subject.grade) {
            weighted += points * subject.credits;
            credits += subject.credits;
        }
    }

    (credits > 0.0).then(|| round2(weighted / credits))
}

/// Fill in every period's `sgpa` and the overall GPA.
///
/// The overall GPA is the mean of period SGPAs and is only set when every
/// period has one.
pub fn compute_metric(mut result: StudentResult) -> StudentResult {
    let mut sgpas = Vec::with_capacity(result.results.len());
    for semester in result.results.values_mut() {
        semester.sgpa = semester_sgpa(semester);
        sgpas.push(semester.sgpa);
    }

    result.overall_gpa = if sgpas.is_empty() {
        None
    } else {
        sgpas
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()
            .map(|values| round2(values.iter().sum::<f64>() / values.len() as f64))
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectGrade;

    fn subject(grade: &str, credits: f64) -> SubjectGrade {
        SubjectGrade {
            subject_name: format!("{grade} subject"),
            grade: grade.to_string(),
            credits,
            ..SubjectGrade::default()
        }
    }

    fn semester(rows: &[(&str, &str, f64)]) -> SemesterResult {
        SemesterResult {
            subjects: rows
                .iter()
                .map(|(code, grade, credits)| (code.to_string(), subject(grade, *credits)))
                .collect(),
            sgpa: None,
        }
    }

    #[test]
    fn test_weighted_sgpa() {
        // (10*4 + 8*3 + 7*3) / 10 = 8.5
        let sem = semester(&[("A", "O", 4.0), ("B", "A", 3.0), ("C", "B+", 3.0)]);
        assert_eq!(semester_sgpa(&sem), Some(8.5));
    }

    #[test]
    fn test_sgpa_rounds_to_two_places() {
        // (10*3 + 9*3 + 8*3 + 6*2 + 5*1) / 12 = 98/12 = 8.1666..
        let sem = semester(&[
            ("A", "O", 3.0),
            ("B", "A+", 3.0),
            ("C", "A", 3.0),
            ("D", "B", 2.0),
            ("E", "C", 1.0),
        ]);
        assert_eq!(semester_sgpa(&sem), Some(8.17));
    }

    #[test]
    fn test_failed_credited_subject_has_no_sgpa() {
        let sem = semester(&[("A", "O", 4.0), ("B", "F", 3.0)]);
        assert_eq!(semester_sgpa(&sem), None);

        let absent = semester(&[("A", "O", 4.0), ("B", "Ab", 3.0)]);
        assert_eq!(semester_sgpa(&absent), None);
    }

    #[test]
    fn test_zero_credit_subjects_are_ignored() {
        let sem = semester(&[("A", "A", 3.0), ("MC", "F", 0.0)]);
        assert_eq!(semester_sgpa(&sem), Some(8.0));

        let audit_only = semester(&[("MC", "P", 0.0)]);
        assert_eq!(semester_sgpa(&audit_only), None);
    }

    #[test]
    fn test_overall_gpa_needs_every_period() {
        let mut result = StudentResult::default();
        result.results.insert("1-1".into(), semester(&[("A", "O", 4.0)]));
        result.results.insert("1-2".into(), semester(&[("B", "B", 4.0)]));

        let computed = compute_metric(result.clone());
        assert_eq!(computed.results["1-1"].sgpa, Some(10.0));
        assert_eq!(computed.results["1-2"].sgpa, Some(6.0));
        assert_eq!(computed.overall_gpa, Some(8.0));

        result.results.insert("2-1".into(), semester(&[("C", "F", 4.0)]));
        let computed = compute_metric(result);
        assert_eq!(computed.results["2-1"].sgpa, None);
        assert_eq!(computed.overall_gpa, None);
    }

    #[test]
    fn test_empty_result_has_no_gpa() {
        assert_eq!(compute_metric(StudentResult::default()).overall_gpa, None);
    }

    #[test]
    fn test_grade_points_scale() {
        assert_eq!(grade_points("o"), Some(10.0));
        assert_eq!(grade_points("A+"), Some(9.0));
        assert_eq!(grade_points("D"), Some(4.0));
        assert_eq!(grade_points("ABSENT"), Some(0.0));
        assert_eq!(grade_points("COMPLE"), None);
    }
}
