use crate::model::{StudentData, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeInfo {
    pub grade: &'static str,
    pub remark: &'static str,
}

pub fn subject_total(ca: f64, exam: f64) -> f64 {
    ca + exam
}

/// Grade band for a subject total out of 100.
pub fn grade_info(total: f64) -> GradeInfo {
    if total >= 90.0 {
        GradeInfo { grade: "A+", remark: "Exceeding" }
    } else if total >= 70.0 {
        GradeInfo { grade: "A", remark: "Exceeding" }
    } else if total >= 50.0 {
        GradeInfo { grade: "B", remark: "Expected" }
    } else if total >= 40.0 {
        GradeInfo { grade: "C", remark: "Emerging" }
    } else {
        GradeInfo { grade: "D", remark: "Needs Support" }
    }
}

pub fn student_total(subjects: &[Subject]) -> f64 {
    subjects
        .iter()
        .map(|s| subject_total(s.ca_score, s.exam_score))
        .sum()
}

pub fn total_possible(subjects: &[Subject]) -> f64 {
    (subjects.len() as f64) * 100.0
}

/// Mean subject total, one decimal, matching what the report card prints.
pub fn student_average(subjects: &[Subject]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    let avg = student_total(subjects) / (subjects.len() as f64);
    (avg * 10.0).round() / 10.0
}

/// One dashboard row per student: totals plus the grade band of the average.
pub fn student_summary(student: &StudentData) -> serde_json::Value {
    let average = student_average(&student.subjects);
    let info = grade_info(average);
    serde_json::json!({
        "totalScore": student_total(&student.subjects),
        "totalPossible": total_possible(&student.subjects),
        "average": average,
        "grade": info.grade,
        "gradeRemark": info.remark,
    })
}
