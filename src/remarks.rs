//! Remark text generation. The hosted app calls an external AI service for
//! this; that call is a fallible external collaborator, so the seam is a
//! trait and the built-in implementation composes remarks from the grade
//! bands deterministically.

use crate::calc;
use crate::model::StudentData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remarks {
    pub teacher_remark: String,
    pub head_remark: String,
}

#[allow(async_fn_in_trait)]
pub trait RemarkGenerator {
    /// One record in, two remark strings out. Not idempotent and not cached;
    /// callers decide what to do with the result.
    async fn generate(&self, student: &StudentData) -> anyhow::Result<Remarks>;
}

/// Offline generator built on the report card's own grade bands.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRemarks;

impl RemarkGenerator for TemplateRemarks {
    async fn generate(&self, student: &StudentData) -> anyhow::Result<Remarks> {
        let name = first_name(&student.full_name);
        let average = calc::student_average(&student.subjects);
        let band = calc::grade_info(average);

        let best = student
            .subjects
            .iter()
            .max_by(|a, b| {
                let ta = calc::subject_total(a.ca_score, a.exam_score);
                let tb = calc::subject_total(b.ca_score, b.exam_score);
                ta.partial_cmp(&tb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "class activities".to_string());

        let teacher_remark = match band.grade {
            "A+" | "A" => format!(
                "{} has had an outstanding term with an average of {:.1}%. \
                 {} is a particular strength, and {} approaches every activity with enthusiasm.",
                name, average, best, name
            ),
            "B" => format!(
                "{} is working at the expected level with an average of {:.1}%. \
                 {} shows steady progress, especially in {}.",
                name, average, name, best
            ),
            "C" => format!(
                "{} is emerging at an average of {:.1}% and is gaining confidence. \
                 With continued encouragement, {} will build on the progress made in {}.",
                name, average, name, best
            ),
            _ => format!(
                "{} needs additional support this term (average {:.1}%). \
                 We will keep working together on the foundations, building from {}.",
                name, average, best
            ),
        };

        let head_remark = match band.grade {
            "A+" | "A" => format!(
                "An excellent report. {} is exceeding expectations and is a joy to have in school.",
                name
            ),
            "B" => format!(
                "A good report. {} is meeting expectations and should keep up the effort next term.",
                name
            ),
            "C" => format!(
                "{} is making progress. Consistent attendance and practice will help next term.",
                name
            ),
            _ => format!(
                "{} will benefit from close support at home and in school next term.",
                name
            ),
        };

        Ok(Remarks {
            teacher_remark,
            head_remark,
        })
    }
}

fn first_name(full_name: &str) -> &str {
    let first = full_name.split_whitespace().next().unwrap_or("");
    if first.is_empty() {
        "The pupil"
    } else {
        first
    }
}
