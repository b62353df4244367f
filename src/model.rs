use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Fixed identity under which guest (offline) data is stored. Also the
/// migration source namespace when a guest later signs in.
pub const GUEST_USER_ID: &str = "guest-user";

pub const CA_MAX: f64 = 40.0;
pub const EXAM_MAX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectCategory {
    Prime,
    Specific,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub category: SubjectCategory,
    pub ca_score: f64,
    pub exam_score: f64,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: SubjectCategory::Specific,
            ca_score: 0.0,
            exam_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConductRating {
    A,
    B,
    C,
    D,
    E,
    F,
    #[default]
    #[serde(rename = "")]
    Unset,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conduct {
    pub id: String,
    pub name: String,
    pub rating: ConductRating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "teacher".to_string()
}

impl User {
    pub fn guest() -> Self {
        Self {
            id: GUEST_USER_ID.to_string(),
            name: "Guest Teacher".to_string(),
            username: "guest".to_string(),
            email: "guest@kinderreport.com".to_string(),
            role: "teacher".to_string(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.id == GUEST_USER_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub school_name: String,
    pub school_address: String,
    pub school_phone: String,
    pub term: String,
    pub session: String,
    pub next_term_begins: String,
    pub default_teacher_name: String,
    pub default_head_name: String,
    pub default_head_of_school_name: String,
    pub default_school_crest_url: Option<String>,
    pub default_teacher_signature_url: Option<String>,
    pub default_head_teacher_stamp_url: Option<String>,
    pub default_head_of_school_stamp_url: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            school_name: "LAURASTEPHENS SCHOOL".to_string(),
            school_address: "LauraStephens Road, Lekki Scheme II, Lekki-Epe Expressway, Lagos."
                .to_string(),
            school_phone: "08137022005".to_string(),
            term: "Second (Spring)".to_string(),
            session: "2024/2025".to_string(),
            next_term_begins: "Monday, 28th April, 2025".to_string(),
            default_teacher_name: "Adejolaoluwa Odekoya".to_string(),
            default_head_name: "Ozoro Elohor Sarah".to_string(),
            default_head_of_school_name: "Raymond Adeleke".to_string(),
            default_school_crest_url: None,
            default_teacher_signature_url: None,
            default_head_teacher_stamp_url: None,
            default_head_of_school_stamp_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentData {
    pub id: String,

    pub school_name: String,
    pub school_address: String,
    pub school_phone: String,
    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub school_logo_url: Option<String>,
    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub school_crest_url: Option<String>,

    pub full_name: String,
    #[serde(deserialize_with = "de_lenient_int")]
    pub age: Option<i64>,
    pub gender: String,
    pub class_name: String,
    pub roll_number: String,
    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub photo_url: Option<String>,

    pub school_opened: i64,
    pub times_present: i64,

    pub subjects: Vec<Subject>,
    pub conducts: Vec<Conduct>,

    pub teacher_remark: String,
    pub head_remark: String,
    pub teacher_name: String,
    pub head_name: String,
    pub head_of_school_name: String,

    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub teacher_signature_url: Option<String>,
    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub head_teacher_stamp_url: Option<String>,
    #[serde(deserialize_with = "de_lenient_opt_string")]
    pub head_of_school_stamp_url: Option<String>,

    pub term: String,
    pub session: String,
    pub next_term_begins: String,
    #[serde(deserialize_with = "de_lenient_int")]
    pub last_updated: Option<i64>,

    // Fields from schema revisions this build does not know about survive a
    // load/store roundtrip instead of being dropped.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Historical rosters stored `age` as `""` when unset. Accept number,
/// numeric string, empty string or null.
fn de_lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Nullable url/reference fields: anything that is not a non-empty string
/// reads as unset.
fn de_lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

pub fn clamp_ca(v: f64) -> f64 {
    v.clamp(0.0, CA_MAX)
}

pub fn clamp_exam(v: f64) -> f64 {
    v.clamp(0.0, EXAM_MAX)
}

/// Canonical subject catalog. Persisted rosters are reconciled against
/// exactly this id set on every load.
pub fn subject_catalog() -> Vec<Subject> {
    let rows: [(&str, &str, SubjectCategory); 8] = [
        ("pse", "Personal, Social & Emotional Dev.", SubjectCategory::Prime),
        ("cl", "Communication & Language", SubjectCategory::Prime),
        ("pd", "Physical Development", SubjectCategory::Prime),
        ("lit", "Literacy", SubjectCategory::Specific),
        ("dic", "Diction", SubjectCategory::Specific),
        ("num", "Numeracy", SubjectCategory::Specific),
        ("uw", "Understanding the World", SubjectCategory::Specific),
        ("ead", "Expressive Art & Design", SubjectCategory::Specific),
    ];
    rows.iter()
        .map(|(id, name, category)| Subject {
            id: id.to_string(),
            name: name.to_string(),
            category: *category,
            ca_score: 0.0,
            exam_score: 0.0,
        })
        .collect()
}

/// Canonical conduct catalog, ratings unset.
pub fn conduct_catalog() -> Vec<Conduct> {
    let rows: [(&str, &str); 5] = [
        ("att", "Attentiveness"),
        ("neat", "Neatness & Orderliness"),
        ("punc", "Punctuality"),
        ("pol", "Politeness"),
        ("rel", "Relationship with Peers"),
    ];
    rows.iter()
        .map(|(id, name)| Conduct {
            id: id.to_string(),
            name: name.to_string(),
            rating: ConductRating::Unset,
        })
        .collect()
}

/// A fresh record with defaults copied from the active settings. A few
/// fields are inherited from the most recently created sibling so teachers
/// entering a class in one sitting do not retype them.
pub fn new_student(settings: &AppSettings, last_sibling: Option<&StudentData>) -> StudentData {
    let mut student = StudentData {
        id: Uuid::new_v4().to_string(),
        school_name: settings.school_name.clone(),
        school_address: settings.school_address.clone(),
        school_phone: settings.school_phone.clone(),
        school_crest_url: settings.default_school_crest_url.clone(),
        class_name: "Fabulous 3's".to_string(),
        school_opened: 120,
        subjects: subject_catalog(),
        conducts: conduct_catalog(),
        teacher_name: settings.default_teacher_name.clone(),
        head_name: settings.default_head_name.clone(),
        head_of_school_name: settings.default_head_of_school_name.clone(),
        teacher_signature_url: settings.default_teacher_signature_url.clone(),
        head_teacher_stamp_url: settings.default_head_teacher_stamp_url.clone(),
        head_of_school_stamp_url: settings.default_head_of_school_stamp_url.clone(),
        term: settings.term.clone(),
        session: settings.session.clone(),
        next_term_begins: settings.next_term_begins.clone(),
        ..StudentData::default()
    };
    if let Some(last) = last_sibling {
        student.class_name = last.class_name.clone();
        student.school_logo_url = last.school_logo_url.clone();
    }
    student
}
