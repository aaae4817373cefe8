//! Record types for the six portfolio resource kinds

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A resource kind served under `/admin/<segment>`.
///
/// `REQUIRED` lists the fields a create form must fill; the same list guards
/// the fields present in an update.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection path relative to the API base URL
    const PATH: &'static str;
    /// Human label, singular
    const LABEL: &'static str;
    const REQUIRED: &'static [&'static str];

    fn id(&self) -> &str;

    /// One-line summary for listings
    fn summary(&self) -> String;

    /// Reshape free-text form input into the wire shape before validation
    fn normalize_form(_form: &mut Value) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceFields {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialFields {
    pub name: String,
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationFields {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyFields {
    pub name: String,
}

/// Stored CV document. Created by multipart upload only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvFile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Resource for WorkExperience {
    const PATH: &'static str = "admin/work-experiences";
    const LABEL: &'static str = "work experience";
    const REQUIRED: &'static [&'static str] = &["title", "company", "duration", "points"];

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{} @ {} ({})", self.title, self.company, self.duration)
    }

    fn normalize_form(form: &mut Value) {
        split_text_field(form, "points", split_points);
    }
}

impl Resource for Testimonial {
    const PATH: &'static str = "admin/testimonials";
    const LABEL: &'static str = "testimonial";
    const REQUIRED: &'static [&'static str] = &["name", "role", "content"];

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{}, {}", self.name, self.role)
    }
}

impl Resource for Certification {
    const PATH: &'static str = "admin/certifications";
    const LABEL: &'static str = "certification";
    const REQUIRED: &'static [&'static str] = &["title", "description"];

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        match &self.link {
            Some(link) if !link.is_empty() => format!("{} <{}>", self.title, link),
            _ => self.title.clone(),
        }
    }
}

impl Resource for Project {
    const PATH: &'static str = "admin/projects";
    const LABEL: &'static str = "project";
    const REQUIRED: &'static [&'static str] = &["name", "description", "technologies"];

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{} [{}]", self.name, self.technologies.join(", "))
    }

    fn normalize_form(form: &mut Value) {
        split_text_field(form, "technologies", split_technologies);
    }
}

impl Resource for Technology {
    const PATH: &'static str = "admin/technologies";
    const LABEL: &'static str = "technology";
    const REQUIRED: &'static [&'static str] = &["name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}

impl CvFile {
    pub const PATH: &'static str = "admin/cv";
}

/// Stored records may carry `null` where a value is expected; read it as empty
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split a multi-line text area into bullet points
pub fn split_points(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma separated technology list
pub fn split_technologies(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replace a text value at `field` with the list `split` makes of it
fn split_text_field(form: &mut Value, field: &str, split: fn(&str) -> Vec<String>) {
    if let Some(value) = form.get_mut(field) {
        let list = match value {
            Value::String(text) => split(text),
            _ => return,
        };
        *value = Value::from(list);
    }
}

/// Human readable byte count (`1.5 MB`)
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
