use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: Option<String>,
    pub modality: Option<String>,
    pub client: Option<String>,
    pub contract_type: Option<String>,
    pub objective: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub professional_level: Option<String>,
    pub academic_level: Option<String>,
    pub english_level: Option<String>,
    pub spanish_level: Option<String>,
    pub activities: Option<String>,
    pub competencies: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub professional_title: Option<String>,
    pub expertise_area: Option<String>,
    pub technical_knowledge: Option<String>,
    pub certifications: Option<String>,
    pub english_level: Option<String>,
    pub spanish_level: Option<String>,
    pub academic_level: Option<String>,
    pub resume: Option<String>,
}
