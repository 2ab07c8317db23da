//! Typed views consumed by the prompt builders, and the results they produce.
//!
//! Views are resolved once at the persistence boundary (`From<&Row>`); the
//! prompt code never touches database rows directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pipeline::TryItUserRow;
use crate::models::recruitment::{ApplicantRow, JobRow};
use crate::prompting::fields::FieldSource;

// ────────────────────────────────────────────────────────────────────────────
// JobView
// ────────────────────────────────────────────────────────────────────────────

/// A job requisition as the prompts see it. Serialises to the dataset's nested
/// shape (`informacoes_basicas` / `perfil_vaga`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobView {
    #[serde(rename = "informacoes_basicas", default)]
    pub basic: JobBasicInfo,
    #[serde(rename = "perfil_vaga", default)]
    pub profile: JobProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobBasicInfo {
    #[serde(rename = "titulo_vaga")]
    pub title: Option<String>,
    #[serde(rename = "cliente")]
    pub client: Option<String>,
    #[serde(rename = "objetivo_vaga")]
    pub objective: Option<String>,
    #[serde(rename = "tipo_contratacao")]
    pub contract_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProfile {
    #[serde(rename = "nivel_profissional")]
    pub professional_level: Option<String>,
    #[serde(rename = "nivel_academico")]
    pub academic_level: Option<String>,
    #[serde(rename = "nivel_ingles")]
    pub english_level: Option<String>,
    #[serde(rename = "nivel_espanhol")]
    pub spanish_level: Option<String>,
    #[serde(rename = "principais_atividades")]
    pub activities: Option<String>,
    #[serde(rename = "competencia_tecnicas_e_comportamentais")]
    pub competencies: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "estado")]
    pub state: Option<String>,
    #[serde(rename = "pais")]
    pub country: Option<String>,
}

impl JobBasicInfo {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "titulo_vaga" | "titulo" => &self.title,
            "cliente" => &self.client,
            "objetivo_vaga" => &self.objective,
            "tipo_contratacao" => &self.contract_type,
            _ => return None,
        };
        value.as_deref()
    }
}

impl JobProfile {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "nivel_profissional" => &self.professional_level,
            "nivel_academico" => &self.academic_level,
            "nivel_ingles" => &self.english_level,
            "nivel_espanhol" => &self.spanish_level,
            "principais_atividades" | "atividades" => &self.activities,
            "competencia_tecnicas_e_comportamentais" | "competencias" => &self.competencies,
            "cidade" => &self.city,
            "estado" => &self.state,
            "pais" => &self.country,
            _ => return None,
        };
        value.as_deref()
    }
}

impl FieldSource for JobView {
    /// Dotted paths address a group; bare names fall back to the flat column
    /// names of the `jobs` table.
    fn field(&self, path: &str) -> Option<&str> {
        match path.split_once('.') {
            Some(("informacoes_basicas", name)) => self.basic.field(name),
            Some(("perfil_vaga", name)) => self.profile.field(name),
            Some(_) => None,
            None => self.basic.field(path).or_else(|| self.profile.field(path)),
        }
    }
}

impl From<&JobRow> for JobView {
    fn from(job: &JobRow) -> Self {
        Self {
            basic: JobBasicInfo {
                title: job.title.clone(),
                client: job.client.clone(),
                objective: job.objective.clone(),
                contract_type: job.contract_type.clone(),
            },
            profile: JobProfile {
                professional_level: job.professional_level.clone(),
                academic_level: job.academic_level.clone(),
                english_level: job.english_level.clone(),
                spanish_level: job.spanish_level.clone(),
                activities: job.activities.clone(),
                competencies: job.competencies.clone(),
                city: job.city.clone(),
                state: job.state.clone(),
                country: job.country.clone(),
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ApplicantView
// ────────────────────────────────────────────────────────────────────────────

/// A candidate as the prompts see it. All fields are optional; absent values
/// are simply left out of the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantView {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "titulo_profissional")]
    pub professional_title: Option<String>,
    #[serde(rename = "area_atuacao")]
    pub expertise_area: Option<String>,
    #[serde(rename = "conhecimentos_tecnicos")]
    pub technical_knowledge: Option<String>,
    #[serde(rename = "certificacoes")]
    pub certifications: Option<String>,
    #[serde(rename = "nivel_ingles")]
    pub english_level: Option<String>,
    #[serde(rename = "nivel_espanhol")]
    pub spanish_level: Option<String>,
    #[serde(rename = "nivel_academico")]
    pub academic_level: Option<String>,
    /// Free-text résumé body.
    #[serde(rename = "cv_pt")]
    pub resume: Option<String>,
}

impl FieldSource for ApplicantView {
    fn field(&self, path: &str) -> Option<&str> {
        let value = match path {
            "nome" => &self.name,
            "titulo_profissional" => &self.professional_title,
            "area_atuacao" => &self.expertise_area,
            "conhecimentos_tecnicos" => &self.technical_knowledge,
            "certificacoes" => &self.certifications,
            "nivel_ingles" => &self.english_level,
            "nivel_espanhol" => &self.spanish_level,
            "nivel_academico" => &self.academic_level,
            "cv_pt" => &self.resume,
            _ => return None,
        };
        value.as_deref()
    }
}

impl From<&ApplicantRow> for ApplicantView {
    fn from(applicant: &ApplicantRow) -> Self {
        Self {
            name: applicant.name.clone(),
            professional_title: applicant.professional_title.clone(),
            expertise_area: applicant.expertise_area.clone(),
            technical_knowledge: applicant.technical_knowledge.clone(),
            certifications: applicant.certifications.clone(),
            english_level: applicant.english_level.clone(),
            spanish_level: applicant.spanish_level.clone(),
            academic_level: applicant.academic_level.clone(),
            resume: applicant.resume.clone(),
        }
    }
}

impl From<&TryItUserRow> for ApplicantView {
    /// Trial users only carry a name and their uploaded CV; older rows without
    /// CV text fall back to the triage keywords.
    fn from(user: &TryItUserRow) -> Self {
        let resume = user
            .cv_text
            .clone()
            .filter(|cv| !cv.is_empty())
            .or_else(|| user.keywords.clone());
        Self {
            name: user.name.clone(),
            resume,
            ..Self::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interview turns
// ────────────────────────────────────────────────────────────────────────────

/// A completed question/answer exchange. Both sides are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// A turn as submitted by the client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTurn {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Chronological transcript of an interview so far, supplied in full by the
/// client on every request. Incomplete pairs are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RawTurn>")]
pub struct TurnHistory(Vec<Turn>);

impl TurnHistory {
    pub fn from_pairs<Q, A>(pairs: impl IntoIterator<Item = (Q, A)>) -> Self
    where
        Q: Into<String>,
        A: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(q, a)| RawTurn {
                question: Some(q.into()),
                answer: Some(a.into()),
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<RawTurn>> for TurnHistory {
    fn from(raw: Vec<RawTurn>) -> Self {
        let turns = raw
            .into_iter()
            .filter_map(|t| match (t.question, t.answer) {
                (Some(question), Some(answer)) if !question.is_empty() && !answer.is_empty() => {
                    Some(Turn { question, answer })
                }
                _ => None,
            })
            .collect();
        Self(turns)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// CV triage outcome for a (job, applicant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0.0 – 100.0
    pub score: f64,
    pub keywords: String,
}

/// What the triage LLM reports, including the candidate name it read from the CV.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOutcome {
    pub candidate_name: Option<String>,
    pub result: MatchResult,
}

/// Interview evaluation: free-text report and a 1–5 grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub summary: String,
    pub score: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Identifiers & inputs
// ────────────────────────────────────────────────────────────────────────────

/// Prefix marking applicant ids that belong to the anonymous trial flow.
pub const TRYIT_PREFIX: &str = "tryit-";

/// Who is being interviewed: a registered applicant or an anonymous trial user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicantRef {
    Registered(String),
    TryIt(Uuid),
}

impl ApplicantRef {
    /// Parses a client-supplied applicant id. Returns `None` for a malformed
    /// `tryit-` id.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.strip_prefix(TRYIT_PREFIX) {
            Some(id) => Uuid::parse_str(id).ok().map(Self::TryIt),
            None => Some(Self::Registered(raw.to_string())),
        }
    }

    pub fn tryit_id(user_id: Uuid) -> String {
        format!("{TRYIT_PREFIX}{user_id}")
    }
}

/// What a CV is triaged from: a structured applicant record or raw CV text.
#[derive(Debug, Clone, Copy)]
pub enum TriageSubject<'a> {
    Applicant(&'a ApplicantView),
    CvText(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_view_resolves_nested_and_flat_paths() {
        let mut job = JobView::default();
        job.basic.title = Some("Dev".to_string());
        job.profile.activities = Some("Construir APIs".to_string());

        assert_eq!(job.field("informacoes_basicas.titulo_vaga"), Some("Dev"));
        assert_eq!(job.field("titulo"), Some("Dev"));
        assert_eq!(job.field("perfil_vaga.principais_atividades"), Some("Construir APIs"));
        assert_eq!(job.field("atividades"), Some("Construir APIs"));
        assert_eq!(job.field("perfil_vaga.titulo_vaga"), None);
        assert_eq!(job.field("beneficios.valor_venda"), None);
        assert_eq!(job.field("cliente"), None);
    }

    #[test]
    fn test_job_view_deserializes_dataset_shape() {
        let json = r#"{
            "informacoes_basicas": {"titulo_vaga": "Analista SAP", "cliente": "Acme"},
            "perfil_vaga": {"nivel_ingles": "Avançado"}
        }"#;
        let job: JobView = serde_json::from_str(json).unwrap();
        assert_eq!(job.basic.title.as_deref(), Some("Analista SAP"));
        assert_eq!(job.profile.english_level.as_deref(), Some("Avançado"));
        assert_eq!(job.profile.activities, None);
    }

    #[test]
    fn test_turn_history_drops_incomplete_pairs() {
        let history = TurnHistory::from_pairs([("Q1", ""), ("", "A2"), ("Q3", "A3")]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.turns()[0].question, "Q3");
    }

    #[test]
    fn test_turn_history_deserializes_and_filters() {
        let json = r#"[
            {"question": "Olá, tudo bem?", "answer": "Tudo!"},
            {"question": "Fale de você"},
            {"question": "", "answer": "x"},
            {}
        ]"#;
        let history: TurnHistory = serde_json::from_str(json).unwrap();
        assert_eq!(
            history.turns(),
            &[Turn {
                question: "Olá, tudo bem?".to_string(),
                answer: "Tudo!".to_string()
            }]
        );
    }

    #[test]
    fn test_applicant_ref_parse() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApplicantRef::parse(&ApplicantRef::tryit_id(id)),
            Some(ApplicantRef::TryIt(id))
        );
        assert_eq!(
            ApplicantRef::parse("31000"),
            Some(ApplicantRef::Registered("31000".to_string()))
        );
        assert_eq!(ApplicantRef::parse("tryit-42"), None);
    }

    #[test]
    fn test_tryit_view_falls_back_to_keywords() {
        let user = TryItUserRow {
            id: Uuid::new_v4(),
            name: Some("Ana".to_string()),
            job_id: "10".to_string(),
            score: Some(80.0),
            keywords: Some("Rust, SQL".to_string()),
            cv_text: None,
            summary: None,
            grade: None,
            created_at: chrono::Utc::now(),
        };
        let view = ApplicantView::from(&user);
        assert_eq!(view.resume.as_deref(), Some("Rust, SQL"));
        assert_eq!(view.name.as_deref(), Some("Ana"));
    }
}
