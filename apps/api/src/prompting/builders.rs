//! Prompt Builders — pure functions that compose the three instruction strings
//! (CV triage, next interview question, interview evaluation).
//!
//! Every structured section is held to its ceiling by smart truncation, never
//! by rejecting the input.

use crate::matching::models::{ApplicantView, JobView, TriageSubject, TurnHistory};
use crate::prompting::budget::{char_len, truncate_smart};
use crate::prompting::fields::{extract_fields, FieldSource, FieldSpec};
use crate::prompting::prompts::{
    EVALUATOR_INTRO, FIRST_TURN_INSTRUCTION, INTERVIEWER_INTRO, NEXT_QUESTION_DIRECTIVE,
    RESUME_BODY_HEADER, TRIAGE_INTRO, TRIAGE_RESPONSE_FORMAT,
};

/// Ceiling for the rendered job section.
pub const JOB_SECTION_CEILING: usize = 1000;
/// Ceiling for a structured applicant section in triage.
pub const APPLICANT_SECTION_CEILING: usize = 1500;
/// Ceiling for raw CV text in triage.
pub const CV_TEXT_CEILING: usize = 1000;
/// Ceiling for the résumé section of the interview prompt.
pub const RESUME_SECTION_CEILING: usize = 1000;
/// Characters reserved for the résumé body header and its blank lines.
const RESUME_HEADER_OVERHEAD: usize = 20;
/// Below this allowance the résumé body is not worth including.
const MIN_RESUME_ALLOWANCE: usize = 100;

pub const TRIAGE_JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("informacoes_basicas.titulo_vaga", 1, 100),
    FieldSpec::new("informacoes_basicas.cliente", 2, 100),
    FieldSpec::new("informacoes_basicas.objetivo_vaga", 1, 200),
    FieldSpec::new("informacoes_basicas.tipo_contratacao", 2, 100),
    FieldSpec::new("perfil_vaga.nivel_profissional", 1, 100),
    FieldSpec::new("perfil_vaga.nivel_academico", 1, 100),
    FieldSpec::new("perfil_vaga.nivel_ingles", 2, 50),
    FieldSpec::new("perfil_vaga.nivel_espanhol", 2, 50),
    FieldSpec::new("perfil_vaga.principais_atividades", 1, 300),
    FieldSpec::new("perfil_vaga.competencia_tecnicas_e_comportamentais", 1, 300),
];

pub const INTERVIEW_JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("informacoes_basicas.titulo_vaga", 1, 100),
    FieldSpec::new("informacoes_basicas.cliente", 1, 100),
    FieldSpec::new("informacoes_basicas.objetivo_vaga", 1, 200),
    FieldSpec::new("informacoes_basicas.tipo_contratacao", 2, 100),
    FieldSpec::new("perfil_vaga.nivel_profissional", 2, 100),
    FieldSpec::new("perfil_vaga.nivel_academico", 2, 100),
    FieldSpec::new("perfil_vaga.nivel_ingles", 3, 50),
    FieldSpec::new("perfil_vaga.nivel_espanhol", 3, 50),
    FieldSpec::new("perfil_vaga.principais_atividades", 1, 300),
    FieldSpec::new("perfil_vaga.competencia_tecnicas_e_comportamentais", 1, 300),
];

pub const TRIAGE_APPLICANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("titulo_profissional", 1, 100),
    FieldSpec::new("area_atuacao", 1, 100),
    FieldSpec::new("nivel_academico", 2, 100),
    FieldSpec::new("nivel_ingles", 2, 50),
    FieldSpec::new("nivel_espanhol", 2, 50),
    FieldSpec::new("conhecimentos_tecnicos", 1, 300),
    FieldSpec::new("certificacoes", 2, 200),
    FieldSpec::new("cv_pt", 1, 600),
];

/// The résumé body is appended separately, so it is not listed here.
pub const INTERVIEW_APPLICANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("nome", 1, 100),
    FieldSpec::new("area_atuacao", 1, 100),
    FieldSpec::new("nivel_academico", 2, 100),
    FieldSpec::new("nivel_ingles", 3, 50),
    FieldSpec::new("nivel_espanhol", 3, 50),
];

/// Extracts `specs` from `record` and re-truncates the block if the
/// concatenation still exceeds `ceiling`.
pub fn budgeted_section<S>(record: &S, specs: &[FieldSpec], ceiling: usize) -> String
where
    S: FieldSource + ?Sized,
{
    let section = extract_fields(record, specs);
    if char_len(&section) > ceiling {
        truncate_smart(&section, ceiling)
    } else {
        section
    }
}

/// CV triage prompt. The reply must be a JSON object with `nome`, `score`
/// (0–100) and `keywords`.
pub fn build_triage_prompt(job: &JobView, subject: TriageSubject<'_>) -> String {
    let job_description = budgeted_section(job, TRIAGE_JOB_FIELDS, JOB_SECTION_CEILING);
    let resume_text = match subject {
        TriageSubject::Applicant(applicant) => {
            budgeted_section(applicant, TRIAGE_APPLICANT_FIELDS, APPLICANT_SECTION_CEILING)
        }
        TriageSubject::CvText(cv) => truncate_smart(cv, CV_TEXT_CEILING),
    };

    format!(
        "\n{TRIAGE_INTRO}\n\nVaga:\n{job_description}\n\nCurrículo:\n{resume_text}\n\n{TRIAGE_RESPONSE_FORMAT}\n"
    )
}

/// Next-question prompt for a simulated interview.
///
/// The résumé body gets whatever is left of [`RESUME_SECTION_CEILING`] after
/// the structured applicant fields; it is dropped entirely when that allowance
/// is 100 characters or less.
pub fn build_interview_prompt(
    job: &JobView,
    applicant: &ApplicantView,
    history: &TurnHistory,
) -> String {
    let job_description = budgeted_section(job, INTERVIEW_JOB_FIELDS, JOB_SECTION_CEILING);
    let resume_text = interview_resume_section(applicant);

    let transcript = if history.is_empty() {
        FIRST_TURN_INSTRUCTION.to_string()
    } else {
        history
            .turns()
            .iter()
            .map(|t| format!("Pergunta: {}\nResposta: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "\n{INTERVIEWER_INTRO}\n\nVAGA:\n{job_description}\n\nCURRÍCULO:\n{resume_text}\n\n\
         Histórico da entrevista:\n{transcript}\n\n{NEXT_QUESTION_DIRECTIVE}\n"
    )
}

fn interview_resume_section(applicant: &ApplicantView) -> String {
    let basic = extract_fields(applicant, INTERVIEW_APPLICANT_FIELDS);

    let Some(cv) = applicant.resume.as_deref().filter(|cv| !cv.is_empty()) else {
        return basic;
    };
    let Some(allowance) = resume_allowance(char_len(&basic)) else {
        return basic;
    };

    format!(
        "{basic}\n\n{RESUME_BODY_HEADER}\n{}",
        truncate_smart(cv, allowance)
    )
}

/// Characters left for the résumé body once `structured_len` characters of
/// applicant fields are in, or `None` when that is not worth sending.
fn resume_allowance(structured_len: usize) -> Option<usize> {
    let allowance =
        RESUME_SECTION_CEILING.saturating_sub(structured_len + RESUME_HEADER_OVERHEAD);
    (allowance > MIN_RESUME_ALLOWANCE).then_some(allowance)
}

/// Evaluation prompt over the full transcript. Questions and answers are
/// paired positionally; no pair is filtered out.
pub fn build_evaluation_prompt(questions: &[String], answers: &[String]) -> String {
    let transcript = questions
        .iter()
        .zip(answers)
        .map(|(q, a)| format!("Q: {q}\nA: {a}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("\n{EVALUATOR_INTRO}\n\n{transcript}\n")
}
