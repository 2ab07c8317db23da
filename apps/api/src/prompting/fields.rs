//! Field Extractor — flattens a structured record into labelled prompt lines.

use crate::prompting::budget::{char_len, truncate_smart};

/// One entry of an extraction spec: which field to pull, how important it is,
/// and its per-field character ceiling (`0` disables truncation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: &'static str,
    /// Not used for selection yet: every listed field is always attempted.
    #[allow(dead_code)]
    pub priority: u8,
    pub max_chars: usize,
}

impl FieldSpec {
    pub const fn new(path: &'static str, priority: u8, max_chars: usize) -> Self {
        Self {
            path,
            priority,
            max_chars,
        }
    }
}

/// A record whose fields can be looked up by path.
///
/// Nested records accept dotted paths (`perfil_vaga.nivel_academico`); flat
/// records accept the bare field name.
pub trait FieldSource {
    fn field(&self, path: &str) -> Option<&str>;
}

/// Renders every present field of `record` named in `specs`, in spec order.
///
/// Missing and empty fields are skipped without a label. Each kept line is
/// `"<Label>: <value>"`, where the label is the last path segment title-cased.
pub fn extract_fields<S>(record: &S, specs: &[FieldSpec]) -> String
where
    S: FieldSource + ?Sized,
{
    let mut lines = Vec::with_capacity(specs.len());

    for spec in specs {
        let Some(value) = record.field(spec.path).filter(|v| !v.is_empty()) else {
            continue;
        };

        let value = if spec.max_chars > 0 && char_len(value) > spec.max_chars {
            truncate_smart(value, spec.max_chars)
        } else {
            value.to_string()
        };

        lines.push(format!("{}: {}", field_label(spec.path), value));
    }

    lines.join("\n")
}

/// `perfil_vaga.nivel_academico` → `Nivel Academico`.
pub fn field_label(path: &str) -> String {
    let name = path.rsplit('.').next().unwrap_or(path).replace('_', " ");

    let mut label = String::with_capacity(name.len());
    let mut prev_is_letter = false;
    for c in name.chars() {
        if prev_is_letter {
            label.extend(c.to_lowercase());
        } else {
            label.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Flat<'a>(HashMap<&'a str, &'a str>);

    impl FieldSource for Flat<'_> {
        fn field(&self, path: &str) -> Option<&str> {
            self.0.get(path).copied()
        }
    }

    fn flat<'a>(pairs: &[(&'a str, &'a str)]) -> Flat<'a> {
        Flat(pairs.iter().copied().collect())
    }

    #[test]
    fn test_empty_spec_yields_empty_string() {
        let record = flat(&[("titulo", "Engenheiro")]);
        assert_eq!(extract_fields(&record, &[]), "");
    }

    #[test]
    fn test_skips_empty_fields() {
        let record = flat(&[("titulo", "Engenheiro"), ("cliente", "")]);
        let specs = [
            FieldSpec::new("titulo", 1, 100),
            FieldSpec::new("cliente", 1, 100),
        ];
        assert_eq!(extract_fields(&record, &specs), "Titulo: Engenheiro");
    }

    #[test]
    fn test_preserves_spec_order_and_skips_missing() {
        let record = flat(&[("b_campo", "2"), ("a_campo", "1")]);
        let specs = [
            FieldSpec::new("b_campo", 3, 0),
            FieldSpec::new("ausente", 1, 0),
            FieldSpec::new("a_campo", 1, 0),
        ];
        assert_eq!(extract_fields(&record, &specs), "B Campo: 2\nA Campo: 1");
    }

    #[test]
    fn test_truncates_long_values() {
        let long = "Primeira frase longa sobre o perfil. Segunda frase sobre atividades. Terceira frase final.";
        let record = Flat(HashMap::from([("atividades", long)]));
        let out = extract_fields(&record, &[FieldSpec::new("atividades", 1, 60)]);
        assert!(out.starts_with("Atividades: Primeira frase longa sobre o perfil."));
        assert!(out.contains("[...]"));
    }

    #[test]
    fn test_zero_ceiling_disables_truncation() {
        let long = "Frase. ".repeat(100);
        let record = Flat(HashMap::from([("cv_pt", long.as_str())]));
        let out = extract_fields(&record, &[FieldSpec::new("cv_pt", 1, 0)]);
        assert_eq!(out, format!("Cv Pt: {long}"));
    }

    #[test]
    fn test_field_label() {
        assert_eq!(field_label("informacoes_basicas.titulo_vaga"), "Titulo Vaga");
        assert_eq!(
            field_label("perfil_vaga.competencia_tecnicas_e_comportamentais"),
            "Competencia Tecnicas E Comportamentais"
        );
        assert_eq!(field_label("nivel_ingles"), "Nivel Ingles");
        assert_eq!(field_label("área_atuação"), "Área Atuação");
    }
}
