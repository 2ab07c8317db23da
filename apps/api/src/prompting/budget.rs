//! Text Budgeter — fits free text into a character allowance while keeping
//! whole sentences from the start and the end of the input.
//!
//! Lengths are counted in `char`s, never bytes, so accented Portuguese text is
//! budgeted the same way it is displayed.

use unicode_segmentation::UnicodeSegmentation;

/// Inserted between the retained head and tail when sentences are dropped.
pub const ELISION_MARKER: &str = "\n[...]\n";

/// Share of the budget given to leading sentences, in tenths.
const HEAD_SHARE_TENTHS: usize = 7;

/// Truncates `text` to roughly `max_length` characters.
///
/// Algorithm:
/// 1. Text that already fits is returned unchanged.
/// 2. Text that segments into a single sentence is hard-cut at `max_length`.
/// 3. Otherwise whole leading sentences are accumulated into 70% of the budget,
///    then whole trailing sentences (scanned from the end) into what is left.
///    Head and tail are joined with [`ELISION_MARKER`].
///
/// Accumulation is greedy and stops at the first sentence that does not fit, so
/// the result can exceed `max_length` by at most the marker length. Text that
/// already carries the marker is accepted within that same overshoot, which
/// makes re-applying the same or a larger budget lossless.
pub fn truncate_smart(text: &str, max_length: usize) -> String {
    let len = char_len(text);
    if len <= max_length {
        return text.to_string();
    }
    if text.contains(ELISION_MARKER) && len <= max_length + char_len(ELISION_MARKER) {
        return text.to_string();
    }

    // UAX #29 sentence bounds: segments keep their trailing whitespace and
    // concatenate back to the exact input.
    let sentences: Vec<&str> = text.split_sentence_bounds().collect();
    if sentences.len() <= 1 {
        return hard_cut(text, max_length);
    }

    let head_budget = max_length * HEAD_SHARE_TENTHS / 10;
    let mut head_len = 0;
    let mut head_count = 0;
    for sentence in &sentences {
        let len = char_len(sentence);
        if head_len + len > head_budget {
            break;
        }
        head_len += len;
        head_count += 1;
    }

    let mut remaining = max_length - head_len;
    let mut tail_start = sentences.len();
    for (idx, sentence) in sentences.iter().enumerate().rev() {
        let len = char_len(sentence);
        if len > remaining {
            break;
        }
        remaining -= len;
        tail_start = idx;
    }

    let head = &sentences[..head_count];
    let tail = &sentences[tail_start..];

    match (head.last(), tail.first()) {
        (Some(last), Some(first)) if last != first => format!(
            "{}{}{}",
            head.concat().trim_end(),
            ELISION_MARKER,
            tail.concat()
        ),
        _ => {
            // No usable tail: keep the head and flag the omission.
            let mut result = head.concat();
            if head_len < max_length && head_count < sentences.len() {
                result.truncate(result.trim_end().len());
                result.push_str(ELISION_MARKER);
            }
            result
        }
    }
}

/// Character count used for every budget comparison.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn hard_cut(text: &str, max_length: usize) -> String {
    text.chars().take(max_length).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CV: &str = "Sou desenvolvedor backend há dez anos. Trabalhei com Python e SQL em bancos. \
        Liderei a migração de sistemas legados para a nuvem. Mentorei cinco pessoas júnior. \
        Tenho inglês avançado e espanhol intermediário. Busco uma posição sênior em produto.";

    fn pieces(output: &str) -> (String, Option<String>) {
        match output.split_once(ELISION_MARKER) {
            Some((head, tail)) => (head.to_string(), Some(tail.to_string())),
            None => (output.to_string(), None),
        }
    }

    #[test]
    fn test_short_text_is_returned_unchanged() {
        assert_eq!(truncate_smart("Olá. Tudo bem?", 100), "Olá. Tudo bem?");
        assert_eq!(truncate_smart("", 0), "");
        assert_eq!(truncate_smart(CV, char_len(CV)), CV);
    }

    #[test]
    fn test_single_sentence_is_hard_cut() {
        let text = "a".repeat(50);
        assert_eq!(truncate_smart(&text, 10), "a".repeat(10));
    }

    #[test]
    fn test_hard_cut_respects_multibyte_chars() {
        let text = "ação".repeat(20);
        let out = truncate_smart(&text, 5);
        assert_eq!(out, "açãoa");
        assert_eq!(char_len(&out), 5);
    }

    #[test]
    fn test_keeps_head_and_tail_with_marker() {
        let out = truncate_smart(CV, 150);
        let (head, tail) = pieces(&out);
        assert!(head.starts_with("Sou desenvolvedor backend"));
        let tail = tail.expect("tail should be kept");
        assert!(tail.ends_with("Busco uma posição sênior em produto."));
        assert!(!out.contains("Mentorei"));
    }

    #[test]
    fn test_head_only_when_tail_does_not_fit() {
        let text = "Curta. Outra curta. Uma frase final muito longa que não cabe de jeito nenhum no orçamento restante.";
        let out = truncate_smart(text, 40);
        assert_eq!(out, format!("Curta. Outra curta.{ELISION_MARKER}"));
    }

    #[test]
    fn test_output_never_exceeds_budget_plus_marker() {
        let marker_len = char_len(ELISION_MARKER);
        let inputs = [
            CV.to_string(),
            "Um. Dois. Três. Quatro. Cinco. Seis. Sete. Oito. Nove. Dez.".repeat(7),
            "Frase média sobre experiência. ".repeat(40),
            format!("{} Fim.", "x".repeat(300)),
        ];
        for input in &inputs {
            for max in 1..=char_len(input) + 5 {
                let out = truncate_smart(input, max);
                assert!(
                    char_len(&out) <= max + marker_len,
                    "max={max} produced {} chars",
                    char_len(&out)
                );
            }
        }
    }

    #[test]
    fn test_never_splits_a_sentence() {
        let input = "Primeira frase aqui. Segunda frase um pouco maior. Terceira. Quarta frase de teste! \
            Quinta frase? Sexta frase para fechar o texto.";
        for max in 20..char_len(input) {
            let out = truncate_smart(input, max);
            let (head, tail) = pieces(&out);
            assert!(input.starts_with(&head), "head fragment at max={max}: {head:?}");
            if let Some(tail) = tail {
                assert!(input.ends_with(&tail), "tail fragment at max={max}: {tail:?}");
            }
        }
    }

    #[test]
    fn test_reapplying_same_budget_is_a_no_op() {
        for max in 1..char_len(CV) {
            let once = truncate_smart(CV, max);
            let twice = truncate_smart(&once, max);
            assert_eq!(once, twice, "max={max}");
        }
    }

    #[test]
    fn test_reapplying_larger_budget_keeps_everything() {
        for max in 40..char_len(CV) {
            let once = truncate_smart(CV, max);
            assert_eq!(truncate_smart(&once, max + 25), once, "max={max}");
        }
    }

    #[test]
    fn test_overshooting_output_survives_second_pass() {
        let once = truncate_smart(CV, 75);
        assert!(char_len(&once) > 75);
        assert!(once.ends_with("Busco uma posição sênior em produto."));
        assert_eq!(truncate_smart(&once, 75), once);
    }

    #[test]
    fn test_abbreviation_before_capital_is_a_sentence_bound() {
        let parts: Vec<&str> = "O Sr. Silva chegou. Fim.".split_sentence_bounds().collect();
        assert_eq!(parts, vec!["O Sr. ", "Silva chegou. ", "Fim."]);
    }
}
