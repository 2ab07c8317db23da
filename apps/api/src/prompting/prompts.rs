// Fixed prompt fragments. Candidates and recruiters work in Brazilian
// Portuguese, so every instruction sent to the model is written in it.

/// Opening of the CV triage prompt.
pub const TRIAGE_INTRO: &str = "Você é um analista de recrutamento sênior. \
Analise o currículo a seguir e retorne um JSON com a nota de match da vaga, \
palavras-chaves do curriculo e nome do candidato.";

/// JSON shape the triage reply must follow. Parsed by `matching::parsing`.
pub const TRIAGE_RESPONSE_FORMAT: &str = r#"Formato de resposta obrigatório:
{
  "nome": "nome_candidato",
  "score": 85.0,
  "keywords": "Python, SQL, Liderança"
}

SOMENTE retorne esse JSON, sem texto explicativo.
O CAMPO SCORE DEVE SER UM NÚMERO ENTRE 0 E 100 INDICANDO O MATCH ENTRE VAGA E CURRÍCULO."#;

/// Opening of the interview-question prompt.
pub const INTERVIEWER_INTRO: &str = "Você é um especialista em RH, experiente em primeiras \
entrevistas, você está conduzindo uma entrevista. Com base na vaga e currículo abaixo:";

/// Stands in for the transcript before any question has been answered.
pub const FIRST_TURN_INSTRUCTION: &str = "Nenhuma pergunta feita até agora. \
Como é a primeira pergunta você deve fazer uma breve saudação ao candidato.";

/// Closing directive: exactly one question, no prefix, no commentary.
pub const NEXT_QUESTION_DIRECTIVE: &str = r#"Agora, elabore a próxima pergunta, considerando o historico anterior, e os detalhes enviados do candidado e vaga

**Não inclua o prefixo "Pergunta:" — apenas escreva a pergunta diretamente.**
Não explique, não adicione introduções. Apenas retorne a próxima pergunta de forma clara e objetiva."#;

/// Header placed before the free-text résumé body in the interview prompt.
pub const RESUME_BODY_HEADER: &str = "Resumo do CV:";

/// Opening of the evaluation prompt; the transcript follows it.
pub const EVALUATOR_INTRO: &str = "Você é um avaliador de entrevistas. Com base nas perguntas \
e respostas abaixo, escreva um relatório resumido e dê uma pontuação de 1 a 5, onde 1 é \
inadequado e 5 é altamente recomendado.";
