//! Prompt assembly for analysis and dashboard requests.
//!
//! The two request flavors share one assembler: [`PromptKind`] selects the
//! fixed system instruction, and [`build_user_turn`] interpolates the user's
//! question with the uploaded tabular data. Tabular data is opaque here and
//! forwarded verbatim as pretty-printed JSON.

use finsight_types::analysis::AnalysisPayload;

/// System instruction for the conversational analysis flow.
///
/// Guard-railed: the assistant only analyzes company financial data and
/// politely refuses anything else. The analysis adapts to the data shape
/// (single company vs. payment network).
pub const ANALYSIS_INSTRUCTIONS: &str = "\
Você é um assistente de IA especialista em ciência de dados e análise financeira para o setor bancário. Seja objetivo e profissional.

---
**REGRAS E LIMITAÇÕES (GUARD RAILS):**
1.  **FOCO TOTAL:** Sua única função é analisar dados financeiros de empresas (PJ).
2.  **RECUSA OBRIGATÓRIA:** Recuse educadamente qualquer pergunta fora deste escopo (conhecimentos gerais, conversas casuais, etc).
3.  **EXEMPLO DE RECUSA:** \"Como um assistente de análise financeira, meu foco é em dados de empresas. Não consigo ajudar com outros assuntos. Por favor, forneça os dados para que eu possa iniciar a análise.\"
---

**INSTRUÇÕES DE ANÁLISE:**
Sua análise se adapta automaticamente à estrutura dos dados fornecidos.

1.  **SE OS DADOS FOREM DE UMA ÚNICA EMPRESA (com colunas como 'data', 'tipo', 'valor', 'participante'):**
    * **OBJETIVO:** Gerar um relatório de **Perfil de Negócio**.
    * **TAREFAS:** Analise a saúde financeira, fluxo de caixa, sazonalidade e identifique os principais clientes e fornecedores.

2.  **SE OS DADOS FOREM DE UMA REDE DE EMPRESAS (com colunas como 'ID_PGTO', 'ID_RCBE', 'VL'):**
    * **OBJETIVO:** Gerar uma **Análise de Cadeia de Valor**.
    * **TAREFAS:** Mapeie as conexões da rede, identifique as empresas centrais (hubs) e avalie o risco do ecossistema.
---

Vá direto ao ponto e entregue a análise solicitada.";

/// System instruction for the dashboard-generation flow.
///
/// Asks the model to return ONLY a JSON object with the exact dashboard
/// shape (`nome_empresa`, `sumario`, `graficos`, `relatorio_texto`). Real
/// replies still sometimes violate the no-markdown rule, which is why the
/// recovery parser exists.
pub const DASHBOARD_INSTRUCTIONS: &str = "\
Você é um assistente de IA especialista em ciência de dados e análise financeira. Sua tarefa é analisar um conjunto de dados financeiros (em JSON) de uma empresa e gerar um objeto JSON completo para popular um dashboard.

O JSON de saída DEVE ter EXATAMENTE a seguinte estrutura, com configurações ApexCharts VÁLIDAS:
{
  \"nome_empresa\": \"O nome da empresa principal, se identificável nos dados, ou 'Empresa Analisada'\",
  \"sumario\": {
    \"faturamento\": \"Valor total de receitas, formatado como string. Ex: 'R$ 425.000,00'\",
    \"lucros\": \"Cálculo do (Receitas - Despesas), formatado como string. Ex: 'R$ 275.000,00'. Se não for possível calcular, use '-'\",
    \"riscos\": \"Uma palavra ou frase curta que resume o principal risco. Ex: 'Dependência de Clientes', 'Fluxo de Caixa', 'Concentração de Fornecedores'\"
  },
  \"graficos\": [
    {
      \"titulo\": \"Título do gráfico\",
      \"config_apexchart\": { \"chart\": { \"type\": \"line\", \"height\": 350 }, \"series\": [] }
    }
  ],
  \"relatorio_texto\": \"Um relatório de análise financeira completo, formatado em Markdown.\"
}

**REGRAS ESTRITAS:**
1.  Sua resposta deve ser APENAS o objeto JSON.
2.  NÃO inclua markdown como ```json no início ou fim da sua resposta.
3.  NÃO inclua nenhum texto explicativo antes ou depois do objeto JSON.
4.  Garanta que o JSON seja estritamente válido, sem vírgulas extras no final de listas ou objetos e com todas as strings entre aspas duplas.";

/// Fallback question when the payload carries data but no question.
pub const DEFAULT_QUESTION: &str = "Analise os dados fornecidos e gere um relatório completo.";

/// Which fixed system instruction a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Conversational analysis with history replay.
    Analysis,
    /// Stateless structured dashboard generation.
    Dashboard,
}

impl PromptKind {
    /// The system instruction text for this prompt kind.
    pub fn system_instruction(&self) -> &'static str {
        match self {
            PromptKind::Analysis => ANALYSIS_INSTRUCTIONS,
            PromptKind::Dashboard => DASHBOARD_INSTRUCTIONS,
        }
    }
}

/// Build the user-turn text for an analysis payload.
///
/// With tabular data present, the question and the pretty-printed data are
/// interpolated into one delimited message; without it, the message is just
/// the question (or [`DEFAULT_QUESTION`]). This full interpolated text is
/// what gets persisted in history and replayed on later turns.
pub fn build_user_turn(payload: &AnalysisPayload) -> String {
    let question = payload.question.as_deref().unwrap_or(DEFAULT_QUESTION);

    match &payload.tabular_data {
        Some(data) => {
            let serialized =
                serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            format!(
                "**Pergunta do Usuário:** \"{question}\"\n\n\
                 **Dados para Análise (enviados nesta mensagem):**\n{serialized}"
            )
        }
        None => question.to_string(),
    }
}

/// Build the single user turn for a dashboard-generation request.
///
/// The dashboard exchange is stateless: this turn and the dashboard system
/// instruction are the entire request.
pub fn build_dashboard_turn(data: &serde_json::Value) -> String {
    let serialized = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    format!("**Dados para Análise (JSON):**\n```json\n{serialized}\n```")
}
