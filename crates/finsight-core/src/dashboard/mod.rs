//! Dashboard model and response recovery.
//!
//! The model is asked to return a dashboard object as its entire reply, but
//! real replies come in three flavors: wrapped in a ```json fence, strict
//! JSON, or a JavaScript object literal with function expressions as chart
//! label formatters. [`recover_dashboard`] normalizes all three into a
//! validated [`Dashboard`] or a typed failure -- never a partially
//! populated guess.
//!
//! Wire field names are the Portuguese keys the model was prompted with
//! (`nome_empresa`, `sumario`, `graficos`, `relatorio_texto`); they are kept
//! stable so previously stored dashboards remain readable.

pub mod formatter;
pub mod literal;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

pub use formatter::{FormatterError, LabelFormatter};

use formatter::looks_like_function;
use literal::LiteralValue;

/// Config fields allowed to hold a materialized callable.
///
/// Everything else in a chart config is inert data. This is the whole
/// allow-list: widening it widens the surface where model output becomes
/// an evaluable expression.
pub const CALLABLE_FIELDS: [&str; 1] = ["formatter"];

/// A validated dashboard, ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    #[serde(rename = "nome_empresa")]
    pub company_name: String,
    #[serde(rename = "sumario")]
    pub summary: SummaryCards,
    #[serde(rename = "graficos")]
    pub charts: Vec<ChartPanel>,
    #[serde(rename = "relatorio_texto")]
    pub report_markdown: String,
}

/// The three headline cards of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    #[serde(rename = "faturamento")]
    pub revenue: String,
    #[serde(rename = "lucros")]
    pub profit: String,
    #[serde(rename = "riscos")]
    pub risk: String,
}

/// One chart: a title plus an opaque config consumed by the charting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "config_apexchart")]
    pub config: ChartValue,
}

/// A chart-config tree: JSON-shaped data plus materialized formatters.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ChartValue>),
    /// Key/value pairs in source order.
    Object(Vec<(String, ChartValue)>),
    /// A compiled label formatter (permissive path only).
    Formatter(LabelFormatter),
}

impl ChartValue {
    /// Convert parsed JSON into an inert config tree (no callables).
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ChartValue::Null,
            serde_json::Value::Bool(b) => ChartValue::Bool(b),
            serde_json::Value::Number(n) => ChartValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => ChartValue::String(s),
            serde_json::Value::Array(items) => {
                ChartValue::Array(items.into_iter().map(ChartValue::from_json).collect())
            }
            serde_json::Value::Object(entries) => ChartValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ChartValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Look up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&ChartValue> {
        match self {
            ChartValue::Object(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ChartValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ChartValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_formatter(&self) -> Option<&LabelFormatter> {
        match self {
            ChartValue::Formatter(f) => Some(f),
            _ => None,
        }
    }
}

impl Serialize for ChartValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChartValue::Null => serializer.serialize_unit(),
            ChartValue::Bool(b) => serializer.serialize_bool(*b),
            ChartValue::Number(n) => {
                // Keep integral values integral so serialized configs stay
                // readable by the charting layer.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            ChartValue::String(s) => serializer.serialize_str(s),
            ChartValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ChartValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            // A formatter serializes back to its source text.
            ChartValue::Formatter(f) => serializer.serialize_str(f.source()),
        }
    }
}

/// Why a model reply failed to become a [`Dashboard`].
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("reply is not parseable: {0}")]
    Syntax(String),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("function literal outside allow-listed field '{key}'")]
    ForbiddenFunction { key: String },

    #[error("formatter under '{key}' could not be compiled: {detail}")]
    Formatter { key: String, detail: String },
}

/// Failure to recover a dashboard from a model reply.
///
/// Carries the raw reply text for diagnostics; the underlying reason is in
/// [`DashboardParseError::kind`].
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct DashboardParseError {
    pub kind: ParseFailure,
    /// The unmodified model reply.
    pub raw: String,
}

/// Recover a [`Dashboard`] from a raw model reply.
///
/// Pipeline: unwrap a ```json fence if present, try strict JSON, fall back
/// to the permissive object-literal parser with formatter materialization,
/// then validate the full shape. Fails closed: anything partial or invalid
/// is an error carrying the raw text.
pub fn recover_dashboard(raw: &str) -> Result<Dashboard, DashboardParseError> {
    let candidate = unwrap_fenced(raw).unwrap_or(raw).trim();

    let tree = match serde_json::from_str::<serde_json::Value>(candidate) {
        // Strict path: chart configs remain inert data.
        Ok(value) => ChartValue::from_json(value),
        Err(json_err) => {
            let parsed = literal::parse_literal(candidate).map_err(|lit_err| {
                fail(
                    raw,
                    ParseFailure::Syntax(format!(
                        "not strict JSON ({json_err}) and not an object literal ({lit_err})"
                    )),
                )
            })?;
            materialize(parsed, false, "<root>").map_err(|kind| fail(raw, kind))?
        }
    };

    validate(tree).map_err(|kind| fail(raw, kind))
}

fn fail(raw: &str, kind: ParseFailure) -> DashboardParseError {
    DashboardParseError {
        kind,
        raw: raw.to_string(),
    }
}

/// Interior of a ```json fenced block, when both markers are present.
fn unwrap_fenced(raw: &str) -> Option<&str> {
    let start = raw.find("```json")?;
    let inner = &raw[start + "```json".len()..];
    let end = inner.find("```")?;
    Some(&inner[..end])
}

/// Convert a parsed literal tree into a [`ChartValue`] tree, compiling
/// function literals found under allow-listed keys.
///
/// `allow_callable` is set only for the direct value of an allow-listed
/// object key; it does not propagate through nested containers. A bare
/// function anywhere else cannot be represented as data and fails the
/// parse; a *string* that merely looks like a function stays an inert
/// string outside the allow-list.
fn materialize(
    value: LiteralValue,
    allow_callable: bool,
    key: &str,
) -> Result<ChartValue, ParseFailure> {
    match value {
        LiteralValue::Null => Ok(ChartValue::Null),
        LiteralValue::Bool(b) => Ok(ChartValue::Bool(b)),
        LiteralValue::Number(n) => Ok(ChartValue::Number(n)),
        LiteralValue::Function(src) => {
            if !allow_callable {
                return Err(ParseFailure::ForbiddenFunction {
                    key: key.to_string(),
                });
            }
            LabelFormatter::compile(&src)
                .map(ChartValue::Formatter)
                .map_err(|e| ParseFailure::Formatter {
                    key: key.to_string(),
                    detail: e.to_string(),
                })
        }
        LiteralValue::String(s) => {
            if allow_callable && looks_like_function(&s) {
                return LabelFormatter::compile(&s)
                    .map(ChartValue::Formatter)
                    .map_err(|e| ParseFailure::Formatter {
                        key: key.to_string(),
                        detail: e.to_string(),
                    });
            }
            Ok(ChartValue::String(s))
        }
        LiteralValue::Array(items) => items
            .into_iter()
            .map(|item| materialize(item, false, key))
            .collect::<Result<Vec<_>, _>>()
            .map(ChartValue::Array),
        LiteralValue::Object(entries) => entries
            .into_iter()
            .map(|(k, v)| {
                let allow = CALLABLE_FIELDS.contains(&k.as_str());
                materialize(v, allow, &k).map(|v| (k, v))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ChartValue::Object),
    }
}

/// Validate the full dashboard shape.
fn validate(tree: ChartValue) -> Result<Dashboard, ParseFailure> {
    let ChartValue::Object(root) = tree else {
        return Err(ParseFailure::WrongType {
            field: "<root>".to_string(),
            expected: "an object",
        });
    };

    let company_name = required_string(&root, "nome_empresa")?;
    let report_markdown = required_string(&root, "relatorio_texto")?;

    let summary = match find(&root, "sumario") {
        Some(ChartValue::Object(entries)) => SummaryCards {
            revenue: required_string(entries, "faturamento")?,
            profit: required_string(entries, "lucros")?,
            risk: required_string(entries, "riscos")?,
        },
        Some(_) => {
            return Err(ParseFailure::WrongType {
                field: "sumario".to_string(),
                expected: "an object",
            });
        }
        None => return Err(ParseFailure::MissingField("sumario".to_string())),
    };

    let charts = match find(&root, "graficos") {
        Some(ChartValue::Array(items)) => items
            .iter()
            .map(chart_panel)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ParseFailure::WrongType {
                field: "graficos".to_string(),
                expected: "an array",
            });
        }
        None => return Err(ParseFailure::MissingField("graficos".to_string())),
    };

    Ok(Dashboard {
        company_name,
        summary,
        charts,
        report_markdown,
    })
}

fn chart_panel(item: &ChartValue) -> Result<ChartPanel, ParseFailure> {
    let ChartValue::Object(entries) = item else {
        return Err(ParseFailure::WrongType {
            field: "graficos[]".to_string(),
            expected: "an object",
        });
    };

    let title = required_string(entries, "titulo")?;
    let config = match find(entries, "config_apexchart") {
        Some(config @ ChartValue::Object(_)) => config.clone(),
        Some(_) => {
            return Err(ParseFailure::WrongType {
                field: "config_apexchart".to_string(),
                expected: "an object",
            });
        }
        None => return Err(ParseFailure::MissingField("config_apexchart".to_string())),
    };

    Ok(ChartPanel { title, config })
}

fn find<'a>(entries: &'a [(String, ChartValue)], key: &str) -> Option<&'a ChartValue> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn required_string(entries: &[(String, ChartValue)], key: &str) -> Result<String, ParseFailure> {
    match find(entries, key) {
        Some(ChartValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseFailure::WrongType {
            field: key.to_string(),
            expected: "a string",
        }),
        None => Err(ParseFailure::MissingField(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_DASHBOARD: &str = r####"{
        "nome_empresa": "Acme Ltda",
        "sumario": {
            "faturamento": "R$ 425.000,00",
            "lucros": "R$ 275.000,00",
            "riscos": "Dependência de Clientes"
        },
        "graficos": [
            {
                "titulo": "Evolução de Receitas vs. Despesas",
                "config_apexchart": {
                    "chart": { "type": "line", "height": 350 },
                    "xaxis": { "categories": ["Jan", "Fev", "Mar"] },
                    "series": [
                        { "name": "Receitas", "data": [30000, 40000, 45000] }
                    ]
                }
            }
        ],
        "relatorio_texto": "### Relatório\nTudo certo."
    }"####;

    #[test]
    fn test_strict_json_parses() {
        let dashboard = recover_dashboard(VALID_DASHBOARD).unwrap();
        assert_eq!(dashboard.company_name, "Acme Ltda");
        assert_eq!(dashboard.summary.revenue, "R$ 425.000,00");
        assert_eq!(dashboard.charts.len(), 1);
        assert_eq!(dashboard.charts[0].title, "Evolução de Receitas vs. Despesas");
        assert!(dashboard.report_markdown.starts_with("### Relatório"));
    }

    #[test]
    fn test_fence_stripping_matches_unwrapped() {
        let fenced = format!("Aqui está o dashboard:\n```json\n{VALID_DASHBOARD}\n```\n");
        let from_fenced = recover_dashboard(&fenced).unwrap();
        let from_plain = recover_dashboard(VALID_DASHBOARD).unwrap();
        assert_eq!(from_fenced, from_plain);
    }

    #[test]
    fn test_roundtrip_through_strict_json() {
        let dashboard = recover_dashboard(VALID_DASHBOARD).unwrap();
        let serialized = serde_json::to_string(&dashboard).unwrap();
        let reparsed = recover_dashboard(&serialized).unwrap();
        assert_eq!(reparsed, dashboard);
    }

    #[test]
    fn test_permissive_object_literal() {
        let reply = r#"{
            nome_empresa: 'Acme Ltda',
            sumario: { faturamento: 'R$ 1', lucros: '-', riscos: 'Fluxo de Caixa' },
            graficos: [
                { titulo: 'Pizza', config_apexchart: { labels: ['A', 'B'], series: [1, 2,], } },
            ],
            relatorio_texto: 'ok',
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        assert_eq!(dashboard.company_name, "Acme Ltda");
        assert_eq!(dashboard.summary.profit, "-");
    }

    #[test]
    fn test_bare_function_in_formatter_field_is_materialized() {
        let reply = r#"{
            nome_empresa: "Acme",
            sumario: { faturamento: "1", lucros: "2", riscos: "3" },
            graficos: [{
                titulo: "Barras",
                config_apexchart: {
                    dataLabels: {
                        formatter: function (val) { return val + "%"; }
                    }
                }
            }],
            relatorio_texto: "ok"
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        let formatter = dashboard.charts[0]
            .config
            .get("dataLabels")
            .and_then(|v| v.get("formatter"))
            .and_then(|v| v.as_formatter())
            .expect("formatter should be a callable");
        assert_eq!(formatter.call(&[json!("85")]).unwrap(), json!("85%"));
    }

    #[test]
    fn test_string_encoded_function_in_formatter_field_is_materialized() {
        let reply = r#"{
            nome_empresa: "Acme",
            sumario: { faturamento: "1", lucros: "2", riscos: "3" },
            graficos: [{
                titulo: "Linha",
                config_apexchart: {
                    yaxis: { labels: { formatter: "(v) => 'R$ ' + v" } }
                }
            }],
            relatorio_texto: "ok"
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        let formatter = dashboard.charts[0]
            .config
            .get("yaxis")
            .and_then(|v| v.get("labels"))
            .and_then(|v| v.get("formatter"))
            .and_then(|v| v.as_formatter())
            .expect("formatter should be a callable");
        assert_eq!(formatter.call(&[json!("100")]).unwrap(), json!("R$ 100"));
    }

    #[test]
    fn test_bare_function_outside_allow_list_fails() {
        let reply = r#"{
            nome_empresa: "Acme",
            sumario: { faturamento: "1", lucros: "2", riscos: "3" },
            graficos: [{
                titulo: "x",
                config_apexchart: { onClick: function (e) { return e; } }
            }],
            relatorio_texto: "ok"
        }"#;
        let err = recover_dashboard(reply).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseFailure::ForbiddenFunction { ref key } if key == "onClick"
        ));
    }

    #[test]
    fn test_function_looking_string_outside_allow_list_stays_inert() {
        let reply = r#"{
            nome_empresa: "Acme",
            sumario: { faturamento: "1", lucros: "2", riscos: "3" },
            graficos: [{
                titulo: "x",
                config_apexchart: { note: "function (v) { return v; }" }
            }],
            relatorio_texto: "ok"
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        let note = dashboard.charts[0].config.get("note").unwrap();
        assert_eq!(note.as_str(), Some("function (v) { return v; }"));
    }

    #[test]
    fn test_strict_path_leaves_formatter_strings_inert() {
        // On the strict-JSON path no materialization runs at all.
        let reply = r#"{
            "nome_empresa": "Acme",
            "sumario": { "faturamento": "1", "lucros": "2", "riscos": "3" },
            "graficos": [{
                "titulo": "x",
                "config_apexchart": { "formatter": "(v) => v" }
            }],
            "relatorio_texto": "ok"
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        let value = dashboard.charts[0].config.get("formatter").unwrap();
        assert_eq!(value.as_str(), Some("(v) => v"));
    }

    #[test]
    fn test_missing_field_is_hard_failure() {
        let reply = r#"{"nome_empresa": "Acme", "relatorio_texto": "ok"}"#;
        let err = recover_dashboard(reply).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseFailure::MissingField(ref f) if f == "sumario"
        ));
        assert_eq!(err.raw, reply);
    }

    #[test]
    fn test_wrong_type_is_hard_failure() {
        let reply = r#"{
            "nome_empresa": "Acme",
            "sumario": "not an object",
            "graficos": [],
            "relatorio_texto": "ok"
        }"#;
        let err = recover_dashboard(reply).unwrap_err();
        assert!(matches!(err.kind, ParseFailure::WrongType { .. }));
    }

    #[test]
    fn test_unparseable_reply_carries_raw() {
        let reply = "Desculpe, não consegui gerar o dashboard.";
        let err = recover_dashboard(reply).unwrap_err();
        assert!(matches!(err.kind, ParseFailure::Syntax(_)));
        assert_eq!(err.raw, reply);
    }

    #[test]
    fn test_fence_without_closing_marker_is_not_unwrapped() {
        let reply = format!("```json\n{VALID_DASHBOARD}");
        // No closing fence: the raw text is parsed as-is and fails.
        assert!(recover_dashboard(&reply).is_err());
    }

    #[test]
    fn test_empty_charts_allowed() {
        let reply = r#"{
            "nome_empresa": "Acme",
            "sumario": { "faturamento": "1", "lucros": "2", "riscos": "3" },
            "graficos": [],
            "relatorio_texto": "ok"
        }"#;
        let dashboard = recover_dashboard(reply).unwrap();
        assert!(dashboard.charts.is_empty());
    }

    #[test]
    fn test_chart_value_accessors() {
        let tree = ChartValue::from_json(json!({"a": {"b": [1, "x"]}}));
        assert!(tree.get("a").is_some());
        assert!(tree.get("missing").is_none());
        assert_eq!(
            tree.get("a").and_then(|v| v.get("b")),
            Some(&ChartValue::Array(vec![
                ChartValue::Number(1.0),
                ChartValue::String("x".to_string())
            ]))
        );
    }

    #[test]
    fn test_integral_numbers_serialize_without_fraction() {
        let value = ChartValue::Array(vec![ChartValue::Number(30000.0), ChartValue::Number(1.5)]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[30000,1.5]");
    }
}
