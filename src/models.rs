use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StatementKind {
    Dfc,
    Dre,
}

impl StatementKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            StatementKind::Dfc => "/dfc",
            StatementKind::Dre => "/dre",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StatementKind::Dfc => "Fluxo de Caixa (DFC)",
            StatementKind::Dre => "Resultado do Exercício (DRE)",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            StatementKind::Dfc => "dfc",
            StatementKind::Dre => "dre",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MomSeries {
    Receber,
    Pagar,
    Movimentacoes,
}

impl MomSeries {
    pub fn endpoint(self) -> &'static str {
        match self {
            MomSeries::Receber => "/receber",
            MomSeries::Pagar => "/pagar",
            MomSeries::Movimentacoes => "/movimentacoes",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MomSeries::Receber => "Contas a Receber",
            MomSeries::Pagar => "Contas a Pagar",
            MomSeries::Movimentacoes => "Movimentações",
        }
    }
}

/// Column granularity of the period pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Granularity {
    #[default]
    #[value(name = "mes")]
    Month,
    #[value(name = "trimestre")]
    Quarter,
    #[value(name = "ano")]
    Year,
}

impl Granularity {
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Month => "Mensal",
            Granularity::Quarter => "Trimestral",
            Granularity::Year => "Anual",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Granularity::Month => Granularity::Quarter,
            Granularity::Quarter => Granularity::Year,
            Granularity::Year => Granularity::Month,
        }
    }
}

// ---------------------------------------------------------------------------
// Period maps
// ---------------------------------------------------------------------------

/// Returns the keys a period label may be stored under: the bare label, then
/// the `.0` variant left behind by numeric-to-string coercion upstream.
fn label_variants(label: &str) -> [String; 2] {
    [label.to_string(), format!("{label}.0")]
}

/// Sparse mapping from period label to amount. Absent labels are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodMap(BTreeMap<String, f64>);

impl PeriodMap {
    pub fn get(&self, label: &str) -> Option<f64> {
        label_variants(label)
            .iter()
            .find_map(|key| self.0.get(key).copied())
    }
}

impl FromIterator<(String, f64)> for PeriodMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        PeriodMap(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for PeriodMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| json_number(&v).map(|n| (k, n)))
            .collect())
    }
}

/// Sparse mapping from period label to a percentage already formatted by the
/// backend (e.g. `"12.5%"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PctMap(BTreeMap<String, String>);

impl PctMap {
    pub fn get(&self, label: &str) -> Option<&str> {
        label_variants(label)
            .iter()
            .find_map(|key| self.0.get(key).map(String::as_str))
    }
}

impl FromIterator<(String, String)> for PctMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        PctMap(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for PctMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| json_pct(&v).map(|s| (k, s)))
            .collect())
    }
}

fn json_number(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_pct(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => n.as_f64().map(|f| format!("{f:.1}%")),
        _ => None,
    }
}

fn deserialize_opt_pct<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(json_pct))
}

fn deserialize_opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(json_number))
}

fn deserialize_years<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i32>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .iter()
        .filter_map(json_number)
        .map(|y| y.trunc() as i32)
        .collect())
}

// ---------------------------------------------------------------------------
// Financial tree
// ---------------------------------------------------------------------------

/// Stable synthetic identity of a node: its index path from the root list.
/// Display text (`nome`) is never used as identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Vec<usize>);

impl NodeId {
    pub fn root(index: usize) -> Self {
        NodeId(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        NodeId(path)
    }

    /// Zero for top-level nodes.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// The `tipo` marker of a line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineKind {
    /// `+` inflow / revenue
    Inflow,
    /// `-` outflow / expense
    Outflow,
    /// `=` totalizer result
    Result,
    #[default]
    Unmarked,
    Other(String),
}

impl LineKind {
    pub fn marker(&self) -> &str {
        match self {
            LineKind::Inflow => "+",
            LineKind::Outflow => "-",
            LineKind::Result => "=",
            LineKind::Unmarked => "",
            LineKind::Other(s) => s,
        }
    }
}

impl From<String> for LineKind {
    fn from(s: String) -> Self {
        match s.trim() {
            "+" => LineKind::Inflow,
            "-" => LineKind::Outflow,
            "=" => LineKind::Result,
            "" => LineKind::Unmarked,
            other => LineKind::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for LineKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.map(LineKind::from).unwrap_or_default())
    }
}

fn blank_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialNode {
    #[serde(skip)]
    pub id: NodeId,
    #[serde(default)]
    pub tipo: LineKind,
    #[serde(default, deserialize_with = "blank_if_null")]
    pub nome: String,

    #[serde(default)]
    pub valores_mensais: Option<PeriodMap>,
    #[serde(default)]
    pub valores_trimestrais: Option<PeriodMap>,
    #[serde(default)]
    pub valores_anuais: Option<PeriodMap>,

    #[serde(default)]
    pub orcamentos_mensais: Option<PeriodMap>,
    #[serde(default)]
    pub orcamentos_trimestrais: Option<PeriodMap>,
    #[serde(default)]
    pub orcamentos_anuais: Option<PeriodMap>,

    #[serde(default)]
    pub vertical_mensais: Option<PctMap>,
    #[serde(default)]
    pub vertical_trimestrais: Option<PctMap>,
    #[serde(default)]
    pub vertical_anuais: Option<PctMap>,

    #[serde(default)]
    pub horizontal_mensais: Option<PctMap>,
    #[serde(default)]
    pub horizontal_trimestrais: Option<PctMap>,
    #[serde(default)]
    pub horizontal_anuais: Option<PctMap>,

    #[serde(default, deserialize_with = "deserialize_opt_pct")]
    pub vertical_total: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_pct")]
    pub horizontal_total: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_pct")]
    pub vertical_orcamentos_total: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_pct")]
    pub horizontal_orcamentos_total: Option<String>,

    #[serde(default)]
    pub classificacoes: Vec<FinancialNode>,
}

impl FinancialNode {
    pub fn values(&self, g: Granularity) -> Option<&PeriodMap> {
        match g {
            Granularity::Month => self.valores_mensais.as_ref(),
            Granularity::Quarter => self.valores_trimestrais.as_ref(),
            Granularity::Year => self.valores_anuais.as_ref(),
        }
    }

    pub fn budgets(&self, g: Granularity) -> Option<&PeriodMap> {
        match g {
            Granularity::Month => self.orcamentos_mensais.as_ref(),
            Granularity::Quarter => self.orcamentos_trimestrais.as_ref(),
            Granularity::Year => self.orcamentos_anuais.as_ref(),
        }
    }

    pub fn vertical(&self, g: Granularity) -> Option<&PctMap> {
        match g {
            Granularity::Month => self.vertical_mensais.as_ref(),
            Granularity::Quarter => self.vertical_trimestrais.as_ref(),
            Granularity::Year => self.vertical_anuais.as_ref(),
        }
    }

    pub fn horizontal(&self, g: Granularity) -> Option<&PctMap> {
        match g {
            Granularity::Month => self.horizontal_mensais.as_ref(),
            Granularity::Quarter => self.horizontal_trimestrais.as_ref(),
            Granularity::Year => self.horizontal_anuais.as_ref(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.classificacoes.is_empty()
    }

    fn assign_ids(&mut self, id: NodeId) {
        for (i, child) in self.classificacoes.iter_mut().enumerate() {
            child.assign_ids(id.child(i));
        }
        self.id = id;
    }
}

/// A fetched DFC or DRE response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub meses: Vec<String>,
    #[serde(default)]
    pub trimestres: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_years")]
    pub anos: Vec<i32>,
    #[serde(default)]
    pub data: Vec<FinancialNode>,
}

impl Statement {
    /// Build a statement from nodes and give every node its index-path id.
    pub fn new(meses: Vec<String>, trimestres: Vec<String>, anos: Vec<i32>, data: Vec<FinancialNode>) -> Self {
        let mut s = Statement { meses, trimestres, anos, data };
        s.assign_ids();
        s
    }

    pub fn assign_ids(&mut self) {
        for (i, node) in self.data.iter_mut().enumerate() {
            node.assign_ids(NodeId::root(i));
        }
    }

    /// Every node in depth-first order, regardless of expand state.
    pub fn walk(&self) -> Vec<&FinancialNode> {
        fn visit<'a>(node: &'a FinancialNode, out: &mut Vec<&'a FinancialNode>) {
            out.push(node);
            for child in &node.classificacoes {
                visit(child, out);
            }
        }
        let mut out = Vec::new();
        for node in &self.data {
            visit(node, &mut out);
        }
        out
    }

    pub fn find(&self, id: &NodeId) -> Option<&FinancialNode> {
        let mut path = id.0.iter();
        let mut node = self.data.get(*path.next()?)?;
        for &i in path {
            node = node.classificacoes.get(i)?;
        }
        Some(node)
    }
}

/// Body of `GET /dfc` and `GET /dre`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatementPayload {
    Failure { error: String },
    Success(Statement),
}

// ---------------------------------------------------------------------------
// Month-over-month series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MomItem {
    pub mes: String,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub valor_atual: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub valor_anterior: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub variacao_absoluta: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub variacao_percentual: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MomData {
    #[serde(default)]
    pub mom_analysis: Vec<MomItem>,
}

/// Body of `GET /receber`, `GET /pagar` and `GET /movimentacoes`.
#[derive(Debug, Deserialize)]
pub struct MomPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<MomData>,
    #[serde(default)]
    pub error: Option<String>,
}
