//! Chart adapters: turn month-over-month series into bars a chart widget can
//! draw, with one period optionally marked as selected.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::MomItem;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    pub highlighted: bool,
}

impl ChartBar {
    /// Bar height for widgets that only take unsigned magnitudes; the sign is
    /// conveyed by colour.
    pub fn magnitude(&self) -> u64 {
        self.value.abs().round() as u64
    }

    pub fn is_negative(&self) -> bool {
        self.value < 0.0
    }
}

/// One month of the derived net-movement series.
#[derive(Debug, Clone, PartialEq)]
pub struct NetMovementPoint {
    pub mes: String,
    pub receber: f64,
    pub pagar: f64,
    pub net: f64,
    pub movimentacoes: Option<f64>,
}

/// MoM items ordered by month.
pub fn sorted_mom(items: &[MomItem]) -> Vec<MomItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| a.mes.cmp(&b.mes));
    sorted
}

pub fn mom_bars(items: &[MomItem], selected: Option<&str>) -> Vec<ChartBar> {
    sorted_mom(items)
        .into_iter()
        .map(|item| ChartBar {
            highlighted: selected == Some(item.mes.as_str()),
            value: item.valor_atual.unwrap_or(0.0),
            label: item.mes,
        })
        .collect()
}

fn by_month(items: &[MomItem]) -> BTreeMap<&str, f64> {
    items
        .iter()
        .filter_map(|i| i.valor_atual.map(|v| (i.mes.as_str(), v)))
        .collect()
}

/// Derive net movement per month as receivables minus payables. Payables are
/// taken as magnitudes so either sign convention upstream works. The
/// movements series, when present, rides along for comparison.
pub fn net_movement(
    receber: &[MomItem],
    pagar: &[MomItem],
    movimentacoes: &[MomItem],
) -> Vec<NetMovementPoint> {
    let rec = by_month(receber);
    let pag = by_month(pagar);
    let mov = by_month(movimentacoes);

    let months: BTreeSet<&str> = rec.keys().chain(pag.keys()).chain(mov.keys()).copied().collect();
    months
        .into_iter()
        .map(|m| {
            let r = rec.get(m).copied().unwrap_or(0.0);
            let p = pag.get(m).copied().unwrap_or(0.0).abs();
            NetMovementPoint {
                mes: m.to_string(),
                receber: r,
                pagar: p,
                net: r - p,
                movimentacoes: mov.get(m).copied(),
            }
        })
        .collect()
}

pub fn net_bars(points: &[NetMovementPoint], selected: Option<&str>) -> Vec<ChartBar> {
    points
        .iter()
        .map(|p| ChartBar {
            label: p.mes.clone(),
            value: p.net,
            highlighted: selected == Some(p.mes.as_str()),
        })
        .collect()
}

/// Move a selection through `labels` by `delta`, clamping at both ends. With
/// nothing selected yet the last label is chosen.
pub fn step_selection(labels: &[String], selected: Option<&str>, delta: i32) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let last = labels.len() as i32 - 1;
    let idx = match selected.and_then(|s| labels.iter().position(|l| l == s)) {
        Some(i) => (i as i32 + delta).clamp(0, last),
        None => last,
    };
    labels.get(idx as usize).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(mes: &str, atual: Option<f64>) -> MomItem {
        MomItem {
            mes: mes.to_string(),
            valor_atual: atual,
            ..Default::default()
        }
    }

    #[test]
    fn test_mom_bars_sorted_and_highlighted() {
        let items = vec![item("2024-02", Some(20.0)), item("2024-01", Some(10.0))];
        let bars = mom_bars(&items, Some("2024-02"));
        assert_eq!(bars[0].label, "2024-01");
        assert!(!bars[0].highlighted);
        assert!(bars[1].highlighted);
        assert_eq!(bars[1].magnitude(), 20);
    }

    #[test]
    fn test_missing_value_draws_empty_bar() {
        let bars = mom_bars(&[item("2024-01", None)], None);
        assert_eq!(bars[0].value, 0.0);
        assert!(bars.iter().all(|b| !b.highlighted));
    }

    #[test]
    fn test_net_movement_receivables_minus_payables() {
        let receber = vec![item("2024-01", Some(100.0)), item("2024-02", Some(50.0))];
        let pagar = vec![item("2024-01", Some(-30.0)), item("2024-03", Some(40.0))];
        let mov = vec![item("2024-01", Some(70.0))];
        let points = net_movement(&receber, &pagar, &mov);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].net, 70.0);
        assert_eq!(points[0].movimentacoes, Some(70.0));
        assert_eq!(points[1].net, 50.0);
        assert_eq!(points[2].net, -40.0);
        assert_eq!(points[2].movimentacoes, None);

        let bars = net_bars(&points, Some("2024-03"));
        assert!(bars[2].is_negative());
        assert!(bars[2].highlighted);
    }

    #[test]
    fn test_net_movement_keeps_months_only_in_movements() {
        let receber = vec![item("2024-02", Some(10.0))];
        let mov = vec![item("2024-01", Some(-25.0)), item("2024-02", Some(5.0))];
        let points = net_movement(&receber, &[], &mov);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].mes, "2024-01");
        assert_eq!(points[0].net, 0.0);
        assert_eq!(points[0].movimentacoes, Some(-25.0));
        assert_eq!(points[1].net, 10.0);
    }

    #[test]
    fn test_step_selection_clamps() {
        let labels: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(step_selection(&labels, None, 1).as_deref(), Some("c"));
        assert_eq!(step_selection(&labels, Some("b"), -1).as_deref(), Some("a"));
        assert_eq!(step_selection(&labels, Some("a"), -1).as_deref(), Some("a"));
        assert_eq!(step_selection(&labels, Some("c"), 5).as_deref(), Some("c"));
        assert_eq!(step_selection(&[], Some("a"), 1), None);
    }
}
