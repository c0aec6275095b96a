use crate::columns::{self, COST_CENTER_COL, DESCRIPTION_COL};
use crate::model::FinancialMetrics;

/// A data row as read from the source sheet (header rows already removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the source sheet, for diagnostics.
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    fn cell(&self, col: usize) -> &str {
        self.cells.get(col).map(|c| c.trim()).unwrap_or("")
    }

    /// Column 0, trimmed.
    pub fn description(&self) -> &str {
        self.cell(DESCRIPTION_COL)
    }

    /// Column 1, trimmed; `None` when empty.
    pub fn cost_center(&self) -> Option<&str> {
        Some(self.cell(COST_CENTER_COL)).filter(|c| !c.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }

    pub fn metrics(&self) -> FinancialMetrics {
        columns::read_metrics(&self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        RawRow::new(7, cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn accessors_trim() {
        let r = row(&["  Connected ", " 1A01840 ", "10"]);
        assert_eq!(r.description(), "Connected");
        assert_eq!(r.cost_center(), Some("1A01840"));
        assert_eq!(r.metrics().billing_total, rust_decimal::Decimal::from(10));
    }

    #[test]
    fn empty_cost_center_is_none() {
        assert_eq!(row(&["Commercial Totals", "  "]).cost_center(), None);
        assert_eq!(row(&["Commercial Totals"]).cost_center(), None);
    }

    #[test]
    fn blank_detection() {
        assert!(row(&["", " ", ""]).is_blank());
        assert!(row(&[]).is_blank());
        assert!(!row(&["", "", "0"]).is_blank());
    }
}
