// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pricing engine. Per-page rate lookup and job cost.

use serde::{Deserialize, Serialize};

use crate::types::{PrintMode, Printer};

/// Per-page rate the printer charges for `mode`.
pub fn page_rate(printer: &Printer, mode: PrintMode) -> f64 {
    match mode {
        PrintMode::Color => printer.color_rate,
        PrintMode::BlackAndWhite => printer.black_and_white_rate,
    }
}

/// Total cost of printing `total_pages` pages on `printer` in `mode`.
///
/// A zero page count costs nothing.  No rounding is applied.
pub fn price(printer: &Printer, mode: PrintMode, total_pages: u32) -> f64 {
    if total_pages == 0 {
        return 0.0;
    }
    f64::from(total_pages) * page_rate(printer, mode)
}

/// Result of a cost preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub total_pages: u32,
    pub page_rate: f64,
    pub total_cost: f64,
    pub currency: String,
}

impl CostEstimate {
    pub fn new(printer: &Printer, mode: PrintMode, total_pages: u32, currency: &str) -> Self {
        Self {
            total_pages,
            page_rate: page_rate(printer, mode),
            total_cost: price(printer, mode, total_pages),
            currency: currency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrinterId, PrinterStatus};

    fn printer(bw: f64, color: f64) -> Printer {
        Printer {
            id: PrinterId(1),
            name: "Lab".into(),
            location: "Room 101".into(),
            address: "192.168.1.20".into(),
            black_and_white_rate: bw,
            color_rate: color,
            status: PrinterStatus::Online,
            owner_id: None,
            queue_length: 0,
        }
    }

    #[test]
    fn price_uses_the_rate_for_the_mode() {
        let p = printer(1.0, 2.0);
        for pages in [0u32, 1, 5, 250] {
            assert_eq!(price(&p, PrintMode::Color, pages), f64::from(pages) * 2.0);
            assert_eq!(price(&p, PrintMode::BlackAndWhite, pages), f64::from(pages) * 1.0);
        }
    }

    #[test]
    fn five_black_and_white_pages() {
        assert_eq!(price(&printer(1.0, 2.0), PrintMode::BlackAndWhite, 5), 5.0);
    }

    #[test]
    fn seven_colour_pages_at_one_fifty() {
        assert_eq!(price(&printer(1.0, 1.5), PrintMode::Color, 7), 10.5);
    }

    #[test]
    fn zero_pages_cost_nothing() {
        assert_eq!(price(&printer(3.0, 9.0), PrintMode::Color, 0), 0.0);
    }

    #[test]
    fn pricing_leaves_the_printer_untouched() {
        let p = printer(1.0, 2.0);
        let before = p.clone();
        let _ = price(&p, PrintMode::Color, 10);
        assert_eq!(p, before);
    }

    #[test]
    fn estimate_reports_rate_and_currency() {
        let estimate = CostEstimate::new(&printer(0.5, 4.0), PrintMode::Color, 3, "BDT");
        assert_eq!(estimate.page_rate, 4.0);
        assert_eq!(estimate.total_cost, 12.0);
        assert_eq!(estimate.currency, "BDT");
    }
}
