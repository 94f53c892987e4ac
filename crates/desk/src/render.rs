use std::fmt::Write;

use chrono::{DateTime, Utc};
use common::models::Signal;
use review::ReviewState;

const HEADER: [&str; 10] = [
    "ID", "Symbol", "Side", "Entry", "SL", "TP", "Qty", "Status", "Created", "Actions",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn row(signal: &Signal) -> [String; 10] {
    let actions = if signal.status.is_actionable() {
        "approve/reject"
    } else {
        ""
    };

    [
        signal.id.to_string(),
        signal.symbol.clone(),
        signal.side.to_string(),
        signal.entry.to_string(),
        signal.sl.to_string(),
        optional(signal.tp),
        optional(signal.qty),
        signal.status.to_string(),
        timestamp(signal.displayed_time()),
        actions.to_string(),
    ]
}

pub fn signal_table(signals: &[Signal]) -> String {
    if signals.is_empty() {
        return "No signals\n".to_string();
    }

    let rows: Vec<[String; 10]> = signals.iter().map(row).collect();
    let mut widths = HEADER.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = HEADER.map(str::to_string);
    for cells in std::iter::once(&header).chain(rows.iter()) {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn signal_detail(signal: &Signal, context: Option<&str>, actions_visible: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Signal #{} {} ({})",
        signal.id, signal.symbol, signal.side
    );
    let _ = writeln!(out, "  Entry:    {}", signal.entry);
    let _ = writeln!(out, "  SL:       {}", signal.sl);
    let _ = writeln!(out, "  TP:       {}", optional(signal.tp));
    let _ = writeln!(out, "  Quantity: {}", optional(signal.qty));
    let _ = writeln!(out, "  Status:   {}", signal.status);
    if let Some(created) = signal.displayed_time() {
        let _ = writeln!(out, "  Created:  {}", timestamp(Some(created)));
    }
    if let Some(context) = context {
        let _ = writeln!(out, "\nContext:\n{}", context);
    }
    if actions_visible {
        let _ = writeln!(
            out,
            "\nActions: desk approve {id} [--reason ..] | desk reject {id} [--reason ..]",
            id = signal.id
        );
    }
    out
}

pub fn watch_frame(state: &ReviewState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Signals [{}]  updated {}",
        state.filter,
        now.format("%H:%M:%S")
    );
    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "Error fetching signals: {}", error);
    }
    out.push_str(&signal_table(&state.signals));
    out
}
