//! Plain-text table rendering for a [`WeatherSnapshot`].

use crate::{City, model::WeatherSnapshot};

const HEADER: [&str; 3] = ["Time", "Temperature", "Description"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render the title line and a bordered 4-row table (now + three forecast steps).
///
/// Output depends only on the inputs, so it can be cached and compared byte for byte.
pub fn render(city: &City, snapshot: &WeatherSnapshot) -> String {
    let mut rows = Vec::with_capacity(1 + snapshot.forecast.len());
    rows.push([
        "Now".to_string(),
        temperature(snapshot.current.temperature_c),
        snapshot.current.description.clone(),
    ]);
    rows.extend(snapshot.forecast.iter().map(|entry| {
        [
            entry.time.format(TIME_FORMAT).to_string(),
            temperature(entry.temperature_c),
            entry.description.clone(),
        ]
    }));

    let mut widths = HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = border(&widths);
    let mut out = format!("Weather for {city}\n");
    out.push_str(&border);
    out.push_str(&line(&HEADER, &widths));
    out.push_str(&border);
    for row in &rows {
        out.push_str(&line(row, &widths));
    }
    out.push_str(&border);
    out
}

fn temperature(celsius: f64) -> String {
    format!("{celsius:.1} °C")
}

fn border(widths: &[usize; 3]) -> String {
    let mut s = String::from("+");
    for width in widths {
        s.push_str(&"-".repeat(width + 2));
        s.push('+');
    }
    s.push('\n');
    s
}

fn line<S: AsRef<str>>(cells: &[S; 3], widths: &[usize; 3]) -> String {
    let mut s = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        s.push_str(&format!(" {:<width$} |", cell.as_ref(), width = *width));
    }
    s.push('\n');
    s
}
