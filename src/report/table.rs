use crate::domain::model::UpdateResult;

const HEADERS: [&str; 5] = ["Name", "Location", "Status", "Reference image", "Candidate image"];

/// Renders one bordered row per result. A Note column is added only when
/// some row carries a detail.
pub fn render_table(results: &[UpdateResult]) -> String {
    let with_notes = results.iter().any(|r| r.detail.is_some());

    let mut headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    if with_notes {
        headers.push("Note".to_string());
    }

    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|r| {
            let mut row = vec![
                r.name.clone(),
                r.location.clone(),
                r.status.to_string(),
                r.reference_image_path.display().to_string(),
                r.candidate_image_path.display().to_string(),
            ];
            if with_notes {
                row.push(r.detail.clone().unwrap_or_default());
            }
            row
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(headers[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut lines = vec![border.clone(), format_row(&headers, &widths), border.clone()];
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.push(border);
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect();
    format!("|{}|", cells.join("|"))
}
