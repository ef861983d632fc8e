use std::fmt::Write as _;

use crate::distribution::AgeDistribution;

/// Renders rows as left-aligned columns separated by two spaces.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

pub fn distribution_rows(report: &AgeDistribution) -> Vec<Vec<String>> {
    report
        .shares()
        .iter()
        .map(|share| {
            vec![
                share.bucket.label().to_string(),
                share.percent.clone(),
                share.count.to_string(),
            ]
        })
        .collect()
}

pub fn print_distribution(report: &AgeDistribution) {
    let rendered = render_table(&["group", "percent", "count"], &distribution_rows(report));
    print!("{rendered}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::distribution;

    #[test]
    fn renders_distribution_as_aligned_columns() {
        let rendered = render_table(
            &["group", "percent", "count"],
            &distribution_rows(&distribution(&[10, 30, 30, 70])),
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "group     percent  count",
                "--------  -------  -----",
                "< 20      25.00%   1",
                "20 to 40  50.00%   2",
                "40 to 60  0.00%    0",
                "> 60      25.00%   1",
            ]
        );
    }

    #[test]
    fn empty_report_renders_only_the_header() {
        let rendered = render_table(&["group", "percent", "count"], &[]);
        assert_eq!(rendered.lines().count(), 2);
    }
}
