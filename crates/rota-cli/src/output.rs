use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the
/// header. Widths count chars, so handles like `@zoë` line up.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = render_line(headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&render_line(rule.iter().map(String::as_str), &widths));
    for row in rows {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut out = String::new();
    for (i, (cell, w)) in cells.zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        out.push_str(&" ".repeat(w.saturating_sub(cell.chars().count())));
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_on_char_width() {
        let rows = vec![
            vec!["@zoë".to_string(), "2024-01-01".to_string()],
            vec!["@bob".to_string(), "2024-02-01".to_string()],
        ];
        let table = render_table(&["USER", "LAST DELIVERED"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "USER  LAST DELIVERED");
        assert_eq!(lines[1], "----  --------------");
        assert_eq!(lines[2], "@zoë  2024-01-01");
        assert_eq!(lines[3], "@bob  2024-02-01");
    }

    #[test]
    fn wide_cells_stretch_their_column() {
        let rows = vec![vec!["@alexandria".to_string(), "3d".to_string()]];
        let table = render_table(&["USER", "WAITING"], &rows);
        assert!(table.starts_with("USER         WAITING\n"), "{table}");
        assert!(table.contains("@alexandria  3d\n"), "{table}");
    }
}
