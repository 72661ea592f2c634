//! Plain-text table rendering for command output.

use sqlshift_db::Row;

/// Renders `rows` under `headers` as left-aligned columns.
///
/// ```
/// use sqlshift_cli::table::render_table;
///
/// let out = render_table(&["name", "n"], &[vec!["users".into(), "3".into()]]);
/// assert_eq!(out, "name   n\n-----  -\nusers  3\n");
/// ```
pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// Renders database rows, using their column names as headers.
pub fn render_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.values().iter().map(ToString::to_string).collect())
        .collect();
    render_table(first.columns(), &body)
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        out.push_str(cell);
        if i < last {
            let width = widths.get(i).copied().unwrap_or(0);
            let pad = width.saturating_sub(cell.chars().count()) + 2;
            out.push_str(&" ".repeat(pad));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlshift_db::Value;

    #[test]
    fn test_render_table_widths() {
        let out = render_table(
            &["Version", "Status"],
            &[
                vec!["20250101-000000-a.sql".into(), "up".into()],
                vec!["b.sql".into(), "pending".into()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Version                Status");
        assert_eq!(lines[1], "---------------------  -------");
        assert_eq!(lines[2], "20250101-000000-a.sql  up");
        assert_eq!(lines[3], "b.sql                  pending");
    }

    #[test]
    fn test_render_rows() {
        let rows = vec![Row::new(
            vec!["name".into(), "notnull".into()],
            vec![Value::from("id"), Value::Int(1)],
        )];
        assert_eq!(render_rows(&rows), "name  notnull\n----  -------\nid    1\n");
        assert_eq!(render_rows(&[]), "");
    }
}
