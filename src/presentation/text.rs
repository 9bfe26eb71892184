//! Plain-text rendering of a list page for terminal output.

use std::fmt::Write as _;

use crate::application::{controller::ListView, pagination::PageSlot};

const HEADERS: [&str; 7] = ["", "ID", "Tiêu đề", "Trạng thái", "Giá", "Lượt xem", "Ngày tạo"];

pub fn render_table(view: &ListView) -> String {
    let rows: Vec<[String; 7]> = view
        .rows
        .iter()
        .map(|row| {
            [
                if row.selected { "[x]" } else { "[ ]" }.to_string(),
                row.id.clone(),
                row.title.clone(),
                row.status_label.to_string(),
                row.price.clone(),
                row.views.clone(),
                row.created.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    if rows.is_empty() {
        out.push_str("Không có dữ liệu\n");
    }
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    let _ = writeln!(
        out,
        "\nHiển thị {}-{} của {}  |  {}",
        view.showing.from,
        view.showing.to,
        view.showing.total,
        render_window(&view.window)
    );
    if view.selected_count > 0 {
        let _ = writeln!(out, "Đã chọn {} mục", view.selected_count);
    }
    for card in view.summary.cards() {
        let _ = writeln!(out, "{}: {}", card.label, card.value);
    }
    out
}

/// Page strip with the current page bracketed, e.g. `1 … 5 [6] 7 … 10`.
pub fn render_window(window: &[PageSlot]) -> String {
    window
        .iter()
        .map(|slot| match slot {
            PageSlot::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageSlot::Page { number, .. } => number.to_string(),
            PageSlot::Gap => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        controller::{ListController, ListOptions},
        filter::tests::record,
        query::ListQuery,
    };

    #[test]
    fn table_lists_rows_and_page_strip() {
        let records = (1..=30).map(|id| record(id, &format!("Tài liệu {id}"))).collect();
        let mut list =
            ListController::new(records, ListOptions::default(), ListQuery::new()).expect("valid");
        list.toggle(&"3".into(), true);

        let table = render_table(&list.view());

        assert!(table.lines().next().is_some_and(|line| line.contains("Tiêu đề")));
        let selected = table
            .lines()
            .find(|line| line.contains("Tài liệu 3"))
            .expect("row 3 on the first page");
        assert!(selected.starts_with("[x]"));
        assert!(table.contains("Hiển thị 1-10 của 30  |  [1] 2 3"));
        assert!(table.contains("Đã chọn 1 mục"));
    }

    #[test]
    fn empty_table_says_so() {
        let list =
            ListController::new(Vec::new(), ListOptions::default(), ListQuery::new()).expect("valid");
        let table = render_table(&list.view());

        assert!(table.contains("Không có dữ liệu"));
        assert!(table.contains("Hiển thị 0-0 của 0  |  [1]"));
    }
}
