use crate::models::views::ResourceRow;

/// Keeps the rows whose name contains `term`, ignoring case and surrounding
/// whitespace. A blank or absent term returns the input untouched.
pub fn filter_rows(rows: Vec<ResourceRow>, term: Option<&str>) -> Vec<ResourceRow> {
    let needle = match term.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return rows,
    };

    rows.into_iter()
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}

/// One page of a filtered table.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: &'a [ResourceRow],
    pub index: usize,
    pub count: usize,
}

impl Page<'_> {
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.count
    }
}

/// Slices `rows` into the requested page, clamping past-the-end requests to the last page.
pub fn paginate(rows: &[ResourceRow], page: usize, page_size: usize) -> Page<'_> {
    let page_size = page_size.max(1);
    let count = rows.len().div_ceil(page_size).max(1);
    let index = page.min(count - 1);
    let start = (index * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());

    Page {
        rows: &rows[start..end],
        index,
        count,
    }
}
