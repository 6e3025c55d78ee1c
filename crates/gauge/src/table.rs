use unicode_width::UnicodeWidthStr;

use crate::color;

/// One row of the `gauge status` freshness table, pre-formatted as text.
pub struct FreshnessRow {
    pub category: String,
    pub status: String,
    pub age: String,
    pub cooldown: String,
    pub indicator: String,
}

pub struct TableFormatter {
    category_width: usize,
    status_width: usize,
    age_width: usize,
    cooldown_width: usize,
    indicator_width: usize,
}

impl TableFormatter {
    pub fn new(rows: &[FreshnessRow]) -> Self {
        // Minimum widths = header label lengths
        let mut category_width = "Category".len();
        let mut status_width = "Status".len();
        let mut age_width = "Age".len();
        let mut cooldown_width = "Cooldown".len();
        let mut indicator_width = "Indicator".len();

        for row in rows {
            category_width = category_width.max(display_width(&row.category));
            status_width = status_width.max(display_width(&row.status));
            age_width = age_width.max(display_width(&row.age));
            cooldown_width = cooldown_width.max(display_width(&row.cooldown));
            indicator_width = indicator_width.max(display_width(&row.indicator));
        }

        Self {
            category_width,
            status_width,
            age_width,
            cooldown_width,
            indicator_width,
        }
    }

    pub fn print_table(&self, rows: &[FreshnessRow]) {
        self.print_header();
        for row in rows {
            self.print_row(row);
        }
        self.print_footer();
    }

    fn print_header(&self) {
        println!("{}", self.top_border());
        println!("{}", self.header_row());
        println!("{}", self.separator());
    }

    fn print_footer(&self) {
        println!("{}", self.bottom_border());
    }

    fn print_row(&self, row: &FreshnessRow) {
        let sep = color::muted("│");
        println!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::ice(&pad(&row.category, self.category_width)),
            color::freshness(&pad(&row.status, self.status_width)),
            color::muted(&pad(&row.age, self.age_width)),
            color::copper(&pad(&row.cooldown, self.cooldown_width)),
            pad(&row.indicator, self.indicator_width),
        );
    }

    fn top_border(&self) -> String {
        color::muted(&format!(
            "┌{}┬{}┬{}┬{}┬{}┐",
            "─".repeat(self.category_width + 2),
            "─".repeat(self.status_width + 2),
            "─".repeat(self.age_width + 2),
            "─".repeat(self.cooldown_width + 2),
            "─".repeat(self.indicator_width + 2),
        ))
    }

    fn header_row(&self) -> String {
        let sep = color::muted("│");
        format!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::bold(&pad("Category", self.category_width)),
            color::bold(&pad("Status", self.status_width)),
            color::bold(&pad("Age", self.age_width)),
            color::bold(&pad("Cooldown", self.cooldown_width)),
            color::bold(&pad("Indicator", self.indicator_width)),
        )
    }

    fn separator(&self) -> String {
        color::muted(&format!(
            "├{}┼{}┼{}┼{}┼{}┤",
            "─".repeat(self.category_width + 2),
            "─".repeat(self.status_width + 2),
            "─".repeat(self.age_width + 2),
            "─".repeat(self.cooldown_width + 2),
            "─".repeat(self.indicator_width + 2),
        ))
    }

    fn bottom_border(&self) -> String {
        color::muted(&format!(
            "└{}┴{}┴{}┴{}┴{}┘",
            "─".repeat(self.category_width + 2),
            "─".repeat(self.status_width + 2),
            "─".repeat(self.age_width + 2),
            "─".repeat(self.cooldown_width + 2),
            "─".repeat(self.indicator_width + 2),
        ))
    }
}

/// Compute the terminal display width of a string.
///
/// Wide characters (CJK, emoji) count as 2 columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string to a minimum display width without truncating.
///
/// Uses Unicode display width to handle wide characters (CJK, emoji).
pub(crate) fn pad(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(min_width - width))
    }
}
