//! Paginated text layout for plan export.
//!
//! Units are millimetres with the origin at the top-left corner of the page;
//! a line's `y` is its baseline. Pagination is greedy: before each wrapped
//! block the projected bottom is compared with the printable height and a
//! new page is started when it would not fit. Blocks are never re-flowed
//! across pages, except a block that cannot fit even on an empty page.

use crate::model::Plan;

/// Points to millimetres.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Page geometry and type sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub page_width: f64,
    pub page_height: f64,
    pub left_margin: f64,
    /// Baseline of the first line on every page.
    pub top: f64,
    /// Space kept free at the bottom of every page.
    pub bottom_margin: f64,
    pub max_width: f64,
    pub line_height: f64,
    pub summary_line_height: f64,
    /// Advance after single-line rows (title, name, headings).
    pub row_height: f64,
    /// Extra space after the summary and between sections.
    pub section_gap: f64,
    pub title_size: f64,
    pub heading_size: f64,
    pub body_size: f64,
}

impl Default for PageSetup {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            left_margin: 10.0,
            top: 20.0,
            bottom_margin: 20.0,
            max_width: 180.0,
            line_height: 8.0,
            summary_line_height: 7.0,
            row_height: 10.0,
            section_gap: 10.0,
            title_size: 18.0,
            heading_size: 14.0,
            body_size: 12.0,
        }
    }
}

impl PageSetup {
    /// Lowest baseline a block may end on.
    pub fn printable_bottom(&self) -> f64 {
        self.page_height - self.bottom_margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Text measurement for wrapping.
pub trait TextMeasure {
    /// Width in millimetres of `text` set at `size` points.
    fn width(&self, text: &str, size: f64, weight: FontWeight) -> f64;
}

/// Approximate Helvetica advance widths.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    /// Advance width of one glyph, in em.
    fn advance(c: char) -> f64 {
        match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'I' => 0.278,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.333,
            'm' | 'M' | 'W' | '—' => 0.833,
            'w' => 0.722,
            '•' => 0.35,
            '0'..='9' | '×' => 0.556,
            c if c.is_ascii_uppercase() => 0.667,
            _ => 0.556,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn width(&self, text: &str, size: f64, weight: FontWeight) -> f64 {
        let em: f64 = text.chars().map(Self::advance).sum();
        let bold = match weight {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => 1.06,
        };
        em * bold * size * PT_TO_MM
    }
}

/// Greedy word wrap.
///
/// Explicit newlines start new lines. A word wider than `max_width` is
/// broken between characters. Empty input yields one empty line.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    size: f64,
    weight: FontWeight,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let fits = |s: &str| measure.width(s, size, weight) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }
            for c in word.chars() {
                current.push(c);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }

    lines
}

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub weight: FontWeight,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

/// A laid-out, paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl Document {
    /// All text on all pages, in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }
}

/// Vertical cursor over a growing list of pages.
struct Cursor<'a> {
    setup: &'a PageSetup,
    pages: Vec<Page>,
    y: f64,
}

impl<'a> Cursor<'a> {
    fn new(setup: &'a PageSetup) -> Self {
        Self {
            setup,
            pages: vec![Page::default()],
            y: setup.top,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.setup.top;
    }

    fn current_page_is_empty(&self) -> bool {
        self.pages.last().is_none_or(|p| p.lines.is_empty())
    }

    fn push_line(&mut self, text: String, size: f64, weight: FontWeight) {
        let line = TextLine {
            x: self.setup.left_margin,
            y: self.y,
            size,
            weight,
            text,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }

    /// Place a wrapped block, breaking the page first if it would not fit.
    fn block(&mut self, lines: Vec<String>, size: f64, weight: FontWeight, line_height: f64) {
        let bottom = self.setup.printable_bottom();
        let projected = self.y + lines.len() as f64 * line_height;
        if projected > bottom && !self.current_page_is_empty() {
            self.new_page();
        }

        // Only a block taller than an empty page continues across pages.
        for line in lines {
            if self.y + line_height > bottom && !self.current_page_is_empty() {
                self.new_page();
            }
            self.push_line(line, size, weight);
            self.y += line_height;
        }
    }

    fn row(&mut self, text: String, size: f64, weight: FontWeight) {
        self.block(vec![text], size, weight, self.setup.row_height);
    }

    fn gap(&mut self, amount: f64) {
        self.y += amount;
    }
}

/// Lay out a plan for export.
pub fn layout_plan(plan: &Plan, setup: &PageSetup, measure: &dyn TextMeasure) -> Document {
    let body = setup.body_size;
    let wrap = |text: &str| wrap_text(text, setup.max_width, body, FontWeight::Normal, measure);
    let mut cursor = Cursor::new(setup);

    cursor.row(
        "Personalized Fitness Plan".to_string(),
        setup.title_size,
        FontWeight::Bold,
    );
    cursor.row(
        format!("Name: {}", plan.display_name().unwrap_or("User")),
        body,
        FontWeight::Normal,
    );

    cursor.block(
        wrap(&plan.summary),
        body,
        FontWeight::Normal,
        setup.summary_line_height,
    );
    cursor.gap(setup.section_gap);

    cursor.row("Workouts:".to_string(), setup.heading_size, FontWeight::Bold);
    for w in &plan.workouts {
        let text = format!(
            "• {} — {} sets × {} reps ({} rest)",
            w.name, w.sets, w.reps, w.rest
        );
        cursor.block(wrap(&text), body, FontWeight::Normal, setup.line_height);
    }
    cursor.gap(setup.section_gap);

    cursor.row("Meals:".to_string(), setup.heading_size, FontWeight::Bold);
    for m in &plan.meals {
        let text = format!("• {} — {}", m.meal, m.items_joined());
        cursor.block(wrap(&text), body, FontWeight::Normal, setup.line_height);
    }

    Document {
        page_width: setup.page_width,
        page_height: setup.page_height,
        pages: cursor.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Meal, Workout};

    /// Every character is one millimetre wide regardless of size.
    struct Mono;

    impl TextMeasure for Mono {
        fn width(&self, text: &str, _size: f64, _weight: FontWeight) -> f64 {
            text.chars().count() as f64
        }
    }

    fn plan_with_workouts(n: usize, name_len: usize) -> Plan {
        Plan {
            name: Some("Ana".into()),
            summary: "Short summary.".into(),
            workouts: (0..n)
                .map(|i| Workout {
                    name: format!("{i:02}{}", "x".repeat(name_len)),
                    sets: 3,
                    reps: 12,
                    rest: "60s".into(),
                })
                .collect(),
            meals: vec![Meal {
                meal: "Dinner".into(),
                items: vec!["Fish".into()],
            }],
        }
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap_text("aaa bbb ccc", 7.0, 12.0, FontWeight::Normal, &Mono);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn wrap_breaks_long_words_by_character() {
        let lines = wrap_text("abcdefghij", 4.0, 12.0, FontWeight::Normal, &Mono);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_explicit_newlines_and_empty_text() {
        assert_eq!(
            wrap_text("one\ntwo", 50.0, 12.0, FontWeight::Normal, &Mono),
            vec!["one", "two"]
        );
        assert_eq!(wrap_text("", 50.0, 12.0, FontWeight::Normal, &Mono), vec![""]);
    }

    #[test]
    fn small_plan_fits_on_one_page() {
        let doc = layout_plan(&plan_with_workouts(3, 4), &PageSetup::default(), &Mono);
        assert_eq!(doc.pages.len(), 1);
        let first = &doc.pages[0].lines[0];
        assert_eq!(first.text, "Personalized Fitness Plan");
        assert_eq!(first.y, 20.0);
        assert_eq!(doc.pages[0].lines[1].text, "Name: Ana");
    }

    #[test]
    fn forty_two_line_workouts_break_pages_without_splitting_blocks() {
        let setup = PageSetup {
            max_width: 30.0,
            ..PageSetup::default()
        };
        // "• 00xxxxxxxxxxxxxxxxxxxx — 3 sets × 12 reps (60s rest)" wraps to two lines at 30mm.
        let plan = plan_with_workouts(40, 20);
        let doc = layout_plan(&plan, &setup, &Mono);

        assert!(doc.pages.len() > 1, "expected a page break");

        for page in &doc.pages {
            for line in &page.lines {
                assert!(
                    line.y <= setup.printable_bottom(),
                    "line {:?} runs past the printable area",
                    line.text
                );
            }
        }

        // Each workout's two lines land on the same page, consecutively.
        for (i, page) in doc.pages.iter().enumerate() {
            let lines = &page.lines;
            for (j, line) in lines.iter().enumerate() {
                if line.text.starts_with("• ") && line.text.contains("xxxx") {
                    let next = lines.get(j + 1).unwrap_or_else(|| {
                        panic!("workout block split at end of page {i}: {:?}", line.text)
                    });
                    assert_eq!(next.y, line.y + setup.line_height);
                }
            }
        }

        let workout_starts = doc
            .text_lines()
            .filter(|l| l.text.starts_with("• ") && l.text.contains("xxxx"))
            .count();
        assert_eq!(workout_starts, 40);
    }

    #[test]
    fn new_page_resets_cursor_to_top() {
        let plan = plan_with_workouts(60, 2);
        let setup = PageSetup::default();
        let doc = layout_plan(&plan, &setup, &Mono);
        assert!(doc.pages.len() >= 2);
        assert_eq!(doc.pages[1].lines[0].y, setup.top);
    }

    #[test]
    fn oversized_block_continues_on_next_page() {
        let setup = PageSetup::default();
        let plan = Plan {
            name: None,
            summary: vec!["word"; 400].join("\n"),
            workouts: vec![],
            meals: vec![],
        };
        let doc = layout_plan(&plan, &setup, &Mono);
        assert!(doc.pages.len() > 1);
        assert_eq!(doc.pages[0].lines[1].text, "Name: User");
        let words = doc.text_lines().filter(|l| l.text == "word").count();
        assert_eq!(words, 400);
        for line in doc.text_lines() {
            assert!(line.y <= setup.printable_bottom());
        }
    }

    #[test]
    fn helvetica_widths_scale_with_size() {
        let m = HelveticaMetrics;
        let small = m.width("Pushups", 12.0, FontWeight::Normal);
        let large = m.width("Pushups", 24.0, FontWeight::Normal);
        assert!((large - 2.0 * small).abs() < 1e-9);
        assert!(m.width("W", 12.0, FontWeight::Normal) > m.width("i", 12.0, FontWeight::Normal));
        assert!(m.width("abc", 12.0, FontWeight::Bold) > m.width("abc", 12.0, FontWeight::Normal));
    }
}
