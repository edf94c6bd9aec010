//! Server-rendered HTML pages.
//!
//! Templates and the stylesheet are compiled into the binary. Tera escapes
//! every `.html` template, so user text is rendered inert.

use nahw_core::types::DbId;
use nahw_db::models::correction::CorrectionRecord;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("correction.html", include_str!("../templates/correction.html")),
    ("history.html", include_str!("../templates/history.html")),
];

pub const STYLESHEET: &str = include_str!("../static/style.css");

/// What the result page shows.
#[derive(Debug, Serialize)]
pub struct CorrectionPage<'a> {
    pub original_text: &'a str,
    pub corrected_text: &'a str,
    /// `None` when the correction could not be stored.
    pub correction_id: Option<DbId>,
    pub notice: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    id: DbId,
    original_text: &'a str,
    corrected_text: &'a str,
    created_at: String,
}

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    /// The submission form, optionally pre-filled and with an error banner.
    pub fn index(&self, text: Option<&str>, error: Option<&str>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("title", "تصحيح النصوص العربية");
        context.insert("text", &text.unwrap_or_default());
        context.insert("error", &error);
        self.tera.render("index.html", &context)
    }

    pub fn correction(&self, page: &CorrectionPage<'_>) -> Result<String, tera::Error> {
        let mut context = Context::from_serialize(page)?;
        context.insert("title", "نتيجة التصحيح");
        self.tera.render("correction.html", &context)
    }

    /// All records in the order given.
    pub fn history(&self, records: &[CorrectionRecord]) -> Result<String, tera::Error> {
        let rows: Vec<HistoryRow<'_>> = records
            .iter()
            .map(|r| HistoryRow {
                id: r.id,
                original_text: &r.original_text,
                corrected_text: &r.corrected_text,
                created_at: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("title", "سجل التصحيحات");
        context.insert("corrections", &rows);
        self.tera.render("history.html", &context)
    }
}
