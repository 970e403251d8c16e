//! Course listing.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::IntoEnumIterator;
use tabled::Tabled;

use coursedeck_core::{AppContext, Category, Course};

use crate::cli::{CoursesArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct CourseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "#")]
    seq_no: i64,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Lessons")]
    lessons: String,
    #[tabled(rename = "Promo")]
    promo: String,
}

impl From<&Arc<Course>> for CourseRow {
    fn from(c: &Arc<Course>) -> Self {
        Self {
            id: c.id.clone(),
            seq_no: c.seq_no,
            description: c.description.clone().unwrap_or_default(),
            lessons: c.lessons_count.map(|n| n.to_string()).unwrap_or_default(),
            promo: if c.promo { "yes".into() } else { String::new() },
        }
    }
}

/// One view per category, in declaration order.
struct CourseViews(Vec<(Category, Vec<Arc<Course>>)>);

impl CourseViews {
    fn load(ctx: &AppContext) -> Self {
        Self(
            Category::iter()
                .map(|category| (category, ctx.courses.filter_by_category(category).current()))
                .collect(),
        )
    }
}

/// Serialized as a map keyed by the lowercase category name.
impl Serialize for CourseViews {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, view) in &self.0 {
            map.serialize_entry(&category.to_string().to_lowercase(), view)?;
        }
        map.end()
    }
}

/// Multi-line detail view of one course.
pub(crate) fn detail(c: &Course) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", c.id);
    let _ = writeln!(out, "Category:    {}", c.category);
    let _ = writeln!(out, "Position:    {}", c.seq_no);
    let _ = writeln!(
        out,
        "Description: {}",
        c.description.as_deref().unwrap_or("-")
    );
    if let Some(ref long) = c.long_description {
        let _ = writeln!(out, "Details:     {long}");
    }
    if let Some(n) = c.lessons_count {
        let _ = writeln!(out, "Lessons:     {n}");
    }
    let _ = write!(out, "Promo:       {}", if c.promo { "yes" } else { "no" });
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &AppContext,
    args: CoursesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.courses.refresh().await?;

    if let Some(category) = args.category {
        let view = ctx.courses.filter_by_category(category.into()).current();
        let out = output::render_list(
            &global.output,
            &view,
            |c| CourseRow::from(c),
            |c| c.id.clone(),
        )?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let views = CourseViews::load(ctx);

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let color = output::should_color(&global.color);
            let mut sections = Vec::with_capacity(views.0.len());
            for (category, view) in &views.0 {
                let body = output::render_list(
                    &global.output,
                    view,
                    |c| CourseRow::from(c),
                    |c| c.id.clone(),
                )?;
                if matches!(global.output, OutputFormat::Plain) {
                    if !body.is_empty() {
                        sections.push(body);
                    }
                } else {
                    sections.push(format!(
                        "{}\n{body}",
                        output::heading(&category.to_string(), color)
                    ));
                }
            }
            let separator = if matches!(global.output, OutputFormat::Plain) {
                "\n"
            } else {
                "\n\n"
            };
            sections.join(separator)
        }
        _ => output::render_single(&global.output, &views, |_| String::new(), |_| String::new())?,
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
