//! Course editing.

use tracing::debug;

use coursedeck_core::{AppContext, Category, CourseChanges};

use crate::cli::{GlobalOpts, SaveArgs};
use crate::error::CliError;
use crate::output;

use super::courses;

/// Empty text clears a nullable field.
fn text_change(value: Option<String>) -> Option<Option<String>> {
    value.map(|s| if s.is_empty() { None } else { Some(s) })
}

fn changes_from(args: SaveArgs) -> CourseChanges {
    CourseChanges {
        seq_no: args.seq_no,
        category: args.category.map(Category::from),
        description: text_change(args.description),
        long_description: text_change(args.long_description),
        promo: args.promo,
        ..CourseChanges::default()
    }
}

pub async fn handle(ctx: &AppContext, args: SaveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let id = args.id.clone();
    let changes = changes_from(args);
    if changes.is_empty() {
        return Err(CliError::Validation {
            field: "changes".into(),
            reason: "nothing to save; pass at least one field to change".into(),
        });
    }

    ctx.courses.refresh().await?;

    let handle = ctx.courses.save(&id, changes)?;
    debug!(id = handle.id(), "optimistic update applied");
    handle.await?;

    let course = ctx
        .courses
        .course(&id)
        .ok_or_else(|| CliError::CourseNotFound { id: id.clone() })?;

    let out = output::render_single(
        &global.output,
        course.as_ref(),
        courses::detail,
        |c| c.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!("Course saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SaveArgs {
        SaveArgs {
            id: "1".into(),
            description: None,
            long_description: None,
            category: None,
            seq_no: None,
            promo: None,
        }
    }

    #[test]
    fn no_flags_means_no_changes() {
        assert!(changes_from(args()).is_empty());
    }

    #[test]
    fn empty_text_clears_the_field() {
        let changes = changes_from(SaveArgs {
            description: Some(String::new()),
            long_description: Some("More".into()),
            ..args()
        });
        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.long_description, Some(Some("More".into())));
    }
}
