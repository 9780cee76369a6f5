//! `franklin exercises` command.

use crate::context::ServiceContext;
use crate::error::FranklinError;

/// Execute the `exercises` command.
///
/// Lists the courses, or the exercises of `course`, as `name  title` rows.
///
/// # Errors
///
/// Returns [`FranklinError::Registry`] if the listing cannot be fetched.
pub fn run(ctx: &ServiceContext, course: Option<&str>) -> Result<(), FranklinError> {
    let rows: Vec<(String, String)> = match course {
        Some(course) => ctx
            .registry
            .exercises(course)
            .map_err(FranklinError::registry)?
            .into_iter()
            .map(|e| (e.name, e.title))
            .collect(),
        None => ctx
            .registry
            .courses()
            .map_err(FranklinError::registry)?
            .into_iter()
            .map(|c| (c.name, c.title))
            .collect(),
    };

    if rows.is_empty() {
        println!("Nothing found.");
        return Ok(());
    }
    let width = rows.iter().map(|r| r.0.len()).max().unwrap_or(4).max(4);
    println!("{:<width$}  TITLE", "NAME");
    for (name, title) in &rows {
        println!("{name:<width$}  {title}");
    }
    Ok(())
}
