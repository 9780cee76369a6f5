//! Course and exercise picker backed by the registry.

use tracing::debug;

use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::exercise::validate_name;

/// Picks a course and an exercise.
///
/// Names given on the command line are used as they are; missing ones are
/// chosen from the registry listing.
///
/// # Errors
///
/// Returns an error if a name is invalid, the registry cannot be queried,
/// a listing is empty or the prompt fails.
pub fn choose(
    ctx: &ServiceContext,
    course: Option<&str>,
    exercise: Option<&str>,
) -> Result<(String, String), FranklinError> {
    let course = match course {
        Some(name) => name.to_string(),
        None => {
            let courses = ctx.registry.courses().map_err(FranklinError::registry)?;
            let titles: Vec<String> = courses.iter().map(|c| c.title.clone()).collect();
            courses[pick(ctx, "Select a course:", &titles, "courses")?].name.clone()
        }
    };
    validate_name(&course)?;

    let exercise = match exercise {
        Some(name) => name.to_string(),
        None => {
            let exercises = ctx.registry.exercises(&course).map_err(FranklinError::registry)?;
            let titles: Vec<String> = exercises.iter().map(|e| e.title.clone()).collect();
            exercises[pick(ctx, "Select an exercise:", &titles, "exercises")?].name.clone()
        }
    };
    validate_name(&exercise)?;

    debug!(%course, %exercise, "exercise chosen");
    Ok((course, exercise))
}

fn pick(
    ctx: &ServiceContext,
    message: &str,
    titles: &[String],
    what: &str,
) -> Result<usize, FranklinError> {
    if titles.is_empty() {
        return Err(FranklinError::Registry(format!("no {what} available")));
    }
    let index = ctx.prompt.select(message, titles).map_err(FranklinError::prompt)?;
    if index >= titles.len() {
        return Err(FranklinError::Prompt(format!("choice {index} is out of range")));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::Script;
    use crate::ports::{Course, ExerciseListing};

    fn course(name: &str) -> Course {
        Course { name: name.into(), title: name.to_uppercase() }
    }

    fn exercise(name: &str) -> ExerciseListing {
        ExerciseListing { name: name.into(), title: format!("Exercise {name}") }
    }

    #[test]
    fn flags_skip_the_registry() {
        let ctx = Script::new().context();
        let chosen = choose(&ctx, Some("mbg"), Some("week1")).unwrap();
        assert_eq!(chosen, ("mbg".to_string(), "week1".to_string()));
    }

    #[test]
    fn missing_names_are_picked_from_listing() {
        let ctx = Script::new()
            .courses(&[course("mbg"), course("popgen")])
            .select(1)
            .exercises(&[exercise("week1"), exercise("week2")])
            .select(0)
            .context();
        let chosen = choose(&ctx, None, None).unwrap();
        assert_eq!(chosen, ("popgen".to_string(), "week1".to_string()));
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn empty_listing_is_an_error() {
        let ctx = Script::new().exercises(&[]).context();
        let err = choose(&ctx, Some("mbg"), None).unwrap_err();
        assert!(err.to_string().contains("no exercises available"));
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let ctx = Script::new().courses(&[course("mbg")]).select(4).context();
        assert!(matches!(choose(&ctx, None, None), Err(FranklinError::Prompt(_))));
    }
}
