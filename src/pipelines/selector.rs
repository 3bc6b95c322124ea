use log::debug;

use crate::error::{KickoffError, Result};

use super::catalog::Catalog;

/// Branch name preferred as the default interactive choice.
pub const DEFAULT_BRANCH: &str = "master";

/// Asks the user to choose one of `options`.
///
/// Implementations block until an answer is given and must return one of `options`.
pub trait Picker {
    fn pick(&self, message: &str, options: &[String], default: Option<&str>) -> Result<String>;
}

/// Resolves which pipelines to start.
///
/// Explicit names are validated against the catalog and returned in the given
/// order. Without explicit names the user picks one, with the first
/// `.../master` pipeline preselected.
pub fn select(catalog: &Catalog, explicit: &[String], picker: &dyn Picker) -> Result<Vec<String>> {
    let names = catalog.names();

    if !explicit.is_empty() {
        for name in explicit {
            if !catalog.contains(name) {
                return Err(KickoffError::InvalidJob {
                    name: name.clone(),
                    valid: names,
                });
            }
        }
        return Ok(explicit.to_vec());
    }

    let default = default_choice(&names);
    debug!("Asking for a pipeline, default {default:?}");

    let choice = picker.pick("Which pipeline do you want to start: ", &names, default)?;
    if !catalog.contains(&choice) {
        return Err(KickoffError::InvalidJob {
            name: choice,
            valid: names,
        });
    }

    Ok(vec![choice])
}

/// First name (in sorted order) whose last segment is the default branch.
pub fn default_choice(sorted_names: &[String]) -> Option<&str> {
    sorted_names
        .iter()
        .map(String::as_str)
        .find(|name| name.rsplit('/').next() == Some(DEFAULT_BRANCH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::testing::pipeline;
    use std::cell::RefCell;

    struct ScriptedPicker {
        answer: Option<String>,
        seen_default: RefCell<Option<Option<String>>>,
        seen_options: RefCell<Vec<String>>,
    }

    impl ScriptedPicker {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(ToString::to_string),
                seen_default: RefCell::new(None),
                seen_options: RefCell::new(Vec::new()),
            }
        }
    }

    impl Picker for ScriptedPicker {
        fn pick(&self, _: &str, options: &[String], default: Option<&str>) -> Result<String> {
            *self.seen_default.borrow_mut() = Some(default.map(ToString::to_string));
            *self.seen_options.borrow_mut() = options.to_vec();
            match (&self.answer, default) {
                (Some(answer), _) => Ok(answer.clone()),
                (None, Some(default)) => Ok(default.to_string()),
                (None, None) => Err(KickoffError::NotInteractive),
            }
        }
    }

    fn catalog(names: &[&str]) -> Catalog {
        names.iter().map(|n| pipeline(n)).collect()
    }

    #[test]
    fn explicit_names_pass_through_in_order() {
        let catalog = catalog(&["a/master", "b/master", "c/develop"]);
        let picker = ScriptedPicker::answering(None);

        let chosen = select(
            &catalog,
            &["c/develop".to_string(), "a/master".to_string()],
            &picker,
        )
        .unwrap();

        assert_eq!(chosen, vec!["c/develop", "a/master"]);
        assert!(picker.seen_default.borrow().is_none(), "picker must not be asked");
    }

    #[test]
    fn unknown_explicit_name_reports_name_and_sorted_valid_set() {
        let catalog = catalog(&["z/master", "a/develop"]);
        let picker = ScriptedPicker::answering(None);

        let err = select(&catalog, &["a/master".to_string()], &picker).unwrap_err();

        match err {
            KickoffError::InvalidJob { name, valid } => {
                assert_eq!(name, "a/master");
                assert_eq!(valid, vec!["a/develop", "z/master"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn interactive_default_is_first_sorted_master() {
        let catalog = catalog(&["team2/master", "team1/feature", "team1/master"]);
        let picker = ScriptedPicker::answering(None);

        let chosen = select(&catalog, &[], &picker).unwrap();

        assert_eq!(chosen, vec!["team1/master"]);
        assert_eq!(
            *picker.seen_options.borrow(),
            vec!["team1/feature", "team1/master", "team2/master"]
        );
    }

    #[test]
    fn no_master_means_no_default() {
        let catalog = catalog(&["team1/main", "team1/mastery"]);
        let picker = ScriptedPicker::answering(None);

        let err = select(&catalog, &[], &picker).unwrap_err();

        assert!(matches!(err, KickoffError::NotInteractive));
        assert_eq!(*picker.seen_default.borrow(), Some(None));
    }

    #[test]
    fn interactive_answer_overrides_default() {
        let catalog = catalog(&["team1/feature", "team1/master"]);
        let picker = ScriptedPicker::answering(Some("team1/feature"));

        assert_eq!(select(&catalog, &[], &picker).unwrap(), vec!["team1/feature"]);
    }

    #[test]
    fn default_choice_matches_whole_last_segment() {
        let names = vec!["a/not-master".to_string(), "master".to_string()];
        assert_eq!(default_choice(&names), Some("master"));
    }
}
