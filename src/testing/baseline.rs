//! First-run baseline handling
//!
//! When a case has no expected output, its captured output is shown to the
//! operator, who may keep it as the new baseline. Either way the case
//! counts as unknown: it was never compared against anything.

use std::path::Path;

use super::exec::ExecutionResult;
use super::settings::RunSettings;
use super::suite::TestCase;
use super::triage::{Event, Prompt, TriageChoice, TriageConsole};
use crate::common::{paths, Error, Result};

/// What happened to a first-run output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineAction {
    Saved,
    Discarded,
}

/// Show the input program and whatever the subject produced for it
pub fn present_first_run(
    case: &TestCase,
    input_text: &str,
    execution: &Result<ExecutionResult>,
    console: &mut dyn TriageConsole,
) {
    console.show(Event::MissingBaseline);
    console.show(Event::Input {
        path: &case.input,
        text: input_text,
    });
    match execution {
        Ok(result) => console.show(Event::Output {
            text: &result.output,
        }),
        Err(e) => {
            let message = e.to_string();
            console.show(Event::LaunchFailed { message: &message });
        }
    }
}

/// Offer to keep the captured output as the case's baseline
///
/// Without `ask_to_save`, or when the subject never launched, the output is
/// discarded without asking. File errors while saving are reported and the
/// output is left in the scratch tree, which is removed at the end of the
/// run anyway.
pub async fn offer_save(
    case: &TestCase,
    launched: bool,
    settings: &RunSettings,
    console: &mut dyn TriageConsole,
) -> Result<BaselineAction> {
    let choice = if launched && settings.ask_to_save() && case.actual.exists() {
        console.present(Prompt::SaveBaseline).await?
    } else {
        TriageChoice::Discard
    };

    if choice == TriageChoice::Save {
        match save(&case.actual, &case.expected) {
            Ok(()) => {
                tracing::info!("Saved baseline {}", case.expected.display());
                console.show(Event::BaselineSaved {
                    path: &case.expected,
                });
                return Ok(BaselineAction::Saved);
            }
            Err(e) => tracing::warn!("Could not save baseline: {}", e),
        }
    } else {
        discard(&case.actual);
    }

    console.show(Event::OutputDiscarded);
    Ok(BaselineAction::Discarded)
}

/// Move captured output to the baseline path, creating parent directories
fn save(actual: &Path, expected: &Path) -> Result<()> {
    paths::ensure_parent(expected).map_err(|e| Error::file_write(expected, &e))?;
    if std::fs::rename(actual, expected).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    std::fs::copy(actual, expected).map_err(|e| Error::file_write(expected, &e))?;
    discard(actual);
    Ok(())
}

fn discard(actual: &Path) {
    if let Err(e) = std::fs::remove_file(actual) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not delete {}: {}", actual.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{Features, Layout};
    use crate::testing::suite::Suite;
    use async_trait::async_trait;

    struct Answer(TriageChoice, usize);

    #[async_trait]
    impl TriageConsole for Answer {
        fn show(&mut self, _event: Event<'_>) {}

        async fn present(&mut self, _prompt: Prompt) -> Result<TriageChoice> {
            self.1 += 1;
            Ok(self.0)
        }
    }

    fn case_in(root: &Path) -> TestCase {
        let layout = Layout::default().resolved(root);
        let input = layout.input_dir.join("scanner").join("deep").join("c.simpl");
        let case = TestCase::derive(&layout, Suite::Scanner, &input).unwrap();
        paths::ensure_parent(&case.actual).unwrap();
        std::fs::write(&case.actual, "token: id\n").unwrap();
        case
    }

    #[tokio::test]
    async fn test_save_creates_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path());
        let settings = RunSettings::new(&Features::default());
        let mut console = Answer(TriageChoice::Save, 0);

        let action = offer_save(&case, true, &settings, &mut console).await.unwrap();
        assert_eq!(action, BaselineAction::Saved);
        assert_eq!(std::fs::read_to_string(&case.expected).unwrap(), "token: id\n");
        assert!(!case.actual.exists());
    }

    #[tokio::test]
    async fn test_anything_else_discards() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path());
        let settings = RunSettings::new(&Features::default());
        let mut console = Answer(TriageChoice::Discard, 0);

        let action = offer_save(&case, true, &settings, &mut console).await.unwrap();
        assert_eq!(action, BaselineAction::Discarded);
        assert!(!case.expected.exists());
        assert!(!case.actual.exists());
    }

    #[tokio::test]
    async fn test_no_prompt_when_saving_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path());
        let features = Features {
            ask_to_save: false,
            ..Features::default()
        };
        let settings = RunSettings::new(&features);
        let mut console = Answer(TriageChoice::Save, 0);

        let action = offer_save(&case, true, &settings, &mut console).await.unwrap();
        assert_eq!(action, BaselineAction::Discarded);
        assert_eq!(console.1, 0);
        assert!(!case.expected.exists());
    }

    #[tokio::test]
    async fn test_failed_launch_is_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path());
        let settings = RunSettings::new(&Features::default());
        let mut console = Answer(TriageChoice::Save, 0);

        let action = offer_save(&case, false, &settings, &mut console).await.unwrap();
        assert_eq!(action, BaselineAction::Discarded);
        assert_eq!(console.1, 0);
        assert!(!case.expected.exists());
        assert!(!case.actual.exists());
    }
}
