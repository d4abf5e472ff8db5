use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::analysis::{mime_for_file_name, AnalysisClient, ImageUpload};
use crate::ui::state::{Action, UiState};
use crate::ui::{check_backend, Store};

/// Load an image from disk, guessing its type from the extension.
pub fn load_image(path: &Path) -> Result<ImageUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime = mime_for_file_name(&file_name);
    Ok(ImageUpload::new(file_name, mime, bytes))
}

/// Plain-text rendering of the parts of the state a terminal user cares about.
pub fn summary(state: &UiState) -> String {
    let mut out = String::new();
    if let Some(notice) = &state.notice {
        out.push_str(&format!("[{}] {}\n", notice.severity.as_str(), notice.message));
    }
    if !state.description.is_empty() {
        out.push_str(&format!("\nImage description:\n  {}\n", state.description));
    }
    if let Some(status) = state.pii_status() {
        out.push_str(&format!(
            "\nPrivacy analysis: {}\n  {}\n",
            status.label(),
            state.analysis
        ));
    }
    out
}

/// Submit with the given inputs; a blank prompt or missing image is caught
/// by the reducer before any request is made. Returns the text to print.
pub async fn submit(
    store: &Store,
    client: &AnalysisClient,
    image: Option<ImageUpload>,
    prompt: String,
) -> String {
    let action = Action::SubmitWith {
        image,
        prompt: Some(prompt),
    };
    store.dispatch_and_run(client, action).await;
    summary(&store.take_for_render().await)
}

/// Interactive terminal session driving the same reducer as the browser UI.
pub async fn run(client: AnalysisClient) -> Result<()> {
    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    println!("=== PrivAlert CLI ===");
    println!("Backend: {}\n", client.base_url());

    let store = Store::default();
    check_backend(&store, &client).await;
    print!("{}", summary(&store.take_for_render().await));

    loop {
        let path = read_line("\nImage path ('clear' resets, 'quit' exits): ")?;
        let image = match path.as_str() {
            "quit" | "exit" => break,
            "clear" => {
                store.dispatch(Action::Clear).await;
                print!("{}", summary(&store.take_for_render().await));
                continue;
            }
            "" => None,
            _ => match load_image(Path::new(&path)) {
                Ok(image) => Some(image),
                Err(e) => {
                    println!("{e:#}");
                    continue;
                }
            },
        };

        let prompt = read_line("Prompt (e.g. Describe this image): ")?;
        println!("Processing...");
        print!("{}", submit(&store, &client, image, prompt).await);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, NO_DESCRIPTION};
    use crate::ui::state::{Effect, Phase, MISSING_INPUT};
    use std::time::Duration;

    #[test]
    fn test_summary_for_detected_result() {
        let (state, _) = UiState::default().update(Action::SelectImage(ImageUpload::new(
            "id.jpg",
            "image/jpeg",
            vec![0xff, 0xd8],
        )));
        let (state, _) = state.update(Action::EditPrompt("Read the card".into()));
        let (state, effect) = state.update(Action::Submit);
        let Some(Effect::Analyze { generation, .. }) = effect else {
            panic!("expected an analyze effect");
        };
        let (state, _) = state.update(Action::Completed {
            generation,
            outcome: Ok(AnalysisResult {
                description: NO_DESCRIPTION.into(),
                analysis: "PII detected: email address".into(),
            }),
        });

        let text = summary(&state);
        assert!(text.contains("[success] Analysis completed successfully!"));
        assert!(text.contains(NO_DESCRIPTION));
        assert!(text.contains("Privacy analysis: PII Detected!"));
    }

    #[tokio::test]
    async fn test_blank_prompt_makes_no_request() {
        let store = Store::default();
        let client = AnalysisClient::with_base_url(
            "http://127.0.0.1:1",
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let image = ImageUpload::new("cat.png", "image/png", vec![1, 2, 3]);

        let text = submit(&store, &client, Some(image), "  ".to_string()).await;

        assert!(text.contains(MISSING_INPUT));
        let state = store.snapshot().await;
        assert_eq!(state.generation, 0);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_summary_empty_state() {
        assert_eq!(summary(&UiState::default()), "");
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image(Path::new("/nonexistent/cat.png")).is_err());
    }
}
