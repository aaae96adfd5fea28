//! Deck lifecycle tools: create, open, save and close.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::deck::DeckRegistry;
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePresentationInput {
    /// Name of the presentation (without .pptx extension)
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenPresentationInput {
    /// Name of the presentation to open (without .pptx extension)
    pub presentation_name: String,
    /// Path where to save the presentation (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SavePresentationInput {
    /// Name of the presentation to save
    pub presentation_name: String,
    /// Path where to save the presentation (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClosePresentationInput {
    /// Name of the presentation to close
    pub presentation_name: String,
}

pub fn run_create(registry: &DeckRegistry, input: CreatePresentationInput) -> Result<String> {
    registry.create(&input.name)?;
    Ok(format!("Created new presentation: {}", input.name))
}

pub fn run_open(registry: &DeckRegistry, input: OpenPresentationInput) -> Result<String> {
    registry.open(&input.presentation_name, input.output_path.as_deref())?;
    Ok(format!("Opened presentation: {}", input.presentation_name))
}

pub fn run_save(registry: &DeckRegistry, input: SavePresentationInput) -> Result<String> {
    let path = registry.save(&input.presentation_name, input.output_path.as_deref())?;
    Ok(format!("Saved presentation to: {}", path.display()))
}

pub fn run_close(registry: &DeckRegistry, input: ClosePresentationInput) -> Result<String> {
    registry.close(&input.presentation_name)?;
    Ok(format!("Closed presentation: {}", input.presentation_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_messages() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DeckRegistry::new(dir.path());

        let created = run_create(&registry, CreatePresentationInput { name: "pitch".into() }).unwrap();
        assert_eq!(created, "Created new presentation: pitch");

        let saved = run_save(
            &registry,
            SavePresentationInput {
                presentation_name: "pitch".into(),
                output_path: None,
            },
        )
        .unwrap();
        assert_eq!(saved, format!("Saved presentation to: {}", dir.path().join("pitch.pptx").display()));

        let closed = run_close(
            &registry,
            ClosePresentationInput {
                presentation_name: "pitch".into(),
            },
        )
        .unwrap();
        assert_eq!(closed, "Closed presentation: pitch");

        let opened = run_open(
            &registry,
            OpenPresentationInput {
                presentation_name: "pitch".into(),
                output_path: None,
            },
        )
        .unwrap();
        assert_eq!(opened, "Opened presentation: pitch");
    }

    #[test]
    fn test_open_input_accepts_missing_output_path() {
        let input: OpenPresentationInput =
            serde_json::from_value(serde_json::json!({"presentation_name": "q3"})).unwrap();
        assert!(input.output_path.is_none());
    }
}
