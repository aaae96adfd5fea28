//! Image generation tool.

use schemars::JsonSchema;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{DeckError, Result};
use crate::paths::resolve_in_base;
use crate::vision::ImageGenerator;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateImageInput {
    /// Description of the image to generate in the form of a prompt.
    pub prompt: String,
    /// Filename of the image. Include the extension of .png
    pub file_name: String,
}

/// Check the arguments and resolve the destination inside `base_dir`.
pub fn destination(base_dir: &std::path::Path, input: &GenerateImageInput) -> Result<PathBuf> {
    if input.prompt.trim().is_empty() {
        return Err(DeckError::MissingArgument("prompt"));
    }
    if input.file_name.trim().is_empty() {
        return Err(DeckError::MissingArgument("file_name"));
    }
    resolve_in_base(base_dir, &input.file_name)
}

pub async fn run_generate(
    generator: &ImageGenerator,
    base_dir: &std::path::Path,
    input: GenerateImageInput,
) -> Result<String> {
    let path = destination(base_dir, &input)?;
    let saved = generator.generate_and_save(&input.prompt, &path).await?;
    Ok(format!("Successfully generated and saved image to: {}", saved.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn input(prompt: &str, file_name: &str) -> GenerateImageInput {
        GenerateImageInput {
            prompt: prompt.into(),
            file_name: file_name.into(),
        }
    }

    #[test]
    fn test_destination() {
        let base = Path::new("/srv/decks");
        assert_eq!(
            destination(base, &input("a fox", "img/fox.png")).unwrap(),
            base.join("img/fox.png")
        );
        assert!(matches!(
            destination(base, &input("", "fox.png")),
            Err(DeckError::MissingArgument("prompt"))
        ));
        assert!(matches!(
            destination(base, &input("a fox", "../fox.png")),
            Err(DeckError::InvalidPath(_))
        ));
    }
}
