//! Slide tools, one per slide template.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::deck::builder::{self, ComparisonSides, TablePayload};
use crate::deck::{ChartPayload, Deck, DeckRegistry};
use crate::error::Result;
use crate::paths::resolve_in_base;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TitleSlideInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SectionHeaderInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Section header title
    pub header: String,
    /// Section header subtitle
    #[serde(default)]
    pub subtitle: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TitleContentInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
    /// Content of the slide, one bullet per line; leading tabs indent a bullet
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ComparisonInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
    /// Title of the left concept
    pub left_side_title: String,
    /// Content of the left concept
    pub left_side_content: String,
    /// Title of the right concept
    pub right_side_title: String,
    /// Content of the right concept
    pub right_side_content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableSlideInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
    /// Table data object with headers and rows
    pub data: TablePayload,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChartSlideInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
    /// Chart data structure
    pub data: ChartPayload,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PictureSlideInput {
    /// Name of the presentation to add the slide to
    pub presentation_name: String,
    /// Title of the slide
    pub title: String,
    /// Caption text to appear below the picture
    pub caption: String,
    /// Path to the image file to insert
    pub image_path: String,
}

/// Run `f` on the named deck while holding its lock.
fn with_deck<T>(registry: &DeckRegistry, name: &str, f: impl FnOnce(&mut Deck) -> Result<T>) -> Result<T> {
    let shared = registry.get(name)?;
    let mut deck = shared.lock();
    f(&mut deck)
}

pub fn run_title_only(registry: &DeckRegistry, input: TitleSlideInput) -> Result<String> {
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_title_slide(deck, &input.title)
    })?;
    Ok(format!(
        "Added slide '{}' to presentation: {}",
        input.title, input.presentation_name
    ))
}

pub fn run_section_header(registry: &DeckRegistry, input: SectionHeaderInput) -> Result<String> {
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_section_header(deck, &input.header, input.subtitle.as_deref())
    })?;
    Ok(format!(
        "Added slide '{}' to presentation: {}",
        input.header, input.presentation_name
    ))
}

pub fn run_title_content(registry: &DeckRegistry, input: TitleContentInput) -> Result<String> {
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_title_content(deck, &input.title, &input.content)
    })?;
    Ok(format!(
        "Added slide '{}' to presentation: {}",
        input.title, input.presentation_name
    ))
}

pub fn run_comparison(registry: &DeckRegistry, input: ComparisonInput) -> Result<String> {
    let sides = ComparisonSides {
        left_heading: &input.left_side_title,
        left_body: &input.left_side_content,
        right_heading: &input.right_side_title,
        right_body: &input.right_side_content,
    };
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_comparison(deck, &input.title, sides)
    })?;
    Ok(format!(
        "Successfully added comparison slide {} to {}.pptx",
        input.title, input.presentation_name
    ))
}

pub fn run_table(registry: &DeckRegistry, input: TableSlideInput) -> Result<String> {
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_table_slide(deck, &input.title, &input.data)
    })?;
    Ok(format!(
        "Added slide '{}' with a table to presentation: {}",
        input.title, input.presentation_name
    ))
}

pub fn run_chart(registry: &DeckRegistry, input: ChartSlideInput) -> Result<String> {
    let (_, shape) = with_deck(registry, &input.presentation_name, |deck| {
        builder::add_chart_slide(deck, &input.title, &input.data)
    })?;
    Ok(format!(
        "Added slide '{}' with a {} chart to presentation: {}",
        input.title, shape, input.presentation_name
    ))
}

/// The image path is checked against the base folder before the deck is
/// looked up or the file is read.
pub fn run_picture(registry: &DeckRegistry, input: PictureSlideInput) -> Result<String> {
    let image_path = resolve_in_base(registry.base_dir(), &input.image_path)?;
    with_deck(registry, &input.presentation_name, |deck| {
        builder::add_picture_slide(deck, &input.title, &input.caption, &image_path)
    })?;
    Ok(format!(
        "Successfully added slide with caption and picture layout to {}.pptx",
        input.presentation_name
    ))
}
