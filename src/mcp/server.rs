//! MCP server exposing the deck tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tracing::{info, warn};

use crate::config::Config;
use crate::deck::DeckRegistry;
use crate::error::DeckError;
use crate::mcp::tools::image::{GenerateImageInput, run_generate};
use crate::mcp::tools::presentation::*;
use crate::mcp::tools::slides::*;
use crate::vision::ImageGenerator;

/// Turn a handler result into a tool reply. Failures become tool errors
/// carrying the error message.
fn reply(tool: &str, result: Result<String, DeckError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => {
            info!("{}: {}", tool, text);
            Ok(CallToolResult::success(vec![Content::text(text)]))
        },
        Err(e) => {
            warn!("{} failed ({:?}): {}", tool, e.kind(), e);
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        },
    }
}

/// The deckmill MCP server
#[derive(Debug, Clone)]
pub struct DeckServer {
    registry: Arc<DeckRegistry>,
    images: ImageGenerator,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DeckServer {
    pub fn new(registry: Arc<DeckRegistry>, images: ImageGenerator) -> Self {
        Self {
            registry,
            images,
            tool_router: Self::tool_router(),
        }
    }

    pub fn registry(&self) -> &DeckRegistry {
        &self.registry
    }

    #[tool(
        name = "create-presentation",
        description = "This tool starts the process of generating a new powerpoint presentation with the name given by the user. Use this tool when the user requests to create or generate a new presentation."
    )]
    async fn create_presentation(
        &self,
        Parameters(input): Parameters<CreatePresentationInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("create-presentation", run_create(&self.registry, input))
    }

    #[tool(
        name = "open-presentation",
        description = "Opens an existing presentation and saves a copy to a new file for backup. Use this tool when the user requests to open a presentation that has already been created."
    )]
    async fn open_presentation(
        &self,
        Parameters(input): Parameters<OpenPresentationInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("open-presentation", run_open(&self.registry, input))
    }

    #[tool(
        name = "save-presentation",
        description = "Save the presentation to a file. Always use this tool at the end of any process that has added slides to a presentation."
    )]
    async fn save_presentation(
        &self,
        Parameters(input): Parameters<SavePresentationInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("save-presentation", run_save(&self.registry, input))
    }

    #[tool(
        name = "close-presentation",
        description = "Close a presentation and release it from memory. Unsaved slides are discarded, so save the presentation first."
    )]
    async fn close_presentation(
        &self,
        Parameters(input): Parameters<ClosePresentationInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("close-presentation", run_close(&self.registry, input))
    }

    #[tool(
        name = "generate-and-save-image",
        description = "Generates an image using a Gemini model and saves the image to the specified path. The tool will return a PNG file path. It should be used when the user asks to generate or create an image or a picture."
    )]
    async fn generate_and_save_image(
        &self,
        Parameters(input): Parameters<GenerateImageInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = run_generate(&self.images, self.registry.base_dir(), input).await;
        reply("generate-and-save-image", result)
    }

    #[tool(
        name = "add-slide-title-only",
        description = "This tool adds a new title slide to the presentation you are working on. The tool doesn't return anything. It requires the presentation_name to work on."
    )]
    async fn add_slide_title_only(
        &self,
        Parameters(input): Parameters<TitleSlideInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-title-only", run_title_only(&self.registry, input))
    }

    #[tool(
        name = "add-slide-section-header",
        description = "This tool adds a section header (a.k.a segue) slide to the presentation you are working on. The tool doesn't return anything. It requires the presentation_name to work on."
    )]
    async fn add_slide_section_header(
        &self,
        Parameters(input): Parameters<SectionHeaderInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-section-header", run_section_header(&self.registry, input))
    }

    #[tool(
        name = "add-slide-title-content",
        description = "Add a new slide with a title and content to an existing presentation"
    )]
    async fn add_slide_title_content(
        &self,
        Parameters(input): Parameters<TitleContentInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-title-content", run_title_content(&self.registry, input))
    }

    #[tool(
        name = "add-slide-comparison",
        description = "Add a new a comparison slide with title and comparison content. Use when you wish to compare two concepts"
    )]
    async fn add_slide_comparison(
        &self,
        Parameters(input): Parameters<ComparisonInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-comparison", run_comparison(&self.registry, input))
    }

    #[tool(
        name = "add-slide-title-with-table",
        description = "Add a new slide with a title and table containing the provided data"
    )]
    async fn add_slide_title_with_table(
        &self,
        Parameters(input): Parameters<TableSlideInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-title-with-table", run_table(&self.registry, input))
    }

    #[tool(
        name = "add-slide-title-with-chart",
        description = "Add a new slide with a title and chart. The chart type will be automatically selected based on the data structure."
    )]
    async fn add_slide_title_with_chart(
        &self,
        Parameters(input): Parameters<ChartSlideInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-title-with-chart", run_chart(&self.registry, input))
    }

    #[tool(
        name = "add-slide-picture-with-caption",
        description = "Add a new slide with a picture and caption to an existing presentation"
    )]
    async fn add_slide_picture_with_caption(
        &self,
        Parameters(input): Parameters<PictureSlideInput>,
    ) -> Result<CallToolResult, McpError> {
        reply("add-slide-picture-with-caption", run_picture(&self.registry, input))
    }
}

#[tool_handler]
impl ServerHandler for DeckServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "deckmill".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Builds PowerPoint decks. Create or open a presentation, add slides with the \
                 add-slide-* tools, then call save-presentation."
                    .into(),
            ),
        }
    }
}

/// Run the server on stdin/stdout until the client disconnects.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let folder = config.prepare_folder()?;
    info!("Starting deckmill MCP server in {}", folder.display());

    let registry = Arc::new(DeckRegistry::new(folder));
    let images = ImageGenerator::new(&config.image_endpoint, &config.image_model, config.image_timeout())?;
    let service = DeckServer::new(registry, images)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;
    info!("Client disconnected, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn server(dir: &std::path::Path) -> DeckServer {
        let images = ImageGenerator::new("http://127.0.0.1:9", "test-model", Duration::from_secs(1)).unwrap();
        DeckServer::new(Arc::new(DeckRegistry::new(dir)), images)
    }

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_tool_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut names: Vec<String> = server(dir.path())
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "add-slide-comparison",
                "add-slide-picture-with-caption",
                "add-slide-section-header",
                "add-slide-title-content",
                "add-slide-title-only",
                "add-slide-title-with-chart",
                "add-slide-title-with-table",
                "close-presentation",
                "create-presentation",
                "generate-and-save-image",
                "open-presentation",
                "save-presentation",
            ]
        );
    }

    #[tokio::test]
    async fn test_failures_are_tool_errors() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());
        let result = server
            .add_slide_title_only(Parameters(TitleSlideInput {
                presentation_name: "missing".into(),
                title: "T".into(),
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text(&result), "Presentation not found: missing");
    }

    #[tokio::test]
    async fn test_create_then_add() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());
        let created = server
            .create_presentation(Parameters(CreatePresentationInput { name: "demo".into() }))
            .await
            .unwrap();
        assert_eq!(text(&created), "Created new presentation: demo");

        let added = server
            .add_slide_title_content(Parameters(TitleContentInput {
                presentation_name: "demo".into(),
                title: "Plan".into(),
                content: "Ship\n\tTest".into(),
            }))
            .await
            .unwrap();
        assert_ne!(added.is_error, Some(true));
        assert_eq!(server.registry().get("demo").unwrap().lock().slide_count().unwrap(), 1);
    }
}
