//! Widget UI resources: the HTML templates the host renders for tool output.

use rmcp::model::{AnnotateAble, ErrorData, ListResourcesResult, Meta, RawResource, ReadResourceResult, Resource, ResourceContents};
use serde_json::{Map, Value, json};
use skydeck_types::seed_tasks;
use skydeck_widget::render::render_board_template;

use crate::config::WidgetConfig;
use crate::server::tools::{KANBAN_TEMPLATE_URI, WEATHER_TEMPLATE_URI};

/// Mime type the host expects for widget templates.
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Mount point for the weather widget; the loader script fills it in.
pub const WEATHER_SHELL_MARKUP: &str =
    "<div id=\"weather-root\"></div>\n<link rel=\"stylesheet\" href=\"/widget.css\" />\n<script type=\"module\" src=\"/widget.js\"></script>";

/// `_meta` advertised with the board template.
pub fn kanban_resource_meta(widget: &WidgetConfig) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("openai/widgetPrefersBorder".to_string(), json!(widget.prefers_border));
    meta.insert("openai/widgetDomain".to_string(), json!(widget.domain));
    meta.insert(
        "openai/widgetCSP".to_string(),
        json!({
            "connect_domains": widget.connect_domains,
            "resource_domains": widget.resource_domains,
        }),
    );
    meta
}

/// Build the resource list for both widget templates.
pub fn list_resources(widget: &WidgetConfig) -> ListResourcesResult {
    let resources = vec![
        resource(
            WEATHER_TEMPLATE_URI,
            "weather-widget",
            "Weather widget shell",
            "HTML scaffold that mounts the weather forecast widget.",
            None,
        ),
        resource(
            KANBAN_TEMPLATE_URI,
            "kanban-board-widget",
            "Kanban Board Widget",
            "Interactive Kanban board UI",
            Some(kanban_resource_meta(widget)),
        ),
    ];
    ListResourcesResult::with_all_items(resources)
}

/// Read a widget template by URI.
pub fn read_resource(uri: &str, widget: &WidgetConfig) -> Result<ReadResourceResult, ErrorData> {
    match uri {
        WEATHER_TEMPLATE_URI => Ok(html_resource(uri, WEATHER_SHELL_MARKUP.to_string(), None)),
        KANBAN_TEMPLATE_URI => Ok(html_resource(
            uri,
            render_board_template(&seed_tasks()),
            Some(kanban_resource_meta(widget)),
        )),
        _ => Err(ErrorData::resource_not_found(
            format!("resource '{uri}' was not found"),
            Some(json!({ "uri": uri, "known_uris": [WEATHER_TEMPLATE_URI, KANBAN_TEMPLATE_URI] })),
        )),
    }
}

fn resource(uri: &str, name: &str, title: &str, description: &str, meta: Option<Map<String, Value>>) -> Resource {
    RawResource {
        uri: uri.to_string(),
        name: name.to_string(),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        mime_type: Some(WIDGET_MIME_TYPE.to_string()),
        size: None,
        icons: None,
        meta: meta.map(Meta),
    }
    .no_annotation()
}

fn html_resource(uri: &str, text: String, meta: Option<Map<String, Value>>) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(WIDGET_MIME_TYPE.to_string()),
            text,
            meta: meta.map(Meta),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn lists_both_widget_templates() {
        let listed = list_resources(&WidgetConfig::default());
        let uris: Vec<&str> = listed.resources.iter().map(|resource| resource.raw.uri.as_str()).collect();
        assert_eq!(uris, vec![WEATHER_TEMPLATE_URI, KANBAN_TEMPLATE_URI]);
        assert!(
            listed
                .resources
                .iter()
                .all(|resource| resource.raw.mime_type.as_deref() == Some(WIDGET_MIME_TYPE))
        );
    }

    #[test]
    fn weather_shell_mounts_the_loader() {
        let read = read_resource(WEATHER_TEMPLATE_URI, &WidgetConfig::default()).expect("weather shell");
        let ResourceContents::TextResourceContents { text, .. } = &read.contents[0] else {
            panic!("expected text contents");
        };
        assert!(text.contains("id=\"weather-root\""));
        assert!(text.contains("/widget.js"));
    }

    #[test]
    fn kanban_template_is_server_rendered_with_csp_meta() {
        let read = read_resource(KANBAN_TEMPLATE_URI, &WidgetConfig::default()).expect("kanban template");
        let ResourceContents::TextResourceContents { text, meta, .. } = &read.contents[0] else {
            panic!("expected text contents");
        };
        assert!(text.contains("kanban-root"));
        let meta = meta.as_ref().expect("meta");
        assert_eq!(meta.0["openai/widgetPrefersBorder"], json!(true));
        assert_eq!(meta.0["openai/widgetDomain"], json!("https://chatgpt.com"));
        assert_eq!(
            meta.0["openai/widgetCSP"]["resource_domains"],
            json!(["https://*.oaistatic.com"])
        );
    }

    #[test]
    fn kanban_template_wires_the_board_to_the_host() {
        let read = read_resource(KANBAN_TEMPLATE_URI, &WidgetConfig::default()).expect("kanban template");
        let ResourceContents::TextResourceContents { text, .. } = &read.contents[0] else {
            panic!("expected text contents");
        };
        assert!(text.contains("<script type=\"module\">"));
        assert!(text.contains("toolOutput"));
        assert!(text.contains("widgetState"));
        assert!(text.contains("setWidgetState"));
        assert!(text.contains("/render/board"));
        assert!(text.contains("btn-move"));
    }

    #[test]
    fn unknown_uri_is_not_found() {
        let error = read_resource("ui://widget/missing", &WidgetConfig::default()).expect_err("unknown uri");
        assert_eq!(error.code, ErrorCode::RESOURCE_NOT_FOUND);
    }
}
