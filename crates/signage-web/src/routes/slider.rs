//! Slider page.
//!
//! ### `GET /stations/{id}/slider`
//! Renders a self-contained slideshow of the station's current playlist.
//! The page cycles through the slides using each item's duration and
//! reloads itself when the station stream reports a playlist whose media
//! ids differ from the ones it was rendered with.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use htmlescape::encode_minimal;

use signage_core::{MediaKind, StationId};
use signage_protocol::DisplayItem;

use crate::error::ApiError;
use crate::AppState;

/// Create slider routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/slider", get(station_slider))
}

/// GET /stations/{id}/slider
async fn station_slider(
    State(state): State<AppState>,
    Path(station_id): Path<StationId>,
) -> Result<Html<String>, ApiError> {
    let resolver = state.server.resolver();
    let resolution = resolver.resolve(station_id).await?;
    state.statistics.record_slider_render();

    let items = resolution.display_items(resolver.urls());
    Ok(Html(render_slider(
        station_id,
        &resolution.station.screen_name,
        &items,
    )))
}

/// Markup for one slide.
fn slide_element(item: &DisplayItem) -> String {
    let url = encode_minimal(&item.url);
    match MediaKind::from_tag(&item.media_type) {
        MediaKind::Image => format!(r#"<img src="{}" alt="">"#, url),
        MediaKind::Video => format!(r#"<video src="{}" autoplay muted playsinline></video>"#, url),
        MediaKind::Document | MediaKind::Other => format!(r#"<iframe src="{}"></iframe>"#, url),
    }
}

/// Render the slider page for a resolved playlist.
pub fn render_slider(station_id: StationId, screen_name: &str, items: &[DisplayItem]) -> String {
    let title = encode_minimal(screen_name);
    let rendered_ids = items
        .iter()
        .map(|item| item.id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut slides = String::new();
    for item in items {
        slides.push_str(&format!(
            "    <div class=\"slide\" data-id=\"{}\" data-duration=\"{}\" title=\"{}\">{}</div>\n",
            item.id,
            item.duration,
            encode_minimal(&format!("{} ({})", item.product_name, item.product_code)),
            slide_element(item),
        ));
    }
    if items.is_empty() {
        slides.push_str("    <p class=\"empty\">No media selected</p>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    html, body {{ margin: 0; height: 100%; background: #000; color: #fff; }}
    .slide {{ display: none; width: 100%; height: 100%; }}
    .slide.active {{ display: block; }}
    .slide img, .slide video, .slide iframe {{ width: 100%; height: 100%; object-fit: contain; border: 0; }}
  </style>
</head>
<body>
  <h1 hidden>{title}</h1>
  <div id="slides">
{slides}  </div>
  <script>
    const slides = Array.from(document.querySelectorAll('.slide'));
    let current = 0;
    function show() {{
      if (slides.length === 0) return;
      slides.forEach((s, i) => s.classList.toggle('active', i === current));
      const seconds = Number(slides[current].dataset.duration) || 10;
      current = (current + 1) % slides.length;
      setTimeout(show, seconds * 1000);
    }}
    show();
    const renderedIds = [{rendered_ids}];
    const source = new EventSource('/stations/{station_id}/stream');
    source.onmessage = (event) => {{
      const ids = JSON.parse(event.data).media.map((m) => m.id);
      const same = ids.length === renderedIds.length && ids.every((id, i) => id === renderedIds[i]);
      if (!same) window.location.reload();
    }};
  </script>
</body>
</html>
"#,
        title = title,
        slides = slides,
        rendered_ids = rendered_ids,
        station_id = station_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::routes::test_support::{get, lobby_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_slider_renders_each_kind() {
        let state = lobby_state();
        state
            .server
            .store()
            .write()
            .await
            .set_media_selected(3, true)
            .unwrap();

        let (status, body) = get(create_router(state), "/stations/1/slider").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Lobby Display</title>"));
        assert!(body.contains(r#"<img src="/media/ad1.jpg""#));
        assert!(body.contains(r#"<video src="/media/ad2.mp4""#));
        assert!(body.contains(r#"<iframe src="/media/price%20list.pdf""#));
        assert!(body.contains(r#"data-duration="20""#));
        assert!(body.contains("/stations/1/stream"));
        assert!(body.contains("const renderedIds = [1,2,3];"));
    }

    #[tokio::test]
    async fn test_slider_reloads_only_on_different_playlist() {
        let (_, body) = get(create_router(lobby_state()), "/stations/1/slider").await;
        assert!(body.contains("const renderedIds = [1,2];"));
        assert!(body.contains("JSON.parse(event.data).media.map((m) => m.id)"));
        assert!(!body.contains("initial"));

        let (_, body) = get(create_router(lobby_state()), "/stations/2/slider").await;
        assert!(body.contains("const renderedIds = [];"));
    }

    #[tokio::test]
    async fn test_slider_escapes_screen_name() {
        let (status, body) = get(create_router(lobby_state()), "/stations/2/slider").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hall &lt;Display&gt;"));
        assert!(body.contains("No media selected"));
    }

    #[tokio::test]
    async fn test_slider_unknown_station_is_404() {
        let (status, _) = get(create_router(lobby_state()), "/stations/42/slider").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_iframe() {
        let item = DisplayItem {
            id: 9,
            url: "/media/bundle.zip".to_string(),
            media_type: "zip".to_string(),
            duration: 3,
            product_name: "Widget".to_string(),
            product_code: "W100".to_string(),
        };
        assert_eq!(slide_element(&item), r#"<iframe src="/media/bundle.zip"></iframe>"#);
    }
}
