//! HTML composition for the card template.
//!
//! The composer is a pure function of its inputs; the only randomness
//! (layout choice) is drawn by the caller through [`TextPlacement::choose`].
//!
//! Badge colors and the content fragment are inserted verbatim. Nothing here
//! sanitizes markup, so `content` can carry `<script>` or `<style>`; callers
//! exposing the service publicly must filter it upstream.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{RenderRequest, AUTHORING_CANVAS};

/// Where the text block sits on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPlacement {
    Left,
    Right,
    Center,
}

impl TextPlacement {
    pub const ALL: [TextPlacement; 3] = [TextPlacement::Left, TextPlacement::Right, TextPlacement::Center];

    /// Uniform draw over the three layouts.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// The explicit override if any, otherwise a random draw.
    pub fn resolve<R: Rng + ?Sized>(requested: Option<Self>, rng: &mut R) -> Self {
        requested.unwrap_or_else(|| Self::choose(rng))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextPlacement::Left => "left",
            TextPlacement::Right => "right",
            TextPlacement::Center => "center",
        }
    }

    /// Decorative tilt of the text block in degrees
    pub fn rotation_deg(self) -> i32 {
        match self {
            TextPlacement::Left => -4,
            TextPlacement::Right => 4,
            TextPlacement::Center => 0,
        }
    }

    /// Max width of the text block, as a percentage of the canvas
    pub fn max_width_pct(self) -> u32 {
        match self {
            TextPlacement::Left | TextPlacement::Right => 60,
            TextPlacement::Center => 90,
        }
    }

    /// Inline style for the text container
    pub fn container_style(self) -> String {
        let rot = self.rotation_deg();
        let max = self.max_width_pct();
        match self {
            TextPlacement::Left => format!(
                "top: 50%; left: 5%; transform: translateY(-50%) rotate({rot}deg); text-align: left; max-width: {max}%;"
            ),
            TextPlacement::Right => format!(
                "top: 50%; right: 5%; left: auto; transform: translateY(-50%) rotate({rot}deg); text-align: right; max-width: {max}%;"
            ),
            TextPlacement::Center => format!(
                "top: 50%; left: 50%; transform: translate(-50%, -50%) rotate({rot}deg); text-align: center; max-width: {max}%;"
            ),
        }
    }

    /// Inline style for the contrast scrim under the text
    pub fn scrim_style(self) -> &'static str {
        match self {
            TextPlacement::Left => {
                "top: 50%; left: 0; transform: translateY(-50%); width: 50%; height: 100%; \
                 background: linear-gradient(to right, rgba(0, 0, 0, 0.7) 0%, rgba(0, 0, 0, 0.4) 60%, transparent 100%);"
            }
            TextPlacement::Right => {
                "top: 50%; right: 0; left: auto; transform: translateY(-50%); width: 50%; height: 100%; \
                 background: linear-gradient(to left, rgba(0, 0, 0, 0.7) 0%, rgba(0, 0, 0, 0.4) 60%, transparent 100%);"
            }
            TextPlacement::Center => {
                "top: 50%; left: 50%; transform: translate(-50%, -50%); width: 100%; height: 100%; \
                 background: radial-gradient(ellipse at center, rgba(0, 0, 0, 0.6) 0%, rgba(0, 0, 0, 0.4) 40%, transparent 70%);"
            }
        }
    }
}

impl std::fmt::Display for TextPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete, self-contained HTML document ready for the renderer
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub html: String,
    pub placement: TextPlacement,
    pub background_url: String,
    pub has_logo: bool,
}

/// Build the card document.
///
/// `logo_src` is a data URI; when `None` the logo block is left out entirely.
pub fn compose_html(
    request: &RenderRequest,
    background_url: &str,
    logo_src: Option<&str>,
    placement: TextPlacement,
) -> ComposedDocument {
    let logo_block = logo_src
        .map(|src| {
            format!(
                r#"<div class="watermark-logo"><img src="{}" alt="Watermark" /></div>"#,
                attr_escape(src)
            )
        })
        .unwrap_or_default();

    let canvas = AUTHORING_CANVAS;
    let width = canvas.width.to_string();
    let height = canvas.height.to_string();
    let container_style = placement.container_style();
    let background = attr_escape(background_url);

    let html = fill_template(CARD_TEMPLATE, |key| match key {
        "CANVAS_WIDTH" => Some(width.as_str()),
        "CANVAS_HEIGHT" => Some(height.as_str()),
        "FONT_IMPORT" => Some(FONT_IMPORT),
        "BADGE_BG" => Some(request.category_bg_color.as_str()),
        "BADGE_FG" => Some(request.category_text_color.as_str()),
        "BACKGROUND_URL" => Some(background.as_str()),
        "SCRIM_STYLE" => Some(placement.scrim_style()),
        "PLACEMENT" => Some(placement.as_str()),
        "CONTAINER_STYLE" => Some(container_style.as_str()),
        "CATEGORY_NAME" => Some(request.category_name.as_str()),
        "CONTENT" => Some(request.content.as_str()),
        "LOGO_BLOCK" => Some(logo_block.as_str()),
        _ => None,
    });

    ComposedDocument {
        html,
        placement,
        background_url: background_url.to_string(),
        has_logo: logo_src.is_some(),
    }
}

/// Single-pass `{{NAME}}` substitution.
///
/// Substituted values are never rescanned, so a content fragment containing a
/// placeholder-looking string is emitted as-is.
fn fill_template<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn attr_escape(s: &str) -> String {
    s.replace('"', "&quot;")
}

const FONT_IMPORT: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@800;900&family=Roboto:wght@700;900&display=swap";

const CARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width={{CANVAS_WIDTH}}, height={{CANVAS_HEIGHT}}, initial-scale=1.0" />
  <title>Card</title>
  <style>
    @import url('{{FONT_IMPORT}}');

    * { margin: 0; padding: 0; box-sizing: border-box; }

    html, body {
      width: {{CANVAS_WIDTH}}px;
      height: {{CANVAS_HEIGHT}}px;
      overflow: visible;
      display: block;
    }

    body {
      min-height: {{CANVAS_HEIGHT}}px;
      position: relative;
      font-family: 'Inter', 'Roboto', sans-serif;
    }

    .background-image {
      position: absolute;
      top: 0;
      left: 0;
      width: {{CANVAS_WIDTH}}px;
      height: {{CANVAS_HEIGHT}}px;
      object-fit: cover;
      object-position: center 30%;
      z-index: 0;
    }

    .overlay {
      position: absolute;
      top: 0;
      left: 0;
      width: {{CANVAS_WIDTH}}px;
      height: {{CANVAS_HEIGHT}}px;
      background: linear-gradient(to bottom, rgba(0, 0, 0, 0.3) 0%, rgba(0, 0, 0, 0.5) 50%, rgba(0, 0, 0, 0.75) 100%);
      z-index: 1;
    }

    .text-background {
      position: absolute;
      z-index: 1;
      pointer-events: none;
    }

    .text-container {
      position: absolute;
      padding: 40px 50px;
      z-index: 2;
      display: flex;
      flex-direction: column;
      gap: 12px;
      width: 100%;
      transform-origin: center center;
    }

    .text-container.text-left { align-items: flex-start; }
    .text-container.text-right { align-items: flex-end; }
    .text-container.text-center { align-items: center; }

    .main-title {
      font-size: 30px;
      font-weight: 900;
      line-height: 1.05;
      color: #FFFFFF;
      text-shadow:
        -3px -3px 0 #000000,
        3px -3px 0 #000000,
        -3px 3px 0 #000000,
        3px 3px 0 #000000,
        0 0 30px rgba(0, 0, 0, 0.9),
        0 6px 12px rgba(0, 0, 0, 0.8);
      letter-spacing: 1px;
      text-transform: uppercase;
    }

    .subtitle {
      font-size: 38px;
      font-weight: 700;
      line-height: 1.3;
      color: #FFFFFF;
      text-shadow:
        -2px -2px 0 #000000,
        2px -2px 0 #000000,
        -2px 2px 0 #000000,
        2px 2px 0 #000000,
        0 0 20px rgba(0, 0, 0, 0.8),
        0 4px 10px rgba(0, 0, 0, 0.7);
      letter-spacing: 1px;
      text-transform: uppercase;
      margin-top: 8px;
    }

    .highlight {
      background: linear-gradient(135deg, #00D9FF 0%, #00B8E6 50%, #0099CC 100%);
      -webkit-background-clip: text;
      -webkit-text-fill-color: transparent;
      background-clip: text;
      font-size: 1.3em;
      font-weight: 900;
      letter-spacing: 3px;
      position: relative;
      display: inline-block;
      text-shadow: none;
      filter: drop-shadow(0 0 20px rgba(0, 217, 255, 0.7))
              drop-shadow(0 0 35px rgba(0, 184, 230, 0.5))
              drop-shadow(0 6px 20px rgba(0, 0, 0, 0.9));
    }

    .highlight::before {
      content: attr(data-text);
      position: absolute;
      left: 0;
      top: 0;
      z-index: -1;
      background: linear-gradient(135deg, #00D9FF 0%, #00B8E6 50%, #0099CC 100%);
      -webkit-background-clip: text;
      -webkit-text-fill-color: transparent;
      background-clip: text;
      filter: blur(15px);
      opacity: 0.7;
    }

    .watermark-logo {
      position: relative;
      width: 180px;
      height: 180px;
      min-width: 180px;
      min-height: 180px;
      display: flex;
      align-items: center;
      justify-content: center;
    }

    .watermark-logo img {
      width: 100%;
      height: 100%;
      object-fit: contain;
      display: block;
    }

    .category-badge {
      width: fit-content;
      position: relative;
      background: {{BADGE_BG}};
      color: {{BADGE_FG}};
      padding: 12px 24px;
      border-radius: 8px;
      font-size: 18px;
      font-weight: 800;
      text-transform: uppercase;
      letter-spacing: 2px;
      box-shadow: 0 4px 15px rgba(0, 0, 0, 0.4);
      margin-bottom: 20px;
    }
  </style>
</head>
<body>
  <img src="{{BACKGROUND_URL}}" alt="Background" class="background-image" />
  <div class="overlay"></div>
  <div class="text-background" style="{{SCRIM_STYLE}}"></div>
  <div class="text-container text-{{PLACEMENT}}" style="{{CONTAINER_STYLE}}">
    <div class="category-badge">{{CATEGORY_NAME}}</div>
    <div class="main-title">
      {{CONTENT}}
    </div>
    {{LOGO_BLOCK}}
  </div>
  <!-- keeps the layout box at the full canvas height -->
  <div class="canvas-marker" style="position: absolute; bottom: 0; left: 0; width: {{CANVAS_WIDTH}}px; height: 5px; z-index: 9999; background: transparent; pointer-events: none;"></div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request() -> RenderRequest {
        RenderRequest {
            category_name: "AI".into(),
            category_bg_color: "#00D4FF".into(),
            category_text_color: "#FFFFFF".into(),
            content: "<h1>HELLO</h1>".into(),
            background_theme: "technology".into(),
            logo_url: None,
            show_logo: false,
            text_align: None,
        }
    }

    #[test]
    fn placement_mapping() {
        assert_eq!(TextPlacement::Left.rotation_deg(), -4);
        assert_eq!(TextPlacement::Right.rotation_deg(), 4);
        assert_eq!(TextPlacement::Center.rotation_deg(), 0);
        assert!(TextPlacement::Left.container_style().contains("left: 5%"));
        assert!(TextPlacement::Right.container_style().contains("right: 5%"));
        assert!(TextPlacement::Center.container_style().contains("max-width: 90%"));
        assert!(TextPlacement::Left.scrim_style().contains("to right"));
        assert!(TextPlacement::Right.scrim_style().contains("to left"));
        assert!(TextPlacement::Center.scrim_style().contains("radial-gradient"));
    }

    #[test]
    fn explicit_placement_wins() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(TextPlacement::resolve(Some(TextPlacement::Right), &mut rng), TextPlacement::Right);
        }
    }

    #[test]
    fn random_placement_exercises_all_layouts() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            seen.insert(TextPlacement::choose(&mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn embeds_request_fields_verbatim() {
        let doc = compose_html(&request(), "https://img.example/bg.jpg", None, TextPlacement::Left);
        assert!(doc.html.contains("background: #00D4FF;"));
        assert!(doc.html.contains("color: #FFFFFF;"));
        assert!(doc.html.contains("<h1>HELLO</h1>"));
        assert!(doc.html.contains(r#"<img src="https://img.example/bg.jpg""#));
        assert!(doc.html.contains("text-container text-left"));
        assert!(doc.html.contains("rotate(-4deg)"));
        assert!(!doc.html.contains("{{"));
    }

    #[test]
    fn logo_block_only_with_logo() {
        let without = compose_html(&request(), "bg", None, TextPlacement::Center);
        assert!(!without.has_logo);
        assert!(!without.html.contains("watermark-logo\">"));

        let with = compose_html(&request(), "bg", Some("data:image/png;base64,AAAA"), TextPlacement::Center);
        assert!(with.has_logo);
        assert!(with.html.contains(r#"<div class="watermark-logo"><img src="data:image/png;base64,AAAA""#));
    }

    #[test]
    fn placeholders_in_content_are_not_expanded() {
        let mut req = request();
        req.content = "literal {{LOGO_BLOCK}} text".into();
        let doc = compose_html(&req, "bg", Some("data:image/png;base64,AAAA"), TextPlacement::Left);
        assert!(doc.html.contains("literal {{LOGO_BLOCK}} text"));
    }

    #[test]
    fn fill_template_keeps_unknown_and_unterminated() {
        let out = fill_template("a {{X}} b {{Y}} c {{open", |k| (k == "X").then_some("1"));
        assert_eq!(out, "a 1 b {{Y}} c {{open");
    }

    #[test]
    fn canvas_dimensions_in_document() {
        let doc = compose_html(&request(), "bg", None, TextPlacement::Right);
        assert!(doc.html.contains("width: 1280px"));
        assert!(doc.html.contains("height: 850px"));
    }
}
