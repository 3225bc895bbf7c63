//! The JSON request accepted by `POST /generate-image`.

use serde::{Deserialize, Serialize};

use crate::TextPlacement;

/// Parameters for one card render
///
/// Fields are validated for presence and type only; colors and `content` are
/// passed to the template verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderRequest {
    /// Text of the category badge
    pub category_name: String,
    /// Badge background: any CSS color or gradient expression
    pub category_bg_color: String,
    /// Badge text color
    pub category_text_color: String,
    /// HTML fragment for the headline
    pub content: String,
    /// Keyword used for the background photo search
    pub background_theme: String,
    /// Logo to download; the bundled logo is used when absent
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_show_logo")]
    pub show_logo: bool,
    /// Forces a layout instead of picking one at random
    #[serde(default)]
    pub text_align: Option<TextPlacement>,
}

fn default_show_logo() -> bool {
    true
}
