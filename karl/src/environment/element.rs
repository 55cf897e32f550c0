//! Hidden icon element description.
//!
//! Icon fonts only fetch a glyph once something on the page renders it. The
//! preloader therefore inserts a zero-size, transparent element whose content
//! is the icon name. The element must not use `display: none`, or the browser
//! skips rendering and the glyph never loads.

/// Default icon font class.
pub const DEFAULT_ICON_CLASS: &str = "material-icons";

/// Default prefix for the per-icon marker class.
pub const DEFAULT_MARKER_PREFIX: &str = "karl";

/// Default extra classes, for Bootstrap compatibility.
pub const DEFAULT_EXTRA_CLASSES: &str = "bg-transparent";

/// Class names applied to warm-up elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconStyle {
    /// Icon font class (e.g. `material-icons`).
    pub icon_class: String,
    /// Prefix of the per-icon marker class, `{prefix}-{name}`.
    pub marker_prefix: String,
    /// Additional space-separated classes.
    pub extra_classes: String,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            icon_class: DEFAULT_ICON_CLASS.to_string(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            extra_classes: DEFAULT_EXTRA_CLASSES.to_string(),
        }
    }
}

/// A styled container element that warms one icon glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconElement {
    /// Element tag name.
    pub tag: &'static str,
    /// Value of the `class` attribute.
    pub class: String,
    /// Inline width in pixels.
    pub width_px: u32,
    /// Inline height in pixels.
    pub height_px: u32,
    /// Inline text colour.
    pub color: &'static str,
    /// Text content; the icon name for ligature fonts.
    pub content: String,
}

impl IconElement {
    /// Builds the warm-up element for `icon_name`.
    pub fn for_icon(style: &IconStyle, icon_name: &str) -> Self {
        let mut class = format!("{} {}-{}", style.icon_class, style.marker_prefix, icon_name);
        if !style.extra_classes.is_empty() {
            class.push(' ');
            class.push_str(&style.extra_classes);
        }

        Self {
            tag: "div",
            class,
            width_px: 0,
            height_px: 0,
            color: "transparent",
            content: icon_name.to_string(),
        }
    }

    /// Space-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class.split_whitespace()
    }

    /// Inline `style` attribute value.
    pub fn style_attribute(&self) -> String {
        format!(
            "width: {}px; height: {}px; color: {};",
            self.width_px, self.height_px, self.color
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_element_defaults() {
        let element = IconElement::for_icon(&IconStyle::default(), "favorite");

        assert_eq!(element.tag, "div");
        assert_eq!(element.class, "material-icons karl-favorite bg-transparent");
        assert_eq!(element.content, "favorite");
        assert_eq!(element.width_px, 0);
        assert_eq!(element.height_px, 0);
        assert_eq!(element.color, "transparent");
    }

    #[test]
    fn test_icon_element_is_never_display_none() {
        let element = IconElement::for_icon(&IconStyle::default(), "home");
        assert!(!element.style_attribute().contains("display"));
        assert!(element.classes().all(|c| c != "d-none"));
    }

    #[test]
    fn test_icon_element_without_extra_classes() {
        let style = IconStyle {
            icon_class: "material-icons-outlined".into(),
            marker_prefix: "app".into(),
            extra_classes: String::new(),
        };
        let element = IconElement::for_icon(&style, "home");

        assert_eq!(element.class, "material-icons-outlined app-home");
        assert_eq!(element.classes().count(), 2);
    }
}
