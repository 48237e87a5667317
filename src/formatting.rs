use yansi::Paint;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub primary: (u8, u8, u8),   // positions, muted text
    pub secondary: (u8, u8, u8), // headers, emphasis
    pub author: (u8, u8, u8),
    pub notice: (u8, u8, u8),
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        primary: (108, 112, 134),   // Gray
        secondary: (148, 226, 213), // Teal
        author: (137, 180, 250),    // Blue
        notice: (166, 227, 161),    // Green
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN }
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8), bold: bool) -> String {
        if !self.use_color {
            return text.to_string();
        }
        if bold {
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            Paint::rgb(text, r, g, b).to_string()
        }
    }

    pub fn format_position(&self, position: usize) -> String {
        self.paint(&position.to_string(), self.palette.primary, false)
    }

    pub fn format_header(&self, text: &str) -> String {
        self.paint(text, self.palette.secondary, true)
    }

    pub fn format_author(&self, author: &str) -> String {
        self.paint(author, self.palette.author, false)
    }

    pub fn format_notice(&self, text: &str) -> String {
        self.paint(text, self.palette.notice, true)
    }

    pub fn format_category(&self, category: &str) -> String {
        self.paint(category, crate::categories::color_for_category(category), true)
    }
}
