//! UI Theme - Design system constants
//!
//! Colors, icons and column widths shared by every renderer.

use crossterm::style::Color;

/// Default theme for kvm output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Status icons
    pub icons: Icons,
    /// List layout constants
    pub layout: Layout,
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Release versions (primary content)
    pub version: Color,
    /// Platform labels
    pub platform: Color,
    /// Sizes, dates and secondary info
    pub secondary: Color,
    /// Success states and the active marker
    pub success: Color,
    /// Warning states
    pub warning: Color,
    /// Error states
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            version: Color::Cyan,
            platform: Color::White,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Status icons for different states
#[derive(Debug, Clone)]
pub struct Icons {
    /// Not active (○)
    pub pending: &'static str,
    /// Active or in progress (●)
    pub active: &'static str,
    /// Success (✓)
    pub success: &'static str,
    /// Failure (✗)
    pub error: &'static str,
    /// Warning (⚠)
    pub warning: &'static str,
    /// Info (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            pending: "○",
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// List layout constants
#[derive(Debug, Clone)]
pub struct Layout {
    /// Width allocated for the version column
    pub version_width: usize,
    /// Width allocated for the platform column
    pub platform_width: usize,
    /// Width allocated for the size column
    pub size_width: usize,
    /// Width of the download progress bar
    pub bar_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            version_width: 16,
            platform_width: 14,
            size_width: 10,
            bar_width: 24,
        }
    }
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;

    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}
