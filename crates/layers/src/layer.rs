/// Colour scheme preference of the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Theme::Dark } else { Theme::Light }
    }
}

/// Base map drawn under the field layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BackgroundLayer {
    OpenStreetMap,
    /// Stadia Maps `alidade_smooth_dark`.
    AlidadeSmoothDark,
}

impl BackgroundLayer {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => BackgroundLayer::OpenStreetMap,
            Theme::Dark => BackgroundLayer::AlidadeSmoothDark,
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            BackgroundLayer::OpenStreetMap => "© OpenStreetMap contributors",
            BackgroundLayer::AlidadeSmoothDark => "© Stadia Maps © OpenMapTiles © OpenStreetMap",
        }
    }

    /// Flat colour shown where no tile is drawn.
    pub fn base_color(self) -> [f32; 4] {
        match self {
            BackgroundLayer::OpenStreetMap => [0.67, 0.83, 0.87, 1.0],
            BackgroundLayer::AlidadeSmoothDark => [0.13, 0.13, 0.15, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackgroundLayer, Theme};

    #[test]
    fn theme_picks_background() {
        assert_eq!(
            BackgroundLayer::for_theme(Theme::from_prefers_dark(false)),
            BackgroundLayer::OpenStreetMap
        );
        assert_eq!(
            BackgroundLayer::for_theme(Theme::from_prefers_dark(true)),
            BackgroundLayer::AlidadeSmoothDark
        );
    }
}
