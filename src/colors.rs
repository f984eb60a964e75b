use anyhow::{bail, Result};
use rand::Rng;
use std::fmt;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Near-white used to mark logo interior pixels as occupied while the
    /// surrounding canvas stays exact white.
    pub const NEAR_WHITE: Self = Self::new(254, 254, 254);

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string.
    ///
    /// # Errors
    /// Returns an error if the string is not six hex digits.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("invalid hex color '{hex}', expected #RRGGBB");
        }
        Ok(Self {
            r: u8::from_str_radix(&hex[0..2], 16)?,
            g: u8::from_str_radix(&hex[2..4], 16)?,
            b: u8::from_str_radix(&hex[4..6], 16)?,
        })
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Per-word color chooser: either a user-supplied list picked uniformly at
/// random, or the default gradient sampled at a random position.
#[derive(Debug, Clone)]
pub enum Palette {
    Fixed(Vec<Rgb>),
    Gradient,
}

impl Palette {
    /// Build a palette from CLI `--color` values; empty input selects the
    /// default gradient.
    ///
    /// # Errors
    /// Returns an error if any entry fails hex parsing.
    pub fn from_user_colors(colors: &[String]) -> Result<Self> {
        if colors.is_empty() {
            return Ok(Self::Gradient);
        }
        let parsed = colors
            .iter()
            .map(|c| Rgb::from_hex(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Fixed(parsed))
    }

    /// Choose a color for the next word.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Rgb {
        match self {
            Self::Fixed(colors) => colors[rng.random_range(0..colors.len())],
            Self::Gradient => {
                let [r, g, b, _] = colorgrad::viridis()
                    .at(rng.random_range(0.0..1.0))
                    .to_rgba8();
                Rgb::new(r, g, b)
            }
        }
    }
}
