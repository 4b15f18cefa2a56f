use async_trait::async_trait;

use super::{normalize_key, Tool};

const PALETTES: &[(&str, &[&str])] = &[
    ("calm", &["#A8DADC", "#457B9D", "#1D3557"]),
    ("energetic", &["#FF6B6B", "#FFE66D", "#4472CA"]),
    ("luxury", &["#0D0D0D", "#FFD700", "#8B4513"]),
    ("eco", &["#2E8B57", "#6B8E23", "#8FBC8F"]),
    ("trust", &["#0077B6", "#90E0EF", "#CAF0F8"]),
    ("youthful", &["#FFB5E8", "#FF9CEE", "#B28DFF"]),
    ("techy", &["#0F4C75", "#3282B8", "#BBE1FA"]),
    ("bold", &["#D7263D", "#3F88C5", "#F49D37"]),
    ("friendly", &["#FFB347", "#FF6961", "#77DD77"]),
    ("elegant", &["#2C2C2C", "#B0A990", "#EDE6DB"]),
];
const FALLBACK_PALETTE: &[&str] = &["#FFFFFF", "#000000"];

const FONTS: &[(&str, &[&str])] = &[
    ("modern", &["Helvetica", "Futura", "Proxima Nova", "Avenir"]),
    ("playful", &["Comic Sans MS", "Poppins", "Baloo", "Quicksand"]),
    ("luxury", &["Didot", "Bodoni", "Garamond", "Playfair Display"]),
    ("minimalist", &["Roboto", "Open Sans", "Montserrat", "Source Sans Pro"]),
    ("tech", &["Orbitron", "Titillium Web", "Exo 2"]),
    ("handwritten", &["Pacifico", "Dancing Script", "Amatic SC"]),
    ("vintage", &["Rockwell", "Baskerville", "Courier"]),
    ("bold", &["Impact", "Anton", "Bebas Neue"]),
    ("elegant", &["Cormorant Garamond", "Libre Baskerville", "Georgia"]),
];
const FALLBACK_FONTS: &[&str] = &["Arial", "Times New Roman"];

type Table = [(&'static str, &'static [&'static str])];

fn lookup(table: &Table, key: &str, fallback: &'static [&'static str]) -> String {
    let key = normalize_key(key);
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, values)| *values)
        .unwrap_or(fallback)
        .join(", ")
}

/// Emotion → hex colour palette.
pub struct PaletteGenerator;

#[async_trait]
impl Tool for PaletteGenerator {
    fn name(&self) -> &'static str {
        "PaletteGenerator"
    }

    fn description(&self) -> &'static str {
        "Suggest a color palette based on an emotion. Input is the emotion as a simple string."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        Ok(lookup(PALETTES, input, FALLBACK_PALETTE))
    }
}

/// Brand voice → font families.
pub struct FontSuggester;

#[async_trait]
impl Tool for FontSuggester {
    fn name(&self) -> &'static str {
        "FontSuggester"
    }

    fn description(&self) -> &'static str {
        "Suggest fonts based on brand voice. Input is the brand voice string."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        Ok(lookup(FONTS, input, FALLBACK_FONTS))
    }
}
