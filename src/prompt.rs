//! Instruction documents sent to the image model.
//!
//! Both composers are pure: the same inputs always produce the same text.
//! The info text and the replacement text are embedded verbatim between
//! `---` fences; nothing here trims, wraps or escapes them.

use crate::assets::LogoPresence;
use crate::style::{BackgroundTheme, TuningValues};
use std::fmt::Write as _;

/// Heading that opens the QR-code block. Appears at most once per document.
pub const QR_SECTION_TITLE: &str = "Interactive Element: QR Code";

/// Brand details woven into every generated poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    /// Name integrated as a subtle watermark
    pub watermark: String,
    /// Glyph placed at the centre of the QR code
    pub qr_glyph: char,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            watermark: "YevoLatin".to_string(),
            qr_glyph: 'Y',
        }
    }
}

/// Everything the generation prompt depends on.
#[derive(Debug, Clone)]
pub struct PosterBrief<'a> {
    pub info_text: &'a str,
    pub person_name: &'a str,
    pub background: BackgroundTheme,
    pub tuning: &'a TuningValues,
    pub logos: LogoPresence,
    /// Target of the QR code; blank means no QR code
    pub social_link: &'a str,
}

/// Render the instruction document for a two-poster generation request.
pub fn compose_generation_prompt(brief: &PosterBrief<'_>, branding: &Branding) -> String {
    let social_link = brief.social_link.trim();
    let with_qr = !social_link.is_empty();
    let watermark = &branding.watermark;
    let tuning = brief.tuning;

    let mut doc = String::new();

    // `write!` into a String cannot fail
    let _ = writeln!(
        doc,
        "**Objective: Create two professional, visually striking event posters (9:16 and 1:1) using the provided assets.**"
    );
    doc.push('\n');

    doc.push_str("**1. Core Task: Image Composition**\n");
    doc.push_str("- **Presenter:** Use the main image of the presenter. Remove their original background.\n");
    let _ = writeln!(
        doc,
        "- **New Background:** Create a new, dynamic background based on this theme: {}.",
        brief.background.prompt_fragment()
    );
    doc.push_str("- **Integration (Crucial):** Seamlessly blend the presenter into the new background. Add **professional lighting effects** like rim lighting and soft glows that wrap around the presenter's body to make them feel truly part of the scene, creating a more realistic and cohesive look.\n");
    let _ = writeln!(
        doc,
        "- **Watermark:** Artistically and subtly integrate the name \"{}\" into the background design. It should be small, semi-transparent, perhaps blurred or using a blend mode, so it feels like part of the art, not a simple overlay.",
        watermark
    );
    doc.push('\n');

    doc.push_str("**2. Text Content (Highest Priority - Must be VERBATIM)**\n");
    doc.push_str("- You MUST include the following text EXACTLY as written. Do not change, summarize, or omit anything.\n");
    doc.push_str("---\n");
    doc.push_str(brief.info_text);
    doc.push_str("\n---\n");
    if !brief.person_name.is_empty() {
        let _ = writeln!(doc, "- Presenter: {}", brief.person_name);
    }
    doc.push('\n');

    doc.push_str("**3. Visual Enhancements**\n");
    doc.push_str("- **Presenter Tuning:**\n");
    let _ = writeln!(doc, "  - Sharpening: ~{}%", tuning.sharpening);
    let _ = writeln!(doc, "  - Brightness: {}%", tuning.brightness);
    let _ = writeln!(doc, "  - Contrast: {}%", tuning.contrast);
    let _ = writeln!(doc, "  - Expression: '{}'", tuning.expression);
    let _ = writeln!(doc, "  - Facial Fidelity: ~{}%", tuning.facial_fidelity);
    if tuning.preserve_skin_tone {
        doc.push_str("  - Preserve original skin tone.\n");
    }
    doc.push_str("- **Logos:**\n");
    if brief.logos.first {
        doc.push_str("  - Place the first logo in the top-left.\n");
    }
    if brief.logos.second {
        doc.push_str("  - Place the second logo in the top-right.\n");
    }
    doc.push_str("- **Typography & Layout:**\n");
    doc.push_str("  - Use modern, energetic, and legible fonts. Create a clear hierarchy.\n");
    doc.push_str("  - **Integrate text creatively with the visuals.** The text should feel connected to both the background and the presenter, potentially interacting with the lighting effects or appearing partially behind the presenter, but it must always remain perfectly readable. High contrast is essential.\n");
    doc.push_str("  - The presenter's name, if provided, should be a prominent feature.\n");
    doc.push('\n');

    let mut section = 4;
    if with_qr {
        let _ = writeln!(doc, "**{}. {}**", section, QR_SECTION_TITLE);
        let _ = writeln!(
            doc,
            "- **Generate QR Code:** Create a scannable QR code that links to this URL: {}",
            social_link
        );
        doc.push_str("- **Placement:** Place the QR code in the bottom-right corner of the poster.\n");
        doc.push_str("- **Styling:** The QR code must be **stylized** and **perfectly integrated** into the design.\n");
        doc.push_str("  - **Background:** It MUST have a **transparent background**.\n");
        doc.push_str("  - **Size:** Make it **small and unobtrusive**, but ensure it remains scannable.\n");
        doc.push_str("  - **Color:** The color of the QR code's data points MUST **thematically match the poster's color palette**. **Crucially, DO NOT use plain black or white for the code**. It should use a color from the poster's design (e.g., a deep red, a vibrant gold, a neon blue) that has high contrast with the area it's placed over.\n");
        let _ = writeln!(
            doc,
            "  - **Center Logo:** In the exact center of the QR code, integrate a stylized letter **'{glyph}'**. The '{glyph}' should also match the poster's color scheme, perhaps using a contrasting color to the QR code data points.",
            glyph = branding.qr_glyph
        );
        doc.push_str("  - **Scannability:** The final QR code must be perfectly scannable with a standard smartphone camera.\n");
        doc.push('\n');
        section += 1;
    }

    let _ = writeln!(doc, "**{}. Final Output Specification**", section);
    doc.push_str("- **Image 1:** 9:16 aspect ratio (story).\n");
    doc.push_str("- **Image 2:** 1:1 aspect ratio (post).\n");
    doc.push_str("- Generate two distinct designs.\n");
    let _ = writeln!(
        doc,
        "- No other watermarks besides the integrated '{}' one.",
        watermark
    );
    doc.push('\n');
    section += 1;

    let _ = writeln!(doc, "**{}. Final Check:**", section);
    doc.push_str("- Is ALL text included verbatim?\n");
    doc.push_str("- Are there two posters (9:16 and 1:1)?\n");
    doc.push_str("- Is the presenter realistically lit and integrated into the background?\n");
    let _ = writeln!(doc, "- Is the '{}' watermark subtle and artistic?", watermark);
    if with_qr {
        doc.push_str("- Is the QR code present, correct, and scannable?\n");
    }

    doc
}

/// Caption sent ahead of a logo image.
pub fn logo_caption(second: bool) -> &'static str {
    if second {
        "This is the second logo for the top-right corner."
    } else {
        "This is the first logo for the top-left corner."
    }
}

/// Render the instruction document for a surgical text replacement.
pub fn compose_edit_prompt(new_text: &str) -> String {
    let mut doc = String::new();
    doc.push_str("**Objective: Perform a surgical text replacement on the provided poster image.**\n\n");

    doc.push_str("**1. Core Task: Replicate and Replace**\n");
    doc.push_str("- **Analyze Style (Crucial):** Identify the exact typographic properties of the existing text. This includes font family, color (e.g., if it's white, keep it white; if it's gold, keep it gold), size, weight, letter spacing, line height, and any applied effects like glows, shadows, outlines, or gradients.\n");
    doc.push_str("- **Replace Text Content:** Remove only the old text.\n");
    doc.push_str("- **Insert New Text:** Apply the new text below, ensuring it **perfectly and exactly replicates the original typographic style you analyzed.** Your job is to make it look like the original designer simply typed different words.\n");
    doc.push_str("---\n");
    doc.push_str(new_text);
    doc.push_str("\n---\n\n");

    doc.push_str("**2. Strict Constraints (Non-negotiable):**\n");
    doc.push_str("- **DO NOT** be creative. This is a technical replacement task, not a design task.\n");
    doc.push_str("- **DO NOT** change the background, presenter's image, logos, or any other visual element.\n");
    doc.push_str("- **ONLY** the text content should change. The font, color, size, weight, spacing, effects and position must be preserved.\n\n");

    doc.push_str("**3. Final Output:**\n");
    doc.push_str("- Return a single image of the poster with only the text updated. The aspect ratio must be identical to the original.\n");
    doc
}
