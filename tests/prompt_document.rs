//! Instruction documents built through the public API

use poster_studio::prompt::{compose_edit_prompt, QR_SECTION_TITLE};
use poster_studio::{
    compose_generation_prompt, BackgroundTheme, Branding, LogoPresence, Platform, PosterBrief,
    SocialLink, StyleConfig,
};

#[test]
fn christmas_elegant_without_social_link() {
    let mut style = StyleConfig::new();
    style.apply_preset("Elegant").unwrap();
    style.set_background("Christmas".parse::<BackgroundTheme>().unwrap());

    let brief = PosterBrief {
        info_text: "- Class A\n- Date: TBD",
        person_name: "Jane Doe",
        background: style.background(),
        tuning: style.tuning(),
        logos: LogoPresence::default(),
        social_link: &SocialLink::default().url(),
    };
    let doc = compose_generation_prompt(&brief, &Branding::default());

    assert!(doc.contains("---\n- Class A\n- Date: TBD\n---\n"));
    assert!(doc.contains(BackgroundTheme::Christmas.prompt_fragment()));
    assert!(doc.contains("Jane Doe"));
    assert!(!doc.contains(QR_SECTION_TITLE));
    assert!(!doc.contains("QR code"));

    assert!(doc.contains("Sharpening: ~15%"));
    assert!(doc.contains("Brightness: 10%"));
    assert!(doc.contains("Contrast: -5%"));
    assert!(doc.contains("Expression: 'smile'"));
    assert!(doc.contains("**4. Final Output Specification**"));
}

#[test]
fn social_link_adds_one_qr_block_and_shifts_sections() {
    let style = StyleConfig::new();
    let link = SocialLink::new(Platform::Instagram, "  yevolatin ");
    let url = link.url();

    let brief = PosterBrief {
        info_text: "- Salsa",
        person_name: "",
        background: style.background(),
        tuning: style.tuning(),
        logos: LogoPresence { first: true, second: true },
        social_link: &url,
    };
    let doc = compose_generation_prompt(&brief, &Branding::default());

    assert_eq!(doc.matches(QR_SECTION_TITLE).count(), 1);
    assert!(doc.contains(&format!("links to this URL: {}", url)));
    assert!(doc.contains("**5. Final Output Specification**"));
    assert!(doc.contains("top-left"));
    assert!(doc.contains("top-right"));
}

#[test]
fn composition_is_deterministic() {
    let style = StyleConfig::new();
    let brief = PosterBrief {
        info_text: "  keeps   spacing  ",
        person_name: "A",
        background: style.background(),
        tuning: style.tuning(),
        logos: LogoPresence::default(),
        social_link: "",
    };
    let branding = Branding::default();
    let first = compose_generation_prompt(&brief, &branding);
    assert_eq!(first, compose_generation_prompt(&brief, &branding));
    assert!(first.contains("---\n  keeps   spacing  \n---"));
}

#[test]
fn edit_prompt_embeds_text_verbatim() {
    let doc = compose_edit_prompt("Line 1\n\n  Line 3");
    assert!(doc.contains("---\nLine 1\n\n  Line 3\n---"));
}
