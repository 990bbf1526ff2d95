//! Batch generation: one remote call, two output slots.

use crate::assets::{ImageAsset, LogoPresence};
use crate::client::{ImageModel, ModelRequest};
use crate::datauri::png_data_url;
use crate::prompt::{compose_generation_prompt, logo_caption, Branding, PosterBrief};
use crate::style::{BackgroundTheme, TuningValues};
use crate::{Error, Result};
use log::{info, warn};
use std::fmt;

/// Output aspect-ratio bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 9:16 story
    Tall,
    /// 1:1 post
    Square,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Tall, Slot::Square];

    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            Slot::Tall => "9:16",
            Slot::Square => "1:1",
        }
    }

    /// Label used in exported file names.
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Tall => "Story",
            Slot::Square => "Square",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Tall => f.write_str("tall"),
            Slot::Square => f.write_str("square"),
        }
    }
}

/// One poster produced by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub data_url: String,
    pub slot: Slot,
    pub batch: u64,
    pub index: usize,
}

/// Results of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBatch {
    pub id: u64,
    pub tall: Vec<GeneratedOutput>,
    pub square: Vec<GeneratedOutput>,
    /// Slots are assigned by response position; the provider never says
    /// which image has which aspect ratio.
    pub slots_verified: bool,
    /// Only one image came back and it fills both slots.
    pub duplicated: bool,
}

impl OutputBatch {
    pub fn slot(&self, slot: Slot) -> &[GeneratedOutput] {
        match slot {
            Slot::Tall => &self.tall,
            Slot::Square => &self.square,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Vec<GeneratedOutput> {
        match slot {
            Slot::Tall => &mut self.tall,
            Slot::Square => &mut self.square,
        }
    }

    pub fn outputs(&self) -> impl Iterator<Item = &GeneratedOutput> {
        self.tall.iter().chain(self.square.iter())
    }
}

/// Advisory milestones reported while a batch is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Initializing,
    PreparingAssets,
    Generating,
    Finalizing,
}

impl Progress {
    pub fn message(&self) -> &'static str {
        match self {
            Progress::Initializing => "Initializing Intelligence...",
            Progress::PreparingAssets => "Preparing your images...",
            Progress::Generating => "Generating poster designs...",
            Progress::Finalizing => "Finalizing your posters...",
        }
    }
}

/// Inputs of one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub presenter: &'a ImageAsset,
    pub person_name: &'a str,
    pub info_text: &'a str,
    pub logo_first: Option<&'a ImageAsset>,
    pub logo_second: Option<&'a ImageAsset>,
    pub tuning: &'a TuningValues,
    pub background: BackgroundTheme,
    pub social_link: &'a str,
}

impl GenerationRequest<'_> {
    pub fn brief(&self) -> PosterBrief<'_> {
        PosterBrief {
            info_text: self.info_text,
            person_name: self.person_name,
            background: self.background,
            tuning: self.tuning,
            logos: LogoPresence {
                first: self.logo_first.is_some(),
                second: self.logo_second.is_some(),
            },
            social_link: self.social_link,
        }
    }
}

/// Build the multimodal request: instructions, presenter, then each logo
/// preceded by its caption.
pub fn build_generation_request(request: &GenerationRequest<'_>, branding: &Branding) -> ModelRequest {
    let mut model_request = ModelRequest::new()
        .text(compose_generation_prompt(&request.brief(), branding))
        .image(request.presenter.to_data_url());

    if let Some(logo) = request.logo_first {
        model_request = model_request.text(logo_caption(false)).image(logo.to_data_url());
    }
    if let Some(logo) = request.logo_second {
        model_request = model_request.text(logo_caption(true)).image(logo.to_data_url());
    }
    model_request
}

/// Generate one batch of posters.
///
/// The first returned image goes to the tall slot and the second to the
/// square slot; anything after that is dropped. A single image fills both
/// slots.
pub fn generate<M, F>(
    model: &M,
    request: &GenerationRequest<'_>,
    branding: &Branding,
    batch_id: u64,
    mut on_progress: F,
) -> Result<OutputBatch>
where
    M: ImageModel + ?Sized,
    F: FnMut(Progress),
{
    on_progress(Progress::Initializing);

    on_progress(Progress::PreparingAssets);
    let model_request = build_generation_request(request, branding);

    on_progress(Progress::Generating);
    let response = model.generate_content(&model_request)?;

    on_progress(Progress::Finalizing);
    if response.candidates.is_empty() {
        return Err(Error::NoCandidates);
    }

    let images = response.first_candidate_images();
    let output = |data: &str, slot: Slot| GeneratedOutput {
        data_url: png_data_url(data),
        slot,
        batch: batch_id,
        index: 0,
    };

    let batch = match images.as_slice() {
        [] => return Err(Error::NoImagesGenerated),
        [only] => {
            warn!("batch {}: model returned a single image, using it for both slots", batch_id);
            OutputBatch {
                id: batch_id,
                tall: vec![output(*only, Slot::Tall)],
                square: vec![output(*only, Slot::Square)],
                slots_verified: false,
                duplicated: true,
            }
        }
        [tall, square, rest @ ..] => {
            if !rest.is_empty() {
                info!("batch {}: ignoring {} extra image(s)", batch_id, rest.len());
            }
            OutputBatch {
                id: batch_id,
                tall: vec![output(*tall, Slot::Tall)],
                square: vec![output(*square, Slot::Square)],
                slots_verified: false,
                duplicated: false,
            }
        }
    };

    Ok(batch)
}
