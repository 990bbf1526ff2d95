//! One interactive poster session: inputs, generated batches and the gallery.
//!
//! A generation or edit runs `Idle -> Validating -> Requesting ->
//! Populating -> Idle`; any failure drops straight back to `Idle` with the
//! error message kept in [`Session::last_error`]. Operations take `&mut self`,
//! so a session never has two requests in flight.

use crate::assets::{AssetCollector, LogoRole, PreviewRegistry};
use crate::client::ImageModel;
use crate::edit::edit_text;
use crate::gallery::{Gallery, GalleryStorage};
use crate::generate::{generate, GeneratedOutput, GenerationRequest, OutputBatch, Slot};
use crate::progress::{silent, ProgressSink, ProgressTicker};
use crate::social::SocialLink;
use crate::style::{StyleConfig, DEFAULT_PRESET};
use crate::{BatchMode, Error, Result, StudioConfig};
use log::{error, info};
use std::time::Duration;

pub const DEFAULT_PERSON_NAME: &str = "YOYO SANCHEZ";

// Several lines end in a space; the text is sent verbatim.
pub const DEFAULT_INFO_TEXT: &str = "- YevoLatin® Curve, Dance Fitness Class
- YevoLatin® Bachata, Dance Class
- YevoLatin® Salsa, Dance Class
- YevoLatin® Reggaeton, Dance Class
- YevoLatin® Afro Fusion, Dance Class

- Date : 
- Time : 
- Price:
- Venue : 
- Address : 
- Tel : 
- Email:
- www.yevolatin.com";

/// Where a generation or edit currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Requesting,
    Populating,
}

/// Session state tied to one model client and one gallery backend.
pub struct Session<M: ImageModel, S: GalleryStorage> {
    config: StudioConfig,
    model: M,
    assets: AssetCollector,
    style: StyleConfig,
    info_text: String,
    person_name: String,
    social: SocialLink,
    batches: Vec<OutputBatch>,
    next_batch_id: u64,
    phase: Phase,
    last_error: Option<String>,
    gallery: Gallery<S>,
    progress: ProgressSink,
}

impl<M: ImageModel, S: GalleryStorage> Session<M, S> {
    /// Start a session; the gallery is loaded from `storage` right away.
    pub fn new(config: StudioConfig, model: M, storage: S) -> Self {
        Self {
            config,
            model,
            assets: AssetCollector::new(PreviewRegistry::new()),
            style: StyleConfig::default(),
            info_text: DEFAULT_INFO_TEXT.to_string(),
            person_name: DEFAULT_PERSON_NAME.to_string(),
            social: SocialLink::default(),
            batches: Vec::new(),
            next_batch_id: 0,
            phase: Phase::Idle,
            last_error: None,
            gallery: Gallery::open(storage),
            progress: silent(),
        }
    }

    /// Register a callback for progress text (milestones and rotating
    /// encouragement).
    pub fn on_progress<F>(&mut self, cb: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = std::sync::Arc::new(cb);
    }

    pub fn clear_on_progress(&mut self) {
        self.progress = silent();
    }

    // --- inputs ---

    pub fn assets(&self) -> &AssetCollector {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetCollector {
        &mut self.assets
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleConfig {
        &mut self.style
    }

    pub fn social_mut(&mut self) -> &mut SocialLink {
        &mut self.social
    }

    pub fn social(&self) -> &SocialLink {
        &self.social
    }

    pub fn info_text(&self) -> &str {
        &self.info_text
    }

    pub fn set_info_text(&mut self, text: impl Into<String>) {
        self.info_text = text.into();
    }

    pub fn person_name(&self) -> &str {
        &self.person_name
    }

    pub fn set_person_name(&mut self, name: impl Into<String>) {
        self.person_name = name.into();
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    // --- state ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn batches(&self) -> &[OutputBatch] {
        &self.batches
    }

    fn start_ticker(&self) -> ProgressTicker {
        if self.config.ticker_interval_ms == 0 {
            ProgressTicker::disabled()
        } else {
            ProgressTicker::start(
                Duration::from_millis(self.config.ticker_interval_ms),
                self.progress.clone(),
            )
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        error!("{}", err);
        self.last_error = Some(err.to_string());
        self.phase = Phase::Idle;
        Err(err)
    }

    /// Generate a new batch from the current inputs.
    pub fn generate(&mut self) -> Result<&OutputBatch> {
        self.phase = Phase::Validating;
        self.last_error = None;
        let validated = self.assets.require_presenter().map(|_| ());
        if let Err(e) = validated {
            return self.fail(e);
        }

        self.phase = Phase::Requesting;
        let batch_id = self.next_batch_id;
        let social_link = self.social.url();
        let result = {
            let presenter = self.assets.require_presenter()?;
            let request = GenerationRequest {
                presenter,
                person_name: &self.person_name,
                info_text: &self.info_text,
                logo_first: self.assets.logo(LogoRole::First),
                logo_second: self.assets.logo(LogoRole::Second),
                tuning: self.style.tuning(),
                background: self.style.background(),
                social_link: &social_link,
            };
            let progress = self.progress.clone();
            let mut ticker = self.start_ticker();
            let result = generate(&self.model, &request, &self.config.branding, batch_id, |p| {
                progress(p.message())
            });
            ticker.stop();
            result
        };

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => return self.fail(e),
        };

        self.phase = Phase::Populating;
        self.next_batch_id += 1;
        if self.config.batch_mode == BatchMode::Replace {
            self.batches.clear();
        }
        self.batches.push(batch);
        info!("batch {} ready ({} kept)", batch_id, self.batches.len());
        self.phase = Phase::Idle;

        Ok(&self.batches[self.batches.len() - 1])
    }

    /// Look up an output by batch position, slot and index.
    pub fn output(&self, batch_index: usize, slot: Slot, index: usize) -> Option<&GeneratedOutput> {
        self.batches.get(batch_index)?.slot(slot).get(index)
    }

    /// Replace the text on one output. The new text also becomes the
    /// session's info text.
    pub fn edit_output(
        &mut self,
        batch_index: usize,
        slot: Slot,
        index: usize,
        new_text: &str,
    ) -> Result<&GeneratedOutput> {
        self.phase = Phase::Validating;
        self.last_error = None;
        let original = match self.output(batch_index, slot, index) {
            Some(out) => out.data_url.clone(),
            None => {
                let err = Error::ValidationError(format!(
                    "no {} poster at batch {} index {}",
                    slot, batch_index, index
                ));
                return self.fail(err);
            }
        };
        self.info_text = new_text.to_string();

        self.phase = Phase::Requesting;
        let mut ticker = self.start_ticker();
        let result = edit_text(&self.model, &original, new_text);
        ticker.stop();

        let edited = match result {
            Ok(url) => url,
            Err(e) => return self.fail(e),
        };

        self.phase = Phase::Populating;
        let target = &mut self.batches[batch_index].slot_mut(slot)[index];
        target.data_url = edited;
        self.phase = Phase::Idle;
        Ok(&self.batches[batch_index].slot(slot)[index])
    }

    // --- gallery ---

    pub fn gallery(&self) -> &Gallery<S> {
        &self.gallery
    }

    pub fn save_poster(&mut self, image_data_url: &str) -> Option<u64> {
        self.gallery.save(image_data_url)
    }

    pub fn delete_poster(&mut self, id: u64) -> bool {
        self.gallery.delete(id)
    }

    pub fn is_saved(&self, image_data_url: &str) -> bool {
        self.gallery.contains(image_data_url)
    }

    /// True when some generated poster has not been saved to the gallery.
    pub fn has_unsaved_outputs(&self) -> bool {
        self.batches
            .iter()
            .flat_map(|b| b.outputs())
            .any(|o| !self.gallery.contains(&o.data_url))
    }

    /// Back to a fresh session; the gallery is kept.
    pub fn reset(&mut self) {
        self.assets.clear();
        self.person_name = DEFAULT_PERSON_NAME.to_string();
        self.info_text = DEFAULT_INFO_TEXT.to_string();
        self.social = SocialLink::default();
        self.style = StyleConfig::default();
        // always present in the catalog
        let _ = self.style.apply_preset(DEFAULT_PRESET);
        self.batches.clear();
        self.last_error = None;
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageAsset;
    use crate::client::{Candidate, ModelRequest, ModelResponse, ResponsePart};
    use crate::gallery::MemoryStorage;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        answers: RefCell<VecDeque<Result<ModelResponse>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn push_images(&self, data: &[&str]) {
            let parts = data
                .iter()
                .map(|d| ResponsePart::Image { mime_type: None, data: d.to_string() })
                .collect();
            self.answers
                .borrow_mut()
                .push_back(Ok(ModelResponse { candidates: vec![Candidate { parts }] }));
        }
    }

    impl ImageModel for Scripted {
        fn generate_content(&self, _request: &ModelRequest) -> Result<ModelResponse> {
            self.calls.set(self.calls.get() + 1);
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ModelResponse::default()))
        }
    }

    fn config(mode: BatchMode) -> StudioConfig {
        StudioConfig {
            batch_mode: mode,
            ticker_interval_ms: 0,
            ..Default::default()
        }
    }

    fn session(model: &Scripted, mode: BatchMode) -> Session<&Scripted, MemoryStorage> {
        let mut s = Session::new(config(mode), model, MemoryStorage::new());
        s.assets_mut().set_presenter(ImageAsset::new(vec![1, 2], "image/png"));
        s
    }

    #[test]
    fn generation_without_presenter_never_calls_the_model() {
        let model = Scripted::default();
        let mut s = Session::new(config(BatchMode::History), &model, MemoryStorage::new());
        assert!(matches!(s.generate(), Err(Error::ValidationError(_))));
        assert_eq!(model.calls.get(), 0);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.last_error().unwrap().contains("presenter"));
    }

    #[test]
    fn history_mode_keeps_batches() {
        let model = Scripted::default();
        model.push_images(&["A", "B"]);
        model.push_images(&["C"]);
        let mut s = session(&model, BatchMode::History);
        s.generate().unwrap();
        s.generate().unwrap();
        assert_eq!(s.batches().len(), 2);
        assert_eq!(s.batches()[1].id, 1);
        assert_eq!(s.output(1, Slot::Square, 0).unwrap().data_url, "data:image/png;base64,C");
    }

    #[test]
    fn replace_mode_keeps_only_latest() {
        let model = Scripted::default();
        model.push_images(&["A", "B"]);
        model.push_images(&["C", "D"]);
        let mut s = session(&model, BatchMode::Replace);
        s.generate().unwrap();
        s.generate().unwrap();
        assert_eq!(s.batches().len(), 1);
        assert_eq!(s.output(0, Slot::Tall, 0).unwrap().data_url, "data:image/png;base64,C");
    }

    #[test]
    fn remote_failure_keeps_previous_batches_and_records_error() {
        let model = Scripted::default();
        model.push_images(&["A", "B"]);
        let mut s = session(&model, BatchMode::History);
        s.generate().unwrap();
        assert!(matches!(s.generate(), Err(Error::NoCandidates)));
        assert_eq!(s.batches().len(), 1);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.last_error().is_some());
    }

    #[test]
    fn edit_splices_in_place_and_updates_info_text() {
        let model = Scripted::default();
        model.push_images(&["QQ==", "Qg=="]);
        model.push_images(&["RQ=="]);
        let mut s = session(&model, BatchMode::History);
        s.generate().unwrap();

        let edited = s.edit_output(0, Slot::Square, 0, "- New date").unwrap().clone();
        assert_eq!(edited.data_url, "data:image/png;base64,RQ==");
        assert_eq!(edited.slot, Slot::Square);
        assert_eq!(edited.index, 0);
        assert_eq!(s.output(0, Slot::Tall, 0).unwrap().data_url, "data:image/png;base64,QQ==");
        assert_eq!(s.info_text(), "- New date");
    }

    #[test]
    fn edit_failure_leaves_output_untouched() {
        let model = Scripted::default();
        model.push_images(&["QQ==", "Qg=="]);
        model.push_images(&[]);
        let mut s = session(&model, BatchMode::History);
        s.generate().unwrap();
        assert!(matches!(s.edit_output(0, Slot::Tall, 0, "x"), Err(Error::EditEmpty)));
        assert_eq!(s.output(0, Slot::Tall, 0).unwrap().data_url, "data:image/png;base64,QQ==");
        assert!(matches!(s.edit_output(4, Slot::Tall, 0, "x"), Err(Error::ValidationError(_))));
    }

    #[test]
    fn unsaved_outputs_and_reset() {
        let model = Scripted::default();
        model.push_images(&["A", "B"]);
        let mut s = session(&model, BatchMode::History);
        assert!(!s.has_unsaved_outputs());
        s.generate().unwrap();
        assert!(s.has_unsaved_outputs());

        let urls: Vec<String> = s.batches()[0].outputs().map(|o| o.data_url.clone()).collect();
        for url in &urls {
            s.save_poster(url);
        }
        assert!(!s.has_unsaved_outputs());
        assert!(s.is_saved(&urls[0]));

        s.style_mut().apply_preset("Minimalist").unwrap();
        s.set_person_name("Someone");
        s.reset();
        assert!(s.batches().is_empty());
        assert!(s.assets().presenter().is_none());
        assert_eq!(s.person_name(), DEFAULT_PERSON_NAME);
        assert_eq!(s.style().active_preset(), DEFAULT_PRESET);
        assert_eq!(s.gallery().len(), 2);
    }

    #[test]
    fn default_info_text_keeps_trailing_spaces() {
        for field in ["- Date : \n", "- Time : \n", "- Venue : \n", "- Address : \n", "- Tel : \n"] {
            assert!(DEFAULT_INFO_TEXT.contains(field), "missing {:?}", field);
        }
        assert!(DEFAULT_INFO_TEXT.contains("- Price:\n"));
        assert!(DEFAULT_INFO_TEXT.ends_with("- www.yevolatin.com"));
    }

    #[test]
    fn progress_sink_receives_milestones() {
        let model = Scripted::default();
        model.push_images(&["A", "B"]);
        let mut s = session(&model, BatchMode::History);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        s.on_progress(move |m| sink.lock().unwrap().push(m.to_string()));
        s.generate().unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(String::as_str), Some("Initializing Intelligence..."));
        assert_eq!(seen.last().map(String::as_str), Some("Finalizing your posters..."));
    }
}
