//! Surgical text replacement on an already generated poster.

use crate::client::{ImageModel, ModelRequest};
use crate::datauri::{png_data_url, DataUrl};
use crate::prompt::compose_edit_prompt;
use crate::{Error, Result};
use log::debug;

/// Build the edit request for `original` (a `data:` URL).
pub fn build_edit_request(original: &str, new_text: &str) -> Result<ModelRequest> {
    let source = DataUrl::parse(original)?;
    Ok(ModelRequest::new()
        .text(compose_edit_prompt(new_text))
        .image(source))
}

/// Replace the text on `original` with `new_text` and return the new poster
/// as a PNG data URL. Stateless: callers splice the result back themselves.
pub fn edit_text<M>(model: &M, original: &str, new_text: &str) -> Result<String>
where
    M: ImageModel + ?Sized,
{
    let request = build_edit_request(original, new_text)?;
    debug!("editing poster text ({} chars)", new_text.chars().count());

    let response = model.generate_content(&request)?;
    if response.candidates.is_empty() {
        return Err(Error::NoCandidates);
    }

    response
        .first_candidate_images()
        .first()
        .map(|data| png_data_url(data))
        .ok_or(Error::EditEmpty)
}
