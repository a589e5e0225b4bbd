//! Decoding of images submitted inline as data URIs.
//!
//! ```text
//! data:image/png;base64,iVBORw0KGgo...
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::{Error, ImageFormat, ImageUpload};
use crate::inbound::http::validation::{FieldName, invalid_image_error};

/// Decode a `data:image/<ext>;base64,<payload>` string for `field`.
pub(crate) fn decode_data_uri(raw: &str, field: FieldName) -> Result<ImageUpload, Error> {
    let rest = raw
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid_image_error(field, "ожидается data:image/<формат>;base64"))?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid_image_error(field, "ожидается кодировка base64"))?;
    let format = ImageFormat::from_subtype(subtype)
        .ok_or_else(|| invalid_image_error(field, "неподдерживаемый формат"))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid_image_error(field, "повреждённые данные base64"))?;
    if bytes.is_empty() {
        return Err(invalid_image_error(field, "файл пуст"));
    }
    Ok(ImageUpload { format, bytes })
}
