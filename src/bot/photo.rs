//! Photo download for image turns.

use log::debug;
use teloxide::{net::Download, prelude::*, types::PhotoSize};

use crate::error::Result;

/// Pick the variant with the largest area. Ties go to the later entry.
pub fn largest_variant<T>(variants: &[T], area: impl Fn(&T) -> u64) -> Option<&T> {
    variants.iter().max_by_key(|variant| area(variant))
}

fn photo_area(photo: &PhotoSize) -> u64 {
    u64::from(photo.width) * u64::from(photo.height)
}

/// Download the highest resolution variant of a photo message.
pub async fn download_largest(bot: &Bot, sizes: &[PhotoSize]) -> Result<Option<Vec<u8>>> {
    let Some(photo) = largest_variant(sizes, photo_area) else {
        return Ok(None);
    };
    debug!(
        "Downloading {}x{} photo variant out of {}",
        photo.width,
        photo.height,
        sizes.len()
    );

    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;

    debug!("Downloaded {} bytes", bytes.len());
    Ok(Some(bytes))
}
