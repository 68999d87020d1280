use std::path::Path;

use anyhow::Context;
use meditrack_models::settings::ScanSettings;
use meditrack_scan::{
    GeminiExtractor, MedicineDetails, MedicineDetailsExtractor, ScanOutcome, image_mime_type,
};

pub async fn run(image: &Path, settings: &ScanSettings) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let details = extract(&bytes, image_mime_type(image), settings).await;
    if let Some(name) = &details.name {
        println!("Name:   {name}");
    }
    if let Some(expiry_date) = details.expiry_date {
        println!("Expiry: {expiry_date}");
    }
    if let Some(message) = ScanOutcome::from(details).message() {
        println!("{message}");
    }

    Ok(())
}

/// An extractor that cannot be built reads as nothing detected, like a failed request.
async fn extract(image: &[u8], mime_type: &str, settings: &ScanSettings) -> MedicineDetails {
    match GeminiExtractor::new(settings) {
        Ok(extractor) => extractor.extract(image, mime_type).await,
        Err(e) => {
            log::warn!("Image scanning is unavailable, enter details manually. [error = {e}]");
            MedicineDetails::default()
        }
    }
}
