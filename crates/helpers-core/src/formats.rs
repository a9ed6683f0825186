//! Picking the best distribution of a dataset for a list of preferred formats.

use crate::models::{Distribution, DownloadOption};

const RDF_FAMILY: [&str; 6] = ["RDF", "XML", "TURTLE", "N3", "JSON-LD", "OWL"];

/// Returns true if `dist` looks like it is in `preferred` format.
///
/// The check looks at the format label or URI, the media type, and the file
/// extension or `format=` query parameter of the target URL.
pub fn matches_format(dist: &Distribution, preferred: &str) -> bool {
    let Some(url) = dist.target_url() else {
        return false;
    };
    let pref = preferred.trim().to_uppercase();
    if pref.is_empty() {
        return false;
    }

    let format = dist
        .format_label
        .as_deref()
        .or(dist.format.as_deref())
        .unwrap_or_default()
        .to_uppercase();
    let media_type = dist.media_type.as_deref().unwrap_or_default().to_uppercase();

    if !format.is_empty() && format.contains(&pref) {
        return true;
    }

    let subtype = media_type.rsplit('/').next().unwrap_or_default();
    if !media_type.is_empty() && subtype.contains(&pref) {
        return true;
    }

    let url_lower = url.to_lowercase();
    let (path, query) = url_lower.split_once('?').unwrap_or((url_lower.as_str(), ""));
    let file_name = path.rsplit('/').next().unwrap_or_default();
    let ext = pref.to_lowercase();
    if file_name.ends_with(&format!(".{}", ext))
        || query
            .split('&')
            .any(|pair| pair == format!("format={}", ext))
    {
        return true;
    }

    match pref.as_str() {
        "RDF" => RDF_FAMILY.iter().any(|f| format.contains(f)),
        "XML" | "JSON" => media_type.contains(&pref),
        "CSV" => media_type.contains("CSV") || format.contains("COMMA-SEPARATED"),
        _ => false,
    }
}

/// Picks a distribution: the first one matching the earliest preferred format,
/// otherwise the first one with any URL.
///
/// Returns the distribution and a format label for it.
pub fn select_distribution<'a, S: AsRef<str>>(
    distributions: &'a [Distribution],
    preferred: &[S],
) -> Option<(&'a Distribution, String)> {
    for pref in preferred {
        let pref = pref.as_ref();
        if let Some(dist) = distributions.iter().find(|d| matches_format(d, pref)) {
            let label = dist
                .format_label
                .clone()
                .or_else(|| dist.format.clone())
                .unwrap_or_else(|| pref.to_uppercase());
            return Some((dist, label));
        }
    }

    distributions
        .iter()
        .find(|d| d.target_url().is_some())
        .map(|dist| {
            let label = dist
                .format_label
                .clone()
                .or_else(|| dist.format.clone())
                .unwrap_or_else(|| "unknown".to_string());
            (dist, label)
        })
}

/// The [`DownloadOption`] for the selected distribution, if any.
pub fn best_download<S: AsRef<str>>(
    distributions: &[Distribution],
    preferred: &[S],
) -> Option<DownloadOption> {
    let (dist, label) = select_distribution(distributions, preferred)?;
    Some(DownloadOption {
        url: dist.target_url()?.to_string(),
        format: Some(label),
        media_type: dist.media_type.clone(),
        byte_size: dist.byte_size.clone(),
    })
}
