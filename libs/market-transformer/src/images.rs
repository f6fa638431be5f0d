//! Per-option image resolution
//!
//! The defect class this component prevents: two different options of a
//! merged market rendering the same shared event banner. An option either
//! gets an image that is provably its own, or it explicitly gets none;
//! there is no silent fallback to the banner.

use crate::model::MultiOptionMarket;
use gamma_feed::GammaMarket;
use tracing::{debug, warn};

/// Assigns each option of a merged market its own dedicated image
pub struct ImageResolver;

impl ImageResolver {
    /// Complete the image map of a merged record
    ///
    /// For every option: first the group's own members, then the full batch,
    /// are searched for a record naming the option with a usable non-banner
    /// image. Options with no such record keep `None`.
    pub fn resolve(
        multi: &mut MultiOptionMarket,
        group_members: &[&GammaMarket],
        all_records: &[GammaMarket],
    ) {
        let banner = multi.banner_image.clone();

        for option in multi.options.clone() {
            let resolved = find_option_image(&option, banner.as_deref(), group_members.iter().copied())
                .or_else(|| {
                    debug!(
                        "No group-local image for option '{}', widening to full batch",
                        option
                    );
                    find_option_image(&option, banner.as_deref(), all_records.iter())
                });

            match &resolved {
                Some(url) => debug!("Option '{}' resolved to image {}", option, url),
                None => warn!(
                    "No dedicated image for option '{}' of '{}'; leaving unset",
                    option, multi.title
                ),
            }

            multi.option_images.insert(option, resolved);
        }
    }
}

/// First record naming the option with a non-empty image that is not the
/// banner
fn find_option_image<'a, I>(option: &str, banner: Option<&str>, records: I) -> Option<String>
where
    I: IntoIterator<Item = &'a GammaMarket>,
{
    let option_lower = option.to_lowercase();

    records.into_iter().find_map(|record| {
        if !record.question.to_lowercase().contains(&option_lower) {
            return None;
        }

        let image = record.image.as_deref()?.trim();
        if image.is_empty() || Some(image) == banner {
            return None;
        }

        Some(image.to_string())
    })
}
