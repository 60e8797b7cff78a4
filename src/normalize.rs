//! Maps raw feed items onto display-ready [`Article`]s.
//!
//! Normalization never fails: anything missing degrades to a default, and
//! the output has exactly one article per input item, in the same order.

use regex::Regex;

use crate::article::{Article, ArticleFields, MediaImage};
use crate::schema::{MediaContent, RawItem};

/// The only `medium` value that makes a media-content entry an image.
const IMAGE_MEDIUM: &str = "image";

lazy_static::lazy_static! {
    static ref TAG: Regex = Regex::new("<[^\n\r\u{85}\u{2028}\u{2029}]*?>").expect("Bad tag regex");
}

pub fn normalize(items: &[RawItem]) -> Vec<Article> {
    items.iter().map(normalize_item).collect()
}

pub fn normalize_item(item: &RawItem) -> Article {
    let thumbnail_url = item
        .thumbnail
        .as_ref()
        .and_then(|t| t.url.clone())
        .or_else(|| item.enclosure.as_ref().and_then(|e| e.url.clone()));

    let mut media_images: Vec<MediaImage> = item
        .content
        .iter()
        .filter(|content| content.medium.as_deref() == Some(IMAGE_MEDIUM))
        .map(media_image)
        .collect();

    if media_images.is_empty() {
        if let Some(url) = &thumbnail_url {
            media_images.push(MediaImage::from_url(url.clone()));
        }
    }

    Article::new(ArticleFields {
        title: item.title.clone(),
        link: item.link.clone(),
        description: Some(strip_html_tags(item.description.as_deref().unwrap_or(""))),
        pub_date: item.pub_date.clone(),
        author: item.creator.clone(),
        contributor: item.contributor.clone(),
        guid: item.guid.clone(),
        date_time_written: item.date_time_written.clone(),
        update_date: item.update_date.clone(),
        expires: item.expires.clone(),
        thumbnail_url,
        media_images,
    })
}

fn media_image(content: &MediaContent) -> MediaImage {
    MediaImage {
        url: content.url.clone().unwrap_or_default(),
        credit: content.credit.clone(),
        description: content
            .description
            .as_ref()
            .and_then(|d| d.value.as_deref())
            .map(strip_html_tags),
        caption: content.text.as_ref().and_then(|t| t.value.clone()),
        width: content.width.clone(),
        height: content.height.clone(),
    }
}

/// Removes tag-like runs, decodes four common entities and trims.
///
/// Tags are removed before entities are decoded, so `&lt;b&gt;` survives as
/// the literal text `<b>`. No other entities are recognised.
pub fn strip_html_tags(html: &str) -> String {
    TAG.replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_string()
}
