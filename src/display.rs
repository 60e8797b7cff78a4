//! Plain-text presentation helpers for the terminal reader.

use std::fmt::Write;

use chrono::DateTime;

use crate::article::Article;
use crate::state::FeedState;

/// Formats an RSS date (`Thu, 21 Nov 2024 12:00:00 GMT`) as `21 Nov 2024 12:00`.
///
/// Dates that are not RFC 2822 fall back to dropping the weekday and the
/// seconds; anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return date.format("%-d %b %Y %H:%M").to_string();
    }

    match raw.split_once(',') {
        Some((_, rest)) => {
            let rest = rest.trim();
            match rest.rfind(':') {
                Some(idx) => rest[..idx].to_string(),
                None => rest.to_string(),
            }
        }
        None => raw.to_string(),
    }
}

/// Last path segment of a GUID, shortened for display.
pub fn short_id(guid: &str) -> String {
    let tail = guid.rsplit('/').next().unwrap_or(guid);
    let short: String = tail.chars().take(20).collect();
    format!("{}...", short)
}

/// One-line status for a load state transition.
pub fn describe_state(state: &FeedState) -> String {
    match state {
        FeedState::Initial => "Idle".to_string(),
        FeedState::Loading => "Loading...".to_string(),
        FeedState::Success(articles) => format!("Loaded {} article(s)", articles.len()),
        FeedState::Error(message) => format!("Error: {}", message),
    }
}

pub fn render_article(article: &Article) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", article.title);
    if let Some(author) = &article.author {
        let _ = writeln!(out, "  By {}", author);
    }
    if let Some(contributor) = &article.contributor {
        let _ = writeln!(out, "  Contributing: {}", contributor);
    }
    if !article.pub_date.is_empty() {
        let _ = writeln!(out, "  Published: {}", format_date(&article.pub_date));
    }
    if let Some(written) = &article.date_time_written {
        let _ = writeln!(out, "  Written: {}", format_date(written));
    }
    if let Some(updated) = &article.update_date {
        let _ = writeln!(out, "  Updated: {}", format_date(updated));
    }
    if let Some(guid) = &article.guid {
        let _ = writeln!(out, "  ID: {}", short_id(guid));
    }
    if !article.description.is_empty() {
        let _ = writeln!(out, "  {}", article.description);
    }

    match article.media_images.len() {
        0 => {
            if let Some(url) = &article.thumbnail_url {
                let _ = writeln!(out, "  Image: {}", url);
            }
        }
        count => {
            let _ = writeln!(out, "  Images: {} photo(s)", count);
            for image in &article.media_images {
                let _ = write!(out, "    {}", image.url);
                if let Some(caption) = image.caption.as_ref().or(image.description.as_ref()) {
                    let _ = write!(out, " - {}", caption);
                }
                if let Some(credit) = &image.credit {
                    let _ = write!(out, " ({})", credit);
                }
                out.push('\n');
            }
        }
    }

    if !article.link.is_empty() {
        let _ = writeln!(out, "  {}", article.link);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{ArticleFields, MediaImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_rfc2822_date() {
        assert_eq!(format_date("Thu, 21 Nov 2024 12:00:00 GMT"), "21 Nov 2024 12:00");
        assert_eq!(format_date("Thu, 21 Nov 2024 07:05:00 -0500"), "21 Nov 2024 07:05");
    }

    #[test]
    fn test_format_loose_date() {
        assert_eq!(format_date("Someday, 21 Nov 2024 12:00:00 XYZ"), "21 Nov 2024 12:00");
    }

    #[test]
    fn test_format_unrecognised_date_is_unchanged() {
        assert_eq!(format_date("2024-11-21"), "2024-11-21");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("https://example.com/news/ncna123"), "ncna123...");
        assert_eq!(
            short_id("abcdefghijklmnopqrstuvwxyz"),
            "abcdefghijklmnopqrst..."
        );
    }

    #[test]
    fn test_describe_state() {
        let articles: std::sync::Arc<[Article]> = vec![Article::default(), Article::default()].into();

        assert_eq!(describe_state(&FeedState::Initial), "Idle");
        assert_eq!(describe_state(&FeedState::Loading), "Loading...");
        assert_eq!(describe_state(&FeedState::Success(articles)), "Loaded 2 article(s)");
        assert_eq!(
            describe_state(&FeedState::Error("HTTP error: status 404".to_string())),
            "Error: HTTP error: status 404"
        );
    }

    #[test]
    fn test_render_article() {
        let article = Article::new(ArticleFields {
            title: Some("Summit ends".to_string()),
            link: Some("https://example.com/a".to_string()),
            description: Some("Leaders met.".to_string()),
            pub_date: Some("Thu, 21 Nov 2024 12:00:00 GMT".to_string()),
            author: Some("Jane".to_string()),
            media_images: vec![MediaImage {
                caption: Some("Group photo".to_string()),
                credit: Some("AP".to_string()),
                ..MediaImage::from_url("https://img/1.jpg")
            }],
            ..Default::default()
        });

        let expected = "\
Summit ends
  By Jane
  Published: 21 Nov 2024 12:00
  Leaders met.
  Images: 1 photo(s)
    https://img/1.jpg - Group photo (AP)
  https://example.com/a
";
        assert_eq!(render_article(&article), expected);
    }

    #[test]
    fn test_render_uses_thumbnail_when_no_images() {
        let article = Article::new(ArticleFields {
            title: Some("T".to_string()),
            thumbnail_url: Some("https://img/t.jpg".to_string()),
            ..Default::default()
        });

        assert_eq!(render_article(&article), "T\n  Image: https://img/t.jpg\n");
    }
}
