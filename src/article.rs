use serde::Serialize;

/// A display-ready record derived from one feed item.
///
/// `title`, `link`, `description` and `pub_date` are always present (empty
/// when the feed omitted them), so consumers never have to check them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    pub author: Option<String>,
    pub contributor: Option<String>,
    pub guid: Option<String>,
    pub date_time_written: Option<String>,
    pub update_date: Option<String>,
    pub expires: Option<String>,
    pub thumbnail_url: Option<String>,
    pub media_images: Vec<MediaImage>,
}

/// Optional parts of an [`Article`], as read from the feed.
#[derive(Debug, Clone, Default)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub author: Option<String>,
    pub contributor: Option<String>,
    pub guid: Option<String>,
    pub date_time_written: Option<String>,
    pub update_date: Option<String>,
    pub expires: Option<String>,
    pub thumbnail_url: Option<String>,
    pub media_images: Vec<MediaImage>,
}

impl Article {
    /// Builds an article, turning absent required-looking fields into empty
    /// strings. This is the only place that coercion happens.
    pub fn new(fields: ArticleFields) -> Self {
        Self {
            title: fields.title.unwrap_or_default(),
            link: fields.link.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            pub_date: fields.pub_date.unwrap_or_default(),
            author: fields.author,
            contributor: fields.contributor,
            guid: fields.guid,
            date_time_written: fields.date_time_written,
            update_date: fields.update_date,
            expires: fields.expires,
            thumbnail_url: fields.thumbnail_url,
            media_images: fields.media_images,
        }
    }

    /// Best image to show for the article: the first media image, else the
    /// legacy thumbnail URL.
    pub fn lead_image_url(&self) -> Option<&str> {
        self.media_images
            .first()
            .map(|image| image.url.as_str())
            .or(self.thumbnail_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaImage {
    pub url: String,
    pub credit: Option<String>,
    pub description: Option<String>,
    pub caption: Option<String>,
    /// Raw value from the feed; no unit is implied.
    pub width: Option<String>,
    pub height: Option<String>,
}

impl MediaImage {
    /// An image carrying only a URL, used for thumbnail/enclosure fallbacks.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_required_fields_become_empty() {
        let article = Article::new(ArticleFields::default());

        assert_eq!(article.title, "");
        assert_eq!(article.link, "");
        assert_eq!(article.description, "");
        assert_eq!(article.pub_date, "");
        assert!(article.author.is_none());
        assert!(article.media_images.is_empty());
    }

    #[test]
    fn test_lead_image_prefers_media_images() {
        let article = Article::new(ArticleFields {
            thumbnail_url: Some("thumb".to_string()),
            media_images: vec![MediaImage::from_url("first"), MediaImage::from_url("second")],
            ..Default::default()
        });
        assert_eq!(article.lead_image_url(), Some("first"));

        let article = Article::new(ArticleFields {
            thumbnail_url: Some("thumb".to_string()),
            ..Default::default()
        });
        assert_eq!(article.lead_image_url(), Some("thumb"));

        assert_eq!(Article::default().lead_image_url(), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let article = Article::new(ArticleFields {
            title: Some("A".to_string()),
            pub_date: Some("today".to_string()),
            media_images: vec![MediaImage::from_url("u")],
            ..Default::default()
        });
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json["title"], "A");
        assert_eq!(json["pubDate"], "today");
        assert_eq!(json["thumbnailUrl"], serde_json::Value::Null);
        assert_eq!(json["mediaImages"][0]["url"], "u");
    }
}
