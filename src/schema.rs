//! Declarative shape of an RSS 2.0 document with the Media RSS and Dublin
//! Core extensions, and the raw feed model bound from it.
//!
//! Every field the reader cares about is described once as a [`Field`]:
//! its name, the namespace it lives in, whether it is a child element, an
//! attribute or the element's own text, and whether the document is invalid
//! without it. Binding walks an [`XmlElement`] tree using those descriptors,
//! so the raw model never depends on how the XML was read.

use crate::xml::{self, ParseError, XmlElement};

pub const MEDIA_RSS_URI: &str = "http://search.yahoo.com/mrss/";
pub const DUBLIN_CORE_URI: &str = "http://purl.org/dc/elements/1.1/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Plain RSS 2.0 elements, written without a prefix.
    None,
    MediaRss,
    DublinCore,
}

impl Namespace {
    pub fn uri(self) -> Option<&'static str> {
        match self {
            Namespace::None => None,
            Namespace::MediaRss => Some(MEDIA_RSS_URI),
            Namespace::DublinCore => Some(DUBLIN_CORE_URI),
        }
    }

    /// Prefix conventionally bound to this namespace.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Namespace::None => None,
            Namespace::MediaRss => Some("media"),
            Namespace::DublinCore => Some("dc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Element,
    Attribute,
    Text,
}

/// One entry of the feed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub namespace: Namespace,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn element(name: &'static str) -> Self {
        Self {
            name,
            namespace: Namespace::None,
            kind: FieldKind::Element,
            required: false,
        }
    }

    pub const fn media(name: &'static str) -> Self {
        Self {
            name,
            namespace: Namespace::MediaRss,
            kind: FieldKind::Element,
            required: false,
        }
    }

    pub const fn dublin_core(name: &'static str) -> Self {
        Self {
            name,
            namespace: Namespace::DublinCore,
            kind: FieldKind::Element,
            required: false,
        }
    }

    pub const fn attribute(name: &'static str) -> Self {
        Self {
            name,
            namespace: Namespace::None,
            kind: FieldKind::Attribute,
            required: false,
        }
    }

    pub const fn text() -> Self {
        Self {
            name: "#text",
            namespace: Namespace::None,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Whether `element` is an occurrence of this (element) field.
    ///
    /// Namespaced fields match on the resolved URI. An element whose prefix
    /// was never declared still matches when it uses the conventional prefix,
    /// since many feeds forget the `xmlns` declaration.
    pub fn matches(&self, element: &XmlElement) -> bool {
        if element.local != self.name {
            return false;
        }
        match (self.namespace.uri(), self.namespace.prefix()) {
            (Some(uri), Some(prefix)) => {
                element.namespace.as_deref() == Some(uri)
                    || (element.namespace.is_none() && element.prefix.as_deref() == Some(prefix))
            }
            _ => element.prefix.is_none(),
        }
    }

    pub fn first_in<'a>(&self, parent: &'a XmlElement) -> Option<&'a XmlElement> {
        parent.children.iter().find(|child| self.matches(child))
    }

    pub fn all_in(self, parent: &XmlElement) -> impl Iterator<Item = &XmlElement> {
        parent.children.iter().filter(move |child| self.matches(child))
    }

    /// Finds the first candidate matching this field.
    ///
    /// A missing required field is a [`ParseError::MissingElement`]; a
    /// missing optional one is `None`.
    pub fn bind<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a XmlElement>,
    ) -> Result<Option<&'a XmlElement>, ParseError> {
        match candidates.into_iter().find(|el| self.matches(el)) {
            Some(el) => Ok(Some(el)),
            None if self.required => Err(ParseError::MissingElement(self.name)),
            None => Ok(None),
        }
    }

    /// Reads a leaf value from `parent`, trimmed. Absent fields read as `None`.
    pub fn read(&self, parent: &XmlElement) -> Option<String> {
        let raw = match self.kind {
            FieldKind::Element => self.first_in(parent).map(|el| el.text.as_str()),
            FieldKind::Attribute => parent.attribute(self.name),
            FieldKind::Text => Some(parent.text.as_str()),
        };
        raw.map(|value| value.trim().to_string())
    }
}

pub mod rss {
    use super::Field;

    pub const RSS: Field = Field::element("rss").required();
    pub const CHANNEL: Field = Field::element("channel");
}

pub mod channel {
    use super::Field;

    pub const TITLE: Field = Field::element("title");
    pub const LINK: Field = Field::element("link");
    pub const DESCRIPTION: Field = Field::element("description");
    pub const LANGUAGE: Field = Field::element("language");
    pub const LAST_BUILD_DATE: Field = Field::element("lastBuildDate");
    pub const ITEM: Field = Field::element("item");
}

pub mod item {
    use super::Field;

    pub const TITLE: Field = Field::element("title");
    pub const LINK: Field = Field::element("link");
    pub const DESCRIPTION: Field = Field::element("description");
    pub const PUB_DATE: Field = Field::element("pubDate");
    pub const GUID: Field = Field::element("guid");
    pub const CREATOR: Field = Field::dublin_core("creator");
    pub const CONTRIBUTOR: Field = Field::dublin_core("contributor");
    pub const DATE_TIME_WRITTEN: Field = Field::element("dateTimeWritten");
    pub const UPDATE_DATE: Field = Field::element("updateDate");
    pub const EXPIRES: Field = Field::element("expires");
    pub const THUMBNAIL: Field = Field::media("thumbnail");
    pub const CONTENT: Field = Field::media("content");
    pub const ENCLOSURE: Field = Field::element("enclosure");
}

pub mod thumbnail {
    use super::Field;

    pub const URL: Field = Field::attribute("url");
    pub const HEIGHT: Field = Field::attribute("height");
    pub const WIDTH: Field = Field::attribute("width");
}

pub mod content {
    use super::Field;

    pub const URL: Field = Field::attribute("url");
    pub const TYPE: Field = Field::attribute("type");
    pub const MEDIUM: Field = Field::attribute("medium");
    pub const HEIGHT: Field = Field::attribute("height");
    pub const WIDTH: Field = Field::attribute("width");
    pub const CREDIT: Field = Field::media("credit");
    pub const TEXT: Field = Field::media("text");
    pub const DESCRIPTION: Field = Field::media("description");
    pub const THUMBNAIL: Field = Field::media("thumbnail");
}

/// Shared by `media:text` and `media:description`.
pub mod typed_text {
    use super::Field;

    pub const TYPE: Field = Field::attribute("type");
    pub const VALUE: Field = Field::text();
}

pub mod enclosure {
    use super::Field;

    pub const URL: Field = Field::attribute("url");
    pub const TYPE: Field = Field::attribute("type");
    pub const LENGTH: Field = Field::attribute("length");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeed {
    pub channel: Option<RawChannel>,
}

impl RawFeed {
    /// Items of the channel, empty when the feed has no channel.
    pub fn items(&self) -> &[RawItem] {
        self.channel
            .as_ref()
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChannel {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub last_build_date: Option<String>,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub guid: Option<String>,
    pub creator: Option<String>,
    pub contributor: Option<String>,
    pub date_time_written: Option<String>,
    pub update_date: Option<String>,
    pub expires: Option<String>,
    pub thumbnail: Option<MediaThumbnail>,
    pub content: Vec<MediaContent>,
    pub enclosure: Option<Enclosure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaThumbnail {
    pub url: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaContent {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub medium: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub credit: Option<String>,
    pub text: Option<TypedText>,
    pub description: Option<TypedText>,
    pub thumbnail: Option<MediaThumbnail>,
}

/// Text content with a `type` attribute (`plain` or `html`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedText {
    pub text_type: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub length: Option<String>,
}

/// Parses feed bytes into the raw model.
pub fn parse_feed(bytes: &[u8]) -> Result<RawFeed, ParseError> {
    let root = xml::parse_document(bytes)?;
    RawFeed::from_tree(&root)
}

impl RawFeed {
    pub fn from_tree(root: &XmlElement) -> Result<Self, ParseError> {
        let channel = match rss::RSS.bind(std::iter::once(root))? {
            Some(document) => rss::CHANNEL.bind(&document.children)?,
            None => None,
        };

        Ok(Self {
            channel: channel.map(RawChannel::from_element),
        })
    }
}

impl RawChannel {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            title: channel::TITLE.read(el),
            link: channel::LINK.read(el),
            description: channel::DESCRIPTION.read(el),
            language: channel::LANGUAGE.read(el),
            last_build_date: channel::LAST_BUILD_DATE.read(el),
            items: channel::ITEM.all_in(el).map(RawItem::from_element).collect(),
        }
    }
}

impl RawItem {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            title: item::TITLE.read(el),
            link: item::LINK.read(el),
            description: item::DESCRIPTION.read(el),
            pub_date: item::PUB_DATE.read(el),
            guid: item::GUID.read(el),
            creator: item::CREATOR.read(el),
            contributor: item::CONTRIBUTOR.read(el),
            date_time_written: item::DATE_TIME_WRITTEN.read(el),
            update_date: item::UPDATE_DATE.read(el),
            expires: item::EXPIRES.read(el),
            thumbnail: item::THUMBNAIL
                .first_in(el)
                .map(MediaThumbnail::from_element),
            content: item::CONTENT
                .all_in(el)
                .map(MediaContent::from_element)
                .collect(),
            enclosure: item::ENCLOSURE.first_in(el).map(Enclosure::from_element),
        }
    }
}

impl MediaThumbnail {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            url: thumbnail::URL.read(el),
            height: thumbnail::HEIGHT.read(el),
            width: thumbnail::WIDTH.read(el),
        }
    }
}

impl MediaContent {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            url: content::URL.read(el),
            mime_type: content::TYPE.read(el),
            medium: content::MEDIUM.read(el),
            height: content::HEIGHT.read(el),
            width: content::WIDTH.read(el),
            credit: content::CREDIT.read(el),
            text: content::TEXT.first_in(el).map(TypedText::from_element),
            description: content::DESCRIPTION
                .first_in(el)
                .map(TypedText::from_element),
            thumbnail: content::THUMBNAIL
                .first_in(el)
                .map(MediaThumbnail::from_element),
        }
    }
}

impl TypedText {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            text_type: typed_text::TYPE.read(el),
            value: typed_text::VALUE.read(el),
        }
    }
}

impl Enclosure {
    fn from_element(el: &XmlElement) -> Self {
        Self {
            url: enclosure::URL.read(el),
            mime_type: enclosure::TYPE.read(el),
            length: enclosure::LENGTH.read(el),
        }
    }
}
