//! Presentation models for the two article cards.
//!
//! Cards never touch the store: they are built from an already-loaded
//! [`Article`] (or a not-yet-stored [`ParsedArticle`]) and only decide what
//! text and image to show and where a tap leads.

use chrono::{DateTime, Utc};

use crate::storage::{Article, ArticleImage, ParsedArticle};
use crate::util::clamp_lines;

/// Route prefix of the article detail screen
pub const ARTICLE_ROUTE_PREFIX: &str = "/article";

/// Detail route for an article id, e.g. `/article/42`.
pub fn detail_route(article_id: i64) -> String {
    format!("{ARTICLE_ROUTE_PREFIX}/{article_id}")
}

/// Something that can switch the visible screen.
pub trait Navigator {
    fn push(&mut self, route: &str);
}

fn image_url(image: Option<&ArticleImage>) -> Option<String> {
    image
        .map(|i| i.url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn clamp_optional(text: Option<&str>, lines: usize, width: usize) -> String {
    text.map(|t| clamp_lines(t, lines, width)).unwrap_or_default()
}

// ============================================================================
// Compact card
// ============================================================================

/// List row: two lines of title, two of description, thumbnail on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub unread: bool,
}

impl ArticleCard {
    pub const TITLE_LINES: usize = 2;
    pub const DESCRIPTION_LINES: usize = 2;

    pub fn from_article(article: &Article, width: usize) -> Self {
        Self {
            id: Some(article.id),
            ..Self::build(&article.to_parsed(), width)
        }
    }

    pub fn from_parsed(article: &ParsedArticle, width: usize) -> Self {
        Self::build(article, width)
    }

    fn build(article: &ParsedArticle, width: usize) -> Self {
        Self {
            id: None,
            title: clamp_lines(&article.title, Self::TITLE_LINES, width),
            description: clamp_optional(
                article.description.as_deref(),
                Self::DESCRIPTION_LINES,
                width,
            ),
            thumbnail_url: image_url(article.image.as_ref()),
            unread: article.unread,
        }
    }

    /// The compact card hands the tap straight to the caller.
    pub fn press(&self, on_press: Option<&mut dyn FnMut()>) {
        if let Some(callback) = on_press {
            callback();
        }
    }
}

// ============================================================================
// Big card
// ============================================================================

/// Featured card: image on top, then title, description and publish time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleBigCard {
    pub id: Option<i64>,
    pub image_url: Option<String>,
    pub title: String,
    pub description: String,
    pub published: Option<DateTime<Utc>>,
}

impl ArticleBigCard {
    pub const TITLE_LINES: usize = 2;
    pub const DESCRIPTION_LINES: usize = 3;

    pub fn from_article(article: &Article, width: usize) -> Self {
        Self {
            id: Some(article.id),
            ..Self::build(&article.to_parsed(), width)
        }
    }

    pub fn from_parsed(article: &ParsedArticle, width: usize) -> Self {
        Self::build(article, width)
    }

    fn build(article: &ParsedArticle, width: usize) -> Self {
        Self {
            id: None,
            image_url: image_url(article.image.as_ref()),
            title: clamp_lines(&article.title, Self::TITLE_LINES, width),
            description: clamp_optional(
                article.description.as_deref(),
                Self::DESCRIPTION_LINES,
                width,
            ),
            published: article.published,
        }
    }

    /// Route this card opens, if it refers to a stored article.
    pub fn route(&self) -> Option<String> {
        self.id.map(detail_route)
    }

    /// Open the article's detail screen (stored articles only), then run the
    /// caller's callback regardless.
    pub fn press<N: Navigator + ?Sized>(
        &self,
        navigator: &mut N,
        on_press: Option<&mut dyn FnMut()>,
    ) {
        match self.route() {
            Some(route) => {
                tracing::debug!(route = %route, "Navigating to article");
                navigator.push(&route);
            }
            None => tracing::warn!(title = %self.title, "Article has no id, cannot navigate"),
        }

        if let Some(callback) = on_press {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn push(&mut self, route: &str) {
            self.routes.push(route.to_string());
        }
    }

    fn stored(id: i64) -> Article {
        Article {
            id,
            feed_id: 1,
            title: "Rust 2024 edition released".to_string(),
            url: format!("https://example.com/{id}"),
            content: None,
            description: Some("What changed\nand why it matters".to_string()),
            published: Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()),
            updated: None,
            authors: Vec::new(),
            categories: Vec::new(),
            image: Some(ArticleImage::new("https://example.com/cover.png")),
            unread: true,
            fetched_at: Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_detail_route() {
        assert_eq!(detail_route(42), "/article/42");
    }

    #[test]
    fn test_compact_card_fields() {
        let card = ArticleCard::from_article(&stored(7), 80);
        assert_eq!(
            card,
            ArticleCard {
                id: Some(7),
                title: "Rust 2024 edition released".to_string(),
                description: "What changed and why it matters".to_string(),
                thumbnail_url: Some("https://example.com/cover.png".to_string()),
                unread: true,
            }
        );
    }

    #[test]
    fn test_card_clamps_long_title() {
        let mut article = stored(1);
        article.title = "word ".repeat(40);
        let card = ArticleCard::from_article(&article, 20);
        assert!(crate::util::display_width(&card.title) <= 40);
        assert!(card.title.ends_with("..."));
    }

    #[test]
    fn test_blank_image_url_hidden() {
        let mut article = stored(1);
        article.image = Some(ArticleImage::new("  "));
        assert_eq!(ArticleBigCard::from_article(&article, 40).image_url, None);

        article.image = None;
        assert_eq!(ArticleCard::from_article(&article, 40).thumbnail_url, None);
    }

    #[test]
    fn test_missing_description_is_empty() {
        let mut article = stored(1);
        article.description = None;
        assert_eq!(ArticleBigCard::from_article(&article, 40).description, "");
    }

    #[test]
    fn test_big_card_press_navigates_then_calls_back() {
        let card = ArticleBigCard::from_article(&stored(42), 40);
        let mut nav = RecordingNavigator::default();
        let mut pressed = 0;
        let mut on_press = || pressed += 1;

        card.press(&mut nav, Some(&mut on_press));

        assert_eq!(nav.routes, vec!["/article/42".to_string()]);
        assert_eq!(pressed, 1);
    }

    #[test]
    fn test_big_card_without_id_only_calls_back() {
        let parsed = stored(1).to_parsed();
        let card = ArticleBigCard::from_parsed(&parsed, 40);
        assert_eq!(card.route(), None);

        let mut nav = RecordingNavigator::default();
        let mut pressed = false;
        let mut on_press = || pressed = true;
        card.press(&mut nav, Some(&mut on_press));

        assert!(nav.routes.is_empty());
        assert!(pressed);
    }

    #[test]
    fn test_big_card_press_without_callback() {
        let card = ArticleBigCard::from_article(&stored(3), 40);
        let mut nav = RecordingNavigator::default();
        card.press(&mut nav, None);
        assert_eq!(nav.routes, vec!["/article/3".to_string()]);
    }

    #[test]
    fn test_compact_card_press_calls_back() {
        let card = ArticleCard::from_article(&stored(3), 40);
        let mut count = 0;
        let mut on_press = || count += 1;
        card.press(Some(&mut on_press));
        card.press(None);
        assert_eq!(count, 1);
    }
}
