//! Integration tests for building cards from stored articles.

use chrono::{TimeZone, Utc};

use feedstash::card::{ArticleBigCard, ArticleCard, Navigator};
use feedstash::storage::{ArticleImage, Database, ParsedArticle};

struct Screens(Vec<String>);

impl Navigator for Screens {
    fn push(&mut self, route: &str) {
        self.0.push(route.to_string());
    }
}

async fn stored_card_source(db: &Database) -> i64 {
    let article = ParsedArticle {
        description: Some("  Line one\n\nline two  ".to_string()),
        published: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        image: Some(ArticleImage::new("https://example.com/hero.jpg")),
        ..ParsedArticle::new("Card source", "https://example.com/card")
    };
    db.insert_article(1, &article).await.unwrap()
}

#[tokio::test]
async fn test_big_card_opens_stored_article() {
    let db = Database::open(":memory:").await.unwrap();
    let id = stored_card_source(&db).await;

    let article = db.get_article(id).await.unwrap();
    let card = ArticleBigCard::from_article(&article, 40);
    assert_eq!(card.image_url.as_deref(), Some("https://example.com/hero.jpg"));
    assert_eq!(card.description, "Line one line two");
    assert_eq!(card.published, article.published);

    let mut screens = Screens(Vec::new());
    let mut taps = 0;
    let mut on_press = || taps += 1;
    card.press(&mut screens, Some(&mut on_press));

    assert_eq!(screens.0, vec![format!("/article/{id}")]);
    assert_eq!(taps, 1);
}

#[tokio::test]
async fn test_compact_card_tracks_read_state() {
    let db = Database::open(":memory:").await.unwrap();
    let id = stored_card_source(&db).await;

    let before = ArticleCard::from_article(&db.get_article(id).await.unwrap(), 40);
    assert!(before.unread);
    assert_eq!(before.thumbnail_url.as_deref(), Some("https://example.com/hero.jpg"));

    db.mark_article_read(id).await.unwrap();
    let after = ArticleCard::from_article(&db.get_article(id).await.unwrap(), 40);
    assert!(!after.unread);
    assert_eq!(after.id, Some(id));
}
